use essl_builtins::assemble::{Condition, SymbolTable};
use essl_builtins::metadata::Level;
use essl_builtins::{GenError, GenerateOptions, assemble, generate, parse_declarations};
use pretty_assertions::assert_eq;

const DECLARATIONS: &str = include_str!("../data/builtin_function_declarations.txt");

fn bundled_table() -> SymbolTable {
	assemble(&parse_declarations(DECLARATIONS).unwrap()).unwrap()
}

fn fnv1a(name: &str) -> u32 {
	let mut hash: u64 = 2_166_136_261;
	for byte in name.as_bytes() {
		hash ^= u64::from(*byte);
		hash = hash.wrapping_mul(16_777_619) % (1 << 32);
	}
	hash as u32
}

#[test]
fn bundled_declarations_generate_deterministically() {
	let options = GenerateOptions::default();
	let first = generate(DECLARATIONS, &options).unwrap();
	let second = generate(DECLARATIONS, &options).unwrap();
	assert_eq!(first, second);
	assert!(first.intermediate_json.is_none());
	assert!(first.symbol_table.starts_with("// GENERATED FILE - DO NOT EDIT."));
	assert!(first.hash_tests.contains("assert_eq!(0xe0302a4du32, ImmutableString::new(\"sin\").hash32());"));
}

#[test]
fn identities_are_dense() {
	let table = bundled_table();
	assert!(!table.functions.is_empty());
	for (index, function) in table.functions.iter().enumerate() {
		assert_eq!(function.id as usize, index, "{}", function.unique_key);
	}
	assert_eq!(table.last_builtin_id, Some(table.functions.len() as u32 - 1));
}

#[test]
fn unique_keys_materialize_once() {
	let table = bundled_table();
	let mut keys: Vec<&str> = table.functions.iter().map(|f| f.unique_key.as_str()).collect();
	let total = keys.len();
	keys.sort_unstable();
	keys.dedup();
	assert_eq!(keys.len(), total);

	// `mod(genType, float)` and `mod(genType, genType)` agree at size one.
	let mods: Vec<&str> = table
		.functions
		.iter()
		.filter(|f| f.name == "mod")
		.map(|f| f.unique_key.as_str())
		.collect();
	assert_eq!(
		mods,
		vec!["mod_f_f", "mod_2f_f", "mod_3f_f", "mod_4f_f", "mod_2f_2f", "mod_3f_3f", "mod_4f_4f"]
	);
}

#[test]
fn hash_assertions_match_independent_fnv() {
	let table = bundled_table();
	assert!(!table.hash_assertions.is_empty());
	for assertion in &table.hash_assertions {
		assert_eq!(assertion.hash, fnv1a(&assertion.name), "{}", assertion.name);
	}
	assert_eq!(fnv1a("sin"), 0xe030_2a4d);
}

#[test]
fn sampler_placeholders_cover_all_families() {
	let table = bundled_table();
	let mangled: Vec<&str> = table
		.functions
		.iter()
		.filter(|f| f.name == "texture")
		.map(|f| f.mangled_name.as_str())
		.collect();
	for expected in ["texture(s2;2f", "texture(is2;2f", "texture(us2;2f", "texture(s2s;3f", "texture(usA;3f;f"] {
		assert!(mangled.contains(&expected), "missing {expected}");
	}

	let store = table
		.functions
		.iter()
		.find(|f| f.unique_key == "imageStore_iI2_2i_4i")
		.unwrap();
	assert!(!store.known_to_not_have_side_effects);
	assert_eq!(store.level, Level::Essl31);
}

#[test]
fn extension_records_do_not_shadow_core_records() {
	let table = bundled_table();
	let essl3 = &table.dispatch[Level::Essl3.index()];
	let cases: Vec<(&str, &str)> = essl3
		.conditions
		.iter()
		.flat_map(|c| &c.buckets)
		.flat_map(|b| &b.cases)
		.map(|case| (case.name.as_str(), case.extension.as_str()))
		.collect();
	assert!(cases.contains(&("texture", "UNDEFINED")));
	assert!(cases.contains(&("rgb_2_yuv", "EXT_YUV_target")));
	assert!(!cases.contains(&("texture", "EXT_YUV_target")));

	let essl1 = &table.dispatch[Level::Essl1.index()];
	let fragment = essl1
		.conditions
		.iter()
		.find(|c| c.condition == Condition::Guarded("shader_type == GL_FRAGMENT_SHADER".into()))
		.unwrap();
	let derivative = fragment
		.buckets
		.iter()
		.flat_map(|b| &b.cases)
		.find(|case| case.name == "dFdx")
		.unwrap();
	assert_eq!(derivative.name_with_suffix, "dFdxExt");
	assert_eq!(derivative.extension, "OES_standard_derivatives");
}

#[test]
fn expansion_counts() {
	let source = r#"
GROUP BEGIN G
DEFAULT METADATA {"level": "ESSL3_BUILTINS", "op": "auto"}
genType a(genType);
bvec b(ivec);
bvec c(uvec);
bvec d(bvec);
bvec e(vec);
gvec4 f(gsampler2D, vec2);
GROUP END G
"#;
	let table = assemble(&parse_declarations(source).unwrap()).unwrap();
	let count = |name: &str| table.functions.iter().filter(|f| f.name == name).count();
	assert_eq!(
		["a", "b", "c", "d", "e", "f"].map(count),
		[4, 3, 3, 3, 3, 3]
	);
}

#[test]
fn mismatched_group_yields_no_documents() {
	let err = generate("GROUP BEGIN Foo\nGROUP END Bar\n", &GenerateOptions::default()).unwrap_err();
	assert!(matches!(err, GenError::StructuralMismatch { .. }), "{err}");
}

#[test]
fn intermediate_json_mirrors_groups() {
	let options = GenerateOptions {
		dump_intermediate: true,
		..GenerateOptions::default()
	};
	let generated = generate(DECLARATIONS, &options).unwrap();
	let json: serde_json::Value = serde_json::from_str(generated.intermediate_json.as_deref().unwrap()).unwrap();
	let groups = json.as_object().unwrap();
	assert!(groups.contains_key("Trigonometric") && groups.contains_key("EmitVertex"));
	assert_eq!(json["Derivatives"]["subgroups"]["FragmentShaderOnlyExtension"]["functions"][0]["suffix"], "Ext");
}
