use pretty_assertions::assert_eq;

use super::*;
use crate::metadata::Level;
use crate::types::{BasicKind, GenericTag, Qualifier};

const NESTED: &str = r#"
// Comment lines and blank lines are skipped.

GROUP BEGIN Math
DEFAULT METADATA {"level": "COMMON_BUILTINS", "op": "auto"}
genType sin(genType);
GROUP BEGIN FragmentOnly {"condition": "shader_type == GL_FRAGMENT_SHADER"}
DEFAULT METADATA {"level": "ESSL1_BUILTINS", "op": "auto", "extension": "OES_standard_derivatives"}
genType dFdx(genType);
GROUP END FragmentOnly
float length(vec2);
GROUP END Math

GROUP BEGIN Barriers
void memoryBarrier(); {"level": "ESSL3_1_BUILTINS", "op": "MemoryBarrier", "hasSideEffects": true}
GROUP END Barriers
"#;

#[test]
fn builds_nested_group_tree() {
	let decls = parse_declarations(NESTED).unwrap();
	let names: Vec<&str> = decls.groups.keys().map(String::as_str).collect();
	assert_eq!(names, vec!["Math", "Barriers"]);

	let math = &decls.groups["Math"];
	assert_eq!(math.condition, None);
	assert_eq!(math.functions.len(), 2);
	assert_eq!(math.function_count(), 3);

	let fragment = &math.subgroups["FragmentOnly"];
	assert_eq!(fragment.condition.as_deref(), Some("shader_type == GL_FRAGMENT_SHADER"));
	assert_eq!(fragment.functions[0].name, "dFdx");
}

#[test]
fn default_metadata_replaces_and_survives_nested_end() {
	let decls = parse_declarations(NESTED).unwrap();
	let math = &decls.groups["Math"];

	let sin = &math.functions[0];
	assert_eq!(sin.metadata.level, Some(Level::Common));
	assert_eq!(sin.metadata.extension, None);

	// The nested block's defaults stay active until the top-level group closes.
	let length = &math.functions[1];
	assert_eq!(length.name, "length");
	assert_eq!(length.metadata.level, Some(Level::Essl1));
	assert_eq!(length.metadata.extension.as_deref(), Some("OES_standard_derivatives"));
}

#[test]
fn defaults_reset_after_top_level_group() {
	let decls = parse_declarations(NESTED).unwrap();
	let barrier = &decls.groups["Barriers"].functions[0];
	assert_eq!(barrier.metadata.level, Some(Level::Essl31));
	assert_eq!(barrier.metadata.op.as_deref(), Some("MemoryBarrier"));
	assert_eq!(barrier.metadata.extension, None);
	assert!(barrier.metadata.has_side_effects);
	assert!(barrier.parameters.is_empty());
}

#[test]
fn signature_types_are_parsed() {
	let src = "GROUP BEGIN G\nbvec lessThan(ivec, ivec);\ngenType modf(genType, out genType);\nGROUP END G\n";
	let decls = parse_declarations(src).unwrap();
	let functions = &decls.groups["G"].functions;

	assert_eq!(functions[0].return_type.basic, BasicKind::Bool);
	assert_eq!(functions[0].return_type.generic, Some(GenericTag::Vector));
	assert_eq!(functions[0].parameters.len(), 2);

	assert_eq!(functions[1].parameters[1].qualifier, Qualifier::Out);
	assert_eq!(functions[1].line, 3);
}

#[test]
fn suffix_is_appended_to_name() {
	let src = "GROUP BEGIN G\nDEFAULT METADATA {\"suffix\": \"Ext\"}\nfloat dFdx(float);\nGROUP END G\n";
	let decls = parse_declarations(src).unwrap();
	assert_eq!(decls.groups["G"].functions[0].name_with_suffix(), "dFdxExt");
}

#[test]
fn mismatched_group_end_fails() {
	let err = parse_declarations("GROUP BEGIN Foo\nGROUP END Bar\n").unwrap_err();
	match err {
		GenError::StructuralMismatch { line, expected, found } => {
			assert_eq!(line, 2);
			assert_eq!(expected, "Foo");
			assert_eq!(found, "Bar");
		}
		other => panic!("expected StructuralMismatch, got {other:?}"),
	}
}

#[test]
fn signature_outside_group_fails() {
	let err = parse_declarations("float sin(float);\n").unwrap_err();
	assert!(matches!(err, GenError::UnexpectedInput { line: 1, .. }), "{err}");
}

#[test]
fn unknown_line_fails() {
	let err = parse_declarations("GROUP BEGIN G\nthis is not a declaration\nGROUP END G\n").unwrap_err();
	assert!(matches!(err, GenError::UnexpectedInput { line: 2, .. }), "{err}");
}

#[test]
fn group_end_without_begin_fails() {
	let err = parse_declarations("GROUP END G\n").unwrap_err();
	assert!(matches!(err, GenError::UnexpectedInput { .. }));
}

#[test]
fn unterminated_group_fails() {
	let err = parse_declarations("GROUP BEGIN G\nfloat sin(float);\n").unwrap_err();
	assert!(matches!(err, GenError::UnexpectedInput { line: 2, .. }), "{err}");
}

#[test]
fn bad_metadata_json_fails() {
	let err = parse_declarations("GROUP BEGIN G\nDEFAULT METADATA {level:}\nGROUP END G\n").unwrap_err();
	assert!(matches!(err, GenError::InvalidMetadata { line: 2, .. }), "{err}");
}

#[test]
fn unknown_type_token_fails() {
	let err = parse_declarations("GROUP BEGIN G\nfloat f(double);\nGROUP END G\n").unwrap_err();
	assert!(matches!(err, GenError::UnrecognizedType { .. }), "{err}");
}

#[test]
fn tree_serializes_for_inspection() {
	let decls = parse_declarations(NESTED).unwrap();
	let json = decls.to_json().unwrap();
	let value: serde_json::Value = serde_json::from_str(&json).unwrap();

	assert_eq!(value["Math"]["functions"][0]["name"], "sin");
	assert_eq!(value["Math"]["functions"][0]["level"], "COMMON_BUILTINS");
	assert_eq!(value["Math"]["functions"][0]["returnType"]["generic"], "full-generic");
	assert_eq!(value["Math"]["subgroups"]["FragmentOnly"]["condition"], "shader_type == GL_FRAGMENT_SHADER");
}
