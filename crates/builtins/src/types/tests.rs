use pretty_assertions::assert_eq;
use rstest::rstest;

use super::*;

#[rstest]
#[case("float", BasicKind::Float)]
#[case("int", BasicKind::Int)]
#[case("uint", BasicKind::UInt)]
#[case("bool", BasicKind::Bool)]
#[case("void", BasicKind::Void)]
#[case("atomic_uint", BasicKind::AtomicCounter)]
#[case("yuvCscStandardEXT", BasicKind::YuvCscStandardEXT)]
fn scalar_keywords(#[case] token: &str, #[case] basic: BasicKind) {
	assert_eq!(TypeDescriptor::parse(token).unwrap(), TypeDescriptor::scalar(basic));
}

#[rstest]
#[case("vec2", BasicKind::Float, 2)]
#[case("ivec3", BasicKind::Int, 3)]
#[case("uvec4", BasicKind::UInt, 4)]
#[case("bvec2", BasicKind::Bool, 2)]
fn sized_vectors(#[case] token: &str, #[case] basic: BasicKind, #[case] size: u8) {
	let ty = TypeDescriptor::parse(token).unwrap();
	assert_eq!(ty, TypeDescriptor::vector(basic, size));
	assert!(ty.is_vector());
	assert!(!ty.is_matrix());
}

#[test]
fn bare_vector_is_vector_generic() {
	let ty = TypeDescriptor::parse("uvec").unwrap();
	assert_eq!(ty.basic, BasicKind::UInt);
	assert_eq!(ty.generic, Some(GenericTag::Vector));
}

#[test]
fn matrices() {
	let square = TypeDescriptor::parse("mat3").unwrap();
	assert_eq!((square.primary_size, square.secondary_size), (3, 3));
	assert!(square.is_matrix());
	assert!(!square.is_vector());

	let rect = TypeDescriptor::parse("mat2x4").unwrap();
	assert_eq!((rect.primary_size, rect.secondary_size), (2, 4));
	assert_eq!(rect.basic, BasicKind::Float);
}

#[rstest]
#[case("genType", BasicKind::Float)]
#[case("genIType", BasicKind::Int)]
#[case("genUType", BasicKind::UInt)]
#[case("genBType", BasicKind::Bool)]
fn gen_types(#[case] token: &str, #[case] basic: BasicKind) {
	let ty = TypeDescriptor::parse(token).unwrap();
	assert_eq!(ty.basic, basic);
	assert_eq!(ty.generic, Some(GenericTag::Full));
}

#[test]
fn samplers_and_images() {
	let sampler = TypeDescriptor::parse("samplerExternalOES").unwrap();
	assert_eq!(sampler.basic, BasicKind::SamplerExternalOES);
	assert!(!sampler.is_generic());

	let gsampler = TypeDescriptor::parse("gsampler2DArray").unwrap();
	assert_eq!(gsampler.basic, BasicKind::Sampler2DArray);
	assert_eq!(gsampler.generic, Some(GenericTag::SamplerOrImage));

	let gimage = TypeDescriptor::parse("gimage3D").unwrap();
	assert_eq!(gimage.basic, BasicKind::Image3D);
	assert_eq!(gimage.generic, Some(GenericTag::SamplerOrImage));

	let gvec = TypeDescriptor::parse("gvec4").unwrap();
	assert_eq!(gvec.primary_size, 4);
	assert_eq!(gvec.generic, Some(GenericTag::SamplerOrImage));
}

#[test]
fn qualifier_prefixes() {
	let out = TypeDescriptor::parse("out genType").unwrap();
	assert_eq!(out.qualifier, Qualifier::Out);
	assert_eq!(out.generic, Some(GenericTag::Full));

	let inout = TypeDescriptor::parse("inout uint").unwrap();
	assert_eq!(inout, TypeDescriptor::scalar(BasicKind::UInt).with_qualifier(Qualifier::InOut));
}

#[rstest]
#[case("double")]
#[case("vec5")]
#[case("mat5")]
#[case("genDType")]
#[case("sampler1D")]
#[case("gsamplerBuffer")]
#[case("gvec2")]
#[case("")]
fn unrecognized_tokens(#[case] token: &str) {
	let err = TypeDescriptor::parse(token).unwrap_err();
	assert!(matches!(err, GenError::UnrecognizedType { .. }), "{token}: {err}");
}

#[test]
fn mangled_tokens() {
	assert_eq!(TypeDescriptor::parse("float").unwrap().mangled_token(';'), "f;");
	assert_eq!(TypeDescriptor::parse("ivec3").unwrap().mangled_token(';'), "3i;");
	assert_eq!(TypeDescriptor::parse("mat2x3").unwrap().mangled_token('_'), "23f_");
	assert_eq!(TypeDescriptor::parse("sampler2D").unwrap().mangled_token('_'), "s2_");
	assert_eq!(TypeDescriptor::parse("atomic_uint").unwrap().mangled_token(';'), "a;");
}

#[test]
fn sampler_family_specialization() {
	let gsampler = TypeDescriptor::parse("gsampler2D").unwrap();
	let kinds: Vec<BasicKind> = SamplerFamily::ALL
		.iter()
		.map(|&family| gsampler.specialize_for_sampler_family(family).unwrap().basic)
		.collect();
	assert_eq!(kinds, vec![BasicKind::Sampler2D, BasicKind::ISampler2D, BasicKind::USampler2D]);

	let gvec = TypeDescriptor::parse("gvec4").unwrap();
	let int_vec = gvec.specialize_for_sampler_family(SamplerFamily::Int).unwrap();
	assert_eq!(int_vec, TypeDescriptor::vector(BasicKind::Int, 4));

	let concrete = TypeDescriptor::parse("vec2").unwrap();
	assert_eq!(concrete.specialize_for_sampler_family(SamplerFamily::UInt).unwrap(), concrete);
}

#[test]
fn sampler_family_without_counterpart_fails() {
	let shadow = TypeDescriptor {
		generic: Some(GenericTag::SamplerOrImage),
		..TypeDescriptor::scalar(BasicKind::Sampler2DShadow)
	};
	assert!(shadow.specialize_for_sampler_family(SamplerFamily::Float).is_ok());
	assert!(matches!(
		shadow.specialize_for_sampler_family(SamplerFamily::Int),
		Err(GenError::UnrecognizedType { .. })
	));
}

#[test]
fn dimension_specialization_keeps_qualifier() {
	let ty = TypeDescriptor::parse("out genIType").unwrap();
	let scalar = ty.specialize_for_dimension(1);
	assert_eq!(scalar, TypeDescriptor::scalar(BasicKind::Int).with_qualifier(Qualifier::Out));

	let vec3 = ty.specialize_for_dimension(3);
	assert_eq!(vec3.primary_size, 3);
	assert_eq!(vec3.qualifier, Qualifier::Out);
	assert_eq!(vec3.generic, None);

	let mat = TypeDescriptor::parse("mat4").unwrap();
	assert_eq!(mat.specialize_for_dimension(2), mat);
}

#[test]
fn structured_descriptor_normalizes_defaults() {
	let ty: TypeDescriptor = serde_json::from_str(r#"{"basic": "Float"}"#).unwrap();
	assert_eq!(ty, TypeDescriptor::scalar(BasicKind::Float));

	let vec: TypeDescriptor = serde_json::from_str(r#"{"basic": "Int", "primarySize": 3, "qualifier": "Out"}"#).unwrap();
	assert_eq!(vec, TypeDescriptor::vector(BasicKind::Int, 3).with_qualifier(Qualifier::Out));
}

#[test]
fn structured_descriptor_rejects_secondary_without_primary() {
	let result: std::result::Result<TypeDescriptor, _> = serde_json::from_str(r#"{"basic": "Float", "secondarySize": 2}"#);
	assert!(result.is_err());
}

#[test]
fn descriptor_survives_json() {
	let ty = TypeDescriptor::parse("gsampler2D").unwrap();
	let json = serde_json::to_string(&ty).unwrap();
	assert!(json.contains(r#""generic":"sampler-or-image-generic""#));
	let back: TypeDescriptor = serde_json::from_str(&json).unwrap();
	assert_eq!(back, ty);
}

#[test]
fn every_kind_has_a_distinct_code() {
	let mut codes: Vec<&str> = BasicKind::ALL.iter().map(|k| k.mangled_code()).collect();
	codes.sort_unstable();
	codes.dedup();
	assert_eq!(codes.len(), BasicKind::ALL.len());
}
