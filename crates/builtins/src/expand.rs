//! Generic declaration expansion.
//!
//! A declaration written against placeholder types denotes a family of
//! concrete signatures. [`expand`] produces that family in a fixed order,
//! which is also the order identities get assigned in.

use std::collections::BTreeSet;

use crate::error::{GenError, Result};
use crate::parser::FunctionDecl;
use crate::types::{GenericTag, SamplerFamily, TypeDescriptor};

/// One concrete signature of a declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
	pub return_type: TypeDescriptor,
	pub parameters: Vec<TypeDescriptor>,
}

impl Variant {
	fn map<F>(decl: &FunctionDecl, mut specialize: F) -> Result<Self>
	where
		F: FnMut(&TypeDescriptor) -> Result<TypeDescriptor>,
	{
		Ok(Self {
			return_type: specialize(&decl.return_type)?,
			parameters: decl.parameters.iter().map(&mut specialize).collect::<Result<_>>()?,
		})
	}
}

/// Distinct generic tags across the return type and every parameter.
pub fn generic_tags(decl: &FunctionDecl) -> BTreeSet<GenericTag> {
	std::iter::once(&decl.return_type)
		.chain(&decl.parameters)
		.filter_map(|ty| ty.generic)
		.collect()
}

/// Expands `decl` into its concrete variants.
///
/// Sampler-or-image placeholders yield the float, int and uint families;
/// `vec`-style placeholders yield sizes 2 to 4 and `genType`-style ones sizes
/// 1 to 4.
///
/// # Errors
///
/// Returns [`GenError::ConflictingGenerics`] if the declaration mixes generic
/// families, and [`GenError::UnrecognizedType`] if a sampler family has no
/// counterpart kind.
pub fn expand(decl: &FunctionDecl) -> Result<Vec<Variant>> {
	let tags = generic_tags(decl);
	let mut iter = tags.iter();
	let (tag, rest) = (iter.next(), iter.next());
	if rest.is_some() {
		return Err(GenError::ConflictingGenerics {
			function: decl.name.clone(),
			tags: tags.iter().copied().collect(),
		});
	}

	match tag {
		None => Ok(vec![Variant::map(decl, |ty| Ok(ty.clone()))?]),
		Some(GenericTag::SamplerOrImage) => SamplerFamily::ALL
			.iter()
			.map(|&family| Variant::map(decl, |ty| ty.specialize_for_sampler_family(family)))
			.collect(),
		Some(tag @ (GenericTag::Vector | GenericTag::Full)) => {
			let sizes = if *tag == GenericTag::Full { 1..=4 } else { 2..=4 };
			sizes
				.map(|size| Variant::map(decl, |ty| Ok(ty.specialize_for_dimension(size))))
				.collect()
		}
	}
}
