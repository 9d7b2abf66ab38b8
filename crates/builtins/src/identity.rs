//! Identities, mangled names and name hashes for concrete variants.

use indexmap::IndexSet;
use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::types::TypeDescriptor;

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 16_777_619;

/// Wire-visible parameter separator.
pub const MANGLED_SEPARATOR: char = ';';
/// Separator used in identifiers derived from a signature.
pub const KEY_SEPARATOR: char = '_';
/// Placeholder for an empty parameter list in derived identifiers.
pub const EMPTY_PARAMETERS: &str = "empty";

/// 32-bit FNV-1a over the bytes of `name`.
pub fn hash32(name: &str) -> u32 {
	name.bytes()
		.fold(FNV_OFFSET_BASIS, |hash, byte| (hash ^ u32::from(byte)).wrapping_mul(FNV_PRIME))
}

fn join_tokens<'a, I>(params: I, separator: char, qualified: bool) -> String
where
	I: IntoIterator<Item = &'a TypeDescriptor>,
{
	let mut out = String::new();
	for param in params {
		if qualified {
			out.push_str(param.qualifier.key_marker());
		}
		out.push_str(&param.mangled_token(separator));
	}
	if out.ends_with(separator) {
		out.pop();
	}
	out
}

/// Wire name: `name(` followed by `;`-separated parameter tokens.
pub fn mangled_name(name_with_suffix: &str, params: &[TypeDescriptor]) -> String {
	format!("{name_with_suffix}({}", join_tokens(params, MANGLED_SEPARATOR, false))
}

fn qualified_parameters(params: &[TypeDescriptor]) -> String {
	if params.is_empty() {
		return EMPTY_PARAMETERS.to_string();
	}
	join_tokens(params, KEY_SEPARATOR, true)
}

/// Unique-variant key, also used as the identifier of the variant's constants.
pub fn unique_key(name_with_suffix: &str, params: &[TypeDescriptor]) -> String {
	format!("{name_with_suffix}{KEY_SEPARATOR}{}", qualified_parameters(params))
}

/// Identifier of the shared parameter-list constant for `params`.
pub fn parameter_list_name(params: &[TypeDescriptor]) -> String {
	if params.is_empty() {
		return EMPTY_PARAMETERS.to_string();
	}
	format!("p{KEY_SEPARATOR}{}", qualified_parameters(params))
}

/// Hands out dense identities to variants, first writer wins.
#[derive(Debug, Default)]
pub struct IdentityAllocator {
	next: u32,
	materialized: FxHashSet<String>,
}

impl IdentityAllocator {
	/// Claims the next identity for `unique_key`.
	///
	/// Returns `None` without consuming an identity when the key was already
	/// materialized.
	pub fn claim(&mut self, unique_key: &str) -> Option<u32> {
		if !self.materialized.insert(unique_key.to_string()) {
			return None;
		}
		let id = self.next;
		self.next += 1;
		Some(id)
	}

	/// Number of identities handed out so far.
	pub fn assigned(&self) -> u32 {
		self.next
	}

	/// The highest identity handed out, if any.
	pub fn last_assigned(&self) -> Option<u32> {
		self.next.checked_sub(1)
	}
}

/// A generated hash paired with the name it was computed from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct HashAssertion {
	pub hash: u32,
	pub name: String,
}

/// Hashes names and keeps one assertion per distinct name, in first-seen order.
#[derive(Debug, Default)]
pub struct NameHasher {
	assertions: IndexSet<HashAssertion>,
}

impl NameHasher {
	pub fn hash(&mut self, name: &str) -> u32 {
		let hash = hash32(name);
		self.assertions.insert(HashAssertion {
			hash,
			name: name.to_string(),
		});
		hash
	}

	pub fn into_assertions(self) -> Vec<HashAssertion> {
		self.assertions.into_iter().collect()
	}
}
