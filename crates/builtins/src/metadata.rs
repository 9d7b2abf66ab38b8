//! Metadata attached to groups and function declarations.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

/// Extension tag used when a declaration requires no extension.
pub const UNDEFINED_EXTENSION: &str = "UNDEFINED";

/// Op tag that routes a call through the generic built-in call path.
pub const CALL_BUILTIN_OP: &str = "CallBuiltInFunction";

/// Symbol-table level, i.e. the language version a built-in appears in.
///
/// The declaration order is the dispatch order: most specific version first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Level {
	#[serde(rename = "ESSL3_1_BUILTINS")]
	Essl31,
	#[serde(rename = "ESSL3_BUILTINS")]
	Essl3,
	#[serde(rename = "ESSL1_BUILTINS")]
	Essl1,
	#[serde(rename = "COMMON_BUILTINS")]
	Common,
}

impl Level {
	pub const ALL: [Level; 4] = [Level::Essl31, Level::Essl3, Level::Essl1, Level::Common];

	pub fn index(self) -> usize {
		self as usize
	}

	/// Name of the level constant in generated code.
	pub fn name(self) -> &'static str {
		match self {
			Level::Essl31 => "ESSL3_1_BUILTINS",
			Level::Essl3 => "ESSL3_BUILTINS",
			Level::Essl1 => "ESSL1_BUILTINS",
			Level::Common => "COMMON_BUILTINS",
		}
	}

	/// Shader-version guard for unmangled lookups at this level, if any.
	pub fn version_predicate(self) -> Option<&'static str> {
		match self {
			Level::Essl31 => Some("shader_version >= 310"),
			Level::Essl3 => Some("shader_version >= 300"),
			Level::Essl1 => Some("shader_version == 100"),
			Level::Common => None,
		}
	}
}

/// Per-function metadata, either inherited from a `DEFAULT METADATA` block or
/// given inline after a signature.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub level: Option<Level>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub extension: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub op: Option<String>,
	#[serde(default, skip_serializing_if = "std::ops::Not::not", deserialize_with = "presence_flag")]
	pub has_side_effects: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub suffix: Option<String>,
}

impl Metadata {
	/// Fields set on `self` win over `defaults`.
	pub fn merged_over(&self, defaults: &Metadata) -> Metadata {
		Metadata {
			level: self.level.or(defaults.level),
			extension: self.extension.clone().or_else(|| defaults.extension.clone()),
			op: self.op.clone().or_else(|| defaults.op.clone()),
			// Present in either layer means present in the merged view.
			has_side_effects: self.has_side_effects || defaults.has_side_effects,
			suffix: self.suffix.clone().or_else(|| defaults.suffix.clone()),
		}
	}

	/// Resolved extension tag, [`UNDEFINED_EXTENSION`] when none is required.
	pub fn extension_tag(&self) -> &str {
		self.extension.as_deref().unwrap_or(UNDEFINED_EXTENSION)
	}

	pub fn suffix(&self) -> &str {
		self.suffix.as_deref().unwrap_or_default()
	}
}

/// A flag that is set by the key's mere presence, whatever its value.
fn presence_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
	D: Deserializer<'de>,
{
	IgnoredAny::deserialize(deserializer)?;
	Ok(true)
}

/// Metadata given on a `GROUP BEGIN` line. Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GroupMetadata {
	#[serde(default)]
	pub condition: Option<String>,
}
