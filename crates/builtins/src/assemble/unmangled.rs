//! Unmangled-name records grouped by level and activation condition.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::trace;

use super::Condition;
use crate::metadata::{Level, UNDEFINED_EXTENSION};

/// What an unmangled lookup for one name resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnmangledRecord {
	/// Name constant the generated comparison refers to.
	pub name_with_suffix: String,
	pub extension: Option<String>,
}

impl UnmangledRecord {
	pub fn extension_tag(&self) -> &str {
		self.extension.as_deref().unwrap_or(UNDEFINED_EXTENSION)
	}

	/// True for records that need no extension.
	pub fn is_core(&self) -> bool {
		self.extension.is_none()
	}
}

pub type NameRecords = IndexMap<String, UnmangledRecord>;

/// Records per level (in dispatch order), then per condition (first seen), then
/// per plain name (first seen).
#[derive(Debug, Default)]
pub struct UnmangledRecords {
	levels: [IndexMap<Condition, NameRecords>; 4],
}

impl UnmangledRecords {
	pub fn get(&self, level: Level, condition: &Condition, name: &str) -> Option<&UnmangledRecord> {
		self.levels[level.index()].get(condition)?.get(name)
	}

	/// Offers a record, returning whether it was stored.
	///
	/// An unconditioned core record for the name at this level shadows every
	/// later offer. Otherwise a new key is stored, and an existing key is only
	/// replaced by a core record; between two extension records the first wins.
	pub fn offer(&mut self, level: Level, condition: &Condition, name: &str, record: UnmangledRecord) -> bool {
		if self.get(level, &Condition::Always, name).is_some_and(UnmangledRecord::is_core) {
			trace!(name, level = level.name(), "unmangled record shadowed by core record");
			return false;
		}
		if self.get(level, condition, name).is_some() && !record.is_core() {
			trace!(name, level = level.name(), "unmangled record already present");
			return false;
		}
		self.levels[level.index()]
			.entry(condition.clone())
			.or_default()
			.insert(name.to_string(), record);
		true
	}

	/// Conditions recorded at `level`, in first-seen order.
	pub fn conditions(&self, level: Level) -> impl Iterator<Item = (&Condition, &NameRecords)> {
		self.levels[level.index()].iter()
	}
}
