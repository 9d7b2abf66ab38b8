//! # Table assembly
//!
//! Walks the parsed registry once, in declaration order, and turns every
//! declaration into the declarative records the emitter renders:
//!
//! - name constants and per-variant identity, parameter-list and signature
//!   records,
//! - insertion instructions grouped by activation condition,
//! - the per-level, per-condition hash-bucketed unmangled-name dispatch,
//! - the hash assertions used to verify the name hash at runtime.
//!
//! All order-sensitive state (identity counter, materialized keys, unmangled
//! records) is owned by the [`Assembler`] for the duration of the pass.

use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, trace};

use crate::error::{GenError, Result};
use crate::expand::expand;
use crate::identity::{HashAssertion, IdentityAllocator, NameHasher, mangled_name, parameter_list_name, unique_key};
use crate::metadata::{CALL_BUILTIN_OP, Level};
use crate::parser::{Declarations, FunctionDecl, Group};
use crate::types::{Qualifier, TypeDescriptor, capitalize};

pub mod unmangled;


use unmangled::{UnmangledRecord, UnmangledRecords};

/// Activation condition of a group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Condition {
	/// Inserted unconditionally.
	Always,
	/// Inserted when the predicate holds.
	Guarded(String),
}

impl Condition {
	fn of(group: &Group) -> Self {
		match &group.condition {
			Some(predicate) => Condition::Guarded(predicate.clone()),
			None => Condition::Always,
		}
	}

	pub fn predicate(&self) -> Option<&str> {
		match self {
			Condition::Always => None,
			Condition::Guarded(predicate) => Some(predicate),
		}
	}
}

/// One materialized built-in function.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuiltinFunction {
	pub id: u32,
	pub unique_key: String,
	pub name: String,
	pub name_with_suffix: String,
	pub mangled_name: String,
	pub level: Level,
	pub extension: String,
	pub op: String,
	pub parameter_list: String,
	pub parameters: Vec<TypeDescriptor>,
	pub return_type: TypeDescriptor,
	pub known_to_not_have_side_effects: bool,
}

/// A string constant: identifier and literal value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct NameConstant {
	pub ident: String,
	pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Insertion {
	pub level: Level,
	pub unique_key: String,
}

/// One equality check inside a hash bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnmangledCase {
	pub name: String,
	pub name_with_suffix: String,
	pub extension: String,
}

/// Names sharing a hash; the generated code compares them in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HashBucket {
	pub hash: u32,
	pub cases: Vec<UnmangledCase>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConditionDispatch {
	pub condition: Condition,
	pub buckets: Vec<HashBucket>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelDispatch {
	pub level: Level,
	pub conditions: Vec<ConditionDispatch>,
}

/// Everything the emitter needs, in emission-ready order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolTable {
	/// Materialized functions, in identity order.
	pub functions: Vec<BuiltinFunction>,
	pub last_builtin_id: Option<u32>,
	pub names: BTreeSet<NameConstant>,
	pub parameter_lists: BTreeMap<String, Vec<TypeDescriptor>>,
	/// Insertions per condition; [`Condition::Always`] is always the first key.
	pub insertions: IndexMap<Condition, Vec<Insertion>>,
	pub extensions: BTreeSet<String>,
	pub dispatch: Vec<LevelDispatch>,
	pub hash_assertions: Vec<HashAssertion>,
}

impl SymbolTable {
	/// Last assigned identity as rendered in the table; `-1` when empty.
	pub fn last_builtin_id_value(&self) -> i64 {
		self.last_builtin_id.map_or(-1, i64::from)
	}
}

/// Single-pass accumulator over a parsed registry.
#[derive(Debug)]
pub struct Assembler {
	ids: IdentityAllocator,
	functions: Vec<BuiltinFunction>,
	names: BTreeSet<NameConstant>,
	parameter_lists: BTreeMap<String, Vec<TypeDescriptor>>,
	insertions: IndexMap<Condition, Vec<Insertion>>,
	extensions: BTreeSet<String>,
	unmangled: UnmangledRecords,
}

impl Default for Assembler {
	fn default() -> Self {
		Self::new()
	}
}

impl Assembler {
	pub fn new() -> Self {
		let mut insertions = IndexMap::new();
		insertions.insert(Condition::Always, Vec::new());
		Self {
			ids: IdentityAllocator::default(),
			functions: Vec::new(),
			names: BTreeSet::new(),
			parameter_lists: BTreeMap::new(),
			insertions,
			extensions: BTreeSet::new(),
			unmangled: UnmangledRecords::default(),
		}
	}

	/// Processes `group`, then its subgroups in order.
	///
	/// Subgroups use their own condition, not their parent's.
	pub fn add_group(&mut self, group: &Group) -> Result<()> {
		let condition = Condition::of(group);
		self.insertions.entry(condition.clone()).or_default();
		trace!(group = %group.name, condition = ?condition.predicate(), "assembling group");

		for decl in &group.functions {
			self.add_function(&condition, decl)?;
		}
		for subgroup in group.subgroups.values() {
			self.add_group(subgroup)?;
		}
		Ok(())
	}

	fn add_function(&mut self, condition: &Condition, decl: &FunctionDecl) -> Result<()> {
		let level = decl.metadata.level.ok_or_else(|| GenError::UndefinedLevel {
			function: decl.name.clone(),
		})?;
		let op = resolve_op(decl)?;
		let extension = decl.metadata.extension_tag().to_string();
		let name_with_suffix = decl.name_with_suffix();
		let known_to_not_have_side_effects = known_to_not_have_side_effects(decl);

		self.names.insert(NameConstant {
			ident: name_with_suffix.clone(),
			value: decl.name.clone(),
		});

		let record = UnmangledRecord {
			name_with_suffix: name_with_suffix.clone(),
			extension: decl.metadata.extension.clone(),
		};
		if self.unmangled.offer(level, condition, &decl.name, record) {
			self.extensions.insert(extension.clone());
		}

		for variant in expand(decl)? {
			let key = unique_key(&name_with_suffix, &variant.parameters);
			let Some(id) = self.ids.claim(&key) else {
				trace!(key = %key, line = decl.line, "duplicate variant dropped");
				continue;
			};

			let parameter_list = parameter_list_name(&variant.parameters);
			self.parameter_lists
				.entry(parameter_list.clone())
				.or_insert_with(|| variant.parameters.clone());
			self.names.insert(NameConstant {
				ident: key.clone(),
				value: mangled_name(&name_with_suffix, &variant.parameters),
			});
			self.insertions.entry(condition.clone()).or_default().push(Insertion {
				level,
				unique_key: key.clone(),
			});
			self.functions.push(BuiltinFunction {
				id,
				mangled_name: mangled_name(&name_with_suffix, &variant.parameters),
				unique_key: key,
				name: decl.name.clone(),
				name_with_suffix: name_with_suffix.clone(),
				level,
				extension: extension.clone(),
				op: op.clone(),
				parameter_list,
				parameters: variant.parameters,
				return_type: variant.return_type,
				known_to_not_have_side_effects,
			});
		}
		Ok(())
	}

	/// Builds the dispatch and hash assertions and returns the finished table.
	pub fn finish(self) -> SymbolTable {
		let mut hasher = NameHasher::default();
		let mut dispatch = Vec::with_capacity(Level::ALL.len());
		for level in Level::ALL {
			let mut conditions = Vec::new();
			for (condition, names) in self.unmangled.conditions(level) {
				if names.is_empty() {
					continue;
				}
				conditions.push(ConditionDispatch {
					condition: condition.clone(),
					buckets: bucketize(names, |name| hasher.hash(name)),
				});
			}
			dispatch.push(LevelDispatch { level, conditions });
		}

		debug!(
			functions = self.functions.len(),
			names = self.names.len(),
			parameter_lists = self.parameter_lists.len(),
			extensions = self.extensions.len(),
			"symbol table assembled"
		);

		SymbolTable {
			last_builtin_id: self.ids.last_assigned(),
			functions: self.functions,
			names: self.names,
			parameter_lists: self.parameter_lists,
			insertions: self.insertions,
			extensions: self.extensions,
			dispatch,
			hash_assertions: hasher.into_assertions(),
		}
	}
}

/// Assembles the whole registry.
///
/// # Errors
///
/// Fails on the first declaration that lacks a level or op, or that cannot be
/// expanded.
pub fn assemble(declarations: &Declarations) -> Result<SymbolTable> {
	let mut assembler = Assembler::new();
	for group in declarations.groups.values() {
		assembler.add_group(group)?;
	}
	Ok(assembler.finish())
}

/// Groups names by hash, in ascending hash order. Names keep their relative
/// order inside a bucket.
pub(crate) fn bucketize<'a, I, H>(names: I, mut hash: H) -> Vec<HashBucket>
where
	I: IntoIterator<Item = (&'a String, &'a UnmangledRecord)>,
	H: FnMut(&str) -> u32,
{
	let mut buckets: BTreeMap<u32, Vec<UnmangledCase>> = BTreeMap::new();
	for (name, record) in names {
		buckets.entry(hash(name)).or_default().push(UnmangledCase {
			name: name.clone(),
			name_with_suffix: record.name_with_suffix.clone(),
			extension: record.extension_tag().to_string(),
		});
	}
	buckets
		.into_iter()
		.map(|(hash, cases)| HashBucket { hash, cases })
		.collect()
}

fn resolve_op(decl: &FunctionDecl) -> Result<String> {
	match decl.metadata.op.as_deref() {
		None => Err(GenError::UndefinedOperator {
			function: decl.name.clone(),
		}),
		Some("auto") => Ok(capitalize(&decl.name)),
		Some(op) => Ok(op.to_string()),
	}
}

/// Decided on the declared `op`, before `auto` is resolved.
fn known_to_not_have_side_effects(decl: &FunctionDecl) -> bool {
	decl.metadata.op.as_deref() != Some(CALL_BUILTIN_OP)
		&& !decl.metadata.has_side_effects
		&& decl.parameters.iter().all(|param| param.qualifier == Qualifier::In)
}
