//! Offline compiler for the ESSL built-in function registry.
//!
//! The pipeline runs forward in one pass:
//!
//! 1. [`parser`] reads the declaration DSL into a tree of groups.
//! 2. [`types`] parses and specializes shader type tokens.
//! 3. [`expand`] turns generic declarations into concrete variants.
//! 4. [`identity`] assigns ids, mangled names and name hashes.
//! 5. [`assemble`] builds the declarative symbol table.
//! 6. [`emit`] renders the generated Rust documents.
//!
//! [`generate`] drives the whole pipeline and either returns every document
//! or an error, never a partial result.

pub mod assemble;
pub mod emit;
pub mod error;
pub mod expand;
pub mod identity;
pub mod metadata;
pub mod parser;
pub mod types;

use tracing::info;

pub use crate::assemble::{SymbolTable, assemble};
pub use crate::emit::{EmitOptions, render_hash_tests, render_symbol_table};
pub use crate::error::{GenError, Result};
pub use crate::identity::hash32;
pub use crate::parser::{Declarations, parse_declarations};

/// Options for a full generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateOptions {
	pub emit: EmitOptions,
	/// Also serialize the parsed declaration tree.
	pub dump_intermediate: bool,
}

/// Documents produced by a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
	pub symbol_table: String,
	pub hash_tests: String,
	pub intermediate_json: Option<String>,
}

/// Compiles `source` into the generated documents.
///
/// # Errors
///
/// Returns the first [`GenError`] raised by any stage.
pub fn generate(source: &str, options: &GenerateOptions) -> Result<Generated> {
	let declarations = parse_declarations(source)?;
	let intermediate_json = if options.dump_intermediate {
		Some(declarations.to_json()?)
	} else {
		None
	};

	let table = assemble(&declarations)?;
	info!(
		groups = declarations.groups.len(),
		functions = table.functions.len(),
		hashes = table.hash_assertions.len(),
		"built-in table generated"
	);

	Ok(Generated {
		symbol_table: render_symbol_table(&table, &options.emit),
		hash_tests: render_hash_tests(&table.hash_assertions, &options.emit),
		intermediate_json,
	})
}
