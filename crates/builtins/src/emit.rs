//! # Rendering
//!
//! Turns an assembled [`SymbolTable`] into the two generated Rust documents:
//! the static table with its insertion and lookup routines, and the test that
//! pins every emitted name hash.
//!
//! Rendering is pure string building; both outputs depend only on the table,
//! so identical input always renders byte-identical documents.

use crate::assemble::{BuiltinFunction, ConditionDispatch, HashBucket, LevelDispatch, SymbolTable};
use crate::identity::HashAssertion;
use crate::types::TypeDescriptor;

/// Names written into the header of generated documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitOptions {
	pub generator_name: String,
	pub source_name: String,
}

impl Default for EmitOptions {
	fn default() -> Self {
		Self {
			generator_name: "gen-builtins".to_string(),
			source_name: "builtin_function_declarations.txt".to_string(),
		}
	}
}

/// Line-oriented writer with tab indentation.
#[derive(Debug, Default)]
struct CodeWriter {
	out: String,
	depth: usize,
}

impl CodeWriter {
	fn line(&mut self, text: &str) {
		if !text.is_empty() {
			for _ in 0..self.depth {
				self.out.push('\t');
			}
			self.out.push_str(text);
		}
		self.out.push('\n');
	}

	fn blank(&mut self) {
		self.out.push('\n');
	}

	/// Writes `header` and indents until the matching [`Self::close`].
	fn open(&mut self, header: &str) {
		self.line(header);
		self.depth += 1;
	}

	fn close(&mut self, footer: &str) {
		self.depth = self.depth.saturating_sub(1);
		self.line(footer);
	}

	fn finish(self) -> String {
		self.out
	}
}

fn write_header(w: &mut CodeWriter, options: &EmitOptions, file_name: &str, description: &str) {
	w.line("// GENERATED FILE - DO NOT EDIT.");
	w.line(&format!(
		"// Generated by {} using data from {}.",
		options.generator_name, options.source_name
	));
	w.line("//");
	w.line(&format!("// {file_name}:"));
	w.line(&format!("//   {description}"));
	w.blank();
}

const RUST_KEYWORDS: &[&str] = &[
	"abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do", "dyn", "else", "enum",
	"extern", "false", "final", "fn", "for", "gen", "if", "impl", "in", "let", "loop", "macro", "match", "mod", "move",
	"mut", "override", "priv", "pub", "ref", "return", "static", "struct", "trait", "true", "try", "type", "typeof",
	"unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

/// Built-in names such as `mod` collide with Rust keywords.
fn ident(name: &str) -> String {
	if RUST_KEYWORDS.contains(&name) {
		format!("r#{name}")
	} else {
		name.to_string()
	}
}

fn static_type(ty: &TypeDescriptor) -> String {
	format!(
		"StaticType::new(BasicType::{}, Precision::{}, Qualifier::{}, {}, {})",
		ty.basic.name(),
		ty.precision.name(),
		ty.qualifier.name(),
		ty.primary_size,
		ty.secondary_size
	)
}

/// Renders the static symbol table document.
pub fn render_symbol_table(table: &SymbolTable, options: &EmitOptions) -> String {
	let mut w = CodeWriter::default();
	write_header(
		&mut w,
		options,
		"symbol_table_autogen.rs",
		"Compile-time initialized built-in function symbols.",
	);
	w.line("#![allow(non_upper_case_globals, non_snake_case)]");
	w.blank();
	w.line("use crate::gl::*;");
	w.line("use crate::immutable_string::ImmutableString;");
	w.line("use crate::static_type::{BasicType, Precision, Qualifier, StaticType};");
	w.line("use crate::symbol::{FunctionSymbol, TExtension, TOperator, UnmangledBuiltIn};");
	w.line("use crate::symbol_table::{Level, SymbolTable};");
	w.blank();

	write_ids(&mut w, table);
	write_names(&mut w, table);
	write_parameter_lists(&mut w, table);
	write_functions(&mut w, table);
	w.open("impl SymbolTable {");
	write_insertions(&mut w, table);
	w.close("}");
	w.blank();
	write_extensions(&mut w, table);
	w.open("impl SymbolTable {");
	write_dispatch(&mut w, &table.dispatch);
	w.close("}");
	w.finish()
}

fn write_ids(w: &mut CodeWriter, table: &SymbolTable) {
	w.open("pub mod builtin_id {");
	for function in &table.functions {
		w.line(&format!("pub const {}: i32 = {};", function.unique_key, function.id));
	}
	w.close("}");
	w.blank();
	w.line(&format!(
		"pub const LAST_STATIC_BUILTIN_ID: i32 = {};",
		table.last_builtin_id_value()
	));
	w.blank();
}

fn write_names(w: &mut CodeWriter, table: &SymbolTable) {
	w.open("pub mod builtin_name {");
	w.line("use super::ImmutableString;");
	w.blank();
	for name in &table.names {
		w.line(&format!(
			"pub const {}: ImmutableString = ImmutableString::from_static({:?});",
			ident(&name.ident),
			name.value
		));
	}
	w.close("}");
	w.blank();
}

fn write_parameter_lists(w: &mut CodeWriter, table: &SymbolTable) {
	w.open("pub mod builtin_parameters {");
	w.line("use super::*;");
	w.blank();
	for (name, params) in &table.parameter_lists {
		if params.is_empty() {
			w.line(&format!("pub static {name}: &[StaticType] = &[];"));
			continue;
		}
		w.open(&format!("pub static {name}: &[StaticType] = &["));
		for param in params {
			w.line(&format!("{},", static_type(param)));
		}
		w.close("];");
	}
	w.close("}");
	w.blank();
}

fn write_functions(w: &mut CodeWriter, table: &SymbolTable) {
	w.open("pub mod builtin_function {");
	w.line("use super::*;");
	w.blank();
	for function in &table.functions {
		write_function(w, function);
	}
	w.close("}");
	w.blank();
}

fn write_function(w: &mut CodeWriter, function: &BuiltinFunction) {
	w.open(&format!(
		"pub static kFunction_{}: FunctionSymbol = FunctionSymbol::new(",
		function.unique_key
	));
	w.line(&format!("builtin_id::{},", function.unique_key));
	w.line(&format!("&builtin_name::{},", ident(&function.name_with_suffix)));
	w.line(&format!("&builtin_name::{},", function.unique_key));
	w.line(&format!("TExtension::{},", function.extension));
	w.line(&format!("builtin_parameters::{},", function.parameter_list));
	w.line(&format!("{},", static_type(&function.return_type)));
	w.line(&format!("TOperator::{},", function.op));
	w.line(&format!("{},", function.known_to_not_have_side_effects));
	w.close(");");
}

fn write_insertions(w: &mut CodeWriter, table: &SymbolTable) {
	w.open("pub fn insert_builtin_functions(&mut self, shader_type: GLenum) {");
	let mut unguarded = None;
	for (condition, insertions) in &table.insertions {
		let Some(predicate) = condition.predicate() else {
			unguarded = Some(insertions);
			continue;
		};
		if insertions.is_empty() {
			continue;
		}
		w.open(&format!("if {predicate} {{"));
		for insertion in insertions {
			w.line(&format!(
				"self.insert_builtin(Level::{}, &builtin_function::kFunction_{});",
				insertion.level.name(),
				insertion.unique_key
			));
		}
		w.close("}");
	}
	let guarded = table
		.insertions
		.iter()
		.any(|(condition, insertions)| condition.predicate().is_some() && !insertions.is_empty());
	if !guarded {
		w.line("let _ = shader_type;");
	}
	for insertion in unguarded.into_iter().flatten() {
		w.line(&format!(
			"self.insert_builtin(Level::{}, &builtin_function::kFunction_{});",
			insertion.level.name(),
			insertion.unique_key
		));
	}
	w.close("}");
}

fn write_extensions(w: &mut CodeWriter, table: &SymbolTable) {
	w.open("pub mod unmangled_builtins {");
	w.line("use super::*;");
	w.blank();
	for extension in &table.extensions {
		w.line(&format!(
			"pub static {extension}: UnmangledBuiltIn = UnmangledBuiltIn::new(TExtension::{extension});"
		));
	}
	w.close("}");
	w.blank();
}

fn write_dispatch(w: &mut CodeWriter, dispatch: &[LevelDispatch]) {
	w.open(
		"pub fn get_unmangled_builtin_for_shader_version(&self, name: &ImmutableString, shader_version: i32) -> Option<&'static UnmangledBuiltIn> {",
	);
	let populated: Vec<&LevelDispatch> = dispatch.iter().filter(|level| !level.conditions.is_empty()).collect();
	if populated.is_empty() {
		w.line("let _ = (name, shader_version);");
		w.line("None");
		w.close("}");
		return;
	}

	let guarded = populated
		.iter()
		.flat_map(|level| &level.conditions)
		.any(|c| c.condition.predicate().is_some());
	if guarded {
		w.line("let shader_type = self.shader_type;");
	}
	w.line("let name_hash = name.hash32();");
	for level in populated {
		match level.level.version_predicate() {
			Some(predicate) => {
				w.open(&format!("if {predicate} {{"));
				write_conditions(w, &level.conditions);
				w.close("}");
			}
			None => write_conditions(w, &level.conditions),
		}
	}
	w.line("None");
	w.close("}");
}

fn write_conditions(w: &mut CodeWriter, conditions: &[ConditionDispatch]) {
	for dispatch in conditions {
		match dispatch.condition.predicate() {
			Some(predicate) => {
				w.open(&format!("if {predicate} {{"));
				write_buckets(w, &dispatch.buckets);
				w.close("}");
			}
			None => write_buckets(w, &dispatch.buckets),
		}
	}
}

fn write_buckets(w: &mut CodeWriter, buckets: &[HashBucket]) {
	w.open("match name_hash {");
	for bucket in buckets {
		w.open(&format!("0x{:08x} => {{", bucket.hash));
		for case in &bucket.cases {
			w.open(&format!("if *name == builtin_name::{} {{", ident(&case.name_with_suffix)));
			w.line(&format!("return Some(&unmangled_builtins::{});", case.extension));
			w.close("}");
		}
		w.close("}");
	}
	w.line("_ => {}");
	w.close("}");
}

/// Renders the document asserting every emitted name hash at runtime.
pub fn render_hash_tests(assertions: &[HashAssertion], options: &EmitOptions) -> String {
	let mut w = CodeWriter::default();
	write_header(
		&mut w,
		options,
		"immutable_string_test_autogen.rs",
		"Tests for matching script-generated hashes with runtime computed hashes.",
	);
	w.line("use crate::immutable_string::ImmutableString;");
	w.blank();
	w.line("#[test]");
	w.open("fn generate_hash_matches_runtime_hash() {");
	for assertion in assertions {
		w.line(&format!(
			"assert_eq!(0x{:08x}u32, ImmutableString::new({:?}).hash32());",
			assertion.hash, assertion.name
		));
	}
	w.close("}");
	w.finish()
}
