//! Generator configuration.
//!
//! Settings come from three layers, highest precedence first: command-line
//! flags, an optional TOML file, and built-in defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::cli::Cli;

/// Declaration file shipped with the library crate.
const BUNDLED_DECLARATIONS: &str = concat!(
	env!("CARGO_MANIFEST_DIR"),
	"/../builtins/data/builtin_function_declarations.txt"
);

/// Errors that can occur while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("failed to read config file: {0}")]
	Read(#[from] std::io::Error),
	#[error("failed to parse config file: {0}")]
	Parse(#[from] toml::de::Error),
}

/// Resolved generator settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenConfig {
	pub input: PathBuf,
	pub table_out: PathBuf,
	pub hash_tests_out: PathBuf,
	pub dump_intermediate_json: bool,
	pub dump_path: PathBuf,
}

impl Default for GenConfig {
	fn default() -> Self {
		Self {
			input: PathBuf::from(BUNDLED_DECLARATIONS),
			table_out: PathBuf::from("symbol_table_autogen.rs"),
			hash_tests_out: PathBuf::from("immutable_string_test_autogen.rs"),
			dump_intermediate_json: false,
			dump_path: PathBuf::from("builtin_functions.json"),
		}
	}
}

impl GenConfig {
	/// Parses a TOML document; absent keys keep their defaults.
	pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(source)?)
	}

	pub fn load(path: &Path) -> Result<Self, ConfigError> {
		Self::from_toml(&fs::read_to_string(path)?)
	}

	/// Applies command-line overrides on top of this configuration.
	pub fn with_cli(mut self, cli: &Cli) -> Self {
		if let Some(input) = &cli.input {
			self.input = input.clone();
		}
		if let Some(table_out) = &cli.table_out {
			self.table_out = table_out.clone();
		}
		if let Some(hash_tests_out) = &cli.hash_tests_out {
			self.hash_tests_out = hash_tests_out.clone();
		}
		if let Some(dump_path) = &cli.dump_path {
			self.dump_path = dump_path.clone();
		}
		self.dump_intermediate_json |= cli.dump_intermediate_json;
		self
	}
}
