use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Default)]
#[command(name = "gen-builtins")]
#[command(about = "Generates the ESSL built-in symbol table from its declaration file")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
	/// Declaration source file
	#[arg(short, long, value_name = "PATH")]
	pub input: Option<PathBuf>,

	/// Destination of the generated symbol table
	#[arg(long, value_name = "PATH")]
	pub table_out: Option<PathBuf>,

	/// Destination of the generated hash tests
	#[arg(long, value_name = "PATH")]
	pub hash_tests_out: Option<PathBuf>,

	/// Also write the parsed declarations as JSON
	#[arg(long)]
	pub dump_intermediate_json: bool,

	/// Destination of the intermediate JSON
	#[arg(long, value_name = "PATH")]
	pub dump_path: Option<PathBuf>,

	/// TOML configuration file
	#[arg(short, long, value_name = "PATH")]
	pub config: Option<PathBuf>,

	/// Verbose logging
	#[arg(short, long)]
	pub verbose: bool,
}
