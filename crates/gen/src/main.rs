//! `gen-builtins`: compiles the built-in declaration file into the generated
//! symbol table and hash tests.
//!
//! Nothing is written unless the whole pipeline succeeds.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use essl_builtins::{EmitOptions, GenerateOptions, generate};
use tempfile::NamedTempFile;
use tracing::{debug, info};

mod cli;
mod config;

use cli::Cli;
use config::GenConfig;

fn main() -> Result<()> {
	let cli = Cli::parse();
	setup_tracing(cli.verbose);

	let config = match &cli.config {
		Some(path) => GenConfig::load(path).with_context(|| format!("loading config {}", path.display()))?,
		None => GenConfig::default(),
	}
	.with_cli(&cli);
	debug!(?config, "resolved configuration");

	let source = fs::read_to_string(&config.input)
		.with_context(|| format!("reading declarations from {}", config.input.display()))?;

	let options = GenerateOptions {
		emit: EmitOptions {
			generator_name: env!("CARGO_BIN_NAME").to_string(),
			source_name: config
				.input
				.file_name()
				.map(|name| name.to_string_lossy().into_owned())
				.unwrap_or_else(|| config.input.display().to_string()),
		},
		dump_intermediate: config.dump_intermediate_json,
	};
	let generated = generate(&source, &options)
		.with_context(|| format!("generating built-ins from {}", config.input.display()))?;

	let mut outputs = vec![
		(config.table_out.as_path(), generated.symbol_table.as_str()),
		(config.hash_tests_out.as_path(), generated.hash_tests.as_str()),
	];
	if let Some(json) = &generated.intermediate_json {
		outputs.push((config.dump_path.as_path(), json.as_str()));
	}
	write_outputs(&outputs)
}

/// Writes every document next to its destination first and only renames them
/// into place once all of them are staged.
fn write_outputs(outputs: &[(&Path, &str)]) -> Result<()> {
	let staged = outputs
		.iter()
		.map(|(path, contents)| stage_output(path, contents).map(|file| (file, *path, contents.len())))
		.collect::<Result<Vec<_>>>()?;

	for (file, path, bytes) in staged {
		file.persist(path).with_context(|| format!("writing {}", path.display()))?;
		info!(path = %path.display(), bytes, "wrote output");
	}
	Ok(())
}

fn stage_output(path: &Path, contents: &str) -> Result<NamedTempFile> {
	let parent = match path.parent() {
		Some(parent) if !parent.as_os_str().is_empty() => parent,
		_ => Path::new("."),
	};
	if !parent.exists() {
		fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
	}
	let mut file = NamedTempFile::new_in(parent).with_context(|| format!("staging {}", path.display()))?;
	file.write_all(contents.as_bytes())
		.with_context(|| format!("staging {}", path.display()))?;
	Ok(file)
}

fn setup_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;

	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		if verbose {
			EnvFilter::new("essl_builtins=debug,info")
		} else {
			EnvFilter::new("info")
		}
	});

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(false)
		.init();
}
