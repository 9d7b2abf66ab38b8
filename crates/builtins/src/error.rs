use thiserror::Error;

use crate::types::GenericTag;

/// Errors that abort a generation run.
///
/// Every variant is fatal: the generator has no partial-success mode, so any
/// of these means no output documents are produced.
#[derive(Debug, Error)]
pub enum GenError {
	#[error("line {line}: GROUP END {found} does not close the open group {expected}")]
	StructuralMismatch { line: usize, expected: String, found: String },
	#[error("line {line}: {reason}: {text}")]
	UnexpectedInput { line: usize, reason: &'static str, text: String },
	#[error("unrecognized type: {token}")]
	UnrecognizedType { token: String },
	#[error("function {function} mixes generic type families {tags:?}")]
	ConflictingGenerics { function: String, tags: Vec<GenericTag> },
	#[error("function {function} does not define an op")]
	UndefinedOperator { function: String },
	#[error("function {function} does not define a level")]
	UndefinedLevel { function: String },
	#[error("line {line}: invalid metadata: {source}")]
	InvalidMetadata {
		line: usize,
		#[source]
		source: serde_json::Error,
	},
	#[error("failed to serialize intermediate declarations: {0}")]
	Dump(#[source] serde_json::Error),
}

impl GenError {
	pub(crate) fn unrecognized(token: impl Into<String>) -> Self {
		GenError::UnrecognizedType { token: token.into() }
	}
}

/// Result type for generator operations.
pub type Result<T> = std::result::Result<T, GenError>;
