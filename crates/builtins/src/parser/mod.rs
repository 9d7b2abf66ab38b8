//! # Declaration parser
//!
//! Turns the line-oriented declaration DSL into a tree of named groups.
//!
//! ## Supported syntax
//!
//! ```text
//! line      = group-begin | group-end | defaults | signature
//! group-begin = "GROUP BEGIN " name (" " json)?
//! group-end   = "GROUP END " name
//! defaults    = "DEFAULT METADATA " json
//! signature   = type " " name "(" (type ("," type)*)? ");" (" " json)?
//! ```
//!
//! Blank lines and `//` comments are skipped. Default metadata applies to every
//! signature that follows it, until the next `DEFAULT METADATA` line or the end
//! of the enclosing top-level group.

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace, warn};

use crate::error::{GenError, Result};
use crate::metadata::{GroupMetadata, Metadata};
use crate::types::TypeDescriptor;

#[cfg(test)]
mod tests;

static SIGNATURE_RE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^(\w+) (\w+)\((.*)\);(?:\s*(\{.*\}))?$").expect("valid signature pattern"));

const GROUP_BEGIN: &str = "GROUP BEGIN ";
const GROUP_END: &str = "GROUP END ";
const DEFAULT_METADATA: &str = "DEFAULT METADATA";

/// One built-in function declaration, possibly generic.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDecl {
	pub name: String,
	pub return_type: TypeDescriptor,
	pub parameters: Vec<TypeDescriptor>,
	#[serde(flatten)]
	pub metadata: Metadata,
	/// Source line, for diagnostics.
	#[serde(skip)]
	pub line: usize,
}

impl FunctionDecl {
	/// The function name with its metadata suffix appended.
	pub fn name_with_suffix(&self) -> String {
		format!("{}{}", self.name, self.metadata.suffix())
	}
}

/// A named collection of declarations with an optional activation condition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group {
	pub name: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub condition: Option<String>,
	pub functions: Vec<FunctionDecl>,
	#[serde(skip_serializing_if = "IndexMap::is_empty")]
	pub subgroups: IndexMap<String, Group>,
}

impl Group {
	fn new(name: String, metadata: GroupMetadata) -> Self {
		Self {
			name,
			condition: metadata.condition,
			functions: Vec::new(),
			subgroups: IndexMap::new(),
		}
	}

	/// Total declarations in this group and all of its subgroups.
	pub fn function_count(&self) -> usize {
		self.functions.len() + self.subgroups.values().map(Group::function_count).sum::<usize>()
	}
}

/// The parsed registry: top-level groups in source order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Declarations {
	pub groups: IndexMap<String, Group>,
}

impl Declarations {
	/// Serializes the tree for inspection.
	pub fn to_json(&self) -> Result<String> {
		serde_json::to_string_pretty(self).map_err(GenError::Dump)
	}
}

/// Explicit parser state: the open-group stack and the active defaults.
#[derive(Debug, Default)]
struct ParserContext {
	stack: Vec<Group>,
	default_metadata: Metadata,
	finished: IndexMap<String, Group>,
	last_line: usize,
}

impl ParserContext {
	fn begin_group(&mut self, line: usize, rest: &str) -> Result<()> {
		let rest = rest.trim();
		let (name, metadata) = match rest.split_once(' ') {
			Some((name, json)) => (name, parse_json::<GroupMetadata>(line, json)?),
			None => (rest, GroupMetadata::default()),
		};
		trace!(line, group = name, depth = self.stack.len(), "group begin");
		self.stack.push(Group::new(name.to_string(), metadata));
		Ok(())
	}

	fn end_group(&mut self, line: usize, text: &str, name: &str) -> Result<()> {
		let name = name.trim();
		let Some(group) = self.stack.pop() else {
			return Err(GenError::UnexpectedInput {
				line,
				reason: "GROUP END without an open group",
				text: text.to_string(),
			});
		};
		if group.name != name {
			return Err(GenError::StructuralMismatch {
				line,
				expected: group.name,
				found: name.to_string(),
			});
		}

		match self.stack.last_mut() {
			Some(parent) => {
				trace!(line, group = name, parent = %parent.name, "subgroup end");
				parent.subgroups.insert(group.name.clone(), group);
			}
			None => {
				debug!(group = name, functions = group.function_count(), "top-level group parsed");
				self.default_metadata = Metadata::default();
				if let Some(previous) = self.finished.insert(group.name.clone(), group) {
					warn!(group = %previous.name, "top-level group redefined; keeping the later one");
				}
			}
		}
		Ok(())
	}

	fn set_defaults(&mut self, line: usize, json: &str) -> Result<()> {
		self.default_metadata = parse_json(line, json.trim())?;
		Ok(())
	}

	fn add_function(&mut self, line: usize, text: &str, caps: &regex::Captures<'_>) -> Result<()> {
		if self.stack.is_empty() {
			return Err(GenError::UnexpectedInput {
				line,
				reason: "function declared outside of any group",
				text: text.to_string(),
			});
		}

		let explicit = match caps.get(4) {
			Some(json) => parse_json::<Metadata>(line, json.as_str())?,
			None => Metadata::default(),
		};
		let decl = FunctionDecl {
			name: caps[2].to_string(),
			return_type: TypeDescriptor::parse(&caps[1])?,
			parameters: parse_parameters(&caps[3])?,
			metadata: explicit.merged_over(&self.default_metadata),
			line,
		};

		if let Some(group) = self.stack.last_mut() {
			group.functions.push(decl);
		}
		Ok(())
	}

	fn line(&mut self, line: usize, text: &str) -> Result<()> {
		self.last_line = line;
		if let Some(rest) = text.strip_prefix(GROUP_BEGIN) {
			self.begin_group(line, rest)
		} else if let Some(rest) = text.strip_prefix(GROUP_END) {
			self.end_group(line, text, rest)
		} else if let Some(rest) = text.strip_prefix(DEFAULT_METADATA) {
			self.set_defaults(line, rest)
		} else if let Some(caps) = SIGNATURE_RE.captures(text) {
			self.add_function(line, text, &caps)
		} else {
			Err(GenError::UnexpectedInput {
				line,
				reason: "unexpected function input line",
				text: text.to_string(),
			})
		}
	}

	fn finish(self) -> Result<Declarations> {
		if let Some(open) = self.stack.last() {
			return Err(GenError::UnexpectedInput {
				line: self.last_line,
				reason: "end of input inside group",
				text: open.name.clone(),
			});
		}
		Ok(Declarations { groups: self.finished })
	}
}

/// Parses a whole declaration document.
///
/// # Errors
///
/// Fails on the first malformed line; no partial tree is returned.
pub fn parse_declarations(source: &str) -> Result<Declarations> {
	let mut ctx = ParserContext::default();
	for (index, raw) in source.lines().enumerate() {
		let text = raw.trim();
		if text.is_empty() || text.starts_with("//") {
			continue;
		}
		ctx.line(index + 1, text)?;
	}
	ctx.finish()
}

fn parse_parameters(list: &str) -> Result<Vec<TypeDescriptor>> {
	if list.trim().is_empty() {
		return Ok(Vec::new());
	}
	list.split(',').map(|param| TypeDescriptor::parse(param.trim())).collect()
}

fn parse_json<T: DeserializeOwned>(line: usize, json: &str) -> Result<T> {
	serde_json::from_str(json).map_err(|source| GenError::InvalidMetadata { line, source })
}
