//! # Type model
//!
//! Shader types as they appear in built-in function headers. A single
//! [`TypeDescriptor`] covers scalars, vectors, matrices, samplers and images;
//! placeholder types such as `genType` or `gsampler2D` carry a [`GenericTag`]
//! until the expander specializes them.
//!
//! ## Token grammar
//!
//! ```text
//! type      = ("out " | "inout ")? base
//! base      = scalar | vec | mat | gentype | sampler | gsampler | gvec
//! scalar    = "float" | "int" | "uint" | "bool" | "void" | "atomic_uint" | "yuvCscStandardEXT"
//! vec       = ("i" | "u" | "b")? "vec" ("2" | "3" | "4")?
//! mat       = "mat" size ("x" size)?
//! gentype   = "gen" ("I" | "U" | "B")? "Type"
//! sampler   = "sampler" ident
//! gsampler  = ("gsampler" | "gimage") ident
//! gvec      = "gvec3" | "gvec4"
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{GenError, Result};

#[cfg(test)]
mod tests;

static VEC_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^([iub]?)vec([234]?)$").expect("valid vec pattern"));
static MAT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^mat([234])(?:x([234]))?$").expect("valid mat pattern"));
static GEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^gen([IUB]?)Type$").expect("valid genType pattern"));

macro_rules! basic_kinds {
	($($variant:ident => $code:literal),* $(,)?) => {
		/// Scalar kinds and sampler/image families, paired with their mangled code.
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
		pub enum BasicKind {
			$($variant),*
		}

		impl BasicKind {
			/// Every known kind, in table order.
			pub const ALL: &'static [BasicKind] = &[$(BasicKind::$variant),*];

			/// The kind's name as used by the symbol-table runtime.
			pub fn name(self) -> &'static str {
				match self {
					$(BasicKind::$variant => stringify!($variant)),*
				}
			}

			/// The fixed one-to-three character code used in mangled names.
			pub fn mangled_code(self) -> &'static str {
				match self {
					$(BasicKind::$variant => $code),*
				}
			}

			/// Looks a kind up by its runtime name, e.g. `"ISampler2D"`.
			pub fn from_name(name: &str) -> Option<Self> {
				match name {
					$(stringify!($variant) => Some(BasicKind::$variant),)*
					_ => None,
				}
			}
		}
	};
}

basic_kinds! {
	Float => "f",
	Int => "i",
	UInt => "u",
	Bool => "b",
	Void => "v",
	AtomicCounter => "a",
	YuvCscStandardEXT => "y",
	Sampler2D => "s2",
	Sampler3D => "s3",
	SamplerCube => "sC",
	Sampler2DArray => "sA",
	SamplerExternalOES => "sX",
	SamplerExternal2DY2YEXT => "sY",
	Sampler2DRect => "sR",
	Sampler2DMS => "sM",
	ISampler2D => "is2",
	ISampler3D => "is3",
	ISamplerCube => "isC",
	ISampler2DArray => "isA",
	ISampler2DMS => "isM",
	USampler2D => "us2",
	USampler3D => "us3",
	USamplerCube => "usC",
	USampler2DArray => "usA",
	USampler2DMS => "usM",
	Sampler2DShadow => "s2s",
	SamplerCubeShadow => "sCs",
	Sampler2DArrayShadow => "sAs",
	Image2D => "I2",
	IImage2D => "iI2",
	UImage2D => "uI2",
	Image3D => "I3",
	IImage3D => "iI3",
	UImage3D => "uI3",
	Image2DArray => "IA",
	IImage2DArray => "iIA",
	UImage2DArray => "uIA",
	ImageCube => "Ic",
	IImageCube => "iIc",
	UImageCube => "uIc",
}

impl BasicKind {
	/// Maps a float-family kind to its counterpart in `family`.
	///
	/// The float scalar stands in for `gvecN` placeholders and maps to the
	/// family's scalar. Sampler and image kinds gain the family prefix, which
	/// fails for combinations the language lacks (e.g. integer shadow samplers).
	pub fn with_family(self, family: SamplerFamily) -> Option<Self> {
		match self {
			BasicKind::Float => Some(family.scalar()),
			_ => BasicKind::from_name(&format!("{}{}", family.prefix(), self.name())),
		}
	}

	fn from_prefix(prefix: &str) -> Option<Self> {
		match prefix {
			"" => Some(BasicKind::Float),
			"i" => Some(BasicKind::Int),
			"u" => Some(BasicKind::UInt),
			"b" => Some(BasicKind::Bool),
			_ => None,
		}
	}

	fn from_keyword(keyword: &str) -> Option<Self> {
		match keyword {
			"float" => Some(BasicKind::Float),
			"int" => Some(BasicKind::Int),
			"uint" => Some(BasicKind::UInt),
			"bool" => Some(BasicKind::Bool),
			"void" => Some(BasicKind::Void),
			"atomic_uint" => Some(BasicKind::AtomicCounter),
			"yuvCscStandardEXT" => Some(BasicKind::YuvCscStandardEXT),
			_ => None,
		}
	}
}

/// The sampler/image families a `gsampler`/`gimage` placeholder expands to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SamplerFamily {
	Float,
	Int,
	UInt,
}

impl SamplerFamily {
	/// Families in expansion order.
	pub const ALL: [SamplerFamily; 3] = [SamplerFamily::Float, SamplerFamily::Int, SamplerFamily::UInt];

	/// Prefix prepended to a float-family sampler or image kind name.
	pub fn prefix(self) -> &'static str {
		match self {
			SamplerFamily::Float => "",
			SamplerFamily::Int => "I",
			SamplerFamily::UInt => "U",
		}
	}

	fn scalar(self) -> BasicKind {
		match self {
			SamplerFamily::Float => BasicKind::Float,
			SamplerFamily::Int => BasicKind::Int,
			SamplerFamily::UInt => BasicKind::UInt,
		}
	}
}

/// Marks a descriptor as a placeholder that still needs specialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GenericTag {
	/// `vec`, `ivec`, `uvec`, `bvec`: any vector of size 2 to 4.
	#[serde(rename = "vector-generic")]
	Vector,
	/// `gsampler*`, `gimage*`, `gvecN`: float, int or uint family.
	#[serde(rename = "sampler-or-image-generic")]
	SamplerOrImage,
	/// `genType` and friends: scalar or vector of size 2 to 4.
	#[serde(rename = "full-generic")]
	Full,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Precision {
	#[default]
	Undefined,
	Low,
	Medium,
	High,
}

impl Precision {
	pub fn name(self) -> &'static str {
		match self {
			Precision::Undefined => "Undefined",
			Precision::Low => "Low",
			Precision::Medium => "Medium",
			Precision::High => "High",
		}
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Qualifier {
	#[default]
	In,
	Out,
	InOut,
}

impl Qualifier {
	pub fn name(self) -> &'static str {
		match self {
			Qualifier::In => "In",
			Qualifier::Out => "Out",
			Qualifier::InOut => "InOut",
		}
	}

	/// Marker prepended to a parameter in unique keys and parameter-list names.
	pub fn key_marker(self) -> &'static str {
		match self {
			Qualifier::In => "",
			Qualifier::Out => "o_",
			Qualifier::InOut => "io_",
		}
	}
}

/// One shader type.
///
/// `secondary_size > 1` denotes a matrix; every constructor here keeps the two
/// sizes consistent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawTypeDescriptor")]
pub struct TypeDescriptor {
	pub basic: BasicKind,
	pub primary_size: u8,
	pub secondary_size: u8,
	pub precision: Precision,
	pub qualifier: Qualifier,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub generic: Option<GenericTag>,
}

/// Structured form with optional sizes, normalized on the way in.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTypeDescriptor {
	basic: BasicKind,
	primary_size: Option<u8>,
	secondary_size: Option<u8>,
	#[serde(default)]
	precision: Precision,
	#[serde(default)]
	qualifier: Qualifier,
	#[serde(default)]
	generic: Option<GenericTag>,
}

impl TryFrom<RawTypeDescriptor> for TypeDescriptor {
	type Error = &'static str;

	fn try_from(raw: RawTypeDescriptor) -> std::result::Result<Self, Self::Error> {
		if raw.primary_size.is_none() && raw.secondary_size.is_some() {
			return Err("secondarySize set on a type without primarySize");
		}
		let primary_size = raw.primary_size.unwrap_or(1);
		let secondary_size = raw.secondary_size.unwrap_or(1);
		if primary_size == 0 || secondary_size == 0 {
			return Err("type sizes must be at least 1");
		}
		Ok(Self {
			basic: raw.basic,
			primary_size,
			secondary_size,
			precision: raw.precision,
			qualifier: raw.qualifier,
			generic: raw.generic,
		})
	}
}

impl TypeDescriptor {
	/// A scalar of the given kind.
	pub fn scalar(basic: BasicKind) -> Self {
		Self {
			basic,
			primary_size: 1,
			secondary_size: 1,
			precision: Precision::Undefined,
			qualifier: Qualifier::In,
			generic: None,
		}
	}

	/// A vector of `size` components.
	pub fn vector(basic: BasicKind, size: u8) -> Self {
		Self {
			primary_size: size,
			..Self::scalar(basic)
		}
	}

	/// A float matrix with `columns` x `rows` components.
	pub fn matrix(columns: u8, rows: u8) -> Self {
		Self {
			primary_size: columns,
			secondary_size: rows,
			..Self::scalar(BasicKind::Float)
		}
	}

	fn placeholder(basic: BasicKind, tag: GenericTag) -> Self {
		Self {
			generic: Some(tag),
			..Self::scalar(basic)
		}
	}

	/// Returns a copy carrying `qualifier`.
	pub fn with_qualifier(mut self, qualifier: Qualifier) -> Self {
		self.qualifier = qualifier;
		self
	}

	/// Parses a type token from a function header.
	///
	/// # Errors
	///
	/// Returns [`GenError::UnrecognizedType`] if the token matches no known form.
	pub fn parse(token: &str) -> Result<Self> {
		if let Some(rest) = token.strip_prefix("out ") {
			return Ok(Self::parse(rest)?.with_qualifier(Qualifier::Out));
		}
		if let Some(rest) = token.strip_prefix("inout ") {
			return Ok(Self::parse(rest)?.with_qualifier(Qualifier::InOut));
		}

		if let Some(basic) = BasicKind::from_keyword(token) {
			return Ok(Self::scalar(basic));
		}

		if let Some(caps) = VEC_RE.captures(token) {
			let basic = BasicKind::from_prefix(&caps[1]).ok_or_else(|| GenError::unrecognized(token))?;
			return Ok(match caps[2].parse::<u8>() {
				Ok(size) => Self::vector(basic, size),
				// `ivec` and friends stand for sizes 2 to 4.
				Err(_) => Self::placeholder(basic, GenericTag::Vector),
			});
		}

		if let Some(caps) = MAT_RE.captures(token) {
			let columns: u8 = caps[1].parse().map_err(|_| GenError::unrecognized(token))?;
			let rows = match caps.get(2) {
				Some(m) => m.as_str().parse().map_err(|_| GenError::unrecognized(token))?,
				None => columns,
			};
			return Ok(Self::matrix(columns, rows));
		}

		if let Some(caps) = GEN_RE.captures(token) {
			let basic = BasicKind::from_prefix(&caps[1].to_lowercase()).ok_or_else(|| GenError::unrecognized(token))?;
			return Ok(Self::placeholder(basic, GenericTag::Full));
		}

		if token.starts_with("sampler") {
			let basic = BasicKind::from_name(&capitalize(token)).ok_or_else(|| GenError::unrecognized(token))?;
			return Ok(Self::scalar(basic));
		}

		if token.starts_with("gsampler") || token.starts_with("gimage") {
			let basic = BasicKind::from_name(&capitalize(&token[1..])).ok_or_else(|| GenError::unrecognized(token))?;
			return Ok(Self::placeholder(basic, GenericTag::SamplerOrImage));
		}

		match token {
			"gvec3" => Ok(Self {
				primary_size: 3,
				..Self::placeholder(BasicKind::Float, GenericTag::SamplerOrImage)
			}),
			"gvec4" => Ok(Self {
				primary_size: 4,
				..Self::placeholder(BasicKind::Float, GenericTag::SamplerOrImage)
			}),
			_ => Err(GenError::unrecognized(token)),
		}
	}

	pub fn is_vector(&self) -> bool {
		self.primary_size > 1 && self.secondary_size == 1
	}

	pub fn is_matrix(&self) -> bool {
		self.secondary_size > 1
	}

	pub fn is_generic(&self) -> bool {
		self.generic.is_some()
	}

	/// Mangled token for this type, followed by `separator`.
	///
	/// Matrices emit both sizes, vectors their size, scalars nothing; the kind
	/// code always follows.
	pub fn mangled_token(&self, separator: char) -> String {
		let mut token = String::new();
		if self.is_matrix() {
			token.push_str(&self.primary_size.to_string());
			token.push_str(&self.secondary_size.to_string());
		} else if self.primary_size > 1 {
			token.push_str(&self.primary_size.to_string());
		}
		token.push_str(self.basic.mangled_code());
		token.push(separator);
		token
	}

	/// Resolves a sampler-or-image placeholder for one family.
	///
	/// Non-generic descriptors and other generic tags are returned unchanged.
	///
	/// # Errors
	///
	/// Returns [`GenError::UnrecognizedType`] when the family has no such
	/// sampler or image kind.
	pub fn specialize_for_sampler_family(&self, family: SamplerFamily) -> Result<Self> {
		if self.generic != Some(GenericTag::SamplerOrImage) {
			return Ok(self.clone());
		}
		let basic = self
			.basic
			.with_family(family)
			.ok_or_else(|| GenError::unrecognized(format!("{}{}", family.prefix(), self.basic.name())))?;
		let primary_size = if self.basic == BasicKind::Float { self.primary_size } else { 1 };
		Ok(Self {
			basic,
			primary_size,
			secondary_size: 1,
			precision: Precision::Undefined,
			qualifier: self.qualifier,
			generic: None,
		})
	}

	/// Resolves a size placeholder to a vector of `size` (a scalar for 1).
	///
	/// Non-generic descriptors and sampler-or-image placeholders are returned
	/// unchanged.
	pub fn specialize_for_dimension(&self, size: u8) -> Self {
		match self.generic {
			Some(GenericTag::Vector | GenericTag::Full) => Self {
				basic: self.basic,
				primary_size: size,
				secondary_size: 1,
				precision: self.precision,
				qualifier: self.qualifier,
				generic: None,
			},
			_ => self.clone(),
		}
	}
}

impl FromStr for TypeDescriptor {
	type Err = GenError;

	fn from_str(s: &str) -> Result<Self> {
		Self::parse(s)
	}
}

impl fmt::Display for TypeDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.generic {
			Some(tag) => write!(f, "{}<{:?}>", self.basic.name(), tag),
			None if self.is_matrix() => write!(f, "{}{}x{}", self.basic.name(), self.primary_size, self.secondary_size),
			None if self.primary_size > 1 => write!(f, "{}{}", self.basic.name(), self.primary_size),
			None => f.write_str(self.basic.name()),
		}
	}
}

pub(crate) fn capitalize(s: &str) -> String {
	let mut chars = s.chars();
	match chars.next() {
		Some(first) => first.to_uppercase().chain(chars).collect(),
		None => String::new(),
	}
}
