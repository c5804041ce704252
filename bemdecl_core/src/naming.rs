use std::fmt;

use regex::Regex;

use crate::BemdeclResult;

/// Default block prefixes: `b-` (block), `i-` (interactive), `l-` (layout).
pub const DEFAULT_PREFIXES: &[&str] = &["b", "i", "l"];

/// One name word: ASCII letters, digits, and hyphen.
const WORD: &str = "[-a-zA-Z0-9]+";

/// A modifier attached to a block or to one of its elems.
///
/// `value: None` is a valueless (boolean) modifier: `b-foo_visible` carries
/// the modifier `visible` with no value, `b-foo_size_15` carries `size`
/// with the value `15`.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct BemModifier {
	pub name: String,
	pub value: Option<String>,
}

impl BemModifier {
	pub fn is_boolean(&self) -> bool {
		self.value.is_none()
	}
}

/// One class name decomposed by the BEM naming grammar.
///
/// `block` is always present; a match without a block is impossible. A name
/// is *bare* when it carries neither elem nor modifier; bare mentions are
/// what register a block in the seen set.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct BemName {
	pub block: String,
	pub elem: Option<String>,
	pub modifier: Option<BemModifier>,
}

impl BemName {
	pub fn is_bare(&self) -> bool {
		self.elem.is_none() && self.modifier.is_none()
	}

	/// A name is broken when its elem or modifier name ends with a hyphen.
	/// That shape appears when a match stops at a template expression
	/// interpolated mid-identifier, e.g. `b-foo__bar-[% lang %]`.
	pub fn is_broken(&self) -> bool {
		let trailing = |name: &String| name.ends_with('-');
		self.elem.as_ref().is_some_and(trailing)
			|| self.modifier.as_ref().is_some_and(|m| trailing(&m.name))
	}
}

impl fmt::Display for BemName {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.block)?;

		if let Some(elem) = &self.elem {
			write!(f, "__{elem}")?;
		}

		if let Some(modifier) = &self.modifier {
			write!(f, "_{}", modifier.name)?;

			if let Some(value) = &modifier.value {
				write!(f, "_{value}")?;
			}
		}

		Ok(())
	}
}

/// The BEM naming grammar compiled for a set of block prefixes.
///
/// The pattern recognizes `PREFIX-word`, optionally followed by `__word`
/// (elem), optionally followed by up to two `_word` groups (modifier name,
/// then modifier value). A modifier name with no value group is a boolean
/// modifier.
#[derive(Debug)]
pub struct BemNaming {
	scan: Regex,
	exact: Regex,
}

impl BemNaming {
	pub fn new(prefixes: &[String]) -> BemdeclResult<Self> {
		let group = prefixes
			.iter()
			.map(|prefix| regex::escape(prefix))
			.collect::<Vec<_>>()
			.join("|");
		let body =
			format!("((?:{group})-{WORD})(?:__({WORD}))?(?:_({WORD}))?(?:_({WORD}))?");
		let scan = Regex::new(&format!(r"\b{body}"))?;
		let exact = Regex::new(&format!("^{body}$"))?;

		Ok(Self { scan, exact })
	}

	/// All raw grammar matches in `text`, in match order. Raw matches still
	/// need [`BemNaming::parse`] before they mean anything.
	pub fn matches(&self, text: &str) -> Vec<String> {
		self.scan
			.find_iter(text)
			.map(|found| found.as_str().to_string())
			.collect()
	}

	/// Decompose a full candidate string into a [`BemName`]. Returns `None`
	/// when the candidate does not match the grammar end to end.
	pub fn parse(&self, candidate: &str) -> Option<BemName> {
		let caps = self.exact.captures(candidate)?;
		let text = |index: usize| caps.get(index).map(|group| group.as_str().to_string());
		let modifier = text(3).map(|name| BemModifier { name, value: text(4) });

		Some(BemName {
			block: text(1)?,
			elem: text(2),
			modifier,
		})
	}
}
