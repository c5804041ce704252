use std::collections::HashSet;
use std::mem;

use serde::Serialize;
use serde::Serializer;
use serde::ser::SerializeMap;

use crate::BemModifier;
use crate::BemName;
use crate::BemNaming;
use crate::BemdeclResult;
use crate::DEFAULT_PREFIXES;

/// Options for [`BemDecl`].
#[derive(Clone, Debug)]
pub struct DeclOptions {
	/// Block prefixes recognized by the scanner.
	pub prefixes: Vec<String>,
	/// Allow-list of block names; empty means no restriction.
	pub allowed: Vec<String>,
	/// Emit extra diagnostics while scanning and folding.
	pub debug: bool,
}

impl Default for DeclOptions {
	fn default() -> Self {
		Self {
			prefixes: DEFAULT_PREFIXES
				.iter()
				.map(|prefix| (*prefix).to_string())
				.collect(),
			allowed: vec![],
			debug: false,
		}
	}
}

/// A single modifier value. `Flag` is the literal `true` a valueless
/// mention leaves behind when it shares a record with valued mentions.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ModVal {
	Flag,
	Str(String),
}

impl ModVal {
	fn from_modifier(modifier: &BemModifier) -> Self {
		match &modifier.value {
			Some(value) => Self::Str(value.clone()),
			None => Self::Flag,
		}
	}
}

/// Value state of one modifier record.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum ModValues {
	/// No value key on the wire; the record is just `{ "mod": name }`.
	#[default]
	None,
	/// `"val": value`
	Single(ModVal),
	/// `"vals": [value, ...]`
	Multi(Vec<ModVal>),
}

/// One named modifier inside a plural `mods` list.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ModRecord {
	pub name: String,
	pub values: ModValues,
}

impl ModRecord {
	fn new(modifier: &BemModifier) -> Self {
		Self {
			name: modifier.name.clone(),
			values: ModValues::Single(ModVal::from_modifier(modifier)),
		}
	}

	/// Record shape used when a singular elem modifier is recast as a list:
	/// a valueless incoming modifier keeps no value key at all there.
	fn scoped(modifier: &BemModifier) -> Self {
		let values = match &modifier.value {
			Some(value) => ModValues::Single(ModVal::Str(value.clone())),
			None => ModValues::None,
		};

		Self {
			name: modifier.name.clone(),
			values,
		}
	}

	/// Merge a further value seen for this record's modifier name. Repeated
	/// identical values are suppressed; a second distinct value promotes
	/// `val` to `vals`, preserving first-occurrence order.
	fn merge(&mut self, value: ModVal) {
		self.values = match mem::take(&mut self.values) {
			ModValues::None => match value {
				ModVal::Flag => ModValues::None,
				ModVal::Str(_) => ModValues::Multi(vec![ModVal::Flag, value]),
			},
			ModValues::Single(current) => {
				if current == value {
					ModValues::Single(current)
				} else {
					ModValues::Multi(vec![current, value])
				}
			}
			ModValues::Multi(mut values) => {
				if !values.contains(&value) {
					values.push(value);
				}

				ModValues::Multi(values)
			}
		};
	}
}

/// Modifier attachment of a declaration or elem record, in one of three
/// wire shapes: absent, `"mod": name`, or `"mods": [records]`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum ModField {
	#[default]
	None,
	Single(String),
	Plural(Vec<ModRecord>),
}

impl ModField {
	/// First modifier mention: valueless becomes the singular shape, valued
	/// starts a one-record plural list.
	fn new(modifier: &BemModifier) -> Self {
		match &modifier.value {
			Some(_) => Self::Plural(vec![ModRecord::new(modifier)]),
			None => Self::Single(modifier.name.clone()),
		}
	}
}

/// One elem inside a plural-of-records `elems` list.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ElemRecord {
	pub elem: String,
	pub mods: ModField,
}

impl ElemRecord {
	fn bare(elem: &str) -> Self {
		Self {
			elem: elem.to_string(),
			mods: ModField::None,
		}
	}

	fn with_modifier(elem: &str, modifier: &BemModifier) -> Self {
		Self {
			elem: elem.to_string(),
			mods: ModField::new(modifier),
		}
	}

	/// Apply one further modifier mention scoped to this elem. Same three
	/// shapes as the top level, with one pinned asymmetry: recasting a
	/// singular modifier next to a differently-named incoming one produces
	/// records without value keys (the top level demotes to `val: true`).
	fn apply_modifier(&mut self, modifier: &BemModifier) {
		self.mods = match mem::take(&mut self.mods) {
			ModField::None => ModField::new(modifier),
			ModField::Single(previous) => match &modifier.value {
				Some(value) if previous == modifier.name => {
					ModField::Plural(vec![ModRecord {
						name: previous,
						values: ModValues::Multi(vec![
							ModVal::Flag,
							ModVal::Str(value.clone()),
						]),
					}])
				}
				None if previous == modifier.name => ModField::Single(previous),
				_ => ModField::Plural(vec![
					ModRecord {
						name: previous,
						values: ModValues::None,
					},
					ModRecord::scoped(modifier),
				]),
			},
			ModField::Plural(mut records) => {
				match records
					.iter_mut()
					.find(|record| record.name == modifier.name)
				{
					Some(record) => record.merge(ModVal::from_modifier(modifier)),
					None => records.push(ModRecord::new(modifier)),
				}

				ModField::Plural(records)
			}
		};
	}
}

/// Elem attachment of a declaration: absent, `"elem": name`, or `"elems"`
/// as a list. The list holds plain strings until any elem in it acquires a
/// modifier, at which point the whole list is promoted to records.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum ElemField {
	#[default]
	None,
	Single(String),
	Plural(Vec<String>),
	Records(Vec<ElemRecord>),
}

/// One emitted record per distinct block, built by folding scanned names in
/// first-seen order.
///
/// Serialized shapes (key order is always `block`, elem field, mod field):
///
/// ```json
/// { "block": "b-foo" }
/// { "block": "b-foo", "elem": "bar" }
/// { "block": "b-foo", "elems": ["bar", "baz"] }
/// { "block": "b-foo", "elems": [{ "elem": "bar", "mod": "on" }] }
/// { "block": "b-foo", "mod": "visible" }
/// { "block": "b-foo", "mods": [{ "mod": "size", "val": "15" }] }
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Declaration {
	pub block: String,
	pub elems: ElemField,
	pub mods: ModField,
}

impl Declaration {
	fn new(block: String) -> Self {
		Self {
			block,
			elems: ElemField::None,
			mods: ModField::None,
		}
	}

	fn apply(&mut self, name: &BemName) {
		match (&name.elem, &name.modifier) {
			(Some(elem), Some(modifier)) => {
				tracing::trace!("fold {name}: elem+mod");
				self.apply_elem_modifier(elem, modifier);
			}
			(Some(elem), None) => {
				tracing::trace!("fold {name}: elem only");
				self.apply_elem(elem);
			}
			(None, Some(modifier)) => {
				tracing::trace!("fold {name}: mod only");
				self.apply_modifier(modifier);
			}
			(None, None) => {}
		}
	}

	/// A second distinct elem promotes the singular shape to a plural list;
	/// identical repeats never promote.
	fn apply_elem(&mut self, elem: &str) {
		self.elems = match mem::take(&mut self.elems) {
			ElemField::None => ElemField::Single(elem.to_string()),
			ElemField::Single(current) => {
				if current == elem {
					ElemField::Single(current)
				} else {
					ElemField::Plural(vec![current, elem.to_string()])
				}
			}
			ElemField::Plural(mut elems) => {
				if !elems.iter().any(|existing| existing == elem) {
					elems.push(elem.to_string());
				}

				ElemField::Plural(elems)
			}
			ElemField::Records(mut records) => {
				if !records.iter().any(|record| record.elem == elem) {
					records.push(ElemRecord::bare(elem));
				}

				ElemField::Records(records)
			}
		};
	}

	/// Top-level modifier rule. Recasting a singular modifier demotes it to
	/// `{ "mod": previous, "val": true }` next to the incoming record, even
	/// when both carry the same name and no value.
	fn apply_modifier(&mut self, modifier: &BemModifier) {
		self.mods = match mem::take(&mut self.mods) {
			ModField::None => ModField::new(modifier),
			ModField::Single(previous) => match &modifier.value {
				Some(value) if previous == modifier.name => {
					ModField::Plural(vec![ModRecord {
						name: previous,
						values: ModValues::Multi(vec![
							ModVal::Flag,
							ModVal::Str(value.clone()),
						]),
					}])
				}
				_ => ModField::Plural(vec![
					ModRecord {
						name: previous,
						values: ModValues::Single(ModVal::Flag),
					},
					ModRecord::new(modifier),
				]),
			},
			ModField::Plural(mut records) => {
				match records
					.iter_mut()
					.find(|record| record.name == modifier.name)
				{
					Some(record) => record.merge(ModVal::from_modifier(modifier)),
					None => records.push(ModRecord::new(modifier)),
				}

				ModField::Plural(records)
			}
		};
	}

	fn apply_elem_modifier(&mut self, elem: &str, modifier: &BemModifier) {
		self.elems = match mem::take(&mut self.elems) {
			ElemField::None => {
				ElemField::Records(vec![ElemRecord::with_modifier(elem, modifier)])
			}
			ElemField::Single(current) => {
				let mut records = vec![ElemRecord::bare(&current)];

				if current == elem {
					records[0].mods = ModField::new(modifier);
				} else {
					records.push(ElemRecord::with_modifier(elem, modifier));
				}

				ElemField::Records(records)
			}
			ElemField::Plural(elems) => {
				let mut records: Vec<ElemRecord> =
					elems.iter().map(|existing| ElemRecord::bare(existing)).collect();
				Self::apply_to_records(&mut records, elem, modifier);
				ElemField::Records(records)
			}
			ElemField::Records(mut records) => {
				Self::apply_to_records(&mut records, elem, modifier);
				ElemField::Records(records)
			}
		};
	}

	fn apply_to_records(records: &mut Vec<ElemRecord>, elem: &str, modifier: &BemModifier) {
		match records.iter_mut().find(|record| record.elem == elem) {
			Some(record) => record.apply_modifier(modifier),
			None => records.push(ElemRecord::with_modifier(elem, modifier)),
		}
	}
}

/// The declaration merger: scans text for BEM class names, gates them on
/// bare mentions and the allow-list, and folds the survivors into
/// [`Declaration`]s.
///
/// One instance serves a whole batch run. [`BemDecl::parse`] clears the
/// accumulated state on entry; when feeding candidates through
/// [`BemDecl::push`] directly, call [`BemDecl::clear`] between unrelated
/// inputs yourself.
#[derive(Debug)]
pub struct BemDecl {
	naming: BemNaming,
	allowed: Vec<String>,
	debug: bool,
	found: Vec<String>,
	stash: Vec<BemName>,
	seen: HashSet<String>,
}

impl BemDecl {
	pub fn new(options: DeclOptions) -> BemdeclResult<Self> {
		let naming = BemNaming::new(&options.prefixes)?;

		if options.debug {
			tracing::debug!("scanning for prefixes: {}", options.prefixes.join(", "));
		}

		Ok(Self {
			naming,
			allowed: options.allowed,
			debug: options.debug,
			found: vec![],
			stash: vec![],
			seen: HashSet::new(),
		})
	}

	/// Drop all accumulated state: raw matches, stashed names, seen set.
	pub fn clear(&mut self) {
		self.found.clear();
		self.stash.clear();
		self.seen.clear();
	}

	/// Scan a whole text, stashing every grammar match.
	pub fn parse(&mut self, text: &str) {
		self.clear();
		let matched = self.naming.matches(text);

		for candidate in &matched {
			self.push(candidate);
		}

		self.found = matched;

		if self.debug {
			tracing::debug!(
				"matched {} candidates, stashed {}",
				self.found.len(),
				self.stash.len()
			);
		}
	}

	/// Stash one candidate class name. Candidates failing the naming grammar
	/// are dropped silently. A bare mention registers its block in the seen
	/// set before any filtering, allow-list included.
	pub fn push(&mut self, candidate: &str) {
		let Some(name) = self.naming.parse(candidate) else {
			tracing::trace!("dropped candidate {candidate:?}");
			return;
		};

		if name.is_bare() {
			self.seen.insert(name.block.clone());
		}

		self.stash.push(name);
	}

	/// Raw matches of the last [`BemDecl::parse`] call.
	pub fn found(&self) -> &[String] {
		&self.found
	}

	/// Stashed names surviving the gates: block seen bare, block allowed,
	/// shape not broken, first occurrence of each exact shape.
	pub fn parsed(&self) -> Vec<BemName> {
		let mut unique = HashSet::new();

		self.stash
			.iter()
			.filter(|name| self.seen.contains(&name.block))
			.filter(|name| self.allowed.is_empty() || self.allowed.contains(&name.block))
			.filter(|name| !name.is_broken())
			.filter(|name| unique.insert(*name))
			.cloned()
			.collect()
	}

	/// Fold the eligible names into declarations, first-occurrence order.
	pub fn decl(&self) -> Vec<Declaration> {
		let names = self.parsed();
		let mut declarations: Vec<Declaration> = vec![];

		for name in &names {
			let index = match declarations
				.iter()
				.position(|existing| existing.block == name.block)
			{
				Some(index) => index,
				None => {
					declarations.push(Declaration::new(name.block.clone()));
					declarations.len() - 1
				}
			};
			declarations[index].apply(name);
		}

		if self.debug {
			tracing::debug!(
				"folded {} eligible names into {} declarations",
				names.len(),
				declarations.len()
			);
		}

		declarations
	}
}

fn serialize_mod_field<M>(mods: &ModField, map: &mut M) -> Result<(), M::Error>
where
	M: SerializeMap,
{
	match mods {
		ModField::None => Ok(()),
		ModField::Single(name) => map.serialize_entry("mod", name),
		ModField::Plural(records) => map.serialize_entry("mods", records),
	}
}

impl Serialize for Declaration {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		let mut map = serializer.serialize_map(None)?;
		map.serialize_entry("block", &self.block)?;

		match &self.elems {
			ElemField::None => {}
			ElemField::Single(elem) => map.serialize_entry("elem", elem)?,
			ElemField::Plural(elems) => map.serialize_entry("elems", elems)?,
			ElemField::Records(records) => map.serialize_entry("elems", records)?,
		}

		serialize_mod_field(&self.mods, &mut map)?;
		map.end()
	}
}

impl Serialize for ElemRecord {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		let mut map = serializer.serialize_map(None)?;
		map.serialize_entry("elem", &self.elem)?;
		serialize_mod_field(&self.mods, &mut map)?;
		map.end()
	}
}

impl Serialize for ModRecord {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		let mut map = serializer.serialize_map(None)?;
		map.serialize_entry("mod", &self.name)?;

		match &self.values {
			ModValues::None => {}
			ModValues::Single(value) => map.serialize_entry("val", value)?,
			ModValues::Multi(values) => map.serialize_entry("vals", values)?,
		}

		map.end()
	}
}

impl Serialize for ModVal {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		match self {
			ModVal::Flag => serializer.serialize_bool(true),
			ModVal::Str(value) => serializer.serialize_str(value),
		}
	}
}
