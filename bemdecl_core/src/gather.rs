use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use globset::Glob;
use globset::GlobSet;
use globset::GlobSetBuilder;

use crate::BemdeclResult;
use crate::FlattenOptions;
use crate::flatten::trim_curdir;
use crate::flatten_path;

/// Options for [`gather_files`].
#[derive(Clone, Debug)]
pub struct GatherOptions {
	/// Directory the source patterns are matched under.
	pub root: PathBuf,
	/// Directory generated artifacts land in.
	pub dest: PathBuf,
	/// Source extension stripped when flattening template names.
	pub ext: String,
	/// Extension appended to generated artifacts.
	pub out_ext: String,
	/// Separator for flattened names.
	pub sep: String,
	/// Leading segments dropped from flattened names.
	pub cut: usize,
}

impl Default for GatherOptions {
	fn default() -> Self {
		Self {
			root: PathBuf::from("."),
			dest: PathBuf::from("."),
			ext: ".html".to_string(),
			out_ext: ".bemdecl.js".to_string(),
			sep: "-".to_string(),
			cut: 0,
		}
	}
}

/// One template scheduled for processing.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TemplatePair {
	/// Template file to read.
	pub src: PathBuf,
	/// Artifact file to write.
	pub dst: PathBuf,
	/// Directory containing `dst`.
	pub dir: PathBuf,
}

/// Expand source glob patterns under the root into template pairs.
///
/// Patterns are matched against paths relative to `options.root`. A `!`
/// prefix subtracts matches from the result. Empty patterns are dropped,
/// duplicates collapse to their first occurrence and the result is sorted
/// by source path so repeated runs schedule templates in the same order.
pub fn gather_files(
	patterns: &[String],
	options: &GatherOptions,
) -> BemdeclResult<Vec<TemplatePair>> {
	let patterns = normalize_patterns(patterns);
	let mut include = GlobSetBuilder::new();
	let mut exclude = GlobSetBuilder::new();

	for pattern in &patterns {
		if let Some(negated) = pattern.strip_prefix('!') {
			exclude.add(Glob::new(negated)?);
		} else {
			include.add(Glob::new(pattern)?);
		}
	}

	let include = include.build()?;
	let exclude = exclude.build()?;
	let mut templates = vec![];
	walk_templates(&options.root, &options.root, &include, &exclude, &mut templates)?;
	templates.sort();

	templates
		.iter()
		.map(|src| pair_for_template(src, options))
		.collect()
}

/// Map one template file to its artifact pair.
///
/// The flattened name doubles as the artifact directory, so a template
/// flattening to `choose-index` lands at
/// `<dest>/choose-index/choose-index<out_ext>`.
pub fn pair_for_template(src: &Path, options: &GatherOptions) -> BemdeclResult<TemplatePair> {
	let flatten = FlattenOptions {
		root: options.root.clone(),
		ext: options.ext.clone(),
		sep: options.sep.clone(),
		cut: options.cut,
	};
	let name = flatten_path(src, &flatten)?;
	let dir = options.dest.join(&name);
	let dst = dir.join(format!("{name}{}", options.out_ext));

	Ok(TemplatePair { src: src.to_path_buf(), dst, dir })
}

/// Drop empty patterns and collapse duplicates to their first occurrence.
pub(crate) fn normalize_patterns(patterns: &[String]) -> Vec<String> {
	let mut seen = HashSet::new();

	patterns
		.iter()
		.filter(|pattern| !pattern.is_empty())
		.filter(|pattern| seen.insert(pattern.as_str()))
		.cloned()
		.collect()
}

fn walk_templates(
	root: &Path,
	dir: &Path,
	include: &GlobSet,
	exclude: &GlobSet,
	templates: &mut Vec<PathBuf>,
) -> BemdeclResult<()> {
	if !dir.is_dir() {
		return Ok(());
	}

	for entry in fs::read_dir(dir)? {
		let entry = entry?;
		let path = entry.path();

		if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
			// Hidden entries never hold templates.
			if name.starts_with('.') {
				continue;
			}
		}

		if path.is_dir() {
			walk_templates(root, &path, include, exclude, templates)?;
		} else if let Ok(relative) = path.strip_prefix(root) {
			if include.is_match(relative) && !exclude.is_match(relative) {
				templates.push(trim_curdir(&path).to_path_buf());
			}
		}
	}

	Ok(())
}
