use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use crate::BemdeclError;
use crate::BemdeclResult;

/// Options for [`flatten_path`].
#[derive(Clone, Debug)]
pub struct FlattenOptions {
	/// Prefix stripped from the path before flattening; empty keeps the
	/// path as given.
	pub root: PathBuf,
	/// Extension stripped from the final segment.
	pub ext: String,
	/// Separator joining the surviving segments.
	pub sep: String,
	/// Leading segments dropped after flattening.
	pub cut: usize,
}

impl Default for FlattenOptions {
	fn default() -> Self {
		Self {
			root: PathBuf::new(),
			ext: ".html".to_string(),
			sep: "-".to_string(),
			cut: 0,
		}
	}
}

/// Map a template path to a single flat token.
///
/// `templates/choose/index.html` becomes `templates-choose-index` with the
/// defaults; `cut` drops leading segments after flattening, so `cut: 1`
/// yields `choose-index`. The path must lie within `root`.
pub fn flatten_path(path: impl AsRef<Path>, options: &FlattenOptions) -> BemdeclResult<String> {
	let path = trim_curdir(path.as_ref());
	let root = trim_curdir(&options.root);
	let outside_root = || BemdeclError::OutsideRoot {
		path: path.display().to_string(),
		root: options.root.display().to_string(),
	};

	let relative = if root.as_os_str().is_empty() {
		path
	} else {
		path.strip_prefix(root).map_err(|_| outside_root())?
	};

	if relative.components().next() == Some(Component::ParentDir) {
		return Err(outside_root());
	}

	let mut segments: Vec<String> = relative
		.parent()
		.map(|dir| {
			dir.components()
				.filter_map(|component| match component {
					Component::Normal(segment) => {
						Some(segment.to_string_lossy().to_string())
					}
					_ => None,
				})
				.collect()
		})
		.unwrap_or_default();

	let name = relative
		.file_name()
		.map(|name| name.to_string_lossy().to_string())
		.unwrap_or_default();
	let stem = match name.strip_suffix(&options.ext) {
		Some(stem) if !stem.is_empty() => stem.to_string(),
		_ => name,
	};

	segments.push(stem);

	Ok(segments
		.into_iter()
		.skip(options.cut)
		.collect::<Vec<_>>()
		.join(&options.sep))
}

/// Strip a single leading `./` so `./templates/x` and `templates/x` flatten
/// to the same name.
pub(crate) fn trim_curdir(path: &Path) -> &Path {
	path.strip_prefix(".").unwrap_or(path)
}
