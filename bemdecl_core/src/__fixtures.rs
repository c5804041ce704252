use std::path::Path;
use std::path::PathBuf;

use crate::BemDecl;
use crate::BemModifier;
use crate::BemName;
use crate::DeclOptions;
use crate::Declaration;
use crate::IncludeResolver;
use crate::ResolverOptions;

pub(crate) fn prefixes() -> Vec<String> {
	DeclOptions::default().prefixes
}

/// A bare block mention, e.g. `b-foo`.
pub(crate) fn block(name: &str) -> BemName {
	BemName {
		block: name.to_string(),
		elem: None,
		modifier: None,
	}
}

/// An element mention, e.g. `b-foo__bar`.
pub(crate) fn elem(block: &str, elem: &str) -> BemName {
	BemName {
		block: block.to_string(),
		elem: Some(elem.to_string()),
		modifier: None,
	}
}

/// A boolean block modifier, e.g. `b-foo_visible`.
pub(crate) fn flag(block: &str, name: &str) -> BemName {
	BemName {
		block: block.to_string(),
		elem: None,
		modifier: Some(BemModifier {
			name: name.to_string(),
			value: None,
		}),
	}
}

/// A valued block modifier, e.g. `b-text_size_15`.
pub(crate) fn valued(block: &str, name: &str, value: &str) -> BemName {
	BemName {
		block: block.to_string(),
		elem: None,
		modifier: Some(BemModifier {
			name: name.to_string(),
			value: Some(value.to_string()),
		}),
	}
}

/// A boolean element modifier, e.g. `b-foo__bar_on`.
pub(crate) fn elem_flag(block: &str, elem: &str, name: &str) -> BemName {
	BemName {
		block: block.to_string(),
		elem: Some(elem.to_string()),
		modifier: Some(BemModifier {
			name: name.to_string(),
			value: None,
		}),
	}
}

/// A valued element modifier, e.g. `b-foo__bar_size_15`.
pub(crate) fn elem_valued(block: &str, elem: &str, name: &str, value: &str) -> BemName {
	BemName {
		block: block.to_string(),
		elem: Some(elem.to_string()),
		modifier: Some(BemModifier {
			name: name.to_string(),
			value: Some(value.to_string()),
		}),
	}
}

/// A merger with default options.
pub(crate) fn merger() -> BemDecl {
	BemDecl::new(DeclOptions::default()).unwrap_or_else(|e| panic!("merger: {e}"))
}

/// Declarations folded from a single scan of `text`.
pub(crate) fn decl_of(text: &str) -> Vec<Declaration> {
	let mut merger = merger();
	merger.parse(text);
	merger.decl()
}

/// JSON rendition of the declarations folded from `text`.
pub(crate) fn decl_json(text: &str) -> serde_json::Value {
	serde_json::to_value(decl_of(text)).unwrap_or_else(|e| panic!("serialize: {e}"))
}

/// Write `(relative path, content)` pairs under `dir`, creating parent
/// directories as needed.
pub(crate) fn write_tree(dir: &Path, files: &[(&str, &str)]) {
	for (path, content) in files {
		let target = dir.join(path);

		if let Some(parent) = target.parent() {
			std::fs::create_dir_all(parent).unwrap_or_else(|e| panic!("mkdir: {e}"));
		}

		std::fs::write(&target, content).unwrap_or_else(|e| panic!("write: {e}"));
	}
}

/// Write a reference chain `page.html -> c1.inc -> ... -> c<len>.inc` under
/// `dir`, each template including the next; the last file holds `tail`.
pub(crate) fn write_chain(dir: &Path, len: usize, tail: &str) {
	let mut files = vec![("page.html".to_string(), "[% INCLUDE c1.inc %]\n".to_string())];

	for index in 1..=len {
		let content = if index == len {
			tail.to_string()
		} else {
			format!("[% INCLUDE c{}.inc %]\n", index + 1)
		};

		files.push((format!("c{index}.inc"), content));
	}

	let borrowed: Vec<(&str, &str)> = files
		.iter()
		.map(|(path, content)| (path.as_str(), content.as_str()))
		.collect();
	write_tree(dir, &borrowed);
}

/// A resolver rooted at `dir` searching the given include directories.
pub(crate) fn resolver_at(dir: &Path, includes: &[&str]) -> IncludeResolver {
	let options = ResolverOptions {
		root: dir.to_path_buf(),
		includes: includes.iter().copied().map(PathBuf::from).collect(),
		..Default::default()
	};

	IncludeResolver::new(options).unwrap_or_else(|e| panic!("resolver: {e}"))
}
