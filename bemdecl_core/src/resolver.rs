use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::ops::Range;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use regex::Regex;

use crate::BemdeclError;
use crate::BemdeclResult;

/// Depth limit for chains of distinct includes. The seen set already breaks
/// cycles; the limit converts a runaway chain into a reported failure.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Keyword, whitespace, lenient quoting: either quote may be single, double,
/// or missing, and the two need not match each other.
const DIRECTIVE_PATTERN: &str =
	r#"\b(INCLUDE|PROCESS)\s+(?:["'])?([a-zA-Z0-9.\-\/,~_@]+)(?:["'])?"#;

/// Options for [`IncludeResolver`].
#[derive(Clone, Debug)]
pub struct ResolverOptions {
	/// Emit extra diagnostics while resolving.
	pub debug: bool,
	/// Base directory the include directories are resolved against.
	pub root: PathBuf,
	/// Ordered include search directories.
	pub includes: Vec<PathBuf>,
	/// Recursion limit for chains of distinct includes.
	pub max_depth: usize,
}

impl Default for ResolverOptions {
	fn default() -> Self {
		Self {
			debug: false,
			root: PathBuf::from("."),
			includes: vec![PathBuf::from("./")],
			max_depth: DEFAULT_MAX_DEPTH,
		}
	}
}

/// Directive keyword of one include token.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Keyword {
	Include,
	Process,
}

impl Keyword {
	fn parse(text: &str) -> Option<Self> {
		match text {
			"INCLUDE" => Some(Self::Include),
			"PROCESS" => Some(Self::Process),
			_ => None,
		}
	}
}

impl fmt::Display for Keyword {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Keyword::Include => write!(f, "INCLUDE"),
			Keyword::Process => write!(f, "PROCESS"),
		}
	}
}

/// One directive match recorded during a resolver walk.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IncludeToken {
	/// Byte range of the whole directive match in its containing text.
	pub pos: Range<usize>,
	pub keyword: Keyword,
	/// Referenced path exactly as written.
	pub path: String,
	/// First include directory hit, or `None` when nothing matched.
	pub resolved: Option<PathBuf>,
	/// Full text of the resolved file, or a placeholder comment when
	/// unresolved.
	pub content: String,
	/// Label of the containing file, for error reporting.
	pub parent: String,
}

/// The include resolver: scans a template for `INCLUDE`/`PROCESS`
/// directives, resolves each referenced path against the configured include
/// directories, and inlines every distinct reference exactly once across the
/// whole recursive walk.
///
/// State lives per top-level [`IncludeResolver::parse`] call; the seen set
/// and stash are shared across the recursion inside one call and reset at
/// the start of the next.
#[derive(Debug)]
pub struct IncludeResolver {
	debug: bool,
	includes: Vec<PathBuf>,
	max_depth: usize,
	directive: Regex,
	stash: Vec<IncludeToken>,
	seen: HashSet<String>,
	fails: Vec<String>,
}

impl IncludeResolver {
	pub fn new(options: ResolverOptions) -> BemdeclResult<Self> {
		let root = normalize(&std::path::absolute(&options.root)?);
		let includes = options
			.includes
			.iter()
			.map(|dir| {
				if dir.is_absolute() {
					normalize(dir)
				} else {
					normalize(&root.join(dir))
				}
			})
			.collect::<Vec<_>>();
		let directive = Regex::new(DIRECTIVE_PATTERN)?;

		if options.debug {
			tracing::debug!("include directories: {includes:?}");
		}

		Ok(Self {
			debug: options.debug,
			includes,
			max_depth: options.max_depth,
			directive,
			stash: vec![],
			seen: HashSet::new(),
			fails: vec![],
		})
	}

	/// Drop all per-parse state: stash, seen set, error list.
	pub fn clear(&mut self) {
		self.stash.clear();
		self.seen.clear();
		self.fails.clear();
	}

	/// Search the include directories in order; first hit wins.
	pub fn resolve_path(&self, file: &str) -> Option<PathBuf> {
		self.includes.iter().find_map(|dir| {
			let candidate = dir.join(file);
			candidate.is_file().then_some(candidate)
		})
	}

	/// Tokens recorded by the last [`IncludeResolver::parse`] call.
	pub fn found(&self) -> &[IncludeToken] {
		&self.stash
	}

	/// Error messages collected by the last [`IncludeResolver::parse`] call;
	/// empty when it succeeded or none has run.
	pub fn errors(&self) -> &[String] {
		&self.fails
	}

	/// Resolve a template file into its fully inlined text.
	///
	/// Soft failures — empty path, missing file, empty file, unresolved
	/// references — return `Ok(None)` and leave messages in
	/// [`IncludeResolver::errors`]; no partial output is produced. Depth and
	/// I/O failures are fatal. On success the returned text is the template
	/// followed by every inlined file in walk order, each preceded by an
	/// annotation naming its parent, match position, and resolved path.
	pub fn parse(&mut self, template: impl AsRef<Path>) -> BemdeclResult<Option<String>> {
		self.clear();
		let template = template.as_ref();

		if template.as_os_str().is_empty() {
			self.fails.push("template path is empty".to_string());
			return Ok(None);
		}

		if !template.is_file() {
			self.fails
				.push(format!("template does not exist: {}", template.display()));
			return Ok(None);
		}

		let text = fs::read_to_string(template)?;

		if text.is_empty() {
			self.fails
				.push(format!("template is empty: {}", template.display()));
			return Ok(None);
		}

		let label = template.display().to_string();
		self.process_template(&text, &label, 0)?;

		let unresolved = self
			.stash
			.iter()
			.filter(|token| token.resolved.is_none())
			.map(|token| {
				format!(
					"{} @ pos {}: \"{} {}\"",
					token.parent, token.pos.start, token.keyword, token.path
				)
			})
			.collect::<Vec<_>>();

		if !unresolved.is_empty() {
			self.fails = unresolved;
			return Ok(None);
		}

		let mut merged = text;

		for token in &self.stash {
			if let Some(resolved) = &token.resolved {
				merged.push_str(&format!(
					"\n<!--\n parent: {} @ pos {}\n resolved: {}\n-->\n",
					token.parent,
					token.pos.start,
					resolved.display()
				));
				merged.push_str(&token.content);
			}
		}

		Ok(Some(merged))
	}

	/// Depth-first, left-to-right walk. The first directive naming a path
	/// anywhere in the walk claims it; every later directive naming the same
	/// path is skipped. Children of a resolved include are recorded before
	/// the include itself.
	fn process_template(&mut self, text: &str, parent: &str, depth: usize) -> BemdeclResult<()> {
		if depth >= self.max_depth {
			return Err(BemdeclError::DepthExceeded {
				parent: parent.to_string(),
				limit: self.max_depth,
			});
		}

		for (pos, keyword, path) in self.matches(text) {
			if !self.seen.insert(path.clone()) {
				tracing::trace!("skipping seen reference {path:?}");
				continue;
			}

			let resolved = self.resolve_path(&path);

			if self.debug {
				tracing::debug!("{keyword} {path} -> {resolved:?} (depth {depth})");
			}

			let content = match &resolved {
				None => format!("<!-- not resolved: \"{path}\" -->"),
				Some(target) => {
					let content = fs::read_to_string(target)?;

					if content.contains("INCLUDE") || content.contains("PROCESS") {
						let label = target.display().to_string();
						self.process_template(&content, &label, depth + 1)?;
					}

					content
				}
			};

			self.stash.push(IncludeToken {
				pos,
				keyword,
				path,
				resolved,
				content,
				parent: parent.to_string(),
			});
		}

		Ok(())
	}

	fn matches(&self, text: &str) -> Vec<(Range<usize>, Keyword, String)> {
		self.directive
			.captures_iter(text)
			.filter_map(|caps| {
				let whole = caps.get(0)?;
				let keyword = Keyword::parse(caps.get(1)?.as_str())?;
				let path = caps.get(2)?.as_str().to_string();
				Some((whole.start()..whole.end(), keyword, path))
			})
			.collect()
	}
}

/// Lexical normalization: drops `.` segments and folds `..` into their
/// parent, without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
	let mut normalized = PathBuf::new();

	for component in path.components() {
		match component {
			Component::CurDir => {}
			Component::ParentDir => {
				if !normalized.pop() && !path.is_absolute() {
					normalized.push("..");
				}
			}
			other => normalized.push(other.as_os_str()),
		}
	}

	normalized
}
