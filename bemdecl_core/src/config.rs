use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::BemdeclError;
use crate::BemdeclResult;
use crate::DeclOptions;
use crate::GatherOptions;
use crate::ResolverOptions;
use crate::naming::DEFAULT_PREFIXES;
use crate::resolver::DEFAULT_MAX_DEPTH;

/// Config file names probed under the project root, highest precedence
/// first.
pub const CONFIG_FILE_CANDIDATES: [&str; 3] =
	["bemdecl.toml", ".bemdecl.toml", ".config/bemdecl.toml"];

/// Configuration loaded from a `bemdecl.toml` file.
///
/// ```toml
/// root = "site"
/// includes = ["templates", "blocks"]
/// prefixes = ["b", "i", "l"]
/// allowed = ["b-text", "b-dropdown"]
/// src = ["templates/**/*.html", "!templates/draft/**"]
/// dest = "bem"
/// indent_size = 4
/// max_depth = 10
/// ```
///
/// Every field has a default, so an empty file is a valid config. `root` is
/// resolved against the project directory; `dest` is resolved against
/// `root`.
#[derive(Debug, Clone, Deserialize)]
pub struct BemdeclConfig {
	/// Directory templates live under, relative to the project directory.
	#[serde(default = "default_root")]
	pub root: PathBuf,
	/// Directories searched for include targets, in priority order,
	/// relative to `root`.
	#[serde(default = "default_includes")]
	pub includes: Vec<PathBuf>,
	/// Block prefixes recognized by the scanner.
	#[serde(default = "default_prefixes")]
	pub prefixes: Vec<String>,
	/// Allow-list of block names. Empty admits every block.
	#[serde(default)]
	pub allowed: Vec<String>,
	/// Source glob patterns expanded under `root`; `!` negates.
	#[serde(default)]
	pub src: Vec<String>,
	/// Directory generated artifacts land in, relative to `root`.
	#[serde(default)]
	pub dest: PathBuf,
	/// Source extension stripped when flattening template names.
	#[serde(default = "default_ext")]
	pub ext: String,
	/// Extension appended to generated artifacts.
	#[serde(default = "default_out_ext")]
	pub out_ext: String,
	/// Separator joining flattened path segments.
	#[serde(default = "default_sep")]
	pub sep: String,
	/// Leading segments dropped from flattened names.
	#[serde(default)]
	pub cut: usize,
	/// Spaces per indentation level in generated artifacts.
	#[serde(default = "default_indent_size")]
	pub indent_size: usize,
	/// Include recursion limit.
	#[serde(default = "default_max_depth")]
	pub max_depth: usize,
	/// Emit scanner and fold diagnostics while processing.
	#[serde(default)]
	pub debug: bool,
}

impl BemdeclConfig {
	/// First candidate under `root` that exists as a file.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Read and parse the discovered config file under `root`.
	/// Returns `None` when no candidate exists.
	pub fn load(root: &Path) -> BemdeclResult<Option<BemdeclConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&config_path)?;
		let config: BemdeclConfig =
			toml::from_str(&content).map_err(|e| BemdeclError::ConfigParse(e.to_string()))?;

		Ok(Some(config))
	}

	/// The template root resolved against the project directory.
	#[must_use]
	pub fn template_root(&self, project: &Path) -> PathBuf {
		if self.root.is_absolute() {
			self.root.clone()
		} else {
			project.join(&self.root)
		}
	}

	/// Scanner and fold options for [`crate::BemDecl`].
	#[must_use]
	pub fn decl_options(&self) -> DeclOptions {
		DeclOptions {
			prefixes: self.prefixes.clone(),
			allowed: self.allowed.clone(),
			debug: self.debug,
		}
	}

	/// Include-resolution options for [`crate::IncludeResolver`].
	#[must_use]
	pub fn resolver_options(&self, project: &Path) -> ResolverOptions {
		ResolverOptions {
			debug: self.debug,
			root: self.template_root(project),
			includes: self.includes.clone(),
			max_depth: self.max_depth,
		}
	}

	/// Template discovery options for [`crate::gather_files`].
	#[must_use]
	pub fn gather_options(&self, project: &Path) -> GatherOptions {
		let root = self.template_root(project);
		let dest = if self.dest.is_absolute() {
			self.dest.clone()
		} else {
			root.join(&self.dest)
		};

		GatherOptions {
			root,
			dest,
			ext: self.ext.clone(),
			out_ext: self.out_ext.clone(),
			sep: self.sep.clone(),
			cut: self.cut,
		}
	}
}

impl Default for BemdeclConfig {
	fn default() -> Self {
		Self {
			root: default_root(),
			includes: default_includes(),
			prefixes: default_prefixes(),
			allowed: vec![],
			src: vec![],
			dest: PathBuf::new(),
			ext: default_ext(),
			out_ext: default_out_ext(),
			sep: default_sep(),
			cut: 0,
			indent_size: default_indent_size(),
			max_depth: default_max_depth(),
			debug: false,
		}
	}
}

fn default_root() -> PathBuf {
	PathBuf::from(".")
}

fn default_includes() -> Vec<PathBuf> {
	vec![PathBuf::from(".")]
}

fn default_prefixes() -> Vec<String> {
	DEFAULT_PREFIXES.iter().map(ToString::to_string).collect()
}

fn default_ext() -> String {
	".html".to_string()
}

fn default_out_ext() -> String {
	".bemdecl.js".to_string()
}

fn default_sep() -> String {
	"-".to_string()
}

fn default_indent_size() -> usize {
	4
}

fn default_max_depth() -> usize {
	DEFAULT_MAX_DEPTH
}
