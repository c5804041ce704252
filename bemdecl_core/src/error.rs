use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum BemdeclError {
	#[error(transparent)]
	#[diagnostic(code(bemdecl::io_error))]
	Io(#[from] std::io::Error),

	#[error("invalid scan pattern: {0}")]
	#[diagnostic(
		code(bemdecl::pattern),
		help("block prefixes must produce a valid regular expression")
	)]
	Pattern(#[from] regex::Error),

	#[error("invalid template pattern: {0}")]
	#[diagnostic(
		code(bemdecl::glob),
		help("check the `src` globs in bemdecl.toml (negations start with `!`)")
	)]
	Glob(#[from] globset::Error),

	#[error("failed to serialize declarations: {0}")]
	#[diagnostic(code(bemdecl::serialize))]
	Serialize(#[from] serde_json::Error),

	#[error("include depth limit of {limit} exceeded while expanding `{parent}`")]
	#[diagnostic(
		code(bemdecl::depth_exceeded),
		help("raise `max_depth` in bemdecl.toml or break the include chain")
	)]
	DepthExceeded { parent: String, limit: usize },

	#[error("unresolved includes in `{template}`:\n{report}")]
	#[diagnostic(
		code(bemdecl::unresolved_include),
		help("every INCLUDE/PROCESS path must exist in one of the include directories")
	)]
	UnresolvedInclude { template: String, report: String },

	#[error("`{path}` does not lie within the root `{root}`")]
	#[diagnostic(
		code(bemdecl::outside_root),
		help("pass a template path underneath the configured root")
	)]
	OutsideRoot { path: String, root: String },

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(bemdecl::config_parse),
		help("check that bemdecl.toml is valid TOML")
	)]
	ConfigParse(String),
}

pub type BemdeclResult<T> = Result<T, BemdeclError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
