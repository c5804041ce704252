use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Generate BEM declaration files from Template Toolkit sources.",
	long_about = "bemdecl scans Template Toolkit sources for BEM class names and folds them \
	              into the declaration files bem-tools builds bundles from.\n\nEvery template \
	              is first expanded through its INCLUDE and PROCESS directives, so classes \
	              referenced from shared chunks count toward the declaration of the page that \
	              pulls them in.\n\nQuick start:\n  bemdecl build  Generate declaration \
	              artifacts\n  bemdecl list   Show the templates a build would process"
)]
pub struct BemdeclCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Project root directory (defaults to the current directory).
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Print per-template resolution and fold detail.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Turn off colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Generate declaration artifacts for the configured templates.
	///
	/// Each template is expanded through its INCLUDE and PROCESS directives,
	/// scanned for BEM class names, and folded into a declaration written to
	/// `<dest>/<name>/<name><out_ext>`. A template whose include references
	/// cannot all be resolved fails the run.
	///
	/// Without positional templates the `src` patterns from `bemdecl.toml`
	/// decide what gets processed. Use `--dry-run` to preview the artifact
	/// paths without creating directories or files.
	Build {
		/// Templates to process instead of the configured `src` patterns.
		templates: Vec<PathBuf>,

		/// Preview the run without creating directories or writing files.
		#[arg(long, default_value_t = false)]
		dry_run: bool,
	},
	/// List the templates a build would process.
	///
	/// Expands the configured `src` patterns, resolves and scans each
	/// template, and prints the declared block names next to the artifact
	/// path it would generate. Useful for checking glob patterns and the
	/// flattened bundle names before running a build.
	List {
		/// Output format for list results. Use `text` for human-readable
		/// output, or `json` for programmatic consumption.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text output.
	Text,
	/// JSON output for programmatic consumption. Each entry includes the
	/// template path, the artifact path, and the folded declaration list.
	Json,
}
