use std::path::Path;
use std::path::PathBuf;
use std::process;

use bemdecl_cli::BemdeclCli;
use bemdecl_cli::Commands;
use bemdecl_cli::OutputFormat;
use bemdecl_core::BemDecl;
use bemdecl_core::BemdeclConfig;
use bemdecl_core::BemdeclError;
use bemdecl_core::EmitOptions;
use bemdecl_core::IncludeResolver;
use bemdecl_core::TemplatePair;
use bemdecl_core::gather_files;
use bemdecl_core::pair_for_template;
use bemdecl_core::render_artifact;
use clap::Parser;
use owo_colors::OwoColorize;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,cyan) => {
		if color_enabled() {
			format!("{}", $text.cyan())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,yellow) => {
		if color_enabled() {
			format!("{}", $text.yellow())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = BemdeclCli::parse();

	// Color is off when either NO_COLOR or --no-color says so.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	let result = match &args.command {
		Some(Commands::Build { templates, dry_run }) => run_build(&args, templates, *dry_run),
		Some(Commands::List { format }) => run_list(&args, *format),
		None => {
			eprintln!("No subcommand specified. Run `bemdecl --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		// Crate errors carry miette codes and help text; render those
		// through the report formatter, everything else plainly.
		match e.downcast::<BemdeclError>() {
			Ok(core_err) => {
				let report: miette::Report = (*core_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

fn resolve_root(args: &BemdeclCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

fn load_config(root: &Path) -> Result<BemdeclConfig, Box<dyn std::error::Error>> {
	Ok(BemdeclConfig::load(root)?.unwrap_or_default())
}

fn init_tracing(verbose: bool, debug: bool) {
	if !verbose && !debug {
		return;
	}

	let filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug"));
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.init();
}

/// Make a path relative to root for display purposes.
fn make_relative(path: &Path, root: &Path) -> String {
	path.strip_prefix(root)
		.unwrap_or(path)
		.display()
		.to_string()
}

fn run_build(
	args: &BemdeclCli,
	templates: &[PathBuf],
	dry_run: bool,
) -> Result<(), Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	let config = load_config(&root)?;
	init_tracing(args.verbose, config.debug);

	let options = config.gather_options(&root);
	let pairs = if templates.is_empty() {
		gather_files(&config.src, &options)?
	} else {
		// Positional paths are given relative to the project directory.
		templates
			.iter()
			.map(|template| {
				let src = if template.is_absolute() {
					template.clone()
				} else {
					root.join(template)
				};
				pair_for_template(&src, &options)
			})
			.collect::<Result<Vec<_>, _>>()?
	};

	if pairs.is_empty() {
		println!("No templates to process.");
		return Ok(());
	}

	let mut resolver = IncludeResolver::new(config.resolver_options(&root))?;
	let mut merger = BemDecl::new(config.decl_options())?;
	let emit = EmitOptions {
		generator: env!("CARGO_BIN_NAME").to_string(),
		version: env!("CARGO_PKG_VERSION").to_string(),
		indent_size: config.indent_size,
	};

	for pair in &pairs {
		process_template(pair, &mut resolver, &mut merger, &emit, dry_run, args.verbose)?;
	}

	Ok(())
}

/// Expand, scan, and fold one template, then write its artifact.
fn process_template(
	pair: &TemplatePair,
	resolver: &mut IncludeResolver,
	merger: &mut BemDecl,
	emit: &EmitOptions,
	dry_run: bool,
	verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
	println!("Processing {}...", colored!(pair.src.display(), cyan));

	let Some(merged) = resolver.parse(&pair.src)? else {
		// Unresolved references get the diagnostic with its help text;
		// soft failures (missing or empty template) stay plain.
		let report = resolver.errors().join("\n");
		if resolver.found().iter().any(|token| token.resolved.is_none()) {
			return Err(BemdeclError::UnresolvedInclude {
				template: pair.src.display().to_string(),
				report,
			}
			.into());
		}

		return Err(report.into());
	};

	merger.parse(&merged);
	let declarations = merger.decl();

	if verbose {
		println!(
			"  {} include(s) expanded, {} class(es) matched, {} block(s) declared",
			resolver.found().len(),
			merger.found().len(),
			declarations.len()
		);
	}

	let artifact = render_artifact(&declarations, &pair.src, emit)?;

	if dry_run {
		println!("Dry run: would write {}", pair.dst.display());
		return Ok(());
	}

	if !pair.dir.is_dir() {
		println!("Created directory {} ...", colored!(pair.dir.display(), yellow));
		std::fs::create_dir_all(&pair.dir)?;
	}

	std::fs::write(&pair.dst, artifact)?;
	println!("Generated {}", pair.dst.display());

	Ok(())
}

fn run_list(args: &BemdeclCli, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	let config = load_config(&root)?;
	init_tracing(args.verbose, config.debug);

	let pairs = gather_files(&config.src, &config.gather_options(&root))?;

	if pairs.is_empty() {
		println!("No templates to process.");
		return Ok(());
	}

	let mut resolver = IncludeResolver::new(config.resolver_options(&root))?;
	let mut merger = BemDecl::new(config.decl_options())?;

	match format {
		OutputFormat::Json => {
			let mut entries = Vec::new();
			for pair in &pairs {
				let src = make_relative(&pair.src, &root);
				let dst = make_relative(&pair.dst, &root);
				match resolver.parse(&pair.src)? {
					Some(merged) => {
						merger.parse(&merged);
						entries.push(serde_json::json!({
							"src": src,
							"dst": dst,
							"blocks": merger.decl(),
						}));
					}
					None => {
						entries.push(serde_json::json!({
							"src": src,
							"dst": dst,
							"errors": resolver.errors(),
						}));
					}
				}
			}
			println!("{}", serde_json::Value::Array(entries));
		}
		OutputFormat::Text => {
			println!("{}", colored!("Templates:", bold));
			for pair in &pairs {
				let src = make_relative(&pair.src, &root);
				let dst = make_relative(&pair.dst, &root);
				match resolver.parse(&pair.src)? {
					Some(merged) => {
						merger.parse(&merged);
						let declarations = merger.decl();
						let blocks = if declarations.is_empty() {
							"(no blocks)".to_string()
						} else {
							declarations
								.iter()
								.map(|declaration| declaration.block.as_str())
								.collect::<Vec<_>>()
								.join(" ")
						};
						println!("  {src} -> {dst}");
						println!("    {blocks}");
					}
					None => {
						println!("  {src} -> {dst} [unresolved]");
						for line in resolver.errors() {
							eprintln!("{} {line}", colored!("warning:", yellow));
						}
					}
				}
			}
			println!("\n{} template(s)", pairs.len());
		}
	}

	Ok(())
}
