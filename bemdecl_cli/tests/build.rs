mod common;

use std::path::PathBuf;

use bemdecl_cli::BemdeclCli;
use bemdecl_cli::Commands;
use bemdecl_core::AnyEmptyResult;
use predicates::prelude::PredicateBooleanExt;
use rstest::rstest;
use similar_asserts::assert_eq;

#[test]
fn build_generates_declaration_artifact() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	std::fs::create_dir_all(tmp.path().join("templates"))?;
	std::fs::write(
		tmp.path().join("templates/index.html"),
		"<p class=\"b-text b-text_size_15\"></p>\n<div class=\"b-foo b-foo__bar\"></div>\n",
	)?;

	let mut cmd = common::bemdecl_cmd();
	cmd.arg("build")
		.arg("templates/index.html")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("Processing"))
		.stdout(predicates::str::contains("Created directory"))
		.stdout(predicates::str::contains("Generated"));

	let artifact_path = tmp
		.path()
		.join("templates-index")
		.join("templates-index.bemdecl.js");
	assert!(
		artifact_path.is_file(),
		"expected artifact at {}",
		artifact_path.display()
	);

	let artifact = std::fs::read_to_string(&artifact_path)?;
	let expected = format!(
		concat!(
			"/*\n",
			" *\n",
			" * WARNING!\n",
			" * DO NOT EDIT THIS MANUALLY - YOUR CHANGES WILL BE OVERWRITTEN!\n",
			" *\n",
			" * Generated by bemdecl v{version}\n",
			" * Source file: {source}\n",
			" *\n",
			" */\n",
			"exports.blocks = [\n",
			"    {{\n",
			"        \"block\": \"b-text\",\n",
			"        \"mods\": [\n",
			"            {{\n",
			"                \"mod\": \"size\",\n",
			"                \"val\": \"15\"\n",
			"            }}\n",
			"        ]\n",
			"    }},\n",
			"    {{\n",
			"        \"block\": \"b-foo\",\n",
			"        \"elem\": \"bar\"\n",
			"    }}\n",
			"];\n",
		),
		version = env!("CARGO_PKG_VERSION"),
		source = tmp.path().join("templates/index.html").display(),
	);
	assert_eq!(artifact, expected);

	Ok(())
}

#[test]
fn build_discovers_templates_from_config() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	std::fs::write(
		tmp.path().join("bemdecl.toml"),
		"src = [\"pages/**/*.html\"]\ndest = \"bundles\"\nincludes = [\"chunks\"]\ncut = 1\n",
	)?;
	std::fs::create_dir_all(tmp.path().join("pages"))?;
	std::fs::create_dir_all(tmp.path().join("chunks"))?;
	std::fs::write(
		tmp.path().join("pages/home.html"),
		"<body class=\"b-page\">[% INCLUDE menu.inc %]</body>\n",
	)?;
	std::fs::write(
		tmp.path().join("pages/about.html"),
		"<body class=\"b-about\"></body>\n",
	)?;
	std::fs::write(
		tmp.path().join("chunks/menu.inc"),
		"<ul class=\"b-menu\"></ul>\n",
	)?;

	let mut cmd = common::bemdecl_cmd();
	cmd.arg("--verbose")
		.arg("build")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("Processing"))
		.stdout(predicates::str::contains("Created directory"))
		.stdout(predicates::str::contains("block(s) declared"))
		.stdout(predicates::str::contains("Generated"));

	// Includes contribute their class names to the including template.
	let home = std::fs::read_to_string(
		tmp.path().join("bundles").join("home").join("home.bemdecl.js"),
	)?;
	assert!(home.contains("\"block\": \"b-page\""));
	assert!(home.contains("\"block\": \"b-menu\""));

	// Scanner state must not leak between templates of the same run.
	let about = std::fs::read_to_string(
		tmp.path()
			.join("bundles")
			.join("about")
			.join("about.bemdecl.js"),
	)?;
	assert!(about.contains("\"block\": \"b-about\""));
	assert!(!about.contains("b-menu"));

	Ok(())
}

#[test]
fn build_honors_config_allow_list() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	std::fs::write(tmp.path().join("bemdecl.toml"), "allowed = [\"b-menu\"]\n")?;
	std::fs::write(
		tmp.path().join("page.html"),
		"<div class=\"b-page b-menu\"></div>\n",
	)?;

	let mut cmd = common::bemdecl_cmd();
	cmd.arg("build")
		.arg("page.html")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();

	let artifact =
		std::fs::read_to_string(tmp.path().join("page").join("page.bemdecl.js"))?;
	assert!(artifact.contains("\"block\": \"b-menu\""));
	assert!(!artifact.contains("b-page"));

	Ok(())
}

#[test]
fn build_handles_templates_without_blocks() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	std::fs::write(tmp.path().join("plain.html"), "<p>hello</p>\n")?;

	let mut cmd = common::bemdecl_cmd();
	cmd.arg("build")
		.arg("plain.html")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();

	let artifact =
		std::fs::read_to_string(tmp.path().join("plain").join("plain.bemdecl.js"))?;
	assert!(artifact.ends_with("exports.blocks = [];\n"));

	Ok(())
}

#[test]
fn build_artifact_matches_snapshot() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	std::fs::write(
		tmp.path().join("page.html"),
		"<div class=\"b-page b-page__head\"></div>\n",
	)?;

	let mut cmd = common::bemdecl_cmd();
	cmd.arg("build")
		.arg("page.html")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();

	let artifact = std::fs::read_to_string(tmp.path().join("page").join("page.bemdecl.js"))?;
	insta::with_settings!({ filters => vec![
		(r"v\d+\.\d+\.\d+", "v[VERSION]"),
		(r"Source file: .+", "Source file: [TEMPLATE]"),
	]}, {
		insta::assert_snapshot!(artifact, @r#"
		/*
		 *
		 * WARNING!
		 * DO NOT EDIT THIS MANUALLY - YOUR CHANGES WILL BE OVERWRITTEN!
		 *
		 * Generated by bemdecl v[VERSION]
		 * Source file: [TEMPLATE]
		 *
		 */
		exports.blocks = [
		    {
		        "block": "b-page",
		        "elem": "head"
		    }
		];
		"#);
	});

	Ok(())
}

#[test]
fn build_fails_on_unresolved_includes() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	std::fs::write(
		tmp.path().join("page.html"),
		"<div class=\"b-page\">[% INCLUDE ghost.inc %]</div>\n",
	)?;

	let mut cmd = common::bemdecl_cmd();
	cmd.arg("build")
		.arg("page.html")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.failure()
		.code(2)
		.stderr(predicates::str::contains("unresolved includes in"))
		.stderr(predicates::str::contains("INCLUDE ghost.inc"));

	// No partial artifact is left behind.
	assert!(!tmp.path().join("page").exists());

	Ok(())
}

#[test]
fn build_dry_run_writes_nothing() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	std::fs::create_dir_all(tmp.path().join("templates"))?;
	std::fs::write(
		tmp.path().join("templates/index.html"),
		"<p class=\"b-text\"></p>\n",
	)?;

	let mut cmd = common::bemdecl_cmd();
	cmd.arg("build")
		.arg("templates/index.html")
		.arg("--dry-run")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("Dry run: would write"))
		.stdout(predicates::str::contains("Generated").not());

	assert!(!tmp.path().join("templates-index").exists());

	Ok(())
}

#[test]
fn build_reports_missing_templates() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	let mut cmd = common::bemdecl_cmd();
	cmd.arg("build")
		.arg("absent.html")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.failure()
		.stderr(predicates::str::contains("template does not exist"));

	Ok(())
}

#[test]
fn build_without_templates_prints_notice() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	let mut cmd = common::bemdecl_cmd();
	cmd.arg("build")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("No templates to process."));

	Ok(())
}

#[test]
fn build_flags_are_accepted_by_cli_parser() {
	use clap::Parser;

	let cli = BemdeclCli::parse_from(["bemdecl", "build", "--dry-run", "a.html", "b.html"]);
	match cli.command {
		Some(Commands::Build { templates, dry_run }) => {
			assert!(dry_run);
			assert_eq!(templates, [PathBuf::from("a.html"), PathBuf::from("b.html")]);
		}
		_ => panic!("expected Build command"),
	}

	// Verify --dry-run defaults to false when not specified.
	let cli = BemdeclCli::parse_from(["bemdecl", "build"]);
	match cli.command {
		Some(Commands::Build { templates, dry_run }) => {
			assert!(!dry_run);
			assert!(templates.is_empty());
		}
		_ => panic!("expected Build command"),
	}
}

#[test]
fn global_flags_are_accepted_by_cli_parser() {
	use clap::Parser;

	let cli = BemdeclCli::parse_from([
		"bemdecl",
		"--verbose",
		"--no-color",
		"--path",
		"/srv/site",
		"build",
	]);
	assert!(cli.verbose);
	assert!(cli.no_color);
	assert_eq!(cli.path, Some(PathBuf::from("/srv/site")));
}

#[rstest]
#[case::unknown_subcommand("frobnicate")]
#[case::unknown_flag("--frobnicate")]
fn unknown_arguments_are_rejected(#[case] argument: &str) {
	let mut cmd = common::bemdecl_cmd();
	cmd.arg(argument)
		.assert()
		.failure()
		.code(2)
		.stderr(predicates::str::contains("error:"));
}
