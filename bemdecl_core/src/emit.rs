use std::path::Path;

use serde::Serialize;
use serde_json::Serializer;
use serde_json::ser::PrettyFormatter;

use crate::BemdeclResult;
use crate::Declaration;

/// Options for [`render_artifact`].
#[derive(Clone, Debug)]
pub struct EmitOptions {
	/// Tool name stamped into the banner.
	pub generator: String,
	/// Tool version stamped next to the generator name.
	pub version: String,
	/// Spaces per indentation level in the serialized declaration list.
	pub indent_size: usize,
}

impl Default for EmitOptions {
	fn default() -> Self {
		Self {
			generator: env!("CARGO_PKG_NAME").to_string(),
			version: env!("CARGO_PKG_VERSION").to_string(),
			indent_size: 4,
		}
	}
}

/// The do-not-edit header stamped at the top of every generated artifact.
pub fn banner(source: impl AsRef<Path>, options: &EmitOptions) -> String {
	[
		"/*".to_string(),
		" *".to_string(),
		" * WARNING!".to_string(),
		" * DO NOT EDIT THIS MANUALLY - YOUR CHANGES WILL BE OVERWRITTEN!".to_string(),
		" *".to_string(),
		format!(" * Generated by {} v{}", options.generator, options.version),
		format!(" * Source file: {}", source.as_ref().display()),
		" *".to_string(),
		" */".to_string(),
		String::new(),
	]
	.join("\n")
}

/// Render a complete declaration artifact for one template.
///
/// The output is the banner followed by a single
/// `exports.blocks = <json>;` assignment, where the declaration list is
/// pretty-printed at the configured indent width.
pub fn render_artifact(
	declarations: &[Declaration],
	source: impl AsRef<Path>,
	options: &EmitOptions,
) -> BemdeclResult<String> {
	let blocks = render_blocks(declarations, options)?;

	Ok(format!("{}{blocks}", banner(source, options)))
}

fn render_blocks(declarations: &[Declaration], options: &EmitOptions) -> BemdeclResult<String> {
	let indent = " ".repeat(options.indent_size);
	let formatter = PrettyFormatter::with_indent(indent.as_bytes());
	let mut buffer = vec![];
	let mut serializer = Serializer::with_formatter(&mut buffer, formatter);
	declarations.serialize(&mut serializer)?;

	Ok(format!(
		"exports.blocks = {};\n",
		String::from_utf8_lossy(&buffer)
	))
}
