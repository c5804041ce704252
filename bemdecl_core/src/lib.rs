//! `bemdecl_core` is the core library for the bemdecl declaration generator. It expands the `INCLUDE`/`PROCESS` directives of Template Toolkit sources into a single merged text, scans that text for BEM class mentions, and folds the mentions into the `exports.blocks` declaration list consumed by BEM build tooling.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Template file
//!   → IncludeResolver (inlines INCLUDE/PROCESS references, each distinct path once)
//!   → BemNaming (scans the merged text for block/elem/modifier class names)
//!   → BemDecl (gates on bare mentions + allow-list, dedups, folds into Declarations)
//!   → render_artifact (banner + exports.blocks assignment)
//! ```
//!
//! ## Modules
//!
//! - [`config`] — Configuration loading from `bemdecl.toml`: prefixes, include directories, source globs, output layout.
//! - [`decl`] — The declaration merger. Scans text with the naming grammar and folds surviving names into shape-polymorphic declarations.
//! - [`resolver`] — Include resolution. Walks `INCLUDE`/`PROCESS` references depth-first across ordered include directories.
//!
//! ## Key Types
//!
//! - [`BemName`] — One class name decomposed into block, optional elem, optional modifier.
//! - [`BemDecl`] — The merger: scan, gate, dedup, fold.
//! - [`Declaration`] — One folded record per block, serialized in singular or plural shape depending on what was mentioned.
//! - [`IncludeResolver`] — Directive scanner and resolver with a per-parse seen set and depth limit.
//! - [`TemplatePair`] — One gathered template with its artifact destination.
//! - [`BemdeclConfig`] — Configuration loaded from `bemdecl.toml`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bemdecl_core::BemDecl;
//! use bemdecl_core::DeclOptions;
//! use bemdecl_core::EmitOptions;
//! use bemdecl_core::IncludeResolver;
//! use bemdecl_core::ResolverOptions;
//! use bemdecl_core::render_artifact;
//!
//! let mut resolver = IncludeResolver::new(ResolverOptions::default()).unwrap();
//! let mut merger = BemDecl::new(DeclOptions::default()).unwrap();
//!
//! match resolver.parse("templates/index.html").unwrap() {
//!     Some(merged) => {
//!         merger.parse(&merged);
//!         let artifact =
//!             render_artifact(&merger.decl(), "templates/index.html", &EmitOptions::default())
//!                 .unwrap();
//!         println!("{artifact}");
//!     }
//!     None => eprintln!("{}", resolver.errors().join("\n")),
//! }
//! ```

pub use config::*;
pub use decl::*;
pub use emit::*;
pub use error::*;
pub use flatten::*;
pub use gather::*;
pub use naming::*;
pub use resolver::*;

pub mod config;
pub mod decl;
mod emit;
mod error;
mod flatten;
mod gather;
mod naming;
pub mod resolver;

#[cfg(test)]
mod __fixtures;
