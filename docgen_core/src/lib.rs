//! `docgen_core` is the core library for [docgen](https://github.com/go-pogo/docgen). It scans a project tree for module manifests and documented packages, rebuilds each package comment into a tree of sections and blocks, and renders the result through templates so readme files can be generated from the documentation that already lives in the source.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Project directory
//!   → Scanner (depth first walk, filtered subdirectories, aggregated errors)
//!   → Manifest parser (go.mod → Module with its requirements)
//!   → Source parser (package clause + package comment per directory)
//!   → Comment renderer (comment text → markup fragment stream)
//!   → Unmarshaler (fragment stream → Package sections and blocks)
//!   → Generator (modules + packages → minijinja template → output file)
//! ```
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading from `docgen.toml`: template and output paths, scan mode and exclude patterns.
//! - [`manifest`]: Module manifest parsing, `go.mod` by default.
//! - [`source`]: Package clause and package comment extraction from source files.
//! - [`render`]: Rendering of comment text into the markup fragment vocabulary.
//! - [`unmarshal`]: The state machine that turns fragments back into sections and blocks.
//!
//! ## Key Types
//!
//! - [`Scanner`]: Walks a directory tree and accumulates [`Module`]s and [`Package`]s.
//! - [`ScanMode`]: Bit flags selecting manifest detection, package extraction and recursion.
//! - [`ScanFilter`]: Predicate deciding which subdirectories a deep scan enters.
//! - [`Generator`]: Scans a root once and renders templates with the results.
//! - [`DocgenConfig`]: Configuration loaded from `docgen.toml`.
//!
//! ## Templates
//!
//! Templates are rendered with [`minijinja`](https://docs.rs/minijinja). The context exposes `modules` and `packages`:
//!
//! ```jinja
//! {% for package in packages %}
//! ## {{ package.import_path }}
//!
//! {{ package.synopsis }}
//! {% endfor %}
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docgen_core::ScanMode;
//! use docgen_core::scan_dir;
//! use std::path::Path;
//!
//! let (modules, packages, result) = scan_dir(Path::new("."), ScanMode::ALL_DEEP, None);
//! if let Err(error) = result {
//!     eprintln!("{error}");
//! }
//!
//! for package in &packages {
//!     println!("{}: {}", package.import_path(), package.synopsis());
//! }
//! println!("{} module(s)", modules.len());
//! ```

pub use config::*;
pub use error::*;
pub use filter::*;
pub use generator::*;
pub use manifest::GoModParser;
pub use manifest::ManifestParser;
pub use model::*;
pub use render::CommentRenderer;
pub use render::FragmentSink;
pub use render::HtmlCommentRenderer;
pub use scanner::*;
pub use source::GoSourceParser;
pub use source::PackageDoc;
pub use source::SourceParser;
pub use unmarshal::StreamEnd;
pub use unmarshal::Unmarshaler;

pub mod config;
#[allow(unused_assignments)]
mod error;
mod filter;
mod generator;
pub mod manifest;
mod model;
pub mod render;
mod scanner;
pub mod source;
pub mod unmarshal;

#[cfg(test)]
mod __fixtures;
