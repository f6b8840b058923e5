//! # stagepage
//!
//! Builds a single-page website for a musician from one hand-edited JSON
//! document and a folder of images, and keeps those images web-sized.
//!
//! # Architecture: Two Independent Pipelines
//!
//! ```text
//! build     content.json + Images/  →  index.html    (one self-contained page)
//! optimize  Images/                 →  Images/       (in place, originals backed up once)
//! ```
//!
//! The pipelines share no state. `build` never touches images beyond reading
//! them; `optimize` never looks at the content document.
//!
//! ## Build
//!
//! ```text
//! content  →  assets (image policy)  →  sections  →  generate
//! ```
//!
//! The content document is parsed into typed records up front, so a missing
//! required field aborts the build before anything is rendered or written.
//! Rendering then cannot fail: an image that cannot be read degrades to a
//! relative path and a warning.
//!
//! ## Optimize
//!
//! ```text
//! backup  →  per-file normalize (parallel)  →  summary
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`content`] | The content document: typed records, album variants, ordered link lists |
//! | [`assets`] | Image resolution policy: embed as `data:` URI or link by relative path |
//! | [`sections`] | Section renderers (gear, albums, cards, marquees) built with Maud |
//! | [`generate`] | Page assembly in fixed section order, atomic write of the output file |
//! | [`imaging`] | Pure-Rust image operations: identify, reorient, downscale, re-encode |
//! | [`optimize`] | One-time backup and in-place normalization of the images directory |
//! | [`config`] | `stagepage.toml` loading, merging over stock defaults, validation |
//! | [`output`] | CLI output formatting for every command |
//!
//! # Design Decisions
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/), a compile-time HTML
//! macro system. Every interpolated value is escaped, and the page layout is
//! ordinary Rust code that the compiler checks.
//!
//! ## One File by Default
//!
//! In embed mode every image is inlined, so the page can be dropped on any
//! host as a single file. `--no-embed` switches to relative paths for hosts
//! where the images folder is deployed alongside the page.
//!
//! ## PNG Stays PNG
//!
//! The optimizer treats PNGs as transparency-carrying assets and keeps them
//! lossless. Every other format is assumed photographic and becomes JPEG at
//! the same path, so references in the content document never change.

pub mod assets;
pub mod config;
pub mod content;
pub mod generate;
pub mod imaging;
pub mod optimize;
pub mod output;
pub mod sections;

#[cfg(test)]
pub(crate) mod test_helpers;
