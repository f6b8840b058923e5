//! Image processing in pure Rust.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | decoder header + EXIF orientation |
//! | **Normalize** | reorient, Lanczos3 downscale, PNG or JPEG re-encode |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{fit_within, needs_downscale};
pub use operations::{NormalizeConfig, Normalized, normalize_in_place, plan_normalize};
pub use params::{NormalizeParams, OutputFormat, Quality};
pub use rust_backend::{RustBackend, is_supported};
