//! High-level image operations.
//!
//! These functions combine calculations with backend execution.
//! They take configuration, compute parameters, and call the backend.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::fit_within;
use super::params::{NormalizeParams, OutputFormat, Quality};
use std::path::Path;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Configuration for in-place normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeConfig {
    pub max_width: u32,
    pub max_height: u32,
    pub quality: Quality,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            max_width: 1400,
            max_height: 1400,
            quality: Quality::default(),
        }
    }
}

impl NormalizeConfig {
    pub fn bounds(&self) -> (u32, u32) {
        (self.max_width, self.max_height)
    }
}

/// What normalizing one file did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Normalized {
    pub original: Dimensions,
    pub output: Dimensions,
    pub format: OutputFormat,
}

/// Plan the rewrite of `path` given its displayed dimensions.
pub fn plan_normalize(path: &Path, dims: Dimensions, config: &NormalizeConfig) -> NormalizeParams {
    let (width, height) = fit_within(dims.as_tuple(), config.bounds());
    NormalizeParams {
        source: path.to_path_buf(),
        output: path.to_path_buf(),
        width,
        height,
        format: OutputFormat::for_path(path),
        quality: config.quality,
    }
}

/// Normalize one image in place: downscale into the bounds and re-encode.
pub fn normalize_in_place(
    backend: &impl ImageBackend,
    path: &Path,
    config: &NormalizeConfig,
) -> Result<Normalized> {
    let original = backend.identify(path)?;
    let params = plan_normalize(path, original, config);
    backend.normalize(&params)?;

    Ok(Normalized {
        original,
        output: Dimensions::from((params.width, params.height)),
        format: params.format,
    })
}
