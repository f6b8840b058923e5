//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They sit between
//! [`operations`](super::operations), which plans the normalization of one
//! file, and the [`backend`](super::backend), which does the pixel work. The
//! normalizer is tested against a mock backend through this seam.
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1–100, default 82). Clamped on construction.
//! - [`OutputFormat`]: PNG stays PNG, everything else becomes JPEG.
//! - [`NormalizeParams`]: One in-place rewrite: paths, target dimensions, format, quality.

use std::path::{Path, PathBuf};

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(82)
    }
}

/// Encoding used when a normalized image is written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Lossless, maximum compression, alpha kept.
    Png,
    /// Opaque RGB at the configured quality.
    Jpeg,
}

impl OutputFormat {
    /// Output format for a source file. Only `.png` keeps its format.
    pub fn for_path(path: &Path) -> Self {
        let is_png = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("png"));
        if is_png { Self::Png } else { Self::Jpeg }
    }
}

/// Parameters for normalizing one image.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizeParams {
    pub source: PathBuf,
    pub output: PathBuf,
    /// Final dimensions, after orientation. Equal to the source dimensions
    /// when no downscale is needed.
    pub width: u32,
    pub height: u32,
    pub format: OutputFormat,
    pub quality: Quality,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(Quality::new(0).value(), 1);
        assert_eq!(Quality::new(50).value(), 50);
        assert_eq!(Quality::new(150).value(), 100);
    }

    #[test]
    fn quality_default_is_82() {
        assert_eq!(Quality::default().value(), 82);
    }

    #[test]
    fn only_png_keeps_format() {
        assert_eq!(OutputFormat::for_path(Path::new("a.png")), OutputFormat::Png);
        assert_eq!(OutputFormat::for_path(Path::new("a.PNG")), OutputFormat::Png);
        assert_eq!(OutputFormat::for_path(Path::new("a.jpg")), OutputFormat::Jpeg);
        assert_eq!(OutputFormat::for_path(Path::new("a.jpeg")), OutputFormat::Jpeg);
        assert_eq!(OutputFormat::for_path(Path::new("a.webp")), OutputFormat::Jpeg);
    }
}
