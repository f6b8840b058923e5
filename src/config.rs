//! Project configuration module.
//!
//! Handles loading, validating, and merging `stagepage.toml`. The file is
//! optional and lives in the project root next to the content document.
//! Stock defaults are the base layer; the user file overrides them key by key.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! content_file = "content.json"   # Content document, relative to the root
//! images_dir = "Images"           # Source images, relative to the root
//! output_file = "index.html"      # Generated page, relative to the root
//!
//! [build]
//! embed_images = true             # Inline images as data URIs
//! link_prefix = "images"          # Path prefix when images are linked
//!
//! [optimize]
//! max_width = 1400                # Bounding box for downscaling
//! max_height = 1400
//! quality = 82                    # JPEG quality (1-100)
//! backup_dir = "Images_originals" # One-time backup, relative to the root
//!
//! [processing]
//! max_processes = 4               # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse; override just the values you want:
//!
//! ```toml
//! [build]
//! embed_images = false
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::assets::ImageMode;
use crate::imaging::{NormalizeConfig, Quality};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Config file name looked up in the project root.
pub const CONFIG_FILE: &str = "stagepage.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Project configuration loaded from `stagepage.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    /// Content document, relative to the project root.
    pub content_file: String,
    /// Source images directory, relative to the project root.
    pub images_dir: String,
    /// Generated page, relative to the project root.
    pub output_file: String,
    /// Page generation settings.
    pub build: BuildConfig,
    /// Image normalization settings.
    pub optimize: OptimizeConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            content_file: "content.json".to_string(),
            images_dir: "Images".to_string(),
            output_file: "index.html".to_string(),
            build: BuildConfig::default(),
            optimize: OptimizeConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl ProjectConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("content_file", &self.content_file),
            ("images_dir", &self.images_dir),
            ("output_file", &self.output_file),
            ("optimize.backup_dir", &self.optimize.backup_dir),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation(format!("{key} must not be empty")));
            }
        }
        if !(1..=100).contains(&self.optimize.quality) {
            return Err(ConfigError::Validation(
                "optimize.quality must be 1-100".into(),
            ));
        }
        if self.optimize.max_width == 0 || self.optimize.max_height == 0 {
            return Err(ConfigError::Validation(
                "optimize.max_width and optimize.max_height must be non-zero".into(),
            ));
        }
        if self.build.link_prefix.trim_matches('/').is_empty() {
            return Err(ConfigError::Validation(
                "build.link_prefix must not be empty".into(),
            ));
        }
        if lexical(&self.optimize.backup_dir).starts_with(lexical(&self.images_dir)) {
            return Err(ConfigError::Validation(
                "optimize.backup_dir must not be images_dir or inside it".into(),
            ));
        }
        Ok(())
    }

    pub fn content_path(&self, root: &Path) -> PathBuf {
        root.join(&self.content_file)
    }

    pub fn images_path(&self, root: &Path) -> PathBuf {
        root.join(&self.images_dir)
    }

    pub fn output_path(&self, root: &Path) -> PathBuf {
        root.join(&self.output_file)
    }

    pub fn backup_path(&self, root: &Path) -> PathBuf {
        root.join(&self.optimize.backup_dir)
    }

    /// Image mode for a build; `no_embed` forces linked images.
    pub fn image_mode(&self, no_embed: bool) -> ImageMode {
        if self.build.embed_images && !no_embed {
            ImageMode::Embed
        } else {
            ImageMode::Link
        }
    }
}

/// Path components with `.` segments dropped, for comparing configured paths.
fn lexical(path: &str) -> PathBuf {
    Path::new(path)
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// Page generation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Inline images as base64 data URIs instead of linking them.
    pub embed_images: bool,
    /// Path prefix for linked images, relative to the page.
    pub link_prefix: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            embed_images: true,
            link_prefix: "images".to_string(),
        }
    }
}

/// Image normalization settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptimizeConfig {
    /// Images wider than this are downscaled.
    pub max_width: u32,
    /// Images taller than this are downscaled.
    pub max_height: u32,
    /// JPEG encoding quality (1 = worst, 100 = best).
    pub quality: u32,
    /// Backup directory, relative to the project root.
    pub backup_dir: String,
}

impl Default for OptimizeConfig {
    fn default() -> Self {
        Self {
            max_width: 1400,
            max_height: 1400,
            quality: 82,
            backup_dir: "Images_originals".to_string(),
        }
    }
}

impl OptimizeConfig {
    pub fn normalize_config(&self) -> NormalizeConfig {
        NormalizeConfig {
            max_width: self.max_width,
            max_height: self.max_height,
            quality: Quality::new(self.quality),
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel image processing workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged on top of.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(ProjectConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `stagepage.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = root.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<ProjectConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ProjectConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `stagepage.toml` in the given project root.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<ProjectConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `stagepage.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# stagepage configuration
# =======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Paths are relative to the project
# root (the --root directory, default ".").
# Unknown keys will cause an error.

# Content document with all page copy, links and image filenames.
content_file = "content.json"

# Source images referenced by the content document.
images_dir = "Images"

# Where the generated page is written.
output_file = "index.html"

# ---------------------------------------------------------------------------
# Page generation
# ---------------------------------------------------------------------------
[build]
# Inline every image as a base64 data URI, producing one self-contained file.
# Set to false (or pass --no-embed) to reference images by relative path.
embed_images = true

# Path prefix for linked images, relative to the generated page.
link_prefix = "images"

# ---------------------------------------------------------------------------
# Image optimization (in place)
# ---------------------------------------------------------------------------
[optimize]
# Images larger than this bounding box are downscaled, keeping aspect ratio.
max_width = 1400
max_height = 1400

# JPEG encoding quality (1 = worst, 100 = best). PNGs are always lossless.
quality = 82

# Originals are copied here once, before the first optimization.
backup_dir = "Images_originals"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel image-processing workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
