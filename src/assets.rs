//! Image references for the rendered page.
//!
//! Every `src` on the page goes through [`ImagePolicy::resolve`]. In
//! [`ImageMode::Embed`] the file is inlined as a base64 `data:` URI, so the
//! page is a single self-contained file. In [`ImageMode::Link`] the reference
//! is a relative path under the deployed images directory.
//!
//! A file that cannot be read in embed mode falls back to the link form and a
//! warning is recorded; it never fails the build.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// How image references are written into the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageMode {
    /// Inline file bytes as `data:` URIs.
    #[default]
    Embed,
    /// Emit relative paths, images are deployed next to the page.
    Link,
}

impl ImageMode {
    pub fn label(self) -> &'static str {
        match self {
            ImageMode::Embed => "embedded images",
            ImageMode::Link => "relative image paths",
        }
    }
}

/// An image reference that had to fall back to a relative path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageWarning {
    pub filename: String,
    pub reason: String,
}

/// Resolves image filenames from the content document to `src` values.
#[derive(Debug)]
pub struct ImagePolicy {
    mode: ImageMode,
    images_dir: PathBuf,
    link_prefix: String,
    warnings: RefCell<Vec<ImageWarning>>,
}

impl ImagePolicy {
    pub fn new(mode: ImageMode, images_dir: &Path, link_prefix: &str) -> Self {
        Self {
            mode,
            images_dir: images_dir.to_path_buf(),
            link_prefix: link_prefix.trim_end_matches('/').to_string(),
            warnings: RefCell::new(Vec::new()),
        }
    }

    /// Turn a filename into an image `src`. Empty input gives empty output.
    pub fn resolve(&self, filename: &str) -> String {
        if filename.is_empty() {
            return String::new();
        }
        match self.mode {
            ImageMode::Link => self.link(filename),
            ImageMode::Embed => {
                let path = self.images_dir.join(filename);
                match fs::read(&path) {
                    Ok(bytes) => {
                        debug!("embedding {} ({} bytes)", path.display(), bytes.len());
                        data_uri(filename, &bytes)
                    }
                    Err(e) => {
                        self.warnings.borrow_mut().push(ImageWarning {
                            filename: filename.to_string(),
                            reason: e.to_string(),
                        });
                        self.link(filename)
                    }
                }
            }
        }
    }

    fn link(&self, filename: &str) -> String {
        format!("{}/{}", self.link_prefix, filename)
    }

    /// Warnings recorded so far, in resolution order.
    pub fn warnings(&self) -> Vec<ImageWarning> {
        self.warnings.borrow().clone()
    }

    /// Drain the recorded warnings.
    pub fn take_warnings(&self) -> Vec<ImageWarning> {
        self.warnings.take()
    }
}

/// MIME type for an image filename, by case-insensitive extension.
///
/// Unknown extensions are treated as JPEG.
pub fn mime_for(filename: &str) -> &'static str {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        _ => "image/jpeg",
    }
}

/// Wrap raw bytes as a base64 `data:` URI.
pub fn data_uri(filename: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_for(filename), STANDARD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn mime_table() {
        assert_eq!(mime_for("a.jpg"), "image/jpeg");
        assert_eq!(mime_for("a.jpeg"), "image/jpeg");
        assert_eq!(mime_for("a.png"), "image/png");
        assert_eq!(mime_for("a.webp"), "image/webp");
        assert_eq!(mime_for("a.gif"), "image/gif");
    }

    #[test]
    fn mime_is_case_insensitive() {
        assert_eq!(mime_for("LOGO.PNG"), "image/png");
        assert_eq!(mime_for("logo.Png"), "image/png");
        assert_eq!(mime_for("photo.JPEG"), "image/jpeg");
        assert_eq!(mime_for("anim.GiF"), "image/gif");
    }

    #[test]
    fn mime_unknown_falls_back_to_jpeg() {
        assert_eq!(mime_for("scan.tiff"), "image/jpeg");
        assert_eq!(mime_for("noextension"), "image/jpeg");
    }

    #[test]
    fn empty_filename_resolves_to_empty() {
        let tmp = TempDir::new().unwrap();
        let embed = ImagePolicy::new(ImageMode::Embed, tmp.path(), "images");
        let link = ImagePolicy::new(ImageMode::Link, tmp.path(), "images");
        assert_eq!(embed.resolve(""), "");
        assert_eq!(link.resolve(""), "");
        assert!(embed.warnings().is_empty());
    }

    #[test]
    fn link_mode_returns_relative_path() {
        let policy = ImagePolicy::new(ImageMode::Link, Path::new("/nowhere"), "images");
        assert_eq!(policy.resolve("hero.jpg"), "images/hero.jpg");
        assert!(policy.warnings().is_empty());
    }

    #[test]
    fn link_prefix_trailing_slash_is_trimmed() {
        let policy = ImagePolicy::new(ImageMode::Link, Path::new("/nowhere"), "assets/img/");
        assert_eq!(policy.resolve("a.png"), "assets/img/a.png");
    }

    #[test]
    fn embed_mode_inlines_bytes() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("dot.PNG"), b"\x89PNG").unwrap();
        let policy = ImagePolicy::new(ImageMode::Embed, tmp.path(), "images");
        let src = policy.resolve("dot.PNG");
        assert_eq!(src, format!("data:image/png;base64,{}", STANDARD.encode(b"\x89PNG")));
        assert!(policy.warnings().is_empty());
    }

    #[test]
    fn embed_missing_file_matches_link_and_warns() {
        let tmp = TempDir::new().unwrap();
        let embed = ImagePolicy::new(ImageMode::Embed, tmp.path(), "images");
        let link = ImagePolicy::new(ImageMode::Link, tmp.path(), "images");

        assert_eq!(embed.resolve("missing.jpg"), link.resolve("missing.jpg"));

        let warnings = embed.warnings();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].filename, "missing.jpg");
        assert!(!warnings[0].reason.is_empty());
    }

    #[test]
    fn take_warnings_drains() {
        let tmp = TempDir::new().unwrap();
        let policy = ImagePolicy::new(ImageMode::Embed, tmp.path(), "images");
        policy.resolve("a.jpg");
        policy.resolve("b.jpg");
        assert_eq!(policy.take_warnings().len(), 2);
        assert!(policy.warnings().is_empty());
    }
}
