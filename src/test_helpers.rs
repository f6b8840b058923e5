//! Shared test utilities: the sample content document and synthetic images.
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let content = sample_content();
//! let json = content_json_with(|doc| {
//!     doc.as_object_mut().unwrap().remove("videos");
//! });
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! create_test_jpeg(&tmp.path().join("a.jpg"), 3000, 2000);
//! ```

use image::{ImageEncoder, RgbImage, RgbaImage};
use std::path::Path;

use crate::content::{Content, parse_content};

// =========================================================================
// Content fixtures
// =========================================================================

/// The sample document at `fixtures/content.json`, verbatim.
pub fn content_json() -> String {
    include_str!("../fixtures/content.json").to_string()
}

/// The sample document after an edit to its JSON tree.
///
/// Goes through `serde_json::Value`, which sorts object keys, so link order is
/// not preserved. Use [`content_json`] for ordering assertions.
pub fn content_json_with(edit: impl FnOnce(&mut serde_json::Value)) -> String {
    let mut doc: serde_json::Value = serde_json::from_str(&content_json()).unwrap();
    edit(&mut doc);
    doc.to_string()
}

/// The sample document, parsed.
pub fn sample_content() -> Content {
    parse_content(&content_json()).unwrap()
}

// =========================================================================
// Synthetic images
// =========================================================================

/// Write a gradient JPEG with the given dimensions.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::jpeg::JpegEncoder::new_with_quality(writer, 95)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

/// Write a gradient JPEG carrying an EXIF orientation tag.
pub fn create_test_jpeg_with_orientation(path: &Path, width: u32, height: u32, orientation: u16) {
    let [hi, lo] = orientation.to_be_bytes();
    #[rustfmt::skip]
    let tiff = [
        b'M', b'M', 0x00, 0x2A, 0x00, 0x00, 0x00, 0x08, // big-endian header, IFD at 8
        0x00, 0x01,                                     // one entry
        0x01, 0x12, 0x00, 0x03, 0x00, 0x00, 0x00, 0x01, // Orientation, SHORT, count 1
        hi, lo, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00,                         // no next IFD
    ];
    create_test_jpeg_with_exif(path, width, height, &tiff);
}

/// Write a gradient JPEG with `tiff` as the body of its APP1 `Exif` segment.
pub fn create_test_jpeg_with_exif(path: &Path, width: u32, height: u32, tiff: &[u8]) {
    create_test_jpeg(path, width, height);
    let jpeg = std::fs::read(path).unwrap();

    let mut payload = b"Exif\0\0".to_vec();
    payload.extend_from_slice(tiff);
    let len = u16::try_from(payload.len() + 2).unwrap();

    // APP1 goes right after SOI
    let mut out = jpeg[..2].to_vec();
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(&payload);
    out.extend_from_slice(&jpeg[2..]);
    std::fs::write(path, out).unwrap();
}

/// Write an RGBA PNG with a transparent left half.
pub fn create_test_png(path: &Path, width: u32, height: u32) {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        let alpha = if x < width / 2 { 0 } else { 255 };
        image::Rgba([(x % 256) as u8, (y % 256) as u8, 200, alpha])
    });
    img.save_with_format(path, image::ImageFormat::Png).unwrap();
}
