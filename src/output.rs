//! CLI output formatting for every command.
//!
//! Output is aimed at the person editing the site: what was written, what
//! could not be found, and how much smaller the images got.
//!
//! # Output Format
//!
//! ## Build
//!
//! ```text
//! Building site (embedded images)...
//!   ⚠ Image not found: hero.jpg
//! ✓ Built index.html (412KB)
//!   Images embedded as base64
//! ```
//!
//! ## Optimize
//!
//! ```text
//! Backing up originals to Images_originals...
//!   ✓ Backup complete (12 files)
//!
//!   ✓ band.jpg                            2310KB →  284KB  (  88% smaller)  [1400x933]
//!   · logo.png                              12KB →   11KB  (already small)  [300x120]
//!   SKIP  notes.txt
//!   ✗ broken.jpg: ERROR - Processing failed: ...
//!
//! ============================================================
//!   Processed: 2 images
//!   Before:    2.3 MB
//!   After:     0.3 MB
//!   Saved:     2.0 MB (87% reduction)
//!   Originals: Images_originals
//! ============================================================
//! ```
//!
//! ## Check
//!
//! ```text
//! Content: content.json
//!     Albums: 2 (1 embedded, 1 flip card)
//!     Gear: 5 categories, 9 items (3 highlighted)
//!     ...
//! Images: 14 referenced, 1 missing
//!   ⚠ Image not found: hero.jpg
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure and do no I/O.

use crate::assets::{ImageMode, ImageWarning};
use crate::content::{Album, Content};
use crate::generate::BuildReport;
use crate::optimize::{BackupStatus, FileOutcome, OptimizeEvent, OptimizeSummary};
use crate::sections::HIGHLIGHTED_GEAR;
use std::path::Path;

/// Files shrinking by at most this percentage are reported as already small.
const NOTABLE_REDUCTION: f64 = 5.0;

const RULE_WIDTH: usize = 60;

fn kb(bytes: u64) -> u64 {
    bytes / 1024
}

fn mb(bytes: f64) -> f64 {
    bytes / 1024.0 / 1024.0
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

fn missing_image_line(filename: &str) -> String {
    format!("  \u{26a0} Image not found: {}", filename)
}

// ============================================================================
// Build
// ============================================================================

/// First line printed by `build`.
pub fn format_build_header(mode: ImageMode) -> String {
    format!("Building site ({})...", mode.label())
}

/// Format the outcome of a build: one warning per unresolved image, then the
/// written file.
pub fn format_build_report(report: &BuildReport) -> Vec<String> {
    let mut lines: Vec<String> = report
        .warnings
        .iter()
        .map(|ImageWarning { filename, .. }| missing_image_line(filename))
        .collect();

    lines.push(format!(
        "\u{2713} Built {} ({}KB)",
        report.output_path.display(),
        kb(report.bytes)
    ));
    lines.push(match report.mode {
        ImageMode::Embed => "  Images embedded as base64".to_string(),
        ImageMode::Link => {
            "  Images referenced as relative paths (deploy the images folder alongside)"
                .to_string()
        }
    });
    lines
}

/// Print build output to stdout.
pub fn print_build_report(report: &BuildReport) {
    for line in format_build_report(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Optimize
// ============================================================================

/// Format a single optimize progress event as display lines.
pub fn format_optimize_event(event: &OptimizeEvent) -> Vec<String> {
    match event {
        OptimizeEvent::Backup { path, status } => match status {
            BackupStatus::Created { files } => vec![
                format!("Backing up originals to {}...", path.display()),
                format!(
                    "  \u{2713} Backup complete ({})",
                    plural(*files, "file", "files")
                ),
                String::new(),
            ],
            BackupStatus::Existing => vec![
                format!(
                    "Backup already exists at {}, skipping backup",
                    path.display()
                ),
                String::new(),
            ],
        },
        OptimizeEvent::File(report) => {
            let name = &report.name;
            let line = match &report.outcome {
                FileOutcome::Skipped => format!("  SKIP  {}", name),
                FileOutcome::Failed { error } => format!("  \u{2717} {}: ERROR - {}", name, error),
                FileOutcome::Optimized {
                    before,
                    after,
                    dims,
                } => {
                    let sizes = format!("{:>6}KB \u{2192} {:>4}KB", kb(*before), kb(*after));
                    let dims = format!("[{}x{}]", dims.width, dims.height);
                    let reduction = report.outcome.reduction_percent().unwrap_or(0.0);
                    if reduction > NOTABLE_REDUCTION {
                        format!(
                            "  \u{2713} {:<35} {}  ({:>4.0}% smaller)  {}",
                            name, sizes, reduction, dims
                        )
                    } else {
                        format!("  \u{00b7} {:<35} {}  (already small)  {}", name, sizes, dims)
                    }
                }
            };
            vec![line]
        }
    }
}

/// Format the aggregate report printed after all files.
pub fn format_optimize_summary(summary: &OptimizeSummary) -> Vec<String> {
    let rule = "=".repeat(RULE_WIDTH);
    let mut lines = vec![
        String::new(),
        rule.clone(),
        format!("  Processed: {}", plural(summary.processed(), "image", "images")),
    ];
    if summary.failed() > 0 {
        lines.push(format!("  Failed:    {}", summary.failed()));
    }
    if summary.skipped() > 0 {
        lines.push(format!("  Skipped:   {}", summary.skipped()));
    }
    lines.push(format!(
        "  Before:    {:.1} MB",
        mb(summary.bytes_before() as f64)
    ));
    lines.push(format!(
        "  After:     {:.1} MB",
        mb(summary.bytes_after() as f64)
    ));
    lines.push(format!(
        "  Saved:     {:.1} MB ({:.0}% reduction)",
        mb(summary.bytes_saved() as f64),
        summary.reduction_percent()
    ));
    lines.push(format!("  Originals: {}", summary.backup_dir.display()));
    lines.push(rule);
    lines
}

/// Print the optimize summary to stdout.
pub fn print_optimize_summary(summary: &OptimizeSummary) {
    for line in format_optimize_summary(summary) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

/// Format a content inventory: section counts plus referenced images that
/// are not in the images directory.
pub fn format_check_output(content: &Content, content_path: &Path, missing: &[&str]) -> Vec<String> {
    let embedded = content
        .music
        .albums
        .iter()
        .filter(|a| matches!(a, Album::Embed(_)))
        .count();
    let flip_cards = content.music.albums.len() - embedded;
    let gear_items: usize = content.gear.categories.iter().map(|c| c.items.len()).sum();
    let highlighted = content.gear.categories.len().min(HIGHLIGHTED_GEAR);
    let video_embeds = content
        .videos
        .items
        .iter()
        .filter(|v| v.embed_id().is_some())
        .count();

    let mut lines = vec![
        format!("Content: {}", content_path.display()),
        format!(
            "    Albums: {} ({} embedded, {})",
            content.music.albums.len(),
            embedded,
            plural(flip_cards, "flip card", "flip cards")
        ),
        format!(
            "    Gear: {}, {} ({} highlighted)",
            plural(content.gear.categories.len(), "category", "categories"),
            plural(gear_items, "item", "items"),
            highlighted
        ),
        format!("    Services: {}", content.studio.services.len()),
        format!("    Classes: {}", content.teaching.classes.len()),
        format!("    Testimonials: {}", content.testimonials.items.len()),
        format!(
            "    Videos: {} ({} embedded)",
            content.videos.items.len(),
            video_embeds
        ),
        format!("    Streaming links: {}", content.music.streaming_links.len()),
        format!("    Socials: {}", content.contact.socials.len()),
    ];

    lines.push(format!(
        "Images: {} referenced, {} missing",
        content.image_refs().len(),
        missing.len()
    ));
    lines.extend(missing.iter().map(|f| missing_image_line(f)));
    lines
}

/// Print check output to stdout.
pub fn print_check_output(content: &Content, content_path: &Path, missing: &[&str]) {
    for line in format_check_output(content, content_path, missing) {
        println!("{}", line);
    }
}
