//! In-place image optimization.
//!
//! Shrinks the site's source images so the generated page stays light:
//!
//! 1. **Backup**: the whole images directory is copied to the backup
//!    directory once. If the backup already exists it is left untouched, so
//!    repeated runs never overwrite the true originals.
//! 2. **Normalize**: every regular file with a supported extension is
//!    reoriented, downscaled into the bounding box, and re-encoded in place
//!    (see [`imaging`](crate::imaging)). Other files are skipped.
//! 3. **Report**: per-file results and an aggregate [`OptimizeSummary`].
//!
//! ## Failure Policy
//!
//! A missing images directory or a failed backup aborts before any file is
//! touched. A file that fails to decode or encode is reported and the run
//! continues with the next one.
//!
//! ## Parallel Processing
//!
//! Files are independent, so after the backup completed they are processed
//! in parallel using [rayon](https://docs.rs/rayon). Progress events are sent
//! as each file completes; the summary lists files in sorted filename order.

use crate::imaging::{Dimensions, ImageBackend, NormalizeConfig, RustBackend, normalize_in_place};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum OptimizeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("images directory not found: {0}")]
    ImagesDirMissing(PathBuf),
    #[error("failed to back up {from} to {to}: {source}")]
    Backup {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
}

/// Inputs for an optimization run, already resolved against the project root.
#[derive(Debug, Clone)]
pub struct OptimizeOptions {
    pub images_dir: PathBuf,
    pub backup_dir: PathBuf,
    pub normalize: NormalizeConfig,
}

/// What the backup step found or did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupStatus {
    /// Backup taken now; number of files copied.
    Created { files: usize },
    /// A backup was already present and left untouched.
    Existing,
}

/// Progress events streamed while optimizing.
#[derive(Debug, Clone, PartialEq)]
pub enum OptimizeEvent {
    Backup {
        path: PathBuf,
        status: BackupStatus,
    },
    File(FileReport),
}

/// Result for one directory entry.
#[derive(Debug, Clone, PartialEq)]
pub struct FileReport {
    pub name: String,
    pub outcome: FileOutcome,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    /// Extension not supported, file left alone.
    Skipped,
    Optimized {
        before: u64,
        after: u64,
        dims: Dimensions,
    },
    Failed {
        error: String,
    },
}

impl FileOutcome {
    /// Size reduction in percent, negative when the file grew.
    pub fn reduction_percent(&self) -> Option<f64> {
        match self {
            FileOutcome::Optimized { before, after, .. } => Some(reduction(*before, *after)),
            _ => None,
        }
    }
}

fn reduction(before: u64, after: u64) -> f64 {
    if before == 0 {
        0.0
    } else {
        (1.0 - after as f64 / before as f64) * 100.0
    }
}

/// Aggregate result of an optimization run.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizeSummary {
    pub backup_dir: PathBuf,
    pub backup: BackupStatus,
    /// Per-file results in sorted filename order.
    pub files: Vec<FileReport>,
}

impl OptimizeSummary {
    fn optimized(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.files.iter().filter_map(|f| match f.outcome {
            FileOutcome::Optimized { before, after, .. } => Some((before, after)),
            _ => None,
        })
    }

    pub fn processed(&self) -> usize {
        self.optimized().count()
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&FileOutcome) -> bool) -> usize {
        self.files.iter().filter(|f| pred(&f.outcome)).count()
    }

    /// Total bytes of processed files before optimization.
    pub fn bytes_before(&self) -> u64 {
        self.optimized().map(|(b, _)| b).sum()
    }

    /// Total bytes of processed files after optimization.
    pub fn bytes_after(&self) -> u64 {
        self.optimized().map(|(_, a)| a).sum()
    }

    /// Bytes saved; negative if re-encoding grew the set.
    pub fn bytes_saved(&self) -> i64 {
        self.bytes_before() as i64 - self.bytes_after() as i64
    }

    pub fn reduction_percent(&self) -> f64 {
        reduction(self.bytes_before(), self.bytes_after())
    }
}

// ============================================================================
// Backup
// ============================================================================

/// Copy `source` to `backup` unless `backup` already exists.
///
/// The copy goes to a sibling staging directory that is renamed into place
/// only once every file arrived, so `backup` never exists half-populated.
pub fn ensure_backup(source: &Path, backup: &Path) -> Result<BackupStatus, OptimizeError> {
    if backup.exists() {
        debug!("backup {} exists, leaving it untouched", backup.display());
        return Ok(BackupStatus::Existing);
    }
    let backup_error = |e: std::io::Error| OptimizeError::Backup {
        from: source.to_path_buf(),
        to: backup.to_path_buf(),
        source: e,
    };

    let staging = staging_path(backup);
    if staging.exists() {
        debug!("removing stale staging dir {}", staging.display());
        fs::remove_dir_all(&staging).map_err(backup_error)?;
    }

    let files = match copy_dir_recursive(source, &staging) {
        Ok(files) => files,
        Err(e) => {
            fs::remove_dir_all(&staging).ok();
            return Err(backup_error(e));
        }
    };
    if let Err(e) = fs::rename(&staging, backup) {
        fs::remove_dir_all(&staging).ok();
        return Err(backup_error(e));
    }
    Ok(BackupStatus::Created { files })
}

/// `Images_originals` → `Images_originals.partial`, next to the backup.
fn staging_path(backup: &Path) -> PathBuf {
    let mut name = backup.file_name().unwrap_or_default().to_os_string();
    name.push(".partial");
    backup.with_file_name(name)
}

fn copy_dir_recursive(from: &Path, to: &Path) -> std::io::Result<usize> {
    fs::create_dir_all(to)?;
    let mut copied = 0;
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let target = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copied += copy_dir_recursive(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}

// ============================================================================
// Normalization
// ============================================================================

/// Regular files directly inside `dir`, sorted by name.
fn list_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn optimize_file(
    backend: &impl ImageBackend,
    path: &Path,
    config: &NormalizeConfig,
) -> FileOutcome {
    if !crate::imaging::is_supported(path) {
        return FileOutcome::Skipped;
    }

    let before = match fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(e) => return FileOutcome::Failed { error: e.to_string() },
    };

    let result = normalize_in_place(backend, path, config).and_then(|normalized| {
        let after = fs::metadata(path)?.len();
        Ok((normalized, after))
    });

    match result {
        Ok((normalized, after)) => {
            debug!(
                "{}: {:?} → {:?}",
                path.display(),
                normalized.original,
                normalized.output
            );
            FileOutcome::Optimized {
                before,
                after,
                dims: normalized.output,
            }
        }
        Err(e) => {
            warn!("{}: {}", path.display(), e);
            FileOutcome::Failed {
                error: e.to_string(),
            }
        }
    }
}

/// Optimize the images directory with the production backend.
pub fn optimize(
    options: &OptimizeOptions,
    progress: Option<Sender<OptimizeEvent>>,
) -> Result<OptimizeSummary, OptimizeError> {
    optimize_with_backend(&RustBackend::new(), options, progress)
}

/// Optimize using a specific backend (allows testing with mock).
pub fn optimize_with_backend(
    backend: &impl ImageBackend,
    options: &OptimizeOptions,
    progress: Option<Sender<OptimizeEvent>>,
) -> Result<OptimizeSummary, OptimizeError> {
    if !options.images_dir.is_dir() {
        return Err(OptimizeError::ImagesDirMissing(options.images_dir.clone()));
    }

    let backup = ensure_backup(&options.images_dir, &options.backup_dir)?;
    if let Some(tx) = &progress {
        tx.send(OptimizeEvent::Backup {
            path: options.backup_dir.clone(),
            status: backup,
        })
        .ok();
    }

    let paths = list_files(&options.images_dir)?;
    debug!("{} files in {}", paths.len(), options.images_dir.display());

    // Events go out as each file finishes; the summary keeps sorted order.
    let files: Vec<FileReport> = paths
        .par_iter()
        .map(|path| {
            let report = FileReport {
                name: file_name(path),
                outcome: optimize_file(backend, path, &options.normalize),
            };
            if let Some(tx) = &progress {
                tx.send(OptimizeEvent::File(report.clone())).ok();
            }
            report
        })
        .collect();

    Ok(OptimizeSummary {
        backup_dir: options.backup_dir.clone(),
        backup,
        files,
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use crate::imaging::{OutputFormat, Quality};
    use std::sync::mpsc;
    use tempfile::TempDir;

    fn options(root: &Path) -> OptimizeOptions {
        OptimizeOptions {
            images_dir: root.join("Images"),
            backup_dir: root.join("Images_originals"),
            normalize: NormalizeConfig::default(),
        }
    }

    fn setup(files: &[(&str, &[u8])]) -> TempDir {
        let tmp = TempDir::new().unwrap();
        let images = tmp.path().join("Images");
        fs::create_dir_all(&images).unwrap();
        for (name, bytes) in files {
            fs::write(images.join(name), bytes).unwrap();
        }
        tmp
    }

    fn dir_stats(dir: &Path) -> (usize, u64) {
        let mut count = 0;
        let mut bytes = 0;
        for entry in fs::read_dir(dir).unwrap() {
            let entry = entry.unwrap();
            count += 1;
            bytes += entry.metadata().unwrap().len();
        }
        (count, bytes)
    }

    #[test]
    fn missing_images_dir_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let backend = MockBackend::new();
        let result = optimize_with_backend(&backend, &options(tmp.path()), None);
        assert!(matches!(result, Err(OptimizeError::ImagesDirMissing(_))));
        assert!(!tmp.path().join("Images_originals").exists());
    }

    #[test]
    fn backup_created_once_and_left_alone() {
        let tmp = setup(&[("a.jpg", b"aaaa"), ("b.png", b"bb")]);
        let opts = options(tmp.path());
        let backend = MockBackend::with_dimensions(&[("a.jpg", 10, 10), ("b.png", 10, 10)]);

        let first = optimize_with_backend(&backend, &opts, None).unwrap();
        assert_eq!(first.backup, BackupStatus::Created { files: 2 });
        let after_first = dir_stats(&opts.backup_dir);

        // Simulate a changed working copy between runs
        fs::write(opts.images_dir.join("a.jpg"), b"changed-after-first-run").unwrap();

        let second = optimize_with_backend(&backend, &opts, None).unwrap();
        assert_eq!(second.backup, BackupStatus::Existing);
        assert_eq!(dir_stats(&opts.backup_dir), after_first);
        assert_eq!(fs::read(opts.backup_dir.join("a.jpg")).unwrap(), b"aaaa");
    }

    #[test]
    fn backup_copies_nested_directories() {
        let tmp = setup(&[("a.jpg", b"a")]);
        let nested = tmp.path().join("Images/raw");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("x.jpg"), b"x").unwrap();

        let status = ensure_backup(
            &tmp.path().join("Images"),
            &tmp.path().join("Images_originals"),
        )
        .unwrap();
        assert_eq!(status, BackupStatus::Created { files: 2 });
        assert!(tmp.path().join("Images_originals/raw/x.jpg").exists());
    }

    #[test]
    fn unsupported_files_skipped_and_subdirs_ignored() {
        let tmp = setup(&[("notes.txt", b"hi"), ("photo.JPG", b"jpg")]);
        fs::create_dir_all(tmp.path().join("Images/sub.jpg")).unwrap();
        let backend = MockBackend::with_dimensions(&[("photo.JPG", 100, 100)]);

        let summary = optimize_with_backend(&backend, &options(tmp.path()), None).unwrap();

        let names: Vec<_> = summary.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["notes.txt", "photo.JPG"]);
        assert_eq!(summary.files[0].outcome, FileOutcome::Skipped);
        assert_eq!(summary.skipped(), 1);
        assert_eq!(summary.processed(), 1);
        assert_eq!(backend.normalized().len(), 1);
    }

    #[test]
    fn failure_is_reported_and_run_continues() {
        let tmp = setup(&[("a.jpg", b"aaaa"), ("b.jpg", b"bbbb"), ("c.jpg", b"cccc")]);
        let backend =
            MockBackend::with_dimensions(&[("a.jpg", 10, 10), ("b.jpg", 10, 10), ("c.jpg", 10, 10)])
                .fail_on("b.jpg");

        let summary = optimize_with_backend(&backend, &options(tmp.path()), None).unwrap();

        assert_eq!(summary.processed(), 2);
        assert_eq!(summary.failed(), 1);
        assert!(matches!(
            &summary.files[1].outcome,
            FileOutcome::Failed { error } if error.contains("mock failure")
        ));
        assert_eq!(summary.files[2].name, "c.jpg");
    }

    #[test]
    fn plans_use_configured_bounds_and_formats() {
        let tmp = setup(&[("big.jpg", b"j"), ("logo.png", b"p"), ("pic.webp", b"w")]);
        let backend = MockBackend::with_dimensions(&[
            ("big.jpg", 3000, 2000),
            ("logo.png", 500, 500),
            ("pic.webp", 1000, 3000),
        ]);
        let mut opts = options(tmp.path());
        opts.normalize.quality = Quality::new(75);

        optimize_with_backend(&backend, &opts, None).unwrap();

        let ops = backend.normalized();
        assert_eq!(ops.len(), 3);
        assert!(matches!(
            &ops[0],
            RecordedOp::Normalize { width: 1400, height: 933, format: OutputFormat::Jpeg, quality: 75, .. }
        ));
        assert!(matches!(
            &ops[1],
            RecordedOp::Normalize { width: 500, height: 500, format: OutputFormat::Png, .. }
        ));
        assert!(matches!(
            &ops[2],
            RecordedOp::Normalize { width: 466, height: 1400, format: OutputFormat::Jpeg, .. }
        ));
    }

    #[test]
    fn events_stream_backup_then_every_file() {
        let tmp = setup(&[("b.jpg", b"b"), ("a.jpg", b"a"), ("c.txt", b"c")]);
        let backend = MockBackend::with_dimensions(&[("a.jpg", 1, 1), ("b.jpg", 1, 1)]);
        let (tx, rx) = mpsc::channel();

        optimize_with_backend(&backend, &options(tmp.path()), Some(tx)).unwrap();
        let events: Vec<_> = rx.iter().collect();

        assert_eq!(events.len(), 4);
        assert!(matches!(
            &events[0],
            OptimizeEvent::Backup { status: BackupStatus::Created { files: 3 }, .. }
        ));
        let mut names: Vec<_> = events[1..]
            .iter()
            .map(|e| match e {
                OptimizeEvent::File(report) => report.name.clone(),
                OptimizeEvent::Backup { .. } => panic!("unexpected backup event"),
            })
            .collect();
        // Completion order varies between runs
        names.sort();
        assert_eq!(names, vec!["a.jpg", "b.jpg", "c.txt"]);
    }

    #[test]
    fn failed_backup_leaves_no_backup_behind() {
        let tmp = setup(&[("a.jpg", b"aaaa")]);
        let source = tmp.path().join("Images");
        let backup = tmp.path().join("Images_originals");
        // A directory that cannot be read stands in for any mid-copy failure
        let missing = tmp.path().join("nowhere");

        assert!(ensure_backup(&missing, &backup).is_err());
        assert!(!backup.exists());
        assert!(!tmp.path().join("Images_originals.partial").exists());

        let status = ensure_backup(&source, &backup).unwrap();
        assert_eq!(status, BackupStatus::Created { files: 1 });
    }

    #[test]
    fn stale_staging_dir_is_replaced() {
        let tmp = setup(&[("a.jpg", b"aaaa")]);
        let staging = tmp.path().join("Images_originals.partial");
        fs::create_dir_all(&staging).unwrap();
        fs::write(staging.join("leftover.jpg"), b"old").unwrap();

        let backup = tmp.path().join("Images_originals");
        ensure_backup(&tmp.path().join("Images"), &backup).unwrap();

        assert!(backup.join("a.jpg").exists());
        assert!(!backup.join("leftover.jpg").exists());
        assert!(!staging.exists());
    }

    #[cfg(unix)]
    #[test]
    fn dangling_symlink_aborts_before_any_file_changes() {
        let tmp = setup(&[("photo.jpg", b"original")]);
        let images = tmp.path().join("Images");
        std::os::unix::fs::symlink(tmp.path().join("gone.jpg"), images.join("a_link.jpg"))
            .unwrap();
        let backend = MockBackend::with_dimensions(&[("photo.jpg", 3000, 2000)]);
        let opts = options(tmp.path());

        for _ in 0..2 {
            let result = optimize_with_backend(&backend, &opts, None);
            assert!(matches!(result, Err(OptimizeError::Backup { .. })));
            assert!(!opts.backup_dir.exists());
        }
        assert!(backend.normalized().is_empty());
        assert_eq!(fs::read(images.join("photo.jpg")).unwrap(), b"original");
    }

    #[test]
    fn summary_totals_count_only_processed_files() {
        let summary = OptimizeSummary {
            backup_dir: PathBuf::from("Images_originals"),
            backup: BackupStatus::Existing,
            files: vec![
                FileReport {
                    name: "a.jpg".into(),
                    outcome: FileOutcome::Optimized {
                        before: 4_000,
                        after: 1_000,
                        dims: Dimensions::from((10, 10)),
                    },
                },
                FileReport {
                    name: "b.jpg".into(),
                    outcome: FileOutcome::Failed {
                        error: "bad".into(),
                    },
                },
                FileReport {
                    name: "c.png".into(),
                    outcome: FileOutcome::Optimized {
                        before: 1_000,
                        after: 1_000,
                        dims: Dimensions::from((10, 10)),
                    },
                },
            ],
        };
        assert_eq!(summary.processed(), 2);
        assert_eq!(summary.bytes_before(), 5_000);
        assert_eq!(summary.bytes_after(), 2_000);
        assert_eq!(summary.bytes_saved(), 3_000);
        assert!((summary.reduction_percent() - 60.0).abs() < 1e-9);
    }

    #[test]
    fn empty_summary_has_zero_reduction() {
        let summary = OptimizeSummary {
            backup_dir: PathBuf::new(),
            backup: BackupStatus::Existing,
            files: vec![],
        };
        assert_eq!(summary.reduction_percent(), 0.0);
        assert_eq!(summary.bytes_saved(), 0);
    }

    #[test]
    fn file_outcome_reduction() {
        let grown = FileOutcome::Optimized {
            before: 100,
            after: 150,
            dims: Dimensions::from((1, 1)),
        };
        assert_eq!(grown.reduction_percent(), Some(-50.0));
        assert_eq!(FileOutcome::Skipped.reduction_percent(), None);
    }
}
