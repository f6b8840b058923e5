//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations the normalizer
//! needs: identify and normalize. The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend).

use super::params::NormalizeParams;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn as_tuple(self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl From<(u32, u32)> for Dimensions {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

/// Trait for image processing backends.
///
/// `Sync` so a single backend can be shared across rayon workers.
pub trait ImageBackend: Sync {
    /// Image dimensions as displayed, i.e. after the embedded orientation is
    /// applied.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Decode, reorient, resize to the target dimensions, and write the
    /// encoded result to `params.output`.
    fn normalize(&self, params: &NormalizeParams) -> Result<(), BackendError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::imaging::params::{OutputFormat, Quality};
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    /// Mock backend that records operations without executing them.
    /// Uses Mutex (not RefCell) so it is Sync and works with rayon's par_iter.
    ///
    /// Dimensions and failures are keyed by file name, since files may be
    /// visited in any order.
    #[derive(Default)]
    pub struct MockBackend {
        pub dimensions: Mutex<HashMap<String, Dimensions>>,
        pub failing: Mutex<HashSet<String>>,
        pub operations: Mutex<Vec<RecordedOp>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Identify(String),
        Normalize {
            source: String,
            output: String,
            width: u32,
            height: u32,
            format: OutputFormat,
            quality: u32,
        },
    }

    fn file_name(path: &Path) -> String {
        path.file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_dimensions(dims: &[(&str, u32, u32)]) -> Self {
            let map = dims
                .iter()
                .map(|&(name, w, h)| (name.to_string(), Dimensions::from((w, h))))
                .collect();
            Self {
                dimensions: Mutex::new(map),
                ..Self::default()
            }
        }

        /// Make `normalize` fail for the named file.
        pub fn fail_on(self, name: &str) -> Self {
            self.failing.lock().unwrap().insert(name.to_string());
            self
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }

        /// Recorded normalize operations, sorted by source path.
        pub fn normalized(&self) -> Vec<RecordedOp> {
            let mut ops: Vec<_> = self
                .get_operations()
                .into_iter()
                .filter(|op| matches!(op, RecordedOp::Normalize { .. }))
                .collect();
            ops.sort_by_key(|op| match op {
                RecordedOp::Normalize { source, .. } => source.clone(),
                RecordedOp::Identify(path) => path.clone(),
            });
            ops
        }
    }

    impl ImageBackend for MockBackend {
        fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::Identify(path.to_string_lossy().to_string()));

            self.dimensions
                .lock()
                .unwrap()
                .get(&file_name(path))
                .copied()
                .ok_or_else(|| BackendError::ProcessingFailed("No mock dimensions".to_string()))
        }

        fn normalize(&self, params: &NormalizeParams) -> Result<(), BackendError> {
            self.operations.lock().unwrap().push(RecordedOp::Normalize {
                source: params.source.to_string_lossy().to_string(),
                output: params.output.to_string_lossy().to_string(),
                width: params.width,
                height: params.height,
                format: params.format,
                quality: params.quality.value(),
            });
            if self.failing.lock().unwrap().contains(&file_name(&params.source)) {
                return Err(BackendError::ProcessingFailed("mock failure".to_string()));
            }
            Ok(())
        }
    }

    #[test]
    fn mock_records_identify() {
        let backend = MockBackend::with_dimensions(&[("image.jpg", 800, 600)]);

        let result = backend.identify(Path::new("/test/image.jpg")).unwrap();
        assert_eq!(result.width, 800);
        assert_eq!(result.height, 600);

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 1);
        assert!(matches!(&ops[0], RecordedOp::Identify(p) if p == "/test/image.jpg"));
    }

    #[test]
    fn mock_identify_unknown_file_errors() {
        let backend = MockBackend::new();
        assert!(backend.identify(Path::new("/x.jpg")).is_err());
    }

    #[test]
    fn mock_records_normalize() {
        let backend = MockBackend::new();

        backend
            .normalize(&NormalizeParams {
                source: "/a.png".into(),
                output: "/a.png".into(),
                width: 800,
                height: 600,
                format: OutputFormat::Png,
                quality: Quality::new(90),
            })
            .unwrap();

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 1);
        assert!(matches!(
            &ops[0],
            RecordedOp::Normalize {
                width: 800,
                height: 600,
                format: OutputFormat::Png,
                quality: 90,
                ..
            }
        ));
    }

    #[test]
    fn mock_fails_on_request() {
        let backend = MockBackend::new().fail_on("bad.jpg");
        let params = NormalizeParams {
            source: "/dir/bad.jpg".into(),
            output: "/dir/bad.jpg".into(),
            width: 1,
            height: 1,
            format: OutputFormat::Jpeg,
            quality: Quality::default(),
        };
        assert!(backend.normalize(&params).is_err());
        assert_eq!(backend.get_operations().len(), 1);
    }

    #[test]
    fn dimensions_tuple_conversions() {
        let dims = Dimensions::from((3, 4));
        assert_eq!(dims.as_tuple(), (3, 4));
    }
}
