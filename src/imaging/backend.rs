//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait is the seam between the chain (which decides
//! *what* happens to an image, in which order, and where it ends up) and the
//! pixel work. It mirrors the three collaborator calls the pipeline needs:
//! load, mutate in place, encode. A fourth, [`ImageBackend::resize_to_fit`],
//! serves profile thumbnails.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Tests use a recording mock (see `tests::MockBackend`).

use super::operation::Operation;
use super::params::{OutputFormat, Quality};
use image::DynamicImage;
use image::metadata::Orientation;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("image not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("failed to decode {}: {message}", path.display())]
    Decode { path: PathBuf, message: String },
    #[error("failed to encode: {0}")]
    Encode(String),
    #[error("processing failed: {0}")]
    Processing(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Pixel size of an image, as reported by [`ImageBackend::identify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// The single in-memory copy a terminal call mutates.
///
/// Carries the orientation found in the source's EXIF data so that an
/// `auto_orient` step can apply it after decode.
#[derive(Debug, Clone)]
pub struct WorkingImage {
    pub image: DynamicImage,
    pub orientation: Orientation,
}

impl WorkingImage {
    pub fn new(image: DynamicImage) -> Self {
        Self {
            image,
            orientation: Orientation::NoTransforms,
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.image.width(),
            height: self.image.height(),
        }
    }
}

/// Trait for image processing backends.
pub trait ImageBackend: Sync {
    /// Decode the image at `path`.
    ///
    /// Fails with [`BackendError::NotFound`] when the file is absent and
    /// [`BackendError::Decode`] when it is not a readable image.
    fn load(&self, path: &Path) -> Result<WorkingImage, BackendError>;

    /// Read the dimensions of the image at `path` without decoding pixels.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Apply one step to the working image in place.
    fn apply(&self, image: &mut WorkingImage, op: &Operation) -> Result<(), BackendError>;

    /// Produce a copy scaled to fit inside `bounds`, aspect ratio preserved.
    fn resize_to_fit(
        &self,
        image: &WorkingImage,
        bounds: (u32, u32),
    ) -> Result<WorkingImage, BackendError>;

    /// Encode the working image into `format`.
    fn encode(
        &self,
        image: &WorkingImage,
        format: OutputFormat,
        quality: Quality,
    ) -> Result<Vec<u8>, BackendError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::imaging::calculations::calculate_fit_dimensions;
    use std::sync::Mutex;

    /// Mock backend that records operations without touching pixels.
    ///
    /// `load` only checks that the file exists and hands back a blank image of
    /// the configured dimensions; `encode` returns `encoded_len` zero bytes so
    /// tests control which of source and output is smaller.
    /// Uses Mutex (not RefCell) so it is Sync and works with rayon's par_iter.
    pub struct MockBackend {
        pub dimensions: Dimensions,
        pub encoded_len: usize,
        pub fail_resize_to: Option<(u32, u32)>,
        pub operations: Mutex<Vec<RecordedOp>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Load(String),
        Identify(String),
        Apply(String),
        ResizeToFit { width: u32, height: u32 },
        Encode(OutputFormat),
    }

    impl Default for MockBackend {
        fn default() -> Self {
            Self::new(Dimensions {
                width: 400,
                height: 300,
            })
        }
    }

    impl MockBackend {
        pub fn new(dimensions: Dimensions) -> Self {
            Self {
                dimensions,
                encoded_len: 16,
                fail_resize_to: None,
                operations: Mutex::new(Vec::new()),
            }
        }

        pub fn with_encoded_len(mut self, len: usize) -> Self {
            self.encoded_len = len;
            self
        }

        /// Make `resize_to_fit` fail for exactly these bounds.
        pub fn failing_resize_to(mut self, width: u32, height: u32) -> Self {
            self.fail_resize_to = Some((width, height));
            self
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }

        fn record(&self, op: RecordedOp) {
            self.operations.lock().unwrap().push(op);
        }
    }

    impl ImageBackend for MockBackend {
        fn load(&self, path: &Path) -> Result<WorkingImage, BackendError> {
            self.record(RecordedOp::Load(path.to_string_lossy().to_string()));
            if !path.exists() {
                return Err(BackendError::NotFound(path.to_path_buf()));
            }
            Ok(WorkingImage::new(DynamicImage::new_rgb8(
                self.dimensions.width,
                self.dimensions.height,
            )))
        }

        fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
            self.record(RecordedOp::Identify(path.to_string_lossy().to_string()));
            if !path.exists() {
                return Err(BackendError::NotFound(path.to_path_buf()));
            }
            Ok(self.dimensions)
        }

        fn apply(&self, _image: &mut WorkingImage, op: &Operation) -> Result<(), BackendError> {
            self.record(RecordedOp::Apply(op.to_string()));
            Ok(())
        }

        fn resize_to_fit(
            &self,
            image: &WorkingImage,
            bounds: (u32, u32),
        ) -> Result<WorkingImage, BackendError> {
            self.record(RecordedOp::ResizeToFit {
                width: bounds.0,
                height: bounds.1,
            });
            if self.fail_resize_to == Some(bounds) {
                return Err(BackendError::Processing(format!(
                    "resize to {}x{} failed",
                    bounds.0, bounds.1
                )));
            }
            let d = image.dimensions();
            let (w, h) = calculate_fit_dimensions((d.width, d.height), bounds);
            Ok(WorkingImage::new(DynamicImage::new_rgb8(w, h)))
        }

        fn encode(
            &self,
            _image: &WorkingImage,
            format: OutputFormat,
            _quality: Quality,
        ) -> Result<Vec<u8>, BackendError> {
            self.record(RecordedOp::Encode(format));
            Ok(vec![0; self.encoded_len])
        }
    }

    #[test]
    fn mock_load_missing_file_is_not_found() {
        let backend = MockBackend::default();
        let result = backend.load(Path::new("/nonexistent/image.jpg"));
        assert!(matches!(result, Err(BackendError::NotFound(_))));
        assert_eq!(
            backend.get_operations(),
            vec![RecordedOp::Load("/nonexistent/image.jpg".into())]
        );
    }

    #[test]
    fn mock_records_apply_in_order() {
        let backend = MockBackend::default();
        let mut img = WorkingImage::new(DynamicImage::new_rgb8(2, 2));
        backend.apply(&mut img, &Operation::Sepia).unwrap();
        backend.apply(&mut img, &Operation::Invert).unwrap();

        assert_eq!(
            backend.get_operations(),
            vec![
                RecordedOp::Apply("sepia".into()),
                RecordedOp::Apply("invert".into())
            ]
        );
    }

    #[test]
    fn mock_resize_to_fit_preserves_aspect() {
        let backend = MockBackend::default();
        let img = WorkingImage::new(DynamicImage::new_rgb8(400, 300));
        let thumb = backend.resize_to_fit(&img, (100, 100)).unwrap();
        assert_eq!(
            thumb.dimensions(),
            Dimensions {
                width: 100,
                height: 75
            }
        );
    }

    #[test]
    fn mock_encode_returns_configured_length() {
        let backend = MockBackend::default().with_encoded_len(42);
        let img = WorkingImage::new(DynamicImage::new_rgb8(2, 2));
        let bytes = backend
            .encode(&img, OutputFormat::Png, Quality::default())
            .unwrap();
        assert_eq!(bytes.len(), 42);
    }
}
