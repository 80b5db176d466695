//! Shared result types returned by terminal calls.
//!
//! These are plain data: produced once by a save, delete or export and never
//! mutated afterwards. They serialize to JSON for `image-chain --json`.

use crate::imaging::OutputFormat;
use serde::Serialize;
use std::path::PathBuf;

/// Where an image lives on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageLocation {
    pub folder: PathBuf,
    pub file_name: String,
    /// `folder` joined with `file_name`.
    pub full_path: PathBuf,
}

impl ImageLocation {
    pub fn new(folder: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        let folder = folder.into();
        let file_name = file_name.into();
        let full_path = folder.join(&file_name);
        Self {
            folder,
            file_name,
            full_path,
        }
    }

    pub fn exists(&self) -> bool {
        self.full_path.is_file()
    }
}

/// Result of a successful save: the written image plus any profile thumbnails.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageProperties {
    pub location: ImageLocation,
    pub format: OutputFormat,
    pub width: u32,
    pub height: u32,
    /// Size of the written file in bytes.
    pub size: u64,
    /// One entry per profile size, in declaration order. Thumbnails never
    /// carry thumbnails of their own.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub thumbnails: Vec<ImageProperties>,
}

/// Encoded image bytes returned by `export`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub format: OutputFormat,
    pub mime_type: &'static str,
}

impl EncodedImage {
    pub fn new(bytes: Vec<u8>, format: OutputFormat) -> Self {
        Self {
            bytes,
            format,
            mime_type: format.mime_type(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Outcome of a best-effort delete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeleteReport {
    /// Files that existed and were removed.
    pub removed: Vec<PathBuf>,
    /// Files that existed but could not be removed, with the reason.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<(PathBuf, String)>,
}

impl DeleteReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}
