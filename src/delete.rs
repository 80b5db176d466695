//! Best-effort removal of an image and its profile thumbnails.
//!
//! Every candidate path is handled on its own: missing files are skipped,
//! and a file that cannot be removed is logged and reported without
//! stopping the rest.

use crate::config::ImageProfile;
use crate::manager::ManagerError;
use crate::naming;
use crate::types::DeleteReport;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Every path a delete looks at, thumbnails first, the base file last.
pub fn candidate_paths(
    folder: &Path,
    file_name: &str,
    profiles: Option<&[ImageProfile]>,
) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = profiles
        .unwrap_or_default()
        .iter()
        .flat_map(|profile| {
            profile
                .sizes
                .iter()
                .map(|size| naming::thumbnail_dir(folder, &profile.name, *size).join(file_name))
        })
        .collect();
    paths.push(folder.join(file_name));
    paths
}

pub fn delete_image(
    folder: &Path,
    file_name: &str,
    profiles: Option<&[ImageProfile]>,
) -> Result<DeleteReport, ManagerError> {
    if file_name.trim().is_empty() {
        return Err(ManagerError::Argument("file name must not be empty".into()));
    }

    let mut report = DeleteReport::default();
    for path in candidate_paths(folder, file_name, profiles) {
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(path = %path.display(), "deleted");
                report.removed.push(path);
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to delete");
                report.failed.push((path, e.to_string()));
            }
        }
    }
    Ok(report)
}
