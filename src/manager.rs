//! Entry point for building chains and cleaning up images.
//!
//! An [`ImageManager`] pairs the read-only [`Settings`] with an
//! [`ImageBackend`]. It hands out [`ImageOperations`] chains bound to a source
//! image and deletes images together with their profile thumbnails.
//!
//! ```no_run
//! use image_chain::config::Settings;
//! use image_chain::imaging::OutputFormat;
//! use image_chain::manager::ImageManager;
//!
//! let manager = ImageManager::new(Settings::default());
//! let saved = manager
//!     .for_image("/tmp", "a.jpg")?
//!     .sepia()
//!     .resize(100, 100)
//!     .save("/tmp", "a.jpg", OutputFormat::Png, true, None)?;
//! assert_eq!(saved.location.file_name, "a_sep_100x100.png");
//! # Ok::<(), image_chain::manager::ManagerError>(())
//! ```
//!
//! Both the manager and its chains are cheap to clone: settings and backend
//! sit behind `Arc`.

use crate::chain::ImageOperations;
use crate::config::{ConfigError, ImageProfile, Settings};
use crate::delete;
use crate::imaging::{BackendError, ImageBackend, RustBackend};
use crate::naming;
use crate::types::DeleteReport;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ManagerError {
    #[error("invalid argument: {0}")]
    Argument(String),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("failed to decode {}: {message}", path.display())]
    Decode { path: PathBuf, message: String },
    #[error("failed to encode: {0}")]
    Encode(String),
    #[error("processing failed: {0}")]
    Processing(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

impl From<BackendError> for ManagerError {
    fn from(e: BackendError) -> Self {
        match e {
            BackendError::NotFound(path) => {
                ManagerError::NotFound(format!("image {}", path.display()))
            }
            BackendError::Decode { path, message } => ManagerError::Decode { path, message },
            BackendError::Encode(message) => ManagerError::Encode(message),
            BackendError::Processing(message) => ManagerError::Processing(message),
            BackendError::Io(e) => ManagerError::Io(e),
        }
    }
}

/// Factory for chains, holding the settings and backend every chain shares.
pub struct ImageManager<B: ImageBackend = RustBackend> {
    settings: Arc<Settings>,
    backend: Arc<B>,
}

impl<B: ImageBackend> Clone for ImageManager<B> {
    fn clone(&self) -> Self {
        Self {
            settings: Arc::clone(&self.settings),
            backend: Arc::clone(&self.backend),
        }
    }
}

impl ImageManager<RustBackend> {
    /// Manager backed by the `image` crate.
    pub fn new(settings: Settings) -> Self {
        Self::with_backend(settings, RustBackend::new())
    }
}

impl<B: ImageBackend> ImageManager<B> {
    pub fn with_backend(settings: Settings, backend: B) -> Self {
        Self {
            settings: Arc::new(settings),
            backend: Arc::new(backend),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Start a chain on `folder/file_name`.
    ///
    /// Nothing is read until a terminal call; a missing file surfaces then.
    pub fn for_image(
        &self,
        folder: impl Into<PathBuf>,
        file_name: impl Into<String>,
    ) -> Result<ImageOperations<B>, ManagerError> {
        ImageOperations::new(self.clone(), folder.into(), file_name.into())
    }

    /// Start a chain on a full path, split into folder and file name.
    pub fn for_path(&self, path: &Path) -> Result<ImageOperations<B>, ManagerError> {
        let (folder, file_name) = split_path(path)?;
        self.for_image(folder, file_name)
    }

    /// Copy an uploaded stream into the temporary folder and start a chain on it.
    ///
    /// The staged copy gets a unique name derived from `original_name`. An
    /// empty stream is rejected and its staged file removed.
    pub fn from_upload(
        &self,
        mut reader: impl Read,
        original_name: &str,
    ) -> Result<ImageOperations<B>, ManagerError> {
        let base_name = Path::new(original_name.trim())
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ManagerError::Argument("uploaded file name must not be empty".into()))?;
        let folder = self.settings.temporary_folder.as_ref().ok_or_else(|| {
            ManagerError::InvalidConfiguration("temporary_folder is not configured".into())
        })?;

        fs::create_dir_all(folder)?;
        let file_name = naming::unique_file_name(base_name);
        let path = folder.join(&file_name);

        let written = File::create(&path).and_then(|mut file| io::copy(&mut reader, &mut file));
        match written {
            Ok(0) => {
                fs::remove_file(&path)?;
                return Err(ManagerError::Argument(format!(
                    "uploaded file '{original_name}' is empty"
                )));
            }
            Ok(bytes) => debug!(path = %path.display(), bytes, "staged upload"),
            Err(e) => {
                // Partial copies are useless to a chain
                let _ = fs::remove_file(&path);
                return Err(e.into());
            }
        }

        self.for_image(folder.clone(), file_name)
    }

    /// Remove `folder/file_name` and, for every given profile, its thumbnails.
    ///
    /// Best effort: missing files are skipped and per-file failures are
    /// collected in the report.
    pub fn delete(
        &self,
        folder: &Path,
        file_name: &str,
        profiles: Option<&[ImageProfile]>,
    ) -> Result<DeleteReport, ManagerError> {
        delete::delete_image(folder, file_name, profiles)
    }

    /// [`delete`](Self::delete) for a full path.
    pub fn delete_path(
        &self,
        path: &Path,
        profiles: Option<&[ImageProfile]>,
    ) -> Result<DeleteReport, ManagerError> {
        let (folder, file_name) = split_path(path)?;
        self.delete(&folder, &file_name, profiles)
    }

    /// Look up a configured profile.
    ///
    /// Fails with `InvalidConfiguration` when no profiles are configured and
    /// `NotFound` when `name` is not one of them.
    pub fn profile(&self, name: &str) -> Result<&ImageProfile, ManagerError> {
        if self.settings.profiles.is_empty() {
            return Err(ManagerError::InvalidConfiguration(
                "no image profiles are configured".into(),
            ));
        }
        self.settings
            .find_profile(name)
            .ok_or_else(|| ManagerError::NotFound(format!("profile '{name}'")))
    }
}

fn split_path(path: &Path) -> Result<(PathBuf, String), ManagerError> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| ManagerError::Argument(format!("{} has no file name", path.display())))?;
    let folder = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or_else(|| ManagerError::Argument(format!("{} has no parent folder", path.display())))?;
    Ok((folder.to_path_buf(), file_name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Size;
    use crate::imaging::backend::tests::MockBackend;
    use crate::test_helpers::settings_with_profiles;
    use tempfile::TempDir;

    fn manager_with_temp(temp: &Path) -> ImageManager<MockBackend> {
        let settings = Settings {
            temporary_folder: Some(temp.to_path_buf()),
            ..Settings::default()
        };
        ImageManager::with_backend(settings, MockBackend::default())
    }

    #[test]
    fn for_image_rejects_empty_identifiers() {
        let manager = ImageManager::with_backend(Settings::default(), MockBackend::default());
        assert!(matches!(
            manager.for_image("", "a.jpg"),
            Err(ManagerError::Argument(_))
        ));
        assert!(matches!(
            manager.for_image("/tmp", ""),
            Err(ManagerError::Argument(_))
        ));
    }

    #[test]
    fn for_path_splits_folder_and_name() {
        let manager = ImageManager::with_backend(Settings::default(), MockBackend::default());
        let chain = manager.for_path(Path::new("/photos/2024/a.jpg")).unwrap();
        assert_eq!(chain.source_path(), PathBuf::from("/photos/2024/a.jpg"));
    }

    #[test]
    fn for_path_without_parent_is_argument_error() {
        let manager = ImageManager::with_backend(Settings::default(), MockBackend::default());
        assert!(matches!(
            manager.for_path(Path::new("a.jpg")),
            Err(ManagerError::Argument(_))
        ));
    }

    #[test]
    fn profile_lookup() {
        let settings = settings_with_profiles(vec![ImageProfile {
            name: "gallery".into(),
            sizes: vec![Size::new(10, 10)],
            keep_original_when_resizing: true,
        }]);
        let manager = ImageManager::with_backend(settings, MockBackend::default());

        assert_eq!(manager.profile("gallery").unwrap().name, "gallery");
        assert!(matches!(
            manager.profile("missing"),
            Err(ManagerError::NotFound(_))
        ));
    }

    #[test]
    fn profile_lookup_without_profiles_is_invalid_configuration() {
        let manager = ImageManager::with_backend(Settings::default(), MockBackend::default());
        assert!(matches!(
            manager.profile("gallery"),
            Err(ManagerError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn upload_is_staged_under_unique_name() {
        let tmp = TempDir::new().unwrap();
        let staging = tmp.path().join("staging");
        let manager = manager_with_temp(&staging);

        let chain = manager
            .from_upload(&b"not really a jpeg"[..], "holiday.jpg")
            .unwrap();
        let staged = chain.source_path();

        assert_eq!(staged.parent().unwrap(), staging);
        let name = staged.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("holiday-"));
        assert!(name.ends_with(".jpg"));
        assert_eq!(fs::read(&staged).unwrap(), b"not really a jpeg");
    }

    #[test]
    fn upload_uses_only_the_final_path_component() {
        let tmp = TempDir::new().unwrap();
        let manager = manager_with_temp(tmp.path());

        let chain = manager
            .from_upload(&b"data"[..], "../../etc/passwd.png")
            .unwrap();
        assert_eq!(chain.source_path().parent().unwrap(), tmp.path());
    }

    #[test]
    fn empty_upload_is_rejected_and_removed() {
        let tmp = TempDir::new().unwrap();
        let manager = manager_with_temp(tmp.path());

        let result = manager.from_upload(&b""[..], "empty.png");
        assert!(matches!(result, Err(ManagerError::Argument(_))));
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[test]
    fn upload_without_name_is_argument_error() {
        let tmp = TempDir::new().unwrap();
        let manager = manager_with_temp(tmp.path());
        assert!(matches!(
            manager.from_upload(&b"data"[..], "  "),
            Err(ManagerError::Argument(_))
        ));
    }

    #[test]
    fn upload_without_temporary_folder_is_invalid_configuration() {
        let manager = ImageManager::with_backend(Settings::default(), MockBackend::default());
        assert!(matches!(
            manager.from_upload(&b"data"[..], "a.png"),
            Err(ManagerError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn backend_errors_map_onto_manager_errors() {
        let err: ManagerError = BackendError::NotFound(PathBuf::from("/x/a.jpg")).into();
        assert!(matches!(err, ManagerError::NotFound(ref m) if m.contains("/x/a.jpg")));

        let err: ManagerError = BackendError::Processing("bad crop".into()).into();
        assert!(matches!(err, ManagerError::Processing(_)));
    }
}
