//! Writing a chain's result to disk.
//!
//! A save runs in this order:
//!
//! 1. Resolve the profile, if one was named. An unknown profile fails here,
//!    before anything is decoded or written.
//! 2. Run the chain and encode the result into `folder`.
//! 3. Keep-smaller: a chain with no steps that re-encodes into the format's
//!    canonical extension at a different path keeps whichever of the original
//!    and the re-encode is smaller. When the original wins it is moved into
//!    the output path.
//! 4. Thumbnails: the saved output is loaded once and scaled to fit each
//!    profile size, written to `folder/<profile>/<W>x<H>/<output name>`.
//! 5. A profile that does not keep originals removes the source image.
//!
//! A failure part-way through thumbnails leaves earlier thumbnails in place.

use crate::chain::ImageOperations;
use crate::config::{ImageProfile, Settings, Size};
use crate::imaging::{ImageBackend, OutputFormat, Quality, WorkingImage};
use crate::manager::ManagerError;
use crate::naming;
use crate::types::{ImageLocation, ImageProperties};
use rayon::prelude::*;
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, info};

/// Arguments of one save call.
#[derive(Debug, Clone, Copy)]
pub struct SaveRequest<'a> {
    pub folder: &'a Path,
    pub file_name: &'a str,
    pub format: OutputFormat,
    pub add_suffixes: bool,
    pub profile_name: Option<&'a str>,
}

pub(crate) fn save<B: ImageBackend>(
    chain: &ImageOperations<B>,
    request: SaveRequest<'_>,
) -> Result<ImageProperties, ManagerError> {
    if request.folder.as_os_str().is_empty() {
        return Err(ManagerError::Argument("output folder must not be empty".into()));
    }
    if request.file_name.trim().is_empty() {
        return Err(ManagerError::Argument(
            "output file name must not be empty".into(),
        ));
    }

    let manager = chain.manager();
    let settings = manager.settings();
    let backend = manager.backend();
    let quality = Quality::new(settings.images.quality);

    let profile = match request.profile_name.filter(|name| !name.is_empty()) {
        Some(name) => Some(manager.profile(name)?),
        None => None,
    };

    let (image, suffix) = chain.apply(request.add_suffixes)?;
    let location = ImageLocation::new(
        request.folder,
        naming::output_file_name(request.file_name, suffix.as_deref(), request.format),
    );

    fs::create_dir_all(&location.folder)?;
    let bytes = backend.encode(&image, request.format, quality)?;
    fs::write(&location.full_path, &bytes)?;
    debug!(path = %location.full_path.display(), bytes = bytes.len(), "wrote image");

    let mut size = bytes.len() as u64;
    let mut dimensions = image.dimensions();
    drop(image);

    let source = chain.source_path();
    if chain.steps().is_empty()
        && !same_file(&source, &location.full_path)
        && naming::has_canonical_extension(&location.file_name, request.format)
        && let Some(original_size) = keep_smaller(&source, &location.full_path, size)?
    {
        size = original_size;
        dimensions = backend.identify(&location.full_path)?;
    }

    let thumbnails = match profile {
        Some(profile) => write_thumbnails(backend, settings, &location, request.format, profile)?,
        None => Vec::new(),
    };

    if let Some(profile) = profile
        && !profile.keep_original_when_resizing
    {
        remove_source(&source, &location.full_path)?;
    }

    info!(
        path = %location.full_path.display(),
        format = %request.format,
        thumbnails = thumbnails.len(),
        "saved image"
    );

    Ok(ImageProperties {
        location,
        format: request.format,
        width: dimensions.width,
        height: dimensions.height,
        size,
        thumbnails,
    })
}

/// Replace `output` with `source` when the source is strictly smaller.
///
/// Returns the size of the file now at `output` if the source was moved there.
fn keep_smaller(source: &Path, output: &Path, output_size: u64) -> Result<Option<u64>, ManagerError> {
    let original_size = match fs::metadata(source) {
        Ok(meta) => meta.len(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    if original_size >= output_size {
        return Ok(None);
    }

    debug!(
        original = original_size,
        reencoded = output_size,
        "original is smaller, moving it into place"
    );
    fs::remove_file(output)?;
    move_file(source, output)?;
    Ok(Some(original_size))
}

/// Rename, falling back to copy + remove across filesystems.
fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    fs::copy(from, to)?;
    fs::remove_file(from)
}

fn write_thumbnails<B: ImageBackend>(
    backend: &B,
    settings: &Settings,
    location: &ImageLocation,
    format: OutputFormat,
    profile: &ImageProfile,
) -> Result<Vec<ImageProperties>, ManagerError> {
    let full = backend.load(&location.full_path)?;
    let quality = Quality::new(settings.images.quality);
    let render = |size: &Size| {
        write_thumbnail(backend, &full, location, format, quality, &profile.name, *size)
    };

    if settings.processing.parallel_thumbnails {
        profile.sizes.par_iter().map(render).collect()
    } else {
        profile.sizes.iter().map(render).collect()
    }
}

fn write_thumbnail<B: ImageBackend>(
    backend: &B,
    full: &WorkingImage,
    location: &ImageLocation,
    format: OutputFormat,
    quality: Quality,
    profile_name: &str,
    size: Size,
) -> Result<ImageProperties, ManagerError> {
    let dir = naming::thumbnail_dir(&location.folder, profile_name, size);
    fs::create_dir_all(&dir)?;

    let thumb = backend.resize_to_fit(full, (size.width, size.height))?;
    let bytes = backend.encode(&thumb, format, quality)?;
    let thumb_location = ImageLocation::new(dir, location.file_name.clone());
    fs::write(&thumb_location.full_path, &bytes)?;
    debug!(path = %thumb_location.full_path.display(), %size, "wrote thumbnail");

    let dimensions = thumb.dimensions();
    Ok(ImageProperties {
        location: thumb_location,
        format,
        width: dimensions.width,
        height: dimensions.height,
        size: bytes.len() as u64,
        thumbnails: Vec::new(),
    })
}

/// Remove the chain's source unless it is gone already or is the output itself.
fn remove_source(source: &Path, output: &Path) -> Result<(), ManagerError> {
    if same_file(source, output) {
        return Ok(());
    }
    match fs::remove_file(source) {
        Ok(()) => {
            debug!(path = %source.display(), "removed original");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
