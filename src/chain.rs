//! The immutable transformation chain.
//!
//! [`ImageOperations`] accumulates [`Operation`]s and their suffix tokens.
//! Every builder method borrows the receiver and returns a new chain, so a
//! shared prefix can be branched freely:
//!
//! ```text
//! base    = for_image("/tmp", "a.jpg").sepia()        steps: [sepia]
//! small   = base.resize(100, 100)                     steps: [sepia, resize]
//! blurred = base.gaussian_blur()                      steps: [sepia, gaussian-blur]
//! ```
//!
//! Nothing touches disk until a terminal call:
//! [`save`](ImageOperations::save), [`export`](ImageOperations::export) or
//! [`simulate_location`](ImageOperations::simulate_location). Each terminal
//! call loads the source afresh and runs every step in append order on one
//! working copy.

use crate::config::ImageProfile;
use crate::imaging::{
    FlipMode, ImageBackend, Operation, OutputFormat, Quality, ResizeOptions, RustBackend,
    WorkingImage,
};
use crate::manager::{ImageManager, ManagerError};
use crate::naming;
use crate::persist::{self, SaveRequest};
use crate::types::{EncodedImage, ImageLocation, ImageProperties};
use std::path::{Path, PathBuf};
use tracing::debug;

/// An ordered, append-only list of steps bound to a source image.
pub struct ImageOperations<B: ImageBackend = RustBackend> {
    manager: ImageManager<B>,
    source_folder: PathBuf,
    source_file_name: String,
    steps: Vec<Operation>,
    suffix: String,
}

impl<B: ImageBackend> Clone for ImageOperations<B> {
    fn clone(&self) -> Self {
        Self {
            manager: self.manager.clone(),
            source_folder: self.source_folder.clone(),
            source_file_name: self.source_file_name.clone(),
            steps: self.steps.clone(),
            suffix: self.suffix.clone(),
        }
    }
}

impl<B: ImageBackend> std::fmt::Debug for ImageOperations<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageOperations")
            .field("source_folder", &self.source_folder)
            .field("source_file_name", &self.source_file_name)
            .field("steps", &self.steps)
            .field("suffix", &self.suffix)
            .finish()
    }
}

impl<B: ImageBackend> ImageOperations<B> {
    pub(crate) fn new(
        manager: ImageManager<B>,
        source_folder: PathBuf,
        source_file_name: String,
    ) -> Result<Self, ManagerError> {
        if source_folder.as_os_str().is_empty() {
            return Err(ManagerError::Argument(
                "source folder must not be empty".into(),
            ));
        }
        if source_file_name.trim().is_empty() {
            return Err(ManagerError::Argument(
                "source file name must not be empty".into(),
            ));
        }
        Ok(Self {
            manager,
            source_folder,
            source_file_name,
            steps: Vec::new(),
            suffix: String::new(),
        })
    }

    fn push(&self, op: Operation) -> Self {
        let mut steps = self.steps.clone();
        let mut suffix = self.suffix.clone();
        suffix.push_str(&op.token());
        steps.push(op);
        Self {
            manager: self.manager.clone(),
            source_folder: self.source_folder.clone(),
            source_file_name: self.source_file_name.clone(),
            steps,
            suffix,
        }
    }

    // =========================================================================
    // Builder
    // =========================================================================

    /// Resize to exactly `width x height`, filling and centre-cropping.
    pub fn resize(&self, width: u32, height: u32) -> Self {
        self.resize_with(ResizeOptions::new(width, height))
    }

    /// Resize with an explicit [`ResizeMode`](crate::imaging::ResizeMode).
    pub fn resize_with(&self, options: ResizeOptions) -> Self {
        self.push(Operation::Resize(options))
    }

    /// Keep the top-left `width x height` rectangle.
    pub fn crop(&self, width: u32, height: u32) -> Self {
        self.push(Operation::Crop { width, height })
    }

    pub fn flip(&self, mode: FlipMode) -> Self {
        self.push(Operation::Flip(mode))
    }

    pub fn brightness(&self, amount: f32) -> Self {
        self.push(Operation::Brightness(amount))
    }

    pub fn hue(&self, degrees: f32) -> Self {
        self.push(Operation::Hue(degrees))
    }

    pub fn saturate(&self, amount: f32) -> Self {
        self.push(Operation::Saturate(amount))
    }

    pub fn sepia(&self) -> Self {
        self.push(Operation::Sepia)
    }

    pub fn grayscale(&self) -> Self {
        self.push(Operation::Grayscale)
    }

    pub fn black_white(&self) -> Self {
        self.push(Operation::BlackWhite)
    }

    pub fn gaussian_blur(&self) -> Self {
        self.push(Operation::GaussianBlur)
    }

    pub fn bokeh_blur(&self) -> Self {
        self.push(Operation::BokehBlur)
    }

    pub fn box_blur(&self) -> Self {
        self.push(Operation::BoxBlur)
    }

    pub fn kodachrome(&self) -> Self {
        self.push(Operation::Kodachrome)
    }

    pub fn polaroid(&self) -> Self {
        self.push(Operation::Polaroid)
    }

    pub fn glow(&self) -> Self {
        self.push(Operation::Glow)
    }

    pub fn vignette(&self) -> Self {
        self.push(Operation::Vignette)
    }

    pub fn oil_paint(&self) -> Self {
        self.push(Operation::OilPaint)
    }

    pub fn pixelate(&self) -> Self {
        self.push(Operation::Pixelate)
    }

    pub fn invert(&self) -> Self {
        self.push(Operation::Invert)
    }

    pub fn opacity(&self, amount: f32) -> Self {
        self.push(Operation::Opacity(amount))
    }

    pub fn lightness(&self, amount: f32) -> Self {
        self.push(Operation::Lightness(amount))
    }

    /// Rotate/flip according to the source's EXIF orientation.
    pub fn auto_orient(&self) -> Self {
        self.push(Operation::AutoOrient)
    }

    /// Append an already-built step.
    pub fn then(&self, op: Operation) -> Self {
        self.push(op)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn steps(&self) -> &[Operation] {
        &self.steps
    }

    /// Concatenated suffix tokens, in append order.
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn source_folder(&self) -> &Path {
        &self.source_folder
    }

    pub fn source_file_name(&self) -> &str {
        &self.source_file_name
    }

    pub fn source_path(&self) -> PathBuf {
        self.source_folder.join(&self.source_file_name)
    }

    pub fn manager(&self) -> &ImageManager<B> {
        &self.manager
    }

    /// Look up a configured profile. See [`ImageManager::profile`].
    pub fn profile(&self, name: &str) -> Result<&ImageProfile, ManagerError> {
        self.manager.profile(name)
    }

    // =========================================================================
    // Execution
    // =========================================================================

    /// Load the source and run every step on one working copy.
    ///
    /// Returns the suffix alongside the image when `add_suffixes` is set.
    pub fn apply(&self, add_suffixes: bool) -> Result<(WorkingImage, Option<String>), ManagerError> {
        let backend = self.manager.backend();
        let source = self.source_path();
        let mut image = backend.load(&source)?;
        debug!(source = %source.display(), steps = self.steps.len(), "loaded source");

        for op in &self.steps {
            backend.apply(&mut image, op)?;
            debug!(%op, "applied step");
        }

        let suffix = add_suffixes.then(|| self.suffix.clone());
        Ok((image, suffix))
    }

    // =========================================================================
    // Terminal calls
    // =========================================================================

    /// Run the chain and write the result under `folder`.
    ///
    /// The output is named after `file_name`, with the suffix inserted before
    /// the extension when `add_suffixes` is set. A non-empty `profile_name`
    /// also writes one thumbnail per profile size.
    pub fn save(
        &self,
        folder: impl AsRef<Path>,
        file_name: &str,
        format: OutputFormat,
        add_suffixes: bool,
        profile_name: Option<&str>,
    ) -> Result<ImageProperties, ManagerError> {
        persist::save(
            self,
            SaveRequest {
                folder: folder.as_ref(),
                file_name,
                format,
                add_suffixes,
                profile_name,
            },
        )
    }

    /// Run the chain and return the encoded bytes without writing anything.
    pub fn export(&self, format: OutputFormat) -> Result<EncodedImage, ManagerError> {
        let (image, _) = self.apply(false)?;
        let quality = Quality::new(self.manager.settings().images.quality);
        let bytes = self.manager.backend().encode(&image, format, quality)?;
        debug!(%format, bytes = bytes.len(), "exported image");
        Ok(EncodedImage::new(bytes, format))
    }

    /// [`export`](Self::export) as WebP, the preview format.
    pub fn export_webp(&self) -> Result<EncodedImage, ManagerError> {
        self.export(OutputFormat::WebP)
    }

    /// Where a suffixed save into `folder` would land. Touches nothing.
    pub fn simulate_location(
        &self,
        folder: impl Into<PathBuf>,
        file_name: &str,
        format: OutputFormat,
    ) -> Result<ImageLocation, ManagerError> {
        if file_name.trim().is_empty() {
            return Err(ManagerError::Argument(
                "output file name must not be empty".into(),
            ));
        }
        Ok(ImageLocation::new(
            folder,
            naming::output_file_name(file_name, Some(&self.suffix), format),
        ))
    }
}
