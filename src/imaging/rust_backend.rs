//! Pure Rust image processing backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, GIF, BMP, TIFF, WebP) | `image::ImageReader` with format sniffing |
//! | EXIF orientation | `ImageDecoder::orientation` + `DynamicImage::apply_orientation` |
//! | Identify | `ImageReader::into_dimensions` (header only) |
//! | Resize | `resize_exact` with `Lanczos3`, sized by [`calculations`](super::calculations) |
//! | Crop, flip, invert, gaussian blur | `image::DynamicImage` methods |
//! | Colour and stylisation filters | [`filters`](super::filters) |
//! | Encode | `JpegEncoder` (quality-aware), `DynamicImage::write_to` otherwise |

use super::backend::{BackendError, Dimensions, ImageBackend, WorkingImage};
use super::calculations::{
    calculate_center_offset, calculate_fill_dimensions, calculate_fit_dimensions, clamp_crop,
};
use super::filters::{self, ColorMatrix};
use super::operation::{FlipMode, Operation, ResizeMode};
use super::params::{OutputFormat, Quality};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::metadata::Orientation;
use image::{ColorType, DynamicImage, ImageDecoder, ImageReader, RgbaImage};
use std::borrow::Cow;
use std::io::Cursor;
use std::path::Path;

/// Glow and vignette blend towards black.
const EFFECT_COLOR: [f32; 3] = [0.0, 0.0, 0.0];

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn decode_error(path: &Path, e: impl std::fmt::Display) -> BackendError {
    BackendError::Decode {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

/// Run `f` against an RGBA8 view of the image and store the result back.
fn with_rgba(image: &mut DynamicImage, f: impl FnOnce(&mut RgbaImage)) {
    let mut buffer = image.to_rgba8();
    f(&mut buffer);
    *image = DynamicImage::ImageRgba8(buffer);
}

fn map_rgba(image: &mut DynamicImage, f: impl FnOnce(&RgbaImage) -> RgbaImage) {
    let buffer = f(&image.to_rgba8());
    *image = DynamicImage::ImageRgba8(buffer);
}

fn require_non_zero(name: &str, width: u32, height: u32) -> Result<(), BackendError> {
    if width == 0 || height == 0 {
        return Err(BackendError::Processing(format!(
            "{name} dimensions must be non-zero, got {width}x{height}"
        )));
    }
    Ok(())
}

impl ImageBackend for RustBackend {
    fn load(&self, path: &Path) -> Result<WorkingImage, BackendError> {
        let reader = ImageReader::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => BackendError::NotFound(path.to_path_buf()),
            _ => BackendError::Io(e),
        })?;
        let mut decoder = reader
            .with_guessed_format()?
            .into_decoder()
            .map_err(|e| decode_error(path, e))?;
        let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
        let image = DynamicImage::from_decoder(decoder).map_err(|e| decode_error(path, e))?;
        Ok(WorkingImage { image, orientation })
    }

    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        if !path.exists() {
            return Err(BackendError::NotFound(path.to_path_buf()));
        }
        let (width, height) = ImageReader::open(path)?
            .with_guessed_format()?
            .into_dimensions()
            .map_err(|e| decode_error(path, e))?;
        Ok(Dimensions { width, height })
    }

    fn apply(&self, working: &mut WorkingImage, op: &Operation) -> Result<(), BackendError> {
        let image = &mut working.image;
        match *op {
            Operation::Resize(opts) => {
                require_non_zero("resize", opts.width, opts.height)?;
                let source = (image.width(), image.height());
                let target = (opts.width, opts.height);
                *image = match opts.mode {
                    ResizeMode::Crop => {
                        let (fw, fh) = calculate_fill_dimensions(source, target);
                        let filled = image.resize_exact(fw, fh, FilterType::Lanczos3);
                        let (x, y) = calculate_center_offset((fw, fh), target);
                        filled.crop_imm(x, y, opts.width, opts.height)
                    }
                    ResizeMode::Max => {
                        let (w, h) = calculate_fit_dimensions(source, target);
                        image.resize_exact(w, h, FilterType::Lanczos3)
                    }
                    ResizeMode::Stretch => {
                        image.resize_exact(opts.width, opts.height, FilterType::Lanczos3)
                    }
                };
            }
            Operation::Crop { width, height } => {
                require_non_zero("crop", width, height)?;
                let (w, h) = clamp_crop((image.width(), image.height()), (width, height));
                *image = image.crop_imm(0, 0, w, h);
            }
            Operation::Flip(mode) => match mode {
                FlipMode::None => {}
                FlipMode::Horizontal => image.apply_orientation(Orientation::FlipHorizontal),
                FlipMode::Vertical => image.apply_orientation(Orientation::FlipVertical),
            },
            Operation::Brightness(amount) => with_rgba(image, |buf| {
                filters::apply_color_matrix(buf, &ColorMatrix::brightness(amount))
            }),
            Operation::Hue(degrees) => with_rgba(image, |buf| {
                filters::apply_color_matrix(buf, &ColorMatrix::hue(degrees))
            }),
            Operation::Saturate(amount) => with_rgba(image, |buf| {
                filters::apply_color_matrix(buf, &ColorMatrix::saturate(amount))
            }),
            Operation::Opacity(amount) => with_rgba(image, |buf| {
                filters::apply_color_matrix(buf, &ColorMatrix::opacity(amount))
            }),
            Operation::Lightness(amount) => with_rgba(image, |buf| {
                filters::apply_color_matrix(buf, &ColorMatrix::lightness(amount))
            }),
            Operation::Sepia => with_rgba(image, |buf| {
                filters::apply_color_matrix(buf, &ColorMatrix::SEPIA)
            }),
            Operation::Grayscale => with_rgba(image, |buf| {
                filters::apply_color_matrix(buf, &ColorMatrix::GRAYSCALE)
            }),
            Operation::BlackWhite => with_rgba(image, |buf| {
                filters::apply_color_matrix(buf, &ColorMatrix::BLACK_WHITE)
            }),
            Operation::Kodachrome => with_rgba(image, |buf| {
                filters::apply_color_matrix(buf, &ColorMatrix::KODACHROME)
            }),
            Operation::Polaroid => with_rgba(image, |buf| {
                filters::apply_color_matrix(buf, &ColorMatrix::POLAROID)
            }),
            Operation::GaussianBlur => *image = image.blur(filters::GAUSSIAN_SIGMA),
            Operation::BoxBlur => {
                map_rgba(image, |buf| filters::box_blur(buf, filters::BOX_BLUR_RADIUS))
            }
            Operation::BokehBlur => map_rgba(image, |buf| {
                filters::bokeh_blur(buf, filters::BOKEH_RADIUS, filters::BOKEH_GAMMA)
            }),
            Operation::Glow => with_rgba(image, |buf| filters::glow(buf, EFFECT_COLOR)),
            Operation::Vignette => with_rgba(image, |buf| filters::vignette(buf, EFFECT_COLOR)),
            Operation::OilPaint => map_rgba(image, |buf| {
                filters::oil_paint(buf, filters::OIL_PAINT_LEVELS, filters::OIL_PAINT_BRUSH)
            }),
            Operation::Pixelate => {
                with_rgba(image, |buf| filters::pixelate(buf, filters::PIXELATE_SIZE))
            }
            Operation::Invert => image.invert(),
            Operation::AutoOrient => {
                image.apply_orientation(working.orientation);
                working.orientation = Orientation::NoTransforms;
            }
        }
        Ok(())
    }

    fn resize_to_fit(
        &self,
        working: &WorkingImage,
        bounds: (u32, u32),
    ) -> Result<WorkingImage, BackendError> {
        require_non_zero("thumbnail", bounds.0, bounds.1)?;
        let (w, h) = calculate_fit_dimensions((working.image.width(), working.image.height()), bounds);
        Ok(WorkingImage::new(
            working.image.resize_exact(w, h, FilterType::Lanczos3),
        ))
    }

    fn encode(
        &self,
        working: &WorkingImage,
        format: OutputFormat,
        quality: Quality,
    ) -> Result<Vec<u8>, BackendError> {
        let mut bytes = Vec::new();
        let mut cursor = Cursor::new(&mut bytes);
        let image = encodable(&working.image, format);
        let result = match format {
            OutputFormat::Jpeg => {
                let encoder = JpegEncoder::new_with_quality(&mut cursor, quality.value() as u8);
                image.write_with_encoder(encoder)
            }
            _ => image.write_to(&mut cursor, format.to_image_format()),
        };
        result.map_err(|e| BackendError::Encode(format!("{format}: {e}")))?;
        Ok(bytes)
    }
}

/// Convert `image` to a pixel layout the target encoder accepts.
///
/// Layouts the encoder takes as-is are borrowed. PNG and TIFF keep 16-bit
/// depth; the other formats are 8-bit only. Alpha is kept only where the
/// source has it, and JPEG drops it.
fn encodable(image: &DynamicImage, format: OutputFormat) -> Cow<'_, DynamicImage> {
    use ColorType::*;

    let alpha = image.color().has_alpha();
    let converted = match (format, image.color()) {
        (OutputFormat::Jpeg, L8 | Rgb8) => return Cow::Borrowed(image),
        (OutputFormat::Jpeg, _) => DynamicImage::ImageRgb8(image.to_rgb8()),
        (OutputFormat::Gif, Rgba8) => return Cow::Borrowed(image),
        (OutputFormat::Gif, _) => DynamicImage::ImageRgba8(image.to_rgba8()),
        (OutputFormat::Png, L8 | La8 | Rgb8 | Rgba8 | L16 | La16 | Rgb16 | Rgba16) => {
            return Cow::Borrowed(image);
        }
        (OutputFormat::Tiff, L8 | Rgb8 | Rgba8 | L16 | Rgb16 | Rgba16) => {
            return Cow::Borrowed(image);
        }
        // TIFF has no grey+alpha layout
        (OutputFormat::Tiff, La8) => DynamicImage::ImageRgba8(image.to_rgba8()),
        (OutputFormat::Png | OutputFormat::Tiff, _) if alpha => {
            DynamicImage::ImageRgba16(image.to_rgba16())
        }
        (OutputFormat::Png | OutputFormat::Tiff, _) => DynamicImage::ImageRgb16(image.to_rgb16()),
        (OutputFormat::Bmp | OutputFormat::WebP, L8 | La8 | Rgb8 | Rgba8) => {
            return Cow::Borrowed(image);
        }
        (OutputFormat::Bmp | OutputFormat::WebP, _) if alpha => {
            DynamicImage::ImageRgba8(image.to_rgba8())
        }
        (OutputFormat::Bmp | OutputFormat::WebP, _) => DynamicImage::ImageRgb8(image.to_rgb8()),
    };
    Cow::Owned(converted)
}
