//! The transformation steps a chain can accumulate.
//!
//! An [`Operation`] is pure data: it says *what* to do to the working image
//! and carries its own parameters. The backend decides *how*. Every variant
//! maps to exactly one suffix token via [`Operation::token`].
//!
//! Operations also have a compact text form used by the CLI:
//!
//! ```text
//! sepia
//! resize=200x100          (fill + centre crop)
//! resize=200x100:max      (fit within, aspect preserved)
//! crop=120x80
//! flip=vertical
//! brightness=1.5
//! ```

use super::suffixes;
use std::fmt;
use std::str::FromStr;

/// How a resize reconciles the source aspect ratio with the target box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResizeMode {
    /// Scale to cover the box, then centre-crop to exactly `width x height`.
    #[default]
    Crop,
    /// Scale to fit inside the box. One side may come out shorter.
    Max,
    /// Scale to exactly `width x height`, ignoring aspect ratio.
    Stretch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeOptions {
    pub width: u32,
    pub height: u32,
    pub mode: ResizeMode,
}

impl ResizeOptions {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            mode: ResizeMode::default(),
        }
    }

    pub fn with_mode(mut self, mode: ResizeMode) -> Self {
        self.mode = mode;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FlipMode {
    None,
    #[default]
    Horizontal,
    Vertical,
}

/// A single step in a transformation chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operation {
    Resize(ResizeOptions),
    /// Keep the `width x height` rectangle anchored at the top-left corner.
    Crop { width: u32, height: u32 },
    Flip(FlipMode),
    /// Multiplies every channel; `1.0` leaves the image unchanged.
    Brightness(f32),
    /// Rotates hue by the given number of degrees.
    Hue(f32),
    /// `0.0` is fully desaturated, `1.0` unchanged.
    Saturate(f32),
    Sepia,
    Grayscale,
    BlackWhite,
    GaussianBlur,
    BokehBlur,
    BoxBlur,
    Kodachrome,
    Polaroid,
    Glow,
    Vignette,
    OilPaint,
    Pixelate,
    Invert,
    /// Multiplies alpha; `0.0` is fully transparent.
    Opacity(f32),
    /// Offsets every channel by `amount - 1.0`; `0.0` is black.
    Lightness(f32),
    AutoOrient,
}

impl Operation {
    /// The suffix token this step contributes to an output file name.
    pub fn token(&self) -> String {
        match self {
            Operation::Resize(opts) => format!("_{}x{}", opts.width, opts.height),
            Operation::Crop { width, height } => format!("{}{}_{}", suffixes::CROP, width, height),
            Operation::Flip(_) => suffixes::FLIP.to_string(),
            Operation::Brightness(amount) => format!("{}{}", suffixes::BRIGHTNESS, amount),
            Operation::Hue(degrees) => format!("{}{}", suffixes::HUE, degrees),
            Operation::Saturate(amount) => format!("{}{}", suffixes::SATURATE, amount),
            Operation::Sepia => suffixes::SEPIA.to_string(),
            Operation::Grayscale => suffixes::GRAYSCALE.to_string(),
            Operation::BlackWhite => suffixes::BLACK_WHITE.to_string(),
            Operation::GaussianBlur => suffixes::GAUSSIAN_BLUR.to_string(),
            Operation::BokehBlur => suffixes::BOKEH_BLUR.to_string(),
            Operation::BoxBlur => suffixes::BOX_BLUR.to_string(),
            Operation::Kodachrome => suffixes::KODACHROME.to_string(),
            Operation::Polaroid => suffixes::POLAROID.to_string(),
            Operation::Glow => suffixes::GLOW.to_string(),
            Operation::Vignette => suffixes::VIGNETTE.to_string(),
            Operation::OilPaint => suffixes::OIL_PAINT.to_string(),
            Operation::Pixelate => suffixes::PIXELATE.to_string(),
            Operation::Invert => suffixes::INVERT.to_string(),
            Operation::Opacity(amount) => format!("{}{}", suffixes::OPACITY, amount),
            Operation::Lightness(amount) => format!("{}{}", suffixes::LIGHTNESS, amount),
            Operation::AutoOrient => suffixes::AUTO_ORIENT.to_string(),
        }
    }

    /// Name used in the text form and in log output.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Resize(_) => "resize",
            Operation::Crop { .. } => "crop",
            Operation::Flip(_) => "flip",
            Operation::Brightness(_) => "brightness",
            Operation::Hue(_) => "hue",
            Operation::Saturate(_) => "saturate",
            Operation::Sepia => "sepia",
            Operation::Grayscale => "grayscale",
            Operation::BlackWhite => "black-white",
            Operation::GaussianBlur => "gaussian-blur",
            Operation::BokehBlur => "bokeh-blur",
            Operation::BoxBlur => "box-blur",
            Operation::Kodachrome => "kodachrome",
            Operation::Polaroid => "polaroid",
            Operation::Glow => "glow",
            Operation::Vignette => "vignette",
            Operation::OilPaint => "oil-paint",
            Operation::Pixelate => "pixelate",
            Operation::Invert => "invert",
            Operation::Opacity(_) => "opacity",
            Operation::Lightness(_) => "lightness",
            Operation::AutoOrient => "auto-orient",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.name();
        match self {
            Operation::Resize(opts) => {
                write!(f, "{name}={}x{}", opts.width, opts.height)?;
                match opts.mode {
                    ResizeMode::Crop => Ok(()),
                    ResizeMode::Max => f.write_str(":max"),
                    ResizeMode::Stretch => f.write_str(":stretch"),
                }
            }
            Operation::Crop { width, height } => write!(f, "{name}={width}x{height}"),
            Operation::Flip(mode) => {
                let mode = match mode {
                    FlipMode::None => "none",
                    FlipMode::Horizontal => "horizontal",
                    FlipMode::Vertical => "vertical",
                };
                write!(f, "{name}={mode}")
            }
            Operation::Brightness(v)
            | Operation::Hue(v)
            | Operation::Saturate(v)
            | Operation::Opacity(v)
            | Operation::Lightness(v) => write!(f, "{name}={v}"),
            _ => f.write_str(name),
        }
    }
}

/// Parse `WxH` into a pair of pixel counts.
fn parse_dimensions(value: &str) -> Result<(u32, u32), String> {
    let (w, h) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{value}'"))?;
    let width = w
        .trim()
        .parse()
        .map_err(|_| format!("invalid width '{w}'"))?;
    let height = h
        .trim()
        .parse()
        .map_err(|_| format!("invalid height '{h}'"))?;
    Ok((width, height))
}

fn parse_amount(name: &str, value: Option<&str>) -> Result<f32, String> {
    let value = value.ok_or_else(|| format!("{name} requires a value, e.g. {name}=1.5"))?;
    value
        .trim()
        .parse()
        .map_err(|_| format!("invalid {name} value '{value}'"))
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, value) = match s.split_once('=') {
            Some((n, v)) => (n.trim(), Some(v.trim())),
            None => (s.trim(), None),
        };
        let name = name.to_ascii_lowercase().replace('_', "-");

        let op = match name.as_str() {
            "resize" => {
                let value = value.ok_or("resize requires WIDTHxHEIGHT")?;
                let (dims, mode) = match value.split_once(':') {
                    Some((dims, mode)) => (dims, Some(mode)),
                    None => (value, None),
                };
                let (width, height) = parse_dimensions(dims)?;
                let mode = match mode.map(str::to_ascii_lowercase).as_deref() {
                    None | Some("crop") => ResizeMode::Crop,
                    Some("max") => ResizeMode::Max,
                    Some("stretch") => ResizeMode::Stretch,
                    Some(other) => return Err(format!("unknown resize mode '{other}'")),
                };
                Operation::Resize(ResizeOptions::new(width, height).with_mode(mode))
            }
            "crop" => {
                let (width, height) = parse_dimensions(value.ok_or("crop requires WIDTHxHEIGHT")?)?;
                Operation::Crop { width, height }
            }
            "flip" => {
                let mode = match value.map(str::to_ascii_lowercase).as_deref() {
                    None | Some("horizontal") => FlipMode::Horizontal,
                    Some("vertical") => FlipMode::Vertical,
                    Some("none") => FlipMode::None,
                    Some(other) => return Err(format!("unknown flip mode '{other}'")),
                };
                Operation::Flip(mode)
            }
            "brightness" => Operation::Brightness(parse_amount("brightness", value)?),
            "hue" => Operation::Hue(parse_amount("hue", value)?),
            "saturate" => Operation::Saturate(parse_amount("saturate", value)?),
            "opacity" => Operation::Opacity(parse_amount("opacity", value)?),
            "lightness" => Operation::Lightness(parse_amount("lightness", value)?),
            "sepia" => Operation::Sepia,
            "grayscale" => Operation::Grayscale,
            "black-white" | "bw" => Operation::BlackWhite,
            "gaussian-blur" => Operation::GaussianBlur,
            "bokeh-blur" => Operation::BokehBlur,
            "box-blur" => Operation::BoxBlur,
            "kodachrome" => Operation::Kodachrome,
            "polaroid" => Operation::Polaroid,
            "glow" => Operation::Glow,
            "vignette" => Operation::Vignette,
            "oil-paint" => Operation::OilPaint,
            "pixelate" => Operation::Pixelate,
            "invert" => Operation::Invert,
            "auto-orient" => Operation::AutoOrient,
            other => return Err(format!("unknown operation '{other}'")),
        };
        Ok(op)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_token_encodes_target_size() {
        let op = Operation::Resize(ResizeOptions::new(200, 100));
        assert_eq!(op.token(), "_200x100");
    }

    #[test]
    fn resize_token_ignores_mode() {
        let op = Operation::Resize(ResizeOptions::new(64, 48).with_mode(ResizeMode::Max));
        assert_eq!(op.token(), "_64x48");
    }

    #[test]
    fn parametrised_tokens_use_default_float_display() {
        assert_eq!(Operation::Brightness(1.5).token(), "_br1.5");
        assert_eq!(Operation::Brightness(2.0).token(), "_br2");
        assert_eq!(Operation::Hue(-45.0).token(), "_hu-45");
        assert_eq!(Operation::Opacity(0.25).token(), "_opa0.25");
        assert_eq!(Operation::Lightness(0.8).token(), "_lig0.8");
        assert_eq!(Operation::Saturate(3.0).token(), "_sat3");
    }

    #[test]
    fn crop_token_joins_width_and_height() {
        assert_eq!(
            Operation::Crop {
                width: 120,
                height: 80
            }
            .token(),
            "_cr120_80"
        );
    }

    #[test]
    fn flip_token_is_the_same_for_every_mode() {
        assert_eq!(Operation::Flip(FlipMode::Horizontal).token(), "_fl");
        assert_eq!(Operation::Flip(FlipMode::Vertical).token(), "_fl");
    }

    #[test]
    fn parses_plain_and_parametrised_forms() {
        assert_eq!("sepia".parse::<Operation>().unwrap(), Operation::Sepia);
        assert_eq!("bw".parse::<Operation>().unwrap(), Operation::BlackWhite);
        assert_eq!(
            "brightness=1.5".parse::<Operation>().unwrap(),
            Operation::Brightness(1.5)
        );
        assert_eq!(
            "resize=200x100:max".parse::<Operation>().unwrap(),
            Operation::Resize(ResizeOptions::new(200, 100).with_mode(ResizeMode::Max))
        );
        assert_eq!(
            "flip=vertical".parse::<Operation>().unwrap(),
            Operation::Flip(FlipMode::Vertical)
        );
        assert_eq!(
            "oil_paint".parse::<Operation>().unwrap(),
            Operation::OilPaint
        );
    }

    #[test]
    fn rejects_malformed_text() {
        assert!("resize".parse::<Operation>().is_err());
        assert!("resize=200".parse::<Operation>().is_err());
        assert!("brightness".parse::<Operation>().is_err());
        assert!("brightness=bright".parse::<Operation>().is_err());
        assert!("sparkle".parse::<Operation>().is_err());
        assert!("resize=10x10:zoom".parse::<Operation>().is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        let ops = [
            Operation::Resize(ResizeOptions::new(10, 20).with_mode(ResizeMode::Stretch)),
            Operation::Crop {
                width: 5,
                height: 6,
            },
            Operation::Flip(FlipMode::None),
            Operation::Hue(90.0),
            Operation::AutoOrient,
        ];
        for op in ops {
            assert_eq!(op.to_string().parse::<Operation>().unwrap(), op);
        }
    }
}
