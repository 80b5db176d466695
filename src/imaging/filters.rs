//! Pixel filters the `image` crate does not provide.
//!
//! These are straightforward, unoptimised implementations working on 8-bit
//! RGBA buffers. Channel math is done in `f32` on the `0.0..=1.0` range.
//!
//! | Operation | Implementation |
//! |---|---|
//! | Sepia, Kodachrome, Polaroid, Black & White, Grayscale | fixed [`ColorMatrix`] |
//! | Brightness, Lightness, Saturate, Hue, Opacity | parametrised [`ColorMatrix`] |
//! | Box blur | separable moving average |
//! | Bokeh blur | gamma-weighted box blur (highlights bloom) |
//! | Glow, Vignette | radial blend towards a colour |
//! | Oil paint | intensity-histogram neighbourhood |
//! | Pixelate | block average |

use image::{Rgba, RgbaImage};

pub const BOX_BLUR_RADIUS: u32 = 7;
pub const BOKEH_RADIUS: u32 = 16;
pub const BOKEH_GAMMA: f32 = 3.0;
pub const GAUSSIAN_SIGMA: f32 = 3.0;
pub const OIL_PAINT_LEVELS: usize = 10;
pub const OIL_PAINT_BRUSH: u32 = 15;
pub const PIXELATE_SIZE: u32 = 4;

/// A 4x5 colour matrix: each output channel is a weighted sum of
/// `r, g, b, a` plus a constant offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorMatrix(pub [[f32; 5]; 4]);

impl ColorMatrix {
    pub const IDENTITY: ColorMatrix = ColorMatrix([
        [1.0, 0.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 0.0, 1.0, 0.0],
    ]);

    pub const SEPIA: ColorMatrix = ColorMatrix([
        [0.393, 0.769, 0.189, 0.0, 0.0],
        [0.349, 0.686, 0.168, 0.0, 0.0],
        [0.272, 0.534, 0.131, 0.0, 0.0],
        [0.0, 0.0, 0.0, 1.0, 0.0],
    ]);

    pub const BLACK_WHITE: ColorMatrix = ColorMatrix([
        [1.5, 1.5, 1.5, 0.0, -1.0],
        [1.5, 1.5, 1.5, 0.0, -1.0],
        [1.5, 1.5, 1.5, 0.0, -1.0],
        [0.0, 0.0, 0.0, 1.0, 0.0],
    ]);

    /// BT.709 luma on every channel.
    pub const GRAYSCALE: ColorMatrix = ColorMatrix([
        [0.2126, 0.7152, 0.0722, 0.0, 0.0],
        [0.2126, 0.7152, 0.0722, 0.0, 0.0],
        [0.2126, 0.7152, 0.0722, 0.0, 0.0],
        [0.0, 0.0, 0.0, 1.0, 0.0],
    ]);

    pub const KODACHROME: ColorMatrix = ColorMatrix([
        [1.128_558_2, -0.396_738_2, -0.039_925_6, 0.0, 0.249_920],
        [-0.164_043_4, 1.083_525_2, -0.054_988_1, 0.0, 0.096_990],
        [-0.167_860_1, -0.560_341_6, 1.601_485_1, 0.0, 0.139_725],
        [0.0, 0.0, 0.0, 1.0, 0.0],
    ]);

    pub const POLAROID: ColorMatrix = ColorMatrix([
        [1.438, -0.062, -0.062, 0.0, 0.0],
        [-0.122, 1.378, -0.122, 0.0, 0.0],
        [-0.016, -0.016, 1.483, 0.0, 0.0],
        [0.0, 0.0, 0.0, 1.0, 0.0],
    ]);

    pub fn brightness(amount: f32) -> Self {
        let mut m = Self::IDENTITY;
        for (i, row) in m.0.iter_mut().take(3).enumerate() {
            row[i] = amount;
        }
        m
    }

    pub fn lightness(amount: f32) -> Self {
        let mut m = Self::IDENTITY;
        for row in m.0.iter_mut().take(3) {
            row[4] = amount - 1.0;
        }
        m
    }

    pub fn opacity(amount: f32) -> Self {
        let mut m = Self::IDENTITY;
        m.0[3][3] = amount;
        m
    }

    pub fn saturate(s: f32) -> Self {
        ColorMatrix([
            [0.213 + 0.787 * s, 0.715 - 0.715 * s, 0.072 - 0.072 * s, 0.0, 0.0],
            [0.213 - 0.213 * s, 0.715 + 0.285 * s, 0.072 - 0.072 * s, 0.0, 0.0],
            [0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.072 + 0.928 * s, 0.0, 0.0],
            [0.0, 0.0, 0.0, 1.0, 0.0],
        ])
    }

    pub fn hue(degrees: f32) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        ColorMatrix([
            [
                0.213 + cos * 0.787 - sin * 0.213,
                0.715 - cos * 0.715 - sin * 0.715,
                0.072 - cos * 0.072 + sin * 0.928,
                0.0,
                0.0,
            ],
            [
                0.213 - cos * 0.213 + sin * 0.143,
                0.715 + cos * 0.285 + sin * 0.140,
                0.072 - cos * 0.072 - sin * 0.283,
                0.0,
                0.0,
            ],
            [
                0.213 - cos * 0.213 - sin * 0.787,
                0.715 - cos * 0.715 + sin * 0.715,
                0.072 + cos * 0.928 + sin * 0.072,
                0.0,
                0.0,
            ],
            [0.0, 0.0, 0.0, 1.0, 0.0],
        ])
    }

    fn transform(&self, px: [f32; 4]) -> [f32; 4] {
        let mut out = [0.0; 4];
        for (o, row) in out.iter_mut().zip(self.0.iter()) {
            *o = row[0] * px[0] + row[1] * px[1] + row[2] * px[2] + row[3] * px[3] + row[4];
        }
        out
    }
}

#[inline]
fn to_unit(p: &Rgba<u8>) -> [f32; 4] {
    p.0.map(|c| c as f32 / 255.0)
}

#[inline]
fn from_unit(v: [f32; 4]) -> Rgba<u8> {
    Rgba(v.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8))
}

pub fn apply_color_matrix(img: &mut RgbaImage, matrix: &ColorMatrix) {
    for p in img.pixels_mut() {
        *p = from_unit(matrix.transform(to_unit(p)));
    }
}

/// One horizontal then one vertical moving-average pass, clamping at edges.
pub fn box_blur(img: &RgbaImage, radius: u32) -> RgbaImage {
    let horizontal = blur_pass(img, radius, true);
    blur_pass(&horizontal, radius, false)
}

fn blur_pass(img: &RgbaImage, radius: u32, horizontal: bool) -> RgbaImage {
    let (w, h) = img.dimensions();
    let r = radius as i64;
    let taps = (2 * r + 1) as f32;
    RgbaImage::from_fn(w, h, |x, y| {
        let mut sum = [0.0f32; 4];
        for k in -r..=r {
            let (sx, sy) = if horizontal {
                ((x as i64 + k).clamp(0, w as i64 - 1) as u32, y)
            } else {
                (x, (y as i64 + k).clamp(0, h as i64 - 1) as u32)
            };
            let p = img.get_pixel(sx, sy);
            for (s, c) in sum.iter_mut().zip(p.0) {
                *s += c as f32;
            }
        }
        Rgba(sum.map(|s| (s / taps).round() as u8))
    })
}

/// Approximates a lens bokeh: channels are raised to `gamma` before blurring
/// so bright spots dominate their neighbourhood, then mapped back.
pub fn bokeh_blur(img: &RgbaImage, radius: u32, gamma: f32) -> RgbaImage {
    let mut expanded = img.clone();
    for p in expanded.pixels_mut() {
        let [r, g, b, a] = to_unit(p);
        *p = from_unit([r.powf(gamma), g.powf(gamma), b.powf(gamma), a]);
    }
    let blurred = box_blur(&box_blur(&expanded, radius / 2), radius / 2);
    let mut out = blurred;
    for p in out.pixels_mut() {
        let [r, g, b, a] = to_unit(p);
        let inv = 1.0 / gamma;
        *p = from_unit([r.powf(inv), g.powf(inv), b.powf(inv), a]);
    }
    out
}

/// Normalised distance of `(x, y)` from the image centre: 0 at the centre,
/// 1 at the corners.
fn radial_distance(x: u32, y: u32, w: u32, h: u32) -> f32 {
    let cx = (w as f32 - 1.0) / 2.0;
    let cy = (h as f32 - 1.0) / 2.0;
    let max = (cx * cx + cy * cy).sqrt().max(f32::EPSILON);
    let dx = x as f32 - cx;
    let dy = y as f32 - cy;
    (dx * dx + dy * dy).sqrt() / max
}

fn blend(p: &mut Rgba<u8>, color: [f32; 3], amount: f32) {
    let [r, g, b, a] = to_unit(p);
    let t = amount.clamp(0.0, 1.0);
    *p = from_unit([
        r + (color[0] - r) * t,
        g + (color[1] - g) * t,
        b + (color[2] - b) * t,
        a,
    ]);
}

/// Blend `color` in from the centre, fading out towards the edges.
pub fn glow(img: &mut RgbaImage, color: [f32; 3]) {
    let (w, h) = img.dimensions();
    for (x, y, p) in img.enumerate_pixels_mut() {
        let d = radial_distance(x, y, w, h);
        blend(p, color, (1.0 - d * 2.0).max(0.0) * 0.5);
    }
}

/// Blend `color` in from the edges, leaving the centre untouched.
pub fn vignette(img: &mut RgbaImage, color: [f32; 3]) {
    let (w, h) = img.dimensions();
    for (x, y, p) in img.enumerate_pixels_mut() {
        let d = radial_distance(x, y, w, h);
        let t = ((d - 0.5) / 0.5).clamp(0.0, 1.0);
        blend(p, color, t * t);
    }
}

/// Each output pixel is the mean colour of the most common intensity bucket
/// in its `brush x brush` neighbourhood.
pub fn oil_paint(img: &RgbaImage, levels: usize, brush: u32) -> RgbaImage {
    let (w, h) = img.dimensions();
    let r = (brush / 2) as i64;
    let levels = levels.max(1);
    RgbaImage::from_fn(w, h, |x, y| {
        let mut counts = vec![0u32; levels];
        let mut sums = vec![[0u32; 3]; levels];
        for dy in -r..=r {
            for dx in -r..=r {
                let sx = (x as i64 + dx).clamp(0, w as i64 - 1) as u32;
                let sy = (y as i64 + dy).clamp(0, h as i64 - 1) as u32;
                let [pr, pg, pb, _] = img.get_pixel(sx, sy).0;
                let intensity = (pr as usize + pg as usize + pb as usize) / 3;
                let bucket = (intensity * (levels - 1)) / 255;
                counts[bucket] += 1;
                sums[bucket][0] += pr as u32;
                sums[bucket][1] += pg as u32;
                sums[bucket][2] += pb as u32;
            }
        }
        let (best, count) = counts
            .iter()
            .enumerate()
            .max_by_key(|(_, c)| **c)
            .map(|(i, c)| (i, (*c).max(1)))
            .unwrap_or((0, 1));
        let alpha = img.get_pixel(x, y).0[3];
        Rgba([
            (sums[best][0] / count) as u8,
            (sums[best][1] / count) as u8,
            (sums[best][2] / count) as u8,
            alpha,
        ])
    })
}

/// Replace every `size x size` block with its average colour.
pub fn pixelate(img: &mut RgbaImage, size: u32) {
    let size = size.max(1);
    let (w, h) = img.dimensions();
    for by in (0..h).step_by(size as usize) {
        for bx in (0..w).step_by(size as usize) {
            let bw = size.min(w - bx);
            let bh = size.min(h - by);
            let mut sum = [0u32; 4];
            for y in by..by + bh {
                for x in bx..bx + bw {
                    for (s, c) in sum.iter_mut().zip(img.get_pixel(x, y).0) {
                        *s += c as u32;
                    }
                }
            }
            let n = bw * bh;
            let avg = Rgba(sum.map(|s| (s / n) as u8));
            for y in by..by + bh {
                for x in bx..bx + bw {
                    img.put_pixel(x, y, avg);
                }
            }
        }
    }
}
