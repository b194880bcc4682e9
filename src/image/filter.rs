//! In-place image filters
//!
//! Composes: raw pixel access → per-pixel filters → neighbourhood filters → blur.
//! Every filter marks the whole buffer modified.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use super::buffer::{ImageFormat, PixelBuffer};
use crate::color::{ALPHA_MASK, BLUE_MASK, GREEN_MASK, RED_MASK};
use crate::error::{Error, Result};

/// Largest blur radius with a precomputed kernel
pub const MAX_BLUR_RADIUS: usize = 248;

/// Threshold used when none is given
pub const DEFAULT_THRESHOLD: f32 = 0.5;

/// Filter kinds and their parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Filter {
    /// Luminance grayscale
    Gray,
    /// Flip the color channels, alpha kept
    Invert,
    /// Black or white by brightest channel against a `[0, 1]` cutoff
    Threshold(f32),
    /// Quantize every channel into `levels` steps, 2..=255
    Posterize(u32),
    /// Force every alpha byte to 0xFF
    Opaque,
    /// Keep the brightest of each pixel's cross neighbourhood
    Erode,
    /// Keep the darkest of each pixel's cross neighbourhood
    Dilate,
    /// Separable triangular blur; radius is `round(param * 3.5)`
    Blur(f32),
}

impl Filter {
    pub fn name(&self) -> &'static str {
        match self {
            Filter::Gray => "GRAY",
            Filter::Invert => "INVERT",
            Filter::Threshold(_) => "THRESHOLD",
            Filter::Posterize(_) => "POSTERIZE",
            Filter::Opaque => "OPAQUE",
            Filter::Erode => "ERODE",
            Filter::Dilate => "DILATE",
            Filter::Blur(_) => "BLUR",
        }
    }
}

/// Run `kind` over the whole of `img`
pub fn apply(img: &mut PixelBuffer, kind: Filter) -> Result<()> {
    match kind {
        Filter::Gray => gray(img),
        Filter::Invert => invert(img),
        Filter::Threshold(level) => threshold(img, level),
        Filter::Posterize(levels) => posterize(img, levels)?,
        Filter::Opaque => {
            img.set_format(ImageFormat::Rgb);
        },
        Filter::Erode => cross_select(img, |candidate, best| candidate > best),
        Filter::Dilate => cross_select(img, |candidate, best| candidate < best),
        Filter::Blur(param) => blur(img, param),
    }
    img.mark_all_modified();
    log::trace!("applied {} to {}x{}", kind.name(), img.width(), img.height());
    Ok(())
}

/// Integer luminance, 0..=255
#[inline]
pub fn luminance(c: u32) -> u32 {
    (77 * ((c >> 16) & 0xff) + 151 * ((c >> 8) & 0xff) + 28 * (c & 0xff)) >> 8
}

// ============================================================================
// Per-pixel filters
// ============================================================================

fn gray(img: &mut PixelBuffer) {
    if img.format() == ImageFormat::Alpha {
        // A single channel becomes an opaque gray ramp, dark where alpha is high
        for p in img.pixels_raw_mut() {
            let col = 255 - (*p & 0xff);
            *p = ALPHA_MASK | (col << 16) | (col << 8) | col;
        }
        img.set_format(ImageFormat::Rgb);
        return;
    }
    for p in img.pixels_raw_mut() {
        let lum = luminance(*p);
        *p = (*p & ALPHA_MASK) | (lum << 16) | (lum << 8) | lum;
    }
}

fn invert(img: &mut PixelBuffer) {
    let mask = if img.format() == ImageFormat::Alpha { 0xff } else { 0x00ffffff };
    for p in img.pixels_raw_mut() {
        *p ^= mask;
    }
}

fn threshold(img: &mut PixelBuffer, level: f32) {
    let level = if (0.0..=1.0).contains(&level) {
        level
    } else {
        log::warn!("filter(THRESHOLD, {}) expects a level between 0 and 1, clamping", level);
        level.clamp(0.0, 1.0)
    };
    let cutoff = (level * 255.0) as u32;

    if img.format() == ImageFormat::Alpha {
        for p in img.pixels_raw_mut() {
            *p = if (*p & 0xff) < cutoff { 0 } else { 0xff };
        }
        return;
    }
    for p in img.pixels_raw_mut() {
        let max = ((*p & RED_MASK) >> 16).max((*p & GREEN_MASK) >> 8).max(*p & BLUE_MASK);
        *p = (*p & ALPHA_MASK) | if max < cutoff { 0 } else { 0x00ffffff };
    }
}

fn posterize(img: &mut PixelBuffer, levels: u32) -> Result<()> {
    if !(2..=255).contains(&levels) {
        return Err(Error::InvalidFilterParameter {
            filter: "POSTERIZE",
            reason: format!("levels must be between 2 and 255, got {}", levels),
        });
    }
    let step = |v: u32| (((v * levels) >> 8) * 255) / (levels - 1);

    if img.format() == ImageFormat::Alpha {
        for p in img.pixels_raw_mut() {
            *p = step(*p & 0xff);
        }
        return Ok(());
    }
    for p in img.pixels_raw_mut() {
        let r = step((*p >> 16) & 0xff);
        let g = step((*p >> 8) & 0xff);
        let b = step(*p & 0xff);
        *p = (*p & ALPHA_MASK) | (r << 16) | (g << 8) | b;
    }
    Ok(())
}

// ============================================================================
// Neighbourhood filters
// ============================================================================

/// Replace each pixel by the neighbour in {self, left, right, up, down} that
/// wins `better(candidate_lum, best_lum)`. Off-edge neighbours are the pixel itself.
fn cross_select(img: &mut PixelBuffer, better: impl Fn(u32, u32) -> bool) {
    let w = img.width() as usize;
    let h = img.height() as usize;
    let src = img.pixels().to_vec();
    let out = img.pixels_raw_mut();

    for y in 0..h {
        for x in 0..w {
            let i = y * w + x;
            let neighbours = [
                if x > 0 { i - 1 } else { i },
                if x + 1 < w { i + 1 } else { i },
                if y > 0 { i - w } else { i },
                if y + 1 < h { i + w } else { i },
            ];
            let mut best = src[i];
            let mut best_lum = luminance(best);
            for n in neighbours {
                let lum = luminance(src[n]);
                if better(lum, best_lum) {
                    best = src[n];
                    best_lum = lum;
                }
            }
            out[i] = best;
        }
    }
}

// ============================================================================
// Blur
// ============================================================================

/// Triangular kernel for one radius: `weights[radius + i] = (radius - |i|)^2`
#[derive(Debug)]
pub struct BlurKernel {
    pub radius: usize,
    pub weights: Vec<u32>,
}

impl BlurKernel {
    fn build(radius: usize) -> Self {
        let weights = (0..=2 * radius)
            .map(|k| {
                let d = radius.abs_diff(k);
                ((radius - d) * (radius - d)) as u32
            })
            .collect();
        Self { radius, weights }
    }

    /// Shared kernel for `radius`, built on first use
    pub fn get(radius: usize) -> &'static BlurKernel {
        static KERNELS: OnceLock<Vec<OnceLock<BlurKernel>>> = OnceLock::new();
        let radius = radius.clamp(1, MAX_BLUR_RADIUS);
        let slots = KERNELS.get_or_init(|| (0..=MAX_BLUR_RADIUS).map(|_| OnceLock::new()).collect());
        slots[radius].get_or_init(|| Self::build(radius))
    }
}

/// Kernel radius for a blur parameter
#[inline]
pub fn blur_radius(param: f32) -> usize {
    ((param * 3.5).round().max(0.0) as usize).clamp(1, MAX_BLUR_RADIUS)
}

/// One kernel window along a line of `len` samples, clipped at the ends.
/// Returns (first sample, first kernel index, count).
#[inline]
fn window(pos: usize, len: usize, radius: usize) -> (usize, usize, usize) {
    let (start, k0) = if pos < radius { (0, radius - pos) } else { (pos - radius, 0) };
    let count = (2 * radius + 1 - k0).min(len - start);
    (start, k0, count)
}

fn blur(img: &mut PixelBuffer, param: f32) {
    let kernel = BlurKernel::get(blur_radius(param));
    let w = img.width() as usize;
    let h = img.height() as usize;
    let format = img.format();

    // Channels present in this format, as shifts into the packed value
    let shifts: &[u32] = match format {
        ImageFormat::Alpha => &[0],
        ImageFormat::Rgb => &[16, 8, 0],
        ImageFormat::Argb => &[24, 16, 8, 0],
    };

    let src = img.pixels().to_vec();
    let mut temp: Vec<Vec<u32>> = vec![vec![0; w * h]; shifts.len()];

    // Horizontal pass into per-channel arrays
    for y in 0..h {
        let row = y * w;
        for x in 0..w {
            let (start, k0, count) = window(x, w, kernel.radius);
            let mut sums = [0u32; 4];
            let mut total = 0;
            for j in 0..count {
                let weight = kernel.weights[k0 + j];
                let c = src[row + start + j];
                for (sum, &shift) in sums.iter_mut().zip(shifts) {
                    *sum += weight * ((c >> shift) & 0xff);
                }
                total += weight;
            }
            for (ch, sum) in temp.iter_mut().zip(sums) {
                ch[row + x] = sum / total;
            }
        }
    }

    // Vertical pass back into the image
    let out = img.pixels_raw_mut();
    for x in 0..w {
        for y in 0..h {
            let (start, k0, count) = window(y, h, kernel.radius);
            let mut sums = [0u32; 4];
            let mut total = 0;
            for j in 0..count {
                let weight = kernel.weights[k0 + j];
                let i = (start + j) * w + x;
                for (sum, ch) in sums.iter_mut().zip(&temp) {
                    *sum += weight * ch[i];
                }
                total += weight;
            }
            let mut c = match format {
                ImageFormat::Rgb => ALPHA_MASK,
                _ => 0,
            };
            for (sum, &shift) in sums.iter().zip(shifts) {
                c |= (sum / total) << shift;
            }
            out[y * w + x] = c;
        }
    }
}
