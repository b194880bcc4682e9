//! Scaled blits between pixel buffers in 15-bit fixed point
//!
//! Source positions are tracked as integers scaled by 2^15. The integer part
//! picks the texel, the low 15 bits drive bilinear weights. Stepping across a
//! destination row is one integer add per pixel.

use serde::{Deserialize, Serialize};

use super::blend::BlendMode;
use super::buffer::{ImageFormat, PixelBuffer};
use crate::color::ALPHA_MASK;
use crate::geometry::Rect;

/// Fixed-point shift
pub const PRECISION_BITS: u32 = 15;
/// 1.0 in fixed point
pub const ONE: i64 = 1 << PRECISION_BITS;
const FRACTION_MASK: i64 = ONE - 1;

/// Resampling filter used when extents differ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Sampling {
    Nearest,
    #[default]
    Bilinear,
}

/// Scale ratio `src / dst` in fixed point, rounded
#[inline]
pub fn fixed_scale(src_extent: i32, dst_extent: i32) -> i64 {
    ((f64::from(src_extent) / f64::from(dst_extent)) * ONE as f64).round() as i64
}

/// Texel at a fixed-point position, clamped to the last row/column
#[inline]
pub fn sample_nearest(src: &PixelBuffer, sx: i64, sy: i64) -> u32 {
    let u = (sx >> PRECISION_BITS).clamp(0, i64::from(src.width()) - 1);
    let v = (sy >> PRECISION_BITS).clamp(0, i64::from(src.height()) - 1);
    src.raw_opaque(src.index(u as u32, v as u32))
}

/// Bilinear mix of the four texels around a fixed-point position.
///
/// The weights always sum to [`ONE`], so at integer positions the
/// upper-left texel gets full weight and the result equals
/// [`sample_nearest`].
pub fn sample_bilinear(src: &PixelBuffer, sx: i64, sy: i64) -> u32 {
    let max_u = i64::from(src.width()) - 1;
    let max_v = i64::from(src.height()) - 1;
    let sx = sx.max(0);
    let sy = sy.max(0);

    let u1 = (sx >> PRECISION_BITS).min(max_u);
    let v1 = (sy >> PRECISION_BITS).min(max_v);
    let u2 = (u1 + 1).min(max_u);
    let v2 = (v1 + 1).min(max_v);

    let ifu = ONE - (sx & FRACTION_MASK);
    let ifv = ONE - (sy & FRACTION_MASK);
    let ul = (ifu * ifv) >> PRECISION_BITS;
    let ll = ifu - ul;
    let ur = ifv - ul;
    let lr = ONE - ul - ll - ur;

    let at = |u: i64, v: i64| src.raw_opaque(src.index(u as u32, v as u32));
    let c_ul = at(u1, v1);
    let c_ur = at(u2, v1);
    let c_ll = at(u1, v2);
    let c_lr = at(u2, v2);

    let channel = |shift: u32| {
        let ch = |c: u32| i64::from((c >> shift) & 0xff);
        let sum = ul * ch(c_ul) + ur * ch(c_ur) + ll * ch(c_ll) + lr * ch(c_lr);
        ((sum >> PRECISION_BITS) as u32).min(0xff) << shift
    };
    channel(24) | channel(16) | channel(8) | channel(0)
}

/// Copy `src_rect` of `src` into `dst_rect` of `dst`, scaling as needed and
/// combining with `mode`. Both rectangles are clipped to their buffers; a
/// destination that starts off-canvas advances the source cursor instead.
pub fn blit(
    src: &PixelBuffer,
    src_rect: Rect,
    dst: &mut PixelBuffer,
    dst_rect: Rect,
    mode: BlendMode,
    sampling: Sampling,
) {
    if src_rect.is_empty() || dst_rect.is_empty() {
        return;
    }

    // Scale is fixed by the requested extents, before any clipping
    let dx = fixed_scale(src_rect.w, dst_rect.w);
    let dy = fixed_scale(src_rect.h, dst_rect.h);

    let src_clip = src_rect.clamp_to(src.width(), src.height());
    if src_clip.is_empty() {
        return;
    }

    let mut src_x0 = i64::from(src_clip.x) * ONE;
    let mut src_y0 = i64::from(src_clip.y) * ONE;
    if dst_rect.x < 0 {
        src_x0 -= i64::from(dst_rect.x) * dx;
    }
    if dst_rect.y < 0 {
        src_y0 -= i64::from(dst_rect.y) * dy;
    }

    let dst_clip = dst_rect.clamp_to(dst.width(), dst.height());
    if dst_clip.is_empty() {
        return;
    }

    let sample: fn(&PixelBuffer, i64, i64) -> u32 = match sampling {
        Sampling::Nearest => sample_nearest,
        Sampling::Bilinear => sample_bilinear,
    };

    let opaque = if dst.format() == ImageFormat::Rgb { ALPHA_MASK } else { 0 };
    let mut sy = src_y0;
    for y in dst_clip.y..dst_clip.bottom() {
        let mut sx = src_x0;
        let row = dst.index(dst_clip.x as u32, y as u32);
        for i in 0..dst_clip.w as usize {
            let c = sample(src, sx, sy);
            let d = &mut dst.pixels_raw_mut()[row + i];
            *d = mode.apply(*d, c) | opaque;
            sx += dx;
        }
        sy += dy;
    }

    dst.mark_modified(dst_clip);
}

/// [`blit`] within one buffer. The source region is clipped to the buffer
/// like [`blit`] clips it, then snapshotted so overlapping rectangles never
/// read pixels already written by this call.
pub fn blit_within(buf: &mut PixelBuffer, src_rect: Rect, dst_rect: Rect, mode: BlendMode, sampling: Sampling) {
    if src_rect.is_empty() || dst_rect.is_empty() {
        return;
    }
    let clip = src_rect.clamp_to(buf.width(), buf.height());
    if clip.is_empty() {
        return;
    }
    let snapshot = match buf.get_region(clip.x, clip.y, clip.w as u32, clip.h as u32) {
        Ok(s) => s,
        Err(e) => {
            log::debug!("skipping self blit: {}", e);
            return;
        },
    };
    // Same extents as the caller asked for, so the scale matches a plain blit
    let local = Rect::new(src_rect.x - clip.x, src_rect.y - clip.y, src_rect.w, src_rect.h);
    blit(&snapshot, local, buf, dst_rect, mode, sampling);
}
