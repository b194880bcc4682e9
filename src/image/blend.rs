//! Blend operators on packed `0xAARRGGBB` pixels
//!
//! Every operator takes the destination `a`, the source `b`, and uses the
//! source alpha as the blend factor. The factor is nudged up by one from
//! 0x7F upward so a fully opaque source weighs exactly 256/256, which makes
//! an opaque BLEND identical to REPLACE. All math stays in integers.

use serde::{Deserialize, Serialize};

use crate::color::{pack, unpack};

// ============================================================================
// Blend Mode
// ============================================================================

/// The six base compositing operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BlendMode {
    /// Overwrite the destination
    Replace,
    /// Linear interpolation toward the source by its alpha
    #[default]
    Blend,
    /// Saturating add of the alpha-weighted source
    Add,
    /// Saturating subtract of the alpha-weighted source
    Subtract,
    /// Per-channel maximum
    Lightest,
    /// Per-channel minimum, faded in by the source alpha
    Darkest,
}

impl BlendMode {
    pub const ALL: [BlendMode; 6] = [
        BlendMode::Replace,
        BlendMode::Blend,
        BlendMode::Add,
        BlendMode::Subtract,
        BlendMode::Lightest,
        BlendMode::Darkest,
    ];

    /// Combine source `src` onto destination `dst`
    #[inline]
    pub fn apply(self, dst: u32, src: u32) -> u32 {
        match self {
            BlendMode::Replace => src,
            BlendMode::Blend => blend_blend(dst, src),
            BlendMode::Add => blend_add(dst, src),
            BlendMode::Subtract => blend_subtract(dst, src),
            BlendMode::Lightest => blend_lightest(dst, src),
            BlendMode::Darkest => blend_darkest(dst, src),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BlendMode::Replace => "REPLACE",
            BlendMode::Blend => "BLEND",
            BlendMode::Add => "ADD",
            BlendMode::Subtract => "SUBTRACT",
            BlendMode::Lightest => "LIGHTEST",
            BlendMode::Darkest => "DARKEST",
        }
    }
}

/// The full set of blend mode names a sketch can ask for.
///
/// Only the six base operators are implemented; everything else resolves to
/// `None` and is rejected by the renderer with a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NamedBlendMode {
    Replace,
    Blend,
    Add,
    Subtract,
    Lightest,
    Darkest,
    Difference,
    Exclusion,
    Multiply,
    Screen,
    Overlay,
    HardLight,
    SoftLight,
    Dodge,
    Burn,
}

impl NamedBlendMode {
    pub fn to_base(self) -> Option<BlendMode> {
        match self {
            NamedBlendMode::Replace => Some(BlendMode::Replace),
            NamedBlendMode::Blend => Some(BlendMode::Blend),
            NamedBlendMode::Add => Some(BlendMode::Add),
            NamedBlendMode::Subtract => Some(BlendMode::Subtract),
            NamedBlendMode::Lightest => Some(BlendMode::Lightest),
            NamedBlendMode::Darkest => Some(BlendMode::Darkest),
            _ => None,
        }
    }
}

impl From<BlendMode> for NamedBlendMode {
    fn from(mode: BlendMode) -> Self {
        match mode {
            BlendMode::Replace => NamedBlendMode::Replace,
            BlendMode::Blend => NamedBlendMode::Blend,
            BlendMode::Add => NamedBlendMode::Add,
            BlendMode::Subtract => NamedBlendMode::Subtract,
            BlendMode::Lightest => NamedBlendMode::Lightest,
            BlendMode::Darkest => NamedBlendMode::Darkest,
        }
    }
}

// ============================================================================
// Operators
// ============================================================================

/// Source alpha as a 0..=256 weight
#[inline]
fn factor(src: u32) -> i32 {
    let a = (src >> 24) as i32;
    a + i32::from(a >= 0x7f)
}

/// Resulting alpha shared by every non-replace operator
#[inline]
fn sum_alpha(dst: u32, src: u32) -> u8 {
    ((dst >> 24) + (src >> 24)).min(255) as u8
}

/// Move `a` toward `b` by `f`/256
#[inline]
fn mix(a: i32, b: i32, f: i32) -> i32 {
    a + (((b - a) * f) >> 8)
}

/// Apply `op(dst_channel, src_channel, factor)` to R, G and B
#[inline]
fn per_channel(dst: u32, src: u32, op: impl Fn(i32, i32, i32) -> i32) -> u32 {
    let f = factor(src);
    let (dr, dg, db, _) = unpack(dst);
    let (sr, sg, sb, _) = unpack(src);
    let ch = |d: u8, s: u8| op(i32::from(d), i32::from(s), f).clamp(0, 255) as u8;
    pack(ch(dr, sr), ch(dg, sg), ch(db, sb), sum_alpha(dst, src))
}

pub fn blend_blend(dst: u32, src: u32) -> u32 {
    per_channel(dst, src, mix)
}

pub fn blend_add(dst: u32, src: u32) -> u32 {
    per_channel(dst, src, |a, b, f| (a + ((b * f) >> 8)).min(255))
}

pub fn blend_subtract(dst: u32, src: u32) -> u32 {
    per_channel(dst, src, |a, b, f| (a - ((b * f) >> 8)).max(0))
}

pub fn blend_lightest(dst: u32, src: u32) -> u32 {
    per_channel(dst, src, |a, b, f| a.max((b * f) >> 8))
}

pub fn blend_darkest(dst: u32, src: u32) -> u32 {
    per_channel(dst, src, |a, b, f| mix(a, a.min((b * f) >> 8), f))
}

/// Combine two packed colors with the given operator
#[inline]
pub fn blend_color(dst: u32, src: u32, mode: BlendMode) -> u32 {
    mode.apply(dst, src)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: [u8; 8] = [0, 1, 63, 127, 128, 200, 254, 255];

    #[test]
    fn test_opaque_blend_equals_replace() {
        for &d in &SAMPLES {
            for &s in &SAMPLES {
                let dst = pack(d, 255 - d, d / 2, d);
                let src = pack(s, s / 3, 255 - s, 255);
                assert_eq!(blend_blend(dst, src), BlendMode::Replace.apply(dst, src));
            }
        }
    }

    #[test]
    fn test_transparent_blend_keeps_destination_channels() {
        let dst = 0xff204060;
        assert_eq!(blend_blend(dst, 0x00ffffff), dst);
    }

    #[test]
    fn test_half_blend_interpolates() {
        let out = blend_blend(0xff000000, 0x80ffffff);
        let (r, g, b, a) = unpack(out);
        // 0x80 + 1 = 129/256 of the way to white
        assert_eq!((r, g, b), (128, 128, 128));
        assert_eq!(a, 255);
    }

    #[test]
    fn test_blend_alpha_accumulates() {
        let (_, _, _, a) = unpack(blend_blend(0x40000000, 0x30ffffff));
        assert_eq!(a, 0x70);
    }

    #[test]
    fn test_add_then_subtract_round_trips() {
        for &d in &SAMPLES {
            for &s in &SAMPLES {
                if u16::from(d) + u16::from(s) > 255 {
                    continue;
                }
                let dst = pack(d, d, d, 255);
                let src = pack(s, s, s, 255);
                let added = blend_add(dst, src);
                assert_eq!(blend_subtract(added, src), dst, "d={} s={}", d, s);
            }
        }
    }

    #[test]
    fn test_add_and_subtract_clip() {
        assert_eq!(blend_add(0xffc0c0c0, 0xff808080), 0xffffffff);
        assert_eq!(blend_subtract(0xff404040, 0xff808080), 0xff000000);
    }

    #[test]
    fn test_lightest_and_darkest() {
        let dst = pack(100, 200, 50, 255);
        let src = pack(150, 100, 50, 255);
        assert_eq!(unpack(blend_lightest(dst, src)), (150, 200, 50, 255));
        assert_eq!(unpack(blend_darkest(dst, src)), (100, 100, 50, 255));
    }

    #[test]
    fn test_named_modes_map_to_base_or_none() {
        for mode in BlendMode::ALL {
            assert_eq!(NamedBlendMode::from(mode).to_base(), Some(mode));
        }
        assert_eq!(NamedBlendMode::Multiply.to_base(), None);
        assert_eq!(NamedBlendMode::Screen.to_base(), None);
    }
}
