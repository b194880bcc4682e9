//! Color resolution
//!
//! Colors are packed as `0xAARRGGBB` (alpha in the high byte). A [`ColorSpace`]
//! holds the active input mode (RGB or HSB) and the per-channel maxima, and
//! resolves user supplied component tuples into a [`ResolvedColor`]: the
//! packed value plus normalized float and 8-bit caches.

use serde::{Deserialize, Serialize};

pub const ALPHA_MASK: u32 = 0xff000000;
pub const RED_MASK: u32 = 0x00ff0000;
pub const GREEN_MASK: u32 = 0x0000ff00;
pub const BLUE_MASK: u32 = 0x000000ff;

/// Pack 8-bit channels into `0xAARRGGBB`
#[inline]
pub const fn pack(r: u8, g: u8, b: u8, a: u8) -> u32 {
    ((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | (b as u32)
}

/// Unpack `0xAARRGGBB` into (r, g, b, a)
#[inline]
pub const fn unpack(c: u32) -> (u8, u8, u8, u8) {
    ((c >> 16) as u8, (c >> 8) as u8, c as u8, (c >> 24) as u8)
}

/// How component tuples passed to `fill()`, `color()` etc. are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorMode {
    #[default]
    Rgb,
    Hsb,
}

/// A color as supplied by the caller.
///
/// Mirrors the usual overload set: gray, gray + alpha, three components,
/// four components, a bare integer, and an integer with an alpha override.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorArg {
    Gray(f32),
    GrayAlpha(f32, f32),
    Rgb(f32, f32, f32),
    Rgba(f32, f32, f32, f32),
    /// Either a packed ARGB value or a gray level, see [`ColorSpace::calc`]
    Int(u32),
    IntAlpha(u32, f32),
}

impl From<f32> for ColorArg {
    fn from(v: f32) -> Self {
        Self::Gray(v)
    }
}

impl From<(f32, f32)> for ColorArg {
    fn from((v, a): (f32, f32)) -> Self {
        Self::GrayAlpha(v, a)
    }
}

impl From<(f32, f32, f32)> for ColorArg {
    fn from((x, y, z): (f32, f32, f32)) -> Self {
        Self::Rgb(x, y, z)
    }
}

impl From<(f32, f32, f32, f32)> for ColorArg {
    fn from((x, y, z, a): (f32, f32, f32, f32)) -> Self {
        Self::Rgba(x, y, z, a)
    }
}

impl From<u32> for ColorArg {
    fn from(c: u32) -> Self {
        Self::Int(c)
    }
}

impl From<(u32, f32)> for ColorArg {
    fn from((c, a): (u32, f32)) -> Self {
        Self::IntAlpha(c, a)
    }
}

/// Result of a color calculation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedColor {
    /// Normalized channels in `[0, 1]`
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
    /// 8-bit channels
    pub ri: u8,
    pub gi: u8,
    pub bi: u8,
    pub ai: u8,
    /// Packed `0xAARRGGBB`
    pub argb: u32,
    /// True when alpha is anything but fully opaque
    pub has_alpha: bool,
}

impl ResolvedColor {
    /// Build from normalized floats, truncating to 8 bits
    fn from_unit(r: f32, g: f32, b: f32, a: f32) -> Self {
        let ri = (255.0 * r) as u8;
        let gi = (255.0 * g) as u8;
        let bi = (255.0 * b) as u8;
        let ai = (255.0 * a) as u8;
        Self {
            r,
            g,
            b,
            a,
            ri,
            gi,
            bi,
            ai,
            argb: pack(ri, gi, bi, ai),
            has_alpha: ai != 255,
        }
    }

    /// Build from a packed value; floats are the channels divided by 255
    pub fn from_argb(argb: u32) -> Self {
        let (ri, gi, bi, ai) = unpack(argb);
        Self {
            r: ri as f32 / 255.0,
            g: gi as f32 / 255.0,
            b: bi as f32 / 255.0,
            a: ai as f32 / 255.0,
            ri,
            gi,
            bi,
            ai,
            argb,
            has_alpha: ai != 255,
        }
    }
}

impl Default for ResolvedColor {
    fn default() -> Self {
        Self::from_argb(0xff000000)
    }
}

/// Active color mode and channel maxima
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorSpace {
    mode: ColorMode,
    max_x: f32,
    max_y: f32,
    max_z: f32,
    max_a: f32,
}

impl Default for ColorSpace {
    fn default() -> Self {
        Self::new(ColorMode::Rgb, 255.0, 255.0, 255.0, 255.0)
    }
}

impl ColorSpace {
    pub fn new(mode: ColorMode, max_x: f32, max_y: f32, max_z: f32, max_a: f32) -> Self {
        Self {
            mode,
            max_x,
            max_y,
            max_z,
            max_a,
        }
    }

    /// Mode with one maximum for every channel, e.g. `(Rgb, 1.0)`
    pub fn uniform(mode: ColorMode, max: f32) -> Self {
        Self::new(mode, max, max, max, max)
    }

    #[inline]
    pub fn mode(&self) -> ColorMode {
        self.mode
    }

    #[inline]
    pub fn maxima(&self) -> (f32, f32, f32, f32) {
        (self.max_x, self.max_y, self.max_z, self.max_a)
    }

    /// RGB with every maximum at 255, where integer input can be packed directly
    #[inline]
    pub fn is_default(&self) -> bool {
        self.mode == ColorMode::Rgb
            && self.max_x == 255.0
            && self.max_y == 255.0
            && self.max_z == 255.0
            && self.max_a == 255.0
    }

    /// Resolve any supported input form.
    ///
    /// A bare integer is ambiguous: when its high byte is zero and it does not
    /// exceed the first channel's maximum it is a gray level, otherwise it is
    /// a packed ARGB color. This means `0x000000ff` reads as gray 255 rather
    /// than transparent blue, which is a known quirk kept for compatibility.
    pub fn calc(&self, arg: ColorArg) -> ResolvedColor {
        match arg {
            ColorArg::Gray(v) => self.calc_gray(v, self.max_a),
            ColorArg::GrayAlpha(v, a) => self.calc_gray(v, a),
            ColorArg::Rgb(x, y, z) => self.calc_xyza(x, y, z, self.max_a),
            ColorArg::Rgba(x, y, z, a) => self.calc_xyza(x, y, z, a),
            ColorArg::Int(c) => {
                if self.int_is_gray(c) {
                    self.calc_gray(c as f32, self.max_a)
                } else {
                    self.calc_argb(c, self.max_a)
                }
            },
            ColorArg::IntAlpha(c, a) => {
                if self.int_is_gray(c) {
                    self.calc_gray(c as f32, a)
                } else {
                    self.calc_argb(c, a)
                }
            },
        }
    }

    #[inline]
    fn int_is_gray(&self, c: u32) -> bool {
        (c & ALPHA_MASK) == 0 && (c as f32) <= self.max_x
    }

    /// Resolve to a packed color, bit-packing directly in the default mode
    pub fn color(&self, arg: ColorArg) -> u32 {
        if self.is_default() {
            let clamp = |v: f32| v.clamp(0.0, 255.0) as u8;
            match arg {
                ColorArg::Gray(v) => {
                    let v = clamp(v);
                    return pack(v, v, v, 255);
                },
                ColorArg::Rgb(x, y, z) => return pack(clamp(x), clamp(y), clamp(z), 255),
                ColorArg::Rgba(x, y, z, a) => return pack(clamp(x), clamp(y), clamp(z), clamp(a)),
                ColorArg::Int(c) if self.int_is_gray(c) => {
                    let v = c.min(255) as u8;
                    return pack(v, v, v, 255);
                },
                _ => {},
            }
        }
        self.calc(arg).argb
    }

    fn calc_gray(&self, gray: f32, alpha: f32) -> ResolvedColor {
        let gray = gray.clamp(0.0, self.max_x);
        let alpha = alpha.clamp(0.0, self.max_a);
        let v = gray / self.max_x;
        ResolvedColor::from_unit(v, v, v, alpha / self.max_a)
    }

    fn calc_xyza(&self, x: f32, y: f32, z: f32, a: f32) -> ResolvedColor {
        let x = x.clamp(0.0, self.max_x) / self.max_x;
        let y = y.clamp(0.0, self.max_y) / self.max_y;
        let z = z.clamp(0.0, self.max_z) / self.max_z;
        let a = a.clamp(0.0, self.max_a) / self.max_a;

        match self.mode {
            ColorMode::Rgb => ResolvedColor::from_unit(x, y, z, a),
            ColorMode::Hsb => {
                let (r, g, b) = hsb_to_rgb(x, y, z);
                ResolvedColor::from_unit(r, g, b, a)
            },
        }
    }

    /// Unpack an already packed color, ignoring the active mode.
    /// `alpha` (in mode units) scales the packed alpha when it is below the maximum.
    pub fn calc_argb(&self, argb: u32, alpha: f32) -> ResolvedColor {
        if alpha == self.max_a {
            return ResolvedColor::from_argb(argb);
        }
        let scale = alpha.clamp(0.0, self.max_a) / self.max_a;
        let ai = (((argb >> 24) & 0xff) as f32 * scale) as u32;
        ResolvedColor::from_argb((ai << 24) | (argb & 0x00ffffff))
    }

    // ========================================================================
    // Channel extraction
    // ========================================================================

    pub fn alpha(&self, c: u32) -> f32 {
        scale_channel((c >> 24) & 0xff, self.max_a)
    }

    pub fn red(&self, c: u32) -> f32 {
        scale_channel((c >> 16) & 0xff, self.max_x)
    }

    pub fn green(&self, c: u32) -> f32 {
        scale_channel((c >> 8) & 0xff, self.max_y)
    }

    pub fn blue(&self, c: u32) -> f32 {
        scale_channel(c & 0xff, self.max_z)
    }

    pub fn hue(&self, c: u32) -> f32 {
        let (r, g, b, _) = unpack(c);
        rgb_to_hsb(r, g, b).0 * self.max_x
    }

    pub fn saturation(&self, c: u32) -> f32 {
        let (r, g, b, _) = unpack(c);
        rgb_to_hsb(r, g, b).1 * self.max_y
    }

    pub fn brightness(&self, c: u32) -> f32 {
        let (r, g, b, _) = unpack(c);
        rgb_to_hsb(r, g, b).2 * self.max_z
    }
}

#[inline]
fn scale_channel(v: u32, max: f32) -> f32 {
    if max == 255.0 {
        v as f32
    } else {
        (v as f32 / 255.0) * max
    }
}

/// Six-sector HSB to RGB, all values normalized to `[0, 1]`
pub fn hsb_to_rgb(hue: f32, saturation: f32, brightness: f32) -> (f32, f32, f32) {
    if saturation == 0.0 {
        return (brightness, brightness, brightness);
    }
    let which = (hue - hue.floor()) * 6.0;
    let f = which - which.floor();
    let p = brightness * (1.0 - saturation);
    let q = brightness * (1.0 - saturation * f);
    let t = brightness * (1.0 - saturation * (1.0 - f));

    match (which as u32) % 6 {
        0 => (brightness, t, p),
        1 => (q, brightness, p),
        2 => (p, brightness, t),
        3 => (p, q, brightness),
        4 => (t, p, brightness),
        _ => (brightness, p, q),
    }
}

/// RGB bytes to normalized (hue, saturation, brightness)
pub fn rgb_to_hsb(r: u8, g: u8, b: u8) -> (f32, f32, f32) {
    let (r, g, b) = (r as f32, g as f32, b as f32);
    let cmax = r.max(g).max(b);
    let cmin = r.min(g).min(b);

    let brightness = cmax / 255.0;
    let saturation = if cmax != 0.0 { (cmax - cmin) / cmax } else { 0.0 };
    if saturation == 0.0 {
        return (0.0, 0.0, brightness);
    }

    let span = cmax - cmin;
    let redc = (cmax - r) / span;
    let greenc = (cmax - g) / span;
    let bluec = (cmax - b) / span;
    let mut hue = if r == cmax {
        bluec - greenc
    } else if g == cmax {
        2.0 + redc - bluec
    } else {
        4.0 + greenc - redc
    };
    hue /= 6.0;
    if hue < 0.0 {
        hue += 1.0;
    }
    (hue, saturation, brightness)
}

/// Interpolate between two packed colors.
///
/// In HSB mode the hue travels the short way around the wheel.
pub fn lerp_color(c1: u32, c2: u32, amt: f32, mode: ColorMode) -> u32 {
    let amt = amt.clamp(0.0, 1.0);
    let (r1, g1, b1, a1) = unpack(c1);
    let (r2, g2, b2, a2) = unpack(c2);
    let lerp = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * amt).round() as u8;

    match mode {
        ColorMode::Rgb => pack(lerp(r1, r2), lerp(g1, g2), lerp(b1, b2), lerp(a1, a2)),
        ColorMode::Hsb => {
            let (mut h1, s1, v1) = rgb_to_hsb(r1, g1, b1);
            let (mut h2, s2, v2) = rgb_to_hsb(r2, g2, b2);
            if (h1 - h2).abs() > 0.5 {
                if h1 > h2 {
                    h2 += 1.0;
                } else {
                    h1 += 1.0;
                }
            }
            let h = (h1 + (h2 - h1) * amt) % 1.0;
            let s = s1 + (s2 - s1) * amt;
            let v = v1 + (v2 - v1) * amt;
            let (r, g, b) = hsb_to_rgb(h, s, v);
            let to_byte = |c: f32| (c * 255.0 + 0.5) as u8;
            pack(to_byte(r), to_byte(g), to_byte(b), lerp(a1, a2))
        },
    }
}
