//! Geometry basics: points, integer rectangles and the shared trig table

use std::f32::consts::TAU;
use std::ops::{Add, Mul, Sub};
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// A point in 2D space
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Approximate equality check for floating point comparison
    #[inline]
    pub fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self.x - other.x).abs() < epsilon && (self.y - other.y).abs() < epsilon
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Self;
    #[inline]
    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Point {
    type Output = Self;
    #[inline]
    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

impl Mul<f32> for Point {
    type Output = Self;
    #[inline]
    fn mul(self, s: f32) -> Self {
        Self::new(self.x * s, self.y * s)
    }
}

/// Largest pixel coordinate a float is narrowed to. Keeps rectangle
/// extents built from two such coordinates inside `i32`.
pub const COORD_LIMIT: i32 = i32::MAX / 2;

/// Round a device coordinate to a pixel edge, clamped to `±COORD_LIMIT`.
/// NaN maps to 0.
#[inline]
pub fn pixel_coord(v: f32) -> i32 {
    (v.round() as i32).clamp(-COORD_LIMIT, COORD_LIMIT)
}

/// Integer pixel rectangle. `x`/`y` may be negative; `w`/`h` are extents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    #[inline]
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle from two corners (exclusive far corner)
    #[inline]
    pub fn from_corners(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self::new(x1, y1, x2.saturating_sub(x1), y2.saturating_sub(y1))
    }

    /// Rectangle from float corners rounded to the nearest pixel edge
    pub fn from_float_corners(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self::from_corners(pixel_coord(x1), pixel_coord(y1), pixel_coord(x2), pixel_coord(y2))
    }

    #[inline]
    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.w)
    }

    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.h)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    /// Smallest rectangle covering both
    pub fn union(&self, other: &Rect) -> Rect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Rect::from_corners(
            self.x.min(other.x),
            self.y.min(other.y),
            self.right().max(other.right()),
            self.bottom().max(other.bottom()),
        )
    }

    /// Clip to `[0, width) x [0, height)`
    pub fn clamp_to(&self, width: u32, height: u32) -> Rect {
        let x1 = self.x.clamp(0, width as i32);
        let y1 = self.y.clamp(0, height as i32);
        let x2 = self.right().clamp(0, width as i32);
        let y2 = self.bottom().clamp(0, height as i32);
        Rect::from_corners(x1, y1, x2.max(x1), y2.max(y1))
    }
}

// ============================================================================
// Trig table
// ============================================================================

/// Table resolution in degrees
pub const SINCOS_PRECISION: f32 = 0.5;
/// Number of entries covering one full turn
pub const SINCOS_LENGTH: usize = (360.0 / SINCOS_PRECISION) as usize;

/// Sine/cosine lookup shared by every renderer; built on first use
pub struct TrigTable {
    pub sin: Box<[f32]>,
    pub cos: Box<[f32]>,
}

static TRIG: OnceLock<TrigTable> = OnceLock::new();

impl TrigTable {
    pub fn get() -> &'static TrigTable {
        TRIG.get_or_init(|| {
            let step = SINCOS_PRECISION.to_radians();
            let (sin, cos) = (0..SINCOS_LENGTH)
                .map(|i| (i as f32 * step).sin_cos())
                .unzip::<_, _, Vec<f32>, Vec<f32>>();
            TrigTable {
                sin: sin.into_boxed_slice(),
                cos: cos.into_boxed_slice(),
            }
        })
    }

    /// Table index for an angle in radians, rounded to the nearest entry
    #[inline]
    pub fn index(angle: f32) -> i32 {
        (0.5 + (angle / TAU) * SINCOS_LENGTH as f32).floor() as i32
    }

    /// (cos, sin) at a table index, wrapping negative and overflowing indices
    #[inline]
    pub fn at(&self, index: i32) -> (f32, f32) {
        let i = index.rem_euclid(SINCOS_LENGTH as i32) as usize;
        (self.cos[i], self.sin[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_clamp() {
        let r = Rect::new(-5, 3, 20, 100).clamp_to(10, 10);
        assert_eq!(r, Rect::new(0, 3, 10, 7));
        let outside = Rect::new(50, 50, 5, 5).clamp_to(10, 10);
        assert!(outside.is_empty());
    }

    #[test]
    fn test_rect_union() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(9, 9, 4, 4);
        let c = Rect::new(10, 0, 4, 4);
        assert_eq!(a.union(&b), Rect::new(0, 0, 13, 13));
        assert_eq!(Rect::default().union(&c), c);
    }

    #[test]
    fn test_huge_coordinates_saturate() {
        assert_eq!(pixel_coord(3.0e9), COORD_LIMIT);
        assert_eq!(pixel_coord(-3.0e9), -COORD_LIMIT);
        assert_eq!(pixel_coord(f32::NAN), 0);
        assert_eq!(pixel_coord(2.5), 3);

        let r = Rect::from_float_corners(-3.0e9, 0.0, 3.0e9, 2.0);
        assert_eq!(r.x, -COORD_LIMIT);
        assert_eq!(r.w, 2 * COORD_LIMIT);
        assert_eq!(r.clamp_to(4, 4), Rect::new(0, 0, 4, 2));

        let wide = Rect::new(i32::MAX - 1, i32::MIN, i32::MAX, 5);
        assert_eq!(wide.right(), i32::MAX);
        assert_eq!(Rect::from_corners(i32::MIN, 0, i32::MAX, 1).w, i32::MAX);
    }

    #[test]
    fn test_trig_table() {
        let table = TrigTable::get();
        assert_eq!(table.sin.len(), SINCOS_LENGTH);
        let (c, s) = table.at(TrigTable::index(std::f32::consts::FRAC_PI_2));
        assert!(c.abs() < 1e-5);
        assert!((s - 1.0).abs() < 1e-5);
        // Negative indices wrap
        assert_eq!(table.at(-1), table.at(SINCOS_LENGTH as i32 - 1));
    }
}
