//! 2D affine transforms and the bounded matrix stack

use std::fmt;

use crate::error::{Error, Result};

/// 2D affine matrix in row form:
///
/// ```text
/// x' = m00 * x + m01 * y + m02
/// y' = m10 * x + m11 * y + m12
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub m00: f32,
    pub m01: f32,
    pub m02: f32,
    pub m10: f32,
    pub m11: f32,
    pub m12: f32,
}

impl Default for Affine {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Affine {
    pub const IDENTITY: Affine = Affine {
        m00: 1.0,
        m01: 0.0,
        m02: 0.0,
        m10: 0.0,
        m11: 1.0,
        m12: 0.0,
    };

    pub const fn new(m00: f32, m01: f32, m02: f32, m10: f32, m11: f32, m12: f32) -> Self {
        Self {
            m00,
            m01,
            m02,
            m10,
            m11,
            m12,
        }
    }

    #[inline]
    pub fn reset(&mut self) {
        *self = Self::IDENTITY;
    }

    /// True when the matrix only scales and translates (no rotation or shear)
    #[inline]
    pub fn is_axis_aligned(&self) -> bool {
        self.m01 == 0.0 && self.m10 == 0.0
    }

    /// Post-multiply: `self = self * n`, so `n` acts in the local frame
    pub fn apply(&mut self, n: &Affine) {
        let (t0, t1) = (self.m00, self.m01);
        self.m00 = n.m00 * t0 + n.m10 * t1;
        self.m01 = n.m01 * t0 + n.m11 * t1;
        self.m02 += n.m02 * t0 + n.m12 * t1;

        let (t0, t1) = (self.m10, self.m11);
        self.m10 = n.m00 * t0 + n.m10 * t1;
        self.m11 = n.m01 * t0 + n.m11 * t1;
        self.m12 += n.m02 * t0 + n.m12 * t1;
    }

    /// Pre-multiply: `self = n * self`, so `n` acts in the parent frame
    pub fn pre_apply(&mut self, n: &Affine) {
        let (t0, t1, t2) = (self.m00, self.m10, self.m02);
        let (u0, u1, u2) = (self.m01, self.m11, self.m12);

        self.m00 = n.m00 * t0 + n.m01 * t1;
        self.m10 = n.m10 * t0 + n.m11 * t1;
        self.m01 = n.m00 * u0 + n.m01 * u1;
        self.m11 = n.m10 * u0 + n.m11 * u1;
        self.m02 = n.m00 * t2 + n.m01 * u2 + n.m02;
        self.m12 = n.m10 * t2 + n.m11 * u2 + n.m12;
    }

    /// Translate along the current basis vectors
    pub fn translate(&mut self, tx: f32, ty: f32) {
        self.m02 = tx * self.m00 + ty * self.m01 + self.m02;
        self.m12 = tx * self.m10 + ty * self.m11 + self.m12;
    }

    pub fn rotate(&mut self, angle: f32) {
        let (s, c) = angle.sin_cos();
        self.apply(&Affine::new(c, -s, 0.0, s, c, 0.0));
    }

    pub fn scale(&mut self, sx: f32, sy: f32) {
        self.apply(&Affine::new(sx, 0.0, 0.0, 0.0, sy, 0.0));
    }

    pub fn shear_x(&mut self, angle: f32) {
        self.apply(&Affine::new(1.0, angle.tan(), 0.0, 0.0, 1.0, 0.0));
    }

    pub fn shear_y(&mut self, angle: f32) {
        self.apply(&Affine::new(1.0, 0.0, 0.0, angle.tan(), 1.0, 0.0));
    }

    #[inline]
    pub fn determinant(&self) -> f32 {
        self.m00 * self.m11 - self.m01 * self.m10
    }

    /// Invert in place. Returns false (and leaves the matrix alone) when singular.
    pub fn invert(&mut self) -> bool {
        let det = self.determinant();
        if det.abs() <= f32::MIN_POSITIVE {
            return false;
        }

        let t00 = self.m00;
        let t01 = self.m01;
        let t02 = self.m02;
        let t10 = self.m10;
        let t11 = self.m11;
        let t12 = self.m12;

        self.m00 = t11 / det;
        self.m10 = -t10 / det;
        self.m01 = -t01 / det;
        self.m11 = t00 / det;
        self.m02 = (t01 * t12 - t11 * t02) / det;
        self.m12 = (t10 * t02 - t00 * t12) / det;
        true
    }

    /// Inverted copy, if the matrix is invertible
    pub fn inverse(&self) -> Option<Affine> {
        let mut m = *self;
        m.invert().then_some(m)
    }

    #[inline]
    pub fn mult_x(&self, x: f32, y: f32) -> f32 {
        self.m00 * x + self.m01 * y + self.m02
    }

    #[inline]
    pub fn mult_y(&self, x: f32, y: f32) -> f32 {
        self.m10 * x + self.m11 * y + self.m12
    }

    #[inline]
    pub fn transform_point(&self, x: f32, y: f32) -> (f32, f32) {
        (self.mult_x(x, y), self.mult_y(x, y))
    }

    #[inline]
    pub fn as_array(&self) -> [f32; 6] {
        [self.m00, self.m01, self.m02, self.m10, self.m11, self.m12]
    }
}

impl fmt::Display for Affine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>10.4} {:>10.4} {:>10.4}", self.m00, self.m01, self.m02)?;
        write!(f, "{:>10.4} {:>10.4} {:>10.4}", self.m10, self.m11, self.m12)
    }
}

/// Default number of matrices `push_matrix()` can save
pub const MATRIX_STACK_DEPTH: usize = 32;

/// Current matrix plus a bounded stack of saved snapshots
#[derive(Debug, Clone)]
pub struct MatrixStack {
    current: Affine,
    saved: Vec<Affine>,
    capacity: usize,
}

impl Default for MatrixStack {
    fn default() -> Self {
        Self::with_capacity(MATRIX_STACK_DEPTH)
    }
}

impl MatrixStack {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            current: Affine::IDENTITY,
            saved: Vec::with_capacity(capacity),
            capacity,
        }
    }

    #[inline]
    pub fn current(&self) -> &Affine {
        &self.current
    }

    #[inline]
    pub fn current_mut(&mut self) -> &mut Affine {
        &mut self.current
    }

    pub fn set(&mut self, m: Affine) {
        self.current = m;
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn push(&mut self) -> Result<()> {
        if self.saved.len() == self.capacity {
            return Err(Error::MatrixStackOverflow(self.capacity));
        }
        self.saved.push(self.current);
        Ok(())
    }

    pub fn pop(&mut self) -> Result<()> {
        self.current = self.saved.pop().ok_or(Error::MatrixStackUnderflow)?;
        Ok(())
    }

    /// Reset the current matrix to identity. Saved entries are kept.
    pub fn reset(&mut self) {
        self.current.reset();
    }

    /// Drop every saved entry and reset to identity (start of a draw cycle)
    pub fn clear(&mut self) {
        if !self.saved.is_empty() {
            log::debug!("discarding {} unpopped matrices", self.saved.len());
        }
        self.saved.clear();
        self.current.reset();
    }

    pub fn apply(&mut self, n: &Affine) {
        self.current.apply(n);
    }

    pub fn translate(&mut self, tx: f32, ty: f32) {
        self.current.translate(tx, ty);
    }

    pub fn rotate(&mut self, angle: f32) {
        self.current.rotate(angle);
    }

    pub fn scale(&mut self, sx: f32, sy: f32) {
        self.current.scale(sx, sy);
    }

    /// Project a model-space point to screen space
    #[inline]
    pub fn screen_x(&self, x: f32, y: f32) -> f32 {
        self.current.mult_x(x, y)
    }

    #[inline]
    pub fn screen_y(&self, x: f32, y: f32) -> f32 {
        self.current.mult_y(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_translate_uses_current_basis() {
        let mut m = Affine::IDENTITY;
        m.scale(2.0, 3.0);
        m.translate(10.0, 10.0);
        assert_eq!(m.transform_point(0.0, 0.0), (20.0, 30.0));
    }

    #[test]
    fn test_apply_is_local_frame() {
        // translate then rotate: the rotation happens around the translated origin
        let mut m = Affine::IDENTITY;
        m.translate(100.0, 0.0);
        m.rotate(FRAC_PI_2);
        let (x, y) = m.transform_point(10.0, 0.0);
        assert!(approx(x, 100.0) && approx(y, 10.0), "({}, {})", x, y);
    }

    #[test]
    fn test_pre_apply_is_parent_frame() {
        let mut m = Affine::IDENTITY;
        m.scale(2.0, 2.0);
        m.pre_apply(&Affine::new(1.0, 0.0, 5.0, 0.0, 1.0, 5.0));
        // Translation is not scaled because it comes after
        assert_eq!(m.transform_point(1.0, 1.0), (7.0, 7.0));
    }

    #[test]
    fn test_invert_round_trip() {
        let mut m = Affine::IDENTITY;
        m.translate(3.0, -7.0);
        m.rotate(0.3);
        m.scale(2.0, 0.5);
        let inv = m.inverse().unwrap();
        let (x, y) = m.transform_point(4.0, 9.0);
        let (bx, by) = inv.transform_point(x, y);
        assert!(approx(bx, 4.0) && approx(by, 9.0));
    }

    #[test]
    fn test_singular_matrix_does_not_invert() {
        let mut m = Affine::IDENTITY;
        m.scale(0.0, 1.0);
        let before = m;
        assert!(!m.invert());
        assert_eq!(m, before);
    }

    #[test]
    fn test_shear_x() {
        let mut m = Affine::IDENTITY;
        m.shear_x(FRAC_PI_4);
        let (x, y) = m.transform_point(0.0, 10.0);
        assert!(approx(x, 10.0) && approx(y, 10.0));
    }

    #[test]
    fn test_push_pop_restores_bits() {
        let mut stack = MatrixStack::default();
        stack.translate(1.5, 2.25);
        stack.rotate(0.123);
        stack.scale(1.1, 0.9);
        let before = *stack.current();

        stack.push().unwrap();
        stack.pop().unwrap();
        assert_eq!(stack.current().as_array(), before.as_array());

        stack.push().unwrap();
        stack.rotate(2.0);
        stack.translate(-40.0, 3.0);
        stack.pop().unwrap();
        assert_eq!(stack.current().as_array(), before.as_array());
    }

    #[test]
    fn test_stack_overflow_and_underflow() {
        let mut stack = MatrixStack::with_capacity(2);
        assert!(matches!(stack.pop(), Err(Error::MatrixStackUnderflow)));
        stack.push().unwrap();
        stack.push().unwrap();
        assert!(matches!(stack.push(), Err(Error::MatrixStackOverflow(2))));
        assert_eq!(stack.depth(), 2);
    }

    #[test]
    fn test_screen_projection() {
        let mut stack = MatrixStack::default();
        stack.translate(50.0, 25.0);
        stack.scale(2.0, 2.0);
        assert_eq!(stack.screen_x(5.0, 5.0), 60.0);
        assert_eq!(stack.screen_y(5.0, 5.0), 35.0);
    }
}
