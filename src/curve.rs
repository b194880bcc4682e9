//! Cubic Bézier and Catmull-Rom evaluation
//!
//! Both curve families are driven by a 4x4 basis matrix. Catmull-Rom spans
//! are converted to the equivalent cubic Bézier, and Béziers are walked with
//! the basis pre-multiplied by a forward-difference matrix for the configured
//! segment count: three vector additions per segment instead of a cubic
//! evaluation. The matrices are cached per evaluator and rebuilt lazily
//! whenever the detail or tightness changes.

use crate::geometry::Point;

/// Row-major 4x4 matrix
pub type Mat4 = [[f32; 4]; 4];

pub const DEFAULT_BEZIER_DETAIL: u32 = 20;
pub const DEFAULT_CURVE_DETAIL: u32 = 20;

pub const BEZIER_BASIS: Mat4 = [
    [-1.0, 3.0, -3.0, 1.0],
    [3.0, -6.0, 3.0, 0.0],
    [-3.0, 3.0, 0.0, 0.0],
    [1.0, 0.0, 0.0, 0.0],
];

pub const BEZIER_BASIS_INVERSE: Mat4 = [
    [0.0, 0.0, 0.0, 1.0],
    [0.0, 0.0, 1.0 / 3.0, 1.0],
    [0.0, 1.0 / 3.0, 2.0 / 3.0, 1.0],
    [1.0, 1.0, 1.0, 1.0],
];

pub fn mat4_mul(a: &Mat4, b: &Mat4) -> Mat4 {
    let mut out = [[0.0; 4]; 4];
    for (i, row) in out.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            *cell = (0..4).map(|k| a[i][k] * b[k][j]).sum();
        }
    }
    out
}

#[inline]
fn row_dot(row: &[f32; 4], v: [f32; 4]) -> f32 {
    row[0] * v[0] + row[1] * v[1] + row[2] * v[2] + row[3] * v[3]
}

/// Catmull-Rom basis for a given tightness (0 is the classic spline)
pub fn catmull_rom_basis(s: f32) -> Mat4 {
    [
        [(s - 1.0) / 2.0, (s + 3.0) / 2.0, (-3.0 - s) / 2.0, (1.0 - s) / 2.0],
        [1.0 - s, (-5.0 - s) / 2.0, s + 2.0, (s - 1.0) / 2.0],
        [(s - 1.0) / 2.0, 0.0, (1.0 - s) / 2.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
    ]
}

/// Forward-difference matrix for `segments` equal steps in t
pub fn forward_difference(segments: u32) -> Mat4 {
    let f = 1.0 / segments.max(1) as f32;
    let ff = f * f;
    let fff = ff * f;
    [
        [0.0, 0.0, 0.0, 1.0],
        [fff, ff, f, 0.0],
        [6.0 * fff, 2.0 * ff, 0.0, 0.0],
        [6.0 * fff, 0.0, 0.0, 0.0],
    ]
}

/// Evaluate one coordinate of a cubic Bézier at `t`
pub fn bezier_point(a: f32, b: f32, c: f32, d: f32, t: f32) -> f32 {
    let t1 = 1.0 - t;
    (a * t1 + 3.0 * b * t) * t1 * t1 + (3.0 * c * t1 + d * t) * t * t
}

/// Derivative of [`bezier_point`] with respect to `t`
pub fn bezier_tangent(a: f32, b: f32, c: f32, d: f32, t: f32) -> f32 {
    3.0 * t * t * (-a + 3.0 * b - 3.0 * c + d) + 6.0 * t * (a - 2.0 * b + c) + 3.0 * (-a + b)
}

/// Walks a cubic by forward differencing, yielding `segments` points after the start
#[derive(Debug, Clone)]
pub struct ForwardWalk {
    x: f32,
    y: f32,
    x1: f32,
    x2: f32,
    x3: f32,
    y1: f32,
    y2: f32,
    y3: f32,
    remaining: u32,
}

impl ForwardWalk {
    /// `start` is the on-curve point the walk begins at; it is not yielded
    pub fn new(draw: &Mat4, start: Point, pts: &[Point; 4], segments: u32) -> Self {
        let xs = [pts[0].x, pts[1].x, pts[2].x, pts[3].x];
        let ys = [pts[0].y, pts[1].y, pts[2].y, pts[3].y];
        Self {
            x: start.x,
            y: start.y,
            x1: row_dot(&draw[1], xs),
            x2: row_dot(&draw[2], xs),
            x3: row_dot(&draw[3], xs),
            y1: row_dot(&draw[1], ys),
            y2: row_dot(&draw[2], ys),
            y3: row_dot(&draw[3], ys),
            remaining: segments,
        }
    }
}

impl Iterator for ForwardWalk {
    type Item = Point;

    #[inline]
    fn next(&mut self) -> Option<Point> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        self.x += self.x1;
        self.x1 += self.x2;
        self.x2 += self.x3;
        self.y += self.y1;
        self.y1 += self.y2;
        self.y2 += self.y3;
        Some(Point::new(self.x, self.y))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining as usize, Some(self.remaining as usize))
    }
}

impl ExactSizeIterator for ForwardWalk {}

#[derive(Debug, Clone)]
struct CurveMatrices {
    basis: Mat4,
    to_bezier: Mat4,
}

/// Per-renderer curve settings and the matrices derived from them
#[derive(Debug, Clone)]
pub struct CurveEvaluator {
    bezier_detail: u32,
    curve_detail: u32,
    tightness: f32,
    bezier_draw: Option<Mat4>,
    curve: Option<CurveMatrices>,
}

impl Default for CurveEvaluator {
    fn default() -> Self {
        Self::new(DEFAULT_BEZIER_DETAIL, DEFAULT_CURVE_DETAIL, 0.0)
    }
}

impl CurveEvaluator {
    pub fn new(bezier_detail: u32, curve_detail: u32, tightness: f32) -> Self {
        Self {
            bezier_detail: bezier_detail.max(1),
            curve_detail: curve_detail.max(1),
            tightness,
            bezier_draw: None,
            curve: None,
        }
    }

    #[inline]
    pub fn bezier_detail(&self) -> u32 {
        self.bezier_detail
    }

    #[inline]
    pub fn curve_detail(&self) -> u32 {
        self.curve_detail
    }

    #[inline]
    pub fn tightness(&self) -> f32 {
        self.tightness
    }

    pub fn set_bezier_detail(&mut self, detail: u32) {
        let detail = detail.max(1);
        if detail != self.bezier_detail {
            self.bezier_detail = detail;
            self.bezier_draw = None;
        }
    }

    pub fn set_curve_detail(&mut self, detail: u32) {
        self.curve_detail = detail.max(1);
    }

    pub fn set_tightness(&mut self, tightness: f32) {
        if tightness != self.tightness {
            self.tightness = tightness;
            self.curve = None;
        }
    }

    fn bezier_draw_matrix(&mut self) -> &Mat4 {
        let detail = self.bezier_detail;
        self.bezier_draw.get_or_insert_with(|| {
            log::trace!("building bezier draw matrix for {} segments", detail);
            mat4_mul(&forward_difference(detail), &BEZIER_BASIS)
        })
    }

    fn curve_matrices(&mut self) -> &CurveMatrices {
        let s = self.tightness;
        self.curve.get_or_insert_with(|| {
            log::trace!("building curve matrices for tightness {}", s);
            let basis = catmull_rom_basis(s);
            CurveMatrices {
                to_bezier: mat4_mul(&BEZIER_BASIS_INVERSE, &basis),
                basis,
            }
        })
    }

    /// Evaluate one coordinate of the Catmull-Rom spline through `b` and `c` at `t`
    pub fn curve_point(&mut self, a: f32, b: f32, c: f32, d: f32, t: f32) -> f32 {
        let cb = &self.curve_matrices().basis;
        let tt = t * t;
        let ttt = t * tt;
        let weight = |j: usize| ttt * cb[0][j] + tt * cb[1][j] + t * cb[2][j] + cb[3][j];
        a * weight(0) + b * weight(1) + c * weight(2) + d * weight(3)
    }

    /// Derivative of [`Self::curve_point`] with respect to `t`
    pub fn curve_tangent(&mut self, a: f32, b: f32, c: f32, d: f32, t: f32) -> f32 {
        let cb = &self.curve_matrices().basis;
        let tt3 = t * t * 3.0;
        let t2 = t * 2.0;
        let weight = |j: usize| tt3 * cb[0][j] + t2 * cb[1][j] + cb[2][j];
        a * weight(0) + b * weight(1) + c * weight(2) + d * weight(3)
    }

    /// Points along a Bézier after its start point, `bezier_detail` of them
    pub fn bezier_walk(&mut self, pts: &[Point; 4]) -> ForwardWalk {
        let segments = self.bezier_detail;
        ForwardWalk::new(self.bezier_draw_matrix(), pts[0], pts, segments)
    }

    /// Control points of the cubic Bézier equal to the span `pts[1]..pts[2]`
    pub fn catmull_rom_to_bezier(&mut self, pts: &[Point; 4]) -> [Point; 4] {
        let m = &self.curve_matrices().to_bezier;
        let xs = [pts[0].x, pts[1].x, pts[2].x, pts[3].x];
        let ys = [pts[0].y, pts[1].y, pts[2].y, pts[3].y];
        let mut out = [Point::ZERO; 4];
        for (i, p) in out.iter_mut().enumerate() {
            *p = Point::new(row_dot(&m[i], xs), row_dot(&m[i], ys));
        }
        out
    }
}

/// Elevate a quadratic (start, control, end) to the equivalent cubic control points
pub fn quadratic_to_cubic(start: Point, control: Point, end: Point) -> (Point, Point) {
    let c1 = start + (control - start) * (2.0 / 3.0);
    let c2 = end + (control - end) * (2.0 / 3.0);
    (c1, c2)
}
