//! Shape assembly
//!
//! Turns a vertex stream into primitives or a path. Discrete kinds (points,
//! lines, triangles, quads and their strips/fans) emit a primitive as soon as
//! enough vertices have arrived; the cadence for each kind is a row in
//! [`CADENCES`]. Polygons accumulate into a path that is only handed out at
//! `end()`, since filling needs the complete outline.
//!
//! Composes: vertex buffer → cadence table → path building → contours → end.

use crate::curve::CurveEvaluator;
use crate::error::{Error, Result};
use crate::geometry::Point;
use crate::path::Path;
use crate::style::Style;
use crate::surface::{Primitive, PrimitiveKind};
use crate::transform::Affine;
use crate::vertex::{self, VertexBuffer};

// ============================================================================
// Shape Kind
// ============================================================================

/// Optional winding hint for polygons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PolygonHint {
    #[default]
    None,
    Convex,
    Concave,
}

/// Topology family, the high bits of a shape code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ShapeFamily {
    Point = 1,
    Line = 2,
    Triangle = 3,
    Quad = 4,
    Polygon = 5,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Points,
    Lines,
    LineStrip,
    LineLoop,
    Triangles,
    TriangleStrip,
    TriangleFan,
    Quads,
    QuadStrip,
    Polygon(PolygonHint),
}

impl Default for ShapeKind {
    fn default() -> Self {
        ShapeKind::Polygon(PolygonHint::None)
    }
}

const VARIETY_BITS: u32 = 4;

impl ShapeKind {
    pub const POLYGON: ShapeKind = ShapeKind::Polygon(PolygonHint::None);

    pub fn family(self) -> ShapeFamily {
        match self {
            ShapeKind::Points => ShapeFamily::Point,
            ShapeKind::Lines | ShapeKind::LineStrip | ShapeKind::LineLoop => ShapeFamily::Line,
            ShapeKind::Triangles | ShapeKind::TriangleStrip | ShapeKind::TriangleFan => ShapeFamily::Triangle,
            ShapeKind::Quads | ShapeKind::QuadStrip => ShapeFamily::Quad,
            ShapeKind::Polygon(_) => ShapeFamily::Polygon,
        }
    }

    pub fn variety(self) -> u32 {
        match self {
            ShapeKind::Points | ShapeKind::Lines | ShapeKind::Triangles | ShapeKind::Quads => 0,
            ShapeKind::LineStrip | ShapeKind::TriangleStrip | ShapeKind::QuadStrip => 1,
            ShapeKind::LineLoop | ShapeKind::TriangleFan => 2,
            ShapeKind::Polygon(PolygonHint::None) => 0,
            ShapeKind::Polygon(PolygonHint::Convex) => 1,
            ShapeKind::Polygon(PolygonHint::Concave) => 2,
        }
    }

    /// Integer code, `family << 4 | variety`. Never zero.
    pub fn code(self) -> u32 {
        ((self.family() as u32) << VARIETY_BITS) | self.variety()
    }

    pub fn from_code(code: u32) -> Option<ShapeKind> {
        let variety = code & ((1 << VARIETY_BITS) - 1);
        let kind = match (code >> VARIETY_BITS, variety) {
            (1, 0) => ShapeKind::Points,
            (2, 0) => ShapeKind::Lines,
            (2, 1) => ShapeKind::LineStrip,
            (2, 2) => ShapeKind::LineLoop,
            (3, 0) => ShapeKind::Triangles,
            (3, 1) => ShapeKind::TriangleStrip,
            (3, 2) => ShapeKind::TriangleFan,
            (4, 0) => ShapeKind::Quads,
            (4, 1) => ShapeKind::QuadStrip,
            (5, 0) => ShapeKind::Polygon(PolygonHint::None),
            (5, 1) => ShapeKind::Polygon(PolygonHint::Convex),
            (5, 2) => ShapeKind::Polygon(PolygonHint::Concave),
            _ => return None,
        };
        Some(kind)
    }

    #[inline]
    pub fn is_polygon(self) -> bool {
        matches!(self, ShapeKind::Polygon(_))
    }
}

// ============================================================================
// Emission cadence
// ============================================================================

/// A vertex referenced by an emitted primitive
#[derive(Debug, Clone, Copy)]
enum Slot {
    /// `n` back from the newest vertex (1 is the newest)
    Back(usize),
    /// The first vertex of the shape
    First,
}

/// When a discrete kind emits, and from which vertices
#[derive(Debug, Clone, Copy)]
struct Cadence {
    kind: ShapeKind,
    primitive: PrimitiveKind,
    /// Vertex count at the first emission
    first: usize,
    /// Vertices between emissions
    period: usize,
    slots: [Slot; 4],
}

use Slot::{Back, First};

const CADENCES: [Cadence; 9] = [
    Cadence { kind: ShapeKind::Points, primitive: PrimitiveKind::Point, first: 1, period: 1, slots: [Back(1), Back(1), Back(1), Back(1)] },
    Cadence { kind: ShapeKind::Lines, primitive: PrimitiveKind::Line, first: 2, period: 2, slots: [Back(2), Back(1), Back(1), Back(1)] },
    Cadence { kind: ShapeKind::LineStrip, primitive: PrimitiveKind::Line, first: 2, period: 1, slots: [Back(2), Back(1), Back(1), Back(1)] },
    Cadence { kind: ShapeKind::LineLoop, primitive: PrimitiveKind::Line, first: 2, period: 1, slots: [Back(2), Back(1), Back(1), Back(1)] },
    Cadence { kind: ShapeKind::Triangles, primitive: PrimitiveKind::Triangle, first: 3, period: 3, slots: [Back(3), Back(2), Back(1), Back(1)] },
    Cadence { kind: ShapeKind::TriangleStrip, primitive: PrimitiveKind::Triangle, first: 3, period: 1, slots: [Back(3), Back(2), Back(1), Back(1)] },
    Cadence { kind: ShapeKind::TriangleFan, primitive: PrimitiveKind::Triangle, first: 3, period: 1, slots: [First, Back(2), Back(1), Back(1)] },
    Cadence { kind: ShapeKind::Quads, primitive: PrimitiveKind::Quad, first: 4, period: 4, slots: [Back(4), Back(3), Back(2), Back(1)] },
    Cadence { kind: ShapeKind::QuadStrip, primitive: PrimitiveKind::Quad, first: 4, period: 2, slots: [Back(4), Back(2), Back(1), Back(3)] },
];

fn cadence(kind: ShapeKind) -> Option<&'static Cadence> {
    CADENCES.iter().find(|c| c.kind == kind)
}

// ============================================================================
// Assembler
// ============================================================================

/// Curve vertices kept before the oldest are shifted out
pub const CURVE_WINDOW: usize = 8;

/// How `end()` treats a polygon outline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EndMode {
    #[default]
    Open,
    Close,
}

/// Geometry produced when a shape ends
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeOutput {
    /// Everything was already emitted vertex by vertex
    Nothing,
    /// Closing line of a LINE_LOOP
    Primitive(Primitive),
    /// Finished polygon outline, contours appended
    Path(Path),
}

/// Vertex stream state machine: idle, or a shape of one kind is open
#[derive(Debug, Clone)]
pub struct ShapeAssembler {
    kind: Option<ShapeKind>,
    vertices: VertexBuffer,
    path: Option<Path>,
    aux: Option<Path>,
    break_pending: bool,
    contour_open: bool,
    curve_points: [Point; CURVE_WINDOW],
    curve_count: usize,
}

impl Default for ShapeAssembler {
    fn default() -> Self {
        Self::new(vertex::DEFAULT_VERTEX_CAPACITY)
    }
}

impl ShapeAssembler {
    pub fn new(vertex_capacity: usize) -> Self {
        Self {
            kind: None,
            vertices: VertexBuffer::with_capacity(vertex_capacity),
            path: None,
            aux: None,
            break_pending: false,
            contour_open: false,
            curve_points: [Point::ZERO; CURVE_WINDOW],
            curve_count: 0,
        }
    }

    /// Kind of the open shape, `None` when idle
    #[inline]
    pub fn kind(&self) -> Option<ShapeKind> {
        self.kind
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.kind.is_some()
    }

    #[inline]
    pub fn contour_open(&self) -> bool {
        self.contour_open
    }

    #[inline]
    pub fn vertices(&self) -> &VertexBuffer {
        &self.vertices
    }

    /// Drop the open shape without producing anything
    pub fn reset(&mut self) {
        self.kind = None;
        self.vertices.clear();
        self.path = None;
        self.aux = None;
        self.break_pending = false;
        self.contour_open = false;
        self.curve_count = 0;
    }

    fn fail<T>(&mut self, e: Error) -> Result<T> {
        log::debug!("aborting shape: {}", e);
        self.reset();
        Err(e)
    }

    /// Start a shape. If one is still open it is ended first and its output
    /// returned so the caller can draw it.
    pub fn begin(&mut self, kind: ShapeKind) -> ShapeOutput {
        let pending = if self.is_open() {
            log::warn!("begin_shape() called while a shape is open, ending the previous shape");
            self.end(EndMode::Open)
        } else {
            ShapeOutput::Nothing
        };
        self.reset();
        self.kind = Some(kind);
        pending
    }

    /// Open polygon kind, or the appropriate error for `call`
    fn require_polygon(&mut self, call: &'static str) -> Result<()> {
        match self.kind {
            None => self.fail(Error::NoShapeOpen(call)),
            Some(kind) if !kind.is_polygon() => self.fail(Error::IncompatibleShape(call)),
            Some(_) => Ok(()),
        }
    }

    /// Path new geometry goes into, created on first use
    fn active_path(&mut self) -> &mut Path {
        self.path.get_or_insert_with(Path::new)
    }

    /// Add a plain vertex. Discrete kinds may return a finished primitive.
    pub fn vertex(
        &mut self,
        p: Point,
        uv: Option<(f32, f32)>,
        matrix: &Affine,
        style: &Style,
    ) -> Result<Option<Primitive>> {
        let Some(kind) = self.kind else {
            return self.fail(Error::NoShapeOpen("vertex"));
        };
        let (tx, ty) = matrix.transform_point(p.x, p.y);
        self.store_vertex(p, Point::new(tx, ty), uv, style);
        self.curve_count = 0;

        if kind.is_polygon() {
            let screen = Point::new(tx, ty);
            let fresh = self.path.is_none() || self.break_pending;
            let path = self.active_path();
            if fresh {
                path.move_to(screen);
            } else {
                path.line_to(screen);
            }
            self.break_pending = false;
            return Ok(None);
        }

        Ok(cadence(kind).and_then(|c| self.emit(c)))
    }

    fn store_vertex(&mut self, model: Point, screen: Point, uv: Option<(f32, f32)>, style: &Style) {
        let fill = &style.fill.color;
        let stroke = &style.stroke.color;
        let (u, v) = uv.unwrap_or((0.0, 0.0));
        let record = self.vertices.push();
        record[vertex::X] = model.x;
        record[vertex::Y] = model.y;
        record[vertex::TX] = screen.x;
        record[vertex::TY] = screen.y;
        record[vertex::R] = fill.r;
        record[vertex::G] = fill.g;
        record[vertex::B] = fill.b;
        record[vertex::A] = fill.a;
        record[vertex::SR] = stroke.r;
        record[vertex::SG] = stroke.g;
        record[vertex::SB] = stroke.b;
        record[vertex::SA] = stroke.a;
        record[vertex::U] = u;
        record[vertex::V] = v;
        record[vertex::NZ] = 1.0;
        record[vertex::SW] = style.stroke_weight;
    }

    fn emit(&self, c: &Cadence) -> Option<Primitive> {
        let n = self.vertices.len();
        if n < c.first || (n - c.first) % c.period != 0 {
            return None;
        }
        let mut points = [Point::ZERO; 4];
        for (out, slot) in points.iter_mut().zip(c.slots) {
            let i = match slot {
                Back(k) => n - k,
                First => 0,
            };
            let (x, y) = self.vertices.screen_point(i);
            *out = Point::new(x, y);
        }
        Some(Primitive::new(c.primitive, &points))
    }

    /// Check shared by the Bézier-style vertex calls
    fn require_prior_vertex(&mut self, call: &'static str) -> Result<()> {
        self.require_polygon(call)?;
        let has_point = self.path.as_ref().and_then(Path::current_point).is_some();
        if self.vertices.is_empty() || !has_point || self.break_pending {
            return self.fail(Error::VertexRequired(call));
        }
        Ok(())
    }

    /// Cubic segment from the current point
    pub fn bezier_vertex(&mut self, c1: Point, c2: Point, end: Point, matrix: &Affine) -> Result<()> {
        self.require_prior_vertex("bezier_vertex")?;
        let t = |p: Point| Point::from(matrix.transform_point(p.x, p.y));
        let (c1, c2, end) = (t(c1), t(c2), t(end));
        self.active_path().cubic_to(c1, c2, end);
        self.curve_count = 0;
        Ok(())
    }

    /// Quadratic segment from the current point
    pub fn quadratic_vertex(&mut self, control: Point, end: Point, matrix: &Affine) -> Result<()> {
        self.require_prior_vertex("quadratic_vertex")?;
        let t = |p: Point| Point::from(matrix.transform_point(p.x, p.y));
        let (control, end) = (t(control), t(end));
        self.active_path().quad_to(control, end);
        self.curve_count = 0;
        Ok(())
    }

    /// Catmull-Rom input point. From the fourth in a row on, each call adds
    /// the span between the two middle points of the last four as a cubic.
    pub fn curve_vertex(&mut self, p: Point, matrix: &Affine, curves: &mut CurveEvaluator) -> Result<()> {
        self.require_polygon("curve_vertex")?;

        if self.curve_count == CURVE_WINDOW {
            self.curve_points.copy_within(2.., 0);
            self.curve_count -= 2;
        }
        self.curve_points[self.curve_count] = Point::from(matrix.transform_point(p.x, p.y));
        self.curve_count += 1;

        if self.curve_count >= 4 {
            let n = self.curve_count;
            let window = [
                self.curve_points[n - 4],
                self.curve_points[n - 3],
                self.curve_points[n - 2],
                self.curve_points[n - 1],
            ];
            let bz = curves.catmull_rom_to_bezier(&window);
            let fresh = self.path.is_none() || self.break_pending;
            let path = self.active_path();
            if fresh {
                path.move_to(bz[0]);
            }
            path.cubic_to(bz[1], bz[2], bz[3]);
            self.break_pending = false;
        }
        Ok(())
    }

    /// Route following vertices into a separate contour
    pub fn begin_contour(&mut self) -> Result<()> {
        self.require_polygon("begin_contour")?;
        if self.contour_open {
            log::warn!("begin_contour() called twice without end_contour()");
            return Ok(());
        }
        std::mem::swap(&mut self.path, &mut self.aux);
        // The first contour starts a fresh path; later ones share it and need a break
        if self.path.is_some() {
            self.break_pending = true;
        }
        self.contour_open = true;
        self.curve_count = 0;
        Ok(())
    }

    /// Close the open contour and go back to the main outline
    pub fn end_contour(&mut self) {
        if !self.contour_open {
            log::warn!("end_contour() called without begin_contour()");
            return;
        }
        if let Some(path) = self.path.as_mut() {
            path.close();
        }
        std::mem::swap(&mut self.path, &mut self.aux);
        self.contour_open = false;
        self.break_pending = false;
        self.curve_count = 0;
    }

    /// Finish the shape and return to idle
    pub fn end(&mut self, mode: EndMode) -> ShapeOutput {
        let Some(kind) = self.kind else {
            log::warn!("end_shape() called without begin_shape()");
            return ShapeOutput::Nothing;
        };
        if self.contour_open {
            self.end_contour();
            log::warn!("missing end_contour() before end_shape()");
        }

        let output = match kind {
            ShapeKind::Polygon(_) => match self.path.take() {
                Some(mut path) => {
                    if mode == EndMode::Close {
                        path.close();
                    }
                    if let Some(aux) = self.aux.take() {
                        path.append(&aux);
                    }
                    ShapeOutput::Path(path)
                },
                None => ShapeOutput::Nothing,
            },
            ShapeKind::LineLoop if self.vertices.len() >= 3 => {
                let (lx, ly) = self.vertices.screen_point(self.vertices.len() - 1);
                let (fx, fy) = self.vertices.screen_point(0);
                ShapeOutput::Primitive(Primitive::new(
                    PrimitiveKind::Line,
                    &[Point::new(lx, ly), Point::new(fx, fy)],
                ))
            },
            _ => ShapeOutput::Nothing,
        };
        self.reset();
        output
    }
}
