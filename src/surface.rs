//! Surface adapters
//!
//! A surface is whatever actually puts geometry on a device. The renderer
//! hands it finished paths, discrete primitives and modified pixel regions;
//! how those get rasterized is entirely up to the surface.

use crate::geometry::{Point, Rect};
use crate::image::{BlendMode, PixelBuffer};
use crate::path::Path;
use crate::style::Paint;

/// Topology of a discrete primitive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Point,
    Line,
    Triangle,
    Quad,
}

impl PrimitiveKind {
    /// Vertices consumed by one primitive of this kind
    #[inline]
    pub const fn vertex_count(self) -> usize {
        match self {
            PrimitiveKind::Point => 1,
            PrimitiveKind::Line => 2,
            PrimitiveKind::Triangle => 3,
            PrimitiveKind::Quad => 4,
        }
    }
}

/// One emitted primitive, in device space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Primitive {
    pub kind: PrimitiveKind,
    points: [Point; 4],
}

impl Primitive {
    /// Takes the first `kind.vertex_count()` points of `points`
    pub fn new(kind: PrimitiveKind, points: &[Point]) -> Self {
        let mut stored = [Point::ZERO; 4];
        for (slot, p) in stored.iter_mut().zip(points.iter().take(kind.vertex_count())) {
            *slot = *p;
        }
        Self { kind, points: stored }
    }

    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points[..self.kind.vertex_count()]
    }
}

/// Device backend driven by the renderer
pub trait Surface {
    /// Fill a finished outline
    fn fill_path(&mut self, path: &Path, paint: &Paint);

    /// Stroke a finished outline
    fn stroke_path(&mut self, path: &Path, paint: &Paint);

    /// Draw one point, line, triangle or quad
    fn draw_primitive(&mut self, primitive: &Primitive, paint: &Paint);

    /// Present `region` of the renderer's pixel buffer
    fn blit_pixels(&mut self, region: Rect, pixels: &PixelBuffer);

    /// Whether this surface can composite with `mode`
    fn supports_blend_mode(&self, _mode: BlendMode) -> bool {
        true
    }
}

// ============================================================================
// Null surface
// ============================================================================

/// Discards all geometry; for pixel-only use
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSurface;

impl Surface for NullSurface {
    fn fill_path(&mut self, _path: &Path, _paint: &Paint) {}

    fn stroke_path(&mut self, _path: &Path, _paint: &Paint) {}

    fn draw_primitive(&mut self, _primitive: &Primitive, _paint: &Paint) {}

    fn blit_pixels(&mut self, _region: Rect, _pixels: &PixelBuffer) {}
}

// ============================================================================
// Recording surface
// ============================================================================

/// One call received by a [`RecordingSurface`]
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    FillPath { path: Path, paint: Paint },
    StrokePath { path: Path, paint: Paint },
    Primitive { primitive: Primitive, paint: Paint },
    /// Region and the pixels inside it, row-major
    Blit { region: Rect, pixels: Vec<u32> },
}

/// Records every call in order, for tests and debugging
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    events: Vec<SurfaceEvent>,
    unsupported: Vec<BlendMode>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// A recorder that refuses the given blend modes
    pub fn rejecting(unsupported: &[BlendMode]) -> Self {
        Self {
            events: Vec::new(),
            unsupported: unsupported.to_vec(),
        }
    }

    #[inline]
    pub fn events(&self) -> &[SurfaceEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<SurfaceEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Every recorded primitive of `kind`, in emission order
    pub fn primitives(&self, kind: PrimitiveKind) -> Vec<Primitive> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SurfaceEvent::Primitive { primitive, .. } if primitive.kind == kind => Some(*primitive),
                _ => None,
            })
            .collect()
    }

    pub fn filled_paths(&self) -> Vec<&Path> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SurfaceEvent::FillPath { path, .. } => Some(path),
                _ => None,
            })
            .collect()
    }

    pub fn stroked_paths(&self) -> Vec<&Path> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SurfaceEvent::StrokePath { path, .. } => Some(path),
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn fill_path(&mut self, path: &Path, paint: &Paint) {
        self.events.push(SurfaceEvent::FillPath {
            path: path.clone(),
            paint: *paint,
        });
    }

    fn stroke_path(&mut self, path: &Path, paint: &Paint) {
        self.events.push(SurfaceEvent::StrokePath {
            path: path.clone(),
            paint: *paint,
        });
    }

    fn draw_primitive(&mut self, primitive: &Primitive, paint: &Paint) {
        self.events.push(SurfaceEvent::Primitive {
            primitive: *primitive,
            paint: *paint,
        });
    }

    fn blit_pixels(&mut self, region: Rect, pixels: &PixelBuffer) {
        let mut copied = Vec::with_capacity((region.w.max(0) * region.h.max(0)) as usize);
        for y in region.y..region.bottom() {
            for x in region.x..region.right() {
                copied.push(pixels.get(x, y));
            }
        }
        self.events.push(SurfaceEvent::Blit { region, pixels: copied });
    }

    fn supports_blend_mode(&self, mode: BlendMode) -> bool {
        !self.unsupported.contains(&mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_truncates_to_kind() {
        let pts = [Point::new(1.0, 2.0), Point::new(3.0, 4.0), Point::new(5.0, 6.0)];
        let line = Primitive::new(PrimitiveKind::Line, &pts);
        assert_eq!(line.points(), &pts[..2]);
    }

    #[test]
    fn test_recording_surface_filters() {
        let mut surface = RecordingSurface::rejecting(&[BlendMode::Subtract]);
        let paint = Paint::default();
        surface.draw_primitive(&Primitive::new(PrimitiveKind::Point, &[Point::ZERO]), &paint);
        surface.fill_path(&Path::new(), &paint);
        assert_eq!(surface.primitives(PrimitiveKind::Point).len(), 1);
        assert_eq!(surface.primitives(PrimitiveKind::Line).len(), 0);
        assert_eq!(surface.filled_paths().len(), 1);
        assert!(!surface.supports_blend_mode(BlendMode::Subtract));
        assert!(surface.supports_blend_mode(BlendMode::Add));
        assert_eq!(surface.take_events().len(), 2);
        assert!(surface.events().is_empty());
    }
}
