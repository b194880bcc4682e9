//! Convenience shapes built on top of the shape assembler

use std::f32::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::geometry::TrigTable;
use crate::renderer::Renderer;
use crate::shape::{EndMode, ShapeKind};
use crate::style::ShapeMode;
use crate::surface::Surface;

/// Control point distance for a quarter ellipse drawn as one cubic
pub const KAPPA: f32 = 0.552_284_8;

/// How an arc's outline is finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ArcMode {
    /// Unclosed, just the curve
    #[default]
    Open,
    /// Ends joined by a straight line
    Chord,
    /// Ends joined through the center
    Pie,
}

/// Read `rect()` arguments as two sorted corners
fn rect_corners(mode: ShapeMode, a: f32, b: f32, c: f32, d: f32) -> (f32, f32, f32, f32) {
    let (x1, y1, x2, y2) = match mode {
        ShapeMode::Corner => (a, b, a + c, b + d),
        ShapeMode::Corners => (a, b, c, d),
        ShapeMode::Center => (a - c / 2.0, b - d / 2.0, a + c / 2.0, b + d / 2.0),
        ShapeMode::Radius => (a - c, b - d, a + c, b + d),
    };
    (x1.min(x2), y1.min(y2), x1.max(x2), y1.max(y2))
}

/// Read `ellipse()`/`arc()` arguments as center and radii
fn ellipse_bounds(mode: ShapeMode, a: f32, b: f32, c: f32, d: f32) -> (f32, f32, f32, f32) {
    let (x1, y1, x2, y2) = match mode {
        ShapeMode::Corner => (a, b, a + c, b + d),
        ShapeMode::Corners => (a, b, c, d),
        ShapeMode::Center => (a - c / 2.0, b - d / 2.0, a + c / 2.0, b + d / 2.0),
        ShapeMode::Radius => (a - c, b - d, a + c, b + d),
    };
    let (rx, ry) = ((x2 - x1).abs() / 2.0, (y2 - y1).abs() / 2.0);
    ((x1 + x2) / 2.0, (y1 + y2) / 2.0, rx, ry)
}

impl<S: Surface> Renderer<S> {
    pub fn point(&mut self, x: f32, y: f32) -> Result<()> {
        self.begin_shape(ShapeKind::Points);
        self.vertex(x, y)?;
        self.end_shape(EndMode::Open);
        Ok(())
    }

    pub fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Result<()> {
        self.begin_shape(ShapeKind::Lines);
        self.vertex(x1, y1)?;
        self.vertex(x2, y2)?;
        self.end_shape(EndMode::Open);
        Ok(())
    }

    pub fn triangle(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x3: f32, y3: f32) -> Result<()> {
        self.begin_shape(ShapeKind::Triangles);
        self.vertex(x1, y1)?;
        self.vertex(x2, y2)?;
        self.vertex(x3, y3)?;
        self.end_shape(EndMode::Open);
        Ok(())
    }

    pub fn quad(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x3: f32, y3: f32, x4: f32, y4: f32) -> Result<()> {
        self.begin_shape(ShapeKind::Quads);
        self.vertex(x1, y1)?;
        self.vertex(x2, y2)?;
        self.vertex(x3, y3)?;
        self.vertex(x4, y4)?;
        self.end_shape(EndMode::Open);
        Ok(())
    }

    /// Rectangle, arguments read according to the rect mode
    pub fn rect(&mut self, a: f32, b: f32, c: f32, d: f32) -> Result<()> {
        let (x1, y1, x2, y2) = rect_corners(self.style().rect_mode, a, b, c, d);
        self.begin_shape(ShapeKind::POLYGON);
        self.vertex(x1, y1)?;
        self.vertex(x2, y1)?;
        self.vertex(x2, y2)?;
        self.vertex(x1, y2)?;
        self.end_shape(EndMode::Close);
        Ok(())
    }

    pub fn square(&mut self, x: f32, y: f32, extent: f32) -> Result<()> {
        self.rect(x, y, extent, extent)
    }

    /// Ellipse as four cubic quadrants, arguments read according to the
    /// ellipse mode
    pub fn ellipse(&mut self, a: f32, b: f32, c: f32, d: f32) -> Result<()> {
        let (cx, cy, rx, ry) = ellipse_bounds(self.style().ellipse_mode, a, b, c, d);
        let (kx, ky) = (rx * KAPPA, ry * KAPPA);

        self.begin_shape(ShapeKind::POLYGON);
        self.vertex(cx + rx, cy)?;
        self.bezier_vertex(cx + rx, cy + ky, cx + kx, cy + ry, cx, cy + ry)?;
        self.bezier_vertex(cx - kx, cy + ry, cx - rx, cy + ky, cx - rx, cy)?;
        self.bezier_vertex(cx - rx, cy - ky, cx - kx, cy - ry, cx, cy - ry)?;
        self.bezier_vertex(cx + kx, cy - ry, cx + rx, cy - ky, cx + rx, cy)?;
        self.end_shape(EndMode::Close);
        Ok(())
    }

    pub fn circle(&mut self, x: f32, y: f32, extent: f32) -> Result<()> {
        self.ellipse(x, y, extent, extent)
    }

    /// Elliptical arc from `start` to `stop` radians, sampled from the
    /// half-degree trig table. Nothing is drawn when `stop < start`; spans
    /// over a full turn draw the whole ellipse outline.
    pub fn arc(&mut self, a: f32, b: f32, c: f32, d: f32, start: f32, stop: f32, mode: ArcMode) -> Result<()> {
        if stop < start || start.is_nan() || stop.is_nan() {
            return Ok(());
        }
        let (cx, cy, rx, ry) = ellipse_bounds(self.style().ellipse_mode, a, b, c, d);

        let (mut start, mut stop) = (start, stop);
        if stop - start >= TAU {
            start = 0.0;
            stop = TAU;
        } else if start < 0.0 || start >= TAU {
            let offset = (start / TAU).floor() * TAU;
            start -= offset;
            stop -= offset;
        }

        let table = TrigTable::get();
        let first = TrigTable::index(start);
        let last = TrigTable::index(stop);

        self.begin_shape(ShapeKind::POLYGON);
        if mode == ArcMode::Pie {
            self.vertex(cx, cy)?;
        }
        for i in first..last {
            let (cos, sin) = table.at(i);
            self.vertex(cx + cos * rx, cy + sin * ry)?;
        }
        // The table only has half-degree steps; the end point is computed directly
        self.vertex(cx + stop.cos() * rx, cy + stop.sin() * ry)?;

        let end = match mode {
            ArcMode::Open => EndMode::Open,
            ArcMode::Chord | ArcMode::Pie => EndMode::Close,
        };
        self.end_shape(end);
        Ok(())
    }

    pub fn bezier(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x3: f32, y3: f32, x4: f32, y4: f32) -> Result<()> {
        self.begin_shape(ShapeKind::POLYGON);
        self.vertex(x1, y1)?;
        self.bezier_vertex(x2, y2, x3, y3, x4, y4)?;
        self.end_shape(EndMode::Open);
        Ok(())
    }

    /// Catmull-Rom segment from (x2, y2) to (x3, y3); the outer points only
    /// shape the ends
    pub fn curve(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x3: f32, y3: f32, x4: f32, y4: f32) -> Result<()> {
        self.begin_shape(ShapeKind::POLYGON);
        self.curve_vertex(x1, y1)?;
        self.curve_vertex(x2, y2)?;
        self.curve_vertex(x3, y3)?;
        self.curve_vertex(x4, y4)?;
        self.end_shape(EndMode::Open);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::path::PathCommand;
    use crate::surface::{PrimitiveKind, RecordingSurface};

    fn renderer() -> Renderer<RecordingSurface> {
        Renderer::with_size(100, 100, RecordingSurface::new()).unwrap()
    }

    #[test]
    fn test_rect_modes() {
        assert_eq!(rect_corners(ShapeMode::Corner, 10.0, 20.0, 30.0, 40.0), (10.0, 20.0, 40.0, 60.0));
        assert_eq!(rect_corners(ShapeMode::Corners, 40.0, 60.0, 10.0, 20.0), (10.0, 20.0, 40.0, 60.0));
        assert_eq!(rect_corners(ShapeMode::Center, 25.0, 40.0, 30.0, 40.0), (10.0, 20.0, 40.0, 60.0));
        assert_eq!(rect_corners(ShapeMode::Radius, 25.0, 40.0, 15.0, 20.0), (10.0, 20.0, 40.0, 60.0));
    }

    #[test]
    fn test_ellipse_modes() {
        assert_eq!(ellipse_bounds(ShapeMode::Center, 50.0, 50.0, 20.0, 10.0), (50.0, 50.0, 10.0, 5.0));
        assert_eq!(ellipse_bounds(ShapeMode::Radius, 50.0, 50.0, 20.0, 10.0), (50.0, 50.0, 20.0, 10.0));
        assert_eq!(ellipse_bounds(ShapeMode::Corner, 0.0, 0.0, 20.0, 10.0), (10.0, 5.0, 10.0, 5.0));
    }

    #[test]
    fn test_rect_emits_closed_path() {
        let mut r = renderer();
        r.rect(10.0, 20.0, 30.0, 40.0).unwrap();
        let filled = r.surface().filled_paths();
        assert_eq!(filled.len(), 1);
        let cmds = filled[0].commands();
        assert_eq!(cmds[0], PathCommand::MoveTo(Point::new(10.0, 20.0)));
        assert_eq!(cmds[2], PathCommand::LineTo(Point::new(40.0, 60.0)));
        assert_eq!(cmds.last(), Some(&PathCommand::Close));
        assert_eq!(r.surface().stroked_paths().len(), 1);
    }

    #[test]
    fn test_ellipse_is_four_cubics() {
        let mut r = renderer();
        r.no_stroke();
        r.ellipse(50.0, 50.0, 20.0, 20.0).unwrap();
        let path = r.surface().filled_paths()[0].clone();
        let cubics = path
            .commands()
            .iter()
            .filter(|c| matches!(c, PathCommand::CubicTo { .. }))
            .count();
        assert_eq!(cubics, 4);
        assert_eq!(path.commands()[0], PathCommand::MoveTo(Point::new(60.0, 50.0)));
    }

    #[test]
    fn test_discrete_helpers() {
        let mut r = renderer();
        r.point(1.0, 1.0).unwrap();
        r.line(0.0, 0.0, 5.0, 5.0).unwrap();
        r.triangle(0.0, 0.0, 5.0, 0.0, 0.0, 5.0).unwrap();
        r.quad(0.0, 0.0, 5.0, 0.0, 5.0, 5.0, 0.0, 5.0).unwrap();
        let s = r.surface();
        assert_eq!(s.primitives(PrimitiveKind::Point).len(), 1);
        assert_eq!(s.primitives(PrimitiveKind::Line).len(), 1);
        assert_eq!(s.primitives(PrimitiveKind::Triangle).len(), 1);
        assert_eq!(s.primitives(PrimitiveKind::Quad).len(), 1);
    }

    #[test]
    fn test_arc_pie_starts_at_center() {
        let mut r = renderer();
        r.no_stroke();
        r.arc(50.0, 50.0, 40.0, 40.0, 0.0, std::f32::consts::FRAC_PI_2, ArcMode::Pie)
            .unwrap();
        let path = r.surface().filled_paths()[0].clone();
        let cmds = path.commands();
        assert_eq!(cmds[0], PathCommand::MoveTo(Point::new(50.0, 50.0)));
        assert_eq!(cmds.last(), Some(&PathCommand::Close));
        // 90 degrees at half-degree steps, plus the center and the exact end
        assert_eq!(path.len(), 1 + 180 + 1 + 1);
    }

    #[test]
    fn test_arc_backwards_draws_nothing() {
        let mut r = renderer();
        r.surface_mut().clear();
        r.arc(50.0, 50.0, 40.0, 40.0, 1.0, 0.5, ArcMode::Open).unwrap();
        assert!(r.surface().filled_paths().is_empty());
    }
}
