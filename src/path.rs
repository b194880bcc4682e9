//! Path representation
//!
//! Paths are append-only command lists in device space. The shape assembler
//! builds them while vertices arrive and hands finished ones to a surface.

use crate::curve::{quadratic_to_cubic, CurveEvaluator};
use crate::geometry::Point;

/// Path command
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    QuadTo { control: Point, end: Point },
    CubicTo { control1: Point, control2: Point, end: Point },
    Close,
}

/// A 2D path composed of commands
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Path {
    commands: Vec<PathCommand>,
    current: Option<Point>,
    subpath_start: Point,
}

/// One flattened sub-path
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Polyline {
    pub points: Vec<Point>,
    pub closed: bool,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// End point of the last command, if any geometry has been added
    #[inline]
    pub fn current_point(&self) -> Option<Point> {
        self.current
    }

    pub fn clear(&mut self) {
        self.commands.clear();
        self.current = None;
        self.subpath_start = Point::ZERO;
    }

    pub fn move_to(&mut self, p: Point) {
        self.commands.push(PathCommand::MoveTo(p));
        self.current = Some(p);
        self.subpath_start = p;
    }

    pub fn line_to(&mut self, p: Point) {
        self.commands.push(PathCommand::LineTo(p));
        self.current = Some(p);
    }

    pub fn quad_to(&mut self, control: Point, end: Point) {
        self.commands.push(PathCommand::QuadTo { control, end });
        self.current = Some(end);
    }

    pub fn cubic_to(&mut self, control1: Point, control2: Point, end: Point) {
        self.commands.push(PathCommand::CubicTo {
            control1,
            control2,
            end,
        });
        self.current = Some(end);
    }

    /// Close the current sub-path; the pen returns to its start
    pub fn close(&mut self) {
        if self.commands.is_empty() || matches!(self.commands.last(), Some(PathCommand::Close)) {
            return;
        }
        self.commands.push(PathCommand::Close);
        self.current = Some(self.subpath_start);
    }

    /// Append every command of `other`
    pub fn append(&mut self, other: &Path) {
        if other.is_empty() {
            return;
        }
        self.commands.extend_from_slice(&other.commands);
        self.current = other.current;
        self.subpath_start = other.subpath_start;
    }

    /// Expand curves into straight segments using the evaluator's Bézier detail
    pub fn flatten(&self, curves: &mut CurveEvaluator) -> Vec<Polyline> {
        let mut out = Vec::new();
        let mut line = Polyline::default();
        let mut pen = Point::ZERO;

        for cmd in &self.commands {
            match *cmd {
                PathCommand::MoveTo(p) => {
                    if line.points.len() > 1 {
                        out.push(std::mem::take(&mut line));
                    }
                    line.points.clear();
                    line.points.push(p);
                    pen = p;
                },
                PathCommand::LineTo(p) => {
                    if line.points.is_empty() {
                        line.points.push(pen);
                    }
                    line.points.push(p);
                    pen = p;
                },
                PathCommand::QuadTo { control, end } => {
                    let (c1, c2) = quadratic_to_cubic(pen, control, end);
                    if line.points.is_empty() {
                        line.points.push(pen);
                    }
                    line.points.extend(curves.bezier_walk(&[pen, c1, c2, end]));
                    pen = end;
                },
                PathCommand::CubicTo {
                    control1,
                    control2,
                    end,
                } => {
                    if line.points.is_empty() {
                        line.points.push(pen);
                    }
                    line.points.extend(curves.bezier_walk(&[pen, control1, control2, end]));
                    pen = end;
                },
                PathCommand::Close => {
                    if !line.points.is_empty() {
                        pen = line.points[0];
                        line.closed = true;
                        out.push(std::mem::take(&mut line));
                    }
                },
            }
        }
        if line.points.len() > 1 {
            out.push(line);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_close_returns_pen_to_start() {
        let mut path = Path::new();
        path.move_to(Point::new(1.0, 1.0));
        path.line_to(Point::new(5.0, 1.0));
        path.close();
        path.close();
        assert_eq!(path.len(), 3);
        assert_eq!(path.current_point(), Some(Point::new(1.0, 1.0)));
    }

    #[test]
    fn test_flatten_subpaths() {
        let mut curves = CurveEvaluator::new(4, 4, 0.0);
        let mut path = Path::new();
        path.move_to(Point::new(0.0, 0.0));
        path.line_to(Point::new(10.0, 0.0));
        path.line_to(Point::new(10.0, 10.0));
        path.close();
        path.move_to(Point::new(20.0, 0.0));
        path.cubic_to(Point::new(20.0, 10.0), Point::new(30.0, 10.0), Point::new(30.0, 0.0));

        let lines = path.flatten(&mut curves);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].closed);
        assert_eq!(lines[0].points.len(), 3);
        assert!(!lines[1].closed);
        // Start point plus one point per segment
        assert_eq!(lines[1].points.len(), 5);
        assert!(lines[1].points[4].approx_eq(&Point::new(30.0, 0.0), 1e-3));
    }

    #[test]
    fn test_flatten_quadratic_ends_on_endpoint() {
        let mut curves = CurveEvaluator::default();
        let mut path = Path::new();
        path.move_to(Point::ZERO);
        path.quad_to(Point::new(5.0, 10.0), Point::new(10.0, 0.0));
        let lines = path.flatten(&mut curves);
        let last = lines[0].points.last().copied().unwrap();
        assert!(last.approx_eq(&Point::new(10.0, 0.0), 1e-3));
    }

    #[test]
    fn test_append_keeps_order() {
        let mut a = Path::new();
        a.move_to(Point::ZERO);
        a.line_to(Point::new(1.0, 0.0));
        let mut b = Path::new();
        b.move_to(Point::new(5.0, 5.0));
        b.line_to(Point::new(6.0, 5.0));
        b.close();
        a.append(&b);
        assert_eq!(a.len(), 5);
        assert_eq!(a.commands()[2], PathCommand::MoveTo(Point::new(5.0, 5.0)));
        assert_eq!(a.current_point(), Some(Point::new(5.0, 5.0)));
    }
}
