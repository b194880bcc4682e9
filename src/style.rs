//! Drawing style: per-role colors, stroke geometry, placement modes
//!
//! Fill, stroke and tint each keep their last resolved color even while
//! disabled, so `no_fill()` followed by re-enabling restores the old color.

use serde::{Deserialize, Serialize};

use crate::color::{ColorSpace, ResolvedColor};
use crate::error::{Error, Result};
use crate::image::BlendMode;

/// Default number of styles `push_style()` can save
pub const STYLE_STACK_DEPTH: usize = 64;

/// Default background, a light gray
pub const DEFAULT_BACKGROUND: u32 = 0xffcccccc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StrokeCap {
    #[default]
    Round,
    Square,
    Project,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StrokeJoin {
    #[default]
    Miter,
    Bevel,
    Round,
}

/// How the four numbers given to `rect()`/`ellipse()` are read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeMode {
    /// x, y of the top-left corner, then width and height
    Corner,
    /// Two opposite corners
    Corners,
    /// Center, then width and height
    Center,
    /// Center, then half width and half height
    Radius,
}

/// How the numbers given to `image()` are read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ImageMode {
    #[default]
    Corner,
    Corners,
    Center,
}

/// A color role (fill, stroke, tint) with its enabled flag
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoleColor {
    pub enabled: bool,
    pub color: ResolvedColor,
}

impl RoleColor {
    pub fn new(enabled: bool, argb: u32) -> Self {
        Self {
            enabled,
            color: ResolvedColor::from_argb(argb),
        }
    }

    /// Store a new color and turn the role on
    #[inline]
    pub fn set(&mut self, color: ResolvedColor) {
        self.color = color;
        self.enabled = true;
    }

    /// Packed color when enabled
    #[inline]
    pub fn active(&self) -> Option<u32> {
        self.enabled.then_some(self.color.argb)
    }
}

/// Everything `push_style()` saves
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub fill: RoleColor,
    pub stroke: RoleColor,
    pub tint: RoleColor,
    pub background: ResolvedColor,
    pub stroke_weight: f32,
    pub stroke_cap: StrokeCap,
    pub stroke_join: StrokeJoin,
    pub rect_mode: ShapeMode,
    pub ellipse_mode: ShapeMode,
    pub image_mode: ImageMode,
    pub blend_mode: BlendMode,
    pub smooth: bool,
    pub color_space: ColorSpace,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fill: RoleColor::new(true, 0xffffffff),
            stroke: RoleColor::new(true, 0xff000000),
            tint: RoleColor::new(false, 0xffffffff),
            background: ResolvedColor::from_argb(DEFAULT_BACKGROUND),
            stroke_weight: 1.0,
            stroke_cap: StrokeCap::default(),
            stroke_join: StrokeJoin::default(),
            rect_mode: ShapeMode::Corner,
            ellipse_mode: ShapeMode::Center,
            image_mode: ImageMode::default(),
            blend_mode: BlendMode::default(),
            smooth: true,
            color_space: ColorSpace::default(),
        }
    }
}

impl Style {
    /// What a surface needs to draw with this style
    pub fn paint(&self) -> Paint {
        Paint {
            fill: self.fill.active(),
            stroke: self.stroke.active(),
            stroke_weight: self.stroke_weight,
            stroke_cap: self.stroke_cap,
            stroke_join: self.stroke_join,
            blend_mode: self.blend_mode,
            smooth: self.smooth,
        }
    }
}

/// Resolved drawing state handed to a surface with each path or primitive
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paint {
    /// Fill color, `None` when fill is disabled
    pub fill: Option<u32>,
    /// Stroke color, `None` when stroke is disabled
    pub stroke: Option<u32>,
    pub stroke_weight: f32,
    pub stroke_cap: StrokeCap,
    pub stroke_join: StrokeJoin,
    pub blend_mode: BlendMode,
    pub smooth: bool,
}

impl Default for Paint {
    fn default() -> Self {
        Style::default().paint()
    }
}

/// Bounded stack of saved styles
#[derive(Debug, Clone)]
pub struct StyleStack {
    saved: Vec<Style>,
    capacity: usize,
}

impl Default for StyleStack {
    fn default() -> Self {
        Self::with_capacity(STYLE_STACK_DEPTH)
    }
}

impl StyleStack {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            saved: Vec::new(),
            capacity,
        }
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    pub fn push(&mut self, style: &Style) -> Result<()> {
        if self.saved.len() == self.capacity {
            return Err(Error::StyleStackOverflow(self.capacity));
        }
        self.saved.push(style.clone());
        Ok(())
    }

    pub fn pop(&mut self) -> Result<Style> {
        self.saved.pop().ok_or(Error::StyleStackUnderflow)
    }

    pub fn clear(&mut self) {
        self.saved.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let paint = Style::default().paint();
        assert_eq!(paint.fill, Some(0xffffffff));
        assert_eq!(paint.stroke, Some(0xff000000));
        assert_eq!(paint.blend_mode, BlendMode::Blend);
    }

    #[test]
    fn test_disabled_role_keeps_color() {
        let mut role = RoleColor::new(true, 0xff112233);
        role.enabled = false;
        assert_eq!(role.active(), None);
        role.enabled = true;
        assert_eq!(role.active(), Some(0xff112233));
    }

    #[test]
    fn test_stack_bounds() {
        let mut stack = StyleStack::with_capacity(1);
        assert!(matches!(stack.pop(), Err(Error::StyleStackUnderflow)));
        let mut style = Style::default();
        style.stroke_weight = 4.0;
        stack.push(&style).unwrap();
        assert!(matches!(stack.push(&style), Err(Error::StyleStackOverflow(1))));
        assert_eq!(stack.pop().unwrap().stroke_weight, 4.0);
    }
}
