//! The immediate-mode renderer
//!
//! Owns every piece of drawing state (canvas, style, matrix stack, curve
//! settings, shape assembler) and drives a [`Surface`] with the geometry it
//! produces. Pixel-level calls (`set`, `filter`, `image`, `background`, ...)
//! write straight into the canvas; [`Renderer::flush`] hands the modified
//! region to the surface.

use std::borrow::Cow;

use crate::color::{self, ColorArg, ColorMode, ColorSpace, ResolvedColor, ALPHA_MASK};
use crate::config::RendererConfig;
use crate::curve::{self, CurveEvaluator};
use crate::error::{Error, Result};
use crate::geometry::{Point, Rect};
use crate::image::compositor::{self, Sampling, ONE};
use crate::image::{BlendMode, Filter, ImageFormat, NamedBlendMode, PixelBuffer};
use crate::path::Path;
use crate::shape::{EndMode, ShapeAssembler, ShapeKind, ShapeOutput};
use crate::style::{ImageMode, ShapeMode, StrokeCap, StrokeJoin, Style, StyleStack};
use crate::surface::Surface;
use crate::transform::{Affine, MatrixStack};

pub struct Renderer<S: Surface> {
    config: RendererConfig,
    canvas: PixelBuffer,
    surface: S,
    style: Style,
    styles: StyleStack,
    matrix: MatrixStack,
    curves: CurveEvaluator,
    shape: ShapeAssembler,
}

impl<S: Surface> Renderer<S> {
    /// Build a renderer and clear its canvas to the default background
    pub fn new(config: RendererConfig, surface: S) -> Result<Self> {
        config.validate()?;
        let canvas = PixelBuffer::new(config.width, config.height, config.format)?;
        let style = Style {
            smooth: config.smooth,
            ..Style::default()
        };

        let mut renderer = Self {
            canvas,
            surface,
            styles: StyleStack::with_capacity(config.style_stack_depth),
            matrix: MatrixStack::with_capacity(config.matrix_stack_depth),
            curves: CurveEvaluator::new(config.bezier_detail, config.curve_detail, config.curve_tightness),
            shape: ShapeAssembler::new(config.vertex_capacity),
            style,
            config,
        };
        let bg = renderer.style.background.argb;
        renderer.fill_background(bg);

        log::debug!(
            "renderer created: {}x{} {:?}",
            renderer.config.width,
            renderer.config.height,
            renderer.config.format
        );
        Ok(renderer)
    }

    /// Renderer of the given size with every other setting at its default
    pub fn with_size(width: u32, height: u32, surface: S) -> Result<Self> {
        Self::new(RendererConfig::new(width, height), surface)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.canvas.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.canvas.height()
    }

    #[inline]
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    #[inline]
    pub fn canvas(&self) -> &PixelBuffer {
        &self.canvas
    }

    #[inline]
    pub fn canvas_mut(&mut self) -> &mut PixelBuffer {
        &mut self.canvas
    }

    #[inline]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    #[inline]
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    #[inline]
    pub fn style(&self) -> &Style {
        &self.style
    }

    #[inline]
    pub fn shape_kind(&self) -> Option<ShapeKind> {
        self.shape.kind()
    }

    /// Abort any open shape when `result` is a fatal error
    fn fatal<T>(&mut self, result: Result<T>) -> Result<T> {
        if result.is_err() && self.shape.is_open() {
            self.shape.reset();
        }
        result
    }

    // ========================================================================
    // Frame lifecycle
    // ========================================================================

    /// Start a frame: the matrix stack is emptied and reset to identity and
    /// styles saved but never popped last frame are dropped
    pub fn begin_draw(&mut self) {
        self.matrix.clear();
        if self.styles.depth() > 0 {
            log::debug!("dropping {} unpopped styles", self.styles.depth());
            self.styles.clear();
        }
    }

    /// End a frame and present any pending pixel edits
    pub fn end_draw(&mut self) {
        if self.shape.is_open() {
            log::warn!("end_draw() called with a shape still open, ending it");
            self.end_shape(EndMode::Open);
        }
        self.flush();
    }

    /// Hand the canvas's modified region to the surface
    pub fn flush(&mut self) {
        if let Some(region) = self.canvas.take_modified() {
            log::trace!("flushing {:?}", region);
            self.surface.blit_pixels(region, &self.canvas);
        }
    }

    // ========================================================================
    // Color
    // ========================================================================

    /// Color mode with one maximum for every channel
    pub fn color_mode(&mut self, mode: ColorMode, max: f32) {
        self.style.color_space = ColorSpace::uniform(mode, max);
    }

    /// Color mode with separate maxima
    pub fn color_mode_ranges(&mut self, mode: ColorMode, max_x: f32, max_y: f32, max_z: f32, max_a: f32) {
        self.style.color_space = ColorSpace::new(mode, max_x, max_y, max_z, max_a);
    }

    #[inline]
    pub fn color_space(&self) -> &ColorSpace {
        &self.style.color_space
    }

    /// Pack a color using the active color mode
    pub fn color(&self, c: impl Into<ColorArg>) -> u32 {
        self.style.color_space.color(c.into())
    }

    pub fn red(&self, c: u32) -> f32 {
        self.style.color_space.red(c)
    }

    pub fn green(&self, c: u32) -> f32 {
        self.style.color_space.green(c)
    }

    pub fn blue(&self, c: u32) -> f32 {
        self.style.color_space.blue(c)
    }

    pub fn alpha(&self, c: u32) -> f32 {
        self.style.color_space.alpha(c)
    }

    pub fn hue(&self, c: u32) -> f32 {
        self.style.color_space.hue(c)
    }

    pub fn saturation(&self, c: u32) -> f32 {
        self.style.color_space.saturation(c)
    }

    pub fn brightness(&self, c: u32) -> f32 {
        self.style.color_space.brightness(c)
    }

    /// Interpolate in the active color mode
    pub fn lerp_color(&self, c1: u32, c2: u32, amt: f32) -> u32 {
        color::lerp_color(c1, c2, amt, self.style.color_space.mode())
    }

    pub fn fill(&mut self, c: impl Into<ColorArg>) {
        let resolved = self.style.color_space.calc(c.into());
        self.style.fill.set(resolved);
    }

    pub fn no_fill(&mut self) {
        self.style.fill.enabled = false;
    }

    pub fn stroke(&mut self, c: impl Into<ColorArg>) {
        let resolved = self.style.color_space.calc(c.into());
        self.style.stroke.set(resolved);
    }

    pub fn no_stroke(&mut self) {
        self.style.stroke.enabled = false;
    }

    pub fn tint(&mut self, c: impl Into<ColorArg>) {
        let resolved = self.style.color_space.calc(c.into());
        self.style.tint.set(resolved);
    }

    pub fn no_tint(&mut self) {
        self.style.tint.enabled = false;
    }

    // ========================================================================
    // Background / clear
    // ========================================================================

    fn fill_background(&mut self, argb: u32) {
        // An RGB canvas cannot hold a translucent background
        let argb = if self.canvas.format() == ImageFormat::Rgb { argb | ALPHA_MASK } else { argb };
        self.canvas.fill(argb);
    }

    /// Fill the whole canvas with a color
    pub fn background(&mut self, c: impl Into<ColorArg>) {
        let mut resolved = self.style.color_space.calc(c.into());
        if self.canvas.format() == ImageFormat::Rgb && resolved.has_alpha {
            resolved = ResolvedColor::from_argb(resolved.argb | ALPHA_MASK);
        }
        self.style.background = resolved;
        self.fill_background(resolved.argb);
    }

    /// Replace the canvas with an image of exactly the same size
    pub fn background_image(&mut self, img: &PixelBuffer) -> Result<()> {
        if img.width() != self.canvas.width() || img.height() != self.canvas.height() {
            let err = Error::BackgroundSizeMismatch {
                expected_w: self.canvas.width(),
                expected_h: self.canvas.height(),
                actual_w: img.width(),
                actual_h: img.height(),
            };
            return self.fatal(Err(err));
        }
        self.canvas.set_image(0, 0, img);
        Ok(())
    }

    /// Fill with transparent black (opaque black on an RGB canvas)
    pub fn clear(&mut self) {
        self.fill_background(0);
    }

    // ========================================================================
    // Style
    // ========================================================================

    pub fn stroke_weight(&mut self, weight: f32) {
        self.style.stroke_weight = weight;
    }

    pub fn stroke_cap(&mut self, cap: StrokeCap) {
        self.style.stroke_cap = cap;
    }

    pub fn stroke_join(&mut self, join: StrokeJoin) {
        self.style.stroke_join = join;
    }

    pub fn rect_mode(&mut self, mode: ShapeMode) {
        self.style.rect_mode = mode;
    }

    pub fn ellipse_mode(&mut self, mode: ShapeMode) {
        self.style.ellipse_mode = mode;
    }

    pub fn image_mode(&mut self, mode: ImageMode) {
        self.style.image_mode = mode;
    }

    pub fn smooth(&mut self) {
        self.style.smooth = true;
    }

    pub fn no_smooth(&mut self) {
        self.style.smooth = false;
    }

    /// Switch blend mode. Modes this renderer or its surface cannot do are
    /// rejected with a warning and the current mode stays.
    pub fn blend_mode(&mut self, mode: impl Into<NamedBlendMode>) {
        let named = mode.into();
        match named.to_base() {
            None => log::warn!("blend_mode({:?}) is not supported by this renderer", named),
            Some(base) if !self.surface.supports_blend_mode(base) => {
                log::warn!("blend_mode({}) is not supported by this surface", base.name());
            },
            Some(base) => self.style.blend_mode = base,
        }
    }

    pub fn push_style(&mut self) -> Result<()> {
        let result = self.styles.push(&self.style);
        self.fatal(result)
    }

    pub fn pop_style(&mut self) -> Result<()> {
        let result = self.styles.pop();
        let style = self.fatal(result)?;
        self.style = style;
        Ok(())
    }

    /// Save matrix and style together
    pub fn push(&mut self) -> Result<()> {
        self.push_matrix()?;
        if let Err(e) = self.styles.push(&self.style) {
            self.matrix.pop()?;
            return self.fatal(Err(e));
        }
        Ok(())
    }

    /// Restore what the matching `push()` saved
    pub fn pop(&mut self) -> Result<()> {
        if self.matrix.depth() == 0 {
            return self.fatal(Err(Error::MatrixStackUnderflow));
        }
        self.pop_style()?;
        self.pop_matrix()
    }

    // ========================================================================
    // Transform
    // ========================================================================

    pub fn push_matrix(&mut self) -> Result<()> {
        let result = self.matrix.push();
        self.fatal(result)
    }

    pub fn pop_matrix(&mut self) -> Result<()> {
        let result = self.matrix.pop();
        self.fatal(result)
    }

    pub fn reset_matrix(&mut self) {
        self.matrix.reset();
    }

    pub fn apply_matrix(&mut self, m: &Affine) {
        self.matrix.apply(m);
    }

    #[inline]
    pub fn get_matrix(&self) -> Affine {
        *self.matrix.current()
    }

    pub fn set_matrix(&mut self, m: Affine) {
        self.matrix.set(m);
    }

    pub fn translate(&mut self, tx: f32, ty: f32) {
        self.matrix.translate(tx, ty);
    }

    pub fn rotate(&mut self, angle: f32) {
        self.matrix.rotate(angle);
    }

    /// Same as [`Self::rotate`]; the only rotation axis a 2D renderer has
    pub fn rotate_z(&mut self, angle: f32) {
        self.matrix.rotate(angle);
    }

    pub fn scale(&mut self, sx: f32, sy: f32) {
        self.matrix.scale(sx, sy);
    }

    pub fn shear_x(&mut self, angle: f32) {
        self.matrix.current_mut().shear_x(angle);
    }

    pub fn shear_y(&mut self, angle: f32) {
        self.matrix.current_mut().shear_y(angle);
    }

    #[inline]
    pub fn screen_x(&self, x: f32, y: f32) -> f32 {
        self.matrix.screen_x(x, y)
    }

    #[inline]
    pub fn screen_y(&self, x: f32, y: f32) -> f32 {
        self.matrix.screen_y(x, y)
    }

    // 3D calls only exist to fail loudly

    pub fn translate_3d(&mut self, _tx: f32, _ty: f32, _tz: f32) -> Result<()> {
        self.fatal(Err(Error::DepthUnsupported("translate")))
    }

    pub fn rotate_x(&mut self, _angle: f32) -> Result<()> {
        self.fatal(Err(Error::DepthUnsupported("rotate_x")))
    }

    pub fn rotate_y(&mut self, _angle: f32) -> Result<()> {
        self.fatal(Err(Error::DepthUnsupported("rotate_y")))
    }

    pub fn scale_3d(&mut self, _sx: f32, _sy: f32, _sz: f32) -> Result<()> {
        self.fatal(Err(Error::DepthUnsupported("scale")))
    }

    pub fn vertex_3d(&mut self, _x: f32, _y: f32, _z: f32) -> Result<()> {
        self.fatal(Err(Error::DepthUnsupported("vertex")))
    }

    // ========================================================================
    // Curves
    // ========================================================================

    pub fn bezier_detail(&mut self, segments: u32) {
        self.curves.set_bezier_detail(segments);
    }

    pub fn curve_detail(&mut self, segments: u32) {
        self.curves.set_curve_detail(segments);
    }

    pub fn curve_tightness(&mut self, tightness: f32) {
        self.curves.set_tightness(tightness);
    }

    pub fn bezier_point(&self, a: f32, b: f32, c: f32, d: f32, t: f32) -> f32 {
        curve::bezier_point(a, b, c, d, t)
    }

    pub fn bezier_tangent(&self, a: f32, b: f32, c: f32, d: f32, t: f32) -> f32 {
        curve::bezier_tangent(a, b, c, d, t)
    }

    pub fn curve_point(&mut self, a: f32, b: f32, c: f32, d: f32, t: f32) -> f32 {
        self.curves.curve_point(a, b, c, d, t)
    }

    pub fn curve_tangent(&mut self, a: f32, b: f32, c: f32, d: f32, t: f32) -> f32 {
        self.curves.curve_tangent(a, b, c, d, t)
    }

    /// The curve settings, e.g. for flattening paths on the surface side
    #[inline]
    pub fn curves_mut(&mut self) -> &mut CurveEvaluator {
        &mut self.curves
    }

    // ========================================================================
    // Shapes
    // ========================================================================

    fn draw_output(&mut self, output: ShapeOutput) {
        match output {
            ShapeOutput::Nothing => {},
            ShapeOutput::Primitive(p) => self.surface.draw_primitive(&p, &self.style.paint()),
            ShapeOutput::Path(path) => self.draw_path(&path),
        }
    }

    fn draw_path(&mut self, path: &Path) {
        let paint = self.style.paint();
        if paint.fill.is_some() {
            self.surface.fill_path(path, &paint);
        }
        if paint.stroke.is_some() {
            self.surface.stroke_path(path, &paint);
        }
    }

    /// Start a shape. Pending pixel edits are flushed first so the new
    /// geometry lands on top of them.
    pub fn begin_shape(&mut self, kind: ShapeKind) {
        self.flush();
        let pending = self.shape.begin(kind);
        self.draw_output(pending);
    }

    pub fn vertex(&mut self, x: f32, y: f32) -> Result<()> {
        self.vertex_with(Point::new(x, y), None)
    }

    /// Vertex with texture coordinates
    pub fn vertex_uv(&mut self, x: f32, y: f32, u: f32, v: f32) -> Result<()> {
        self.vertex_with(Point::new(x, y), Some((u, v)))
    }

    fn vertex_with(&mut self, p: Point, uv: Option<(f32, f32)>) -> Result<()> {
        let emitted = self.shape.vertex(p, uv, self.matrix.current(), &self.style)?;
        if let Some(primitive) = emitted {
            self.surface.draw_primitive(&primitive, &self.style.paint());
        }
        Ok(())
    }

    pub fn bezier_vertex(&mut self, x2: f32, y2: f32, x3: f32, y3: f32, x4: f32, y4: f32) -> Result<()> {
        self.shape.bezier_vertex(
            Point::new(x2, y2),
            Point::new(x3, y3),
            Point::new(x4, y4),
            self.matrix.current(),
        )
    }

    pub fn quadratic_vertex(&mut self, cx: f32, cy: f32, x3: f32, y3: f32) -> Result<()> {
        self.shape
            .quadratic_vertex(Point::new(cx, cy), Point::new(x3, y3), self.matrix.current())
    }

    pub fn curve_vertex(&mut self, x: f32, y: f32) -> Result<()> {
        self.shape
            .curve_vertex(Point::new(x, y), self.matrix.current(), &mut self.curves)
    }

    pub fn begin_contour(&mut self) -> Result<()> {
        self.shape.begin_contour()
    }

    pub fn end_contour(&mut self) {
        self.shape.end_contour();
    }

    pub fn end_shape(&mut self, mode: EndMode) {
        let output = self.shape.end(mode);
        self.draw_output(output);
    }

    // ========================================================================
    // Pixels
    // ========================================================================

    /// Canvas color at (x, y), `0` outside
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> u32 {
        self.canvas.get(x, y)
    }

    pub fn get_region(&self, x: i32, y: i32, w: u32, h: u32) -> Result<PixelBuffer> {
        self.canvas.get_region(x, y, w, h)
    }

    /// Write one canvas pixel, ignoring the transform
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, c: u32) {
        self.canvas.set(x, y, c);
    }

    /// Copy an image in unscaled, ignoring the transform and blend mode
    pub fn set_image(&mut self, x: i32, y: i32, img: &PixelBuffer) {
        self.canvas.set_image(x, y, img);
    }

    /// Mark a region as changed after editing pixels directly
    pub fn update_pixels(&mut self, x: i32, y: i32, w: u32, h: u32) {
        self.canvas.update_pixels(x, y, w, h);
    }

    pub fn filter(&mut self, kind: Filter) -> Result<()> {
        let result = self.canvas.filter(kind);
        self.fatal(result)
    }

    /// Scaled copy between two canvas regions
    pub fn copy(&mut self, src: Rect, dst: Rect) {
        self.canvas.copy_within(src, dst);
    }

    /// Scaled copy from another image
    pub fn copy_from(&mut self, img: &PixelBuffer, src: Rect, dst: Rect) {
        self.canvas.copy(img, src, dst);
    }

    /// Scaled, blended copy between two canvas regions
    pub fn blend(&mut self, src: Rect, dst: Rect, mode: BlendMode) {
        self.canvas.blend_within(src, dst, mode);
    }

    /// Scaled, blended copy from another image
    pub fn blend_from(&mut self, img: &PixelBuffer, src: Rect, dst: Rect, mode: BlendMode) {
        self.canvas.blend(img, src, dst, mode);
    }

    /// Use a same-sized mask's low byte as canvas alpha; the canvas becomes ARGB
    pub fn mask(&mut self, mask: &PixelBuffer) -> Result<()> {
        let result = self.canvas.mask(mask);
        self.fatal(result)
    }

    // ========================================================================
    // Images
    // ========================================================================

    /// Draw an image at its natural size
    pub fn image(&mut self, img: &PixelBuffer, x: f32, y: f32) {
        let (w, h) = (img.width() as f32, img.height() as f32);
        match self.style.image_mode {
            // CORNERS reads the last pair as the far corner
            ImageMode::Corners => self.image_sized(img, x, y, x + w, y + h),
            _ => self.image_sized(img, x, y, w, h),
        }
    }

    /// Draw an image scaled into a box read according to the image mode
    pub fn image_sized(&mut self, img: &PixelBuffer, a: f32, b: f32, c: f32, d: f32) {
        let (mut x, mut y, mut w, mut h) = match self.style.image_mode {
            ImageMode::Corner => (a, b, c, d),
            ImageMode::Corners => (a, b, c - a, d - b),
            ImageMode::Center => (a - c / 2.0, b - d / 2.0, c, d),
        };
        if w < 0.0 {
            x += w;
            w = -w;
        }
        if h < 0.0 {
            y += h;
            h = -h;
        }
        if w == 0.0 || h == 0.0 {
            return;
        }

        let source = self.tinted(img);
        let sampling = if self.style.smooth { Sampling::Bilinear } else { Sampling::Nearest };
        let m = *self.matrix.current();

        if m.is_axis_aligned() && m.m00 > 0.0 && m.m11 > 0.0 {
            let (x1, y1) = m.transform_point(x, y);
            let (x2, y2) = m.transform_point(x + w, y + h);
            let target = Rect::from_float_corners(x1, y1, x2, y2);
            compositor::blit(
                &source,
                source.bounds(),
                &mut self.canvas,
                target,
                self.style.blend_mode,
                sampling,
            );
        } else {
            self.image_transformed(&source, &m, (x, y, w, h), sampling);
        }
    }

    /// Apply the tint, or convert an ALPHA image to colored pixels
    fn tinted<'a>(&self, img: &'a PixelBuffer) -> Cow<'a, PixelBuffer> {
        let tint = self.style.tint.active().unwrap_or(0xffffffff);
        if img.format() != ImageFormat::Alpha && tint == 0xffffffff {
            return Cow::Borrowed(img);
        }
        let (tr, tg, tb, ta) = color::unpack(tint);
        let (tr, tg, tb, ta) = (u32::from(tr), u32::from(tg), u32::from(tb), u32::from(ta));

        let pixels: Vec<u32> = match img.format() {
            ImageFormat::Alpha => {
                let lower = tint & 0x00ffffff;
                img.pixels()
                    .iter()
                    .map(|&p| (scale_channel(p & 0xff, ta) << 24) | lower)
                    .collect()
            },
            format => img
                .pixels()
                .iter()
                .map(|&p| {
                    let a = if format == ImageFormat::Rgb { ta } else { scale_channel(p >> 24, ta) };
                    let r = scale_channel((p >> 16) & 0xff, tr);
                    let g = scale_channel((p >> 8) & 0xff, tg);
                    let b = scale_channel(p & 0xff, tb);
                    (a << 24) | (r << 16) | (g << 8) | b
                })
                .collect(),
        };

        match PixelBuffer::from_pixels(img.width(), img.height(), ImageFormat::Argb, pixels) {
            Ok(buf) => Cow::Owned(buf),
            Err(e) => {
                log::debug!("tint skipped: {}", e);
                Cow::Borrowed(img)
            },
        }
    }

    /// Rotated or sheared draw: every covered canvas pixel is mapped back
    /// into the image through the inverse matrix and sampled there.
    fn image_transformed(&mut self, img: &PixelBuffer, m: &Affine, (x, y, w, h): (f32, f32, f32, f32), sampling: Sampling) {
        let Some(inv) = m.inverse() else {
            log::debug!("image() skipped, matrix is not invertible");
            return;
        };

        let corners = [(x, y), (x + w, y), (x + w, y + h), (x, y + h)].map(|(cx, cy)| m.transform_point(cx, cy));
        let min_x = corners.iter().map(|c| c.0).fold(f32::INFINITY, f32::min);
        let min_y = corners.iter().map(|c| c.1).fold(f32::INFINITY, f32::min);
        let max_x = corners.iter().map(|c| c.0).fold(f32::NEG_INFINITY, f32::max);
        let max_y = corners.iter().map(|c| c.1).fold(f32::NEG_INFINITY, f32::max);
        let area = Rect::from_float_corners(min_x.floor(), min_y.floor(), max_x.ceil(), max_y.ceil())
            .clamp_to(self.canvas.width(), self.canvas.height());
        if area.is_empty() {
            return;
        }

        let (iw, ih) = (img.width() as f32, img.height() as f32);
        let (su, sv) = (iw / w, ih / h);
        let mode = self.style.blend_mode;
        let opaque = if self.canvas.format() == ImageFormat::Rgb { ALPHA_MASK } else { 0 };
        let fixed = |v: f32| (v * ONE as f32) as i64;

        for py in area.y..area.bottom() {
            for px in area.x..area.right() {
                let (mx, my) = inv.transform_point(px as f32 + 0.5, py as f32 + 0.5);
                let u = (mx - x) * su;
                let v = (my - y) * sv;
                if u < 0.0 || v < 0.0 || u >= iw || v >= ih {
                    continue;
                }
                let c = match sampling {
                    Sampling::Nearest => compositor::sample_nearest(img, fixed(u), fixed(v)),
                    Sampling::Bilinear => {
                        compositor::sample_bilinear(img, fixed((u - 0.5).max(0.0)), fixed((v - 0.5).max(0.0)))
                    },
                };
                let i = self.canvas.index(px as u32, py as u32);
                let dst = self.canvas.raw_opaque(i);
                self.canvas.pixels_raw_mut()[i] = mode.apply(dst, c) | opaque;
            }
        }
        self.canvas.mark_modified(area);
    }
}

/// Multiply two 8-bit channels, rounded, so 255 is the identity
#[inline]
fn scale_channel(c: u32, t: u32) -> u32 {
    (c * t + 127) / 255
}
