//! End-to-end checks through the public API: shape assembly into a
//! recording surface, pixel operations on the canvas, and style/transform
//! state handling.

use easel::image::compositor;
use easel::image::blend_color;
use easel::{
    Affine, BlendMode, ColorMode, EndMode, Error, Filter, ImageFormat, PathCommand, PixelBuffer, Point,
    PrimitiveKind, Rect, RecordingSurface, Renderer, RendererConfig, Sampling, ShapeKind, SurfaceEvent,
};

fn renderer(w: u32, h: u32) -> Renderer<RecordingSurface> {
    Renderer::with_size(w, h, RecordingSurface::new()).unwrap()
}

fn feed(r: &mut Renderer<RecordingSurface>, pts: &[(f32, f32)]) {
    for &(x, y) in pts {
        r.vertex(x, y).unwrap();
    }
}

// ============================================================================
// Shape assembly
// ============================================================================

#[test]
fn test_triangle_fan_emits_two_triangles() {
    let mut r = renderer(20, 20);
    r.begin_shape(ShapeKind::TriangleFan);
    feed(&mut r, &[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
    r.end_shape(EndMode::Open);

    let tris = r.surface().primitives(PrimitiveKind::Triangle);
    assert_eq!(tris.len(), 2);
    assert_eq!(
        tris[0].points(),
        &[Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0)]
    );
    assert_eq!(
        tris[1].points(),
        &[Point::new(0.0, 0.0), Point::new(10.0, 10.0), Point::new(0.0, 10.0)]
    );
}

#[test]
fn test_discrete_kinds_emission_counts() {
    let pts = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (2.0, 2.0), (3.0, 2.0)];
    let cases = [
        (ShapeKind::Points, PrimitiveKind::Point, 6),
        (ShapeKind::Lines, PrimitiveKind::Line, 3),
        (ShapeKind::LineStrip, PrimitiveKind::Line, 5),
        (ShapeKind::LineLoop, PrimitiveKind::Line, 6),
        (ShapeKind::Triangles, PrimitiveKind::Triangle, 2),
        (ShapeKind::TriangleStrip, PrimitiveKind::Triangle, 4),
        (ShapeKind::TriangleFan, PrimitiveKind::Triangle, 4),
        (ShapeKind::Quads, PrimitiveKind::Quad, 1),
        (ShapeKind::QuadStrip, PrimitiveKind::Quad, 2),
    ];
    for (kind, primitive, expected) in cases {
        let mut r = renderer(10, 10);
        r.begin_shape(kind);
        feed(&mut r, &pts);
        r.end_shape(EndMode::Open);
        assert_eq!(r.surface().primitives(primitive).len(), expected, "{:?}", kind);
    }
}

#[test]
fn test_quad_strip_vertex_order() {
    let mut r = renderer(10, 10);
    r.begin_shape(ShapeKind::QuadStrip);
    feed(&mut r, &[(0.0, 0.0), (0.0, 1.0), (1.0, 0.0), (1.0, 1.0)]);
    r.end_shape(EndMode::Open);
    let quads = r.surface().primitives(PrimitiveKind::Quad);
    assert_eq!(
        quads[0].points(),
        &[Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(1.0, 1.0), Point::new(0.0, 1.0)]
    );
}

#[test]
fn test_vertices_are_transformed_to_device_space() {
    let mut r = renderer(10, 10);
    r.translate(5.0, 5.0);
    r.scale(2.0, 2.0);
    r.begin_shape(ShapeKind::Points);
    r.vertex(1.0, 1.0).unwrap();
    r.end_shape(EndMode::Open);
    assert_eq!(r.surface().primitives(PrimitiveKind::Point)[0].points(), &[Point::new(7.0, 7.0)]);
}

#[test]
fn test_polygon_with_hole() {
    let mut r = renderer(20, 20);
    r.begin_shape(ShapeKind::POLYGON);
    feed(&mut r, &[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
    r.begin_contour().unwrap();
    feed(&mut r, &[(3.0, 3.0), (3.0, 6.0), (6.0, 6.0), (6.0, 3.0)]);
    r.end_contour();
    r.end_shape(EndMode::Close);

    let filled = r.surface().filled_paths();
    assert_eq!(filled.len(), 1);
    let cmds = filled[0].commands();
    assert_eq!(cmds.len(), 10);
    assert_eq!(cmds[0], PathCommand::MoveTo(Point::new(0.0, 0.0)));
    assert_eq!(cmds[4], PathCommand::Close);
    assert_eq!(cmds[5], PathCommand::MoveTo(Point::new(3.0, 3.0)));
    assert_eq!(cmds[9], PathCommand::Close);
}

#[test]
fn test_curve_passes_through_inner_points() {
    let mut r = renderer(100, 100);
    r.no_fill();
    r.curve(0.0, 0.0, 10.0, 20.0, 40.0, 30.0, 60.0, 0.0).unwrap();

    let stroked = r.surface().stroked_paths();
    assert_eq!(stroked.len(), 1);
    let cmds = stroked[0].commands();
    let PathCommand::MoveTo(start) = cmds[0] else {
        panic!("expected a move, got {:?}", cmds[0]);
    };
    let PathCommand::CubicTo { end, .. } = cmds[1] else {
        panic!("expected a cubic, got {:?}", cmds[1]);
    };
    assert!(start.approx_eq(&Point::new(10.0, 20.0), 1e-4));
    assert!(end.approx_eq(&Point::new(40.0, 30.0), 1e-4));
}

#[test]
fn test_curve_point_hits_endpoints() {
    let mut r = renderer(4, 4);
    assert!((r.curve_point(0.0, 10.0, 40.0, 60.0, 0.0) - 10.0).abs() < 1e-4);
    assert!((r.curve_point(0.0, 10.0, 40.0, 60.0, 1.0) - 40.0).abs() < 1e-4);
    assert_eq!(r.bezier_point(0.0, 5.0, 5.0, 10.0, 0.0), 0.0);
    assert_eq!(r.bezier_point(0.0, 5.0, 5.0, 10.0, 1.0), 10.0);
}

#[test]
fn test_shape_errors() {
    let mut r = renderer(10, 10);
    assert!(matches!(r.vertex(0.0, 0.0), Err(Error::NoShapeOpen("vertex"))));

    r.begin_shape(ShapeKind::Triangles);
    assert!(matches!(
        r.bezier_vertex(1.0, 1.0, 2.0, 2.0, 3.0, 3.0),
        Err(Error::IncompatibleShape(_))
    ));
    assert_eq!(r.shape_kind(), None);

    r.begin_shape(ShapeKind::POLYGON);
    assert!(matches!(
        r.quadratic_vertex(1.0, 1.0, 2.0, 2.0),
        Err(Error::VertexRequired(_))
    ));
    assert_eq!(r.shape_kind(), None);
}

// ============================================================================
// Pixels
// ============================================================================

#[test]
fn test_threshold_and_invert_on_white() {
    let mut r = renderer(2, 2);
    r.background(255.0);
    r.filter(Filter::Threshold(0.5)).unwrap();
    assert!(r.canvas().pixels().iter().all(|&p| p == 0xffffffff));
    r.filter(Filter::Invert).unwrap();
    assert!(r.canvas().pixels().iter().all(|&p| p == 0xff000000));
}

#[test]
fn test_add_then_subtract_restores_color() {
    let dst = 0xff406080;
    let src = 0xff102030;
    let added = blend_color(dst, src, BlendMode::Add);
    assert_eq!(added, 0xff5080b0);
    assert_eq!(blend_color(added, src, BlendMode::Subtract), dst);
}

#[test]
fn test_opaque_blend_matches_replace() {
    for (dst, src) in [(0xff000000, 0xff123456), (0x00ffffff, 0xffabcdef), (0xff808080, 0xff010203)] {
        assert_eq!(
            blend_color(dst, src, BlendMode::Blend),
            blend_color(dst, src, BlendMode::Replace)
        );
    }
}

#[test]
fn test_unscaled_bilinear_matches_nearest() {
    let pixels: Vec<u32> = (0..9).map(|i| 0xff000000 | (i * 0x1d0b07)).collect();
    let src = PixelBuffer::from_pixels(3, 3, ImageFormat::Argb, pixels).unwrap();
    let area = Rect::new(0, 0, 3, 3);

    let mut nearest = PixelBuffer::new(3, 3, ImageFormat::Argb).unwrap();
    let mut bilinear = PixelBuffer::new(3, 3, ImageFormat::Argb).unwrap();
    compositor::blit(&src, area, &mut nearest, area, BlendMode::Replace, Sampling::Nearest);
    compositor::blit(&src, area, &mut bilinear, area, BlendMode::Replace, Sampling::Bilinear);

    assert_eq!(nearest.pixels(), src.pixels());
    assert_eq!(bilinear.pixels(), src.pixels());
}

#[test]
fn test_image_draw_and_flush() {
    let mut r = renderer(4, 4);
    r.flush();
    r.surface_mut().clear();

    let img = PixelBuffer::from_pixels(2, 2, ImageFormat::Rgb, vec![0xff0000ff; 4]).unwrap();
    r.image(&img, 1.0, 1.0);
    r.flush();

    let events = r.surface().events();
    assert_eq!(events.len(), 1);
    match &events[0] {
        SurfaceEvent::Blit { region, pixels } => {
            assert_eq!(*region, Rect::new(1, 1, 2, 2));
            assert_eq!(pixels, &vec![0xff0000ff; 4]);
        },
        other => panic!("expected a blit, got {:?}", other),
    }
}

#[test]
fn test_copy_within_canvas() {
    let mut r = renderer(4, 2);
    r.set(0, 0, 0xffff0000);
    r.set(1, 0, 0xff00ff00);
    r.copy(Rect::new(0, 0, 2, 1), Rect::new(2, 1, 2, 1));
    assert_eq!(r.get(2, 1), 0xffff0000);
    assert_eq!(r.get(3, 1), 0xff00ff00);
}

// ============================================================================
// State
// ============================================================================

#[test]
fn test_push_pop_restores_matrix_bits() {
    let mut r = renderer(4, 4);
    r.translate(1.5, -2.25);
    r.rotate(0.3);
    let before = r.get_matrix();

    r.push_matrix().unwrap();
    r.rotate(1.1);
    r.scale(3.0, 0.5);
    r.shear_x(0.2);
    r.pop_matrix().unwrap();

    let after = r.get_matrix();
    for (a, b) in before.as_array().iter().zip(after.as_array().iter()) {
        assert_eq!(a.to_bits(), b.to_bits());
    }
}

#[test]
fn test_matrix_stack_limits() {
    let config = RendererConfig {
        matrix_stack_depth: 2,
        ..RendererConfig::new(4, 4)
    };
    let mut r = Renderer::new(config, RecordingSurface::new()).unwrap();
    r.push_matrix().unwrap();
    r.push_matrix().unwrap();
    assert!(matches!(r.push_matrix(), Err(Error::MatrixStackOverflow(2))));
    r.pop_matrix().unwrap();
    r.pop_matrix().unwrap();
    assert!(matches!(r.pop_matrix(), Err(Error::MatrixStackUnderflow)));
}

#[test]
fn test_set_matrix_and_screen_coordinates() {
    let mut r = renderer(4, 4);
    r.set_matrix(Affine::new(2.0, 0.0, 1.0, 0.0, 3.0, -1.0));
    assert_eq!(r.screen_x(1.0, 1.0), 3.0);
    assert_eq!(r.screen_y(1.0, 1.0), 2.0);
    r.reset_matrix();
    assert_eq!(r.screen_x(1.0, 1.0), 1.0);
}

#[test]
fn test_hsb_red() {
    let mut r = renderer(2, 2);
    r.color_mode_ranges(ColorMode::Hsb, 360.0, 100.0, 100.0, 1.0);
    assert_eq!(r.color((0.0, 100.0, 100.0)), 0xffff0000);
    r.fill((0.0, 100.0, 100.0));
    assert_eq!(r.style().fill.color.argb, 0xffff0000);
}

#[test]
fn test_gray_integer_ambiguity() {
    let r = renderer(2, 2);
    // High byte clear and within range: read as gray
    assert_eq!(r.color(200u32), 0xffc8c8c8);
    assert_eq!(r.color(0x000000ffu32), 0xffffffff);
    // Anything else is packed ARGB
    assert_eq!(r.color(0x80102030u32), 0x80102030);
}

#[test]
fn test_unsupported_subtract_keeps_previous_mode() {
    let mut r = Renderer::with_size(2, 2, RecordingSurface::rejecting(&[BlendMode::Subtract])).unwrap();
    r.blend_mode(BlendMode::Lightest);
    r.blend_mode(BlendMode::Subtract);
    assert_eq!(r.style().blend_mode, BlendMode::Lightest);

    r.begin_shape(ShapeKind::Points);
    r.vertex(0.0, 0.0).unwrap();
    r.end_shape(EndMode::Open);
    let SurfaceEvent::Primitive { paint, .. } = r.surface().events().last().unwrap() else {
        panic!("expected a primitive");
    };
    assert_eq!(paint.blend_mode, BlendMode::Lightest);
}

#[test]
fn test_config_from_json_drives_renderer() {
    let config = RendererConfig::from_json(r#"{ "width": 8, "height": 6, "format": "Argb" }"#).unwrap();
    let r = Renderer::new(config, RecordingSurface::new()).unwrap();
    assert_eq!((r.width(), r.height()), (8, 6));
    assert_eq!(r.canvas().format(), ImageFormat::Argb);
}
