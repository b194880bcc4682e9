//! easel: an immediate-mode 2D drawing core
//!
//! A [`Renderer`] keeps the drawing state (style, transform stack, curve
//! settings, an in-progress shape) and an owned pixel canvas. Geometry is
//! assembled into device-space paths and primitives and handed to a
//! [`Surface`], which does the actual rasterization. Pixel work (filters,
//! image compositing, background fills) happens in the canvas itself and
//! reaches the surface through [`Renderer::flush`].
//!
//! ```
//! use easel::{EndMode, Renderer, RecordingSurface, ShapeKind};
//!
//! let mut r = Renderer::with_size(64, 64, RecordingSurface::new())?;
//! r.fill((255.0, 0.0, 0.0));
//! r.begin_shape(ShapeKind::TriangleFan);
//! r.vertex(10.0, 10.0)?;
//! r.vertex(50.0, 10.0)?;
//! r.vertex(50.0, 50.0)?;
//! r.vertex(10.0, 50.0)?;
//! r.end_shape(EndMode::Open);
//! # Ok::<(), easel::Error>(())
//! ```

pub mod color;
pub mod config;
pub mod curve;
pub mod error;
pub mod geometry;
pub mod image;
pub mod logging;
pub mod path;
pub mod primitives;
pub mod renderer;
pub mod shape;
pub mod style;
pub mod surface;
pub mod transform;
pub mod vertex;

pub use color::{lerp_color, ColorArg, ColorMode, ColorSpace, ResolvedColor};
pub use config::RendererConfig;
pub use curve::CurveEvaluator;
pub use error::{Error, Result};
pub use geometry::{Point, Rect};
pub use image::{BlendMode, Filter, ImageFormat, NamedBlendMode, PixelBuffer, Sampling};
pub use logging::{init_logging, LoggingConfig};
pub use path::{Path, PathCommand};
pub use primitives::ArcMode;
pub use renderer::Renderer;
pub use shape::{EndMode, ShapeKind, ShapeOutput};
pub use style::{ImageMode, Paint, ShapeMode, StrokeCap, StrokeJoin, Style};
pub use surface::{NullSurface, Primitive, PrimitiveKind, RecordingSurface, Surface, SurfaceEvent};
pub use transform::{Affine, MatrixStack};
