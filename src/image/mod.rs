//! Pixel buffers and everything that reads or writes them wholesale

pub mod blend;
pub mod buffer;
pub mod compositor;
pub mod filter;

pub use blend::{blend_color, BlendMode, NamedBlendMode};
pub use buffer::{ImageFormat, PixelBuffer};
pub use compositor::Sampling;
pub use filter::Filter;
