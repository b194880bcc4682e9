//! Error types
//!
//! Everything in here is a programmer error: the call that produced it is
//! aborted and the renderer is left in a well-defined state. Recoverable
//! usage problems are logged with `log::warn!` instead and never surface here.

use thiserror::Error;

/// Fatal rendering errors
#[derive(Error, Debug)]
pub enum Error {
    /// `push_matrix()` past the configured stack depth
    #[error("too many calls to push_matrix() (stack depth {0})")]
    MatrixStackOverflow(usize),

    /// `pop_matrix()` with nothing pushed
    #[error("too many calls to pop_matrix(), and not enough to push_matrix()")]
    MatrixStackUnderflow,

    /// `push_style()` past the configured stack depth
    #[error("too many calls to push_style() (stack depth {0})")]
    StyleStackOverflow(usize),

    /// `pop_style()` with nothing pushed
    #[error("too many calls to pop_style(), and not enough to push_style()")]
    StyleStackUnderflow,

    /// A vertex call arrived outside `begin_shape()`/`end_shape()`
    #[error("{0}() must be called between begin_shape() and end_shape()")]
    NoShapeOpen(&'static str),

    /// A vertex call that needs a POLYGON shape arrived in a different kind
    #[error("{0}() requires begin_shape() or begin_shape(POLYGON)")]
    IncompatibleShape(&'static str),

    /// `bezier_vertex()`/`quadratic_vertex()` before any plain `vertex()`
    #[error("vertex() must be used at least once before {0}()")]
    VertexRequired(&'static str),

    /// A 3D variant of a 2D-only call
    #[error("{0}() with z coordinates is not supported by a 2D renderer")]
    DepthUnsupported(&'static str),

    /// `background(image)` with an image that does not match the canvas
    #[error("background image must be {expected_w}x{expected_h}, got {actual_w}x{actual_h}")]
    BackgroundSizeMismatch {
        expected_w: u32,
        expected_h: u32,
        actual_w: u32,
        actual_h: u32,
    },

    /// `mask()` with a mask of a different pixel count
    #[error("mask must contain {expected} pixels, got {actual}")]
    MaskSizeMismatch { expected: usize, actual: usize },

    /// Filter parameter outside the accepted range
    #[error("invalid parameter for filter {filter}: {reason}")]
    InvalidFilterParameter {
        filter: &'static str,
        reason: String,
    },

    /// Zero or otherwise unusable buffer dimensions
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// Externally supplied pixel data of the wrong length
    #[error("pixel data has {actual} entries, expected {expected}")]
    PixelCountMismatch { expected: usize, actual: usize },

    /// Renderer configuration could not be loaded, saved, or validated
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Config(e.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Config(e.to_string())
    }
}

/// Result type for renderer operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_call() {
        let e = Error::VertexRequired("bezier_vertex");
        assert_eq!(
            e.to_string(),
            "vertex() must be used at least once before bezier_vertex()"
        );
        let e = Error::IncompatibleShape("curve_vertex");
        assert!(e.to_string().contains("curve_vertex()"));
    }

    #[test]
    fn test_json_errors_become_config_errors() {
        let parse: std::result::Result<u32, _> = serde_json::from_str("{not json");
        let e: Error = parse.unwrap_err().into();
        assert!(matches!(e, Error::Config(_)));
    }
}
