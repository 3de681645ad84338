//! Output rendering
//!
//! Render modes for the finished result matrix.

mod formatter;

pub use formatter::{MatrixFormatter, OutputFormat};
