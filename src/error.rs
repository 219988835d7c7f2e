//! Error types for pixelcore operations.
//!
//! Draw calls never fail; errors only surface from allocation, pixel
//! interchange and the codec boundary.

use std::io;
use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in pixelcore operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error (file operations, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// PNG encoding error.
    #[error("PNG encoding error: {0}")]
    PngEncoding(#[from] png::EncodingError),

    /// PNG decoding error.
    #[error("PNG decoding error: {0}")]
    PngDecoding(#[from] png::DecodingError),

    /// Invalid dimensions for an image or pixel transfer.
    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Width value.
        width: u32,
        /// Height value.
        height: u32,
    },

    /// Pixel data length does not match the declared dimensions.
    #[error("Data length mismatch: expected {expected} bytes, got {actual}")]
    DataLengthMismatch {
        /// Number of bytes required by the dimensions.
        expected: usize,
        /// Number of bytes supplied.
        actual: usize,
    },

    /// The allocator refused a pixel buffer allocation.
    #[error("Allocation of {bytes} bytes failed")]
    AllocationFailed {
        /// Requested size in bytes.
        bytes: usize,
    },

    /// The codec produced a pixel layout that cannot be converted to RGBA8.
    #[error("Unsupported pixel format: {0}")]
    UnsupportedFormat(String),

    /// Color parsing error.
    #[error("Invalid color: {0}")]
    InvalidColor(String),
}
