//! # pixelcore
//!
//! CPU 2D rasterization engine with SIMD-accelerated color arithmetic.
//!
//! Draws lines, circles, triangles, textured quads, images and sprites into
//! an owned RGBA [`Image`](image::Image), with clipping, culling and
//! configurable blending. Presentation, text shaping and file formats are
//! collaborators behind small traits.
//!
//! ## Features
//!
//! - **Pure Rust**: PNG decode/encode through the `png` crate
//! - **Bit-exact SIMD**: SSE2/NEON color kernels agree with the scalar path
//! - **Explicit state**: every draw call takes its target and a
//!   [`RenderState`](render::RenderState) by reference
//!
//! ## Quick Start
//!
//! ```rust
//! use pixelcore::prelude::*;
//!
//! let mut img = Image::filled(64, 64, Color::BLACK);
//! let state = RenderState::default().with_color(Color::from_html("tomato"));
//!
//! draw_triangle(
//!     &mut img,
//!     &state,
//!     Vec2::new(4.0, 4.0),
//!     Vec2::new(60.0, 4.0),
//!     Vec2::new(4.0, 60.0),
//! );
//! assert_eq!(img.get_pixel(10, 10), Some(Color::rgb(255, 99, 71)));
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: `Serialize`/`Deserialize` for value types
//!
//! ## Academic References
//!
//! - Bresenham, J. E. (1965). "Algorithm for computer control of a digital plotter."
//! - Pineda, J. (1988). "A Parallel Algorithm for Polygon Rasterization." SIGGRAPH '88.
//! - Ericson, C. (2005). *Real-Time Collision Detection*. Morgan Kaufmann.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
// Allow unwrap() in tests only - banned in production code
#![cfg_attr(test, allow(clippy::unwrap_used))]
// Allow common patterns in graphics code
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Core Modules
// ============================================================================

/// 64-byte aligned heap storage.
pub mod buffer;

/// Color type, HTML parsing and color-space conversions.
pub mod color;

/// Source/destination blending.
pub mod blend;

/// Vectors, rectangles, transforms and bounding boxes.
pub mod geometry;

/// Owned RGBA images.
pub mod image;

// ============================================================================
// Rendering Modules
// ============================================================================

/// Rasterization of lines, circles, triangles, quads and blits.
pub mod render;

/// Image file codecs.
pub mod codec;

/// Scalar and SIMD color kernels.
pub mod accel;

// ============================================================================
// Error Types
// ============================================================================

/// Error types for pixelcore operations.
pub mod error;

pub use error::{Error, Result};

// ============================================================================
// Prelude
// ============================================================================

/// Commonly used types and functions for convenient imports.
///
/// ```rust
/// use pixelcore::prelude::*;
/// ```
pub mod prelude {
    pub use crate::blend::{BlendFactor, BlendMode, BlendOp};
    pub use crate::codec::{ImageCodec, PngCodec};
    pub use crate::color::{Color, Hsla};
    pub use crate::error::{Error, Result};
    pub use crate::geometry::{Aabb, Rect, Transform2D, Vec2, Vec3, Viewport};
    pub use crate::image::{AddressMode, Image, Surface};
    pub use crate::render::{
        draw_circle, draw_image, draw_image_scaled, draw_line, draw_quad, draw_quad_textured,
        draw_sprite, draw_text, draw_triangle, draw_triangle_shaded, draw_triangle_textured,
        CullMode, FillMode, RenderState, Sprite, TextRenderer, Vertex,
    };
}

// ============================================================================
// Re-exports
// ============================================================================

/// Re-export trueno for direct access to SIMD operations.
pub use trueno;

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_prelude_draws() {
        let mut img = Image::new(4, 4);
        draw_line(&mut img, &RenderState::default(), Vec2::new(0.0, 0.0), Vec2::new(3.0, 3.0));
        assert_eq!(img.get_pixel(2, 2), Some(Color::WHITE));
    }
}
