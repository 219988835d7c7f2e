//! Rasterization.
//!
//! Every entry point takes the target [`Image`] and a [`RenderState`]
//! explicitly. The clip region of a call is the target's bounding box
//! intersected with the state's viewport. Primitives that are degenerate,
//! culled or clipped away entirely perform no writes.
//!
//! # Algorithms
//!
//! - **Bresenham's Line**: integer stepping along the major axis
//! - **Midpoint Circle**: outlined and filled circles
//! - **Edge functions**: triangle fill with the top-left rule and
//!   barycentric attribute interpolation
//!
//! # References
//!
//! - Bresenham, J. E. (1965). "Algorithm for computer control of a digital plotter."
//! - Pineda, J. (1988). "A Parallel Algorithm for Polygon Rasterization." SIGGRAPH '88.

mod blit;
mod primitives;
mod triangle;

pub use blit::{draw_image, draw_image_scaled, draw_sprite, draw_text, Sprite, TextRenderer};
pub use primitives::{draw_circle, draw_line};
pub use triangle::{
    draw_quad, draw_quad_textured, draw_triangle, draw_triangle_shaded, draw_triangle_textured,
};

use crate::blend::BlendMode;
use crate::color::Color;
use crate::geometry::{Aabb, Vec2, Viewport};
use crate::image::{AddressMode, Image};

/// How triangles and quads are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FillMode {
    /// Fill the interior.
    #[default]
    Solid,
    /// Draw the edges only.
    Wireframe,
}

/// Which facing of triangles is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CullMode {
    /// Draw both facings.
    #[default]
    None,
    /// Reject front-facing triangles.
    Front,
    /// Reject back-facing triangles.
    Back,
}

/// Draw parameters read at the start of every call.
///
/// # Example
///
/// ```
/// use pixelcore::prelude::*;
///
/// let state = RenderState::default()
///     .with_color(Color::RED)
///     .with_blend_mode(BlendMode::ALPHA_BLEND);
/// let mut img = Image::new(8, 8);
/// draw_line(&mut img, &state, Vec2::new(0.0, 0.0), Vec2::new(7.0, 7.0));
/// assert_eq!(img.get_pixel(3, 3), Some(Color::RED));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderState {
    /// Draw color, multiplied into every written pixel.
    pub color: Color,
    /// Solid or wireframe triangles.
    pub fill_mode: FillMode,
    /// Facing rejected by triangle draws.
    pub cull_mode: CullMode,
    /// Counter-clockwise (positive signed area) triangles face front.
    pub front_counter_clockwise: bool,
    /// Blending applied to every write.
    pub blend_mode: BlendMode,
    /// Optional clip rectangle, intersected with the target bounds.
    pub viewport: Option<Viewport>,
    /// Address mode for texture lookups.
    pub texture_address: AddressMode,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            fill_mode: FillMode::Solid,
            cull_mode: CullMode::None,
            front_counter_clockwise: true,
            blend_mode: BlendMode::DISABLE,
            viewport: None,
            texture_address: AddressMode::Clamp,
        }
    }
}

impl RenderState {
    /// Set the draw color.
    #[must_use]
    pub const fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Set the fill mode.
    #[must_use]
    pub const fn with_fill_mode(mut self, fill_mode: FillMode) -> Self {
        self.fill_mode = fill_mode;
        self
    }

    /// Set the cull mode.
    #[must_use]
    pub const fn with_cull_mode(mut self, cull_mode: CullMode) -> Self {
        self.cull_mode = cull_mode;
        self
    }

    /// Set the front-facing winding.
    #[must_use]
    pub const fn with_front_counter_clockwise(mut self, ccw: bool) -> Self {
        self.front_counter_clockwise = ccw;
        self
    }

    /// Set the blend mode.
    #[must_use]
    pub const fn with_blend_mode(mut self, blend_mode: BlendMode) -> Self {
        self.blend_mode = blend_mode;
        self
    }

    /// Restrict drawing to a viewport.
    #[must_use]
    pub const fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = Some(viewport);
        self
    }

    /// Set the texture address mode.
    #[must_use]
    pub const fn with_texture_address(mut self, mode: AddressMode) -> Self {
        self.texture_address = mode;
        self
    }

    /// Clip box for a draw into `target`, or `None` when nothing is drawable.
    #[must_use]
    pub fn clip_region(&self, target: &Image) -> Option<Aabb> {
        let mut region = *target.aabb();
        if let Some(vp) = &self.viewport {
            region = region.clamp(&Aabb::from_viewport(vp));
        }
        region.is_valid_2d().then_some(region)
    }

    /// True when a triangle of the given winding is rejected.
    #[must_use]
    pub fn culls(&self, counter_clockwise: bool) -> bool {
        let front = counter_clockwise == self.front_counter_clockwise;
        match self.cull_mode {
            CullMode::None => false,
            CullMode::Front => front,
            CullMode::Back => !front,
        }
    }

    fn clip_rect(&self, target: &Image) -> Option<PixelRect> {
        self.clip_region(target).and_then(|r| PixelRect::from_aabb(&r))
    }
}

/// Triangle or quad corner with texture coordinates and color.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vertex {
    /// Position in target pixels.
    pub position: Vec2,
    /// Normalized texture coordinate.
    pub uv: Vec2,
    /// Vertex color.
    pub color: Color,
}

impl Vertex {
    /// Create a vertex.
    #[must_use]
    pub const fn new(position: Vec2, uv: Vec2, color: Color) -> Self {
        Self {
            position,
            uv,
            color,
        }
    }

    /// White, untextured vertex at `position`.
    #[must_use]
    pub const fn at(position: Vec2) -> Self {
        Self::new(position, Vec2::ZERO, Color::WHITE)
    }
}

/// Inclusive integer pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PixelRect {
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
}

impl PixelRect {
    fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Option<Self> {
        (x0 <= x1 && y0 <= y1).then_some(Self { x0, y0, x1, y1 })
    }

    fn from_aabb(aabb: &Aabb) -> Option<Self> {
        if !aabb.is_valid_2d() {
            return None;
        }
        Self::new(
            aabb.min.x.ceil() as i32,
            aabb.min.y.ceil() as i32,
            aabb.max.x.floor() as i32,
            aabb.max.y.floor() as i32,
        )
    }

    fn intersect(self, other: Self) -> Option<Self> {
        Self::new(
            self.x0.max(other.x0),
            self.y0.max(other.y0),
            self.x1.min(other.x1),
            self.y1.min(other.y1),
        )
    }

    fn contains(self, x: i32, y: i32) -> bool {
        x >= self.x0 && x <= self.x1 && y >= self.y0 && y <= self.y1
    }
}
