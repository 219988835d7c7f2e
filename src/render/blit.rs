//! Image, sprite and text blits.

use super::{triangle::draw_quad_textured, CullMode, FillMode, PixelRect, RenderState, Vertex};
use crate::blend::BlendMode;
use crate::color::Color;
use crate::geometry::{Rect, Transform2D, Vec2};
use crate::image::{AddressMode, Image};

/// Copy `src` pixels of `image` to `target` with their top-left corner at
/// `(dst_x, dst_y)`, restricted to `clip`.
#[allow(clippy::too_many_arguments)]
fn blit(
    target: &mut Image,
    clip: PixelRect,
    image: &Image,
    src: PixelRect,
    dst_x: i32,
    dst_y: i32,
    tint: Color,
    mode: &BlendMode,
) {
    let placed = PixelRect::new(
        dst_x,
        dst_y,
        dst_x.saturating_add(src.x1 - src.x0),
        dst_y.saturating_add(src.y1 - src.y0),
    );
    let Some(dst) = placed.and_then(|p| p.intersect(clip)) else {
        return;
    };

    for y in dst.y0..=dst.y1 {
        let sy = (src.y0 + (y - dst_y)) as u32;
        let row = image.index(0, sy);
        for x in dst.x0..=dst.x1 {
            let sx = (src.x0 + (x - dst_x)) as usize;
            let texel = image.pixels()[row + sx];
            target.plot_unchecked(x, y, texel * tint, mode);
        }
    }
}

/// Source rectangle of `image` in whole pixels, clamped to the image.
fn source_rect(image: &Image, region: Rect) -> Option<PixelRect> {
    if !region.is_finite() {
        return None;
    }
    let full = PixelRect::new(0, 0, image.width() as i32 - 1, image.height() as i32 - 1)?;
    PixelRect::new(
        region.x.floor() as i32,
        region.y.floor() as i32,
        ((region.x + region.width).ceil() as i32).saturating_sub(1),
        ((region.y + region.height).ceil() as i32).saturating_sub(1),
    )?
    .intersect(full)
}

/// Inclusive pixel span `[round(start), round(start + len) - 1]` clamped to
/// `i32`, with the unclamped first pixel as `i64`.
fn pixel_span(start: f32, len: f32) -> (i64, i32, i32) {
    let first = start.round() as i64;
    let last = ((start + len).round() as i64).saturating_sub(1);
    let narrow = |v: i64| v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
    (first, narrow(first), narrow(last))
}

/// Draw `image` unscaled with its top-left corner at `position`.
///
/// Each texel is multiplied by the state color and blended with the state's
/// blend mode.
pub fn draw_image(target: &mut Image, state: &RenderState, image: &Image, position: Vec2) {
    if !position.x.is_finite() || !position.y.is_finite() {
        return;
    }
    let Some(clip) = state.clip_rect(target) else {
        return;
    };
    let full = Rect::new(0.0, 0.0, image.width() as f32, image.height() as f32);
    let Some(src) = source_rect(image, full) else {
        return;
    };
    blit(
        target,
        clip,
        image,
        src,
        position.x.round() as i32,
        position.y.round() as i32,
        state.color,
        &state.blend_mode,
    );
}

/// Draw the `src` region of `image` stretched over `dst`, nearest-neighbour.
///
/// Destination pixel `d` maps to source `src.origin + (d - dst.origin) * scale`,
/// clamped to the source region.
pub fn draw_image_scaled(
    target: &mut Image,
    state: &RenderState,
    image: &Image,
    src: Rect,
    dst: Rect,
) {
    if !(src.is_finite() && dst.is_finite()) {
        return;
    }
    if !(dst.width > 0.0 && dst.height > 0.0 && src.width > 0.0 && src.height > 0.0) {
        return;
    }
    let Some(clip) = state.clip_rect(target) else {
        return;
    };
    let Some(src_px) = source_rect(image, src) else {
        return;
    };

    let (dx0, left, right) = pixel_span(dst.x, dst.width);
    let (dy0, top, bottom) = pixel_span(dst.y, dst.height);
    let Some(region) = PixelRect::new(left, top, right, bottom).and_then(|r| r.intersect(clip))
    else {
        return;
    };

    let scale_x = src.width / dst.width;
    let scale_y = src.height / dst.height;
    let tint = state.color;

    for y in region.y0..=region.y1 {
        let sy = (src.y + (i64::from(y) - dy0) as f32 * scale_y) as i32;
        let sy = sy.clamp(src_px.y0, src_px.y1);
        for x in region.x0..=region.x1 {
            let sx = (src.x + (i64::from(x) - dx0) as f32 * scale_x) as i32;
            let sx = sx.clamp(src_px.x0, src_px.x1);
            let texel = image.sample(sx, sy, AddressMode::Clamp);
            target.plot_unchecked(x, y, texel * tint, &state.blend_mode);
        }
    }
}

/// A region of an image drawn with its own tint, blending and transform.
#[derive(Debug, Clone, Copy)]
pub struct Sprite<'a> {
    /// Source image.
    pub image: &'a Image,
    /// Source region in pixels.
    pub region: Rect,
    /// Color multiplied into every texel.
    pub tint: Color,
    /// Blend mode; `None` uses the state's.
    pub blend_mode: Option<BlendMode>,
    /// Applied to the region (origin at its top-left) before positioning.
    pub transform: Transform2D,
}

impl<'a> Sprite<'a> {
    /// Sprite covering the whole image.
    #[must_use]
    pub fn new(image: &'a Image) -> Self {
        Self {
            image,
            region: Rect::new(0.0, 0.0, image.width() as f32, image.height() as f32),
            tint: Color::WHITE,
            blend_mode: None,
            transform: Transform2D::IDENTITY,
        }
    }

    /// Use a sub-region of the image.
    #[must_use]
    pub const fn with_region(mut self, region: Rect) -> Self {
        self.region = region;
        self
    }

    /// Set the tint.
    #[must_use]
    pub const fn with_tint(mut self, tint: Color) -> Self {
        self.tint = tint;
        self
    }

    /// Override the state's blend mode.
    #[must_use]
    pub const fn with_blend_mode(mut self, mode: BlendMode) -> Self {
        self.blend_mode = Some(mode);
        self
    }

    /// Set the transform.
    #[must_use]
    pub const fn with_transform(mut self, transform: Transform2D) -> Self {
        self.transform = transform;
        self
    }
}

/// Draw a sprite with its region's origin at `position`.
///
/// Translation-only transforms take a direct copy path; anything else is
/// drawn as a textured quad (never culled). Texels are multiplied by the
/// sprite tint and the state color.
pub fn draw_sprite(target: &mut Image, state: &RenderState, sprite: &Sprite<'_>, position: Vec2) {
    let mode = sprite.blend_mode.unwrap_or(state.blend_mode);
    let tint = sprite.tint * state.color;
    let t = &sprite.transform;

    if t.is_translation_only() {
        let origin = position + Vec2::new(t.tx, t.ty);
        if !origin.x.is_finite() || !origin.y.is_finite() {
            return;
        }
        let Some(clip) = state.clip_rect(target) else {
            return;
        };
        let Some(src) = source_rect(sprite.image, sprite.region) else {
            return;
        };
        blit(
            target,
            clip,
            sprite.image,
            src,
            origin.x.round() as i32,
            origin.y.round() as i32,
            tint,
            &mode,
        );
        return;
    }

    let Some(src) = source_rect(sprite.image, sprite.region) else {
        return;
    };
    let (w, h) = (sprite.region.width, sprite.region.height);
    let u_scale = 1.0 / (sprite.image.width().max(2) - 1) as f32;
    let v_scale = 1.0 / (sprite.image.height().max(2) - 1) as f32;
    let (u0, u1) = (src.x0 as f32 * u_scale, src.x1 as f32 * u_scale);
    let (v0, v1) = (src.y0 as f32 * v_scale, src.y1 as f32 * v_scale);

    let corner = |x: f32, y: f32, u: f32, v: f32| {
        Vertex::new(t.apply(Vec2::new(x, y)) + position, Vec2::new(u, v), tint)
    };
    let quad = [
        corner(0.0, 0.0, u0, v0),
        corner(w, 0.0, u1, v0),
        corner(w, h, u1, v1),
        corner(0.0, h, u0, v1),
    ];

    let quad_state = RenderState {
        color: Color::WHITE,
        fill_mode: FillMode::Solid,
        cull_mode: CullMode::None,
        blend_mode: mode,
        texture_address: AddressMode::Clamp,
        ..*state
    };
    draw_quad_textured(target, &quad_state, &quad, sprite.image);
}

/// Text rasterization collaborator. Shaping and layout happen behind it.
pub trait TextRenderer {
    /// Render `text` in `color` to an RGBA image.
    fn render_text(&mut self, text: &str, color: Color) -> Image;
}

/// Render `text` in the state color and blit it at `position`.
pub fn draw_text<T: TextRenderer + ?Sized>(
    target: &mut Image,
    state: &RenderState,
    renderer: &mut T,
    text: &str,
    position: Vec2,
) {
    if text.is_empty() {
        return;
    }
    let glyphs = renderer.render_text(text, state.color);
    if glyphs.is_empty() {
        return;
    }
    draw_image(target, &state.with_color(Color::WHITE), &glyphs, position);
}
