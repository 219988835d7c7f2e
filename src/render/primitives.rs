//! Line and circle rasterization.

use super::{FillMode, PixelRect, RenderState};
use crate::blend::BlendMode;
use crate::color::Color;
use crate::geometry::Vec2;
use crate::image::Image;

// ============================================================================
// Line Drawing
// ============================================================================

/// Draw a line using Bresenham's algorithm.
///
/// The segment is clipped to the target and viewport first; endpoints are
/// rounded to the nearest pixel. Both endpoints are plotted.
///
/// # Arguments
///
/// * `target` - Image to draw into
/// * `state` - Color, blend mode and viewport
/// * `p0`, `p1` - Endpoints in pixels
pub fn draw_line(target: &mut Image, state: &RenderState, p0: Vec2, p1: Vec2) {
    let Some(clip) = state.clip_region(target) else {
        return;
    };
    if !(p0.x.is_finite() && p0.y.is_finite() && p1.x.is_finite() && p1.y.is_finite()) {
        return;
    }

    let (mut a, mut b) = (p0, p1);
    if !clip.clip(&mut a, &mut b) {
        return;
    }

    let (x0, y0) = (a.x.round() as i32, a.y.round() as i32);
    let (x1, y1) = (b.x.round() as i32, b.y.round() as i32);
    let (color, mode) = (state.color, &state.blend_mode);

    if (y1 - y0).abs() <= (x1 - x0).abs() {
        if x0 > x1 {
            line_low(target, x1, y1, x0, y0, color, mode);
        } else {
            line_low(target, x0, y0, x1, y1, color, mode);
        }
    } else if y0 > y1 {
        line_high(target, x1, y1, x0, y0, color, mode);
    } else {
        line_high(target, x0, y0, x1, y1, color, mode);
    }
}

/// Shallow slope, `x0 <= x1`.
fn line_low(
    target: &mut Image,
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    color: Color,
    mode: &BlendMode,
) {
    let dx = x1 - x0;
    let (dy, yi) = if y1 < y0 { (y0 - y1, -1) } else { (y1 - y0, 1) };
    let mut d = 2 * dy - dx;
    let mut y = y0;

    for x in x0..=x1 {
        target.plot_unchecked(x, y, color, mode);
        if d > 0 {
            y += yi;
            d += 2 * (dy - dx);
        } else {
            d += 2 * dy;
        }
    }
}

/// Steep slope, `y0 <= y1`.
fn line_high(
    target: &mut Image,
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    color: Color,
    mode: &BlendMode,
) {
    let dy = y1 - y0;
    let (dx, xi) = if x1 < x0 { (x0 - x1, -1) } else { (x1 - x0, 1) };
    let mut d = 2 * dx - dy;
    let mut x = x0;

    for y in y0..=y1 {
        target.plot_unchecked(x, y, color, mode);
        if d > 0 {
            x += xi;
            d += 2 * (dx - dy);
        } else {
            d += 2 * dx;
        }
    }
}

// ============================================================================
// Circle Drawing
// ============================================================================

/// Draw a circle using the midpoint algorithm.
///
/// The center is rounded to the nearest pixel. In [`FillMode::Wireframe`]
/// each distinct symmetric point of the outline is plotted once; in
/// [`FillMode::Solid`] four horizontal spans are drawn per step. A negative
/// radius draws nothing; radius zero plots the center.
///
/// Stepping stops once every remaining point lies outside the clip region.
pub fn draw_circle(target: &mut Image, state: &RenderState, center: Vec2, radius: i32) {
    if radius < 0 || !center.x.is_finite() || !center.y.is_finite() {
        return;
    }
    let Some(clip) = state.clip_rect(target) else {
        return;
    };
    let (cx, cy) = (center.x.round() as i32, center.y.round() as i32);
    let bounds = PixelRect::new(
        cx.saturating_sub(radius),
        cy.saturating_sub(radius),
        cx.saturating_add(radius),
        cy.saturating_add(radius),
    );
    if bounds.and_then(|b| b.intersect(clip)).is_none() {
        return;
    }

    let (cx, cy) = (i64::from(cx), i64::from(cy));
    let (near_x, far_x) = axis_distance(clip.x0, clip.x1, cx);
    let (near_y, far_y) = axis_distance(clip.y0, clip.y1, cy);
    // Each step touches offsets x and y from the center on some axis, with
    // x rising and y falling. Outside [near, far] nothing is drawn again.
    let (near, far) = match state.fill_mode {
        FillMode::Wireframe => (near_x.max(near_y), far_x.min(far_y)),
        FillMode::Solid => (near_y, far_y),
    };

    let mut x: i64 = 0;
    let mut y = i64::from(radius);
    let mut d = 3 - 2 * y;

    while y >= x && x <= far && y >= near {
        match state.fill_mode {
            FillMode::Wireframe => plot_octants(target, state, clip, cx, cy, x, y),
            FillMode::Solid => fill_spans(target, state, cx, cy, x, y),
        }

        x += 1;
        if d > 0 {
            y -= 1;
            d += 4 * (x - y) + 10;
        } else {
            d += 4 * x + 6;
        }
    }
}

/// Smallest and largest distance from `c` to the pixels `lo..=hi`.
fn axis_distance(lo: i32, hi: i32, c: i64) -> (i64, i64) {
    let (lo, hi) = (i64::from(lo), i64::from(hi));
    let near = if c < lo {
        lo - c
    } else if c > hi {
        c - hi
    } else {
        0
    };
    (near, (lo - c).abs().max((hi - c).abs()))
}

fn plot_octants(
    target: &mut Image,
    state: &RenderState,
    clip: PixelRect,
    cx: i64,
    cy: i64,
    x: i64,
    y: i64,
) {
    let points = [
        (cx + x, cy + y),
        (cx - x, cy + y),
        (cx + x, cy - y),
        (cx - x, cy - y),
        (cx + y, cy + x),
        (cx - y, cy + x),
        (cx + y, cy - x),
        (cx - y, cy - x),
    ];

    // Symmetric points coincide on the axes and on the diagonal.
    for (i, &(px, py)) in points.iter().enumerate() {
        if points[..i].contains(&(px, py)) {
            continue;
        }
        let (Ok(px), Ok(py)) = (i32::try_from(px), i32::try_from(py)) else {
            continue;
        };
        if clip.contains(px, py) {
            target.plot_unchecked(px, py, state.color, &state.blend_mode);
        }
    }
}

fn fill_spans(target: &mut Image, state: &RenderState, cx: i64, cy: i64, x: i64, y: i64) {
    let span = |target: &mut Image, x0: i64, x1: i64, y: i64| {
        draw_line(
            target,
            state,
            Vec2::new(x0 as f32, y as f32),
            Vec2::new(x1 as f32, y as f32),
        );
    };
    span(target, cx - x, cx + x, cy + y);
    span(target, cx - x, cx + x, cy - y);
    span(target, cx - y, cx + y, cy + x);
    span(target, cx - y, cx + y, cy - x);
}
