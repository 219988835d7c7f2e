//! Triangle and quad rasterization with edge functions.
//!
//! Vertices are snapped to integer pixel positions and clamped to a ±2^24
//! guard band. A pixel `p` is inside a counter-clockwise triangle when every
//! edge function `orient2d(a, b, p)` is non-negative after the top-left
//! bias, so pixels on an edge shared by two triangles are drawn by exactly
//! one of them.

use super::{primitives::draw_line, FillMode, PixelRect, RenderState, Vertex};
use crate::color::Color;
use crate::geometry::{Vec2, Vec3};
use crate::image::Image;

type Point = [i64; 2];

/// Snapped coordinates are clamped to `±GUARD_BAND`. Edge-function products
/// then stay below 2^52, far inside `i64`.
const GUARD_BAND: i64 = 1 << 24;

#[inline]
fn snap(v: f32) -> i64 {
    (v.round() as i64).clamp(-GUARD_BAND, GUARD_BAND)
}

/// Twice the signed area of `abc`; positive when counter-clockwise.
#[inline]
fn orient2d(a: Point, b: Point, c: Point) -> i64 {
    (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
}

/// Top edges run horizontally rightwards, left edges run upwards.
#[inline]
fn is_top_left(a: Point, b: Point) -> bool {
    let dx = b[0] - a[0];
    let dy = b[1] - a[1];
    (dy == 0 && dx > 0) || dy < 0
}

/// Snapped, culled, counter-clockwise triangle.
#[derive(Debug, Clone, Copy)]
struct Triangle {
    vertices: [Vertex; 3],
    points: [Point; 3],
    area: i64,
}

impl Triangle {
    /// `None` for non-finite, degenerate or culled input.
    fn setup(vertices: [Vertex; 3], state: &RenderState) -> Option<Self> {
        let mut points = [[0; 2]; 3];
        for (p, v) in points.iter_mut().zip(&vertices) {
            if !v.position.x.is_finite() || !v.position.y.is_finite() {
                return None;
            }
            *p = [snap(v.position.x), snap(v.position.y)];
        }

        let area = orient2d(points[0], points[1], points[2]);
        if area == 0 || state.culls(area > 0) {
            return None;
        }

        let mut vertices = vertices;
        if area < 0 {
            vertices.swap(1, 2);
            points.swap(1, 2);
        }
        Some(Self {
            vertices,
            points,
            area: area.abs(),
        })
    }

    fn bounds(&self) -> Option<PixelRect> {
        let narrow = |v: i64| v as i32;
        let xs = self.points.map(|p| p[0]);
        let ys = self.points.map(|p| p[1]);
        PixelRect::new(
            narrow(xs.into_iter().min().unwrap_or(0)),
            narrow(ys.into_iter().min().unwrap_or(0)),
            narrow(xs.into_iter().max().unwrap_or(0)),
            narrow(ys.into_iter().max().unwrap_or(0)),
        )
    }

    fn positions(&self) -> [Vec2; 3] {
        self.points.map(|p| Vec2::new(p[0] as f32, p[1] as f32))
    }
}

/// Incremental evaluation of the three biased edge functions.
struct EdgeWalker {
    row: [i64; 3],
    w: [i64; 3],
    step_x: [i64; 3],
    step_y: [i64; 3],
    bias: [i64; 3],
}

impl EdgeWalker {
    fn new(tri: &Triangle, x: i32, y: i32) -> Self {
        let [p0, p1, p2] = tri.points;
        // Edge i is opposite vertex i.
        let edges = [(p1, p2), (p2, p0), (p0, p1)];
        let origin = [i64::from(x), i64::from(y)];

        let mut row = [0; 3];
        let mut step_x = [0; 3];
        let mut step_y = [0; 3];
        let mut bias = [0; 3];
        for (i, (a, b)) in edges.into_iter().enumerate() {
            bias[i] = if is_top_left(a, b) { 0 } else { -1 };
            row[i] = orient2d(a, b, origin) + bias[i];
            step_x[i] = a[1] - b[1];
            step_y[i] = b[0] - a[0];
        }

        Self {
            row,
            w: row,
            step_x,
            step_y,
            bias,
        }
    }

    #[inline]
    fn inside(&self) -> bool {
        self.w.iter().all(|&w| w >= 0)
    }

    #[inline]
    fn step_x(&mut self) {
        for (w, s) in self.w.iter_mut().zip(self.step_x) {
            *w += s;
        }
    }

    #[inline]
    fn step_y(&mut self) {
        for (r, s) in self.row.iter_mut().zip(self.step_y) {
            *r += s;
        }
        self.w = self.row;
    }

    /// Unbiased weights divided by the doubled area.
    #[inline]
    fn barycentric(&self, area: i64) -> Vec3 {
        let inv = 1.0 / area as f32;
        Vec3::new(
            (self.w[0] - self.bias[0]) as f32 * inv,
            (self.w[1] - self.bias[1]) as f32 * inv,
            (self.w[2] - self.bias[2]) as f32 * inv,
        )
    }
}

/// Per-pixel color source.
#[derive(Clone, Copy)]
enum Paint<'a> {
    Flat,
    Shaded,
    Textured(&'a Image),
}

impl Paint<'_> {
    #[inline]
    fn shade(self, tri: &Triangle, bary: Vec3, state: &RenderState) -> Color {
        let [v0, v1, v2] = &tri.vertices;
        match self {
            Self::Flat => state.color,
            Self::Shaded => Color::interpolate(v0.color, v1.color, v2.color, bary) * state.color,
            Self::Textured(texture) => {
                let uv = v0.uv * bary.x + v1.uv * bary.y + v2.uv * bary.z;
                let texel = texture.sample_uv(uv.x, uv.y, state.texture_address);
                let tint = Color::interpolate(v0.color, v1.color, v2.color, bary);
                texel * tint * state.color
            }
        }
    }
}

/// Scan the union of the triangles' boxes. A pixel inside several
/// triangles is written once, by the first.
fn fill<const N: usize>(
    target: &mut Image,
    state: &RenderState,
    tris: [Triangle; N],
    paint: Paint<'_>,
) {
    let Some(clip) = state.clip_rect(target) else {
        return;
    };
    let Some(bounds) = tris
        .iter()
        .filter_map(Triangle::bounds)
        .reduce(|a, b| PixelRect {
            x0: a.x0.min(b.x0),
            y0: a.y0.min(b.y0),
            x1: a.x1.max(b.x1),
            y1: a.y1.max(b.y1),
        })
        .and_then(|b| b.intersect(clip))
    else {
        return;
    };

    let mut walkers: [EdgeWalker; N] =
        std::array::from_fn(|i| EdgeWalker::new(&tris[i], bounds.x0, bounds.y0));

    for y in bounds.y0..=bounds.y1 {
        for x in bounds.x0..=bounds.x1 {
            if let Some(i) = walkers.iter().position(EdgeWalker::inside) {
                let color = paint.shade(&tris[i], walkers[i].barycentric(tris[i].area), state);
                target.plot_unchecked(x, y, color, &state.blend_mode);
            }
            walkers.iter_mut().for_each(EdgeWalker::step_x);
        }
        walkers.iter_mut().for_each(EdgeWalker::step_y);
    }
}

fn outline(target: &mut Image, state: &RenderState, points: &[Vec2]) {
    for pair in points.windows(2) {
        draw_line(target, state, pair[0], pair[1]);
    }
}

fn draw_triangle_with(
    target: &mut Image,
    state: &RenderState,
    vertices: [Vertex; 3],
    paint: Paint<'_>,
) {
    let Some(tri) = Triangle::setup(vertices, state) else {
        return;
    };
    match state.fill_mode {
        FillMode::Solid => fill(target, state, [tri], paint),
        FillMode::Wireframe => {
            let [a, b, c] = tri.positions();
            outline(target, state, &[a, b, c, a]);
        }
    }
}

fn draw_quad_with(
    target: &mut Image,
    state: &RenderState,
    vertices: &[Vertex; 4],
    paint: Paint<'_>,
) {
    let [v0, v1, v2, v3] = *vertices;
    let first = Triangle::setup([v0, v1, v2], state);
    let second = Triangle::setup([v0, v2, v3], state);

    if state.fill_mode == FillMode::Wireframe {
        // Outer edges of each surviving half; the diagonal is not drawn.
        let snapped = |v: Vertex| {
            Vec2::new(snap(v.position.x) as f32, snap(v.position.y) as f32)
        };
        if first.is_some() {
            outline(target, state, &[snapped(v0), snapped(v1), snapped(v2)]);
        }
        if second.is_some() {
            outline(target, state, &[snapped(v2), snapped(v3), snapped(v0)]);
        }
        return;
    }

    match (first, second) {
        (Some(a), Some(b)) => fill(target, state, [a, b], paint),
        (Some(t), None) | (None, Some(t)) => fill(target, state, [t], paint),
        (None, None) => {}
    }
}

/// Fill a triangle with the state color.
///
/// Zero-area and culled triangles draw nothing. In wireframe mode the three
/// edges are drawn with [`draw_line`] after culling.
pub fn draw_triangle(target: &mut Image, state: &RenderState, v0: Vec2, v1: Vec2, v2: Vec2) {
    draw_triangle_with(
        target,
        state,
        [Vertex::at(v0), Vertex::at(v1), Vertex::at(v2)],
        Paint::Flat,
    );
}

/// Fill a triangle with barycentric-interpolated vertex colors.
pub fn draw_triangle_shaded(target: &mut Image, state: &RenderState, vertices: &[Vertex; 3]) {
    draw_triangle_with(target, state, *vertices, Paint::Shaded);
}

/// Fill a triangle with a texture.
///
/// Texture coordinates are interpolated and sampled nearest-neighbour with
/// the state's address mode. Output is texel × vertex color × state color.
pub fn draw_triangle_textured(
    target: &mut Image,
    state: &RenderState,
    vertices: &[Vertex; 3],
    texture: &Image,
) {
    draw_triangle_with(target, state, *vertices, Paint::Textured(texture));
}

/// Fill a quad as triangles `(v0, v1, v2)` and `(v0, v2, v3)`.
///
/// Each half is culled on its own winding. Both halves are scanned together
/// and no pixel is written twice.
pub fn draw_quad(target: &mut Image, state: &RenderState, corners: &[Vec2; 4]) {
    draw_quad_with(target, state, &corners.map(Vertex::at), Paint::Flat);
}

/// Fill a textured quad. See [`draw_quad`] and [`draw_triangle_textured`].
pub fn draw_quad_textured(
    target: &mut Image,
    state: &RenderState,
    vertices: &[Vertex; 4],
    texture: &Image,
) {
    draw_quad_with(target, state, vertices, Paint::Textured(texture));
}
