//! Axis-aligned bounding boxes: clipping, intersection and collision response.
//!
//! # References
//!
//! - Cohen, D. & Sutherland, I. (1967). Line clipping, as described in
//!   Foley et al., *Computer Graphics: Principles and Practice*.
//! - Ericson, C. (2005). *Real-Time Collision Detection*, §5.3.3
//!   ("Intersecting segment against box").

use super::{Vec2, Vec3, Viewport};

const INSIDE: u8 = 0;
const LEFT: u8 = 1;
const RIGHT: u8 = 2;
const TOP: u8 = 4;
const BOTTOM: u8 = 8;

/// Upper bound on clip iterations. Exact arithmetic needs at most four; the
/// slack absorbs intersection points that round just outside an edge.
const MAX_CLIP_ITERATIONS: usize = 16;

/// Endpoint magnitude above which edge crossings are found by bisection.
const FAR: f32 = 16_777_216.0;

/// Enough halvings to shrink `f32::MAX` below one pixel.
const MAX_BISECT_ITERATIONS: usize = 160;

/// Tolerance for near-parallel segments in [`Aabb::intersects_line`].
const LINE_EPSILON: f32 = 1e-5;

/// Axis-aligned bounding box over 3D float coordinates.
///
/// A box is valid when `min <= max` on every axis. [`Aabb::EMPTY`] is
/// deliberately invalid so that it can seed [`Aabb::expand`]. Intersecting
/// two boxes with [`Aabb::clamp`] may also produce an invalid box; check
/// [`Aabb::is_valid`] (or [`Aabb::is_valid_2d`]) before using the result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Aabb {
    /// Inverted sentinel box (min = +inf, max = -inf).
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    /// Create a box from its corners.
    #[must_use]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Smallest box containing every point.
    #[must_use]
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        points.into_iter().fold(Self::EMPTY, |mut aabb, p| {
            aabb.expand(p);
            aabb
        })
    }

    /// Bounding box of a 2D triangle.
    #[must_use]
    pub fn from_triangle(a: Vec2, b: Vec2, c: Vec2) -> Self {
        Self::from_points([a.into(), b.into(), c.into()])
    }

    /// Bounding box of a 2D quad.
    #[must_use]
    pub fn from_quad(quad: &[Vec2; 4]) -> Self {
        Self::from_points(quad.iter().map(|&p| Vec3::from(p)))
    }

    /// Inclusive pixel box covered by a viewport.
    #[must_use]
    pub fn from_viewport(vp: &Viewport) -> Self {
        Self::new(
            Vec3::new(vp.x as f32, vp.y as f32, vp.min_depth),
            Vec3::new(
                (i64::from(vp.x) + i64::from(vp.width) - 1) as f32,
                (i64::from(vp.y) + i64::from(vp.height) - 1) as f32,
                vp.max_depth,
            ),
        )
    }

    /// Inclusive pixel box of a `width` x `height` image:
    /// `[(0,0,0), (w-1,h-1,0)]`, or [`Aabb::EMPTY`] when either side is zero.
    #[must_use]
    pub fn from_size(width: u32, height: u32) -> Self {
        if width == 0 || height == 0 {
            return Self::EMPTY;
        }
        Self::new(
            Vec3::ZERO,
            Vec3::new((width - 1) as f32, (height - 1) as f32, 0.0),
        )
    }

    /// Grow the box to contain `p`.
    pub fn expand(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// `min <= max` on all three axes.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
    }

    /// `min <= max` on x and y.
    #[must_use]
    pub fn is_valid_2d(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y
    }

    /// Intersection of two boxes. May be invalid.
    #[must_use]
    pub fn clamp(&self, other: &Self) -> Self {
        Self::new(self.min.max(other.min), self.max.min(other.max))
    }

    /// Extent along each axis.
    #[must_use]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Center point.
    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// 2D point containment (inclusive).
    #[must_use]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    fn outcode(&self, p: Vec2) -> u8 {
        let mut code = INSIDE;
        if p.x < self.min.x {
            code |= LEFT;
        } else if p.x > self.max.x {
            code |= RIGHT;
        }
        if p.y < self.min.y {
            code |= TOP;
        } else if p.y > self.max.y {
            code |= BOTTOM;
        }
        code
    }

    /// Clip the segment `p0`-`p1` to the box (Cohen-Sutherland, x/y only).
    ///
    /// Returns `false` when no part of the segment lies inside or an endpoint
    /// is not finite; the endpoints are then unspecified. A segment that is
    /// already inside is returned unchanged.
    pub fn clip(&self, p0: &mut Vec2, p1: &mut Vec2) -> bool {
        if !(p0.is_finite() && p1.is_finite()) {
            return false;
        }
        let mut code0 = self.outcode(*p0);
        let mut code1 = self.outcode(*p1);

        for _ in 0..MAX_CLIP_ITERATIONS {
            if code0 | code1 == INSIDE {
                return true;
            }
            if code0 & code1 != 0 {
                return false;
            }

            // Move the endpoint with the larger outcode.
            let out = code0.max(code1);
            let (from, to) = if out == code0 { (*p0, *p1) } else { (*p1, *p0) };
            let magnitude = from.x.abs().max(from.y.abs()).max(to.x.abs()).max(to.y.abs());
            let p = if magnitude > FAR {
                self.bisect_edge(out, from, to)
            } else {
                self.intersect_edge(out, *p0, *p1)
            };
            if !p.is_finite() {
                return false;
            }

            if out == code0 {
                *p0 = p;
                code0 = self.outcode(p);
            } else {
                *p1 = p;
                code1 = self.outcode(p);
            }
        }
        false
    }

    /// Intersection of `p0`-`p1` with the most significant edge in `out`.
    fn intersect_edge(&self, out: u8, p0: Vec2, p1: Vec2) -> Vec2 {
        let dx = p1.x - p0.x;
        let dy = p1.y - p0.y;
        if out & BOTTOM != 0 {
            Vec2::new(p0.x + dx * (self.max.y - p0.y) / dy, self.max.y)
        } else if out & TOP != 0 {
            Vec2::new(p0.x + dx * (self.min.y - p0.y) / dy, self.min.y)
        } else if out & RIGHT != 0 {
            Vec2::new(self.max.x, p0.y + dy * (self.max.x - p0.x) / dx)
        } else {
            Vec2::new(self.min.x, p0.y + dy * (self.min.x - p0.x) / dx)
        }
    }

    /// Crossing of the edge in `out` found by halving `outside`-`inside`.
    ///
    /// `outside` violates the edge and `inside` does not. Midpoints stay
    /// accurate at any magnitude, unlike the slope form.
    fn bisect_edge(&self, out: u8, mut outside: Vec2, mut inside: Vec2) -> Vec2 {
        let violates = |p: Vec2| {
            if out & BOTTOM != 0 {
                p.y > self.max.y
            } else if out & TOP != 0 {
                p.y < self.min.y
            } else if out & RIGHT != 0 {
                p.x > self.max.x
            } else {
                p.x < self.min.x
            }
        };

        for _ in 0..MAX_BISECT_ITERATIONS {
            let mid = outside * 0.5 + inside * 0.5;
            if mid == outside || mid == inside {
                break;
            }
            if violates(mid) {
                outside = mid;
            } else {
                inside = mid;
            }
        }

        if out & BOTTOM != 0 {
            Vec2::new(inside.x, self.max.y)
        } else if out & TOP != 0 {
            Vec2::new(inside.x, self.min.y)
        } else if out & RIGHT != 0 {
            Vec2::new(self.max.x, inside.y)
        } else {
            Vec2::new(self.min.x, inside.y)
        }
    }

    /// Overlap test against another box (touching counts).
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// 3D point containment (inclusive).
    #[must_use]
    pub fn intersects_point(&self, p: Vec3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// Circle overlap in the x/y plane.
    #[must_use]
    pub fn intersects_circle(&self, center: Vec2, radius: f32) -> bool {
        let closest = center.max(self.min.xy()).min(self.max.xy());
        (center - closest).length_squared() <= radius * radius
    }

    /// Sphere overlap.
    #[must_use]
    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        let closest = center.clamp(self.min, self.max);
        (center - closest).length_squared() <= radius * radius
    }

    /// Segment overlap using the separating-axis extent test.
    #[must_use]
    pub fn intersects_line(&self, p0: Vec3, p1: Vec3) -> bool {
        let c = self.center();
        let e = self.max - c;
        let mid = (p0 + p1) * 0.5;
        let d = p1 - mid;
        let m = mid - c;

        let ad = d.abs();
        if m.x.abs() > e.x + ad.x || m.y.abs() > e.y + ad.y || m.z.abs() > e.z + ad.z {
            return false;
        }

        // Near-parallel segments make the cross terms vanish.
        let ad = ad + Vec3::splat(LINE_EPSILON);
        if (m.y * d.z - m.z * d.y).abs() > e.y * ad.z + e.z * ad.y {
            return false;
        }
        if (m.z * d.x - m.x * d.z).abs() > e.x * ad.z + e.z * ad.x {
            return false;
        }
        if (m.x * d.y - m.y * d.x).abs() > e.x * ad.y + e.y * ad.x {
            return false;
        }
        true
    }

    /// Displacement that moves `other` out of `self` along the axis of least
    /// penetration, or `None` when the boxes do not overlap on every axis.
    #[must_use]
    pub fn mtv(&self, other: &Self) -> Option<Vec3> {
        let depth = self.max.min(other.max) - self.min.max(other.min);
        if depth.x <= 0.0 || depth.y <= 0.0 || depth.z <= 0.0 {
            return None;
        }
        let sign = |a: f32, b: f32| if a < b { 1.0 } else { -1.0 };

        if depth.x <= depth.y && depth.x <= depth.z {
            Some(Vec3::new(depth.x * sign(self.min.x, other.min.x), 0.0, 0.0))
        } else if depth.y <= depth.z {
            Some(Vec3::new(0.0, depth.y * sign(self.min.y, other.min.y), 0.0))
        } else {
            Some(Vec3::new(0.0, 0.0, depth.z * sign(self.min.z, other.min.z)))
        }
    }

    /// [`Aabb::mtv`] restricted to the x/y plane.
    #[must_use]
    pub fn mtv_2d(&self, other: &Self) -> Option<Vec2> {
        let depth = self.max.xy().min(other.max.xy()) - self.min.xy().max(other.min.xy());
        if depth.x <= 0.0 || depth.y <= 0.0 {
            return None;
        }
        let sign = |a: f32, b: f32| if a < b { 1.0 } else { -1.0 };

        if depth.x <= depth.y {
            Some(Vec2::new(depth.x * sign(self.min.x, other.min.x), 0.0))
        } else {
            Some(Vec2::new(0.0, depth.y * sign(self.min.y, other.min.y)))
        }
    }

    /// Displacement that moves a circle out of the box (x/y plane).
    #[must_use]
    pub fn mtv_circle(&self, center: Vec2, radius: f32) -> Option<Vec2> {
        let closest = center.max(self.min.xy()).min(self.max.xy());
        let delta = center - closest;
        let dist_sq = delta.length_squared();

        if dist_sq > f32::EPSILON {
            if dist_sq >= radius * radius {
                return None;
            }
            let dist = dist_sq.sqrt();
            return Some(delta.normalize_or_zero() * (radius - dist));
        }

        // Center inside or on the boundary: leave through the nearest face.
        let faces = [
            (center.x - self.min.x, Vec2::new(-1.0, 0.0)),
            (self.max.x - center.x, Vec2::new(1.0, 0.0)),
            (center.y - self.min.y, Vec2::new(0.0, -1.0)),
            (self.max.y - center.y, Vec2::new(0.0, 1.0)),
        ];
        let (dist, normal) = nearest_face(&faces);
        Some(normal * (dist + radius))
    }

    /// Displacement that moves a sphere out of the box.
    #[must_use]
    pub fn mtv_sphere(&self, center: Vec3, radius: f32) -> Option<Vec3> {
        let closest = center.clamp(self.min, self.max);
        let delta = center - closest;
        let dist_sq = delta.length_squared();

        if dist_sq > f32::EPSILON {
            if dist_sq >= radius * radius {
                return None;
            }
            let dist = dist_sq.sqrt();
            return Some(delta.normalize_or_zero() * (radius - dist));
        }

        let faces = [
            (center.x - self.min.x, Vec3::new(-1.0, 0.0, 0.0)),
            (self.max.x - center.x, Vec3::new(1.0, 0.0, 0.0)),
            (center.y - self.min.y, Vec3::new(0.0, -1.0, 0.0)),
            (self.max.y - center.y, Vec3::new(0.0, 1.0, 0.0)),
            (center.z - self.min.z, Vec3::new(0.0, 0.0, -1.0)),
            (self.max.z - center.z, Vec3::new(0.0, 0.0, 1.0)),
        ];
        let (dist, normal) = nearest_face(&faces);
        Some(normal * (dist + radius))
    }
}

/// First face with the smallest distance.
fn nearest_face<T: Copy>(faces: &[(f32, T)]) -> (f32, T) {
    let mut best = faces[0];
    for &face in &faces[1..] {
        if face.0 < best.0 {
            best = face;
        }
    }
    best
}
