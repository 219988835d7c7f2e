//! Portable color kernels.
//!
//! These define the reference results; the SIMD kernels must match them
//! byte-for-byte.

use crate::color::Color;

#[inline]
fn zip(a: Color, b: Color, f: impl Fn(u8, u8) -> u8) -> Color {
    Color::new(f(a.r, b.r), f(a.g, b.g), f(a.b, b.b), f(a.a, b.a))
}

/// `round(a * b / 255)` without a division.
#[inline]
fn mul_div_255(a: u8, b: u8) -> u8 {
    let t = u16::from(a) * u16::from(b) + 128;
    ((t + (t >> 8)) >> 8) as u8
}

/// Clamp to the channel range. NaN maps to 0.
#[inline]
#[allow(clippy::manual_clamp)]
fn clamp_channel(v: f32) -> f32 {
    v.max(0.0).min(255.0)
}

/// Saturating per-channel add.
#[inline]
pub fn add(a: Color, b: Color) -> Color {
    zip(a, b, u8::saturating_add)
}

/// Saturating per-channel subtract.
#[inline]
pub fn sub(a: Color, b: Color) -> Color {
    zip(a, b, u8::saturating_sub)
}

/// Per-channel `round(a * b / 255)`.
#[inline]
pub fn modulate(a: Color, b: Color) -> Color {
    zip(a, b, mul_div_255)
}

/// Per-channel minimum.
#[inline]
pub fn min(a: Color, b: Color) -> Color {
    zip(a, b, std::cmp::Ord::min)
}

/// Per-channel maximum.
#[inline]
pub fn max(a: Color, b: Color) -> Color {
    zip(a, b, std::cmp::Ord::max)
}

/// Multiply every channel by `s`, clamp, truncate.
#[inline]
pub fn scale(c: Color, s: f32) -> Color {
    let f = |v: u8| clamp_channel(f32::from(v) * s) as u8;
    Color::new(f(c.r), f(c.g), f(c.b), f(c.a))
}

/// `(c0*bx + c1*by) + c2*bz` per channel, clamped and rounded half up.
#[inline]
pub fn interpolate(c0: Color, c1: Color, c2: Color, bx: f32, by: f32, bz: f32) -> Color {
    let f = |v0: u8, v1: u8, v2: u8| {
        let acc = f32::from(v0) * bx + f32::from(v1) * by;
        let acc = acc + f32::from(v2) * bz;
        (clamp_channel(acc) + 0.5) as u8
    };
    Color::new(
        f(c0.r, c1.r, c2.r),
        f(c0.g, c1.g, c2.g),
        f(c0.b, c1.b, c2.b),
        f(c0.a, c1.a, c2.a),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mul_div_255_exhaustive() {
        for a in 0..=255u8 {
            for b in 0..=255u8 {
                let exact = (f64::from(a) * f64::from(b) / 255.0).round() as u8;
                assert_eq!(mul_div_255(a, b), exact, "{a} * {b}");
            }
        }
    }

    #[test]
    fn test_scale_nan_is_zero() {
        assert_eq!(scale(Color::WHITE, f32::NAN), Color::TRANSPARENT);
        assert_eq!(scale(Color::WHITE, f32::INFINITY), Color::WHITE);
    }

    #[test]
    fn test_interpolate_clamps() {
        let c = interpolate(Color::WHITE, Color::WHITE, Color::WHITE, 1.0, 1.0, 1.0);
        assert_eq!(c, Color::WHITE);
        let c = interpolate(Color::WHITE, Color::BLACK, Color::BLACK, -1.0, 0.0, 0.0);
        assert_eq!(c, Color::new(0, 0, 0, 0));
    }
}
