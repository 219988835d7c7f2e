//! Color types and color space conversions.
//!
//! [`Color`] is the 8-bit RGBA pixel value every image and draw call works
//! with. Its operators saturate instead of wrapping and dispatch at compile
//! time to the SIMD kernels in [`crate::accel`] (or the scalar fallback on
//! targets without a vector path). Both paths produce identical bytes.
//!
//! [`Hsla`] is a floating-point HSL color used by the `hsl(...)` parser and
//! available for palette generation.

mod parse;

use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Sub, SubAssign};

use crate::accel;
use crate::error::Result;
use crate::geometry::Vec3;

/// RGBA color with 8-bit components.
///
/// Field order is R, G, B, A. Interchange with byte buffers always goes
/// through [`Color::to_array`] / [`Color::from_array`], never through memory
/// reinterpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    /// Red component (0-255).
    pub r: u8,
    /// Green component (0-255).
    pub g: u8,
    /// Blue component (0-255).
    pub b: u8,
    /// Alpha component (0-255, 255 = fully opaque).
    pub a: u8,
}

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);
    /// Opaque black.
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    /// Opaque white.
    pub const WHITE: Self = Self::new(255, 255, 255, 255);
    /// Opaque red.
    pub const RED: Self = Self::new(255, 0, 0, 255);
    /// Opaque green.
    pub const GREEN: Self = Self::new(0, 255, 0, 255);
    /// Opaque blue.
    pub const BLUE: Self = Self::new(0, 0, 255, 255);
    /// Opaque yellow.
    pub const YELLOW: Self = Self::new(255, 255, 0, 255);
    /// Opaque cyan.
    pub const CYAN: Self = Self::new(0, 255, 255, 255);
    /// Opaque magenta.
    pub const MAGENTA: Self = Self::new(255, 0, 255, 255);
    /// Opaque mid gray.
    pub const GRAY: Self = Self::new(128, 128, 128, 255);

    /// Create a new RGBA color.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque RGB color (alpha = 255).
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Create a color from a `0xRRGGBBAA` integer.
    #[must_use]
    pub const fn from_hex(hex: u32) -> Self {
        Self::from_array(hex.to_be_bytes())
    }

    /// Pack into a `0xRRGGBBAA` integer.
    #[must_use]
    pub const fn to_rgba_u32(self) -> u32 {
        u32::from_be_bytes(self.to_array())
    }

    /// Create a color with modified alpha.
    #[must_use]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }

    /// Convert to array representation in R, G, B, A order.
    #[must_use]
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Create from array representation in R, G, B, A order.
    #[must_use]
    pub const fn from_array(arr: [u8; 4]) -> Self {
        Self::new(arr[0], arr[1], arr[2], arr[3])
    }

    /// Create an opaque color from hue (degrees), saturation and value (0-1).
    #[must_use]
    pub fn from_hsv(h: f32, s: f32, v: f32) -> Self {
        let h = h.rem_euclid(360.0) / 60.0;
        let s = s.clamp(0.0, 1.0);
        let v = v.clamp(0.0, 1.0);

        let c = v * s;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let m = v - c;

        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };

        let to_u8 = |f: f32| ((f + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        Self::rgb(to_u8(r), to_u8(g), to_u8(b))
    }

    /// Parse an HTML/CSS color string.
    ///
    /// Accepts `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb(..)`, `rgba(..)`,
    /// `hsl(..)`, `hsla(..)` and CSS color names, case-insensitively and
    /// ignoring surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidColor`](crate::Error::InvalidColor) when the
    /// string is not a recognized color.
    pub fn parse(input: &str) -> Result<Self> {
        parse::parse_html(input)
    }

    /// Parse an HTML/CSS color string, falling back to opaque black.
    ///
    /// ```
    /// use pixelcore::color::Color;
    ///
    /// assert_eq!(Color::from_html("#f00"), Color::new(255, 0, 0, 255));
    /// assert_eq!(Color::from_html("rgba(0,0,255,0)"), Color::new(0, 0, 255, 0));
    /// assert_eq!(Color::from_html("bogus"), Color::BLACK);
    /// ```
    #[must_use]
    pub fn from_html(input: &str) -> Self {
        Self::parse(input).unwrap_or(Self::BLACK)
    }

    /// Component-wise minimum.
    #[must_use]
    pub fn min(self, other: Self) -> Self {
        accel::min(self, other)
    }

    /// Component-wise maximum.
    #[must_use]
    pub fn max(self, other: Self) -> Self {
        accel::max(self, other)
    }

    /// Weighted sum `c0 * bary.x + c1 * bary.y + c2 * bary.z` per channel.
    ///
    /// The accumulation order is fixed (`(c0*x + c1*y) + c2*z`) so that the
    /// scalar and SIMD paths round identically.
    #[must_use]
    pub fn interpolate(c0: Self, c1: Self, c2: Self, bary: Vec3) -> Self {
        accel::interpolate(c0, c1, c2, bary.x, bary.y, bary.z)
    }

    /// Relative luminance (ITU-R BT.709) in the 0-255 range.
    #[must_use]
    pub fn luminance(self) -> f32 {
        0.2126 * f32::from(self.r) + 0.7152 * f32::from(self.g) + 0.0722 * f32::from(self.b)
    }
}

impl Add for Color {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        accel::add(self, rhs)
    }
}

impl AddAssign for Color {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Color {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        accel::sub(self, rhs)
    }
}

impl SubAssign for Color {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

/// Per-channel modulation: `round(a * b / 255)`.
impl Mul for Color {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        accel::modulate(self, rhs)
    }
}

impl MulAssign for Color {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

/// Scale every channel (alpha included), clamping to 0-255.
impl Mul<f32> for Color {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        accel::scale(self, rhs)
    }
}

/// Divide every channel by a non-zero scalar.
impl Div<f32> for Color {
    type Output = Self;

    fn div(self, rhs: f32) -> Self {
        debug_assert!(rhs != 0.0, "Color divided by zero");
        self * rhs.recip()
    }
}

impl From<[u8; 4]> for Color {
    fn from(arr: [u8; 4]) -> Self {
        Self::from_array(arr)
    }
}

impl From<Color> for [u8; 4] {
    fn from(color: Color) -> Self {
        color.to_array()
    }
}

/// HSLA color with floating-point components.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Hsla {
    /// Hue (0.0-360.0 degrees).
    pub h: f32,
    /// Saturation (0.0-1.0).
    pub s: f32,
    /// Lightness (0.0-1.0).
    pub l: f32,
    /// Alpha (0.0-1.0).
    pub a: f32,
}

impl Hsla {
    /// Create a new HSLA color.
    #[must_use]
    pub const fn new(h: f32, s: f32, l: f32, a: f32) -> Self {
        Self { h, s, l, a }
    }

    /// Create an opaque HSL color (alpha = 1.0).
    #[must_use]
    pub const fn hsl(h: f32, s: f32, l: f32) -> Self {
        Self::new(h, s, l, 1.0)
    }

    /// Convert to an 8-bit color.
    #[must_use]
    pub fn to_color(self) -> Color {
        let h = self.h.rem_euclid(360.0) / 360.0;
        let s = self.s.clamp(0.0, 1.0);
        let l = self.l.clamp(0.0, 1.0);

        let (r, g, b) = if s == 0.0 {
            (l, l, l)
        } else {
            let q = if l < 0.5 {
                l * (1.0 + s)
            } else {
                l + s - l * s
            };
            let p = 2.0 * l - q;

            (
                hue_to_rgb(p, q, h + 1.0 / 3.0),
                hue_to_rgb(p, q, h),
                hue_to_rgb(p, q, h - 1.0 / 3.0),
            )
        };

        Color::new(
            (r * 255.0) as u8,
            (g * 255.0) as u8,
            (b * 255.0) as u8,
            (self.a.clamp(0.0, 1.0) * 255.0) as u8,
        )
    }
}

fn hue_to_rgb(p: f32, q: f32, mut t: f32) -> f32 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }

    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

impl From<Hsla> for Color {
    fn from(hsla: Hsla) -> Self {
        hsla.to_color()
    }
}
