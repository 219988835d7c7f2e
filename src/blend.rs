//! Source/destination blending.
//!
//! A [`BlendMode`] combines an incoming (source) color with the pixel already
//! in the image (destination):
//!
//! ```text
//! out = op(src * factor(src_factor), dst * factor(dst_factor))
//! ```
//!
//! All multiplications use [`Color`]'s saturating 8-bit arithmetic.

use crate::color::Color;

/// Per-channel multiplier applied to the source or destination color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BlendFactor {
    /// (0, 0, 0, 0)
    Zero,
    /// (1, 1, 1, 1)
    One,
    /// Source color.
    SrcColor,
    /// One minus source color.
    OneMinusSrcColor,
    /// Destination color.
    DstColor,
    /// One minus destination color.
    OneMinusDstColor,
    /// Source alpha broadcast to every channel.
    SrcAlpha,
    /// One minus source alpha, broadcast.
    OneMinusSrcAlpha,
    /// Destination alpha broadcast to every channel.
    DstAlpha,
    /// One minus destination alpha, broadcast.
    OneMinusDstAlpha,
}

impl BlendFactor {
    /// Resolve the factor to a per-channel multiplier.
    #[must_use]
    pub fn resolve(self, src: Color, dst: Color) -> Color {
        let splat = |v: u8| Color::new(v, v, v, v);
        match self {
            Self::Zero => Color::TRANSPARENT,
            Self::One => splat(255),
            Self::SrcColor => src,
            Self::OneMinusSrcColor => splat(255) - src,
            Self::DstColor => dst,
            Self::OneMinusDstColor => splat(255) - dst,
            Self::SrcAlpha => splat(src.a),
            Self::OneMinusSrcAlpha => splat(255 - src.a),
            Self::DstAlpha => splat(dst.a),
            Self::OneMinusDstAlpha => splat(255 - dst.a),
        }
    }
}

/// How the weighted source and destination are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BlendOp {
    /// `src + dst`, saturating.
    Add,
    /// `src - dst`, clamped at zero.
    Subtract,
    /// `dst - src`, clamped at zero.
    ReverseSubtract,
}

/// Blend configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlendMode {
    /// Factor applied to the source color.
    pub src_factor: BlendFactor,
    /// Factor applied to the destination color.
    pub dst_factor: BlendFactor,
    /// Combining operation.
    pub op: BlendOp,
    /// When false, [`BlendMode::blend`] returns the source unchanged.
    pub enabled: bool,
    /// Sources with alpha below this value are discarded at the call site.
    pub discard_threshold: Option<u8>,
}

impl Default for BlendMode {
    fn default() -> Self {
        Self::DISABLE
    }
}

impl BlendMode {
    /// Direct overwrite.
    pub const DISABLE: Self = Self {
        src_factor: BlendFactor::One,
        dst_factor: BlendFactor::Zero,
        op: BlendOp::Add,
        enabled: false,
        discard_threshold: None,
    };

    /// Classic "over": `src * a + dst * (1 - a)`.
    pub const ALPHA_BLEND: Self = Self::new(
        BlendFactor::SrcAlpha,
        BlendFactor::OneMinusSrcAlpha,
        BlendOp::Add,
    );

    /// `dst + src * a`.
    pub const ADDITIVE_BLEND: Self =
        Self::new(BlendFactor::SrcAlpha, BlendFactor::One, BlendOp::Add);

    /// `dst - src * a`.
    pub const SUBTRACTIVE_BLEND: Self = Self::new(
        BlendFactor::SrcAlpha,
        BlendFactor::One,
        BlendOp::ReverseSubtract,
    );

    /// `src * dst`.
    pub const MULTIPLICATIVE_BLEND: Self =
        Self::new(BlendFactor::DstColor, BlendFactor::Zero, BlendOp::Add);

    /// Direct overwrite that skips sources with alpha below 128.
    pub const ALPHA_DISCARD: Self = Self {
        discard_threshold: Some(128),
        ..Self::DISABLE
    };

    /// Enabled blend mode without a discard threshold.
    #[must_use]
    pub const fn new(src_factor: BlendFactor, dst_factor: BlendFactor, op: BlendOp) -> Self {
        Self {
            src_factor,
            dst_factor,
            op,
            enabled: true,
            discard_threshold: None,
        }
    }

    /// Copy with a discard threshold.
    #[must_use]
    pub const fn with_discard(mut self, threshold: u8) -> Self {
        self.discard_threshold = Some(threshold);
        self
    }

    /// True when a write of `src` must be skipped entirely.
    ///
    /// Checked by the caller before the destination is read.
    #[inline]
    #[must_use]
    pub fn discards(&self, src: Color) -> bool {
        self.discard_threshold.is_some_and(|t| src.a < t)
    }

    /// True when [`BlendMode::blend`] reads the destination.
    #[inline]
    #[must_use]
    pub const fn reads_destination(&self) -> bool {
        self.enabled
    }

    /// Combine `src` with `dst`. Discarding is not applied here.
    #[inline]
    #[must_use]
    pub fn blend(&self, src: Color, dst: Color) -> Color {
        if !self.enabled {
            return src;
        }
        let s = src * self.src_factor.resolve(src, dst);
        let d = dst * self.dst_factor.resolve(src, dst);
        match self.op {
            BlendOp::Add => s + d,
            BlendOp::Subtract => s - d,
            BlendOp::ReverseSubtract => d - s,
        }
    }
}
