//! SIMD acceleration layer for color arithmetic.
//!
//! Every [`Color`](crate::color::Color) operator has two kernels:
//!
//! - [`scalar`]: portable per-channel arithmetic, compiled everywhere;
//! - `simd`: SSE2 on x86_64, NEON on little-endian aarch64.
//!
//! The path is selected at compile time. Both paths are bit-identical:
//! saturating integer ops map to saturating vector ops, the modulate rounding
//! uses the same `(t + (t >> 8)) >> 8` trick, and float paths use separate
//! multiply and add (never a fused instruction) with the same clamp and
//! conversion.

pub mod scalar;

#[cfg(any(
    all(target_arch = "x86_64", target_feature = "sse2"),
    all(target_arch = "aarch64", target_feature = "neon", target_endian = "little")
))]
pub mod simd;

#[cfg(any(
    all(target_arch = "x86_64", target_feature = "sse2"),
    all(target_arch = "aarch64", target_feature = "neon", target_endian = "little")
))]
pub use simd::{add, interpolate, max, min, modulate, scale, sub};

#[cfg(not(any(
    all(target_arch = "x86_64", target_feature = "sse2"),
    all(target_arch = "aarch64", target_feature = "neon", target_endian = "little")
)))]
pub use scalar::{add, interpolate, max, min, modulate, scale, sub};

/// Color kernel family compiled into this build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorPath {
    /// Portable per-channel arithmetic.
    Scalar,
    /// SSE2 intrinsics.
    Sse2,
    /// NEON intrinsics.
    Neon,
}

/// Report which color kernels the operators dispatch to.
#[must_use]
pub const fn color_path() -> ColorPath {
    if cfg!(all(target_arch = "x86_64", target_feature = "sse2")) {
        ColorPath::Sse2
    } else if cfg!(all(
        target_arch = "aarch64",
        target_feature = "neon",
        target_endian = "little"
    )) {
        ColorPath::Neon
    } else {
        ColorPath::Scalar
    }
}

/// Report the SIMD backend trueno selected for bulk reductions.
#[must_use]
pub fn backend() -> trueno::Backend {
    trueno::Backend::select_best()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_path_matches_target() {
        let path = color_path();
        #[cfg(target_arch = "x86_64")]
        assert_eq!(path, ColorPath::Sse2);
        println!("Color kernels: {path:?}");
    }

    #[test]
    fn test_backend_selection() {
        let backend = backend();
        // Should return a valid backend
        println!("Selected backend: {backend:?}");
    }
}
