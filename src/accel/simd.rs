//! Vector color kernels.
//!
//! A color occupies the low 32 bits of a vector register, loaded and stored
//! through explicit little-endian packing so lane 0 is always red.
//!
//! # Safety
//!
//! SSE2 is part of the x86_64 baseline and NEON of the aarch64 baseline; this
//! module is only compiled when the target enables them, so every intrinsic
//! call is sound. No memory is accessed through raw pointers.
#![allow(unsafe_code, unused_unsafe)]

pub use imp::{add, interpolate, max, min, modulate, scale, sub};

#[cfg(target_arch = "x86_64")]
mod imp {
    use crate::color::Color;
    use std::arch::x86_64::*;

    #[inline]
    fn load(c: Color) -> __m128i {
        // SAFETY: SSE2 is enabled for this target.
        unsafe { _mm_cvtsi32_si128(i32::from_le_bytes(c.to_array())) }
    }

    #[inline]
    fn store(v: __m128i) -> Color {
        // SAFETY: SSE2 is enabled for this target.
        Color::from_array(unsafe { _mm_cvtsi128_si32(v) }.to_le_bytes())
    }

    /// Widen the four channels to `f32` lanes.
    #[inline]
    fn to_ps(c: Color) -> __m128 {
        // SAFETY: SSE2 is enabled for this target.
        unsafe {
            let zero = _mm_setzero_si128();
            let wide = _mm_unpacklo_epi16(_mm_unpacklo_epi8(load(c), zero), zero);
            _mm_cvtepi32_ps(wide)
        }
    }

    /// Clamp to 0-255 (NaN becomes 0) and truncate back to bytes.
    #[inline]
    fn from_ps(v: __m128) -> Color {
        // SAFETY: SSE2 is enabled for this target.
        unsafe {
            let clamped = _mm_min_ps(_mm_max_ps(v, _mm_setzero_ps()), _mm_set1_ps(255.0));
            let ints = _mm_cvttps_epi32(clamped);
            let words = _mm_packs_epi32(ints, ints);
            store(_mm_packus_epi16(words, words))
        }
    }

    /// Saturating per-channel add.
    #[inline]
    pub fn add(a: Color, b: Color) -> Color {
        // SAFETY: SSE2 is enabled for this target.
        store(unsafe { _mm_adds_epu8(load(a), load(b)) })
    }

    /// Saturating per-channel subtract.
    #[inline]
    pub fn sub(a: Color, b: Color) -> Color {
        // SAFETY: SSE2 is enabled for this target.
        store(unsafe { _mm_subs_epu8(load(a), load(b)) })
    }

    /// Per-channel `round(a * b / 255)`.
    #[inline]
    pub fn modulate(a: Color, b: Color) -> Color {
        // SAFETY: SSE2 is enabled for this target.
        unsafe {
            let zero = _mm_setzero_si128();
            let a16 = _mm_unpacklo_epi8(load(a), zero);
            let b16 = _mm_unpacklo_epi8(load(b), zero);
            let t = _mm_add_epi16(_mm_mullo_epi16(a16, b16), _mm_set1_epi16(128));
            let q = _mm_srli_epi16(_mm_add_epi16(t, _mm_srli_epi16(t, 8)), 8);
            store(_mm_packus_epi16(q, zero))
        }
    }

    /// Per-channel minimum.
    #[inline]
    pub fn min(a: Color, b: Color) -> Color {
        // SAFETY: SSE2 is enabled for this target.
        store(unsafe { _mm_min_epu8(load(a), load(b)) })
    }

    /// Per-channel maximum.
    #[inline]
    pub fn max(a: Color, b: Color) -> Color {
        // SAFETY: SSE2 is enabled for this target.
        store(unsafe { _mm_max_epu8(load(a), load(b)) })
    }

    /// Multiply every channel by `s`, clamp, truncate.
    #[inline]
    pub fn scale(c: Color, s: f32) -> Color {
        // SAFETY: SSE2 is enabled for this target.
        from_ps(unsafe { _mm_mul_ps(to_ps(c), _mm_set1_ps(s)) })
    }

    /// `(c0*bx + c1*by) + c2*bz` per channel, clamped and rounded half up.
    #[inline]
    pub fn interpolate(c0: Color, c1: Color, c2: Color, bx: f32, by: f32, bz: f32) -> Color {
        // SAFETY: SSE2 is enabled for this target.
        unsafe {
            let acc = _mm_add_ps(
                _mm_mul_ps(to_ps(c0), _mm_set1_ps(bx)),
                _mm_mul_ps(to_ps(c1), _mm_set1_ps(by)),
            );
            let acc = _mm_add_ps(acc, _mm_mul_ps(to_ps(c2), _mm_set1_ps(bz)));
            let clamped = _mm_min_ps(_mm_max_ps(acc, _mm_setzero_ps()), _mm_set1_ps(255.0));
            from_ps(_mm_add_ps(clamped, _mm_set1_ps(0.5)))
        }
    }
}

#[cfg(target_arch = "aarch64")]
mod imp {
    use crate::color::Color;
    use std::arch::aarch64::*;

    #[inline]
    fn load(c: Color) -> uint8x8_t {
        // SAFETY: NEON is enabled for this target.
        unsafe { vreinterpret_u8_u32(vdup_n_u32(u32::from_le_bytes(c.to_array()))) }
    }

    #[inline]
    fn store(v: uint8x8_t) -> Color {
        // SAFETY: NEON is enabled for this target.
        let bits = unsafe { vget_lane_u32::<0>(vreinterpret_u32_u8(v)) };
        Color::from_array(bits.to_le_bytes())
    }

    #[inline]
    fn to_f32(c: Color) -> float32x4_t {
        // SAFETY: NEON is enabled for this target.
        unsafe { vcvtq_f32_u32(vmovl_u16(vget_low_u16(vmovl_u8(load(c))))) }
    }

    /// Clamp to 0-255 (NaN becomes 0) and truncate back to bytes.
    #[inline]
    fn from_f32(v: float32x4_t) -> Color {
        // SAFETY: NEON is enabled for this target.
        unsafe {
            let clamped = vminnmq_f32(vmaxnmq_f32(v, vdupq_n_f32(0.0)), vdupq_n_f32(255.0));
            let words = vmovn_u32(vcvtq_u32_f32(clamped));
            store(vmovn_u16(vcombine_u16(words, words)))
        }
    }

    /// Saturating per-channel add.
    #[inline]
    pub fn add(a: Color, b: Color) -> Color {
        // SAFETY: NEON is enabled for this target.
        store(unsafe { vqadd_u8(load(a), load(b)) })
    }

    /// Saturating per-channel subtract.
    #[inline]
    pub fn sub(a: Color, b: Color) -> Color {
        // SAFETY: NEON is enabled for this target.
        store(unsafe { vqsub_u8(load(a), load(b)) })
    }

    /// Per-channel `round(a * b / 255)`.
    #[inline]
    pub fn modulate(a: Color, b: Color) -> Color {
        // SAFETY: NEON is enabled for this target.
        unsafe {
            let t = vaddq_u16(vmull_u8(load(a), load(b)), vdupq_n_u16(128));
            store(vshrn_n_u16::<8>(vaddq_u16(t, vshrq_n_u16::<8>(t))))
        }
    }

    /// Per-channel minimum.
    #[inline]
    pub fn min(a: Color, b: Color) -> Color {
        // SAFETY: NEON is enabled for this target.
        store(unsafe { vmin_u8(load(a), load(b)) })
    }

    /// Per-channel maximum.
    #[inline]
    pub fn max(a: Color, b: Color) -> Color {
        // SAFETY: NEON is enabled for this target.
        store(unsafe { vmax_u8(load(a), load(b)) })
    }

    /// Multiply every channel by `s`, clamp, truncate.
    #[inline]
    pub fn scale(c: Color, s: f32) -> Color {
        // SAFETY: NEON is enabled for this target.
        from_f32(unsafe { vmulq_f32(to_f32(c), vdupq_n_f32(s)) })
    }

    /// `(c0*bx + c1*by) + c2*bz` per channel, clamped and rounded half up.
    #[inline]
    pub fn interpolate(c0: Color, c1: Color, c2: Color, bx: f32, by: f32, bz: f32) -> Color {
        // SAFETY: NEON is enabled for this target.
        unsafe {
            let acc = vaddq_f32(
                vmulq_f32(to_f32(c0), vdupq_n_f32(bx)),
                vmulq_f32(to_f32(c1), vdupq_n_f32(by)),
            );
            let acc = vaddq_f32(acc, vmulq_f32(to_f32(c2), vdupq_n_f32(bz)));
            let clamped = vminnmq_f32(vmaxnmq_f32(acc, vdupq_n_f32(0.0)), vdupq_n_f32(255.0));
            from_f32(vaddq_f32(clamped, vdupq_n_f32(0.5)))
        }
    }
}
