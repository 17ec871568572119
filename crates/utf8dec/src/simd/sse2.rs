//! x86_64 backend. SSE2 is part of the x86_64 baseline, so no runtime
//! feature detection is needed.

use core::arch::x86_64::{
    __m128i, _mm_cmplt_epi8, _mm_loadu_si128, _mm_movemask_epi8, _mm_set1_epi8,
    _mm_setzero_si128, _mm_storeu_si128, _mm_unpackhi_epi8, _mm_unpackhi_epi16,
    _mm_unpacklo_epi8, _mm_unpacklo_epi16,
};

use super::{Classes, LANES, Lanes};

/// SSE2 [`Lanes`] backend.
#[derive(Debug, Clone, Copy)]
pub enum Sse2 {}

impl Lanes for Sse2 {
    const NAME: &'static str = "sse2-core";

    #[inline]
    fn classify(window: &[u8; LANES]) -> Classes {
        // SAFETY: SSE2 is always available on x86_64 and `window` is 16
        // readable bytes.
        unsafe { classify_sse2(window) }
    }

    #[inline]
    fn widen(window: &[u8; LANES], out: &mut [u32; LANES]) {
        // SAFETY: as above; `out` is 64 writable bytes.
        unsafe { widen_sse2(window, out) }
    }
}

#[target_feature(enable = "sse2")]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
unsafe fn classify_sse2(window: &[u8; LANES]) -> Classes {
    // SAFETY: unaligned load of exactly 16 bytes.
    unsafe {
        let v = _mm_loadu_si128(window.as_ptr().cast::<__m128i>());
        // Signed compare: 0x80..=0xBF are -128..=-65, the only bytes below -64.
        let continuation = _mm_cmplt_epi8(v, _mm_set1_epi8(-64));
        Classes {
            non_ascii: _mm_movemask_epi8(v) as u16,
            continuation: _mm_movemask_epi8(continuation) as u16,
        }
    }
}

#[target_feature(enable = "sse2")]
unsafe fn widen_sse2(window: &[u8; LANES], out: &mut [u32; LANES]) {
    // SAFETY: one 16-byte load, four 16-byte stores into the 64-byte `out`.
    unsafe {
        let v = _mm_loadu_si128(window.as_ptr().cast::<__m128i>());
        let zero = _mm_setzero_si128();
        let lo = _mm_unpacklo_epi8(v, zero);
        let hi = _mm_unpackhi_epi8(v, zero);
        let dst = out.as_mut_ptr().cast::<__m128i>();
        _mm_storeu_si128(dst, _mm_unpacklo_epi16(lo, zero));
        _mm_storeu_si128(dst.add(1), _mm_unpackhi_epi16(lo, zero));
        _mm_storeu_si128(dst.add(2), _mm_unpacklo_epi16(hi, zero));
        _mm_storeu_si128(dst.add(3), _mm_unpackhi_epi16(hi, zero));
    }
}
