//! Portable backend: two `u64` lanes per window ("SIMD within a register").

use super::{Classes, LANES, Lanes};

const HIGH_BITS: u64 = 0x8080_8080_8080_8080;

/// Gathers the high bit of each byte of `word` into the low 8 bits.
///
/// After `>> 7` every byte is 0 or 1; the multiplier drops byte `i` onto bit
/// `56 + i` without carries, so the top byte is the lane mask.
#[inline]
#[allow(clippy::cast_possible_truncation)]
const fn movemask(word: u64) -> u16 {
    (((word & HIGH_BITS) >> 7).wrapping_mul(0x0102_0408_1020_4080) >> 56) as u16
}

#[inline]
fn lanes(window: &[u8; LANES]) -> (u64, u64) {
    let (lo, hi) = window.split_at(LANES / 2);
    let mut a = [0u8; 8];
    let mut b = [0u8; 8];
    a.copy_from_slice(lo);
    b.copy_from_slice(hi);
    (u64::from_le_bytes(a), u64::from_le_bytes(b))
}

/// Portable [`Lanes`] backend built on 64-bit integer arithmetic.
#[derive(Debug, Clone, Copy)]
pub enum Swar {}

impl Lanes for Swar {
    const NAME: &'static str = "swar-core";

    #[inline]
    fn classify(window: &[u8; LANES]) -> Classes {
        let (lo, hi) = lanes(window);
        // 0b10xx_xxxx: bit 7 set, bit 6 (shifted up into bit 7) clear.
        let cont_lo = lo & !(lo << 1);
        let cont_hi = hi & !(hi << 1);
        Classes {
            non_ascii: movemask(lo) | (movemask(hi) << 8),
            continuation: movemask(cont_lo) | (movemask(cont_hi) << 8),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movemask_picks_high_bits() {
        assert_eq!(movemask(0), 0);
        assert_eq!(movemask(HIGH_BITS), 0xFF);
        assert_eq!(movemask(0x0000_0000_0000_0080), 0b1);
        assert_eq!(movemask(0x8000_0000_0000_0000), 0b1000_0000);
        assert_eq!(movemask(0x7F7F_7F7F_7F7F_7F7F), 0);
    }

    #[test]
    fn continuation_excludes_leads() {
        let mut w = [0u8; LANES];
        for (i, b) in w.iter_mut().enumerate() {
            *b = 0x80 + (i as u8) * 8;
        }
        // 0x80..=0xB8 are continuation bytes, 0xC0.. are not.
        assert_eq!(Swar::classify(&w).continuation, 0x00FF);
        assert_eq!(Swar::classify(&w).non_ascii, 0xFFFF);
    }
}
