use alloc::vec::Vec;

/// The largest value [`encode`] can represent in four bytes.
///
/// This is deliberately above [`MAX_CODEPOINT`](crate::MAX_CODEPOINT): the
/// encoder produces 4-byte forms of out-of-range values (and 3-byte forms of
/// surrogates) so that fixtures the decoder must reject can be built.
pub const MAX_ENCODABLE: u32 = 0x1F_FFFF;

/// Minimal UTF-8 length of `codepoint`.
#[must_use]
pub const fn encoded_len(codepoint: u32) -> usize {
    if codepoint < 0x80 {
        1
    } else if codepoint < 0x800 {
        2
    } else if codepoint < 0x1_0000 {
        3
    } else {
        4
    }
}

/// Writes the minimal UTF-8 form of `codepoint` and returns its length.
///
/// No validation is done beyond `debug_assert!(codepoint <= MAX_ENCODABLE)`;
/// surrogates and values above U+10FFFF are encoded like any other value.
#[inline]
pub fn encode(codepoint: u32, out: &mut [u8; 4]) -> usize {
    encode_with_len(codepoint, encoded_len(codepoint), out)
}

/// Writes `codepoint` using exactly `len` bytes.
///
/// `len` longer than the minimal length produces an overlong encoding. A `len`
/// too short to hold the value is a caller bug; in release builds the high
/// bits are dropped.
#[allow(clippy::cast_possible_truncation)]
pub fn encode_with_len(codepoint: u32, len: usize, out: &mut [u8; 4]) -> usize {
    debug_assert!(codepoint <= MAX_ENCODABLE, "U+{codepoint:X} needs more than 4 bytes");
    debug_assert!(
        (encoded_len(codepoint)..=4).contains(&len),
        "U+{codepoint:X} cannot be written in {len} bytes"
    );
    let c = codepoint;
    match len {
        0 | 1 => {
            out[0] = (c & 0x7F) as u8;
            1
        }
        2 => {
            out[0] = 0xC0 | ((c >> 6) & 0x1F) as u8;
            out[1] = 0x80 | (c & 0x3F) as u8;
            2
        }
        3 => {
            out[0] = 0xE0 | ((c >> 12) & 0x0F) as u8;
            out[1] = 0x80 | ((c >> 6) & 0x3F) as u8;
            out[2] = 0x80 | (c & 0x3F) as u8;
            3
        }
        _ => {
            out[0] = 0xF0 | ((c >> 18) & 0x07) as u8;
            out[1] = 0x80 | ((c >> 12) & 0x3F) as u8;
            out[2] = 0x80 | ((c >> 6) & 0x3F) as u8;
            out[3] = 0x80 | (c & 0x3F) as u8;
            4
        }
    }
}

/// Appends the minimal UTF-8 form of `codepoint` to `out`.
pub fn encode_to_vec(codepoint: u32, out: &mut Vec<u8>) -> usize {
    let mut buf = [0u8; 4];
    let len = encode(codepoint, &mut buf);
    out.extend_from_slice(&buf[..len]);
    len
}
