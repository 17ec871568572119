//! Single-codepoint decoder.
//!
//! Decoding is table driven: the top five bits of the lead byte select the
//! declared sequence length, and the length selects the payload mask of the
//! lead byte and the smallest value that may legally use that many bytes.
//! Every byte of the declared sequence is always folded into the codepoint,
//! and the error is derived from the folded value afterwards, so the hot path
//! has no data-dependent early exits beyond the length lookup.
//!
//! Recovery (the number of bytes a malformed sequence occupies):
//!
//! | input                          | consumed                     |
//! |--------------------------------|------------------------------|
//! | invalid lead byte              | 1                            |
//! | input ends inside the sequence | the lead and its continuations |
//! | bad continuation byte          | the declared length          |
//! | overlong, surrogate, > 10FFFF  | the declared length          |

use crate::{MAX_CODEPOINT, Malformed};

/// Declared sequence length indexed by `lead >> 3`; 0 marks an invalid lead.
#[rustfmt::skip]
pub(crate) const SEQUENCE_LEN: [u8; 32] = [
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, // 00..7F
    0, 0, 0, 0, 0, 0, 0, 0,                         // 80..BF
    2, 2, 2, 2,                                     // C0..DF
    3, 3,                                           // E0..EF
    4,                                              // F0..F7
    0,                                              // F8..FF
];

/// Payload bits of the lead byte, by sequence length.
const LEAD_MASK: [u32; 5] = [0x00, 0x7F, 0x1F, 0x0F, 0x07];

/// Smallest value that needs a sequence of the given length.
const MIN_VALUE: [u32; 5] = [0, 0, 0x80, 0x800, 0x1_0000];

#[inline]
pub(crate) const fn sequence_len(lead: u8) -> usize {
    SEQUENCE_LEN[(lead >> 3) as usize] as usize
}

#[inline]
pub(crate) const fn is_continuation(byte: u8) -> bool {
    byte & 0xC0 == 0x80
}

#[must_use]
pub const fn is_surrogate(codepoint: u32) -> bool {
    codepoint & 0xFFFF_F800 == 0xD800
}

/// Folds a complete `bytes.len()`-byte sequence into its value without
/// checking continuation bits.
#[inline]
pub(crate) fn assemble(bytes: &[u8]) -> u32 {
    let len = bytes.len();
    let mut codepoint = u32::from(bytes[0]) & LEAD_MASK[len];
    for &byte in &bytes[1..] {
        codepoint = (codepoint << 6) | u32::from(byte & 0x3F);
    }
    codepoint
}

/// Range checks on a value assembled from a well-formed `len`-byte sequence.
#[inline]
pub(crate) fn validate(codepoint: u32, len: usize) -> Option<Malformed> {
    if codepoint < MIN_VALUE[len] {
        Some(Malformed::Overlong)
    } else if is_surrogate(codepoint) {
        Some(Malformed::Surrogate)
    } else if codepoint > MAX_CODEPOINT {
        Some(Malformed::OutOfRange)
    } else {
        None
    }
}

/// One decoded (or rejected) sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoded {
    /// The decoded value. On error this is still the folded payload (the raw
    /// byte for an invalid lead) and must not be treated as a scalar value.
    pub codepoint: u32,
    /// Bytes consumed, `1..=4`.
    pub len: usize,
    pub error: Option<Malformed>,
}

impl Decoded {
    #[inline]
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// The decoded `char`, or `None` for a malformed sequence.
    #[must_use]
    pub fn to_char(&self) -> Option<char> {
        match self.error {
            None => char::from_u32(self.codepoint),
            Some(_) => None,
        }
    }
}

/// Decodes the codepoint at the start of `bytes`.
///
/// Returns `None` only for an empty slice. The returned `len` is never zero
/// and never exceeds `bytes.len()`.
///
/// ```
/// use utf8dec::{Malformed, decode_one};
///
/// let d = decode_one("€".as_bytes()).unwrap();
/// assert_eq!((d.codepoint, d.len, d.error), (0x20AC, 3, None));
///
/// let d = decode_one(&[0xC0, 0x0A]).unwrap();
/// assert_eq!((d.len, d.error), (2, Some(Malformed::BadContinuation)));
/// ```
#[inline]
#[must_use]
pub fn decode_one(bytes: &[u8]) -> Option<Decoded> {
    let &lead = bytes.first()?;
    let declared = sequence_len(lead);
    if declared == 0 {
        return Some(Decoded {
            codepoint: u32::from(lead),
            len: 1,
            error: Some(Malformed::InvalidLead),
        });
    }

    let available = declared.min(bytes.len());
    let len = if available < declared {
        // Cut off by the end of input: keep only the continuation bytes.
        1 + bytes[1..available].iter().take_while(|&&b| is_continuation(b)).count()
    } else {
        declared
    };
    let mut codepoint = u32::from(lead) & LEAD_MASK[declared];
    let mut continuation_ok = true;
    for &byte in &bytes[1..len] {
        continuation_ok &= is_continuation(byte);
        codepoint = (codepoint << 6) | u32::from(byte & 0x3F);
    }
    // Missing trailing bytes contribute zero bits.
    codepoint <<= 6 * (declared - len);

    let error = if len < declared {
        Some(Malformed::Truncated)
    } else if !continuation_ok {
        Some(Malformed::BadContinuation)
    } else {
        validate(codepoint, declared)
    };
    Some(Decoded {
        codepoint,
        len,
        error,
    })
}

/// Iterator over every sequence in a slice, malformed ones included.
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    bytes: &'a [u8],
}

/// Decodes `bytes` front to back, yielding one [`Decoded`] per sequence.
#[must_use]
pub fn decode_all(bytes: &[u8]) -> Decoder<'_> {
    Decoder { bytes }
}

impl Iterator for Decoder<'_> {
    type Item = Decoded;

    #[inline]
    fn next(&mut self) -> Option<Decoded> {
        let decoded = decode_one(self.bytes)?;
        self.bytes = &self.bytes[decoded.len..];
        Some(decoded)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.bytes.len().div_ceil(4), Some(self.bytes.len()))
    }
}

impl core::iter::FusedIterator for Decoder<'_> {}
