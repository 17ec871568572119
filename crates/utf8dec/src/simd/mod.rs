//! Vectorized batch decoding.
//!
//! A [`Core`] walks the input in 16-byte windows. Each window is classified
//! in one go by a [`Lanes`] backend into two bitmasks (non-ASCII lanes and
//! continuation lanes). Pure ASCII windows are widened wholesale; mixed
//! windows are decoded sequence by sequence, with continuation checks done
//! against the mask instead of per byte.
//!
//! A core never reads a window unless 16 input bytes remain and never decodes
//! into the output unless 16 slots remain. It therefore stalls near the tail
//! of a buffer; [`Swar`](crate::Strategy::Swar) and friends layer the scalar
//! decoder behind the core to finish the job.

mod swar;
#[cfg(target_arch = "x86_64")]
mod sse2;

use core::marker::PhantomData;

pub use swar::Swar;
#[cfg(target_arch = "x86_64")]
pub use sse2::Sse2;

use crate::{
    BatchDecoder, Input, Output, Step, decode_one,
    scalar::{assemble, sequence_len, validate},
};

/// Window width in bytes, and the lookahead margin of every core.
pub const LANES: usize = 16;

/// Per-window lane masks; bit `i` describes byte `i` of the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classes {
    /// Bytes `>= 0x80`.
    pub non_ascii: u16,
    /// Bytes in `0x80..=0xBF`.
    pub continuation: u16,
}

/// Window classification backend.
pub trait Lanes {
    /// Label of the core built on this backend.
    const NAME: &'static str;

    fn classify(window: &[u8; LANES]) -> Classes;

    /// Zero-extends every byte of an ASCII window.
    #[inline]
    fn widen(window: &[u8; LANES], out: &mut [u32; LANES]) {
        for (slot, &byte) in out.iter_mut().zip(window) {
            *slot = u32::from(byte);
        }
    }
}

/// Vectorized decoder core over a [`Lanes`] backend.
pub struct Core<L>(PhantomData<L>);

impl<L> Core<L> {
    #[must_use]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<L> Default for Core<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L> Clone for Core<L> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<L> Copy for Core<L> {}

impl<L: Lanes> core::fmt::Debug for Core<L> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(L::NAME)
    }
}

pub type SwarCore = Core<Swar>;
#[cfg(target_arch = "x86_64")]
pub type Sse2Core = Core<Sse2>;

/// Where decoding of one window ended.
struct WindowEnd {
    consumed: usize,
    written: usize,
    /// Decoding stopped in front of a malformed sequence at `consumed`.
    malformed: bool,
}

/// Decodes the sequences that lie entirely inside a mixed window.
///
/// A sequence that runs past the window is left for the next window.
#[inline]
fn decode_window(window: &[u8; LANES], classes: Classes, out: &mut [u32; LANES]) -> WindowEnd {
    let non_ascii = u32::from(classes.non_ascii);
    let continuation = u32::from(classes.continuation);

    // ASCII prefix straight from the mask.
    let prefix = (non_ascii.trailing_zeros() as usize).min(LANES);
    for (slot, &byte) in out.iter_mut().zip(&window[..prefix]) {
        *slot = u32::from(byte);
    }

    let mut pos = prefix;
    let mut written = prefix;
    while pos < LANES {
        let lead = window[pos];
        if non_ascii & (1 << pos) == 0 {
            out[written] = u32::from(lead);
            pos += 1;
            written += 1;
            continue;
        }

        let len = sequence_len(lead);
        if len == 0 {
            return WindowEnd { consumed: pos, written, malformed: true };
        }
        if pos + len > LANES {
            break;
        }
        let tail = ((1u32 << (len - 1)) - 1) << (pos + 1);
        if continuation & tail != tail {
            return WindowEnd { consumed: pos, written, malformed: true };
        }
        let codepoint = assemble(&window[pos..pos + len]);
        if validate(codepoint, len).is_some() {
            return WindowEnd { consumed: pos, written, malformed: true };
        }
        out[written] = codepoint;
        pos += len;
        written += 1;
    }
    WindowEnd { consumed: pos, written, malformed: false }
}

impl<L: Lanes> BatchDecoder for Core<L> {
    fn name(&self) -> &'static str {
        L::NAME
    }

    fn decode_batch(&self, input: &mut Input<'_>, output: &mut Output<'_>) -> Step {
        let mut produced = 0usize;
        let mut malformed = false;
        loop {
            let Some(window) = input.remaining().first_chunk::<LANES>() else {
                break;
            };
            let Some(slots) = output.spare_mut().first_chunk_mut::<LANES>() else {
                break;
            };

            let classes = L::classify(window);
            if classes.non_ascii == 0 {
                L::widen(window, slots);
                output.commit(LANES);
                input.advance(LANES);
                produced += LANES;
                continue;
            }

            let end = decode_window(window, classes, slots);
            output.commit(end.written);
            input.advance(end.consumed);
            produced += end.written;
            if end.malformed {
                malformed = true;
                break;
            }
        }

        if malformed && produced == 0 {
            // Same recovery as the scalar reference; the full remaining input
            // is visible here, not just the window.
            if let Some(decoded) = decode_one(input.remaining()) {
                if let Some(error) = decoded.error {
                    input.advance(decoded.len);
                    return Step::Malformed(error);
                }
            }
        }
        Step::from_produced(produced)
    }
}
