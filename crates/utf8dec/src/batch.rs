use alloc::vec::Vec;

use crate::{Input, Malformed, Output, decode_one};

/// Outcome of one [`BatchDecoder::decode_batch`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    /// `n > 0` codepoints were appended to the output.
    Decoded(usize),
    /// Nothing could be decoded: the input is empty, the output is full, or
    /// (for vectorized cores) the rest of the input is inside the lookahead
    /// margin.
    Stopped,
    /// The sequence at the cursor is malformed. It has been consumed exactly
    /// as [`decode_one`] would and nothing was written.
    Malformed(Malformed),
}

impl Step {
    #[inline]
    pub(crate) const fn from_produced(n: usize) -> Self {
        if n > 0 { Step::Decoded(n) } else { Step::Stopped }
    }

    /// The conventional integer status: the count on progress, `0` when
    /// stopped, `-1` on a malformed sequence.
    #[must_use]
    pub const fn to_raw(self) -> i64 {
        match self {
            #[allow(clippy::cast_possible_wrap)]
            Step::Decoded(n) => n as i64,
            Step::Stopped => 0,
            Step::Malformed(_) => -1,
        }
    }

    #[must_use]
    pub const fn made_progress(self) -> bool {
        matches!(self, Step::Decoded(_))
    }
}

/// A strategy that decodes many codepoints per call.
///
/// Both cursors are advanced in place. Implementations must uphold:
///
/// - nothing is written past the output's capacity, and no more codepoints
///   are written than bytes consumed;
/// - a call that has already written codepoints stops *before* a malformed
///   sequence and returns [`Step::Decoded`]; the malformed sequence is
///   reported by the next call as [`Step::Malformed`];
/// - every codepoint written equals what [`decode_one`] yields at the same
///   offset.
///
/// A strategy may stop early, leaving bytes that it could have decoded, when
/// decoding them would need to read past a safe lookahead margin.
pub trait BatchDecoder {
    /// Short label used in reports.
    fn name(&self) -> &'static str;

    fn decode_batch(&self, input: &mut Input<'_>, output: &mut Output<'_>) -> Step;

    /// Continues a call that has already produced codepoints on behalf of a
    /// layered decoder: identical to [`decode_batch`](Self::decode_batch)
    /// except that a malformed sequence at the cursor is left unconsumed and
    /// reported as [`Step::Stopped`].
    fn resume_batch(&self, input: &mut Input<'_>, output: &mut Output<'_>) -> Step {
        match decode_one(input.remaining()) {
            Some(decoded) if !decoded.is_error() => self.decode_batch(input, output),
            _ => Step::Stopped,
        }
    }
}

impl<D: BatchDecoder + ?Sized> BatchDecoder for &D {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn decode_batch(&self, input: &mut Input<'_>, output: &mut Output<'_>) -> Step {
        (**self).decode_batch(input, output)
    }

    fn resume_batch(&self, input: &mut Input<'_>, output: &mut Output<'_>) -> Step {
        (**self).resume_batch(input, output)
    }
}

/// The reference batch decoder: [`decode_one`] in a loop.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScalarBatch;

impl BatchDecoder for ScalarBatch {
    fn name(&self) -> &'static str {
        "scalar"
    }

    fn decode_batch(&self, input: &mut Input<'_>, output: &mut Output<'_>) -> Step {
        let mut produced = 0usize;
        while !output.is_full() {
            let Some(decoded) = decode_one(input.remaining()) else {
                break;
            };
            if let Some(error) = decoded.error {
                if produced > 0 {
                    break;
                }
                input.advance(decoded.len);
                return Step::Malformed(error);
            }
            output.push(decoded.codepoint);
            input.advance(decoded.len);
            produced += 1;
        }
        Step::from_produced(produced)
    }
}

/// A fast decoder whose unfinished remainder is handed to a second decoder
/// within the same call.
///
/// The finisher sees the cursors where the fast decoder left them, that is
/// the remaining input and the remaining output capacity.
#[derive(Debug, Clone, Copy)]
pub struct Layered<F, R> {
    name: &'static str,
    fast: F,
    finish: R,
}

impl<F, R> Layered<F, R> {
    pub const fn new(name: &'static str, fast: F, finish: R) -> Self {
        Self { name, fast, finish }
    }
}

impl<F: BatchDecoder, R: BatchDecoder> BatchDecoder for Layered<F, R> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn decode_batch(&self, input: &mut Input<'_>, output: &mut Output<'_>) -> Step {
        match self.fast.decode_batch(input, output) {
            Step::Stopped => self.finish.decode_batch(input, output),
            Step::Decoded(n) => match self.finish.resume_batch(input, output) {
                Step::Decoded(m) => Step::Decoded(n + m),
                Step::Stopped | Step::Malformed(_) => Step::Decoded(n),
            },
            malformed @ Step::Malformed(_) => malformed,
        }
    }
}

/// Everything a decoder produced when driven over a whole buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decoding {
    pub codepoints: Vec<u32>,
    /// Byte offset and kind of every malformed sequence, in input order.
    pub errors: Vec<(usize, Malformed)>,
    pub consumed: usize,
    /// The decoder stopped without reaching the end of the input.
    pub stalled: bool,
}

/// Drives `decoder` over `bytes` until the input is exhausted or the decoder
/// stops making progress.
pub fn decode_to_vec<D: BatchDecoder + ?Sized>(decoder: &D, bytes: &[u8]) -> Decoding {
    const SCRATCH: usize = 64;

    let mut decoding = Decoding {
        codepoints: Vec::with_capacity(bytes.len()),
        ..Decoding::default()
    };
    let mut scratch = [0u32; SCRATCH];
    let mut input = Input::new(bytes);
    while !input.is_empty() {
        let offset = input.consumed();
        let mut output = Output::new(&mut scratch);
        let step = decoder.decode_batch(&mut input, &mut output);
        decoding.codepoints.extend_from_slice(output.as_slice());
        match step {
            Step::Decoded(_) => {}
            Step::Malformed(error) => decoding.errors.push((offset, error)),
            Step::Stopped => {
                decoding.stalled = true;
                break;
            }
        }
    }
    decoding.consumed = input.consumed();
    decoding
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_stops_before_error_after_progress() {
        let bytes = b"ab\xFFc";
        let mut input = Input::new(bytes);
        let mut slots = [0u32; 8];
        let mut output = Output::new(&mut slots);
        assert_eq!(ScalarBatch.decode_batch(&mut input, &mut output), Step::Decoded(2));
        assert_eq!(input.consumed(), 2);

        let mut output = Output::new(&mut slots);
        assert_eq!(
            ScalarBatch.decode_batch(&mut input, &mut output),
            Step::Malformed(Malformed::InvalidLead)
        );
        assert_eq!(input.consumed(), 3);
        assert!(output.is_empty());
    }

    #[test]
    fn scalar_respects_capacity() {
        let mut input = Input::new(b"abcdef");
        let mut slots = [0u32; 4];
        let mut output = Output::new(&mut slots[..3]);
        assert_eq!(ScalarBatch.decode_batch(&mut input, &mut output), Step::Decoded(3));
        assert_eq!(input.consumed(), 3);
        assert_eq!(ScalarBatch.decode_batch(&mut input, &mut output), Step::Stopped);
        assert_eq!(slots[3], 0);
    }

    #[test]
    fn empty_input_stops() {
        let mut input = Input::new(b"");
        let mut slots = [0u32; 4];
        let mut output = Output::new(&mut slots);
        assert_eq!(ScalarBatch.decode_batch(&mut input, &mut output), Step::Stopped);
        assert_eq!(Step::Stopped.to_raw(), 0);
    }

    #[test]
    fn resume_leaves_malformed_sequence_in_place() {
        let mut input = Input::new(b"\xC0\x0Aabc");
        let mut slots = [0u32; 8];
        let mut output = Output::new(&mut slots);
        assert_eq!(ScalarBatch.resume_batch(&mut input, &mut output), Step::Stopped);
        assert_eq!(input.consumed(), 0);
    }

    #[test]
    fn decode_to_vec_records_error_offsets() {
        let decoding = decode_to_vec(&ScalarBatch, b"a\x80b\xED\xA0\x80");
        assert_eq!(decoding.codepoints, [u32::from(b'a'), u32::from(b'b')]);
        assert_eq!(
            decoding.errors,
            [(1, Malformed::InvalidLead), (3, Malformed::Surrogate)]
        );
        assert_eq!(decoding.consumed, 6);
        assert!(!decoding.stalled);
    }
}
