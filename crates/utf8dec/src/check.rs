//! Differential checking of batch decoders against the scalar reference.
//!
//! A target byte sequence is embedded in a 32-byte [`Carrier`] at one of
//! four slots, surrounded by filler sequences of every length, and both the
//! candidate and [`ScalarBatch`] decode the carrier in a single call. The
//! candidate may fall short of the reference by up to [`TAIL_TOLERANCE`]
//! bytes and codepoints (its lookahead margin); in the region both decoded,
//! and everywhere when it did not fall short, the results must be identical.

use alloc::boxed::Box;
use core::fmt;

use thiserror::Error;

use crate::{BatchDecoder, FixtureError, Input, Output, ScalarBatch, Step};

pub const CARRIER_LEN: usize = 32;
/// Slots in a carrier: one target and three fillers.
pub const SLOTS: usize = 4;
/// Largest shortfall (in bytes and in codepoints) tolerated at the tail.
pub const TAIL_TOLERANCE: usize = 16;
/// Longest target that fits next to three 4-byte fillers.
pub const MAX_TARGET_LEN: usize = CARRIER_LEN - (SLOTS - 1) * 4;

/// A well-formed sequence placed next to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Filler {
    Ascii,
    Two,
    Three,
    Four,
}

impl Filler {
    pub const ALL: [Filler; 4] = [Filler::Ascii, Filler::Two, Filler::Three, Filler::Four];

    #[must_use]
    pub const fn len(self) -> usize {
        match self {
            Filler::Ascii => 1,
            Filler::Two => 2,
            Filler::Three => 3,
            Filler::Four => 4,
        }
    }

    /// Writes the filler for `slot` at the start of `dst`; returns its length.
    #[allow(clippy::cast_possible_truncation)]
    fn write(self, slot: usize, dst: &mut [u8]) -> usize {
        let bytes: &[u8] = match self {
            Filler::Ascii => &[0x10 + slot as u8],
            Filler::Two => &[0xC2, 0x80],
            Filler::Three => &[0xE0, 0xA0, 0x80],
            Filler::Four => &[0xF0, 0x90, 0x80, 0x80],
        };
        dst[..bytes.len()].copy_from_slice(bytes);
        bytes.len()
    }
}

/// Every `(position, fillers)` pair: 4 slots × 4³ filler combinations.
pub fn layouts() -> impl Iterator<Item = (usize, [Filler; 3])> {
    (0..SLOTS).flat_map(|position| {
        (0..64).map(move |n| {
            let fillers = [
                Filler::ALL[n / 16],
                Filler::ALL[(n / 4) % 4],
                Filler::ALL[n % 4],
            ];
            (position, fillers)
        })
    })
}

/// A fixed-size buffer holding one target sequence among fillers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Carrier {
    bytes: [u8; CARRIER_LEN],
    filled: usize,
}

impl Carrier {
    /// Lays out the four slots in order, the target at `position` and the
    /// fillers in the other three, then pads byte `i` with `0x20 + i`.
    ///
    /// # Errors
    ///
    /// The target is longer than [`MAX_TARGET_LEN`] or `position` is not a
    /// slot.
    #[allow(clippy::cast_possible_truncation)]
    pub fn build(target: &[u8], position: usize, fillers: [Filler; 3]) -> Result<Self, FixtureError> {
        if target.len() > MAX_TARGET_LEN {
            return Err(FixtureError::TargetTooLong {
                len: target.len(),
                max: MAX_TARGET_LEN,
            });
        }
        if position >= SLOTS {
            return Err(FixtureError::PositionOutOfRange { position });
        }

        let mut bytes = [0u8; CARRIER_LEN];
        let mut at = 0;
        let mut fillers = fillers.into_iter();
        for slot in 0..SLOTS {
            if slot == position {
                bytes[at..at + target.len()].copy_from_slice(target);
                at += target.len();
            } else if let Some(filler) = fillers.next() {
                at += filler.write(slot, &mut bytes[at..]);
            }
        }
        for (i, byte) in bytes.iter_mut().enumerate().skip(at) {
            *byte = 0x20 + i as u8;
        }
        Ok(Self { bytes, filled: at })
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; CARRIER_LEN] {
        &self.bytes
    }

    /// Bytes occupied by the target and fillers; the rest is padding.
    #[must_use]
    pub const fn filled(&self) -> usize {
        self.filled
    }
}

/// One decoder call over a carrier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub step: Step,
    pub consumed: usize,
    pub produced: usize,
    output: [u32; CARRIER_LEN],
}

impl Run {
    /// Decodes `carrier` with a single call and an output as large as the
    /// carrier.
    pub fn of<D: BatchDecoder + ?Sized>(decoder: &D, carrier: &Carrier) -> Self {
        let mut output = [0u32; CARRIER_LEN];
        let mut input = Input::new(&carrier.bytes);
        let mut out = Output::new(&mut output);
        let step = decoder.decode_batch(&mut input, &mut out);
        let produced = out.len();
        Self {
            step,
            consumed: input.consumed(),
            produced,
            output,
        }
    }

    #[must_use]
    pub fn codepoints(&self) -> &[u32] {
        &self.output[..self.produced]
    }
}

/// How a candidate agreed with the reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Agreement {
    Exact,
    /// The candidate stopped short by this much; the common prefix matched.
    Truncated { bytes: usize, codepoints: usize },
}

fn compare(reference: &Run, candidate: &Run) -> Option<Agreement> {
    let short_bytes = reference.consumed.checked_sub(candidate.consumed);
    let short_codepoints = reference.produced.checked_sub(candidate.produced);
    if let (Some(bytes), Some(codepoints)) = (short_bytes, short_codepoints) {
        if (bytes, codepoints) != (0, 0) && bytes <= TAIL_TOLERANCE && codepoints <= TAIL_TOLERANCE {
            let common = &reference.codepoints()[..candidate.produced];
            return (common == candidate.codepoints()).then_some(Agreement::Truncated { bytes, codepoints });
        }
    }

    let exact = reference.step == candidate.step
        && reference.consumed == candidate.consumed
        && reference.produced == candidate.produced
        && reference.codepoints() == candidate.codepoints();
    exact.then_some(Agreement::Exact)
}

/// A candidate disagreed with the reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub strategy: &'static str,
    pub carrier: Carrier,
    pub reference: Run,
    pub candidate: Run,
}

impl Mismatch {
    /// Index of the first codepoint that differs, or where one output ends
    /// early.
    #[must_use]
    pub fn first_difference(&self) -> Option<usize> {
        let (r, c) = (self.reference.codepoints(), self.candidate.codepoints());
        r.iter()
            .zip(c)
            .position(|(a, b)| a != b)
            .or_else(|| (r.len() != c.len()).then(|| r.len().min(c.len())))
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.strategy;
        let (r, c) = (&self.reference, &self.candidate);
        writeln!(f, "{name} disagrees with scalar on:")?;
        for (i, byte) in self.carrier.as_bytes().iter().enumerate() {
            let sep = if i == 0 { "\t" } else { " " };
            write!(f, "{sep}{byte:02x}")?;
        }
        writeln!(f)?;
        writeln!(f, "return values: scalar={} {name}={}", r.step.to_raw(), c.step.to_raw())?;
        writeln!(f, "bytes consumed: scalar={} {name}={}", r.consumed, c.consumed)?;
        writeln!(f, "codepoints produced: scalar={} {name}={}", r.produced, c.produced)?;
        if let Some(index) = self.first_difference() {
            writeln!(f, "outputs differ at codepoint {index}:")?;
        }
        write!(f, "scalar:")?;
        for cp in r.codepoints() {
            write!(f, " U+{cp:04X}")?;
        }
        writeln!(f)?;
        write!(f, "{name}:")?;
        for cp in c.codepoints() {
            write!(f, " U+{cp:04X}")?;
        }
        Ok(())
    }
}

impl core::error::Error for Mismatch {}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckError {
    #[error(transparent)]
    Fixture(#[from] FixtureError),
    #[error(transparent)]
    Mismatch(#[from] Box<Mismatch>),
}

/// Checks one carrier.
///
/// On mismatch the candidate is run a second time on the same carrier before
/// returning, so a breakpoint in the candidate lands on the failing input.
///
/// # Errors
///
/// The candidate's result is not the reference's (up to the tail tolerance).
pub fn check_once<D: BatchDecoder + ?Sized>(candidate: &D, carrier: &Carrier) -> Result<Agreement, Box<Mismatch>> {
    let reference = Run::of(&ScalarBatch, carrier);
    let run = Run::of(candidate, carrier);
    if let Some(agreement) = compare(&reference, &run) {
        return Ok(agreement);
    }

    tracing::warn!(
        strategy = candidate.name(),
        consumed = run.consumed,
        expected = reference.consumed,
        "batch decoder disagrees with the scalar reference"
    );
    core::hint::black_box(Run::of(candidate, carrier));
    Err(Box::new(Mismatch {
        strategy: candidate.name(),
        carrier: carrier.clone(),
        reference,
        candidate: run,
    }))
}

/// Totals over the carriers checked for one target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Coverage {
    pub carriers: usize,
    /// Carriers where the candidate stopped inside the tail tolerance.
    pub truncated: usize,
}

/// Checks `target` in every slot against every filler combination.
///
/// # Errors
///
/// The target does not fit a carrier, or the first mismatch found.
pub fn check_all<D: BatchDecoder + ?Sized>(candidate: &D, target: &[u8]) -> Result<Coverage, CheckError> {
    let mut coverage = Coverage::default();
    for (position, fillers) in layouts() {
        let carrier = Carrier::build(target, position, fillers)?;
        if let Agreement::Truncated { .. } = check_once(candidate, &carrier)? {
            coverage.truncated += 1;
        }
        coverage.carriers += 1;
    }
    tracing::trace!(strategy = candidate.name(), ?coverage, "target checked");
    Ok(coverage)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carrier_layout() {
        let carrier = Carrier::build(&[0xFF], 1, [Filler::Ascii, Filler::Two, Filler::Four]).unwrap();
        let bytes = carrier.as_bytes();
        assert_eq!(bytes[..8], [0x10, 0xFF, 0xC2, 0x80, 0xF0, 0x90, 0x80, 0x80]);
        assert_eq!(carrier.filled(), 8);
        assert_eq!(bytes[8], 0x28);
        assert_eq!(bytes[31], 0x3F);
    }

    #[test]
    fn ascii_filler_is_tagged_by_slot() {
        let carrier = Carrier::build(b"", 0, [Filler::Ascii; 3]).unwrap();
        assert_eq!(carrier.as_bytes()[..3], [0x11, 0x12, 0x13]);
    }

    #[test]
    fn rejects_oversized_target() {
        let target = [b'a'; MAX_TARGET_LEN + 1];
        assert_eq!(
            Carrier::build(&target, 0, [Filler::Four; 3]),
            Err(FixtureError::TargetTooLong { len: 21, max: 20 })
        );
        assert_eq!(
            Carrier::build(b"a", 4, [Filler::Four; 3]),
            Err(FixtureError::PositionOutOfRange { position: 4 })
        );
    }

    #[test]
    fn layouts_are_exhaustive() {
        let all: std::vec::Vec<_> = layouts().collect();
        assert_eq!(all.len(), SLOTS * 64);
        let unique: std::collections::BTreeSet<_> = all
            .iter()
            .map(|(p, f)| (*p, f.map(Filler::len)))
            .collect();
        assert_eq!(unique.len(), all.len());
    }

    #[test]
    fn reference_agrees_with_itself() {
        assert_eq!(
            check_all(&ScalarBatch, &[0xE0, 0x80, 0xA4]),
            Ok(Coverage { carriers: 256, truncated: 0 })
        );
    }
}
