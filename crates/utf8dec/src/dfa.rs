//! Björn Höhrmann's streaming DFA decoder, kept as a comparison baseline.
//!
//! One byte per step; the state and partial codepoint live with the caller.
//! It is not part of the correctness contract and recovers from errors
//! differently from [`decode_one`](crate::decode_one): after a reject it
//! restarts at the next byte.
//!
//! Tables from <https://bjoern.hoehrmann.de/utf-8/decoder/dfa/>, with the
//! accept/reject states swapped so that rejection is the all-zero row.

/// Byte classes.
#[rustfmt::skip]
static CLASSES: [u8; 256] = [
     0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,  0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,
     0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,  0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,
     0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,  0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,
     0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,  0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,
     1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,  9,9,9,9,9,9,9,9,9,9,9,9,9,9,9,9,
     7,7,7,7,7,7,7,7,7,7,7,7,7,7,7,7,  7,7,7,7,7,7,7,7,7,7,7,7,7,7,7,7,
     8,8,2,2,2,2,2,2,2,2,2,2,2,2,2,2,  2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,
    10,3,3,3,3,3,3,3,3,3,3,3,3,4,3,3, 11,6,6,6,5,8,8,8,8,8,8,8,8,8,8,8,
];

/// Transitions, indexed by `state + class`; states are pre-multiplied by 12.
#[rustfmt::skip]
static TRANSITIONS: [u8; 108] = [
     0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    12, 0,24,36,60,96,84, 0, 0, 0,48,72,
     0,12, 0, 0, 0, 0, 0,12, 0,12, 0, 0,
     0,24, 0, 0, 0, 0, 0,24, 0,24, 0, 0,
     0, 0, 0, 0, 0, 0, 0,24, 0, 0, 0, 0,
     0,24, 0, 0, 0, 0, 0, 0, 0,24, 0, 0,
     0, 0, 0, 0, 0, 0, 0,36, 0,36, 0, 0,
     0,36, 0, 0, 0, 0, 0,36, 0,36, 0, 0,
     0,36, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
];

pub const ACCEPT: u8 = 12;
pub const REJECT: u8 = 0;

/// Advances the automaton by one byte and returns the new state.
///
/// `codepoint` is complete whenever the returned state is [`ACCEPT`].
#[inline]
pub fn step(state: &mut u8, codepoint: &mut u32, byte: u8) -> u8 {
    let class = CLASSES[byte as usize];
    *codepoint = if *state == ACCEPT {
        (0xFF >> class) & u32::from(byte)
    } else {
        u32::from(byte & 0x3F) | (*codepoint << 6)
    };
    *state = TRANSITIONS[(*state + class) as usize];
    *state
}

/// What one byte did to a [`Dfa`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Accept(u32),
    Pending,
    Reject,
}

/// Owned automaton state.
#[derive(Debug, Clone, Copy)]
pub struct Dfa {
    state: u8,
    codepoint: u32,
}

impl Default for Dfa {
    fn default() -> Self {
        Self::new()
    }
}

impl Dfa {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: ACCEPT,
            codepoint: 0,
        }
    }

    #[inline]
    pub fn feed(&mut self, byte: u8) -> Transition {
        match step(&mut self.state, &mut self.codepoint, byte) {
            ACCEPT => Transition::Accept(self.codepoint),
            REJECT => {
                self.state = ACCEPT;
                Transition::Reject
            }
            _ => Transition::Pending,
        }
    }

    /// Whether the automaton is between sequences.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        self.state == ACCEPT
    }
}

/// Iterator over the accepts and rejects of a slice. A sequence cut off by
/// the end of the slice yields one final reject.
#[derive(Debug, Clone)]
pub struct DfaDecoder<'a> {
    bytes: core::slice::Iter<'a, u8>,
    dfa: Dfa,
}

impl<'a> DfaDecoder<'a> {
    #[must_use]
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes: bytes.iter(),
            dfa: Dfa::new(),
        }
    }
}

impl Iterator for DfaDecoder<'_> {
    type Item = Transition;

    #[inline]
    fn next(&mut self) -> Option<Transition> {
        for &byte in self.bytes.by_ref() {
            match self.dfa.feed(byte) {
                Transition::Pending => {}
                done => return Some(done),
            }
        }
        if self.dfa.is_idle() {
            None
        } else {
            self.dfa = Dfa::new();
            Some(Transition::Reject)
        }
    }
}

impl core::iter::FusedIterator for DfaDecoder<'_> {}

/// Counts of a full pass over a buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub codepoints: usize,
    pub rejects: usize,
}

/// Runs the automaton over `bytes`. A sequence cut off by the end of the
/// buffer counts as one reject.
#[must_use]
pub fn tally(bytes: &[u8]) -> Tally {
    let mut tally = Tally::default();
    for transition in DfaDecoder::new(bytes) {
        match transition {
            Transition::Accept(_) => tally.codepoints += 1,
            Transition::Reject => tally.rejects += 1,
            Transition::Pending => {}
        }
    }
    tally
}

#[cfg(test)]
mod tests {
    use std::vec::Vec;

    use super::*;

    fn accepted(bytes: &[u8]) -> Vec<u32> {
        DfaDecoder::new(bytes)
            .filter_map(|t| match t {
                Transition::Accept(c) => Some(c),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn decodes_every_length() {
        let text = "a\u{E9}\u{20AC}\u{1F600}";
        let expected: Vec<u32> = text.chars().map(u32::from).collect();
        assert_eq!(accepted(text.as_bytes()), expected);
    }

    #[test]
    fn rejects_malformed() {
        for bad in [
            &[0xFF][..],
            &[0x80],
            &[0xC0, 0x80],
            &[0xE0, 0x80, 0x80],
            &[0xED, 0xA0, 0x80],
            &[0xF4, 0x90, 0x80, 0x80],
        ] {
            assert_eq!(tally(bad).codepoints, 0, "{bad:02x?}");
            assert!(tally(bad).rejects >= 1, "{bad:02x?}");
        }
    }

    #[test]
    fn truncated_tail_counts_once() {
        assert_eq!(tally(b"ab\xE2\x82"), Tally { codepoints: 2, rejects: 1 });
    }

    #[test]
    fn restarts_after_reject() {
        let transitions: Vec<_> = DfaDecoder::new(b"\xFFa\xC3\xA9").collect();
        assert_eq!(
            transitions,
            [Transition::Reject, Transition::Accept(0x61), Transition::Accept(0xE9)]
        );
    }
}
