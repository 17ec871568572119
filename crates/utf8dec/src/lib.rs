//! Branch-minimised scalar and vectorized batch UTF-8 decoding.
//!
//! [`decode_one`] is the semantic reference: it decodes exactly one codepoint
//! and recovers from every malformed sequence with a fixed, documented
//! consumption rule. Batch strategies implementing [`BatchDecoder`] decode many
//! codepoints per call and are checked against the reference by
//! [`check::check_all`].

#![no_std]
#![allow(missing_docs)]
extern crate alloc;

#[cfg(test)]
extern crate std;

mod batch;
mod cursor;
mod encode;
mod error;
mod scalar;
mod simd;
mod strategy;

pub mod check;
pub mod dfa;

#[cfg(test)]
mod tests;

pub use batch::{BatchDecoder, Decoding, Layered, ScalarBatch, Step, decode_to_vec};
pub use cursor::{Input, Output};
pub use encode::{MAX_ENCODABLE, encode, encode_to_vec, encode_with_len, encoded_len};
pub use error::{FixtureError, Malformed, UnknownStrategy};
pub use scalar::{Decoded, Decoder, decode_all, decode_one, is_surrogate};
pub use simd::{Classes, Core, LANES, Lanes, Swar, SwarCore};
#[cfg(target_arch = "x86_64")]
pub use simd::{Sse2, Sse2Core};
pub use strategy::Strategy;

/// The largest Unicode scalar value.
pub const MAX_CODEPOINT: u32 = 0x10_FFFF;
