use alloc::string::String;

use thiserror::Error;

/// The way a byte sequence failed to decode.
///
/// Every variant is recoverable: the decoder always reports how many bytes
/// the malformed sequence occupied so decoding can resume after it.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Malformed {
    /// A continuation byte or `0xF8..=0xFF` where a sequence must start.
    #[error("invalid lead byte")]
    InvalidLead,
    /// The input ended before the sequence declared by the lead byte.
    #[error("truncated sequence")]
    Truncated,
    /// A byte inside the declared sequence is not `0b10xx_xxxx`.
    #[error("invalid continuation byte")]
    BadContinuation,
    /// The value has a shorter encoding.
    #[error("overlong encoding")]
    Overlong,
    /// The value is a UTF-16 surrogate half.
    #[error("surrogate half")]
    Surrogate,
    /// The value is above U+10FFFF.
    #[error("codepoint out of range")]
    OutOfRange,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FixtureError {
    #[error("target of {len} bytes does not fit a carrier (max {max})")]
    TargetTooLong { len: usize, max: usize },
    #[error("slot {position} is out of range")]
    PositionOutOfRange { position: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown strategy '{0}'")]
pub struct UnknownStrategy(pub String);
