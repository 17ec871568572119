use alloc::string::ToString;
use core::{fmt, str::FromStr};

use crate::{BatchDecoder, Layered, ScalarBatch, SwarCore, UnknownStrategy};
#[cfg(target_arch = "x86_64")]
use crate::Sse2Core;

static SCALAR: ScalarBatch = ScalarBatch;
static SWAR_CORE: SwarCore = SwarCore::new();
static SWAR: Layered<SwarCore, ScalarBatch> = Layered::new("swar", SwarCore::new(), ScalarBatch);
#[cfg(target_arch = "x86_64")]
static SSE2_CORE: Sse2Core = Sse2Core::new();
#[cfg(target_arch = "x86_64")]
static SSE2: Layered<Sse2Core, ScalarBatch> = Layered::new("sse2", Sse2Core::new(), ScalarBatch);

/// The batch decoders this build provides, selectable by name.
///
/// Cores (`*-core`) may stop inside the lookahead margin at the end of a
/// buffer; every other strategy always makes progress on non-empty input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    Scalar,
    SwarCore,
    Swar,
    #[cfg(target_arch = "x86_64")]
    Sse2Core,
    #[cfg(target_arch = "x86_64")]
    Sse2,
}

#[cfg(target_arch = "x86_64")]
const AVAILABLE: &[Strategy] = &[
    Strategy::Scalar,
    Strategy::SwarCore,
    Strategy::Swar,
    Strategy::Sse2Core,
    Strategy::Sse2,
];
#[cfg(not(target_arch = "x86_64"))]
const AVAILABLE: &[Strategy] = &[Strategy::Scalar, Strategy::SwarCore, Strategy::Swar];

impl Strategy {
    #[must_use]
    pub const fn available() -> &'static [Strategy] {
        AVAILABLE
    }

    /// The fastest complete strategy on this target.
    #[must_use]
    pub const fn preferred() -> Strategy {
        #[cfg(target_arch = "x86_64")]
        {
            Strategy::Sse2
        }
        #[cfg(not(target_arch = "x86_64"))]
        {
            Strategy::Swar
        }
    }

    #[must_use]
    pub fn decoder(self) -> &'static dyn BatchDecoder {
        match self {
            Strategy::Scalar => &SCALAR,
            Strategy::SwarCore => &SWAR_CORE,
            Strategy::Swar => &SWAR,
            #[cfg(target_arch = "x86_64")]
            Strategy::Sse2Core => &SSE2_CORE,
            #[cfg(target_arch = "x86_64")]
            Strategy::Sse2 => &SSE2,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        self.decoder().name()
    }

    /// Whether the strategy may stall with input left over.
    #[must_use]
    pub const fn is_core(self) -> bool {
        match self {
            Strategy::SwarCore => true,
            #[cfg(target_arch = "x86_64")]
            Strategy::Sse2Core => true,
            _ => false,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AVAILABLE
            .iter()
            .copied()
            .find(|strategy| strategy.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownStrategy(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for &strategy in Strategy::available() {
            assert_eq!(strategy.name().parse::<Strategy>(), Ok(strategy));
        }
        assert_eq!(
            "avx512".parse::<Strategy>(),
            Err(UnknownStrategy("avx512".into()))
        );
    }

    #[test]
    fn preferred_is_complete() {
        assert!(!Strategy::preferred().is_core());
        assert!(Strategy::available().contains(&Strategy::preferred()));
    }
}
