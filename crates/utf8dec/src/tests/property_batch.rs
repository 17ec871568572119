use alloc::vec::Vec;

use quickcheck::{QuickCheck, TestResult};

use super::arbitrary::Soup;
use crate::{
    BatchDecoder, Input, LANES, Layered, Malformed, Output, ScalarBatch, Step, Strategy, SwarCore,
    decode_to_vec,
};

fn tests() -> u64 {
    #[cfg(not(feature = "test-fast"))]
    let tests = if is_ci::cached() { 10_000 } else { 1_000 };
    #[cfg(feature = "test-fast")]
    let tests = 10;
    tests
}

#[test]
fn complete_strategies_match_scalar_quickcheck() {
    fn prop(soup: Soup) -> bool {
        let reference = decode_to_vec(&ScalarBatch, &soup.0);
        Strategy::available()
            .iter()
            .filter(|s| !s.is_core())
            .all(|s| decode_to_vec(s.decoder(), &soup.0) == reference)
    }

    QuickCheck::new()
        .tests(tests())
        .quickcheck(prop as fn(Soup) -> bool);
}

#[test]
fn cores_stall_only_in_the_margin_quickcheck() {
    fn prop(soup: Soup) -> bool {
        let reference = decode_to_vec(&ScalarBatch, &soup.0);
        Strategy::available().iter().filter(|s| s.is_core()).all(|s| {
            let core = decode_to_vec(s.decoder(), &soup.0);
            soup.0.len() - core.consumed < LANES
                && reference.codepoints.starts_with(&core.codepoints)
                && reference.errors.starts_with(&core.errors)
        })
    }

    QuickCheck::new()
        .tests(tests())
        .quickcheck(prop as fn(Soup) -> bool);
}

/// One call with room in the output always gets somewhere, and never writes
/// more codepoints than it consumed bytes.
#[test]
fn single_call_progress_quickcheck() {
    fn prop(soup: Soup, capacity: u8) -> TestResult {
        let capacity = usize::from(capacity % 40) + 1;
        if soup.0.is_empty() {
            return TestResult::discard();
        }
        let mut slots: Vec<u32> = alloc::vec![0; capacity];
        for strategy in Strategy::available().iter().filter(|s| !s.is_core()) {
            let mut input = Input::new(&soup.0);
            let mut output = Output::new(&mut slots);
            let step = strategy.decoder().decode_batch(&mut input, &mut output);
            let written = output.len();
            let ok = match step {
                Step::Decoded(n) => n == written && written <= input.consumed(),
                Step::Malformed(_) => written == 0 && input.consumed() > 0,
                Step::Stopped => false,
            };
            if !ok {
                return TestResult::error(alloc::format!("{strategy}: {step:?}"));
            }
        }
        TestResult::passed()
    }

    QuickCheck::new()
        .tests(tests())
        .quickcheck(prop as fn(Soup, u8) -> TestResult);
}

#[test]
fn finisher_gets_remaining_capacity() {
    let layered = Layered::new("test", SwarCore::new(), ScalarBatch);
    let bytes = [b'a'; 20];
    let mut slots = [0u32; 18];
    let mut input = Input::new(&bytes);
    let mut output = Output::new(&mut slots);
    assert_eq!(layered.decode_batch(&mut input, &mut output), Step::Decoded(18));
    assert_eq!(input.consumed(), 18);
    assert!(output.is_full());
}

#[test]
fn finisher_does_not_report_errors_after_progress() {
    let layered = Layered::new("test", SwarCore::new(), ScalarBatch);
    let mut bytes = [b'a'; 20];
    bytes[17] = 0xFF;
    let mut slots = [0u32; 32];
    let mut input = Input::new(&bytes);
    let mut output = Output::new(&mut slots);
    assert_eq!(layered.decode_batch(&mut input, &mut output), Step::Decoded(17));
    assert_eq!(input.consumed(), 17);

    let mut output = Output::new(&mut slots);
    assert_eq!(
        layered.decode_batch(&mut input, &mut output),
        Step::Malformed(Malformed::InvalidLead)
    );
    assert_eq!(input.consumed(), 18);
}

#[test]
fn fast_path_errors_pass_through() {
    let layered = Layered::new("test", SwarCore::new(), ScalarBatch);
    let mut bytes = [b'a'; 20];
    bytes[..3].copy_from_slice(&[0xE0, 0x80, 0xA4]);
    let mut slots = [0u32; 32];
    let mut input = Input::new(&bytes);
    let mut output = Output::new(&mut slots);
    assert_eq!(
        layered.decode_batch(&mut input, &mut output),
        Step::Malformed(Malformed::Overlong)
    );
    assert_eq!(input.consumed(), 3);
    assert_eq!(layered.name(), "test");
}
