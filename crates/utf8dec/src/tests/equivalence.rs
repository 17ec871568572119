use alloc::{
    string::{String, ToString},
    vec::Vec,
};

use insta::assert_snapshot;
use rstest::rstest;

use crate::{
    BatchDecoder, FixtureError, Input, Malformed, Output, Step, Strategy, SwarCore, decode_one,
    check::{Agreement, Carrier, CheckError, Filler, MAX_TARGET_LEN, check_all, check_once},
};

#[rstest]
#[case::invalid_lead(&[0xFF])]
#[case::lone_continuation(&[0x80])]
#[case::bad_continuation(&[0xC0, 0x0A])]
#[case::overlong_two(&[0xC0, 0xA4])]
#[case::overlong_three(&[0xE0, 0x80, 0xA4])]
#[case::overlong_four(&[0xF0, 0x80, 0x80, 0xA4])]
#[case::surrogate(&[0xED, 0xA0, 0x80])]
#[case::out_of_range(&[0xF4, 0x90, 0x80, 0x80])]
#[case::cut_short(&[0xE2, 0x82])]
#[case::valid_euro("€".as_bytes())]
#[case::valid_mixed("a\u{E9}\u{20AC}\u{1F600}\u{10FFFF}".as_bytes())]
#[case::longest(&[0xF0, 0x9F, 0x98, 0x80, 0xFF, 0xED, 0xBF, 0xBF, 0xC2, 0x80, 0xE0, 0x80, 0x80, 0x41, 0xF4, 0x8F, 0xBF, 0xBF, 0xC0, 0x0A])]
fn every_strategy_agrees(#[case] target: &[u8]) {
    for &strategy in Strategy::available() {
        let coverage = check_all(strategy.decoder(), target)
            .unwrap_or_else(|e| panic!("{strategy}: {e}"));
        assert_eq!(coverage.carriers, 256);
        if !strategy.is_core() {
            assert_eq!(coverage.truncated, 0, "{strategy}");
        }
    }
}

#[test]
fn oversized_target_is_a_fixture_error() {
    let target = [b'x'; MAX_TARGET_LEN + 1];
    assert_eq!(
        check_all(Strategy::preferred().decoder(), &target),
        Err(CheckError::Fixture(FixtureError::TargetTooLong { len: 21, max: 20 }))
    );
}

#[test]
fn core_shortfall_is_tolerated() {
    // The emoji straddles the first window, so the second window ends two
    // bytes before the carrier does.
    let carrier = Carrier::build("ab\u{1F600}".as_bytes(), 3, [Filler::Four; 3]).unwrap();
    let agreement = check_once(&SwarCore::new(), &carrier).unwrap();
    assert_eq!(agreement, Agreement::Truncated { bytes: 2, codepoints: 2 });
    assert_eq!(check_once(Strategy::Swar.decoder(), &carrier), Ok(Agreement::Exact));
}

/// Emits surrogate halves as if they were scalar values.
struct LetsSurrogatesThrough;

impl BatchDecoder for LetsSurrogatesThrough {
    fn name(&self) -> &'static str {
        "broken"
    }

    fn decode_batch(&self, input: &mut Input<'_>, output: &mut Output<'_>) -> Step {
        let mut produced = 0;
        while !output.is_full() {
            let Some(decoded) = decode_one(input.remaining()) else {
                break;
            };
            match decoded.error {
                None | Some(Malformed::Surrogate) => {}
                Some(error) => {
                    if produced > 0 {
                        break;
                    }
                    input.advance(decoded.len);
                    return Step::Malformed(error);
                }
            }
            output.push(decoded.codepoint);
            input.advance(decoded.len);
            produced += 1;
        }
        Step::from_produced(produced)
    }
}

#[test]
fn mismatch_report() {
    let carrier = Carrier::build(&[0xED, 0xA0, 0x80], 0, [Filler::Ascii; 3]).unwrap();
    let mismatch = check_once(&LetsSurrogatesThrough, &carrier).unwrap_err();
    assert_eq!(mismatch.first_difference(), Some(0));

    let report = mismatch.to_string();
    assert_eq!(report.lines().nth(1).map(|l| l.starts_with('\t')), Some(true));
    let report: Vec<&str> = report.lines().map(str::trim_start).collect();
    assert_snapshot!(report.join("\n"), @r"
    broken disagrees with scalar on:
    ed a0 80 11 12 13 26 27 28 29 2a 2b 2c 2d 2e 2f 30 31 32 33 34 35 36 37 38 39 3a 3b 3c 3d 3e 3f
    return values: scalar=-1 broken=30
    bytes consumed: scalar=3 broken=32
    codepoints produced: scalar=0 broken=30
    outputs differ at codepoint 0:
    scalar:
    broken: U+D800 U+0011 U+0012 U+0013 U+0026 U+0027 U+0028 U+0029 U+002A U+002B U+002C U+002D U+002E U+002F U+0030 U+0031 U+0032 U+0033 U+0034 U+0035 U+0036 U+0037 U+0038 U+0039 U+003A U+003B U+003C U+003D U+003E U+003F
    ");
}

#[test]
fn check_error_displays_the_mismatch() {
    let carrier = Carrier::build(&[0xED, 0xBF, 0xBF], 2, [Filler::Two; 3]).unwrap();
    let mismatch = check_once(&LetsSurrogatesThrough, &carrier).unwrap_err();
    let expected: String = mismatch.to_string();
    assert_eq!(CheckError::from(mismatch).to_string(), expected);
    assert!(matches!(
        check_all(&LetsSurrogatesThrough, &[0xED, 0xBF, 0xBF]),
        Err(CheckError::Mismatch(_))
    ));
}
