use alloc::{string::String, vec::Vec};

use quickcheck::QuickCheck;

use super::arbitrary::{Scalar, Soup};
use crate::{decode_all, decode_one, encode_to_vec, encoded_len};

fn tests() -> u64 {
    #[cfg(not(feature = "test-fast"))]
    let tests = if is_ci::cached() { 10_000 } else { 1_000 };
    #[cfg(feature = "test-fast")]
    let tests = 10;
    tests
}

#[test]
fn encode_then_decode_quickcheck() {
    fn prop(scalar: Scalar) -> bool {
        let mut bytes = Vec::new();
        let len = encode_to_vec(scalar.0, &mut bytes);
        let Some(decoded) = decode_one(&bytes) else {
            return false;
        };
        len == encoded_len(scalar.0)
            && decoded.error.is_none()
            && decoded.len == len
            && decoded.codepoint == scalar.0
    }

    QuickCheck::new()
        .tests(tests())
        .quickcheck(prop as fn(Scalar) -> bool);
}

#[test]
fn valid_text_decodes_to_its_chars_quickcheck() {
    fn prop(text: String) -> bool {
        decode_all(text.as_bytes())
            .map(|d| d.to_char())
            .eq(text.chars().map(Some))
    }

    QuickCheck::new()
        .tests(tests())
        .quickcheck(prop as fn(String) -> bool);
}

/// Validity agrees with `bstr` at every sequence boundary, and recovery never
/// consumes less than `bstr`'s maximal invalid prefix.
#[test]
fn agrees_with_bstr_quickcheck() {
    fn prop(soup: Soup) -> bool {
        let mut rest = soup.0.as_slice();
        while let Some(decoded) = decode_one(rest) {
            let (ch, size) = bstr::decode_utf8(rest);
            let consistent = match (decoded.to_char(), ch) {
                (Some(a), Some(b)) => a == b && decoded.len == size,
                (None, None) => decoded.len >= size,
                _ => false,
            };
            if !consistent {
                return false;
            }
            rest = &rest[decoded.len..];
        }
        true
    }

    QuickCheck::new()
        .tests(tests())
        .quickcheck(prop as fn(Soup) -> bool);
}

#[test]
fn lengths_cover_the_input_quickcheck() {
    fn prop(bytes: Vec<u8>) -> bool {
        decode_all(&bytes).map(|d| d.len).sum::<usize>() == bytes.len()
            && decode_all(&bytes).all(|d| (1..=4).contains(&d.len))
    }

    QuickCheck::new()
        .tests(tests())
        .quickcheck(prop as fn(Vec<u8>) -> bool);
}

#[quickcheck_macros::quickcheck]
fn encoded_len_matches_char(c: char) -> bool {
    encoded_len(u32::from(c)) == c.len_utf8()
}
