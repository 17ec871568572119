//! The correctness driver: fixed categories of decoder checks, each reported
//! as one `PASS`/`FAIL` line, then a `N fail, M pass` summary.
//!
//! Category checks compare [`decode_one`] against expectations. Every
//! sequence they touch is additionally run through [`check_all`] for each
//! selected strategy; a disagreement there aborts the run with the mismatch
//! report instead of counting as a failure.

use std::{fmt, io::Write};

use utf8dec::{
    Decoded, MAX_CODEPOINT, Malformed, Strategy, check::check_all, decode_one, encode, encode_with_len,
    is_surrogate,
};

use crate::{CheckOptions, HarnessError};

/// Codepoints at which the encoded length or validity changes.
const BOUNDARIES: [u32; 12] = [
    0x7F, 0x80, 0x7FF, 0x800, 0xD7FF, 0xD800, 0xDFFF, 0xE000, 0xFFFF, 0x1_0000, 0x10_FFFF, 0x11_0000,
];

/// Final tally of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub pass: usize,
    pub fail: usize,
}

impl Summary {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.fail == 0
    }
}

/// Writes test lines and counts them.
pub struct Report<W> {
    out: W,
    summary: Summary,
}

impl<W: Write> Report<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            summary: Summary::default(),
        }
    }

    /// Records one check.
    ///
    /// # Errors
    ///
    /// Writing the line failed.
    pub fn test(&mut self, ok: bool, description: fmt::Arguments<'_>) -> std::io::Result<()> {
        if ok {
            self.summary.pass += 1;
        } else {
            self.summary.fail += 1;
        }
        writeln!(self.out, "{} {description}", if ok { "PASS" } else { "FAIL" })
    }

    /// Writes the summary line.
    ///
    /// # Errors
    ///
    /// Writing the line failed.
    pub fn finish(mut self) -> std::io::Result<Summary> {
        writeln!(self.out, "{} fail, {} pass", self.summary.fail, self.summary.pass)?;
        self.out.flush()?;
        Ok(self.summary)
    }
}

struct Checker<'a> {
    strategies: &'a [Strategy],
}

impl Checker<'_> {
    /// Runs `bytes` through every strategy, then decodes them with the
    /// reference.
    fn decode(&self, bytes: &[u8]) -> Result<Option<Decoded>, HarnessError> {
        for &strategy in self.strategies {
            check_all(strategy.decoder(), bytes)?;
        }
        Ok(decode_one(bytes))
    }
}

/// Runs every category and writes the report to `out`.
///
/// # Errors
///
/// A strategy disagreed with the reference, or the report could not be
/// written. Failed checks are not errors; see [`Summary::is_success`].
pub fn run<W: Write>(options: &CheckOptions, out: W) -> Result<Summary, HarnessError> {
    let checker = Checker {
        strategies: &options.strategies,
    };
    let mut report = Report::new(out);

    decode_all(&checker, options.stride, &mut report)?;
    surrogates(&checker, &mut report)?;
    overlong(&checker, &mut report)?;
    for (bytes, expected) in [(&[0xFF][..], 1), (&[0x80], 1), (&[0xC0, 0x0A], 2)] {
        expect_rejected(&checker, &mut report, "bogus", bytes, expected)?;
    }
    for (bytes, expected) in [(&[0xF4, 0x90, 0x80, 0x80][..], 4), (&[0xF7, 0xBF, 0xBF, 0xBF], 4)] {
        expect_rejected(&checker, &mut report, "out of range", bytes, expected)?;
    }
    for (bytes, expected) in [(&[0xE2, 0x82][..], 2), (&[0xF0, 0x9F, 0x98], 3)] {
        expect_rejected(&checker, &mut report, "truncated", bytes, expected)?;
    }

    Ok(report.finish()?)
}

fn decode_all<W: Write>(checker: &Checker<'_>, stride: u32, report: &mut Report<W>) -> Result<(), HarnessError> {
    let mut failures = 0u64;
    let mut buf = [0u8; 4];
    for c in (0..=MAX_CODEPOINT).filter(|&c| !is_surrogate(c)) {
        let len = encode(c, &mut buf);
        let decoded = if c.checked_rem(stride) == Some(0) || BOUNDARIES.contains(&c) {
            checker.decode(&buf[..len])?
        } else {
            decode_one(&buf[..len])
        };
        let ok = decoded.is_some_and(|d| d.len == len && d.codepoint == c && !d.is_error());
        failures += u64::from(!ok);
    }
    tracing::debug!(failures, stride, "decoded every scalar value");
    report.test(failures == 0, format_args!("decode all, errors: {failures}"))?;
    Ok(())
}

fn surrogates<W: Write>(checker: &Checker<'_>, report: &mut Report<W>) -> Result<(), HarnessError> {
    let mut failures = 0u64;
    let mut buf = [0u8; 4];
    for c in 0xD800..=0xDFFF {
        let len = encode(c, &mut buf);
        let decoded = checker.decode(&buf[..len])?;
        let ok = decoded.is_some_and(|d| d.error == Some(Malformed::Surrogate) && d.len == len);
        failures += u64::from(!ok);
    }
    tracing::debug!(failures, "checked surrogate halves");
    report.test(failures == 0, format_args!("surrogate halves, errors: {failures}"))?;
    Ok(())
}

/// `U+0024` in every longer-than-necessary form.
fn overlong<W: Write>(checker: &Checker<'_>, report: &mut Report<W>) -> Result<(), HarnessError> {
    let mut buf = [0u8; 4];
    for len in 2..=4 {
        let n = encode_with_len(u32::from(b'$'), len, &mut buf);
        let bytes = &buf[..n];
        let decoded = checker.decode(bytes)?;
        let error = decoded.and_then(|d| d.error);
        report.test(
            error == Some(Malformed::Overlong),
            format_args!("overlong len {len} [{}], {}", Hex(bytes), Flag(error)),
        )?;
        report.test(
            decoded.is_some_and(|d| d.len == len),
            format_args!("overlong recover {len}, U+{:04X}", decoded.map_or(0, |d| d.codepoint)),
        )?;
    }
    Ok(())
}

fn expect_rejected<W: Write>(
    checker: &Checker<'_>,
    report: &mut Report<W>,
    category: &str,
    bytes: &[u8],
    expected: usize,
) -> Result<(), HarnessError> {
    let decoded = checker.decode(bytes)?;
    let error = decoded.and_then(|d| d.error);
    let (codepoint, len) = decoded.map_or((0, 0), |d| (d.codepoint, d.len));
    report.test(
        error.is_some(),
        format_args!("{category} [{}] {}, U+{codepoint:04X}", Hex(bytes), Flag(error)),
    )?;
    report.test(
        len == expected,
        format_args!("{category} [{}] recovery {len}", Hex(bytes)),
    )?;
    Ok(())
}

/// Space-separated lowercase hex bytes.
struct Hex<'a>(&'a [u8]);

impl fmt::Display for Hex<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

struct Flag(Option<Malformed>);

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(error) => write!(f, "{error}"),
            None => f.write_str("no error"),
        }
    }
}
