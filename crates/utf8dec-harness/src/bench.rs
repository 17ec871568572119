//! The throughput driver.
//!
//! Every comparator decodes the whole fixture over and over until the
//! measurement window closes. The window is enforced by a timer thread that
//! clears [`RUNNING`]; the measuring loop only looks at the flag between full
//! passes, so no timestamps are taken inside the loop and a pass is never
//! torn.

use std::{
    fmt,
    io::Write,
    sync::atomic::{AtomicBool, Ordering},
    thread,
    time::{Duration, Instant},
};

use rand::{Rng, SeedableRng, rngs::SmallRng};
use utf8dec::{Input, LANES, Output, Step, Strategy, decode_one, dfa, encode_to_vec, is_surrogate};

use crate::{BenchOptions, HarnessError};

/// Cleared when the current measurement window has elapsed.
pub static RUNNING: AtomicBool = AtomicBool::new(false);

/// Codepoints decoded per batch call.
const SCRATCH: usize = 1 << 16;

/// Fills a buffer of at most `len` bytes with random scalar values whose
/// encoded lengths are uniformly distributed. No sequence is cut off, so the
/// buffer may end up to three bytes short.
#[must_use]
pub fn fill(len: usize, seed: u64) -> Vec<u8> {
    let ranges = [(0, 0x7F), (0x80, 0x7FF), (0x800, 0xFFFF), (0x1_0000, 0x10_FFFF)];
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut buffer = Vec::with_capacity(len);
    loop {
        let width = rng.random_range(0..ranges.len());
        let (lo, hi) = ranges[width];
        let c = rng.random_range(lo..=hi);
        if is_surrogate(c) {
            continue;
        }
        if buffer.len() + width + 1 > len {
            break;
        }
        encode_to_vec(c, &mut buffer);
    }
    buffer
}

/// One measurement window. Arming sets [`RUNNING`]; a timer thread clears it
/// after the duration. Dropping the deadline waits for the timer.
pub struct Deadline {
    timer: Option<thread::JoinHandle<()>>,
}

impl Deadline {
    #[must_use]
    pub fn arm(duration: Duration) -> Self {
        RUNNING.store(true, Ordering::Release);
        let timer = thread::spawn(move || {
            thread::sleep(duration);
            RUNNING.store(false, Ordering::Release);
        });
        Self { timer: Some(timer) }
    }

    #[must_use]
    pub fn is_running() -> bool {
        RUNNING.load(Ordering::Acquire)
    }
}

impl Drop for Deadline {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            join_timer(timer);
        }
    }
}

/// Waits for a timer thread; returns `false` if it panicked.
fn join_timer(timer: thread::JoinHandle<()>) -> bool {
    match timer.join() {
        Ok(()) => true,
        Err(panic) => {
            let reason = panic
                .downcast_ref::<&str>()
                .copied()
                .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
                .unwrap_or("unknown");
            tracing::warn!(reason, "deadline timer panicked");
            false
        }
    }
}

/// Something that can decode the fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    /// [`decode_one`] in a loop.
    Branchless,
    Batch(Strategy),
    /// The DFA baseline.
    Hoehrmann,
    /// `bstr`'s decoder.
    Bstr,
}

impl Comparator {
    /// The single-codepoint comparators followed by `strategies`.
    #[must_use]
    pub fn lineup(strategies: &[Strategy]) -> Vec<Comparator> {
        let mut lineup = vec![Comparator::Branchless];
        lineup.extend(strategies.iter().copied().map(Comparator::Batch));
        lineup.extend([Comparator::Hoehrmann, Comparator::Bstr]);
        lineup
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Comparator::Branchless => "branchless",
            Comparator::Batch(strategy) => strategy.name(),
            Comparator::Hoehrmann => "hoehrmann",
            Comparator::Bstr => "bstr",
        }
    }

    /// Decodes all of `buffer` once.
    fn pass(self, buffer: &[u8], scratch: &mut [u32]) -> Pass {
        match self {
            Comparator::Branchless => {
                let mut rest = buffer;
                let mut errors = 0;
                while let Some(decoded) = decode_one(rest) {
                    errors += u64::from(decoded.is_error());
                    rest = &rest[decoded.len..];
                }
                Pass { errors, complete: true }
            }
            Comparator::Batch(strategy) => batch_pass(strategy, buffer, scratch),
            Comparator::Hoehrmann => {
                let tally = dfa::tally(buffer);
                Pass {
                    errors: tally.rejects as u64,
                    complete: true,
                }
            }
            Comparator::Bstr => {
                let mut rest = buffer;
                let mut errors = 0;
                while !rest.is_empty() {
                    let (ch, size) = bstr::decode_utf8(rest);
                    errors += u64::from(ch.is_none());
                    rest = &rest[size..];
                }
                Pass { errors, complete: true }
            }
        }
    }
}

struct Pass {
    errors: u64,
    complete: bool,
}

fn batch_pass(strategy: Strategy, buffer: &[u8], scratch: &mut [u32]) -> Pass {
    let decoder = strategy.decoder();
    let mut input = Input::new(buffer);
    let mut errors = 0;
    while !input.is_empty() {
        let mut output = Output::new(scratch);
        match decoder.decode_batch(&mut input, &mut output) {
            Step::Decoded(_) => {}
            Step::Malformed(_) => errors += 1,
            // A core is done once only its lookahead margin is left.
            Step::Stopped if strategy.is_core() && input.len() < LANES => break,
            Step::Stopped => {
                return Pass {
                    errors: errors + 1,
                    complete: false,
                };
            }
        }
    }
    Pass { errors, complete: true }
}

/// Result of measuring one comparator.
#[derive(Debug, Clone, PartialEq)]
pub struct Throughput {
    pub label: &'static str,
    /// Fixture bytes decoded in completed passes.
    pub bytes: u64,
    pub passes: u64,
    pub errors: u64,
    pub window: Duration,
}

impl Throughput {
    /// Mebibytes per second over the measurement window.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn mb_per_sec(&self) -> f64 {
        self.bytes as f64 / self.window.as_secs_f64() / f64::from(1 << 20)
    }
}

impl fmt::Display for Throughput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:.2} MB/s, {} errors", self.label, self.mb_per_sec(), self.errors)
    }
}

/// Decodes `buffer` with `comparator` until `window` has elapsed. At least
/// one pass always runs; passes that did not reach the end of the buffer are
/// not counted.
#[must_use]
pub fn measure(comparator: Comparator, buffer: &[u8], window: Duration) -> Throughput {
    let mut scratch = vec![0u32; SCRATCH];
    let mut passes = 0u64;
    let mut errors = 0u64;

    let started = Instant::now();
    let deadline = Deadline::arm(window);
    loop {
        let pass = std::hint::black_box(comparator.pass(std::hint::black_box(buffer), &mut scratch));
        errors += pass.errors;
        passes += u64::from(pass.complete);
        if !Deadline::is_running() {
            break;
        }
    }
    drop(deadline);
    tracing::debug!(label = comparator.label(), passes, errors, elapsed = ?started.elapsed(), "window closed");

    Throughput {
        label: comparator.label(),
        bytes: passes * buffer.len() as u64,
        passes,
        errors,
        window,
    }
}

/// Builds the fixture, measures every comparator, and writes one report line
/// per comparator.
///
/// # Errors
///
/// Any comparator saw a malformed sequence in the fixture (reported after
/// all lines are written), or the report could not be written.
pub fn run<W: Write>(options: &BenchOptions, mut out: W) -> Result<Vec<Throughput>, HarnessError> {
    let buffer = fill(options.buffer_len, options.seed);
    tracing::debug!(len = buffer.len(), seed = options.seed, "fixture ready");

    let mut results = Vec::new();
    for comparator in Comparator::lineup(&options.strategies) {
        let throughput = measure(comparator, &buffer, options.duration);
        writeln!(out, "{throughput}")?;
        out.flush()?;
        results.push(throughput);
    }

    if let Some(bad) = results.iter().find(|t| t.errors > 0) {
        return Err(HarnessError::DecodeErrors {
            label: bad.label.to_string(),
            errors: bad.errors,
        });
    }
    Ok(results)
}
