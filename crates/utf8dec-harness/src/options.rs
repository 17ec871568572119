use std::{str::FromStr, time::Duration};

use utf8dec::Strategy;

use crate::HarnessError;

/// Settings of the correctness driver.
///
/// # Examples
///
/// ```
/// use utf8dec_harness::CheckOptions;
///
/// let options = CheckOptions::from_args(["--stride", "257", "--strategy", "swar"]).unwrap();
/// assert_eq!(options.stride, 257);
/// assert_eq!(options.strategies.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOptions {
    /// Every `stride`-th codepoint is run through the differential checker.
    /// Length boundaries always are.
    ///
    /// # Default
    ///
    /// `1`
    pub stride: u32,

    /// Batch strategies compared against the scalar reference.
    ///
    /// # Default
    ///
    /// Every strategy this build provides.
    pub strategies: Vec<Strategy>,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            stride: 1,
            strategies: Strategy::available().to_vec(),
        }
    }
}

impl CheckOptions {
    /// Parses `--stride N` and `--strategy NAME` (repeatable).
    ///
    /// # Errors
    ///
    /// Unknown flags, missing or unparsable values, and a zero stride.
    pub fn from_args<I, S>(args: I) -> Result<Self, HarnessError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut options = Self::default();
        let mut strategies = Vec::new();
        let mut args = args.into_iter().map(Into::into);
        while let Some(flag) = args.next() {
            match flag.as_str() {
                "--stride" => options.stride = value(&mut args, "--stride")?,
                "--strategy" => strategies.push(args.next().ok_or(HarnessError::MissingValue("--strategy"))?.parse()?),
                _ => return Err(HarnessError::UnknownFlag(flag)),
            }
        }
        if options.stride == 0 {
            return Err(HarnessError::InvalidValue {
                flag: "--stride",
                value: "0".into(),
            });
        }
        if !strategies.is_empty() {
            options.strategies = strategies;
        }
        Ok(options)
    }
}

/// Settings of the throughput driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchOptions {
    /// Size of the random fixture in bytes.
    ///
    /// # Default
    ///
    /// 8 MiB
    pub buffer_len: usize,

    /// Measurement window per comparator.
    ///
    /// # Default
    ///
    /// 6 seconds
    pub duration: Duration,

    /// Seed of the fixture generator.
    pub seed: u64,

    /// Batch strategies to measure next to the single-codepoint decoders.
    pub strategies: Vec<Strategy>,
}

impl Default for BenchOptions {
    fn default() -> Self {
        Self {
            buffer_len: 8 << 20,
            duration: Duration::from_secs(6),
            seed: 0,
            strategies: Strategy::available().to_vec(),
        }
    }
}

impl BenchOptions {
    /// Parses `--buffer-mib N`, `--seconds S` (fractional allowed), `--seed N`
    /// and `--strategy NAME` (repeatable).
    ///
    /// # Errors
    ///
    /// Unknown flags, missing or unparsable values, and an empty buffer or
    /// window.
    pub fn from_args<I, S>(args: I) -> Result<Self, HarnessError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut options = Self::default();
        let mut strategies = Vec::new();
        let mut args = args.into_iter().map(Into::into);
        while let Some(flag) = args.next() {
            match flag.as_str() {
                "--buffer-mib" => {
                    let mib: usize = value(&mut args, "--buffer-mib")?;
                    options.buffer_len = mib.checked_mul(1 << 20).filter(|&n| n > 0).ok_or_else(|| {
                        HarnessError::InvalidValue {
                            flag: "--buffer-mib",
                            value: mib.to_string(),
                        }
                    })?;
                }
                "--seconds" => {
                    let seconds: f64 = value(&mut args, "--seconds")?;
                    options.duration = Duration::try_from_secs_f64(seconds)
                        .ok()
                        .filter(|d| !d.is_zero())
                        .ok_or_else(|| HarnessError::InvalidValue {
                            flag: "--seconds",
                            value: seconds.to_string(),
                        })?;
                }
                "--seed" => options.seed = value(&mut args, "--seed")?,
                "--strategy" => strategies.push(args.next().ok_or(HarnessError::MissingValue("--strategy"))?.parse()?),
                _ => return Err(HarnessError::UnknownFlag(flag)),
            }
        }
        if !strategies.is_empty() {
            options.strategies = strategies;
        }
        Ok(options)
    }
}

fn value<T: FromStr>(args: &mut impl Iterator<Item = String>, flag: &'static str) -> Result<T, HarnessError> {
    let raw = args.next().ok_or(HarnessError::MissingValue(flag))?;
    raw.parse().map_err(|_| HarnessError::InvalidValue { flag, value: raw })
}
