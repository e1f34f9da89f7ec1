use clap::ValueEnum;
use std::path::PathBuf;

use crate::input::SampleEncoding;
use crate::psd::WelchParams;

/// How the decoded sample sequence is turned into a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SignalType {
    /// Every sample is one real value
    Scalar,
    /// Consecutive samples pair up as (I, Q)
    Iq,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
}

impl InputSource {
    /// `-` selects standard input, anything else is a path
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            InputSource::Stdin
        } else {
            InputSource::File(PathBuf::from(arg))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Screen,
    File(PathBuf),
}

/// Everything a single run needs, fixed before the pipeline starts
#[derive(Debug, Clone)]
pub struct Config {
    pub sample_rate: u64,
    pub signal_type: SignalType,
    pub encoding: SampleEncoding,
    pub input: InputSource,
    pub output: OutputTarget,
    pub welch: WelchParams,
    pub center_freq: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sample_rate: 1,
            signal_type: SignalType::Iq,
            encoding: SampleEncoding::I16,
            input: InputSource::Stdin,
            output: OutputTarget::Screen,
            welch: WelchParams::default(),
            center_freq: 0.0,
        }
    }
}

/// Parse a sample rate the way captures are usually labelled ("2.4e6",
/// "48000.0"), truncating toward zero.
pub fn parse_sample_rate(arg: &str) -> Result<u64, String> {
    let value: f64 = arg
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", arg))?;
    if !value.is_finite() {
        return Err(format!("'{}' is not a finite number", arg));
    }
    let truncated = value.trunc();
    if truncated < 1.0 {
        return Err(format!("sample rate must be at least 1 Hz, got '{}'", arg));
    }
    if truncated >= u64::MAX as f64 {
        return Err(format!("sample rate '{}' is too large", arg));
    }
    Ok(truncated as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_rate_truncates_floats() {
        assert_eq!(parse_sample_rate("1000"), Ok(1000));
        assert_eq!(parse_sample_rate("2.4e6"), Ok(2_400_000));
        assert_eq!(parse_sample_rate("48000.9"), Ok(48000));
    }

    #[test]
    fn sample_rate_rejects_non_positive() {
        assert!(parse_sample_rate("0").is_err());
        assert!(parse_sample_rate("0.5").is_err());
        assert!(parse_sample_rate("-10").is_err());
        assert!(parse_sample_rate("inf").is_err());
        assert!(parse_sample_rate("NaN").is_err());
        assert!(parse_sample_rate("fast").is_err());
    }

    #[test]
    fn sample_rate_rejects_overflow_with_its_own_message() {
        let err = parse_sample_rate("1e30").unwrap_err();
        assert!(err.contains("too large"), "{}", err);
        assert!(!err.contains("at least"), "{}", err);
    }

    #[test]
    fn dash_selects_stdin() {
        assert_eq!(InputSource::from_arg("-"), InputSource::Stdin);
        assert_eq!(
            InputSource::from_arg("capture.iq"),
            InputSource::File(PathBuf::from("capture.iq"))
        );
    }
}
