//! Welch power spectral density estimate.
//!
//! Follows the classic averaged-periodogram defaults used by plotting
//! tools: non-overlapping 256-sample Hann segments, no detrending, density
//! scaling by `fs * sum(w^2)`. Real signals get a one-sided spectrum,
//! complex signals a two-sided one centred on DC.

use clap::ValueEnum;
use rustfft::{num_complex::Complex, FftPlanner};
use std::f64::consts::PI;
use thiserror::Error;

use crate::signal::Signal;

/// Shortest signal the estimator accepts
pub const MIN_SIGNAL_LEN: usize = 2;

/// Largest segment length accepted; bounds the zero-padding allocation
pub const MAX_NFFT: usize = 1 << 20;

#[derive(Debug, Error, PartialEq)]
pub enum PsdError {
    #[error("signal has {len} sample(s), at least {min} are needed for a PSD estimate")]
    SignalTooShort { len: usize, min: usize },
    #[error("invalid Welch parameters: {0}")]
    InvalidParams(String),
}

/// Segment taper applied before each FFT
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum WindowFunction {
    #[default]
    Hann,
    Hamming,
    Blackman,
    /// Rectangular
    None,
}

impl WindowFunction {
    /// Symmetric window coefficients
    pub fn coefficients(&self, size: usize) -> Vec<f64> {
        if size == 1 {
            return vec![1.0];
        }
        let denom = (size - 1) as f64;
        (0..size)
            .map(|n| {
                let x = n as f64 / denom;
                match self {
                    WindowFunction::Hann => 0.5 - 0.5 * (2.0 * PI * x).cos(),
                    WindowFunction::Hamming => 0.54 - 0.46 * (2.0 * PI * x).cos(),
                    WindowFunction::Blackman => {
                        0.42 - 0.5 * (2.0 * PI * x).cos() + 0.08 * (4.0 * PI * x).cos()
                    }
                    WindowFunction::None => 1.0,
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WelchParams {
    /// Samples per segment (and FFT length)
    pub nfft: usize,
    /// Samples shared by consecutive segments
    pub noverlap: usize,
    pub window: WindowFunction,
}

impl Default for WelchParams {
    fn default() -> Self {
        Self {
            nfft: 256,
            noverlap: 0,
            window: WindowFunction::Hann,
        }
    }
}

impl WelchParams {
    pub fn validate(&self) -> Result<(), PsdError> {
        if self.nfft < 2 {
            return Err(PsdError::InvalidParams(format!(
                "nfft must be at least 2, got {}",
                self.nfft
            )));
        }
        if self.nfft > MAX_NFFT {
            return Err(PsdError::InvalidParams(format!(
                "nfft must be at most {}, got {}",
                MAX_NFFT, self.nfft
            )));
        }
        if self.noverlap >= self.nfft {
            return Err(PsdError::InvalidParams(format!(
                "noverlap ({}) must be smaller than nfft ({})",
                self.noverlap, self.nfft
            )));
        }
        Ok(())
    }
}

/// Result of a PSD estimate
#[derive(Debug, Clone)]
pub struct Psd {
    /// Bin frequencies in Hz, ascending
    pub frequencies: Vec<f64>,
    /// Power density per bin (linear, units^2/Hz)
    pub power: Vec<f64>,
    pub sample_rate: f64,
    pub nfft: usize,
    /// Number of segments averaged
    pub segments: usize,
    /// True when the spectrum covers negative frequencies too
    pub two_sided: bool,
}

impl Psd {
    /// Power density in dB/Hz. Zero power maps to -inf.
    pub fn power_db(&self) -> Vec<f64> {
        self.power.iter().map(|&p| 10.0 * p.log10()).collect()
    }

    /// Frequency and power of the strongest bin
    pub fn peak(&self) -> Option<(f64, f64)> {
        self.frequencies
            .iter()
            .zip(self.power.iter())
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(&f, &p)| (f, p))
    }

    /// Move the frequency axis, e.g. to the tuner's centre frequency
    pub fn shift_frequencies(&mut self, offset: f64) {
        if offset != 0.0 {
            for f in &mut self.frequencies {
                *f += offset;
            }
        }
    }
}

/// Estimate the PSD of `signal` sampled at `sample_rate` Hz.
pub fn welch(signal: &Signal, sample_rate: f64, params: &WelchParams) -> Result<Psd, PsdError> {
    params.validate()?;
    if !(sample_rate.is_finite() && sample_rate > 0.0) {
        return Err(PsdError::InvalidParams(format!(
            "sample rate must be positive, got {}",
            sample_rate
        )));
    }
    if signal.len() < MIN_SIGNAL_LEN {
        return Err(PsdError::SignalTooShort {
            len: signal.len(),
            min: MIN_SIGNAL_LEN,
        });
    }

    let nfft = params.nfft;
    let window = params.window.coefficients(nfft);
    let window_power: f64 = window.iter().map(|w| w * w).sum();
    if window_power <= 0.0 {
        return Err(PsdError::InvalidParams(format!(
            "{:?} window of {} samples has no energy",
            params.window, nfft
        )));
    }

    let mut data: Vec<Complex<f64>> = match signal {
        Signal::Real(v) => v.iter().map(|&x| Complex::new(x, 0.0)).collect(),
        Signal::Complex(v) => v.clone(),
    };
    // Short signals are zero-padded to one full segment
    if data.len() < nfft {
        data.resize(nfft, Complex::new(0.0, 0.0));
    }

    let step = nfft - params.noverlap;
    let segments = 1 + (data.len() - nfft) / step;
    log::debug!(
        "Welch: {} samples, nfft={}, step={}, {} segment(s)",
        signal.len(),
        nfft,
        step,
        segments
    );

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(nfft);
    let mut buffer = vec![Complex::new(0.0, 0.0); nfft];
    let mut accum = vec![0.0f64; nfft];

    for segment in 0..segments {
        let start = segment * step;
        for ((out, x), w) in buffer
            .iter_mut()
            .zip(data[start..start + nfft].iter())
            .zip(window.iter())
        {
            *out = *x * *w;
        }
        fft.process(&mut buffer);
        for (a, c) in accum.iter_mut().zip(buffer.iter()) {
            *a += c.norm_sqr();
        }
    }

    let scale = 1.0 / (sample_rate * window_power * segments as f64);
    let bin_width = sample_rate / nfft as f64;

    let (frequencies, power) = if signal.is_complex() {
        // fftshift: most negative frequency first
        let half = nfft / 2;
        let mut frequencies = Vec::with_capacity(nfft);
        let mut power = Vec::with_capacity(nfft);
        for i in 0..nfft {
            let bin = (i + nfft - half) % nfft;
            let signed = if bin < (nfft + 1) / 2 {
                bin as f64
            } else {
                bin as f64 - nfft as f64
            };
            frequencies.push(signed * bin_width);
            power.push(accum[bin] * scale);
        }
        (frequencies, power)
    } else {
        let (num_freqs, nyquist) = if nfft % 2 == 0 {
            (nfft / 2 + 1, Some(nfft / 2))
        } else {
            ((nfft + 1) / 2, None)
        };
        let frequencies = (0..num_freqs).map(|k| k as f64 * bin_width).collect();
        let power = (0..num_freqs)
            .map(|k| {
                let p = accum[k] * scale;
                if k == 0 || Some(k) == nyquist {
                    p
                } else {
                    2.0 * p
                }
            })
            .collect();
        (frequencies, power)
    };

    Ok(Psd {
        frequencies,
        power,
        sample_rate,
        nfft,
        segments,
        two_sided: signal.is_complex(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn tone(freq: f64, fs: f64, len: usize) -> Signal {
        Signal::Complex(
            (0..len)
                .map(|n| Complex::from_polar(1.0, 2.0 * PI * freq * n as f64 / fs))
                .collect(),
        )
    }

    fn total_power(psd: &Psd) -> f64 {
        psd.power.iter().sum::<f64>() * psd.sample_rate / psd.nfft as f64
    }

    #[test]
    fn hann_window_is_symmetric() {
        let w = WindowFunction::Hann.coefficients(5);
        let expected = [0.0, 0.5, 1.0, 0.5, 0.0];
        for (a, b) in w.iter().zip(expected.iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-12);
        }
        assert_eq!(WindowFunction::Blackman.coefficients(1), vec![1.0]);
        assert!(WindowFunction::None.coefficients(4).iter().all(|&w| w == 1.0));
    }

    #[test]
    fn complex_tone_peaks_at_its_frequency() {
        let fs = 1024.0;
        let psd = welch(&tone(256.0, fs, 2048), fs, &WelchParams::default()).unwrap();
        let (freq, _) = psd.peak().unwrap();
        assert_abs_diff_eq!(freq, 256.0, epsilon = 1e-9);

        let psd = welch(&tone(-128.0, fs, 2048), fs, &WelchParams::default()).unwrap();
        let (freq, _) = psd.peak().unwrap();
        assert_abs_diff_eq!(freq, -128.0, epsilon = 1e-9);
    }

    #[test]
    fn density_integrates_to_signal_power() {
        let fs = 1000.0;
        let psd = welch(&tone(125.0, fs, 1024), fs, &WelchParams::default()).unwrap();
        assert_relative_eq!(total_power(&psd), 1.0, max_relative = 1e-9);

        let psd = welch(&Signal::Real(vec![3.0; 512]), fs, &WelchParams::default()).unwrap();
        assert_relative_eq!(total_power(&psd), 9.0, max_relative = 1e-9);
    }

    #[test]
    fn real_signal_is_one_sided() {
        let params = WelchParams {
            nfft: 8,
            noverlap: 0,
            window: WindowFunction::None,
        };
        let psd = welch(&Signal::Real(vec![1.0; 16]), 8.0, &params).unwrap();
        assert_eq!(psd.frequencies, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        assert!(!psd.two_sided);
        // All energy of a constant sits in DC: |X0|^2 = 64, / (fs * N)
        assert_relative_eq!(psd.power[0], 1.0, max_relative = 1e-12);
        assert!(psd.power[1..].iter().all(|&p| p.abs() < 1e-20));

        let params = WelchParams { nfft: 7, ..params };
        let psd = welch(&Signal::Real(vec![1.0; 7]), 7.0, &params).unwrap();
        assert_eq!(psd.frequencies, vec![0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn complex_signal_is_two_sided_and_centred() {
        let params = WelchParams {
            nfft: 8,
            noverlap: 0,
            window: WindowFunction::Hann,
        };
        let psd = welch(&tone(1.0, 8.0, 8), 8.0, &params).unwrap();
        assert!(psd.two_sided);
        assert_eq!(
            psd.frequencies,
            vec![-4.0, -3.0, -2.0, -1.0, 0.0, 1.0, 2.0, 3.0]
        );
    }

    #[test]
    fn segment_count_follows_step() {
        let params = WelchParams {
            nfft: 256,
            noverlap: 128,
            window: WindowFunction::Hann,
        };
        let psd = welch(&Signal::Real(vec![0.5; 1000]), 1.0, &params).unwrap();
        assert_eq!(psd.segments, 6);

        let psd = welch(&Signal::Real(vec![0.5; 1000]), 1.0, &WelchParams::default()).unwrap();
        assert_eq!(psd.segments, 3);
    }

    #[test]
    fn short_signal_is_zero_padded() {
        let psd = welch(&tone(10.0, 100.0, 10), 100.0, &WelchParams::default()).unwrap();
        assert_eq!(psd.segments, 1);
        assert_eq!(psd.frequencies.len(), 256);
        assert_eq!(psd.power.len(), 256);
    }

    #[test]
    fn zero_signal_has_zero_power() {
        let psd = welch(&Signal::Real(vec![0.0; 300]), 48000.0, &WelchParams::default()).unwrap();
        assert!(psd.power.iter().all(|&p| p == 0.0));
        assert!(psd.power_db().iter().all(|&db| db == f64::NEG_INFINITY));
    }

    #[test]
    fn degenerate_signals_are_rejected() {
        let params = WelchParams::default();
        assert_eq!(
            welch(&Signal::Complex(vec![]), 1000.0, &params).unwrap_err(),
            PsdError::SignalTooShort { len: 0, min: 2 }
        );
        assert_eq!(
            welch(&Signal::Real(vec![1.0]), 1000.0, &params).unwrap_err(),
            PsdError::SignalTooShort { len: 1, min: 2 }
        );
    }

    #[test]
    fn invalid_params_are_rejected() {
        let signal = Signal::Real(vec![1.0; 64]);
        let overlap = WelchParams {
            nfft: 16,
            noverlap: 16,
            window: WindowFunction::Hann,
        };
        assert!(matches!(
            welch(&signal, 1.0, &overlap),
            Err(PsdError::InvalidParams(_))
        ));

        let tiny = WelchParams {
            nfft: 1,
            noverlap: 0,
            window: WindowFunction::None,
        };
        assert!(matches!(welch(&signal, 1.0, &tiny), Err(PsdError::InvalidParams(_))));

        for nfft in [MAX_NFFT + 1, usize::MAX] {
            let huge = WelchParams {
                nfft,
                noverlap: 0,
                window: WindowFunction::None,
            };
            assert!(matches!(welch(&signal, 1.0, &huge), Err(PsdError::InvalidParams(_))));
        }

        // Symmetric Hann of two samples is all zeros
        let silent = WelchParams {
            nfft: 2,
            noverlap: 0,
            window: WindowFunction::Hann,
        };
        assert!(matches!(welch(&signal, 1.0, &silent), Err(PsdError::InvalidParams(_))));
    }

    #[test]
    fn shifting_moves_the_axis() {
        let mut psd = welch(&tone(0.0, 8.0, 8), 8.0, &WelchParams { nfft: 8, ..Default::default() })
            .unwrap();
        psd.shift_frequencies(100.0);
        assert_eq!(psd.frequencies[0], 96.0);
        assert_eq!(psd.frequencies[7], 103.0);
    }
}
