use rustfft::num_complex::Complex;

use crate::config::SignalType;
use crate::input::Samples;

/// Signal handed to the spectral estimator
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    Real(Vec<f64>),
    /// I + jQ
    Complex(Vec<Complex<f64>>),
}

impl Signal {
    pub fn len(&self) -> usize {
        match self {
            Signal::Real(v) => v.len(),
            Signal::Complex(v) => v.len(),
        }
    }

    pub fn is_complex(&self) -> bool {
        matches!(self, Signal::Complex(_))
    }
}

/// Build the signal from decoded samples.
/// In iq mode sample[2k] is the real part and sample[2k+1] the imaginary
/// part; an unpaired trailing sample is dropped.
pub fn assemble(samples: &Samples, signal_type: SignalType) -> Signal {
    let values = samples.to_f64();
    match signal_type {
        SignalType::Scalar => Signal::Real(values),
        SignalType::Iq => {
            if values.len() % 2 != 0 {
                log::debug!("Dropping unpaired trailing sample in iq mode");
            }
            Signal::Complex(
                values
                    .chunks_exact(2)
                    .map(|pair| Complex::new(pair[0], pair[1]))
                    .collect(),
            )
        }
    }
}
