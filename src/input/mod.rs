pub mod raw;
pub mod wav;

use anyhow::{Context, Result};
use std::io::Read;

use crate::config::InputSource;
pub use raw::{decode, SampleEncoding};

/// Decoded sample sequence, one variant per element encoding
#[derive(Debug, Clone, PartialEq)]
pub enum Samples {
    I8(Vec<i8>),
    I16(Vec<i16>),
    I32(Vec<i32>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

impl Samples {
    pub fn len(&self) -> usize {
        match self {
            Samples::I8(v) => v.len(),
            Samples::I16(v) => v.len(),
            Samples::I32(v) => v.len(),
            Samples::F32(v) => v.len(),
            Samples::F64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn encoding(&self) -> SampleEncoding {
        match self {
            Samples::I8(_) => SampleEncoding::I8,
            Samples::I16(_) => SampleEncoding::I16,
            Samples::I32(_) => SampleEncoding::I32,
            Samples::F32(_) => SampleEncoding::F32,
            Samples::F64(_) => SampleEncoding::F64,
        }
    }

    /// Widen every sample to double precision, preserving order
    pub fn to_f64(&self) -> Vec<f64> {
        match self {
            Samples::I8(v) => v.iter().map(|&s| s as f64).collect(),
            Samples::I16(v) => v.iter().map(|&s| s as f64).collect(),
            Samples::I32(v) => v.iter().map(|&s| s as f64).collect(),
            Samples::F32(v) => v.iter().map(|&s| s as f64).collect(),
            Samples::F64(v) => v.clone(),
        }
    }

    /// Serialize back to the flat little-endian layout `decode` reads
    #[allow(dead_code)]
    pub fn to_le_bytes(&self) -> Vec<u8> {
        match self {
            Samples::I8(v) => v.iter().map(|&s| s as u8).collect(),
            Samples::I16(v) => v.iter().flat_map(|s| s.to_le_bytes()).collect(),
            Samples::I32(v) => v.iter().flat_map(|s| s.to_le_bytes()).collect(),
            Samples::F32(v) => v.iter().flat_map(|s| s.to_le_bytes()).collect(),
            Samples::F64(v) => v.iter().flat_map(|s| s.to_le_bytes()).collect(),
        }
    }
}

/// Samples plus whatever the container told us about them
#[derive(Debug, Clone)]
pub struct Capture {
    pub samples: Samples,
    /// Only WAV captures carry a sample rate
    pub header_sample_rate: Option<u32>,
}

/// Read the whole capture into memory
pub fn read_capture(source: &InputSource) -> Result<Vec<u8>> {
    match source {
        InputSource::Stdin => {
            let mut buffer = Vec::new();
            std::io::stdin()
                .lock()
                .read_to_end(&mut buffer)
                .context("Failed to read capture from standard input")?;
            Ok(buffer)
        }
        InputSource::File(path) => std::fs::read(path)
            .with_context(|| format!("Failed to read capture file {}", path.display())),
    }
}

/// Load and decode a capture. WAV files are decoded from their own header,
/// anything else is treated as a headerless buffer of `encoding` elements.
pub fn load_capture(source: &InputSource, encoding: SampleEncoding) -> Result<Capture> {
    if let InputSource::File(path) = source {
        if wav::is_wav_path(path) {
            let (samples, sample_rate) = wav::read_wav_samples(path)
                .with_context(|| format!("Failed to read WAV capture {}", path.display()))?;
            if samples.encoding() != encoding {
                log::info!(
                    "WAV header selects {} samples, ignoring -d {}",
                    samples.encoding().name(),
                    encoding.name()
                );
            }
            return Ok(Capture {
                samples,
                header_sample_rate: Some(sample_rate),
            });
        }
    }

    let buffer = read_capture(source)?;
    log::debug!("Read {} bytes of capture data", buffer.len());
    Ok(Capture {
        samples: decode(&buffer, encoding),
        header_sample_rate: None,
    })
}
