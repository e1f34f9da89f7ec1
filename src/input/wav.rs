use anyhow::{bail, Result};
use hound::{SampleFormat, WavReader};
use std::path::Path;
use super::Samples;

pub fn is_wav_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"))
}

/// Read every sample of a WAV capture, channels left interleaved.
/// SDR++ saves IQ as stereo: I=left channel, Q=right channel, so the
/// interleaved order is already what iq pairing expects.
pub fn read_wav_samples<P: AsRef<Path>>(path: P) -> Result<(Samples, u32)> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();
    log::debug!(
        "WAV capture: {} channel(s), {} Hz, {} bits, {:?}",
        spec.channels,
        spec.sample_rate,
        spec.bits_per_sample,
        spec.sample_format
    );

    let samples = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Int, 1..=8) => {
            Samples::I8(reader.samples::<i8>().collect::<Result<_, _>>()?)
        }
        (SampleFormat::Int, 9..=16) => {
            Samples::I16(reader.samples::<i16>().collect::<Result<_, _>>()?)
        }
        (SampleFormat::Int, 17..=32) => {
            Samples::I32(reader.samples::<i32>().collect::<Result<_, _>>()?)
        }
        (SampleFormat::Float, 32) => {
            Samples::F32(reader.samples::<f32>().collect::<Result<_, _>>()?)
        }
        (format, bits) => bail!("Unsupported WAV sample format: {:?} with {} bits", format, bits),
    };

    Ok((samples, spec.sample_rate))
}
