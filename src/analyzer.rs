use anyhow::{Context, Result};

use crate::config::{Config, InputSource};
use crate::input::load_capture;
use crate::psd::{welch, Psd};
use crate::render::{PlotData, Renderer};
use crate::signal::{assemble, Signal};

/// Run the whole pipeline once: decode, assemble, estimate, render
pub fn run(config: &Config) -> Result<()> {
    // Resolve the output first so a bad image extension fails before any reading
    let renderer = Renderer::for_target(&config.output)?;

    let capture = load_capture(&config.input, config.encoding)?;
    if let Some(header_rate) = capture.header_sample_rate {
        if u64::from(header_rate) != config.sample_rate {
            log::warn!(
                "WAV header says {} Hz but -s is {} Hz, using {} Hz",
                header_rate,
                config.sample_rate,
                config.sample_rate
            );
        }
    }
    if capture.samples.is_empty() {
        log::warn!("Capture contains no complete samples");
    }
    log::info!(
        "Decoded {} {} sample(s)",
        capture.samples.len(),
        capture.samples.encoding().name()
    );

    let signal = assemble(&capture.samples, config.signal_type);
    log::info!(
        "Assembled {} {} sample(s) at {} Hz ({:.3}s)",
        signal.len(),
        if signal.is_complex() { "complex" } else { "real" },
        config.sample_rate,
        signal.len() as f64 / config.sample_rate as f64
    );

    let psd = estimate(&signal, config)?;
    log::info!(
        "{} PSD: {} segment(s) of {}, {:.3} Hz bins",
        if psd.two_sided { "Two-sided" } else { "One-sided" },
        psd.segments,
        psd.nfft,
        psd.sample_rate / psd.nfft as f64
    );
    if let Some((freq, power)) = psd.peak() {
        log::info!("Peak: {:.1} Hz at {:.1} dB/Hz", freq, 10.0 * power.log10());
    }

    let plot = PlotData::from_psd(&psd, plot_title(config));
    renderer.render(plot).context("Failed to render PSD")?;
    Ok(())
}

/// Welch estimate with the configured parameters and frequency offset
pub fn estimate(signal: &Signal, config: &Config) -> Result<Psd> {
    let mut psd = welch(signal, config.sample_rate as f64, &config.welch)
        .context("Failed to estimate power spectral density")?;
    psd.shift_frequencies(config.center_freq);
    Ok(psd)
}

fn plot_title(config: &Config) -> String {
    let source = match &config.input {
        InputSource::Stdin => "stdin".to_string(),
        InputSource::File(path) => path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string()),
    };
    format!("PSD of {} @ {} Hz", source, config.sample_rate)
}
