pub mod file;
pub mod screen;

use std::ops::Range;
use thiserror::Error;

use crate::config::OutputTarget;
use crate::psd::Psd;
pub use file::FileRenderer;
pub use screen::ScreenRenderer;

pub const X_LABEL: &str = "Frequency (Hz)";
pub const Y_LABEL: &str = "Power Spectral Density (dB/Hz)";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("unsupported image format for {0} (use .png, .jpg, .jpeg, .bmp, .svg or .pdf)")]
    UnsupportedFormat(String),
    #[error("failed to load plot font: {0}")]
    Font(String),
    #[error("failed to draw plot: {0}")]
    Draw(String),
    #[error("failed to open display window: {0}")]
    Display(String),
}

/// PSD curve prepared for drawing: dB values, finite runs and axis ranges
#[derive(Debug, Clone)]
pub struct PlotData {
    pub title: String,
    /// Contiguous runs of finite points; zero-power bins split the curve
    pub segments: Vec<Vec<(f64, f64)>>,
    pub x_range: Range<f64>,
    pub y_range: Range<f64>,
}

impl PlotData {
    pub fn from_psd(psd: &Psd, title: impl Into<String>) -> Self {
        let mut segments: Vec<Vec<(f64, f64)>> = Vec::new();
        let mut current = Vec::new();
        for (&f, db) in psd.frequencies.iter().zip(psd.power_db()) {
            if db.is_finite() {
                current.push((f, db));
            } else if !current.is_empty() {
                segments.push(std::mem::take(&mut current));
            }
        }
        if !current.is_empty() {
            segments.push(current);
        }

        let x_min = psd.frequencies.first().copied().unwrap_or(0.0);
        let x_max = psd.frequencies.last().copied().unwrap_or(0.0);

        let (y_min, y_max) = segments
            .iter()
            .flatten()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(_, y)| {
                (lo.min(y), hi.max(y))
            });

        Self {
            title: title.into(),
            segments,
            x_range: widen(x_min, x_max, 0.0),
            y_range: widen(y_min, y_max, 0.05),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Axis range with a relative margin; empty or zero-width ranges are
/// widened so that every backend gets a drawable span.
fn widen(min: f64, max: f64, margin: f64) -> Range<f64> {
    if !(min.is_finite() && max.is_finite()) {
        return -1.0..1.0;
    }
    if max - min <= f64::EPSILON * max.abs().max(1.0) {
        return (min - 1.0)..(max + 1.0);
    }
    let pad = (max - min) * margin;
    (min - pad)..(max + pad)
}

/// Round tick positions (1/2/5 steps) covering `range`, at most about
/// `max_count` of them.
pub fn nice_ticks(range: &Range<f64>, max_count: usize) -> Vec<f64> {
    let (min, max) = (range.start, range.end);
    if max_count == 0 || !(min.is_finite() && max.is_finite()) || max <= min {
        return Vec::new();
    }
    let raw = (max - min) / max_count as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let step = [1.0, 2.0, 5.0, 10.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|&s| s >= raw)
        .unwrap_or(10.0 * magnitude);

    let first = (min / step).ceil();
    let last = (max / step + 1e-9).floor();
    let count = (last - first).max(-1.0) as i64 + 1;
    (0..count)
        .map(|i| {
            let v = (first + i as f64) * step;
            // Avoid printing -0
            if v == 0.0 {
                0.0
            } else {
                v
            }
        })
        .collect()
}

/// Short SI-suffixed tick label, e.g. 2400000 -> "2.4M"
pub fn format_tick(value: f64) -> String {
    let abs = value.abs();
    let (scaled, suffix) = if abs >= 1e9 {
        (value / 1e9, "G")
    } else if abs >= 1e6 {
        (value / 1e6, "M")
    } else if abs >= 1e3 {
        (value / 1e3, "k")
    } else {
        (value, "")
    };
    let text = format!("{:.3}", scaled);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    let text = if text == "-0" { "0" } else { text };
    format!("{}{}", text, suffix)
}

/// Where the plot goes, picked once before the pipeline runs
pub enum Renderer {
    Screen(ScreenRenderer),
    File(FileRenderer),
}

impl Renderer {
    pub fn for_target(target: &OutputTarget) -> Result<Self, RenderError> {
        match target {
            OutputTarget::Screen => Ok(Renderer::Screen(ScreenRenderer::default())),
            OutputTarget::File(path) => Ok(Renderer::File(FileRenderer::new(path)?)),
        }
    }

    pub fn render(&self, plot: PlotData) -> Result<(), RenderError> {
        if plot.is_empty() {
            log::warn!("PSD has no finite power values, plotting empty axes");
        }
        match self {
            Renderer::Screen(screen) => screen.render(plot),
            Renderer::File(file) => file.render(&plot),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn psd(frequencies: Vec<f64>, power: Vec<f64>) -> Psd {
        Psd {
            frequencies,
            power,
            sample_rate: 8.0,
            nfft: 4,
            segments: 1,
            two_sided: true,
        }
    }

    #[test]
    fn zero_power_bins_split_the_curve() {
        let plot = PlotData::from_psd(
            &psd(vec![-2.0, -1.0, 0.0, 1.0], vec![1.0, 0.0, 10.0, 100.0]),
            "test",
        );
        assert_eq!(plot.segments.len(), 2);
        assert_eq!(plot.segments[0], vec![(-2.0, 0.0)]);
        assert_eq!(plot.segments[1], vec![(0.0, 10.0), (1.0, 20.0)]);
        assert_eq!(plot.x_range, -2.0..1.0);
        assert_eq!(plot.y_range, -1.0..21.0);
    }

    #[test]
    fn all_zero_power_still_has_ranges() {
        let plot = PlotData::from_psd(&psd(vec![0.0, 1.0, 2.0], vec![0.0; 3]), "zeros");
        assert!(plot.is_empty());
        assert_eq!(plot.y_range, -1.0..1.0);
        assert_eq!(plot.x_range, 0.0..2.0);
    }

    #[test]
    fn flat_power_widens_y_axis() {
        let plot = PlotData::from_psd(&psd(vec![0.0, 1.0], vec![1.0, 1.0]), "flat");
        assert_eq!(plot.y_range, -1.0..1.0);
    }

    #[test]
    fn ticks_use_round_steps() {
        assert_eq!(nice_ticks(&(0.0..10.0), 5), vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
        assert_eq!(nice_ticks(&(-500.0..500.0), 4), vec![-500.0, 0.0, 500.0]);
        assert_eq!(nice_ticks(&(-1.3..1.3), 3), vec![-1.0, 0.0, 1.0]);
        assert!(nice_ticks(&(1.0..1.0), 5).is_empty());
        assert!(nice_ticks(&(0.0..1.0), 0).is_empty());
    }

    #[test]
    fn tick_labels_use_si_suffixes() {
        assert_eq!(format_tick(0.0), "0");
        assert_eq!(format_tick(-500.0), "-500");
        assert_eq!(format_tick(2_400_000.0), "2.4M");
        assert_eq!(format_tick(-12_500.0), "-12.5k");
        assert_eq!(format_tick(1.5e9), "1.5G");
        assert_eq!(format_tick(-0.0001), "0");
        assert_eq!(format_tick(-42.25), "-42.25");
    }

    #[test]
    fn renderer_follows_output_target() {
        assert!(matches!(
            Renderer::for_target(&OutputTarget::Screen),
            Ok(Renderer::Screen(_))
        ));
        assert!(matches!(
            Renderer::for_target(&OutputTarget::File(PathBuf::from("psd.png"))),
            Ok(Renderer::File(_))
        ));
        assert!(matches!(
            Renderer::for_target(&OutputTarget::File(PathBuf::from("psd.gif"))),
            Err(RenderError::UnsupportedFormat(_))
        ));
    }
}
