use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::register_font;
use std::path::{Path, PathBuf};
use svg2pdf::usvg;

use super::{format_tick, PlotData, RenderError, X_LABEL, Y_LABEL};

const DEFAULT_SIZE: (u32, u32) = (800, 600);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Bmp,
    Svg,
    Pdf,
}

impl ImageFormat {
    /// Pick the encoder from the file extension. No extension means PNG.
    pub fn from_path(path: &Path) -> Result<Self, RenderError> {
        let ext = match path.extension() {
            None => return Ok(ImageFormat::Png),
            Some(ext) => ext.to_str().map(|ext| ext.to_ascii_lowercase()),
        };
        match ext.as_deref() {
            Some("png") => Ok(ImageFormat::Png),
            Some("jpg") | Some("jpeg") => Ok(ImageFormat::Jpeg),
            Some("bmp") => Ok(ImageFormat::Bmp),
            Some("svg") => Ok(ImageFormat::Svg),
            Some("pdf") => Ok(ImageFormat::Pdf),
            _ => Err(RenderError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Renders the PSD into an image file
#[derive(Debug, Clone)]
pub struct FileRenderer {
    path: PathBuf,
    format: ImageFormat,
    size: (u32, u32),
}

impl FileRenderer {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, RenderError> {
        let path = path.as_ref().to_path_buf();
        let format = ImageFormat::from_path(&path)?;
        Ok(Self {
            path,
            format,
            size: DEFAULT_SIZE,
        })
    }

    pub fn render(&self, plot: &PlotData) -> Result<(), RenderError> {
        register_plot_font()?;
        log::info!("Writing {:?} plot to {}", self.format, self.path.display());

        match self.format {
            ImageFormat::Svg => {
                let root = SVGBackend::new(&self.path, self.size).into_drawing_area();
                draw_psd(&root, plot).map_err(|e| RenderError::Draw(e.to_string()))?;
                root.present().map_err(|e| {
                    RenderError::Draw(format!("{}: {}", self.path.display(), e))
                })?;
            }
            ImageFormat::Pdf => {
                let pdf = render_pdf(plot, self.size)?;
                std::fs::write(&self.path, pdf).map_err(|e| {
                    RenderError::Draw(format!("{}: {}", self.path.display(), e))
                })?;
            }
            ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::Bmp => {
                let root = BitMapBackend::new(&self.path, self.size).into_drawing_area();
                draw_psd(&root, plot).map_err(|e| RenderError::Draw(e.to_string()))?;
                root.present().map_err(|e| {
                    RenderError::Draw(format!("{}: {}", self.path.display(), e))
                })?;
            }
        }
        Ok(())
    }
}

/// Plot text uses the font egui ships with, so rendering does not depend
/// on what is installed on the host.
fn register_plot_font() -> Result<(), RenderError> {
    register_font("sans-serif", FontStyle::Normal, epaint_default_fonts::UBUNTU_LIGHT)
        .map_err(|_| RenderError::Font("embedded Ubuntu Light is not a valid font".to_string()))
}

/// Draw the chart as SVG in memory, then convert it to a single-page PDF.
/// The embedded plot font is loaded into the converter so axis text survives.
fn render_pdf(plot: &PlotData, size: (u32, u32)) -> Result<Vec<u8>, RenderError> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
        draw_psd(&root, plot).map_err(|e| RenderError::Draw(e.to_string()))?;
        root.present().map_err(|e| RenderError::Draw(e.to_string()))?;
    }

    let mut options = usvg::Options::default();
    let fontdb = options.fontdb_mut();
    fontdb.load_font_data(epaint_default_fonts::UBUNTU_LIGHT.to_vec());
    let family = fontdb
        .faces()
        .next()
        .and_then(|face| face.families.first())
        .map(|(name, _)| name.clone());
    if let Some(family) = family {
        fontdb.set_sans_serif_family(family);
    }

    let tree = usvg::Tree::from_str(&svg, &options)
        .map_err(|e| RenderError::Draw(format!("invalid SVG for PDF conversion: {}", e)))?;
    svg2pdf::to_pdf(
        &tree,
        svg2pdf::ConversionOptions::default(),
        svg2pdf::PageOptions::default(),
    )
    .map_err(|e| RenderError::Draw(format!("PDF conversion failed: {}", e)))
}

fn draw_psd<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    plot: &PlotData,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(root)
        .caption(&plot.title, ("sans-serif", 20))
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(65)
        .build_cartesian_2d(plot.x_range.clone(), plot.y_range.clone())?;

    chart
        .configure_mesh()
        .x_desc(X_LABEL)
        .y_desc(Y_LABEL)
        .x_label_formatter(&|x| format_tick(*x))
        .y_label_formatter(&|y| format!("{:.0}", y))
        .draw()?;

    for segment in &plot.segments {
        chart.draw_series(LineSeries::new(segment.iter().copied(), &BLUE))?;
    }

    Ok(())
}
