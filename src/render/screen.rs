use eframe::egui::{self, pos2, Align2, Color32, FontId, Pos2, Rect, Response, Sense, Shape, Stroke, Ui, Widget};

use super::{format_tick, nice_ticks, PlotData, RenderError, X_LABEL, Y_LABEL};

/// Shows the PSD in a native window and blocks until it is closed
#[derive(Debug, Clone)]
pub struct ScreenRenderer {
    window_size: [f32; 2],
}

impl Default for ScreenRenderer {
    fn default() -> Self {
        Self {
            window_size: [960.0, 640.0],
        }
    }
}

impl ScreenRenderer {
    pub fn render(&self, plot: PlotData) -> Result<(), RenderError> {
        let options = eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size(self.window_size)
                .with_title(plot.title.clone()),
            ..Default::default()
        };

        log::info!("Opening PSD window (close it to exit)");
        eframe::run_native(
            "iq-psd",
            options,
            Box::new(|_cc| Ok(Box::new(PsdViewer { chart: PsdChart { plot } }))),
        )
        .map_err(|e| RenderError::Display(e.to_string()))
    }
}

struct PsdViewer {
    chart: PsdChart,
}

impl eframe::App for PsdViewer {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add(&self.chart);
        });
    }
}

/// PSD line chart painted directly with the egui painter
struct PsdChart {
    plot: PlotData,
}

impl PsdChart {
    const LEFT_MARGIN: f32 = 70.0;
    const RIGHT_MARGIN: f32 = 20.0;
    const TOP_MARGIN: f32 = 40.0;
    const BOTTOM_MARGIN: f32 = 50.0;

    fn to_screen(&self, frame: Rect, x: f64, y: f64) -> Pos2 {
        let (xr, yr) = (&self.plot.x_range, &self.plot.y_range);
        let tx = ((x - xr.start) / (xr.end - xr.start)) as f32;
        let ty = ((y - yr.start) / (yr.end - yr.start)) as f32;
        pos2(
            frame.left() + tx * frame.width(),
            frame.bottom() - ty * frame.height(),
        )
    }

    fn from_screen(&self, frame: Rect, pos: Pos2) -> (f64, f64) {
        let (xr, yr) = (&self.plot.x_range, &self.plot.y_range);
        let tx = ((pos.x - frame.left()) / frame.width()) as f64;
        let ty = ((frame.bottom() - pos.y) / frame.height()) as f64;
        (
            xr.start + tx * (xr.end - xr.start),
            yr.start + ty * (yr.end - yr.start),
        )
    }
}

impl Widget for &PsdChart {
    fn ui(self, ui: &mut Ui) -> Response {
        let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::hover());
        let outer = response.rect;
        let frame = Rect::from_min_max(
            pos2(outer.left() + PsdChart::LEFT_MARGIN, outer.top() + PsdChart::TOP_MARGIN),
            pos2(outer.right() - PsdChart::RIGHT_MARGIN, outer.bottom() - PsdChart::BOTTOM_MARGIN),
        );
        if frame.width() <= 0.0 || frame.height() <= 0.0 {
            return response;
        }

        let text_color = ui.visuals().text_color();
        let grid = Stroke::new(1.0, Color32::from_gray(70));
        let axis = Stroke::new(1.0, text_color);
        let font = FontId::proportional(12.0);

        for x in nice_ticks(&self.plot.x_range, 10) {
            let p = self.to_screen(frame, x, self.plot.y_range.start);
            painter.line_segment([pos2(p.x, frame.top()), pos2(p.x, frame.bottom())], grid);
            painter.text(
                pos2(p.x, frame.bottom() + 4.0),
                Align2::CENTER_TOP,
                format_tick(x),
                font.clone(),
                text_color,
            );
        }
        for y in nice_ticks(&self.plot.y_range, 8) {
            let p = self.to_screen(frame, self.plot.x_range.start, y);
            painter.line_segment([pos2(frame.left(), p.y), pos2(frame.right(), p.y)], grid);
            painter.text(
                pos2(frame.left() - 6.0, p.y),
                Align2::RIGHT_CENTER,
                format!("{:.0}", y),
                font.clone(),
                text_color,
            );
        }

        // Frame
        let corners = [
            frame.left_top(),
            frame.right_top(),
            frame.right_bottom(),
            frame.left_bottom(),
            frame.left_top(),
        ];
        painter.add(Shape::line(corners.to_vec(), axis));

        for segment in &self.plot.segments {
            let points: Vec<Pos2> = segment
                .iter()
                .map(|&(x, y)| self.to_screen(frame, x, y))
                .collect();
            if points.len() == 1 {
                painter.circle_filled(points[0], 1.5, Color32::LIGHT_BLUE);
            } else {
                painter.add(Shape::line(points, Stroke::new(1.5, Color32::LIGHT_BLUE)));
            }
        }

        painter.text(
            pos2(frame.center().x, outer.top() + 8.0),
            Align2::CENTER_TOP,
            &self.plot.title,
            FontId::proportional(16.0),
            text_color,
        );
        painter.text(
            pos2(frame.center().x, outer.bottom() - 4.0),
            Align2::CENTER_BOTTOM,
            X_LABEL,
            font.clone(),
            text_color,
        );
        painter.text(
            pos2(outer.left() + 4.0, outer.top() + 8.0),
            Align2::LEFT_TOP,
            Y_LABEL,
            font.clone(),
            text_color,
        );

        if let Some(pos) = response.hover_pos().filter(|p| frame.contains(*p)) {
            let (f, db) = self.from_screen(frame, pos);
            painter.text(
                pos2(frame.right() - 4.0, frame.top() + 4.0),
                Align2::RIGHT_TOP,
                format!("{} Hz, {:.1} dB/Hz", format_tick(f), db),
                font,
                text_color,
            );
        }

        response
    }
}
