//! Plotters-powered grade histogram widget for Ratatui.
//!
//! Why Plotters instead of Ratatui's built-in `BarChart` widget?
//! - bars sit on a real score axis, so band widths stay proportional
//! - boundary and average markers are just more series
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
// `ratatui::style::Color` below shadows the plotters trait of the same name.
use plotters::style::Color as _;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// One bar of the histogram: a band's extent and its count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub lower: f64,
    pub upper: f64,
    pub count: f64,
    pub color: RGBColor,
}

/// A lightweight, render-only chart description.
///
/// All series and bounds are computed outside the render call.
pub struct HistogramChart<'a> {
    pub bars: &'a [Bar],
    /// Boundary positions, drawn as thin vertical lines.
    pub boundaries: &'a [f64],
    pub average: Option<f64>,
    /// X bounds (score range).
    pub x_bounds: [f64; 2],
    /// Y bounds (student count).
    pub y_bounds: [f64; 2],
    pub x_label: &'a str,
    pub y_label: &'a str,
}

/// Band colours, lowest band first. Nine entries cover both layouts.
pub const BAND_COLORS: [RGBColor; 9] = [
    RGBColor(220, 50, 47),   // F
    RGBColor(203, 75, 22),   // E
    RGBColor(181, 137, 0),   // D
    RGBColor(211, 54, 130),  // C-
    RGBColor(108, 113, 196), // C
    RGBColor(38, 139, 210),  // B-
    RGBColor(42, 161, 152),  // B
    RGBColor(133, 153, 0),   // A-
    RGBColor(0, 200, 83),    // A
];

/// Colour for band `index` out of `bands`, spread over the palette so the
/// four-band layout still runs red to green.
pub fn band_color(index: usize, bands: usize) -> RGBColor {
    if bands <= 1 {
        return BAND_COLORS[0];
    }
    let pos = index.min(bands - 1) * (BAND_COLORS.len() - 1) / (bands - 1);
    BAND_COLORS[pos]
}

impl<'a> Widget for HistogramChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(self.x_label)
                .y_desc(self.y_label)
                .x_labels(6)
                .y_labels(5)
                .x_label_formatter(&|v| format!("{v:.0}"))
                .y_label_formatter(&|v| format!("{v:.0}"))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            // 1) One filled rectangle per non-empty band.
            chart.draw_series(
                self.bars
                    .iter()
                    .filter(|b| b.count > 0.0 && b.upper > b.lower)
                    .map(|b| Rectangle::new([(b.lower, 0.0), (b.upper, b.count)], b.color.filled())),
            )?;

            // 2) Boundary positions.
            let boundary_color = RGBColor(120, 120, 120);
            for &x in self.boundaries {
                chart.draw_series(LineSeries::new([(x, y0), (x, y1)], &boundary_color))?;
            }

            // 3) Average marker on top.
            if let Some(avg) = self.average {
                let avg_color = RGBColor(255, 255, 0);
                chart.draw_series(LineSeries::new([(avg, y0), (avg, y1)], &avg_color))?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}
