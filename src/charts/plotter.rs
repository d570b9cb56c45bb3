//! Chart Plotter Module
//! Draws the dashboard's pie, bar, and monthly line charts with egui_plot.

use crate::data::codebook;
use crate::stats::{FrequencyTable, MonthCount};
use egui::{Color32, Pos2, RichText, Sense, Shape, Stroke, Vec2};
use egui_plot::{Bar, BarChart, Line, Plot, PlotPoints, Points};

/// Color for the monthly trend line
pub const TREND_COLOR: Color32 = Color32::from_rgb(52, 152, 219); // Blue

pub const PALETTE: [Color32; 10] = [
    Color32::from_rgb(231, 76, 60),  // Red
    Color32::from_rgb(46, 204, 113), // Green
    Color32::from_rgb(155, 89, 182), // Purple
    Color32::from_rgb(243, 156, 18), // Orange
    Color32::from_rgb(26, 188, 156), // Teal
    Color32::from_rgb(233, 30, 99),  // Pink
    Color32::from_rgb(0, 188, 212),  // Cyan
    Color32::from_rgb(255, 87, 34),  // Deep Orange
    Color32::from_rgb(121, 85, 72),  // Brown
    Color32::from_rgb(96, 125, 139), // Blue Grey
];

/// Maximum characters kept in a bar axis label
const AXIS_LABEL_CHARS: usize = 14;

/// Draws the dashboard charts using egui_plot and the egui painter.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Get color for a category slice.
    pub fn slice_color(index: usize) -> Color32 {
        PALETTE[index % PALETTE.len()]
    }

    /// Draw a vertical bar chart of a frequency table.
    /// X-axis: category labels, Y-axis: counts.
    pub fn draw_bar_chart(ui: &mut egui::Ui, table: &FrequencyTable, height: f32) {
        let labels: Vec<String> = table.entries.iter().map(|e| e.label.clone()).collect();

        let bars: Vec<Bar> = table
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                Bar::new(i as f64, f64::from(entry.count))
                    .width(0.6)
                    .fill(Self::slice_color(i))
                    .name(&entry.label)
            })
            .collect();

        Plot::new(format!("bar_{}", table.column))
            .height(height)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .include_y(0.0)
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                // Only integral marks carry a category
                if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
                    return String::new();
                }
                labels
                    .get(idx as usize)
                    .map(|label| Self::truncate_label(label, AXIS_LABEL_CHARS))
                    .unwrap_or_default()
            })
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars));
            });
    }

    /// Draw a pie chart with a count/percentage legend.
    pub fn draw_pie_chart(ui: &mut egui::Ui, table: &FrequencyTable, size: f32) {
        let total = table.total();
        if total == 0 {
            return;
        }

        ui.horizontal(|ui| {
            let (rect, _) = ui.allocate_exact_size(Vec2::splat(size), Sense::hover());
            let painter = ui.painter_at(rect);
            let center = rect.center();
            let radius = size * 0.45;

            // Start at twelve o'clock, clockwise
            let mut angle = -std::f64::consts::FRAC_PI_2;
            for (i, entry) in table.entries.iter().enumerate() {
                let sweep = f64::from(entry.count) / f64::from(total) * std::f64::consts::TAU;
                let color = Self::slice_color(i);

                // Short triangle fan; each triangle stays convex
                let steps = ((sweep / 0.05).ceil() as usize).max(1);
                for step in 0..steps {
                    let a0 = angle + sweep * step as f64 / steps as f64;
                    let a1 = angle + sweep * (step + 1) as f64 / steps as f64;
                    painter.add(Shape::convex_polygon(
                        vec![
                            center,
                            Self::arc_point(center, radius, a0),
                            Self::arc_point(center, radius, a1),
                        ],
                        color,
                        Stroke::NONE,
                    ));
                }

                angle += sweep;
            }

            ui.vertical(|ui| {
                for (i, entry) in table.entries.iter().enumerate() {
                    let percent = 100.0 * f64::from(entry.count) / f64::from(total);
                    ui.horizontal(|ui| {
                        let (swatch, _) =
                            ui.allocate_exact_size(egui::vec2(12.0, 12.0), Sense::hover());
                        ui.painter().rect_filled(swatch, 2.0, Self::slice_color(i));
                        ui.label(
                            RichText::new(format!(
                                "{} ({}, {:.0}%)",
                                entry.label, entry.count, percent
                            ))
                            .size(12.0),
                        );
                    });
                }
            });
        });
    }

    /// Draw the monthly evolution line with point markers.
    /// X-axis: months of the selected year, Y-axis: record counts.
    pub fn draw_monthly_line(ui: &mut egui::Ui, monthly: &[MonthCount], height: f32) {
        let coords: Vec<[f64; 2]> = monthly
            .iter()
            .map(|mc| [f64::from(mc.mes), f64::from(mc.count)])
            .collect();

        Plot::new("evolucao_mensal")
            .height(height)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .include_y(0.0)
            .x_axis_formatter(|mark, _range| {
                let mes = mark.value.round();
                if (mark.value - mes).abs() > 1e-6 {
                    return String::new();
                }
                codebook::mes_nome(mes as i32)
                    .map(|nome| nome.chars().take(3).collect())
                    .unwrap_or_default()
            })
            .show(ui, |plot_ui| {
                plot_ui.line(
                    Line::new(PlotPoints::from_iter(coords.iter().copied()))
                        .color(TREND_COLOR)
                        .width(2.0),
                );
                plot_ui.points(
                    Points::new(PlotPoints::from_iter(coords.iter().copied()))
                        .radius(4.0)
                        .color(TREND_COLOR),
                );
            });
    }

    fn arc_point(center: Pos2, radius: f32, angle: f64) -> Pos2 {
        Pos2::new(
            center.x + radius * angle.cos() as f32,
            center.y + radius * angle.sin() as f32,
        )
    }

    fn truncate_label(label: &str, max_chars: usize) -> String {
        if label.chars().count() <= max_chars {
            label.to_string()
        } else {
            let mut truncated: String = label.chars().take(max_chars.saturating_sub(1)).collect();
            truncated.push('…');
            truncated
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn long_labels_are_truncated_on_char_boundaries() {
        assert_eq!(ChartPlotter::truncate_label("Sexo", 14), "Sexo");
        assert_eq!(
            ChartPlotter::truncate_label("Alta por término do programa de reabilitação", 14),
            "Alta por térm…"
        );
    }

    #[test]
    fn palette_wraps_around() {
        assert_eq!(ChartPlotter::slice_color(0), ChartPlotter::slice_color(10));
        assert_eq!(ChartPlotter::slice_color(3), ChartPlotter::slice_color(13));
    }
}
