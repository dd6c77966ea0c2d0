use std::collections::BTreeSet;
use std::f32::consts::{FRAC_PI_2, TAU};

use eframe::egui::{self, Align2, Color32, FontId, Pos2, Sense, Shape, Stroke, Ui};
use egui_plot::{Bar, BarChart, BoxElem, BoxPlot, BoxSpread, GridMark, Plot};
use esim_dashboard::data::aggregate::{ShareRow, SpreadRow};
use esim_dashboard::data::view::{ChartKind, Encoding, Measure};
use esim_dashboard::{Dataset, DimValue, ViewData};

use crate::color::{BlueScale, ColorMap};
use crate::state::AppState;
use crate::ui::table::plans_table;

const CHART_HEIGHT: f32 = 320.0;

// ---------------------------------------------------------------------------
// Page body (central panel)
// ---------------------------------------------------------------------------

/// Render every chart of the active page, two per row.
pub fn page_view(ui: &mut Ui, state: &AppState) {
    let (Some(dataset), Some(report)) = (&state.dataset, &state.report) else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a plan dataset to start  (File → Open…)");
        });
        return;
    };

    ui.heading(report.page.heading());
    if report.panels.is_empty() {
        ui.label("No analysis is available for this page yet.");
        return;
    }

    let charts: Vec<(&Encoding, &ViewData)> = report
        .panels
        .iter()
        .flat_map(|p| p.request.charts.iter().map(move |c| (c, &p.data)))
        .collect();

    for (row, pair) in charts.chunks(2).enumerate() {
        ui.columns(pair.len(), |cols: &mut [Ui]| {
            for (col, (ui, (encoding, data))) in cols.iter_mut().zip(pair).enumerate() {
                chart(ui, row * 2 + col, encoding, data, dataset);
            }
        });
        ui.add_space(12.0);
    }
}

fn chart(ui: &mut Ui, id: usize, encoding: &Encoding, data: &ViewData, dataset: &Dataset) {
    ui.strong(encoding.title);
    if data.is_empty() {
        ui.label("No plans match the current filters.");
        return;
    }

    match (encoding.kind, data) {
        (ChartKind::Choropleth, data) => country_tiles(ui, encoding, &keyed_values(encoding, data)),
        (ChartKind::Bar, data) => bar_chart(ui, id, encoding, &keyed_values(encoding, data)),
        (ChartKind::Pie, ViewData::Shares(rows)) => donut(ui, rows),
        (ChartKind::Box, ViewData::Spread(rows)) => box_chart(ui, id, encoding, rows),
        (ChartKind::Table, ViewData::Rows(rows)) => plans_table(ui, dataset, rows),
        (kind, other) => {
            log::warn!("No renderer for {kind:?} over {other:?}");
        }
    }
}

/// Flatten a result into `(label, value)` pairs for the encoding's measure.
fn keyed_values(encoding: &Encoding, data: &ViewData) -> Vec<(String, f64)> {
    match data {
        ViewData::Grouped(result) => result
            .rows
            .iter()
            .map(|r| (r.key.to_string(), r.value))
            .collect(),
        ViewData::Joint(rows) => rows
            .iter()
            .filter_map(|r| {
                let value = match encoding.measure {
                    Measure::Count => Some(r.count as f64),
                    Measure::Mean => r.mean,
                };
                value.map(|v| (r.key.to_string(), v))
            })
            .collect(),
        ViewData::Shares(rows) => rows
            .iter()
            .map(|r| (r.key.to_string(), r.count as f64))
            .collect(),
        ViewData::Spread(_) | ViewData::Rows(_) => Vec::new(),
    }
}

fn format_value(measure: Measure, value: f64) -> String {
    match measure {
        Measure::Count => format!("{value:.0}"),
        Measure::Mean => format!("{value:.2}"),
    }
}

/// X-axis formatter showing category labels at integer positions.
fn category_axis(labels: Vec<String>) -> impl Fn(GridMark, &std::ops::RangeInclusive<f64>) -> String {
    move |mark, _range| {
        let i = mark.value.round();
        if (mark.value - i).abs() > 1e-6 || i < 0.0 {
            return String::new();
        }
        labels.get(i as usize).cloned().unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Bar chart
// ---------------------------------------------------------------------------

fn bar_chart(ui: &mut Ui, id: usize, encoding: &Encoding, values: &[(String, f64)]) {
    let scale = BlueScale::over(values.iter().map(|(_, v)| *v));
    let measure = encoding.measure;

    let bars: Vec<Bar> = values
        .iter()
        .enumerate()
        .map(|(i, (label, value))| {
            let bar = Bar::new(i as f64, *value).name(label).width(0.7);
            if encoding.color_by_value {
                bar.fill(scale.color_for(*value))
            } else {
                bar
            }
        })
        .collect();
    let labels = values.iter().map(|(label, _)| label.clone()).collect();

    Plot::new(("bar", id))
        .height(CHART_HEIGHT)
        .x_axis_label(encoding.x)
        .y_axis_label(encoding.y)
        .x_axis_formatter(category_axis(labels))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).element_formatter(Box::new(
                move |bar: &Bar, _chart: &BarChart| format!("{}: {}", bar.name, format_value(measure, bar.value)),
            )));
        });
}

// ---------------------------------------------------------------------------
// Country map tiles
// ---------------------------------------------------------------------------

/// One tile per country, shaded by value on the blue scale.
fn country_tiles(ui: &mut Ui, encoding: &Encoding, values: &[(String, f64)]) {
    let scale = BlueScale::over(values.iter().map(|(_, v)| *v));
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));

    egui::ScrollArea::vertical()
        .id_salt(("tiles", encoding.title))
        .max_height(CHART_HEIGHT)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal_wrapped(|ui: &mut Ui| {
                for (country, value) in &sorted {
                    let (rect, response) =
                        ui.allocate_exact_size(egui::vec2(112.0, 44.0), Sense::hover());
                    let painter = ui.painter();
                    painter.rect_filled(rect, 4.0, scale.color_for(*value));
                    painter.text(
                        rect.center(),
                        Align2::CENTER_CENTER,
                        format!("{country}\n{}", format_value(encoding.measure, *value)),
                        FontId::proportional(11.0),
                        scale.text_color_for(*value),
                    );
                    response.on_hover_text(format!(
                        "{country}: {} {}",
                        format_value(encoding.measure, *value),
                        encoding.y
                    ));
                }
            });
        });

    scale_legend(ui, &scale, encoding);
}

fn scale_legend(ui: &mut Ui, scale: &BlueScale, encoding: &Encoding) {
    let (min, max) = scale.range();
    ui.horizontal(|ui: &mut Ui| {
        ui.label(format_value(encoding.measure, min));
        let (rect, _) = ui.allocate_exact_size(egui::vec2(160.0, 10.0), Sense::hover());
        let steps = 16;
        for step in 0..steps {
            let t0 = step as f32 / steps as f32;
            let t1 = (step + 1) as f32 / steps as f32;
            let segment = egui::Rect::from_min_max(
                egui::pos2(rect.left() + rect.width() * t0, rect.top()),
                egui::pos2(rect.left() + rect.width() * t1, rect.bottom()),
            );
            let value = min + (max - min) * t0 as f64;
            ui.painter().rect_filled(segment, 0.0, scale.color_for(value));
        }
        ui.label(format_value(encoding.measure, max));
        ui.label(encoding.y);
    });
}

// ---------------------------------------------------------------------------
// Donut
// ---------------------------------------------------------------------------

fn polar(center: Pos2, radius: f32, angle: f32) -> Pos2 {
    center + egui::vec2(angle.cos(), angle.sin()) * radius
}

/// Pie with a hole, largest slice first, labelled with percent + label.
fn donut(ui: &mut Ui, rows: &[ShareRow]) {
    let mut rows = rows.to_vec();
    rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
    let keys: BTreeSet<DimValue> = rows.iter().map(|r| r.key.clone()).collect();
    let colors = ColorMap::new(&keys);

    let (response, painter) =
        ui.allocate_painter(egui::vec2(ui.available_width(), CHART_HEIGHT), Sense::hover());
    let rect = response.rect;
    let center = rect.center();
    let outer = rect.width().min(rect.height()) * 0.45;
    let inner = outer * 0.4;

    let mut start = -FRAC_PI_2;
    for row in &rows {
        let sweep = row.fraction as f32 * TAU;
        let color = colors.color_for(&row.key);
        let steps = ((row.fraction * 96.0).ceil() as usize).max(1);
        for s in 0..steps {
            let a0 = start + sweep * s as f32 / steps as f32;
            let a1 = start + sweep * (s + 1) as f32 / steps as f32;
            painter.add(Shape::convex_polygon(
                vec![
                    polar(center, inner, a0),
                    polar(center, outer, a0),
                    polar(center, outer, a1),
                    polar(center, inner, a1),
                ],
                color,
                Stroke::NONE,
            ));
        }
        if row.fraction >= 0.03 {
            painter.text(
                polar(center, (inner + outer) / 2.0, start + sweep / 2.0),
                Align2::CENTER_CENTER,
                format!("{}\n{:.1}%", row.key, row.fraction * 100.0),
                FontId::proportional(12.0),
                Color32::WHITE,
            );
        }
        start += sweep;
    }

    ui.horizontal_wrapped(|ui: &mut Ui| {
        for (label, color) in colors.legend_entries() {
            ui.label(egui::RichText::new("■").color(color));
            ui.label(label);
        }
    });
}

// ---------------------------------------------------------------------------
// Box plot
// ---------------------------------------------------------------------------

fn box_chart(ui: &mut Ui, id: usize, encoding: &Encoding, rows: &[SpreadRow]) {
    let mut rows = rows.to_vec();
    rows.sort_by(|a, b| a.key.cmp(&b.key));
    let keys: BTreeSet<DimValue> = rows.iter().map(|r| r.key.clone()).collect();
    let colors = ColorMap::new(&keys);

    let boxes: Vec<BoxElem> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let s = row.summary;
            let color = colors.color_for(&row.key);
            BoxElem::new(i as f64, BoxSpread::new(s.min, s.q1, s.median, s.q3, s.max))
                .name(row.key.to_string())
                .box_width(0.6)
                .fill(color.linear_multiply(0.3))
                .stroke(Stroke::new(1.5, color))
        })
        .collect();
    let labels = rows.iter().map(|r| r.key.to_string()).collect();

    Plot::new(("box", id))
        .height(CHART_HEIGHT)
        .x_axis_label(encoding.x)
        .y_axis_label(encoding.y)
        .x_axis_formatter(category_axis(labels))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.box_plot(BoxPlot::new(boxes));
        });
}
