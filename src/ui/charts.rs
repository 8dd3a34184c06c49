use std::f32::consts::{FRAC_PI_2, TAU};
use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDate};
use eframe::egui::{self, Align2, Color32, FontId, Pos2, Rect, RichText, Sense, Shape, Stroke, Ui, Vec2};
use egui_plot::{Bar, BarChart, GridMark, Line, Plot, PlotPoints};

use crate::color::{heat_color, signed_color, ColorMap};
use crate::data::aggregate::{DailyPoint, Heatmap, RankedEntity, Slice};
use crate::data::model::Measure;
use crate::ui::panels::{format_count, format_money};

fn no_data(ui: &mut Ui) {
    ui.centered_and_justified(|ui: &mut Ui| {
        ui.weak("No data for the current selection.");
    });
}

// ---------------------------------------------------------------------------
// Sales trend (line chart)
// ---------------------------------------------------------------------------

fn day_number(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

fn day_label(mark: GridMark, _range: &RangeInclusive<f64>) -> String {
    NaiveDate::from_num_days_from_ce_opt(mark.value.round() as i32)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Daily sales and profit over the visible records.
pub fn sales_trend(ui: &mut Ui, series: &[DailyPoint]) {
    ui.strong("Sales Trend Over Time");
    if series.is_empty() {
        no_data(ui);
        return;
    }

    let sales: PlotPoints = series
        .iter()
        .map(|p| [day_number(p.date), p.totals.sales])
        .collect();
    let profit: PlotPoints = series
        .iter()
        .map(|p| [day_number(p.date), p.totals.profit])
        .collect();

    Plot::new("sales_trend")
        .height(300.0)
        .legend(egui_plot::Legend::default())
        .x_axis_formatter(day_label)
        .y_axis_label("USD")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.line(Line::new(sales).name("Sales").color(Color32::LIGHT_BLUE).width(1.5));
            plot_ui.line(Line::new(profit).name("Profit").color(Color32::LIGHT_GREEN).width(1.0));
        });
}

// ---------------------------------------------------------------------------
// Horizontal bar charts
// ---------------------------------------------------------------------------

/// Horizontal bars, first item at the top, one axis tick per label.
fn horizontal_bars(ui: &mut Ui, id: &str, rows: Vec<(String, f64)>, color: impl Fn(f64) -> Color32) {
    let n = rows.len();
    let labels: Vec<String> = rows.iter().map(|(l, _)| l.clone()).collect();

    let bars: Vec<Bar> = rows
        .into_iter()
        .enumerate()
        .map(|(i, (label, value))| {
            Bar::new((n - 1 - i) as f64, value)
                .name(label)
                .fill(color(value))
                .width(0.7)
        })
        .collect();

    Plot::new(id)
        .height((n as f32 * 22.0).clamp(120.0, 520.0))
        .y_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            let pos = mark.value.round();
            if (mark.value - pos).abs() > 1e-6 || pos < 0.0 {
                return String::new();
            }
            n.checked_sub(1 + pos as usize)
                .and_then(|i| labels.get(i))
                .cloned()
                .unwrap_or_default()
        })
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal());
        });
}

/// Sales per state, largest first.
pub fn state_sales(ui: &mut Ui, slices: &[Slice]) {
    ui.strong("Sales by State");
    if slices.is_empty() {
        no_data(ui);
        return;
    }
    let rows = slices.iter().map(|s| (s.key.clone(), s.value)).collect();
    horizontal_bars(ui, "state_sales", rows, |_| Color32::from_rgb(70, 130, 200));
}

/// Profit per sub-category, most profitable first.
pub fn sub_category_profit(ui: &mut Ui, slices: &[Slice]) {
    ui.strong("Profitability by Sub-Category");
    if slices.is_empty() {
        no_data(ui);
        return;
    }
    let rows = slices.iter().map(|s| (s.key.clone(), s.value)).collect();
    horizontal_bars(ui, "sub_category_profit", rows, signed_color);
}

/// Top entities by the selected measure.
pub fn ranking_chart(ui: &mut Ui, ranking: &[RankedEntity], measure: Measure) {
    if ranking.is_empty() {
        no_data(ui);
        return;
    }
    let rows = ranking
        .iter()
        .map(|e| (e.name.clone(), e.totals.get(measure)))
        .collect();
    horizontal_bars(ui, "entity_ranking", rows, signed_color);
}

pub fn ranking_table(ui: &mut Ui, ranking: &[RankedEntity]) {
    egui::Grid::new("ranking_table")
        .striped(true)
        .num_columns(6)
        .show(ui, |ui: &mut Ui| {
            for head in ["#", "Name", "Sales", "Profit", "Quantity", "Margin"] {
                ui.strong(head);
            }
            ui.end_row();

            for (i, e) in ranking.iter().enumerate() {
                ui.label(format!("{}", i + 1));
                ui.label(&e.name);
                ui.label(format_money(e.totals.sales));
                ui.label(format_money(e.totals.profit));
                ui.label(format_count(e.totals.quantity));
                ui.label(format!("{:.1}%", e.totals.margin() * 100.0));
                ui.end_row();
            }
        });
}

// ---------------------------------------------------------------------------
// Donut chart
// ---------------------------------------------------------------------------

/// Proportional breakdown drawn as a donut. Only positive values have a
/// meaningful share of a whole, so other keys are listed but not drawn.
pub fn breakdown_pie(ui: &mut Ui, slices: &[Slice]) {
    let positive: f64 = slices.iter().filter(|s| s.value > 0.0).map(|s| s.value).sum();
    if positive <= 0.0 {
        no_data(ui);
        return;
    }

    let colors = ColorMap::new(slices.iter().map(|s| s.key.as_str()));
    let size = ui.available_width().clamp(160.0, 320.0);
    let (rect, _response) = ui.allocate_exact_size(Vec2::splat(size), Sense::hover());
    let painter = ui.painter_at(rect);
    let center = rect.center();
    let radius = size * 0.45;

    let mut start = -FRAC_PI_2;
    for s in slices.iter().filter(|s| s.value > 0.0) {
        let sweep = (s.value / positive) as f32 * TAU;
        let color = colors.color_for(&s.key);
        // Fan of thin triangles, each convex.
        let steps = ((sweep / TAU) * 120.0).ceil().max(1.0) as usize;
        for k in 0..steps {
            let a0 = start + sweep * k as f32 / steps as f32;
            let a1 = start + sweep * (k + 1) as f32 / steps as f32;
            painter.add(Shape::convex_polygon(
                vec![
                    center,
                    center + radius * Vec2::angled(a0),
                    center + radius * Vec2::angled(a1),
                ],
                color,
                Stroke::NONE,
            ));
        }
        start += sweep;
    }
    painter.circle_filled(center, radius * 0.3, ui.visuals().panel_fill);

    for s in slices {
        ui.horizontal(|ui: &mut Ui| {
            ui.label(RichText::new("■").color(colors.color_for(&s.key)));
            ui.label(format!("{}  {:.2}  ({:.1}%)", s.key, s.value, s.share * 100.0));
        });
    }
}

// ---------------------------------------------------------------------------
// Heatmap
// ---------------------------------------------------------------------------

const CELL: Vec2 = Vec2::new(64.0, 20.0);
const ROW_LABEL_WIDTH: f32 = 70.0;

/// Order lines per month and region, annotated with counts.
pub fn order_heatmap(ui: &mut Ui, heatmap: &Heatmap) {
    if heatmap.is_empty() {
        no_data(ui);
        return;
    }

    ui.weak(format!("{} order lines", heatmap.total()));
    let max = heatmap.max().max(1) as f32;
    let size = Vec2::new(
        ROW_LABEL_WIDTH + CELL.x * heatmap.regions.len() as f32,
        CELL.y * (heatmap.months.len() + 1) as f32,
    );
    let (rect, _response) = ui.allocate_exact_size(size, Sense::hover());
    let painter = ui.painter_at(rect);
    let text_color = ui.visuals().text_color();
    let font = FontId::proportional(11.0);

    for (c, region) in heatmap.regions.iter().enumerate() {
        let pos = rect.min + Vec2::new(ROW_LABEL_WIDTH + CELL.x * (c as f32 + 0.5), CELL.y * 0.5);
        painter.text(pos, Align2::CENTER_CENTER, region, font.clone(), text_color);
    }

    for (r, month) in heatmap.months.iter().enumerate() {
        let y = CELL.y * (r + 1) as f32;
        painter.text(
            rect.min + Vec2::new(4.0, y + CELL.y * 0.5),
            Align2::LEFT_CENTER,
            month,
            font.clone(),
            text_color,
        );

        for (c, count) in heatmap.counts[r].iter().enumerate() {
            let min: Pos2 = rect.min + Vec2::new(ROW_LABEL_WIDTH + CELL.x * c as f32, y);
            let cell = Rect::from_min_size(min, CELL).shrink(0.5);
            painter.rect_filled(cell, 0.0, heat_color(*count as f32 / max));
            painter.text(
                cell.center(),
                Align2::CENTER_CENTER,
                count.to_string(),
                font.clone(),
                Color32::BLACK,
            );
        }
    }
}
