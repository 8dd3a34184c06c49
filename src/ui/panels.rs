use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::data::filter::Selection;
use crate::data::model::{Dimension, Measure};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filter Data");
    ui.separator();

    if state.dataset.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            if ui.button("Clear all filters").clicked() {
                state.clear_filters();
            }
            ui.separator();

            // ---- Cascading per-dimension filters (collapsible) ----
            let dimensions = state.filters.dimensions().to_vec();
            for dim in dimensions {
                dimension_filter(ui, state, dim);
            }

            ui.separator();
            date_filter(ui, state);
        });
}

fn dimension_filter(ui: &mut Ui, state: &mut AppState, dim: Dimension) {
    // Clone what we need so we can mutate state inside the closure.
    let options = state.resolution.options_for(dim).to_vec();
    let selection = state.filters.selection(dim).clone();

    let n_total = options.len();
    let n_selected = match &selection {
        Selection::All => n_total,
        Selection::Values(_) => options.iter().filter(|o| selection.contains(o)).count(),
    };
    let header_text = format!("{dim}  ({n_selected}/{n_total})");

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(dim.column_name())
        .default_open(dim == Dimension::Region)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    state.select_all(dim);
                }
                if ui.small_button("None").clicked() {
                    state.select_none(dim);
                }
            });

            if options.is_empty() {
                ui.weak("No options for the filters above.");
            }

            for value in &options {
                let mut checked = selection.contains(value);
                if ui.checkbox(&mut checked, value.as_str()).changed() {
                    state.toggle_filter_value(dim, value);
                }
            }
        });
}

fn date_filter(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Order Date");

    let Some(bounds) = state.date_bounds.or(state.applied_range) else {
        ui.weak("No dates in the current selection.");
        return;
    };

    let old_from = state.dates.from.unwrap_or(bounds.from());
    let old_to = state.dates.to.unwrap_or(bounds.to());
    let mut from = old_from;
    let mut to = old_to;

    egui::Grid::new("date_range").num_columns(2).show(ui, |ui: &mut Ui| {
        ui.label("From");
        ui.add(DatePickerButton::new(&mut from).id_salt("date_from"));
        ui.end_row();
        ui.label("To");
        ui.add(DatePickerButton::new(&mut to).id_salt("date_to"));
        ui.end_row();
    });

    if from != old_from {
        state.set_date_from(from);
    }
    if to != old_to {
        state.set_date_to(to);
    }

    if state.dates.from.is_some() || state.dates.to.is_some() {
        if ui.small_button("Reset dates").clicked() {
            state.dates.reset();
            state.refilter();
        }
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let has_source = state.source.is_some();
            if ui.add_enabled(has_source, egui::Button::new("Reload")).clicked() {
                state.reload();
                ui.close_menu();
            }
            if ui
                .add_enabled(has_source, egui::Button::new("Reload from disk"))
                .clicked()
            {
                state.force_reload();
                ui.close_menu();
            }
            if ui.button("Clear cache").clicked() {
                state.clear_cache();
                ui.close_menu();
            }
            ui.separator();
            if ui
                .add_enabled(state.dataset.is_some(), egui::Button::new("Export filtered CSV…"))
                .clicked()
            {
                export_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} records loaded, {} visible",
                ds.len(),
                state.visible_indices.len()
            ));
            if let Some((first, last)) = ds.date_span() {
                ui.weak(format!("orders {first} to {last}"));
            }
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

/// Non-blocking warnings from the last recompute.
pub fn notices(ui: &mut Ui, state: &AppState) {
    for notice in &state.notices {
        ui.colored_label(Color32::from_rgb(214, 150, 40), notice.message());
    }
}

// ---------------------------------------------------------------------------
// Metric cards
// ---------------------------------------------------------------------------

pub fn kpi_row(ui: &mut Ui, state: &AppState) {
    let k = &state.aggregates.kpis;
    ui.columns(4, |cols| {
        kpi_card(&mut cols[0], "Total Sales", &format_money(k.total_sales));
        kpi_card(&mut cols[1], "Total Profit", &format_money(k.total_profit));
        kpi_card(&mut cols[2], "Total Orders", &format_count(k.orders as i64));
        kpi_card(&mut cols[3], "Margin Rate", &format!("{:.2}%", k.margin_rate));
    });
}

fn kpi_card(ui: &mut Ui, title: &str, value: &str) {
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.set_min_width(ui.available_width());
        ui.label(title);
        ui.label(RichText::new(value).size(22.0).strong());
    });
}

// ---------------------------------------------------------------------------
// Chart controls
// ---------------------------------------------------------------------------

fn measure_combo(ui: &mut Ui, id: &str, measure: &mut Measure) {
    egui::ComboBox::from_id_salt(id)
        .selected_text(measure.label())
        .show_ui(ui, |ui: &mut Ui| {
            for m in Measure::ALL {
                ui.selectable_value(measure, m, m.label());
            }
        });
}

fn dimension_combo(ui: &mut Ui, id: &str, dim: &mut Dimension, choices: &[Dimension]) {
    egui::ComboBox::from_id_salt(id)
        .selected_text(dim.column_name())
        .show_ui(ui, |ui: &mut Ui| {
            for &d in choices {
                ui.selectable_value(dim, d, d.column_name());
            }
        });
}

/// Entity / measure / N selectors for the ranking.
pub fn ranking_controls(ui: &mut Ui, state: &mut AppState) {
    let mut entity = state.entity;
    let mut measure = state.rank_measure;
    let mut top_n = state.top_n;

    ui.horizontal(|ui: &mut Ui| {
        ui.label("Top");
        ui.add(egui::DragValue::new(&mut top_n).range(1..=50));
        dimension_combo(ui, "rank_entity", &mut entity, &Dimension::ENTITIES);
        ui.label("by");
        measure_combo(ui, "rank_measure", &mut measure);
    });

    if (entity, measure, top_n) != (state.entity, state.rank_measure, state.top_n) {
        state.set_ranking(entity, measure, top_n);
    }
}

/// Dimension / measure selectors for the proportional breakdown.
pub fn breakdown_controls(ui: &mut Ui, state: &mut AppState) {
    let mut dim = state.breakdown_dimension;
    let mut measure = state.breakdown_measure;

    ui.horizontal(|ui: &mut Ui| {
        measure_combo(ui, "breakdown_measure", &mut measure);
        ui.label("by");
        dimension_combo(
            ui,
            "breakdown_dimension",
            &mut dim,
            &[Dimension::Category, Dimension::SubCategory, Dimension::Region],
        );
    });

    if (dim, measure) != (state.breakdown_dimension, state.breakdown_measure) {
        state.set_breakdown(dim, measure);
    }
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open sales data")
        .add_filter(
            "Supported files",
            &["csv", "xlsx", "xlsm", "xls", "xlsb", "ods", "json", "parquet", "pq"],
        )
        .add_filter("CSV", &["csv"])
        .add_filter("Spreadsheet", &["xlsx", "xlsm", "xls", "xlsb", "ods"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open(&path);
    }
}

pub fn export_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export filtered data")
        .set_file_name("filtered_superstore.csv")
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        state.export_visible(&path);
    }
}

// ---------------------------------------------------------------------------
// Number formatting
// ---------------------------------------------------------------------------

/// `1234567` → `"1,234,567"`.
pub fn format_count(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if n < 0 {
        out.insert(0, '-');
    }
    out
}

/// `-1234.5` → `"-$1,234.50"`.
pub fn format_money(v: f64) -> String {
    let cents = (v.abs() * 100.0).round() as i64;
    let sign = if v < 0.0 && cents != 0 { "-" } else { "" };
    format!("{sign}${}.{:02}", format_count(cents / 100), cents % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thousands_separators() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(-1234567), "-1,234,567");
    }

    #[test]
    fn money_formatting() {
        assert_eq!(format_money(2297200.8603), "$2,297,200.86");
        assert_eq!(format_money(-1234.5), "-$1,234.50");
        assert_eq!(format_money(0.0), "$0.00");
        assert_eq!(format_money(-0.001), "$0.00");
    }
}
