use std::sync::Arc;

use eframe::egui::{self, Color32, RichText, Ui};
use esim_dashboard::data::filter::selector_options;
use esim_dashboard::{load_file, Dimension, PageId};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – page navigation
// ---------------------------------------------------------------------------

/// Render the sidebar with one button per dashboard page.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Select a Dashboard");
    ui.separator();

    for page in PageId::ALL {
        let button = egui::Button::new(RichText::new(page.label()).strong())
            .selected(state.page == page)
            .min_size(egui::vec2(ui.available_width(), 28.0));
        if ui.add(button).clicked() {
            state.set_page(page);
        }
    }
}

// ---------------------------------------------------------------------------
// Filter bar – six selectors in two rows of three
// ---------------------------------------------------------------------------

pub fn filter_bar(ui: &mut Ui, state: &mut AppState) {
    let Some(dataset) = state.dataset.clone() else {
        return;
    };

    for row in Dimension::ALL.chunks(3) {
        ui.columns(row.len(), |cols: &mut [Ui]| {
            for (ui, &dim) in cols.iter_mut().zip(row) {
                ui.label(format!("Select {}", dim.label()));
                let current = state.selection.get(dim);
                egui::ComboBox::from_id_salt(dim.key())
                    .width(ui.available_width())
                    .selected_text(current.to_string())
                    .show_ui(ui, |ui: &mut Ui| {
                        for option in selector_options(&dataset, dim) {
                            let label = option.to_string();
                            if ui.selectable_label(current == option, label).clicked() {
                                state.select(dim, option);
                            }
                        }
                    });
            }
        });
    }

    ui.horizontal(|ui: &mut Ui| {
        if ui.button("Reset filters").clicked() {
            state.reset_filters();
        }
        let active = state.selection.active().count();
        if active > 0 {
            ui.label(format!("{active} active filter(s)"));
        }
    });
}

// ---------------------------------------------------------------------------
// Page intro
// ---------------------------------------------------------------------------

pub fn intro(ui: &mut Ui) {
    ui.heading("eSIM Market Analysis Dashboard");
    ui.label(
        "This dashboard provides a comprehensive analysis of eSIM plans from various \
         providers in each country. Navigate through Country, Provider, Plan Type and \
         Pricing analyses from the sidebar; the filters below narrow every view by \
         Region, Country, Provider, Plan Type, Capacity and Period.",
    );
    ui.label(
        "Sample analyses: a) the global coverage of provider AstroCell, \
         b) the price of every provider for a 1 GB plan in Singapore.",
    );
    ui.add_space(4.0);
    ui.strong("Explore eSIM plans across various countries and providers");
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
        });

        ui.separator();

        if let Some(report) = &state.report {
            ui.label(format!(
                "{} plans loaded, {} match the filters",
                report.total_rows, report.filtered_rows
            ));
        }

        if let Some(ds) = &state.dataset {
            if !ds.underivable_rows.is_empty() {
                ui.separator();
                ui.label(format!(
                    "{} plans without a valid capacity (left out of price per GB)",
                    ds.underivable_rows.len()
                ))
                .on_hover_text(format!("Rows: {:?}", ds.underivable_rows));
            }
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open eSIM plan data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        match load_file(&path, state.policy) {
            Ok(dataset) => state.set_dataset(Arc::new(dataset)),
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                state.set_load_error(format!("Error: {e}"));
            }
        }
    }
}
