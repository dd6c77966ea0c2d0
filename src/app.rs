use eframe::egui::{self, RichText, Ui};

use crate::state::AppState;
use crate::ui::{charts, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct EsimDashboardApp {
    pub state: AppState,
}

impl EsimDashboardApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for EsimDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: page navigation ----
        egui::SidePanel::left("page_panel")
            .default_width(200.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: filters + charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.state.dataset.is_none() {
                if let Some(msg) = &self.state.status_message {
                    ui.centered_and_justified(|ui: &mut Ui| {
                        ui.heading(RichText::new(msg).color(egui::Color32::RED));
                    });
                    return;
                }
            }

            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| {
                    panels::intro(ui);
                    ui.separator();
                    panels::filter_bar(ui, &mut self.state);
                    ui.separator();
                    charts::page_view(ui, &self.state);
                });
        });
    }
}
