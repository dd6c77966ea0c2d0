use eframe::egui::{Align, Layout, Ui};
use egui_extras::{Column, TableBuilder};
use esim_dashboard::{Dataset, Plan};

const HEADERS: [&str; 9] = [
    "Region",
    "Country",
    "provider.name",
    "Plan_Type",
    "capacity_MB",
    "Capacity_in_GB",
    "usdPrice",
    "period",
    "price_per_GB",
];

fn cells(plan: &Plan) -> [String; 9] {
    let number = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_default();
    [
        plan.region.clone(),
        plan.country.clone(),
        plan.provider_name.clone(),
        plan.plan_type.clone(),
        number(plan.capacity_mb),
        number(plan.capacity_gb),
        format!("{:.2}", plan.usd_price),
        plan.period.clone(),
        plan.price_per_gb.map(|v| format!("{v:.2}")).unwrap_or_default(),
    ]
}

/// Render the filtered plans as a scrollable table.
pub fn plans_table(ui: &mut Ui, dataset: &Dataset, rows: &[usize]) {
    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .cell_layout(Layout::left_to_right(Align::Center))
        .columns(Column::auto().at_least(60.0), HEADERS.len())
        .min_scrolled_height(0.0)
        .header(20.0, |mut header| {
            for name in HEADERS {
                header.col(|ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, rows.len(), |mut row| {
                let plan = &dataset.plans[rows[row.index()]];
                for text in cells(plan) {
                    row.col(|ui| {
                        ui.label(text);
                    });
                }
            });
        });
}
