use eframe::egui::{self, ScrollArea, Ui};

use crate::state::AppState;
use crate::ui::{charts, panels};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Overview,
    SalesAnalysis,
    CustomerInsights,
}

impl Tab {
    const ALL: [Tab; 3] = [Tab::Overview, Tab::SalesAnalysis, Tab::CustomerInsights];

    fn title(self) -> &'static str {
        match self {
            Tab::Overview => "📊 Dashboard Overview",
            Tab::SalesAnalysis => "📈 Sales Analysis",
            Tab::CustomerInsights => "🛍 Customer Insights",
        }
    }
}

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DashboardApp {
    pub state: AppState,
    pub tab: Tab,
}

impl DashboardApp {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            tab: Tab::default(),
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar + tabs ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
            ui.horizontal(|ui| {
                for tab in Tab::ALL {
                    ui.selectable_value(&mut self.tab, tab, tab.title());
                }
            });
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: the selected tab ----
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.state.dataset.is_none() {
                ui.centered_and_justified(|ui| {
                    ui.heading("Open a file to view the dashboard  (File → Open…)");
                });
                return;
            }

            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| match self.tab {
                    Tab::Overview => overview(ui, &self.state),
                    Tab::SalesAnalysis => sales_analysis(ui, &mut self.state),
                    Tab::CustomerInsights => customer_insights(ui, &mut self.state),
                });
        });
    }
}

fn overview(ui: &mut Ui, state: &AppState) {
    ui.heading("SuperStore Sales Dashboard");
    panels::notices(ui, state);
    ui.add_space(6.0);
    panels::kpi_row(ui, state);
    ui.add_space(12.0);
    charts::sales_trend(ui, &state.aggregates.time_series);
}

fn sales_analysis(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Sales & Profit Analysis");
    panels::notices(ui, state);
    charts::state_sales(ui, &state.aggregates.sales_by_state);
    ui.separator();

    ui.columns(2, |cols| {
        cols[0].strong("Breakdown");
        panels::breakdown_controls(&mut cols[0], state);
        charts::breakdown_pie(&mut cols[0], &state.aggregates.breakdown);

        charts::sub_category_profit(&mut cols[1], &state.aggregates.profit_by_sub_category);
    });
}

fn customer_insights(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Customer Insights");
    panels::notices(ui, state);
    panels::ranking_controls(ui, state);
    charts::ranking_chart(ui, &state.aggregates.ranking, state.rank_measure);
    charts::ranking_table(ui, &state.aggregates.ranking);

    ui.add_space(12.0);
    ui.strong("Order Frequency Heatmap");
    charts::order_heatmap(ui, &state.aggregates.heatmap);
}
