use egui::{Color32, RichText, Ui};
use egui_plot::{Bar, BarChart, Legend, Plot};
use racewatch::{SessionCatalog, session::ActivityBucket, view::OverviewModel};

use super::{DashboardApp, PALETTE_ORANGE, metric};

const CATEGORY_COLORS: [Color32; 6] = [
    PALETTE_ORANGE,
    Color32::from_rgb(78, 154, 6),
    Color32::from_rgb(52, 101, 164),
    Color32::from_rgb(237, 212, 0),
    Color32::from_rgb(117, 80, 123),
    Color32::LIGHT_GRAY,
];

impl DashboardApp {
    pub(crate) fn overview_view(&self, ui: &mut Ui, catalog: &SessionCatalog) {
        let model = OverviewModel::build(catalog);
        ui.heading(RichText::new("General Overview").color(Color32::WHITE).strong());

        if model.is_empty() {
            ui.label(
                RichText::new("No sessions recorded yet")
                    .color(Color32::LIGHT_GRAY)
                    .italics(),
            );
            return;
        }

        ui.horizontal(|ui| {
            metric(ui, "Total sessions", model.total_sessions.to_string());
            ui.separator();
            let best = model
                .season_best
                .as_ref()
                .map(|best| format!("{:.1} km/h", best.speed_kph))
                .unwrap_or_else(|| "-".to_string());
            metric(ui, "Season best", best);
            ui.separator();
            metric(ui, "Active categories", model.active_categories.to_string());
        });
        if let Some(best) = &model.season_best {
            ui.label(
                RichText::new(format!("Set in {} on session {}", best.category, best.session_id))
                    .small()
                    .color(Color32::GRAY),
            );
        }
        ui.separator();

        ui.label(RichText::new("Sessions by category").color(Color32::WHITE));
        let bars: Vec<Bar> = model
            .sessions_by_type
            .iter()
            .enumerate()
            .map(|(i, (category, count))| {
                Bar::new(i as f64, *count as f64)
                    .name(category)
                    .fill(category_color(i))
            })
            .collect();
        Plot::new("sessions_by_type")
            .height(220.)
            .allow_drag(false)
            .allow_scroll(false)
            .allow_zoom(false)
            .show_background(false)
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new("Sessions", bars).width(0.6));
            });
        ui.separator();

        ui.label(RichText::new("Activity").color(Color32::WHITE));
        if model.activity.is_empty() {
            ui.label(
                RichText::new("No session carries a start time")
                    .color(Color32::LIGHT_GRAY)
                    .italics(),
            );
            return;
        }
        let categories: Vec<&str> = model
            .sessions_by_type
            .iter()
            .map(|(category, _)| category.as_str())
            .collect();
        let charts = activity_charts(&model.activity, &categories);
        Plot::new("activity_timeline")
            .height(220.)
            .legend(Legend::default())
            .allow_drag(false)
            .allow_scroll(false)
            .allow_zoom(false)
            .show_background(false)
            .show(ui, |plot_ui| {
                for chart in charts {
                    plot_ui.bar_chart(chart);
                }
            });
    }
}

fn category_color(index: usize) -> Color32 {
    CATEGORY_COLORS[index % CATEGORY_COLORS.len()]
}

/// One bar chart per category, stacked on the previous ones.
fn activity_charts(buckets: &[ActivityBucket], categories: &[&str]) -> Vec<BarChart> {
    let mut charts: Vec<BarChart> = Vec::with_capacity(categories.len());
    for (i, category) in categories.iter().enumerate() {
        let bars: Vec<Bar> = buckets
            .iter()
            .enumerate()
            .map(|(x, bucket)| {
                let count = bucket.count_by_category.get(*category).copied().unwrap_or(0);
                Bar::new(x as f64, count as f64).name(bucket.start.format("%Y-%m-%d %H:%M"))
            })
            .collect();
        let below: Vec<&BarChart> = charts.iter().collect();
        let chart = BarChart::new(*category, bars)
            .color(category_color(i))
            .width(0.9)
            .stack_on(&below);
        charts.push(chart);
    }
    charts
}
