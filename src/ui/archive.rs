use egui::{Color32, RichText, Ui};
use racewatch::{SessionCatalog, view::ArchiveModel};

use super::{DashboardApp, metric, session_detail};

impl DashboardApp {
    pub(crate) fn archive_view(&mut self, ui: &mut Ui, catalog: &SessionCatalog, category: &str) {
        let selected_id = self.selected_sessions.get(category).map(String::as_str);
        let model = ArchiveModel::build(catalog, category, selected_id);
        ui.heading(RichText::new(category).color(Color32::WHITE).strong());

        if model.is_empty() {
            ui.label(
                RichText::new(format!("No {} sessions recorded yet", category))
                    .color(Color32::LIGHT_GRAY)
                    .italics(),
            );
            return;
        }

        let aggregate = &model.aggregate;
        ui.horizontal_wrapped(|ui| {
            metric(ui, "Runs", aggregate.run_count.to_string());
            ui.separator();
            if aggregate.has_data() {
                metric(ui, "Avg speed", format!("{:.1} km/h", aggregate.mean_of_means));
                ui.separator();
                metric(ui, "Best avg speed", format!("{:.1} km/h", aggregate.best_mean));
                ui.separator();
                metric(ui, "Record", format!("{:.1} km/h", aggregate.record_max));
            } else {
                ui.label(
                    RichText::new("No telemetry in this category")
                        .color(Color32::LIGHT_GRAY)
                        .italics(),
                );
            }
        });
        ui.separator();

        let Some(detail) = &model.selected else {
            return;
        };
        let mut chosen = detail.session_id.clone();
        egui::ComboBox::from_label("Session")
            .selected_text(detail.label.as_str())
            .width(320.)
            .show_ui(ui, |ui| {
                for option in &model.sessions {
                    ui.selectable_value(&mut chosen, option.id.clone(), option.label.as_str());
                }
            });
        if chosen != detail.session_id {
            self.selected_sessions.insert(category.to_string(), chosen);
        }

        session_detail::stats_row(ui, detail);
        session_detail::tab_selector(ui, &mut self.detail_tab);
        session_detail::detail_body(ui, detail, self.detail_tab);
    }
}
