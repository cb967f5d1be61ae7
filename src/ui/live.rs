use egui::{Color32, RichText, Ui};
use racewatch::{
    live::EndReason,
    view::{LiveModel, LivePhase},
};

use super::{DashboardApp, DetailTab, PALETTE_ORANGE, metric, session_detail};

impl DashboardApp {
    pub(crate) fn live_view(&self, ui: &mut Ui) {
        let Some(model) = LiveModel::build(&self.controller) else {
            ui.label(
                RichText::new("Waiting for live data")
                    .color(Color32::LIGHT_GRAY)
                    .italics(),
            );
            return;
        };

        ui.horizontal(|ui| {
            ui.heading(RichText::new("LIVE").color(Color32::RED).strong());
            ui.heading(RichText::new(&model.category).color(Color32::WHITE).strong());
            ui.label(RichText::new(&model.detail.label).color(Color32::GRAY));
        });

        if let LivePhase::Ended(reason) = model.phase {
            let notice = match reason {
                EndReason::Finished => "Session finished",
                EndReason::Vanished => "Session is no longer available",
            };
            ui.label(RichText::new(notice).color(PALETTE_ORANGE).size(18.).strong());
        }
        if let Some(banner) = &model.error_banner {
            ui.label(
                RichText::new(format!("Live refresh failed, showing last data: {}", banner))
                    .color(Color32::YELLOW),
            );
        }
        ui.separator();

        match &model.last_sample {
            Some(readout) => {
                ui.horizontal_wrapped(|ui| {
                    metric(ui, "Speed", format!("{:.1} km/h", readout.speed_kph));
                    ui.separator();
                    metric(ui, "Throttle", format!("{:.0} %", readout.throttle));
                    ui.separator();
                    metric(ui, "Brake", format!("{:.0} %", readout.brake));
                    if let Some(distance) = readout.distance_m {
                        ui.separator();
                        metric(ui, "Distance", format!("{:.0} m", distance));
                    }
                });
            }
            None => {
                ui.label(
                    RichText::new("No telemetry received yet")
                        .color(Color32::LIGHT_GRAY)
                        .italics(),
                );
            }
        }
        ui.separator();

        session_detail::stats_row(ui, &model.detail);
        // the sample table is of little use while it grows every second
        session_detail::detail_body(ui, &model.detail, DetailTab::Charts);
    }
}
