use std::sync::Arc;

use egui::{Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};
use egui_plot::{HLine, Legend, Line, Plot, PlotPoint, PlotPoints};
use racewatch::{telemetry::Distance, view::SessionDetail};

use super::{DetailTab, PALETTE_ORANGE, metric, stroke_shade};

const CHART_HEIGHT: f32 = 240.;
const ROW_HEIGHT: f32 = 18.;

pub(crate) fn stats_row(ui: &mut Ui, detail: &SessionDetail) {
    let Some(stats) = &detail.stats else {
        ui.label(
            RichText::new("No telemetry recorded for this session yet")
                .color(Color32::LIGHT_GRAY)
                .italics(),
        );
        return;
    };

    ui.horizontal_wrapped(|ui| {
        metric(ui, "Max speed", format!("{:.1} km/h", stats.max_speed));
        ui.separator();
        metric(ui, "Avg speed", format!("{:.1} km/h", stats.avg_speed));
        ui.separator();
        metric(ui, "Min speed", format!("{:.1} km/h", stats.min_speed));
        ui.separator();
        metric(ui, "Duration", format!("{:.0} s", stats.duration_s));
        ui.separator();
        if let Some(distance) = &detail.distance {
            let label = match distance {
                Distance::Measured { .. } => "Distance",
                Distance::Estimated { .. } => "Distance (est.)",
            };
            metric(ui, label, format!("{:.2} km", distance.km()));
            ui.separator();
        }
        if let Some(pedals) = &detail.pedals {
            metric(ui, "Avg throttle", format!("{:.0} %", pedals.avg_throttle));
            ui.separator();
            metric(ui, "Avg brake", format!("{:.0} %", pedals.avg_brake));
        }
        if let Some((limit, over)) = detail.over_limit {
            ui.separator();
            metric(ui, &format!("Over {:.0} km/h", limit), over.to_string());
        }
    });
}

pub(crate) fn tab_selector(ui: &mut Ui, tab: &mut DetailTab) {
    ui.horizontal(|ui| {
        ui.selectable_value(tab, DetailTab::Charts, "Charts");
        ui.selectable_value(tab, DetailTab::Data, "Data");
    });
}

pub(crate) fn detail_body(ui: &mut Ui, detail: &SessionDetail, tab: DetailTab) {
    if !detail.has_telemetry() {
        return;
    }
    match tab {
        DetailTab::Charts => {
            speed_chart(ui, detail);
            pedal_chart(ui, detail);
        }
        DetailTab::Data => sample_table(ui, detail),
    }
}

fn speed_chart(ui: &mut Ui, detail: &SessionDetail) {
    ui.label(RichText::new("Speed (km/h)").color(Color32::WHITE));
    let max_speed = detail.stats.as_ref().map(|s| s.max_speed).unwrap_or(100.);
    Plot::new(("speed", &detail.session_id))
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .include_y(0.)
        .show_background(false)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new("Speed", PlotPoints::new(detail.speed_points.clone()))
                    .gradient_color(
                        Arc::new(move |point: PlotPoint| {
                            stroke_shade(
                                PALETTE_ORANGE,
                                Color32::RED,
                                (point.y / max_speed.max(1.)) as f32,
                            )
                        }),
                        true,
                    )
                    .fill(0.),
            );
            if let Some((limit, _)) = detail.over_limit {
                plot_ui.hline(HLine::new("Speed limit", limit).color(Color32::YELLOW));
            }
        });
}

fn pedal_chart(ui: &mut Ui, detail: &SessionDetail) {
    ui.label(RichText::new("Pedals (%)").color(Color32::WHITE));
    Plot::new(("pedals", &detail.session_id))
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .include_y(0.)
        .include_y(100.)
        .show_background(false)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new("Throttle", PlotPoints::new(detail.throttle_points.clone()))
                    .color(Color32::GREEN)
                    .fill(0.),
            );
            plot_ui.line(
                Line::new("Brake", PlotPoints::new(detail.brake_points.clone()))
                    .color(Color32::RED)
                    .fill(0.),
            );
        });
}

fn sample_table(ui: &mut Ui, detail: &SessionDetail) {
    TableBuilder::new(ui)
        .id_salt(("samples", &detail.session_id))
        .striped(true)
        .column(Column::auto().at_least(80.))
        .columns(Column::auto().at_least(90.), 5)
        .max_scroll_height(400.)
        .header(20., |mut header| {
            for title in ["Time", "Speed (km/h)", "Throttle", "Brake", "G lateral", "Distance (m)"] {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, detail.samples.len(), |mut row| {
                let sample = &detail.samples[row.index()];
                row.col(|ui| {
                    ui.label(sample.time_label());
                });
                row.col(|ui| {
                    ui.label(format!("{:.1}", sample.speed_kph));
                });
                row.col(|ui| {
                    ui.label(format!("{:.0}", sample.throttle));
                });
                row.col(|ui| {
                    ui.label(format!("{:.0}", sample.brake));
                });
                row.col(|ui| {
                    ui.label(format!("{:.2}", sample.g_force_x));
                });
                row.col(|ui| {
                    ui.label(
                        sample
                            .distance_m
                            .map(|d| format!("{:.0}", d))
                            .unwrap_or_else(|| "-".to_string()),
                    );
                });
            });
        });
}
