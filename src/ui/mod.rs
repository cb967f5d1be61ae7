mod archive;
mod live;
mod overview;
mod session_detail;

use std::{collections::HashMap, sync::Arc, time::Duration, time::Instant};

use egui::{Color32, Frame, Margin, RichText, Ui, Visuals, style::Widgets};
use log::{error, info};
use racewatch::{
    AppConfig, LiveRefreshController, SessionCatalog, SnapshotCache, TickOutcome,
    store::SessionStore,
    view::{NavSelection, View, nav_options, select_view},
};

pub(crate) const PALETTE_BLACK: Color32 = Color32::from_rgb(12, 12, 12);
pub(crate) const PALETTE_BROWN: Color32 = Color32::from_rgb(72, 30, 20);
pub(crate) const PALETTE_MAROON: Color32 = Color32::from_rgb(155, 57, 34);
pub(crate) const PALETTE_ORANGE: Color32 = Color32::from_rgb(242, 97, 63);

const MIN_REPAINT_INTERVAL: Duration = Duration::from_millis(50);

/// Tabs of the per-session panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum DetailTab {
    Charts,
    Data,
}

/// `DashboardApp` renders the session history and the live session of the team.
///
/// Each frame polls the live controller, takes the catalog snapshot from the cache, resolves the
/// navigation choice into a view and draws it. Nothing blocks on the store beyond the fetches the
/// cache or the controller decide to make.
pub struct DashboardApp {
    cache: SnapshotCache,
    controller: LiveRefreshController,
    app_config: AppConfig,
    selection: NavSelection,
    // category -> session chosen in its archive
    selected_sessions: HashMap<String, String>,
    detail_tab: DetailTab,
    banner: Option<String>,
}

impl DashboardApp {
    /// `app_config` is what gets saved on exit, `effective` carries the refresh settings of this
    /// run.
    pub fn new(
        store: Arc<dyn SessionStore>,
        app_config: AppConfig,
        effective: &AppConfig,
        cc: &eframe::CreationContext<'_>,
    ) -> Self {
        let default_visuals = Visuals {
            dark_mode: true,
            hyperlink_color: PALETTE_MAROON,
            faint_bg_color: PALETTE_BLACK,
            extreme_bg_color: PALETTE_BROWN,
            panel_fill: PALETTE_BLACK,
            button_frame: true,
            widgets: Widgets::dark(),
            striped: true,
            ..Default::default()
        };
        cc.egui_ctx.set_visuals(default_visuals);

        Self {
            cache: SnapshotCache::new(store.clone(), effective.snapshot_ttl()),
            controller: LiveRefreshController::new(
                store,
                effective.live_tick(),
                effective.ended_display(),
            ),
            app_config,
            selection: NavSelection::Overview,
            selected_sessions: HashMap::new(),
            detail_tab: DetailTab::Charts,
            banner: None,
        }
    }

    /// Current catalog, or the last good one with a banner when the store cannot be reached.
    fn snapshot(&mut self) -> Arc<SessionCatalog> {
        match self.cache.get_snapshot() {
            Ok(catalog) => {
                self.banner = None;
                catalog
            }
            Err(e) => {
                self.banner = Some(format!("Could not refresh sessions: {}", e));
                self.cache.last_good().unwrap_or_default()
            }
        }
    }

    /// Start or stop live monitoring so it matches what is on screen.
    fn sync_live(&mut self, view: &View, catalog: &SessionCatalog, now: Instant) {
        match view {
            View::LiveMonitor(session_id) => {
                if self.controller.is_idle()
                    && let Some(record) = catalog.get(session_id)
                {
                    self.controller.start(record, now);
                }
            }
            _ => {
                if !self.controller.is_idle() {
                    self.controller.stop();
                }
            }
        }
    }

    fn navigation(&mut self, ui: &mut Ui, catalog: &SessionCatalog) {
        ui.heading(RichText::new("Racewatch").color(PALETTE_ORANGE).strong());
        ui.separator();
        for option in nav_options(&self.app_config.categories, catalog) {
            let text = option.to_string();
            ui.radio_value(&mut self.selection, option, text);
        }
        ui.separator();
        ui.label(
            RichText::new(format!("Total sessions: {}", catalog.len())).color(Color32::WHITE),
        );
        if ui.button("Refresh").clicked() {
            info!("Manual refresh requested");
            self.cache.clear();
        }
        if let Some(banner) = &self.banner {
            ui.separator();
            ui.label(RichText::new(banner).color(Color32::YELLOW));
        }
    }

    fn repaint_after(&self, now: Instant) -> Duration {
        let mut wait = self
            .cache
            .time_to_expiry(now)
            .unwrap_or_else(|| self.cache.ttl());
        if let Some(live_wait) = self.controller.time_until_next_poll(now) {
            wait = wait.min(live_wait);
        }
        wait.max(MIN_REPAINT_INTERVAL)
    }
}

impl eframe::App for DashboardApp {
    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if let Err(e) = self.app_config.save() {
            error!("Error while saving config file: {}", e);
        }
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        match self.controller.poll(now) {
            // the catalog still lists the ended session as live
            TickOutcome::ReturnedToIdle => self.cache.clear(),
            TickOutcome::Ended(reason) => info!("Live session ended: {:?}", reason),
            _ => {}
        }

        let catalog = self.snapshot();
        let view = select_view(&self.selection, &catalog, &self.controller);
        self.sync_live(&view, &catalog, now);

        egui::SidePanel::left("navigation")
            .frame(Frame::default().fill(PALETTE_BLACK).inner_margin(Margin::same(10)))
            .resizable(false)
            .min_width(180.)
            .show(ctx, |ui| self.navigation(ui, &catalog));

        egui::CentralPanel::default()
            .frame(Frame::default().fill(PALETTE_BLACK).inner_margin(Margin::same(10)))
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| match &view {
                    View::Overview => {
                        if self.selection == NavSelection::Live {
                            ui.label(
                                RichText::new("No session is live right now")
                                    .color(Color32::LIGHT_GRAY)
                                    .italics(),
                            );
                            ui.separator();
                        }
                        self.overview_view(ui, &catalog);
                    }
                    View::Archive(category) => self.archive_view(ui, &catalog, category),
                    View::LiveMonitor(_) => self.live_view(ui),
                });
            });

        ctx.request_repaint_after(self.repaint_after(now));
    }
}

pub(crate) fn metric(ui: &mut Ui, label: &str, value: String) {
    ui.vertical(|ui| {
        ui.label(RichText::new(label).small().color(Color32::GRAY));
        ui.label(RichText::new(value).size(22.).strong().color(Color32::WHITE));
    });
}

pub(crate) fn stroke_shade(start: Color32, end: Color32, y: f32) -> Color32 {
    let channel = |from: u8, to: u8| {
        (from as f32 + y * (to as f32 - from as f32)).clamp(0., 255.) as u8
    };
    Color32::from_rgb(
        channel(start.r(), end.r()),
        channel(start.g(), end.g()),
        channel(start.b(), end.b()),
    )
}
