// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Desktop preview: the simulated checkout page rendered with egui, driven
//! by a [`Session`] whose clock follows wall time.

pub mod components;

use std::path::PathBuf;
use std::time::Duration;

use eframe::egui;
use serde_json::Value;
use tracing::{info, warn};

use crate::host::{CheckoutPage, HostFixture, NodeId};
use crate::models::config::load_config_value;
use crate::mvu::Phase;
use crate::runtime::{Install, Session};
use crate::ui::components::{bump_box, product_list};

/// Interactions collected from the views during a frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PreviewMsg {
    ClickCheckbox(NodeId),
    ChooseVariant { bump: usize, value: String },
    SelectMain(String),
    Submit,
    OpenConfig(PathBuf),
    Reload,
    DismissAlert,
    SetPaused(bool),
    Step(u64),
}

/// Stateful egui application around one checkout session.
pub struct BumpPreviewApp {
    fixture: HostFixture,
    config: Value,
    config_path: Option<PathBuf>,
    session: Session,
    elapsed_ms: f64,
    last_tick: Option<f64>,
    paused: bool,
    alert: Option<String>,
    status: Option<String>,
    inbox: Vec<PreviewMsg>,
}

impl BumpPreviewApp {
    pub fn new(fixture: HostFixture, config: Value, config_path: Option<PathBuf>) -> Self {
        let (session, status) = start_session(&fixture, &config);
        Self {
            fixture,
            config,
            config_path,
            session,
            elapsed_ms: 0.0,
            last_tick: None,
            paused: false,
            alert: None,
            status: Some(status),
            inbox: Vec::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Apply one interaction to the session.
    pub fn apply(&mut self, msg: PreviewMsg) {
        match msg {
            PreviewMsg::ClickCheckbox(node) => self.session.click_checkbox(node),
            PreviewMsg::ChooseVariant { bump, value } => {
                self.session.choose_variant(bump, &value);
            }
            PreviewMsg::SelectMain(id) => {
                self.session.select_main_product(&id);
            }
            PreviewMsg::Submit => {
                if self.session.submit() {
                    let ids = self.session.page().submitted().unwrap_or_default();
                    self.status = Some(format!("Order submitted: {}", ids.join(", ")));
                } else {
                    self.status = Some("Submission blocked".to_string());
                }
            }
            PreviewMsg::OpenConfig(path) => match load_config_value(&path) {
                Ok(config) => {
                    info!(path = %path.display(), "loaded bump configuration");
                    self.config = config;
                    self.config_path = Some(path);
                    self.restart();
                }
                Err(err) => {
                    warn!(error = %err, "could not load configuration");
                    self.alert = Some(format!("{err:#}"));
                }
            },
            PreviewMsg::Reload => self.restart(),
            PreviewMsg::DismissAlert => self.alert = None,
            PreviewMsg::SetPaused(paused) => {
                self.paused = paused;
                self.last_tick = None;
            }
            PreviewMsg::Step(ms) => {
                self.session.advance(ms);
                self.elapsed_ms += ms as f64;
            }
        }
        self.collect_alerts();
    }

    /// Advance the session clock to wall time `now` (seconds).
    fn tick(&mut self, now: f64) {
        let last = self.last_tick.replace(now).unwrap_or(now);
        if self.paused {
            return;
        }
        self.elapsed_ms += (now - last).max(0.0) * 1000.0;
        let target = self.elapsed_ms as u64;
        let current = self.session.now_ms();
        if target > current {
            self.session.advance(target - current);
        }
        self.collect_alerts();
    }

    fn restart(&mut self) {
        let (session, status) = start_session(&self.fixture, &self.config);
        self.session = session;
        self.elapsed_ms = 0.0;
        self.last_tick = None;
        self.alert = None;
        self.status = Some(status);
    }

    fn collect_alerts(&mut self) {
        if let Some(last) = self.session.page_mut().take_alerts().pop() {
            self.alert = Some(last);
        }
    }
}

/// New page plus an installed selector, with a status line describing the
/// outcome.
fn start_session(fixture: &HostFixture, config: &Value) -> (Session, String) {
    let mut session = Session::new(CheckoutPage::new(fixture.clone()));
    let status = match session.install(config) {
        Ok(Install::Installed) => format!(
            "Selector installed, setup in {} ms",
            session.timings().setup_delay_ms
        ),
        Ok(Install::AlreadyInitialized) => "Selector was already installed".to_string(),
        Err(err) => format!("Invalid configuration: {err}"),
    };
    (session, status)
}

impl eframe::App for BumpPreviewApp {
    /// Required by eframe 0.34; all rendering happens in `update`, which the
    /// runner still calls right before this.
    fn ui(&mut self, _ui: &mut egui::Ui, _frame: &mut eframe::Frame) {}

    /// Runs due work on the session clock, then renders the top bar, the
    /// status line, the alert modal and the page itself. Interactions are
    /// applied at the end of the frame.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = ctx.input(|i| i.time);
        self.tick(now);

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                ui.heading("Checkout preview");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    self.render_clock_controls(ui);
                    ui.separator();
                    self.render_config_controls(ui);
                });
            });
            ui.add_space(4.0);
        });

        self.render_alert_modal(ctx);

        egui::TopBottomPanel::bottom("status_panel")
            .resizable(false)
            .show(ctx, |ui| {
                self.render_status(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_space(8.0);
            egui::ScrollArea::vertical().show(ui, |ui| {
                let msgs = product_list::view(ui, self.session.page());
                self.inbox.extend(msgs);
                ui.add_space(12.0);

                self.render_bumps(ui);
                ui.add_space(12.0);

                self.render_checkout(ui);
                ui.add_space(12.0);

                self.render_markup(ui);
            });
        });

        for msg in std::mem::take(&mut self.inbox) {
            self.apply(msg);
        }

        if !self.paused && self.session.pending_tasks() > 0 {
            ctx.request_repaint_after(Duration::from_millis(16));
        }
    }
}

impl BumpPreviewApp {
    fn render_config_controls(&mut self, ui: &mut egui::Ui) {
        let reload = egui::Button::new(format!("{} Reload", egui_phosphor::regular::ARROW_CLOCKWISE));
        if ui.add(reload).on_hover_text("Rebuild the page and reinstall the selector").clicked() {
            self.inbox.push(PreviewMsg::Reload);
        }

        let open = egui::Button::new(format!("{} Open config", egui_phosphor::regular::FOLDER_OPEN));
        if ui.add(open).clicked() {
            let mut dialog = rfd::FileDialog::new()
                .set_title("Open bump configuration")
                .add_filter("JSON", &["json"]);
            if let Some(dir) = self.config_path.as_ref().and_then(|p| p.parent()) {
                dialog = dialog.set_directory(dir);
            }
            if let Some(path) = dialog.pick_file() {
                self.inbox.push(PreviewMsg::OpenConfig(path));
            }
        }
    }

    fn render_clock_controls(&mut self, ui: &mut egui::Ui) {
        if ui.button(format!("{} +100 ms", egui_phosphor::regular::SKIP_FORWARD)).clicked() {
            self.inbox.push(PreviewMsg::Step(100));
        }
        let (icon, label) = if self.paused {
            (egui_phosphor::regular::PLAY, "Resume")
        } else {
            (egui_phosphor::regular::PAUSE, "Pause")
        };
        if ui.button(format!("{icon} {label}")).clicked() {
            self.inbox.push(PreviewMsg::SetPaused(!self.paused));
        }
    }

    fn render_bumps(&mut self, ui: &mut egui::Ui) {
        let Some(model) = self.session.model() else {
            ui.label(
                egui::RichText::new("Bump offers are set up once the page settles.")
                    .color(egui::Color32::from_gray(110)),
            );
            return;
        };
        let doc = self.session.page().doc();
        for bump in &model.bumps {
            let msgs = bump_box::view(ui, doc, bump);
            self.inbox.extend(msgs);
            ui.add_space(6.0);
        }
    }

    fn render_checkout(&mut self, ui: &mut egui::Ui) {
        let page = self.session.page();
        let summary = page
            .doc()
            .element_by_id("cf-order-summary")
            .map(|n| page.doc().text_content(n))
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "Total: pending".to_string());
        ui.label(egui::RichText::new(summary).strong());

        let button = egui::Button::new(format!(
            "{} Complete Order",
            egui_phosphor::regular::SHOPPING_CART
        ));
        if ui.add(button).clicked() {
            self.inbox.push(PreviewMsg::Submit);
        }
    }

    fn render_markup(&mut self, ui: &mut egui::Ui) {
        egui::CollapsingHeader::new(format!("{} Page markup", egui_phosphor::regular::CODE))
            .default_open(false)
            .show(ui, |ui| {
                let page = self.session.page();
                let html = page
                    .form()
                    .map(|form| page.doc().outer_html(form))
                    .unwrap_or_default();
                ui.monospace(html);
            });
    }

    /// Host `alert()` calls surface as a modal.
    fn render_alert_modal(&mut self, ctx: &egui::Context) {
        if let Some(message) = self.alert.clone() {
            egui::Window::new("Message from page")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
                .show(ctx, |ui| {
                    ui.label(message);
                    ui.add_space(8.0);
                    if ui.button("OK").clicked() {
                        self.inbox.push(PreviewMsg::DismissAlert);
                    }
                });
        }
    }

    fn render_status(&self, ui: &mut egui::Ui) {
        let phase = match self.session.model().map(|m| m.phase()) {
            None => "not set up".to_string(),
            Some(Phase::Idle) => "idle".to_string(),
            Some(Phase::Restoring { token }) => format!("restoring #{token}"),
        };
        ui.horizontal(|ui| {
            ui.label(
                egui::RichText::new(format!(
                    "t = {} ms · {} pending · {}",
                    self.session.now_ms(),
                    self.session.pending_tasks(),
                    phase
                ))
                .color(egui::Color32::from_gray(68)),
            );
            if let Some(text) = &self.status {
                ui.separator();
                ui.label(text);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::SAMPLE_CONFIG_JSON;

    fn app() -> BumpPreviewApp {
        let config = serde_json::from_str(SAMPLE_CONFIG_JSON).unwrap();
        BumpPreviewApp::new(HostFixture::sample(), config, None)
    }

    fn settle(app: &mut BumpPreviewApp) {
        app.apply(PreviewMsg::Step(5_000));
    }

    #[test]
    fn clock_follows_ticks_unless_paused() {
        let mut app = app();
        app.tick(10.0);
        app.tick(10.5);
        assert_eq!(app.session().now_ms(), 500);

        app.apply(PreviewMsg::SetPaused(true));
        app.tick(20.0);
        assert_eq!(app.session().now_ms(), 500);

        app.apply(PreviewMsg::SetPaused(false));
        app.tick(30.0);
        app.tick(30.25);
        assert_eq!(app.session().now_ms(), 750);
    }

    #[test]
    fn checkbox_and_variant_messages_reach_the_session() {
        let mut app = app();
        settle(&mut app);
        let checkbox = app.session().model().unwrap().bumps[0]
            .elements
            .checkbox
            .unwrap();

        app.apply(PreviewMsg::ClickCheckbox(checkbox));
        app.apply(PreviewMsg::Step(0));
        app.apply(PreviewMsg::ChooseVariant {
            bump: 0,
            value: "502".into(),
        });

        assert_eq!(
            app.session().model().unwrap().bumps[0].current_value(),
            Some("502")
        );
    }

    #[test]
    fn submit_reports_the_order() {
        let mut app = app();
        settle(&mut app);

        app.apply(PreviewMsg::Submit);

        assert_eq!(app.status.as_deref(), Some("Order submitted: 100, 600"));
        assert!(app.alert.is_none());
    }

    #[test]
    fn bad_config_file_is_reported_and_keeps_the_session() {
        let mut app = app();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "[{").unwrap();

        app.apply(PreviewMsg::OpenConfig(path));

        assert!(app.alert.as_deref().unwrap().contains("not valid JSON"));
        assert!(app.config_path.is_none());
    }

    #[test]
    fn opening_an_invalid_config_disables_the_selector() {
        let mut app = app();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bumps.json");
        std::fs::write(&path, r#"{"bumps": {"oops": true}}"#).unwrap();

        app.apply(PreviewMsg::OpenConfig(path.clone()));
        settle(&mut app);

        assert_eq!(app.config_path, Some(path));
        assert!(app.status.as_deref().unwrap().starts_with("Invalid configuration"));
        assert!(app.session().model().is_none());
    }
}
