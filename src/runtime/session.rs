// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! One checkout page with the bump selector and row hider installed.
//!
//! A [`Session`] routes buyer interactions, runs deferred work on the
//! virtual clock and executes the commands emitted by [`crate::mvu::update`].

use serde_json::Value;
use tracing::{debug, error, info, warn};

use super::scheduler::{Backoff, Scheduler};
use super::selector::{BumpSelector, SELECTOR_FLAG, ensure_bound};
use crate::host::{CheckoutPage, NodeId};
use crate::logic::{RowHider, project};
use crate::models::config::{force_hide_from_value, page_config_from_value, timings_from_value};
use crate::models::{ConfigError, Timings};
use crate::mvu::{self, Command, Msg, SelectorModel};

/// Upper bound on tasks run by [`Session::settle`].
const MAX_SETTLE_STEPS: usize = 10_000;

/// Deferred work.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Task {
    PageReady,
    Setup { attempt: u32 },
    Deliver(Msg),
    Restore { token: u64, attempt: u32 },
    GuardRelease { token: u64 },
    RefreshSummary,
    HiderPass,
    HostRerender,
}

/// Result of [`Session::install`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Install {
    Installed,
    AlreadyInitialized,
}

#[derive(Debug)]
pub struct Session {
    page: CheckoutPage,
    scheduler: Scheduler<Task>,
    selector: Option<BumpSelector>,
    hider: Option<RowHider>,
    timings: Timings,
}

impl Session {
    pub fn new(page: CheckoutPage) -> Self {
        Self {
            page,
            scheduler: Scheduler::new(),
            selector: None,
            hider: None,
            timings: Timings::default(),
        }
    }

    /// Install both features from the page's configuration value.
    ///
    /// The row hider only reads `forceHideProducts` and `timings`, so it is
    /// installed first and survives a broken bump list. An invalid bump list
    /// is fatal to the selector and leaves the order form untouched.
    pub fn install(&mut self, config: &Value) -> Result<Install, ConfigError> {
        self.install_row_hider(config);

        if self.page.doc().has_flag(SELECTOR_FLAG) {
            warn!("bump selector already initialized, skipping");
            return Ok(Install::AlreadyInitialized);
        }
        self.page.doc_mut().set_flag(SELECTOR_FLAG);

        let config = page_config_from_value(config).inspect_err(|err| {
            error!(%err, "invalid bump configuration, bump selector disabled");
        })?;
        info!(bumps = config.bumps.len(), "bump configuration validated");

        self.timings = config.timings;
        self.selector = Some(BumpSelector::new(config.bumps));
        self.scheduler.schedule(0, Task::PageReady);
        self.scheduler
            .schedule(self.timings.setup_delay_ms, Task::Setup { attempt: 0 });
        Ok(Install::Installed)
    }

    fn install_row_hider(&mut self, config: &Value) {
        let force_hide = match force_hide_from_value(config) {
            Ok(list) => list,
            Err(err) => {
                error!(%err, "invalid force-hide list, row hider disabled");
                return;
            }
        };
        let passes = match timings_from_value(config) {
            Ok(timings) => timings.hider_passes_ms,
            Err(err) => {
                warn!(%err, "invalid timings, using default hider passes");
                Timings::default().hider_passes_ms
            }
        };
        let Some(hider) = RowHider::install(self.page.doc_mut(), force_hide.as_deref()) else {
            return;
        };
        self.hider = Some(hider);
        for at in passes {
            self.scheduler.schedule(at, Task::HiderPass);
        }
    }

    pub fn page(&self) -> &CheckoutPage {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut CheckoutPage {
        &mut self.page
    }

    pub fn selector(&self) -> Option<&BumpSelector> {
        self.selector.as_ref()
    }

    pub fn model(&self) -> Option<&SelectorModel> {
        self.selector.as_ref().and_then(BumpSelector::model)
    }

    pub fn hider(&self) -> Option<&RowHider> {
        self.hider.as_ref()
    }

    pub fn timings(&self) -> &Timings {
        &self.timings
    }

    pub fn now_ms(&self) -> u64 {
        self.scheduler.now_ms()
    }

    pub fn pending_tasks(&self) -> usize {
        self.scheduler.len()
    }

    // ----- buyer interactions --------------------------------------------------

    /// Click any checkbox. Bump checkboxes notify the selector one turn
    /// later, after the host's own handlers ran.
    pub fn click_checkbox(&mut self, checkbox: NodeId) {
        let checked = self.page.click_checkbox(checkbox);
        if let Some(bump) = self.model().and_then(|m| m.bump_for_checkbox(checkbox)) {
            self.scheduler
                .schedule(0, Task::Deliver(Msg::CheckboxToggled { bump, checked }));
        }
        self.end_turn();
    }

    /// Click the enabling checkbox of bump `index`.
    pub fn click_bump(&mut self, index: usize) -> bool {
        let Some(checkbox) = self
            .model()
            .and_then(|m| m.bumps.get(index))
            .and_then(|b| b.elements.checkbox)
        else {
            return false;
        };
        self.click_checkbox(checkbox);
        true
    }

    /// Pick `value` in the dropdown of bump `index`.
    pub fn choose_variant(&mut self, index: usize, value: &str) -> bool {
        let Some(select) = self
            .model()
            .and_then(|m| m.bumps.get(index))
            .and_then(|b| b.elements.select)
        else {
            return false;
        };
        self.page.choose_option(select, value);
        self.dispatch(Msg::VariantSelected {
            bump: index,
            value: value.to_string(),
        });
        self.end_turn();
        true
    }

    /// Pick a different main product; the host re-renders later.
    pub fn select_main_product(&mut self, id: &str) -> bool {
        if !self.page.select_main_product(id) {
            return false;
        }
        self.dispatch(Msg::MainProductChanged);
        let delay = self.page.fixture().rerender_delay_ms;
        self.scheduler.schedule(delay, Task::HostRerender);
        self.end_turn();
        true
    }

    /// Click the submit link. Returns whether the submission went through.
    pub fn submit(&mut self) -> bool {
        let allowed = self.dispatch(Msg::SubmitRequested).unwrap_or(true);
        if allowed {
            self.page.complete_submission();
        }
        self.end_turn();
        allowed
    }

    // ----- clock -----------------------------------------------------------------

    /// Run everything due within the next `ms` milliseconds.
    pub fn advance(&mut self, ms: u64) {
        let deadline = self.scheduler.now_ms().saturating_add(ms);
        while let Some(task) = self.scheduler.pop_due(deadline) {
            self.run(task);
            self.end_turn();
        }
        self.scheduler.advance_clock(deadline);
    }

    /// Run until nothing is scheduled.
    pub fn settle(&mut self) {
        for _ in 0..MAX_SETTLE_STEPS {
            let Some(task) = self.scheduler.pop_due(u64::MAX) else {
                return;
            };
            self.run(task);
            self.end_turn();
        }
        warn!(pending = self.scheduler.len(), "session did not settle");
    }

    fn backoff(&self) -> Backoff {
        Backoff::new(self.timings.retry_base_ms, self.timings.retry_max_attempts)
    }

    /// The host form exists and is not mid re-render.
    fn form_ready(&self) -> bool {
        self.page.form().is_some() && !self.page.is_busy()
    }

    fn run(&mut self, task: Task) {
        match task {
            Task::PageReady => {
                if let Some(selector) = self.selector.as_mut() {
                    selector.hide_rows(self.page.doc_mut());
                }
            }
            Task::Setup { attempt } => {
                if !self.form_ready() {
                    match self.backoff().delay_ms(attempt) {
                        Some(delay) => {
                            debug!(attempt, delay, "host form not ready, retrying setup");
                            self.scheduler
                                .schedule(delay, Task::Setup { attempt: attempt + 1 });
                        }
                        None => error!(attempt, "host form never became ready, setup abandoned"),
                    }
                    return;
                }
                let Some(selector) = self.selector.as_mut() else {
                    return;
                };
                for msg in selector.set_up(self.page.doc_mut()) {
                    self.dispatch(msg);
                }
            }
            Task::Deliver(msg) => {
                self.dispatch(msg);
            }
            Task::Restore { token, attempt } => {
                let current = self
                    .model()
                    .and_then(SelectorModel::pending_snapshot)
                    .is_some_and(|s| s.token == token);
                if current && !self.form_ready() {
                    match self.backoff().delay_ms(attempt) {
                        Some(delay) => {
                            debug!(token, attempt, delay, "host still re-rendering, retrying restore");
                            self.scheduler.schedule(
                                delay,
                                Task::Restore {
                                    token,
                                    attempt: attempt + 1,
                                },
                            );
                        }
                        None => {
                            self.dispatch(Msg::RestoreFailed { token });
                        }
                    }
                    return;
                }
                self.dispatch(Msg::Restore { token });
            }
            Task::GuardRelease { token } => {
                self.dispatch(Msg::GuardReleased { token });
            }
            Task::RefreshSummary => {
                if self.page.has_order_summary() {
                    self.page.rebuild_order_summary();
                } else {
                    debug!("host has no order summary function");
                }
            }
            Task::HiderPass => {
                if let Some(hider) = self.hider.as_mut() {
                    hider.apply_all(self.page.doc_mut());
                }
            }
            Task::HostRerender => self.page.rerender(),
        }
    }

    /// Feed `msg` to the state machine and execute its commands. Returns the
    /// submission verdict when one was reached.
    fn dispatch(&mut self, msg: Msg) -> Option<bool> {
        let Self {
            page,
            scheduler,
            selector,
            timings,
            ..
        } = self;
        let Some(model) = selector.as_mut().and_then(BumpSelector::model_mut) else {
            debug!(?msg, "bump selector not set up, message dropped");
            return None;
        };

        let mut cmds = Vec::new();
        mvu::update(model, msg, &mut cmds);

        let mut verdict = None;
        for cmd in cmds {
            match cmd {
                Command::Project(index) => {
                    if let Some(bump) = model.bumps.get_mut(index) {
                        ensure_bound(page.doc_mut(), bump);
                        project(page.doc_mut(), bump);
                    }
                }
                Command::RefreshOrderSummary => {
                    scheduler.schedule(timings.summary_delay_ms, Task::RefreshSummary);
                }
                Command::ScheduleRestore { token } => {
                    scheduler.schedule(timings.restore_delay_ms, Task::Restore { token, attempt: 0 });
                }
                Command::ScheduleGuardRelease { token } => {
                    scheduler.schedule(timings.guard_settle_ms, Task::GuardRelease { token });
                }
                Command::RejectSubmission { bump, message } => {
                    page.alert(message);
                    if let Some(container) = model.bumps.get(bump).and_then(|b| b.elements.container) {
                        page.scroll_into_view(container);
                    }
                    verdict = Some(false);
                }
                Command::AllowSubmission => verdict = Some(true),
            }
        }
        verdict
    }

    /// Work that follows every turn: the row hider's mutation observer.
    fn end_turn(&mut self) {
        if let Some(hider) = self.hider.as_mut() {
            hider.observe(self.page.doc_mut());
        }
    }
}
