// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Bump activation state machine: owned per-bump state, messages, and the
//! commands the runtime executes against the page.

use tracing::{debug, error, info, warn};

use crate::host::NodeId;
use crate::logic::guard::{REQUIRED_SELECTION_MESSAGE, first_violation};
use crate::models::{Bump, BumpState, SelectionSnapshot, SnapshotSet};

/// Whether competing transitions are currently accepted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    /// A restore for `token` wrote to the page and the host is settling;
    /// toggles and reselects are rejected until the guard is released.
    Restoring { token: u64 },
}

/// State of every bump on the page.
#[derive(Clone, Debug, Default)]
pub struct SelectorModel {
    pub bumps: Vec<Bump>,
    phase: Phase,
    pending: Option<SnapshotSet>,
    last_token: u64,
}

/// Inputs to the state machine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Msg {
    /// Initial alignment with the checkbox state found at setup.
    Sync { bump: usize, checked: bool },
    /// The buyer toggled a bump checkbox (delivered one turn later).
    CheckboxToggled { bump: usize, checked: bool },
    /// The buyer picked a dropdown option.
    VariantSelected { bump: usize, value: String },
    /// The main product changed; the host is about to re-render.
    MainProductChanged,
    /// The host settled after the change identified by `token`.
    Restore { token: u64 },
    /// The host never settled for `token`.
    RestoreFailed { token: u64 },
    /// Settle delay after a restore elapsed.
    GuardReleased { token: u64 },
    /// The buyer clicked the submit link.
    SubmitRequested,
}

/// Side effects for the runtime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Write the bump's state onto the page.
    Project(usize),
    /// Call the host's order-summary function (deferred).
    RefreshOrderSummary,
    ScheduleRestore { token: u64 },
    ScheduleGuardRelease { token: u64 },
    /// Cancel submission: alert, scroll to the bump box.
    RejectSubmission { bump: usize, message: &'static str },
    AllowSubmission,
}

impl SelectorModel {
    pub fn new(bumps: Vec<Bump>) -> Self {
        Self {
            bumps,
            ..Self::default()
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Token of the most recent snapshot cycle.
    pub fn latest_token(&self) -> u64 {
        self.last_token
    }

    /// Snapshot awaiting restoration, if any.
    pub fn pending_snapshot(&self) -> Option<&SnapshotSet> {
        self.pending.as_ref()
    }

    /// Bump whose enabling checkbox is `node`.
    pub fn bump_for_checkbox(&self, node: NodeId) -> Option<usize> {
        self.bumps
            .iter()
            .position(|b| b.elements.checkbox == Some(node))
    }

    /// Bump whose dropdown is `node`.
    pub fn bump_for_select(&self, node: NodeId) -> Option<usize> {
        self.bumps.iter().position(|b| b.elements.select == Some(node))
    }

    fn snapshot(&self, token: u64) -> SnapshotSet {
        let mut set = SnapshotSet::new(token);
        for bump in &self.bumps {
            set.entries.insert(
                bump.checker_id.clone(),
                SelectionSnapshot {
                    checked: bump.is_active(),
                    value: bump.current_value().map(str::to_string),
                    visible: bump.is_visible(),
                },
            );
        }
        set
    }
}

/// Apply `msg` to the model and enqueue the resulting commands.
pub fn update(model: &mut SelectorModel, msg: Msg, cmds: &mut Vec<Command>) {
    match msg {
        Msg::Sync { bump, checked } => toggle(model, bump, checked, cmds),
        Msg::CheckboxToggled { bump, checked } => {
            if let Phase::Restoring { token } = model.phase {
                debug!(bump, token, "checkbox toggle ignored while restoring");
                cmds.push(Command::Project(bump));
                return;
            }
            toggle(model, bump, checked, cmds);
        }
        Msg::VariantSelected { bump, value } => reselect(model, bump, value, cmds),
        Msg::MainProductChanged => {
            model.last_token += 1;
            let token = model.last_token;
            if model.pending.is_some() {
                debug!(token, "superseding a pending restore");
            }
            model.pending = Some(model.snapshot(token));
            info!(token, bumps = model.bumps.len(), "saved bump selections");
            cmds.push(Command::ScheduleRestore { token });
        }
        Msg::Restore { token } => restore(model, token, cmds),
        Msg::RestoreFailed { token } => {
            if model.pending.as_ref().is_some_and(|s| s.token == token) {
                model.pending = None;
                error!(token, "host form never settled, saved selections dropped");
            }
        }
        Msg::GuardReleased { token } => {
            if model.phase == (Phase::Restoring { token }) {
                model.phase = Phase::Idle;
                debug!(token, "restore guard released");
                cmds.push(Command::RefreshOrderSummary);
            }
        }
        Msg::SubmitRequested => match first_violation(&model.bumps) {
            Some(bump) => {
                warn!(bump, "submission blocked: bump enabled without a selection");
                model.bumps[bump].error_flagged = true;
                cmds.push(Command::Project(bump));
                cmds.push(Command::RejectSubmission {
                    bump,
                    message: REQUIRED_SELECTION_MESSAGE,
                });
            }
            None => cmds.push(Command::AllowSubmission),
        },
    }
}

fn toggle(model: &mut SelectorModel, index: usize, checked: bool, cmds: &mut Vec<Command>) {
    let Some(bump) = model.bumps.get_mut(index) else {
        warn!(bump = index, "toggle for unknown bump");
        return;
    };
    if checked {
        activate(bump);
    } else {
        deactivate(bump);
    }
    cmds.push(Command::Project(index));
    cmds.push(Command::RefreshOrderSummary);
}

/// Reset labels, decorate the default option and select it.
fn activate(bump: &mut Bump) {
    for option in &mut bump.options {
        option.label = option.original_label.clone();
        option.featured = false;
    }
    let value = bump.options.get_mut(bump.default_index).map(|option| {
        if let Some(text) = &bump.config.featured_text {
            option.label = format!("{} {}", option.original_label, text);
        }
        option.featured = true;
        option.id.clone()
    });
    info!(bump = bump.index, value = ?value, "bump activated");
    bump.state = BumpState::Active { value };
    bump.error_flagged = false;
}

fn deactivate(bump: &mut Bump) {
    info!(bump = bump.index, "bump deactivated");
    bump.state = BumpState::Inactive;
    bump.error_flagged = false;
}

fn reselect(model: &mut SelectorModel, index: usize, value: String, cmds: &mut Vec<Command>) {
    if let Phase::Restoring { token } = model.phase {
        debug!(bump = index, token, "variant change ignored while restoring");
        cmds.push(Command::Project(index));
        return;
    }
    let Some(bump) = model.bumps.get_mut(index) else {
        warn!(bump = index, "variant change for unknown bump");
        return;
    };
    if !bump.is_active() || !bump.contains(&value) {
        warn!(bump = index, value = %value, "variant change rejected");
        cmds.push(Command::Project(index));
        return;
    }
    for option in &mut bump.options {
        option.featured = false;
    }
    debug!(bump = index, value = %value, "variant selected");
    bump.state = BumpState::Active { value: Some(value) };
    bump.error_flagged = false;
    cmds.push(Command::Project(index));
    cmds.push(Command::RefreshOrderSummary);
}

fn restore(model: &mut SelectorModel, token: u64, cmds: &mut Vec<Command>) {
    let Some(set) = model.pending.take_if(|s| s.token == token) else {
        debug!(token, latest = model.last_token, "stale restore skipped");
        return;
    };
    model.phase = Phase::Restoring { token };
    for (index, bump) in model.bumps.iter_mut().enumerate() {
        let Some(saved) = set.get(&bump.checker_id) else {
            continue;
        };
        bump.state = if saved.checked {
            let value = saved.value.clone().filter(|v| bump.contains(v));
            BumpState::Active { value }
        } else {
            BumpState::Inactive
        };
        cmds.push(Command::Project(index));
    }
    info!(token, "restored bump selections");
    cmds.push(Command::ScheduleGuardRelease { token });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::normalize::normalize;
    use crate::models::{BumpConfig, BumpOption};

    fn model_for(configs: &[BumpConfig]) -> SelectorModel {
        let mut bumps = normalize(configs);
        for bump in &mut bumps {
            bump.options = bump
                .ids
                .iter()
                .enumerate()
                .map(|(i, id)| BumpOption::new(id.clone(), format!("Label {id}"), i == bump.default_index))
                .collect();
        }
        SelectorModel::new(bumps)
    }

    fn scenario() -> SelectorModel {
        model_for(&[BumpConfig {
            main_product_id: Some("100".into()),
            associated_ids: vec!["200".into(), "300".into()],
            include_main_in_dropdown: true,
            default_id: Some("200".into()),
            featured_text: Some("(Best Value)".into()),
            ..Default::default()
        }])
    }

    fn run(model: &mut SelectorModel, msg: Msg) -> Vec<Command> {
        let mut cmds = Vec::new();
        update(model, msg, &mut cmds);
        cmds
    }

    #[test]
    fn activate_selects_and_decorates_default() {
        let mut model = scenario();

        let cmds = run(&mut model, Msg::CheckboxToggled { bump: 0, checked: true });

        let bump = &model.bumps[0];
        assert_eq!(bump.current_value(), Some("200"));
        assert!(bump.is_visible());
        assert_eq!(bump.options[1].label, "Label 200 (Best Value)");
        assert_eq!(bump.options.iter().filter(|o| o.featured).count(), 1);
        assert_eq!(cmds, vec![Command::Project(0), Command::RefreshOrderSummary]);
    }

    #[test]
    fn reactivation_does_not_stack_badges() {
        let mut model = scenario();
        run(&mut model, Msg::CheckboxToggled { bump: 0, checked: true });
        run(&mut model, Msg::CheckboxToggled { bump: 0, checked: false });
        run(&mut model, Msg::CheckboxToggled { bump: 0, checked: true });

        assert_eq!(model.bumps[0].options[1].label, "Label 200 (Best Value)");
    }

    #[test]
    fn deactivate_clears_value_and_hides() {
        let mut model = scenario();
        run(&mut model, Msg::CheckboxToggled { bump: 0, checked: true });

        let cmds = run(&mut model, Msg::CheckboxToggled { bump: 0, checked: false });

        assert_eq!(model.bumps[0].state, BumpState::Inactive);
        assert!(!model.bumps[0].is_visible());
        assert_eq!(cmds, vec![Command::Project(0), Command::RefreshOrderSummary]);
    }

    #[test]
    fn reselect_is_idempotent_and_drops_badge_marker() {
        let mut model = scenario();
        run(&mut model, Msg::CheckboxToggled { bump: 0, checked: true });

        for _ in 0..2 {
            run(
                &mut model,
                Msg::VariantSelected {
                    bump: 0,
                    value: "300".into(),
                },
            );
        }

        let bump = &model.bumps[0];
        assert_eq!(bump.current_value(), Some("300"));
        assert!(bump.options.iter().all(|o| !o.featured));
        // Suffix stays on the label until the next activation resets it.
        assert_eq!(bump.options[1].label, "Label 200 (Best Value)");
        assert_eq!(bump.options.iter().filter(|o| o.label.contains("Best Value")).count(), 1);
    }

    #[test]
    fn reselect_rejects_foreign_ids_and_inactive_bumps() {
        let mut model = scenario();
        let cmds = run(
            &mut model,
            Msg::VariantSelected {
                bump: 0,
                value: "200".into(),
            },
        );
        assert_eq!(model.bumps[0].state, BumpState::Inactive);
        assert_eq!(cmds, vec![Command::Project(0)]);

        run(&mut model, Msg::CheckboxToggled { bump: 0, checked: true });
        run(
            &mut model,
            Msg::VariantSelected {
                bump: 0,
                value: "999".into(),
            },
        );
        assert_eq!(model.bumps[0].current_value(), Some("200"));
    }

    #[test]
    fn empty_bump_activates_without_selection() {
        let mut model = model_for(&[BumpConfig::default()]);

        run(&mut model, Msg::Sync { bump: 0, checked: true });

        assert!(model.bumps[0].is_active());
        assert_eq!(model.bumps[0].current_value(), None);
        assert!(!model.bumps[0].is_visible());
        assert_eq!(run(&mut model, Msg::SubmitRequested), vec![Command::AllowSubmission]);
    }

    #[test]
    fn snapshot_then_restore_reproduces_state() {
        let mut model = model_for(&[
            BumpConfig {
                associated_ids: vec!["1".into(), "2".into()],
                ..Default::default()
            },
            BumpConfig {
                associated_ids: vec!["3".into()],
                ..Default::default()
            },
        ]);
        run(&mut model, Msg::CheckboxToggled { bump: 0, checked: true });
        run(
            &mut model,
            Msg::VariantSelected {
                bump: 0,
                value: "2".into(),
            },
        );
        let before: Vec<_> = model
            .bumps
            .iter()
            .map(|b| (b.is_active(), b.current_value().map(str::to_string), b.is_visible()))
            .collect();

        let cmds = run(&mut model, Msg::MainProductChanged);
        assert_eq!(cmds, vec![Command::ScheduleRestore { token: 1 }]);
        let saved = model.pending_snapshot().unwrap();
        assert_eq!(
            saved.get("bump-select-checker-1"),
            Some(&SelectionSnapshot {
                checked: true,
                value: Some("2".into()),
                visible: true,
            })
        );

        // Whatever happens meanwhile, restore puts the captured triple back.
        model.bumps[0].state = BumpState::Inactive;
        model.bumps[1].state = BumpState::Active { value: Some("3".into()) };
        let cmds = run(&mut model, Msg::Restore { token: 1 });

        let after: Vec<_> = model
            .bumps
            .iter()
            .map(|b| (b.is_active(), b.current_value().map(str::to_string), b.is_visible()))
            .collect();
        assert_eq!(before, after);
        assert_eq!(
            cmds,
            vec![
                Command::Project(0),
                Command::Project(1),
                Command::ScheduleGuardRelease { token: 1 },
            ]
        );
        assert!(model.pending_snapshot().is_none());
    }

    #[test]
    fn restoring_phase_rejects_competing_transitions() {
        let mut model = scenario();
        run(&mut model, Msg::CheckboxToggled { bump: 0, checked: true });
        run(&mut model, Msg::MainProductChanged);
        run(&mut model, Msg::Restore { token: 1 });
        assert_eq!(model.phase(), Phase::Restoring { token: 1 });

        let cmds = run(
            &mut model,
            Msg::VariantSelected {
                bump: 0,
                value: "300".into(),
            },
        );
        assert_eq!(cmds, vec![Command::Project(0)]);
        run(&mut model, Msg::CheckboxToggled { bump: 0, checked: false });
        assert_eq!(model.bumps[0].current_value(), Some("200"));

        let cmds = run(&mut model, Msg::GuardReleased { token: 1 });
        assert_eq!(model.phase(), Phase::Idle);
        assert_eq!(cmds, vec![Command::RefreshOrderSummary]);

        run(
            &mut model,
            Msg::VariantSelected {
                bump: 0,
                value: "300".into(),
            },
        );
        assert_eq!(model.bumps[0].current_value(), Some("300"));
    }

    #[test]
    fn stale_restore_is_a_no_op() {
        let mut model = scenario();
        run(&mut model, Msg::CheckboxToggled { bump: 0, checked: true });
        run(&mut model, Msg::MainProductChanged);
        run(
            &mut model,
            Msg::VariantSelected {
                bump: 0,
                value: "300".into(),
            },
        );
        run(&mut model, Msg::MainProductChanged);

        let cmds = run(&mut model, Msg::Restore { token: 1 });
        assert!(cmds.is_empty());
        assert_eq!(model.phase(), Phase::Idle);

        run(&mut model, Msg::Restore { token: 2 });
        assert_eq!(model.bumps[0].current_value(), Some("300"));

        // A stale guard release leaves the newer guard in place.
        assert!(run(&mut model, Msg::GuardReleased { token: 1 }).is_empty());
        assert_eq!(model.phase(), Phase::Restoring { token: 2 });
    }

    #[test]
    fn failed_restore_drops_the_snapshot() {
        let mut model = scenario();
        run(&mut model, Msg::MainProductChanged);
        run(&mut model, Msg::RestoreFailed { token: 1 });
        assert!(model.pending_snapshot().is_none());
        assert!(run(&mut model, Msg::Restore { token: 1 }).is_empty());
    }

    #[test]
    fn submission_guard_flags_first_violation_only() {
        let mut model = model_for(&[
            BumpConfig {
                associated_ids: vec!["1".into()],
                ..Default::default()
            },
            BumpConfig {
                associated_ids: vec!["2".into()],
                ..Default::default()
            },
        ]);
        for bump in &mut model.bumps {
            bump.state = BumpState::Active { value: None };
        }

        let cmds = run(&mut model, Msg::SubmitRequested);

        assert_eq!(
            cmds,
            vec![
                Command::Project(0),
                Command::RejectSubmission {
                    bump: 0,
                    message: REQUIRED_SELECTION_MESSAGE,
                },
            ]
        );
        assert!(model.bumps[0].error_flagged);
        assert!(!model.bumps[1].error_flagged);
    }
}
