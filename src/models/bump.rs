// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Runtime record for one bump: the validated configuration plus everything
//! derived from it. This record is the source of truth; the page is a
//! projection of it.

use super::config::BumpConfig;
use crate::host::NodeId;

/// Prefix of the synthetic id given to each bump's enabling checkbox.
pub const CHECKER_ID_PREFIX: &str = "bump-select-checker-";

/// Activation state of a bump.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum BumpState {
    /// Checkbox unchecked, wrapper hidden, no product selected.
    #[default]
    Inactive,
    /// Checkbox checked; `value` is the selected variant (a member of the
    /// combined id set) or `None` when no variant is chosen.
    Active { value: Option<String> },
}

/// One entry of a bump's dropdown.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BumpOption {
    pub id: String,
    /// Label as looked up from the host markup, never decorated.
    pub original_label: String,
    /// Label currently displayed (may carry the featured suffix).
    pub label: String,
    /// Built as the configured default (`default-option`).
    pub is_default: bool,
    /// Carries the activation badge (`default-option-selected`).
    pub featured: bool,
}

impl BumpOption {
    pub fn new(id: String, original_label: String, is_default: bool) -> Self {
        Self {
            id,
            label: original_label.clone(),
            original_label,
            is_default,
            featured: false,
        }
    }
}

/// Elements on the page that belong to a bump. Re-validated after every delay.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BumpElements {
    pub container: Option<NodeId>,
    pub checkbox: Option<NodeId>,
    pub wrapper: Option<NodeId>,
    pub select: Option<NodeId>,
}

/// Normalized bump.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bump {
    pub index: usize,
    pub config: BumpConfig,
    /// Ordered selectable ids, computed once at normalization.
    pub ids: Vec<String>,
    pub default_index: usize,
    pub checker_id: String,
    /// Element id of the host's own input for the main product.
    pub original_input: Option<String>,
    pub options: Vec<BumpOption>,
    pub elements: BumpElements,
    pub state: BumpState,
    /// Whether the submission guard flagged the dropdown.
    pub error_flagged: bool,
}

impl Bump {
    pub fn is_active(&self) -> bool {
        matches!(self.state, BumpState::Active { .. })
    }

    /// Currently selected variant, if any.
    pub fn current_value(&self) -> Option<&str> {
        match &self.state {
            BumpState::Active { value } => value.as_deref(),
            BumpState::Inactive => None,
        }
    }

    /// Whether a dropdown was built for this bump.
    pub fn has_dropdown(&self) -> bool {
        !self.options.is_empty()
    }

    /// Whether the wrapper is shown.
    pub fn is_visible(&self) -> bool {
        self.is_active() && self.has_dropdown()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|i| i == id)
    }
}
