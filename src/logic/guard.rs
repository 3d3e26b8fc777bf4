// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Required-selection check run when the buyer submits the form.

use crate::models::Bump;

/// Message shown when an enabled bump has no variant chosen.
pub const REQUIRED_SELECTION_MESSAGE: &str = "You must select an option";

/// Index of the first enabled bump whose dropdown has no value.
pub fn first_violation(bumps: &[Bump]) -> Option<usize> {
    bumps
        .iter()
        .position(|b| b.is_active() && b.has_dropdown() && b.current_value().is_none())
}
