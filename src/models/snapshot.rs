// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Selection snapshots taken before a host re-render.

use std::collections::BTreeMap;

/// Captured state of one bump.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectionSnapshot {
    pub checked: bool,
    pub value: Option<String>,
    pub visible: bool,
}

/// All snapshots from one main-product change, tagged with the cycle token.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SnapshotSet {
    pub token: u64,
    /// Keyed by checker id.
    pub entries: BTreeMap<String, SelectionSnapshot>,
}

impl SnapshotSet {
    pub fn new(token: u64) -> Self {
        Self {
            token,
            entries: BTreeMap::new(),
        }
    }

    pub fn get(&self, checker_id: &str) -> Option<&SelectionSnapshot> {
        self.entries.get(checker_id)
    }
}
