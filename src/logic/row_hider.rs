// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Persistent row hider: keeps an independently configured product list
//! hidden while the host keeps re-rendering its product rows.
//!
//! Rows are tagged with `data-bump-hidden="1"` and a one-time stylesheet
//! hides anything tagged, so a pass never has to touch inline styles. The
//! owning session calls [`RowHider::apply_all`] on a timed schedule and
//! [`RowHider::observe`] after every turn to re-tag rebuilt rows.

use tracing::{debug, error, info, warn};

use crate::host::page::{MAIN_PRODUCT_FIELD, PRODUCT_LIST_CLASS, PRODUCT_ROW_CLASS};
use crate::host::{Document, NodeId, Selector};

/// Window flag guarding against double installation.
pub const HIDER_FLAG: &str = "PRODUCT_ROW_HIDER_INITIALIZED";
/// Id of the injected stylesheet.
pub const HIDER_STYLE_ID: &str = "cf-force-hide-prods-css";
/// Attribute tagging hidden rows and radios.
pub const HIDDEN_ATTR: &str = "data-bump-hidden";

#[derive(Clone, Debug)]
pub struct RowHider {
    ids: Vec<String>,
    observed: NodeId,
    cursor: usize,
}

impl RowHider {
    /// Install the hider for `force_hide`. Returns `None` (after logging)
    /// when already installed, when the list is undefined, or when it is
    /// empty.
    pub fn install(doc: &mut Document, force_hide: Option<&[String]>) -> Option<Self> {
        if doc.has_flag(HIDER_FLAG) {
            warn!("row hider already initialized, skipping");
            return None;
        }
        let Some(ids) = force_hide else {
            error!("force-hide product list must be defined before installing the row hider");
            return None;
        };
        if ids.is_empty() {
            warn!("force-hide product list is empty, nothing to hide");
            return None;
        }
        info!(count = ids.len(), "installing row hider");

        doc.install_hide_sheet(
            HIDER_STYLE_ID,
            vec![
                Selector::class(PRODUCT_ROW_CLASS).with_attr(HIDDEN_ATTR, "1"),
                radio_selector().with_attr(HIDDEN_ATTR, "1"),
            ],
        );

        let observed = doc
            .query_first(&Selector::class(PRODUCT_LIST_CLASS))
            .unwrap_or_else(|| doc.body());
        let hider = Self {
            ids: ids.to_vec(),
            observed,
            cursor: doc.mutation_count(),
        };
        doc.set_flag(HIDER_FLAG);
        info!("row hider initialization complete");
        Some(hider)
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Tag every configured product's radio and row. Returns the number of
    /// radios tagged.
    pub fn apply_all(&mut self, doc: &mut Document) -> usize {
        let mut tagged = 0;
        for id in &self.ids {
            for radio in doc.query_all(&radio_selector().with_attr("value", id)) {
                doc.set_attr(radio, HIDDEN_ATTR, "1");
                if let Some(row) = doc.closest(radio, &Selector::class(PRODUCT_ROW_CLASS)) {
                    doc.set_attr(row, HIDDEN_ATTR, "1");
                }
                tagged += 1;
            }
        }
        self.cursor = doc.mutation_count();
        tagged
    }

    /// Re-apply if any child-list mutation landed inside the observed
    /// container since the last look. Returns whether a pass ran.
    ///
    /// Records already seen are compacted away; this hider is the only
    /// reader of the log.
    pub fn observe(&mut self, doc: &mut Document) -> bool {
        if !doc.is_attached(self.observed) {
            self.observed = doc.body();
        }
        let observed = self.observed;
        let touched = doc
            .mutations_since(self.cursor)
            .iter()
            .any(|m| doc.is_inclusive_descendant(m.target, observed));
        self.cursor = doc.mutation_count();
        if touched {
            let tagged = self.apply_all(doc);
            debug!(tagged, "re-applied row hiding after mutation");
        }
        doc.compact_mutations(self.cursor);
        touched
    }
}

fn radio_selector() -> Selector {
    Selector::tag("input")
        .with_attr("type", "radio")
        .with_attr("name", MAIN_PRODUCT_FIELD)
}
