// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Map a bump configuration to its box in the host form.

use tracing::{debug, warn};

use crate::host::page::{BUMP_BOX_CLASS, BUMP_TITLE_PREFIX};
use crate::host::{Document, NodeId, Selector};
use crate::models::BumpConfig;

/// Bump box for the configuration at `index`.
///
/// Prefers the `data-title="cf-multi-bump-<mainProductId>"` binding
/// (descending to the inner bump box when the attribute sits on a wrapper),
/// then falls back to the `index`-th bump box on the page.
pub fn resolve_container(doc: &Document, config: &BumpConfig, index: usize) -> Option<NodeId> {
    if let Some(main) = &config.main_product_id {
        let title = format!("{BUMP_TITLE_PREFIX}{main}");
        if let Some(found) = doc.query_first(&Selector::new().with_attr("data-title", &title)) {
            if doc.has_class(found, BUMP_BOX_CLASS) {
                return Some(found);
            }
            return Some(
                doc.find_first(found, &Selector::class(BUMP_BOX_CLASS))
                    .unwrap_or(found),
            );
        }
        debug!(index, main_product_id = %main, "no data-title binding, using position");
    }

    let positional = doc
        .query_all(&Selector::class(BUMP_BOX_CLASS))
        .get(index)
        .copied();
    if positional.is_none() {
        warn!(index, "no bump box found for configuration");
    }
    positional
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{CheckoutPage, HostFixture};

    fn config(main: &str) -> BumpConfig {
        BumpConfig {
            main_product_id: Some(main.into()),
            ..Default::default()
        }
    }

    fn boxes(page: &CheckoutPage) -> Vec<NodeId> {
        page.doc().query_all(&Selector::class(BUMP_BOX_CLASS))
    }

    #[test]
    fn bound_box_wins_over_position() {
        let page = CheckoutPage::new(
            HostFixture::with_products(&[("1", "A", 0), ("2", "B", 0)])
                .bump("1", "first", true)
                .bump("2", "second", true),
        );
        let all = boxes(&page);

        // Configured second, but bound to the first box.
        assert_eq!(resolve_container(page.doc(), &config("1"), 1), Some(all[0]));
        assert_eq!(resolve_container(page.doc(), &config("2"), 0), Some(all[1]));
    }

    #[test]
    fn unbound_box_falls_back_to_position() {
        let page = CheckoutPage::new(
            HostFixture::with_products(&[("1", "A", 0), ("2", "B", 0)])
                .bump("1", "first", true)
                .bump("2", "second", false),
        );
        let all = boxes(&page);

        assert_eq!(resolve_container(page.doc(), &config("2"), 1), Some(all[1]));
        assert_eq!(resolve_container(page.doc(), &BumpConfig::default(), 0), Some(all[0]));
        assert_eq!(resolve_container(page.doc(), &config("9"), 5), None);
    }

    #[test]
    fn attribute_on_the_box_itself_is_used_directly() {
        let mut doc = Document::new();
        let body = doc.body();
        let bump = doc.create_element("div");
        doc.add_class(bump, BUMP_BOX_CLASS);
        doc.set_attr(bump, "data-title", "cf-multi-bump-7");
        doc.append_child(body, bump);

        assert_eq!(resolve_container(&doc, &config("7"), 3), Some(bump));
    }
}
