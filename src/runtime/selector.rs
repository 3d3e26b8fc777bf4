// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Page setup for the bump selector: hiding bump products from the main
//! list, building the dropdowns and keeping element bindings live.

use tracing::{debug, info, warn};

use crate::host::Document;
use crate::logic::dropdown::{bind_checkbox, build_options, insert_wrapper, mount_dropdown};
use crate::logic::{extract_hidden_products, hide_product_rows, normalize, resolve_container};
use crate::models::{Bump, BumpConfig};
use crate::mvu::{Msg, SelectorModel};

/// Page flag guarding against a second initialization.
pub const SELECTOR_FLAG: &str = "BUMP_SELECTOR_INITIALIZED";

/// Validated configuration plus, once set up, the state machine.
#[derive(Clone, Debug, Default)]
pub struct BumpSelector {
    configs: Vec<BumpConfig>,
    hidden: Vec<String>,
    model: Option<SelectorModel>,
}

impl BumpSelector {
    pub fn new(configs: Vec<BumpConfig>) -> Self {
        Self {
            configs,
            ..Self::default()
        }
    }

    pub fn configs(&self) -> &[BumpConfig] {
        &self.configs
    }

    /// Products hidden from the main list at page-ready.
    pub fn hidden_products(&self) -> &[String] {
        &self.hidden
    }

    pub fn model(&self) -> Option<&SelectorModel> {
        self.model.as_ref()
    }

    pub fn model_mut(&mut self) -> Option<&mut SelectorModel> {
        self.model.as_mut()
    }

    pub fn is_set_up(&self) -> bool {
        self.model.is_some()
    }

    /// Page-ready step: hide the rows of every bump's associated products.
    pub fn hide_rows(&mut self, doc: &mut Document) -> usize {
        self.hidden = extract_hidden_products(&self.configs);
        hide_product_rows(doc, &self.hidden)
    }

    /// Build dropdowns, bind checkboxes and apply pre-selection. Returns the
    /// messages aligning each bound bump with its checkbox.
    pub fn set_up(&mut self, doc: &mut Document) -> Vec<Msg> {
        if self.model.is_some() {
            warn!("bump selector already set up");
            return Vec::new();
        }

        let mut bumps = normalize(&self.configs);
        for bump in &mut bumps {
            bump.options = build_options(doc, bump);
            if let Some((wrapper, select)) = mount_dropdown(doc, bump) {
                bump.elements.wrapper = Some(wrapper);
                bump.elements.select = Some(select);
            }
            if !ensure_bound(doc, bump) {
                warn!(bump = bump.index, "bump box not found, skipping");
                continue;
            }
            if bump.config.pre_selected
                && let Some(checkbox) = bump.elements.checkbox
            {
                debug!(bump = bump.index, "pre-selecting bump");
                doc.set_checked(checkbox, true);
            }
        }

        let syncs: Vec<Msg> = bumps
            .iter()
            .filter_map(|bump| {
                let checkbox = bump.elements.checkbox?;
                Some(Msg::Sync {
                    bump: bump.index,
                    checked: doc.is_checked(checkbox),
                })
            })
            .collect();
        info!(
            bumps = bumps.len(),
            bound = syncs.len(),
            "bump selector set up"
        );
        self.model = Some(SelectorModel::new(bumps));
        syncs
    }
}

/// Make sure the bump's box, checkbox and dropdown wrapper are attached,
/// re-resolving whatever the host replaced. Returns `false` when no box
/// exists for the bump.
pub fn ensure_bound(doc: &mut Document, bump: &mut Bump) -> bool {
    let els = &mut bump.elements;

    if !els.container.is_some_and(|c| doc.is_attached(c)) {
        if els.container.is_some() {
            debug!(bump = bump.index, "bump box replaced, re-resolving");
        }
        els.container = resolve_container(doc, &bump.config, bump.index);
    }
    let Some(container) = els.container else {
        return false;
    };

    let checkbox_live = els
        .checkbox
        .is_some_and(|cb| doc.is_attached(cb) && doc.is_inclusive_descendant(cb, container));
    if !checkbox_live {
        els.checkbox = Some(bind_checkbox(
            doc,
            container,
            bump.original_input.as_deref(),
            &bump.checker_id,
        ));
    }

    if let Some(wrapper) = els.wrapper {
        let wrapper_live =
            doc.is_attached(wrapper) && doc.is_inclusive_descendant(wrapper, container);
        if !wrapper_live {
            insert_wrapper(doc, container, wrapper);
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{CheckoutPage, HostFixture, Selector};
    use crate::logic::dropdown::WRAP_CLASS;
    use crate::models::config::{SAMPLE_CONFIG_JSON, parse_page_config};

    fn sample() -> (CheckoutPage, BumpSelector) {
        let config = parse_page_config(SAMPLE_CONFIG_JSON).unwrap();
        (
            CheckoutPage::new(HostFixture::sample()),
            BumpSelector::new(config.bumps),
        )
    }

    #[test]
    fn set_up_mounts_one_dropdown_per_bump() {
        let (mut page, mut selector) = sample();

        let syncs = selector.set_up(page.doc_mut());

        assert_eq!(
            syncs,
            vec![
                Msg::Sync {
                    bump: 0,
                    checked: false
                },
                Msg::Sync {
                    bump: 1,
                    checked: true
                },
            ]
        );
        let doc = page.doc();
        assert_eq!(doc.query_all(&Selector::class(WRAP_CLASS)).len(), 2);
        assert!(doc.element_by_id("bump-select-checker-1").is_some());
        assert!(doc.element_by_id("bump-select-checker-2").is_some());
        assert!(doc.element_by_id("bump_offer_500").is_none());

        let model = selector.model().unwrap();
        let labels: Vec<_> = model.bumps[0]
            .options
            .iter()
            .map(|o| o.original_label.as_str())
            .collect();
        assert_eq!(
            labels,
            vec![
                "Printed Workbook",
                "Printed Workbook (2 copies)",
                "Printed Workbook (3 copies)"
            ]
        );

        // A second set-up is refused.
        assert!(selector.set_up(page.doc_mut()).is_empty());
        assert_eq!(page.doc().query_all(&Selector::class(WRAP_CLASS)).len(), 2);
    }

    #[test]
    fn hide_rows_hides_associated_products() {
        let (mut page, mut selector) = sample();

        assert_eq!(selector.hide_rows(page.doc_mut()), 3);

        assert_eq!(selector.hidden_products(), ["501", "502", "601"]);
        let doc = page.doc();
        for id in ["501", "502", "601"] {
            assert!(!doc.is_displayed(page.main_radio(id).unwrap()), "{id} hidden");
        }
        // Main bump products are left to the force-hide list.
        assert!(doc.is_displayed(page.main_radio("500").unwrap()));
        assert!(doc.is_displayed(page.main_radio("101").unwrap()));
    }

    #[test]
    fn ensure_bound_follows_rebuilt_boxes() {
        let mut fixture = HostFixture::sample();
        fixture.rebuild_bumps = true;
        let config = parse_page_config(SAMPLE_CONFIG_JSON).unwrap();
        let mut page = CheckoutPage::new(fixture);
        let mut selector = BumpSelector::new(config.bumps);
        selector.set_up(page.doc_mut());

        page.select_main_product("101");
        page.rerender();
        let bump = &mut selector.model_mut().unwrap().bumps[0];
        let old_checkbox = bump.elements.checkbox;
        assert!(!page.doc().is_attached(bump.elements.wrapper.unwrap()));

        assert!(ensure_bound(page.doc_mut(), bump));

        let doc = page.doc();
        assert_ne!(bump.elements.checkbox, old_checkbox);
        assert_eq!(
            doc.element_by_id("bump-select-checker-1"),
            bump.elements.checkbox
        );
        let wrapper = bump.elements.wrapper.unwrap();
        assert!(doc.is_inclusive_descendant(wrapper, bump.elements.container.unwrap()));
    }
}
