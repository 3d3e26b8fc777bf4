// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Write a bump's owned state onto the page.
//!
//! Nothing here reads page state back to decide anything; it only locates
//! the elements to write.

use super::dropdown::{ERROR_CLASS, FEATURED_OPTION_CLASS};
use crate::host::page::find_product_field;
use crate::host::{Document, NodeId};
use crate::models::Bump;

/// Project `bump` onto `doc`: checkbox, wrapper visibility, option labels
/// and badge, dropdown value, error marker, and the product fields of the
/// combined id set (exactly the current value is checked).
pub fn project(doc: &mut Document, bump: &Bump) {
    let els = bump.elements;

    if let Some(checkbox) = live(doc, els.checkbox) {
        doc.set_checked(checkbox, bump.is_active());
    }
    if let Some(wrapper) = live(doc, els.wrapper) {
        doc.set_hidden(wrapper, !bump.is_visible());
    }
    if let Some(select) = live(doc, els.select) {
        for (node, option) in doc.options(select).into_iter().zip(&bump.options) {
            if doc.text_content(node) != option.label {
                doc.set_text(node, &option.label);
            }
            if option.featured {
                doc.add_class(node, FEATURED_OPTION_CLASS);
            } else {
                doc.remove_class(node, FEATURED_OPTION_CLASS);
            }
        }
        doc.set_select_value(select, bump.current_value());
        if bump.error_flagged {
            doc.add_class(select, ERROR_CLASS);
        } else {
            doc.remove_class(select, ERROR_CLASS);
        }
    }

    let current = bump.current_value();
    for id in &bump.ids {
        let Some(field) = find_product_field(doc, id) else {
            continue;
        };
        // The enabling checkbox belongs to the activation state, not the variants.
        if Some(field) == els.checkbox {
            continue;
        }
        doc.set_checked(field, current == Some(id.as_str()));
    }
}

fn live(doc: &Document, node: Option<NodeId>) -> Option<NodeId> {
    node.filter(|n| doc.is_attached(*n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{CheckoutPage, HostFixture};
    use crate::logic::normalize::normalize;
    use crate::models::{BumpConfig, BumpState};

    #[test]
    fn checks_exactly_the_current_value() {
        let mut page = CheckoutPage::new(HostFixture::with_products(&[
            ("100", "Main", 0),
            ("200", "Two", 0),
            ("300", "Three", 0),
        ]));
        let mut bump = normalize(&[BumpConfig {
            main_product_id: Some("100".into()),
            associated_ids: vec!["200".into(), "300".into()],
            include_main_in_dropdown: true,
            ..Default::default()
        }])
        .remove(0);
        for id in ["100", "300"] {
            let field = page.product_field(id).unwrap();
            page.doc_mut().set_checked(field, true);
        }

        bump.state = BumpState::Active {
            value: Some("200".into()),
        };
        project(page.doc_mut(), &bump);
        assert_eq!(page.checked_product_fields(), vec!["200".to_string()]);

        bump.state = BumpState::Inactive;
        project(page.doc_mut(), &bump);
        assert!(page.checked_product_fields().is_empty());
    }
}
