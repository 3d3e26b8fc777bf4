// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Product label lookup from the host form's (possibly hidden) markup.

use tracing::{debug, warn};

use crate::host::page::{FORM_ID, PRODUCT_ROW_CLASS};
use crate::host::{Document, NodeId, Selector};

/// Human-readable label for `product_id`, trimmed and never empty.
///
/// Order: the main-product radio's following label, else the first label in
/// its product row; then any label next to an input with that value inside
/// the form; finally `"Product <id>"`.
pub fn product_label(doc: &Document, product_id: &str) -> String {
    if let Some(text) = radio_label(doc, product_id) {
        return text;
    }
    if let Some(text) = form_input_label(doc, product_id) {
        debug!(product_id, "label taken from form input");
        return text;
    }
    warn!(product_id, "no label in host markup, using fallback");
    format!("Product {product_id}")
}

fn radio_label(doc: &Document, product_id: &str) -> Option<String> {
    let radio = doc.query_first(
        &Selector::tag("input")
            .with_attr("type", "radio")
            .with_attr("value", product_id),
    )?;
    let label = doc
        .next_sibling_matching(radio, &Selector::tag("label"))
        .or_else(|| {
            doc.closest(radio, &Selector::class(PRODUCT_ROW_CLASS))
                .and_then(|row| doc.find_first(row, &Selector::tag("label")))
        })?;
    non_empty(doc, label)
}

fn form_input_label(doc: &Document, product_id: &str) -> Option<String> {
    let form = doc.element_by_id(FORM_ID)?;
    doc.find_all(form, &Selector::tag("input").with_attr("value", product_id))
        .into_iter()
        .flat_map(|input| doc.siblings(input, &Selector::tag("label")))
        .find_map(|label| non_empty(doc, label))
}

fn non_empty(doc: &Document, node: NodeId) -> Option<String> {
    let text = doc.text_content(node).trim().to_string();
    (!text.is_empty()).then_some(text)
}
