// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Dropdown construction and placement inside the bump boxes.

use tracing::{debug, warn};

use super::lookup::product_label;
use crate::host::{Document, NodeId, Selector};
use crate::models::{Bump, BumpOption};

/// Class of the injected wrapper.
pub const WRAP_CLASS: &str = "bump-selector-wrap";
/// Class marking the configured default option.
pub const DEFAULT_OPTION_CLASS: &str = "default-option";
/// Class marking the option decorated on activation.
pub const FEATURED_OPTION_CLASS: &str = "default-option-selected";
/// Attribute holding the undecorated label.
pub const ORIGINAL_TEXT_ATTR: &str = "data-original-text";
/// Class the host styles as an input error.
pub const ERROR_CLASS: &str = "elInputError";
/// Label shown above every dropdown.
pub const SELECT_LABEL: &str = "Select Quantity:";

/// Options for the bump's combined id set, labels looked up from the page.
pub fn build_options(doc: &Document, bump: &Bump) -> Vec<BumpOption> {
    bump.ids
        .iter()
        .enumerate()
        .map(|(idx, id)| BumpOption::new(id.clone(), product_label(doc, id), idx == bump.default_index))
        .collect()
}

/// Create the hidden wrapper with its label and select. Returns
/// `(wrapper, select)`, or `None` when the bump has nothing to choose.
pub fn mount_dropdown(doc: &mut Document, bump: &Bump) -> Option<(NodeId, NodeId)> {
    if bump.options.is_empty() {
        debug!(bump = bump.index, "no selectable ids, skipping dropdown");
        return None;
    }

    let wrapper = doc.create_element("div");
    doc.add_class(wrapper, WRAP_CLASS);
    doc.set_hidden(wrapper, true);

    let label = doc.create_element("label");
    doc.add_class(label, "quantity-selector-label");
    doc.set_text(label, SELECT_LABEL);

    let select = doc.create_element("select");
    doc.set_attr(select, "data-title", "bump-selector");
    for option in &bump.options {
        let node = doc.create_element("option");
        doc.set_attr(node, "value", &option.id);
        doc.set_attr(node, ORIGINAL_TEXT_ATTR, &option.original_label);
        if option.is_default {
            doc.add_class(node, DEFAULT_OPTION_CLASS);
        }
        doc.set_text(node, &option.label);
        doc.append_child(select, node);
    }

    doc.append_child(wrapper, label);
    doc.append_child(wrapper, select);
    Some((wrapper, select))
}

/// Place the wrapper after the first child of the box's `.sectioncontent`,
/// or at the end of the box when that section is missing.
pub fn insert_wrapper(doc: &mut Document, container: NodeId, wrapper: NodeId) {
    let anchor = doc
        .find_first(container, &Selector::class("sectioncontent"))
        .and_then(|content| doc.element_children(content).first().copied());
    match anchor {
        Some(first) => doc.insert_after(first, wrapper),
        None => {
            warn!("bump box has no section content, appending dropdown");
            doc.append_child(container, wrapper);
        }
    }
}

/// The enabling checkbox: the host's own input (`preferred_id`) when it sits
/// in the box, else the first checkbox in the box, else a new one prepended
/// to it. Its id becomes the bump's checker id.
pub fn bind_checkbox(
    doc: &mut Document,
    container: NodeId,
    preferred_id: Option<&str>,
    checker_id: &str,
) -> NodeId {
    let preferred = preferred_id
        .and_then(|id| doc.element_by_id(id))
        .filter(|&node| doc.is_inclusive_descendant(node, container));
    let existing = preferred.or_else(|| {
        doc.find_first(
            container,
            &Selector::tag("input").with_attr("type", "checkbox"),
        )
    });
    let checkbox = match existing {
        Some(node) => node,
        None => {
            let node = doc.create_element("input");
            doc.set_attr(node, "type", "checkbox");
            doc.set_attr(node, "value", "1");
            doc.prepend_child(container, node);
            debug!(checker_id, "created bump checkbox");
            node
        }
    };
    doc.set_attr(checkbox, "id", checker_id);
    checkbox
}
