// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! One bump offer: its enabling checkbox and, while shown, the dropdown.

use eframe::egui;

use crate::host::{Document, NodeId, Selector};
use crate::logic::dropdown::{ERROR_CLASS, FEATURED_OPTION_CLASS, SELECT_LABEL};
use crate::logic::guard::REQUIRED_SELECTION_MESSAGE;
use crate::models::Bump;
use crate::ui::PreviewMsg;

/// Render `bump` from what is currently on the page.
pub fn view(ui: &mut egui::Ui, doc: &Document, bump: &Bump) -> Vec<PreviewMsg> {
    let mut msgs = Vec::new();
    let Some(checkbox) = bump.elements.checkbox.filter(|c| doc.is_attached(*c)) else {
        ui.label(
            egui::RichText::new(format!("Bump #{} has no box on this page", bump.index + 1))
                .color(egui::Color32::from_gray(110)),
        );
        return msgs;
    };

    egui::Frame::group(ui.style()).show(ui, |ui| {
        let headline =
            headline(doc, checkbox).unwrap_or_else(|| format!("Bump #{}", bump.index + 1));
        let mut checked = doc.is_checked(checkbox);
        let text = format!("{} {}", egui_phosphor::regular::GIFT, headline);
        if ui.checkbox(&mut checked, text).changed() {
            msgs.push(PreviewMsg::ClickCheckbox(checkbox));
        }

        let (Some(wrapper), Some(select)) = (bump.elements.wrapper, bump.elements.select) else {
            return;
        };
        if !doc.is_displayed(wrapper) {
            return;
        }

        let current = doc.select_value(select);
        let options: Vec<(String, String, bool)> = doc
            .options(select)
            .into_iter()
            .filter_map(|o| {
                let value = doc.attr(o, "value")?.to_string();
                Some((value, doc.text_content(o), doc.has_class(o, FEATURED_OPTION_CLASS)))
            })
            .collect();
        let selected_text = options
            .iter()
            .find(|(value, ..)| current.as_deref() == Some(value.as_str()))
            .map(|(_, text, _)| text.clone())
            .unwrap_or_else(|| "Choose an option".to_string());

        ui.horizontal(|ui| {
            ui.label(SELECT_LABEL);
            egui::ComboBox::from_id_salt(("bump-select", bump.index))
                .selected_text(selected_text)
                .show_ui(ui, |ui| {
                    for (value, text, featured) in &options {
                        let label = if *featured {
                            egui::RichText::new(text).strong()
                        } else {
                            egui::RichText::new(text)
                        };
                        let selected = current.as_deref() == Some(value.as_str());
                        if ui.selectable_label(selected, label).clicked() {
                            msgs.push(PreviewMsg::ChooseVariant {
                                bump: bump.index,
                                value: value.clone(),
                            });
                        }
                    }
                });
        });

        if doc.has_class(select, ERROR_CLASS) {
            ui.colored_label(egui::Color32::from_rgb(200, 40, 40), REQUIRED_SELECTION_MESSAGE);
        }
    });
    msgs
}

/// Host headline label next to the checkbox, if any.
fn headline(doc: &Document, checkbox: NodeId) -> Option<String> {
    let label = doc.next_sibling_matching(checkbox, &Selector::tag("label"))?;
    let text = doc.text_content(label).trim().to_string();
    (!text.is_empty()).then_some(text)
}
