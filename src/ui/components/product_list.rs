// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Main product radios, as the buyer would see them.

use eframe::egui;

use crate::host::CheckoutPage;
use crate::host::page::format_cents;
use crate::ui::PreviewMsg;

/// Render every main product whose radio is still displayed.
pub fn view(ui: &mut egui::Ui, page: &CheckoutPage) -> Vec<PreviewMsg> {
    let mut msgs = Vec::new();
    let doc = page.doc();

    ui.label(egui::RichText::new("Choose your product").strong());
    for product in &page.fixture().products {
        let Some(radio) = page.main_radio(&product.id) else {
            continue;
        };
        if !doc.is_displayed(radio) {
            continue;
        }
        let selected = page.selected_main() == Some(product.id.as_str());
        let text = format!("{}  {}", product.name, format_cents(product.price_cents));
        if ui.radio(selected, text).clicked() && !selected {
            msgs.push(PreviewMsg::SelectMain(product.id.clone()));
        }
    }

    if page.is_busy() {
        ui.horizontal(|ui| {
            ui.add(egui::Spinner::new().size(12.0));
            ui.label("Updating order form");
        });
    }
    msgs
}
