// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Simulated hosted checkout page: markup in the shape the order form
//! renders, plus the host engine behaviors the selector has to live with
//! (asynchronous re-render on main-product change, order summary, submit).

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use tracing::debug;

use super::document::{Document, NodeId};
use super::selector::Selector;

/// Form container id.
pub const FORM_ID: &str = "cfAR";
/// Name of the single-select main product radios.
pub const MAIN_PRODUCT_FIELD: &str = "purchase[product_id]";
/// Name of the multi-select product fields bumps toggle.
pub const PRODUCT_IDS_FIELD: &str = "purchase[product_ids][]";
/// Class of a product row in the visible product list.
pub const PRODUCT_ROW_CLASS: &str = "elOrderProductOptinProducts";
/// Class of the name cell inside a product row.
pub const PRODUCT_NAME_CLASS: &str = "elOrderProductOptinProductName";
/// Class of the product list container.
pub const PRODUCT_LIST_CLASS: &str = "elOrderProductOptions";
/// Class of a bump offer box.
pub const BUMP_BOX_CLASS: &str = "orderFormBump";
/// Prefix of the `data-title` binding a bump box to its main product.
pub const BUMP_TITLE_PREFIX: &str = "cf-multi-bump-";

/// Product sold on the page.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProductFixture {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub price_cents: u64,
}

/// Bump offer box rendered by the host.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BumpBoxFixture {
    pub main_product_id: String,
    pub headline: String,
    /// Whether the box carries the `data-title="cf-multi-bump-<id>"` binding.
    #[serde(default = "default_true")]
    pub bound: bool,
    /// Whether the host renders its own checkbox inside the box.
    #[serde(default = "default_true")]
    pub with_checkbox: bool,
}

/// Description of the page the host renders.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HostFixture {
    pub products: Vec<ProductFixture>,
    #[serde(default)]
    pub bumps: Vec<BumpBoxFixture>,
    /// How long the host takes to re-render after a main-product change.
    #[serde(default = "default_rerender_delay")]
    pub rerender_delay_ms: u64,
    /// Whether a re-render also rebuilds the bump boxes (dropping anything
    /// injected into them).
    #[serde(default)]
    pub rebuild_bumps: bool,
    /// Whether the host exposes an order-summary function.
    #[serde(default = "default_true")]
    pub order_summary: bool,
}

fn default_true() -> bool {
    true
}

fn default_rerender_delay() -> u64 {
    300
}

impl HostFixture {
    /// Page with the given `(id, name, price_cents)` products and no bumps.
    pub fn with_products(products: &[(&str, &str, u64)]) -> Self {
        Self {
            products: products
                .iter()
                .map(|(id, name, price)| ProductFixture {
                    id: id.to_string(),
                    name: name.to_string(),
                    price_cents: *price,
                })
                .collect(),
            bumps: Vec::new(),
            rerender_delay_ms: default_rerender_delay(),
            rebuild_bumps: false,
            order_summary: true,
        }
    }

    /// Add a bump box for `main_product_id`.
    pub fn bump(mut self, main_product_id: &str, headline: &str, bound: bool) -> Self {
        self.bumps.push(BumpBoxFixture {
            main_product_id: main_product_id.to_string(),
            headline: headline.to_string(),
            bound,
            with_checkbox: true,
        });
        self
    }

    /// Read a page description from a JSON file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read page file: {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Invalid page description in {}", path.display()))
    }

    /// Demo storefront used by the preview when no page file is given.
    pub fn sample() -> Self {
        Self::with_products(&[
            ("100", "Starter Course", 4_900),
            ("101", "Complete Course", 9_900),
            ("500", "Printed Workbook", 1_900),
            ("501", "Printed Workbook (2 copies)", 3_400),
            ("502", "Printed Workbook (3 copies)", 4_500),
            ("600", "Audio Companion", 1_200),
            ("601", "Audio Companion + Transcripts", 1_700),
        ])
        .bump("500", "Yes! Add the printed workbook", true)
        .bump("600", "Add the audio companion", false)
    }
}

/// The hosted order form and the host engine's observable behavior.
#[derive(Clone, Debug)]
pub struct CheckoutPage {
    doc: Document,
    fixture: HostFixture,
    selected_main: Option<String>,
    summary_refreshes: usize,
    order_total_cents: u64,
    alerts: Vec<String>,
    scroll_requests: Vec<NodeId>,
    submitted: Option<Vec<String>>,
}

impl CheckoutPage {
    pub fn new(fixture: HostFixture) -> Self {
        let selected_main = fixture.products.first().map(|p| p.id.clone());
        let mut page = Self {
            doc: Document::new(),
            fixture,
            selected_main,
            summary_refreshes: 0,
            order_total_cents: 0,
            alerts: Vec::new(),
            scroll_requests: Vec::new(),
            submitted: None,
        };
        page.render();
        page
    }

    pub fn doc(&self) -> &Document {
        &self.doc
    }

    pub fn doc_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn fixture(&self) -> &HostFixture {
        &self.fixture
    }

    pub fn form(&self) -> Option<NodeId> {
        self.doc.element_by_id(FORM_ID)
    }

    /// True between a main-product change and the matching re-render.
    pub fn is_busy(&self) -> bool {
        self.form()
            .is_some_and(|f| self.doc.attr(f, "aria-busy") == Some("true"))
    }

    pub fn selected_main(&self) -> Option<&str> {
        self.selected_main.as_deref()
    }

    pub fn product_name(&self, id: &str) -> Option<&str> {
        self.fixture
            .products
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.name.as_str())
    }

    fn price_of(&self, id: &str) -> u64 {
        self.fixture
            .products
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.price_cents)
            .unwrap_or(0)
    }

    /// Radio for `id` in the main product list.
    pub fn main_radio(&self, id: &str) -> Option<NodeId> {
        self.doc.query_first(
            &Selector::tag("input")
                .with_attr("type", "radio")
                .with_attr("name", MAIN_PRODUCT_FIELD)
                .with_attr("value", id),
        )
    }

    /// Multi-select field for `id` inside the form.
    pub fn product_field(&self, id: &str) -> Option<NodeId> {
        find_product_field(&self.doc, id)
    }

    /// Ids whose multi-select field is currently checked.
    pub fn checked_product_fields(&self) -> Vec<String> {
        let Some(form) = self.form() else {
            return Vec::new();
        };
        self.doc
            .find_all(form, &Selector::new().with_attr("name", PRODUCT_IDS_FIELD))
            .into_iter()
            .filter(|n| self.doc.is_checked(*n))
            .filter_map(|n| self.doc.attr(n, "value").map(str::to_string))
            .collect()
    }

    // ----- host engine behavior ----------------------------------------------

    /// Default action of a checkbox click: flip it. Host-rendered bump
    /// checkboxes also flip their own product field. Returns the new state.
    pub fn click_checkbox(&mut self, checkbox: NodeId) -> bool {
        let checked = !self.doc.is_checked(checkbox);
        self.doc.set_checked(checkbox, checked);
        if let Some(product) = self.doc.attr(checkbox, "data-product-id").map(str::to_string)
            && let Some(field) = self.product_field(&product)
        {
            self.doc.set_checked(field, checked);
        }
        checked
    }

    /// Default action of picking an option in a select.
    pub fn choose_option(&mut self, select: NodeId, value: &str) {
        self.doc.set_select_value(select, Some(value));
    }

    /// Buyer picks a different main product. Marks the form busy until
    /// [`CheckoutPage::rerender`] runs. Returns `false` if nothing changed.
    pub fn select_main_product(&mut self, id: &str) -> bool {
        if self.selected_main.as_deref() == Some(id) || self.main_radio(id).is_none() {
            return false;
        }
        self.selected_main = Some(id.to_string());
        self.sync_main_radios();
        if let Some(form) = self.form() {
            self.doc.set_attr(form, "aria-busy", "true");
        }
        true
    }

    /// Asynchronous host re-render: product rows rebuilt, product fields
    /// and bump checkboxes reset, optionally bump boxes rebuilt.
    pub fn rerender(&mut self) {
        let Some(form) = self.form() else {
            return;
        };
        debug!(main = ?self.selected_main, "host re-render");

        if let Some(list) = self.doc.find_first(form, &Selector::class(PRODUCT_LIST_CLASS)) {
            self.doc.clear_children(list);
            self.render_product_rows(list);
        }

        for field in self
            .doc
            .find_all(form, &Selector::new().with_attr("name", PRODUCT_IDS_FIELD))
        {
            self.doc.set_checked(field, false);
        }

        if self.fixture.rebuild_bumps {
            if let Some(slot) = self.doc.element_by_id("cf-bumps") {
                self.doc.clear_children(slot);
                self.render_bumps(slot);
            }
        } else {
            for bump in self.doc.find_all(form, &Selector::class(BUMP_BOX_CLASS)) {
                for checkbox in self
                    .doc
                    .find_all(bump, &Selector::tag("input").with_attr("type", "checkbox"))
                {
                    self.doc.set_checked(checkbox, false);
                }
            }
        }

        self.doc.remove_attr(form, "aria-busy");
    }

    pub fn has_order_summary(&self) -> bool {
        self.fixture.order_summary
    }

    /// Host `rebuildOrderSummary`: main product plus checked product fields.
    pub fn rebuild_order_summary(&mut self) {
        if !self.fixture.order_summary {
            return;
        }
        let ids = self.selected_product_ids();
        self.order_total_cents = ids.iter().map(|id| self.price_of(id)).sum();
        self.summary_refreshes += 1;
        if let Some(summary) = self.doc.element_by_id("cf-order-summary") {
            let text = format!("Total: {}", format_cents(self.order_total_cents));
            self.doc.set_text(summary, &text);
        }
    }

    pub fn summary_refreshes(&self) -> usize {
        self.summary_refreshes
    }

    pub fn order_total_cents(&self) -> u64 {
        self.order_total_cents
    }

    /// Main product followed by every checked product field.
    pub fn selected_product_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.selected_main.iter().cloned().collect();
        for id in self.checked_product_fields() {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }

    pub fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }

    pub fn alerts(&self) -> &[String] {
        &self.alerts
    }

    pub fn take_alerts(&mut self) -> Vec<String> {
        std::mem::take(&mut self.alerts)
    }

    pub fn scroll_into_view(&mut self, node: NodeId) {
        self.scroll_requests.push(node);
    }

    pub fn scroll_requests(&self) -> &[NodeId] {
        &self.scroll_requests
    }

    /// Host submit flow once no handler cancelled it.
    pub fn complete_submission(&mut self) {
        self.submitted = Some(self.selected_product_ids());
    }

    pub fn submitted(&self) -> Option<&[String]> {
        self.submitted.as_deref()
    }

    // ----- markup ------------------------------------------------------------------

    fn render(&mut self) {
        let body = self.doc.body();
        let form = self.doc.create_element("form");
        self.doc.set_attr(form, "id", FORM_ID);
        self.doc.append_child(body, form);

        let list = self.doc.create_element("div");
        self.doc.add_class(list, PRODUCT_LIST_CLASS);
        self.doc.append_child(form, list);
        self.render_product_rows(list);

        let fields = self.doc.create_element("div");
        self.doc.add_class(fields, "cf-product-fields");
        self.doc.set_hidden(fields, true);
        self.doc.append_child(form, fields);
        for product in self.fixture.products.clone() {
            let holder = self.doc.create_element("div");
            let input = self.doc.create_element("input");
            self.doc.set_attr(input, "type", "checkbox");
            self.doc.set_attr(input, "name", PRODUCT_IDS_FIELD);
            self.doc.set_attr(input, "value", &product.id);
            let label = self.doc.create_element("label");
            self.doc.set_text(label, &product.name);
            self.doc.append_child(holder, input);
            self.doc.append_child(holder, label);
            self.doc.append_child(fields, holder);
        }

        let slot = self.doc.create_element("div");
        self.doc.set_attr(slot, "id", "cf-bumps");
        self.doc.append_child(form, slot);
        self.render_bumps(slot);

        let summary = self.doc.create_element("div");
        self.doc.set_attr(summary, "id", "cf-order-summary");
        self.doc.append_child(form, summary);

        let submit = self.doc.create_element("a");
        self.doc.set_attr(submit, "href", "#submit-form");
        self.doc.set_text(submit, "Complete Order");
        self.doc.append_child(form, submit);
    }

    fn render_product_rows(&mut self, list: NodeId) {
        for product in self.fixture.products.clone() {
            let row = self.doc.create_element("div");
            self.doc.add_class(row, PRODUCT_ROW_CLASS);
            let name = self.doc.create_element("div");
            self.doc.add_class(name, PRODUCT_NAME_CLASS);
            let radio = self.doc.create_element("input");
            self.doc.set_attr(radio, "type", "radio");
            self.doc.set_attr(radio, "name", MAIN_PRODUCT_FIELD);
            self.doc.set_attr(radio, "value", &product.id);
            let label = self.doc.create_element("label");
            self.doc.set_text(label, &format!("  {}  ", product.name));
            let price = self.doc.create_element("div");
            self.doc.add_class(price, "elOrderProductOptinPrice");
            self.doc.set_text(price, &format_cents(product.price_cents));

            self.doc.append_child(name, radio);
            self.doc.append_child(name, label);
            self.doc.append_child(row, name);
            self.doc.append_child(row, price);
            self.doc.append_child(list, row);
        }
        self.sync_main_radios();
    }

    fn render_bumps(&mut self, slot: NodeId) {
        for bump in self.fixture.bumps.clone() {
            let outer = self.doc.create_element("div");
            if bump.bound {
                self.doc.set_attr(
                    outer,
                    "data-title",
                    &format!("{BUMP_TITLE_PREFIX}{}", bump.main_product_id),
                );
            }
            let bump_box = self.doc.create_element("div");
            self.doc.add_class(bump_box, BUMP_BOX_CLASS);
            let content = self.doc.create_element("div");
            self.doc.add_class(content, "sectioncontent");
            let head = self.doc.create_element("div");
            self.doc.add_class(head, "bumpHead");
            if bump.with_checkbox {
                let checkbox = self.doc.create_element("input");
                self.doc.set_attr(checkbox, "type", "checkbox");
                self.doc
                    .set_attr(checkbox, "id", &format!("bump_offer_{}", bump.main_product_id));
                self.doc
                    .set_attr(checkbox, "data-product-id", &bump.main_product_id);
                self.doc.append_child(head, checkbox);
            }
            let headline = self.doc.create_element("label");
            self.doc.set_text(headline, &bump.headline);
            self.doc.append_child(head, headline);
            let body = self.doc.create_element("div");
            self.doc.add_class(body, "bumpBody");

            self.doc.append_child(content, head);
            self.doc.append_child(content, body);
            self.doc.append_child(bump_box, content);
            self.doc.append_child(outer, bump_box);
            self.doc.append_child(slot, outer);
        }
    }

    fn sync_main_radios(&mut self) {
        let radios = self.doc.query_all(
            &Selector::tag("input")
                .with_attr("type", "radio")
                .with_attr("name", MAIN_PRODUCT_FIELD),
        );
        for radio in radios {
            let on = self.doc.attr(radio, "value") == self.selected_main.as_deref();
            self.doc.set_checked(radio, on);
        }
    }
}

/// The `purchase[product_ids][]` field carrying `id`, inside the form.
pub fn find_product_field(doc: &Document, id: &str) -> Option<NodeId> {
    let form = doc.element_by_id(FORM_ID)?;
    doc.find_first(
        form,
        &Selector::new()
            .with_attr("name", PRODUCT_IDS_FIELD)
            .with_attr("value", id),
    )
}

/// `$12.34` style price text.
pub fn format_cents(cents: u64) -> String {
    format!("${}.{:02}", cents / 100, cents % 100)
}
