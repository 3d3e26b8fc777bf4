// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Hidden-product extraction and the one-shot row hide run at page-ready.

use tracing::{debug, info};

use crate::host::page::PRODUCT_NAME_CLASS;
use crate::host::{Document, Selector};
use crate::models::BumpConfig;

/// Every associated id across all bumps, de-duplicated in first-occurrence
/// order.
///
/// # Examples
///
/// ```
/// use bump_selector::logic::hidden::extract_hidden_products;
/// use bump_selector::models::BumpConfig;
///
/// let bumps = vec![
///     BumpConfig { associated_ids: vec!["2".into(), "3".into()], ..Default::default() },
///     BumpConfig { associated_ids: vec!["3".into(), "4".into()], ..Default::default() },
/// ];
/// assert_eq!(extract_hidden_products(&bumps), vec!["2", "3", "4"]);
/// ```
pub fn extract_hidden_products(bumps: &[BumpConfig]) -> Vec<String> {
    let mut hidden: Vec<String> = Vec::new();
    for id in bumps.iter().flat_map(|b| b.associated_ids.iter()) {
        if !hidden.contains(id) {
            hidden.push(id.clone());
        }
    }
    info!(count = hidden.len(), ids = %hidden.join(", "), "extracted products to hide");
    hidden
}

/// Hide the name cell of each listed product's radio. Returns how many rows
/// were hidden.
pub fn hide_product_rows(doc: &mut Document, ids: &[String]) -> usize {
    if ids.is_empty() {
        info!("no products to hide");
        return 0;
    }
    let mut hidden = 0;
    for id in ids {
        let radios = doc.query_all(
            &Selector::tag("input")
                .with_attr("type", "radio")
                .with_attr("value", id),
        );
        for radio in radios {
            if let Some(row) = doc.closest(radio, &Selector::class(PRODUCT_NAME_CLASS)) {
                doc.set_hidden(row, true);
                hidden += 1;
                debug!(product_id = %id, "hid product row");
            }
        }
    }
    info!(hidden, "product hiding complete");
    hidden
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{CheckoutPage, HostFixture};

    fn bump(ids: &[&str]) -> BumpConfig {
        BumpConfig {
            associated_ids: ids.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn union_keeps_first_occurrence_order() {
        let bumps = vec![
            bump(&["300", "200"]),
            BumpConfig::default(),
            bump(&["200", "400", "300", "500"]),
        ];
        assert_eq!(
            extract_hidden_products(&bumps),
            vec!["300", "200", "400", "500"]
        );
        assert!(extract_hidden_products(&[]).is_empty());
    }

    #[test]
    fn hides_only_listed_rows() {
        let mut page = CheckoutPage::new(HostFixture::with_products(&[
            ("100", "Main", 0),
            ("200", "Variant", 0),
        ]));
        let ids = vec!["200".to_string(), "999".to_string()];

        assert_eq!(hide_product_rows(page.doc_mut(), &ids), 1);

        let doc = page.doc();
        assert!(!doc.is_displayed(page.main_radio("200").unwrap()));
        assert!(doc.is_displayed(page.main_radio("100").unwrap()));
    }
}
