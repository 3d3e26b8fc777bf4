// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Turn validated configuration into owned runtime bump records.

use crate::models::bump::CHECKER_ID_PREFIX;
use crate::models::{Bump, BumpConfig, BumpElements, BumpState};

/// Derive index, combined ids, default position, checker id and the host
/// input reference for every configured bump.
pub fn normalize(configs: &[BumpConfig]) -> Vec<Bump> {
    configs
        .iter()
        .enumerate()
        .map(|(index, config)| {
            let ids = config.combined_ids();
            let default_index = config.resolve_default_index(&ids);
            Bump {
                index,
                config: config.clone(),
                ids,
                default_index,
                checker_id: format!("{CHECKER_ID_PREFIX}{}", index + 1),
                original_input: config
                    .main_product_id
                    .as_ref()
                    .map(|id| format!("bump_offer_{id}")),
                options: Vec::new(),
                elements: BumpElements::default(),
                state: BumpState::Inactive,
                error_flagged: false,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_runtime_fields() {
        let configs = vec![
            BumpConfig {
                main_product_id: Some("100".into()),
                associated_ids: vec!["200".into(), "300".into()],
                include_main_in_dropdown: true,
                default_id: Some("200".into()),
                ..Default::default()
            },
            BumpConfig::default(),
        ];

        let bumps = normalize(&configs);

        assert_eq!(bumps.len(), 2);
        assert_eq!(bumps[0].index, 0);
        assert_eq!(bumps[0].ids, vec!["100", "200", "300"]);
        assert_eq!(bumps[0].default_index, 1);
        assert_eq!(bumps[0].checker_id, "bump-select-checker-1");
        assert_eq!(bumps[0].original_input.as_deref(), Some("bump_offer_100"));
        assert_eq!(bumps[0].state, BumpState::Inactive);
        assert_eq!(bumps[0].current_value(), None);

        assert_eq!(bumps[1].checker_id, "bump-select-checker-2");
        assert!(bumps[1].ids.is_empty());
        assert_eq!(bumps[1].original_input, None);
    }

    #[test]
    fn leaves_the_input_untouched() {
        let configs = vec![BumpConfig {
            associated_ids: vec!["1".into()],
            ..Default::default()
        }];
        let before = configs.clone();
        let _ = normalize(&configs);
        assert_eq!(configs, before);
    }
}
