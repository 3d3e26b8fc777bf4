// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Page-owner configuration: bump definitions, the force-hide list and
//! timing knobs. Parsing is pure and validates every field up front so the
//! selector never has to second-guess its input.

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Configuration problems. Any of them aborts the bump selector.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not defined")]
    NotDefined(&'static str),
    #[error("{0} must be an array")]
    NotAnArray(&'static str),
    #[error("bump #{index}: `{field}` {reason}")]
    InvalidField {
        index: usize,
        field: &'static str,
        reason: String,
    },
    #[error("forceHideProducts: {0}")]
    InvalidForceHide(String),
    #[error("invalid timings: {0}")]
    Timings(#[source] serde_json::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// One validated bump offer definition.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BumpConfig {
    pub main_product_id: Option<String>,
    pub associated_ids: Vec<String>,
    pub include_main_in_dropdown: bool,
    pub default_id: Option<String>,
    pub default_index: Option<i64>,
    pub featured_text: Option<String>,
    pub pre_selected: bool,
}

impl BumpConfig {
    /// Selectable ids in dropdown order: the main product (when included)
    /// followed by the associated ids as configured.
    pub fn combined_ids(&self) -> Vec<String> {
        let mut ids = Vec::with_capacity(self.associated_ids.len() + 1);
        if self.include_main_in_dropdown
            && let Some(main) = &self.main_product_id
        {
            ids.push(main.clone());
        }
        ids.extend(self.associated_ids.iter().cloned());
        ids
    }

    /// Position of the initial selection within `ids`.
    ///
    /// A `default_id` found in `ids` wins; otherwise `default_index` clamped
    /// into `[0, len - 1]`; otherwise 0.
    ///
    /// # Examples
    ///
    /// ```
    /// use bump_selector::models::BumpConfig;
    ///
    /// let cfg = BumpConfig { default_index: Some(9), ..Default::default() };
    /// let ids = vec!["a".to_string(), "b".to_string()];
    /// assert_eq!(cfg.resolve_default_index(&ids), 1);
    /// ```
    pub fn resolve_default_index(&self, ids: &[String]) -> usize {
        if let Some(id) = &self.default_id
            && let Some(pos) = ids.iter().position(|i| i == id)
        {
            return pos;
        }
        match self.default_index {
            Some(idx) => {
                let max = ids.len().saturating_sub(1) as i64;
                idx.clamp(0, max) as usize
            }
            None => 0,
        }
    }
}

/// Delays and retry limits. The defaults are the empirically safe values
/// for the hosted form; pages with slower renders can stretch them.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Timings {
    /// Wait after page-ready before building the selectors.
    pub setup_delay_ms: u64,
    /// Wait after a main-product change before restoring selections.
    pub restore_delay_ms: u64,
    /// How long the restore guard is held after writing.
    pub guard_settle_ms: u64,
    /// Deferral before calling the host order-summary function.
    pub summary_delay_ms: u64,
    /// First retry delay when the host form is not ready; doubles per attempt.
    pub retry_base_ms: u64,
    /// Retries before giving up on a setup or restore.
    pub retry_max_attempts: u32,
    /// Timed passes of the persistent row hider.
    pub hider_passes_ms: Vec<u64>,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            setup_delay_ms: 3_000,
            restore_delay_ms: 500,
            guard_settle_ms: 100,
            summary_delay_ms: 50,
            retry_base_ms: 250,
            retry_max_attempts: 5,
            hider_passes_ms: vec![0, 300, 1_000, 2_500],
        }
    }
}

/// Everything the page owner supplies.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PageConfig {
    pub bumps: Vec<BumpConfig>,
    /// Independent list for the persistent row hider; `None` when the page
    /// did not define one.
    pub force_hide: Option<Vec<String>>,
    pub timings: Timings,
}

/// Configuration matching [`crate::host::HostFixture::sample`].
pub const SAMPLE_CONFIG_JSON: &str = r#"{
  "bumps": [
    {
      "mainProductId": "500",
      "associatedIds": ["501", "502"],
      "includeMainInDropdown": true,
      "defaultId": "501",
      "featuredText": "(Most Popular)"
    },
    {
      "mainProductId": 600,
      "associatedIds": [601],
      "includeMainInDropdown": true,
      "defaultIndex": 0,
      "preSelected": true
    }
  ],
  "forceHideProducts": ["500", "600"]
}"#;

/// Parse a page configuration from JSON text.
pub fn parse_page_config(json: &str) -> Result<PageConfig, ConfigError> {
    let value: Value = serde_json::from_str(json)?;
    page_config_from_value(&value)
}

/// Read and parse a page configuration file.
pub fn load_page_config(path: &Path) -> anyhow::Result<PageConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_page_config(&text)
        .with_context(|| format!("Invalid bump configuration in {}", path.display()))
}

/// Read a configuration file as raw JSON, leaving validation to whoever
/// installs it.
pub fn load_config_value(path: &Path) -> anyhow::Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Config file is not valid JSON: {}", path.display()))
}

/// Validate an already-parsed configuration value.
///
/// Accepts either a bare array (the bump list) or an object with `bumps`,
/// optional `forceHideProducts` and optional `timings`.
pub fn page_config_from_value(value: &Value) -> Result<PageConfig, ConfigError> {
    match value {
        Value::Null => Err(ConfigError::NotDefined("bump configuration")),
        Value::Array(_) => Ok(PageConfig {
            bumps: parse_bumps(value)?,
            ..PageConfig::default()
        }),
        Value::Object(obj) => {
            let bumps = match obj.get("bumps") {
                None | Some(Value::Null) => return Err(ConfigError::NotDefined("bumps")),
                Some(v) => parse_bumps(v)?,
            };
            let force_hide = force_hide_from_value(value)?;
            let timings = timings_from_value(value)?;
            Ok(PageConfig {
                bumps,
                force_hide,
                timings,
            })
        }
        _ => Err(ConfigError::NotAnArray("bump configuration")),
    }
}

/// The independent `forceHideProducts` list. `None` when the page does not
/// define one (including the bare-array form).
pub fn force_hide_from_value(value: &Value) -> Result<Option<Vec<String>>, ConfigError> {
    let Value::Object(obj) = value else {
        return Ok(None);
    };
    match obj.get("forceHideProducts") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, v)| {
                product_id(v).ok_or_else(|| {
                    ConfigError::InvalidForceHide(format!("element {i} is not a product id"))
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some),
        Some(_) => Err(ConfigError::NotAnArray("forceHideProducts")),
    }
}

/// Optional `timings` block, defaults when absent.
pub fn timings_from_value(value: &Value) -> Result<Timings, ConfigError> {
    match value.get("timings") {
        None | Some(Value::Null) => Ok(Timings::default()),
        Some(v) => Timings::deserialize(v).map_err(ConfigError::Timings),
    }
}

/// Validate the bump list.
pub fn parse_bumps(value: &Value) -> Result<Vec<BumpConfig>, ConfigError> {
    let Value::Array(entries) = value else {
        return Err(ConfigError::NotAnArray("bumps"));
    };
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| parse_bump(index, entry))
        .collect()
}

fn parse_bump(index: usize, entry: &Value) -> Result<BumpConfig, ConfigError> {
    let Value::Object(obj) = entry else {
        return Err(invalid(index, "entry", "must be an object"));
    };

    let associated_ids = match obj.get("associatedIds") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, v)| {
                product_id(v).ok_or_else(|| {
                    invalid(
                        index,
                        "associatedIds",
                        &format!("element {i} is not a product id"),
                    )
                })
            })
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => return Err(invalid(index, "associatedIds", "must be an array")),
    };

    let default_index = match obj.get("defaultIndex") {
        None | Some(Value::Null) => None,
        Some(Value::Number(n)) => Some(
            n.as_i64()
                .ok_or_else(|| invalid(index, "defaultIndex", "must be an integer"))?,
        ),
        Some(_) => return Err(invalid(index, "defaultIndex", "must be an integer")),
    };

    let featured_text = match obj.get("featuredText") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Some(_) => return Err(invalid(index, "featuredText", "must be a string")),
    };

    Ok(BumpConfig {
        main_product_id: optional_id(index, obj, "mainProductId")?,
        associated_ids,
        include_main_in_dropdown: flag(index, obj, "includeMainInDropdown")?,
        default_id: optional_id(index, obj, "defaultId")?,
        default_index,
        featured_text,
        pre_selected: flag(index, obj, "preSelected")?,
    })
}

fn optional_id(
    index: usize,
    obj: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<String>, ConfigError> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(v) => product_id(v)
            .map(Some)
            .ok_or_else(|| invalid(index, field, "must be a product id (string or number)")),
    }
}

fn flag(index: usize, obj: &Map<String, Value>, field: &'static str) -> Result<bool, ConfigError> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(_) => Err(invalid(index, field, "must be a boolean")),
    }
}

/// Product ids arrive as strings or bare numbers; both normalize to text.
fn product_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) if n.is_u64() || n.is_i64() => Some(n.to_string()),
        _ => None,
    }
}

fn invalid(index: usize, field: &'static str, reason: &str) -> ConfigError {
    ConfigError::InvalidField {
        index,
        field,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_sample_config() {
        let cfg = parse_page_config(SAMPLE_CONFIG_JSON).unwrap();

        assert_eq!(cfg.bumps.len(), 2);
        assert_eq!(cfg.bumps[0].main_product_id.as_deref(), Some("500"));
        assert_eq!(cfg.bumps[0].featured_text.as_deref(), Some("(Most Popular)"));
        assert_eq!(cfg.bumps[1].main_product_id.as_deref(), Some("600"));
        assert_eq!(cfg.bumps[1].associated_ids, ids(&["601"]));
        assert!(cfg.bumps[1].pre_selected);
        assert_eq!(cfg.force_hide, Some(ids(&["500", "600"])));
        assert_eq!(cfg.timings, Timings::default());
    }

    #[test]
    fn bare_array_is_the_bump_list() {
        let cfg = parse_page_config(r#"[{"mainProductId": "1"}]"#).unwrap();
        assert_eq!(cfg.bumps.len(), 1);
        assert!(cfg.bumps[0].associated_ids.is_empty());
        assert_eq!(cfg.force_hide, None);
    }

    #[test]
    fn missing_or_wrong_shapes_are_rejected() {
        assert!(matches!(
            page_config_from_value(&Value::Null),
            Err(ConfigError::NotDefined(_))
        ));
        assert!(matches!(
            parse_page_config(r#"{"bumps": {"a": 1}}"#),
            Err(ConfigError::NotAnArray("bumps"))
        ));
        assert!(matches!(
            parse_page_config(r#""nope""#),
            Err(ConfigError::NotAnArray(_))
        ));
        assert!(matches!(
            parse_page_config("{not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn field_errors_name_the_entry_and_field() {
        let err = parse_page_config(
            r#"[{"mainProductId": "1"}, {"associatedIds": ["2", {"x": 1}]}]"#,
        )
        .unwrap_err();
        match err {
            ConfigError::InvalidField { index, field, .. } => {
                assert_eq!(index, 1);
                assert_eq!(field, "associatedIds");
            }
            other => panic!("unexpected error: {other}"),
        }

        let err = parse_page_config(r#"[{"defaultIndex": 1.5}]"#).unwrap_err();
        assert_eq!(err.to_string(), "bump #0: `defaultIndex` must be an integer");

        let err = parse_page_config(r#"[{"preSelected": "yes"}]"#).unwrap_err();
        assert_eq!(err.to_string(), "bump #0: `preSelected` must be a boolean");
    }

    #[test]
    fn timings_override_individual_values() {
        let cfg = parse_page_config(r#"{"bumps": [], "timings": {"restoreDelayMs": 900}}"#)
            .unwrap();
        assert_eq!(cfg.timings.restore_delay_ms, 900);
        assert_eq!(cfg.timings.setup_delay_ms, 3_000);

        assert!(matches!(
            parse_page_config(r#"{"bumps": [], "timings": {"restoreDelayMs": "slow"}}"#),
            Err(ConfigError::Timings(_))
        ));
    }

    #[test]
    fn combined_ids_prepend_main_only_when_included() {
        let mut cfg = BumpConfig {
            main_product_id: Some("100".into()),
            associated_ids: ids(&["200", "300", "200"]),
            ..Default::default()
        };
        assert_eq!(cfg.combined_ids(), ids(&["200", "300", "200"]));
        cfg.include_main_in_dropdown = true;
        assert_eq!(cfg.combined_ids(), ids(&["100", "200", "300", "200"]));
        cfg.main_product_id = None;
        assert_eq!(cfg.combined_ids(), ids(&["200", "300", "200"]));
    }

    #[test]
    fn default_id_beats_default_index() {
        let list = ids(&["100", "200", "300"]);
        let cfg = BumpConfig {
            default_id: Some("300".into()),
            default_index: Some(0),
            ..Default::default()
        };
        assert_eq!(cfg.resolve_default_index(&list), 2);
    }

    #[test]
    fn default_index_clamps_and_falls_back() {
        let list = ids(&["100", "200", "300"]);
        let unknown_id = BumpConfig {
            default_id: Some("999".into()),
            default_index: Some(1),
            ..Default::default()
        };
        assert_eq!(unknown_id.resolve_default_index(&list), 1);

        let too_big = BumpConfig {
            default_index: Some(42),
            ..Default::default()
        };
        assert_eq!(too_big.resolve_default_index(&list), 2);

        let negative = BumpConfig {
            default_index: Some(-3),
            ..Default::default()
        };
        assert_eq!(negative.resolve_default_index(&list), 0);

        assert_eq!(BumpConfig::default().resolve_default_index(&list), 0);
        assert_eq!(too_big.resolve_default_index(&[]), 0);
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bumps.json");
        std::fs::write(&path, SAMPLE_CONFIG_JSON).unwrap();

        let cfg = load_page_config(&path).unwrap();
        assert_eq!(cfg.bumps.len(), 2);

        let missing = load_page_config(&dir.path().join("absent.json")).unwrap_err();
        assert!(missing.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn raw_value_defers_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bumps.json");
        std::fs::write(&path, r#"{"bumps": "nope"}"#).unwrap();

        let value = load_config_value(&path).unwrap();
        assert!(matches!(
            page_config_from_value(&value),
            Err(ConfigError::NotAnArray("bumps"))
        ));

        std::fs::write(&path, "{ not json").unwrap();
        let err = load_config_value(&path).unwrap_err();
        assert!(err.to_string().contains("not valid JSON"));
    }
}
