//! Placeholder substitution for fixture payloads
//!
//! Static JSON fixtures cannot carry computed values (a 1001-character
//! title, the current timestamp), so they hold a sentinel string instead.
//! [`PlaceholderReplacer`] swaps the sentinel for the computed value when the
//! fixture is loaded.

use std::collections::BTreeMap;

use serde_json::Value;

pub const LONG_PASSWORD_PLACEHOLDER: &str = "LONG_PASSWORD_PLACEHOLDER";
pub const LONG_TITLE_PLACEHOLDER: &str = "LONG_TITLE_PLACEHOLDER";
pub const TIMESTAMP_PLACEHOLDER: &str = "TIMESTAMP_PLACEHOLDER";

/// One substitution rule: `field` holding exactly `placeholder` becomes `replacement`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderConfig {
    pub field: String,
    pub placeholder: String,
    pub replacement: String,
}

impl PlaceholderConfig {
    fn new(field: &str, placeholder: &str, replacement: String) -> Self {
        Self {
            field: field.to_string(),
            placeholder: placeholder.to_string(),
            replacement,
        }
    }
}

type ConfigMap = BTreeMap<&'static str, BTreeMap<&'static str, PlaceholderConfig>>;

/// Rules grouped by fixture category (`userData`, `noteData`, `apiData`)
/// and fixture key.
///
/// Timestamp replacements are computed once, when the rules are built. Call
/// [`PlaceholderReplacer::regenerate`] for a fresh timestamp.
#[derive(Debug, Clone)]
pub struct PlaceholderReplacer {
    config: ConfigMap,
}

impl Default for PlaceholderReplacer {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaceholderReplacer {
    pub fn new() -> Self {
        Self::at(chrono::Utc::now().timestamp_millis())
    }

    /// Build the rules with a fixed timestamp
    pub fn at(timestamp_millis: i64) -> Self {
        Self {
            config: build_config(timestamp_millis),
        }
    }

    /// Rebuild the rules with the current time
    pub fn regenerate(&mut self) {
        *self = Self::new();
    }

    pub fn config(&self, category: &str, key: &str) -> Option<&PlaceholderConfig> {
        self.config.get(category)?.get(key)
    }

    /// Replace `data[key][field]` if it holds the configured placeholder.
    ///
    /// Returns `false` when the category or key has no rule, when `data[key]`
    /// is absent, or when the field already holds something else.
    pub fn replace_placeholder(&self, data: &mut Value, category: &str, key: &str) -> bool {
        let Some(config) = self.config(category, key) else {
            return false;
        };
        match data.get_mut(key) {
            Some(item) => Self::replace_in_object(
                item,
                &config.field,
                &config.placeholder,
                &config.replacement,
            ),
            None => false,
        }
    }

    /// Replace `obj[field]` with `replacement` if it equals `placeholder`
    pub fn replace_in_object(obj: &mut Value, field: &str, placeholder: &str, replacement: &str) -> bool {
        match obj.get_mut(field) {
            Some(value) if value.as_str() == Some(placeholder) => {
                *value = Value::String(replacement.to_string());
                true
            }
            _ => false,
        }
    }
}

fn build_config(timestamp_millis: i64) -> ConfigMap {
    let timestamp = timestamp_millis.to_string();
    let mut config: ConfigMap = BTreeMap::new();

    config.entry("userData").or_default().insert(
        "longPassword",
        PlaceholderConfig::new("password", LONG_PASSWORD_PLACEHOLDER, "A".repeat(129)),
    );

    let notes = config.entry("noteData").or_default();
    notes.insert(
        "longTitle",
        PlaceholderConfig::new("title", LONG_TITLE_PLACEHOLDER, "A".repeat(1001)),
    );
    notes.insert(
        "validNote",
        PlaceholderConfig::new("title", TIMESTAMP_PLACEHOLDER, timestamp.clone()),
    );
    notes.insert(
        "titleOnlyNote",
        PlaceholderConfig::new("title", TIMESTAMP_PLACEHOLDER, timestamp),
    );

    config.entry("apiData").or_default().insert(
        "extremelyLargePayload",
        PlaceholderConfig::new("description", LONG_TITLE_PLACEHOLDER, "A".repeat(100_001)),
    );

    config
}
