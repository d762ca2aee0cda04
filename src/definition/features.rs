use std::collections::BTreeMap;

use serde_json::Value as JsonValue;

pub const IDENTITY_SEED: &str = "identity_seed";
pub const IDENTITY_INCREMENT: &str = "identity_increment";
pub const SPARSE: &str = "sparse";
pub const ROW_GUID: &str = "row_guid";
pub const INCLUDES: &str = "includes";
pub const FILTER: &str = "filter";
pub const ONLINE: &str = "online";
pub const CLUSTERED: &str = "clustered";
pub const IDENTITY_INSERT: &str = "identity_insert";

/// Free-form, dialect-specific extension values keyed by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdditionalFeatures(BTreeMap<String, JsonValue>);

impl AdditionalFeatures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<JsonValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Missing or non-boolean entries read as `false`.
    pub fn flag(&self, key: &str) -> bool {
        self.0.get(key).and_then(JsonValue::as_bool).unwrap_or(false)
    }

    pub fn int(&self, key: &str) -> Option<i64> {
        self.0.get(key).and_then(JsonValue::as_i64)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(JsonValue::as_str)
    }

    pub fn list(&self, key: &str) -> Vec<String> {
        match self.0.get(key) {
            Some(JsonValue::Array(items)) => items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect(),
            Some(JsonValue::String(single)) => vec![single.clone()],
            _ => Vec::new(),
        }
    }

    /// Appends to a list-valued entry, creating it when absent.
    pub fn push(&mut self, key: &str, item: impl Into<String>) {
        let mut items = self.list(key);
        items.push(item.into());
        self.set(key, items);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &JsonValue)> {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_flag_is_false() {
        let features = AdditionalFeatures::new();
        assert!(!features.flag(SPARSE));
    }

    #[test]
    fn typed_getters() {
        let mut features = AdditionalFeatures::new();
        features.set(IDENTITY_SEED, 100);
        features.set(FILTER, "[Deleted] = 0");
        features.set(ONLINE, true);

        assert_eq!(features.int(IDENTITY_SEED), Some(100));
        assert_eq!(features.text(FILTER), Some("[Deleted] = 0"));
        assert!(features.flag(ONLINE));
    }

    #[test]
    fn push_builds_a_list() {
        let mut features = AdditionalFeatures::new();
        features.push(INCLUDES, "a");
        features.push(INCLUDES, "b");
        assert_eq!(features.list(INCLUDES), vec!["a", "b"]);
    }
}
