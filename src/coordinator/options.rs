use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

/// String options attached to an immediate subscription request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionOptions(BTreeMap<String, String>);

impl SubscriptionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds options from caller-supplied JSON, dropping every entry whose
    /// value is not a string. Dropped entries are logged, never rejected.
    pub fn from_json(raw: &Map<String, Value>) -> Self {
        let mut options = Self::new();
        for (key, value) in raw {
            match value {
                Value::String(s) => options.insert(key.clone(), s.clone()),
                other => warn!("Dropping subscription option '{key}': expected a string, got {other}"),
            }
        }
        options
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
