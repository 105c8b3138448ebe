//! Model-tuning parameters forwarded to the remote service.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An ordered map of generation parameters, e.g. `temperature` or `maxTokens`.
///
/// Null entries are dropped on insertion, so an unset key never reaches the
/// wire. Keys are sent exactly as given.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelSettings(Map<String, Value>);

impl ModelSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key`; a `null` value removes it instead.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// In-place form of [`ModelSettings::set`].
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        match value.into() {
            Value::Null => {
                self.0.remove(&key);
            }
            v => {
                self.0.insert(key, v);
            }
        }
    }

    /// Sets `temperature`.
    pub fn temperature(self, value: f64) -> Self {
        self.set("temperature", value)
    }

    /// Sets `maxTokens`.
    pub fn max_tokens(self, value: u64) -> Self {
        self.set("maxTokens", value)
    }

    /// Sets `topP`.
    pub fn top_p(self, value: f64) -> Self {
        self.set("topP", value)
    }

    /// Sets `model`.
    pub fn model(self, value: impl Into<String>) -> Self {
        self.set("model", value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Layers `overrides` on top of `self`, key by key.
    pub fn merged_with(&self, overrides: Option<&ModelSettings>) -> ModelSettings {
        let mut merged = ModelSettings(
            self.0
                .iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        );
        if let Some(overrides) = overrides {
            for (k, v) in &overrides.0 {
                merged.insert(k.clone(), v.clone());
            }
        }
        merged
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ModelSettings {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut settings = ModelSettings::new();
        for (k, v) in iter {
            settings.insert(k, v);
        }
        settings
    }
}
