//! Computation requests.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use techchart_core::types::Params;

/// Which indicators to compute and with which parameter overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawRequest")]
pub struct ComputationRequest {
    selected_keys: Vec<String>,
    overrides: BTreeMap<String, Params>,
}

/// Wire shape of a request before duplicate keys are dropped.
#[derive(Deserialize)]
struct RawRequest {
    selected_keys: Vec<String>,
    #[serde(default)]
    overrides: BTreeMap<String, Params>,
}

impl From<RawRequest> for ComputationRequest {
    fn from(raw: RawRequest) -> Self {
        let mut request = Self::new(raw.selected_keys);
        request.overrides = raw.overrides;
        request
    }
}

impl ComputationRequest {
    /// Create a request for the given keys.
    ///
    /// Duplicates are dropped; the first occurrence keeps its position.
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut request = Self::default();
        for key in keys {
            request.select(key);
        }
        request
    }

    /// Append a key unless it is already selected.
    pub fn select(&mut self, key: impl Into<String>) {
        let key = key.into();
        if !self.selected_keys.contains(&key) {
            self.selected_keys.push(key);
        }
    }

    /// Set partial parameter overrides for a key.
    ///
    /// Overrides for the same key are merged, later values winning.
    pub fn with_override(mut self, key: impl Into<String>, params: Params) -> Self {
        self.set_override(key, params);
        self
    }

    pub fn set_override(&mut self, key: impl Into<String>, params: Params) {
        let entry = self.overrides.entry(key.into()).or_default();
        for (name, value) in params.iter() {
            entry.set(name, value.clone());
        }
    }

    /// Selected keys in request order.
    pub fn selected_keys(&self) -> &[String] {
        &self.selected_keys
    }

    /// Overrides for a key, if any.
    pub fn overrides_for(&self, key: &str) -> Option<&Params> {
        self.overrides.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.selected_keys.is_empty()
    }

    pub fn len(&self) -> usize {
        self.selected_keys.len()
    }
}
