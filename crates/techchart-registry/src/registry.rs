//! Indicator registry with keyed lookup.

use std::collections::HashMap;
use std::sync::OnceLock;
use techchart_core::error::{EngineError, UnknownIndicatorKeyError};
use techchart_core::types::Params;
use tracing::debug;

use crate::catalog::builtin_definitions;
use crate::definition::{Category, IndicatorDefinition, IndicatorInfo};

/// Registry of indicator definitions.
///
/// Declaration order is preserved for listings; lookups go through a key index.
#[derive(Debug, Clone)]
pub struct IndicatorRegistry {
    definitions: Vec<IndicatorDefinition>,
    index: HashMap<&'static str, usize>,
}

impl IndicatorRegistry {
    /// Create a registry holding every built-in indicator.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for definition in builtin_definitions() {
            registry.insert(definition);
        }
        registry
    }

    /// Create a registry with no definitions.
    pub fn empty() -> Self {
        Self {
            definitions: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Shared registry of built-ins, built on first use.
    pub fn global() -> &'static IndicatorRegistry {
        static GLOBAL: OnceLock<IndicatorRegistry> = OnceLock::new();
        GLOBAL.get_or_init(IndicatorRegistry::new)
    }

    /// Add a definition. Keys must be unique.
    pub fn register(&mut self, definition: IndicatorDefinition) -> Result<(), EngineError> {
        if self.contains(definition.key) {
            return Err(EngineError::Config(format!(
                "indicator '{}' is already registered",
                definition.key
            )));
        }
        debug!(key = definition.key, "Registered indicator");
        self.insert(definition);
        Ok(())
    }

    fn insert(&mut self, definition: IndicatorDefinition) {
        self.index.insert(definition.key, self.definitions.len());
        self.definitions.push(definition);
    }

    /// Get a definition by key.
    pub fn get(&self, key: &str) -> Option<&IndicatorDefinition> {
        self.index.get(key).map(|&i| &self.definitions[i])
    }

    /// Get a definition by key, failing for unknown keys.
    pub fn lookup(&self, key: &str) -> Result<&IndicatorDefinition, UnknownIndicatorKeyError> {
        self.get(key)
            .ok_or_else(|| UnknownIndicatorKeyError(key.to_string()))
    }

    /// Check if a key is registered.
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// All definitions in declaration order.
    pub fn list(&self) -> &[IndicatorDefinition] {
        &self.definitions
    }

    /// All keys in declaration order.
    pub fn keys(&self) -> Vec<&'static str> {
        self.definitions.iter().map(|d| d.key).collect()
    }

    pub fn by_category(&self, category: Category) -> Vec<&IndicatorDefinition> {
        self.definitions
            .iter()
            .filter(|d| d.category == category)
            .collect()
    }

    /// Serializable descriptions of every definition.
    pub fn infos(&self) -> Result<Vec<IndicatorInfo>, EngineError> {
        self.definitions
            .iter()
            .map(|d| d.info().map_err(EngineError::from))
            .collect()
    }

    /// Merge overrides onto the defaults of `key`.
    pub fn resolve_params(&self, key: &str, overrides: Option<&Params>) -> Result<Params, EngineError> {
        let definition = self.lookup(key)?;
        Ok(definition.resolve_params(overrides)?)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl Default for IndicatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
