//! Computation results: labels, failures and chart layout.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use techchart_core::types::Params;

use crate::dataset::AugmentedDataset;

/// Display label and owning indicator of one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnLabel {
    pub label: String,
    pub key: String,
}

/// Ordered mapping from column name to its label.
///
/// Serializes as a JSON object in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnLabelMap {
    entries: Vec<(String, ColumnLabel)>,
}

impl ColumnLabelMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the label of a column. Replacing keeps the position.
    pub fn insert(&mut self, column: impl Into<String>, label: ColumnLabel) {
        let column = column.into();
        match self.entries.iter_mut().find(|(name, _)| *name == column) {
            Some((_, existing)) => *existing = label,
            None => self.entries.push((column, label)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&ColumnLabel> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, label)| label)
    }

    /// Columns owned by an indicator key, in insertion order.
    pub fn columns_of(&self, key: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, label)| label.key == key)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ColumnLabel)> {
        self.entries.iter().map(|(name, label)| (name.as_str(), label))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for ColumnLabelMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, label) in &self.entries {
            map.serialize_entry(name, label)?;
        }
        map.end()
    }
}

/// An indicator that could not be computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureRecord {
    pub key: String,
    pub reason: String,
}

/// Named subplot and the indicator keys drawn in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubplotGroup {
    pub name: String,
    pub keys: Vec<String>,
}

/// How computed indicators should be arranged on a chart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChartLayout {
    /// Keys drawn over the price chart
    pub overlays: Vec<String>,
    /// Subplot buckets in first-seen order
    pub subplots: Vec<SubplotGroup>,
}

impl ChartLayout {
    pub fn add_overlay(&mut self, key: impl Into<String>) {
        self.overlays.push(key.into());
    }

    /// Add a key to a subplot, creating the bucket on first use.
    pub fn add_to_subplot(&mut self, subplot: &str, key: impl Into<String>) {
        let key = key.into();
        match self.subplots.iter_mut().find(|g| g.name == subplot) {
            Some(group) => group.keys.push(key),
            None => self.subplots.push(SubplotGroup {
                name: subplot.to_string(),
                keys: vec![key],
            }),
        }
    }

    pub fn subplot(&self, name: &str) -> Option<&SubplotGroup> {
        self.subplots.iter().find(|g| g.name == name)
    }

    pub fn subplot_names(&self) -> Vec<&str> {
        self.subplots.iter().map(|g| g.name.as_str()).collect()
    }
}

/// Resolved parameters of one computed indicator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedIndicator {
    pub key: String,
    pub params: Params,
}

/// Everything produced by one orchestrator run.
#[derive(Debug, Clone)]
pub struct ComputationResult {
    pub dataset: AugmentedDataset,
    pub labels: ColumnLabelMap,
    pub failures: Vec<FailureRecord>,
    pub layout: ChartLayout,
    /// Parameters actually used, for successful keys in request order
    pub params: Vec<ResolvedIndicator>,
}

impl ComputationResult {
    /// Result of a run that computed nothing.
    pub fn empty(dataset: AugmentedDataset) -> Self {
        Self {
            dataset,
            labels: ColumnLabelMap::new(),
            failures: Vec::new(),
            layout: ChartLayout::default(),
            params: Vec::new(),
        }
    }

    pub fn params_for(&self, key: &str) -> Option<&Params> {
        self.params.iter().find(|r| r.key == key).map(|r| &r.params)
    }

    pub fn is_failed(&self, key: &str) -> bool {
        self.failures.iter().any(|f| f.key == key)
    }

    /// Generate a text summary.
    pub fn summary(&self) -> String {
        let mut s = String::new();

        s.push_str("═══════════════════════════════════════════════════════════\n");
        s.push_str("                   INDICATOR COMPUTATION                    \n");
        s.push_str("═══════════════════════════════════════════════════════════\n\n");

        s.push_str(&format!("  Symbol:              {}\n", self.dataset.base().symbol()));
        s.push_str(&format!("  Bars:                {}\n", self.dataset.len()));
        s.push_str(&format!("  Indicators:          {}\n", self.params.len()));
        s.push_str(&format!("  Derived Columns:     {}\n", self.dataset.derived_names().len()));
        s.push_str(&format!("  Failures:            {}\n", self.failures.len()));
        s.push('\n');

        s.push_str("LAYOUT\n");
        s.push_str("───────────────────────────────────────────────────────────\n");
        if !self.layout.overlays.is_empty() {
            s.push_str(&format!("  Price:               {}\n", self.layout.overlays.join(", ")));
        }
        for group in &self.layout.subplots {
            s.push_str(&format!("  {:<20} {}\n", format!("{}:", group.name), group.keys.join(", ")));
        }
        s.push('\n');

        if !self.failures.is_empty() {
            s.push_str("FAILURES\n");
            s.push_str("───────────────────────────────────────────────────────────\n");
            for failure in &self.failures {
                s.push_str(&format!("  {:<20} {}\n", format!("{}:", failure.key), failure.reason));
            }
            s.push('\n');
        }

        s.push_str("═══════════════════════════════════════════════════════════\n");

        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(key: &str) -> ColumnLabel {
        ColumnLabel {
            label: key.to_uppercase(),
            key: key.to_string(),
        }
    }

    #[test]
    fn test_label_map_keeps_insertion_order() {
        let mut labels = ColumnLabelMap::new();
        labels.insert("SMA_20", label("sma"));
        labels.insert("EMA_20", label("ema"));
        labels.insert("BB_Mid_20", label("bollinger"));

        let json = serde_json::to_string(&labels).unwrap();
        assert!(json.starts_with(r#"{"SMA_20":"#));
        assert!(json.find("EMA_20").unwrap() < json.find("BB_Mid_20").unwrap());
        assert_eq!(labels.columns_of("ema"), vec!["EMA_20"]);
    }

    #[test]
    fn test_layout_buckets_first_seen() {
        let mut layout = ChartLayout::default();
        layout.add_to_subplot("Volume", "volume");
        layout.add_to_subplot("RSI", "rsi");
        layout.add_to_subplot("Volume", "volume_sma");

        assert_eq!(layout.subplot_names(), vec!["Volume", "RSI"]);
        assert_eq!(layout.subplot("Volume").unwrap().keys, vec!["volume", "volume_sma"]);
    }
}
