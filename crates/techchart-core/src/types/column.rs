//! Derived column containers.

use serde::{Deserialize, Serialize};

/// One derived numeric column, aligned 1:1 with the base series.
///
/// `None` marks a position where the value is not computable (yet),
/// which is distinct from a computed zero.
pub type Column = Vec<Option<f64>>;

/// Wrap fully-defined values as a column.
pub fn defined(values: Vec<f64>) -> Column {
    values.into_iter().map(Some).collect()
}

/// Replace undefined positions with a fallback value.
pub fn fill_none(values: &[Option<f64>], fallback: f64) -> Column {
    values.iter().map(|v| Some(v.unwrap_or(fallback))).collect()
}

/// Ordered set of named columns produced by one indicator computation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedColumns {
    columns: Vec<(String, Column)>,
}

impl DerivedColumns {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a named column.
    pub fn push(&mut self, name: impl Into<String>, values: Column) {
        self.columns.push((name.into(), values));
    }

    /// Builder-style append.
    pub fn with(mut self, name: impl Into<String>, values: Column) -> Self {
        self.push(name, values);
        self
    }

    /// Look up a column by name.
    pub fn get(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, values)| values)
    }

    /// Column names in insertion order.
    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Check if there are no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Iterate over `(name, values)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.columns.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl IntoIterator for DerivedColumns {
    type Item = (String, Column);
    type IntoIter = std::vec::IntoIter<(String, Column)>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.into_iter()
    }
}
