//! Base series augmented with derived indicator columns.

use std::sync::Arc;
use techchart_core::error::IndicatorError;
use techchart_core::types::{defined, BaseSeries, Column, DerivedColumns, BASE_COLUMNS};

/// A base series plus the derived columns computed on it.
///
/// The base is never modified. Derived columns are shared, so cloning a
/// dataset or extending it through a [`DatasetBuilder`] does not copy data.
#[derive(Debug, Clone)]
pub struct AugmentedDataset {
    base: BaseSeries,
    derived: Vec<(String, Arc<Column>)>,
}

impl AugmentedDataset {
    /// Dataset with no derived columns.
    pub fn from_base(base: BaseSeries) -> Self {
        Self {
            base,
            derived: Vec::new(),
        }
    }

    pub fn base(&self) -> &BaseSeries {
        &self.base
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.base.len()
    }

    pub fn is_empty(&self) -> bool {
        self.base.is_empty()
    }

    /// Base column names followed by derived names in insertion order.
    pub fn column_names(&self) -> Vec<&str> {
        BASE_COLUMNS
            .iter()
            .copied()
            .chain(self.derived.iter().map(|(name, _)| name.as_str()))
            .collect()
    }

    /// Derived column names in insertion order.
    pub fn derived_names(&self) -> Vec<&str> {
        self.derived.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        BASE_COLUMNS.contains(&name) || self.derived(name).is_some()
    }

    /// A derived column by name.
    pub fn derived(&self, name: &str) -> Option<&Column> {
        self.derived
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, values)| values.as_ref())
    }

    /// Any column by name. Base columns are fully defined.
    pub fn column(&self, name: &str) -> Option<Column> {
        match self.base.column(name) {
            Some(values) => Some(defined(values)),
            None => self.derived(name).cloned(),
        }
    }

    /// Value of a column at a row.
    pub fn value(&self, name: &str, row: usize) -> Option<f64> {
        if let Some(bar) = self.base.get(row) {
            if let Some(value) = bar.field(name) {
                return Some(value);
            }
        }
        self.derived(name).and_then(|values| values.get(row).copied().flatten())
    }
}

/// Appends derived columns onto a dataset without touching the base.
#[derive(Debug, Clone)]
pub struct DatasetBuilder {
    dataset: AugmentedDataset,
}

impl DatasetBuilder {
    pub fn new(base: BaseSeries) -> Self {
        Self {
            dataset: AugmentedDataset::from_base(base),
        }
    }

    /// Continue from an existing dataset.
    pub fn from_dataset(dataset: AugmentedDataset) -> Self {
        Self { dataset }
    }

    /// Current view of the dataset being built.
    pub fn dataset(&self) -> &AugmentedDataset {
        &self.dataset
    }

    /// Check a set of columns without appending it.
    ///
    /// Every column must match the series length and no name may already exist
    /// in the dataset or repeat within the set.
    pub fn check(&self, columns: &DerivedColumns) -> Result<(), IndicatorError> {
        let expected = self.dataset.len();
        let mut seen: Vec<&str> = Vec::with_capacity(columns.len());

        for (name, values) in columns.iter() {
            if values.len() != expected {
                return Err(IndicatorError::CalculationError(format!(
                    "column '{}' has {} values for {} bars",
                    name,
                    values.len(),
                    expected
                )));
            }
            if self.dataset.contains(name) || seen.contains(&name) {
                return Err(IndicatorError::CalculationError(format!(
                    "column '{}' already exists",
                    name
                )));
            }
            seen.push(name);
        }
        Ok(())
    }

    /// Append all columns, or none if any fails the check.
    pub fn append(&mut self, columns: DerivedColumns) -> Result<(), IndicatorError> {
        self.check(&columns)?;
        self.dataset.derived.extend(
            columns
                .into_iter()
                .map(|(name, values)| (name, Arc::new(values))),
        );
        Ok(())
    }

    pub fn build(self) -> AugmentedDataset {
        self.dataset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use techchart_core::types::Bar;

    fn series() -> BaseSeries {
        let bars = (0..3)
            .map(|i| Bar::new(i * 1_000, 10.0, 11.0, 9.0, 10.0, 5.0))
            .collect();
        BaseSeries::new("T", bars).unwrap()
    }

    #[test]
    fn test_append_and_read_back() {
        let mut builder = DatasetBuilder::new(series());
        builder
            .append(DerivedColumns::new().with("X", vec![None, Some(1.0), Some(2.0)]))
            .unwrap();
        let dataset = builder.build();

        assert_eq!(dataset.column_names(), vec!["Open", "High", "Low", "Close", "Volume", "X"]);
        assert_eq!(dataset.value("X", 1), Some(1.0));
        assert_eq!(dataset.value("X", 0), None);
        assert_eq!(dataset.value("Close", 2), Some(10.0));
        assert_eq!(dataset.column("Volume"), Some(vec![Some(5.0); 3]));
    }

    #[test]
    fn test_rejects_length_mismatch_and_collisions() {
        let mut builder = DatasetBuilder::new(series());

        let short = DerivedColumns::new().with("X", vec![Some(1.0)]);
        assert!(builder.append(short).is_err());

        let base_name = DerivedColumns::new().with("Close", vec![Some(1.0); 3]);
        assert!(builder.append(base_name).is_err());

        let repeated = DerivedColumns::new()
            .with("Y", vec![Some(1.0); 3])
            .with("Y", vec![Some(2.0); 3]);
        assert!(builder.append(repeated).is_err());

        assert!(builder.dataset().derived_names().is_empty());
    }

    #[test]
    fn test_extending_keeps_original() {
        let mut builder = DatasetBuilder::new(series());
        builder
            .append(DerivedColumns::new().with("A", vec![Some(1.0); 3]))
            .unwrap();
        let first = builder.build();

        let mut builder = DatasetBuilder::from_dataset(first.clone());
        builder
            .append(DerivedColumns::new().with("B", vec![Some(2.0); 3]))
            .unwrap();
        let second = builder.build();

        assert_eq!(first.derived_names(), vec!["A"]);
        assert_eq!(second.derived_names(), vec!["A", "B"]);
    }
}
