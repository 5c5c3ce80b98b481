//! Bounded, serializable views of computation results.

use chrono::{DateTime, SecondsFormat};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::dataset::AugmentedDataset;
use crate::result::{ColumnLabelMap, ComputationResult};

/// Rows kept when no explicit count is configured.
pub const DEFAULT_PROJECTION_ROWS: usize = 250;

const MS_PER_DAY: i64 = 86_400_000;

/// One cell of a projected row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Number(Option<f64>),
}

/// One projected row: `Date` first, then every column in dataset order.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    cells: Vec<(String, Cell)>,
}

impl Row {
    pub fn get(&self, column: &str) -> Option<&Cell> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, cell)| cell)
    }

    pub fn date(&self) -> Option<&str> {
        match self.get("Date") {
            Some(Cell::Text(date)) => Some(date),
            _ => None,
        }
    }

    pub fn number(&self, column: &str) -> Option<f64> {
        match self.get(column) {
            Some(Cell::Number(value)) => *value,
            _ => None,
        }
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (name, cell) in &self.cells {
            map.serialize_entry(name, cell)?;
        }
        map.end()
    }
}

/// The last N rows of a dataset with their column labels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Projection {
    pub symbol: String,
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    pub labels: ColumnLabelMap,
}

impl Projection {
    /// Pretty-printed JSON. Identical input gives identical bytes.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Projects results into bounded row records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Projector {
    rows: usize,
}

impl Projector {
    pub fn new(rows: usize) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Project a computation result. The input is not modified.
    pub fn project(&self, result: &ComputationResult) -> Projection {
        self.project_dataset(&result.dataset, &result.labels)
    }

    pub fn project_dataset(&self, dataset: &AugmentedDataset, labels: &ColumnLabelMap) -> Projection {
        let bars = dataset.base().bars();
        let start = bars.len().saturating_sub(self.rows);
        let daily = bars.iter().all(|b| b.timestamp.rem_euclid(MS_PER_DAY) == 0);

        let names = dataset.column_names();
        let columns: Vec<String> = std::iter::once("Date")
            .chain(names.iter().copied())
            .map(str::to_string)
            .collect();

        let rows = (start..bars.len())
            .map(|i| {
                let mut cells = Vec::with_capacity(names.len() + 1);
                cells.push((
                    "Date".to_string(),
                    Cell::Text(format_timestamp(bars[i].timestamp, daily)),
                ));
                for name in &names {
                    cells.push((name.to_string(), Cell::Number(dataset.value(name, i))));
                }
                Row { cells }
            })
            .collect();

        Projection {
            symbol: dataset.base().symbol().to_string(),
            columns,
            rows,
            labels: labels.clone(),
        }
    }
}

impl Default for Projector {
    fn default() -> Self {
        Self::new(DEFAULT_PROJECTION_ROWS)
    }
}

/// `%Y-%m-%d` for daily data, RFC 3339 seconds otherwise.
fn format_timestamp(timestamp: i64, daily: bool) -> String {
    match DateTime::from_timestamp_millis(timestamp) {
        Some(dt) if daily => dt.format("%Y-%m-%d").to_string(),
        Some(dt) => dt.to_rfc3339_opts(SecondsFormat::Secs, true),
        None => timestamp.to_string(),
    }
}

/// Most recent formatted value of each requested column.
pub fn latest_values(dataset: &AugmentedDataset, columns: &[&str]) -> Vec<(String, String)> {
    let last = dataset.len().checked_sub(1);
    columns
        .iter()
        .map(|&name| {
            let value = last.and_then(|row| dataset.value(name, row));
            (name.to_string(), format_value(value))
        })
        .collect()
}

/// Format a value for display.
///
/// Missing and non-finite values render as `N/A`. Precision shrinks with
/// magnitude: 0 decimals above 1000, 2 above 10, 3 above 0.1, else 4.
pub fn format_value(value: Option<f64>) -> String {
    let v = match value {
        Some(v) if v.is_finite() => v,
        _ => return "N/A".to_string(),
    };

    let magnitude = v.abs();
    let decimals = if magnitude > 1000.0 {
        0
    } else if magnitude > 10.0 {
        2
    } else if magnitude > 0.1 {
        3
    } else {
        4
    };

    group_thousands(&format!("{:.*}", decimals, v))
}

fn group_thousands(formatted: &str) -> String {
    let (sign, unsigned) = match formatted.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", formatted),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ComputationRequest, Orchestrator};
    use techchart_core::types::{Bar, BaseSeries};

    fn series(len: usize, step_ms: i64) -> BaseSeries {
        let bars = (0..len)
            .map(|i| {
                let c = 100.0 + i as f64;
                Bar::new(1_704_067_200_000 + i as i64 * step_ms, c, c + 1.0, c - 1.0, c, 500.0)
            })
            .collect();
        BaseSeries::new("PROJ", bars).unwrap()
    }

    fn computed(series: &BaseSeries, keys: &[&str]) -> ComputationResult {
        Orchestrator::default()
            .run(series, &ComputationRequest::new(keys.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_projection_truncates_to_recent_rows() {
        let series = series(300, MS_PER_DAY);
        let result = computed(&series, &["sma"]);

        let projection = Projector::default().project(&result);

        assert_eq!(projection.len(), 250);
        assert_eq!(projection.rows[0].date(), Some("2024-02-20"));
        assert_eq!(projection.rows[249].number("Close"), Some(399.0));
        assert_eq!(
            projection.columns,
            vec!["Date", "Open", "High", "Low", "Close", "Volume", "SMA_20"]
        );
    }

    #[test]
    fn test_short_series_keeps_every_row() {
        let series = series(30, MS_PER_DAY);
        let projection = Projector::new(250).project(&computed(&series, &["bollinger"]));

        assert_eq!(projection.len(), 30);
        assert_eq!(projection.rows[0].number("BB_Mid_20"), None);
        assert!(projection.rows[29].number("BB_Mid_20").is_some());
    }

    #[test]
    fn test_intraday_timestamps_use_rfc3339() {
        let series = series(3, 3_600_000);
        let projection = Projector::default().project(&computed(&series, &[]));

        assert_eq!(projection.rows[1].date(), Some("2024-01-01T01:00:00Z"));
    }

    #[test]
    fn test_json_is_stable_and_ordered() {
        let series = series(40, MS_PER_DAY);
        let result = computed(&series, &["rsi", "bollinger"]);
        let projector = Projector::new(5);

        let first = projector.project(&result).to_json().unwrap();
        let second = projector.project(&result).to_json().unwrap();
        assert_eq!(first, second);

        let value: serde_json::Value = serde_json::from_str(&first).unwrap();
        assert_eq!(value["rows"].as_array().unwrap().len(), 5);
        assert!(first.find("\"Date\"").unwrap() < first.find("\"Open\"").unwrap());
        assert!(first.find("\"RSI_14\"").unwrap() < first.find("\"BB_Mid_20\"").unwrap());
        assert_eq!(value["labels"]["RSI_14"]["key"], "rsi");
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(None), "N/A");
        assert_eq!(format_value(Some(f64::NAN)), "N/A");
        assert_eq!(format_value(Some(1_234_567.8)), "1,234,568");
        assert_eq!(format_value(Some(-2_500.4)), "-2,500");
        assert_eq!(format_value(Some(52.456)), "52.46");
        assert_eq!(format_value(Some(1.23456)), "1.235");
        assert_eq!(format_value(Some(0.012345)), "0.0123");
        assert_eq!(format_value(Some(999.5)), "999.50");
    }

    #[test]
    fn test_latest_values() {
        let series = series(30, MS_PER_DAY);
        let result = computed(&series, &["sma"]);

        let latest = latest_values(&result.dataset, &["Close", "SMA_20", "missing"]);
        assert_eq!(
            latest,
            vec![
                ("Close".to_string(), "129.00".to_string()),
                ("SMA_20".to_string(), "119.50".to_string()),
                ("missing".to_string(), "N/A".to_string()),
            ]
        );
    }
}
