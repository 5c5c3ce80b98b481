//! CSV data source.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord};
use std::io::Read;
use std::path::{Path, PathBuf};
use techchart_core::error::DataError;
use techchart_core::types::Bar;
use tracing::debug;

const DATE_HEADERS: [&str; 4] = ["date", "datetime", "timestamp", "time"];

/// Positions of the OHLCV fields in a CSV header row.
#[derive(Debug, Clone, Copy)]
struct Columns {
    date: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: Option<usize>,
}

impl Columns {
    /// Locate columns by case-insensitive header name.
    ///
    /// `Close` wins over `Adj Close` when both are present. A missing volume
    /// column reads as zero volume.
    fn from_headers(headers: &StringRecord) -> Result<Self, DataError> {
        let find = |names: &[&str]| {
            headers
                .iter()
                .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
        };
        let require = |names: &[&str]| {
            find(names).ok_or_else(|| {
                DataError::ParseError(format!("missing column '{}'", names[0]))
            })
        };

        Ok(Self {
            date: require(&DATE_HEADERS)?,
            open: require(&["open"])?,
            high: require(&["high"])?,
            low: require(&["low"])?,
            close: find(&["close"])
                .or_else(|| find(&["adj close", "adj_close"]))
                .ok_or_else(|| DataError::ParseError("missing column 'close'".to_string()))?,
            volume: find(&["volume"]),
        })
    }
}

/// CSV data source for historical bars.
#[derive(Debug, Clone)]
pub struct CsvDataSource {
    path: PathBuf,
}

impl CsvDataSource {
    /// Create a source for an existing file.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DataError::NotFound(path.display().to_string()));
        }
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Symbol derived from the file stem, e.g. `AAPL` for `data/AAPL.csv`.
    pub fn default_symbol(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().to_uppercase())
            .unwrap_or_else(|| "UNKNOWN".to_string())
    }

    /// Load all bars, sorted by timestamp.
    pub fn load(&self) -> Result<Vec<Bar>, DataError> {
        let reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .map_err(|e| DataError::ParseError(e.to_string()))?;
        let bars = read_bars(reader)?;
        debug!(path = %self.path.display(), bars = bars.len(), "Loaded CSV");
        Ok(bars)
    }
}

/// Read bars from any CSV reader with a header row.
pub fn read_bars_from<R: Read>(input: R) -> Result<Vec<Bar>, DataError> {
    let reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);
    read_bars(reader)
}

fn read_bars<R: Read>(mut reader: csv::Reader<R>) -> Result<Vec<Bar>, DataError> {
    let headers = reader
        .headers()
        .map_err(|e| DataError::ParseError(e.to_string()))?
        .clone();
    let columns = Columns::from_headers(&headers)?;

    let mut bars = Vec::new();
    for (line, result) in reader.records().enumerate() {
        let record = result.map_err(|e| DataError::ParseError(e.to_string()))?;
        let row = line + 2;

        let field = |index: usize, name: &str| -> Result<f64, DataError> {
            let raw = record.get(index).unwrap_or("");
            raw.parse::<f64>().map_err(|_| {
                DataError::ParseError(format!("row {}: invalid {} '{}'", row, name, raw))
            })
        };

        let timestamp = parse_timestamp(record.get(columns.date).unwrap_or(""))?;
        let volume = match columns.volume {
            Some(index) if !record.get(index).unwrap_or("").is_empty() => field(index, "volume")?,
            _ => 0.0,
        };

        bars.push(Bar::new(
            timestamp,
            field(columns.open, "open")?,
            field(columns.high, "high")?,
            field(columns.low, "low")?,
            field(columns.close, "close")?,
            volume,
        ));
    }

    if bars.is_empty() {
        return Err(DataError::NoDataAvailable);
    }

    bars.sort_by_key(|b| b.timestamp);
    Ok(bars)
}

/// Parse a timestamp cell into Unix milliseconds (UTC).
pub fn parse_timestamp(value: &str) -> Result<i64, DataError> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.timestamp_millis());
    }

    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(dt.and_utc().timestamp_millis());
        }
    }

    for format in ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            if let Some(dt) = date.and_hms_opt(0, 0, 0) {
                return Ok(dt.and_utc().timestamp_millis());
            }
        }
    }

    // Unix epoch, milliseconds above 10 digits
    if let Ok(ts) = value.parse::<i64>() {
        return Ok(if ts > 10_000_000_000 { ts } else { ts * 1000 });
    }

    Err(DataError::ParseError(format!("could not parse date '{}'", value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp() {
        assert_eq!(parse_timestamp("2024-01-15").unwrap(), 1_705_276_800_000);
        assert_eq!(parse_timestamp("2024-01-15 10:30:00").unwrap(), 1_705_314_600_000);
        assert_eq!(parse_timestamp("2024-01-15T10:30:00Z").unwrap(), 1_705_314_600_000);
        assert_eq!(parse_timestamp("1705312800000").unwrap(), 1_705_312_800_000);
        assert_eq!(parse_timestamp("1705312800").unwrap(), 1_705_312_800_000);
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_read_sorts_and_defaults_volume() {
        let csv = "Date,Open,High,Low,Close\n\
                   2024-01-03,11,12,10,11.5\n\
                   2024-01-02,10,11,9,10.5\n";
        let bars = read_bars_from(csv.as_bytes()).unwrap();

        assert_eq!(bars.len(), 2);
        assert!(bars[0].timestamp < bars[1].timestamp);
        assert_eq!(bars[0].close, 10.5);
        assert_eq!(bars[0].volume, 0.0);
    }

    #[test]
    fn test_close_preferred_over_adjusted() {
        let csv = "date,open,high,low,close,adj close,volume\n\
                   2024-01-02,10,11,9,10.5,10.1,100\n";
        let bars = read_bars_from(csv.as_bytes()).unwrap();
        assert_eq!(bars[0].close, 10.5);

        let csv = "Timestamp,Open,High,Low,Adj Close,Volume\n\
                   1705312800,10,11,9,10.1,100\n";
        let bars = read_bars_from(csv.as_bytes()).unwrap();
        assert_eq!(bars[0].close, 10.1);
        assert_eq!(bars[0].volume, 100.0);
    }

    #[test]
    fn test_errors() {
        let missing_high = "Date,Open,Low,Close\n2024-01-02,1,1,1\n";
        assert!(matches!(
            read_bars_from(missing_high.as_bytes()),
            Err(DataError::ParseError(_))
        ));

        let bad_number = "Date,Open,High,Low,Close\n2024-01-02,x,1,1,1\n";
        assert!(matches!(
            read_bars_from(bad_number.as_bytes()),
            Err(DataError::ParseError(msg)) if msg.contains("row 2")
        ));

        let empty = "Date,Open,High,Low,Close\n";
        assert!(matches!(
            read_bars_from(empty.as_bytes()),
            Err(DataError::NoDataAvailable)
        ));

        assert!(matches!(
            CsvDataSource::new("/definitely/not/here.csv"),
            Err(DataError::NotFound(_))
        ));
    }
}
