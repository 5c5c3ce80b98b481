//! Volatility indicators.

use serde::{Deserialize, Serialize};
use techchart_core::error::IndicatorError;
use techchart_core::traits::{Indicator, OhlcvIndicator};
use techchart_core::types::{BaseSeries, Column};

use crate::moving_average::{check_period, ema_series, wilder_series};
use crate::window::{checked_div, rolling_mean, rolling_std, rolling_sum_options};

/// Canonical Average True Range: Wilder smoothing of the true range, seeded
/// with the first bar's high-low range.
///
/// Every indicator that needs an ATR calls this one function.
pub fn atr_series(series: &BaseSeries, period: usize) -> Vec<f64> {
    wilder_series(&series.true_ranges(), period)
}

/// Rolling population standard deviation.
#[derive(Debug, Clone)]
pub struct StdDev {
    period: usize,
}

impl StdDev {
    /// Create a new standard deviation indicator.
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        check_period("StdDev", period)?;
        Ok(Self { period })
    }
}

impl Indicator for StdDev {
    type Output = Option<f64>;

    fn calculate(&self, data: &[f64]) -> Result<Column, IndicatorError> {
        self.validate_data(data)?;
        Ok(rolling_std(data, self.period))
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "StdDev"
    }
}

/// Average True Range (ATR).
///
/// Measures market volatility by decomposing the entire range
/// of an asset price for that period.
#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
}

impl Atr {
    /// Create a new ATR indicator.
    ///
    /// Common period is 14.
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        check_period("ATR", period)?;
        Ok(Self { period })
    }
}

impl OhlcvIndicator for Atr {
    type Output = f64;

    fn calculate(&self, series: &BaseSeries) -> Result<Vec<f64>, IndicatorError> {
        self.validate_series(series)?;
        Ok(atr_series(series, self.period))
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "ATR"
    }
}

/// Bollinger Bands output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerOutput {
    /// Middle band (SMA)
    pub middle: f64,
    /// Upper band at 2 standard deviations
    pub upper_2: f64,
    /// Lower band at 2 standard deviations
    pub lower_2: f64,
    /// Upper band at 3 standard deviations
    pub upper_3: f64,
    /// Lower band at 3 standard deviations
    pub lower_3: f64,
}

/// Bollinger Bands.
///
/// A middle SMA with envelopes at 2 and 3 population standard deviations.
#[derive(Debug, Clone)]
pub struct BollingerBands {
    period: usize,
}

impl BollingerBands {
    /// Create Bollinger Bands with the default period (20).
    pub fn new() -> Self {
        Self { period: 20 }
    }

    pub fn with_period(period: usize) -> Result<Self, IndicatorError> {
        check_period("Bollinger Bands", period)?;
        Ok(Self { period })
    }
}

impl Default for BollingerBands {
    fn default() -> Self {
        Self::new()
    }
}

impl Indicator for BollingerBands {
    type Output = Option<BollingerOutput>;

    fn calculate(&self, data: &[f64]) -> Result<Vec<Option<BollingerOutput>>, IndicatorError> {
        self.validate_data(data)?;

        let middle = rolling_mean(data, self.period);
        let std_dev = rolling_std(data, self.period);

        Ok(middle
            .iter()
            .zip(std_dev.iter())
            .map(|(mid, sd)| {
                let (mid, sd) = ((*mid)?, (*sd)?);
                Some(BollingerOutput {
                    middle: mid,
                    upper_2: mid + 2.0 * sd,
                    lower_2: mid - 2.0 * sd,
                    upper_3: mid + 3.0 * sd,
                    lower_3: mid - 3.0 * sd,
                })
            })
            .collect())
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "Bollinger Bands"
    }
}

/// Mass Index.
///
/// Sum over `sum_period` bars of EMA(range) / EMA(EMA(range)). Undefined
/// positions read 0.
#[derive(Debug, Clone)]
pub struct MassIndex {
    ema_period: usize,
    sum_period: usize,
}

impl MassIndex {
    /// Create a Mass Index with default parameters (9, 25).
    pub fn new() -> Self {
        Self {
            ema_period: 9,
            sum_period: 25,
        }
    }

    pub fn with_params(ema_period: usize, sum_period: usize) -> Result<Self, IndicatorError> {
        check_period("Mass Index EMA", ema_period)?;
        check_period("Mass Index sum", sum_period)?;
        Ok(Self {
            ema_period,
            sum_period,
        })
    }
}

impl Default for MassIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl OhlcvIndicator for MassIndex {
    type Output = f64;

    fn calculate(&self, series: &BaseSeries) -> Result<Vec<f64>, IndicatorError> {
        self.validate_series(series)?;

        let ranges: Vec<f64> = series.iter().map(|b| b.range()).collect();
        let single = ema_series(&ranges, self.ema_period);
        let double = ema_series(&single, self.ema_period);

        let ratio: Column = single
            .iter()
            .zip(double.iter())
            .map(|(&s, &d)| checked_div(s, d))
            .collect();

        Ok(rolling_sum_options(&ratio, self.sum_period)
            .into_iter()
            .map(|v| v.unwrap_or(0.0))
            .collect())
    }

    fn period(&self) -> usize {
        self.ema_period.max(self.sum_period)
    }

    fn name(&self) -> &str {
        "Mass Index"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use techchart_core::types::Bar;

    fn flat_series(len: i64, price: f64) -> BaseSeries {
        let bars = (0..len)
            .map(|i| Bar::new(i * 86_400_000, price, price, price, price, 0.0))
            .collect();
        BaseSeries::new("FLAT", bars).unwrap()
    }

    #[test]
    fn test_std_dev() {
        let std_dev = StdDev::new(3).unwrap();
        let data = vec![2.0, 4.0, 6.0, 8.0, 10.0];
        let result = std_dev.calculate(&data).unwrap();

        assert_eq!(result.len(), 5);
        assert!(result[1].is_none());
        // First window: [2, 4, 6], mean = 4, variance = (4+0+4)/3 = 8/3
        assert!((result[2].unwrap() - (8.0f64 / 3.0).sqrt()).abs() < 1e-10);
    }

    #[test]
    fn test_atr() {
        let bars = vec![
            Bar::new(0, 9.0, 10.0, 8.0, 9.0, 100.0),
            Bar::new(1, 10.0, 11.0, 9.0, 10.0, 100.0),
            Bar::new(2, 12.0, 13.0, 11.5, 12.5, 100.0),
        ];
        let series = BaseSeries::new("ATR", bars).unwrap();
        let result = Atr::new(2).unwrap().calculate(&series).unwrap();

        // TR = [2, 2, 3]; Wilder alpha = 0.5
        assert_eq!(result, vec![2.0, 2.0, 2.5]);
    }

    #[test]
    fn test_atr_flat_series_is_zero() {
        let result = Atr::new(14).unwrap().calculate(&flat_series(30, 100.0)).unwrap();
        assert_eq!(result.len(), 30);
        assert!(result.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_atr_insufficient_data() {
        let result = Atr::new(14).unwrap().calculate(&flat_series(10, 100.0));
        assert!(matches!(
            result,
            Err(IndicatorError::InsufficientData { required: 14, available: 10 })
        ));
    }

    #[test]
    fn test_bollinger_bands_ordering() {
        let bb = BollingerBands::new();
        let data: Vec<f64> = (0..60)
            .map(|i| 100.0 + (i as f64 * 0.3).sin() * 5.0)
            .collect();

        let result = bb.calculate(&data).unwrap();
        assert_eq!(result.len(), 60);
        assert!(result[18].is_none());

        for output in result.iter().flatten() {
            assert!(output.lower_3 <= output.lower_2);
            assert!(output.lower_2 <= output.middle);
            assert!(output.middle <= output.upper_2);
            assert!(output.upper_2 <= output.upper_3);
        }
    }

    #[test]
    fn test_bollinger_constant_price() {
        let bb = BollingerBands::with_period(5).unwrap();
        let result = bb.calculate(&[100.0; 5]).unwrap();
        let output = result[4].unwrap();

        assert_eq!(output.upper_3, 100.0);
        assert_eq!(output.lower_3, 100.0);
        assert_eq!(output.middle, 100.0);
    }

    #[test]
    fn test_mass_index_flat_range() {
        let result = MassIndex::new().calculate(&flat_series(30, 50.0)).unwrap();
        assert!(result.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_mass_index_constant_range() {
        let bars = (0..40)
            .map(|i| Bar::new(i * 60_000, 10.0, 11.0, 9.0, 10.0, 1.0))
            .collect();
        let series = BaseSeries::new("M", bars).unwrap();
        let result = MassIndex::with_params(9, 25).unwrap().calculate(&series).unwrap();

        assert_eq!(result[23], 0.0);
        // Constant range: every ratio is exactly 1
        assert!((result[24] - 25.0).abs() < 1e-10);
    }
}
