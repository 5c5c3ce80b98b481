//! Volume-based indicators.

use techchart_core::error::IndicatorError;
use techchart_core::traits::OhlcvIndicator;
use techchart_core::types::{BaseSeries, Column};

use crate::moving_average::check_period;
use crate::window::{checked_div, rolling_mean_options, rolling_sum};

/// On-Balance Volume: running total of volume signed by the close-to-close move.
#[derive(Debug, Clone, Default)]
pub struct Obv;

impl OhlcvIndicator for Obv {
    type Output = f64;

    fn calculate(&self, series: &BaseSeries) -> Result<Vec<f64>, IndicatorError> {
        self.validate_series(series)?;

        let bars = series.bars();
        let mut total = 0.0;
        let mut result = Vec::with_capacity(bars.len());

        for (i, bar) in bars.iter().enumerate() {
            if i > 0 {
                let change = bar.close - bars[i - 1].close;
                if change > 0.0 {
                    total += bar.volume;
                } else if change < 0.0 {
                    total -= bar.volume;
                }
            }
            result.push(total);
        }

        Ok(result)
    }

    fn period(&self) -> usize {
        1
    }

    fn name(&self) -> &str {
        "OBV"
    }
}

/// Money Flow Index.
///
/// Positive and negative raw money flow (typical price × volume) are summed
/// over the window. With no negative flow, or before the window fills, the
/// value reads 50.
#[derive(Debug, Clone)]
pub struct Mfi {
    period: usize,
}

impl Mfi {
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        check_period("MFI", period)?;
        Ok(Self { period })
    }
}

impl OhlcvIndicator for Mfi {
    type Output = f64;

    fn calculate(&self, series: &BaseSeries) -> Result<Vec<f64>, IndicatorError> {
        self.validate_series(series)?;

        let typical = series.typical_prices();
        let n = typical.len();
        let mut positive = vec![0.0; n];
        let mut negative = vec![0.0; n];

        for (i, bar) in series.iter().enumerate().skip(1) {
            let raw_flow = typical[i] * bar.volume;
            if typical[i] > typical[i - 1] {
                positive[i] = raw_flow;
            } else if typical[i] < typical[i - 1] {
                negative[i] = raw_flow;
            }
        }

        let positive_sum = rolling_sum(&positive, self.period);
        let negative_sum = rolling_sum(&negative, self.period);

        Ok(positive_sum
            .iter()
            .zip(negative_sum.iter())
            .map(|(pos, neg)| {
                pos.zip(*neg)
                    .and_then(|(p, n)| checked_div(p, n))
                    .map_or(50.0, |ratio| 100.0 - 100.0 / (1.0 + ratio))
            })
            .collect())
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "MFI"
    }
}

/// Volume Weighted Average Price.
///
/// Cumulative typical price × volume over cumulative volume, optionally
/// restarting at each UTC calendar day. Where cumulative volume is zero the
/// last valid value is carried forward.
#[derive(Debug, Clone)]
pub struct Vwap {
    reset_daily: bool,
}

impl Vwap {
    pub fn new(reset_daily: bool) -> Self {
        Self { reset_daily }
    }

    pub fn reset_daily(&self) -> bool {
        self.reset_daily
    }
}

impl Default for Vwap {
    fn default() -> Self {
        Self::new(true)
    }
}

impl OhlcvIndicator for Vwap {
    type Output = Option<f64>;

    fn calculate(&self, series: &BaseSeries) -> Result<Column, IndicatorError> {
        self.validate_series(series)?;

        let mut cum_price_volume = 0.0;
        let mut cum_volume = 0.0;
        let mut session = None;
        let mut last_valid = None;
        let mut result = Vec::with_capacity(series.len());

        for bar in series.iter() {
            if self.reset_daily {
                let day = bar.date();
                if session != Some(day) {
                    session = Some(day);
                    cum_price_volume = 0.0;
                    cum_volume = 0.0;
                }
            }

            cum_price_volume += bar.typical_price() * bar.volume;
            cum_volume += bar.volume;

            if let Some(vwap) = checked_div(cum_price_volume, cum_volume) {
                last_valid = Some(vwap);
            }
            result.push(last_valid);
        }

        Ok(result)
    }

    fn period(&self) -> usize {
        1
    }

    fn name(&self) -> &str {
        "VWAP"
    }
}

/// Chaikin Money Flow.
#[derive(Debug, Clone)]
pub struct Cmf {
    period: usize,
}

impl Cmf {
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        check_period("CMF", period)?;
        Ok(Self { period })
    }
}

impl OhlcvIndicator for Cmf {
    type Output = f64;

    fn calculate(&self, series: &BaseSeries) -> Result<Vec<f64>, IndicatorError> {
        self.validate_series(series)?;

        // Flat bars contribute no money flow
        let flow_volume: Vec<f64> = series
            .iter()
            .map(|b| {
                let multiplier =
                    checked_div((b.close - b.low) - (b.high - b.close), b.range()).unwrap_or(0.0);
                multiplier * b.volume
            })
            .collect();

        let flow_sum = rolling_sum(&flow_volume, self.period);
        let volume_sum = rolling_sum(&series.volumes(), self.period);

        Ok(flow_sum
            .iter()
            .zip(volume_sum.iter())
            .map(|(f, v)| {
                f.zip(*v)
                    .and_then(|(f, v)| checked_div(f, v))
                    .unwrap_or(0.0)
            })
            .collect())
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "CMF"
    }
}

/// Ease of Movement.
///
/// Midpoint move divided by the box ratio `(volume / divisor) / range`,
/// averaged over the window. Undefined positions read 0.
#[derive(Debug, Clone)]
pub struct Eom {
    period: usize,
    divisor: f64,
}

impl Eom {
    /// Create an EOM with the default volume divisor (1e8).
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        Self::with_divisor(period, 100_000_000.0)
    }

    pub fn with_divisor(period: usize, divisor: f64) -> Result<Self, IndicatorError> {
        check_period("EOM", period)?;
        if !(divisor.is_finite() && divisor > 0.0) {
            return Err(IndicatorError::InvalidParameter(format!(
                "EOM divisor must be positive, got {}",
                divisor
            )));
        }
        Ok(Self { period, divisor })
    }
}

impl OhlcvIndicator for Eom {
    type Output = f64;

    fn calculate(&self, series: &BaseSeries) -> Result<Vec<f64>, IndicatorError> {
        self.validate_series(series)?;

        let bars = series.bars();
        let one_period: Column = (0..bars.len())
            .map(|i| {
                let prev = bars.get(i.checked_sub(1)?)?;
                let bar = &bars[i];
                let midpoint_move = bar.midpoint() - prev.midpoint();
                let box_ratio = checked_div(bar.volume / self.divisor, bar.range())?;
                checked_div(midpoint_move, box_ratio)
            })
            .collect();

        Ok(rolling_mean_options(&one_period, self.period)
            .into_iter()
            .map(|v| v.unwrap_or(0.0))
            .collect())
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "EOM"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use techchart_core::types::Bar;

    const DAY_MS: i64 = 86_400_000;
    const HOUR_MS: i64 = 3_600_000;

    #[test]
    fn test_obv() {
        let bars = vec![
            Bar::new(0, 10.0, 10.0, 10.0, 10.0, 100.0),
            Bar::new(1, 11.0, 11.0, 11.0, 11.0, 200.0),
            Bar::new(2, 10.5, 10.5, 10.5, 10.5, 50.0),
            Bar::new(3, 10.5, 10.5, 10.5, 10.5, 70.0),
        ];
        let series = BaseSeries::new("OBV", bars).unwrap();
        let result = Obv.calculate(&series).unwrap();

        assert_eq!(result, vec![0.0, 200.0, 150.0, 150.0]);
    }

    #[test]
    fn test_mfi_all_positive_flow_reads_neutral() {
        let bars = (0..10)
            .map(|i| {
                let c = 100.0 + i as f64;
                Bar::new(i as i64 * DAY_MS, c, c + 1.0, c - 1.0, c, 1000.0)
            })
            .collect();
        let series = BaseSeries::new("MFI", bars).unwrap();
        let result = Mfi::new(3).unwrap().calculate(&series).unwrap();

        assert!(result.iter().all(|&v| v == 50.0));
    }

    #[test]
    fn test_mfi_mixed_flow() {
        let closes = [10.0, 11.0, 10.0, 12.0];
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar::new(i as i64 * DAY_MS, c, c, c, c, 1.0))
            .collect();
        let series = BaseSeries::new("MFI", bars).unwrap();
        let result = Mfi::new(3).unwrap().calculate(&series).unwrap();

        // Window 1..=3: positive 11 + 12 = 23, negative 10
        let expected = 100.0 - 100.0 / (1.0 + 23.0 / 10.0);
        assert!((result[3] - expected).abs() < 1e-10);
        assert!((0.0..=100.0).contains(&result[3]));
    }

    #[test]
    fn test_vwap_daily_reset() {
        let bars = vec![
            Bar::new(0, 10.0, 10.0, 10.0, 10.0, 100.0),
            Bar::new(HOUR_MS, 20.0, 20.0, 20.0, 20.0, 100.0),
            Bar::new(DAY_MS, 30.0, 30.0, 30.0, 30.0, 10.0),
        ];
        let series = BaseSeries::new("VWAP", bars).unwrap();

        let daily = Vwap::new(true).calculate(&series).unwrap();
        assert_eq!(daily, vec![Some(10.0), Some(15.0), Some(30.0)]);

        let cumulative = Vwap::new(false).calculate(&series).unwrap();
        assert!((cumulative[2].unwrap() - 3300.0 / 210.0).abs() < 1e-10);
    }

    #[test]
    fn test_vwap_zero_volume_carries_forward() {
        let bars = vec![
            Bar::new(0, 10.0, 10.0, 10.0, 10.0, 0.0),
            Bar::new(HOUR_MS, 12.0, 12.0, 12.0, 12.0, 5.0),
            Bar::new(DAY_MS, 30.0, 30.0, 30.0, 30.0, 0.0),
        ];
        let series = BaseSeries::new("VWAP", bars).unwrap();
        let result = Vwap::default().calculate(&series).unwrap();

        assert_eq!(result, vec![None, Some(12.0), Some(12.0)]);
    }

    #[test]
    fn test_cmf() {
        let bars = vec![
            // Close at the high: multiplier +1
            Bar::new(0, 9.0, 10.0, 8.0, 10.0, 100.0),
            // Close at the low: multiplier -1
            Bar::new(1, 9.0, 10.0, 8.0, 8.0, 300.0),
            // Flat bar: multiplier 0
            Bar::new(2, 9.0, 9.0, 9.0, 9.0, 100.0),
        ];
        let series = BaseSeries::new("CMF", bars).unwrap();
        let result = Cmf::new(2).unwrap().calculate(&series).unwrap();

        assert_eq!(result[0], 0.0);
        assert!((result[1] - (-200.0 / 400.0)).abs() < 1e-10);
        assert!((result[2] - (-300.0 / 400.0)).abs() < 1e-10);
    }

    #[test]
    fn test_cmf_zero_volume() {
        let bars = (0..5)
            .map(|i| Bar::new(i * DAY_MS, 10.0, 11.0, 9.0, 10.5, 0.0))
            .collect();
        let series = BaseSeries::new("CMF", bars).unwrap();
        let result = Cmf::new(3).unwrap().calculate(&series).unwrap();
        assert!(result.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_eom() {
        let bars = vec![
            Bar::new(0, 10.0, 11.0, 9.0, 10.0, 1e8),
            Bar::new(1, 11.0, 12.0, 10.0, 11.0, 1e8),
            Bar::new(2, 12.0, 13.0, 11.0, 12.0, 2e8),
        ];
        let series = BaseSeries::new("EOM", bars).unwrap();
        let result = Eom::new(2).unwrap().calculate(&series).unwrap();

        // Moves: [-, 1/(1/2) = 2, 1/(2/2) = 1]; mean of the last two = 1.5
        assert_eq!(result[0], 0.0);
        assert_eq!(result[1], 0.0);
        assert!((result[2] - 1.5).abs() < 1e-10);
        assert!(Eom::with_divisor(14, 0.0).is_err());
    }
}
