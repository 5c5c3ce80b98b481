//! Momentum indicators and close-based oscillators.

use serde::{Deserialize, Serialize};
use techchart_core::error::IndicatorError;
use techchart_core::traits::{Indicator, OhlcvIndicator};
use techchart_core::types::{BaseSeries, Column};

use crate::moving_average::{
    check_period, ema_alpha, ema_series, exp_smooth_options, wilder_series, MaType, Wma,
};
use crate::window::{
    checked_div, rolling_max, rolling_mean_options, rolling_min, rolling_sum, zip_with,
};

/// Relative Strength Index (RSI).
///
/// Measures the speed and magnitude of recent price changes
/// to evaluate overbought or oversold conditions.
#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
}

impl Rsi {
    /// Create a new RSI indicator.
    ///
    /// Common periods are 14 (default) or 9.
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        check_period("RSI", period)?;
        Ok(Self { period })
    }
}

impl Indicator for Rsi {
    type Output = f64;

    fn calculate(&self, data: &[f64]) -> Result<Vec<f64>, IndicatorError> {
        self.validate_data(data)?;

        // The first bar has no change: zero gain and zero loss
        let mut gains = Vec::with_capacity(data.len());
        let mut losses = Vec::with_capacity(data.len());
        gains.push(0.0);
        losses.push(0.0);

        for i in 1..data.len() {
            let change = data[i] - data[i - 1];
            gains.push(change.max(0.0));
            losses.push((-change).max(0.0));
        }

        let avg_gains = wilder_series(&gains, self.period);
        let avg_losses = wilder_series(&losses, self.period);

        Ok(avg_gains
            .iter()
            .zip(avg_losses.iter())
            .map(|(&gain, &loss)| {
                if loss == 0.0 {
                    if gain > 0.0 {
                        100.0
                    } else {
                        50.0
                    }
                } else {
                    100.0 - (100.0 / (1.0 + gain / loss))
                }
            })
            .collect())
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "RSI"
    }
}

/// MACD (Moving Average Convergence Divergence) output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdOutput {
    /// MACD line (fast EMA - slow EMA)
    pub macd: f64,
    /// Signal line (EMA of MACD)
    pub signal: f64,
    /// Histogram (MACD - Signal)
    pub histogram: f64,
}

/// MACD indicator.
///
/// Uses two EMAs to identify trend direction and momentum.
#[derive(Debug, Clone)]
pub struct Macd {
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
}

impl Macd {
    /// Create a new MACD with default parameters (12, 26, 9).
    pub fn new() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }

    /// Create a MACD with custom periods.
    pub fn with_periods(fast: usize, slow: usize, signal: usize) -> Result<Self, IndicatorError> {
        check_period("MACD fast", fast)?;
        check_period("MACD slow", slow)?;
        check_period("MACD signal", signal)?;
        if fast >= slow {
            return Err(IndicatorError::InvalidParameter(format!(
                "MACD fast period ({}) must be less than slow period ({})",
                fast, slow
            )));
        }
        Ok(Self {
            fast_period: fast,
            slow_period: slow,
            signal_period: signal,
        })
    }
}

impl Default for Macd {
    fn default() -> Self {
        Self::new()
    }
}

impl Indicator for Macd {
    type Output = MacdOutput;

    fn calculate(&self, data: &[f64]) -> Result<Vec<MacdOutput>, IndicatorError> {
        self.validate_data(data)?;

        let fast_ema = ema_series(data, self.fast_period);
        let slow_ema = ema_series(data, self.slow_period);

        let macd_line: Vec<f64> = fast_ema
            .iter()
            .zip(slow_ema.iter())
            .map(|(f, s)| f - s)
            .collect();

        let signal_line = ema_series(&macd_line, self.signal_period);

        Ok(macd_line
            .iter()
            .zip(signal_line.iter())
            .map(|(&macd, &signal)| MacdOutput {
                macd,
                signal,
                histogram: macd - signal,
            })
            .collect())
    }

    fn period(&self) -> usize {
        self.slow_period
    }

    fn name(&self) -> &str {
        "MACD"
    }
}

/// Stochastic oscillator output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StochasticOutput {
    /// Slow %K line
    pub k: f64,
    /// %D line (SMA of slow %K)
    pub d: f64,
}

/// Slow Stochastic oscillator.
///
/// Fast %K over `k_period`, smoothed by `smooth_k` into slow %K, then %D is the
/// `d_period` mean of slow %K. Positions that cannot be computed read 50.
#[derive(Debug, Clone)]
pub struct Stochastic {
    k_period: usize,
    d_period: usize,
    smooth_k: usize,
}

impl Stochastic {
    /// Create a Stochastic with default parameters (14, 3, 3).
    pub fn new() -> Self {
        Self {
            k_period: 14,
            d_period: 3,
            smooth_k: 3,
        }
    }

    pub fn with_params(k_period: usize, d_period: usize, smooth_k: usize) -> Result<Self, IndicatorError> {
        check_period("Stochastic %K", k_period)?;
        check_period("Stochastic %D", d_period)?;
        check_period("Stochastic smoothing", smooth_k)?;
        Ok(Self {
            k_period,
            d_period,
            smooth_k,
        })
    }
}

impl Default for Stochastic {
    fn default() -> Self {
        Self::new()
    }
}

impl OhlcvIndicator for Stochastic {
    type Output = StochasticOutput;

    fn calculate(&self, series: &BaseSeries) -> Result<Vec<StochasticOutput>, IndicatorError> {
        self.validate_series(series)?;

        let closes = series.closes();
        let highest = rolling_max(&series.highs(), self.k_period);
        let lowest = rolling_min(&series.lows(), self.k_period);

        let fast_k: Column = (0..closes.len())
            .map(|i| {
                let (hh, ll) = (highest[i]?, lowest[i]?);
                checked_div(100.0 * (closes[i] - ll), hh - ll)
            })
            .collect();

        let slow_k = rolling_mean_options(&fast_k, self.smooth_k);
        let d = rolling_mean_options(&slow_k, self.d_period);

        Ok(slow_k
            .iter()
            .zip(d.iter())
            .map(|(k, d)| StochasticOutput {
                k: k.unwrap_or(50.0),
                d: d.unwrap_or(50.0),
            })
            .collect())
    }

    fn period(&self) -> usize {
        self.k_period.max(self.smooth_k).max(self.d_period)
    }

    fn name(&self) -> &str {
        "Stochastic"
    }
}

/// Williams %R.
///
/// `-100 * (HH - close) / (HH - LL)`; a flat window or warm-up reads -50.
#[derive(Debug, Clone)]
pub struct WilliamsR {
    period: usize,
}

impl WilliamsR {
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        check_period("Williams %R", period)?;
        Ok(Self { period })
    }
}

impl OhlcvIndicator for WilliamsR {
    type Output = f64;

    fn calculate(&self, series: &BaseSeries) -> Result<Vec<f64>, IndicatorError> {
        self.validate_series(series)?;

        let closes = series.closes();
        let highest = rolling_max(&series.highs(), self.period);
        let lowest = rolling_min(&series.lows(), self.period);

        Ok((0..closes.len())
            .map(|i| {
                highest[i]
                    .zip(lowest[i])
                    .and_then(|(hh, ll)| checked_div(-100.0 * (hh - closes[i]), hh - ll))
                    .unwrap_or(-50.0)
            })
            .collect())
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "Williams %R"
    }
}

/// Rank Correlation Index (RCI).
///
/// Spearman rank correlation between time order and price order over the
/// window, scaled to [-100, 100].
#[derive(Debug, Clone)]
pub struct Rci {
    period: usize,
}

impl Rci {
    /// Create a new RCI. The window needs at least two points.
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        if period < 2 {
            return Err(IndicatorError::InvalidParameter(format!(
                "RCI period must be at least 2, got {}",
                period
            )));
        }
        Ok(Self { period })
    }

    /// Ascending ranks starting at 1; tied values share their average rank.
    fn average_ranks(window: &[f64]) -> Vec<f64> {
        let mut order: Vec<usize> = (0..window.len()).collect();
        order.sort_by(|&a, &b| window[a].total_cmp(&window[b]));

        let mut ranks = vec![0.0; window.len()];
        let mut start = 0;
        while start < order.len() {
            let mut end = start + 1;
            while end < order.len() && window[order[end]] == window[order[start]] {
                end += 1;
            }
            // Positions start..end hold rank start+1 ..= end
            let shared = (start + 1 + end) as f64 / 2.0;
            for &idx in &order[start..end] {
                ranks[idx] = shared;
            }
            start = end;
        }

        ranks
    }
}

impl Indicator for Rci {
    type Output = Option<f64>;

    fn calculate(&self, data: &[f64]) -> Result<Column, IndicatorError> {
        self.validate_data(data)?;

        let n = self.period as f64;
        let denominator = n * (n * n - 1.0);
        let mut result = Vec::with_capacity(data.len());

        for end in 0..data.len() {
            if end + 1 < self.period {
                result.push(None);
                continue;
            }

            let window = &data[end + 1 - self.period..=end];
            let price_ranks = Self::average_ranks(window);

            // Date rank: oldest bar in the window is 1
            let mut sum_sq_diff = 0.0;
            for (offset, price_rank) in price_ranks.iter().enumerate() {
                let date_rank = (offset + 1) as f64;
                let d = date_rank - price_rank;
                sum_sq_diff += d * d;
            }

            result.push(Some(100.0 * (1.0 - 6.0 * sum_sq_diff / denominator)));
        }

        Ok(result)
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "RCI"
    }
}

/// Coppock Curve.
///
/// WMA of the sum of two rates of change. Undefined positions read 0.
#[derive(Debug, Clone)]
pub struct Coppock {
    roc1: usize,
    roc2: usize,
    wma_period: usize,
}

impl Coppock {
    /// Create a Coppock Curve with default parameters (14, 11, 10).
    pub fn new() -> Self {
        Self {
            roc1: 14,
            roc2: 11,
            wma_period: 10,
        }
    }

    pub fn with_params(roc1: usize, roc2: usize, wma_period: usize) -> Result<Self, IndicatorError> {
        check_period("Coppock ROC1", roc1)?;
        check_period("Coppock ROC2", roc2)?;
        check_period("Coppock WMA", wma_period)?;
        Ok(Self {
            roc1,
            roc2,
            wma_period,
        })
    }

    /// Percentage change against the value `period` bars earlier.
    fn rate_of_change(data: &[f64], period: usize) -> Column {
        (0..data.len())
            .map(|i| {
                let base = data[i.checked_sub(period)?];
                checked_div(100.0 * (data[i] - base), base)
            })
            .collect()
    }
}

impl Default for Coppock {
    fn default() -> Self {
        Self::new()
    }
}

impl Indicator for Coppock {
    type Output = f64;

    fn calculate(&self, data: &[f64]) -> Result<Vec<f64>, IndicatorError> {
        self.validate_data(data)?;

        let roc_sum = zip_with(
            &Self::rate_of_change(data, self.roc1),
            &Self::rate_of_change(data, self.roc2),
            |a, b| a + b,
        );
        let curve = Wma::new(self.wma_period)?.calculate_options(&roc_sum);

        Ok(curve.into_iter().map(|v| v.unwrap_or(0.0)).collect())
    }

    fn period(&self) -> usize {
        self.roc1.max(self.roc2).max(self.wma_period)
    }

    fn name(&self) -> &str {
        "Coppock Curve"
    }
}

/// Psychological Line: share of up-closes in the window, in percent.
#[derive(Debug, Clone)]
pub struct PsychologicalLine {
    period: usize,
}

impl PsychologicalLine {
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        check_period("Psychological Line", period)?;
        Ok(Self { period })
    }
}

impl Indicator for PsychologicalLine {
    type Output = f64;

    fn calculate(&self, data: &[f64]) -> Result<Vec<f64>, IndicatorError> {
        self.validate_data(data)?;

        let up_days: Vec<f64> = (0..data.len())
            .map(|i| if i > 0 && data[i] > data[i - 1] { 1.0 } else { 0.0 })
            .collect();

        let period = self.period as f64;
        Ok(rolling_sum(&up_days, self.period)
            .into_iter()
            .map(|count| count.map_or(50.0, |c| 100.0 * c / period))
            .collect())
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "Psychological Line"
    }
}

/// Moving-average deviation rate: `100 * (close - MA) / MA`.
#[derive(Debug, Clone)]
pub struct MaDeviationRate {
    period: usize,
    ma_type: MaType,
}

impl MaDeviationRate {
    pub fn new(period: usize, ma_type: MaType) -> Result<Self, IndicatorError> {
        check_period("MA deviation rate", period)?;
        Ok(Self { period, ma_type })
    }
}

impl Indicator for MaDeviationRate {
    type Output = f64;

    fn calculate(&self, data: &[f64]) -> Result<Vec<f64>, IndicatorError> {
        self.validate_data(data)?;

        let ma = self.ma_type.apply(data, self.period);
        Ok(data
            .iter()
            .zip(ma.iter())
            .map(|(&close, ma)| {
                ma.and_then(|m| checked_div(100.0 * (close - m), m))
                    .unwrap_or(0.0)
            })
            .collect())
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "MA Deviation Rate"
    }
}

/// Force Index: EMA of close change times volume.
#[derive(Debug, Clone)]
pub struct ForceIndex {
    period: usize,
}

impl ForceIndex {
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        check_period("Force Index", period)?;
        Ok(Self { period })
    }
}

impl OhlcvIndicator for ForceIndex {
    type Output = f64;

    fn calculate(&self, series: &BaseSeries) -> Result<Vec<f64>, IndicatorError> {
        self.validate_series(series)?;

        let bars = series.bars();
        let raw: Column = (0..bars.len())
            .map(|i| {
                let prev = bars.get(i.checked_sub(1)?)?;
                Some((bars[i].close - prev.close) * bars[i].volume)
            })
            .collect();

        let smoothed = exp_smooth_options(&raw, ema_alpha(self.period));
        Ok(smoothed.into_iter().map(|v| v.unwrap_or(0.0)).collect())
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "Force Index"
    }
}
