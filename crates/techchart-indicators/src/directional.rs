//! Directional and trend-following indicators: DMI/ADX, Aroon and Parabolic SAR.

use serde::{Deserialize, Serialize};
use techchart_core::error::IndicatorError;
use techchart_core::traits::OhlcvIndicator;
use techchart_core::types::BaseSeries;

use crate::moving_average::{check_period, wilder_series};
use crate::volatility::atr_series;

/// DMI/ADX output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DmiOutput {
    pub plus_di: f64,
    pub minus_di: f64,
    pub adx: f64,
}

/// Directional Movement Index with Average Directional Index.
///
/// +DM and -DM are Wilder-smoothed and divided by the canonical ATR. ADX is
/// the Wilder-smoothed DX. A zero ATR gives DI 0; a zero DI sum gives DX 0.
#[derive(Debug, Clone)]
pub struct Dmi {
    period: usize,
}

impl Dmi {
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        check_period("DMI", period)?;
        Ok(Self { period })
    }

    fn directional_index(smoothed_dm: f64, atr: f64) -> f64 {
        if atr == 0.0 {
            0.0
        } else {
            100.0 * smoothed_dm / atr
        }
    }
}

impl OhlcvIndicator for Dmi {
    type Output = DmiOutput;

    fn calculate(&self, series: &BaseSeries) -> Result<Vec<DmiOutput>, IndicatorError> {
        self.validate_series(series)?;

        let bars = series.bars();
        let mut plus_dm = vec![0.0; bars.len()];
        let mut minus_dm = vec![0.0; bars.len()];

        for i in 1..bars.len() {
            let up_move = bars[i].high - bars[i - 1].high;
            let down_move = bars[i - 1].low - bars[i].low;
            if up_move > down_move && up_move > 0.0 {
                plus_dm[i] = up_move;
            }
            if down_move > up_move && down_move > 0.0 {
                minus_dm[i] = down_move;
            }
        }

        let atr = atr_series(series, self.period);
        let smoothed_plus = wilder_series(&plus_dm, self.period);
        let smoothed_minus = wilder_series(&minus_dm, self.period);

        let mut plus_di = Vec::with_capacity(bars.len());
        let mut minus_di = Vec::with_capacity(bars.len());
        let mut dx = Vec::with_capacity(bars.len());

        for i in 0..bars.len() {
            let p = Self::directional_index(smoothed_plus[i], atr[i]);
            let m = Self::directional_index(smoothed_minus[i], atr[i]);
            let sum = p + m;
            dx.push(if sum == 0.0 {
                0.0
            } else {
                100.0 * (p - m).abs() / sum
            });
            plus_di.push(p);
            minus_di.push(m);
        }

        let adx = wilder_series(&dx, self.period);

        Ok((0..bars.len())
            .map(|i| DmiOutput {
                plus_di: plus_di[i],
                minus_di: minus_di[i],
                adx: adx[i],
            })
            .collect())
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "DMI/ADX"
    }
}

/// Aroon output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AroonOutput {
    pub up: f64,
    pub down: f64,
    pub oscillator: f64,
}

/// Aroon indicator.
///
/// Looks back over the last `period + 1` bars and measures how many bars
/// have passed since the highest high and the lowest low. When the extreme
/// repeats, the earliest occurrence counts.
#[derive(Debug, Clone)]
pub struct Aroon {
    period: usize,
}

impl Aroon {
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        check_period("Aroon", period)?;
        Ok(Self { period })
    }

    /// Offset of the first extreme within the window according to `better`.
    fn first_extreme(window: &[f64], better: impl Fn(f64, f64) -> bool) -> usize {
        let mut best = 0;
        for (idx, &value) in window.iter().enumerate().skip(1) {
            if better(value, window[best]) {
                best = idx;
            }
        }
        best
    }
}

impl OhlcvIndicator for Aroon {
    type Output = Option<AroonOutput>;

    fn calculate(&self, series: &BaseSeries) -> Result<Vec<Option<AroonOutput>>, IndicatorError> {
        self.validate_series(series)?;

        let highs = series.highs();
        let lows = series.lows();
        let period = self.period as f64;

        Ok((0..highs.len())
            .map(|i| {
                let start = i.checked_sub(self.period)?;
                let high_idx = Self::first_extreme(&highs[start..=i], |a, b| a > b);
                let low_idx = Self::first_extreme(&lows[start..=i], |a, b| a < b);

                // Window offset `self.period` is the current bar
                let since_high = (self.period - high_idx) as f64;
                let since_low = (self.period - low_idx) as f64;

                let up = 100.0 * (period - since_high) / period;
                let down = 100.0 * (period - since_low) / period;
                Some(AroonOutput {
                    up,
                    down,
                    oscillator: up - down,
                })
            })
            .collect())
    }

    fn period(&self) -> usize {
        self.period + 1
    }

    fn name(&self) -> &str {
        "Aroon"
    }
}

/// Direction of the Parabolic SAR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    Uptrend,
    Downtrend,
}

/// Running state of the Parabolic SAR.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SarState {
    pub trend: Trend,
    pub extreme_point: f64,
    pub acceleration_factor: f64,
}

/// A bar where the SAR flipped direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reversal {
    pub index: usize,
    /// Trend in force after the flip
    pub trend: Trend,
    /// Extreme point of the trend that just ended
    pub prior_extreme: f64,
}

/// Parabolic SAR output over a whole series.
#[derive(Debug, Clone, PartialEq)]
pub struct SarSeries {
    pub values: Vec<f64>,
    pub reversals: Vec<Reversal>,
}

/// Parabolic Stop and Reverse.
#[derive(Debug, Clone)]
pub struct ParabolicSar {
    initial_af: f64,
    af_increment: f64,
    max_af: f64,
}

impl ParabolicSar {
    /// Create a Parabolic SAR with default parameters (0.02, 0.02, 0.2).
    pub fn new() -> Self {
        Self {
            initial_af: 0.02,
            af_increment: 0.02,
            max_af: 0.2,
        }
    }

    pub fn with_params(initial_af: f64, af_increment: f64, max_af: f64) -> Result<Self, IndicatorError> {
        if !(initial_af > 0.0 && af_increment > 0.0 && max_af > 0.0) {
            return Err(IndicatorError::InvalidParameter(
                "Parabolic SAR factors must be positive".to_string(),
            ));
        }
        if initial_af > max_af {
            return Err(IndicatorError::InvalidParameter(format!(
                "initial_af ({}) must not exceed max_af ({})",
                initial_af, max_af
            )));
        }
        Ok(Self {
            initial_af,
            af_increment,
            max_af,
        })
    }

    /// Run the state machine, recording every reversal.
    pub fn run(&self, series: &BaseSeries) -> Result<SarSeries, IndicatorError> {
        self.validate_series(series)?;

        let bars = series.bars();
        let mut values = Vec::with_capacity(bars.len());
        let mut reversals = Vec::new();

        let first = &bars[0];
        let mut state = SarState {
            trend: Trend::Uptrend,
            extreme_point: first.high,
            acceleration_factor: self.initial_af,
        };
        values.push(first.low);

        for (i, bar) in bars.iter().enumerate().skip(1) {
            let prev_sar = values[i - 1];
            let prior_ep = state.extreme_point;
            let candidate = prev_sar + state.acceleration_factor * (prior_ep - prev_sar);

            let sar = match state.trend {
                Trend::Uptrend => {
                    if bar.high > prior_ep {
                        self.extend(&mut state, bar.high);
                    }
                    if candidate > bar.low {
                        state = self.reverse(Trend::Downtrend, bar.low);
                        reversals.push(Reversal {
                            index: i,
                            trend: Trend::Downtrend,
                            prior_extreme: prior_ep,
                        });
                        prior_ep.max(bar.high)
                    } else {
                        candidate
                    }
                }
                Trend::Downtrend => {
                    if bar.low < prior_ep {
                        self.extend(&mut state, bar.low);
                    }
                    if candidate < bar.high {
                        state = self.reverse(Trend::Uptrend, bar.high);
                        reversals.push(Reversal {
                            index: i,
                            trend: Trend::Uptrend,
                            prior_extreme: prior_ep,
                        });
                        prior_ep.min(bar.low)
                    } else {
                        candidate
                    }
                }
            };

            values.push(sar);
        }

        Ok(SarSeries { values, reversals })
    }

    fn extend(&self, state: &mut SarState, extreme: f64) {
        state.extreme_point = extreme;
        state.acceleration_factor = (state.acceleration_factor + self.af_increment).min(self.max_af);
    }

    fn reverse(&self, trend: Trend, extreme: f64) -> SarState {
        SarState {
            trend,
            extreme_point: extreme,
            acceleration_factor: self.initial_af,
        }
    }
}

impl Default for ParabolicSar {
    fn default() -> Self {
        Self::new()
    }
}

impl OhlcvIndicator for ParabolicSar {
    type Output = f64;

    fn calculate(&self, series: &BaseSeries) -> Result<Vec<f64>, IndicatorError> {
        Ok(self.run(series)?.values)
    }

    fn period(&self) -> usize {
        1
    }

    fn name(&self) -> &str {
        "Parabolic SAR"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use techchart_core::types::Bar;

    fn series_from_closes(closes: &[f64]) -> BaseSeries {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar::new(i as i64 * 86_400_000, c, c + 1.0, c - 1.0, c, 1000.0))
            .collect();
        BaseSeries::new("TEST", bars).unwrap()
    }

    #[test]
    fn test_aroon_rising_series() {
        let closes: Vec<f64> = (0..50).map(|i| 100.0 + i as f64).collect();
        let result = Aroon::new(25).unwrap().calculate(&series_from_closes(&closes)).unwrap();

        assert!(result[24].is_none());
        let last = result[49].unwrap();
        assert_eq!(last.up, 100.0);
        assert_eq!(last.down, 0.0);
        assert_eq!(last.oscillator, 100.0);
    }

    #[test]
    fn test_aroon_first_occurrence() {
        // Highs tie at offsets 0 and 2; the earlier one counts
        let series = series_from_closes(&[5.0, 3.0, 5.0, 4.0]);
        let result = Aroon::new(3).unwrap().calculate(&series).unwrap();
        let out = result[3].unwrap();

        assert_eq!(out.up, 0.0);
        // Lowest low at offset 1 -> two bars ago
        assert!((out.down - 100.0 / 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_aroon_needs_period_plus_one() {
        let series = series_from_closes(&[1.0, 2.0, 3.0]);
        assert!(Aroon::new(3).unwrap().calculate(&series).is_err());
    }

    #[test]
    fn test_dmi_rising_series() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let result = Dmi::new(14).unwrap().calculate(&series_from_closes(&closes)).unwrap();

        let last = result[39];
        assert!(last.plus_di > 0.0);
        assert_eq!(last.minus_di, 0.0);
        assert!(last.adx > 0.0 && last.adx <= 100.0);
    }

    #[test]
    fn test_dmi_flat_series() {
        let bars = (0..20)
            .map(|i| Bar::new(i * 60_000, 10.0, 10.0, 10.0, 10.0, 0.0))
            .collect();
        let series = BaseSeries::new("FLAT", bars).unwrap();
        let result = Dmi::new(14).unwrap().calculate(&series).unwrap();

        assert!(result
            .iter()
            .all(|o| o.plus_di == 0.0 && o.minus_di == 0.0 && o.adx == 0.0));
    }

    #[test]
    fn test_psar_single_bar() {
        let series = series_from_closes(&[10.0]);
        let result = ParabolicSar::new().calculate(&series).unwrap();
        assert_eq!(result, vec![9.0]);
    }

    #[test]
    fn test_psar_flip_uses_prior_extreme() {
        let closes = [10.0, 11.0, 12.0, 13.0, 14.0, 8.0, 7.0, 6.0, 12.0, 13.0];
        let series = series_from_closes(&closes);
        let output = ParabolicSar::new().run(&series).unwrap();
        let bars = series.bars();

        assert!(!output.reversals.is_empty());
        for reversal in &output.reversals {
            let bar = &bars[reversal.index];
            let expected = match reversal.trend {
                Trend::Downtrend => reversal.prior_extreme.max(bar.high),
                Trend::Uptrend => reversal.prior_extreme.min(bar.low),
            };
            assert_eq!(output.values[reversal.index], expected);
        }

        // The drop at index 5 ends the uptrend whose extreme was the high at index 4
        let first = output.reversals[0];
        assert_eq!(first.index, 5);
        assert_eq!(first.trend, Trend::Downtrend);
        assert_eq!(first.prior_extreme, 15.0);
        assert_eq!(output.values[5], 15.0);
    }

    #[test]
    fn test_psar_rising_stays_below_lows() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let series = series_from_closes(&closes);
        let output = ParabolicSar::new().run(&series).unwrap();

        assert!(output.reversals.is_empty());
        for (sar, bar) in output.values.iter().zip(series.iter()).skip(1) {
            assert!(*sar <= bar.low);
        }
    }

    #[test]
    fn test_psar_invalid_factors() {
        assert!(ParabolicSar::with_params(0.0, 0.02, 0.2).is_err());
        assert!(ParabolicSar::with_params(0.5, 0.02, 0.2).is_err());
    }
}
