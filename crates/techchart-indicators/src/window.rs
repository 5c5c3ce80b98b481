//! Rolling-window and shift helpers.
//!
//! Every helper returns a column aligned 1:1 with its input. Positions before
//! the window fills are `None` unless the helper says otherwise.

use techchart_core::types::Column;

use crate::simd::{mean_simd, minmax_simd, sum_simd, variance_simd};

fn rolling<F>(data: &[f64], window: usize, f: F) -> Column
where
    F: Fn(&[f64]) -> f64,
{
    if window == 0 {
        return vec![None; data.len()];
    }
    (0..data.len())
        .map(|i| {
            if i + 1 < window {
                None
            } else {
                Some(f(&data[i + 1 - window..=i]))
            }
        })
        .collect()
}

/// Rolling arithmetic mean.
pub fn rolling_mean(data: &[f64], window: usize) -> Column {
    rolling(data, window, mean_simd)
}

/// Rolling mean that starts from the first bar using whatever history exists.
pub fn rolling_mean_partial(data: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    (0..data.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            mean_simd(&data[start..=i])
        })
        .collect()
}

/// Rolling sum.
pub fn rolling_sum(data: &[f64], window: usize) -> Column {
    rolling(data, window, sum_simd)
}

/// Rolling population variance (divisor = window).
pub fn rolling_variance(data: &[f64], window: usize) -> Column {
    rolling(data, window, variance_simd)
}

/// Rolling population standard deviation.
pub fn rolling_std(data: &[f64], window: usize) -> Column {
    rolling_variance(data, window)
        .into_iter()
        .map(|v| v.map(f64::sqrt))
        .collect()
}

/// Rolling maximum.
pub fn rolling_max(data: &[f64], window: usize) -> Column {
    rolling(data, window, |w| {
        minmax_simd(w).map(|(_, max)| max).unwrap_or(f64::NAN)
    })
}

/// Rolling minimum.
pub fn rolling_min(data: &[f64], window: usize) -> Column {
    rolling(data, window, |w| {
        minmax_simd(w).map(|(min, _)| min).unwrap_or(f64::NAN)
    })
}

/// Rolling sum over a column with gaps; any gap inside the window yields `None`.
pub fn rolling_sum_options(values: &[Option<f64>], window: usize) -> Column {
    rolling_options(values, window, |w| w.iter().sum())
}

/// Rolling mean over a column with gaps; any gap inside the window yields `None`.
pub fn rolling_mean_options(values: &[Option<f64>], window: usize) -> Column {
    rolling_options(values, window, |w| w.iter().sum::<f64>() / w.len() as f64)
}

fn rolling_options<F>(values: &[Option<f64>], window: usize, f: F) -> Column
where
    F: Fn(&[f64]) -> f64,
{
    if window == 0 {
        return vec![None; values.len()];
    }
    let mut buf = Vec::with_capacity(window);
    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                return None;
            }
            buf.clear();
            for v in &values[i + 1 - window..=i] {
                buf.push((*v)?);
            }
            Some(f(&buf))
        })
        .collect()
}

/// Shift values later in time: the output at `i` is the input at `i - periods`.
pub fn shift_forward(values: &[Option<f64>], periods: usize) -> Column {
    (0..values.len())
        .map(|i| if i >= periods { values[i - periods] } else { None })
        .collect()
}

/// Shift values earlier in time: the output at `i` is the input at `i + periods`.
pub fn shift_backward(values: &[Option<f64>], periods: usize) -> Column {
    (0..values.len())
        .map(|i| values.get(i + periods).copied().flatten())
        .collect()
}

/// Element-wise combination of two columns; `None` if either side is `None`.
pub fn zip_with<F>(a: &[Option<f64>], b: &[Option<f64>], f: F) -> Column
where
    F: Fn(f64, f64) -> f64,
{
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| Some(f((*x)?, (*y)?)))
        .collect()
}

/// Division that yields `None` for a zero denominator or a non-finite quotient.
#[inline]
pub fn checked_div(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 {
        return None;
    }
    let value = numerator / denominator;
    value.is_finite().then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rolling_mean() {
        let result = rolling_mean(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);
        assert_eq!(result, vec![None, None, Some(2.0), Some(3.0), Some(4.0)]);
    }

    #[test]
    fn test_rolling_mean_partial() {
        let result = rolling_mean_partial(&[1.0, 2.0, 3.0, 4.0], 3);
        assert_eq!(result, vec![1.0, 1.5, 2.0, 3.0]);
    }

    #[test]
    fn test_rolling_extremes() {
        let data = [3.0, 1.0, 4.0, 1.0, 5.0];
        assert_eq!(
            rolling_max(&data, 2),
            vec![None, Some(3.0), Some(4.0), Some(4.0), Some(5.0)]
        );
        assert_eq!(
            rolling_min(&data, 2),
            vec![None, Some(1.0), Some(1.0), Some(1.0), Some(1.0)]
        );
    }

    #[test]
    fn test_rolling_options_gap() {
        let values = [Some(1.0), None, Some(3.0), Some(4.0)];
        assert_eq!(
            rolling_sum_options(&values, 2),
            vec![None, None, None, Some(7.0)]
        );
    }

    #[test]
    fn test_shifts() {
        let values = [Some(1.0), Some(2.0), Some(3.0)];
        assert_eq!(shift_forward(&values, 1), vec![None, Some(1.0), Some(2.0)]);
        assert_eq!(shift_backward(&values, 1), vec![Some(2.0), Some(3.0), None]);
        assert_eq!(shift_backward(&values, 5), vec![None, None, None]);
    }

    #[test]
    fn test_checked_div() {
        assert_eq!(checked_div(1.0, 0.0), None);
        assert_eq!(checked_div(1.0, 4.0), Some(0.25));
        assert_eq!(checked_div(0.0, 4.0), Some(0.0));
        assert_eq!(checked_div(f64::MAX, 1e-300), None);
    }
}
