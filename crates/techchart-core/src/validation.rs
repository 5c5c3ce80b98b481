//! Base series validation.
//!
//! Checks run in a fixed order and stop at the first violation.

use crate::error::InvalidInputError;
use crate::types::Bar;

/// Validate the shape invariants of a bar sequence.
pub fn validate_bars(bars: &[Bar]) -> Result<(), InvalidInputError> {
    if bars.is_empty() {
        return Err(InvalidInputError::EmptySeries);
    }

    let mut previous: Option<i64> = None;
    for (index, bar) in bars.iter().enumerate() {
        validate_bar(index, bar)?;

        if let Some(prev) = previous {
            if bar.timestamp <= prev {
                return Err(InvalidInputError::NonMonotonicTimestamp {
                    index,
                    previous: prev,
                    current: bar.timestamp,
                });
            }
        }
        previous = Some(bar.timestamp);
    }

    Ok(())
}

fn validate_bar(index: usize, bar: &Bar) -> Result<(), InvalidInputError> {
    let fields = [
        ("open", bar.open),
        ("high", bar.high),
        ("low", bar.low),
        ("close", bar.close),
        ("volume", bar.volume),
    ];
    for (field, value) in fields {
        if !value.is_finite() {
            return Err(InvalidInputError::MissingField { index, field });
        }
    }

    if bar.volume < 0.0 {
        return Err(InvalidInputError::NegativeVolume {
            index,
            volume: bar.volume,
        });
    }

    if bar.high < bar.low {
        return Err(InvalidInputError::HighBelowLow {
            index,
            high: bar.high,
            low: bar.low,
        });
    }

    for (field, value) in [("open", bar.open), ("close", bar.close)] {
        if value < bar.low || value > bar.high {
            return Err(InvalidInputError::PriceOutsideRange { index, field, value });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(ts: i64) -> Bar {
        Bar::new(ts, 100.0, 101.0, 99.0, 100.5, 1000.0)
    }

    #[test]
    fn test_valid_series() {
        assert!(validate_bars(&[bar(1), bar(2), bar(3)]).is_ok());
    }

    #[test]
    fn test_empty_series() {
        assert_eq!(validate_bars(&[]), Err(InvalidInputError::EmptySeries));
    }

    #[test]
    fn test_non_monotonic_timestamps() {
        let err = validate_bars(&[bar(1), bar(3), bar(2)]).unwrap_err();
        assert_eq!(
            err,
            InvalidInputError::NonMonotonicTimestamp {
                index: 2,
                previous: 3,
                current: 2
            }
        );

        // Duplicates are rejected too
        assert!(validate_bars(&[bar(1), bar(1)]).is_err());
    }

    #[test]
    fn test_missing_field() {
        let mut bad = bar(1);
        bad.close = f64::NAN;
        assert_eq!(
            validate_bars(&[bad]),
            Err(InvalidInputError::MissingField {
                index: 0,
                field: "close"
            })
        );
    }

    #[test]
    fn test_high_below_low() {
        let bad = Bar::new(1, 100.0, 99.0, 101.0, 100.0, 0.0);
        assert!(matches!(
            validate_bars(&[bad]),
            Err(InvalidInputError::HighBelowLow { index: 0, .. })
        ));
    }

    #[test]
    fn test_price_outside_range() {
        let bad = Bar::new(1, 100.0, 101.0, 99.0, 102.0, 0.0);
        assert!(matches!(
            validate_bars(&[bar(0), bad]),
            Err(InvalidInputError::PriceOutsideRange {
                index: 1,
                field: "close",
                ..
            })
        ));
    }

    #[test]
    fn test_negative_volume() {
        let bad = Bar::new(1, 100.0, 101.0, 99.0, 100.0, -5.0);
        assert!(matches!(
            validate_bars(&[bad]),
            Err(InvalidInputError::NegativeVolume { .. })
        ));
    }
}
