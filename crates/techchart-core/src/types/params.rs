//! Indicator parameter values.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::IndicatorError;

/// A single parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl ParamValue {
    /// Numeric view of the value (integers widen to floats).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Int(v) => Some(*v as f64),
            ParamValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Non-negative integer view; integral floats are accepted.
    pub fn as_usize(&self) -> Option<usize> {
        match self {
            ParamValue::Int(v) if *v >= 0 => usize::try_from(*v).ok(),
            ParamValue::Float(v) if *v >= 0.0 && v.fract() == 0.0 => Some(*v as usize),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Short type name for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            ParamValue::Bool(_) => "bool",
            ParamValue::Int(_) => "integer",
            ParamValue::Float(_) => "float",
            ParamValue::Text(_) => "text",
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(v) => write!(f, "{}", v),
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::Float(v) => write!(f, "{}", v),
            ParamValue::Text(v) => write!(f, "{}", v),
        }
    }
}

impl FromStr for ParamValue {
    type Err = std::convert::Infallible;

    /// Parse a command-line style value: bool, then integer, then float, else text.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(v) = s.parse::<bool>() {
            return Ok(ParamValue::Bool(v));
        }
        if let Ok(v) = s.parse::<i64>() {
            return Ok(ParamValue::Int(v));
        }
        if let Ok(v) = s.parse::<f64>() {
            return Ok(ParamValue::Float(v));
        }
        Ok(ParamValue::Text(s.to_string()))
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

/// Named parameter values for one indicator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params {
    values: BTreeMap<String, ParamValue>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, replacing any previous one.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        self.values.insert(name.into(), value.into());
    }

    /// Builder-style set.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn require(&self, name: &str) -> Result<&ParamValue, IndicatorError> {
        self.values
            .get(name)
            .ok_or_else(|| IndicatorError::InvalidParameter(format!("missing parameter '{}'", name)))
    }

    /// Read a non-negative integer parameter.
    pub fn usize(&self, name: &str) -> Result<usize, IndicatorError> {
        let value = self.require(name)?;
        value.as_usize().ok_or_else(|| {
            IndicatorError::InvalidParameter(format!(
                "'{}' must be a non-negative integer, got {}",
                name, value
            ))
        })
    }

    /// Read a numeric parameter.
    pub fn f64(&self, name: &str) -> Result<f64, IndicatorError> {
        let value = self.require(name)?;
        value.as_f64().ok_or_else(|| {
            IndicatorError::InvalidParameter(format!("'{}' must be a number, got {}", name, value))
        })
    }

    /// Read a boolean parameter.
    pub fn bool(&self, name: &str) -> Result<bool, IndicatorError> {
        let value = self.require(name)?;
        value.as_bool().ok_or_else(|| {
            IndicatorError::InvalidParameter(format!("'{}' must be true or false, got {}", name, value))
        })
    }

    /// Read a text parameter.
    pub fn text(&self, name: &str) -> Result<&str, IndicatorError> {
        let value = self.require(name)?;
        value.as_str().ok_or_else(|| {
            IndicatorError::InvalidParameter(format!("'{}' must be text, got {}", name, value))
        })
    }
}

impl FromIterator<(String, ParamValue)> for Params {
    fn from_iter<T: IntoIterator<Item = (String, ParamValue)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_parse() {
        assert_eq!("20".parse::<ParamValue>().unwrap(), ParamValue::Int(20));
        assert_eq!("2.5".parse::<ParamValue>().unwrap(), ParamValue::Float(2.5));
        assert_eq!("true".parse::<ParamValue>().unwrap(), ParamValue::Bool(true));
        assert_eq!(
            "ema".parse::<ParamValue>().unwrap(),
            ParamValue::Text("ema".to_string())
        );
    }

    #[test]
    fn test_typed_access() {
        let params = Params::new()
            .with("window", 20i64)
            .with("multiplier", 2.0)
            .with("reset_daily", true)
            .with("ma_type", "sma");

        assert_eq!(params.usize("window").unwrap(), 20);
        assert_eq!(params.f64("window").unwrap(), 20.0);
        assert_eq!(params.f64("multiplier").unwrap(), 2.0);
        assert!(params.bool("reset_daily").unwrap());
        assert_eq!(params.text("ma_type").unwrap(), "sma");

        assert!(params.usize("missing").is_err());
        assert!(params.usize("multiplier").is_ok()); // integral float
        assert!(params.bool("window").is_err());
    }

    #[test]
    fn test_negative_window_rejected() {
        let params = Params::new().with("window", -3i64);
        assert!(matches!(
            params.usize("window"),
            Err(IndicatorError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_params_json() {
        let params: Params = serde_json::from_str(r#"{"window": 50, "percentage": 2.5}"#).unwrap();
        assert_eq!(params.get("window"), Some(&ParamValue::Int(50)));
        assert_eq!(params.get("percentage"), Some(&ParamValue::Float(2.5)));
    }
}
