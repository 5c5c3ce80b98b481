//! Indicator definitions: parameter schema, placement and function pointers.

use serde::Serialize;
use std::fmt;
use techchart_core::error::IndicatorError;
use techchart_core::types::{BaseSeries, DerivedColumns, ParamValue, Params};

/// Computes an indicator's derived columns from resolved parameters.
pub type ComputeFn = fn(&BaseSeries, &Params) -> Result<DerivedColumns, IndicatorError>;

/// Names the columns an indicator produces for resolved parameters.
pub type ColumnsFn = fn(&Params) -> Result<Vec<String>, IndicatorError>;

/// Indicator family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Trend,
    Oscillator,
    Volume,
    Other,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Trend,
        Category::Oscillator,
        Category::Volume,
        Category::Other,
    ];
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Trend => write!(f, "trend"),
            Category::Oscillator => write!(f, "oscillator"),
            Category::Volume => write!(f, "volume"),
            Category::Other => write!(f, "other"),
        }
    }
}

/// Where a renderer should draw an indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "target", rename_all = "snake_case")]
pub enum Placement {
    /// Overlay on the price chart.
    OnPrice,
    /// Dedicated subplot with the given name.
    OwnSubplot(&'static str),
    /// Drawn in the subplot of another indicator key.
    SharedSubplot(&'static str),
}

/// Accepted value type of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "choices", rename_all = "lowercase")]
pub enum ParamKind {
    Int,
    Float,
    Bool,
    Choice(&'static [&'static str]),
}

/// Schema entry for one parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: ParamKind,
    pub default: ParamValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
}

impl ParamSpec {
    /// Integer parameter, typically a window length.
    pub fn int(name: &'static str, label: &'static str, default: i64, min: i64, max: Option<i64>) -> Self {
        Self {
            name,
            label,
            kind: ParamKind::Int,
            default: ParamValue::Int(default),
            min: Some(min as f64),
            max: max.map(|m| m as f64),
            step: Some(1.0),
        }
    }

    pub fn float(
        name: &'static str,
        label: &'static str,
        default: f64,
        min: f64,
        max: f64,
        step: f64,
    ) -> Self {
        Self {
            name,
            label,
            kind: ParamKind::Float,
            default: ParamValue::Float(default),
            min: Some(min),
            max: Some(max),
            step: Some(step),
        }
    }

    pub fn boolean(name: &'static str, label: &'static str, default: bool) -> Self {
        Self {
            name,
            label,
            kind: ParamKind::Bool,
            default: ParamValue::Bool(default),
            min: None,
            max: None,
            step: None,
        }
    }

    pub fn choice(
        name: &'static str,
        label: &'static str,
        default: &'static str,
        choices: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            label,
            kind: ParamKind::Choice(choices),
            default: ParamValue::Text(default.to_string()),
            min: None,
            max: None,
            step: None,
        }
    }

    /// Coerce an override to this parameter's type and check its range.
    pub fn coerce(&self, value: &ParamValue) -> Result<ParamValue, IndicatorError> {
        let coerced = match (self.kind, value) {
            (ParamKind::Int, ParamValue::Int(v)) => ParamValue::Int(*v),
            (ParamKind::Int, ParamValue::Float(v)) if v.fract() == 0.0 && v.is_finite() => {
                ParamValue::Int(*v as i64)
            }
            (ParamKind::Float, ParamValue::Float(v)) if v.is_finite() => ParamValue::Float(*v),
            (ParamKind::Float, ParamValue::Int(v)) => ParamValue::Float(*v as f64),
            (ParamKind::Bool, ParamValue::Bool(v)) => ParamValue::Bool(*v),
            (ParamKind::Choice(choices), ParamValue::Text(v)) => {
                let lowered = v.to_ascii_lowercase();
                if !choices.contains(&lowered.as_str()) {
                    return Err(IndicatorError::InvalidParameter(format!(
                        "'{}' must be one of {:?}, got '{}'",
                        self.name, choices, v
                    )));
                }
                ParamValue::Text(lowered)
            }
            _ => {
                return Err(IndicatorError::InvalidParameter(format!(
                    "'{}' expects {}, got {} ({})",
                    self.name,
                    self.kind_name(),
                    value,
                    value.kind()
                )))
            }
        };

        if let Some(number) = coerced.as_f64() {
            if let Some(min) = self.min {
                if number < min {
                    return Err(IndicatorError::InvalidParameter(format!(
                        "'{}' must be at least {}, got {}",
                        self.name, min, number
                    )));
                }
            }
            if let Some(max) = self.max {
                if number > max {
                    return Err(IndicatorError::InvalidParameter(format!(
                        "'{}' must be at most {}, got {}",
                        self.name, max, number
                    )));
                }
            }
        }

        Ok(coerced)
    }

    fn kind_name(&self) -> &'static str {
        match self.kind {
            ParamKind::Int => "an integer",
            ParamKind::Float => "a number",
            ParamKind::Bool => "true or false",
            ParamKind::Choice(_) => "a choice",
        }
    }
}

/// One catalog entry.
///
/// The algorithm and the column namer are plain function pointers.
#[derive(Clone)]
pub struct IndicatorDefinition {
    pub key: &'static str,
    pub label: &'static str,
    pub category: Category,
    pub params: Vec<ParamSpec>,
    pub placement: Placement,
    pub compute: ComputeFn,
    pub columns: ColumnsFn,
}

/// Serializable description of a definition, for listings.
#[derive(Debug, Clone, Serialize)]
pub struct IndicatorInfo {
    pub key: &'static str,
    pub label: &'static str,
    pub category: Category,
    pub placement: Placement,
    pub params: Vec<ParamSpec>,
    /// Columns produced with default parameters
    pub default_columns: Vec<String>,
}

impl IndicatorDefinition {
    /// Parameter values when nothing is overridden.
    pub fn default_params(&self) -> Params {
        self.params
            .iter()
            .map(|spec| (spec.name.to_string(), spec.default.clone()))
            .collect()
    }

    pub fn param(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|spec| spec.name == name)
    }

    /// Merge overrides onto the defaults.
    ///
    /// Unknown names, wrong types and out-of-range values are rejected.
    pub fn resolve_params(&self, overrides: Option<&Params>) -> Result<Params, IndicatorError> {
        let mut resolved = self.default_params();

        if let Some(overrides) = overrides {
            for (name, value) in overrides.iter() {
                let spec = self.param(name).ok_or_else(|| {
                    IndicatorError::InvalidParameter(format!(
                        "unknown parameter '{}' for indicator '{}'",
                        name, self.key
                    ))
                })?;
                resolved.set(name, spec.coerce(value)?);
            }
        }

        Ok(resolved)
    }

    /// Column names for resolved parameters.
    pub fn column_names(&self, params: &Params) -> Result<Vec<String>, IndicatorError> {
        (self.columns)(params)
    }

    /// Describe this definition with its default column names.
    pub fn info(&self) -> Result<IndicatorInfo, IndicatorError> {
        Ok(IndicatorInfo {
            key: self.key,
            label: self.label,
            category: self.category,
            placement: self.placement,
            params: self.params.clone(),
            default_columns: self.column_names(&self.default_params())?,
        })
    }

    /// Run the algorithm.
    pub fn compute(&self, series: &BaseSeries, params: &Params) -> Result<DerivedColumns, IndicatorError> {
        (self.compute)(series, params)
    }
}

impl fmt::Debug for IndicatorDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndicatorDefinition")
            .field("key", &self.key)
            .field("label", &self.label)
            .field("category", &self.category)
            .field("params", &self.params)
            .field("placement", &self.placement)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_coercion() {
        let spec = ParamSpec::int("window", "Window", 20, 1, Some(200));

        assert_eq!(spec.coerce(&ParamValue::Int(50)).unwrap(), ParamValue::Int(50));
        assert_eq!(spec.coerce(&ParamValue::Float(50.0)).unwrap(), ParamValue::Int(50));
        assert!(spec.coerce(&ParamValue::Float(2.5)).is_err());
        assert!(spec.coerce(&ParamValue::Int(0)).is_err());
        assert!(spec.coerce(&ParamValue::Int(201)).is_err());
        assert!(spec.coerce(&ParamValue::Bool(true)).is_err());
    }

    #[test]
    fn test_float_coercion() {
        let spec = ParamSpec::float("percentage", "Percentage", 2.5, 0.1, 50.0, 0.1);

        assert_eq!(spec.coerce(&ParamValue::Int(5)).unwrap(), ParamValue::Float(5.0));
        assert!(spec.coerce(&ParamValue::Float(0.0)).is_err());
        assert!(spec.coerce(&ParamValue::Text("x".into())).is_err());
    }

    #[test]
    fn test_choice_coercion() {
        let spec = ParamSpec::choice("ma_type", "MA type", "sma", &["sma", "ema"]);

        assert_eq!(
            spec.coerce(&ParamValue::Text("EMA".into())).unwrap(),
            ParamValue::Text("ema".into())
        );
        assert!(spec.coerce(&ParamValue::Text("wma".into())).is_err());
    }

    #[test]
    fn test_placement_json() {
        let json = serde_json::to_string(&Placement::SharedSubplot("volume")).unwrap();
        assert_eq!(json, r#"{"kind":"shared_subplot","target":"volume"}"#);
        let json = serde_json::to_string(&Placement::OnPrice).unwrap();
        assert_eq!(json, r#"{"kind":"on_price"}"#);
    }
}
