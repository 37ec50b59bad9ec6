//! `hawk.config` items.
//!
//! A config item carries a polymorphic value whose interpretation is fixed by
//! the declared [`ConfigType`]. The raw wire shape ([`ConfigParams`]) is
//! checked once and converted into a [`ConfigItem`] whose value is an explicit
//! [`ConfigValue`] variant.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};

use crate::validation::{ValidationError, require_finite, require_text};

/// Declared type of a configuration value.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ConfigType {
    /// UTF-8 text.
    #[default]
    String,
    /// Signed 64-bit integer.
    Integer,
    /// Finite floating point number.
    Float,
    /// `true` or `false`.
    Boolean,
    /// One of the item's `options`.
    Enum,
}

impl ConfigType {
    /// Infers the type from an untyped JSON value.
    fn infer(value: &Value) -> Self {
        match value {
            Value::Bool(_) => Self::Boolean,
            Value::Number(number) if number.is_i64() => Self::Integer,
            Value::Number(_) => Self::Float,
            _ => Self::String,
        }
    }
}

/// A typed configuration value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    /// Boolean value.
    Boolean(bool),
    /// Integer value.
    Integer(i64),
    /// Floating point value.
    Float(f64),
    /// Text value.
    String(String),
}

impl ConfigValue {
    /// Returns the numeric value for bounds checks.
    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        reason = "bounds are declared as f64 on the wire"
    )]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(value) => Some(*value as f64),
            Self::Float(value) => Some(*value),
            Self::Boolean(_) | Self::String(_) => None,
        }
    }

    /// Converts a JSON scalar into the variant matching its JSON type.
    fn from_scalar(field: &'static str, value: Value) -> Result<Self, ValidationError> {
        match value {
            Value::Bool(flag) => Ok(Self::Boolean(flag)),
            Value::Number(number) => number.as_i64().map_or_else(
                || Self::float(field, number.as_f64()),
                |integer| Ok(Self::Integer(integer)),
            ),
            Value::String(text) => Ok(Self::String(text)),
            Value::Null | Value::Array(_) | Value::Object(_) => {
                Err(ValidationError::invalid(field, "expected a scalar value"))
            }
        }
    }

    /// Converts a JSON value according to the declared type.
    fn coerce(kind: ConfigType, field: &'static str, value: Value) -> Result<Self, ValidationError> {
        match (kind, value) {
            (ConfigType::String, Value::String(text)) => Ok(Self::String(text)),
            (ConfigType::Boolean, Value::Bool(flag)) => Ok(Self::Boolean(flag)),
            (ConfigType::Integer, Value::Number(number)) => number
                .as_i64()
                .map(Self::Integer)
                .ok_or_else(|| ValidationError::invalid(field, "expected an integer")),
            (ConfigType::Float, Value::Number(number)) => Self::float(field, number.as_f64()),
            (ConfigType::Enum, value) => Self::from_scalar(field, value),
            (kind, _) => Err(ValidationError::invalid(
                field,
                format!("value does not match declared type `{kind}`"),
            )),
        }
    }

    fn float(field: &'static str, value: Option<f64>) -> Result<Self, ValidationError> {
        let value = value.ok_or_else(|| ValidationError::invalid(field, "expected a number"))?;
        require_finite(field, value)?;
        Ok(Self::Float(value))
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(value) => write!(f, "{value}"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::String(value) => f.write_str(value),
        }
    }
}

/// Raw `hawk.config` params as they appear on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigParams {
    /// Unique key.
    #[serde(default)]
    pub key: Option<String>,
    /// Current value, interpreted by `type`.
    #[serde(default)]
    pub value: Option<Value>,
    /// Declared type; inferred from `value` when absent.
    #[serde(default, rename = "type")]
    pub kind: Option<ConfigType>,
    /// Human-readable description.
    #[serde(default)]
    pub description: Option<String>,
    /// Default value, interpreted by `type`.
    #[serde(default)]
    pub default: Option<Value>,
    /// Inclusive lower bound for numeric values.
    #[serde(default)]
    pub min: Option<f64>,
    /// Inclusive upper bound for numeric values.
    #[serde(default)]
    pub max: Option<f64>,
    /// Allowed values for `enum` items.
    #[serde(default)]
    pub options: Vec<Value>,
    /// Whether a change only applies after the producer restarts.
    #[serde(default)]
    pub restart_required: bool,
    /// Grouping label.
    #[serde(default)]
    pub category: Option<String>,
}

/// A validated configuration item, keyed by `key`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ConfigParams")]
pub struct ConfigItem {
    /// Unique key.
    pub key: String,
    /// Declared type.
    #[serde(rename = "type")]
    pub kind: ConfigType,
    /// Current value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<ConfigValue>,
    /// Human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Default value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<ConfigValue>,
    /// Inclusive lower bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Inclusive upper bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Allowed values for `enum` items.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<ConfigValue>,
    /// Whether a change only applies after the producer restarts.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub restart_required: bool,
    /// Grouping label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl ConfigItem {
    /// Creates an item with a value and no metadata.
    #[must_use]
    pub fn new(key: impl Into<String>, kind: ConfigType, value: ConfigValue) -> Self {
        Self {
            key: key.into(),
            kind,
            value: Some(value),
            description: None,
            default: None,
            min: None,
            max: None,
            options: Vec::new(),
            restart_required: false,
            category: None,
        }
    }

    fn check_constraints(&self, field: &'static str, value: &ConfigValue) -> Result<(), ValidationError> {
        if let Some(number) = value.as_f64() {
            if self.min.is_some_and(|min| number < min) || self.max.is_some_and(|max| number > max)
            {
                return Err(ValidationError::invalid(field, "value is outside min/max bounds"));
            }
        }
        if self.kind == ConfigType::Enum && !self.options.is_empty() && !self.options.contains(value)
        {
            return Err(ValidationError::invalid(field, "value is not one of the options"));
        }
        Ok(())
    }
}

impl TryFrom<ConfigParams> for ConfigItem {
    type Error = ValidationError;

    fn try_from(params: ConfigParams) -> Result<Self, Self::Error> {
        let key = require_text("key", params.key)?;
        let value = params.value.filter(|value| !value.is_null());
        let default = params.default.filter(|value| !value.is_null());
        let kind = params
            .kind
            .or_else(|| value.as_ref().map(ConfigType::infer))
            .unwrap_or_default();

        for (field, bound) in [("min", params.min), ("max", params.max)] {
            if let Some(bound) = bound {
                require_finite(field, bound)?;
            }
        }
        if let (Some(min), Some(max)) = (params.min, params.max)
            && min > max
        {
            return Err(ValidationError::invalid("min", "min exceeds max"));
        }

        let options = params
            .options
            .into_iter()
            .map(|option| ConfigValue::from_scalar("options", option))
            .collect::<Result<Vec<_>, _>>()?;

        let item = Self {
            key,
            kind,
            value: value
                .map(|value| ConfigValue::coerce(kind, "value", value))
                .transpose()?,
            description: params.description,
            default: default
                .map(|value| ConfigValue::coerce(kind, "default", value))
                .transpose()?,
            min: params.min,
            max: params.max,
            options,
            restart_required: params.restart_required,
            category: params.category,
        };

        if let Some(value) = &item.value {
            item.check_constraints("value", value)?;
        }
        if let Some(default) = &item.default {
            item.check_constraints("default", default)?;
        }
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    fn convert(params: Value) -> Result<ConfigItem, ValidationError> {
        let params: ConfigParams = serde_json::from_value(params).expect("wire params");
        ConfigItem::try_from(params)
    }

    #[rstest]
    #[case(json!(true), ConfigType::Boolean, ConfigValue::Boolean(true))]
    #[case(json!(8080), ConfigType::Integer, ConfigValue::Integer(8080))]
    #[case(json!(0.5), ConfigType::Float, ConfigValue::Float(0.5))]
    #[case(json!("debug"), ConfigType::String, ConfigValue::String("debug".to_owned()))]
    fn infers_type_from_value(
        #[case] value: Value,
        #[case] kind: ConfigType,
        #[case] expected: ConfigValue,
    ) {
        let item = convert(json!({"key": "k", "value": value})).expect("convert");
        assert_eq!(item.kind, kind);
        assert_eq!(item.value, Some(expected));
    }

    #[rstest]
    fn declared_float_accepts_integer_literal() {
        let item = convert(json!({"key": "ratio", "value": 2, "type": "float"})).expect("convert");
        assert_eq!(item.value, Some(ConfigValue::Float(2.0)));
    }

    #[rstest]
    #[case(json!({"key": "k", "value": "x", "type": "integer"}), "value")]
    #[case(json!({"key": "k", "value": 1.5, "type": "integer"}), "value")]
    #[case(json!({"key": "k", "value": 11, "type": "integer", "max": 10}), "value")]
    #[case(json!({"key": "k", "value": 1, "min": 5, "max": 2}), "min")]
    #[case(json!({"key": "k", "value": "c", "type": "enum", "options": ["a", "b"]}), "value")]
    #[case(json!({"key": "k", "type": "boolean", "default": "yes"}), "default")]
    fn rejects_inconsistent_items(#[case] params: Value, #[case] field: &str) {
        let error = convert(params).expect_err("should be rejected");
        assert_eq!(error.field(), Some(field));
    }

    #[rstest]
    fn requires_key() {
        assert_eq!(
            convert(json!({"value": 1})),
            Err(ValidationError::missing("key"))
        );
    }

    #[rstest]
    fn serialises_with_declared_type() {
        let item = convert(json!({
            "key": "workers",
            "value": 4,
            "type": "integer",
            "min": 1.0,
            "max": 16.0,
            "restart_required": true
        }))
        .expect("convert");
        let json = serde_json::to_value(&item).expect("serialise");
        assert_eq!(json["type"], "integer");
        assert_eq!(json["value"], 4);
        assert_eq!(json["restart_required"], true);
        assert!(json.get("options").is_none());
    }
}
