//! Value formatting.
//!
//! Human-readable string form of a field value, independent of color.

use crate::models::{ColorParams, FieldConfig, Value, ValueType};

/// Sentinel for null or absent values, regardless of type.
pub const NOT_AVAILABLE: &str = "N/A";

/// Format a value for display per the field's declared type.
pub fn format_value(value: &Value, config: &FieldConfig) -> String {
    if value.is_null() {
        return NOT_AVAILABLE.to_string();
    }
    match config.value_type {
        ValueType::Boolean => {
            if value.coerce_bool() {
                "Yes".to_string()
            } else {
                "No".to_string()
            }
        }
        ValueType::Percentage => match value.as_f64() {
            Some(v) => {
                let decimals = config.decimals.unwrap_or(1) as usize;
                format!("{:.prec$}%", v * 100.0, prec = decimals)
            }
            None => value.to_string(),
        },
        ValueType::Numeric => match value.as_f64() {
            Some(v) => {
                let decimals = config.decimals.unwrap_or(0) as usize;
                let formatted = format!("{:.prec$}", v, prec = decimals);
                match &config.unit {
                    Some(unit) => format!("{}{}", formatted, unit),
                    None => formatted,
                }
            }
            None => value.to_string(),
        },
        ValueType::Categorical | ValueType::Text | ValueType::Identifier => value.to_string(),
    }
}

/// Tooltip variant: boolean fields with boolean color params use the
/// configured true/false labels instead of the generic Yes/No.
pub fn format_tooltip_value(value: &Value, config: &FieldConfig) -> String {
    if config.value_type == ValueType::Boolean && !value.is_null() {
        if let Some(ColorParams::Boolean { yes, no }) = &config.color_params {
            return if value.coerce_bool() {
                yes.label.clone()
            } else {
                no.label.clone()
            };
        }
    }
    format_value(value, config)
}
