//! Color resolution.
//!
//! Turns a field value into a fill color, border color and display label
//! according to the field's configured color mode. Resolution never fails:
//! missing or malformed configuration and unexpected value shapes degrade
//! to a documented neutral tuple.

use serde::{Deserialize, Serialize};

use crate::models::{ColorMode, ColorParams, FieldConfig, Record, Rgb, Value, ValueType};

/// Neutral fill used when a field has no usable color configuration.
pub const NEUTRAL_COLOR: &str = "#6B7280";
/// Neutral border paired with [`NEUTRAL_COLOR`].
pub const NEUTRAL_BORDER: &str = "#4B5563";
/// Label of the neutral tuple (unconfigured field or malformed value).
pub const UNKNOWN_LABEL: &str = "Unknown";
/// Label of the tuple returned when a numeric value falls outside every
/// configured bin. Distinct from [`UNKNOWN_LABEL`] so the two cases can be
/// told apart.
pub const OUT_OF_RANGE_LABEL: &str = "Out of range";

/// Fixed per-channel darkening applied to derive gradient borders.
const BORDER_DARKEN: u8 = 20;

/// A fully resolved color for one record cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorResult {
    pub color: String,
    pub border_color: String,
    pub label: String,
}

impl ColorResult {
    /// The neutral/default tuple.
    pub fn neutral() -> Self {
        ColorResult {
            color: NEUTRAL_COLOR.to_string(),
            border_color: NEUTRAL_BORDER.to_string(),
            label: UNKNOWN_LABEL.to_string(),
        }
    }

    fn out_of_range() -> Self {
        ColorResult {
            color: NEUTRAL_COLOR.to_string(),
            border_color: NEUTRAL_BORDER.to_string(),
            label: OUT_OF_RANGE_LABEL.to_string(),
        }
    }
}

/// Observed `{min, max}` of a numeric field across the current record set.
/// Required input for gradient coloring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataRange {
    pub min: f64,
    pub max: f64,
}

impl DataRange {
    pub fn new(min: f64, max: f64) -> Self {
        DataRange { min, max }
    }

    /// Scan a record set for the observed range of `field`. Returns `None`
    /// when no record carries a numeric value for it.
    pub fn observe(records: &[Record], field: &str) -> Option<DataRange> {
        let mut range: Option<DataRange> = None;
        for record in records {
            if let Some(v) = record.get(field).and_then(Value::as_f64) {
                range = Some(match range {
                    Some(r) => DataRange::new(r.min.min(v), r.max.max(v)),
                    None => DataRange::new(v, v),
                });
            }
        }
        range
    }
}

/// One legend swatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendEntry {
    pub color: String,
    pub label: String,
}

/// Resolve the color for one value under one field configuration.
///
/// `data_range` is only consulted in gradient mode; supplying `None` there
/// yields the neutral default rather than dividing by an undefined range.
pub fn resolve_color(
    value: &Value,
    config: &FieldConfig,
    data_range: Option<DataRange>,
) -> ColorResult {
    let Some(mode) = config.color_mode else {
        return ColorResult::neutral();
    };
    match (mode, &config.color_params) {
        (ColorMode::Boolean, Some(ColorParams::Boolean { yes, no })) => {
            match value.as_bool() {
                Some(true) => ColorResult {
                    color: yes.bg.clone(),
                    border_color: yes.border.clone(),
                    label: yes.label.clone(),
                },
                Some(false) => ColorResult {
                    color: no.bg.clone(),
                    border_color: no.border.clone(),
                    label: no.label.clone(),
                },
                None => ColorResult::neutral(),
            }
        }
        (ColorMode::Categorical, Some(ColorParams::Categorical { entries, default })) => {
            let key = value.to_string();
            let colors = entries
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, c)| c)
                .unwrap_or(default);
            ColorResult {
                color: colors.bg.clone(),
                border_color: colors.border.clone(),
                label: key,
            }
        }
        (ColorMode::Gradient, Some(ColorParams::Gradient { min, max })) => {
            let (Some(v), Some(range)) = (value.as_f64(), data_range) else {
                return ColorResult::neutral();
            };
            let t = normalize(v, range);
            let fill = lerp_rgb(*min, *max, t);
            ColorResult {
                color: css_rgb(fill),
                border_color: css_rgb(darken(fill)),
                label: gradient_label(v, config),
            }
        }
        (ColorMode::Bins, Some(ColorParams::Bins(bins))) => {
            let Some(v) = value.as_f64() else {
                return ColorResult::neutral();
            };
            for bin in bins {
                // Half-open interval: a boundary value belongs to the bin
                // it is the lower bound of.
                if v >= bin.min && v < bin.max {
                    return ColorResult {
                        color: bin.color.clone(),
                        border_color: bin.border_color.clone(),
                        label: bin.label.clone(),
                    };
                }
            }
            ColorResult::out_of_range()
        }
        // Declared mode with absent or mismatched parameters.
        _ => ColorResult::neutral(),
    }
}

/// Legend swatches for a colorable field, one per configured color.
/// Gradient fields produce five stops across the observed range and need
/// `data_range` for their value labels.
pub fn legend_entries(config: &FieldConfig, data_range: Option<DataRange>) -> Vec<LegendEntry> {
    match &config.color_params {
        Some(ColorParams::Boolean { yes, no }) => vec![
            LegendEntry {
                color: yes.bg.clone(),
                label: non_empty_or(&yes.label, "Yes"),
            },
            LegendEntry {
                color: no.bg.clone(),
                label: non_empty_or(&no.label, "No"),
            },
        ],
        Some(ColorParams::Categorical { entries, .. }) => entries
            .iter()
            .map(|(name, colors)| LegendEntry {
                color: colors.bg.clone(),
                label: name.clone(),
            })
            .collect(),
        Some(ColorParams::Bins(bins)) => bins
            .iter()
            .map(|bin| LegendEntry {
                color: bin.color.clone(),
                label: bin.label.clone(),
            })
            .collect(),
        Some(ColorParams::Gradient { min, max }) => {
            let Some(range) = data_range else {
                return vec![];
            };
            [0.0, 0.25, 0.5, 0.75, 1.0]
                .iter()
                .map(|&t| {
                    let color = css_rgb(lerp_rgb(*min, *max, t));
                    let label = if config.value_type == ValueType::Percentage {
                        format!("{:.0}%", t * 100.0)
                    } else {
                        let value = range.min + (range.max - range.min) * t;
                        let decimals = config.decimals.unwrap_or(1) as usize;
                        let mut label = format!("{:.prec$}", value, prec = decimals);
                        if let Some(unit) = &config.unit {
                            label.push_str(unit);
                        }
                        label
                    };
                    LegendEntry { color, label }
                })
                .collect()
        }
        None => vec![],
    }
}

fn non_empty_or(label: &str, fallback: &str) -> String {
    if label.is_empty() {
        fallback.to_string()
    } else {
        label.to_string()
    }
}

/// Normalize a value into `[0, 1]` over the observed range. A degenerate
/// range maps everything to 0.
fn normalize(value: f64, range: DataRange) -> f64 {
    if range.max == range.min {
        return 0.0;
    }
    ((value - range.min) / (range.max - range.min)).clamp(0.0, 1.0)
}

/// Per-channel linear interpolation, rounded to the nearest integer.
fn lerp_rgb(min: Rgb, max: Rgb, t: f64) -> Rgb {
    let channel = |lo: u8, hi: u8| -> u8 {
        (lo as f64 + (hi as f64 - lo as f64) * t).round() as u8
    };
    Rgb::new(
        channel(min.r, max.r),
        channel(min.g, max.g),
        channel(min.b, max.b),
    )
}

/// Fixed darken offset for gradient borders, floored at 0 per channel.
fn darken(color: Rgb) -> Rgb {
    Rgb::new(
        color.r.saturating_sub(BORDER_DARKEN),
        color.g.saturating_sub(BORDER_DARKEN),
        color.b.saturating_sub(BORDER_DARKEN),
    )
}

fn css_rgb(color: Rgb) -> String {
    format!("rgb({}, {}, {})", color.r, color.g, color.b)
}

fn gradient_label(value: f64, config: &FieldConfig) -> String {
    let decimals = config.decimals.unwrap_or(1) as usize;
    if config.value_type == ValueType::Percentage {
        format!("{:.prec$}%", value * 100.0, prec = decimals)
    } else {
        format!("{:.prec$}", value, prec = decimals)
    }
}
