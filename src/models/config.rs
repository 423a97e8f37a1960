//! Field configuration schema.
//!
//! The schema is a JSON document mapping field names to per-field metadata:
//! display label, value type, visibility, searchability and an optional
//! color mode with its mode-specific payload. It is fetched once at startup
//! and treated as immutable for the session.
//!
//! Parsing is deliberately lenient: a field whose color payload is absent or
//! malformed keeps its color mode (so it stays eligible for coloring) but
//! loses its parameters, which the color engine resolves to the neutral
//! default. Configuration errors degrade, they never crash rendering.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Declared type of a field's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Identifier,
    #[default]
    Text,
    Numeric,
    Percentage,
    Boolean,
    Categorical,
}

/// Strategy for turning a field's value into a color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    Gradient,
    Bins,
    Boolean,
    Categorical,
}

/// An RGB color endpoint for gradient interpolation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }
}

/// One half-open value interval `[min, max)` with its colors and label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorBin {
    pub min: f64,
    pub max: f64,
    pub label: String,
    pub color: String,
    pub border_color: String,
}

/// Colors and label for one side of a boolean field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BooleanColor {
    pub bg: String,
    pub border: String,
    pub label: String,
}

/// Colors for one categorical value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryColor {
    pub bg: String,
    pub border: String,
}

/// Mode-specific color parameters, one case per [`ColorMode`] so the color
/// engine's dispatch is exhaustive instead of relying on optional-field
/// presence.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorParams {
    Gradient { min: Rgb, max: Rgb },
    Bins(Vec<ColorBin>),
    Boolean { yes: BooleanColor, no: BooleanColor },
    Categorical {
        entries: Vec<(String, CategoryColor)>,
        default: CategoryColor,
    },
}

/// Static metadata describing one named field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldConfig {
    pub label: String,
    pub value_type: ValueType,
    pub unit: Option<String>,
    pub decimals: Option<u32>,
    pub visible: bool,
    pub searchable: bool,
    /// Set whenever the document declared a color mode, even if its payload
    /// turned out malformed.
    pub color_mode: Option<ColorMode>,
    /// Resolved payload for `color_mode`; `None` when the payload was
    /// absent or did not match the declared mode.
    pub color_params: Option<ColorParams>,
}

impl FieldConfig {
    pub fn new(label: impl Into<String>, value_type: ValueType) -> Self {
        FieldConfig {
            label: label.into(),
            value_type,
            unit: None,
            decimals: None,
            visible: true,
            searchable: false,
            color_mode: None,
            color_params: None,
        }
    }

    /// Fields eligible for grouping: categorical and boolean values.
    pub fn is_groupable(&self) -> bool {
        matches!(self.value_type, ValueType::Categorical | ValueType::Boolean)
    }

    /// Fields eligible for coloring: any declared color mode.
    pub fn is_colorable(&self) -> bool {
        self.color_mode.is_some()
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.value_type, ValueType::Numeric)
    }
}

/// Wire shape of a field entry. Lenient on input (`#[serde(default)]`
/// everywhere, raw JSON payloads), regenerated verbatim on output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFieldConfig {
    #[serde(default)]
    label: String,
    #[serde(rename = "type", default)]
    value_type: ValueType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    decimals: Option<u32>,
    #[serde(default)]
    visible: bool,
    #[serde(default)]
    searchable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    color_mode: Option<ColorMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bins: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    colors: Option<serde_json::Value>,
}

/// Gradient payload as written in the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawGradientColors {
    min: Rgb,
    max: Rgb,
}

/// Boolean payload as written in the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawBooleanColors {
    #[serde(rename = "true")]
    yes: BooleanColor,
    #[serde(rename = "false")]
    no: BooleanColor,
}

impl RawFieldConfig {
    /// Interpret the raw payload for the declared mode. Any mismatch
    /// resolves to `None` rather than an error.
    fn resolve_color_params(&self) -> Option<ColorParams> {
        match self.color_mode? {
            ColorMode::Gradient => {
                let raw: RawGradientColors =
                    serde_json::from_value(self.colors.clone()?).ok()?;
                Some(ColorParams::Gradient {
                    min: raw.min,
                    max: raw.max,
                })
            }
            ColorMode::Bins => {
                let bins: Vec<ColorBin> = serde_json::from_value(self.bins.clone()?).ok()?;
                if bins.is_empty() {
                    return None;
                }
                Some(ColorParams::Bins(bins))
            }
            ColorMode::Boolean => {
                let raw: RawBooleanColors =
                    serde_json::from_value(self.colors.clone()?).ok()?;
                Some(ColorParams::Boolean {
                    yes: raw.yes,
                    no: raw.no,
                })
            }
            ColorMode::Categorical => {
                let mut map: BTreeMap<String, CategoryColor> =
                    serde_json::from_value(self.colors.clone()?).ok()?;
                // The fallback entry is mandatory for this mode.
                let default = map.remove("default")?;
                Some(ColorParams::Categorical {
                    entries: map.into_iter().collect(),
                    default,
                })
            }
        }
    }
}

impl From<RawFieldConfig> for FieldConfig {
    fn from(raw: RawFieldConfig) -> Self {
        let color_params = raw.resolve_color_params();
        FieldConfig {
            label: raw.label,
            value_type: raw.value_type,
            unit: raw.unit,
            decimals: raw.decimals,
            visible: raw.visible,
            searchable: raw.searchable,
            color_mode: raw.color_mode,
            color_params,
        }
    }
}

impl From<&FieldConfig> for RawFieldConfig {
    fn from(config: &FieldConfig) -> Self {
        let (bins, colors) = match &config.color_params {
            Some(ColorParams::Bins(bins)) => {
                (serde_json::to_value(bins).ok(), None)
            }
            Some(ColorParams::Gradient { min, max }) => (
                None,
                serde_json::to_value(RawGradientColors {
                    min: *min,
                    max: *max,
                })
                .ok(),
            ),
            Some(ColorParams::Boolean { yes, no }) => (
                None,
                serde_json::to_value(RawBooleanColors {
                    yes: yes.clone(),
                    no: no.clone(),
                })
                .ok(),
            ),
            Some(ColorParams::Categorical { entries, default }) => {
                let mut map: BTreeMap<&str, &CategoryColor> =
                    entries.iter().map(|(k, v)| (k.as_str(), v)).collect();
                map.insert("default", default);
                (None, serde_json::to_value(map).ok())
            }
            None => (None, None),
        };
        RawFieldConfig {
            label: config.label.clone(),
            value_type: config.value_type,
            unit: config.unit.clone(),
            decimals: config.decimals,
            visible: config.visible,
            searchable: config.searchable,
            color_mode: config.color_mode,
            bins,
            colors,
        }
    }
}

impl<'de> Deserialize<'de> for FieldConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawFieldConfig::deserialize(deserializer)?;
        Ok(raw.into())
    }
}

impl Serialize for FieldConfig {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        RawFieldConfig::from(self).serialize(serializer)
    }
}

/// The full schema: field name → [`FieldConfig`], preserving the document
/// order. Order is insignificant for evaluation but drives the "first
/// eligible field" fallbacks and any UI field listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigSchema {
    fields: Vec<(String, FieldConfig)>,
}

impl ConfigSchema {
    pub fn new() -> Self {
        ConfigSchema { fields: Vec::new() }
    }

    /// Insert a field, replacing an existing entry of the same name in
    /// place (keys are unique; later document entries win).
    pub fn insert(&mut self, name: impl Into<String>, config: FieldConfig) {
        let name = name.into();
        if let Some(slot) = self.fields.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = config;
        } else {
            self.fields.push((name, config));
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldConfig> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldConfig)> {
        self.fields.iter().map(|(n, c)| (n.as_str(), c))
    }

    /// Fields eligible for grouping, in document order.
    pub fn groupable(&self) -> impl Iterator<Item = (&str, &FieldConfig)> {
        self.iter().filter(|(_, c)| c.is_groupable())
    }

    /// Fields eligible for coloring, in document order.
    pub fn colorable(&self) -> impl Iterator<Item = (&str, &FieldConfig)> {
        self.iter().filter(|(_, c)| c.is_colorable())
    }

    /// Fields eligible for filtering, in document order.
    pub fn visible(&self) -> impl Iterator<Item = (&str, &FieldConfig)> {
        self.iter().filter(|(_, c)| c.visible)
    }

    pub fn numeric(&self) -> impl Iterator<Item = (&str, &FieldConfig)> {
        self.iter().filter(|(_, c)| c.is_numeric())
    }

    pub fn first_groupable(&self) -> Option<&str> {
        self.groupable().next().map(|(n, _)| n)
    }

    pub fn first_colorable(&self) -> Option<&str> {
        self.colorable().next().map(|(n, _)| n)
    }
}

impl FromIterator<(String, FieldConfig)> for ConfigSchema {
    fn from_iter<T: IntoIterator<Item = (String, FieldConfig)>>(iter: T) -> Self {
        let mut schema = ConfigSchema::new();
        for (name, config) in iter {
            schema.insert(name, config);
        }
        schema
    }
}

impl<'de> Deserialize<'de> for ConfigSchema {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SchemaVisitor;

        impl<'de> Visitor<'de> for SchemaVisitor {
            type Value = ConfigSchema;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of field name to field configuration")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut schema = ConfigSchema::new();
                while let Some((name, config)) =
                    access.next_entry::<String, FieldConfig>()?
                {
                    schema.insert(name, config);
                }
                Ok(schema)
            }
        }

        deserializer.deserialize_map(SchemaVisitor)
    }
}

impl Serialize for ConfigSchema {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, config) in &self.fields {
            map.serialize_entry(name, config)?;
        }
        map.end()
    }
}
