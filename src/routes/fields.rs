//! Field listings for UI controls.

use serde::{Deserialize, Serialize};

use crate::models::{ConfigSchema, FieldConfig, Record};
use crate::services::filter::{filterable_fields, FilterOption};
use crate::services::grouping::size_field;

/// One selectable field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldOption {
    pub field: String,
    pub label: String,
}

/// Everything a frontend needs to populate its grouping, coloring and
/// filtering controls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldsData {
    pub groupable: Vec<FieldOption>,
    pub colorable: Vec<FieldOption>,
    pub filterable: Vec<FilterOption>,
    /// Field used to weight records during layout, if any.
    pub size_field: Option<String>,
}

/// Derive the field listings from the schema and the unfiltered record set
/// (so categorical filter options never hide themselves).
pub fn build_fields_data(schema: &ConfigSchema, records: &[Record]) -> FieldsData {
    FieldsData {
        groupable: to_options(schema.groupable()),
        colorable: to_options(schema.colorable()),
        filterable: filterable_fields(schema, records),
        size_field: size_field(schema).name().map(String::from),
    }
}

fn to_options<'a>(iter: impl Iterator<Item = (&'a str, &'a FieldConfig)>) -> Vec<FieldOption> {
    iter.map(|(field, config)| FieldOption {
        field: field.to_string(),
        label: config.label.clone(),
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ColorMode, FieldConfig, ValueType};

    #[test]
    fn test_build_fields_data() {
        let mut schema = ConfigSchema::new();
        schema.insert("client", FieldConfig::new("Client", ValueType::Categorical));
        let mut online = FieldConfig::new("Online", ValueType::Boolean);
        online.color_mode = Some(ColorMode::Boolean);
        schema.insert("online", online);
        schema.insert("area", FieldConfig::new("Area", ValueType::Numeric));

        let data = build_fields_data(&schema, &[]);
        let names = |options: &[FieldOption]| {
            options.iter().map(|o| o.field.clone()).collect::<Vec<_>>()
        };
        assert_eq!(names(&data.groupable), vec!["client", "online"]);
        assert_eq!(names(&data.colorable), vec!["online"]);
        assert_eq!(data.filterable.len(), 3);
        assert_eq!(data.size_field.as_deref(), Some("area"));
    }
}
