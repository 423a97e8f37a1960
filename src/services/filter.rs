//! Filter evaluation.
//!
//! A record passes when it satisfies the conjunction of every applicable
//! filter. Field filters dispatch on the configured value type; group
//! membership filters reuse the grouping engine's key computation so both
//! sides agree on sentinel handling.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::{ConfigSchema, Filter, FilterState, Record, Value, ValueType};
use crate::services::grouping::group_key;

/// One filterable field, with the distinct value options categorical
/// filter controls are populated from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterOption {
    pub field: String,
    pub label: String,
    #[serde(rename = "type")]
    pub value_type: ValueType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

/// Apply the active filters to a record set.
pub fn apply_filters(
    records: &[Record],
    state: &FilterState,
    schema: &ConfigSchema,
) -> Vec<Record> {
    records
        .iter()
        .filter(|record| state.iter().all(|filter| record_passes(record, filter, schema)))
        .cloned()
        .collect()
}

/// A field-filter value of null, empty string or `"all"` is equivalent to
/// "no filter on this key" and must not exclude any record.
fn is_noop(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Text(s) => s.is_empty() || s == "all",
        _ => false,
    }
}

fn record_passes(record: &Record, filter: &Filter, schema: &ConfigSchema) -> bool {
    match filter {
        Filter::GroupMembership { field, accepted } => {
            // Present-but-empty accepts nothing; the no-op case is the
            // filter being absent altogether.
            accepted.contains(&group_key(record, field))
        }
        Filter::Field { field, value } => {
            if is_noop(value) {
                return true;
            }
            let record_value = record.get_or_null(field);
            let value_type = schema
                .get(field)
                .map(|c| c.value_type)
                .unwrap_or(ValueType::Text);
            match value_type {
                ValueType::Boolean => record_value.coerce_bool() == value.coerce_bool(),
                ValueType::Categorical => record_value.to_string() == value.to_string(),
                // Exact match only; range filtering is an extension point,
                // not implied semantics.
                ValueType::Numeric | ValueType::Percentage => {
                    match (record_value.as_f64(), value.as_f64()) {
                        (Some(a), Some(b)) => a == b,
                        _ => false,
                    }
                }
                ValueType::Text | ValueType::Identifier => {
                    contains_ignore_case(record_value, value)
                }
            }
        }
    }
}

fn contains_ignore_case(haystack: &Value, needle: &Value) -> bool {
    if haystack.is_null() {
        return false;
    }
    haystack
        .to_string()
        .to_lowercase()
        .contains(&needle.to_string().to_lowercase())
}

/// The fields a filter UI offers: every visible field, with sorted distinct
/// value options for categorical ones. Callers pass the unfiltered record
/// set so active filters never hide their own options.
pub fn filterable_fields(schema: &ConfigSchema, records: &[Record]) -> Vec<FilterOption> {
    schema
        .visible()
        .map(|(field, config)| {
            let options = if config.value_type == ValueType::Categorical {
                Some(distinct_values(field, records))
            } else {
                None
            };
            FilterOption {
                field: field.to_string(),
                label: config.label.clone(),
                value_type: config.value_type,
                options,
            }
        })
        .collect()
}

/// Sorted distinct stringified values of a field. Null and empty values are
/// skipped; `false` and `0` are legitimate values and survive.
pub fn distinct_values(field: &str, records: &[Record]) -> Vec<String> {
    let mut values = BTreeSet::new();
    for record in records {
        match record.get(field) {
            None | Some(Value::Null) => {}
            Some(Value::Text(s)) if s.is_empty() => {}
            Some(value) => {
                values.insert(value.to_string());
            }
        }
    }
    values.into_iter().collect()
}

/// Case-insensitive substring search across the schema's searchable fields.
/// A blank term is the identity.
pub fn search_records(records: &[Record], term: &str, schema: &ConfigSchema) -> Vec<Record> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return records.to_vec();
    }
    let searchable: Vec<&str> = schema
        .iter()
        .filter(|(_, c)| c.searchable)
        .map(|(n, _)| n)
        .collect();

    records
        .iter()
        .filter(|record| {
            searchable.iter().any(|field| match record.get(field) {
                None | Some(Value::Null) => false,
                Some(value) => value.to_string().to_lowercase().contains(&term),
            })
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FieldConfig, FilterState};

    fn schema() -> ConfigSchema {
        let mut schema = ConfigSchema::new();
        let mut id = FieldConfig::new("ID", ValueType::Identifier);
        id.searchable = true;
        schema.insert("id", id);
        let mut name = FieldConfig::new("Name", ValueType::Text);
        name.searchable = true;
        schema.insert("name", name);
        schema.insert("client", FieldConfig::new("Client", ValueType::Categorical));
        schema.insert("online", FieldConfig::new("Online", ValueType::Boolean));
        schema.insert("area", FieldConfig::new("Area", ValueType::Numeric));
        let mut hidden = FieldConfig::new("Internal", ValueType::Text);
        hidden.visible = false;
        schema.insert("internal", hidden);
        schema
    }

    fn records() -> Vec<Record> {
        let mut a = Record::new();
        a.set("id", "B-1");
        a.set("name", "North Plant");
        a.set("client", "Acme");
        a.set("online", true);
        a.set("area", 100.0);

        let mut b = Record::new();
        b.set("id", "B-2");
        b.set("name", "South Plant");
        b.set("client", "Globex");
        b.set("online", false);
        b.set("area", 250.0);

        let mut c = Record::new();
        c.set("id", "B-3");
        c.set("name", "Depot");
        c.set("client", "Acme");
        c.set("online", true);
        c.set("area", 50.0);

        vec![a, b, c]
    }

    #[test]
    fn test_empty_state_is_identity() {
        let records = records();
        let filtered = apply_filters(&records, &FilterState::new(), &schema());
        assert_eq!(filtered, records);
    }

    #[test]
    fn test_boolean_false_filter_is_not_a_noop() {
        // Regression check against the falsy-filter-value bug class: a
        // `false` filter must exclude `true` records, not be skipped.
        let state = FilterState::new().with_field("online", false);
        let filtered = apply_filters(&records(), &state, &schema());
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].get("id"), Some(&Value::from("B-2")));
    }

    #[test]
    fn test_noop_values_keep_everything() {
        for value in [Value::Null, Value::from(""), Value::from("all")] {
            let state = FilterState::new().with_field("client", value);
            assert_eq!(apply_filters(&records(), &state, &schema()).len(), 3);
        }
    }

    #[test]
    fn test_categorical_exact_match() {
        let state = FilterState::new().with_field("client", "Acme");
        let filtered = apply_filters(&records(), &state, &schema());
        assert_eq!(filtered.len(), 2);

        // Substring is not enough for categorical fields.
        let state = FilterState::new().with_field("client", "Ac");
        assert!(apply_filters(&records(), &state, &schema()).is_empty());
    }

    #[test]
    fn test_text_substring_case_insensitive() {
        let state = FilterState::new().with_field("name", "plant");
        let filtered = apply_filters(&records(), &state, &schema());
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn test_unconfigured_field_uses_substring() {
        let mut tagged = Record::new();
        tagged.set("tag", "Alpha-1");
        let state = FilterState::new().with_field("tag", "alpha");
        let filtered = apply_filters(&[tagged], &state, &schema());
        assert_eq!(filtered.len(), 1);
    }

    #[test]
    fn test_numeric_exact_match() {
        let state = FilterState::new().with_field("area", 250.0);
        let filtered = apply_filters(&records(), &state, &schema());
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].get("id"), Some(&Value::from("B-2")));

        let state = FilterState::new().with_field("area", 99.0);
        assert!(apply_filters(&records(), &state, &schema()).is_empty());
    }

    #[test]
    fn test_group_membership_inclusion() {
        let state = FilterState::new()
            .with_group_membership("client", vec!["Globex".to_string()]);
        let filtered = apply_filters(&records(), &state, &schema());
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].get("client"), Some(&Value::from("Globex")));
    }

    #[test]
    fn test_group_membership_empty_list_excludes_all() {
        let state = FilterState::new().with_group_membership("client", vec![]);
        assert!(apply_filters(&records(), &state, &schema()).is_empty());
    }

    #[test]
    fn test_group_membership_matches_unknown_sentinel() {
        let mut orphan = Record::new();
        orphan.set("id", "B-9");
        let mut all = records();
        all.push(orphan);
        let state = FilterState::new()
            .with_group_membership("client", vec!["Unknown".to_string()]);
        let filtered = apply_filters(&all, &state, &schema());
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].get("id"), Some(&Value::from("B-9")));
    }

    #[test]
    fn test_filters_combine_conjunctively() {
        let state = FilterState::new()
            .with_field("client", "Acme")
            .with_field("online", true);
        assert_eq!(apply_filters(&records(), &state, &schema()).len(), 2);

        let state = FilterState::new()
            .with_field("client", "Globex")
            .with_field("online", true);
        assert!(apply_filters(&records(), &state, &schema()).is_empty());
    }

    #[test]
    fn test_filterable_fields_are_visible_fields() {
        let options = filterable_fields(&schema(), &records());
        let fields: Vec<&str> = options.iter().map(|o| o.field.as_str()).collect();
        assert_eq!(fields, vec!["id", "name", "client", "online", "area"]);

        let client = options.iter().find(|o| o.field == "client").unwrap();
        assert_eq!(
            client.options,
            Some(vec!["Acme".to_string(), "Globex".to_string()])
        );
        let name = options.iter().find(|o| o.field == "name").unwrap();
        assert!(name.options.is_none());
    }

    #[test]
    fn test_distinct_values_sorted_and_deduplicated() {
        let values = distinct_values("client", &records());
        assert_eq!(values, vec!["Acme".to_string(), "Globex".to_string()]);
    }

    #[test]
    fn test_distinct_values_keep_false_and_zero() {
        let mut a = Record::new();
        a.set("flag", false);
        a.set("count", 0.0);
        let records = vec![a];
        assert_eq!(distinct_values("flag", &records), vec!["false".to_string()]);
        assert_eq!(distinct_values("count", &records), vec!["0".to_string()]);
    }

    #[test]
    fn test_search_records() {
        let found = search_records(&records(), "b-2", &schema());
        assert_eq!(found.len(), 1);

        // Only searchable fields participate.
        let found = search_records(&records(), "acme", &schema());
        assert!(found.is_empty());

        // Blank terms are the identity.
        assert_eq!(search_records(&records(), "  ", &schema()).len(), 3);
    }
}
