//! Grouping.
//!
//! Partitions records into named groups by the stringified value of the
//! grouping field, in a single stable pass: groups appear in first-seen
//! order and members keep input order, so layouts and test fixtures are
//! reproducible.

use serde::{Deserialize, Serialize};

use crate::models::{ConfigSchema, Record, Value};

/// Group name used when no grouping field is active.
pub const ALL_ITEMS_GROUP: &str = "All Items";
/// Group name for records whose grouping field is absent or null.
pub const UNKNOWN_GROUP: &str = "Unknown";

/// Well-known size field names, checked in order before falling back to the
/// first numeric field in schema order.
pub const SIZE_FIELD_CANDIDATES: &[&str] = &["squareMeters", "area", "size", "value", "amount"];

/// A named bucket of records sharing a common grouping-field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    pub members: Vec<Record>,
}

/// The group key of one record: the stringified field value, with the
/// [`UNKNOWN_GROUP`] sentinel for absent or null values.
pub fn group_key(record: &Record, field: &str) -> String {
    match record.get(field) {
        None | Some(Value::Null) => UNKNOWN_GROUP.to_string(),
        Some(value) => value.to_string(),
    }
}

/// Partition records into groups. An empty `group_by` returns a single
/// [`ALL_ITEMS_GROUP`] holding every record unmodified.
pub fn group_records(records: Vec<Record>, group_by: &str) -> Vec<Group> {
    if group_by.is_empty() {
        return vec![Group {
            name: ALL_ITEMS_GROUP.to_string(),
            members: records,
        }];
    }

    let mut groups: Vec<Group> = Vec::new();
    for record in records {
        let key = group_key(&record, group_by);
        match groups.iter_mut().find(|g| g.name == key) {
            Some(group) => group.members.push(record),
            None => groups.push(Group {
                name: key,
                members: vec![record],
            }),
        }
    }
    groups
}

/// How records are weighted during layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SizeField {
    /// Weight by this numeric field's value.
    Field(String),
    /// No numeric field exists; every record weighs 1.
    Uniform,
}

impl SizeField {
    pub fn name(&self) -> Option<&str> {
        match self {
            SizeField::Field(name) => Some(name),
            SizeField::Uniform => None,
        }
    }
}

/// Pick the field used to weight records: a well-known size-like name
/// first, then the first numeric field in schema order, then uniform
/// weighting. Never fails, even on schemas with zero numeric fields.
pub fn size_field(schema: &ConfigSchema) -> SizeField {
    for candidate in SIZE_FIELD_CANDIDATES {
        if schema.get(candidate).is_some_and(|c| c.is_numeric()) {
            return SizeField::Field(candidate.to_string());
        }
    }
    match schema.numeric().next() {
        Some((name, _)) => SizeField::Field(name.to_string()),
        None => SizeField::Uniform,
    }
}

/// Layout weight of one record. Absent or non-numeric values weigh 0;
/// negative values are clamped to 0.
pub fn record_weight(record: &Record, size: &SizeField) -> f64 {
    match size {
        SizeField::Field(name) => record
            .get(name)
            .and_then(Value::as_f64)
            .map(|v| v.max(0.0))
            .unwrap_or(0.0),
        SizeField::Uniform => 1.0,
    }
}
