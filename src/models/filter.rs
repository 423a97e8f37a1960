//! Filter state.
//!
//! Filters form a conjunction: a record is kept only if every filter in the
//! state accepts it. The wire format is the legacy JSON object whose keys
//! are either plain field names or `_group_<field>` keys carrying a list of
//! accepted group names; internally that convention becomes a tagged union
//! so evaluation never string-matches key prefixes.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::value::Value;

/// Reserved key prefix for group-membership filters in the wire format.
pub const GROUP_FILTER_PREFIX: &str = "_group_";

/// One active filter.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Per-field predicate; the comparison dispatches on the field's
    /// configured value type. Empty-string and `"all"` values are no-ops.
    Field { field: String, value: Value },
    /// The record's group key must be one of the accepted names. An empty
    /// list accepts nothing; absence of the filter accepts everything.
    GroupMembership {
        field: String,
        accepted: Vec<String>,
    },
}

/// The set of active filters, in wire order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    filters: Vec<Filter>,
}

impl FilterState {
    pub fn new() -> Self {
        FilterState::default()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Filter> {
        self.filters.iter()
    }

    pub fn push(&mut self, filter: Filter) {
        self.filters.push(filter);
    }

    pub fn with_field(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Field {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn with_group_membership(
        mut self,
        field: impl Into<String>,
        accepted: Vec<String>,
    ) -> Self {
        self.filters.push(Filter::GroupMembership {
            field: field.into(),
            accepted,
        });
        self
    }
}

impl<'de> Deserialize<'de> for FilterState {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct StateVisitor;

        impl<'de> Visitor<'de> for StateVisitor {
            type Value = FilterState;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of filter key to filter value")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut state = FilterState::new();
                while let Some((key, raw)) =
                    access.next_entry::<String, serde_json::Value>()?
                {
                    // A null value means the key carries no filter at all.
                    if raw.is_null() {
                        continue;
                    }
                    if let Some(field) = key.strip_prefix(GROUP_FILTER_PREFIX) {
                        let accepted = match raw {
                            serde_json::Value::Array(items) => items
                                .iter()
                                .filter_map(Value::from_json)
                                .filter(|v| !v.is_null())
                                .map(|v| v.to_string())
                                .collect(),
                            scalar => match Value::from_json(&scalar) {
                                Some(v) if !v.is_null() => vec![v.to_string()],
                                _ => continue,
                            },
                        };
                        state.push(Filter::GroupMembership {
                            field: field.to_string(),
                            accepted,
                        });
                    } else if let Some(value) = Value::from_json(&raw) {
                        state.push(Filter::Field { field: key, value });
                    }
                }
                Ok(state)
            }
        }

        deserializer.deserialize_map(StateVisitor)
    }
}

impl Serialize for FilterState {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.filters.len()))?;
        for filter in &self.filters {
            match filter {
                Filter::Field { field, value } => {
                    map.serialize_entry(field, value)?;
                }
                Filter::GroupMembership { field, accepted } => {
                    let key = format!("{}{}", GROUP_FILTER_PREFIX, field);
                    map.serialize_entry(&key, accepted)?;
                }
            }
        }
        map.end()
    }
}
