//! Public API surface for the treemap backend.
//!
//! This file consolidates the DTO types for the HTTP API.
//! All types derive Serialize/Deserialize for JSON serialization.

pub use crate::routes::fields::FieldOption;
pub use crate::routes::fields::FieldsData;
pub use crate::routes::treemap::TreemapData;

pub use crate::models::ColorBin;
pub use crate::models::ColorMode;
pub use crate::models::ConfigSchema;
pub use crate::models::FieldConfig;
pub use crate::models::Filter;
pub use crate::models::FilterState;
pub use crate::models::Record;
pub use crate::models::Rgb;
pub use crate::models::Value;
pub use crate::models::ValueType;

pub use crate::services::color::ColorResult;
pub use crate::services::color::DataRange;
pub use crate::services::color::LegendEntry;
pub use crate::services::filter::FilterOption;
pub use crate::services::grouping::Group;
pub use crate::services::grouping::SizeField;
pub use crate::services::layout::LayoutOptions;
pub use crate::services::layout::TreemapNode;
pub use crate::services::view::ViewState;
