//! Data Transfer Objects for the HTTP API.
//!
//! These DTOs are used for request/response serialization in the REST API.
//! Most visualization DTOs are re-exported from the routes module since
//! they already derive Serialize/Deserialize.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Re-export existing DTOs that are already serializable
pub use crate::api::{
    ColorResult, FieldOption, FieldsData, FilterOption, LegendEntry, Record, TreemapData,
    TreemapNode, ViewState,
};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// API version
    pub version: String,
    /// Records currently loaded
    pub records: usize,
    /// When the record set last changed
    pub last_updated: Option<DateTime<Utc>>,
    /// Last fetch error, if the most recent refresh failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Current record snapshot with its metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordsResponse {
    pub records: Vec<Record>,
    pub total: usize,
    /// Checksum of the payload the snapshot was loaded from
    pub checksum: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
    /// Last fetch error, if the most recent refresh failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Query parameters for the treemap endpoint. `group_by` and `color_by`
/// are the URL view-state encoding; a shared link reproduces the view.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TreemapQuery {
    /// Grouping field; empty string means no grouping
    #[serde(default)]
    pub group_by: Option<String>,
    /// Coloring field
    #[serde(default)]
    pub color_by: Option<String>,
    /// JSON object of active filters
    #[serde(default)]
    pub filters: Option<String>,
    /// Viewport width in pixels
    #[serde(default)]
    pub width: Option<f64>,
    /// Viewport height in pixels
    #[serde(default)]
    pub height: Option<f64>,
}

/// Query parameters for the legend endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LegendQuery {
    #[serde(default)]
    pub color_by: Option<String>,
}

/// Legend for the resolved coloring field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegendResponse {
    pub field: String,
    pub label: String,
    pub entries: Vec<LegendEntry>,
}
