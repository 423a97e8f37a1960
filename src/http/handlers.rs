//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! engine services for the actual transformation work.

use axum::{
    extract::{Query, State},
    Json,
};

use super::dto::{
    HealthResponse, LegendQuery, LegendResponse, RecordsResponse, TreemapQuery,
};
use super::error::AppError;
use super::state::AppState;
use crate::models::{ColorMode, ConfigSchema, FilterState};
use crate::routes::fields::{build_fields_data, FieldsData};
use crate::routes::treemap::{build_treemap_data, TreemapData};
use crate::services::color::{legend_entries, DataRange};
use crate::services::layout::LayoutOptions;
use crate::services::view::resolve_view;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// Viewport used when a request does not carry its own dimensions.
pub const DEFAULT_WIDTH: f64 = 1280.0;
pub const DEFAULT_HEIGHT: f64 = 720.0;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Health check endpoint reporting the state of the record store.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        records: state.store.len(),
        last_updated: state.store.last_updated(),
        error: state.store.last_error(),
    }))
}

// =============================================================================
// Configuration & Records
// =============================================================================

/// GET /v1/config
///
/// The field configuration schema, as loaded at startup.
pub async fn get_config(State(state): State<AppState>) -> HandlerResult<ConfigSchema> {
    Ok(Json((*state.schema).clone()))
}

/// GET /v1/records
///
/// The current record snapshot with its fetch metadata.
pub async fn get_records(State(state): State<AppState>) -> HandlerResult<RecordsResponse> {
    let snapshot = state.store.snapshot();
    Ok(Json(RecordsResponse {
        records: snapshot.to_vec(),
        total: snapshot.len(),
        checksum: state.store.checksum(),
        last_updated: state.store.last_updated(),
        error: state.store.last_error(),
    }))
}

// =============================================================================
// Visualization Endpoints
// =============================================================================

/// GET /v1/fields
///
/// Groupable, colorable and filterable field listings for UI controls.
/// Filter options are derived from the unfiltered record set.
pub async fn get_fields(State(state): State<AppState>) -> HandlerResult<FieldsData> {
    let snapshot = state.store.snapshot();
    Ok(Json(build_fields_data(&state.schema, &snapshot)))
}

/// GET /v1/treemap
///
/// The full pipeline for one view: resolve the view selection, apply
/// filters, group, lay out and color. `group_by`/`color_by` fall back to
/// the first eligible field (the color fallback tracks the cycle cursor
/// when cycling is enabled).
pub async fn get_treemap(
    State(state): State<AppState>,
    Query(query): Query<TreemapQuery>,
) -> HandlerResult<TreemapData> {
    let filters = parse_filters(query.filters.as_deref())?;

    let width = query.width.unwrap_or(DEFAULT_WIDTH);
    let height = query.height.unwrap_or(DEFAULT_HEIGHT);
    if width <= 0.0 || height <= 0.0 || !width.is_finite() || !height.is_finite() {
        return Err(AppError::BadRequest(format!(
            "Viewport dimensions must be positive, got {}x{}",
            width, height
        )));
    }

    let color_by = query
        .color_by
        .clone()
        .or_else(|| state.cycle.current().map(String::from));
    let view = resolve_view(&state.schema, query.group_by.as_deref(), color_by.as_deref());

    let snapshot = state.store.snapshot();
    let opts = LayoutOptions::new(width, height);
    Ok(Json(build_treemap_data(
        &state.schema,
        &snapshot,
        &filters,
        &view,
        &opts,
    )))
}

/// GET /v1/legend
///
/// Legend entries for the resolved coloring field.
pub async fn get_legend(
    State(state): State<AppState>,
    Query(query): Query<LegendQuery>,
) -> HandlerResult<LegendResponse> {
    let color_by = query
        .color_by
        .clone()
        .or_else(|| state.cycle.current().map(String::from));
    let view = resolve_view(&state.schema, None, color_by.as_deref());
    let Some(field) = view.color_by else {
        return Err(AppError::NotFound(
            "No colorable field is configured".to_string(),
        ));
    };
    // resolve_view only returns fields present in the schema.
    let Some(config) = state.schema.get(&field) else {
        return Err(AppError::NotFound(format!("Unknown field: {}", field)));
    };

    let data_range = if config.color_mode == Some(ColorMode::Gradient) {
        DataRange::observe(&state.store.snapshot(), &field)
    } else {
        None
    };

    Ok(Json(LegendResponse {
        label: config.label.clone(),
        entries: legend_entries(config, data_range),
        field,
    }))
}

fn parse_filters(raw: Option<&str>) -> Result<FilterState, AppError> {
    match raw {
        Some(raw) if !raw.trim().is_empty() => serde_json::from_str(raw)
            .map_err(|e| AppError::BadRequest(format!("Invalid filters parameter: {}", e))),
        _ => Ok(FilterState::new()),
    }
}
