//! Treemap orchestration: filter, group, lay out, color.

use serde::{Deserialize, Serialize};

use crate::models::{ColorMode, ConfigSchema, FieldConfig, FilterState, Record};
use crate::services::color::{legend_entries, resolve_color, DataRange, LegendEntry};
use crate::services::filter::apply_filters;
use crate::services::grouping::{group_records, size_field};
use crate::services::layout::{compute_layout, LayoutOptions, TreemapNode};
use crate::services::view::ViewState;

/// Fully resolved treemap for one view: positioned geometry, per-leaf
/// colors, legend and counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreemapData {
    pub root: TreemapNode,
    pub view: ViewState,
    pub legend: Vec<LegendEntry>,
    /// Field the layout weighted records by, if any.
    pub size_field: Option<String>,
    pub total_count: usize,
    pub filtered_count: usize,
    pub group_count: usize,
}

/// Run the whole pipeline: narrow the record set, partition it, lay the
/// groups out and resolve each leaf's color.
pub fn build_treemap_data(
    schema: &ConfigSchema,
    records: &[Record],
    filters: &FilterState,
    view: &ViewState,
    opts: &LayoutOptions,
) -> TreemapData {
    let filtered = apply_filters(records, filters, schema);
    let filtered_count = filtered.len();

    let color_field: Option<(&str, &FieldConfig)> = view
        .color_by
        .as_deref()
        .and_then(|field| schema.get(field).map(|config| (field, config)));
    // Gradient coloring needs the observed range of the displayed set.
    let data_range = color_field.and_then(|(field, config)| {
        if config.color_mode == Some(ColorMode::Gradient) {
            DataRange::observe(&filtered, field)
        } else {
            None
        }
    });

    let size = size_field(schema);
    let group_by = view.group_by.as_deref().unwrap_or("");
    let groups = group_records(filtered, group_by);
    let group_count = groups.len();

    let mut root = compute_layout(groups, &size, opts);
    if let Some((field, config)) = color_field {
        root.for_each_leaf_mut(&mut |leaf| {
            let value = leaf
                .record
                .as_ref()
                .map(|r| r.get_or_null(field).clone())
                .unwrap_or(crate::models::Value::Null);
            leaf.color = Some(resolve_color(&value, config, data_range));
        });
    }

    let legend = color_field
        .map(|(_, config)| legend_entries(config, data_range))
        .unwrap_or_default();

    TreemapData {
        root,
        view: view.clone(),
        legend,
        size_field: size.name().map(String::from),
        total_count: records.len(),
        filtered_count,
        group_count,
    }
}
