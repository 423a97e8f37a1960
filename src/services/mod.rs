//! Service layer: the pure transformation engines and the data-source layer.
//!
//! The color, grouping, filter, format and layout services are synchronous
//! pure functions over already-resident data; they retain no state across
//! calls and are safely re-entrant. The only stateful pieces live in
//! [`dataset`] (the polling record store) and [`view`] (the color-cycle
//! timer).

pub mod color;

pub mod dataset;

pub mod filter;

pub mod format;

pub mod grouping;

pub mod layout;

pub mod view;

pub use color::{legend_entries, resolve_color, ColorResult, DataRange, LegendEntry};
pub use dataset::{fetch_config, fetch_records, spawn_poller, DataStore, FetchError, Source};
pub use filter::{apply_filters, distinct_values, filterable_fields, search_records, FilterOption};
pub use format::{format_tooltip_value, format_value};
pub use grouping::{group_key, group_records, record_weight, size_field, Group, SizeField};
pub use layout::{compute_layout, LayoutOptions, TreemapNode};
pub use view::{resolve_view, ColorCycle, CycleTimer, ViewState};
