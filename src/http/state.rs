//! Application state for the HTTP server.

use std::sync::Arc;

use crate::models::ConfigSchema;
use crate::services::dataset::DataStore;
use crate::services::view::ColorCycle;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Field configuration, fetched once at startup and immutable for the
    /// session.
    pub schema: Arc<ConfigSchema>,
    /// Live record snapshot maintained by the poller.
    pub store: Arc<DataStore>,
    /// Cursor over the colorable fields; the coloring fallback when a
    /// request names no field. Advanced by the cycle timer when enabled.
    pub cycle: Arc<ColorCycle>,
}

impl AppState {
    /// Create a new application state for the given schema and store.
    pub fn new(schema: Arc<ConfigSchema>, store: Arc<DataStore>) -> Self {
        let cycle = Arc::new(ColorCycle::new(&schema));
        AppState {
            schema,
            store,
            cycle,
        }
    }
}
