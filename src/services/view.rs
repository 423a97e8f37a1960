//! View state.
//!
//! The active grouping and coloring fields round-trip through URL query
//! parameters so a shared link reproduces the same view; absent or unknown
//! parameters fall back to the first eligible field of that kind. Color
//! cycling periodically advances the coloring field through the colorable
//! list on a fixed interval.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

use crate::models::ConfigSchema;

/// The resolved view selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    /// Active grouping field; `None` renders a single flat group.
    pub group_by: Option<String>,
    /// Active coloring field; `None` when the schema has no colorable field.
    pub color_by: Option<String>,
}

/// Resolve the requested view against the schema.
///
/// An absent `group_by` falls back to the first groupable field; an
/// explicitly empty string means "no grouping" and is preserved. A field
/// name the schema does not know falls back the same way. `color_by` must
/// name a colorable field, otherwise the first colorable field is used.
pub fn resolve_view(
    schema: &ConfigSchema,
    group_by: Option<&str>,
    color_by: Option<&str>,
) -> ViewState {
    let group_by = match group_by {
        Some("") => None,
        Some(field) if schema.get(field).is_some() => Some(field.to_string()),
        _ => schema.first_groupable().map(String::from),
    };
    let color_by = match color_by {
        Some(field) if schema.get(field).is_some_and(|c| c.is_colorable()) => {
            Some(field.to_string())
        }
        _ => schema.first_colorable().map(String::from),
    };
    ViewState { group_by, color_by }
}

/// Cyclic cursor over the schema's colorable fields.
///
/// `current` starts at the first colorable field, so an idle cycle matches
/// the static fallback of [`resolve_view`].
#[derive(Debug)]
pub struct ColorCycle {
    fields: Vec<String>,
    index: AtomicUsize,
}

impl ColorCycle {
    pub fn new(schema: &ConfigSchema) -> Self {
        ColorCycle {
            fields: schema.colorable().map(|(n, _)| n.to_string()).collect(),
            index: AtomicUsize::new(0),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn current(&self) -> Option<&str> {
        if self.fields.is_empty() {
            return None;
        }
        let index = self.index.load(Ordering::Relaxed) % self.fields.len();
        Some(&self.fields[index])
    }

    /// Advance to the next colorable field, wrapping around.
    pub fn advance(&self) -> Option<&str> {
        if self.fields.is_empty() {
            return None;
        }
        let next = (self.index.load(Ordering::Relaxed) + 1) % self.fields.len();
        self.index.store(next, Ordering::Relaxed);
        Some(&self.fields[next])
    }
}

/// Background task advancing a [`ColorCycle`] on a fixed interval.
///
/// Stopping the timer (or dropping it) aborts the task; restarting with a
/// new interval is how the interval changes.
#[derive(Debug)]
pub struct CycleTimer {
    handle: JoinHandle<()>,
}

impl CycleTimer {
    pub fn start(cycle: Arc<ColorCycle>, interval: Duration) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick fires immediately; skip it so the initial
            // field stays visible for a full interval.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if let Some(field) = cycle.advance() {
                    tracing::debug!(field, "color cycle advanced");
                }
            }
        });
        CycleTimer { handle }
    }

    pub fn stop(self) {
        self.handle.abort();
    }
}

impl Drop for CycleTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
