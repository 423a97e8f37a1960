//! # Treemap Rust Backend
//!
//! Configuration-driven treemap visualization engine.
//!
//! This crate turns arbitrary tabular records into proportional-area treemap
//! geometry, driven entirely by a declarative field schema rather than
//! hard-coded per-dataset logic. The backend exposes a REST API via Axum for
//! the browser frontend.
//!
//! ## Features
//!
//! - **Field Configuration**: A JSON schema describes how each field is
//!   labeled, typed, colored, grouped and filtered
//! - **Color Resolution**: Four color modes (gradient, bins, boolean,
//!   categorical) with graceful degradation on configuration gaps
//! - **Grouping**: Stable single-pass partitioning of records into named
//!   groups, in first-seen order
//! - **Filtering**: Conjunctive filter evaluation with per-type predicates
//!   and group-membership filters
//! - **Layout**: Squarified rectangle subdivision producing integer-pixel
//!   treemap geometry
//! - **Data Polling**: Periodic re-fetch of the record set, wholesale
//!   replacement, last-good retention on failure
//! - **HTTP API**: RESTful endpoints for frontend integration
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`api`]: Data Transfer Objects (DTOs) for API responses
//! - [`models`]: Record, value and field-configuration types
//! - [`services`]: The pure transformation engines and the data-source layer
//! - [`routes`]: Route-specific data types and orchestration
//! - [`http`]: Axum-based HTTP server and request handlers

pub mod api;

pub mod models;

pub mod routes;

pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
