//! Operations toolkit for smart waste bin sensors.
//!
//! The library holds the pieces the `binwatch` CLI is built from: the data
//! model shared with the backend, the collection-route planner on top of the
//! OSRM Trip service, the fill-level heatmap aggregation, and the user config.

pub mod api;
pub mod config;
pub mod heatmap;
pub mod logging;
pub mod model;
pub mod route;
