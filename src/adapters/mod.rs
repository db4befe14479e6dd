//! Adapters layer: Concrete implementations of ports.
//!
//! - `models`: classifier adapters, one per model family
//! - `json_store`: artifact bundle loading from a training export directory
//! - `sanitize`: patient-data filtering for logs

pub mod json_store;
pub mod models;
pub mod sanitize;
