//! Core types, errors, and configuration for Wabex
//!
//! This crate provides the foundational types and error handling shared by the
//! Wabex exporter crates: container format and database-kind enums, the layout
//! constants of the Android backup containers, and the exporter configuration.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;

// Re-exports for convenience
pub use config::ExportConfig;
pub use error::{Error, Result};
pub use types::*;
