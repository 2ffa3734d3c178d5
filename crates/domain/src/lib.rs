//! # FlowDash Domain
//!
//! Business domain types and models for FlowDash.
//!
//! This crate contains:
//! - Dataset summary and row types returned by the backend
//! - Chart series shaping helpers
//! - Credential pair type
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Domain constants
//!
//! ## Architecture
//! - No dependencies on other FlowDash crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod charts;
pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use charts::{flowrate_chart, type_chart, ChartSeries};
pub use config::ClientConfig;
pub use errors::{FlowDashError, Result};
pub use types::{DataRow, DatasetSummary, TokenPair};
