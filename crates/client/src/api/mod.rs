//! API surface: typed dashboard operations and their error taxonomy

mod client;
mod errors;

pub use client::{DashboardClient, ReportDownload};
pub use errors::ApiError;
