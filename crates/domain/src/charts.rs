//! Chart series shaping
//!
//! Converts backend dataset payloads into label/value series ready for
//! chart rendering. Column naming in uploaded CSVs is not fully
//! consistent, so the flowrate series tolerates the header variants seen
//! in real uploads.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::DataRow;

/// A labelled numeric series for a single chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub label: String,
    pub labels: Vec<String>,
    pub data: Vec<f64>,
}

/// Build the per-type count series from a dataset's type distribution
#[must_use]
pub fn type_chart(type_distribution: &BTreeMap<String, u64>) -> ChartSeries {
    let labels: Vec<String> = type_distribution.keys().cloned().collect();
    // Row counts stay far below 2^53, where f64 is exact.
    #[allow(clippy::cast_precision_loss)]
    let data: Vec<f64> = type_distribution.values().map(|count| *count as f64).collect();

    ChartSeries { label: "Count by Type".to_string(), labels, data }
}

/// Build the flowrate series from the rows preview
///
/// Labels prefer `Equipment Name`, then `Equipment`, then a positional
/// `Item N` fallback. Values accept the `Flowrate`, `flowrate`, and
/// `Flow Rate` header variants; anything non-numeric becomes `0.0`.
#[must_use]
pub fn flowrate_chart(rows: &[DataRow]) -> ChartSeries {
    let labels: Vec<String> = rows
        .iter()
        .enumerate()
        .map(|(index, row)| {
            row_text(row, "Equipment Name")
                .or_else(|| row_text(row, "Equipment"))
                .unwrap_or_else(|| format!("Item {}", index + 1))
        })
        .collect();

    let data: Vec<f64> = rows
        .iter()
        .map(|row| {
            row_number(row, "Flowrate")
                .or_else(|| row_number(row, "flowrate"))
                .or_else(|| row_number(row, "Flow Rate"))
                .unwrap_or(0.0)
        })
        .collect();

    ChartSeries { label: "Flowrate".to_string(), labels, data }
}

fn row_text(row: &DataRow, key: &str) -> Option<String> {
    match row.get(key)? {
        serde_json::Value::String(text) if !text.is_empty() => Some(text.clone()),
        serde_json::Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn row_number(row: &DataRow, key: &str) -> Option<f64> {
    match row.get(key)? {
        serde_json::Value::Number(number) => number.as_f64(),
        serde_json::Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}
