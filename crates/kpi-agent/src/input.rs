use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

use kpi_core::{KpiError, MetricSnapshot};

#[derive(Debug, Deserialize)]
struct SnapshotRow {
    #[serde(alias = "month")]
    period_id: String,
    revenue: f64,
    orders: f64,
    customers: f64,
    #[serde(default)]
    aov: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SnapshotFile {
    Rows(Vec<SnapshotRow>),
    Wrapped { rows: Vec<SnapshotRow> },
}

fn check_value(period_id: &str, name: &str, value: f64) -> Result<(), KpiError> {
    if !value.is_finite() || value < 0.0 {
        return Err(KpiError::InvalidData(format!(
            "{} has invalid {}: {}",
            period_id, name, value
        )));
    }
    Ok(())
}

/// Parse KPI rows from JSON, either a bare array or `{"rows": [...]}`.
/// Rows come back sorted by period id (oldest first).
pub fn parse_snapshots(json: &str) -> Result<Vec<MetricSnapshot>, KpiError> {
    let file: SnapshotFile =
        serde_json::from_str(json).map_err(|e| KpiError::InvalidData(e.to_string()))?;
    let rows = match file {
        SnapshotFile::Rows(rows) | SnapshotFile::Wrapped { rows } => rows,
    };

    let mut seen = HashSet::new();
    let mut snapshots = Vec::with_capacity(rows.len());
    for row in rows {
        if !seen.insert(row.period_id.clone()) {
            return Err(KpiError::InvalidData(format!("duplicate period {}", row.period_id)));
        }
        check_value(&row.period_id, "revenue", row.revenue)?;
        check_value(&row.period_id, "orders", row.orders)?;
        check_value(&row.period_id, "customers", row.customers)?;

        let snapshot = match row.aov {
            Some(aov) => {
                check_value(&row.period_id, "aov", aov)?;
                MetricSnapshot::with_aov(row.period_id, row.revenue, row.orders, row.customers, aov)
            }
            None => MetricSnapshot::new(row.period_id, row.revenue, row.orders, row.customers),
        };
        snapshots.push(snapshot);
    }

    snapshots.sort_by(|a, b| a.period_id.cmp(&b.period_id));
    Ok(snapshots)
}

pub fn load_snapshots(path: &Path) -> Result<Vec<MetricSnapshot>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let snapshots = parse_snapshots(&json)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(snapshots)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_and_sorts_rows() {
        let json = r#"[
            {"period_id": "2024-02", "revenue": 8000, "orders": 95, "customers": 77},
            {"month": "2024-01", "revenue": 10000, "orders": 100, "customers": 80, "aov": 100}
        ]"#;
        let rows = parse_snapshots(json).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].period_id, "2024-01");
        assert_eq!(rows[0].aov, 100.0);
        assert!((rows[1].aov - 8000.0 / 95.0).abs() < 1e-9);
    }

    #[test]
    fn test_accepts_wrapped_rows() {
        let json = r#"{"rows": [{"period_id": "2024-01", "revenue": 1, "orders": 0, "customers": 0}]}"#;
        let rows = parse_snapshots(json).unwrap();
        assert_eq!(rows[0].aov, 0.0);
    }

    #[test]
    fn test_rejects_bad_rows() {
        let negative = r#"[{"period_id": "2024-01", "revenue": -5, "orders": 1, "customers": 1}]"#;
        assert!(matches!(parse_snapshots(negative), Err(KpiError::InvalidData(_))));

        let duplicate = r#"[
            {"period_id": "2024-01", "revenue": 1, "orders": 1, "customers": 1},
            {"period_id": "2024-01", "revenue": 2, "orders": 1, "customers": 1}
        ]"#;
        assert!(matches!(parse_snapshots(duplicate), Err(KpiError::InvalidData(_))));

        assert!(parse_snapshots("{\"oops\": true}").is_err());
    }
}
