//! Confidence Estimation
//!
//! Confidence here rewards coverage of the input, not the size or correctness
//! of the changes. Consumers should read it as "how many of the four KPIs
//! could be compared", never as a statistical confidence interval.

use kpi_core::{round_to, ChangeSet};

const BASE_CONFIDENCE: f64 = 0.55;
const PER_METRIC: f64 = 0.10;

/// `0.55 + 0.10` per measurable metric, clamped to [0, 1] and rounded to 2 places.
pub fn estimate_confidence(changes: &ChangeSet) -> f64 {
    let raw = BASE_CONFIDENCE + PER_METRIC * changes.present_count() as f64;
    round_to(raw.clamp(0.0, 1.0), 2)
}
