//! Period-over-period change arithmetic.
//!
//! Changes are computed as fractions and converted to percent units exactly
//! once, in `pct_change`. Everything downstream (thresholds, anomaly buckets,
//! report text) works in percent units.

use crate::{ChangeSet, Metric, MetricSnapshot};

/// Relative change `(target - base) / base` as a fraction.
///
/// Returns `None` when the base is missing or exactly zero: a change from zero
/// is unmeasurable, not 0% and not infinite. Non-finite results are also `None`.
pub fn fraction_change(base: Option<f64>, target: f64) -> Option<f64> {
    let base = base?;
    if base == 0.0 {
        return None;
    }
    let change = (target - base) / base;
    change.is_finite().then_some(change)
}

/// Relative change in percent units (-12.5 means -12.5%).
pub fn pct_change(base: Option<f64>, target: f64) -> Option<f64> {
    fraction_change(base, target).map(|f| f * 100.0)
}

/// Round to a fixed number of decimal places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Compute the change set between two snapshots.
pub fn compute_changes(base: &MetricSnapshot, target: &MetricSnapshot) -> ChangeSet {
    Metric::CANONICAL.iter().fold(ChangeSet::default(), |set, metric| {
        set.with(*metric, pct_change(Some(base.value(*metric)), target.value(*metric)))
    })
}

impl ChangeSet {
    /// Change set from `base` to `target`
    pub fn between(base: &MetricSnapshot, target: &MetricSnapshot) -> Self {
        compute_changes(base, target)
    }
}
