use serde::{Deserialize, Serialize};

use kpi_core::{AnomalyItem, DecisionSignals, DriverSummary};

use crate::anomaly::detect_anomalies;
use crate::classifier::build_decision_signals;

/// Decision signals together with the top movers they were derived from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub decision: DecisionSignals,
    pub anomalies: Vec<AnomalyItem>,
}

/// Classify a driver summary and rank its anomalies.
///
/// The anomaly ranker only needs the change set, so it runs alongside the
/// classifier.
pub fn evaluate(summary: &DriverSummary) -> Verdict {
    let (decision, anomalies) = rayon::join(
        || build_decision_signals(summary),
        || detect_anomalies(summary),
    );
    Verdict { decision, anomalies }
}
