pub mod actions;
pub mod anomaly;
pub mod attribution;
pub mod classifier;
pub mod confidence;
pub mod gauge;
pub mod verdict;

pub use actions::plan_next_actions;
pub use anomaly::{detect_anomalies, rank_anomalies};
pub use attribution::{attribute_driver, summarize, summarize_series};
pub use classifier::{
    build_decision_signals, classify_risk, classify_trend, insufficient_signals, risk_score, MATERIAL_DROP_PCT,
};
pub use confidence::estimate_confidence;
pub use gauge::{Arrow, Badge, VolatilityGauge};
pub use verdict::{evaluate, Verdict};
