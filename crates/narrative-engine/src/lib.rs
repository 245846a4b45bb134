pub mod formatter;
pub mod monthly;
pub mod synthesizer;

pub use formatter::{
    render, render_value, DriverBlock, LegacyResult, MultiMetricPayload, ReportPayload, SignalsBlock,
};
pub use monthly::{build_monthly_report, MonthlyMeta, MonthlyReport};
pub use synthesizer::{no_data_narrative, synthesize};
