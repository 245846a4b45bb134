//! Volatility Gauge
//!
//! Heuristic 0-100 gauge over a metric series, with a traffic-light badge and
//! a direction arrow for dashboards. The score comes from the coefficient of
//! variation, so it measures how unstable the series is rather than whether
//! it is going up or down.

use serde::{Deserialize, Serialize};

use kpi_core::{round_to, Metric, MetricSnapshot};

/// CV at or below this maps to 0
const CV_FLOOR: f64 = 0.05;
/// CV at or above this maps to 100
const CV_CEILING: f64 = 0.35;
/// Score when there are too few points to measure dispersion
const DEFAULT_SCORE: f64 = 25.0;
const MIN_POINTS: usize = 3;

/// Traffic-light classification of a gauge score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Badge {
    Green,
    Yellow,
    Red,
}

impl Badge {
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s < 33.0 => Badge::Green,
            s if s < 66.0 => Badge::Yellow,
            _ => Badge::Red,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Badge::Green => "green",
            Badge::Yellow => "yellow",
            Badge::Red => "red",
        }
    }
}

/// Direction of the most recent move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arrow {
    Up,
    Down,
    Flat,
}

impl Arrow {
    pub fn symbol(&self) -> &'static str {
        match self {
            Arrow::Up => "↑",
            Arrow::Down => "↓",
            Arrow::Flat => "→",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolatilityGauge {
    pub metric: Metric,
    pub score: f64,
    pub badge: Badge,
    pub arrow: Arrow,
}

impl VolatilityGauge {
    /// Gauge for one metric over an ordered (oldest first) series
    pub fn from_series(metric: Metric, rows: &[MetricSnapshot]) -> Self {
        let values: Vec<f64> = rows.iter().map(|r| r.value(metric)).collect();
        let score = round_to(volatility_score(&values), 2);
        Self {
            metric,
            score,
            badge: Badge::from_score(score),
            arrow: last_move(&values),
        }
    }
}

fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Sample standard deviation
fn std_dev(data: &[f64]) -> f64 {
    if data.len() < 2 {
        return 0.0;
    }
    let m = mean(data);
    let variance = data.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (data.len() - 1) as f64;
    variance.sqrt()
}

/// Coefficient-of-variation score, linearly scaled between the CV floor and
/// ceiling and clamped to [0, 100].
pub fn volatility_score(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    if values.len() < MIN_POINTS || m <= 0.0 {
        return DEFAULT_SCORE;
    }
    let cv = std_dev(values) / m;
    ((cv - CV_FLOOR) / (CV_CEILING - CV_FLOOR) * 100.0).clamp(0.0, 100.0)
}

fn last_move(values: &[f64]) -> Arrow {
    match values {
        [.., prev, last] if last > prev => Arrow::Up,
        [.., prev, last] if last < prev => Arrow::Down,
        _ => Arrow::Flat,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn revenue_rows(values: &[f64]) -> Vec<MetricSnapshot> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| MetricSnapshot::new(format!("2024-{:02}", i + 1), *v, 10.0, 10.0))
            .collect()
    }

    #[test]
    fn test_stable_series_is_green() {
        let gauge = VolatilityGauge::from_series(Metric::Revenue, &revenue_rows(&[100.0, 101.0, 99.0, 100.0]));
        assert_eq!(gauge.score, 0.0);
        assert_eq!(gauge.badge, Badge::Green);
        assert_eq!(gauge.arrow, Arrow::Up);
    }

    #[test]
    fn test_volatile_series_is_red() {
        let gauge = VolatilityGauge::from_series(Metric::Revenue, &revenue_rows(&[100.0, 20.0, 180.0, 40.0]));
        assert_eq!(gauge.score, 100.0);
        assert_eq!(gauge.badge, Badge::Red);
        assert_eq!(gauge.arrow, Arrow::Down);
    }

    #[test]
    fn test_short_series_uses_default() {
        assert_eq!(volatility_score(&[]), 0.0);
        assert_eq!(volatility_score(&[100.0, 50.0]), DEFAULT_SCORE);
        assert_eq!(volatility_score(&[0.0, 0.0, 0.0]), DEFAULT_SCORE);
        let gauge = VolatilityGauge::from_series(Metric::Orders, &revenue_rows(&[5.0]));
        assert_eq!(gauge.arrow, Arrow::Flat);
    }

    #[test]
    fn test_badge_bands() {
        assert_eq!(Badge::from_score(32.9), Badge::Green);
        assert_eq!(Badge::from_score(33.0), Badge::Yellow);
        assert_eq!(Badge::from_score(66.0), Badge::Red);
    }
}
