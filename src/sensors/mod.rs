//! Sensor domain types shared by the poller, the mock generator and the
//! presentation layer.

mod metric;
mod range;

pub use metric::{Level, Metric};
pub use range::TimeRange;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Most recent values reported by one device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SensorReading {
    pub device_id: String,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub luminosity: Option<f64>,
    pub ammonia: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

impl SensorReading {
    #[must_use]
    pub fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Temperature => self.temperature,
            Metric::Humidity => self.humidity,
            Metric::Ammonia => self.ammonia,
            Metric::Luminosity => self.luminosity,
        }
    }
}

/// One time-keyed sample carrying every metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalPoint {
    pub temperature: f64,
    pub humidity: f64,
    pub ammonia: f64,
    pub luminosity: f64,
    pub timestamp: DateTime<Utc>,
}

impl HistoricalPoint {
    #[must_use]
    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Temperature => self.temperature,
            Metric::Humidity => self.humidity,
            Metric::Ammonia => self.ammonia,
            Metric::Luminosity => self.luminosity,
        }
    }
}

/// One sample of a single metric. Backends that answer with bare numbers
/// produce points without timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SeriesPoint {
    pub timestamp: Option<DateTime<Utc>>,
    pub value: f64,
}

/// Where a piece of displayed data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Live,
    Mock,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MetricSeries {
    pub metric: Metric,
    pub source: DataSource,
    pub points: Vec<SeriesPoint>,
}

impl MetricSeries {
    /// Project a multi-metric history on one metric.
    #[must_use]
    pub fn from_history(metric: Metric, source: DataSource, history: &[HistoricalPoint]) -> Self {
        Self {
            metric,
            source,
            points: history
                .iter()
                .map(|p| SeriesPoint {
                    timestamp: Some(p.timestamp),
                    value: p.value(metric),
                })
                .collect(),
        }
    }
}

/// Truncate the reading list to the configured number of cards.
pub fn apply_cap(readings: &mut Vec<SensorReading>, cap: Option<usize>) {
    if let Some(cap) = cap
        && readings.len() > cap
    {
        tracing::debug!(received = readings.len(), cap, "Sensor list truncated to cap");
        readings.truncate(cap);
    }
}
