//! Wire shapes accepted from the farm backend.
//!
//! The backend has shipped several response layouts over time. Every
//! tolerated layout is described here once and normalized into the crate's
//! own types, so nothing past this module needs to know about them.

use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use serde::de::IgnoredAny;

use crate::sensors::{Metric, SensorReading, SeriesPoint};
use crate::users::User;

/// Either a bare value or a list of them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Self::Many(items) => items,
            Self::One(item) => vec![item],
        }
    }
}

/// A metric value: `21.5`, `{"value": 21.5}` or `"21.5"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireValue {
    Number(f64),
    Wrapped { value: f64 },
    Text(String),
}

impl WireValue {
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(v) | Self::Wrapped { value: v } => Some(*v),
            Self::Text(s) => s.trim().parse().ok(),
        }
        .filter(|v: &f64| v.is_finite())
    }
}

/// A timestamp: RFC 3339 text or epoch seconds/milliseconds.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireTimestamp {
    Epoch(f64),
    Text(String),
}

impl WireTimestamp {
    #[must_use]
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Text(s) => DateTime::parse_from_rfc3339(s.trim())
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            Self::Epoch(v) if !v.is_finite() => None,
            // Anything past ~1973 in milliseconds is far beyond year 5000 in seconds
            Self::Epoch(v) if v.abs() >= 1e11 => Utc.timestamp_millis_opt(*v as i64).single(),
            Self::Epoch(v) => Utc.timestamp_opt(*v as i64, 0).single(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireId {
    Text(String),
    Number(i64),
}

impl WireId {
    #[must_use]
    pub fn into_string(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawReading {
    #[serde(default, alias = "device_id")]
    pub device_id: Option<WireId>,
    #[serde(default)]
    pub temperature: Option<WireValue>,
    #[serde(default)]
    pub humidity: Option<WireValue>,
    #[serde(default)]
    pub luminosity: Option<WireValue>,
    #[serde(default)]
    pub ammonia: Option<WireValue>,
    #[serde(default)]
    pub timestamp: Option<WireTimestamp>,
}

/// Response of `GET /sensors/latest`.
///
/// Variant order matters: a bare object is only read as a single reading
/// once the `data` and `sensors` wrappers have been ruled out.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum LatestResponse {
    List(Vec<RawReading>),
    Data { data: OneOrMany<RawReading> },
    Sensors { sensors: OneOrMany<RawReading> },
    Single(RawReading),
}

impl LatestResponse {
    /// Normalize into readings, dropping entries that carry no metric at all.
    ///
    /// Missing device ids become `sensor-<n>`; missing timestamps take
    /// `fetched_at`.
    #[must_use]
    pub fn into_readings(self, fetched_at: DateTime<Utc>) -> Vec<SensorReading> {
        let raw = match self {
            Self::List(items) => items,
            Self::Data { data } => data.into_vec(),
            Self::Sensors { sensors } => sensors.into_vec(),
            Self::Single(item) => vec![item],
        };

        raw.into_iter()
            .enumerate()
            .filter_map(|(i, r)| {
                let reading = SensorReading {
                    device_id: r
                        .device_id
                        .map_or_else(|| format!("sensor-{}", i + 1), WireId::into_string),
                    temperature: r.temperature.as_ref().and_then(WireValue::as_f64),
                    humidity: r.humidity.as_ref().and_then(WireValue::as_f64),
                    luminosity: r.luminosity.as_ref().and_then(WireValue::as_f64),
                    ammonia: r.ammonia.as_ref().and_then(WireValue::as_f64),
                    timestamp: r
                        .timestamp
                        .as_ref()
                        .and_then(WireTimestamp::to_datetime)
                        .unwrap_or(fetched_at),
                };
                let has_values = Metric::ALL.iter().any(|m| reading.value(*m).is_some());
                has_values.then_some(reading)
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub struct RawHistoryObject {
    #[serde(default)]
    pub value: Option<WireValue>,
    #[serde(default)]
    pub temperature: Option<WireValue>,
    #[serde(default)]
    pub humidity: Option<WireValue>,
    #[serde(default)]
    pub luminosity: Option<WireValue>,
    #[serde(default)]
    pub ammonia: Option<WireValue>,
    #[serde(default)]
    pub timestamp: Option<WireTimestamp>,
}

impl RawHistoryObject {
    fn metric_value(&self, metric: Metric) -> Option<&WireValue> {
        match metric {
            Metric::Temperature => self.temperature.as_ref(),
            Metric::Humidity => self.humidity.as_ref(),
            Metric::Ammonia => self.ammonia.as_ref(),
            Metric::Luminosity => self.luminosity.as_ref(),
        }
    }
}

/// One history entry. Anything unreadable (`null`, arrays, booleans) lands
/// in `Other` and is skipped instead of failing the whole series.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawSample {
    Number(f64),
    Text(String),
    Object(RawHistoryObject),
    Other(IgnoredAny),
}

/// Response of `GET /sensors/history`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum HistoryResponse {
    List(Vec<RawSample>),
    Data { data: Vec<RawSample> },
}

impl HistoryResponse {
    /// Normalize into points of `metric`.
    ///
    /// Objects are read through `value` first, then through the field named
    /// after the metric. When every point is timestamped the series is sorted
    /// oldest first; otherwise the backend's order is kept.
    #[must_use]
    pub fn into_points(self, metric: Metric) -> Vec<SeriesPoint> {
        let raw = match self {
            Self::List(items) | Self::Data { data: items } => items,
        };

        let mut points: Vec<SeriesPoint> = raw
            .into_iter()
            .filter_map(|sample| match sample {
                RawSample::Number(value) => value.is_finite().then_some(SeriesPoint {
                    timestamp: None,
                    value,
                }),
                RawSample::Text(text) => {
                    WireValue::Text(text).as_f64().map(|value| SeriesPoint {
                        timestamp: None,
                        value,
                    })
                }
                RawSample::Object(obj) => {
                    let value = obj
                        .value
                        .as_ref()
                        .or_else(|| obj.metric_value(metric))
                        .and_then(WireValue::as_f64)?;
                    Some(SeriesPoint {
                        timestamp: obj.timestamp.as_ref().and_then(WireTimestamp::to_datetime),
                        value,
                    })
                }
                RawSample::Other(_) => None,
            })
            .collect();

        if points.iter().all(|p| p.timestamp.is_some()) {
            points.sort_by_key(|p| p.timestamp);
        }
        points
    }
}

/// Response of `GET /users`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum UsersResponse {
    List(Vec<User>),
    Data { data: Vec<User> },
    Users { users: Vec<User> },
}

impl UsersResponse {
    #[must_use]
    pub fn into_users(self) -> Vec<User> {
        match self {
            Self::List(users) | Self::Data { data: users } | Self::Users { users } => users,
        }
    }
}

/// Error body returned by the backend on failed requests.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    #[must_use]
    pub fn into_message(self) -> Option<String> {
        self.message
            .or(self.error)
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
    }
}
