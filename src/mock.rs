//! Synthetic sensor data used when the backend has nothing usable.
//!
//! Timestamps and point counts are a pure function of the range and `now`;
//! only the jitter on top of the diurnal baselines is random.

use chrono::{DateTime, Timelike, Utc};
use rand::Rng;
use std::f64::consts::PI;

use crate::sensors::{DataSource, HistoricalPoint, Metric, MetricSeries, SensorReading, TimeRange};

pub const MOCK_DEVICE_ID: &str = "mock-coop-1";

const TEMPERATURE_JITTER: f64 = 0.5;
const HUMIDITY_JITTER: f64 = 2.0;
const AMMONIA_JITTER: f64 = 1.5;
const LUMINOSITY_JITTER: f64 = 20.0;

/// Fixed snapshot substituted for the latest readings when the backend fails.
#[must_use]
pub fn mock_latest(now: DateTime<Utc>) -> SensorReading {
    SensorReading {
        device_id: MOCK_DEVICE_ID.to_string(),
        temperature: Some(26.4),
        humidity: Some(63.2),
        luminosity: Some(540.0),
        ammonia: Some(12.5),
        timestamp: now,
    }
}

#[must_use]
pub fn generate_history(range: TimeRange, now: DateTime<Utc>) -> Vec<HistoricalPoint> {
    generate_history_with(range, now, &mut rand::thread_rng())
}

/// Build `range.point_count()` points ending at `now`, spaced by `range.step()`.
pub fn generate_history_with<R: Rng + ?Sized>(
    range: TimeRange,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<HistoricalPoint> {
    let count = range.point_count();
    let step = range.step();

    (0..count)
        .map(|i| {
            let steps_back = i32::try_from(count - 1 - i).unwrap_or(i32::MAX);
            let timestamp = now - step * steps_back;
            synthetic_point(timestamp, rng)
        })
        .collect()
}

/// Project a synthetic history on one metric.
#[must_use]
pub fn mock_series(metric: Metric, range: TimeRange, now: DateTime<Utc>) -> MetricSeries {
    MetricSeries::from_history(metric, DataSource::Mock, &generate_history(range, now))
}

fn synthetic_point<R: Rng + ?Sized>(timestamp: DateTime<Utc>, rng: &mut R) -> HistoricalPoint {
    let hour = f64::from(timestamp.hour()) + f64::from(timestamp.minute()) / 60.0;
    // Peaks around 15:00, bottoms out around 03:00
    let diurnal = (2.0 * PI * (hour - 9.0) / 24.0).sin();

    let temperature = 25.0 + 5.0 * diurnal + jitter(rng, TEMPERATURE_JITTER);
    let humidity = 65.0 - 10.0 * diurnal + jitter(rng, HUMIDITY_JITTER);
    let ammonia = 15.0 + 5.0 * (2.0 * PI * hour / 24.0).cos() + jitter(rng, AMMONIA_JITTER);

    let daylight = if (6.0..=18.0).contains(&hour) {
        800.0 * (PI * (hour - 6.0) / 12.0).sin()
    } else {
        0.0
    };
    let luminosity = daylight + rng.gen_range(0.0..=LUMINOSITY_JITTER);

    HistoricalPoint {
        temperature: round1(temperature),
        humidity: round1(humidity),
        ammonia: round1(ammonia.max(0.0)),
        luminosity: round1(luminosity.max(0.0)),
        timestamp,
    }
}

fn jitter<R: Rng + ?Sized>(rng: &mut R, bound: f64) -> f64 {
    rng.gen_range(-bound..=bound)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
