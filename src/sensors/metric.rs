use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// A measured quantity in the coop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Temperature,
    Humidity,
    Ammonia,
    Luminosity,
}

impl Metric {
    pub const ALL: [Self; 4] = [
        Self::Temperature,
        Self::Humidity,
        Self::Ammonia,
        Self::Luminosity,
    ];

    /// Token used in `?type=` history queries.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::Humidity => "humidity",
            Self::Ammonia => "ammonia",
            Self::Luminosity => "luminosity",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Temperature => "Temperature",
            Self::Humidity => "Humidity",
            Self::Ammonia => "Ammonia",
            Self::Luminosity => "Luminosity",
        }
    }

    #[must_use]
    pub const fn unit(self) -> &'static str {
        match self {
            Self::Temperature => "°C",
            Self::Humidity => "%",
            Self::Ammonia => "ppm",
            Self::Luminosity => "lx",
        }
    }

    /// Fixed upper bound of the chart's y axis.
    #[must_use]
    pub const fn chart_max(self) -> f64 {
        match self {
            Self::Temperature => 50.0,
            Self::Humidity => 100.0,
            Self::Ammonia => 50.0,
            Self::Luminosity => 1000.0,
        }
    }

    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Temperature => "#ef4444",
            Self::Humidity => "#3b82f6",
            Self::Ammonia => "#a855f7",
            Self::Luminosity => "#eab308",
        }
    }

    /// Map a value to its display level.
    ///
    /// Thresholds are strict: a temperature of exactly 30 or exactly 20 is normal.
    #[must_use]
    pub fn classify(self, value: f64) -> Level {
        match self {
            Self::Temperature if value > 30.0 => Level::Alert,
            Self::Temperature if value < 20.0 => Level::Cold,
            Self::Humidity if value > 80.0 => Level::Alert,
            Self::Ammonia if value > 25.0 => Level::Alert,
            _ => Level::Normal,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown metric '{s}'"))
    }
}

/// Threshold level of a reading, rendered as a CSS class on sensor cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Alert,
    Cold,
    Normal,
}

impl Level {
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Alert => "alert",
            Self::Cold => "cold",
            Self::Normal => "normal",
        }
    }
}
