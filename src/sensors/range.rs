use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Time window selectable on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum TimeRange {
    #[default]
    #[serde(rename = "24h")]
    Day,
    #[serde(rename = "7d")]
    Week,
    #[serde(rename = "30d")]
    Month,
}

impl TimeRange {
    pub const ALL: [Self; 3] = [Self::Day, Self::Week, Self::Month];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Day => "24h",
            Self::Week => "7d",
            Self::Month => "30d",
        }
    }

    /// Number of samples in a series covering this range.
    #[must_use]
    pub const fn point_count(self) -> usize {
        match self {
            Self::Day => 24,
            Self::Week => 7,
            Self::Month => 30,
        }
    }

    /// Spacing between consecutive samples.
    #[must_use]
    pub fn step(self) -> TimeDelta {
        match self {
            Self::Day => TimeDelta::hours(1),
            Self::Week | Self::Month => TimeDelta::days(1),
        }
    }

    /// Every how many samples an x-axis label is drawn.
    #[must_use]
    pub const fn label_every(self) -> usize {
        match self {
            Self::Day => 4,
            Self::Week => 1,
            Self::Month => 5,
        }
    }

    /// `chrono` format string of x-axis labels.
    #[must_use]
    pub const fn label_format(self) -> &'static str {
        match self {
            Self::Day => "%H:00",
            Self::Week => "%a %d",
            Self::Month => "%d/%m",
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "24h" => Ok(Self::Day),
            "7d" => Ok(Self::Week),
            "30d" => Ok(Self::Month),
            other => Err(format!("Unknown time range '{other}', expected 24h, 7d or 30d")),
        }
    }
}
