//! Leaderboard period buckets.
//!
//! A completed session is counted once in each of four buckets: the day,
//! the ISO week, the month, and all time. Each bucket is identified by a
//! canonical key string.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::GameError;

/// Key used for the single all-time bucket.
pub const ALL_TIME_KEY: &str = "all";

/// Aggregation window of a leaderboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PeriodType {
    /// One calendar day.
    Daily,
    /// One ISO-8601 week (Monday start).
    Weekly,
    /// One calendar month.
    Monthly,
    /// Every game ever played.
    AllTime,
}

impl PeriodType {
    /// Every period type, in bucket update order.
    pub const ALL: [Self; 4] = [Self::Daily, Self::Weekly, Self::Monthly, Self::AllTime];

    /// Returns the wire and storage name of this period type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::AllTime => "all_time",
        }
    }

    /// Returns the canonical key of the bucket containing `date`.
    #[must_use]
    pub fn key_for(&self, date: NaiveDate) -> String {
        match self {
            Self::Daily => date.format("%Y-%m-%d").to_string(),
            Self::Weekly => {
                let week = date.iso_week();
                format!("{}-W{:02}", week.year(), week.week())
            }
            Self::Monthly => date.format("%Y-%m").to_string(),
            Self::AllTime => ALL_TIME_KEY.to_string(),
        }
    }
}

impl fmt::Display for PeriodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PeriodType {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "all_time" => Ok(Self::AllTime),
            other => Err(GameError::InvalidPeriod(other.to_string())),
        }
    }
}

/// One concrete leaderboard bucket: a period type plus its key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct PeriodBucket {
    /// The aggregation window.
    pub period_type: PeriodType,
    /// Canonical key, e.g. `2025-11-27`, `2025-W48`, `2025-11`, `all`.
    pub period_key: String,
}

impl PeriodBucket {
    /// Returns the bucket of `period_type` that contains `date`.
    #[must_use]
    pub fn for_date(period_type: PeriodType, date: NaiveDate) -> Self {
        Self {
            period_type,
            period_key: period_type.key_for(date),
        }
    }

    /// Returns the four buckets a session completed on `date` belongs to.
    #[must_use]
    pub fn all_for(date: NaiveDate) -> [Self; 4] {
        PeriodType::ALL.map(|period_type| Self::for_date(period_type, date))
    }
}

impl fmt::Display for PeriodBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.period_type, self.period_key)
    }
}
