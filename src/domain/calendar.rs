//! Calendar arithmetic for daily games.
//!
//! Every "what day is it" question in the engine goes through
//! [`GameCalendar`], which pins the platform to [`CANONICAL_TIME_ZONE`]
//! instead of the host locale. Time itself comes from a [`Clock`] so that
//! services can be exercised at fixed instants.

use std::fmt;

use chrono::{DateTime, Days, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::error::GameError;

/// Time zone that defines the boundaries of a game day for every user.
pub const CANONICAL_TIME_ZONE: Tz = chrono_tz::America::New_York;

/// Default number of days in the past a daily puzzle may still be played.
pub const DEFAULT_RETENTION_DAYS: i64 = 30;

/// Reference date for daily word selection (day number zero).
#[must_use]
pub fn selection_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Parses a `YYYY-MM-DD` game date.
///
/// # Errors
///
/// Returns [`GameError::InvalidDate`] when the string is not a valid
/// calendar date in that format.
pub fn parse_game_date(raw: &str) -> Result<NaiveDate, GameError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| GameError::InvalidDate(raw.to_string()))
}

/// Source of the current instant.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Returns the current instant in UTC.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Date resolution and validation in the canonical time zone.
#[derive(Debug, Clone, Copy)]
pub struct GameCalendar {
    tz: Tz,
    retention_days: i64,
}

impl GameCalendar {
    /// Creates a calendar in the canonical zone with the given replay window.
    #[must_use]
    pub fn new(retention_days: i64) -> Self {
        Self {
            tz: CANONICAL_TIME_ZONE,
            retention_days: retention_days.max(0),
        }
    }

    /// Returns the replay window in days.
    #[must_use]
    pub const fn retention_days(&self) -> i64 {
        self.retention_days
    }

    /// Returns the calendar date of `now` in the canonical time zone.
    #[must_use]
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.tz).date_naive()
    }

    /// Returns the canonical calendar date on which `instant` falls.
    #[must_use]
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        self.today(instant)
    }

    /// Resolves the date a daily game should be played for.
    ///
    /// `None` means today. An explicit date must be neither in the future
    /// nor older than the replay window.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::FutureDate`] or [`GameError::DateTooOld`].
    pub fn resolve_date(
        &self,
        requested: Option<NaiveDate>,
        now: DateTime<Utc>,
    ) -> Result<NaiveDate, GameError> {
        let today = self.today(now);
        let Some(date) = requested else {
            return Ok(today);
        };
        if date > today {
            return Err(GameError::FutureDate(date));
        }
        let oldest = today
            .checked_sub_days(Days::new(self.retention_days.unsigned_abs()))
            .unwrap_or(NaiveDate::MIN);
        if date < oldest {
            return Err(GameError::DateTooOld {
                date,
                max_days: self.retention_days,
            });
        }
        Ok(date)
    }

    /// Whole days between the selection epoch and `date` (negative before it).
    #[must_use]
    pub fn day_number(date: NaiveDate) -> i64 {
        date.signed_duration_since(selection_epoch()).num_days()
    }
}

impl Default for GameCalendar {
    fn default() -> Self {
        Self::new(DEFAULT_RETENTION_DAYS)
    }
}
