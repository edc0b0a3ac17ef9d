//! Fixed-offset calendar arithmetic.
//!
//! Offsets follow the browser `Date.getTimezoneOffset()` convention: the value
//! is `UTC - local` in minutes, so IST (UTC+5:30) is `-330`. There is no zone
//! database behind this, the offset is taken as constant for a query window and
//! DST transitions are not modeled.

use chrono::{
    DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc, Weekday,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest accepted offset magnitude (18 hours).
pub const MAX_OFFSET_MINUTES: i32 = 18 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TzError {
    #[error("invalid timezone offset {0}")]
    InvalidOffset(i32),
    #[error("invalid date {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("invalid time {0:?}, expected HH:MM")]
    InvalidTime(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TzOffset(i32);

impl TzOffset {
    pub const UTC: TzOffset = TzOffset(0);

    pub fn from_minutes(minutes: i32) -> Result<Self, TzError> {
        if !(-MAX_OFFSET_MINUTES..=MAX_OFFSET_MINUTES).contains(&minutes) {
            return Err(TzError::InvalidOffset(minutes));
        }
        Ok(Self(minutes))
    }

    pub fn minutes(self) -> i32 {
        self.0
    }

    fn shift(self) -> Duration {
        Duration::minutes(self.0 as i64)
    }

    pub fn local_datetime(self, instant: DateTime<Utc>) -> NaiveDateTime {
        instant.naive_utc() - self.shift()
    }

    pub fn local_date(self, instant: DateTime<Utc>) -> NaiveDate {
        self.local_datetime(instant).date()
    }

    pub fn to_utc(self, local: NaiveDateTime) -> DateTime<Utc> {
        Utc.from_utc_datetime(&(local + self.shift()))
    }

    pub fn day(self, date: NaiveDate) -> LocalDay {
        let start = self.to_utc(date.and_time(NaiveTime::default()));
        LocalDay {
            date,
            start,
            end: start + Duration::seconds(86_399),
            next_start: start + Duration::days(1),
        }
    }
}

/// UTC bounds of one local calendar date.
///
/// `end` is local 23:59:59 (the instant used to close forgotten sessions);
/// range queries use the half-open `[start, next_start)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalDay {
    pub date: NaiveDate,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub next_start: DateTime<Utc>,
}

impl LocalDay {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.next_start
    }
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

pub fn parse_local_date(value: &str) -> Result<NaiveDate, TzError> {
    let bytes = value.as_bytes();
    let shaped = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(index, byte)| index == 4 || index == 7 || byte.is_ascii_digit());
    if !shaped {
        return Err(TzError::InvalidDate(value.to_string()));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| TzError::InvalidDate(value.to_string()))
}

pub fn parse_local_time(value: &str) -> Result<NaiveTime, TzError> {
    let bytes = value.as_bytes();
    let shaped = bytes.len() == 5
        && bytes[2] == b':'
        && bytes
            .iter()
            .enumerate()
            .all(|(index, byte)| index == 2 || byte.is_ascii_digit());
    if !shaped {
        return Err(TzError::InvalidTime(value.to_string()));
    }
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| TzError::InvalidTime(value.to_string()))
}

/// Every date in `from..=to`, empty when the range is inverted.
pub fn dates_between(from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
    from.iter_days().take_while(|date| *date <= to).collect()
}
