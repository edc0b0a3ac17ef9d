use attendance_core::{TzOffset, parse_local_date};
use chrono::{Duration, NaiveDate};

use crate::clock::Clock;
use crate::config::RangeParams;
use crate::error::{AppError, Result};

pub const DEFAULT_HISTORY_DAYS: i64 = 30;
pub const MAX_HISTORY_DAYS: i64 = 366;
pub const DEFAULT_ANALYTICS_DAYS: u32 = 7;
pub const MAX_ANALYTICS_DAYS: u32 = 365;

/// Offset for one request: the client's assertion when present, otherwise the
/// server's local offset at now.
pub fn resolve_offset(clock: &dyn Clock, client_minutes: Option<i32>) -> Result<TzOffset> {
    match client_minutes {
        Some(minutes) => Ok(TzOffset::from_minutes(minutes)?),
        None => {
            let fallback = clock.server_offset();
            tracing::debug!(
                offset = fallback.minutes(),
                "no client timezone offset, using server local offset"
            );
            Ok(fallback)
        }
    }
}

pub fn parse_date_param(value: &str) -> Result<NaiveDate> {
    Ok(parse_local_date(value.trim())?)
}

/// History window, defaulting to the last 30 days through today.
pub fn resolve_history_range(
    params: &RangeParams,
    today: NaiveDate,
) -> Result<(NaiveDate, NaiveDate)> {
    let from = match params.from.as_deref() {
        Some(value) => parse_date_param(value)?,
        None => today - Duration::days(DEFAULT_HISTORY_DAYS),
    };
    let to = match params.to.as_deref() {
        Some(value) => parse_date_param(value)?,
        None => today,
    };
    if from > to {
        return Err(AppError::InvalidInput(format!(
            "from {} is after to {}",
            from, to
        )));
    }
    let span = (to - from).num_days() + 1;
    if span > MAX_HISTORY_DAYS {
        return Err(AppError::InvalidInput(format!(
            "range spans {} days, at most {} allowed",
            span, MAX_HISTORY_DAYS
        )));
    }
    Ok((from, to))
}

pub fn resolve_days(days: Option<u32>) -> Result<u32> {
    let days = days.unwrap_or(DEFAULT_ANALYTICS_DAYS);
    if days == 0 || days > MAX_ANALYTICS_DAYS {
        return Err(AppError::InvalidInput(format!(
            "days must be between 1 and {}",
            MAX_ANALYTICS_DAYS
        )));
    }
    Ok(days)
}

/// `days` consecutive dates ending today.
pub fn trailing_window(today: NaiveDate, days: u32) -> (NaiveDate, NaiveDate) {
    (today - Duration::days(days as i64 - 1), today)
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};

    use super::*;
    use crate::clock::FixedClock;

    fn epoch() -> DateTime<Utc> {
        "2025-03-10T00:00:00Z".parse().expect("timestamp")
    }

    fn date(value: &str) -> NaiveDate {
        parse_local_date(value).expect("date")
    }

    #[test]
    fn client_offset_wins_and_is_validated() {
        let clock = FixedClock::new(epoch());
        assert_eq!(
            resolve_offset(&clock, Some(-330)).expect("offset").minutes(),
            -330
        );
        assert!(matches!(
            resolve_offset(&clock, Some(3000)),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn missing_offset_falls_back_to_server_offset() {
        let mut clock = FixedClock::new(epoch());
        clock.server_offset = TzOffset::from_minutes(60).expect("offset");
        assert_eq!(resolve_offset(&clock, None).expect("offset").minutes(), 60);
    }

    #[test]
    fn history_defaults_to_thirty_days() {
        let today = date("2025-03-31");
        let (from, to) = resolve_history_range(&RangeParams::default(), today).expect("range");
        assert_eq!(from, date("2025-03-01"));
        assert_eq!(to, today);
    }

    #[test]
    fn history_rejects_inverted_and_oversized_ranges() {
        let today = date("2025-03-31");
        let inverted = RangeParams {
            from: Some("2025-03-10".to_string()),
            to: Some("2025-03-01".to_string()),
        };
        assert!(resolve_history_range(&inverted, today).is_err());
        let oversized = RangeParams {
            from: Some("2024-01-01".to_string()),
            to: Some("2025-03-01".to_string()),
        };
        assert!(resolve_history_range(&oversized, today).is_err());
        let malformed = RangeParams {
            from: Some("2025/03/01".to_string()),
            to: None,
        };
        assert!(resolve_history_range(&malformed, today).is_err());
    }

    #[test]
    fn days_are_bounded() {
        assert_eq!(resolve_days(None).expect("days"), 7);
        assert!(resolve_days(Some(0)).is_err());
        assert!(resolve_days(Some(366)).is_err());
        assert_eq!(
            trailing_window(date("2025-03-10"), 7),
            (date("2025-03-04"), date("2025-03-10"))
        );
    }
}
