use attendance_core::{Event, EventKind, Leave, User, WorkMode};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::Row;
use rusqlite::types::Type;

use crate::error::DbError;

/// Fixed-width UTC text so lexical order matches time order.
pub fn format_ts(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) fn format_date(value: NaiveDate) -> String {
    value.format("%Y-%m-%d").to_string()
}

fn conversion_error(
    index: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(err))
}

pub(crate) fn parse_ts(
    index: usize,
    value: &str,
) -> std::result::Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|err| conversion_error(index, err))
}

pub(crate) fn parse_date(
    index: usize,
    value: &str,
) -> std::result::Result<NaiveDate, rusqlite::Error> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|err| conversion_error(index, err))
}

/// Expects `id, user_id, entry_type, ts, work_mode` in the first five columns.
pub(crate) fn row_to_event(row: &Row<'_>) -> std::result::Result<Event, rusqlite::Error> {
    let kind: String = row.get(2)?;
    let kind = EventKind::parse(&kind)
        .ok_or_else(|| conversion_error(2, DbError::InvalidRow(format!("entry_type {kind}"))))?;
    let ts: String = row.get(3)?;
    let work_mode = match row.get::<_, Option<String>>(4)? {
        Some(value) => Some(WorkMode::parse(&value).ok_or_else(|| {
            conversion_error(4, DbError::InvalidRow(format!("work_mode {value}")))
        })?),
        None => None,
    };
    Ok(Event {
        id: row.get(0)?,
        user_id: row.get(1)?,
        kind,
        timestamp: parse_ts(3, &ts)?,
        work_mode,
    })
}

pub(crate) fn row_to_user(row: &Row<'_>) -> std::result::Result<User, rusqlite::Error> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        timezone_offset: row.get(2)?,
        created_at: row.get(3)?,
    })
}

pub(crate) fn row_to_leave(row: &Row<'_>) -> std::result::Result<Leave, rusqlite::Error> {
    let date: String = row.get(2)?;
    Ok(Leave {
        id: row.get(0)?,
        user_id: row.get(1)?,
        date: parse_date(2, &date)?,
        leave_type: row.get(3)?,
        reason: row.get(4)?,
    })
}
