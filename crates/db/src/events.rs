use attendance_core::{Event, EventSource, LocalDay};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, TransactionBehavior, params};

use crate::Db;
use crate::error::{DbError, Result};
use crate::helpers::{format_ts, row_to_event};
use crate::leaves::leave_on;
use crate::types::{DayInsert, NewEvent, OpenSession};

const EVENT_COLUMNS: &str = "id, user_id, entry_type, ts, work_mode";

fn list_between(
    conn: &Connection,
    user_id: i64,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<Event>> {
    let mut stmt = conn.prepare(&format!(
        r#"
        SELECT {EVENT_COLUMNS}
        FROM time_entry
        WHERE user_id = ?1 AND ts >= ?2 AND ts < ?3
        ORDER BY ts ASC, id ASC
        "#
    ))?;
    let rows = stmt.query_map(
        params![user_id, format_ts(start), format_ts(end)],
        row_to_event,
    )?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

fn last_between(
    conn: &Connection,
    user_id: i64,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Option<Event>> {
    let mut stmt = conn.prepare(&format!(
        r#"
        SELECT {EVENT_COLUMNS}
        FROM time_entry
        WHERE user_id = ?1 AND ts >= ?2 AND ts < ?3
        ORDER BY ts DESC, id DESC
        LIMIT 1
        "#
    ))?;
    let mut rows = stmt.query(params![user_id, format_ts(start), format_ts(end)])?;
    if let Some(row) = rows.next()? {
        Ok(Some(row_to_event(row)?))
    } else {
        Ok(None)
    }
}

fn count_between(
    conn: &Connection,
    user_id: i64,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM time_entry WHERE user_id = ?1 AND ts >= ?2 AND ts < ?3",
        params![user_id, format_ts(start), format_ts(end)],
        |row| row.get(0),
    )?;
    Ok(count)
}

fn insert_all(conn: &Connection, user_id: i64, events: &[NewEvent]) -> Result<Vec<Event>> {
    let mut stmt = conn.prepare(
        r#"
        INSERT INTO time_entry (user_id, entry_type, ts, work_mode)
        VALUES (?1, ?2, ?3, ?4)
        "#,
    )?;
    let mut inserted = Vec::with_capacity(events.len());
    for event in events {
        let id = stmt.insert(params![
            user_id,
            event.kind.as_str(),
            format_ts(event.timestamp),
            event.work_mode.map(|mode| mode.as_str()),
        ])?;
        inserted.push(Event {
            id,
            user_id,
            kind: event.kind,
            timestamp: event.timestamp,
            work_mode: event.work_mode,
        });
    }
    Ok(inserted)
}

impl Db {
    pub fn insert_events(&mut self, user_id: i64, events: &[NewEvent]) -> Result<Vec<Event>> {
        let tx = self.conn.transaction()?;
        let inserted = insert_all(&tx, user_id, events)?;
        tx.commit()?;
        Ok(inserted)
    }

    /// Events in the half-open window `[start, end)`, oldest first, ties by id.
    pub fn list_events_between(
        &self,
        user_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Event>> {
        list_between(&self.conn, user_id, start, end)
    }

    pub fn count_events_between(
        &self,
        user_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64> {
        count_between(&self.conn, user_id, start, end)
    }

    pub fn latest_event(&self, user_id: i64) -> Result<Option<Event>> {
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {EVENT_COLUMNS}
            FROM time_entry
            WHERE user_id = ?1
            ORDER BY ts DESC, id DESC
            LIMIT 1
            "#
        ))?;
        let mut rows = stmt.query(params![user_id])?;
        if let Some(row) = rows.next()? {
            Ok(Some(row_to_event(row)?))
        } else {
            Ok(None)
        }
    }

    pub fn delete_events_between(
        &mut self,
        user_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<usize> {
        let deleted = self.conn.execute(
            "DELETE FROM time_entry WHERE user_id = ?1 AND ts >= ?2 AND ts < ?3",
            params![user_id, format_ts(start), format_ts(end)],
        )?;
        Ok(deleted)
    }

    /// Reads the last event of `day` and inserts whatever `plan` returns for
    /// it, all inside one IMMEDIATE transaction. Nothing is written when `plan`
    /// fails.
    pub fn append_checked<E, F>(
        &mut self,
        user_id: i64,
        day: &LocalDay,
        plan: F,
    ) -> std::result::Result<Vec<Event>, E>
    where
        E: From<DbError>,
        F: FnOnce(Option<&Event>) -> std::result::Result<Vec<NewEvent>, E>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(DbError::from)?;
        let last = last_between(&tx, user_id, day.start, day.next_start)?;
        let planned = plan(last.as_ref())?;
        let inserted = insert_all(&tx, user_id, &planned)?;
        tx.commit().map_err(DbError::from)?;
        Ok(inserted)
    }

    /// Writes a whole day only if it has no events and no recorded leave.
    pub fn insert_day_if_vacant(
        &mut self,
        user_id: i64,
        day: &LocalDay,
        events: &[NewEvent],
    ) -> Result<DayInsert> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let existing = count_between(&tx, user_id, day.start, day.next_start)?;
        if existing > 0 {
            return Ok(DayInsert::EntriesExist(existing));
        }
        if let Some(leave) = leave_on(&tx, user_id, day.date)? {
            return Ok(DayInsert::LeaveExists(leave));
        }
        let inserted = insert_all(&tx, user_id, events)?;
        tx.commit()?;
        Ok(DayInsert::Inserted(inserted))
    }

    /// Users whose most recent event (by timestamp, then id) is not a clock-out.
    pub fn users_with_open_session(&self) -> Result<Vec<OpenSession>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT e.id, e.user_id, e.entry_type, e.ts, e.work_mode, u.timezone_offset
            FROM users u
            INNER JOIN time_entry e
            ON e.id = (
                SELECT id
                FROM time_entry
                WHERE user_id = u.id
                ORDER BY ts DESC, id DESC
                LIMIT 1
            )
            WHERE e.entry_type != 'clock_out'
            ORDER BY u.id ASC
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            let latest = row_to_event(row)?;
            Ok(OpenSession {
                user_id: latest.user_id,
                timezone_offset: row.get(5)?,
                latest,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }
}

impl EventSource for Db {
    type Error = DbError;

    fn events_between(
        &self,
        user_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Event>> {
        self.list_events_between(user_id, start, end)
    }
}
