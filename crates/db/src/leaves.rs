use attendance_core::Leave;
use chrono::{NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, params};

use crate::Db;
use crate::error::Result;
use crate::helpers::{format_date, format_ts, parse_date, row_to_leave};

pub(crate) fn leave_on(conn: &Connection, user_id: i64, date: NaiveDate) -> Result<Option<Leave>> {
    let leave = conn
        .query_row(
            r#"
            SELECT id, user_id, date, leave_type, reason
            FROM leave_day
            WHERE user_id = ?1 AND date = ?2
            "#,
            params![user_id, format_date(date)],
            row_to_leave,
        )
        .optional()?;
    Ok(leave)
}

impl Db {
    pub fn add_leave(
        &mut self,
        user_id: i64,
        date: NaiveDate,
        leave_type: &str,
        reason: Option<&str>,
    ) -> Result<Leave> {
        self.conn.execute(
            r#"
            INSERT INTO leave_day (user_id, date, leave_type, reason, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                user_id,
                format_date(date),
                leave_type,
                reason,
                format_ts(Utc::now())
            ],
        )?;
        Ok(Leave {
            id: self.conn.last_insert_rowid(),
            user_id,
            date,
            leave_type: leave_type.to_string(),
            reason: reason.map(str::to_string),
        })
    }

    pub fn leave_on(&self, user_id: i64, date: NaiveDate) -> Result<Option<Leave>> {
        leave_on(&self.conn, user_id, date)
    }

    /// Leave dates in `from..=to`, ascending.
    pub fn leave_dates_between(
        &self,
        user_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<NaiveDate>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT date
            FROM leave_day
            WHERE user_id = ?1 AND date >= ?2 AND date <= ?3
            ORDER BY date ASC
            "#,
        )?;
        let rows = stmt.query_map(
            params![user_id, format_date(from), format_date(to)],
            |row| {
                let value: String = row.get(0)?;
                parse_date(0, &value)
            },
        )?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub fn delete_leave(&mut self, user_id: i64, date: NaiveDate) -> Result<bool> {
        let deleted = self.conn.execute(
            "DELETE FROM leave_day WHERE user_id = ?1 AND date = ?2",
            params![user_id, format_date(date)],
        )?;
        Ok(deleted > 0)
    }
}
