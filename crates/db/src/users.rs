use attendance_core::User;
use chrono::Utc;
use rusqlite::{OptionalExtension, params};

use crate::Db;
use crate::error::Result;
use crate::helpers::{format_ts, row_to_user};

const USER_COLUMNS: &str = "id, username, timezone_offset, created_at";

impl Db {
    pub fn create_user(&mut self, username: &str, api_token: &str) -> Result<User> {
        let created_at = format_ts(Utc::now());
        self.conn.execute(
            r#"
            INSERT INTO users (username, api_token, created_at)
            VALUES (?1, ?2, ?3)
            "#,
            params![username, api_token, created_at],
        )?;
        Ok(User {
            id: self.conn.last_insert_rowid(),
            username: username.to_string(),
            timezone_offset: None,
            created_at,
        })
    }

    pub fn get_user(&self, user_id: i64) -> Result<Option<User>> {
        let user = self
            .conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![user_id],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    pub fn user_by_token(&self, api_token: &str) -> Result<Option<User>> {
        let user = self
            .conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE api_token = ?1"),
                params![api_token],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    pub fn user_by_name(&self, username: &str) -> Result<Option<User>> {
        let user = self
            .conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"),
                params![username],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    pub fn list_users(&self) -> Result<Vec<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id ASC"))?;
        let rows = stmt.query_map([], row_to_user)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Caches the last client-asserted offset for the reconciliation job.
    pub fn set_timezone_offset(&mut self, user_id: i64, offset_minutes: i32) -> Result<()> {
        self.conn.execute(
            "UPDATE users SET timezone_offset = ?1 WHERE id = ?2",
            params![offset_minutes, user_id],
        )?;
        Ok(())
    }

    /// Removes the user together with their events and leaves.
    pub fn delete_user(&mut self, user_id: i64) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM users WHERE id = ?1", params![user_id])?;
        Ok(deleted > 0)
    }
}
