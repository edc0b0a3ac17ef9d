use attendance_core::{LEAVE_TYPES, Leave, User, parse_local_date};
use attendance_db::Db;
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::services::{SharedContext, open_db};
use crate::util::token::generate_token;

#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub user: User,
    pub api_token: String,
}

#[derive(Clone)]
pub struct UsersService {
    ctx: SharedContext,
}

impl UsersService {
    pub(super) fn new(ctx: SharedContext) -> Self {
        Self { ctx }
    }

    fn db(&self) -> Result<Db> {
        open_db(&self.ctx)
    }

    pub fn create(&self, username: &str) -> Result<NewUser> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AppError::InvalidInput("username is required".to_string()));
        }
        let mut db = self.db()?;
        if db.user_by_name(username)?.is_some() {
            return Err(AppError::conflict(
                "username_taken",
                format!("user {} already exists", username),
            ));
        }
        let api_token = generate_token();
        let user = db.create_user(username, &api_token)?;
        tracing::info!(user_id = user.id, username, "created user");
        Ok(NewUser { user, api_token })
    }

    pub fn authenticate(&self, api_token: &str) -> Result<User> {
        let db = self.db()?;
        db.user_by_token(api_token)?
            .ok_or_else(|| AppError::Unauthorized("invalid or missing token".to_string()))
    }

    pub fn list(&self) -> Result<Vec<User>> {
        Ok(self.db()?.list_users()?)
    }

    pub fn record_leave(
        &self,
        user_id: i64,
        date: &str,
        leave_type: &str,
        reason: Option<&str>,
    ) -> Result<Leave> {
        let date = parse_local_date(date.trim())?;
        if !LEAVE_TYPES.contains(&leave_type) {
            return Err(AppError::InvalidInput(format!(
                "unsupported leave type {}, expected one of {}",
                leave_type,
                LEAVE_TYPES.join(", ")
            )));
        }
        let mut db = self.db()?;
        if db.get_user(user_id)?.is_none() {
            return Err(AppError::NotFound(format!("user {} not found", user_id)));
        }
        if db.leave_on(user_id, date)?.is_some() {
            return Err(AppError::conflict(
                "leave_exists",
                format!("a leave is already recorded on {}", date),
            ));
        }
        let leave = db.add_leave(user_id, date, leave_type, reason)?;
        tracing::info!(user_id, %date, leave_type, "recorded leave");
        Ok(leave)
    }
}
