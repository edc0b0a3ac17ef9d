use attendance_core::{Event, EventKind, TzOffset, WorkMode, plan_transition};
use attendance_db::{DayInsert, Db, NewEvent};
use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{AppError, Result};
use crate::services::{SharedContext, open_db};

/// Append-only per-user event log. Every write for a user runs inside that
/// user's lock and a single IMMEDIATE transaction.
#[derive(Clone)]
pub struct EventLogService {
    ctx: SharedContext,
}

fn plan_append(
    last: Option<&Event>,
    kind: EventKind,
    at: DateTime<Utc>,
    work_mode: Option<WorkMode>,
) -> Result<Vec<NewEvent>> {
    if let Some(last) = last
        && at < last.timestamp
    {
        return Err(AppError::conflict(
            "out_of_order",
            format!(
                "{} at {} is earlier than the last {} at {}",
                kind.as_str(),
                at,
                last.kind.as_str(),
                last.timestamp
            ),
        ));
    }
    let kinds = plan_transition(last.map(|event| event.kind), kind)?;
    Ok(kinds
        .into_iter()
        .map(|planned| NewEvent {
            kind: planned,
            timestamp: at,
            work_mode: (planned == EventKind::ClockIn).then(|| work_mode.unwrap_or_default()),
        })
        .collect())
}

impl EventLogService {
    pub(super) fn new(ctx: SharedContext) -> Self {
        Self { ctx }
    }

    fn db(&self) -> Result<Db> {
        open_db(&self.ctx)
    }

    /// Validates `kind` against the last event of the local day containing
    /// `at` (default now) and appends one event, or two for a clock-out
    /// while on break.
    pub fn append(
        &self,
        user_id: i64,
        kind: EventKind,
        at: Option<DateTime<Utc>>,
        work_mode: Option<WorkMode>,
        offset: TzOffset,
    ) -> Result<Vec<Event>> {
        let at = at.unwrap_or_else(|| self.ctx.clock.now());
        let day = offset.day(offset.local_date(at));
        let inserted = self.ctx.locks.with_user(user_id, || {
            let mut db = self.db()?;
            db.append_checked(user_id, &day, |last| {
                plan_append(last, kind, at, work_mode)
            })
        })?;
        tracing::debug!(user_id, kind = kind.as_str(), count = inserted.len(), "appended events");
        Ok(inserted)
    }

    /// Closes whatever session is still open on `date` at its local 23:59:59.
    /// Returns the appended events, empty when the day was already closed.
    pub fn close_day(&self, user_id: i64, date: NaiveDate, offset: TzOffset) -> Result<Vec<Event>> {
        let day = offset.day(date);
        self.ctx.locks.with_user(user_id, || {
            let mut db = self.db()?;
            db.append_checked(user_id, &day, |last| match last {
                None => Ok(Vec::new()),
                Some(event) if event.kind == EventKind::ClockOut => Ok(Vec::new()),
                Some(event) => {
                    let at = day.end.max(event.timestamp);
                    plan_append(Some(event), EventKind::ClockOut, at, None)
                }
            })
        })
    }

    /// Writes a complete day, refusing when the day already has events or a
    /// recorded leave.
    pub fn insert_day(
        &self,
        user_id: i64,
        date: NaiveDate,
        offset: TzOffset,
        events: &[NewEvent],
    ) -> Result<Vec<Event>> {
        let day = offset.day(date);
        let outcome = self.ctx.locks.with_user(user_id, || {
            let mut db = self.db()?;
            Ok::<_, AppError>(db.insert_day_if_vacant(user_id, &day, events)?)
        })?;
        match outcome {
            DayInsert::Inserted(inserted) => Ok(inserted),
            DayInsert::EntriesExist(_) => Err(AppError::conflict(
                "entries_exist",
                "Entries already exist for this date. Delete them first to add manual entries.",
            )),
            DayInsert::LeaveExists(leave) => Err(AppError::conflict(
                "leave_exists",
                format!(
                    "You have a {} leave on this date. \
                     Remove the leave first to add a manual entry.",
                    leave.leave_type
                ),
            )),
        }
    }

    pub fn list_for_local_date(
        &self,
        user_id: i64,
        date: NaiveDate,
        offset: TzOffset,
    ) -> Result<Vec<Event>> {
        let day = offset.day(date);
        let db = self.db()?;
        Ok(db.list_events_between(user_id, day.start, day.next_start)?)
    }

    /// All events of `from..=to` in one query.
    pub fn list_for_local_range(
        &self,
        user_id: i64,
        from: NaiveDate,
        to: NaiveDate,
        offset: TzOffset,
    ) -> Result<Vec<Event>> {
        if from > to {
            return Err(AppError::InvalidInput(format!(
                "from {} is after to {}",
                from, to
            )));
        }
        let db = self.db()?;
        Ok(db.list_events_between(user_id, offset.day(from).start, offset.day(to).next_start)?)
    }

    /// Number of deleted events; zero is not an error.
    pub fn delete_for_local_date(
        &self,
        user_id: i64,
        date: NaiveDate,
        offset: TzOffset,
    ) -> Result<usize> {
        let day = offset.day(date);
        let deleted = self.ctx.locks.with_user(user_id, || {
            let mut db = self.db()?;
            Ok::<_, AppError>(db.delete_events_between(user_id, day.start, day.next_start)?)
        })?;
        tracing::info!(user_id, %date, deleted, "deleted day entries");
        Ok(deleted)
    }
}
