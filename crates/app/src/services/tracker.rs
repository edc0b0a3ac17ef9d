use attendance_core::{
    Event, EventKind, TzOffset, WorkMode, WorkState, parse_local_date, parse_local_time,
    summarize_day, tz::is_weekend,
};
use attendance_db::NewEvent;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::services::event_log::EventLogService;
use crate::services::{SharedContext, open_db};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub state: WorkState,
    pub floor_minutes: i64,
    pub break_minutes: i64,
    pub total_minutes: i64,
    pub work_mode: WorkMode,
    pub entries: Vec<Event>,
    pub is_weekend: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActionOutcome {
    pub message: String,
    pub entries: Vec<Event>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteOutcome {
    pub deleted: usize,
    pub message: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BreakSpan {
    pub start: String,
    pub end: String,
}

/// A whole day typed in after the fact, all times local `HH:MM`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ManualEntry {
    pub date: String,
    pub clock_in: String,
    pub clock_out: Option<String>,
    #[serde(default)]
    pub breaks: Vec<BreakSpan>,
    pub work_mode: Option<WorkMode>,
}

fn invalid(message: &str) -> AppError {
    AppError::InvalidInput(message.to_string())
}

fn parse_time_field(value: &str) -> Result<NaiveTime> {
    parse_local_time(value.trim()).map_err(|_| invalid("Invalid time format. Use HH:MM"))
}

/// Validates a manual entry and converts it to the events it stands for.
///
/// Times are compared as same-day local times. Breaks are written in start
/// order and may not overlap each other.
pub fn plan_manual_entry(
    entry: &ManualEntry,
    offset: TzOffset,
) -> Result<(NaiveDate, Vec<NewEvent>)> {
    if entry.date.trim().is_empty() || entry.clock_in.trim().is_empty() {
        return Err(invalid("Date and login time are required"));
    }
    let date = parse_local_date(entry.date.trim())
        .map_err(|_| invalid("Invalid date format. Use YYYY-MM-DD"))?;
    let clock_in = parse_time_field(&entry.clock_in)?;
    let clock_out = match entry.clock_out.as_deref().map(str::trim) {
        Some(value) if !value.is_empty() => Some(parse_time_field(value)?),
        _ => None,
    };
    if let Some(clock_out) = clock_out
        && clock_out <= clock_in
    {
        return Err(invalid("Logout time must be after login time"));
    }

    let mut breaks = Vec::with_capacity(entry.breaks.len());
    for span in &entry.breaks {
        let (Ok(start), Ok(end)) = (
            parse_local_time(span.start.trim()),
            parse_local_time(span.end.trim()),
        ) else {
            return Err(invalid(
                "Each break must have valid start and end times (HH:MM)",
            ));
        };
        if end <= start {
            return Err(invalid("Break end time must be after break start time"));
        }
        if start < clock_in || clock_out.is_some_and(|clock_out| end > clock_out) {
            return Err(invalid(
                "Break times must be within clock-in and clock-out times",
            ));
        }
        breaks.push((start, end));
    }
    breaks.sort();
    if breaks.windows(2).any(|pair| pair[1].0 < pair[0].1) {
        return Err(invalid("Breaks must not overlap"));
    }

    let at = |time: NaiveTime| offset.to_utc(date.and_time(time));
    let mut events = vec![NewEvent {
        kind: EventKind::ClockIn,
        timestamp: at(clock_in),
        work_mode: Some(entry.work_mode.unwrap_or_default()),
    }];
    for (start, end) in breaks {
        events.push(NewEvent::new(EventKind::BreakStart, at(start)));
        events.push(NewEvent::new(EventKind::BreakEnd, at(end)));
    }
    if let Some(clock_out) = clock_out {
        events.push(NewEvent::new(EventKind::ClockOut, at(clock_out)));
    }
    Ok((date, events))
}

/// User-facing clock actions and the live status view.
#[derive(Clone)]
pub struct TrackerService {
    ctx: SharedContext,
    event_log: EventLogService,
}

impl TrackerService {
    pub(super) fn new(ctx: SharedContext, event_log: EventLogService) -> Self {
        Self { ctx, event_log }
    }

    fn today(&self, offset: TzOffset) -> NaiveDate {
        offset.local_date(self.ctx.clock.now())
    }

    fn act(
        &self,
        user_id: i64,
        kind: EventKind,
        work_mode: Option<WorkMode>,
        offset: TzOffset,
        message: &str,
    ) -> Result<ActionOutcome> {
        let entries = self
            .event_log
            .append(user_id, kind, None, work_mode, offset)?;
        Ok(ActionOutcome {
            message: message.to_string(),
            entries,
        })
    }

    pub fn status(&self, user_id: i64, offset: TzOffset) -> Result<StatusReport> {
        let now = self.ctx.clock.now();
        let today = offset.local_date(now);
        let entries = self
            .event_log
            .list_for_local_date(user_id, today, offset)?;
        let summary = summarize_day(today, &entries, offset, now);
        Ok(StatusReport {
            state: summary.state.unwrap_or_default(),
            floor_minutes: summary.floor_minutes,
            break_minutes: summary.break_minutes,
            total_minutes: summary.total_minutes,
            work_mode: summary.work_mode,
            entries,
            is_weekend: is_weekend(today),
        })
    }

    /// Refused on local weekends. On success the offset is cached on the
    /// user for the reconciliation job.
    pub fn clock_in(
        &self,
        user_id: i64,
        work_mode: Option<WorkMode>,
        offset: TzOffset,
    ) -> Result<ActionOutcome> {
        if is_weekend(self.today(offset)) {
            return Err(AppError::conflict(
                "weekend",
                "It's a weekend holiday! Enjoy your day off.",
            ));
        }
        let outcome = self.act(
            user_id,
            EventKind::ClockIn,
            work_mode,
            offset,
            "Logged in successfully",
        )?;
        let mut db = open_db(&self.ctx)?;
        db.set_timezone_offset(user_id, offset.minutes())?;
        Ok(outcome)
    }

    pub fn break_start(&self, user_id: i64, offset: TzOffset) -> Result<ActionOutcome> {
        self.act(user_id, EventKind::BreakStart, None, offset, "Break started")
    }

    pub fn break_end(&self, user_id: i64, offset: TzOffset) -> Result<ActionOutcome> {
        self.act(
            user_id,
            EventKind::BreakEnd,
            None,
            offset,
            "Break ended, back to work!",
        )
    }

    pub fn clock_out(&self, user_id: i64, offset: TzOffset) -> Result<ActionOutcome> {
        self.act(
            user_id,
            EventKind::ClockOut,
            None,
            offset,
            "Logged out. See you tomorrow!",
        )
    }

    pub fn manual_entry(
        &self,
        user_id: i64,
        entry: &ManualEntry,
        offset: TzOffset,
    ) -> Result<ActionOutcome> {
        let (date, events) = plan_manual_entry(entry, offset)?;
        let entries = self.event_log.insert_day(user_id, date, offset, &events)?;
        tracing::info!(user_id, %date, count = entries.len(), "manual entry added");
        Ok(ActionOutcome {
            message: "Manual entry added successfully".to_string(),
            entries,
        })
    }

    pub fn entries(&self, user_id: i64, date: &str, offset: TzOffset) -> Result<Vec<Event>> {
        let date = parse_local_date(date.trim())?;
        self.event_log.list_for_local_date(user_id, date, offset)
    }

    pub fn delete_day(&self, user_id: i64, date: &str, offset: TzOffset) -> Result<DeleteOutcome> {
        let date = parse_local_date(date.trim())?;
        let deleted = self
            .event_log
            .delete_for_local_date(user_id, date, offset)?;
        Ok(DeleteOutcome {
            deleted,
            message: format!("Deleted {} entries for {}", deleted, date),
        })
    }
}
