use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Event, EventKind, WorkMode};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkState {
    #[default]
    LoggedOut,
    OnFloor,
    OnBreak,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("already logged in, clock out first")]
    AlreadyLoggedIn,
    #[error("you must login first")]
    MustLoginFirst,
    #[error("already on break")]
    AlreadyOnBreak,
    #[error("you are not on break")]
    NotOnBreak,
    #[error("you are not logged in")]
    NotLoggedIn,
}

impl TransitionError {
    pub fn code(&self) -> &'static str {
        match self {
            TransitionError::AlreadyLoggedIn => "already_logged_in",
            TransitionError::MustLoginFirst => "must_login_first",
            TransitionError::AlreadyOnBreak => "already_on_break",
            TransitionError::NotOnBreak => "not_on_break",
            TransitionError::NotLoggedIn => "not_logged_in",
        }
    }
}

pub fn state_after(last: Option<EventKind>) -> WorkState {
    match last {
        Some(EventKind::ClockIn) | Some(EventKind::BreakEnd) => WorkState::OnFloor,
        Some(EventKind::BreakStart) => WorkState::OnBreak,
        Some(EventKind::ClockOut) | None => WorkState::LoggedOut,
    }
}

/// Events to append when `next` is requested after `last` on the same local day.
///
/// Clocking out while on break closes the break first, so the returned plan is
/// `[BreakEnd, ClockOut]` in that case.
pub fn plan_transition(
    last: Option<EventKind>,
    next: EventKind,
) -> Result<Vec<EventKind>, TransitionError> {
    match (state_after(last), next) {
        (WorkState::LoggedOut, EventKind::ClockIn) => Ok(vec![EventKind::ClockIn]),
        (WorkState::LoggedOut, EventKind::BreakStart) => Err(TransitionError::MustLoginFirst),
        (WorkState::LoggedOut, EventKind::BreakEnd) => Err(TransitionError::NotOnBreak),
        (WorkState::LoggedOut, EventKind::ClockOut) => Err(TransitionError::NotLoggedIn),

        (WorkState::OnFloor, EventKind::ClockIn) => Err(TransitionError::AlreadyLoggedIn),
        (WorkState::OnFloor, EventKind::BreakStart) => Ok(vec![EventKind::BreakStart]),
        (WorkState::OnFloor, EventKind::BreakEnd) => Err(TransitionError::NotOnBreak),
        (WorkState::OnFloor, EventKind::ClockOut) => Ok(vec![EventKind::ClockOut]),

        (WorkState::OnBreak, EventKind::ClockIn) => Err(TransitionError::AlreadyLoggedIn),
        (WorkState::OnBreak, EventKind::BreakStart) => Err(TransitionError::AlreadyOnBreak),
        (WorkState::OnBreak, EventKind::BreakEnd) => Ok(vec![EventKind::BreakEnd]),
        (WorkState::OnBreak, EventKind::ClockOut) => {
            Ok(vec![EventKind::BreakEnd, EventKind::ClockOut])
        }
    }
}

/// Elapsed floor and break time in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Durations {
    pub floor_ms: i64,
    pub break_ms: i64,
}

impl Durations {
    pub fn floor_minutes(&self) -> i64 {
        round_minutes(self.floor_ms)
    }

    pub fn break_minutes(&self) -> i64 {
        round_minutes(self.break_ms)
    }

    /// Sum of the rounded components, so floor + break always equals total.
    pub fn total_minutes(&self) -> i64 {
        self.floor_minutes() + self.break_minutes()
    }
}

fn round_minutes(ms: i64) -> i64 {
    (ms.max(0) + 30_000) / 60_000
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Derivation {
    pub durations: Durations,
    pub work_mode: Option<WorkMode>,
    pub first_clock_in: Option<DateTime<Utc>>,
    pub state: WorkState,
}

fn elapsed_ms(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    (to - from).num_milliseconds().max(0)
}

/// Walks one local day's events in order.
///
/// `open_until` is the current instant when the day is today; a session still
/// open at the end of the walk is extended to it. Historical days pass `None`
/// and an unterminated session only counts up to its last event.
pub fn derive(events: &[Event], open_until: Option<DateTime<Utc>>) -> Derivation {
    let mut durations = Durations::default();
    let mut floor_start: Option<DateTime<Utc>> = None;
    let mut break_start: Option<DateTime<Utc>> = None;
    let mut work_mode = None;
    let mut first_clock_in = None;

    for event in events {
        let t = event.timestamp;
        match event.kind {
            EventKind::ClockIn => {
                if floor_start.is_none() {
                    floor_start = Some(t);
                }
                if first_clock_in.is_none() {
                    first_clock_in = Some(t);
                }
                if work_mode.is_none() {
                    work_mode = event.work_mode;
                }
            }
            EventKind::BreakStart => {
                if let Some(start) = floor_start.take() {
                    durations.floor_ms += elapsed_ms(start, t);
                }
                break_start = Some(t);
            }
            EventKind::BreakEnd => {
                if let Some(start) = break_start.take() {
                    durations.break_ms += elapsed_ms(start, t);
                }
                floor_start = Some(t);
            }
            EventKind::ClockOut => {
                if let Some(start) = break_start.take() {
                    durations.break_ms += elapsed_ms(start, t);
                }
                if let Some(start) = floor_start.take() {
                    durations.floor_ms += elapsed_ms(start, t);
                }
            }
        }
    }

    if let Some(now) = open_until {
        if let Some(start) = floor_start {
            durations.floor_ms += elapsed_ms(start, now);
        }
        if let Some(start) = break_start {
            durations.break_ms += elapsed_ms(start, now);
        }
    }

    Derivation {
        durations,
        work_mode,
        first_clock_in,
        state: state_after(events.last().map(|event| event.kind)),
    }
}
