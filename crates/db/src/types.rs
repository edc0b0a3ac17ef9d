use attendance_core::{Event, EventKind, Leave, WorkMode};
use chrono::{DateTime, Utc};

/// An event not yet written to the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub kind: EventKind,
    pub timestamp: DateTime<Utc>,
    pub work_mode: Option<WorkMode>,
}

impl NewEvent {
    pub fn new(kind: EventKind, timestamp: DateTime<Utc>) -> Self {
        Self {
            kind,
            timestamp,
            work_mode: None,
        }
    }
}

/// Outcome of writing a whole day only when it has no entries and no leave.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DayInsert {
    Inserted(Vec<Event>),
    EntriesExist(i64),
    LeaveExists(Leave),
}

/// A user whose most recent event leaves a session open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenSession {
    pub user_id: i64,
    pub timezone_offset: Option<i32>,
    pub latest: Event,
}
