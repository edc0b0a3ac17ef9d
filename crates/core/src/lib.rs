pub mod aggregate;
pub mod derive;
pub mod tz;
pub mod widgets;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub use aggregate::{
    DailySummary, EventSource, RangeQuery, RangeTotals, aggregate_range, range_totals,
    summarize_buckets, summarize_day,
};
pub use derive::{
    Derivation, Durations, TransitionError, WorkState, derive, plan_transition, state_after,
};
pub use tz::{LocalDay, TzError, TzOffset, parse_local_date, parse_local_time};
pub use widgets::{
    FLOOR_TARGET_MINUTES, LeaveOverlapPolicy, WeeklyDay, Widgets, compute_widgets, week_dates,
    weekly_chart,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    ClockIn,
    BreakStart,
    BreakEnd,
    ClockOut,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::ClockIn => "clock_in",
            EventKind::BreakStart => "break_start",
            EventKind::BreakEnd => "break_end",
            EventKind::ClockOut => "clock_out",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "clock_in" => Some(EventKind::ClockIn),
            "break_start" => Some(EventKind::BreakStart),
            "break_end" => Some(EventKind::BreakEnd),
            "clock_out" => Some(EventKind::ClockOut),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkMode {
    #[default]
    Office,
    Remote,
}

impl WorkMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkMode::Office => "office",
            WorkMode::Remote => "remote",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "office" => Some(WorkMode::Office),
            "remote" => Some(WorkMode::Remote),
            _ => None,
        }
    }
}

/// One immutable clock transition as stored in the event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub user_id: i64,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_mode: Option<WorkMode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub timezone_offset: Option<i32>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leave {
    pub id: i64,
    pub user_id: i64,
    pub date: NaiveDate,
    pub leave_type: String,
    pub reason: Option<String>,
}

pub const LEAVE_TYPES: &[&str] = &["sick", "holiday", "planned", "personal", "other"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_kind_round_trips_db_names() {
        for kind in [
            EventKind::ClockIn,
            EventKind::BreakStart,
            EventKind::BreakEnd,
            EventKind::ClockOut,
        ] {
            assert_eq!(EventKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(EventKind::parse("lunch"), None);
    }

    #[test]
    fn event_serializes_kind_as_type() {
        let event = Event {
            id: 1,
            user_id: 7,
            kind: EventKind::ClockIn,
            timestamp: "2025-03-10T09:00:00Z".parse().expect("ts"),
            work_mode: Some(WorkMode::Remote),
        };
        let value = serde_json::to_value(&event).expect("json");
        assert_eq!(value["type"], "clock_in");
        assert_eq!(value["work_mode"], "remote");
    }
}
