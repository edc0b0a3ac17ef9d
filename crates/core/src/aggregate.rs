use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::derive::{WorkState, derive};
use crate::tz::{TzOffset, dates_between};
use crate::{Event, WorkMode};

/// Read access to a user's committed events.
pub trait EventSource {
    type Error;

    /// Events with `start <= timestamp < end`, ascending.
    fn events_between(
        &self,
        user_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Event>, Self::Error>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    pub date: NaiveDate,
    pub floor_minutes: i64,
    pub break_minutes: i64,
    pub total_minutes: i64,
    pub work_mode: WorkMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<WorkState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_clock_in: Option<DateTime<Utc>>,
}

impl DailySummary {
    pub fn clocked_in(&self) -> bool {
        self.first_clock_in.is_some()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RangeQuery {
    pub user_id: i64,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub offset: TzOffset,
    pub now: DateTime<Utc>,
}

/// Summarizes one local day. The day equal to today (in `offset`) is
/// open-ended and carries a live state.
pub fn summarize_day(
    date: NaiveDate,
    events: &[Event],
    offset: TzOffset,
    now: DateTime<Utc>,
) -> DailySummary {
    let is_today = date == offset.local_date(now);
    let derived = derive(events, is_today.then_some(now));
    DailySummary {
        date,
        floor_minutes: derived.durations.floor_minutes(),
        break_minutes: derived.durations.break_minutes(),
        total_minutes: derived.durations.total_minutes(),
        work_mode: derived.work_mode.unwrap_or_default(),
        state: is_today.then_some(derived.state),
        first_clock_in: derived.first_clock_in,
    }
}

/// Buckets an already fetched, ordered event list by local date and emits one
/// summary per date in `from..=to`, including days without events.
pub fn summarize_buckets(
    events: Vec<Event>,
    from: NaiveDate,
    to: NaiveDate,
    offset: TzOffset,
    now: DateTime<Utc>,
) -> Vec<DailySummary> {
    let mut buckets: BTreeMap<NaiveDate, Vec<Event>> = BTreeMap::new();
    for event in events {
        buckets
            .entry(offset.local_date(event.timestamp))
            .or_default()
            .push(event);
    }
    dates_between(from, to)
        .into_iter()
        .map(|date| {
            let day_events = buckets.get(&date).map(Vec::as_slice).unwrap_or(&[]);
            summarize_day(date, day_events, offset, now)
        })
        .collect()
}

/// One fetch for the whole range, then per-day derivation.
pub fn aggregate_range<S: EventSource>(
    source: &S,
    query: &RangeQuery,
) -> Result<Vec<DailySummary>, S::Error> {
    if query.from > query.to {
        return Ok(Vec::new());
    }
    let start = query.offset.day(query.from).start;
    let end = query.offset.day(query.to).next_start;
    let events = source.events_between(query.user_id, start, end)?;
    Ok(summarize_buckets(
        events,
        query.from,
        query.to,
        query.offset,
        query.now,
    ))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeTotals {
    pub days: usize,
    pub active_days: usize,
    pub floor_minutes: i64,
    pub break_minutes: i64,
    pub total_minutes: i64,
    pub avg_floor_minutes: i64,
}

pub fn range_totals(summaries: &[DailySummary]) -> RangeTotals {
    let mut totals = RangeTotals {
        days: summaries.len(),
        ..RangeTotals::default()
    };
    for summary in summaries {
        if summary.clocked_in() {
            totals.active_days += 1;
        }
        totals.floor_minutes += summary.floor_minutes;
        totals.break_minutes += summary.break_minutes;
        totals.total_minutes += summary.total_minutes;
    }
    if totals.active_days > 0 {
        totals.avg_floor_minutes =
            (totals.floor_minutes as f64 / totals.active_days as f64).round() as i64;
    }
    totals
}
