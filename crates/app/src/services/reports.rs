use attendance_core::{
    DailySummary, RangeQuery, RangeTotals, TzOffset, WeeklyDay, Widgets, aggregate_range,
    compute_widgets, range_totals, week_dates, weekly_chart,
};
use attendance_db::Db;
use chrono::{Datelike, Duration, NaiveDate};

use crate::config::RangeParams;
use crate::error::Result;
use crate::services::{SharedContext, open_db};
use crate::util::time::{resolve_days, resolve_history_range, trailing_window};

/// Trailing window the dashboard widgets look at.
const WIDGET_WINDOW_DAYS: i64 = 30;

/// Read-only range views built on one event fetch per request.
#[derive(Clone)]
pub struct ReportsService {
    ctx: SharedContext,
}

impl ReportsService {
    pub(super) fn new(ctx: SharedContext) -> Self {
        Self { ctx }
    }

    fn db(&self) -> Result<Db> {
        open_db(&self.ctx)
    }

    fn summaries(
        &self,
        db: &Db,
        user_id: i64,
        from: NaiveDate,
        to: NaiveDate,
        offset: TzOffset,
    ) -> Result<Vec<DailySummary>> {
        let query = RangeQuery {
            user_id,
            from,
            to,
            offset,
            now: self.ctx.clock.now(),
        };
        Ok(aggregate_range(db, &query)?)
    }

    fn today(&self, offset: TzOffset) -> NaiveDate {
        offset.local_date(self.ctx.clock.now())
    }

    /// One summary per local date in the requested window, empty days included.
    pub fn history(
        &self,
        user_id: i64,
        params: &RangeParams,
        offset: TzOffset,
    ) -> Result<Vec<DailySummary>> {
        let (from, to) = resolve_history_range(params, self.today(offset))?;
        let db = self.db()?;
        self.summaries(&db, user_id, from, to, offset)
    }

    /// Fixed-length window ending today, oldest first.
    pub fn analytics(
        &self,
        user_id: i64,
        days: Option<u32>,
        offset: TzOffset,
    ) -> Result<Vec<DailySummary>> {
        let days = resolve_days(days)?;
        let (from, to) = trailing_window(self.today(offset), days);
        let db = self.db()?;
        self.summaries(&db, user_id, from, to, offset)
    }

    pub fn totals(&self, user_id: i64, days: Option<u32>, offset: TzOffset) -> Result<RangeTotals> {
        let summaries = self.analytics(user_id, days, offset)?;
        Ok(range_totals(&summaries))
    }

    /// Monday through Sunday of the current local week.
    pub fn weekly(&self, user_id: i64, offset: TzOffset) -> Result<Vec<WeeklyDay>> {
        let today = self.today(offset);
        let week = week_dates(today);
        let (Some(&monday), Some(&sunday)) = (week.first(), week.last()) else {
            return Ok(Vec::new());
        };
        let db = self.db()?;
        let summaries = self.summaries(&db, user_id, monday, sunday, offset)?;
        Ok(weekly_chart(&summaries, today))
    }

    pub fn widgets(&self, user_id: i64, offset: TzOffset) -> Result<Widgets> {
        let today = self.today(offset);
        let from = today - Duration::days(WIDGET_WINDOW_DAYS);
        let month_start = today.with_day(1).unwrap_or(today);
        let db = self.db()?;
        let summaries = self.summaries(&db, user_id, from, today, offset)?;
        let leaves = db.leave_dates_between(user_id, from.min(month_start), today)?;
        Ok(compute_widgets(
            &summaries,
            &leaves,
            today,
            offset,
            self.ctx.config.leave_overlap,
        ))
    }
}
