use std::collections::BTreeSet;

use attendance_core::TzOffset;
use attendance_db::OpenSession;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::services::event_log::EventLogService;
use crate::services::{SharedContext, open_db};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClosedDay {
    pub user_id: i64,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub scanned: usize,
    pub closed: Vec<ClosedDay>,
    pub failed: usize,
}

/// Closes sessions users forgot to end, at local 23:59:59 of the day they
/// were left open, using each user's cached offset.
#[derive(Clone)]
pub struct ReconcileService {
    ctx: SharedContext,
    event_log: EventLogService,
}

fn session_offset(session: &OpenSession) -> TzOffset {
    match session.timezone_offset.map(TzOffset::from_minutes) {
        Some(Ok(offset)) => offset,
        Some(Err(err)) => {
            tracing::warn!(
                user_id = session.user_id,
                error = %err,
                "stored offset ignored, using UTC"
            );
            TzOffset::UTC
        }
        None => TzOffset::UTC,
    }
}

/// Days strictly before today that may hold an unterminated session.
fn candidate_days(session: &OpenSession, offset: TzOffset, today: NaiveDate) -> Vec<NaiveDate> {
    let mut days = BTreeSet::new();
    days.insert(today - Duration::days(1));
    days.insert(offset.local_date(session.latest.timestamp));
    days.into_iter().filter(|date| *date < today).collect()
}

impl ReconcileService {
    pub(super) fn new(ctx: SharedContext, event_log: EventLogService) -> Self {
        Self { ctx, event_log }
    }

    pub fn run(&self) -> Result<ReconcileReport> {
        self.run_at(self.ctx.clock.now())
    }

    /// Safe to repeat: a day that already ends in a clock-out is left alone.
    pub fn run_at(&self, now: DateTime<Utc>) -> Result<ReconcileReport> {
        let sessions = open_db(&self.ctx)?.users_with_open_session()?;
        let mut report = ReconcileReport {
            scanned: sessions.len(),
            ..ReconcileReport::default()
        };
        for session in &sessions {
            let offset = session_offset(session);
            let today = offset.local_date(now);
            let mut user_failed = false;
            for date in candidate_days(session, offset, today) {
                match self.event_log.close_day(session.user_id, date, offset) {
                    Ok(appended) if appended.is_empty() => {}
                    Ok(appended) => {
                        tracing::info!(
                            user_id = session.user_id,
                            %date,
                            offset = offset.minutes(),
                            events = appended.len(),
                            "closed forgotten session"
                        );
                        report.closed.push(ClosedDay {
                            user_id: session.user_id,
                            date,
                        });
                    }
                    Err(err) => {
                        tracing::warn!(
                            user_id = session.user_id,
                            %date,
                            error = %err,
                            "failed to close session"
                        );
                        user_failed = true;
                    }
                }
            }
            if user_failed {
                report.failed += 1;
            }
        }
        tracing::info!(
            scanned = report.scanned,
            closed = report.closed.len(),
            failed = report.failed,
            "reconciliation finished"
        );
        Ok(report)
    }
}
