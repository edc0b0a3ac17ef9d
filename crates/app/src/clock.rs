use attendance_core::TzOffset;
use chrono::{DateTime, Local, Offset, TimeZone, Utc};

/// Source of "now" for every time-dependent operation.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// The server's own offset at `now`, used when a client sends none.
    fn server_offset(&self) -> TzOffset {
        let now = self.now();
        let east_seconds = Local
            .offset_from_utc_datetime(&now.naive_utc())
            .fix()
            .local_minus_utc();
        TzOffset::from_minutes(-east_seconds / 60).unwrap_or(TzOffset::UTC)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to one instant, with a configurable server offset.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    pub now: DateTime<Utc>,
    pub server_offset: TzOffset,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now,
            server_offset: TzOffset::UTC,
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn server_offset(&self) -> TzOffset {
        self.server_offset
    }
}
