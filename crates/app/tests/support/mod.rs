#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use attendance_app::{AppConfig, AppState, Clock};
use attendance_core::{LeaveOverlapPolicy, TzOffset};
use chrono::{DateTime, Utc};
use tempfile::TempDir;

/// A clock tests can move forward.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().expect("clock lock") = now;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock lock")
    }

    fn server_offset(&self) -> TzOffset {
        TzOffset::UTC
    }
}

pub struct TestApp {
    pub _dir: TempDir,
    pub state: AppState,
    pub clock: Arc<ManualClock>,
    pub user_id: i64,
}

impl TestApp {
    pub fn at(&self, now: &str) -> &Self {
        self.clock.set(ts(now));
        self
    }
}

pub fn setup_app(now: &str) -> TestApp {
    setup_app_with_policy(now, LeaveOverlapPolicy::default())
}

pub fn setup_app_with_policy(now: &str, leave_overlap: LeaveOverlapPolicy) -> TestApp {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut config = AppConfig::new(dir.path().join("app.sqlite"));
    config.leave_overlap = leave_overlap;
    let clock = Arc::new(ManualClock::new(ts(now)));
    let state = AppState::with_clock(config, clock.clone());
    state.initialize().expect("initialize");
    let created = state.services.users.create("ada").expect("create user");
    TestApp {
        _dir: dir,
        state,
        clock,
        user_id: created.user.id,
    }
}

pub fn ts(value: &str) -> DateTime<Utc> {
    value.parse().expect("timestamp")
}

pub fn offset(minutes: i32) -> TzOffset {
    TzOffset::from_minutes(minutes).expect("offset")
}
