#![allow(dead_code)]

use std::path::PathBuf;

use attendance_core::{EventKind, TzOffset, User, WorkMode};
use attendance_db::{Db, NewEvent};
use chrono::{DateTime, Utc};
use tempfile::TempDir;

pub struct TestDb {
    pub _dir: TempDir,
    pub db: Db,
    pub path: PathBuf,
}

pub fn setup_db() -> TestDb {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("test.sqlite");
    let mut db = Db::open(&path).expect("open db");
    db.migrate().expect("migrate db");
    TestDb {
        _dir: dir,
        db,
        path,
    }
}

pub fn setup_user(db: &mut Db, name: &str) -> User {
    db.create_user(name, &format!("token-{name}"))
        .expect("create user")
}

pub fn ts(value: &str) -> DateTime<Utc> {
    value.parse().expect("timestamp")
}

pub fn offset(minutes: i32) -> TzOffset {
    TzOffset::from_minutes(minutes).expect("offset")
}

pub fn new_event(kind: EventKind, at: &str) -> NewEvent {
    let mut event = NewEvent::new(kind, ts(at));
    if kind == EventKind::ClockIn {
        event.work_mode = Some(WorkMode::Office);
    }
    event
}

pub fn insert_events(db: &mut Db, user_id: i64, events: Vec<NewEvent>) {
    db.insert_events(user_id, &events).expect("insert events");
}
