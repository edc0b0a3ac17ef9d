mod support;

use attendance_app::ClosedDay;
use attendance_core::{EventKind, WorkState, parse_local_date};
use support::{offset, setup_app, ts};

#[test]
fn forgotten_session_closes_at_users_local_midnight_eve() {
    // 14:30 UTC is 09:00 local for an offset of +330 (UTC-5:30).
    let app = setup_app("2025-03-10T14:30:00Z");
    let west = offset(330);
    app.state
        .services
        .tracker
        .clock_in(app.user_id, None, west)
        .expect("clock in");

    let report = app
        .state
        .services
        .reconcile
        .run_at(ts("2025-03-11T12:00:00Z"))
        .expect("reconcile");
    assert_eq!(report.scanned, 1);
    assert_eq!(report.failed, 0);
    let day = parse_local_date("2025-03-10").expect("date");
    assert_eq!(
        report.closed,
        vec![ClosedDay {
            user_id: app.user_id,
            date: day
        }]
    );

    let events = app
        .state
        .services
        .event_log
        .list_for_local_date(app.user_id, day, west)
        .expect("events");
    let last = events.last().expect("clock out");
    assert_eq!(last.kind, EventKind::ClockOut);
    assert_eq!(last.timestamp, ts("2025-03-11T05:29:59Z"));
}

#[test]
fn eastern_session_closes_before_the_utc_date_rolls_over() {
    // 03:30 UTC is 09:00 in IST (UTC+5:30, offset -330).
    let app = setup_app("2025-03-10T03:30:00Z");
    let ist = offset(-330);
    app.state
        .services
        .tracker
        .clock_in(app.user_id, None, ist)
        .expect("clock in");

    let report = app
        .state
        .services
        .reconcile
        .run_at(ts("2025-03-11T06:00:00Z"))
        .expect("reconcile");
    let day = parse_local_date("2025-03-10").expect("date");
    assert_eq!(
        report.closed,
        vec![ClosedDay {
            user_id: app.user_id,
            date: day
        }]
    );

    let events = app
        .state
        .services
        .event_log
        .list_for_local_date(app.user_id, day, ist)
        .expect("events");
    assert_eq!(events.len(), 2);
    assert_eq!(events[1].kind, EventKind::ClockOut);
    assert_eq!(events[1].timestamp, ts("2025-03-10T18:29:59Z"));
}

#[test]
fn reconciliation_is_idempotent() {
    let app = setup_app("2025-03-10T09:00:00Z");
    let utc = offset(0);
    app.state
        .services
        .tracker
        .clock_in(app.user_id, None, utc)
        .expect("clock in");
    let reconcile = &app.state.services.reconcile;
    let now = ts("2025-03-11T08:00:00Z");

    let first = reconcile.run_at(now).expect("first run");
    assert_eq!(first.closed.len(), 1);
    let second = reconcile.run_at(now).expect("second run");
    assert_eq!(second.scanned, 0);
    assert!(second.closed.is_empty());

    let day = parse_local_date("2025-03-10").expect("date");
    let events = app
        .state
        .services
        .event_log
        .list_for_local_date(app.user_id, day, utc)
        .expect("events");
    assert_eq!(events.len(), 2);
}

#[test]
fn open_break_is_ended_before_the_synthetic_clock_out() {
    let app = setup_app("2025-03-10T09:00:00Z");
    let utc = offset(0);
    let tracker = &app.state.services.tracker;
    tracker.clock_in(app.user_id, None, utc).expect("clock in");
    app.at("2025-03-10T16:00:00Z");
    tracker.break_start(app.user_id, utc).expect("break");

    app.at("2025-03-11T07:00:00Z");
    let report = app.state.services.reconcile.run().expect("reconcile");
    assert_eq!(report.closed.len(), 1);

    let day = parse_local_date("2025-03-10").expect("date");
    let events = app
        .state
        .services
        .event_log
        .list_for_local_date(app.user_id, day, utc)
        .expect("events");
    let kinds: Vec<_> = events.iter().map(|event| event.kind).collect();
    assert_eq!(
        kinds,
        vec![
            EventKind::ClockIn,
            EventKind::BreakStart,
            EventKind::BreakEnd,
            EventKind::ClockOut
        ]
    );
    assert_eq!(events[2].timestamp, events[3].timestamp);
    assert_eq!(events[3].timestamp, ts("2025-03-10T23:59:59Z"));

    let history = app
        .state
        .services
        .reports
        .analytics(app.user_id, Some(2), utc)
        .expect("analytics");
    assert_eq!(history[0].floor_minutes, 420);
    assert_eq!(history[0].break_minutes, 480);
}

#[test]
fn session_open_today_is_left_alone() {
    let app = setup_app("2025-03-10T09:00:00Z");
    let utc = offset(0);
    app.state
        .services
        .tracker
        .clock_in(app.user_id, None, utc)
        .expect("clock in");
    app.at("2025-03-10T18:00:00Z");
    let report = app.state.services.reconcile.run().expect("reconcile");
    assert_eq!(report.scanned, 1);
    assert!(report.closed.is_empty());
    let status = app
        .state
        .services
        .tracker
        .status(app.user_id, utc)
        .expect("status");
    assert_eq!(status.state, WorkState::OnFloor);
}

#[test]
fn session_left_open_for_days_closes_its_own_day() {
    let app = setup_app("2025-03-10T09:00:00Z");
    let utc = offset(0);
    app.state
        .services
        .tracker
        .clock_in(app.user_id, None, utc)
        .expect("clock in");
    let report = app
        .state
        .services
        .reconcile
        .run_at(ts("2025-03-14T09:00:00Z"))
        .expect("reconcile");
    assert_eq!(report.closed.len(), 1);
    assert_eq!(
        report.closed[0].date,
        parse_local_date("2025-03-10").expect("date")
    );
}

#[test]
fn users_without_cached_offset_reconcile_in_utc() {
    let app = setup_app("2025-03-12T09:00:00Z");
    let log = &app.state.services.event_log;
    log.append(
        app.user_id,
        EventKind::ClockIn,
        Some(ts("2025-03-11T09:00:00Z")),
        None,
        offset(0),
    )
    .expect("append");
    let report = app.state.services.reconcile.run().expect("reconcile");
    assert_eq!(report.closed.len(), 1);
    let latest = app
        .state
        .open_db()
        .expect("db")
        .latest_event(app.user_id)
        .expect("latest")
        .expect("event");
    assert_eq!(latest.timestamp, ts("2025-03-11T23:59:59Z"));
}
