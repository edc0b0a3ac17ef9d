mod support;

use attendance_core::{
    EventKind, EventSource, RangeQuery, TransitionError, aggregate_range, parse_local_date,
    plan_transition,
};
use attendance_db::{DayInsert, DbError, NewEvent};
use support::{insert_events, new_event, offset, setup_db, setup_user, ts};

#[derive(Debug)]
enum PlanError {
    Db(DbError),
    Transition(TransitionError),
}

impl From<DbError> for PlanError {
    fn from(err: DbError) -> Self {
        PlanError::Db(err)
    }
}

#[test]
fn events_are_listed_in_time_order_with_id_tiebreak() {
    let mut test_db = setup_db();
    let user = setup_user(&mut test_db.db, "ada");
    insert_events(
        &mut test_db.db,
        user.id,
        vec![
            new_event(EventKind::ClockIn, "2025-03-10T09:00:00Z"),
            new_event(EventKind::BreakStart, "2025-03-10T12:00:00Z"),
            new_event(EventKind::BreakEnd, "2025-03-10T17:00:00Z"),
            new_event(EventKind::ClockOut, "2025-03-10T17:00:00Z"),
        ],
    );

    let events = test_db
        .db
        .list_events_between(user.id, ts("2025-03-10T00:00:00Z"), ts("2025-03-11T00:00:00Z"))
        .expect("list");
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
    assert_eq!(events[0].work_mode, Some(attendance_core::WorkMode::Office));
    assert_eq!(events[1].work_mode, None);
}

#[test]
fn window_is_half_open_and_keeps_subsecond_events() {
    let mut test_db = setup_db();
    let user = setup_user(&mut test_db.db, "ada");
    insert_events(
        &mut test_db.db,
        user.id,
        vec![
            new_event(EventKind::ClockIn, "2025-03-10T23:59:59.500Z"),
            new_event(EventKind::ClockOut, "2025-03-11T00:00:00Z"),
        ],
    );
    let day = offset(0).day(parse_local_date("2025-03-10").expect("date"));
    let events = test_db
        .db
        .events_between(user.id, day.start, day.next_start)
        .expect("list");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].timestamp, ts("2025-03-10T23:59:59.500Z"));
}

#[test]
fn append_checked_rejects_without_writing() {
    let mut test_db = setup_db();
    let user = setup_user(&mut test_db.db, "ada");
    let day = offset(0).day(parse_local_date("2025-03-10").expect("date"));
    let at = ts("2025-03-10T09:00:00Z");

    let plan = |last: Option<&attendance_core::Event>, next: EventKind| {
        plan_transition(last.map(|event| event.kind), next)
            .map(|kinds| {
                kinds
                    .into_iter()
                    .map(|kind| NewEvent::new(kind, at))
                    .collect::<Vec<_>>()
            })
            .map_err(PlanError::Transition)
    };

    test_db
        .db
        .append_checked(user.id, &day, |last| plan(last, EventKind::ClockIn))
        .expect("clock in");
    test_db
        .db
        .append_checked(user.id, &day, |last| plan(last, EventKind::BreakStart))
        .expect("break start");
    let second = test_db
        .db
        .append_checked(user.id, &day, |last| plan(last, EventKind::BreakStart));
    assert!(matches!(
        second,
        Err(PlanError::Transition(TransitionError::AlreadyOnBreak))
    ));
    assert_eq!(
        test_db
            .db
            .count_events_between(user.id, day.start, day.next_start)
            .expect("count"),
        2
    );
}

#[test]
fn insert_day_if_vacant_reports_collisions() {
    let mut test_db = setup_db();
    let user = setup_user(&mut test_db.db, "ada");
    let ist = offset(-330);
    let date = parse_local_date("2025-03-10").expect("date");
    let day = ist.day(date);
    let events = vec![
        new_event(EventKind::ClockIn, "2025-03-10T03:30:00Z"),
        new_event(EventKind::ClockOut, "2025-03-10T12:30:00Z"),
    ];

    let first = test_db
        .db
        .insert_day_if_vacant(user.id, &day, &events)
        .expect("insert");
    assert!(matches!(first, DayInsert::Inserted(ref inserted) if inserted.len() == 2));

    let second = test_db
        .db
        .insert_day_if_vacant(user.id, &day, &events)
        .expect("insert again");
    assert_eq!(second, DayInsert::EntriesExist(2));

    let leave_date = parse_local_date("2025-03-11").expect("date");
    test_db
        .db
        .add_leave(user.id, leave_date, "sick", None)
        .expect("leave");
    let third = test_db
        .db
        .insert_day_if_vacant(user.id, &ist.day(leave_date), &[])
        .expect("insert on leave");
    assert!(matches!(third, DayInsert::LeaveExists(ref leave) if leave.leave_type == "sick"));
}

#[test]
fn delete_only_touches_the_requested_window() {
    let mut test_db = setup_db();
    let user = setup_user(&mut test_db.db, "ada");
    let other = setup_user(&mut test_db.db, "bob");
    insert_events(
        &mut test_db.db,
        user.id,
        vec![
            new_event(EventKind::ClockIn, "2025-03-10T09:00:00Z"),
            new_event(EventKind::ClockOut, "2025-03-10T17:00:00Z"),
            new_event(EventKind::ClockIn, "2025-03-11T09:00:00Z"),
        ],
    );
    insert_events(
        &mut test_db.db,
        other.id,
        vec![new_event(EventKind::ClockIn, "2025-03-10T09:00:00Z")],
    );

    let day = offset(0).day(parse_local_date("2025-03-10").expect("date"));
    let deleted = test_db
        .db
        .delete_events_between(user.id, day.start, day.next_start)
        .expect("delete");
    assert_eq!(deleted, 2);
    let again = test_db
        .db
        .delete_events_between(user.id, day.start, day.next_start)
        .expect("delete again");
    assert_eq!(again, 0);
    assert_eq!(
        test_db
            .db
            .count_events_between(other.id, day.start, day.next_start)
            .expect("count"),
        1
    );
}

#[test]
fn open_sessions_use_latest_event_per_user() {
    let mut test_db = setup_db();
    let closed = setup_user(&mut test_db.db, "closed");
    let open = setup_user(&mut test_db.db, "open");
    let idle = setup_user(&mut test_db.db, "idle");
    insert_events(
        &mut test_db.db,
        closed.id,
        vec![
            new_event(EventKind::ClockIn, "2025-03-10T09:00:00Z"),
            new_event(EventKind::ClockOut, "2025-03-10T17:00:00Z"),
        ],
    );
    insert_events(
        &mut test_db.db,
        open.id,
        vec![
            new_event(EventKind::ClockIn, "2025-03-10T09:00:00Z"),
            new_event(EventKind::BreakStart, "2025-03-10T12:00:00Z"),
        ],
    );
    test_db
        .db
        .set_timezone_offset(open.id, -330)
        .expect("offset");

    let sessions = test_db.db.users_with_open_session().expect("sessions");
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].user_id, open.id);
    assert_eq!(sessions[0].timezone_offset, Some(-330));
    assert_eq!(sessions[0].latest.kind, EventKind::BreakStart);
    assert!(sessions.iter().all(|session| session.user_id != idle.id));
}

#[test]
fn db_serves_as_event_source_for_range_aggregation() {
    let mut test_db = setup_db();
    let user = setup_user(&mut test_db.db, "ada");
    insert_events(
        &mut test_db.db,
        user.id,
        vec![
            new_event(EventKind::ClockIn, "2025-03-10T09:00:00Z"),
            new_event(EventKind::BreakStart, "2025-03-10T12:00:00Z"),
            new_event(EventKind::BreakEnd, "2025-03-10T12:30:00Z"),
            new_event(EventKind::ClockOut, "2025-03-10T17:30:00Z"),
        ],
    );
    let query = RangeQuery {
        user_id: user.id,
        from: parse_local_date("2025-03-09").expect("date"),
        to: parse_local_date("2025-03-11").expect("date"),
        offset: offset(0),
        now: ts("2025-03-20T00:00:00Z"),
    };
    let summaries = aggregate_range(&test_db.db, &query).expect("aggregate");
    assert_eq!(summaries.len(), 3);
    assert_eq!(summaries[1].floor_minutes, 480);
    assert_eq!(summaries[1].break_minutes, 30);
    assert_eq!(summaries[1].total_minutes, 510);
}
