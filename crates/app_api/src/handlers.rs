use attendance_app::{
    ActionOutcome, DeleteOutcome, NewUser, RangeParams, ReconcileReport, Result, StatusReport,
};
use attendance_core::{DailySummary, Event, Leave, RangeTotals, TzOffset, User, Widgets};
use chrono::SecondsFormat;

use crate::{
    AddLeaveRequest, AppContext, ClockInRequest, CreateUserRequest, DaysRequest, HealthResponse,
    HistoryRequest, ManualEntryRequest, WeeklyResponse,
};

fn offset(ctx: &AppContext, client_minutes: Option<i32>) -> Result<TzOffset> {
    ctx.app_state.resolve_offset(client_minutes)
}

pub fn health(ctx: &AppContext) -> HealthResponse {
    HealthResponse {
        status: "ok",
        time: ctx
            .app_state
            .clock
            .now()
            .to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}

pub fn authenticate(ctx: &AppContext, api_token: &str) -> Result<User> {
    ctx.app_state.services.users.authenticate(api_token)
}

pub fn status(
    ctx: &AppContext,
    user_id: i64,
    client_offset: Option<i32>,
) -> Result<StatusReport> {
    let offset = offset(ctx, client_offset)?;
    ctx.app_state.services.tracker.status(user_id, offset)
}

pub fn clock_in(
    ctx: &AppContext,
    user_id: i64,
    client_offset: Option<i32>,
    req: ClockInRequest,
) -> Result<ActionOutcome> {
    let offset = offset(ctx, client_offset)?;
    ctx.app_state
        .services
        .tracker
        .clock_in(user_id, req.work_mode, offset)
}

pub fn break_start(
    ctx: &AppContext,
    user_id: i64,
    client_offset: Option<i32>,
) -> Result<ActionOutcome> {
    let offset = offset(ctx, client_offset)?;
    ctx.app_state.services.tracker.break_start(user_id, offset)
}

pub fn break_end(
    ctx: &AppContext,
    user_id: i64,
    client_offset: Option<i32>,
) -> Result<ActionOutcome> {
    let offset = offset(ctx, client_offset)?;
    ctx.app_state.services.tracker.break_end(user_id, offset)
}

pub fn clock_out(
    ctx: &AppContext,
    user_id: i64,
    client_offset: Option<i32>,
) -> Result<ActionOutcome> {
    let offset = offset(ctx, client_offset)?;
    ctx.app_state.services.tracker.clock_out(user_id, offset)
}

pub fn history(
    ctx: &AppContext,
    user_id: i64,
    client_offset: Option<i32>,
    req: HistoryRequest,
) -> Result<Vec<DailySummary>> {
    let offset = offset(ctx, client_offset)?;
    let params = RangeParams {
        from: req.from,
        to: req.to,
    };
    ctx.app_state
        .services
        .reports
        .history(user_id, &params, offset)
}

pub fn analytics(
    ctx: &AppContext,
    user_id: i64,
    client_offset: Option<i32>,
    req: DaysRequest,
) -> Result<Vec<DailySummary>> {
    let offset = offset(ctx, client_offset)?;
    ctx.app_state
        .services
        .reports
        .analytics(user_id, req.days, offset)
}

pub fn totals(
    ctx: &AppContext,
    user_id: i64,
    client_offset: Option<i32>,
    req: DaysRequest,
) -> Result<RangeTotals> {
    let offset = offset(ctx, client_offset)?;
    ctx.app_state
        .services
        .reports
        .totals(user_id, req.days, offset)
}

pub fn weekly(
    ctx: &AppContext,
    user_id: i64,
    client_offset: Option<i32>,
) -> Result<WeeklyResponse> {
    let offset = offset(ctx, client_offset)?;
    let days = ctx.app_state.services.reports.weekly(user_id, offset)?;
    Ok(WeeklyResponse { days })
}

pub fn widgets(
    ctx: &AppContext,
    user_id: i64,
    client_offset: Option<i32>,
) -> Result<Widgets> {
    let offset = offset(ctx, client_offset)?;
    ctx.app_state.services.reports.widgets(user_id, offset)
}

/// The body's `timezoneOffset` takes precedence over the header offset.
pub fn manual_entry(
    ctx: &AppContext,
    user_id: i64,
    client_offset: Option<i32>,
    req: ManualEntryRequest,
) -> Result<ActionOutcome> {
    let offset = offset(ctx, req.timezone_offset.or(client_offset))?;
    let entry = req.into_entry();
    ctx.app_state
        .services
        .tracker
        .manual_entry(user_id, &entry, offset)
}

pub fn entries(
    ctx: &AppContext,
    user_id: i64,
    client_offset: Option<i32>,
    date: &str,
) -> Result<Vec<Event>> {
    let offset = offset(ctx, client_offset)?;
    ctx.app_state.services.tracker.entries(user_id, date, offset)
}

pub fn delete_entries(
    ctx: &AppContext,
    user_id: i64,
    client_offset: Option<i32>,
    date: &str,
) -> Result<DeleteOutcome> {
    let offset = offset(ctx, client_offset)?;
    ctx.app_state
        .services
        .tracker
        .delete_day(user_id, date, offset)
}

pub fn reconcile(ctx: &AppContext) -> Result<ReconcileReport> {
    ctx.app_state.services.reconcile.run()
}

pub fn create_user(ctx: &AppContext, req: CreateUserRequest) -> Result<NewUser> {
    ctx.app_state.services.users.create(&req.username)
}

pub fn add_leave(ctx: &AppContext, req: AddLeaveRequest) -> Result<Leave> {
    ctx.app_state.services.users.record_leave(
        req.user_id,
        &req.date,
        &req.leave_type,
        req.reason.as_deref(),
    )
}
