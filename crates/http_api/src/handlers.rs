use axum::{
    body::Bytes,
    extract::{
        Json, Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};

use app_api::{AppContext, ClockInRequest, DaysRequest, HistoryRequest, ManualEntryRequest};

use crate::{
    errors::HttpError,
    extract::{AuthUser, ClientOffset},
    state::HttpState,
};

fn query<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, HttpError> {
    query
        .map(|Query(value)| value)
        .map_err(|err| HttpError::invalid_input(err.body_text()))
}

fn json<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, HttpError> {
    body.map(|Json(value)| value)
        .map_err(|err| HttpError::invalid_input(err.body_text()))
}

/// App calls hit sqlite and may wait on a per-user lock, so they run on the
/// blocking pool.
async fn blocking<T, F>(state: &HttpState, call: F) -> Result<Json<T>, HttpError>
where
    F: FnOnce(&AppContext) -> attendance_app::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let context = state.context.clone();
    let value = tokio::task::spawn_blocking(move || call(&context))
        .await
        .map_err(|err| {
            HttpError::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string(), None)
        })??;
    Ok(Json(value))
}

pub async fn health(State(state): State<HttpState>) -> impl IntoResponse {
    Json(app_api::health(&state.context))
}

pub async fn status(
    State(state): State<HttpState>,
    AuthUser(user): AuthUser,
    ClientOffset(offset): ClientOffset,
) -> Result<impl IntoResponse, HttpError> {
    blocking(&state, move |ctx| app_api::status(ctx, user.id, offset)).await
}

/// An empty body clocks in from the office; anything else must be a valid
/// request.
pub async fn clock_in(
    State(state): State<HttpState>,
    AuthUser(user): AuthUser,
    ClientOffset(offset): ClientOffset,
    body: Bytes,
) -> Result<impl IntoResponse, HttpError> {
    let req = if body.iter().all(u8::is_ascii_whitespace) {
        ClockInRequest::default()
    } else {
        json(Json::<ClockInRequest>::from_bytes(&body))?
    };
    blocking(&state, move |ctx| app_api::clock_in(ctx, user.id, offset, req)).await
}

pub async fn break_start(
    State(state): State<HttpState>,
    AuthUser(user): AuthUser,
    ClientOffset(offset): ClientOffset,
) -> Result<impl IntoResponse, HttpError> {
    blocking(&state, move |ctx| app_api::break_start(ctx, user.id, offset)).await
}

pub async fn break_end(
    State(state): State<HttpState>,
    AuthUser(user): AuthUser,
    ClientOffset(offset): ClientOffset,
) -> Result<impl IntoResponse, HttpError> {
    blocking(&state, move |ctx| app_api::break_end(ctx, user.id, offset)).await
}

pub async fn clock_out(
    State(state): State<HttpState>,
    AuthUser(user): AuthUser,
    ClientOffset(offset): ClientOffset,
) -> Result<impl IntoResponse, HttpError> {
    blocking(&state, move |ctx| app_api::clock_out(ctx, user.id, offset)).await
}

pub async fn history(
    State(state): State<HttpState>,
    AuthUser(user): AuthUser,
    ClientOffset(offset): ClientOffset,
    req: Result<Query<HistoryRequest>, QueryRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let req = query(req)?;
    blocking(&state, move |ctx| app_api::history(ctx, user.id, offset, req)).await
}

pub async fn analytics(
    State(state): State<HttpState>,
    AuthUser(user): AuthUser,
    ClientOffset(offset): ClientOffset,
    req: Result<Query<DaysRequest>, QueryRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let req = query(req)?;
    blocking(&state, move |ctx| app_api::analytics(ctx, user.id, offset, req)).await
}

pub async fn totals(
    State(state): State<HttpState>,
    AuthUser(user): AuthUser,
    ClientOffset(offset): ClientOffset,
    req: Result<Query<DaysRequest>, QueryRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let req = query(req)?;
    blocking(&state, move |ctx| app_api::totals(ctx, user.id, offset, req)).await
}

pub async fn weekly(
    State(state): State<HttpState>,
    AuthUser(user): AuthUser,
    ClientOffset(offset): ClientOffset,
) -> Result<impl IntoResponse, HttpError> {
    blocking(&state, move |ctx| app_api::weekly(ctx, user.id, offset)).await
}

pub async fn widgets(
    State(state): State<HttpState>,
    AuthUser(user): AuthUser,
    ClientOffset(offset): ClientOffset,
) -> Result<impl IntoResponse, HttpError> {
    blocking(&state, move |ctx| app_api::widgets(ctx, user.id, offset)).await
}

pub async fn manual_entry(
    State(state): State<HttpState>,
    AuthUser(user): AuthUser,
    ClientOffset(offset): ClientOffset,
    body: Result<Json<ManualEntryRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let req = json(body)?;
    blocking(&state, move |ctx| app_api::manual_entry(ctx, user.id, offset, req)).await
}

pub async fn entries(
    State(state): State<HttpState>,
    AuthUser(user): AuthUser,
    ClientOffset(offset): ClientOffset,
    Path(date): Path<String>,
) -> Result<impl IntoResponse, HttpError> {
    blocking(&state, move |ctx| app_api::entries(ctx, user.id, offset, &date)).await
}

pub async fn delete_entries(
    State(state): State<HttpState>,
    AuthUser(user): AuthUser,
    ClientOffset(offset): ClientOffset,
    Path(date): Path<String>,
) -> Result<impl IntoResponse, HttpError> {
    blocking(&state, move |ctx| app_api::delete_entries(ctx, user.id, offset, &date)).await
}

pub async fn not_found() -> HttpError {
    HttpError::new(
        StatusCode::NOT_FOUND,
        "route not found",
        Some("not_found".to_string()),
    )
}
