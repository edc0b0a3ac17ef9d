use axum::{
    body::Body,
    extract::State,
    http::{Request, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};

use crate::{errors::HttpError, extract::AuthUser, state::HttpState};

fn bearer_token(req: &Request<Body>) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

pub async fn require_user(
    State(state): State<HttpState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, HttpError> {
    let Some(token) = bearer_token(&req) else {
        return Err(HttpError::unauthorized("missing bearer token"));
    };
    let user = app_api::authenticate(&state.context, token).map_err(|err| {
        tracing::debug!(error = %err, "rejected api token");
        HttpError::from(err)
    })?;
    req.extensions_mut().insert(AuthUser(user));
    Ok(next.run(req).await)
}
