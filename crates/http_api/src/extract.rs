use attendance_core::User;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::errors::HttpError;

pub const TIMEZONE_OFFSET_HEADER: &str = "x-timezone-offset";

/// Minutes from the `x-timezone-offset` header, `None` when the header is absent.
#[derive(Debug, Clone, Copy)]
pub struct ClientOffset(pub Option<i32>);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for ClientOffset {
    type Rejection = HttpError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(TIMEZONE_OFFSET_HEADER) else {
            return Ok(Self(None));
        };
        let minutes = value
            .to_str()
            .ok()
            .and_then(|value| value.trim().parse::<i32>().ok())
            .ok_or_else(|| {
                HttpError::invalid_input(format!("invalid {} header", TIMEZONE_OFFSET_HEADER))
            })?;
        Ok(Self(Some(minutes)))
    }
}

/// The user resolved by the auth middleware.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = HttpError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| HttpError::unauthorized("authentication required"))
    }
}
