mod errors;
mod extract;
mod handlers;
mod middleware;
mod state;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};

pub use errors::HttpError;
pub use extract::{AuthUser, ClientOffset, TIMEZONE_OFFSET_HEADER};
pub use state::HttpState;

pub fn router(state: HttpState) -> Router<()> {
    let tracker = Router::new()
        .route("/status", get(handlers::status))
        .route("/clock-in", post(handlers::clock_in))
        .route("/break-start", post(handlers::break_start))
        .route("/break-end", post(handlers::break_end))
        .route("/clock-out", post(handlers::clock_out))
        .route("/history", get(handlers::history))
        .route("/analytics", get(handlers::analytics))
        .route("/totals", get(handlers::totals))
        .route("/weekly", get(handlers::weekly))
        .route("/widgets", get(handlers::widgets))
        .route("/manual-entry", post(handlers::manual_entry))
        .route(
            "/entries/:date",
            get(handlers::entries).delete(handlers::delete_entries),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_user,
        ));

    let api = Router::new()
        .route("/health", get(handlers::health))
        .nest("/tracker", tracker);

    Router::new()
        .nest("/api", api)
        .fallback(handlers::not_found)
        .with_state(state)
}
