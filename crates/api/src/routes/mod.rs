//! API route definitions.

use axum::{Router, middleware};
use planbook_core::record::RecordKind;

use crate::{AppState, middleware::auth_middleware};

pub mod health;
pub mod records;

/// Creates the API router with protected routes that need state for middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .nest("/budgets", records::routes(RecordKind::Budget))
        .nest("/forecasts", records::routes(RecordKind::Forecast))
        .layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .merge(health::routes())
        .merge(protected_routes)
}
