use axum::Router;

use crate::state::AppState;

pub mod accounts;
pub mod partnerships;
pub mod workouts;

/// Every API route, relative to `/api`.
pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(accounts::routes::routes(state))
        .merge(partnerships::routes::routes(state))
        .merge(workouts::routes::routes(state))
}
