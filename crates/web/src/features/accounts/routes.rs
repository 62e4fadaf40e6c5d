use axum::{
    Router, middleware,
    routing::{get, post},
};

use super::handlers::{
    create_account, delete_account, get_account, issue_token, list_accounts, me, update_account,
};
use crate::middleware::auth::{RoleGuard, require_actor, require_auth};
use crate::state::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    let admin = Router::new()
        .route("/admin/accounts", get(list_accounts).post(create_account))
        .route(
            "/admin/accounts/:id",
            get(get_account).put(update_account).delete(delete_account),
        )
        .route("/admin/accounts/:id/token", post(issue_token))
        .route_layer(middleware::from_fn_with_state(
            state.api_keys.clone(),
            require_auth,
        ));

    let authenticated = Router::new()
        .route("/me", get(me))
        .route_layer(middleware::from_fn_with_state(
            RoleGuard::any(state.jwt.clone()),
            require_actor,
        ));

    admin.merge(authenticated)
}
