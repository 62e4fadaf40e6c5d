use axum::{
    Router, middleware,
    routing::{get, post},
};
use storage::models::Role;

use super::handlers::{
    accept_request, deny_request, end_with_trainer, end_with_user, get_request, get_trainer,
    get_user, init_partnership, list_requests, list_trainers, list_users, send_request,
    trainer_partnerships, user_partnerships,
};
use crate::middleware::auth::{RoleGuard, require_actor};
use crate::state::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    let user = Router::new()
        .route("/user/trainers", get(list_trainers))
        .route("/user/trainers/:trainer_id", get(get_trainer))
        .route("/user/trainers/:trainer_id/request", post(send_request))
        .route("/user/trainers/:trainer_id/end", post(end_with_trainer))
        .route("/user/partnerships", get(user_partnerships))
        .route_layer(middleware::from_fn_with_state(
            RoleGuard::new(state.jwt.clone(), Role::User),
            require_actor,
        ));

    let trainer = Router::new()
        .route("/trainer/partnerships", get(trainer_partnerships))
        .route("/trainer/users", get(list_users))
        .route("/trainer/users/:user_id", get(get_user))
        .route("/trainer/users/:user_id/partnership", post(init_partnership))
        .route("/trainer/users/:user_id/end", post(end_with_user))
        .route("/trainer/requests", get(list_requests))
        .route("/trainer/requests/:request_id", get(get_request))
        .route("/trainer/requests/:request_id/accept", post(accept_request))
        .route("/trainer/requests/:request_id/deny", post(deny_request))
        .route_layer(middleware::from_fn_with_state(
            RoleGuard::new(state.jwt.clone(), Role::Trainer),
            require_actor,
        ));

    user.merge(trainer)
}
