use axum::{Router, middleware, routing::get};
use storage::models::Role;

use super::handlers::{
    create_trainer_workout, create_user_workout, delete_workout, get_workout,
    list_trainer_workouts, list_user_workouts, list_user_workouts_for_trainer, update_workout,
};
use crate::middleware::auth::{RoleGuard, require_actor};
use crate::state::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    let user = Router::new()
        .route(
            "/user/workouts",
            get(list_user_workouts).post(create_user_workout),
        )
        .route_layer(middleware::from_fn_with_state(
            RoleGuard::new(state.jwt.clone(), Role::User),
            require_actor,
        ));

    let trainer = Router::new()
        .route(
            "/trainer/workouts",
            get(list_trainer_workouts).post(create_trainer_workout),
        )
        .route(
            "/trainer/users/:user_id/workouts",
            get(list_user_workouts_for_trainer),
        )
        .route_layer(middleware::from_fn_with_state(
            RoleGuard::new(state.jwt.clone(), Role::Trainer),
            require_actor,
        ));

    // Owner or assigning trainer; checked per workout.
    let shared = Router::new()
        .route(
            "/workouts/:id",
            get(get_workout).put(update_workout).delete(delete_workout),
        )
        .route_layer(middleware::from_fn_with_state(
            RoleGuard::any(state.jwt.clone()),
            require_actor,
        ));

    user.merge(trainer).merge(shared)
}
