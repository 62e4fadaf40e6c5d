use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{
    dto::workout::{
        CreateTrainerWorkoutRequest, CreateUserWorkoutRequest, UpdateWorkoutRequest,
        WorkoutsResponse,
    },
    models::{Workout, WorkoutUpdate},
};
use validator::Validate;

use crate::error::WebError;
use crate::middleware::auth::Actor;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/user/workouts",
    security(
        ("jwt" = [])
    ),
    responses(
        (status = 200, description = "Workouts of the user, newest first", body = WorkoutsResponse)
    ),
    tag = "user"
)]
pub async fn list_user_workouts(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<WorkoutsResponse>, WebError> {
    let workouts = state.services.workouts.user_workouts(actor.id).await?;

    Ok(Json(WorkoutsResponse { workouts }))
}

#[utoipa::path(
    post,
    path = "/api/user/workouts",
    request_body = CreateUserWorkoutRequest,
    security(
        ("jwt" = [])
    ),
    responses(
        (status = 201, description = "Workout created", body = Workout),
        (status = 400, description = "Validation error or trainer id is not a trainer")
    ),
    tag = "user"
)]
pub async fn create_user_workout(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<CreateUserWorkoutRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let workout = state
        .services
        .workouts
        .create_workout_as_user(req.into_new_workout(actor.id))
        .await?;

    Ok((StatusCode::CREATED, Json(workout)).into_response())
}

#[utoipa::path(
    get,
    path = "/api/trainer/workouts",
    security(
        ("jwt" = [])
    ),
    responses(
        (status = 200, description = "Workouts assigned by the trainer, newest first", body = WorkoutsResponse)
    ),
    tag = "trainer"
)]
pub async fn list_trainer_workouts(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<WorkoutsResponse>, WebError> {
    let workouts = state.services.workouts.trainer_workouts(actor.id).await?;

    Ok(Json(WorkoutsResponse { workouts }))
}

#[utoipa::path(
    get,
    path = "/api/trainer/users/{user_id}/workouts",
    params(
        ("user_id" = i64, Path, description = "User account id")
    ),
    security(
        ("jwt" = [])
    ),
    responses(
        (status = 200, description = "Workouts the trainer assigned to this user", body = WorkoutsResponse)
    ),
    tag = "trainer"
)]
pub async fn list_user_workouts_for_trainer(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(user_id): Path<i64>,
) -> Result<Json<WorkoutsResponse>, WebError> {
    let workouts = state
        .services
        .workouts
        .trainer_workouts_with_user(actor.id, user_id)
        .await?;

    Ok(Json(WorkoutsResponse { workouts }))
}

#[utoipa::path(
    post,
    path = "/api/trainer/workouts",
    request_body = CreateTrainerWorkoutRequest,
    security(
        ("jwt" = [])
    ),
    responses(
        (status = 201, description = "Workout assigned", body = Workout),
        (status = 400, description = "Validation error or no approved partnership with the user")
    ),
    tag = "trainer"
)]
pub async fn create_trainer_workout(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<CreateTrainerWorkoutRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let workout = state
        .services
        .workouts
        .create_workout_as_trainer(req.into_new_workout(actor.id))
        .await?;

    Ok((StatusCode::CREATED, Json(workout)).into_response())
}

#[utoipa::path(
    get,
    path = "/api/workouts/{id}",
    params(
        ("id" = i64, Path, description = "Workout id")
    ),
    security(
        ("jwt" = [])
    ),
    responses(
        (status = 200, description = "Workout found", body = Workout),
        (status = 403, description = "Neither owner nor assigning trainer"),
        (status = 404, description = "Workout not found")
    ),
    tag = "workouts"
)]
pub async fn get_workout(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
) -> Result<Json<Workout>, WebError> {
    let workout = state
        .services
        .workouts
        .get_workout_by_id(id, actor.id)
        .await?;

    Ok(Json(workout))
}

#[utoipa::path(
    put,
    path = "/api/workouts/{id}",
    params(
        ("id" = i64, Path, description = "Workout id")
    ),
    request_body = UpdateWorkoutRequest,
    security(
        ("jwt" = [])
    ),
    responses(
        (status = 200, description = "Workout updated", body = Workout),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Neither owner nor assigning trainer"),
        (status = 404, description = "Workout not found")
    ),
    tag = "workouts"
)]
pub async fn update_workout(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateWorkoutRequest>,
) -> Result<Json<Workout>, WebError> {
    req.validate()?;

    let update = WorkoutUpdate::from(req);
    let workout = state
        .services
        .workouts
        .update_workout(id, actor.id, &update)
        .await?;

    Ok(Json(workout))
}

#[utoipa::path(
    delete,
    path = "/api/workouts/{id}",
    params(
        ("id" = i64, Path, description = "Workout id")
    ),
    security(
        ("jwt" = [])
    ),
    responses(
        (status = 204, description = "Workout deleted"),
        (status = 403, description = "Neither owner nor assigning trainer"),
        (status = 404, description = "Workout not found")
    ),
    tag = "workouts"
)]
pub async fn delete_workout(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
) -> Result<StatusCode, WebError> {
    state.services.workouts.delete_workout(id, actor.id).await?;

    Ok(StatusCode::NO_CONTENT)
}
