use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use storage::{
    dto::{
        account::AccountsResponse,
        partnership::{PartnershipIdResponse, PartnershipsResponse, RequestsResponse, UsersResponse},
    },
    models::{Account, TrainerRequest},
};

use crate::error::WebError;
use crate::middleware::auth::Actor;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/user/trainers",
    security(
        ("jwt" = [])
    ),
    responses(
        (status = 200, description = "All trainers", body = AccountsResponse)
    ),
    tag = "user"
)]
pub async fn list_trainers(
    State(state): State<AppState>,
) -> Result<Json<AccountsResponse>, WebError> {
    let accounts = state.services.accounts.trainers().await?;

    Ok(Json(AccountsResponse { accounts }))
}

#[utoipa::path(
    get,
    path = "/api/user/trainers/{trainer_id}",
    params(
        ("trainer_id" = i64, Path, description = "Trainer account id")
    ),
    security(
        ("jwt" = [])
    ),
    responses(
        (status = 200, description = "Trainer found", body = Account),
        (status = 404, description = "Trainer not found")
    ),
    tag = "user"
)]
pub async fn get_trainer(
    State(state): State<AppState>,
    Path(trainer_id): Path<i64>,
) -> Result<Json<Account>, WebError> {
    let trainer = state.services.accounts.trainer_by_id(trainer_id).await?;

    Ok(Json(trainer))
}

#[utoipa::path(
    post,
    path = "/api/user/trainers/{trainer_id}/request",
    params(
        ("trainer_id" = i64, Path, description = "Trainer account id")
    ),
    security(
        ("jwt" = [])
    ),
    responses(
        (status = 200, description = "Request pending; repeated calls return the same id", body = PartnershipIdResponse),
        (status = 400, description = "Not a trainer, or partnership already approved")
    ),
    tag = "user"
)]
pub async fn send_request(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(trainer_id): Path<i64>,
) -> Result<Json<PartnershipIdResponse>, WebError> {
    let partnership_id = state
        .services
        .partnerships
        .send_request_to_trainer(trainer_id, actor.id)
        .await?;

    Ok(Json(PartnershipIdResponse { partnership_id }))
}

#[utoipa::path(
    post,
    path = "/api/user/trainers/{trainer_id}/end",
    params(
        ("trainer_id" = i64, Path, description = "Trainer account id")
    ),
    security(
        ("jwt" = [])
    ),
    responses(
        (status = 200, description = "Partnership ended by the user", body = PartnershipIdResponse),
        (status = 400, description = "No approved partnership")
    ),
    tag = "user"
)]
pub async fn end_with_trainer(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(trainer_id): Path<i64>,
) -> Result<Json<PartnershipIdResponse>, WebError> {
    let partnership_id = state
        .services
        .partnerships
        .end_partnership_with_trainer(trainer_id, actor.id)
        .await?;

    Ok(Json(PartnershipIdResponse { partnership_id }))
}

#[utoipa::path(
    get,
    path = "/api/user/partnerships",
    security(
        ("jwt" = [])
    ),
    responses(
        (status = 200, description = "Partnerships of the user, newest first", body = PartnershipsResponse)
    ),
    tag = "user"
)]
pub async fn user_partnerships(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<PartnershipsResponse>, WebError> {
    let partnerships = state.services.partnerships.user_partnerships(actor.id).await?;

    Ok(Json(PartnershipsResponse { partnerships }))
}

#[utoipa::path(
    get,
    path = "/api/trainer/partnerships",
    security(
        ("jwt" = [])
    ),
    responses(
        (status = 200, description = "Partnerships of the trainer, newest first", body = PartnershipsResponse)
    ),
    tag = "trainer"
)]
pub async fn trainer_partnerships(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<PartnershipsResponse>, WebError> {
    let partnerships = state
        .services
        .partnerships
        .trainer_partnerships(actor.id)
        .await?;

    Ok(Json(PartnershipsResponse { partnerships }))
}

#[utoipa::path(
    get,
    path = "/api/trainer/users",
    security(
        ("jwt" = [])
    ),
    responses(
        (status = 200, description = "Users with an approved partnership", body = UsersResponse)
    ),
    tag = "trainer"
)]
pub async fn list_users(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<UsersResponse>, WebError> {
    let users = state.services.partnerships.trainer_users(actor.id).await?;

    Ok(Json(UsersResponse { users }))
}

#[utoipa::path(
    get,
    path = "/api/trainer/users/{user_id}",
    params(
        ("user_id" = i64, Path, description = "User account id")
    ),
    security(
        ("jwt" = [])
    ),
    responses(
        (status = 200, description = "Partnered user", body = Account),
        (status = 400, description = "No approved partnership with this user")
    ),
    tag = "trainer"
)]
pub async fn get_user(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(user_id): Path<i64>,
) -> Result<Json<Account>, WebError> {
    let user = state
        .services
        .partnerships
        .trainer_user(actor.id, user_id)
        .await?;

    Ok(Json(user))
}

#[utoipa::path(
    post,
    path = "/api/trainer/users/{user_id}/partnership",
    params(
        ("user_id" = i64, Path, description = "User account id")
    ),
    security(
        ("jwt" = [])
    ),
    responses(
        (status = 200, description = "Partnership approved", body = PartnershipIdResponse),
        (status = 400, description = "Not a user, or the user ended the partnership and must send a new request")
    ),
    tag = "trainer"
)]
pub async fn init_partnership(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(user_id): Path<i64>,
) -> Result<Json<PartnershipIdResponse>, WebError> {
    let partnership_id = state
        .services
        .partnerships
        .init_partnership_with_user(actor.id, user_id)
        .await?;

    Ok(Json(PartnershipIdResponse { partnership_id }))
}

#[utoipa::path(
    post,
    path = "/api/trainer/users/{user_id}/end",
    params(
        ("user_id" = i64, Path, description = "User account id")
    ),
    security(
        ("jwt" = [])
    ),
    responses(
        (status = 200, description = "Partnership ended by the trainer", body = PartnershipIdResponse),
        (status = 400, description = "No approved partnership")
    ),
    tag = "trainer"
)]
pub async fn end_with_user(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(user_id): Path<i64>,
) -> Result<Json<PartnershipIdResponse>, WebError> {
    let partnership_id = state
        .services
        .partnerships
        .end_partnership_with_user(actor.id, user_id)
        .await?;

    Ok(Json(PartnershipIdResponse { partnership_id }))
}

#[utoipa::path(
    get,
    path = "/api/trainer/requests",
    security(
        ("jwt" = [])
    ),
    responses(
        (status = 200, description = "Pending requests, newest first", body = RequestsResponse)
    ),
    tag = "trainer"
)]
pub async fn list_requests(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<RequestsResponse>, WebError> {
    let requests = state.services.partnerships.trainer_requests(actor.id).await?;

    Ok(Json(RequestsResponse { requests }))
}

#[utoipa::path(
    get,
    path = "/api/trainer/requests/{request_id}",
    params(
        ("request_id" = i64, Path, description = "Pending partnership id")
    ),
    security(
        ("jwt" = [])
    ),
    responses(
        (status = 200, description = "Pending request", body = TrainerRequest),
        (status = 400, description = "No such pending request")
    ),
    tag = "trainer"
)]
pub async fn get_request(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(request_id): Path<i64>,
) -> Result<Json<TrainerRequest>, WebError> {
    let request = state
        .services
        .partnerships
        .trainer_request(actor.id, request_id)
        .await?;

    Ok(Json(request))
}

#[utoipa::path(
    post,
    path = "/api/trainer/requests/{request_id}/accept",
    params(
        ("request_id" = i64, Path, description = "Pending partnership id")
    ),
    security(
        ("jwt" = [])
    ),
    responses(
        (status = 200, description = "Request accepted", body = PartnershipIdResponse),
        (status = 400, description = "No such pending request")
    ),
    tag = "trainer"
)]
pub async fn accept_request(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(request_id): Path<i64>,
) -> Result<Json<PartnershipIdResponse>, WebError> {
    let partnership_id = state
        .services
        .partnerships
        .accept_request(actor.id, request_id)
        .await?;

    Ok(Json(PartnershipIdResponse { partnership_id }))
}

#[utoipa::path(
    post,
    path = "/api/trainer/requests/{request_id}/deny",
    params(
        ("request_id" = i64, Path, description = "Pending partnership id")
    ),
    security(
        ("jwt" = [])
    ),
    responses(
        (status = 204, description = "Request removed"),
        (status = 400, description = "No such pending request")
    ),
    tag = "trainer"
)]
pub async fn deny_request(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(request_id): Path<i64>,
) -> Result<StatusCode, WebError> {
    state
        .services
        .partnerships
        .deny_request(actor.id, request_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
