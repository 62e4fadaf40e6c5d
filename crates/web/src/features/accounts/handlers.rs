use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use storage::{
    dto::account::{
        AccountOverview, AccountsResponse, CreateAccountRequest, UpdateAccountRequest,
    },
    models::{Account, Role},
};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::WebError;
use crate::middleware::auth::Actor;
use crate::state::AppState;

const TOKEN_TTL_HOURS: i64 = 24;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RoleQuery {
    /// Only list accounts with this role
    pub role: Option<Role>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
    pub expires_in: i64,
}

#[utoipa::path(
    get,
    path = "/api/admin/accounts",
    params(RoleQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Accounts ordered by surname", body = AccountsResponse),
        (status = 401, description = "Unauthorized")
    ),
    tag = "admin"
)]
pub async fn list_accounts(
    State(state): State<AppState>,
    Query(query): Query<RoleQuery>,
) -> Result<Json<AccountsResponse>, WebError> {
    let accounts = match query.role {
        Some(role) => state.services.accounts.accounts_by_role(role).await?,
        None => {
            let mut accounts = state.services.accounts.accounts_by_role(Role::User).await?;
            accounts.extend(state.services.accounts.trainers().await?);
            accounts.sort_by(|a, b| a.surname.cmp(&b.surname).then(a.id.cmp(&b.id)));
            accounts
        }
    };

    Ok(Json(AccountsResponse { accounts }))
}

#[utoipa::path(
    post,
    path = "/api/admin/accounts",
    request_body = CreateAccountRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Account created successfully", body = Account),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Email already exists")
    ),
    tag = "admin"
)]
pub async fn create_account(
    State(state): State<AppState>,
    Json(req): Json<CreateAccountRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let account = state.services.accounts.create_account(req.into()).await?;

    Ok((StatusCode::CREATED, Json(account)).into_response())
}

#[utoipa::path(
    get,
    path = "/api/admin/accounts/{id}",
    params(
        ("id" = i64, Path, description = "Account id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Account with its partnerships and workouts", body = AccountOverview),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Account not found")
    ),
    tag = "admin"
)]
pub async fn get_account(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<AccountOverview>, WebError> {
    let overview = state.services.accounts.account_overview(id).await?;

    Ok(Json(overview))
}

#[utoipa::path(
    put,
    path = "/api/admin/accounts/{id}",
    params(
        ("id" = i64, Path, description = "Account id")
    ),
    request_body = UpdateAccountRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Account updated successfully", body = Account),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Account not found"),
        (status = 409, description = "Email already exists")
    ),
    tag = "admin"
)]
pub async fn update_account(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateAccountRequest>,
) -> Result<Json<Account>, WebError> {
    req.validate()?;

    let account = state
        .services
        .accounts
        .update_account(id, req.into())
        .await?;

    Ok(Json(account))
}

#[utoipa::path(
    delete,
    path = "/api/admin/accounts/{id}",
    params(
        ("id" = i64, Path, description = "Account id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 204, description = "Account, its partnerships and workouts deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Account not found")
    ),
    tag = "admin"
)]
pub async fn delete_account(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, WebError> {
    state.services.accounts.delete_account(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/admin/accounts/{id}/token",
    params(
        ("id" = i64, Path, description = "Account id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Bearer token acting as this account", body = TokenResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Account not found")
    ),
    tag = "admin"
)]
pub async fn issue_token(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<TokenResponse>, WebError> {
    let account = state.services.accounts.account_by_id(id).await?;
    let actor = Actor {
        id: account.id,
        role: account.role,
    };
    let ttl = Duration::hours(TOKEN_TTL_HOURS);
    let token = state.jwt.issue(actor, ttl)?;

    tracing::info!(account_id = id, "Token issued");
    Ok(Json(TokenResponse {
        token,
        expires_in: ttl.num_seconds(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/me",
    security(
        ("jwt" = [])
    ),
    responses(
        (status = 200, description = "Account of the token holder", body = Account),
        (status = 401, description = "Missing or invalid token")
    ),
    tag = "accounts"
)]
pub async fn me(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Account>, WebError> {
    let account = state.services.accounts.account_by_id(actor.id).await?;

    Ok(Json(account))
}
