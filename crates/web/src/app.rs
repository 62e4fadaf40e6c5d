use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::features::{self, accounts, partnerships, workouts};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        accounts::handlers::list_accounts,
        accounts::handlers::create_account,
        accounts::handlers::get_account,
        accounts::handlers::update_account,
        accounts::handlers::delete_account,
        accounts::handlers::issue_token,
        accounts::handlers::me,
        partnerships::handlers::list_trainers,
        partnerships::handlers::get_trainer,
        partnerships::handlers::send_request,
        partnerships::handlers::end_with_trainer,
        partnerships::handlers::user_partnerships,
        partnerships::handlers::trainer_partnerships,
        partnerships::handlers::list_users,
        partnerships::handlers::get_user,
        partnerships::handlers::init_partnership,
        partnerships::handlers::end_with_user,
        partnerships::handlers::list_requests,
        partnerships::handlers::get_request,
        partnerships::handlers::accept_request,
        partnerships::handlers::deny_request,
        workouts::handlers::list_user_workouts,
        workouts::handlers::create_user_workout,
        workouts::handlers::list_trainer_workouts,
        workouts::handlers::list_user_workouts_for_trainer,
        workouts::handlers::create_trainer_workout,
        workouts::handlers::get_workout,
        workouts::handlers::update_workout,
        workouts::handlers::delete_workout,
    ),
    components(
        schemas(
            storage::dto::account::CreateAccountRequest,
            storage::dto::account::UpdateAccountRequest,
            storage::dto::account::AccountOverview,
            storage::dto::account::AccountsResponse,
            storage::dto::partnership::PartnershipIdResponse,
            storage::dto::partnership::PartnershipsResponse,
            storage::dto::partnership::RequestsResponse,
            storage::dto::partnership::UsersResponse,
            storage::dto::workout::CreateUserWorkoutRequest,
            storage::dto::workout::CreateTrainerWorkoutRequest,
            storage::dto::workout::UpdateWorkoutRequest,
            storage::dto::workout::WorkoutsResponse,
            storage::models::Account,
            storage::models::Role,
            storage::models::Partnership,
            storage::models::PartnershipStatus,
            storage::models::TrainerRequest,
            storage::models::Workout,
            accounts::handlers::TokenResponse,
        )
    ),
    tags(
        (name = "admin", description = "Account administration, API key required"),
        (name = "accounts", description = "Endpoints for any signed-in account"),
        (name = "user", description = "Endpoints for users"),
        (name = "trainer", description = "Endpoints for trainers"),
        (name = "workouts", description = "Workouts, open to their owner and assigning trainer"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("API Key")
                        .build(),
                ),
            );
            components.add_security_scheme(
                "jwt",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", features::routes(&state))
        .layer(ServiceBuilder::new().layer(cors))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use chrono::Duration;
    use serde_json::{Value, json};
    use storage::Services;
    use storage::clock::SystemClock;
    use storage::models::{DescriptionPolicy, NewAccount, Role};
    use storage::repository::memory::MemoryStore;
    use tower::ServiceExt;

    use super::*;
    use crate::middleware::auth::{Actor, ApiKeys, JwtAuth};

    fn state() -> AppState {
        AppState {
            services: Services::in_memory(
                MemoryStore::new(),
                Arc::new(SystemClock),
                DescriptionPolicy::default(),
            ),
            jwt: JwtAuth::new("test-secret"),
            api_keys: ApiKeys::from_comma_separated("admin-key"),
        }
    }

    async fn account(state: &AppState, email: &str, role: Role) -> (i64, String) {
        let account = state
            .services
            .accounts
            .create_account(NewAccount {
                email: email.to_string(),
                role,
                name: "Test".to_string(),
                surname: "Account".to_string(),
            })
            .await
            .unwrap();
        let token = state
            .jwt
            .issue(
                Actor {
                    id: account.id,
                    role,
                },
                Duration::hours(1),
            )
            .unwrap();
        (account.id, token)
    }

    async fn send(
        state: &AppState,
        method: &str,
        uri: &str,
        token: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"));
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_admin_routes_require_api_key() {
        let state = state();

        let (status, _) = send(&state, "GET", "/api/admin/accounts", "wrong", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = send(
            &state,
            "POST",
            "/api/admin/accounts",
            "admin-key",
            Some(json!({
                "email": "coach@example.com",
                "role": "trainer",
                "name": "Kim",
                "surname": "Lee"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["role"], "trainer");

        let (status, _) = send(
            &state,
            "POST",
            "/api/admin/accounts",
            "admin-key",
            Some(json!({
                "email": "coach@example.com",
                "role": "user",
                "name": "Kim",
                "surname": "Lee"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_role_routes_reject_other_role() {
        let state = state();
        let (_, user_token) = account(&state, "athlete@example.com", Role::User).await;

        let (status, _) = send(&state, "GET", "/api/trainer/requests", &user_token, None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(&state, "GET", "/api/user/partnerships", "garbage", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_request_accept_and_assign_workout() {
        let state = state();
        let (trainer, trainer_token) = account(&state, "coach@example.com", Role::Trainer).await;
        let (user, user_token) = account(&state, "athlete@example.com", Role::User).await;
        let (_, stranger_token) = account(&state, "stranger@example.com", Role::User).await;

        let (status, body) = send(
            &state,
            "POST",
            &format!("/api/user/trainers/{trainer}/request"),
            &user_token,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let request_id = body["partnership_id"].as_i64().unwrap();

        let (status, _) = send(
            &state,
            "POST",
            &format!("/api/trainer/requests/{request_id}/accept"),
            &trainer_token,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, workout) = send(
            &state,
            "POST",
            "/api/trainer/workouts",
            &trainer_token,
            Some(json!({ "title": "Tempo run", "user_id": user })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let workout_id = workout["id"].as_i64().unwrap();

        let uri = format!("/api/workouts/{workout_id}");
        let (status, _) = send(&state, "GET", &uri, &user_token, None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&state, "GET", &uri, &stranger_token, None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = send(&state, "GET", "/api/workouts/9999", &user_token, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_user_must_reinitiate_reports_partnership_id() {
        let state = state();
        let (trainer, trainer_token) = account(&state, "coach@example.com", Role::Trainer).await;
        let (user, user_token) = account(&state, "athlete@example.com", Role::User).await;

        let init = format!("/api/trainer/users/{user}/partnership");
        let (_, body) = send(&state, "POST", &init, &trainer_token, None).await;
        let partnership_id = body["partnership_id"].as_i64().unwrap();

        let end = format!("/api/user/trainers/{trainer}/end");
        let (status, _) = send(&state, "POST", &end, &user_token, None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&state, "POST", &init, &trainer_token, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["partnership_id"], partnership_id);
    }

    #[tokio::test]
    async fn test_admin_updates_account_but_not_role() {
        let state = state();
        let (trainer, _) = account(&state, "coach@example.com", Role::Trainer).await;
        account(&state, "athlete@example.com", Role::User).await;

        let uri = format!("/api/admin/accounts/{trainer}");
        let (status, body) = send(
            &state,
            "PUT",
            &uri,
            "admin-key",
            Some(json!({
                "email": "head.coach@example.com",
                "name": "Kim",
                "surname": "Park",
                "role": "user"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], "head.coach@example.com");
        assert_eq!(body["surname"], "Park");
        assert_eq!(body["role"], "trainer");

        let (status, _) = send(
            &state,
            "PUT",
            &uri,
            "admin-key",
            Some(json!({
                "email": "athlete@example.com",
                "name": "Kim",
                "surname": "Park"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = send(
            &state,
            "PUT",
            &uri,
            "admin-key",
            Some(json!({ "email": "not-an-email", "name": "Kim", "surname": "Park" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &state,
            "PUT",
            "/api/admin/accounts/9999",
            "admin-key",
            Some(json!({ "email": "x@example.com", "name": "X", "surname": "Y" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_account_listing_without_role_is_ordered_by_surname() {
        let state = state();
        for (email, role, surname) in [
            ("a@example.com", Role::User, "Young"),
            ("b@example.com", Role::Trainer, "Adams"),
            ("c@example.com", Role::User, "Moreau"),
        ] {
            state
                .services
                .accounts
                .create_account(NewAccount {
                    email: email.to_string(),
                    role,
                    name: "Test".to_string(),
                    surname: surname.to_string(),
                })
                .await
                .unwrap();
        }

        let (status, body) = send(&state, "GET", "/api/admin/accounts", "admin-key", None).await;
        assert_eq!(status, StatusCode::OK);
        let surnames: Vec<&str> = body["accounts"]
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["surname"].as_str().unwrap())
            .collect();
        assert_eq!(surnames, ["Adams", "Moreau", "Young"]);
    }
}
