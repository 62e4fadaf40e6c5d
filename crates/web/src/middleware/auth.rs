use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use storage::models::Role;

use crate::error::WebError;

fn bearer_token(req: &Request) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
}

/// Admin routes: the bearer token must be one of the configured API keys.
pub async fn require_auth(
    State(api_keys): State<ApiKeys>,
    req: Request,
    next: Next,
) -> Result<Response, WebError> {
    let authorized = bearer_token(&req).is_some_and(|token| api_keys.is_valid(token));
    if !authorized {
        tracing::warn!("Invalid API key attempt");
        return Err(WebError::Unauthorized);
    }

    Ok(next.run(req).await)
}

#[derive(Clone)]
pub struct ApiKeys {
    keys: HashSet<String>,
}

impl ApiKeys {
    pub fn from_comma_separated(keys_str: &str) -> Self {
        let keys = keys_str
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        Self { keys }
    }

    pub fn is_valid(&self, key: &str) -> bool {
        self.keys.contains(key)
    }
}

/// Authenticated caller of a user or trainer route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: i64,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Claims {
    sub: i64,
    role: Role,
    exp: i64,
}

/// HS256 signing and verification of actor tokens.
#[derive(Clone)]
pub struct JwtAuth {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl JwtAuth {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    pub fn issue(&self, actor: Actor, ttl: Duration) -> Result<String, WebError> {
        let claims = Claims {
            sub: actor.id,
            role: actor.role,
            exp: (Utc::now() + ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| WebError::InternalServerError(format!("Failed to sign token: {}", e)))
    }

    pub fn verify(&self, token: &str) -> Result<Actor, WebError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            tracing::debug!("Rejected token: {}", e);
            WebError::Unauthorized
        })?;

        Ok(Actor {
            id: data.claims.sub,
            role: data.claims.role,
        })
    }
}

/// Middleware state for routes reserved to one role, or any role when `None`.
#[derive(Clone)]
pub struct RoleGuard {
    jwt: JwtAuth,
    role: Option<Role>,
}

impl RoleGuard {
    pub fn new(jwt: JwtAuth, role: Role) -> Self {
        Self {
            jwt,
            role: Some(role),
        }
    }

    pub fn any(jwt: JwtAuth) -> Self {
        Self { jwt, role: None }
    }
}

/// Verifies the bearer JWT and stores the [`Actor`] in the request extensions.
pub async fn require_actor(
    State(guard): State<RoleGuard>,
    mut req: Request,
    next: Next,
) -> Result<Response, WebError> {
    let token = bearer_token(&req).ok_or(WebError::Unauthorized)?;
    let actor = guard.jwt.verify(token)?;

    if guard.role.is_some_and(|role| role != actor.role) {
        tracing::debug!(actor_id = actor.id, role = %actor.role, "Route reserved to another role");
        return Err(WebError::Forbidden);
    }

    req.extensions_mut().insert(actor);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_keys_parsing() {
        let keys = ApiKeys::from_comma_separated(" alpha, ,beta ,");
        assert!(keys.is_valid("alpha"));
        assert!(keys.is_valid("beta"));
        assert!(!keys.is_valid(""));
        assert!(!keys.is_valid("gamma"));
    }

    #[test]
    fn test_token_round_trip() {
        let jwt = JwtAuth::new("secret");
        let actor = Actor {
            id: 7,
            role: Role::Trainer,
        };

        let token = jwt.issue(actor, Duration::hours(1)).unwrap();
        assert_eq!(jwt.verify(&token).unwrap(), actor);
    }

    #[test]
    fn test_token_rejected_with_other_secret_or_expired() {
        let actor = Actor {
            id: 7,
            role: Role::User,
        };

        let token = JwtAuth::new("secret")
            .issue(actor, Duration::hours(1))
            .unwrap();
        assert!(matches!(
            JwtAuth::new("other").verify(&token),
            Err(WebError::Unauthorized)
        ));

        let jwt = JwtAuth::new("secret");
        let expired = jwt.issue(actor, Duration::hours(-2)).unwrap();
        assert!(matches!(jwt.verify(&expired), Err(WebError::Unauthorized)));
    }
}
