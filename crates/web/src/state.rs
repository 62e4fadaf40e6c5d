use storage::Services;

use crate::middleware::auth::{ApiKeys, JwtAuth};

#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    pub jwt: JwtAuth,
    pub api_keys: ApiKeys,
}
