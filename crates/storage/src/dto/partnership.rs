use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Account, Partnership, TrainerRequest};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PartnershipIdResponse {
    pub partnership_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PartnershipsResponse {
    pub partnerships: Vec<Partnership>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RequestsResponse {
    pub requests: Vec<TrainerRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UsersResponse {
    pub users: Vec<Account>,
}
