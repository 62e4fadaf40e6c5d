use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{Account, AccountUpdate, NewAccount, Partnership, Role, Workout};

/// Request payload for creating a user or trainer account
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateAccountRequest {
    #[validate(email(message = "Email must be a valid address"))]
    #[validate(length(max = 255))]
    pub email: String,

    pub role: Role,

    #[validate(length(
        min = 1,
        max = 255,
        message = "Name must be between 1 and 255 characters"
    ))]
    pub name: String,

    #[validate(length(
        min = 1,
        max = 255,
        message = "Surname must be between 1 and 255 characters"
    ))]
    pub surname: String,
}

impl From<CreateAccountRequest> for NewAccount {
    fn from(req: CreateAccountRequest) -> Self {
        Self {
            email: req.email,
            role: req.role,
            name: req.name,
            surname: req.surname,
        }
    }
}

/// Request payload for editing an account; the role cannot change
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateAccountRequest {
    #[validate(email(message = "Email must be a valid address"))]
    #[validate(length(max = 255))]
    pub email: String,

    #[validate(length(
        min = 1,
        max = 255,
        message = "Name must be between 1 and 255 characters"
    ))]
    pub name: String,

    #[validate(length(
        min = 1,
        max = 255,
        message = "Surname must be between 1 and 255 characters"
    ))]
    pub surname: String,
}

impl From<UpdateAccountRequest> for AccountUpdate {
    fn from(req: UpdateAccountRequest) -> Self {
        Self {
            email: req.email,
            name: req.name,
            surname: req.surname,
        }
    }
}

/// Account with the partnerships and workouts it takes part in
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AccountOverview {
    #[serde(flatten)]
    pub account: Account,
    pub partnerships: Vec<Partnership>,
    pub workouts: Vec<Workout>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AccountsResponse {
    pub accounts: Vec<Account>,
}
