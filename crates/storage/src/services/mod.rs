use std::sync::Arc;

use sqlx::PgPool;

use crate::clock::{Clock, SystemClock};
use crate::models::DescriptionPolicy;
use crate::repository::memory::MemoryStore;
use crate::repository::postgres::{
    PostgresAccountRepository, PostgresPartnershipRepository, PostgresWorkoutRepository,
};
use crate::repository::{AccountRepository, PartnershipRepository, WorkoutRepository};

pub mod account;
pub mod partnership;
pub mod workout;

pub use account::AccountService;
pub use partnership::PartnershipService;
pub use workout::WorkoutService;

/// The coaching services wired to one set of repositories.
#[derive(Clone)]
pub struct Services {
    pub accounts: AccountService,
    pub partnerships: PartnershipService,
    pub workouts: WorkoutService,
}

impl Services {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        partnerships: Arc<dyn PartnershipRepository>,
        workouts: Arc<dyn WorkoutRepository>,
        clock: Arc<dyn Clock>,
        description_policy: DescriptionPolicy,
    ) -> Self {
        let partnership_service =
            PartnershipService::new(accounts.clone(), partnerships.clone(), clock.clone());

        Self {
            accounts: AccountService::new(accounts.clone(), partnerships, workouts.clone()),
            workouts: WorkoutService::new(accounts, workouts, clock, description_policy),
            partnerships: partnership_service,
        }
    }

    pub fn postgres(pool: &PgPool, description_policy: DescriptionPolicy) -> Self {
        Self::new(
            Arc::new(PostgresAccountRepository::new(pool.clone())),
            Arc::new(PostgresPartnershipRepository::new(pool.clone())),
            Arc::new(PostgresWorkoutRepository::new(pool.clone())),
            Arc::new(SystemClock),
            description_policy,
        )
    }

    pub fn in_memory(
        store: MemoryStore,
        clock: Arc<dyn Clock>,
        description_policy: DescriptionPolicy,
    ) -> Self {
        let store = Arc::new(store);
        Self::new(
            store.clone(),
            store.clone(),
            store,
            clock,
            description_policy,
        )
    }
}
