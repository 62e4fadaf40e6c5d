#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use storage::Services;
use storage::clock::FixedClock;
use storage::models::{DescriptionPolicy, NewAccount, Role};
use storage::repository::memory::MemoryStore;

pub struct Harness {
    pub services: Services,
    pub store: MemoryStore,
    pub clock: Arc<FixedClock>,
}

pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
}

pub fn harness() -> Harness {
    harness_with_policy(DescriptionPolicy::default())
}

pub fn harness_with_policy(policy: DescriptionPolicy) -> Harness {
    let clock = Arc::new(FixedClock::new(start()));
    let store = MemoryStore::with_clock(clock.clone());
    let services = Services::in_memory(store.clone(), clock.clone(), policy);

    Harness {
        services,
        store,
        clock,
    }
}

impl Harness {
    pub async fn account(&self, email: &str, role: Role) -> i64 {
        self.services
            .accounts
            .create_account(NewAccount {
                email: email.to_string(),
                role,
                name: "Alex".to_string(),
                surname: email.split('@').next().unwrap_or(email).to_string(),
            })
            .await
            .unwrap()
            .id
    }

    pub async fn user(&self, email: &str) -> i64 {
        self.account(email, Role::User).await
    }

    pub async fn trainer(&self, email: &str) -> i64 {
        self.account(email, Role::Trainer).await
    }

    /// Trainer and user with an approved partnership between them.
    pub async fn partnered(&self) -> (i64, i64) {
        let trainer = self.trainer("coach@example.com").await;
        let user = self.user("athlete@example.com").await;
        self.services
            .partnerships
            .init_partnership_with_user(trainer, user)
            .await
            .unwrap();
        (trainer, user)
    }
}
