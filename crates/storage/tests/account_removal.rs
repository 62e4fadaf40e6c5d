mod common;

use storage::error::{CoachingError, ErrorKind};
use storage::models::{NewAccount, NewWorkout, Role};
use storage::repository::memory::RemovalStep;

fn assigned(title: &str, user_id: i64, trainer_id: i64) -> NewWorkout {
    NewWorkout {
        title: title.to_string(),
        user_id,
        trainer_id: Some(trainer_id),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_duplicate_email_is_taken() {
    let h = common::harness();
    h.user("athlete@example.com").await;

    let err = h
        .services
        .accounts
        .create_account(NewAccount {
            email: "athlete@example.com".to_string(),
            role: Role::Trainer,
            name: "Sam".to_string(),
            surname: "Doe".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CoachingError::EmailTaken(ref email) if email == "athlete@example.com"));
    assert_eq!(err.kind(), ErrorKind::EmailTaken);
}

#[tokio::test]
async fn test_account_lookups() {
    let h = common::harness();
    let trainer = h.trainer("zed@example.com").await;
    let second = h.trainer("adams@example.com").await;
    let user = h.user("athlete@example.com").await;
    let a = &h.services.accounts;

    let trainers: Vec<i64> = a.trainers().await.unwrap().iter().map(|t| t.id).collect();
    assert_eq!(trainers, vec![second, trainer]);

    assert_eq!(a.trainer_by_id(trainer).await.unwrap().id, trainer);
    let err = a.trainer_by_id(user).await.unwrap_err();
    assert!(matches!(err, CoachingError::NotFound));

    let users = a.accounts_by_role(Role::User).await.unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].created_at, common::start());
}

#[tokio::test]
async fn test_overview_from_each_side() {
    let h = common::harness();
    let (trainer, user) = h.partnered().await;
    h.services
        .workouts
        .create_workout_as_trainer(assigned("Legs", user, trainer))
        .await
        .unwrap();

    let user_view = h.services.accounts.account_overview(user).await.unwrap();
    assert_eq!(user_view.partnerships.len(), 1);
    assert_eq!(user_view.workouts.len(), 1);

    let trainer_view = h.services.accounts.account_overview(trainer).await.unwrap();
    assert_eq!(trainer_view.account.id, trainer);
    assert_eq!(trainer_view.partnerships, user_view.partnerships);
    assert_eq!(trainer_view.workouts, user_view.workouts);
}

#[tokio::test]
async fn test_deleting_user_cascades() {
    let h = common::harness();
    let (trainer, user) = h.partnered().await;
    h.services
        .workouts
        .create_workout_as_trainer(assigned("Legs", user, trainer))
        .await
        .unwrap();

    h.services.accounts.delete_account(user).await.unwrap();

    let err = h.services.accounts.account_by_id(user).await.unwrap_err();
    assert!(matches!(err, CoachingError::NotFound));
    assert!(
        h.services
            .partnerships
            .trainer_partnerships(trainer)
            .await
            .unwrap()
            .is_empty()
    );
    assert!(h.services.workouts.trainer_workouts(trainer).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_deleting_trainer_detaches_workouts() {
    let h = common::harness();
    let (trainer, user) = h.partnered().await;
    let created = h
        .services
        .workouts
        .create_workout_as_trainer(assigned("Legs", user, trainer))
        .await
        .unwrap();

    h.services.accounts.delete_account(trainer).await.unwrap();

    let kept = h
        .services
        .workouts
        .get_workout_by_id(created.id, user)
        .await
        .unwrap();
    assert_eq!(kept.trainer_id, None);
    assert!(
        h.services
            .partnerships
            .user_partnerships(user)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_failed_removal_rolls_back() {
    let h = common::harness();
    let (trainer, user) = h.partnered().await;
    h.services
        .workouts
        .create_workout_as_trainer(assigned("Legs", user, trainer))
        .await
        .unwrap();

    h.store.fail_removal_at(RemovalStep::Workouts);
    let err = h.services.accounts.delete_account(user).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Internal);
    assert!(!err.is_client_error());

    // Partnerships were removed before the failure and must be back.
    assert!(h.services.partnerships.is_approved(trainer, user).await.unwrap());
    assert_eq!(h.services.workouts.user_workouts(user).await.unwrap().len(), 1);
    assert!(h.services.accounts.account_by_id(user).await.is_ok());

    // The injected failure is used up; a retry goes through.
    h.services.accounts.delete_account(user).await.unwrap();
    assert!(h.services.workouts.user_workouts(user).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_deleting_missing_account() {
    let h = common::harness();
    let err = h.services.accounts.delete_account(77).await.unwrap_err();
    assert!(matches!(err, CoachingError::NotFound));
}
