mod common;

use chrono::Duration;
use storage::error::{CoachingError, ErrorKind};
use storage::models::{DescriptionPolicy, NewWorkout, WorkoutUpdate};

fn workout(title: &str, user_id: i64, trainer_id: Option<i64>) -> NewWorkout {
    NewWorkout {
        title: title.to_string(),
        user_id,
        trainer_id,
        description: Some("3x5 squat".to_string()),
        date: None,
    }
}

#[tokio::test]
async fn test_trainer_needs_approved_partnership() {
    let h = common::harness();
    let trainer = h.trainer("coach@example.com").await;
    let user = h.user("athlete@example.com").await;
    let w = &h.services.workouts;

    let err = w
        .create_workout_as_trainer(workout("Legs", user, Some(trainer)))
        .await
        .unwrap_err();
    assert!(matches!(err, CoachingError::NoPartnershipRights));

    h.services
        .partnerships
        .send_request_to_trainer(trainer, user)
        .await
        .unwrap();
    let err = w
        .create_workout_as_trainer(workout("Legs", user, Some(trainer)))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoPartnershipRights);

    h.services
        .partnerships
        .init_partnership_with_user(trainer, user)
        .await
        .unwrap();
    let created = w
        .create_workout_as_trainer(workout("Legs", user, Some(trainer)))
        .await
        .unwrap();
    assert_eq!(created.trainer_id, Some(trainer));
    assert_eq!(created.date, common::start());
}

#[tokio::test]
async fn test_trainer_loses_rights_after_partnership_ends() {
    let h = common::harness();
    let (trainer, user) = h.partnered().await;

    h.services
        .partnerships
        .end_partnership_with_trainer(trainer, user)
        .await
        .unwrap();

    let err = h
        .services
        .workouts
        .create_workout_as_trainer(workout("Legs", user, Some(trainer)))
        .await
        .unwrap_err();
    assert!(matches!(err, CoachingError::NoPartnershipRights));
}

#[tokio::test]
async fn test_user_workout_with_invalid_trainer() {
    let h = common::harness();
    let user = h.user("athlete@example.com").await;
    let friend = h.user("friend@example.com").await;

    let err = h
        .services
        .workouts
        .create_workout_as_user(workout("Run", user, Some(friend)))
        .await
        .unwrap_err();
    assert!(matches!(err, CoachingError::InvalidTarget(id) if id == friend));
}

#[tokio::test]
async fn test_blank_title_is_rejected() {
    let h = common::harness();
    let user = h.user("athlete@example.com").await;

    let err = h
        .services
        .workouts
        .create_workout_as_user(workout("   ", user, None))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidWorkout);
}

#[tokio::test]
async fn test_access_is_limited_to_owner_and_trainer() {
    let h = common::harness();
    let (trainer, user) = h.partnered().await;
    let stranger = h.user("stranger@example.com").await;
    let other_trainer = h.trainer("other@example.com").await;
    let w = &h.services.workouts;

    let created = w
        .create_workout_as_trainer(workout("Legs", user, Some(trainer)))
        .await
        .unwrap();

    assert!(w.check_access_to_workout(created.id, user).await.is_ok());
    assert!(w.check_access_to_workout(created.id, trainer).await.is_ok());

    for outsider in [stranger, other_trainer] {
        let err = w.get_workout_by_id(created.id, outsider).await.unwrap_err();
        assert!(matches!(err, CoachingError::NoAccess));

        let err = w
            .update_workout(created.id, outsider, &WorkoutUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CoachingError::NoAccess));

        let err = w.delete_workout(created.id, outsider).await.unwrap_err();
        assert!(matches!(err, CoachingError::NoAccess));
    }

    assert_eq!(w.get_workout_by_id(created.id, user).await.unwrap(), created);
}

#[tokio::test]
async fn test_access_survives_end_of_partnership() {
    let h = common::harness();
    let (trainer, user) = h.partnered().await;
    let w = &h.services.workouts;

    let created = w
        .create_workout_as_trainer(workout("Legs", user, Some(trainer)))
        .await
        .unwrap();
    h.services
        .partnerships
        .end_partnership_with_user(trainer, user)
        .await
        .unwrap();

    assert!(w.get_workout_by_id(created.id, trainer).await.is_ok());
}

#[tokio::test]
async fn test_missing_workout_is_not_found() {
    let h = common::harness();
    let user = h.user("athlete@example.com").await;
    let w = &h.services.workouts;

    let err = w.check_access_to_workout(404, user).await.unwrap_err();
    assert!(matches!(err, CoachingError::NotFound));

    let err = w.delete_workout(404, user).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_update_keeps_missing_fields() {
    let h = common::harness();
    let user = h.user("athlete@example.com").await;
    let w = &h.services.workouts;

    let created = w
        .create_workout_as_user(workout("Run", user, None))
        .await
        .unwrap();

    let later = common::start() + Duration::days(2);
    let updated = w
        .update_workout(
            created.id,
            user,
            &WorkoutUpdate {
                title: Some(String::new()),
                description: None,
                date: Some(later),
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.title, "Run");
    assert_eq!(updated.description, "3x5 squat");
    assert_eq!(updated.date, later);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_partial_updates_keep_both_fields() {
    let h = common::harness();
    let (trainer, user) = h.partnered().await;

    let created = h
        .services
        .workouts
        .create_workout_as_trainer(workout("Legs", user, Some(trainer)))
        .await
        .unwrap();

    for round in 0..20 {
        let title = format!("Legs {round}");
        let description = format!("5x5 at {round}0 kg");
        let by_user = WorkoutUpdate {
            title: Some(title.clone()),
            ..Default::default()
        };
        let by_trainer = WorkoutUpdate {
            description: Some(description.clone()),
            ..Default::default()
        };

        let u = h.services.workouts.clone();
        let t = h.services.workouts.clone();
        let id = created.id;
        let (a, b) = tokio::join!(
            tokio::spawn(async move { u.update_workout(id, user, &by_user).await }),
            tokio::spawn(async move { t.update_workout(id, trainer, &by_trainer).await })
        );
        a.unwrap().unwrap();
        b.unwrap().unwrap();

        let stored = h
            .services
            .workouts
            .get_workout_by_id(created.id, user)
            .await
            .unwrap();
        assert_eq!(stored.title, title);
        assert_eq!(stored.description, description);
    }
}

#[tokio::test]
async fn test_blank_description_means_unset_by_default() {
    let h = common::harness();
    let user = h.user("athlete@example.com").await;
    let w = &h.services.workouts;
    assert_eq!(w.description_policy(), DescriptionPolicy::BlankMeansUnset);

    let created = w
        .create_workout_as_user(workout("Run", user, None))
        .await
        .unwrap();
    let updated = w
        .update_workout(
            created.id,
            user,
            &WorkoutUpdate {
                description: Some(String::new()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.description, "3x5 squat");
}

#[tokio::test]
async fn test_blank_description_overwrites_when_configured() {
    let h = common::harness_with_policy(DescriptionPolicy::BlankOverwrites);
    let user = h.user("athlete@example.com").await;
    let w = &h.services.workouts;

    let created = w
        .create_workout_as_user(workout("Run", user, None))
        .await
        .unwrap();
    let updated = w
        .update_workout(
            created.id,
            user,
            &WorkoutUpdate {
                description: Some(String::new()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.description, "");

    let untouched = w
        .update_workout(created.id, user, &WorkoutUpdate::default())
        .await
        .unwrap();
    assert_eq!(untouched.description, "");
}

#[tokio::test]
async fn test_listings_are_newest_first() {
    let h = common::harness();
    let (trainer, user) = h.partnered().await;
    let w = &h.services.workouts;

    let mut early = workout("Early", user, None);
    early.date = Some(common::start() - Duration::days(3));
    let early = w.create_workout_as_user(early).await.unwrap();

    let assigned = w
        .create_workout_as_trainer(workout("Assigned", user, Some(trainer)))
        .await
        .unwrap();

    let own: Vec<i64> = w.user_workouts(user).await.unwrap().iter().map(|x| x.id).collect();
    assert_eq!(own, vec![assigned.id, early.id]);

    let by_trainer = w.trainer_workouts(trainer).await.unwrap();
    assert_eq!(by_trainer.len(), 1);
    assert_eq!(by_trainer[0].id, assigned.id);

    let pair = w.trainer_workouts_with_user(trainer, user).await.unwrap();
    assert_eq!(pair, by_trainer);
}

#[tokio::test]
async fn test_delete_workout() {
    let h = common::harness();
    let (trainer, user) = h.partnered().await;
    let w = &h.services.workouts;

    let created = w
        .create_workout_as_trainer(workout("Legs", user, Some(trainer)))
        .await
        .unwrap();
    w.delete_workout(created.id, trainer).await.unwrap();

    let err = w.get_workout_by_id(created.id, user).await.unwrap_err();
    assert!(matches!(err, CoachingError::NotFound));
}
