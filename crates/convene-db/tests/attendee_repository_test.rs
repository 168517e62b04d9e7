//! Integration tests for the Attendee repository using in-memory
//! SurrealDB.

use convene_core::error::CoreError;
use convene_core::models::attendee::{AttendeeKey, CreateAttendee, RsvpStatus};
use convene_core::repository::AttendeeRepository;
use convene_db::repository::SurrealAttendeeRepository;
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

async fn setup() -> SurrealAttendeeRepository<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    convene_db::run_migrations(&db).await.unwrap();
    SurrealAttendeeRepository::new(db)
}

#[tokio::test]
async fn create_and_get_by_pair() {
    let repo = setup().await;
    let event = Uuid::new_v4();
    let user = Uuid::new_v4();

    let attendee = repo
        .create(CreateAttendee {
            event_id: event,
            user_id: user,
            rsvp: None,
        })
        .await
        .unwrap();

    assert_eq!(attendee.event_id, event);
    assert_eq!(attendee.user_id, user);
    assert_eq!(attendee.rsvp, RsvpStatus::Pending);

    let fetched = repo.get(AttendeeKey::new(event, user)).await.unwrap();
    assert_eq!(fetched.rsvp, RsvpStatus::Pending);
}

#[tokio::test]
async fn explicit_rsvp_persists() {
    let repo = setup().await;

    let attendee = repo
        .create(CreateAttendee {
            event_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            rsvp: Some(RsvpStatus::Yes),
        })
        .await
        .unwrap();

    assert_eq!(attendee.rsvp, RsvpStatus::Yes);
}

#[tokio::test]
async fn duplicate_pair_rejected_by_index() {
    let repo = setup().await;
    let event = Uuid::new_v4();
    let user = Uuid::new_v4();

    repo.create(CreateAttendee {
        event_id: event,
        user_id: user,
        rsvp: None,
    })
    .await
    .unwrap();

    let err = repo
        .create(CreateAttendee {
            event_id: event,
            user_id: user,
            rsvp: Some(RsvpStatus::No),
        })
        .await
        .unwrap_err();

    assert!(
        matches!(err, CoreError::AlreadyExists { .. }),
        "expected AlreadyExists, got: {err:?}"
    );
}

#[tokio::test]
async fn update_rsvp_overwrites() {
    let repo = setup().await;
    let event = Uuid::new_v4();
    let user = Uuid::new_v4();
    let key = AttendeeKey::new(event, user);

    repo.create(CreateAttendee {
        event_id: event,
        user_id: user,
        rsvp: None,
    })
    .await
    .unwrap();

    let updated = repo.update_rsvp(key, RsvpStatus::Yes).await.unwrap();
    assert_eq!(updated.rsvp, RsvpStatus::Yes);

    // Any value may follow any other.
    let updated = repo.update_rsvp(key, RsvpStatus::Pending).await.unwrap();
    assert_eq!(updated.rsvp, RsvpStatus::Pending);
}

#[tokio::test]
async fn update_rsvp_missing_pair_not_found() {
    let repo = setup().await;

    let err = repo
        .update_rsvp(
            AttendeeKey::new(Uuid::new_v4(), Uuid::new_v4()),
            RsvpStatus::Yes,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::NotFound { .. }));
}

#[tokio::test]
async fn delete_by_pair() {
    let repo = setup().await;
    let event = Uuid::new_v4();
    let user = Uuid::new_v4();
    let key = AttendeeKey::new(event, user);

    repo.create(CreateAttendee {
        event_id: event,
        user_id: user,
        rsvp: None,
    })
    .await
    .unwrap();

    repo.delete(key).await.unwrap();
    assert!(!repo.exists(key).await.unwrap());
}

#[tokio::test]
async fn list_and_count_by_event() {
    let repo = setup().await;
    let event = Uuid::new_v4();

    for rsvp in [RsvpStatus::Yes, RsvpStatus::Yes, RsvpStatus::No] {
        repo.create(CreateAttendee {
            event_id: event,
            user_id: Uuid::new_v4(),
            rsvp: Some(rsvp),
        })
        .await
        .unwrap();
    }
    // An attendee of another event is not counted.
    repo.create(CreateAttendee {
        event_id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        rsvp: None,
    })
    .await
    .unwrap();

    let attendees = repo.list_by_event(event).await.unwrap();
    assert_eq!(attendees.len(), 3);

    assert_eq!(repo.count_by_event(event).await.unwrap(), 3);
    assert_eq!(
        repo.count_by_event_and_rsvp(event, RsvpStatus::Yes)
            .await
            .unwrap(),
        2
    );
    assert_eq!(
        repo.count_by_event_and_rsvp(event, RsvpStatus::Pending)
            .await
            .unwrap(),
        0
    );
}
