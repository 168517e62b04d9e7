//! Integration tests for the event scheduling service under both
//! conflict policies.

use chrono::{DateTime, TimeZone, Utc};
use convene_core::error::CoreError;
use convene_core::models::event::{CreateEvent, UpdateEvent};
use convene_core::models::user::CreateUser;
use convene_core::repository::{OrganizationRepository, UserRepository};
use convene_db::repository::{
    SurrealEventRepository, SurrealOrganizationRepository, SurrealUserRepository,
};
use convene_service::{ConflictPolicy, EventService};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

type Db = surrealdb::engine::local::Db;

async fn setup(
    policy: ConflictPolicy,
) -> (
    EventService<SurrealEventRepository<Db>, SurrealOrganizationRepository<Db>>,
    Surreal<Db>, // raw db handle
) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    convene_db::run_migrations(&db).await.unwrap();

    let svc = EventService::new(
        SurrealEventRepository::new(db.clone()),
        SurrealOrganizationRepository::new(db.clone()),
        policy,
    );

    (svc, db)
}

/// Create a user and an organization, returning the organization id.
async fn create_organization(db: &Surreal<Db>, name: &str) -> Uuid {
    let user = SurrealUserRepository::new(db.clone())
        .create(CreateUser {
            email: format!("{name}@example.com"),
            display_name: name.into(),
        })
        .await
        .unwrap();
    let (org, _) = SurrealOrganizationRepository::new(db.clone())
        .create(convene_core::models::organization::CreateOrganization {
            name: name.into(),
            created_by: user.id,
        })
        .await
        .unwrap();
    org.id
}

fn t(hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, hour, min, 0).unwrap()
}

fn event_input(title: &str, starts_at: DateTime<Utc>, ends_at: DateTime<Utc>) -> CreateEvent {
    CreateEvent {
        organization_id: Uuid::new_v4(),
        created_by: Uuid::new_v4(),
        title: title.into(),
        description: None,
        starts_at,
        ends_at,
        capacity: None,
        location: None,
    }
}

fn update_input(title: &str, starts_at: DateTime<Utc>, ends_at: DateTime<Utc>) -> UpdateEvent {
    UpdateEvent {
        organization_id: Uuid::new_v4(),
        title: title.into(),
        description: None,
        starts_at,
        ends_at,
        capacity: None,
        location: None,
    }
}

// -----------------------------------------------------------------------
// Shared validation
// -----------------------------------------------------------------------

#[tokio::test]
async fn blank_title_rejected() {
    let (svc, _db) = setup(ConflictPolicy::GlobalOverlap).await;

    let err = svc
        .create(event_input("  ", t(10, 0), t(11, 0)))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidArgument { .. }));
}

#[tokio::test]
async fn start_must_be_strictly_before_end() {
    let (svc, _db) = setup(ConflictPolicy::GlobalOverlap).await;

    // Equal endpoints are an empty interval.
    let err = svc
        .create(event_input("Empty", t(10, 0), t(10, 0)))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidArgument { .. }));

    // Reversed endpoints.
    let err = svc
        .create(event_input("Reversed", t(11, 0), t(10, 0)))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidArgument { .. }));
}

#[tokio::test]
async fn title_is_trimmed() {
    let (svc, _db) = setup(ConflictPolicy::GlobalOverlap).await;

    let event = svc
        .create(event_input("  Standup  ", t(10, 0), t(11, 0)))
        .await
        .unwrap();
    assert_eq!(event.title, "Standup");
}

// -----------------------------------------------------------------------
// Global overlap policy
// -----------------------------------------------------------------------

#[tokio::test]
async fn overlapping_create_rejected() {
    let (svc, _db) = setup(ConflictPolicy::GlobalOverlap).await;

    svc.create(event_input("A", t(10, 0), t(11, 0)))
        .await
        .unwrap();

    // [10:30, 11:30) overlaps [10:00, 11:00).
    let err = svc
        .create(event_input("B", t(10, 30), t(11, 30)))
        .await
        .unwrap_err();
    assert!(
        matches!(err, CoreError::Conflict { .. }),
        "expected Conflict, got: {err:?}"
    );
}

#[tokio::test]
async fn boundary_touching_create_allowed() {
    let (svc, _db) = setup(ConflictPolicy::GlobalOverlap).await;

    svc.create(event_input("A", t(10, 0), t(11, 0)))
        .await
        .unwrap();

    // [11:00, 12:00) only touches the boundary of [10:00, 11:00).
    let event = svc
        .create(event_input("C", t(11, 0), t(12, 0)))
        .await
        .unwrap();
    assert_eq!(event.title, "C");
}

#[tokio::test]
async fn identical_interval_rejected() {
    let (svc, _db) = setup(ConflictPolicy::GlobalOverlap).await;

    svc.create(event_input("A", t(10, 0), t(11, 0)))
        .await
        .unwrap();

    let err = svc
        .create(event_input("Twin", t(10, 0), t(11, 0)))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Conflict { .. }));
}

#[tokio::test]
async fn conflict_message_names_the_other_event() {
    let (svc, _db) = setup(ConflictPolicy::GlobalOverlap).await;

    let existing = svc
        .create(event_input("Planning", t(10, 0), t(11, 0)))
        .await
        .unwrap();

    let err = svc
        .create(event_input("B", t(10, 30), t(11, 30)))
        .await
        .unwrap_err();
    assert!(err.to_string().contains(&existing.id.to_string()));
}

#[tokio::test]
async fn update_excludes_own_interval() {
    let (svc, _db) = setup(ConflictPolicy::GlobalOverlap).await;

    let event = svc
        .create(event_input("Movable", t(10, 0), t(11, 0)))
        .await
        .unwrap();

    // Shifting within a range that overlaps only itself is fine.
    let updated = svc
        .update(event.id, update_input("Movable", t(10, 30), t(11, 30)))
        .await
        .unwrap();
    assert_eq!(updated.starts_at, t(10, 30));
}

#[tokio::test]
async fn update_conflicting_with_another_event_rejected() {
    let (svc, _db) = setup(ConflictPolicy::GlobalOverlap).await;

    svc.create(event_input("Fixed", t(13, 0), t(14, 0)))
        .await
        .unwrap();
    let event = svc
        .create(event_input("Movable", t(10, 0), t(11, 0)))
        .await
        .unwrap();

    let err = svc
        .update(event.id, update_input("Movable", t(13, 30), t(14, 30)))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Conflict { .. }));
}

#[tokio::test]
async fn update_missing_event_not_found() {
    let (svc, _db) = setup(ConflictPolicy::GlobalOverlap).await;

    let err = svc
        .update(Uuid::new_v4(), update_input("Ghost", t(10, 0), t(11, 0)))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound { .. }));
}

#[tokio::test]
async fn update_revalidates_fields() {
    let (svc, _db) = setup(ConflictPolicy::GlobalOverlap).await;

    let event = svc
        .create(event_input("Valid", t(10, 0), t(11, 0)))
        .await
        .unwrap();

    let err = svc
        .update(event.id, update_input("Valid", t(11, 0), t(10, 0)))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidArgument { .. }));
}

#[tokio::test]
async fn find_conflicting_is_queryable_and_idempotent() {
    let (svc, _db) = setup(ConflictPolicy::GlobalOverlap).await;

    svc.create(event_input("A", t(10, 0), t(11, 0)))
        .await
        .unwrap();
    svc.create(event_input("B", t(12, 0), t(13, 0)))
        .await
        .unwrap();

    let hits = svc.find_conflicting(t(10, 30), t(12, 30)).await.unwrap();
    assert_eq!(hits.len(), 2);

    // Same result with no intervening write.
    let again = svc.find_conflicting(t(10, 30), t(12, 30)).await.unwrap();
    assert_eq!(again.len(), 2);

    let none = svc.find_conflicting(t(14, 0), t(15, 0)).await.unwrap();
    assert!(none.is_empty());
}

// -----------------------------------------------------------------------
// Creator-gated deletion
// -----------------------------------------------------------------------

#[tokio::test]
async fn only_the_creator_may_delete() {
    let (svc, _db) = setup(ConflictPolicy::GlobalOverlap).await;
    let creator = Uuid::new_v4();

    let event = svc
        .create(CreateEvent {
            created_by: creator,
            ..event_input("Owned", t(10, 0), t(11, 0))
        })
        .await
        .unwrap();

    let err = svc.delete(event.id, Uuid::new_v4()).await.unwrap_err();
    assert!(
        matches!(err, CoreError::Forbidden { .. }),
        "expected Forbidden, got: {err:?}"
    );

    // Still present, then deletable by its creator.
    svc.get(event.id).await.unwrap();
    svc.delete(event.id, creator).await.unwrap();

    let gone = svc.get(event.id).await;
    assert!(matches!(gone, Err(CoreError::NotFound { .. })));
}

#[tokio::test]
async fn delete_missing_event_not_found() {
    let (svc, _db) = setup(ConflictPolicy::GlobalOverlap).await;

    let err = svc.delete(Uuid::new_v4(), Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, CoreError::NotFound { .. }));
}

// -----------------------------------------------------------------------
// Organization-scoped policy
// -----------------------------------------------------------------------

#[tokio::test]
async fn org_scoped_create_requires_existing_organization() {
    let (svc, db) = setup(ConflictPolicy::OrganizationScoped).await;

    let err = svc
        .create(event_input("Orphan", t(10, 0), t(11, 0)))
        .await
        .unwrap_err();
    assert!(
        matches!(err, CoreError::InvalidArgument { .. }),
        "expected InvalidArgument, got: {err:?}"
    );

    let org_id = create_organization(&db, "acme").await;
    let event = svc
        .create(CreateEvent {
            organization_id: org_id,
            ..event_input("Scoped", t(10, 0), t(11, 0))
        })
        .await
        .unwrap();
    assert_eq!(event.organization_id, org_id);
}

#[tokio::test]
async fn org_scoped_policy_does_not_reject_overlap() {
    let (svc, db) = setup(ConflictPolicy::OrganizationScoped).await;
    let org_id = create_organization(&db, "acme").await;

    svc.create(CreateEvent {
        organization_id: org_id,
        ..event_input("A", t(10, 0), t(11, 0))
    })
    .await
    .unwrap();

    // The same interval is accepted; only the organization check runs.
    let second = svc
        .create(CreateEvent {
            organization_id: org_id,
            ..event_input("B", t(10, 0), t(11, 0))
        })
        .await
        .unwrap();
    assert_eq!(second.title, "B");
}

#[tokio::test]
async fn org_scoped_update_revalidates_organization() {
    let (svc, db) = setup(ConflictPolicy::OrganizationScoped).await;
    let org_id = create_organization(&db, "acme").await;

    let event = svc
        .create(CreateEvent {
            organization_id: org_id,
            ..event_input("Scoped", t(10, 0), t(11, 0))
        })
        .await
        .unwrap();

    // Re-pointing the event at a nonexistent organization fails.
    let err = svc
        .update(
            event.id,
            UpdateEvent {
                organization_id: Uuid::new_v4(),
                ..update_input("Scoped", t(10, 0), t(11, 0))
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidArgument { .. }));
}
