//! Integration tests for User and Organization repository
//! implementations using in-memory SurrealDB.

use convene_core::error::CoreError;
use convene_core::models::membership::{MembershipKey, MembershipStatus};
use convene_core::models::organization::{CreateOrganization, UpdateOrganization};
use convene_core::models::user::{CreateUser, UpdateUser};
use convene_core::repository::{
    MembershipRepository, OrganizationRepository, Pagination, UserRepository,
};
use convene_db::repository::{
    SurrealMembershipRepository, SurrealOrganizationRepository, SurrealUserRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

/// Helper: spin up in-memory DB and run migrations.
async fn setup() -> Surreal<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    convene_db::run_migrations(&db).await.unwrap();
    db
}

async fn create_user(
    db: &Surreal<surrealdb::engine::local::Db>,
    email: &str,
) -> convene_core::models::user::User {
    SurrealUserRepository::new(db.clone())
        .create(CreateUser {
            email: email.into(),
            display_name: "Test User".into(),
        })
        .await
        .unwrap()
}

// -----------------------------------------------------------------------
// User tests
// -----------------------------------------------------------------------

#[tokio::test]
async fn create_and_get_user() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    let user = repo
        .create(CreateUser {
            email: "alice@example.com".into(),
            display_name: "Alice".into(),
        })
        .await
        .unwrap();

    assert_eq!(user.email, "alice@example.com");
    assert_eq!(user.display_name, "Alice");
    assert!(user.is_active);

    let fetched = repo.get_by_id(user.id).await.unwrap();
    assert_eq!(fetched.id, user.id);
    assert_eq!(fetched.email, user.email);
}

#[tokio::test]
async fn get_user_by_email() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    let user = repo
        .create(CreateUser {
            email: "bob@example.com".into(),
            display_name: "Bob".into(),
        })
        .await
        .unwrap();

    let fetched = repo.get_by_email("bob@example.com").await.unwrap();
    assert_eq!(fetched.id, user.id);

    let missing = repo.get_by_email("nobody@example.com").await;
    assert!(matches!(missing, Err(CoreError::NotFound { .. })));
}

#[tokio::test]
async fn duplicate_email_rejected() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    repo.create(CreateUser {
        email: "same@example.com".into(),
        display_name: "First".into(),
    })
    .await
    .unwrap();

    let err = repo
        .create(CreateUser {
            email: "same@example.com".into(),
            display_name: "Second".into(),
        })
        .await
        .unwrap_err();

    assert!(
        matches!(err, CoreError::AlreadyExists { .. }),
        "expected AlreadyExists, got: {err:?}"
    );
}

#[tokio::test]
async fn user_exists() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db.clone());

    let user = create_user(&db, "carol@example.com").await;
    assert!(repo.exists(user.id).await.unwrap());
    assert!(!repo.exists(Uuid::new_v4()).await.unwrap());
}

#[tokio::test]
async fn update_user_display_name() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    let user = repo
        .create(CreateUser {
            email: "dave@example.com".into(),
            display_name: "Before".into(),
        })
        .await
        .unwrap();

    let updated = repo
        .update(
            user.id,
            UpdateUser {
                display_name: Some("After".into()),
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.display_name, "After");
    assert_eq!(updated.email, "dave@example.com"); // unchanged
    assert!(updated.updated_at >= user.updated_at);
}

#[tokio::test]
async fn list_users_with_pagination() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    for i in 0..5 {
        repo.create(CreateUser {
            email: format!("user-{i}@example.com"),
            display_name: format!("User {i}"),
        })
        .await
        .unwrap();
    }

    let page1 = repo
        .list(Pagination {
            offset: 0,
            limit: 3,
        })
        .await
        .unwrap();

    assert_eq!(page1.items.len(), 3);
    assert_eq!(page1.total, 5);

    let page2 = repo
        .list(Pagination {
            offset: 3,
            limit: 3,
        })
        .await
        .unwrap();

    assert_eq!(page2.items.len(), 2);
}

// -----------------------------------------------------------------------
// Organization tests
// -----------------------------------------------------------------------

#[tokio::test]
async fn create_organization_creates_owner_membership() {
    let db = setup().await;
    let user = create_user(&db, "owner@example.com").await;

    let org_repo = SurrealOrganizationRepository::new(db.clone());
    let (org, membership) = org_repo
        .create(CreateOrganization {
            name: "Acme".into(),
            created_by: user.id,
        })
        .await
        .unwrap();

    assert_eq!(org.name, "Acme");
    assert_eq!(org.created_by, user.id);
    assert_eq!(membership.organization_id, org.id);
    assert_eq!(membership.user_id, user.id);
    assert_eq!(membership.status, MembershipStatus::Active);

    // Both writes are visible.
    let member_repo = SurrealMembershipRepository::new(db);
    let fetched = member_repo
        .get(MembershipKey::new(org.id, user.id))
        .await
        .unwrap();
    assert_eq!(fetched.status, MembershipStatus::Active);
}

#[tokio::test]
async fn duplicate_organization_name_rejected_without_orphan_membership() {
    let db = setup().await;
    let u1 = create_user(&db, "u1@example.com").await;
    let u2 = create_user(&db, "u2@example.com").await;

    let org_repo = SurrealOrganizationRepository::new(db.clone());
    org_repo
        .create(CreateOrganization {
            name: "Acme".into(),
            created_by: u1.id,
        })
        .await
        .unwrap();

    let err = org_repo
        .create(CreateOrganization {
            name: "Acme".into(),
            created_by: u2.id,
        })
        .await
        .unwrap_err();

    assert!(
        matches!(err, CoreError::AlreadyExists { .. }),
        "expected AlreadyExists, got: {err:?}"
    );

    // The failed transaction left no membership behind for u2.
    let member_repo = SurrealMembershipRepository::new(db);
    assert_eq!(member_repo.count_for_user(u2.id).await.unwrap(), 0);
}

#[tokio::test]
async fn transaction_rolls_back_on_failure() {
    let db = setup().await;
    let user = create_user(&db, "txn@example.com").await;

    // The organization create relies on the store cancelling every
    // statement of a transaction when one fails. Exercise that
    // behavior directly: the THROW aborts the whole query.
    let result = db
        .query(
            "BEGIN TRANSACTION; \
             CREATE type::record('organization', $id) SET \
             name = 'Doomed', created_by = $created_by; \
             THROW 'membership creation failed'; \
             COMMIT TRANSACTION;",
        )
        .bind(("id", Uuid::new_v4().to_string()))
        .bind(("created_by", user.id.to_string()))
        .await
        .unwrap()
        .check();
    assert!(result.is_err());

    // The organization write is not visible afterward.
    let org_repo = SurrealOrganizationRepository::new(db);
    let missing = org_repo.get_by_name("Doomed").await;
    assert!(matches!(missing, Err(CoreError::NotFound { .. })));
}

#[tokio::test]
async fn get_organization_by_name() {
    let db = setup().await;
    let user = create_user(&db, "name@example.com").await;

    let org_repo = SurrealOrganizationRepository::new(db);
    let (org, _) = org_repo
        .create(CreateOrganization {
            name: "Lookup Co".into(),
            created_by: user.id,
        })
        .await
        .unwrap();

    let fetched = org_repo.get_by_name("Lookup Co").await.unwrap();
    assert_eq!(fetched.id, org.id);

    // Exact-match is case-sensitive.
    let missing = org_repo.get_by_name("lookup co").await;
    assert!(matches!(missing, Err(CoreError::NotFound { .. })));
}

#[tokio::test]
async fn update_organization() {
    let db = setup().await;
    let u1 = create_user(&db, "before@example.com").await;
    let u2 = create_user(&db, "after@example.com").await;

    let org_repo = SurrealOrganizationRepository::new(db);
    let (org, _) = org_repo
        .create(CreateOrganization {
            name: "Before".into(),
            created_by: u1.id,
        })
        .await
        .unwrap();

    let updated = org_repo
        .update(
            org.id,
            UpdateOrganization {
                name: "After".into(),
                created_by: u2.id,
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.id, org.id);
    assert_eq!(updated.name, "After");
    assert_eq!(updated.created_by, u2.id);
    assert_eq!(updated.created_at, org.created_at);
}

#[tokio::test]
async fn delete_organization() {
    let db = setup().await;
    let user = create_user(&db, "delete@example.com").await;

    let org_repo = SurrealOrganizationRepository::new(db);
    let (org, _) = org_repo
        .create(CreateOrganization {
            name: "To Delete".into(),
            created_by: user.id,
        })
        .await
        .unwrap();

    org_repo.delete(org.id).await.unwrap();

    let result = org_repo.get_by_id(org.id).await;
    assert!(matches!(result, Err(CoreError::NotFound { .. })));
}

#[tokio::test]
async fn list_organizations_with_pagination() {
    let db = setup().await;
    let user = create_user(&db, "list@example.com").await;

    let org_repo = SurrealOrganizationRepository::new(db);
    for i in 0..4 {
        org_repo
            .create(CreateOrganization {
                name: format!("Org {i}"),
                created_by: user.id,
            })
            .await
            .unwrap();
    }

    let page = org_repo
        .list(Pagination {
            offset: 0,
            limit: 10,
        })
        .await
        .unwrap();

    assert_eq!(page.items.len(), 4);
    assert_eq!(page.total, 4);
}
