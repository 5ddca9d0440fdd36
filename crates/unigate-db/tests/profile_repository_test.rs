//! Integration tests for the Profile repository using in-memory SurrealDB.

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use unigate_core::models::profile::{CreateProfile, ProfileKind};
use unigate_core::repository::ProfileRepository;
use unigate_db::repository::SurrealProfileRepository;
use uuid::Uuid;

async fn setup() -> Surreal<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    unigate_db::run_migrations(&db).await.unwrap();
    db
}

#[tokio::test]
async fn create_and_find_by_number() {
    let db = setup().await;
    let repo = SurrealProfileRepository::new(db);

    let profile = repo
        .create(CreateProfile {
            kind: ProfileKind::Employee,
            number: "E-1001".into(),
            email: "dana@example.edu".into(),
        })
        .await
        .unwrap();

    assert_eq!(profile.kind, ProfileKind::Employee);
    assert_eq!(profile.number, "E-1001");
    assert!(profile.user_id.is_none(), "profiles start unlinked");

    let found = repo
        .find_by_number(ProfileKind::Employee, "E-1001")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, profile.id);

    assert!(
        repo.find_by_number(ProfileKind::Employee, "E-9999")
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn numbers_are_scoped_per_kind() {
    let db = setup().await;
    let repo = SurrealProfileRepository::new(db);

    repo.create(CreateProfile {
        kind: ProfileKind::Employee,
        number: "1001".into(),
        email: "dana@example.edu".into(),
    })
    .await
    .unwrap();
    repo.create(CreateProfile {
        kind: ProfileKind::Student,
        number: "1001".into(),
        email: "sam@example.edu".into(),
    })
    .await
    .unwrap();

    let employee = repo
        .find_by_number(ProfileKind::Employee, "1001")
        .await
        .unwrap()
        .unwrap();
    let student = repo
        .find_by_number(ProfileKind::Student, "1001")
        .await
        .unwrap()
        .unwrap();

    assert_ne!(employee.id, student.id);
    assert_eq!(employee.email, "dana@example.edu");
    assert_eq!(student.email, "sam@example.edu");
}

#[tokio::test]
async fn find_by_email() {
    let db = setup().await;
    let repo = SurrealProfileRepository::new(db);

    repo.create(CreateProfile {
        kind: ProfileKind::External,
        number: "X-42".into(),
        email: "vendor@example.com".into(),
    })
    .await
    .unwrap();

    let found = repo.find_by_email("vendor@example.com").await.unwrap();
    assert_eq!(found.unwrap().number, "X-42");

    assert!(repo.find_by_email("nobody@example.com").await.unwrap().is_none());
}

#[tokio::test]
async fn link_user_and_list_by_user() {
    let db = setup().await;
    let repo = SurrealProfileRepository::new(db);
    let user_id = Uuid::new_v4();

    let profile = repo
        .create(CreateProfile {
            kind: ProfileKind::Student,
            number: "S-2002".into(),
            email: "sam@example.edu".into(),
        })
        .await
        .unwrap();

    let linked = repo.link_user(profile.id, user_id).await.unwrap();
    assert_eq!(linked.user_id, Some(user_id));

    let owned = repo.list_by_user(user_id).await.unwrap();
    assert_eq!(owned.len(), 1);
    assert_eq!(owned[0].id, profile.id);

    assert!(repo.list_by_user(Uuid::new_v4()).await.unwrap().is_empty());
}
