//! Integration tests for the User repository using in-memory SurrealDB.

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use unigate_core::error::UnigateError;
use unigate_core::models::user::{CreateUser, OtpEffect, Role, UpdateUser};
use unigate_core::repository::{Pagination, UserRepository};
use unigate_db::repository::SurrealUserRepository;
use unigate_db::verify_password;

/// Helper: spin up in-memory DB and run migrations.
async fn setup() -> Surreal<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    unigate_db::run_migrations(&db).await.unwrap();
    db
}

fn alice() -> CreateUser {
    CreateUser {
        username: "alice".into(),
        password: "correct-horse-battery!".into(),
        otp: "AB12CD34EF".into(),
        role: Role::Student,
        authorities: vec!["user:read".into()],
    }
}

#[tokio::test]
async fn create_and_get_user() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    let user = repo.create(alice()).await.unwrap();

    assert_eq!(user.username, "alice");
    assert_eq!(user.role, Role::Student);
    assert_eq!(user.authorities, vec!["user:read".to_string()]);
    assert_eq!(user.otp.as_deref(), Some("AB12CD34EF"));
    assert!(user.locked, "new accounts start locked");
    assert!(user.active);
    assert!(user.last_login_at.is_none());

    // Password should be hashed, not stored in plaintext.
    assert_ne!(user.password_hash, "correct-horse-battery!");
    assert!(user.password_hash.starts_with("$argon2id$"));

    // Get by ID should return the same user.
    let fetched = repo.get_by_id(user.id).await.unwrap();
    assert_eq!(fetched.id, user.id);
    assert_eq!(fetched.username, "alice");
}

#[tokio::test]
async fn password_verification() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    let user = repo.create(alice()).await.unwrap();

    assert!(verify_password("correct-horse-battery!", &user.password_hash, None).unwrap());
    assert!(!verify_password("wrong-password", &user.password_hash, None).unwrap());
}

#[tokio::test]
async fn password_with_pepper() {
    let db = setup().await;
    let pepper = "server-secret-pepper".to_string();
    let repo = SurrealUserRepository::with_pepper(db, pepper.clone());

    let user = repo.create(alice()).await.unwrap();

    assert!(verify_password("correct-horse-battery!", &user.password_hash, Some(&pepper)).unwrap());
    // Without pepper the same password must not verify.
    assert!(!verify_password("correct-horse-battery!", &user.password_hash, None).unwrap());
}

#[tokio::test]
async fn get_by_username_absent_is_not_found() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    let err = repo.get_by_username("nobody").await.unwrap_err();
    assert!(matches!(err, UnigateError::NotFound { .. }));

    assert!(repo.find_by_username("nobody").await.unwrap().is_none());
}

#[tokio::test]
async fn find_by_username_and_otp() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    let created = repo.create(alice()).await.unwrap();

    let by_name = repo.find_by_username("alice").await.unwrap().unwrap();
    assert_eq!(by_name.id, created.id);

    let by_otp = repo.find_by_otp("AB12CD34EF").await.unwrap().unwrap();
    assert_eq!(by_otp.id, created.id);

    assert!(repo.find_by_otp("WRONGCODE1").await.unwrap().is_none());
}

#[tokio::test]
async fn update_sets_and_clears_otp() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    let user = repo.create(alice()).await.unwrap();

    let updated = repo
        .update(
            user.id,
            UpdateUser {
                otp: Some(Some("ZZ99YY88XX".into())),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.otp.as_deref(), Some("ZZ99YY88XX"));

    let cleared = repo
        .update(
            user.id,
            UpdateUser {
                otp: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(cleared.otp.is_none());
}

#[tokio::test]
async fn consume_otp_unlock() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    let user = repo.create(alice()).await.unwrap();

    let consumed = repo
        .consume_otp(user.id, "AB12CD34EF", OtpEffect::Unlock)
        .await
        .unwrap()
        .expect("matching code should consume");
    assert!(!consumed.locked);
    assert!(consumed.otp.is_none());

    // Consumption is one-shot: the same code cannot match again.
    let again = repo
        .consume_otp(user.id, "AB12CD34EF", OtpEffect::Unlock)
        .await
        .unwrap();
    assert!(again.is_none());
}

#[tokio::test]
async fn consume_otp_mismatch_leaves_record_untouched() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    let user = repo.create(alice()).await.unwrap();

    let outcome = repo
        .consume_otp(user.id, "WRONGCODE1", OtpEffect::Unlock)
        .await
        .unwrap();
    assert!(outcome.is_none());

    let fetched = repo.get_by_id(user.id).await.unwrap();
    assert!(fetched.locked);
    assert_eq!(fetched.otp.as_deref(), Some("AB12CD34EF"));
}

#[tokio::test]
async fn consume_otp_set_password() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    let user = repo.create(alice()).await.unwrap();
    let old_hash = user.password_hash.clone();

    let consumed = repo
        .consume_otp(
            user.id,
            "AB12CD34EF",
            OtpEffect::SetPassword("$argon2id$new-hash".into()),
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(consumed.password_hash, "$argon2id$new-hash");
    assert_ne!(consumed.password_hash, old_hash);
    assert!(consumed.otp.is_none());
    // The unlock flag is not part of the password effect.
    assert!(consumed.locked);
}

#[tokio::test]
async fn consume_otp_rename() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    let user = repo.create(alice()).await.unwrap();

    let consumed = repo
        .consume_otp(user.id, "AB12CD34EF", OtpEffect::Rename("alicia".into()))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(consumed.username, "alicia");
    assert!(consumed.otp.is_none());

    assert!(repo.find_by_username("alice").await.unwrap().is_none());
    assert!(repo.find_by_username("alicia").await.unwrap().is_some());
}

#[tokio::test]
async fn list_pages_in_join_order() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    for name in ["alice", "bob", "carol"] {
        repo.create(CreateUser {
            username: name.into(),
            password: "pw-with-dash!".into(),
            otp: format!("{name:X<10.10}"),
            role: Role::Employee,
            authorities: vec![],
        })
        .await
        .unwrap();
    }

    let page = repo
        .list(Pagination {
            offset: 0,
            limit: 2,
        })
        .await
        .unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.items.len(), 2);

    let rest = repo
        .list(Pagination {
            offset: 2,
            limit: 2,
        })
        .await
        .unwrap();
    assert_eq!(rest.items.len(), 1);
}
