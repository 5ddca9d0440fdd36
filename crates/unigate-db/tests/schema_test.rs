//! Integration tests for schema initialization using in-memory SurrealDB.

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;

#[tokio::test]
async fn schema_migration_applies_successfully() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    unigate_db::run_migrations(&db).await.unwrap();

    // Verify that the tables exist by querying INFO FOR DB.
    let mut result = db.query("INFO FOR DB").await.unwrap();
    let info: Option<surrealdb_types::Value> = result.take(0).unwrap();
    let info = info.expect("INFO FOR DB should return a value");
    let info_str = format!("{:?}", info);

    assert!(info_str.contains("user"), "missing user table");
    assert!(info_str.contains("profile"), "missing profile table");
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    unigate_db::run_migrations(&db).await.unwrap();
    // A second run must be a no-op, not a failure.
    unigate_db::run_migrations(&db).await.unwrap();
}

#[tokio::test]
async fn username_uniqueness_is_enforced() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    unigate_db::run_migrations(&db).await.unwrap();

    db.query(
        "CREATE user SET username = 'alice', password_hash = 'h', \
         role = 'Student', authorities = []",
    )
    .await
    .unwrap()
    .check()
    .unwrap();

    let duplicate = db
        .query(
            "CREATE user SET username = 'alice', password_hash = 'h', \
             role = 'Student', authorities = []",
        )
        .await
        .unwrap()
        .check();
    assert!(duplicate.is_err(), "duplicate username must be rejected");
}
