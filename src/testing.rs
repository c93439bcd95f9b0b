//! Fixtures shared by unit tests
use crate::db;
use sqlx::SqlitePool;

/// Fresh in-memory database with the schema applied
pub async fn memory_db() -> SqlitePool {
    db::create_memory_pool().await.unwrap()
}

/// Insert an account with a throwaway password hash
pub async fn insert_account(db: &SqlitePool, email: &str) -> i64 {
    sqlx::query(
        "INSERT INTO accounts (email, password_hash, language, country) VALUES (?1, ?2, 'en-us', 'US')",
    )
    .bind(email)
    .bind("$2b$04$invalidinvalidinvalidinvalidinvalidinvalidinvalidinva")
    .execute(db)
    .await
    .unwrap()
    .last_insert_rowid()
}
