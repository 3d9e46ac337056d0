//! OTP session repository.
//!
//! Rows are matched on the exact (username, otp) pair; deletion always
//! removes every row for the username.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::models::Session;

pub async fn create(
    pool: &SqlitePool,
    username: &str,
    otp: &str,
    expires_at: DateTime<Utc>,
) -> Result<Session, sqlx::Error> {
    let session = Session {
        id: Uuid::new_v4().to_string(),
        username: username.to_string(),
        otp: otp.to_string(),
        expires_at,
    };

    sqlx::query("INSERT INTO sessions (id, username, otp, expires_at) VALUES (?, ?, ?, ?)")
        .bind(&session.id)
        .bind(&session.username)
        .bind(&session.otp)
        .bind(session.expires_at)
        .execute(pool)
        .await?;

    Ok(session)
}

pub async fn find_by_username_and_otp(
    pool: &SqlitePool,
    username: &str,
    otp: &str,
) -> Result<Option<Session>, sqlx::Error> {
    sqlx::query_as::<_, Session>(
        "SELECT id, username, otp, expires_at FROM sessions WHERE username = ? AND otp = ?",
    )
    .bind(username)
    .bind(otp)
    .fetch_optional(pool)
    .await
}

/// Remove every session row for the username, not just a matched one.
pub async fn delete_for_username(pool: &SqlitePool, username: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM sessions WHERE username = ?")
        .bind(username)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use chrono::Duration;

    #[tokio::test]
    async fn exact_pair_match_only() {
        let db = Database::connect_in_memory().await.expect("db");
        let expires = Utc::now() + Duration::minutes(5);
        create(db.pool(), "sokha", "123456", expires).await.expect("create");

        assert!(find_by_username_and_otp(db.pool(), "sokha", "123456")
            .await
            .expect("query")
            .is_some());
        assert!(find_by_username_and_otp(db.pool(), "sokha", "654321")
            .await
            .expect("query")
            .is_none());
        assert!(find_by_username_and_otp(db.pool(), "other", "123456")
            .await
            .expect("query")
            .is_none());
    }

    #[tokio::test]
    async fn delete_removes_all_rows_for_username() {
        let db = Database::connect_in_memory().await.expect("db");
        let expires = Utc::now() + Duration::minutes(5);
        create(db.pool(), "sokha", "111111", expires).await.expect("create");
        create(db.pool(), "sokha", "222222", expires).await.expect("create");
        create(db.pool(), "dara", "333333", expires).await.expect("create");

        let removed = delete_for_username(db.pool(), "sokha").await.expect("delete");
        assert_eq!(removed, 2);
        assert!(find_by_username_and_otp(db.pool(), "dara", "333333")
            .await
            .expect("query")
            .is_some());
    }
}
