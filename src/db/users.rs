//! User repository: keyed lookups by id, username and chat id, plus the
//! recipient query used by broadcast fan-out.

use sqlx::SqlitePool;
use uuid::Uuid;

use super::models::{Role, User};

/// Fields required to insert a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub username: String,
    /// Already hashed; repositories never see plaintext passwords.
    pub password_hash: String,
    pub role: Role,
    pub chat_id: Option<i64>,
    pub profile_image: Option<String>,
}

/// Whitelisted updatable fields; anything absent keeps its stored value.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub role: Option<Role>,
    pub password_hash: Option<String>,
    pub profile_image: Option<String>,
}

pub async fn create(pool: &SqlitePool, new_user: NewUser) -> Result<User, sqlx::Error> {
    let user = User {
        id: Uuid::new_v4().to_string(),
        name: new_user.name,
        username: new_user.username,
        password: new_user.password_hash,
        role: new_user.role,
        chat_id: new_user.chat_id,
        profile_image: new_user.profile_image,
    };

    sqlx::query(
        r#"
        INSERT INTO users (id, name, username, password, role, chat_id, profile_image)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&user.id)
    .bind(&user.name)
    .bind(&user.username)
    .bind(&user.password)
    .bind(user.role)
    .bind(user.chat_id)
    .bind(&user.profile_image)
    .execute(pool)
    .await?;

    Ok(user)
}

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT id, name, username, password, role, chat_id, profile_image FROM users WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn find_by_username(
    pool: &SqlitePool,
    username: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT id, name, username, password, role, chat_id, profile_image FROM users WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(pool)
    .await
}

pub async fn find_by_chat_id(
    pool: &SqlitePool,
    chat_id: i64,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT id, name, username, password, role, chat_id, profile_image FROM users WHERE chat_id = ?",
    )
    .bind(chat_id)
    .fetch_optional(pool)
    .await
}

pub async fn find_all(pool: &SqlitePool) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT id, name, username, password, role, chat_id, profile_image FROM users",
    )
    .fetch_all(pool)
    .await
}

/// All users with a linked chat, optionally capped; store order.
pub async fn find_all_with_chat_id(
    pool: &SqlitePool,
    limit: Option<i64>,
) -> Result<Vec<User>, sqlx::Error> {
    // SQLite treats LIMIT -1 as "no limit".
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, username, password, role, chat_id, profile_image
        FROM users WHERE chat_id IS NOT NULL LIMIT ?
        "#,
    )
    .bind(limit.unwrap_or(-1))
    .fetch_all(pool)
    .await
}

/// Apply a whitelisted-field update and return the stored row.
pub async fn update(
    pool: &SqlitePool,
    id: &str,
    changes: UserUpdate,
) -> Result<Option<User>, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE users SET
            name = COALESCE(?, name),
            role = COALESCE(?, role),
            password = COALESCE(?, password),
            profile_image = COALESCE(?, profile_image)
        WHERE id = ?
        "#,
    )
    .bind(changes.name)
    .bind(changes.role)
    .bind(changes.password_hash)
    .bind(changes.profile_image)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    find_by_id(pool, id).await
}

/// Delete a user by id; returns the number of rows removed.
pub async fn delete(pool: &SqlitePool, id: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn new_user(username: &str, chat_id: Option<i64>) -> NewUser {
        NewUser {
            name: format!("name-{username}"),
            username: username.to_string(),
            password_hash: "hash".to_string(),
            role: Role::User,
            chat_id,
            profile_image: None,
        }
    }

    #[tokio::test]
    async fn create_and_lookup() {
        let db = Database::connect_in_memory().await.expect("db");
        let created = create(db.pool(), new_user("sokha", Some(7))).await.expect("create");

        let by_username = find_by_username(db.pool(), "sokha")
            .await
            .expect("query")
            .expect("found");
        assert_eq!(by_username.id, created.id);

        let by_chat = find_by_chat_id(db.pool(), 7)
            .await
            .expect("query")
            .expect("found");
        assert_eq!(by_chat.username, "sokha");

        assert!(find_by_chat_id(db.pool(), 8).await.expect("query").is_none());
    }

    #[tokio::test]
    async fn recipient_query_filters_and_limits() {
        let db = Database::connect_in_memory().await.expect("db");
        create(db.pool(), new_user("a", Some(1))).await.expect("create");
        create(db.pool(), new_user("b", None)).await.expect("create");
        create(db.pool(), new_user("c", Some(3))).await.expect("create");

        let all = find_all_with_chat_id(db.pool(), None).await.expect("query");
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|u| u.chat_id.is_some()));

        let capped = find_all_with_chat_id(db.pool(), Some(1)).await.expect("query");
        assert_eq!(capped.len(), 1);
    }

    #[tokio::test]
    async fn update_only_touches_whitelisted_fields() {
        let db = Database::connect_in_memory().await.expect("db");
        let created = create(db.pool(), new_user("vanny", Some(9))).await.expect("create");

        let updated = update(
            db.pool(),
            &created.id,
            UserUpdate {
                name: Some("Vanny".to_string()),
                role: Some(Role::Admin),
                ..UserUpdate::default()
            },
        )
        .await
        .expect("update")
        .expect("found");

        assert_eq!(updated.name, "Vanny");
        assert_eq!(updated.role, Role::Admin);
        // Untouched fields keep their stored values.
        assert_eq!(updated.password, "hash");
        assert_eq!(updated.chat_id, Some(9));

        assert!(update(db.pool(), "missing", UserUpdate::default())
            .await
            .expect("update")
            .is_none());
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let db = Database::connect_in_memory().await.expect("db");
        create(db.pool(), new_user("dara", None)).await.expect("create");
        assert!(create(db.pool(), new_user("dara", None)).await.is_err());
    }
}
