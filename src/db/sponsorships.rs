//! Sponsorship repository.

use sqlx::SqlitePool;
use uuid::Uuid;

use super::models::Sponsorship;

/// Fields required to insert a sponsorship entry.
#[derive(Debug, Clone)]
pub struct NewSponsorship {
    pub kind: String,
    pub image: String,
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Whitelisted updatable fields.
#[derive(Debug, Clone, Default)]
pub struct SponsorshipUpdate {
    pub kind: Option<String>,
    pub image: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
}

pub async fn create(
    pool: &SqlitePool,
    new_sponsorship: NewSponsorship,
) -> Result<Sponsorship, sqlx::Error> {
    let sponsorship = Sponsorship {
        id: Uuid::new_v4().to_string(),
        kind: new_sponsorship.kind,
        image: new_sponsorship.image,
        title: new_sponsorship.title,
        description: new_sponsorship.description,
    };

    sqlx::query(
        "INSERT INTO sponsorships (id, type, image, title, description) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&sponsorship.id)
    .bind(&sponsorship.kind)
    .bind(&sponsorship.image)
    .bind(&sponsorship.title)
    .bind(&sponsorship.description)
    .execute(pool)
    .await?;

    Ok(sponsorship)
}

pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Sponsorship>, sqlx::Error> {
    sqlx::query_as::<_, Sponsorship>(
        "SELECT id, type, image, title, description FROM sponsorships",
    )
    .fetch_all(pool)
    .await
}

pub async fn find_by_id(
    pool: &SqlitePool,
    id: &str,
) -> Result<Option<Sponsorship>, sqlx::Error> {
    sqlx::query_as::<_, Sponsorship>(
        "SELECT id, type, image, title, description FROM sponsorships WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn update(
    pool: &SqlitePool,
    id: &str,
    changes: SponsorshipUpdate,
) -> Result<Option<Sponsorship>, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE sponsorships SET
            type = COALESCE(?, type),
            image = COALESCE(?, image),
            title = COALESCE(?, title),
            description = COALESCE(?, description)
        WHERE id = ?
        "#,
    )
    .bind(changes.kind)
    .bind(changes.image)
    .bind(changes.title)
    .bind(changes.description)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    find_by_id(pool, id).await
}

pub async fn delete(pool: &SqlitePool, id: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM sponsorships WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
