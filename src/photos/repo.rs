use anyhow::Context;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct PhotoRow {
    pub id: Uuid,
    pub s3_key: String,
    pub created_at: OffsetDateTime,
}

/// Insert an uploaded photo's row within the surrounding transaction.
pub async fn insert_photo_tx(
    tx: &mut Transaction<'_, Postgres>,
    photo_id: Uuid,
    user_id: Uuid,
    s3_key: &str,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO progress_photos (id, user_id, s3_key, status)
        VALUES ($1, $2, $3, 'uploaded')
        "#,
    )
    .bind(photo_id)
    .bind(user_id)
    .bind(s3_key)
    .execute(&mut **tx)
    .await
    .context("insert progress photo")?;
    Ok(())
}

pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<PhotoRow>> {
    let rows = sqlx::query_as::<_, PhotoRow>(
        r#"
        SELECT id, s3_key, created_at
        FROM progress_photos
        WHERE user_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await
    .context("list progress photos")?;
    Ok(rows)
}

pub async fn get_key(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<String>> {
    let row: Option<(String,)> = sqlx::query_as(
        r#"
        SELECT s3_key
        FROM progress_photos
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(db)
    .await
    .context("get progress photo key")?;
    Ok(row.map(|(key,)| key))
}
