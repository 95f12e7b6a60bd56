use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::autosave::DraftSink;

/// Autosave sink that upserts the newest draft per user.
pub struct PgDraftSink {
    db: PgPool,
}

impl PgDraftSink {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DraftSink for PgDraftSink {
    async fn write_draft(&self, user_id: Uuid, draft: &serde_json::Value) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO onboarding_drafts (user_id, draft)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE SET
                draft = EXCLUDED.draft,
                updated_at = now()
            "#,
        )
        .bind(user_id)
        .bind(draft.clone())
        .execute(&self.db)
        .await?;
        Ok(())
    }
}

pub async fn get_draft(db: &PgPool, user_id: Uuid) -> anyhow::Result<Option<serde_json::Value>> {
    let row: Option<(serde_json::Value,)> =
        sqlx::query_as("SELECT draft FROM onboarding_drafts WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(db)
            .await?;
    Ok(row.map(|(draft,)| draft))
}

pub async fn clear_draft(db: &PgPool, user_id: Uuid) -> anyhow::Result<()> {
    sqlx::query("DELETE FROM onboarding_drafts WHERE user_id = $1")
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(())
}
