use anyhow::Context;
use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect},
    routing::get,
    Json, Router,
};
use bytes::Bytes;
use serde::Serialize;
use time::OffsetDateTime;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::{auth::jwt::AuthUser, photos::repo, state::AppState};

const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;
const PRESIGN_TTL_SECS: u64 = 600;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/photos", get(list_photos).post(upload_photos))
        .route("/photos/:id/url", get(photo_url))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

#[derive(Debug, Serialize)]
pub struct PhotoListItem {
    pub id: Uuid,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub ids: Vec<Uuid>,
}

struct Upload {
    body: Bytes,
    content_type: String,
}

fn internal<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/heic" => Some("heic"),
        _ => None,
    }
}

/// POST /photos (multipart): field `files` or `files[]`, repeated.
#[instrument(skip(state, mp))]
pub async fn upload_photos(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    mut mp: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), (StatusCode, String)> {
    let mut files: Vec<Upload> = Vec::new();
    while let Ok(Some(field)) = mp.next_field().await {
        let name = field.name().map(|s| s.to_string());
        if name.as_deref() == Some("files") || name.as_deref() == Some("files[]") {
            let content_type = field
                .content_type()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "application/octet-stream".into());
            let body = field.bytes().await.map_err(internal)?;
            files.push(Upload { body, content_type });
        }
    }
    if files.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "files[] is required".into()));
    }

    let ids = store_and_record(&state, user_id, files).await.map_err(|e| {
        error!(error = %e, %user_id, "photo upload failed");
        internal(e)
    })?;

    info!(%user_id, count = ids.len(), "progress photos uploaded");
    Ok((StatusCode::CREATED, Json(UploadResponse { ids })))
}

/// Push each file to object storage, then link the rows in one transaction
/// so a failed insert never leaves an orphaned id in the listing.
async fn store_and_record(
    state: &AppState,
    user_id: Uuid,
    files: Vec<Upload>,
) -> anyhow::Result<Vec<Uuid>> {
    let mut stored: Vec<(Uuid, String)> = Vec::with_capacity(files.len());
    for file in files {
        let id = Uuid::new_v4();
        let ext = ext_from_mime(&file.content_type).unwrap_or("bin");
        let key = format!("progress/{}/{}.{}", user_id, id, ext);
        state
            .storage
            .put_object(&key, file.body, &file.content_type)
            .await
            .with_context(|| format!("put_object {}", key))?;
        stored.push((id, key));
    }

    let mut tx = state.db.begin().await.context("begin tx")?;
    for (id, key) in &stored {
        repo::insert_photo_tx(&mut tx, *id, user_id, key).await?;
    }
    tx.commit().await.context("commit tx")?;

    Ok(stored.into_iter().map(|(id, _)| id).collect())
}

#[instrument(skip(state))]
pub async fn list_photos(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<PhotoListItem>>, (StatusCode, String)> {
    let rows = repo::list_by_user(&state.db, user_id)
        .await
        .map_err(internal)?;
    Ok(Json(
        rows.into_iter()
            .map(|r| PhotoListItem {
                id: r.id,
                created_at: r.created_at,
            })
            .collect(),
    ))
}

/// 302 to a short-lived presigned URL for the photo body.
#[instrument(skip(state))]
pub async fn photo_url(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let key = match repo::get_key(&state.db, user_id, id).await {
        Ok(Some(k)) => k,
        Ok(None) => return (StatusCode::NOT_FOUND, "Photo not found").into_response(),
        Err(e) => return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    };

    match state.storage.presign_get(&key, PRESIGN_TTL_SECS).await {
        Ok(url) => Redirect::temporary(&url).into_response(),
        Err(e) => {
            error!(error = %e, %user_id, photo_id = %id, "presign failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "presign failed").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ext_from_mime_covers_supported_images() {
        assert_eq!(ext_from_mime("image/jpeg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/jpg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/png"), Some("png"));
        assert_eq!(ext_from_mime("image/webp"), Some("webp"));
        assert_eq!(ext_from_mime("image/heic"), Some("heic"));
        assert_eq!(ext_from_mime("application/octet-stream"), None);
        assert_eq!(ext_from_mime("whatever/else"), None);
    }

    #[tokio::test]
    async fn presign_uses_the_storage_client() {
        let state = crate::state::AppState::fake();
        let url = state
            .storage
            .presign_get("progress/u/p.jpg", 600)
            .await
            .unwrap();
        assert!(url.contains("progress/u/p.jpg"));
    }
}
