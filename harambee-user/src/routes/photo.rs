use axum::extract::{Multipart, Path, State};
use axum::Json;
use diesel::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

use harambee_shared::clients::db::{self, DbConn};
use harambee_shared::errors::{AppError, AppResult, ErrorCode};
use harambee_shared::types::auth::AuthUser;
use harambee_shared::types::ApiResponse;

use crate::events::publisher;
use crate::models::{NewPhoto, Photo};
use crate::schema::{photos, profiles};
use crate::services::profile_service::{self, PhotoSlot};
use crate::AppState;

// --- POST /photos ---

pub async fn upload_photo(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> AppResult<Json<ApiResponse<Photo>>> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| AppError::new(ErrorCode::PhotoUploadFailed, format!("failed to read multipart: {e}")))?
        .ok_or_else(|| AppError::new(ErrorCode::PhotoUploadFailed, "no file provided"))?;

    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();

    let ext = profile_service::photo_extension(&content_type).ok_or_else(|| {
        AppError::new(
            ErrorCode::PhotoUploadFailed,
            "unsupported image format, accepted: jpeg, png, webp",
        )
    })?;

    let data = field
        .bytes()
        .await
        .map_err(|e| AppError::new(ErrorCode::PhotoUploadFailed, format!("failed to read file data: {e}")))?;

    if data.is_empty() {
        return Err(AppError::new(ErrorCode::PhotoUploadFailed, "empty file"));
    }
    if data.len() > state.config.max_photo_bytes {
        return Err(AppError::new(ErrorCode::PayloadTooLarge, "photo exceeds the size limit"));
    }

    let profile_id = {
        let mut conn = db::conn(&state.db)?;
        profile_service::ensure_profile(&mut conn, user.id)?.id
    };
    let key = profile_service::photo_storage_key(profile_id, &data, ext);

    {
        let mut conn = db::conn(&state.db)?;
        let current = profile_photos(&mut conn, profile_id)?;
        if let PhotoSlot::Existing(photo) = profile_service::photo_slot(&current, &key, state.config.max_photos)? {
            return Ok(Json(ApiResponse::ok(photo)));
        }
    }

    let url = state
        .minio
        .upload(&key, data.to_vec(), &content_type)
        .await
        .map_err(|e| AppError::new(ErrorCode::PhotoUploadFailed, e.to_string()))?;

    // Recheck under the profile lock so concurrent uploads cannot pass the limit.
    let mut conn = db::conn(&state.db)?;
    let (photo, created) = conn.transaction::<_, AppError, _>(|conn| {
        profiles::table
            .find(profile_id)
            .select(profiles::id)
            .for_update()
            .get_result::<Uuid>(conn)?;

        let current = profile_photos(conn, profile_id)?;
        let primary = match profile_service::photo_slot(&current, &key, state.config.max_photos)? {
            PhotoSlot::Existing(photo) => return Ok((photo, false)),
            PhotoSlot::Free { primary } => primary,
        };

        let photo = diesel::insert_into(photos::table)
            .values(&NewPhoto {
                profile_id,
                url,
                storage_key: key.clone(),
                is_primary: primary,
            })
            .on_conflict((photos::profile_id, photos::storage_key))
            .do_nothing()
            .get_result::<Photo>(conn)
            .optional()?;
        match photo {
            Some(photo) => Ok((photo, true)),
            None => Ok((
                photos::table
                    .filter(photos::profile_id.eq(profile_id))
                    .filter(photos::storage_key.eq(&key))
                    .first::<Photo>(conn)?,
                false,
            )),
        }
    })?;

    if created {
        tracing::info!(profile_id = %profile_id, photo_id = %photo.id, primary = photo.is_primary, "photo uploaded");
        publisher::publish_profile_updated(&state.rabbitmq, profile_id, "photos").await;
    }

    Ok(Json(ApiResponse::ok(photo)))
}

fn profile_photos(conn: &mut DbConn, profile_id: Uuid) -> AppResult<Vec<Photo>> {
    Ok(photos::table
        .filter(photos::profile_id.eq(profile_id))
        .order(photos::created_at.asc())
        .load::<Photo>(conn)?)
}

// --- DELETE /photos/:id ---

pub async fn delete_photo(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(photo_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Uuid>>> {
    let photo = {
        let mut conn = db::conn(&state.db)?;
        photos::table
            .filter(photos::id.eq(photo_id))
            .filter(photos::profile_id.eq(user.id))
            .first::<Photo>(&mut conn)
            .optional()?
            .ok_or_else(|| AppError::new(ErrorCode::PhotoNotFound, "photo not found"))?
    };

    let mut conn = db::conn(&state.db)?;
    let key_in_use = conn.transaction::<_, AppError, _>(|conn| {
        diesel::delete(photos::table.find(photo.id)).execute(conn)?;

        // Promote the oldest remaining photo.
        if photo.is_primary {
            let next = photos::table
                .filter(photos::profile_id.eq(user.id))
                .order(photos::created_at.asc())
                .select(photos::id)
                .first::<Uuid>(conn)
                .optional()?;
            if let Some(next_id) = next {
                diesel::update(photos::table.find(next_id))
                    .set(photos::is_primary.eq(true))
                    .execute(conn)?;
            }
        }

        Ok(diesel::select(diesel::dsl::exists(
            photos::table.filter(photos::storage_key.eq(&photo.storage_key)),
        ))
        .get_result::<bool>(conn)?)
    })?;

    if !key_in_use {
        if let Err(e) = state.minio.delete(&photo.storage_key).await {
            tracing::warn!(photo_id = %photo.id, error = %e, "photo row removed but object delete failed");
        }
    }

    publisher::publish_profile_updated(&state.rabbitmq, user.id, "photos").await;

    Ok(Json(ApiResponse::ok_with_message(photo.id, "photo deleted")))
}
