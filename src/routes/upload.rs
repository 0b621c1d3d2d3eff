use axum::{
    Json, Router,
    extract::{Multipart, State},
    http::StatusCode,
    routing::post,
};
use std::path::Path;
use uuid::Uuid;

use crate::{
    dto::products::UploadResponse,
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    state::AppState,
};

const UPLOAD_FIELD: &str = "productImages";
const MAX_FILES: usize = 5;
const MAX_FILE_BYTES: usize = 5 * 1024 * 1024;

pub fn router() -> Router<AppState> {
    Router::new().route("/admin/upload", post(upload_images))
}

fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

#[utoipa::path(
    post,
    path = "/api/admin/upload",
    responses(
        (status = 201, description = "Files uploaded", body = UploadResponse),
        (status = 400, description = "No files, too many files, or unsupported type"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn upload_images(
    State(state): State<AppState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<UploadResponse>)> {
    ensure_admin(&user)?;

    let upload_dir = state.config.upload_dir.clone();
    tokio::fs::create_dir_all(&upload_dir)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("cannot create upload dir: {e}")))?;

    let mut image_urls = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("File upload failed: {e}")))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        if image_urls.len() == MAX_FILES {
            return Err(AppError::BadRequest(format!(
                "Too many files. Maximum is {MAX_FILES} files."
            )));
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        let extension = extension_for(&content_type).ok_or_else(|| {
            AppError::BadRequest(
                "Invalid file type. Only JPEG, PNG, GIF and WebP images are allowed.".into(),
            )
        })?;

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("File upload failed: {e}")))?;
        if bytes.len() > MAX_FILE_BYTES {
            return Err(AppError::BadRequest(
                "File too large. Maximum file size is 5MB.".into(),
            ));
        }

        let file_name = format!("{}.{extension}", Uuid::new_v4());
        let path = Path::new(&upload_dir).join(&file_name);
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("cannot store upload: {e}")))?;

        image_urls.push(format!("/uploads/{file_name}"));
    }

    if image_urls.is_empty() {
        return Err(AppError::BadRequest(
            "No files uploaded. Please select at least one file.".into(),
        ));
    }

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            message: "Files uploaded successfully".into(),
            image_urls,
        }),
    ))
}
