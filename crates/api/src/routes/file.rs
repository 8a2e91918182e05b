use axum::{
    Form,
    body::Body,
    extract::{Multipart, Path, State},
    http::header,
    response::Response,
};
use driveshelf_services::StorageProvider;
use serde::Deserialize;

use super::{dashboard::folder_or_root, found};
use crate::{error::AppError, extractors::auth::AuthUser, state::AppState, views};

#[derive(Debug, Deserialize)]
pub struct DeleteForm {
    pub folder_id: Option<String>,
}

struct UploadedFile {
    filename: String,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

/// POST /upload
/// Fields: `file` (binary), `folder_id` (text, defaults to root)
pub async fn upload(
    State(state): State<AppState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let mut file: Option<UploadedFile> = None;
    let mut folder_id: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Multipart error: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or("").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read file: {}", e)))?;
                file = Some(UploadedFile {
                    filename,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            "folder_id" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read field: {}", e)))?;
                folder_id = Some(text);
            }
            _ => {}
        }
    }

    let file = file
        .filter(|f| !f.filename.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Choose a file to upload.".to_string()))?;
    let folder_id = folder_or_root(folder_id);

    let drive = state.drive.with_credentials(auth.credentials)?;
    drive
        .upload(
            file.bytes,
            &file.filename,
            file.content_type.as_deref(),
            &folder_id,
        )
        .await?;

    auth.session.set_flash(format!("Uploaded {}", file.filename));
    Ok(found(&views::dashboard_href(&folder_id)))
}

/// GET /download/{file_id}
/// The whole object is fetched before anything is sent.
pub async fn download(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(file_id): Path<String>,
) -> Result<Response, AppError> {
    let drive = state.drive.with_credentials(auth.credentials)?;

    let metadata = drive.get_metadata(&file_id, &["name", "mimeType"]).await?;
    let filename = if metadata.name.is_empty() {
        format!("{}.downloaded", file_id)
    } else {
        metadata.name
    };
    let content_type = metadata
        .mime_type
        .unwrap_or_else(|| "application/octet-stream".to_string());

    let bytes = drive.download(&file_id).await?;

    Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_DISPOSITION, content_disposition(&filename))
        .body(Body::from(bytes))
        .map_err(|e| AppError::Internal(format!("Failed to build download response: {}", e)))
}

/// POST /delete/{file_id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(file_id): Path<String>,
    Form(form): Form<DeleteForm>,
) -> Result<Response, AppError> {
    let folder_id = folder_or_root(form.folder_id);

    let drive = state.drive.with_credentials(auth.credentials)?;
    drive.delete(&file_id).await?;

    auth.session.set_flash("File deleted");
    Ok(found(&views::dashboard_href(&folder_id)))
}

/// `attachment` disposition with an ASCII fallback name and the exact
/// UTF-8 name in `filename*`.
fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            _ => '_',
        })
        .collect();

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(filename)
    )
}
