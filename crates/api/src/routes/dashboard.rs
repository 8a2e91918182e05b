use axum::{
    extract::{Query, State},
    response::Html,
};
use driveshelf_services::{
    StorageProvider, breadcrumbs,
    cloud_storage::{FileEntry, ROOT_FOLDER_ID},
    datetime::{UNKNOWN_TIME, format_modified_time},
};
use serde::Deserialize;

use crate::{
    error::AppError,
    extractors::auth::AuthUser,
    state::AppState,
    views::{self, DashboardView, FileRow},
};

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub folder_id: Option<String>,
}

/// Falls back to the root alias for missing or blank ids.
pub fn folder_or_root(folder_id: Option<String>) -> String {
    folder_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| ROOT_FOLDER_ID.to_string())
}

/// GET /dashboard?folder_id=<id>
pub async fn dashboard(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<DashboardQuery>,
) -> Result<Html<String>, AppError> {
    let folder_id = folder_or_root(query.folder_id);
    let drive = state.drive.with_credentials(auth.credentials)?;

    let files = drive.list_children(&folder_id).await?;
    let breadcrumbs = breadcrumbs::resolve(&drive, &folder_id).await?;
    let flash = auth.session.take_flash();

    let rows: Vec<FileRow> = files.into_iter().map(to_row).collect();

    Ok(Html(views::dashboard(&DashboardView {
        folder_id: &folder_id,
        breadcrumbs: &breadcrumbs,
        files: &rows,
        flash: flash.as_deref(),
    })))
}

fn to_row(file: FileEntry) -> FileRow {
    let is_folder = file.is_folder();
    let modified = file
        .modified_time
        .as_deref()
        .map(format_modified_time)
        .unwrap_or_else(|| UNKNOWN_TIME.to_string());

    FileRow {
        id: file.id,
        name: file.name,
        mime_type: file.mime_type.unwrap_or_default(),
        modified,
        is_folder,
    }
}
