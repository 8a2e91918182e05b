pub mod google_drive;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Alias the provider accepts for the account's top-level folder.
pub const ROOT_FOLDER_ID: &str = "root";

pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Provider listings are never paged past this many entries.
pub const MAX_LIST_RESULTS: u32 = 100;

#[derive(Debug, Error)]
pub enum DriveError {
    #[error("Not signed in to the storage provider")]
    Unauthenticated,
    #[error("Storage provider returned {status}: {message}")]
    Remote { status: u16, message: String },
    #[error("Storage provider request failed: {0}")]
    Transport(String),
    #[error("Unexpected storage provider response: {0}")]
    Decode(String),
    #[error("Folder hierarchy deeper than {0} levels")]
    BreadcrumbDepthExceeded(usize),
}

pub type DriveResult<T> = Result<T, DriveError>;

/// Read-only projection of a remote file. Fields not requested from the
/// provider are left empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub mime_type: Option<String>,
    pub modified_time: Option<String>,
    #[serde(default)]
    pub parents: Vec<String>,
}

impl FileEntry {
    pub fn is_folder(&self) -> bool {
        self.mime_type.as_deref() == Some(FOLDER_MIME_TYPE)
    }

    pub fn parent_id(&self) -> Option<&str> {
        self.parents.first().map(String::as_str)
    }
}

/// Calls against a remote storage provider on behalf of one signed-in user.
#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// Non-trashed direct children of `folder_id`, at most [`MAX_LIST_RESULTS`].
    async fn list_children(&self, folder_id: &str) -> DriveResult<Vec<FileEntry>>;

    async fn get_metadata(&self, file_id: &str, fields: &[&str]) -> DriveResult<FileEntry>;

    /// Creates `filename` under `parent_id` and returns the new file id.
    async fn upload(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        mime_type: Option<&str>,
        parent_id: &str,
    ) -> DriveResult<String>;

    async fn download(&self, file_id: &str) -> DriveResult<Vec<u8>>;

    async fn delete(&self, file_id: &str) -> DriveResult<()>;
}
