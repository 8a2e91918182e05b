use async_trait::async_trait;
use driveshelf_config::GoogleSettings;
use reqwest::{
    Client, Response, StatusCode,
    header::{CONTENT_RANGE, CONTENT_TYPE, RANGE},
};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use super::{DriveError, DriveResult, FileEntry, MAX_LIST_RESULTS, StorageProvider};
use crate::credentials::CredentialBundle;

const LIST_FIELDS: &str = "files(id, name, mimeType, modifiedTime, parents)";
const DEFAULT_METADATA_FIELDS: &str = "id, name, mimeType, modifiedTime, parents";

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<FileEntry>,
}

#[derive(Debug, Deserialize)]
struct CreatedFile {
    id: String,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    error: GoogleErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorDetail {
    message: String,
}

/// Shared Drive v3 endpoint configuration and HTTP client.
#[derive(Clone)]
pub struct GoogleDriveService {
    client: Client,
    api_base_url: String,
    upload_base_url: String,
    download_chunk_size: u64,
}

impl GoogleDriveService {
    pub fn new(settings: &GoogleSettings) -> DriveResult<Self> {
        // Per-read rather than whole-request, so large chunks can take as
        // long as they need while the body keeps arriving.
        let timeout = Duration::from_secs(settings.request_timeout_secs);
        let client = Client::builder()
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .build()
            .map_err(|e| DriveError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            api_base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            upload_base_url: settings.upload_base_url.trim_end_matches('/').to_string(),
            download_chunk_size: settings.download_chunk_size.max(1),
        })
    }

    /// Binds a user's credentials, producing a client for their account.
    pub fn with_credentials(&self, credentials: CredentialBundle) -> DriveResult<DriveClient> {
        if credentials.access_token.is_empty() {
            return Err(DriveError::Unauthenticated);
        }
        Ok(DriveClient {
            service: self.clone(),
            credentials,
        })
    }

    fn file_url(&self, file_id: &str) -> String {
        format!("{}/files/{}", self.api_base_url, urlencoding::encode(file_id))
    }
}

/// [`GoogleDriveService`] bound to one credential bundle.
pub struct DriveClient {
    service: GoogleDriveService,
    credentials: CredentialBundle,
}

impl DriveClient {
    fn token(&self) -> &str {
        &self.credentials.access_token
    }
}

#[async_trait]
impl StorageProvider for DriveClient {
    async fn list_children(&self, folder_id: &str) -> DriveResult<Vec<FileEntry>> {
        let query = format!(
            "'{}' in parents and trashed = false",
            escape_query_value(folder_id)
        );
        let page_size = MAX_LIST_RESULTS.to_string();

        let resp = self
            .service
            .client
            .get(format!("{}/files", self.service.api_base_url))
            .bearer_auth(self.token())
            .query(&[
                ("q", query.as_str()),
                ("pageSize", page_size.as_str()),
                ("fields", LIST_FIELDS),
            ])
            .send()
            .await
            .map_err(transport)?;

        let list: FileList = check(resp)
            .await?
            .json()
            .await
            .map_err(|e| DriveError::Decode(e.to_string()))?;

        debug!(folder_id = %folder_id, count = list.files.len(), "Listed folder");
        Ok(list.files)
    }

    async fn get_metadata(&self, file_id: &str, fields: &[&str]) -> DriveResult<FileEntry> {
        let fields = if fields.is_empty() {
            DEFAULT_METADATA_FIELDS.to_string()
        } else {
            fields.join(", ")
        };

        let resp = self
            .service
            .client
            .get(self.service.file_url(file_id))
            .bearer_auth(self.token())
            .query(&[("fields", fields.as_str())])
            .send()
            .await
            .map_err(transport)?;

        check(resp)
            .await?
            .json()
            .await
            .map_err(|e| DriveError::Decode(e.to_string()))
    }

    async fn upload(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        mime_type: Option<&str>,
        parent_id: &str,
    ) -> DriveResult<String> {
        let metadata = serde_json::json!({
            "name": filename,
            "parents": [parent_id],
        });
        let boundary = format!("driveshelf-{}", uuid::Uuid::new_v4().simple());
        let size = bytes.len();
        let body = related_body(&boundary, &metadata, mime_type, bytes);

        let resp = self
            .service
            .client
            .post(format!("{}/files", self.service.upload_base_url))
            .bearer_auth(self.token())
            .query(&[("uploadType", "multipart"), ("fields", "id")])
            .header(
                CONTENT_TYPE,
                format!("multipart/related; boundary={}", boundary),
            )
            .body(body)
            .send()
            .await
            .map_err(transport)?;

        let created: CreatedFile = check(resp)
            .await?
            .json()
            .await
            .map_err(|e| DriveError::Decode(e.to_string()))?;

        info!(file_id = %created.id, parent_id = %parent_id, size, "Uploaded file");
        Ok(created.id)
    }

    async fn download(&self, file_id: &str) -> DriveResult<Vec<u8>> {
        let chunk_size = self.service.download_chunk_size;
        let url = self.service.file_url(file_id);
        let mut buffer: Vec<u8> = Vec::new();

        loop {
            let start = buffer.len() as u64;
            let end = start + chunk_size - 1;

            let resp = self
                .service
                .client
                .get(&url)
                .bearer_auth(self.token())
                .query(&[("alt", "media")])
                .header(RANGE, format!("bytes={}-{}", start, end))
                .send()
                .await
                .map_err(transport)?;

            // Past the end: either an empty object or a size that is an exact
            // multiple of the chunk size with no total advertised.
            if resp.status() == StatusCode::RANGE_NOT_SATISFIABLE {
                break;
            }

            let resp = check(resp).await?;
            let partial = resp.status() == StatusCode::PARTIAL_CONTENT;
            let total = resp
                .headers()
                .get(CONTENT_RANGE)
                .and_then(|v| v.to_str().ok())
                .and_then(content_range_total);
            let chunk = resp.bytes().await.map_err(transport)?;

            if !partial {
                buffer = chunk.to_vec();
                break;
            }

            buffer.extend_from_slice(&chunk);
            debug!(file_id = %file_id, received = buffer.len(), total = ?total, "Downloaded chunk");

            let done = match total {
                Some(total) => buffer.len() as u64 >= total,
                None => (chunk.len() as u64) < chunk_size,
            };
            if done || chunk.is_empty() {
                break;
            }
        }

        Ok(buffer)
    }

    async fn delete(&self, file_id: &str) -> DriveResult<()> {
        let resp = self
            .service
            .client
            .delete(self.service.file_url(file_id))
            .bearer_auth(self.token())
            .send()
            .await
            .map_err(transport)?;

        check(resp).await?;
        info!(file_id = %file_id, "Deleted file");
        Ok(())
    }
}

fn transport(err: reqwest::Error) -> DriveError {
    DriveError::Transport(err.to_string())
}

/// Turns non-2xx responses into [`DriveError::Remote`], keeping Google's
/// error message when the body carries one.
async fn check(resp: Response) -> DriveResult<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<GoogleErrorBody>(&body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| {
            status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string()
        });

    Err(DriveError::Remote {
        status: status.as_u16(),
        message,
    })
}

fn escape_query_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Total object size from a `Content-Range: bytes a-b/total` header.
fn content_range_total(value: &str) -> Option<u64> {
    value.rsplit_once('/')?.1.trim().parse().ok()
}

/// Body for Drive's `uploadType=multipart`: JSON metadata then media.
fn related_body(
    boundary: &str,
    metadata: &serde_json::Value,
    mime_type: Option<&str>,
    bytes: Vec<u8>,
) -> Vec<u8> {
    let mut body = Vec::with_capacity(bytes.len() + 512);
    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
    body.extend_from_slice(metadata.to_string().as_bytes());
    body.extend_from_slice(b"\r\n");

    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Type: {}\r\n\r\n",
            mime_type.unwrap_or("application/octet-stream")
        )
        .as_bytes(),
    );
    body.extend_from_slice(&bytes);
    body.extend_from_slice(format!("\r\n--{}--", boundary).as_bytes());
    body
}
