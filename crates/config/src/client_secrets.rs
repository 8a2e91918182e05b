//! Google OAuth client secrets (`credentials.json`) as downloaded from the
//! Cloud Console. The file wraps the actual fields in either a `web` or an
//! `installed` object depending on the client type.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientSecretsError {
    #[error("Failed to read client secrets file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse client secrets: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Client secrets file has neither a 'web' nor an 'installed' section")]
    MissingSection,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    pub auth_uri: Option<String>,
    pub token_uri: Option<String>,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ClientSecretsFile {
    web: Option<ClientSecrets>,
    installed: Option<ClientSecrets>,
}

impl ClientSecrets {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ClientSecretsError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ClientSecretsError> {
        let file: ClientSecretsFile = serde_json::from_str(raw)?;
        file.web
            .or(file.installed)
            .ok_or(ClientSecretsError::MissingSection)
    }
}
