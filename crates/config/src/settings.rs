use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use thiserror::Error;

use crate::client_secrets::{ClientSecrets, ClientSecretsError};

pub const DEFAULT_SESSION_SECRET: &str = "change-me-in-production";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Client secrets error: {0}")]
    ClientSecrets(#[from] ClientSecretsError),
}

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub app: AppSettings,
    pub session: SessionSettings,
    pub google: GoogleSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionSettings {
    pub secret: String,
    pub cookie_name: String,
    /// Sessions untouched for this long are dropped.
    pub idle_timeout_secs: u64,
    /// Upper bound on live sessions; the least recently used goes first.
    pub max_sessions: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GoogleSettings {
    pub client_id: String,
    pub client_secret: String,
    pub client_secrets_file: Option<String>,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    pub auth_url: String,
    pub token_url: String,
    pub api_base_url: String,
    pub upload_base_url: String,
    pub download_chunk_size: u64,
    pub request_timeout_secs: u64,
}

impl GoogleSettings {
    /// Overlays the values found in a downloaded `credentials.json`.
    pub fn apply_client_secrets(&mut self, secrets: ClientSecrets) {
        self.client_id = secrets.client_id;
        self.client_secret = secrets.client_secret;
        if let Some(auth_uri) = secrets.auth_uri {
            self.auth_url = auth_uri;
        }
        if let Some(token_uri) = secrets.token_uri {
            self.token_url = token_uri;
        }
        if let Some(redirect_uri) = secrets.redirect_uris.into_iter().next() {
            self.redirect_uri = redirect_uri;
        }
    }
}

impl SessionSettings {
    pub fn uses_default_secret(&self) -> bool {
        self.secret == DEFAULT_SESSION_SECRET
    }
}

impl Settings {
    pub fn load() -> Result<Self, SettingsError> {
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::default()
                    .separator("__")
                    .prefix("DRIVESHELF")
                    .list_separator(",")
                    .with_list_parse_key("google.scopes")
                    .try_parsing(true),
            )
            .set_default("app.host", "0.0.0.0")?
            .set_default("app.port", 5000)?
            .set_default("app.max_upload_bytes", 32 * 1024 * 1024)?
            .set_default("session.secret", DEFAULT_SESSION_SECRET)?
            .set_default("session.cookie_name", "driveshelf_session")?
            .set_default("session.idle_timeout_secs", 24 * 60 * 60)?
            .set_default("session.max_sessions", 10_000)?
            .set_default("google.client_id", "")?
            .set_default("google.client_secret", "")?
            .set_default("google.client_secrets_file", None::<String>)?
            .set_default("google.redirect_uri", "http://localhost:5000/oauth2callback")?
            .set_default(
                "google.scopes",
                vec!["https://www.googleapis.com/auth/drive".to_string()],
            )?
            .set_default("google.auth_url", "https://accounts.google.com/o/oauth2/auth")?
            .set_default("google.token_url", "https://oauth2.googleapis.com/token")?
            .set_default("google.api_base_url", "https://www.googleapis.com/drive/v3")?
            .set_default(
                "google.upload_base_url",
                "https://www.googleapis.com/upload/drive/v3",
            )?
            .set_default("google.download_chunk_size", 100 * 1024 * 1024)?
            .set_default("google.request_timeout_secs", 30)?
            .build()?;

        let mut settings: Settings = config.try_deserialize()?;

        if let Some(path) = settings.google.client_secrets_file.clone() {
            let secrets = ClientSecrets::from_file(&path)?;
            tracing::info!(path = %path, "Loaded Google client secrets");
            settings.google.apply_client_secrets(secrets);
        }

        Ok(settings)
    }
}
