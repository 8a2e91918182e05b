use driveshelf_config::GoogleSettings;
use reqwest::{Client, Url};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::credentials::CredentialBundle;

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("OAuth state mismatch")]
    CsrfMismatch,
    #[error("Authorization denied by provider: {0}")]
    Provider(String),
    #[error("Token exchange failed: {0}")]
    Exchange(String),
    #[error("Invalid authorization endpoint: {0}")]
    InvalidEndpoint(String),
}

/// Authorization request ready to be sent to the browser.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub url: String,
    pub state: String,
}

/// Query parameters the provider appends to the redirect URI.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    scope: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    error_description: Option<String>,
}

/// Runs the authorization-code flow against the configured provider.
pub struct OAuthService {
    client: Client,
    settings: GoogleSettings,
}

impl OAuthService {
    pub fn new(settings: GoogleSettings) -> Self {
        Self {
            client: Client::new(),
            settings,
        }
    }

    /// Builds the consent-screen URL with a fresh anti-forgery state.
    ///
    /// The caller is responsible for storing `state` in the session.
    pub fn begin_authorization(&self) -> Result<AuthorizationRequest, OAuthError> {
        let state = nanoid::nanoid!(32);
        let scope = self.settings.scopes.join(" ");

        let url = Url::parse_with_params(
            &self.settings.auth_url,
            &[
                ("response_type", "code"),
                ("client_id", self.settings.client_id.as_str()),
                ("redirect_uri", self.settings.redirect_uri.as_str()),
                ("scope", scope.as_str()),
                ("state", state.as_str()),
                ("access_type", "offline"),
                ("include_granted_scopes", "true"),
                ("prompt", "select_account consent"),
            ],
        )
        .map_err(|e| OAuthError::InvalidEndpoint(e.to_string()))?;

        debug!("Built authorization URL");

        Ok(AuthorizationRequest {
            url: url.into(),
            state,
        })
    }

    /// Validates the callback against `expected_state` and exchanges the code.
    ///
    /// `expected_state` is the value taken (and removed) from the session; a
    /// missing value fails the same way as a mismatch.
    pub async fn complete_authorization(
        &self,
        params: &CallbackParams,
        expected_state: Option<&str>,
    ) -> Result<CredentialBundle, OAuthError> {
        match (expected_state, params.state.as_deref()) {
            (Some(expected), Some(received)) if expected == received => {}
            _ => {
                warn!("Rejected OAuth callback with missing or mismatched state");
                return Err(OAuthError::CsrfMismatch);
            }
        }

        if let Some(error) = &params.error {
            return Err(OAuthError::Provider(error.clone()));
        }

        let code = params
            .code
            .as_deref()
            .filter(|c| !c.is_empty())
            .ok_or_else(|| OAuthError::Exchange("Missing authorization code".to_string()))?;

        self.exchange_code(code).await
    }

    async fn exchange_code(&self, code: &str) -> Result<CredentialBundle, OAuthError> {
        let resp = self
            .client
            .post(&self.settings.token_url)
            .form(&[
                ("code", code),
                ("client_id", self.settings.client_id.as_str()),
                ("client_secret", self.settings.client_secret.as_str()),
                ("redirect_uri", self.settings.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| OAuthError::Exchange(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<TokenErrorResponse>(&body) {
                Ok(err) => match err.error_description {
                    Some(description) => format!("{}: {}", err.error, description),
                    None => err.error,
                },
                Err(_) => format!("token endpoint returned {}", status),
            };
            return Err(OAuthError::Exchange(message));
        }

        let tokens: TokenResponse = resp
            .json()
            .await
            .map_err(|e| OAuthError::Exchange(format!("Failed to parse token response: {}", e)))?;

        let scopes = match tokens.scope {
            Some(scope) => scope.split_whitespace().map(str::to_string).collect(),
            None => self.settings.scopes.clone(),
        };

        info!(has_refresh_token = tokens.refresh_token.is_some(), "OAuth code exchanged");

        Ok(CredentialBundle {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            token_uri: self.settings.token_url.clone(),
            client_id: self.settings.client_id.clone(),
            client_secret: self.settings.client_secret.clone(),
            scopes,
        })
    }
}
