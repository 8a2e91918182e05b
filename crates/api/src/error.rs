use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use driveshelf_services::{DriveError, oauth::OAuthError};
use tracing::{error, warn};

use crate::{routes::found, views};

#[derive(Debug)]
pub enum AppError {
    /// No credentials in the session; answered with a redirect to sign in.
    Unauthenticated,
    CsrfMismatch,
    AuthDenied(String),
    AuthExchange(String),
    /// `status` is the provider's HTTP status when one was received.
    Remote { status: Option<u16>, message: String },
    BreadcrumbDepthExceeded(usize),
    BadRequest(String),
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated => StatusCode::FOUND,
            AppError::CsrfMismatch => StatusCode::BAD_REQUEST,
            AppError::AuthDenied(_) => StatusCode::FORBIDDEN,
            AppError::AuthExchange(_) => StatusCode::BAD_GATEWAY,
            AppError::Remote { status, .. } => match status {
                Some(401) => StatusCode::UNAUTHORIZED,
                Some(403) => StatusCode::FORBIDDEN,
                Some(404) => StatusCode::NOT_FOUND,
                Some(429) => StatusCode::TOO_MANY_REQUESTS,
                _ => StatusCode::BAD_GATEWAY,
            },
            AppError::BreadcrumbDepthExceeded(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn user_message(&self) -> String {
        match self {
            AppError::Unauthenticated => "Please sign in.".to_string(),
            AppError::CsrfMismatch => {
                "The sign-in response could not be verified. Please sign in again.".to_string()
            }
            AppError::AuthDenied(reason) => format!("Google did not grant access ({}).", reason),
            AppError::AuthExchange(_) => "Signing in with Google failed. Please try again.".to_string(),
            AppError::Remote { status: Some(401), .. } => {
                "Your Google session has expired. Please sign in again.".to_string()
            }
            AppError::Remote { status: Some(404), .. } => {
                "That file or folder no longer exists.".to_string()
            }
            AppError::Remote { message, .. } => format!("Google Drive request failed: {}", message),
            AppError::BreadcrumbDepthExceeded(depth) => {
                format!("The folder is nested more than {} levels deep.", depth)
            }
            AppError::BadRequest(msg) => msg.clone(),
            AppError::Internal(_) => "Something went wrong.".to_string(),
        }
    }

    /// Whether the way out of this error is signing in again.
    fn needs_sign_in(&self) -> bool {
        matches!(
            self,
            AppError::CsrfMismatch
                | AppError::AuthDenied(_)
                | AppError::AuthExchange(_)
                | AppError::Remote { status: Some(401), .. }
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Unauthenticated = self {
            return found("/authorize");
        }

        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = ?self, "Request failed");
        } else {
            warn!(status = status.as_u16(), error = ?self, "Request rejected");
        }

        let page = views::error_page(status, &self.user_message(), self.needs_sign_in());
        (status, Html(page)).into_response()
    }
}

impl From<DriveError> for AppError {
    fn from(err: DriveError) -> Self {
        match err {
            DriveError::Unauthenticated => AppError::Unauthenticated,
            DriveError::Remote { status, message } => AppError::Remote {
                status: Some(status),
                message,
            },
            DriveError::Transport(message) | DriveError::Decode(message) => AppError::Remote {
                status: None,
                message,
            },
            DriveError::BreadcrumbDepthExceeded(depth) => AppError::BreadcrumbDepthExceeded(depth),
        }
    }
}

impl From<OAuthError> for AppError {
    fn from(err: OAuthError) -> Self {
        match err {
            OAuthError::CsrfMismatch => AppError::CsrfMismatch,
            OAuthError::Provider(reason) => AppError::AuthDenied(reason),
            OAuthError::Exchange(msg) => AppError::AuthExchange(msg),
            OAuthError::InvalidEndpoint(msg) => AppError::Internal(msg),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}
