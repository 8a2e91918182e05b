use axum::{extract::FromRequestParts, http::request::Parts};
use driveshelf_services::CredentialBundle;

use crate::{error::AppError, session::Session};

/// The signed-in user's session together with their stored credentials.
///
/// Rejects with [`AppError::Unauthenticated`] (a redirect to `/authorize`)
/// before the handler runs, so no provider call is made without credentials.
#[derive(Clone)]
pub struct AuthUser {
    pub session: Session,
    pub credentials: CredentialBundle,
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state).await?;
        let credentials = session
            .load_credentials()
            .ok_or(AppError::Unauthenticated)?;

        Ok(AuthUser {
            session,
            credentials,
        })
    }
}
