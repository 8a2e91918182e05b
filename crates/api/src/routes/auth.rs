use axum::{
    extract::{Query, State},
    response::{Html, Response},
};
use driveshelf_services::oauth::CallbackParams;
use tracing::info;

use super::found;
use crate::{error::AppError, session::Session, state::AppState, views};

/// GET /
/// Landing page. Every visit starts from a signed-out session.
pub async fn index(session: Session) -> Html<String> {
    session.clear();
    Html(views::landing())
}

/// GET /authorize
pub async fn authorize(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    let request = state.oauth.begin_authorization()?;
    session.set_oauth_state(request.state);
    Ok(found(&request.url))
}

/// GET /oauth2callback
pub async fn oauth2callback(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<CallbackParams>,
) -> Result<Response, AppError> {
    let expected_state = session.take_oauth_state();

    let credentials = state
        .oauth
        .complete_authorization(&params, expected_state.as_deref())
        .await?;

    session.save_credentials(&credentials)?;
    info!(scopes = ?credentials.scopes, "User signed in");

    Ok(found("/dashboard"))
}

/// GET /logout
pub async fn logout(session: Session) -> Response {
    session.clear_credentials();
    found("/")
}
