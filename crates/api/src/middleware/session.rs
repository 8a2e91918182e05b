use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, header},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::{
    session::{Session, SessionStore},
    state::AppState,
};

/// Resolves the session from the signed cookie (or allocates a new id) and
/// makes it available to handlers as a request extension.
///
/// A cookie is only issued once something has been written to a new session.
pub async fn session_layer(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let cookie_name = state.settings.session.cookie_name.clone();

    let existing = cookie_value(req.headers(), &cookie_name)
        .and_then(|value| state.sessions.verify(&value));
    let is_new = existing.is_none();
    let id = existing.unwrap_or_else(SessionStore::new_id);

    req.extensions_mut()
        .insert(Session::new(id.clone(), state.sessions.clone()));

    let mut resp = next.run(req).await;

    if is_new && state.sessions.contains(&id) {
        let cookie = format!(
            "{}={}; HttpOnly; Path=/; SameSite=Lax",
            cookie_name,
            state.sessions.sign(&id)
        );
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                resp.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => warn!(error = %e, "Could not encode session cookie"),
        }
    }

    resp
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .find_map(|cookie| {
            cookie
                .trim()
                .strip_prefix(name)
                .and_then(|rest| rest.strip_prefix('='))
                .map(str::to_string)
        })
}
