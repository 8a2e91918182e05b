pub mod error;
pub mod extractors;
pub mod middleware;
pub mod routes;
pub mod session;
pub mod state;
pub mod views;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use state::AppState;
use tower_http::trace::TraceLayer;

pub fn build_router(state: AppState) -> Router {
    let body_limit = usize::try_from(state.settings.app.max_upload_bytes).unwrap_or(usize::MAX);

    // Sign-in flow (no credentials required)
    let auth_routes = Router::new()
        .route("/", get(routes::auth::index))
        .route("/authorize", get(routes::auth::authorize))
        .route("/oauth2callback", get(routes::auth::oauth2callback))
        .route("/logout", get(routes::auth::logout));

    // Drive routes (credentials required)
    let drive_routes = Router::new()
        .route("/dashboard", get(routes::dashboard::dashboard))
        .route("/upload", post(routes::file::upload))
        .route("/download/{file_id}", get(routes::file::download))
        .route("/delete/{file_id}", post(routes::file::delete));

    // Health check
    let health = Router::new().route("/health", get(health_check));

    Router::new()
        .merge(auth_routes)
        .merge(drive_routes)
        .merge(health)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::session::session_layer,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
