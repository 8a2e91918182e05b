use driveshelf_api::{build_router, state::AppState};
use driveshelf_config::Settings;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file (silently ignore if missing)
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "driveshelf_api=debug,driveshelf_services=debug,driveshelf_config=info,tower_http=debug"
                .into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load config
    let settings = Settings::load()?;
    info!("Starting Driveshelf on {}:{}", settings.app.host, settings.app.port);
    info!(
        redirect_uri = %settings.google.redirect_uri,
        scopes = ?settings.google.scopes,
        "Google OAuth config"
    );

    if settings.session.uses_default_secret() {
        warn!("session.secret is not set; falling back to an insecure default. Set DRIVESHELF__SESSION__SECRET in production");
    }
    if settings.google.client_id.is_empty() {
        warn!("google.client_id is empty; sign-in will fail until client credentials are configured");
    }

    // Build app state
    let app_state = AppState::new(settings.clone())?;

    // Build router
    let app = build_router(app_state);

    // Start server
    let addr = format!("{}:{}", settings.app.host, settings.app.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
