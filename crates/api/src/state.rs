use driveshelf_config::Settings;
use driveshelf_services::{GoogleDriveService, OAuthService};
use std::sync::Arc;

use crate::session::SessionStore;

#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub oauth: Arc<OAuthService>,
    pub drive: GoogleDriveService,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(settings: Settings) -> anyhow::Result<Self> {
        let oauth = Arc::new(OAuthService::new(settings.google.clone()));
        let drive = GoogleDriveService::new(&settings.google)?;
        let sessions = Arc::new(
            SessionStore::new(&settings.session)
                .map_err(|e| anyhow::anyhow!("Invalid session secret: {}", e))?,
        );

        Ok(Self {
            settings,
            oauth,
            drive,
            sessions,
        })
    }
}
