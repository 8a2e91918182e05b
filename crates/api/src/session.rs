use axum::{extract::FromRequestParts, http::request::Parts};
use dashmap::DashMap;
use driveshelf_config::SessionSettings;
use driveshelf_services::CredentialBundle;
use hmac::{Hmac, Mac, digest::InvalidLength};
use sha2::Sha256;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tracing::{debug, warn};

use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

/// Server-side state for one browser session.
#[derive(Debug, Clone)]
pub struct SessionData {
    /// Serialized [`CredentialBundle`].
    pub credentials: Option<String>,
    pub oauth_state: Option<String>,
    pub flash: Option<String>,
    last_seen: Instant,
}

impl Default for SessionData {
    fn default() -> Self {
        Self {
            credentials: None,
            oauth_state: None,
            flash: None,
            last_seen: Instant::now(),
        }
    }
}

/// All live sessions, keyed by the id carried in the signed session cookie.
///
/// Entries idle for longer than `idle_timeout` read as absent and are
/// dropped. Creating a session in a full store first sweeps idle entries,
/// then evicts the least recently used ones.
pub struct SessionStore {
    sessions: DashMap<String, SessionData>,
    keyed_mac: HmacSha256,
    idle_timeout: Duration,
    max_sessions: usize,
}

impl SessionStore {
    pub fn new(settings: &SessionSettings) -> Result<Self, InvalidLength> {
        Ok(Self {
            sessions: DashMap::new(),
            keyed_mac: HmacSha256::new_from_slice(settings.secret.as_bytes())?,
            idle_timeout: Duration::from_secs(settings.idle_timeout_secs),
            max_sessions: settings.max_sessions,
        })
    }

    pub fn new_id() -> String {
        nanoid::nanoid!(32)
    }

    fn mac(&self, id: &str) -> HmacSha256 {
        let mut mac = self.keyed_mac.clone();
        mac.update(id.as_bytes());
        mac
    }

    /// Cookie value for `id`: `<id>.<hex hmac-sha256>`.
    pub fn sign(&self, id: &str) -> String {
        let signature = hex::encode(self.mac(id).finalize().into_bytes());
        format!("{}.{}", id, signature)
    }

    /// Returns the session id if the cookie value carries a valid signature.
    pub fn verify(&self, cookie_value: &str) -> Option<String> {
        let (id, signature) = cookie_value.rsplit_once('.')?;
        if id.is_empty() {
            return None;
        }
        let signature = hex::decode(signature).ok()?;
        self.mac(id).verify_slice(&signature).ok()?;
        Some(id.to_string())
    }

    /// Snapshot of the session; unknown or idle ids read as empty sessions.
    pub fn get(&self, id: &str) -> SessionData {
        if self.expire(id) {
            return SessionData::default();
        }
        self.sessions
            .get_mut(id)
            .map(|mut s| {
                s.last_seen = Instant::now();
                s.clone()
            })
            .unwrap_or_default()
    }

    /// Mutates the session, creating it on first write.
    pub fn update<R>(&self, id: &str, f: impl FnOnce(&mut SessionData) -> R) -> R {
        self.expire(id);
        if !self.sessions.contains_key(id) {
            self.make_room();
        }
        let mut entry = self.sessions.entry(id.to_string()).or_default();
        entry.last_seen = Instant::now();
        f(entry.value_mut())
    }

    pub fn remove(&self, id: &str) {
        self.sessions.remove(id);
    }

    pub fn contains(&self, id: &str) -> bool {
        !self.expire(id) && self.sessions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn is_idle(&self, data: &SessionData) -> bool {
        data.last_seen.elapsed() >= self.idle_timeout
    }

    /// Drops `id` if it has gone idle; returns whether it was dropped.
    fn expire(&self, id: &str) -> bool {
        self.sessions
            .remove_if(id, |_, data| self.is_idle(data))
            .is_some()
    }

    fn make_room(&self) {
        if self.sessions.len() < self.max_sessions {
            return;
        }

        let before = self.sessions.len();
        self.sessions.retain(|_, data| !self.is_idle(data));

        while self.sessions.len() >= self.max_sessions {
            let oldest = self
                .sessions
                .iter()
                .min_by_key(|entry| entry.last_seen)
                .map(|entry| entry.key().clone());
            match oldest {
                Some(id) => {
                    self.sessions.remove(&id);
                }
                None => break,
            }
        }

        debug!(
            evicted = before - self.sessions.len(),
            remaining = self.sessions.len(),
            "Session store full, evicted sessions"
        );
    }
}

/// Handle to the current request's session, inserted by the session
/// middleware.
#[derive(Clone)]
pub struct Session {
    id: String,
    store: Arc<SessionStore>,
}

impl Session {
    pub fn new(id: String, store: Arc<SessionStore>) -> Self {
        Self { id, store }
    }

    pub fn save_credentials(&self, bundle: &CredentialBundle) -> Result<(), AppError> {
        let raw = bundle.to_json()?;
        self.store.update(&self.id, |s| s.credentials = Some(raw));
        Ok(())
    }

    /// A bundle that no longer deserializes is treated as absent.
    pub fn load_credentials(&self) -> Option<CredentialBundle> {
        let raw = self.store.get(&self.id).credentials?;
        match CredentialBundle::from_json(&raw) {
            Ok(bundle) => Some(bundle),
            Err(e) => {
                warn!(error = %e, "Discarding unreadable credentials from session");
                None
            }
        }
    }

    pub fn clear_credentials(&self) {
        if self.store.contains(&self.id) {
            self.store.update(&self.id, |s| s.credentials = None);
        }
    }

    pub fn set_oauth_state(&self, state: String) {
        self.store.update(&self.id, |s| s.oauth_state = Some(state));
    }

    /// Removes the stored state so it can only be checked once.
    pub fn take_oauth_state(&self) -> Option<String> {
        if !self.store.contains(&self.id) {
            return None;
        }
        self.store.update(&self.id, |s| s.oauth_state.take())
    }

    pub fn set_flash(&self, message: impl Into<String>) {
        let message = message.into();
        self.store.update(&self.id, |s| s.flash = Some(message));
    }

    pub fn take_flash(&self) -> Option<String> {
        if !self.store.contains(&self.id) {
            return None;
        }
        self.store.update(&self.id, |s| s.flash.take())
    }

    /// Drops everything held for this session.
    pub fn clear(&self) {
        self.store.remove(&self.id);
    }
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("Session layer not installed".to_string()))
    }
}
