//! Cookie sessions on top of `tower-sessions`
//!
//! [`KeyValueSessionStore`] persists session records in any
//! [`KeyValueStore`] under `session:<id>`, with the store TTL following the
//! record's expiry date. Sessions are only written once something is put in
//! them, so anonymous traffic leaves nothing behind and gets no cookie.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use common::cache::KeyValueStore;
use serde::{Deserialize, Serialize};
use tower_sessions::{
    Expiry, Session, SessionManagerLayer, SessionStore,
    cookie::{SameSite, time::Duration, time::OffsetDateTime},
    session::{Id, Record},
    session_store,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::User;

/// Session lifetime: 10 days
pub const DEFAULT_SESSION_TTL_SECONDS: u64 = 10 * 24 * 60 * 60;

/// Default session cookie name
pub const DEFAULT_SESSION_COOKIE: &str = "recipes.sid";

/// Upper bound for configured lifetimes (one year)
pub const MAX_SESSION_TTL_SECONDS: u64 = 365 * 24 * 60 * 60;

/// Keys used inside the session record
pub mod session_keys {
    pub const CURRENT_USER: &str = "current_user";
}

/// The logged-in user, as remembered by the session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
        }
    }
}

/// Session store writing records into a [`KeyValueStore`]
#[derive(Clone)]
pub struct KeyValueSessionStore {
    store: Arc<dyn KeyValueStore>,
}

impl KeyValueSessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn key(id: &Id) -> String {
        format!("session:{}", id)
    }
}

impl fmt::Debug for KeyValueSessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyValueSessionStore").finish_non_exhaustive()
    }
}

fn backend_error(error: impl fmt::Display) -> session_store::Error {
    session_store::Error::Backend(error.to_string())
}

#[async_trait]
impl SessionStore for KeyValueSessionStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        while self
            .store
            .get(&Self::key(&record.id))
            .await
            .map_err(backend_error)?
            .is_some()
        {
            record.id = Id::default();
        }
        self.save(record).await
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        let remaining = (record.expiry_date - OffsetDateTime::now_utc()).whole_seconds();
        let Ok(ttl) = u64::try_from(remaining) else {
            return self.delete(&record.id).await;
        };
        if ttl == 0 {
            return self.delete(&record.id).await;
        }

        let raw = serde_json::to_string(record)
            .map_err(|e| session_store::Error::Encode(e.to_string()))?;
        self.store
            .set(&Self::key(&record.id), &raw, Some(ttl))
            .await
            .map_err(backend_error)
    }

    async fn load(&self, id: &Id) -> session_store::Result<Option<Record>> {
        let Some(raw) = self
            .store
            .get(&Self::key(id))
            .await
            .map_err(backend_error)?
        else {
            return Ok(None);
        };

        let record: Record = serde_json::from_str(&raw)
            .map_err(|e| session_store::Error::Decode(e.to_string()))?;
        if record.expiry_date <= OffsetDateTime::now_utc() {
            debug!("Dropping expired session");
            self.delete(id).await?;
            return Ok(None);
        }

        Ok(Some(record))
    }

    async fn delete(&self, id: &Id) -> session_store::Result<()> {
        self.store
            .delete(&Self::key(id))
            .await
            .map_err(backend_error)
    }
}

/// Cookie and lifetime settings for the session layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    pub cookie_name: String,
    pub ttl_seconds: u64,
    pub secure: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            cookie_name: DEFAULT_SESSION_COOKIE.to_string(),
            ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            secure: false,
        }
    }
}

impl SessionSettings {
    /// Lifetime applied to both the stored record and the cookie's Max-Age
    pub fn lifetime(&self) -> Duration {
        Duration::seconds(self.ttl_seconds.min(MAX_SESSION_TTL_SECONDS) as i64)
    }
}

/// Create the session layer over the given store
pub fn create_session_layer(
    store: Arc<dyn KeyValueStore>,
    settings: &SessionSettings,
) -> SessionManagerLayer<KeyValueSessionStore> {
    SessionManagerLayer::new(KeyValueSessionStore::new(store))
        .with_name(settings.cookie_name.clone())
        .with_expiry(Expiry::OnInactivity(settings.lifetime()))
        .with_secure(settings.secure)
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// The logged-in user, if any
pub async fn current_user(
    session: &Session,
) -> Result<Option<CurrentUser>, tower_sessions::session::Error> {
    session.get(session_keys::CURRENT_USER).await
}

/// Record a successful login under a fresh session id
pub async fn log_in(session: &Session, user: &User) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session
        .insert(session_keys::CURRENT_USER, CurrentUser::from(user))
        .await?;
    info!("Session authenticated for user: {}", user.id);
    Ok(())
}

/// Forget the logged-in user and drop the stored session
pub async fn log_out(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::cache::MemoryStore;
    use std::collections::HashMap;

    fn record(expires_in: Duration) -> Record {
        Record {
            id: Id::default(),
            data: HashMap::from([(
                session_keys::CURRENT_USER.to_string(),
                serde_json::json!({ "id": Uuid::nil(), "email": "cook@example.com" }),
            )]),
            expiry_date: OffsetDateTime::now_utc() + expires_in,
        }
    }

    #[test]
    fn test_default_ttl_is_ten_days() {
        assert_eq!(DEFAULT_SESSION_TTL_SECONDS, 864_000);
        assert_eq!(SessionSettings::default().lifetime(), Duration::days(10));
    }

    #[test]
    fn test_lifetime_is_capped() {
        let settings = SessionSettings {
            ttl_seconds: u64::MAX,
            ..SessionSettings::default()
        };
        assert_eq!(settings.lifetime(), Duration::days(365));
    }

    #[tokio::test]
    async fn test_store_round_trip() -> session_store::Result<()> {
        let memory = MemoryStore::new();
        let store = KeyValueSessionStore::new(Arc::new(memory.clone()));
        let mut record = record(Duration::hours(1));

        store.create(&mut record).await?;
        assert_eq!(memory.len().await, 1);
        let loaded = store.load(&record.id).await?.unwrap();
        assert_eq!(loaded.id, record.id);
        assert_eq!(loaded.data, record.data);

        store.delete(&record.id).await?;
        assert!(store.load(&record.id).await?.is_none());
        assert!(memory.is_empty().await);
        Ok(())
    }

    #[tokio::test]
    async fn test_expired_record_is_not_stored() -> session_store::Result<()> {
        let memory = MemoryStore::new();
        let store = KeyValueSessionStore::new(Arc::new(memory.clone()));
        let record = record(Duration::seconds(-5));

        store.save(&record).await?;
        assert!(memory.is_empty().await);
        assert!(store.load(&record.id).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_expired_record_is_dropped_on_load() -> session_store::Result<()> {
        let memory = MemoryStore::new();
        let store = KeyValueSessionStore::new(Arc::new(memory.clone()));
        let record = record(Duration::seconds(-5));

        let raw = serde_json::to_string(&record).unwrap();
        memory
            .set(&format!("session:{}", record.id), &raw, None)
            .await
            .unwrap();

        assert!(store.load(&record.id).await?.is_none());
        assert!(memory.is_empty().await);
        Ok(())
    }
}
