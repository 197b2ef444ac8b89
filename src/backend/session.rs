use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use uuid::Uuid;

use super::BackendError;

/// Seconds before expiry at which a session is treated as expired
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Minimal identity attached to a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

/// Credential bundle issued by the hosted auth service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Unix seconds
    pub expires_at: i64,
    pub user: AuthenticatedUser,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl Session {
    pub fn is_expired(&self) -> bool {
        self.expires_at - EXPIRY_MARGIN_SECS <= Utc::now().timestamp()
    }
}

/// Auth-change notifications published by the backend client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthChangeEvent {
    SignedIn(Session),
    SignedOut,
    TokenRefreshed(Session),
    UserUpdated(Session),
    PasswordRecovery,
}

impl AuthChangeEvent {
    pub fn name(&self) -> &'static str {
        match self {
            AuthChangeEvent::SignedIn(_) => "SIGNED_IN",
            AuthChangeEvent::SignedOut => "SIGNED_OUT",
            AuthChangeEvent::TokenRefreshed(_) => "TOKEN_REFRESHED",
            AuthChangeEvent::UserUpdated(_) => "USER_UPDATED",
            AuthChangeEvent::PasswordRecovery => "PASSWORD_RECOVERY",
        }
    }
}

/// Where the client keeps the current session between runs
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<Session>, BackendError>;
    fn save(&self, session: &Session) -> Result<(), BackendError>;
    fn clear(&self) -> Result<(), BackendError>;
}

/// JSON file in the CLI configuration directory
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<Session>, BackendError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path).map_err(|e| BackendError::Storage(e.to_string()))?;
        match serde_json::from_str(&content) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                // A corrupt file behaves like a signed-out client
                tracing::warn!("Ignoring unreadable session file {}: {}", self.path.display(), e);
                Ok(None)
            }
        }
    }

    fn save(&self, session: &Session) -> Result<(), BackendError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| BackendError::Storage(e.to_string()))?;
        }
        let content = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, content).map_err(|e| BackendError::Storage(e.to_string()))
    }

    fn clear(&self) -> Result<(), BackendError> {
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|e| BackendError::Storage(e.to_string()))?;
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    session: Mutex<Option<Session>>,
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<Session>, BackendError> {
        let guard = self.session.lock().map_err(|e| BackendError::Storage(e.to_string()))?;
        Ok(guard.clone())
    }

    fn save(&self, session: &Session) -> Result<(), BackendError> {
        let mut guard = self.session.lock().map_err(|e| BackendError::Storage(e.to_string()))?;
        *guard = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), BackendError> {
        let mut guard = self.session.lock().map_err(|e| BackendError::Storage(e.to_string()))?;
        *guard = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(expires_at: i64) -> Session {
        Session {
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
            token_type: "bearer".to_string(),
            expires_at,
            user: AuthenticatedUser {
                id: Uuid::new_v4(),
                email: Some("ana@example.com".to_string()),
            },
        }
    }

    #[test]
    fn expiry_uses_margin() {
        let now = Utc::now().timestamp();
        assert!(session(now + 30).is_expired());
        assert!(!session(now + 3600).is_expired());
    }

    #[test]
    fn file_store_round_trips_and_clears() {
        let path = std::env::temp_dir().join(format!("casedesk-session-{}.json", Uuid::new_v4()));
        let store = FileSessionStore::new(&path);
        assert_eq!(store.load().unwrap(), None);

        let s = session(Utc::now().timestamp() + 3600);
        store.save(&s).unwrap();
        assert_eq!(store.load().unwrap(), Some(s));

        store.clear().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn corrupt_file_reads_as_signed_out() {
        let path = std::env::temp_dir().join(format!("casedesk-session-{}.json", Uuid::new_v4()));
        fs::write(&path, "{not json").unwrap();
        let store = FileSessionStore::new(&path);
        assert_eq!(store.load().unwrap(), None);
        let _ = fs::remove_file(path);
    }
}
