use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use tokio::sync::broadcast;
use uuid::Uuid;

use super::{
    AdminClient, AuthChangeEvent, AuthClient, AuthenticatedUser, BackendError, Query, Session, StorageClient,
    TableClient,
};
use crate::models::{AdminUser, DocumentType, Record, Role, UserProfile};

const SESSION_LIFETIME_SECS: i64 = 3600;

/// Operations that can be forced to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    GetSession,
    SignIn,
    SignOut,
    Select,
    Mutate,
    Upload,
    ListUsers,
    Health,
}

#[derive(Debug, Clone)]
struct Account {
    password: String,
    user: AuthenticatedUser,
    created_at: chrono::DateTime<Utc>,
    last_sign_in_at: Option<chrono::DateTime<Utc>>,
}

#[derive(Default)]
struct State {
    accounts: HashMap<String, Account>,
    tokens: HashMap<String, AuthenticatedUser>,
    session: Option<Session>,
    tables: HashMap<String, Vec<Value>>,
    objects: HashMap<String, (Vec<u8>, String)>,
    failures: HashSet<FailPoint>,
}

/// In-process backend with the same contract as the hosted one
pub struct MemoryBackend {
    state: Mutex<State>,
    events: broadcast::Sender<AuthChangeEvent>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            state: Mutex::new(State::default()),
            events,
        }
    }

    /// Demo data: one admin, one applicant and a small document-type catalog
    pub fn seeded() -> Self {
        let backend = Self::new();

        let admin = backend.add_account("admin@casedesk.test", "admin-password");
        let mut admin_profile = UserProfile::new(admin.id, Role::Admin);
        admin_profile.full_name = Some("Site Admin".to_string());
        admin_profile.email = admin.email.clone();
        backend.insert_record(&admin_profile);

        let applicant = backend.add_account("applicant@casedesk.test", "applicant-password");
        let mut applicant_profile = UserProfile::new(applicant.id, Role::Applicant);
        applicant_profile.full_name = Some("Test Applicant".to_string());
        applicant_profile.email = applicant.email.clone();
        applicant_profile.individual_mode = true;
        backend.insert_record(&applicant_profile);

        for (name, category, exts) in [
            ("Passport", "identity", vec!["pdf", "jpg", "png"]),
            ("Birth certificate", "civil", vec!["pdf"]),
            ("Employment letter", "employment", vec!["pdf", "doc", "docx"]),
        ] {
            backend.insert_record(&DocumentType {
                id: Some(Uuid::new_v4()),
                name: name.to_string(),
                category: category.to_string(),
                description: None,
                allowed_extensions: exts.into_iter().map(str::to_string).collect(),
                required: category == "identity",
            });
        }

        backend
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn add_account(&self, email: &str, password: &str) -> AuthenticatedUser {
        let user = AuthenticatedUser {
            id: Uuid::new_v4(),
            email: Some(email.to_string()),
        };
        self.lock().accounts.insert(
            email.to_ascii_lowercase(),
            Account {
                password: password.to_string(),
                user: user.clone(),
                created_at: Utc::now(),
                last_sign_in_at: None,
            },
        );
        user
    }

    pub fn insert_row(&self, table: &str, row: Value) {
        self.lock().tables.entry(table.to_string()).or_default().push(row);
    }

    pub fn insert_record<T: Record>(&self, record: &T) {
        match serde_json::to_value(record) {
            Ok(row) => self.insert_row(T::TABLE, row),
            Err(e) => tracing::error!("Failed to seed {}: {}", T::TABLE, e),
        }
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.lock().tables.get(table).cloned().unwrap_or_default()
    }

    pub fn object(&self, path: &str) -> Option<(Vec<u8>, String)> {
        self.lock().objects.get(path).cloned()
    }

    pub fn fail(&self, point: FailPoint) {
        self.lock().failures.insert(point);
    }

    pub fn recover(&self, point: FailPoint) {
        self.lock().failures.remove(&point);
    }

    /// Issue a session for an account without going through sign-in
    pub fn issue_session(&self, user: &AuthenticatedUser) -> Session {
        let session = Session {
            access_token: format!("memory-{}", Uuid::new_v4().simple()),
            refresh_token: format!("refresh-{}", Uuid::new_v4().simple()),
            token_type: "bearer".to_string(),
            expires_at: Utc::now().timestamp() + SESSION_LIFETIME_SECS,
            user: user.clone(),
        };
        let mut state = self.lock();
        // Only the current session's token stays valid
        if let Some(previous) = state.session.take() {
            state.tokens.remove(&previous.access_token);
        }
        state.tokens.insert(session.access_token.clone(), user.clone());
        state.session = Some(session.clone());
        session
    }

    /// Publish an event as the hosted provider would
    pub fn emit(&self, event: AuthChangeEvent) {
        let _ = self.events.send(event);
    }

    fn check(&self, point: FailPoint) -> Result<(), BackendError> {
        if self.lock().failures.contains(&point) {
            return Err(BackendError::Http {
                status: 500,
                message: format!("simulated {:?} failure", point),
            });
        }
        Ok(())
    }
}

fn column_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn matches(row: &Value, query: &Query) -> bool {
    query
        .filters
        .iter()
        .all(|(column, expected)| row.get(column).map(column_text).as_deref() == Some(expected.as_str()))
}

#[async_trait]
impl AuthClient for MemoryBackend {
    async fn get_session(&self) -> Result<Option<Session>, BackendError> {
        self.check(FailPoint::GetSession)?;
        Ok(self.lock().session.clone())
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, BackendError> {
        self.check(FailPoint::SignIn)?;
        let user = {
            let mut state = self.lock();
            let account = state
                .accounts
                .get_mut(&email.to_ascii_lowercase())
                .filter(|a| a.password == password)
                .ok_or_else(|| BackendError::Http {
                    status: 400,
                    message: "Invalid login credentials".to_string(),
                })?;
            account.last_sign_in_at = Some(Utc::now());
            account.user.clone()
        };
        let session = self.issue_session(&user);
        self.emit(AuthChangeEvent::SignedIn(session.clone()));
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        self.check(FailPoint::SignOut)?;
        {
            let mut state = self.lock();
            if let Some(session) = state.session.take() {
                state.tokens.remove(&session.access_token);
            }
        }
        self.emit(AuthChangeEvent::SignedOut);
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> Result<AuthenticatedUser, BackendError> {
        self.lock()
            .tokens
            .get(access_token)
            .cloned()
            .ok_or_else(|| BackendError::Unauthorized("invalid JWT".to_string()))
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthChangeEvent> {
        self.events.subscribe()
    }
}

#[async_trait]
impl TableClient for MemoryBackend {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, BackendError> {
        self.check(FailPoint::Select)?;
        let mut rows: Vec<Value> = self
            .lock()
            .tables
            .get(table)
            .map(|rows| rows.iter().filter(|r| matches(r, query)).cloned().collect())
            .unwrap_or_default();

        if let Some((column, ascending)) = &query.order {
            rows.sort_by(|a, b| {
                let left = a.get(column).map(column_text).unwrap_or_default();
                let right = b.get(column).map(column_text).unwrap_or_default();
                if *ascending {
                    left.cmp(&right)
                } else {
                    right.cmp(&left)
                }
            });
        }
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }

    async fn insert(&self, table: &str, mut row: Value) -> Result<Value, BackendError> {
        self.check(FailPoint::Mutate)?;
        let object = row
            .as_object_mut()
            .ok_or_else(|| BackendError::Http {
                status: 400,
                message: "row must be a JSON object".to_string(),
            })?;
        if object.get("id").map_or(true, Value::is_null) {
            object.insert("id".to_string(), json!(Uuid::new_v4()));
        }
        object
            .entry("created_at")
            .or_insert_with(|| json!(Utc::now()));
        self.insert_row(table, row.clone());
        Ok(row)
    }

    async fn update(&self, table: &str, id: Uuid, patch: Value) -> Result<Value, BackendError> {
        self.check(FailPoint::Mutate)?;
        let id_text = id.to_string();
        let mut state = self.lock();
        let row = state
            .tables
            .get_mut(table)
            .and_then(|rows| {
                rows.iter_mut()
                    .find(|r| r.get("id").map(column_text).as_deref() == Some(id_text.as_str()))
            })
            .ok_or_else(|| BackendError::NotFound(format!("{} {} not found", table, id)))?;

        if let (Some(target), Some(changes)) = (row.as_object_mut(), patch.as_object()) {
            for (key, value) in changes {
                if key != "id" {
                    target.insert(key.clone(), value.clone());
                }
            }
        }
        Ok(row.clone())
    }

    async fn delete(&self, table: &str, id: Uuid) -> Result<(), BackendError> {
        self.check(FailPoint::Mutate)?;
        let id_text = id.to_string();
        if let Some(rows) = self.lock().tables.get_mut(table) {
            rows.retain(|r| r.get("id").map(column_text).as_deref() != Some(id_text.as_str()));
        }
        Ok(())
    }
}

#[async_trait]
impl StorageClient for MemoryBackend {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        upsert: bool,
    ) -> Result<String, BackendError> {
        self.check(FailPoint::Upload)?;
        let key = format!("{}/{}", bucket, path);
        let mut state = self.lock();
        if !upsert && state.objects.contains_key(&key) {
            return Err(BackendError::Http {
                status: 409,
                message: "The resource already exists".to_string(),
            });
        }
        state.objects.insert(key, (bytes, content_type.to_string()));
        Ok(path.to_string())
    }
}

#[async_trait]
impl AdminClient for MemoryBackend {
    async fn list_users(&self) -> Result<Vec<AdminUser>, BackendError> {
        self.check(FailPoint::ListUsers)?;
        let mut users: Vec<AdminUser> = self
            .lock()
            .accounts
            .values()
            .map(|a| AdminUser {
                id: a.user.id,
                email: a.user.email.clone(),
                created_at: Some(a.created_at),
                last_sign_in_at: a.last_sign_in_at,
            })
            .collect();
        users.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(users)
    }

    async fn health(&self) -> Result<(), BackendError> {
        self.check(FailPoint::Health)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sign_in_publishes_event_and_issues_token() {
        let backend = MemoryBackend::new();
        let user = backend.add_account("ana@example.com", "secret");
        let mut events = backend.subscribe();

        let session = backend.sign_in_with_password("ANA@example.com", "secret").await.unwrap();
        assert_eq!(session.user, user);
        assert_eq!(backend.get_user(&session.access_token).await.unwrap(), user);
        assert!(matches!(events.recv().await.unwrap(), AuthChangeEvent::SignedIn(_)));
    }

    #[tokio::test]
    async fn reissuing_revokes_the_previous_token() {
        let backend = MemoryBackend::new();
        let user = backend.add_account("ana@example.com", "secret");

        let first = backend.issue_session(&user);
        let second = backend.sign_in_with_password("ana@example.com", "secret").await.unwrap();

        assert!(matches!(
            backend.get_user(&first.access_token).await,
            Err(BackendError::Unauthorized(_))
        ));
        assert_eq!(backend.get_user(&second.access_token).await.unwrap(), user);
        assert_eq!(backend.lock().tokens.len(), 1);

        backend.sign_out().await.unwrap();
        assert!(backend.lock().tokens.is_empty());
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let backend = MemoryBackend::new();
        backend.add_account("ana@example.com", "secret");
        let err = backend.sign_in_with_password("ana@example.com", "nope").await.unwrap_err();
        assert_eq!(err.user_message(), "Invalid login credentials");
    }

    #[tokio::test]
    async fn select_filters_orders_and_limits() {
        let backend = MemoryBackend::new();
        backend.insert_row("t", json!({"id": "1", "kind": "a", "n": "2"}));
        backend.insert_row("t", json!({"id": "2", "kind": "b", "n": "1"}));
        backend.insert_row("t", json!({"id": "3", "kind": "a", "n": "3"}));

        let rows = backend
            .select("t", &Query::new().eq("kind", "a").order("n", false).limit(1))
            .await
            .unwrap();
        assert_eq!(rows, vec![json!({"id": "3", "kind": "a", "n": "3"})]);
    }

    #[tokio::test]
    async fn update_merges_and_keeps_id() {
        let backend = MemoryBackend::new();
        let id = Uuid::new_v4();
        backend.insert_row("t", json!({"id": id, "name": "old"}));
        let row = backend
            .update("t", id, json!({"id": Uuid::nil(), "name": "new"}))
            .await
            .unwrap();
        assert_eq!(row["name"], "new");
        assert_eq!(row["id"], json!(id));
    }

    #[tokio::test]
    async fn upload_without_upsert_rejects_duplicates() {
        let backend = MemoryBackend::new();
        backend.upload("docs", "a.pdf", vec![1], "application/pdf", false).await.unwrap();
        let err = backend
            .upload("docs", "a.pdf", vec![2], "application/pdf", false)
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Http { status: 409, .. }));
        backend.upload("docs", "a.pdf", vec![3], "application/pdf", true).await.unwrap();
        assert_eq!(backend.object("docs/a.pdf").unwrap().0, vec![3]);
    }

    #[tokio::test]
    async fn fail_points_toggle() {
        let backend = MemoryBackend::new();
        backend.fail(FailPoint::SignOut);
        assert!(backend.sign_out().await.is_err());
        backend.recover(FailPoint::SignOut);
        assert!(backend.sign_out().await.is_ok());
    }
}
