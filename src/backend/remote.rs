use async_trait::async_trait;
use chrono::Utc;
use reqwest::{header, Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use url::Url;
use uuid::Uuid;

use super::{
    AdminClient, AuthChangeEvent, AuthClient, AuthenticatedUser, BackendError, Query, Session, SessionStore,
    StorageClient, TableClient,
};
use crate::auth::claims;
use crate::config::BackendConfig;
use crate::models::AdminUser;

const EVENT_CAPACITY: usize = 16;

/// HTTP client for the hosted backend
pub struct RemoteBackend {
    http: Client,
    base: Url,
    anon_key: String,
    service_key: Option<String>,
    store: Arc<dyn SessionStore>,
    events: broadcast::Sender<AuthChangeEvent>,
}

/// Token grant response from the auth endpoints
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    #[serde(default)]
    user: Option<AuthenticatedUser>,
}

#[derive(Debug, Deserialize)]
struct AdminUsersResponse {
    #[serde(default)]
    users: Vec<AdminUser>,
}

impl RemoteBackend {
    pub fn new(config: &BackendConfig, store: Arc<dyn SessionStore>) -> Result<Self, BackendError> {
        if config.anon_key.is_empty() {
            return Err(BackendError::Config("BACKEND_ANON_KEY is not set".to_string()));
        }

        let base = Url::parse(&config.url)
            .map_err(|e| BackendError::Config(format!("invalid BACKEND_URL '{}': {}", config.url, e)))?;

        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| BackendError::Config(e.to_string()))?;

        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Ok(Self {
            http,
            base,
            anon_key: config.anon_key.clone(),
            service_key: config.service_key.clone(),
            store,
            events,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        self.base
            .join(path)
            .map_err(|e| BackendError::Config(format!("invalid endpoint '{}': {}", path, e)))
    }

    /// Request carrying the public key and the user's token when signed in.
    /// Without a session the service key is used if configured.
    fn request(&self, method: Method, url: Url) -> Result<RequestBuilder, BackendError> {
        let bearer = match self.store.load()? {
            Some(session) => session.access_token,
            None => self.service_key.clone().unwrap_or_else(|| self.anon_key.clone()),
        };
        Ok(self
            .http
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer))
    }

    fn table_url(&self, table: &str, query: &Query) -> Result<Url, BackendError> {
        let mut url = self.endpoint(&format!("rest/v1/{}", table))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("select", "*");
            for (column, value) in &query.filters {
                pairs.append_pair(column, &format!("eq.{}", value));
            }
            if let Some((column, ascending)) = &query.order {
                let direction = if *ascending { "asc" } else { "desc" };
                pairs.append_pair("order", &format!("{}.{}", column, direction));
            }
            if let Some(limit) = query.limit {
                pairs.append_pair("limit", &limit.to_string());
            }
        }
        Ok(url)
    }

    async fn token_grant(&self, grant_type: &str, body: Value) -> Result<Session, BackendError> {
        let mut url = self.endpoint("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", grant_type);

        let response = self
            .http
            .post(url)
            .header("apikey", &self.anon_key)
            .json(&body)
            .send()
            .await?;
        let token: TokenResponse = read_json(response).await?;
        session_from_token(token)
    }

    async fn refresh(&self, session: &Session) -> Result<Option<Session>, BackendError> {
        let body = json!({ "refresh_token": session.refresh_token });
        match self.token_grant("refresh_token", body).await {
            Ok(fresh) => {
                self.store.save(&fresh)?;
                self.publish(AuthChangeEvent::TokenRefreshed(fresh.clone()));
                Ok(Some(fresh))
            }
            Err(BackendError::Unauthorized(msg)) | Err(BackendError::Http { status: 400, message: msg }) => {
                tracing::warn!("Stored session could not be refreshed: {}", msg);
                self.store.clear()?;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn publish(&self, event: AuthChangeEvent) {
        tracing::debug!("auth event {}", event.name());
        // No subscribers is not an error
        let _ = self.events.send(event);
    }
}

#[async_trait]
impl AuthClient for RemoteBackend {
    async fn get_session(&self) -> Result<Option<Session>, BackendError> {
        match self.store.load()? {
            Some(session) if session.is_expired() => self.refresh(&session).await,
            other => Ok(other),
        }
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, BackendError> {
        let session = self
            .token_grant("password", json!({ "email": email, "password": password }))
            .await?;
        self.store.save(&session)?;
        self.publish(AuthChangeEvent::SignedIn(session.clone()));
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        if self.store.load()?.is_some() {
            let url = self.endpoint("auth/v1/logout")?;
            let response = self.request(Method::POST, url)?.send().await?;
            ensure_success(response).await?;
        }
        self.store.clear()?;
        self.publish(AuthChangeEvent::SignedOut);
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> Result<AuthenticatedUser, BackendError> {
        let url = self.endpoint("auth/v1/user")?;
        let response = self
            .http
            .get(url)
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;
        read_json(response).await
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthChangeEvent> {
        self.events.subscribe()
    }
}

#[async_trait]
impl TableClient for RemoteBackend {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, BackendError> {
        let url = self.table_url(table, query)?;
        let response = self.request(Method::GET, url)?.send().await?;
        read_json(response).await
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Value, BackendError> {
        let url = self.endpoint(&format!("rest/v1/{}", table))?;
        let response = self
            .request(Method::POST, url)?
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .await?;
        first_row(read_json(response).await?, table)
    }

    async fn update(&self, table: &str, id: Uuid, patch: Value) -> Result<Value, BackendError> {
        let url = self.table_url(table, &Query::new().eq("id", id))?;
        let response = self
            .request(Method::PATCH, url)?
            .header("Prefer", "return=representation")
            .json(&patch)
            .send()
            .await?;
        first_row(read_json(response).await?, table)
    }

    async fn delete(&self, table: &str, id: Uuid) -> Result<(), BackendError> {
        let url = self.table_url(table, &Query::new().eq("id", id))?;
        let response = self.request(Method::DELETE, url)?.send().await?;
        ensure_success(response).await
    }
}

#[async_trait]
impl StorageClient for RemoteBackend {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        upsert: bool,
    ) -> Result<String, BackendError> {
        let url = self.endpoint(&format!("storage/v1/object/{}/{}", bucket, path))?;
        let response = self
            .request(Method::POST, url)?
            .header(header::CONTENT_TYPE, content_type)
            .header("x-upsert", upsert.to_string())
            .body(bytes)
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(path.to_string())
    }
}

#[async_trait]
impl AdminClient for RemoteBackend {
    async fn list_users(&self) -> Result<Vec<AdminUser>, BackendError> {
        let key = self
            .service_key
            .as_ref()
            .ok_or_else(|| BackendError::Config("BACKEND_SERVICE_KEY is not set".to_string()))?;
        let url = self.endpoint("auth/v1/admin/users")?;
        let response = self
            .http
            .get(url)
            .header("apikey", key)
            .bearer_auth(key)
            .send()
            .await?;
        let body: AdminUsersResponse = read_json(response).await?;
        Ok(body.users)
    }

    async fn health(&self) -> Result<(), BackendError> {
        let url = self.endpoint("auth/v1/health")?;
        let response = self.http.get(url).header("apikey", &self.anon_key).send().await?;
        ensure_success(response).await
    }
}

fn session_from_token(token: TokenResponse) -> Result<Session, BackendError> {
    let decoded = claims::decode_access_token(&token.access_token).ok();

    let expires_at = token
        .expires_at
        .or_else(|| token.expires_in.map(|secs| Utc::now().timestamp() + secs))
        .or_else(|| decoded.as_ref().map(|c| c.exp))
        .ok_or_else(|| BackendError::Decode("token response has no expiry".to_string()))?;

    let user = match (token.user, decoded) {
        (Some(user), _) => user,
        (None, Some(c)) => AuthenticatedUser { id: c.sub, email: c.email },
        (None, None) => return Err(BackendError::Decode("token response has no user".to_string())),
    };

    Ok(Session {
        access_token: token.access_token,
        refresh_token: token.refresh_token,
        token_type: token.token_type.unwrap_or_else(|| "bearer".to_string()),
        expires_at,
        user,
    })
}

fn first_row(rows: Vec<Value>, table: &str) -> Result<Value, BackendError> {
    rows.into_iter()
        .next()
        .ok_or_else(|| BackendError::NotFound(format!("no row returned from {}", table)))
}

async fn read_json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, BackendError> {
    let response = check_status(response).await?;
    response.json::<T>().await.map_err(|e| BackendError::Decode(e.to_string()))
}

async fn ensure_success(response: Response) -> Result<(), BackendError> {
    check_status(response).await.map(|_| ())
}

async fn check_status(response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body).unwrap_or_else(|| status.to_string());

    Err(match status.as_u16() {
        401 | 403 => BackendError::Unauthorized(message),
        404 => BackendError::NotFound(message),
        code => BackendError::Http { status: code, message },
    })
}

/// Providers report errors under several keys
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["msg", "message", "error_description", "error"]
        .iter()
        .find_map(|key| value.get(key).and_then(Value::as_str))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemorySessionStore;
    use crate::config::AppConfig;

    fn backend() -> RemoteBackend {
        let mut config = AppConfig::development().backend;
        config.url = "https://demo.backend.test/".to_string();
        config.anon_key = "anon".to_string();
        RemoteBackend::new(&config, Arc::new(MemorySessionStore::default())).unwrap()
    }

    #[test]
    fn requires_anon_key() {
        let config = AppConfig::development().backend;
        let result = RemoteBackend::new(&config, Arc::new(MemorySessionStore::default()));
        assert!(matches!(result, Err(BackendError::Config(_))));
    }

    #[test]
    fn builds_filtered_table_urls() {
        let url = backend()
            .table_url("profiles", &Query::new().eq("role", "admin").order("created_at", false).limit(10))
            .unwrap();
        assert_eq!(url.path(), "/rest/v1/profiles");
        let query = url.query().unwrap();
        assert!(query.contains("select=*"));
        assert!(query.contains("role=eq.admin"));
        assert!(query.contains("order=created_at.desc"));
        assert!(query.contains("limit=10"));
    }

    #[test]
    fn extracts_provider_error_messages() {
        assert_eq!(error_message(r#"{"msg":"Invalid login credentials"}"#).as_deref(), Some("Invalid login credentials"));
        assert_eq!(error_message(r#"{"error":"invalid_grant"}"#).as_deref(), Some("invalid_grant"));
        assert_eq!(error_message("not json"), None);
    }

    #[test]
    fn token_without_user_falls_back_to_claims() {
        let id = Uuid::new_v4();
        let access = claims::tests::token_for(id, Some("ana@example.com"), 1_900_000_000);
        let session = session_from_token(TokenResponse {
            access_token: access,
            refresh_token: "r".to_string(),
            token_type: None,
            expires_in: None,
            expires_at: None,
            user: None,
        })
        .unwrap();
        assert_eq!(session.user.id, id);
        assert_eq!(session.expires_at, 1_900_000_000);
        assert_eq!(session.token_type, "bearer");
    }
}
