use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub backend: BackendConfig,
    pub guard: GuardConfig,
    pub uploads: UploadConfig,
    pub services: ServicesConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    /// Hosted backend over HTTP
    Remote,
    /// In-process fixture backend
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub mode: BackendMode,
    pub url: String,
    pub anon_key: String,
    /// Privileged key used only by the admin user listing
    pub service_key: Option<String>,
    pub request_timeout_secs: u64,
    pub storage_bucket: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardConfig {
    pub loading_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub max_file_bytes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServicesConfig {
    /// Tables whose service functions are stubbed out
    pub disabled: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub cors_origins: Vec<String>,
}

impl GuardConfig {
    pub fn loading_timeout(&self) -> Duration {
        Duration::from_millis(self.loading_timeout_ms)
    }
}

impl ServicesConfig {
    pub fn is_disabled(&self, table: &str) -> bool {
        self.disabled.iter().any(|t| t == table)
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Backend overrides
        if let Ok(v) = env::var("BACKEND_MODE") {
            self.backend.mode = match v.as_str() {
                "memory" => BackendMode::Memory,
                _ => BackendMode::Remote,
            };
        }
        if let Ok(v) = env::var("BACKEND_URL") {
            self.backend.url = v.trim_end_matches('/').to_string();
        }
        if let Ok(v) = env::var("BACKEND_ANON_KEY") {
            self.backend.anon_key = v;
        }
        if let Ok(v) = env::var("BACKEND_SERVICE_KEY") {
            self.backend.service_key = Some(v).filter(|k| !k.is_empty());
        }
        if let Ok(v) = env::var("BACKEND_TIMEOUT_SECS") {
            self.backend.request_timeout_secs = v.parse().unwrap_or(self.backend.request_timeout_secs);
        }
        if let Ok(v) = env::var("BACKEND_STORAGE_BUCKET") {
            self.backend.storage_bucket = v;
        }

        // Guard overrides
        if let Ok(v) = env::var("GUARD_LOADING_TIMEOUT_MS") {
            self.guard.loading_timeout_ms = v.parse().unwrap_or(self.guard.loading_timeout_ms);
        }

        // Upload overrides
        if let Ok(v) = env::var("UPLOAD_MAX_FILE_BYTES") {
            self.uploads.max_file_bytes = v.parse().unwrap_or(self.uploads.max_file_bytes);
        }

        // Service overrides
        if let Ok(v) = env::var("SERVICES_DISABLED") {
            self.services.disabled = split_list(&v);
        }

        // Server overrides
        if let Some(port) = env::var("SERVER_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.server.port = port;
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.server.cors_origins = split_list(&v);
        }

        self
    }

    fn base(environment: Environment) -> Self {
        Self {
            environment,
            backend: BackendConfig {
                mode: BackendMode::Remote,
                url: "http://localhost:54321".to_string(),
                anon_key: String::new(),
                service_key: None,
                request_timeout_secs: 30,
                storage_bucket: "documents".to_string(),
            },
            guard: GuardConfig {
                loading_timeout_ms: 2000,
            },
            uploads: UploadConfig {
                max_file_bytes: 20 * 1024 * 1024, // 20MB
            },
            services: ServicesConfig {
                disabled: ["cases", "documents", "form_templates", "calendar_events"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            },
            server: ServerConfig {
                port: 3000,
                cors_origins: vec!["http://localhost:5173".to_string()],
            },
        }
    }

    pub fn development() -> Self {
        let mut config = Self::base(Environment::Development);
        config.backend.mode = BackendMode::Memory;
        config
    }

    fn staging() -> Self {
        let mut config = Self::base(Environment::Staging);
        config.backend.request_timeout_secs = 15;
        config.server.cors_origins = vec!["https://staging.casedesk.app".to_string()];
        config
    }

    fn production() -> Self {
        let mut config = Self::base(Environment::Production);
        config.backend.request_timeout_secs = 10;
        config.server.cors_origins = vec!["https://casedesk.app".to_string()];
        config
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
