//! API client configuration

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{ApiError, ApiResult};

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Site root, e.g. `https://practice.expandtesting.com`
    pub base_url: String,

    /// Path prefix of the REST API under the site root
    pub api_base_path: String,

    /// Per-request timeout applied when the caller sets none
    pub default_timeout_ms: u64,

    /// Named endpoint paths
    pub endpoints: Endpoints,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://practice.expandtesting.com".to_string(),
            api_base_path: "/notes/api".to_string(),
            default_timeout_ms: 10_000,
            endpoints: Endpoints::default(),
        }
    }
}

/// Endpoint paths, relative to the API base path
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub health_check_url: String,
    pub register_user_url: String,
    pub login_user_url: String,
    pub logout_user_url: String,
    pub profile_user_url: String,
    pub change_password_user_url: String,
    pub delete_account_user_url: String,
    pub notes_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            health_check_url: "/health-check".to_string(),
            register_user_url: "/users/register".to_string(),
            login_user_url: "/users/login".to_string(),
            logout_user_url: "/users/logout".to_string(),
            profile_user_url: "/users/profile".to_string(),
            change_password_user_url: "/users/change-password".to_string(),
            delete_account_user_url: "/users/delete-account".to_string(),
            notes_url: "/notes".to_string(),
        }
    }
}

impl Endpoints {
    /// Resolve an endpoint by its configuration name (`"notes_url"`, ...)
    pub fn lookup(&self, name: &str) -> Option<&str> {
        let path = match name {
            "health_check_url" => &self.health_check_url,
            "register_user_url" => &self.register_user_url,
            "login_user_url" => &self.login_user_url,
            "logout_user_url" => &self.logout_user_url,
            "profile_user_url" => &self.profile_user_url,
            "change_password_user_url" => &self.change_password_user_url,
            "delete_account_user_url" => &self.delete_account_user_url,
            "notes_url" => &self.notes_url,
            _ => return None,
        };
        Some(path.as_str())
    }

    /// Like [`Endpoints::lookup`] but fails on an unknown name
    pub fn require(&self, name: &str) -> ApiResult<&str> {
        self.lookup(name)
            .ok_or_else(|| ApiError::UnknownEndpoint(name.to_string()))
    }
}

impl ApiConfig {
    /// Load configuration from a TOML file, or defaults if it does not exist
    pub fn load(path: &Path) -> ApiResult<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Apply `PRACTICE_*` environment overrides
    pub fn with_env_overrides(mut self) -> ApiResult<Self> {
        if let Some(url) = env_value("PRACTICE_BASE_URL") {
            self.base_url = url;
        }
        if let Some(path) = env_value("PRACTICE_API_BASE_PATH") {
            self.api_base_path = path;
        }
        if let Some(ms) = env_value("PRACTICE_DEFAULT_TIMEOUT_MS") {
            self.default_timeout_ms = ms.parse().map_err(|_| {
                ApiError::InvalidConfig(format!("PRACTICE_DEFAULT_TIMEOUT_MS is not a number: {}", ms))
            })?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Point the configuration at another site root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn validate(&self) -> ApiResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ApiError::InvalidConfig(format!(
                "base_url must be an http(s) URL: {}",
                self.base_url
            )));
        }
        if self.default_timeout_ms == 0 {
            return Err(ApiError::InvalidConfig("default_timeout_ms must be positive".to_string()));
        }
        Ok(())
    }

    /// Full URL prefix every endpoint path is appended to
    pub fn api_root(&self) -> String {
        format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            self.api_base_path
        )
    }

    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .and_then(|v| if v.trim().is_empty() { None } else { Some(v) })
}
