use secrecy::Secret;
use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct ItemsConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub mongodb: MongoConfig,
    pub auth: AuthConfig,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoConfig {
    pub uri: Secret<String>,
    pub database: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HS256 secret for bearer tokens. Without it every request is admitted.
    pub jwt_secret: Option<Secret<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Mount point for the item and auth routes, e.g. `/api/v1`.
    pub api_prefix: String,
    pub request_timeout_secs: u64,
}

impl MongoConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl HttpConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl ItemsConfig {
    pub fn load() -> Result<Self, AppError> {
        // Load common config (handles .env and APP__ prefix)
        let common_config = core_config::Config::load()?;

        Ok(ItemsConfig {
            common: common_config,
            mongodb: MongoConfig {
                uri: Secret::new(require_env("MONGODB_URI")?),
                database: require_env("MONGODB_DATABASE")?,
                timeout_secs: parse_timeout_env("MONGODB_TIMEOUT_SECS", 5)?,
            },
            auth: AuthConfig {
                jwt_secret: env::var("AUTH_JWT_SECRET")
                    .ok()
                    .filter(|s| !s.is_empty())
                    .map(Secret::new),
            },
            http: HttpConfig {
                api_prefix: normalize_prefix(&env::var("ITEMS_API_PREFIX").unwrap_or_default()),
                request_timeout_secs: parse_timeout_env("REQUEST_TIMEOUT_SECS", 10)?,
            },
        })
    }
}

fn require_env(key: &str) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) if !val.trim().is_empty() => Ok(val),
        _ => Err(AppError::ConfigError(anyhow::anyhow!(
            "{} is required but not set",
            key
        ))),
    }
}

fn parse_env(key: &str, default: u64) -> Result<u64, AppError> {
    match env::var(key) {
        Ok(val) => val.parse().map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!("{} must be an integer: {}", key, e))
        }),
        Err(_) => Ok(default),
    }
}

/// Timeouts are whole seconds and must be at least one.
fn parse_timeout_env(key: &str, default: u64) -> Result<u64, AppError> {
    match parse_env(key, default)? {
        0 => Err(AppError::ConfigError(anyhow::anyhow!(
            "{} must be at least 1 second",
            key
        ))),
        secs => Ok(secs),
    }
}

/// `""`, `"/"` → no prefix; `"api/"` → `"/api"`.
pub fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_normalization() {
        assert_eq!(normalize_prefix(""), "");
        assert_eq!(normalize_prefix("/"), "");
        assert_eq!(normalize_prefix("api"), "/api");
        assert_eq!(normalize_prefix("/api/v1/"), "/api/v1");
    }

    #[test]
    fn missing_required_variable_is_a_config_error() {
        env::remove_var("ITEMS_TEST_UNSET_MONGODB_URI");
        let err = require_env("ITEMS_TEST_UNSET_MONGODB_URI").unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
        assert!(err.to_string().contains("ITEMS_TEST_UNSET_MONGODB_URI"));
    }

    #[test]
    fn blank_required_variable_is_a_config_error() {
        env::set_var("ITEMS_TEST_BLANK_DATABASE", "   ");
        assert!(matches!(
            require_env("ITEMS_TEST_BLANK_DATABASE"),
            Err(AppError::ConfigError(_))
        ));
    }

    #[test]
    fn timeout_defaults_when_unset() {
        env::remove_var("ITEMS_TEST_UNSET_TIMEOUT");
        assert_eq!(parse_timeout_env("ITEMS_TEST_UNSET_TIMEOUT", 10).unwrap(), 10);
    }

    #[test]
    fn zero_timeout_is_rejected() {
        env::set_var("ITEMS_TEST_ZERO_TIMEOUT", "0");
        assert!(matches!(
            parse_timeout_env("ITEMS_TEST_ZERO_TIMEOUT", 10),
            Err(AppError::ConfigError(_))
        ));
    }

    #[test]
    fn non_numeric_timeout_is_rejected() {
        env::set_var("ITEMS_TEST_BAD_TIMEOUT", "ten");
        assert!(matches!(
            parse_timeout_env("ITEMS_TEST_BAD_TIMEOUT", 10),
            Err(AppError::ConfigError(_))
        ));
    }
}
