use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use crate::error::AppError;

pub const DEFAULT_IMAGE_HOST_URL: &str = "https://api.imgbb.com/1/upload";
pub const DEFAULT_KEEPALIVE_INTERVAL_SECS: u64 = 840;
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub courses_api_url: String,
    pub image_host: ImageHostConfig,
    pub keepalive_url: Option<String>,
    pub keepalive_interval: Duration,
    pub bind_addr: SocketAddr,
}

#[derive(Clone, Debug)]
pub struct ImageHostConfig {
    pub upload_url: String,
    pub api_key: String,
}

impl AppConfig {
    /// Reads the process environment. Call `dotenvy::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| {
            optional(key).ok_or_else(|| AppError::Config(format!("{} is not set", key)))
        };

        let courses_api_url = required("COURSES_API_URL")?;
        let api_key = required("IMAGE_HOST_API_KEY")?;
        let upload_url = optional("IMAGE_HOST_URL")
            .unwrap_or_else(|| DEFAULT_IMAGE_HOST_URL.to_string());

        let keepalive_url = optional("KEEPALIVE_URL");
        let keepalive_interval = match optional("KEEPALIVE_INTERVAL_SECS") {
            Some(raw) => raw.parse::<u64>().map_err(|_| {
                AppError::Config(format!("KEEPALIVE_INTERVAL_SECS is not a number: {}", raw))
            })?,
            None => DEFAULT_KEEPALIVE_INTERVAL_SECS,
        };

        let bind_addr = optional("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr
            .parse::<SocketAddr>()
            .map_err(|e| AppError::Config(format!("BIND_ADDR is invalid ({}): {}", bind_addr, e)))?;

        Ok(Self {
            courses_api_url,
            image_host: ImageHostConfig { upload_url, api_key },
            keepalive_url,
            keepalive_interval: Duration::from_secs(keepalive_interval),
            bind_addr,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_fill_in_optional_values() {
        let config = AppConfig::from_lookup(lookup(&[
            ("COURSES_API_URL", "https://api.example.com"),
            ("IMAGE_HOST_API_KEY", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.image_host.upload_url, DEFAULT_IMAGE_HOST_URL);
        assert_eq!(config.keepalive_url, None);
        assert_eq!(config.keepalive_interval, Duration::from_secs(840));
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
    }

    #[test]
    fn missing_api_key_is_config_error() {
        let result = AppConfig::from_lookup(lookup(&[("COURSES_API_URL", "https://api.example.com")]));
        match result {
            Err(AppError::Config(message)) => assert!(message.contains("IMAGE_HOST_API_KEY")),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn blank_values_count_as_missing() {
        let result = AppConfig::from_lookup(lookup(&[
            ("COURSES_API_URL", "  "),
            ("IMAGE_HOST_API_KEY", "secret"),
        ]));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn bad_interval_is_rejected() {
        let result = AppConfig::from_lookup(lookup(&[
            ("COURSES_API_URL", "https://api.example.com"),
            ("IMAGE_HOST_API_KEY", "secret"),
            ("KEEPALIVE_INTERVAL_SECS", "soon"),
        ]));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn overrides_are_read() {
        let config = AppConfig::from_lookup(lookup(&[
            ("COURSES_API_URL", "https://api.example.com"),
            ("IMAGE_HOST_API_KEY", "secret"),
            ("IMAGE_HOST_URL", "https://images.example.com/upload"),
            ("KEEPALIVE_URL", "https://api.example.com/health"),
            ("KEEPALIVE_INTERVAL_SECS", "60"),
            ("BIND_ADDR", "0.0.0.0:8080"),
        ]))
        .unwrap();

        assert_eq!(config.image_host.upload_url, "https://images.example.com/upload");
        assert_eq!(config.keepalive_url.as_deref(), Some("https://api.example.com/health"));
        assert_eq!(config.keepalive_interval, Duration::from_secs(60));
        assert_eq!(config.bind_addr.port(), 8080);
    }
}
