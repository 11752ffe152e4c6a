use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use quill_client::HttpConfig;

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_SESSION_FILE: &str = ".quill_session.json";

#[derive(Debug, Clone)]
pub struct Settings {
    pub api_url: String,
    pub session_file: PathBuf,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub log_level: String,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_url = lookup("QUILL_API_URL")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let session_file = lookup("QUILL_SESSION_FILE")
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_FILE));
        let connect_timeout_secs = parse_u64(&lookup, "QUILL_CONNECT_TIMEOUT_SECS", 5)?;
        let request_timeout_secs = parse_u64(&lookup, "QUILL_REQUEST_TIMEOUT_SECS", 15)?;
        let log_level = lookup("LOG_LEVEL")
            .or_else(|| lookup("RUST_LOG"))
            .unwrap_or_else(|| "warn".to_string());

        Ok(Self {
            api_url: normalize_server(api_url),
            session_file,
            connect_timeout_secs,
            request_timeout_secs,
            log_level,
        })
    }

    /// `--server` из командной строки важнее переменной окружения.
    pub fn with_server(mut self, server: Option<String>) -> Self {
        if let Some(server) = server {
            self.api_url = normalize_server(server);
        }
        self
    }

    pub fn http_config(&self) -> HttpConfig {
        HttpConfig {
            base_url: self.api_url.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }
}

pub fn normalize_server(server: String) -> String {
    if server.starts_with("http://") || server.starts_with("https://") {
        return server;
    }

    format!("http://{server}")
}

fn parse_u64(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: u64) -> Result<u64> {
    let value = lookup(key)
        .unwrap_or_else(|| default.to_string())
        .trim()
        .parse::<u64>()
        .with_context(|| format!("Failed to parse {key}, expecting positive integer"))?;

    if value == 0 {
        return Err(anyhow!("{key} must be > 0"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn settings(pairs: &[(&str, &str)]) -> Result<Settings> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Settings::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_env_is_empty() {
        let settings = settings(&[]).expect("defaults must be valid");
        assert_eq!(settings.api_url, DEFAULT_API_URL);
        assert_eq!(settings.session_file, PathBuf::from(DEFAULT_SESSION_FILE));
        assert_eq!(settings.connect_timeout_secs, 5);
        assert_eq!(settings.request_timeout_secs, 15);
        assert_eq!(settings.log_level, "warn");
    }

    #[test]
    fn env_values_override_defaults() {
        let settings = settings(&[
            ("QUILL_API_URL", "blog.example.com/api"),
            ("QUILL_SESSION_FILE", "/tmp/quill.json"),
            ("QUILL_REQUEST_TIMEOUT_SECS", "30"),
            ("RUST_LOG", "debug"),
        ])
        .expect("settings must be valid");
        assert_eq!(settings.api_url, "http://blog.example.com/api");
        assert_eq!(settings.session_file, PathBuf::from("/tmp/quill.json"));
        assert_eq!(settings.request_timeout_secs, 30);
        assert_eq!(settings.log_level, "debug");
    }

    #[test]
    fn log_level_prefers_log_level_over_rust_log() {
        let settings =
            settings(&[("LOG_LEVEL", "info"), ("RUST_LOG", "trace")]).expect("must be valid");
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn zero_or_garbage_timeouts_are_rejected() {
        assert!(settings(&[("QUILL_CONNECT_TIMEOUT_SECS", "0")]).is_err());
        assert!(settings(&[("QUILL_REQUEST_TIMEOUT_SECS", "soon")]).is_err());
    }

    #[test]
    fn server_flag_wins() {
        let settings = settings(&[("QUILL_API_URL", "https://env.example.com/api")])
            .expect("must be valid")
            .with_server(Some("127.0.0.1:5000/api".to_string()));
        assert_eq!(settings.api_url, "http://127.0.0.1:5000/api");
    }

    #[test]
    fn normalize_server_keeps_scheme() {
        let s = normalize_server("https://example.com:8080".to_string());
        assert_eq!(s, "https://example.com:8080");
    }

    #[test]
    fn normalize_server_adds_http_scheme() {
        let s = normalize_server("127.0.0.1:5000".to_string());
        assert_eq!(s, "http://127.0.0.1:5000");
    }
}
