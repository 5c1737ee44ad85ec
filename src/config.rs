//! Server configuration: built-in defaults, then an optional JSON file, then
//! `FINTRACK_*` environment overrides. Later layers win.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub bind: String,
    pub port: u16,
    /// HS256 secret for bearer tokens. Generated (and logged as a warning)
    /// when absent, which makes tokens worthless across restarts.
    pub token_secret: Option<String>,
    pub token_ttl_secs: i64,
    /// Include developer detail in error responses.
    pub debug_errors: bool,
    /// Seeded at startup with the admin role when both are set.
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8080,
            token_secret: None,
            token_ttl_secs: 3600,
            debug_errors: false,
            admin_email: None,
            admin_password: None,
        }
    }
}

pub fn load_configuration(path: Option<&Path>) -> Result<AppConfig> {
    let mut config = match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading config file {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("parsing config file {}", path.display()))?
        }
        None => AppConfig::default(),
    };
    apply_env_overrides(&mut config)?;
    Ok(config)
}

fn apply_env_overrides(config: &mut AppConfig) -> Result<()> {
    if let Ok(bind) = std::env::var("FINTRACK_BIND") {
        config.bind = bind;
    }
    if let Ok(port) = std::env::var("FINTRACK_PORT") {
        config.port = port.parse().context("FINTRACK_PORT must be a port number")?;
    }
    if let Ok(secret) = std::env::var("FINTRACK_TOKEN_SECRET") {
        config.token_secret = Some(secret);
    }
    if let Ok(ttl) = std::env::var("FINTRACK_TOKEN_TTL_SECS") {
        config.token_ttl_secs = ttl
            .parse()
            .context("FINTRACK_TOKEN_TTL_SECS must be seconds")?;
    }
    if let Ok(debug) = std::env::var("FINTRACK_DEBUG_ERRORS") {
        config.debug_errors = debug == "1" || debug.eq_ignore_ascii_case("true");
    }
    if let Ok(email) = std::env::var("FINTRACK_ADMIN_EMAIL") {
        config.admin_email = Some(email);
    }
    if let Ok(password) = std::env::var("FINTRACK_ADMIN_PASSWORD") {
        config.admin_password = Some(password);
    }
    Ok(())
}

impl AppConfig {
    pub fn token_secret_or_ephemeral(&self) -> Vec<u8> {
        match &self.token_secret {
            Some(secret) => secret.as_bytes().to_vec(),
            None => {
                tracing::warn!("no token secret configured; using an ephemeral one");
                uuid::Uuid::new_v4().to_string().into_bytes()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = AppConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.token_ttl_secs, 3600);
        assert!(!config.debug_errors);
    }

    #[test]
    fn json_file_fields_are_optional() {
        let config: AppConfig = serde_json::from_str(r#"{"port": 9000}"#).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.bind, "127.0.0.1");
    }
}
