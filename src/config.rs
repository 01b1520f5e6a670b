// src/config.rs

//! Configuration loading utilities.
//!
//! Structured settings live in `config.toml` (see [`crate::models::Config`]).
//! Credentials never do: they are read from the environment, which the CLI
//! may pre-populate from a `.env` file.

use std::env;
use std::path::Path;

use crate::error::{AppError, Result};
use crate::models::Config;

pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const EMAIL_USER: &str = "EMAIL_USER";
pub const EMAIL_PASSWORD: &str = "EMAIL_PASSWORD";
pub const EMAIL_HOST: &str = "EMAIL_HOST";
pub const EMAIL_PORT: &str = "EMAIL_PORT";
pub const DISCORD_BOT_TOKEN: &str = "DISCORD_BOT_TOKEN";
pub const TELEGRAM_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
pub const TELEGRAM_CHAT_ID: &str = "TELEGRAM_CHAT_ID";

/// SMTP login.
#[derive(Clone)]
pub struct EmailCredentials {
    pub user: String,
    pub password: String,
}

impl std::fmt::Debug for EmailCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailCredentials")
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

/// Credentials and deployment overrides taken from the environment.
#[derive(Debug, Clone, Default)]
pub struct Secrets {
    pub openai_api_key: Option<String>,
    pub email: Option<EmailCredentials>,
    pub email_host: Option<String>,
    pub email_port: Option<String>,
    pub discord_token: Option<String>,
    pub telegram_token: Option<String>,
    pub telegram_chat_id: Option<String>,
}

impl Secrets {
    /// Read secrets from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read secrets through `lookup`. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let email = match (get(EMAIL_USER), get(EMAIL_PASSWORD)) {
            (Some(user), Some(password)) => Some(EmailCredentials { user, password }),
            _ => None,
        };

        Self {
            openai_api_key: get(OPENAI_API_KEY),
            email,
            email_host: get(EMAIL_HOST),
            email_port: get(EMAIL_PORT),
            discord_token: get(DISCORD_BOT_TOKEN),
            telegram_token: get(TELEGRAM_BOT_TOKEN),
            telegram_chat_id: get(TELEGRAM_CHAT_ID),
        }
    }

    /// Apply environment overrides on top of file configuration.
    pub fn apply(&self, config: &mut Config) -> Result<()> {
        if let Some(host) = &self.email_host {
            config.email.host = host.clone();
        }
        if let Some(port) = &self.email_port {
            config.email.port = port
                .parse()
                .map_err(|e| AppError::config(format!("{EMAIL_PORT}={port:?}: {e}")))?;
        }
        if let Some(chat_id) = &self.telegram_chat_id {
            config.telegram.chat_id = Some(chat_id.clone());
        }
        Ok(())
    }
}

/// Load `config.toml` from the storage directory and apply `secrets`.
///
/// A missing or malformed file falls back to defaults.
pub fn load_config(storage_dir: &Path, secrets: &Secrets) -> Result<Config> {
    let mut config = Config::load_or_default(storage_dir.join("config.toml"));
    secrets.apply(&mut config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn secrets(pairs: &[(&str, &str)]) -> Secrets {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Secrets::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_email_needs_both_halves() {
        assert!(secrets(&[(EMAIL_USER, "a@b.c")]).email.is_none());

        let s = secrets(&[(EMAIL_USER, "a@b.c"), (EMAIL_PASSWORD, "pw")]);
        let email = s.email.unwrap();
        assert_eq!(email.user, "a@b.c");
        assert!(!format!("{email:?}").contains("pw"));
    }

    #[test]
    fn test_blank_values_are_unset() {
        let s = secrets(&[(OPENAI_API_KEY, "  ")]);
        assert!(s.openai_api_key.is_none());
    }

    #[test]
    fn test_apply_overrides() {
        let s = secrets(&[
            (EMAIL_HOST, "mail.example.com"),
            (EMAIL_PORT, "2525"),
            (TELEGRAM_CHAT_ID, "-100"),
        ]);
        let mut config = Config::default();
        s.apply(&mut config).unwrap();

        assert_eq!(config.email.host, "mail.example.com");
        assert_eq!(config.email.port, 2525);
        assert_eq!(config.telegram.chat_id.as_deref(), Some("-100"));
    }

    #[test]
    fn test_bad_port_is_config_error() {
        let s = secrets(&[(EMAIL_PORT, "smtp")]);
        let mut config = Config::default();
        assert!(matches!(s.apply(&mut config), Err(AppError::Config(_))));
    }

    #[test]
    fn test_load_config_without_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(dir.path(), &Secrets::default()).unwrap();
        assert_eq!(config.history.max_entries, 50);
    }
}
