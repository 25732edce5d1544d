use anyhow::{bail, Context};

use crate::auth::Provider;

/// Where posts and profiles live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendConfig {
    /// Hosted data + auth service.
    Remote { url: String, anon_key: String },
    /// SQLite file, with local sign-in instead of the hosted auth service.
    Local { database_url: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub site_url: String,
    pub backend: BackendConfig,
    pub auth_providers: Vec<Provider>,
    pub session_secure: bool,
    pub session_inactivity_minutes: i64,
}

impl Config {
    /// Reads the process environment, after loading `.env` if there is one.
    pub fn from_env() -> anyhow::Result<Config> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| dotenv::var(key).ok())
    }

    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Config> {
        let backend = match (var("BACKEND_URL"), var("BACKEND_ANON_KEY")) {
            (Some(url), Some(anon_key)) => BackendConfig::Remote { url, anon_key },
            (Some(_), None) => bail!("BACKEND_URL is set but BACKEND_ANON_KEY is not"),
            (None, _) => BackendConfig::Local {
                database_url: var("DATABASE_URL").unwrap_or_else(|| "sqlite://pawconnect.db?mode=rwc".to_owned()),
            },
        };

        let auth_providers = var("AUTH_PROVIDERS")
            .unwrap_or_else(|| "github,google".to_owned())
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| name.parse::<Provider>())
            .collect::<anyhow::Result<Vec<_>>>()?;

        let session_secure = match var("SESSION_SECURE") {
            Some(value) => value.parse().with_context(|| format!("SESSION_SECURE={value}"))?,
            None => false,
        };
        let session_inactivity_minutes = match var("SESSION_INACTIVITY_MINUTES") {
            Some(value) => value.parse().with_context(|| format!("SESSION_INACTIVITY_MINUTES={value}"))?,
            None => 60,
        };

        Ok(Config {
            bind_addr: var("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_owned()),
            site_url: var("SITE_URL")
                .unwrap_or_else(|| "http://localhost:8080".to_owned())
                .trim_end_matches('/')
                .to_owned(),
            backend,
            auth_providers,
            session_secure,
            session_inactivity_minutes,
        })
    }
}
