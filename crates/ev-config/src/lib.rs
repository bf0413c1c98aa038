//! # ev-config
//!
//! Layered runtime settings: built-in defaults, then an optional
//! `eventra.toml` (or the file named by `EVENTRA_CONFIG`), then
//! `EVENTRA__SECTION__KEY` environment variables. A `.env` file is loaded
//! first when present.

use config::{Config, Environment, File};
use secrecy::SecretString;
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Load(#[from] config::ConfigError),
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub backend: BackendSettings,
    pub github: GithubSettings,
    pub storage: StorageSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Directory holding the `events.json` / `hackathons.json` seed data
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendSettings {
    /// Base URL of the Eventra REST backend, without a trailing slash
    pub base_url: String,
}

impl BackendSettings {
    pub fn login_url(&self) -> String {
        format!("{}/api/auth/login", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
pub struct GithubSettings {
    pub api_url: String,
    /// `owner/name`
    pub repo: String,
    /// Login shown as "Project Lead" in the contributors list
    pub lead: String,
    pub token: Option<SecretString>,
    pub cache_ttl_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Root of the on-disk key-value store
    pub root: PathBuf,
}

impl Settings {
    /// Loads `.env`, then settings from every layer.
    pub fn load() -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            log::debug!("no .env loaded: {e}");
        }
        let file = std::env::var("EVENTRA_CONFIG").unwrap_or_else(|_| "eventra".to_string());
        Self::from_sources(Some(&file), true)
    }

    /// Builds settings from defaults plus the optional file and, if asked,
    /// the environment.
    pub fn from_sources(file: Option<&str>, with_env: bool) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.data_dir", "./data")?
            .set_default(
                "backend.base_url",
                "https://eventra-backend-dgcae3etebbag8ft.centralindia-01.azurewebsites.net",
            )?
            .set_default("github.api_url", "https://api.github.com")?
            .set_default("github.repo", "sandeepvashishtha/Eventra")?
            .set_default("github.lead", "sandeepvashishtha")?
            .set_default("github.cache_ttl_secs", 3600)?
            .set_default("storage.root", "./data/store")?;

        if let Some(file) = file {
            builder = builder.add_source(File::with_name(file).required(false));
        }
        if with_env {
            builder = builder.add_source(Environment::with_prefix("EVENTRA").separator("__"));
        }

        Ok(builder.build()?.try_deserialize()?)
    }
}
