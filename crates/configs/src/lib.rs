//! Application configuration.
//!
//! Loaded once at startup: TOML file (optional) → environment overrides →
//! normalization and validation. Components receive the resulting
//! [`AppConfig`] by reference and never read the environment themselves.

use std::fmt;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
    /// Directory served at `/` as a fallback for non-API paths.
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8082, worker_threads: None, static_dir: None }
    }
}

/// Hosted identity provider (token issuance, signup, logout, user lookup).
#[derive(Clone, Deserialize, Default)]
pub struct IdentityConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub anon_key: String,
}

impl fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("url", &self.url)
            .field("anon_key", &redact(&self.anon_key))
            .finish()
    }
}

/// REST data store holding `profiles` and `listings`.
#[derive(Clone, Deserialize, Default)]
pub struct StoreConfig {
    #[serde(default)]
    pub url: String,
    /// Privileged key; preferred for reads and writes when present.
    #[serde(default)]
    pub service_key: Option<String>,
    #[serde(default)]
    pub anon_key: Option<String>,
}

impl StoreConfig {
    /// The credential used for store calls: service key, else anon key.
    pub fn write_key(&self) -> Option<&str> {
        self.service_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| self.anon_key.as_deref().filter(|k| !k.trim().is_empty()))
    }
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("url", &self.url)
            .field("service_key", &self.service_key.as_deref().map(redact))
            .field("anon_key", &self.anon_key.as_deref().map(redact))
            .finish()
    }
}

/// Optional cache connection string. Carried so deployments can keep one
/// config file; nothing in the request path connects to it.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CacheConfig {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: default_timeout_secs() }
    }
}

fn default_timeout_secs() -> u64 { 10 }

fn redact(value: &str) -> &'static str {
    if value.is_empty() { "" } else { "[REDACTED]" }
}

/// Read `CONFIG_PATH` (default `config.toml`); a missing file yields defaults.
pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    match std::fs::read_to_string(&path) {
        Ok(content) => parse(&content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(e) => Err(anyhow!("cannot read {path}: {e}")),
    }
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// File, then process environment, then validation.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.apply_env(|k| std::env::var(k).ok());
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Overlay values from an environment lookup. Non-empty variables win
    /// over the file.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |k: &str| lookup(k).filter(|v| !v.trim().is_empty());

        if let Some(host) = get("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = get("SERVER_PORT").and_then(|p| p.parse::<u16>().ok()) {
            self.server.port = port;
        }
        if let Some(w) = get("TOKIO_WORKER_THREADS").and_then(|v| v.parse::<usize>().ok()) {
            self.server.worker_threads = Some(w);
        }
        if let Some(dir) = get("STATIC_DIR") {
            self.server.static_dir = Some(PathBuf::from(dir));
        }
        if let Some(url) = get("SUPABASE_URL") {
            self.identity.url = url;
        }
        if let Some(key) = get("SUPABASE_ANON_KEY") {
            self.identity.anon_key = key;
        }
        if let Some(key) = get("SUPABASE_SERVICE_KEY") {
            self.store.service_key = Some(key);
        }
        if let Some(url) = get("REDIS_URL") {
            self.cache.url = Some(url);
        }
        if let Some(t) = get("HTTP_TIMEOUT_SECS").and_then(|v| v.parse::<u64>().ok()) {
            self.http.timeout_secs = t;
        }
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.identity.normalize();
        self.identity.validate()?;
        self.store.normalize_from(&self.identity);
        if self.http.timeout_secs == 0 {
            return Err(anyhow!("http.timeout_secs must be a positive number of seconds"));
        }
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        if self.worker_threads == Some(0) {
            self.worker_threads = None;
        }
        Ok(())
    }
}

impl IdentityConfig {
    fn normalize(&mut self) {
        self.url = self.url.trim().trim_end_matches('/').to_string();
        self.anon_key = self.anon_key.trim().to_string();
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.is_empty() || self.anon_key.is_empty() {
            return Err(anyhow!("SUPABASE_URL and SUPABASE_ANON_KEY must be set (identity.url / identity.anon_key)"));
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("http://") || lower.starts_with("https://")) {
            return Err(anyhow!("identity.url must start with http:// or https://"));
        }
        Ok(())
    }
}

impl StoreConfig {
    fn normalize_from(&mut self, identity: &IdentityConfig) {
        let url = self.url.trim().trim_end_matches('/');
        self.url = if url.is_empty() { identity.url.clone() } else { url.to_string() };
        if self.anon_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
            self.anon_key = Some(identity.anon_key.clone());
        }
    }
}
