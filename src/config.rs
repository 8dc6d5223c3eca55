use crate::infrastructure::ipfs::DEFAULT_GATEWAY;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_SESSION_DB: &str = "certportal-session.db";

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid API URL '{0}': expected an http:// or https:// URL")]
    InvalidApiUrl(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL of the certificate backend.
    pub api_url: String,
    /// HTTP gateway used to resolve `ipfs://` URIs.
    pub ipfs_gateway: String,
    /// SQLite file holding the wallet session.
    pub session_db: String,
}

impl ClientConfig {
    pub fn new(api_url: &str) -> Result<Self, ConfigError> {
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(ConfigError::InvalidApiUrl(api_url.to_string()));
        }
        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            ipfs_gateway: DEFAULT_GATEWAY.to_string(),
            session_db: DEFAULT_SESSION_DB.to_string(),
        })
    }

    /// Reads `CERTIFICATE_API_URL`, `IPFS_GATEWAY_URL` and
    /// `CERTPORTAL_SESSION_DB`, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_url = non_empty("CERTIFICATE_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let mut config = Self::new(api_url.trim())?;
        if let Some(gateway) = non_empty("IPFS_GATEWAY_URL") {
            config.ipfs_gateway = gateway;
        }
        if let Some(path) = non_empty("CERTPORTAL_SESSION_DB") {
            config.session_db = path;
        }
        Ok(config)
    }
}
