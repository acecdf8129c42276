use std::path::PathBuf;

use payloads::APIClient;
use payloads::requests::DEFAULT_PAGE_LIMIT;

use crate::fetcher::FetcherConfig;
use crate::feed::{FEED_DATA_KEY, FEED_ENDPOINT};
use crate::{Backend, Session};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value {value:?} for {name}")]
    Invalid { name: &'static str, value: String },
    #[error("failed to build http client")]
    Http(#[from] reqwest::Error),
}

/// Client settings.
///
/// Environment variables, optionally loaded from a .env file:
/// - BACKEND_URL: base url of the social API (required)
/// - PAGE_LIMIT: items per page for paginated listings (default 20)
/// - IDENTITY_CACHE: file caching the logged in user between runs (optional)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub backend_url: String,
    pub page_limit: u32,
    pub identity_cache: Option<PathBuf>,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is fine
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let backend_url = lookup("BACKEND_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::Missing("BACKEND_URL"))?;

        let page_limit = match lookup("PAGE_LIMIT") {
            None => DEFAULT_PAGE_LIMIT,
            Some(value) => match value.trim().parse::<u32>() {
                Ok(limit) if limit > 0 => limit,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "PAGE_LIMIT",
                        value,
                    });
                }
            },
        };

        Ok(Self {
            backend_url,
            page_limit,
            identity_cache: lookup("IDENTITY_CACHE").map(PathBuf::from),
        })
    }

    /// One credentialed client; share it between all consumers.
    pub fn build_client(&self) -> Result<APIClient, ConfigError> {
        let builder = reqwest::Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.cookie_store(true);
        Ok(APIClient {
            address: self.backend_url.clone(),
            inner_client: builder.build()?,
        })
    }

    pub fn build_backend(&self) -> Result<Backend, ConfigError> {
        let session = match &self.identity_cache {
            Some(path) => Session::with_cache(path),
            None => Session::new(),
        };
        Ok(Backend::new(self.build_client()?, session))
    }

    pub fn feed_config(&self) -> FetcherConfig {
        FetcherConfig::new(FEED_ENDPOINT, FEED_DATA_KEY).limit(self.page_limit)
    }
}
