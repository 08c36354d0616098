use std::sync::Arc;

use spotinst_util::FeatureFlags;
use tracing::debug;
use url::Url;

use crate::client::Client;
use crate::config::Config;
use crate::credentials::Credentials;
use crate::{Error, Result};

/// Fully resolved configuration, frozen once a [`Session`] is built.
#[derive(Debug)]
pub struct SessionConfig {
    pub base_url: Url,
    pub http_client: reqwest::Client,
    pub credentials: Arc<Credentials>,
    pub user_agent: String,
    pub content_type: String,
    pub feature_flags: FeatureFlags,
}

/// Shared, read-only configuration for any number of clients.
///
/// Cloning a session is cheap; every clone points at the same transport and
/// credentials cache.
#[derive(Debug, Clone)]
pub struct Session {
    inner: Arc<SessionConfig>,
}

impl Session {
    /// Merge the production defaults under `overrides` and freeze the result.
    ///
    /// Credentials are resolved once here, which may block on reading the
    /// shared credentials file.
    ///
    /// The default credential chain follows the overrides' feature flags when
    /// they are set, otherwise `SPOTINST_FEATURE_FLAGS`.
    pub fn new(overrides: Config) -> Result<Self> {
        let flags = overrides.feature_flags.clone().unwrap_or_else(FeatureFlags::from_env);
        let defaults = Config::defaults_with_flags(flags)?;
        let merged = overrides.merged(&defaults);
        Self::from_config(merged)
    }

    /// Session built only from defaults and the environment.
    pub fn from_env() -> Result<Self> {
        Self::new(Config::new())
    }

    fn from_config(config: Config) -> Result<Self> {
        let base_url = config.base_url.ok_or_else(|| missing("base_url"))?;
        let base_url = parse_base_url(&base_url)?;
        let session = SessionConfig {
            base_url,
            http_client: config.http_client.ok_or_else(|| missing("http_client"))?,
            credentials: config.credentials.ok_or_else(|| missing("credentials"))?,
            user_agent: config.user_agent.ok_or_else(|| missing("user_agent"))?,
            content_type: config.content_type.ok_or_else(|| missing("content_type"))?,
            feature_flags: config.feature_flags.unwrap_or_default(),
        };
        debug!(base_url = %session.base_url, provider = session.credentials.provider().name(), "session created");
        // Warm the cache here so file reads happen outside the async request
        // path. A failure is reported again by the first request.
        if let Err(error) = session.credentials.get() {
            debug!(error = %error, "credentials not resolved at session start");
        }
        Ok(Self {
            inner: Arc::new(session),
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner
    }

    /// New executor bound to this session.
    pub fn client(&self) -> Client {
        Client::new(self)
    }
}

fn missing(field: &str) -> Error {
    Error::Config(format!("{field} is not configured"))
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).map_err(|error| Error::Config(format!("invalid base URL '{raw}': {error}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::Config(format!(
            "base URL must use http or https; got '{}://'",
            url.scheme()
        )));
    }
    if url.host_str().is_none() {
        return Err(Error::Config(format!("base URL '{raw}' must include a host")));
    }
    Ok(url)
}
