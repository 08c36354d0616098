//! Client configuration.
//!
//! A [`Config`] is a bag of optional settings. Callers fill in only what they
//! want to override and [`Session::new`](crate::Session::new) merges the
//! production defaults underneath.

use std::sync::Arc;
use std::time::Duration;

use spotinst_util::FeatureFlags;

use crate::Result;
use crate::credentials::Credentials;

/// Production API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.spotinst.io";
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";
pub const SDK_NAME: &str = "spotinst-sdk-rust";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// `spotinst-sdk-rust/<crate version>`.
pub fn default_user_agent() -> String {
    format!("{SDK_NAME}/{}", env!("CARGO_PKG_VERSION"))
}

/// Pooled transport shared by every client built from one session.
pub fn default_http_client() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder().connect_timeout(CONNECT_TIMEOUT).build()?)
}

/// Transport that keeps no idle connections, for short-lived programs that
/// would otherwise accumulate them.
pub fn non_pooled_http_client() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .pool_max_idle_per_host(0)
        .build()?)
}

/// Optional settings; `None` means "use the default".
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub base_url: Option<String>,
    pub http_client: Option<reqwest::Client>,
    pub credentials: Option<Arc<Credentials>>,
    pub user_agent: Option<String>,
    pub content_type: Option<String>,
    pub feature_flags: Option<FeatureFlags>,
}

impl Config {
    /// Empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every field set to its production default, with feature flags read
    /// from `SPOTINST_FEATURE_FLAGS`.
    pub fn default_config() -> Result<Self> {
        Self::defaults_with_flags(FeatureFlags::from_env())
    }

    /// Production defaults whose credential chain honors `flags`.
    pub fn defaults_with_flags(flags: FeatureFlags) -> Result<Self> {
        Ok(Self {
            base_url: Some(DEFAULT_BASE_URL.to_string()),
            http_client: Some(default_http_client()?),
            credentials: Some(Arc::new(Credentials::default_chain(&flags))),
            user_agent: Some(default_user_agent()),
            content_type: Some(DEFAULT_CONTENT_TYPE.to_string()),
            feature_flags: Some(flags),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_http_client(mut self, http_client: reqwest::Client) -> Self {
        self.http_client = Some(http_client);
        self
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(Arc::new(credentials));
        self
    }

    /// Share one credentials cache between several configurations.
    pub fn with_shared_credentials(mut self, credentials: Arc<Credentials>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_feature_flags(mut self, flags: FeatureFlags) -> Self {
        self.feature_flags = Some(flags);
        self
    }

    /// Copy the fields set in `other` into the fields still unset here.
    /// Fields already set are never replaced.
    pub fn merge(&mut self, other: &Config) {
        fill_gap(&mut self.base_url, &other.base_url);
        fill_gap(&mut self.http_client, &other.http_client);
        fill_gap(&mut self.credentials, &other.credentials);
        fill_gap(&mut self.user_agent, &other.user_agent);
        fill_gap(&mut self.content_type, &other.content_type);
        fill_gap(&mut self.feature_flags, &other.feature_flags);
    }

    /// Builder form of [`Config::merge`].
    pub fn merged(mut self, other: &Config) -> Self {
        self.merge(other);
        self
    }
}

fn fill_gap<T: Clone>(slot: &mut Option<T>, candidate: &Option<T>) {
    if slot.is_none() {
        slot.clone_from(candidate);
    }
}
