use std::sync::{PoisonError, RwLock};

use spotinst_util::FeatureFlags;

use super::{ChainProvider, CredentialValue, CredentialsError, EnvProvider, FileProvider, Provider, StaticProvider};

/// A provider plus the last value it resolved.
///
/// `get` resolves once and serves the cached value until [`Credentials::expire`]
/// is called. Safe to share between tasks.
#[derive(Debug)]
pub struct Credentials {
    provider: Box<dyn Provider>,
    cached: RwLock<Option<CredentialValue>>,
}

impl Credentials {
    pub fn new(provider: impl Provider + 'static) -> Self {
        Self {
            provider: Box::new(provider),
            cached: RwLock::new(None),
        }
    }

    pub fn from_static(token: impl Into<String>, account: impl Into<String>) -> Self {
        Self::new(StaticProvider::new(token, account))
    }

    pub fn from_env() -> Self {
        Self::new(EnvProvider)
    }

    /// Environment first, then the shared credentials file.
    pub fn default_chain(flags: &FeatureFlags) -> Self {
        Self::new(ChainProvider::new(
            vec![Box::new(EnvProvider), Box::new(FileProvider::new())],
            flags,
        ))
    }

    pub fn provider(&self) -> &dyn Provider {
        self.provider.as_ref()
    }

    /// Cached value, resolving through the provider when nothing is cached.
    /// Failures are not cached.
    pub fn get(&self) -> Result<CredentialValue, CredentialsError> {
        if let Some(value) = self.cached.read().unwrap_or_else(PoisonError::into_inner).as_ref() {
            return Ok(value.clone());
        }

        let mut cached = self.cached.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(value) = cached.as_ref() {
            return Ok(value.clone());
        }
        let value = self.provider.resolve()?;
        tracing::debug!(provider = %value.provider_name, "cached credentials");
        *cached = Some(value.clone());
        Ok(value)
    }

    /// Drop the cached value so the next `get` resolves again.
    pub fn expire(&self) {
        *self.cached.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn is_expired(&self) -> bool {
        self.cached.read().unwrap_or_else(PoisonError::into_inner).is_none()
    }
}
