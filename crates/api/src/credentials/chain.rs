use spotinst_util::FeatureFlags;
use tracing::debug;

use super::{CredentialValue, CredentialsError, Provider};

pub const CHAIN_PROVIDER_NAME: &str = "ChainProvider";

/// Ordered composite of providers.
///
/// Without merging, the first provider that resolves wins and its value is
/// returned untouched, even when one field is empty. With merging, every
/// provider is tried in order and partial values are combined with
/// [`CredentialValue::merge`]; an earlier provider keeps any field it
/// supplied. The walk stops as soon as the combined value is complete.
#[derive(Debug)]
pub struct ChainProvider {
    providers: Vec<Box<dyn Provider>>,
    merge: bool,
    verbose_errors: bool,
}

impl ChainProvider {
    /// Build a chain whose merge mode follows
    /// [`FeatureFlags::merge_credentials_chain`].
    pub fn new(providers: Vec<Box<dyn Provider>>, flags: &FeatureFlags) -> Self {
        Self {
            providers,
            merge: flags.merge_credentials_chain(),
            verbose_errors: false,
        }
    }

    pub fn with_merge(mut self, merge: bool) -> Self {
        self.merge = merge;
        self
    }

    /// Report every provider error instead of the bare "no valid providers"
    /// failure.
    pub fn with_verbose_errors(mut self, verbose_errors: bool) -> Self {
        self.verbose_errors = verbose_errors;
        self
    }

    pub fn providers(&self) -> &[Box<dyn Provider>] {
        &self.providers
    }

    pub fn is_merging(&self) -> bool {
        self.merge
    }

    fn resolve_first(&self, errors: &mut Vec<CredentialsError>) -> Option<CredentialValue> {
        for provider in &self.providers {
            match provider.resolve() {
                Ok(value) => {
                    debug!(provider = provider.name(), "credentials resolved");
                    return Some(value);
                }
                Err(error) => {
                    debug!(provider = provider.name(), error = %error, "credentials provider failed");
                    errors.push(error);
                }
            }
        }
        None
    }

    fn resolve_merged(&self, errors: &mut Vec<CredentialsError>) -> Option<CredentialValue> {
        let mut merged = CredentialValue::default();
        for provider in &self.providers {
            match provider.resolve() {
                Ok(value) => {
                    debug!(
                        provider = provider.name(),
                        has_token = !value.token.is_empty(),
                        has_account = !value.account.is_empty(),
                        "merging credentials"
                    );
                    merged.merge(&value);
                    if merged.is_complete() {
                        break;
                    }
                }
                Err(error) => {
                    debug!(provider = provider.name(), error = %error, "credentials provider failed");
                    errors.push(error);
                }
            }
        }
        (!merged.is_empty()).then_some(merged)
    }

    fn failure(&self, errors: Vec<CredentialsError>) -> CredentialsError {
        if self.verbose_errors && !errors.is_empty() {
            CredentialsError::ChainFailed { errors }
        } else {
            CredentialsError::NoValidProviders
        }
    }
}

impl Provider for ChainProvider {
    fn resolve(&self) -> Result<CredentialValue, CredentialsError> {
        let mut errors = Vec::new();
        let resolved = if self.merge {
            self.resolve_merged(&mut errors)
        } else {
            self.resolve_first(&mut errors)
        };
        resolved.ok_or_else(|| self.failure(errors))
    }

    fn name(&self) -> &str {
        CHAIN_PROVIDER_NAME
    }
}
