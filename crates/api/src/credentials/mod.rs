//! Credential resolution.
//!
//! A [`Provider`] produces a [`CredentialValue`] (bearer token plus account
//! id) from one source:
//!
//! - [`StaticProvider`] - values supplied in code
//! - [`EnvProvider`] - `SPOTINST_TOKEN` / `SPOTINST_ACCOUNT`
//! - [`FileProvider`] - a profile from the shared credentials file
//! - [`ChainProvider`] - an ordered composite of the above, optionally merging
//!   partial values
//!
//! Providers are stateless: every `resolve` call reads its source again.
//! [`Credentials`] wraps a provider with a cache so an executor resolves once
//! and reuses the value until it is expired.

mod cache;
mod chain;
mod env;
mod error;
mod file;
mod static_provider;
mod value;

pub use cache::Credentials;
pub use chain::{CHAIN_PROVIDER_NAME, ChainProvider};
pub use env::{ENV_ACCOUNT_VAR, ENV_PROVIDER_NAME, ENV_TOKEN_VAR, EnvProvider};
pub use error::{CredentialsError, CredentialsFileError};
pub use file::{
    DEFAULT_PROFILE, FILE_PROVIDER_NAME, FileProvider, PROFILE_ENV_VAR, SHARED_CREDENTIALS_FILE_ENV_VAR,
    default_credentials_path,
};
pub use static_provider::{STATIC_PROVIDER_NAME, StaticProvider};
pub use value::CredentialValue;

use std::fmt;

/// One source of credentials.
pub trait Provider: Send + Sync + fmt::Debug {
    /// Read the source. Implementations return whatever partial value they
    /// find as long as it is usable; see each provider for its failure rules.
    fn resolve(&self) -> Result<CredentialValue, CredentialsError>;

    /// Name recorded in [`CredentialValue::provider_name`] and error messages.
    fn name(&self) -> &str;
}

impl<P: Provider + ?Sized> Provider for Box<P> {
    fn resolve(&self) -> Result<CredentialValue, CredentialsError> {
        (**self).resolve()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
