use super::{CredentialValue, CredentialsError, Provider};

pub const STATIC_PROVIDER_NAME: &str = "StaticCredentialsProvider";

/// Credentials fixed in code.
///
/// Only a value with neither token nor account is rejected; an account-only
/// value is returned so it can fill the account in a merging chain.
#[derive(Debug, Clone)]
pub struct StaticProvider {
    value: CredentialValue,
}

impl StaticProvider {
    pub fn new(token: impl Into<String>, account: impl Into<String>) -> Self {
        Self {
            value: CredentialValue::new(token, account).with_provider_name(STATIC_PROVIDER_NAME),
        }
    }
}

impl Provider for StaticProvider {
    fn resolve(&self) -> Result<CredentialValue, CredentialsError> {
        if self.value.is_empty() {
            return Err(CredentialsError::StaticEmpty);
        }
        Ok(self.value.clone())
    }

    fn name(&self) -> &str {
        STATIC_PROVIDER_NAME
    }
}
