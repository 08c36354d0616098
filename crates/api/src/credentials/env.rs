use std::env;

use super::{CredentialValue, CredentialsError, Provider};

pub const ENV_TOKEN_VAR: &str = "SPOTINST_TOKEN";
pub const ENV_ACCOUNT_VAR: &str = "SPOTINST_ACCOUNT";
pub const ENV_PROVIDER_NAME: &str = "EnvCredentialsProvider";

/// Reads [`ENV_TOKEN_VAR`] and [`ENV_ACCOUNT_VAR`] on every resolve.
///
/// A token without an account resolves; an account without a token does not.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvProvider;

impl EnvProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Provider for EnvProvider {
    fn resolve(&self) -> Result<CredentialValue, CredentialsError> {
        let value = CredentialValue::new(read_var(ENV_TOKEN_VAR), read_var(ENV_ACCOUNT_VAR))
            .with_provider_name(ENV_PROVIDER_NAME);

        if value.is_empty() {
            return Err(CredentialsError::EnvNotFound);
        }
        if value.token.is_empty() {
            return Err(CredentialsError::TokenNotFound {
                provider: ENV_PROVIDER_NAME.to_string(),
            });
        }
        Ok(value)
    }

    fn name(&self) -> &str {
        ENV_PROVIDER_NAME
    }
}

fn read_var(name: &str) -> String {
    env::var(name).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_token_and_account_from_environment() {
        temp_env::with_vars(
            [(ENV_TOKEN_VAR, Some("secret")), (ENV_ACCOUNT_VAR, Some("acc-12345"))],
            || {
                let value = EnvProvider.resolve().expect("credentials resolve from environment");
                assert_eq!(value.token, "secret");
                assert_eq!(value.account, "acc-12345");
                assert_eq!(value.provider_name, ENV_PROVIDER_NAME);
            },
        );
    }

    #[test]
    fn token_only_resolves_with_empty_account() {
        temp_env::with_vars([(ENV_TOKEN_VAR, Some("secret")), (ENV_ACCOUNT_VAR, None)], || {
            let value = EnvProvider.resolve().unwrap();
            assert_eq!(value.token, "secret");
            assert_eq!(value.account, "");
        });
    }

    #[test]
    fn missing_both_fails_with_not_found() {
        temp_env::with_vars([(ENV_TOKEN_VAR, None::<&str>), (ENV_ACCOUNT_VAR, None)], || {
            let error = EnvProvider.resolve().unwrap_err();
            assert_eq!(error.to_string(), "token and account not found in environment");
        });
    }

    #[test]
    fn account_without_token_fails() {
        temp_env::with_vars([(ENV_TOKEN_VAR, None), (ENV_ACCOUNT_VAR, Some("acc-12345"))], || {
            let error = EnvProvider.resolve().unwrap_err();
            assert_eq!(error.to_string(), "token not found in EnvCredentialsProvider");
        });
    }
}
