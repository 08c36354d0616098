use std::fmt;

/// A bearer token and account id, tagged with the provider that produced them.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CredentialValue {
    pub token: String,
    pub account: String,
    pub provider_name: String,
}

impl CredentialValue {
    pub fn new(token: impl Into<String>, account: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            account: account.into(),
            provider_name: String::new(),
        }
    }

    pub fn with_provider_name(mut self, provider_name: impl Into<String>) -> Self {
        self.provider_name = provider_name.into();
        self
    }

    /// Neither a token nor an account.
    pub fn is_empty(&self) -> bool {
        self.token.is_empty() && self.account.is_empty()
    }

    /// Both a token and an account.
    pub fn is_complete(&self) -> bool {
        !self.token.is_empty() && !self.account.is_empty()
    }

    /// Fill empty fields from `other`. Fields that already hold a value are
    /// never overwritten.
    pub fn merge(&mut self, other: &CredentialValue) {
        fill_gap(&mut self.token, &other.token);
        fill_gap(&mut self.account, &other.account);
        fill_gap(&mut self.provider_name, &other.provider_name);
    }
}

fn fill_gap(slot: &mut String, candidate: &str) {
    if slot.is_empty() && !candidate.is_empty() {
        *slot = candidate.to_string();
    }
}

impl fmt::Debug for CredentialValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = if self.token.is_empty() { "" } else { "<redacted>" };
        f.debug_struct("CredentialValue")
            .field("token", &token)
            .field("account", &self.account)
            .field("provider_name", &self.provider_name)
            .finish()
    }
}
