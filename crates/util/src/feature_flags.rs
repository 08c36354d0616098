//! Opt-in behavior toggles.
//!
//! Flags are parsed from `SPOTINST_FEATURE_FLAGS` (comma separated, each entry
//! either `Name=bool` or a bare `Name` meaning `true`) into an explicit
//! [`FeatureFlags`] value that callers thread into the components that read
//! it. Nothing here is process-global.

use indexmap::IndexMap;
use tracing::warn;

/// Environment variable holding the comma-separated flag list.
pub const FEATURE_FLAGS_ENV_VAR: &str = "SPOTINST_FEATURE_FLAGS";

/// Flags the SDK itself understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureFlag {
    /// Merge partial values from every credential provider in a chain instead
    /// of returning the first one that resolves.
    MergeCredentialsChain,
}

impl FeatureFlag {
    pub const ALL: &'static [FeatureFlag] = &[FeatureFlag::MergeCredentialsChain];

    pub fn name(self) -> &'static str {
        match self {
            FeatureFlag::MergeCredentialsChain => "MergeCredentialsChain",
        }
    }
}

/// A parsed set of flag values. Unknown names are kept so callers can inspect
/// flags this crate does not define.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureFlags {
    values: IndexMap<String, bool>,
}

impl FeatureFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `Name=bool,Other` list. Malformed entries are skipped with a
    /// warning.
    pub fn parse(raw: &str) -> Self {
        let mut flags = Self::new();
        for entry in raw.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
            let (name, value) = match entry.split_once('=') {
                Some((name, value)) => (name.trim(), parse_bool(value.trim())),
                None => (entry, Some(true)),
            };
            match value {
                Some(enabled) if !name.is_empty() => {
                    flags.values.insert(name.to_ascii_lowercase(), enabled);
                }
                _ => warn!(entry, "ignoring malformed feature flag entry"),
            }
        }
        flags
    }

    /// Read flags from [`FEATURE_FLAGS_ENV_VAR`]; unset means no flags.
    pub fn from_env() -> Self {
        std::env::var(FEATURE_FLAGS_ENV_VAR)
            .map(|raw| Self::parse(&raw))
            .unwrap_or_default()
    }

    pub fn with(mut self, flag: FeatureFlag, enabled: bool) -> Self {
        self.set(flag.name(), enabled);
        self
    }

    pub fn set(&mut self, name: &str, enabled: bool) {
        self.values.insert(name.to_ascii_lowercase(), enabled);
    }

    /// Flag names match case-insensitively; absent flags are disabled.
    pub fn is_enabled(&self, name: &str) -> bool {
        self.values.get(&name.to_ascii_lowercase()).copied().unwrap_or(false)
    }

    pub fn enabled(&self, flag: FeatureFlag) -> bool {
        self.is_enabled(flag.name())
    }

    pub fn merge_credentials_chain(&self) -> bool {
        self.enabled(FeatureFlag::MergeCredentialsChain)
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "t" | "true" => Some(true),
        "0" | "f" | "false" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_names_are_enabled_and_explicit_values_respected() {
        let flags = FeatureFlags::parse("MergeCredentialsChain, Other=false ,Third=TRUE");
        assert!(flags.merge_credentials_chain());
        assert!(!flags.is_enabled("Other"));
        assert!(flags.is_enabled("third"));
        assert!(!flags.is_enabled("Missing"));
    }

    #[test]
    fn malformed_entries_are_skipped() {
        let flags = FeatureFlags::parse("MergeCredentialsChain=maybe,,=true");
        assert!(!flags.merge_credentials_chain());
        assert_eq!(flags, FeatureFlags::new());
    }

    #[test]
    fn later_entries_override_earlier_ones() {
        let flags = FeatureFlags::parse("MergeCredentialsChain=true,mergecredentialschain=0");
        assert!(!flags.merge_credentials_chain());
    }

    #[test]
    fn from_env_reads_feature_flags_variable() {
        temp_env::with_var(FEATURE_FLAGS_ENV_VAR, Some("MergeCredentialsChain=true"), || {
            assert!(FeatureFlags::from_env().merge_credentials_chain());
        });
        temp_env::with_var(FEATURE_FLAGS_ENV_VAR, None::<&str>, || {
            assert_eq!(FeatureFlags::from_env(), FeatureFlags::new());
        });
    }

    #[test]
    fn builder_enables_known_flags() {
        let flags = FeatureFlags::new().with(FeatureFlag::MergeCredentialsChain, true);
        assert!(flags.enabled(FeatureFlag::MergeCredentialsChain));
        assert_eq!(FeatureFlag::ALL.len(), 1);
    }
}
