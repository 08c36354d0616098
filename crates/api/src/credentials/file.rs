//! Shared credentials file provider.
//!
//! The file holds named profiles, either as INI sections:
//!
//! ```text
//! [default]
//! token = 6b2c...
//! account = act-12345
//!
//! [staging]
//! account = act-67890
//! ```
//!
//! or as JSON, keyed by profile (`{"default": {"token": ..., "account": ...}}`)
//! or flat (`{"token": ..., "account": ...}`) for a single profile. A named
//! profile that omits a field takes it from `default`. A profile that still
//! holds only an account resolves, so it can fill the account in a merging
//! chain; one with neither field fails.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use dirs_next::home_dir;
use indexmap::IndexMap;
use serde::Deserialize;
use spotinst_util::expand_tilde;
use tracing::debug;

use super::{CredentialValue, CredentialsError, CredentialsFileError, Provider};

pub const FILE_PROVIDER_NAME: &str = "FileCredentialsProvider";
/// Overrides the credentials file location.
pub const SHARED_CREDENTIALS_FILE_ENV_VAR: &str = "SPOTINST_SHARED_CREDENTIALS_FILE";
/// Selects the profile when none is set on the provider.
pub const PROFILE_ENV_VAR: &str = "SPOTINST_PROFILE";
pub const DEFAULT_PROFILE: &str = "default";

/// Reads one profile from the credentials file on every resolve.
#[derive(Debug, Clone, Default)]
pub struct FileProvider {
    path: Option<PathBuf>,
    profile: Option<String>,
}

impl FileProvider {
    /// Provider using the environment-derived path and profile.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    /// Effective file path: explicit, then [`SHARED_CREDENTIALS_FILE_ENV_VAR`],
    /// then [`default_credentials_path`].
    pub fn path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.path {
            return Some(path.clone());
        }
        if let Ok(path) = env::var(SHARED_CREDENTIALS_FILE_ENV_VAR)
            && !path.trim().is_empty()
        {
            return Some(expand_tilde(&path));
        }
        default_credentials_path()
    }

    /// Effective profile: explicit, then [`PROFILE_ENV_VAR`], then `default`.
    pub fn profile(&self) -> String {
        if let Some(profile) = &self.profile {
            return profile.clone();
        }
        env::var(PROFILE_ENV_VAR)
            .ok()
            .map(|profile| profile.trim().to_string())
            .filter(|profile| !profile.is_empty())
            .unwrap_or_else(|| DEFAULT_PROFILE.to_string())
    }
}

impl Provider for FileProvider {
    fn resolve(&self) -> Result<CredentialValue, CredentialsError> {
        let path = self.path().ok_or(CredentialsError::FileLoad {
            path: PathBuf::new(),
            source: CredentialsFileError::HomeDirUnavailable,
        })?;
        let profile = self.profile();

        let profiles = load_profiles(&path, &profile).map_err(|source| CredentialsError::FileLoad {
            path: path.clone(),
            source,
        })?;
        let mut entry = profiles
            .get(&profile)
            .cloned()
            .ok_or_else(|| CredentialsError::SectionNotFound { profile: profile.clone() })?;
        if profile != DEFAULT_PROFILE
            && let Some(fallback) = profiles.get(DEFAULT_PROFILE)
        {
            entry.fill_from(fallback);
        }

        debug!(path = %path.display(), profile = %profile, "loaded credentials profile");
        let value = CredentialValue::new(entry.token.unwrap_or_default(), entry.account.unwrap_or_default())
            .with_provider_name(FILE_PROVIDER_NAME);
        if value.is_empty() {
            return Err(CredentialsError::TokenNotFound {
                provider: FILE_PROVIDER_NAME.to_string(),
            });
        }
        Ok(value)
    }

    fn name(&self) -> &str {
        FILE_PROVIDER_NAME
    }
}

/// `~/.spotinst/credentials`, when a home directory is known.
pub fn default_credentials_path() -> Option<PathBuf> {
    home_dir().map(|home| home.join(".spotinst").join("credentials"))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
struct ProfileEntry {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    account: Option<String>,
}

impl ProfileEntry {
    fn fill_from(&mut self, fallback: &ProfileEntry) {
        if self.token.as_deref().is_none_or(str::is_empty) {
            self.token = fallback.token.clone();
        }
        if self.account.as_deref().is_none_or(str::is_empty) {
            self.account = fallback.account.clone();
        }
    }

    fn set(&mut self, key: &str, value: String) -> bool {
        match key {
            "token" => self.token = Some(value),
            "account" => self.account = Some(value),
            _ => return false,
        }
        true
    }
}

type Profiles = IndexMap<String, ProfileEntry>;

fn load_profiles(path: &Path, requested_profile: &str) -> Result<Profiles, CredentialsFileError> {
    let content = fs::read_to_string(path).map_err(|source| CredentialsFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if content.trim_start().starts_with('{') {
        parse_json_profiles(&content, requested_profile).map_err(|source| CredentialsFileError::Json {
            path: path.to_path_buf(),
            source,
        })
    } else {
        parse_ini_profiles(&content).map_err(|(line, reason)| CredentialsFileError::Ini {
            path: path.to_path_buf(),
            line,
            reason,
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonCredentials {
    Flat(FlatJson),
    Profiles(Profiles),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct FlatJson {
    token: Option<String>,
    account: Option<String>,
}

/// A flat document has no profiles and is served as whichever profile was
/// requested.
fn parse_json_profiles(content: &str, requested_profile: &str) -> Result<Profiles, serde_json::Error> {
    match serde_json::from_str::<JsonCredentials>(content)? {
        JsonCredentials::Profiles(profiles) => Ok(profiles),
        JsonCredentials::Flat(flat) => Ok(Profiles::from([(
            requested_profile.to_string(),
            ProfileEntry {
                token: flat.token,
                account: flat.account,
            },
        )])),
    }
}

/// Minimal INI reader covering `[section]` headers, `key = value` pairs and
/// `#`/`;` comments. Keys before the first header belong to `default`.
fn parse_ini_profiles(content: &str) -> Result<Profiles, (usize, String)> {
    let mut profiles = Profiles::new();
    let mut current = DEFAULT_PROFILE.to_string();

    for (index, raw_line) in content.lines().enumerate() {
        let line_number = index + 1;
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(header) = line.strip_prefix('[') {
            let name = header
                .strip_suffix(']')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .ok_or_else(|| (line_number, format!("malformed section header '{line}'")))?;
            current = name.to_string();
            profiles.entry(current.clone()).or_default();
            continue;
        }
        let (key, value) = line
            .split_once('=')
            .ok_or_else(|| (line_number, format!("expected 'key = value', found '{line}'")))?;
        let key = key.trim().to_ascii_lowercase();
        let value = unquote(value.trim()).to_string();
        // Unknown keys are tolerated so the file can carry other settings.
        profiles.entry(current.clone()).or_default().set(&key, value);
    }

    Ok(profiles)
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value.strip_prefix(quote).and_then(|rest| rest.strip_suffix(quote)) {
            return inner;
        }
    }
    value
}
