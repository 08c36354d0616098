//! Shared helpers for the Spotinst SDK: the selective-field JSON codec, path
//! template expansion, feature flags, and response decoding.

use once_cell::sync::Lazy;
use regex::Regex;

pub mod feature_flags;
pub mod http;
pub mod path_processing;
pub mod presence;
pub mod uritemplates;

pub use feature_flags::{FEATURE_FLAGS_ENV_VAR, FeatureFlag, FeatureFlags};
pub use path_processing::expand_tilde;

static REDACTION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(authorization:\s*(?:bearer\s+)?)([\w\-\.=:/+]+)",
        r#"(?i)("token"\s*:\s*")([^"]+)"#,
        r"(?i)([A-Z0-9_]*?(KEY|TOKEN|SECRET|PASSWORD)=)([^\s]+)",
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});

/// Redacts values that look like secrets in a string.
///
/// Used before response bodies or request dumps reach a log line.
///
/// ```rust
/// use spotinst_util::redact_sensitive;
///
/// assert_eq!(redact_sensitive("Authorization: Bearer abc123"), "Authorization: Bearer <redacted>");
/// assert_eq!(redact_sensitive("SPOTINST_TOKEN=abc123 done"), "SPOTINST_TOKEN=<redacted> done");
/// assert_eq!(redact_sensitive(r#"{"token":"abc123"}"#), r#"{"token":"<redacted>"}"#);
/// ```
pub fn redact_sensitive(input: &str) -> String {
    let mut redacted = input.to_string();
    for pattern in REDACTION_PATTERNS.iter() {
        redacted = pattern
            .replace_all(&redacted, |caps: &regex::Captures| {
                let prefix = caps.get(1).map(|m| m.as_str()).unwrap_or("");
                format!("{prefix}<redacted>")
            })
            .into_owned();
    }
    redacted
}
