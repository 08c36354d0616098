use std::path::PathBuf;

use thiserror::Error;

/// Provider-specific credential failures.
#[derive(Debug, Error)]
pub enum CredentialsError {
    #[error("static credentials are empty")]
    StaticEmpty,

    #[error("token and account not found in environment")]
    EnvNotFound,

    #[error("token not found in {provider}")]
    TokenNotFound { provider: String },

    #[error("failed to load credentials file: {source}")]
    FileLoad {
        path: PathBuf,
        #[source]
        source: CredentialsFileError,
    },

    #[error("section does not exist: {profile}")]
    SectionNotFound { profile: String },

    #[error("no valid providers in chain")]
    NoValidProviders,

    /// Verbose chain failure carrying every provider error in attempt order.
    #[error("no valid providers in chain:\n{}", join_errors(.errors))]
    ChainFailed { errors: Vec<CredentialsError> },
}

/// Why the credentials file could not be read.
#[derive(Debug, Error)]
pub enum CredentialsFileError {
    #[error("{path}: {source}", path = .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: {source}", path = .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{path}:{line}: {reason}", path = .path.display())]
    Ini { path: PathBuf, line: usize, reason: String },

    #[error("unable to determine the home directory for the default credentials file")]
    HomeDirUnavailable,
}

fn join_errors(errors: &[CredentialsError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n")
}
