//! Error types for the Spotinst API pipeline.

use std::fmt;

use reqwest::{Method, StatusCode};
use spotinst_types::ResponseError;
use spotinst_util::http::JsonParseError;
use spotinst_util::presence::CodecError;
use spotinst_util::uritemplates::TemplateError;
use thiserror::Error;
use url::Url;

use crate::credentials::CredentialsError;

/// Everything that can go wrong between building a request and decoding its
/// items. Nothing is retried; each failure is returned to the caller as-is.
#[derive(Debug, Error)]
pub enum Error {
    /// Network, DNS, TLS, timeout or body-read failure from the transport.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response from the API.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A presence-aware body could not be encoded.
    #[error("failed to encode request body: {0}")]
    Codec(#[from] CodecError),

    /// A body could not be serialized to JSON.
    #[error("failed to serialize request body: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A response body or item could not be decoded.
    #[error(transparent)]
    Decode(#[from] JsonParseError),

    #[error(transparent)]
    Credentials(#[from] CredentialsError),

    #[error("invalid path template: {0}")]
    Template(#[from] TemplateError),

    /// The request could not be turned into a transport request (bad path,
    /// header name or header value).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// The API error, when this is one.
    pub fn as_api_error(&self) -> Option<&ApiError> {
        match self {
            Error::Api(error) => Some(error),
            _ => None,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Structured failure decoded from a non-2xx response envelope.
///
/// The display form summarizes the first reported error; the request id and
/// field segments appear only when known:
///
/// ```text
/// POST https://api.spotinst.io/aws/ec2/group?accountId=act-1: 400 (request: "9a1c-42") INVALID: bad (field: name)
/// ```
#[derive(Debug, Clone)]
pub struct ApiError {
    pub method: Method,
    pub url: Url,
    pub status: StatusCode,
    pub request_id: Option<String>,
    /// Every error reported by the envelope, in server order. Never empty.
    pub errors: Vec<ResponseError>,
}

impl ApiError {
    pub fn first(&self) -> Option<&ResponseError> {
        self.errors.first()
    }

    pub fn code(&self) -> &str {
        self.first().map(|error| error.code.as_str()).unwrap_or_default()
    }

    pub fn message(&self) -> &str {
        self.first().map(|error| error.message.as_str()).unwrap_or_default()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.method, self.url, self.status.as_u16())?;
        if let Some(request_id) = &self.request_id {
            write!(f, " (request: {request_id:?})")?;
        }
        write!(f, " {}: {}", self.code(), self.message())?;
        if let Some(error) = self.first()
            && !error.field.is_empty()
        {
            write!(f, " (field: {})", error.field)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}
