//! Request execution.
//!
//! [`Client::do_request`] turns a [`Request`] into an HTTP call: it attaches
//! the bearer token and `accountId`, the standard headers and the JSON body,
//! sends it, and returns the raw [`Response`] whatever its status.
//! [`require_ok`] then maps non-2xx responses to [`ApiError`]s, and
//! [`Client::execute`] combines the two.

use std::time::Instant;

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::value::RawValue;
use spotinst_types::{Envelope, ResponseError};
use spotinst_util::http::{decode_envelope, decode_json_strict, truncate_response_preview};
use spotinst_util::redact_sensitive;
use tracing::{debug, warn};
use url::Url;

use crate::credentials::CredentialValue;
use crate::error::ApiError;
use crate::request::Request;
use crate::session::Session;
use crate::{Error, Result};

/// Query parameter carrying the account id.
pub const ACCOUNT_ID_PARAM: &str = "accountId";
const ACCEPT_JSON: &str = "application/json";
const LOG_PREVIEW_LIMIT: usize = 512;

/// Executor bound to a [`Session`]. Cheap to clone and safe to share.
#[derive(Debug, Clone)]
pub struct Client {
    session: Session,
}

impl Client {
    pub fn new(session: &Session) -> Self {
        Self {
            session: session.clone(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Credentials from the session cache.
    ///
    /// The session fills the cache when it is built. After an expiry or a
    /// failed first attempt this resolves again synchronously, which can block
    /// the calling thread on reading the credentials file.
    pub fn credentials(&self) -> Result<CredentialValue> {
        Ok(self.session.config().credentials.get()?)
    }

    /// Drop the cached credentials and resolve them again. Call this outside
    /// latency-sensitive async code when the chain includes a file provider.
    pub fn refresh_credentials(&self) -> Result<CredentialValue> {
        self.session.config().credentials.expire();
        self.credentials()
    }

    /// Send `request` and return the response without checking its status.
    pub async fn do_request(&self, request: Request) -> Result<Response> {
        let credentials = self.credentials()?;
        let method = request.method().clone();
        let url = self.request_url(&request, &credentials)?;
        let headers = self.request_headers(&request, &credentials)?;

        let mut builder = self
            .session
            .config()
            .http_client
            .request(method.clone(), url.clone())
            .headers(headers);
        if let Some(body) = request.body() {
            builder = builder.body(serde_json::to_vec(body)?);
        }
        if let Some(timeout) = request.timeout() {
            builder = builder.timeout(timeout);
        }

        let started = Instant::now();
        debug!(method = %method, path = %request.path(), "sending request");
        let response = match builder.send().await {
            Ok(response) => response,
            Err(error) => {
                warn!(
                    method = %method,
                    path = %request.path(),
                    duration_ms = started.elapsed().as_millis() as u64,
                    error = %error,
                    "request failed"
                );
                return Err(error.into());
            }
        };

        let status = response.status();
        let headers = response.headers().clone();
        let url = response.url().clone();
        let body = response.text().await?;
        debug!(
            method = %method,
            path = %request.path(),
            status = status.as_u16(),
            duration_ms = started.elapsed().as_millis() as u64,
            "request completed"
        );

        Ok(Response {
            method,
            url,
            status,
            headers,
            body,
        })
    }

    /// [`Client::do_request`] followed by [`require_ok`].
    pub async fn execute(&self, request: Request) -> Result<Response> {
        require_ok(self.do_request(request).await)
    }

    /// Execute `request` and decode every envelope item as `T`.
    pub async fn execute_items<T: DeserializeOwned>(&self, request: Request) -> Result<Vec<T>> {
        self.execute(request).await?.decode_items()
    }

    fn request_url(&self, request: &Request, credentials: &CredentialValue) -> Result<Url> {
        let base = self.session.config().base_url.as_str().trim_end_matches('/');
        let path = request.path();
        let separator = if path.starts_with('/') { "" } else { "/" };
        let raw = format!("{base}{separator}{path}");
        let mut url = Url::parse(&raw).map_err(|error| Error::InvalidRequest(format!("invalid URL '{raw}': {error}")))?;

        let add_account = !credentials.account.is_empty() && !request.params.contains(ACCOUNT_ID_PARAM);
        if !request.params.is_empty() || add_account {
            let mut query = url.query_pairs_mut();
            query.extend_pairs(request.params.pairs());
            if add_account {
                query.append_pair(ACCOUNT_ID_PARAM, &credentials.account);
            }
        }
        Ok(url)
    }

    fn request_headers(&self, request: &Request, credentials: &CredentialValue) -> Result<HeaderMap> {
        let config = self.session.config();
        let mut headers = HeaderMap::new();
        for (name, value) in request.headers() {
            let name = HeaderName::try_from(name.as_str())
                .map_err(|error| Error::InvalidRequest(format!("invalid header name '{name}': {error}")))?;
            headers.append(name, header_value(value)?);
        }

        if !credentials.token.is_empty() {
            let mut authorization = HeaderValue::from_str(&format!("Bearer {}", credentials.token))
                .map_err(|_| Error::InvalidRequest("token is not a valid header value".to_string()))?;
            authorization.set_sensitive(true);
            headers.insert(AUTHORIZATION, authorization);
        }
        headers.insert(USER_AGENT, header_value(&config.user_agent)?);
        headers.insert(CONTENT_TYPE, header_value(&config.content_type)?);
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_JSON));
        Ok(headers)
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|error| Error::InvalidRequest(format!("invalid header value '{value}': {error}")))
}

/// Pass 2xx responses and errors through; turn any other response into
/// [`Error::Api`].
pub fn require_ok(result: Result<Response>) -> Result<Response> {
    let response = result?;
    if response.is_success() {
        return Ok(response);
    }
    Err(Error::Api(response.api_error()))
}

/// A completed HTTP exchange with the body read into memory.
#[derive(Debug, Clone)]
pub struct Response {
    pub method: Method,
    pub url: Url,
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl Response {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Decode the body as an envelope. An empty body yields an empty one.
    pub fn envelope(&self) -> Result<Envelope> {
        Ok(decode_envelope(&self.body, Some(self.status.as_u16()))?)
    }

    /// Envelope items, undecoded.
    pub fn items(&self) -> Result<Vec<Box<RawValue>>> {
        Ok(self.envelope()?.response.items)
    }

    /// Envelope items decoded as `T`. Any item that fails to decode fails the
    /// whole call.
    pub fn decode_items<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        let status = Some(self.status.as_u16());
        self.items()?
            .iter()
            .map(|item| decode_json_strict(item.get(), status).map_err(Error::from))
            .collect()
    }

    /// Structured error for this response.
    ///
    /// Uses the envelope's errors when the body decodes to one that reports
    /// any; otherwise a single entry whose code is the status reason and whose
    /// message is the body.
    pub fn api_error(&self) -> ApiError {
        let (request_id, errors) = match self.envelope() {
            Ok(envelope) => (envelope.request_id().map(str::to_string), envelope.response.errors),
            Err(error) => {
                warn!(
                    status = self.status.as_u16(),
                    body = %redact_sensitive(&truncate_response_preview(&self.body, LOG_PREVIEW_LIMIT)),
                    error = %error,
                    "error response is not an envelope"
                );
                (None, Vec::new())
            }
        };
        let errors = if errors.is_empty() {
            vec![ResponseError {
                code: self
                    .status
                    .canonical_reason()
                    .map(str::to_string)
                    .unwrap_or_else(|| self.status.as_u16().to_string()),
                message: self.body.trim().to_string(),
                field: String::new(),
            }]
        } else {
            errors
        };

        ApiError {
            method: self.method.clone(),
            url: self.url.clone(),
            status: self.status,
            request_id,
            errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &str) -> Response {
        Response {
            method: Method::POST,
            url: Url::parse("https://api.spotinst.io/aws/ec2/group?accountId=act-1").unwrap(),
            status: StatusCode::from_u16(status).unwrap(),
            headers: HeaderMap::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn api_error_uses_first_envelope_error() {
        let response = response(
            400,
            r#"{"request":{"id":"req-1"},"response":{"errors":[{"code":"INVALID","message":"bad","field":"name"},{"code":"OTHER","message":"second"}]}}"#,
        );
        let error = response.api_error();
        assert_eq!(error.code(), "INVALID");
        assert_eq!(error.errors.len(), 2);
        assert_eq!(
            error.to_string(),
            "POST https://api.spotinst.io/aws/ec2/group?accountId=act-1: 400 (request: \"req-1\") INVALID: bad (field: name)"
        );
    }

    #[test]
    fn api_error_falls_back_to_status_reason_and_body() {
        let error = response(502, "<html>bad gateway</html>\n").api_error();
        assert_eq!(error.code(), "Bad Gateway");
        assert_eq!(error.message(), "<html>bad gateway</html>");
        assert_eq!(error.request_id, None);
    }

    #[test]
    fn require_ok_passes_success_and_errors_through() {
        assert!(require_ok(Ok(response(200, ""))).is_ok());

        let error = require_ok(Err(Error::InvalidRequest("boom".to_string()))).unwrap_err();
        assert!(matches!(error, Error::InvalidRequest(message) if message == "boom"));

        let error = require_ok(Ok(response(404, ""))).unwrap_err();
        assert_eq!(error.as_api_error().map(|api| api.status), Some(StatusCode::NOT_FOUND));
    }

    #[test]
    fn decode_items_reads_every_item() {
        #[derive(serde::Deserialize)]
        struct Group {
            id: String,
        }

        let response = response(200, r#"{"response":{"items":[{"id":"sig-1"},{"id":"sig-2"}],"count":2}}"#);
        let ids: Vec<String> = response.decode_items::<Group>().unwrap().into_iter().map(|g| g.id).collect();
        assert_eq!(ids, ["sig-1", "sig-2"]);
        assert!(matches!(
            response.decode_items::<u32>().unwrap_err(),
            Error::Decode(_)
        ));
    }
}
