use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

/// Wire wrapper around every API response body.
///
/// ```json
/// {
///   "request": { "id": "...", "url": "...", "method": "GET", "timestamp": "..." },
///   "response": {
///     "status": { "code": 200, "message": "OK" },
///     "kind": "spotinst:aws:ec2:group",
///     "items": [ ... ],
///     "errors": [ { "code": "...", "message": "...", "field": "..." } ],
///     "count": 1
///   }
/// }
/// ```
///
/// Items stay as raw JSON; the generic executor has no knowledge of the
/// resource type and leaves decoding to the resource client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub request: Option<RequestInfo>,
    #[serde(default)]
    pub response: ResponseBody,
}

impl Envelope {
    /// Server-assigned request identifier, when the envelope carries one.
    pub fn request_id(&self) -> Option<&str> {
        self.request
            .as_ref()
            .map(|request| request.id.as_str())
            .filter(|id| !id.is_empty())
    }
}

/// Echo of the request as seen by the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestInfo {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub timestamp: String,
}

/// The `response` section of an [`Envelope`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponseBody {
    #[serde(default)]
    pub status: Option<ResponseStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub items: Vec<Box<RawValue>>,
    #[serde(default)]
    pub errors: Vec<ResponseError>,
    #[serde(default)]
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseStatus {
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub message: String,
}

/// One entry of the envelope's `errors` array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub field: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_full_envelope_and_keeps_items_raw() {
        let body = r#"{
            "request": {"id": "9a1c-42", "url": "/aws/ec2/group", "method": "GET", "timestamp": "2024-01-01T00:00:00Z"},
            "response": {
                "status": {"code": 200, "message": "OK"},
                "kind": "spotinst:aws:ec2:group",
                "items": [{"id": "sig-1", "name": "web"}, {"id": "sig-2"}],
                "count": 2
            }
        }"#;

        let envelope: Envelope = serde_json::from_str(body).expect("decode envelope");
        assert_eq!(envelope.request_id(), Some("9a1c-42"));
        assert_eq!(envelope.response.count, 2);
        assert_eq!(envelope.response.items.len(), 2);
        assert_eq!(envelope.response.items[1].get(), r#"{"id": "sig-2"}"#);
        assert!(envelope.response.errors.is_empty());
    }

    #[test]
    fn decodes_error_only_envelope() {
        let body = r#"{"response": {"status": {"code": 400, "message": "Bad Request"},
            "errors": [{"code": "INVALID", "message": "bad", "field": "name"}]}}"#;

        let envelope: Envelope = serde_json::from_str(body).expect("decode envelope");
        assert_eq!(envelope.request_id(), None);
        assert_eq!(
            envelope.response.errors,
            vec![ResponseError {
                code: "INVALID".into(),
                message: "bad".into(),
                field: "name".into(),
            }]
        );
        assert!(envelope.response.items.is_empty());
    }
}
