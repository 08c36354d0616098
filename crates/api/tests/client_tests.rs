use std::collections::HashMap;
use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::json;
use spotinst_api::credentials::{CredentialValue, Credentials, CredentialsError, Provider};
use spotinst_api::{Config, Error, FeatureFlags, Request, Session, require_ok};
use spotinst_types::FieldState;
use spotinst_util::presence::{CodecError, Presence, PresenceEncoder, serialize_presence};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn session_for(server: &MockServer, credentials: Credentials) -> Session {
    Session::new(
        Config::new()
            .with_base_url(server.uri())
            .with_credentials(credentials)
            .with_feature_flags(FeatureFlags::default()),
    )
    .expect("session builds")
}

#[derive(Debug, Default)]
struct Capacity {
    minimum: Option<i64>,
    target: Option<i64>,
    state: FieldState,
}

impl Presence for Capacity {
    fn field_state(&self) -> &FieldState {
        &self.state
    }

    fn field_state_mut(&mut self) -> &mut FieldState {
        &mut self.state
    }

    fn encode_fields(&self, encoder: &mut PresenceEncoder<'_>) -> Result<(), CodecError> {
        encoder.field("minimum", &self.minimum)?.field("target", &self.target)?;
        Ok(())
    }
}

impl Serialize for Capacity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_presence(self, serializer)
    }
}

#[derive(Debug, Deserialize, PartialEq)]
struct Group {
    id: String,
    name: String,
}

#[tokio::test]
async fn attaches_credentials_and_standard_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/aws/ec2/group/sig-1"))
        .and(query_param("accountId", "act-12345"))
        .and(header("Authorization", "Bearer secret"))
        .and(header("Accept", "application/json"))
        .and(header("Content-Type", "application/json"))
        .and(header("X-Trace", "abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "request": {"id": "req-1", "url": "/aws/ec2/group/sig-1", "method": "GET"},
            "response": {
                "status": {"code": 200, "message": "OK"},
                "kind": "spotinst:aws:ec2:group",
                "items": [{"id": "sig-1", "name": "web"}],
                "count": 1
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = session_for(&server, Credentials::from_static("secret", "act-12345")).client();
    let values = HashMap::from([("groupId".to_string(), "sig-1".to_string())]);
    let request = Request::from_template(Method::GET, "/aws/ec2/group/{groupId}", &values)
        .unwrap()
        .with_header("X-Trace", "abc");

    let groups: Vec<Group> = client.execute_items(request).await.unwrap();
    assert_eq!(
        groups,
        vec![Group {
            id: "sig-1".to_string(),
            name: "web".to_string()
        }]
    );
}

#[tokio::test]
async fn user_agent_names_the_sdk() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = session_for(&server, Credentials::from_static("secret", "")).client();
    let response = client.execute(Request::new(Method::GET, "/health")).await.unwrap();
    assert!(response.items().unwrap().is_empty());

    let received = server.received_requests().await.unwrap();
    let agent = received[0].headers.get("user-agent").unwrap().to_str().unwrap();
    assert!(agent.starts_with("spotinst-sdk-rust/"), "{agent}");
    assert_eq!(received[0].url.query(), None);
}

#[tokio::test]
async fn sends_presence_encoded_body_and_query_params() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/aws/ec2/group/sig-1"))
        .and(query_param("shouldResumeStateful", "true"))
        .and(query_param("accountId", "act-1"))
        .and(body_json(json!({"group": {"capacity": {"minimum": 0, "target": null}}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": {"items": [], "count": 0}})))
        .expect(1)
        .mount(&server)
        .await;

    let capacity = Capacity {
        minimum: Some(0),
        target: Some(5),
        ..Capacity::default()
    }
    .with_null("target");
    let mut request = Request::new(Method::PUT, "/aws/ec2/group/sig-1");
    request.params.set("shouldResumeStateful", "true");
    request
        .set_wrapped_body("group", &json!({"capacity": serde_json::to_value(&capacity).unwrap()}))
        .unwrap();

    let client = session_for(&server, Credentials::from_static("secret", "act-1")).client();
    client.execute(request).await.unwrap();
}

#[tokio::test]
async fn require_ok_surfaces_api_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/aws/ec2/group"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "request": {"id": "req-400"},
            "response": {
                "status": {"code": 400, "message": "Bad Request"},
                "errors": [{"code": "INVALID", "message": "bad", "field": "name"}]
            }
        })))
        .mount(&server)
        .await;

    let client = session_for(&server, Credentials::from_static("secret", "act-1")).client();
    let request = Request::new(Method::POST, "/aws/ec2/group")
        .with_wrapped_body("group", &json!({"name": ""}))
        .unwrap();

    let raw = client.do_request(request.clone()).await.unwrap();
    assert_eq!(raw.status, StatusCode::BAD_REQUEST);

    let error = client.execute(request).await.unwrap_err();
    let message = error.to_string();
    for needle in ["POST", "/aws/ec2/group", "400", "INVALID", "bad"] {
        assert!(message.contains(needle), "missing {needle:?} in {message}");
    }
    assert!(message.contains(&server.uri()), "{message}");

    let api = error.as_api_error().expect("api error");
    assert_eq!(api.request_id.as_deref(), Some("req-400"));
    assert_eq!(api.first().map(|e| e.field.as_str()), Some("name"));
}

#[tokio::test]
async fn non_envelope_error_bodies_fall_back_to_status_reason() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&server)
        .await;

    let client = session_for(&server, Credentials::from_static("secret", "act-1")).client();
    let error = client
        .execute(Request::new(Method::DELETE, "/aws/ec2/group/sig-1"))
        .await
        .unwrap_err();

    let api = error.as_api_error().expect("api error");
    assert_eq!(api.code(), "Service Unavailable");
    assert_eq!(api.message(), "upstream unavailable");
}

#[tokio::test]
async fn undecodable_success_bodies_are_decode_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let client = session_for(&server, Credentials::from_static("secret", "act-1")).client();
    let error = client
        .execute_items::<Group>(Request::new(Method::GET, "/aws/ec2/group"))
        .await
        .unwrap_err();
    assert!(matches!(error, Error::Decode(_)), "{error}");
    assert!(error.to_string().contains("status 200"), "{error}");
}

#[tokio::test]
async fn credential_failures_stop_before_sending() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = session_for(&server, Credentials::from_static("", "")).client();
    let error = client.execute(Request::new(Method::GET, "/aws/ec2/group")).await.unwrap_err();
    assert!(matches!(error, Error::Credentials(CredentialsError::StaticEmpty)), "{error}");
}

#[tokio::test]
async fn transport_errors_pass_through_require_ok() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let client = session_for(&server, Credentials::from_static("secret", "act-1")).client();
    let request = Request::new(Method::GET, "/aws/ec2/group").with_timeout(Duration::from_millis(50));
    let error = require_ok(client.do_request(request).await).unwrap_err();
    match error {
        Error::Transport(transport) => assert!(transport.is_timeout(), "{transport}"),
        other => panic!("expected transport error, got {other}"),
    }
}

#[derive(Debug, Default)]
struct Rotating {
    calls: std::sync::atomic::AtomicUsize,
}

impl Provider for Rotating {
    fn resolve(&self) -> Result<CredentialValue, CredentialsError> {
        let call = self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst) + 1;
        Ok(CredentialValue::new(format!("token-{call}"), "act-1"))
    }

    fn name(&self) -> &str {
        "Rotating"
    }
}

#[tokio::test]
async fn credentials_are_cached_until_refreshed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("Authorization", "Bearer token-1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(header("Authorization", "Bearer token-2"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = session_for(&server, Credentials::new(Rotating::default())).client();
    client.execute(Request::new(Method::GET, "/a")).await.unwrap();
    client.execute(Request::new(Method::GET, "/b")).await.unwrap();
    assert_eq!(client.refresh_credentials().unwrap().token, "token-2");
    client.execute(Request::new(Method::GET, "/c")).await.unwrap();
}
