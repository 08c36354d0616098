//! Transport-agnostic request description.
//!
//! A [`Request`] is assembled by a resource client (method, expanded path,
//! query parameters, optional JSON body) and handed to
//! [`Client::do_request`](crate::Client::do_request), which consumes it. No
//! validation happens here; bad paths or header values surface when the
//! executor converts the request for the transport.

use std::collections::HashMap;
use std::time::Duration;

use indexmap::IndexMap;
use reqwest::Method;
use serde::Serialize;
use serde_json::{Map, Value};
use spotinst_util::presence::{self, Presence};
use spotinst_util::uritemplates;

use crate::Result;

/// Query parameters as an ordered multimap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    values: IndexMap<String, Vec<String>>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every value for `key` with `value`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), vec![value.into()]);
    }

    /// Append `value` to the values already held for `key`.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.entry(key.into()).or_default().push(value.into());
    }

    /// First value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(|values| values.first()).map(String::as_str)
    }

    pub fn get_all(&self, key: &str) -> &[String] {
        self.values.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        self.values.shift_remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Flattened `(key, value)` pairs, repeated keys kept in insertion order.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values
            .iter()
            .flat_map(|(key, values)| values.iter().map(move |value| (key.as_str(), value.as_str())))
    }
}

/// One API call, built once and consumed by the executor.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    path: String,
    /// Query parameters; the executor adds `accountId` when one is resolved.
    pub params: QueryParams,
    obj: Option<Value>,
    headers: Vec<(String, String)>,
    timeout: Option<Duration>,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: QueryParams::new(),
            obj: None,
            headers: Vec::new(),
            timeout: None,
        }
    }

    /// Expand `template` against `values` and build a request for the result.
    pub fn from_template(method: Method, template: &str, values: &HashMap<String, String>) -> Result<Self> {
        let path = uritemplates::expand(template, values)?;
        Ok(Self::new(method, path))
    }

    /// Serialize `body` as the request payload. Presence-aware structs encode
    /// through their own `Serialize` impl, so their field state applies, but a
    /// codec failure then arrives as [`Error::Serialization`](crate::Error::Serialization).
    pub fn set_body<T: Serialize + ?Sized>(&mut self, body: &T) -> Result<()> {
        self.obj = Some(serde_json::to_value(body)?);
        Ok(())
    }

    /// Wrap `body` under a resource-named key, e.g. `{"group": {...}}`.
    pub fn set_wrapped_body<T: Serialize + ?Sized>(&mut self, key: &str, body: &T) -> Result<()> {
        let mut wrapper = Map::new();
        wrapper.insert(key.to_string(), serde_json::to_value(body)?);
        self.obj = Some(Value::Object(wrapper));
        Ok(())
    }

    /// Encode a presence-aware `body` directly, keeping codec failures typed
    /// as [`Error::Codec`](crate::Error::Codec).
    pub fn set_presence_body<T: Presence + ?Sized>(&mut self, body: &T) -> Result<()> {
        self.obj = Some(Value::Object(presence::encode(body)?));
        Ok(())
    }

    /// [`Request::set_presence_body`] nested under a resource-named key.
    pub fn set_wrapped_presence_body<T: Presence + ?Sized>(&mut self, key: &str, body: &T) -> Result<()> {
        let mut wrapper = Map::new();
        wrapper.insert(key.to_string(), Value::Object(presence::encode(body)?));
        self.obj = Some(Value::Object(wrapper));
        Ok(())
    }

    /// Append an extra header. Standard headers set by the executor win over
    /// headers with the same name.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.push((name.into(), value.into()));
    }

    /// Per-request timeout; elapsed timeouts surface as transport errors.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = Some(timeout);
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.set(key, value);
        self
    }

    pub fn with_body<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        self.set_body(body)?;
        Ok(self)
    }

    pub fn with_wrapped_body<T: Serialize + ?Sized>(mut self, key: &str, body: &T) -> Result<Self> {
        self.set_wrapped_body(key, body)?;
        Ok(self)
    }

    pub fn with_presence_body<T: Presence + ?Sized>(mut self, body: &T) -> Result<Self> {
        self.set_presence_body(body)?;
        Ok(self)
    }

    pub fn with_wrapped_presence_body<T: Presence + ?Sized>(mut self, key: &str, body: &T) -> Result<Self> {
        self.set_wrapped_presence_body(key, body)?;
        Ok(self)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.set_timeout(timeout);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn body(&self) -> Option<&Value> {
        self.obj.as_ref()
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}
