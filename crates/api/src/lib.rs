//! Spotinst API request pipeline.
//!
//! Every resource client (groups, clusters, launch specs, ...) goes through
//! the same steps:
//!
//! - build a [`Request`] from an expanded path template, query parameters and
//!   an optional presence-encoded body
//! - hand it to a [`Client`], which attaches credentials and standard headers
//!   and sends it
//! - check the status with [`require_ok`] and decode the envelope items
//!
//! Credentials come from a [`credentials::Provider`], usually the default
//! environment-then-file chain. A [`Session`] freezes the configuration and is
//! shared by all clients.
//!
//! # Example
//!
//! ```no_run
//! use std::collections::HashMap;
//!
//! use reqwest::Method;
//! use spotinst_api::{Config, Request, Session};
//! use spotinst_api::credentials::Credentials;
//!
//! # async fn run() -> spotinst_api::Result<()> {
//! let session = Session::new(Config::new().with_credentials(Credentials::from_env()))?;
//! let client = session.client();
//!
//! let values = HashMap::from([("groupId".to_string(), "sig-1234".to_string())]);
//! let request = Request::from_template(Method::GET, "/aws/ec2/group/{groupId}", &values)?;
//! let groups: Vec<serde_json::Value> = client.execute_items(request).await?;
//! println!("{} group(s)", groups.len());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod credentials;
mod error;
pub mod request;
pub mod session;

pub use client::{ACCOUNT_ID_PARAM, Client, Response, require_ok};
pub use config::{Config, default_http_client, non_pooled_http_client};
pub use error::{ApiError, Error, Result};
pub use request::{QueryParams, Request};
pub use session::{Session, SessionConfig};
pub use spotinst_util::{FeatureFlag, FeatureFlags};
