//! API payloads, request preparation and client configuration for `labctl`.
//!
//! This crate sits between the flag mapper in `labctl-core` and whatever
//! performs the actual call:
//!
//! - [`options`] holds one payload type per API call.
//! - [`PreparedRequest`] turns a payload into method, path, query and body.
//! - [`Transport`] sends a prepared request; [`EchoTransport`] prints it.
//! - [`ClientConfig`] says which server to talk to.
//!
//! # Quick start
//!
//! ```
//! use labctl_api::*;
//!
//! let options = ForkProjectOptions { namespace: Some("team".into()) };
//! let request = PreparedRequest::post(format!("{}/fork", project_path("group/app")))
//!     .with_body(&options)
//!     .unwrap();
//!
//! let response = EchoTransport::new(&ClientConfig::default()).send(&request).unwrap();
//! assert_eq!(response["url"], "https://gitlab.com/api/v4/projects/group%2Fapp/fork");
//! assert_eq!(response["body"]["namespace"], "team");
//! ```

mod config;
mod error;
pub mod options;
mod request;
mod transport;

pub use config::{API_PREFIX, CONFIG_ENV, ClientConfig, DEFAULT_URL, TOKEN_ENV, URL_ENV};
pub use error::{ApiError, Result};
pub use options::*;
pub use request::{Method, PreparedRequest, project_path, segment};
pub use transport::{EchoTransport, Transport};
