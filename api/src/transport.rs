//! Request transports.
//!
//! The [`Transport`] trait is the seam between request preparation and the
//! network. [`EchoTransport`] performs no I/O and answers every request with
//! a JSON rendering of it.

use serde_json::{Value, json};
use tracing::info;

use crate::config::ClientConfig;
use crate::error::Result;
use crate::request::PreparedRequest;

/// Sends prepared requests and returns the decoded response.
pub trait Transport {
    fn send(&self, request: &PreparedRequest) -> Result<Value>;
}

/// Transport that echoes the request back instead of sending it.
///
/// # Examples
///
/// ```
/// use labctl_api::{ClientConfig, EchoTransport, PreparedRequest, Transport};
///
/// let transport = EchoTransport::new(&ClientConfig::default());
/// let response = transport.send(&PreparedRequest::delete("/projects/7")).unwrap();
/// assert_eq!(response["method"], "DELETE");
/// assert_eq!(response["url"], "https://gitlab.com/api/v4/projects/7");
/// ```
#[derive(Debug, Clone)]
pub struct EchoTransport {
    base_url: String,
    authenticated: bool,
}

impl EchoTransport {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            base_url: config.url.clone(),
            authenticated: config.token.is_some(),
        }
    }
}

impl Transport for EchoTransport {
    fn send(&self, request: &PreparedRequest) -> Result<Value> {
        let url = request.url(&self.base_url);
        info!(method = %request.method, url = %url, "Prepared request");

        let query: Vec<Value> = request
            .query
            .iter()
            .map(|(key, value)| json!([key, value]))
            .collect();
        let mut rendered = json!({
            "method": request.method,
            "url": url,
            "path": request.path,
            "query": query,
            "authenticated": self.authenticated,
        });
        if let Some(body) = &request.body {
            rendered["body"] = body.clone();
        }
        if let Some(upload) = &request.upload {
            rendered["file"] = json!(upload.display().to_string());
        }
        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_echo_never_leaks_token() {
        let config = ClientConfig {
            url: "https://git.example.com".into(),
            token: Some("glpat-secret".into()),
        };
        let request = PreparedRequest::post("/projects")
            .with_body(&json!({"name": "demo"}))
            .unwrap();
        let response = EchoTransport::new(&config).send(&request).unwrap();

        assert_eq!(response["authenticated"], true);
        assert_eq!(response["body"]["name"], "demo");
        assert!(!response.to_string().contains("glpat-secret"));
    }

    #[test]
    fn test_echo_names_uploaded_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("notes.txt");
        std::fs::write(&file, "hello").unwrap();

        let request = PreparedRequest::post("/projects/7/uploads").with_upload(&file).unwrap();
        let response = EchoTransport::new(&ClientConfig::default()).send(&request).unwrap();
        assert_eq!(response["file"], file.display().to_string());
        assert!(response.get("body").is_none());
    }

    #[test]
    fn test_echo_renders_query_pairs() {
        let request = PreparedRequest::get("/users").with_param("username", "jdoe");
        let response = EchoTransport::new(&ClientConfig::default()).send(&request).unwrap();
        assert_eq!(response["query"], json!([["username", "jdoe"]]));
        assert_eq!(response["url"], "https://gitlab.com/api/v4/users?username=jdoe");
        assert!(response.get("body").is_none());
    }
}
