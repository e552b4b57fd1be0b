//! Prepared API requests.
//!
//! A [`PreparedRequest`] is everything needed to perform one API call:
//! method, path below the API prefix, query pairs, an optional JSON body and
//! an optional file to send as a multipart upload. Options values become
//! query pairs with [`PreparedRequest::with_query`] or a body with
//! [`PreparedRequest::with_body`].
//!
//! # Example
//!
//! ```
//! use labctl_api::{ListProjectsOptions, Method, PreparedRequest};
//!
//! let options = ListProjectsOptions { owned: Some(true), ..Default::default() };
//! let request = PreparedRequest::get("/projects").with_query(&options).unwrap();
//!
//! assert_eq!(request.method, Method::Get);
//! assert_eq!(request.url("https://gitlab.com"), "https://gitlab.com/api/v4/projects?owned=true");
//! ```

use std::fmt;
use std::path::PathBuf;
use std::{fs, io};

use serde::Serialize;
use serde_json::Value;

use crate::config::API_PREFIX;
use crate::error::{ApiError, Result};

/// HTTP method of a prepared request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One API call, ready to hand to a [`Transport`](crate::Transport).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreparedRequest {
    pub method: Method,
    /// Path below the API prefix, starting with `/`.
    pub path: String,
    pub query: Vec<(String, String)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    /// Local file sent as the `file` part of a multipart body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload: Option<PathBuf>,
}

impl PreparedRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            upload: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Appends the fields of `options` as query pairs.
    ///
    /// Scalars become `key=value`, arrays become one `key[]=element` pair
    /// per element, and null fields are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidOptions`] if `options` does not serialize
    /// to a flat JSON object.
    pub fn with_query<T: Serialize>(mut self, options: &T) -> Result<Self> {
        let Value::Object(fields) = serde_json::to_value(options)? else {
            return Err(ApiError::InvalidOptions(self.path));
        };
        for (key, value) in fields {
            match value {
                Value::Null => {}
                Value::Array(elements) => {
                    for element in elements {
                        let element = scalar(&self.path, element)?;
                        self.query.push((format!("{key}[]"), element));
                    }
                }
                other => {
                    let other = scalar(&self.path, other)?;
                    self.query.push((key, other));
                }
            }
        }
        Ok(self)
    }

    /// Adds a single query pair.
    pub fn with_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Stores `options` as the JSON body.
    pub fn with_body<T: Serialize>(mut self, options: &T) -> Result<Self> {
        self.body = Some(serde_json::to_value(options)?);
        Ok(self)
    }

    /// Attaches a local file for upload.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Upload`] if `path` cannot be read or is not a
    /// regular file.
    pub fn with_upload(mut self, path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        match fs::metadata(&path) {
            Ok(metadata) if metadata.is_file() => {}
            Ok(_) => {
                let source = io::Error::new(io::ErrorKind::InvalidInput, "not a regular file");
                return Err(ApiError::Upload { path, source });
            }
            Err(source) => return Err(ApiError::Upload { path, source }),
        }
        self.upload = Some(path);
        Ok(self)
    }

    /// Percent-encoded query string without the leading `?`.
    pub fn query_string(&self) -> String {
        self.query
            .iter()
            .map(|(key, value)| format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Full URL for this request against server `base`.
    pub fn url(&self, base: &str) -> String {
        let mut url = format!("{}{API_PREFIX}{}", base.trim().trim_end_matches('/'), self.path);
        if !self.query.is_empty() {
            url.push('?');
            url.push_str(&self.query_string());
        }
        url
    }
}

/// `/projects/<id>` with a numeric ID or an encoded `namespace/project` path.
///
/// # Examples
///
/// ```
/// use labctl_api::project_path;
///
/// assert_eq!(project_path("42"), "/projects/42");
/// assert_eq!(project_path("group/sub/app"), "/projects/group%2Fsub%2Fapp");
/// ```
pub fn project_path(id: &str) -> String {
    format!("/projects/{}", urlencoding::encode(id.trim()))
}

/// Encodes one path segment such as a branch name.
pub fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

fn scalar(path: &str, value: Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(ApiError::InvalidOptions(path.to_string())),
    }
}
