use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::multistatus::Multistatus;

/// WebDAV verbs issued by this crate
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    GET,
    PUT,
    DELETE,
    PROPFIND,
    MKCOL,
    MOVE,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::PROPFIND => "PROPFIND",
            Method::MKCOL => "MKCOL",
            Method::MOVE => "MOVE",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<Method> for http::Method {
    type Error = Error;

    fn try_from(method: Method) -> Result<Self, Self::Error> {
        match method {
            Method::GET => Ok(http::Method::GET),
            Method::PUT => Ok(http::Method::PUT),
            Method::DELETE => Ok(http::Method::DELETE),
            // Extension verbs have no associated constant
            other => http::Method::from_bytes(other.as_str().as_bytes()).map_err(|_| {
                Error::InvalidMethod {
                    method: other.as_str().to_string(),
                }
            }),
        }
    }
}

/// How the response body should be interpreted
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    #[default]
    Text,
    Xml,
}

/// A WebDAV request ready to be handed to a [`Transport`](crate::transport::Transport)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DavRequest {
    pub method: Method,

    /// Absolute URL of the target resource
    pub url: String,

    /// Extra headers, sent after the mandatory content type
    pub headers: HashMap<String, String>,

    pub body: Option<Vec<u8>>,

    pub expect: ResponseType,

    /// Attach the executor's credentials to this request
    pub with_credentials: bool,
}

impl DavRequest {
    pub fn new(method: Method, url: impl Into<String>, expect: ResponseType) -> Self {
        Self {
            method,
            url: url.into(),
            expect,
            ..Default::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_credentials(mut self, with_credentials: bool) -> Self {
        self.with_credentials = with_credentials;
        self
    }
}

/// Response as received from an executor, before interpretation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        let status_text = http::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Unknown")
            .to_string();

        Self {
            status,
            status_text,
            headers: HashMap::new(),
            body: body.into(),
        }
    }
}

/// Interpreted response body
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Text(String),
    Xml(Multistatus),
}

/// A response whose body has been interpreted according to the requested
/// [`ResponseType`]
#[derive(Debug, Clone, PartialEq)]
pub struct DavResponse {
    pub method: Method,
    pub url: String,
    pub status: u16,
    pub status_text: String,
    pub headers: HashMap<String, String>,

    /// `None` when the server returned no content
    pub body: Option<Payload>,
}

impl DavResponse {
    /// Check if the response status indicates success (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }

    /// Body as text. XML payloads are not re-serialized.
    pub fn text(&self) -> Option<&str> {
        match &self.body {
            Some(Payload::Text(text)) => Some(text),
            _ => None,
        }
    }

    pub fn multistatus(&self) -> Option<&Multistatus> {
        match &self.body {
            Some(Payload::Xml(doc)) => Some(doc),
            _ => None,
        }
    }

    pub fn into_multistatus(self) -> Option<Multistatus> {
        match self.body {
            Some(Payload::Xml(doc)) => Some(doc),
            _ => None,
        }
    }

    /// Turn a non-2xx status into an error
    pub fn error_for_status(self) -> Result<Self, Error> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(Error::UnexpectedStatus {
                method: self.method.to_string(),
                url: self.url,
                status: self.status,
            })
        }
    }
}
