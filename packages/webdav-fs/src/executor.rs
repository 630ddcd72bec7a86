//! Request execution abstraction for testing.
//!
//! This module provides a trait for executing WebDAV requests that can be
//! mocked in tests, avoiding the need for actual network calls.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::config::Credentials;
use crate::error::Error;
use crate::types::{DavRequest, RawResponse};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Trait for executing WebDAV requests.
///
/// Implementations send the request exactly as given and report whatever
/// status came back. Only failures to obtain a response are errors.
pub trait DavExecutor: Send + Sync {
    fn execute(&self, request: &DavRequest) -> Result<RawResponse, Error>;
}

/// Production executor using reqwest's blocking client.
pub struct ReqwestExecutor {
    client: Client,
    credentials: Option<Credentials>,
}

impl ReqwestExecutor {
    /// Create a new executor with the given timeout.
    pub fn new(timeout: Duration) -> Result<Self, Error> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            credentials: None,
        })
    }

    /// Create with default timeout of 30 seconds.
    pub fn with_default_timeout() -> Result<Self, Error> {
        Self::new(DEFAULT_TIMEOUT)
    }

    /// Create an executor around an existing reqwest client
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            credentials: None,
        }
    }

    /// Credentials attached to requests that ask for them
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }
}

impl DavExecutor for ReqwestExecutor {
    fn execute(&self, request: &DavRequest) -> Result<RawResponse, Error> {
        let method: http::Method = request.method.try_into()?;

        let mut headers = HeaderMap::new();
        for (name, value) in &request.headers {
            let header_name = HeaderName::try_from(name.as_str())?;
            let header_value = HeaderValue::try_from(value.as_str())?;
            headers.insert(header_name, header_value);
        }

        let mut req_builder = self.client.request(method, &request.url);
        req_builder = req_builder.headers(headers);

        if request.with_credentials {
            if let Some(credentials) = &self.credentials {
                req_builder =
                    req_builder.basic_auth(&credentials.username, Some(&credentials.password));
            }
        }

        if let Some(body) = &request.body {
            req_builder = req_builder.body(body.clone());
        }

        let response = req_builder.send()?;

        let status = response.status().as_u16();
        let status_text = response
            .status()
            .canonical_reason()
            .unwrap_or("Unknown")
            .to_string();

        let mut resp_headers = HashMap::new();
        for (name, value) in response.headers() {
            if let Ok(v) = value.to_str() {
                resp_headers.insert(name.to_string(), v.to_string());
            }
        }

        let body = response.text()?;

        Ok(RawResponse {
            status,
            status_text,
            headers: resp_headers,
            body,
        })
    }
}

/// Mock executor for testing.
///
/// Returns predefined responses keyed by verb and URL.
#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::{Arc, Mutex};

    use crate::types::Method;

    /// A mock executor that returns predefined responses.
    #[derive(Clone, Default)]
    pub struct MockExecutor {
        responses: Arc<Mutex<HashMap<(Method, String), RawResponse>>>,
        recorded_requests: Arc<Mutex<Vec<DavRequest>>>,
        error_message: Arc<Mutex<Option<String>>>,
    }

    impl MockExecutor {
        pub fn new() -> Self {
            Self::default()
        }

        /// Add a response for a verb on a URL.
        pub fn with_response(
            self,
            method: Method,
            url: impl Into<String>,
            response: RawResponse,
        ) -> Self {
            self.responses
                .lock()
                .unwrap()
                .insert((method, url.into()), response);
            self
        }

        /// Configure to fail all requests with an error.
        pub fn fail_with(self, message: impl Into<String>) -> Self {
            *self.error_message.lock().unwrap() = Some(message.into());
            self
        }

        pub fn recorded_requests(&self) -> Vec<DavRequest> {
            self.recorded_requests.lock().unwrap().clone()
        }

        /// A 207 response carrying the given multistatus document.
        pub fn multistatus(xml: &str) -> RawResponse {
            RawResponse::new(207, xml)
        }

        pub fn not_found() -> RawResponse {
            RawResponse::new(404, "")
        }
    }

    impl DavExecutor for MockExecutor {
        fn execute(&self, request: &DavRequest) -> Result<RawResponse, Error> {
            self.recorded_requests.lock().unwrap().push(request.clone());

            if let Some(message) = self.error_message.lock().unwrap().clone() {
                return Err(Error::Transport { message });
            }

            let responses = self.responses.lock().unwrap();
            if let Some(response) = responses.get(&(request.method, request.url.clone())) {
                return Ok(response.clone());
            }

            Ok(Self::not_found())
        }
    }
}
