//! Request transport.
//!
//! Adds the headers every request carries, hands the request to a
//! [`DavExecutor`] and interprets the body according to the requested
//! [`ResponseType`]. Status codes are passed through untouched; nothing here
//! retries or classifies failures.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::Error;
use crate::executor::{DavExecutor, ReqwestExecutor};
use crate::handle::RequestHandle;
use crate::multistatus::Multistatus;
use crate::types::{DavRequest, DavResponse, Payload, RawResponse, ResponseType};

pub const CONTENT_TYPE_HEADER: &str = "Content-Type";

/// Sent on every request regardless of verb, for compatibility with
/// existing servers.
pub const CONTENT_TYPE: &str = "text/xml; charset=UTF-8";

#[derive(Clone)]
pub struct Transport {
    executor: Arc<dyn DavExecutor>,
}

impl Transport {
    pub fn new(executor: impl DavExecutor + 'static) -> Self {
        Self {
            executor: Arc::new(executor),
        }
    }

    pub fn from_shared(executor: Arc<dyn DavExecutor>) -> Self {
        Self { executor }
    }

    /// Transport backed by reqwest with the default timeout
    pub fn reqwest() -> Result<Self, Error> {
        Ok(Self::new(ReqwestExecutor::with_default_timeout()?))
    }

    /// Send a request and block until the response is in.
    pub fn send(&self, request: DavRequest) -> Result<DavResponse, Error> {
        let request = prepare(request);

        debug!(
            method = %request.method,
            url = %request.url,
            with_credentials = request.with_credentials,
            "sending WebDAV request"
        );

        let raw = self.executor.execute(&request)?;
        let response = interpret(&request, raw);

        debug!(
            method = %response.method,
            url = %response.url,
            status = response.status,
            "received WebDAV response"
        );

        Ok(response)
    }

    /// Send a request on a background thread.
    pub fn spawn(&self, request: DavRequest) -> RequestHandle<DavResponse> {
        let transport = self.clone();
        RequestHandle::spawn(move || transport.send(request))
    }
}

fn prepare(mut request: DavRequest) -> DavRequest {
    request
        .headers
        .retain(|name, _| !name.eq_ignore_ascii_case(CONTENT_TYPE_HEADER));
    request
        .headers
        .insert(CONTENT_TYPE_HEADER.to_string(), CONTENT_TYPE.to_string());
    request
}

fn interpret(request: &DavRequest, raw: RawResponse) -> DavResponse {
    let body = match request.expect {
        ResponseType::Text if raw.body.is_empty() => None,
        ResponseType::Text => Some(Payload::Text(raw.body)),
        ResponseType::Xml if raw.body.trim().is_empty() => None,
        ResponseType::Xml => match Multistatus::from_xml(&raw.body) {
            Ok(doc) => Some(Payload::Xml(doc)),
            Err(e) => {
                warn!(url = %request.url, error = %e, "response is not a multistatus document");
                Some(Payload::Text(raw.body))
            }
        },
    };

    DavResponse {
        method: request.method,
        url: request.url.clone(),
        status: raw.status,
        status_text: raw.status_text,
        headers: raw.headers,
        body,
    }
}
