//! Remote resources.
//!
//! An [`Entity`] is a file or directory on the store, addressed by an href
//! relative to its [`Fs`]. Its properties are only known after a
//! `PROPFIND`; until then an entity carries at most the kind it was created
//! with.
//!
//! Every operation comes in two forms: a blocking one returning the result
//! directly, and an `_async` one returning a [`RequestHandle`] that completes
//! exactly once.
//!
//! Moving or renaming does not update the entity: its href, url and name keep
//! pointing at the old location. Build a new entity for the destination.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::error::Error;
use crate::fs::Fs;
use crate::handle::RequestHandle;
use crate::multistatus::{extract_children, resolve_existence};
use crate::types::{DavRequest, DavResponse, Payload};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    #[default]
    Unknown,
    File,
    Dir,
}

/// Properties reported by the server for an existing resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceProps {
    pub kind: ResourceKind,

    /// Byte length, when reported
    pub size: Option<u64>,

    pub modified: Option<DateTime<Utc>>,
}

/// What is known about an entity's properties.
///
/// Each completed property query replaces the whole value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Properties {
    /// No query has completed. The kind comes from the factory that made the entity.
    Unqueried { kind: ResourceKind },
    /// The server reported the resource as not found.
    Missing { kind: ResourceKind },
    Present(ResourceProps),
}

impl Properties {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Properties::Unqueried { kind } | Properties::Missing { kind } => *kind,
            Properties::Present(props) => props.kind,
        }
    }

    /// `None` until a query has completed
    pub fn exists(&self) -> Option<bool> {
        match self {
            Properties::Unqueried { .. } => None,
            Properties::Missing { .. } => Some(false),
            Properties::Present(_) => Some(true),
        }
    }

    pub fn size(&self) -> Option<u64> {
        match self {
            Properties::Present(props) => props.size,
            _ => None,
        }
    }

    pub fn modified(&self) -> Option<DateTime<Utc>> {
        match self {
            Properties::Present(props) => props.modified,
            _ => None,
        }
    }
}

struct Inner {
    fs: Fs,
    href: String,
    url: String,
    name: String,
    properties: Mutex<Properties>,
}

/// A file or directory on a WebDAV store.
///
/// Clones share the same property state.
#[derive(Clone)]
pub struct Entity {
    inner: Arc<Inner>,
}

impl Entity {
    pub(crate) fn new(fs: &Fs, href: &str, properties: Properties) -> Self {
        let url = fs.resolve_url(href);
        let name = fs.name_for(&url).to_string();

        Self {
            inner: Arc::new(Inner {
                fs: fs.clone(),
                href: href.to_string(),
                url,
                name,
                properties: Mutex::new(properties),
            }),
        }
    }

    pub fn href(&self) -> &str {
        &self.inner.href
    }

    pub fn url(&self) -> &str {
        &self.inner.url
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Snapshot of the current property state
    pub fn properties(&self) -> Properties {
        self.lock_properties().clone()
    }

    pub fn kind(&self) -> ResourceKind {
        self.lock_properties().kind()
    }

    pub fn exists(&self) -> Option<bool> {
        self.lock_properties().exists()
    }

    pub fn size(&self) -> Option<u64> {
        self.lock_properties().size()
    }

    pub fn modified(&self) -> Option<DateTime<Utc>> {
        self.lock_properties().modified()
    }

    pub fn is_dir(&self) -> bool {
        self.kind() == ResourceKind::Dir
    }

    /// Fetch the content.
    pub fn read(&self) -> Result<DavResponse, Error> {
        self.inner.fs.send(DavRequest::get(self.url()))
    }

    pub fn read_async(&self) -> RequestHandle<DavResponse> {
        let this = self.clone();
        RequestHandle::spawn(move || this.read())
    }

    /// Replace the content. Properties are not refreshed.
    pub fn write(&self, data: impl Into<Vec<u8>>) -> Result<DavResponse, Error> {
        self.inner.fs.send(DavRequest::put(self.url(), data))
    }

    pub fn write_async(&self, data: impl Into<Vec<u8>>) -> RequestHandle<DavResponse> {
        let this = self.clone();
        let data = data.into();
        RequestHandle::spawn(move || this.write(data))
    }

    pub fn remove(&self) -> Result<DavResponse, Error> {
        self.inner.fs.send(DavRequest::delete(self.url()))
    }

    pub fn remove_async(&self) -> RequestHandle<DavResponse> {
        let this = self.clone();
        RequestHandle::spawn(move || this.remove())
    }

    /// Move to `new_href`, resolved against the owning store.
    ///
    /// The `Destination` header carries the percent-encoded form of the
    /// resolved URL, matching how the request line is sent.
    pub fn move_to(&self, new_href: &str) -> Result<DavResponse, Error> {
        let destination = Url::parse(&self.inner.fs.resolve_url(new_href))?.to_string();
        self.inner
            .fs
            .send(DavRequest::move_to(self.url(), destination))
    }

    pub fn move_to_async(&self, new_href: &str) -> RequestHandle<DavResponse> {
        let this = self.clone();
        let new_href = new_href.to_string();
        RequestHandle::spawn(move || this.move_to(&new_href))
    }

    /// Move within the same parent, replacing the last href segment.
    pub fn rename_to(&self, new_name: &str) -> Result<DavResponse, Error> {
        self.move_to(&self.sibling_href(new_name))
    }

    pub fn rename_to_async(&self, new_name: &str) -> RequestHandle<DavResponse> {
        self.move_to_async(&self.sibling_href(new_name))
    }

    fn sibling_href(&self, new_name: &str) -> String {
        let href = self.href();
        let parent = match href.rfind('/') {
            Some(index) => &href[..=index],
            None => "",
        };
        format!("{parent}{new_name}")
    }

    /// Query the server and replace this entity's properties with the result.
    ///
    /// A 404, either as the HTTP status or inside the multistatus, is a valid
    /// outcome and leaves the entity marked as missing. Any failure leaves the
    /// previous properties untouched.
    pub fn query_properties(&self) -> Result<(), Error> {
        let found = self.fetch_properties().inspect_err(|e| {
            warn!(url = %self.url(), error = %e, "property query failed");
        })?;

        let mut properties = self.lock_properties();
        let kind = properties.kind();
        *properties = match found {
            Some(props) => Properties::Present(props),
            None => Properties::Missing { kind },
        };

        debug!(url = %self.url(), properties = ?*properties, "properties updated");
        Ok(())
    }

    fn fetch_properties(&self) -> Result<Option<ResourceProps>, Error> {
        let response = self.inner.fs.send(DavRequest::propfind(self.url()))?;

        match response.multistatus() {
            Some(doc) if !doc.response.is_empty() => resolve_existence(doc),
            _ if response.is_not_found() => Ok(None),
            _ => Err(unusable_response(response)),
        }
    }

    pub fn query_properties_async(&self) -> RequestHandle<()> {
        let this = self.clone();
        RequestHandle::spawn(move || this.query_properties())
    }

    /// List the immediate children of a directory, in server order.
    ///
    /// Fails without touching the network if this entity is not a directory.
    pub fn list_children(&self) -> Result<Vec<Entity>, Error> {
        self.require_dir("list_children")?;
        self.fetch_children()
    }

    pub fn list_children_async(&self) -> Result<RequestHandle<Vec<Entity>>, Error> {
        self.require_dir("list_children")?;
        let this = self.clone();
        Ok(RequestHandle::spawn(move || this.fetch_children()))
    }

    fn fetch_children(&self) -> Result<Vec<Entity>, Error> {
        let response = self.inner.fs.send(DavRequest::propfind(self.url()))?;

        match response.multistatus() {
            Some(doc) if !doc.response.is_empty() => {
                if resolve_existence(doc)?.is_none() {
                    return Err(self.no_such_directory());
                }
                extract_children(&self.inner.fs, doc, self.url())
            }
            Some(_) => Err(self.no_such_directory()),
            None if response.is_not_found() => Err(self.no_such_directory()),
            None => Err(unusable_response(response)),
        }
    }

    /// Create this directory on the server.
    ///
    /// Fails without touching the network if this entity is not a directory.
    pub fn create_dir(&self) -> Result<DavResponse, Error> {
        self.require_dir("create_dir")?;
        self.inner.fs.send(DavRequest::mkcol(self.url()))
    }

    pub fn create_dir_async(&self) -> Result<RequestHandle<DavResponse>, Error> {
        self.require_dir("create_dir")?;
        let this = self.clone();
        Ok(RequestHandle::spawn(move || {
            this.inner.fs.send(DavRequest::mkcol(this.url()))
        }))
    }

    fn require_dir(&self, operation: &'static str) -> Result<(), Error> {
        if self.is_dir() {
            Ok(())
        } else {
            Err(Error::NotADirectory {
                operation,
                href: self.href().to_string(),
            })
        }
    }

    fn no_such_directory(&self) -> Error {
        Error::NoSuchDirectory {
            url: self.url().to_string(),
        }
    }

    fn lock_properties(&self) -> MutexGuard<'_, Properties> {
        self.inner
            .properties
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn unusable_response(response: DavResponse) -> Error {
    if !response.is_success() {
        return Error::UnexpectedStatus {
            method: response.method.to_string(),
            url: response.url,
            status: response.status,
        };
    }

    match response.body {
        Some(Payload::Text(_)) => {
            Error::malformed("PROPFIND response is not a multistatus document")
        }
        Some(Payload::Xml(_)) => Error::malformed("multistatus has no response"),
        None => Error::malformed("PROPFIND response has no body"),
    }
}

impl std::fmt::Debug for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entity")
            .field("href", &self.inner.href)
            .field("url", &self.inner.url)
            .field("name", &self.inner.name)
            .field("properties", &*self.lock_properties())
            .finish()
    }
}
