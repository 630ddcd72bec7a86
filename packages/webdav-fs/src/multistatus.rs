//! PROPFIND multistatus documents.
//!
//! The document is deserialized into a typed model first; elements are
//! matched by local name, so whichever prefix the server binds to `DAV:` is
//! accepted. The functions below then interpret that model:
//!
//! - [`parse_properties`] reads one `prop` block,
//! - [`resolve_existence`] decides whether the queried resource exists,
//! - [`extract_children`] turns every response after the first into an
//!   [`Entity`].

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::entity::{Entity, ResourceKind, ResourceProps};
use crate::error::Error;
use crate::fs::Fs;

const NOT_FOUND_MARKER: &str = "404 not found";

#[derive(Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Multistatus {
    pub response: Vec<PropfindResponse>,
}

impl Multistatus {
    pub fn from_xml(xml: &str) -> Result<Self, Error> {
        Ok(quick_xml::de::from_str(xml)?)
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct PropfindResponse {
    pub href: String,
    pub propstat: Vec<Propstat>,

    /// Some servers report a missing resource here instead of in a propstat
    pub status: Option<String>,
}

impl PropfindResponse {
    /// Status line of the first propstat, or of the response itself
    pub fn status_line(&self) -> Option<&str> {
        self.propstat
            .first()
            .map(|propstat| propstat.status.as_str())
            .or(self.status.as_deref())
    }

    pub fn prop(&self) -> Option<&Prop> {
        self.propstat.first().map(|propstat| &propstat.prop)
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Propstat {
    pub status: String,
    pub prop: Prop,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Prop {
    pub resourcetype: Option<ResourceType>,
    pub getcontentlength: Option<String>,
    pub getlastmodified: Option<String>,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct ResourceType {
    pub collection: Option<Collection>,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Collection {}

/// Read type, size and modification time from a `prop` block.
///
/// A block without `resourcetype` means the server is not speaking the
/// protocol we expect, and is reported as [`Error::MalformedResponse`].
pub fn parse_properties(prop: &Prop) -> Result<ResourceProps, Error> {
    let resourcetype = prop
        .resourcetype
        .as_ref()
        .ok_or_else(|| Error::malformed("prop block has no resourcetype"))?;

    let kind = if resourcetype.collection.is_some() {
        ResourceKind::Dir
    } else {
        ResourceKind::File
    };

    let size = match non_empty(prop.getcontentlength.as_deref()) {
        Some(length) => Some(length.parse::<u64>().map_err(|e| {
            Error::malformed(format!("invalid getcontentlength '{length}': {e}"))
        })?),
        None => None,
    };

    let modified = match non_empty(prop.getlastmodified.as_deref()) {
        Some(date) => Some(parse_http_date(date)?),
        None => None,
    };

    Ok(ResourceProps {
        kind,
        size,
        modified,
    })
}

/// Decide from the first response whether the queried resource exists.
///
/// Returns `None` when its status line carries "404 Not Found" (any case),
/// otherwise the parsed properties.
pub fn resolve_existence(doc: &Multistatus) -> Result<Option<ResourceProps>, Error> {
    let response = doc
        .response
        .first()
        .ok_or_else(|| Error::malformed("multistatus has no response"))?;

    let status = response
        .status_line()
        .ok_or_else(|| Error::malformed(format!("no status for {}", response.href)))?;

    if status.to_lowercase().contains(NOT_FOUND_MARKER) {
        return Ok(None);
    }

    let prop = response
        .prop()
        .ok_or_else(|| Error::malformed(format!("no propstat for {}", response.href)))?;

    parse_properties(prop).map(Some)
}

/// Build entities for every response after the first, in document order.
///
/// The first response always describes the queried collection itself. A
/// document with no responses at all means the collection does not exist.
pub fn extract_children(fs: &Fs, doc: &Multistatus, url: &str) -> Result<Vec<Entity>, Error> {
    if doc.response.is_empty() {
        return Err(Error::NoSuchDirectory {
            url: url.to_string(),
        });
    }

    doc.response
        .iter()
        .skip(1)
        .map(|response| {
            let href = response.href.trim();
            let href = href.strip_suffix('/').unwrap_or(href);
            let prop = response
                .prop()
                .ok_or_else(|| Error::malformed(format!("no propstat for {href}")))?;
            let props = parse_properties(prop)?;
            Ok(fs.entity_with_properties(href, props))
        })
        .collect()
}

/// Parse a `getlastmodified` value.
///
/// RFC 4918 mandates the RFC 1123 format; some servers send RFC 3339.
pub fn parse_http_date(value: &str) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc2822(value)
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .map(|date| date.with_timezone(&Utc))
        .map_err(|e| Error::malformed(format!("invalid getlastmodified '{value}': {e}")))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
