//! Fixed bindings of WebDAV verbs onto [`DavRequest`].
//!
//! | Operation  | Verb     | Extra headers          | Body    | Expected |
//! |------------|----------|------------------------|---------|----------|
//! | `get`      | GET      |                        |         | text     |
//! | `propfind` | PROPFIND | `Depth: 1`             |         | xml      |
//! | `mkcol`    | MKCOL    |                        |         | text     |
//! | `delete`   | DELETE   |                        |         | text     |
//! | `put`      | PUT      |                        | payload | text     |
//! | `move_to`  | MOVE     | `Destination: <url>`   |         | text     |

use crate::types::{DavRequest, Method, ResponseType};

pub const DEPTH_HEADER: &str = "Depth";
pub const DESTINATION_HEADER: &str = "Destination";

/// PROPFIND never recurses past immediate children.
pub const PROPFIND_DEPTH: &str = "1";

impl DavRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url, ResponseType::Text)
    }

    pub fn propfind(url: impl Into<String>) -> Self {
        Self::new(Method::PROPFIND, url, ResponseType::Xml)
            .with_header(DEPTH_HEADER, PROPFIND_DEPTH)
    }

    pub fn mkcol(url: impl Into<String>) -> Self {
        Self::new(Method::MKCOL, url, ResponseType::Text)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::DELETE, url, ResponseType::Text)
    }

    pub fn put(url: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self::new(Method::PUT, url, ResponseType::Text).with_body(data)
    }

    pub fn move_to(url: impl Into<String>, destination: impl Into<String>) -> Self {
        Self::new(Method::MOVE, url, ResponseType::Text)
            .with_header(DESTINATION_HEADER, destination)
    }
}
