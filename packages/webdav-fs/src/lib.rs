//! # webdav-fs
//!
//! A small client-side file abstraction over a remote WebDAV store.
//!
//! ## Layers
//!
//! - [`Transport`] sends a [`DavRequest`] through a [`DavExecutor`] and
//!   interprets the body as text or as a multistatus document.
//! - [`verbs`] fixes the verb, headers and expected body for GET, PUT,
//!   DELETE, MKCOL, MOVE and PROPFIND (always `Depth: 1`).
//! - [`multistatus`] turns PROPFIND responses into typed properties and
//!   child entities.
//! - [`Entity`] is one remote file or directory; [`Fs`] is the store root
//!   that creates them.
//!
//! ## Example
//!
//! ```ignore
//! use webdav_fs::Fs;
//!
//! let fs = Fs::new("https://example.com/dav/")?;
//!
//! let notes = fs.file("notes.txt");
//! notes.write("hello")?;
//! notes.query_properties()?;
//! assert_eq!(notes.size(), Some(5));
//!
//! for child in fs.dir("photos").list_children()? {
//!     println!("{} {:?}", child.name(), child.kind());
//! }
//! ```
//!
//! ## Background requests
//!
//! Every entity operation has an `_async` form that runs on a background
//! thread and returns a [`RequestHandle`]:
//!
//! ```ignore
//! let handle = fs.file("notes.txt").read_async();
//! handle.on_complete(|result| match result {
//!     Ok(response) => println!("{} {:?}", response.status, response.text()),
//!     Err(e) => eprintln!("request failed: {e}"),
//! });
//! ```

pub mod config;
pub mod entity;
pub mod error;
pub mod executor;
pub mod fs;
pub mod handle;
pub mod multistatus;
pub mod transport;
pub mod types;
pub mod verbs;

// Re-export main types
pub use config::{Credentials, FsConfig};
pub use entity::{Entity, Properties, ResourceKind, ResourceProps};
pub use error::Error;
pub use executor::{DavExecutor, ReqwestExecutor};
pub use fs::{name_for, Fs};
pub use handle::{RequestHandle, RequestState};
pub use multistatus::Multistatus;
pub use transport::Transport;
pub use types::{DavRequest, DavResponse, Method, Payload, RawResponse, ResponseType};
