//! Store roots.
//!
//! An [`Fs`] binds a root URL and a credential policy, and creates
//! [`Entity`] values addressed relative to that root. Entities keep their own
//! copy of the root, so changing the policy only affects entities created
//! afterwards.

use std::sync::Arc;

use url::Url;

use crate::config::FsConfig;
use crate::entity::{Entity, Properties, ResourceKind, ResourceProps};
use crate::error::Error;
use crate::executor::{DavExecutor, ReqwestExecutor};
use crate::transport::Transport;
use crate::types::{DavRequest, DavResponse};

#[derive(Clone)]
pub struct Fs {
    root_url: String,
    root: Url,
    use_credentials: bool,
    transport: Transport,
}

impl Fs {
    /// Create a store root backed by reqwest with default settings
    pub fn new(root_url: &str) -> Result<Self, Error> {
        Self::with_transport(root_url, Transport::reqwest()?)
    }

    pub fn from_config(config: FsConfig) -> Result<Self, Error> {
        let mut executor = ReqwestExecutor::new(config.timeout())?;
        if let Some(credentials) = config.credentials {
            executor = executor.with_credentials(credentials);
        }

        let mut fs = Self::with_executor(&config.root_url, executor)?;
        fs.use_credentials = config.use_credentials;
        Ok(fs)
    }

    pub fn with_executor(root_url: &str, executor: impl DavExecutor + 'static) -> Result<Self, Error> {
        Self::with_transport(root_url, Transport::new(executor))
    }

    pub fn with_shared_executor(
        root_url: &str,
        executor: Arc<dyn DavExecutor>,
    ) -> Result<Self, Error> {
        Self::with_transport(root_url, Transport::from_shared(executor))
    }

    pub fn with_transport(root_url: &str, transport: Transport) -> Result<Self, Error> {
        let root = Url::parse(root_url)?;
        if !matches!(root.scheme(), "http" | "https") {
            return Err(Error::InvalidUrl {
                message: format!("root URL must be http or https: {root_url}"),
            });
        }

        Ok(Self {
            root_url: root_url.to_string(),
            root,
            use_credentials: false,
            transport,
        })
    }

    pub fn root_url(&self) -> &str {
        &self.root_url
    }

    pub fn use_credentials(&self) -> bool {
        self.use_credentials
    }

    pub fn set_use_credentials(&mut self, use_credentials: bool) {
        self.use_credentials = use_credentials;
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// An entity known to be a file.
    ///
    /// An href with a leading `/` that falls under the root's own path is
    /// taken as a server path, see [`Fs::resolve_url`].
    pub fn file(&self, href: &str) -> Entity {
        self.entity_of_kind(href, ResourceKind::File)
    }

    /// An entity known to be a directory.
    ///
    /// Hrefs resolve the same way as for [`Fs::file`].
    pub fn dir(&self, href: &str) -> Entity {
        self.entity_of_kind(href, ResourceKind::Dir)
    }

    /// An entity whose kind is learned from a property query
    pub fn entity(&self, href: &str) -> Entity {
        self.entity_of_kind(href, ResourceKind::Unknown)
    }

    fn entity_of_kind(&self, href: &str, kind: ResourceKind) -> Entity {
        Entity::new(self, href, Properties::Unqueried { kind })
    }

    pub(crate) fn entity_with_properties(&self, href: &str, props: ResourceProps) -> Entity {
        Entity::new(self, href, Properties::Present(props))
    }

    /// Resolve an href to an absolute URL.
    ///
    /// Absolute `http(s)` URLs are returned unchanged. A server-absolute
    /// path under the root's own path, as PROPFIND reports them, resolves
    /// against the root's origin. Anything else is appended to the root
    /// with exactly one `/` in between.
    pub fn resolve_url(&self, href: &str) -> String {
        if is_absolute(href) {
            return href.to_string();
        }

        if href.starts_with('/') {
            let base = self.root.path().trim_end_matches('/');
            let under_root = href
                .strip_prefix(base)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'));
            if under_root {
                return format!("{}{}", self.root.origin().ascii_serialization(), href);
            }
        }

        format!(
            "{}/{}",
            self.root_url.trim_end_matches('/'),
            href.trim_start_matches('/')
        )
    }

    pub fn name_for<'a>(&self, url: &'a str) -> &'a str {
        name_for(url)
    }

    pub(crate) fn send(&self, request: DavRequest) -> Result<DavResponse, Error> {
        self.transport
            .send(request.with_credentials(self.use_credentials))
    }
}

impl std::fmt::Debug for Fs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fs")
            .field("root_url", &self.root_url)
            .field("use_credentials", &self.use_credentials)
            .finish()
    }
}

fn is_absolute(href: &str) -> bool {
    href.starts_with("http://") || href.starts_with("https://")
}

/// The text after the last `/` of a URL
pub fn name_for(url: &str) -> &str {
    match url.rfind('/') {
        Some(index) => &url[index + 1..],
        None => url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Credentials;
    use crate::executor::mock::MockExecutor;

    fn fs(root: &str) -> Fs {
        Fs::with_executor(root, MockExecutor::new()).unwrap()
    }

    #[test]
    fn relative_hrefs_join_with_one_slash() {
        for root in ["https://example.com/dav/", "https://example.com/dav"] {
            let fs = fs(root);
            assert_eq!(fs.resolve_url("notes.txt"), "https://example.com/dav/notes.txt");
            assert_eq!(fs.resolve_url("a/b.txt"), "https://example.com/dav/a/b.txt");
            assert_eq!(fs.resolve_url("/dir/a.txt"), "https://example.com/dav/dir/a.txt");
        }
    }

    #[test]
    fn server_paths_under_root_resolve_against_origin() {
        for root in ["https://example.com/dav/", "https://example.com/dav"] {
            let fs = fs(root);
            assert_eq!(
                fs.resolve_url("/dav/photos/cat.jpg"),
                "https://example.com/dav/photos/cat.jpg"
            );
            assert_eq!(fs.resolve_url("/dav"), "https://example.com/dav");
            assert_eq!(
                fs.resolve_url("/davinci/x"),
                "https://example.com/dav/davinci/x"
            );
        }
    }

    #[test]
    fn factories_treat_leading_slash_under_root_as_server_path() {
        let fs = fs("https://example.com/dav/");
        assert_eq!(fs.file("/dav/x").url(), "https://example.com/dav/x");
        assert_eq!(fs.dir("/dav/sub").url(), "https://example.com/dav/sub");
        assert_eq!(fs.file("/other/x").url(), "https://example.com/dav/other/x");
    }

    #[test]
    fn root_at_origin() {
        let fs = fs("http://localhost:8080/");
        assert_eq!(fs.resolve_url("/a/b"), "http://localhost:8080/a/b");
        assert_eq!(fs.resolve_url("a/b"), "http://localhost:8080/a/b");
    }

    #[test]
    fn absolute_urls_pass_through() {
        let fs = fs("https://example.com/dav/");
        let url = "http://other.example.org/x/y.txt";
        assert_eq!(fs.resolve_url(url), url);
        assert_eq!(fs.resolve_url(&fs.resolve_url("a.txt")), fs.resolve_url("a.txt"));
    }

    #[test]
    fn name_is_last_segment() {
        assert_eq!(name_for("https://example.com/dav/notes.txt"), "notes.txt");
        assert_eq!(name_for("https://example.com/dav/"), "");
        assert_eq!(name_for("plain"), "plain");

        let name = name_for("https://example.com/a/b/c.tar.gz");
        assert_eq!(name_for(name), name);
    }

    #[test]
    fn factories_tag_kind() {
        let fs = fs("https://example.com/dav/");
        assert_eq!(fs.file("a").kind(), ResourceKind::File);
        assert_eq!(fs.dir("b").kind(), ResourceKind::Dir);
        assert_eq!(fs.entity("c").kind(), ResourceKind::Unknown);
        assert_eq!(fs.dir("b").exists(), None);
    }

    #[test]
    fn rejects_non_http_roots() {
        assert!(matches!(
            Fs::with_executor("ftp://example.com/", MockExecutor::new()),
            Err(Error::InvalidUrl { .. })
        ));
        assert!(matches!(
            Fs::with_executor("not a url", MockExecutor::new()),
            Err(Error::UrlParse(_))
        ));
    }

    #[test]
    fn entities_copy_the_credential_policy() {
        let executor = MockExecutor::new();
        let mut fs = Fs::with_executor("https://example.com/dav/", executor.clone()).unwrap();

        let before = fs.file("a.txt");
        fs.set_use_credentials(true);
        let after = fs.file("a.txt");

        before.read().unwrap();
        after.read().unwrap();

        let recorded = executor.recorded_requests();
        assert!(!recorded[0].with_credentials);
        assert!(recorded[1].with_credentials);
    }

    #[test]
    fn from_config_applies_policy() {
        let config = FsConfig::new("https://example.com/dav/")
            .with_credentials(Credentials::new("alice", "secret"));

        let fs = Fs::from_config(config).unwrap();

        assert!(fs.use_credentials());
        assert_eq!(fs.root_url(), "https://example.com/dav/");
    }
}
