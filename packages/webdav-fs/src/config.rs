use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::executor::DEFAULT_TIMEOUT;

/// Username/password pair sent as HTTP basic auth.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Settings for a [`Fs`](crate::fs::Fs) backed by the reqwest executor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FsConfig {
    /// Base address that relative hrefs resolve against
    pub root_url: String,

    /// Attach credentials to every request made for this store
    #[serde(default)]
    pub use_credentials: bool,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Credentials>,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

impl FsConfig {
    pub fn new(root_url: impl Into<String>) -> Self {
        Self {
            root_url: root_url.into(),
            use_credentials: false,
            timeout_secs: default_timeout_secs(),
            credentials: None,
        }
    }

    /// Enable credentials and set the ones to send
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.use_credentials = true;
        self.credentials = Some(credentials);
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_fields_are_missing() {
        let config: FsConfig =
            serde_json::from_str(r#"{"root_url": "https://example.com/dav/"}"#).unwrap();

        assert_eq!(config, FsConfig::new("https://example.com/dav/"));
        assert!(!config.use_credentials);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert!(config.credentials.is_none());
    }

    #[test]
    fn credentials_deserialize() {
        let config: FsConfig = serde_json::from_str(
            r#"{
                "root_url": "https://example.com/dav/",
                "use_credentials": true,
                "timeout_secs": 5,
                "credentials": {"username": "alice", "password": "secret"}
            }"#,
        )
        .unwrap();

        assert!(config.use_credentials);
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(
            config.credentials,
            Some(Credentials::new("alice", "secret"))
        );
    }

    #[test]
    fn debug_hides_password() {
        let rendered = format!("{:?}", Credentials::new("alice", "secret"));
        assert!(rendered.contains("alice"));
        assert!(!rendered.contains("secret"));
    }
}
