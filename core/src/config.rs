//! Client configuration.
//!
//! `ClientConfig` deserializes with serde (all fields optional) and can be
//! read from `SESAME_*` environment variables.

use serde::Deserialize;

use crate::format::UTF8;
use crate::http::Credentials;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/openrdf-sesame";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub repository: Option<String>,
    pub accept_charset: String,
    pub content_charset: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            repository: None,
            accept_charset: UTF8.to_string(),
            content_charset: UTF8.to_string(),
            username: None,
            password: None,
        }
    }
}

impl ClientConfig {
    /// Read `SESAME_URL`, `SESAME_REPOSITORY`, `SESAME_CHARSET`,
    /// `SESAME_USERNAME` and `SESAME_PASSWORD`; unset variables keep their
    /// defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(url) = lookup("SESAME_URL") {
            config.base_url = url;
        }
        config.repository = lookup("SESAME_REPOSITORY").filter(|r| !r.is_empty());
        if let Some(charset) = lookup("SESAME_CHARSET") {
            config.accept_charset = charset.clone();
            config.content_charset = charset;
        }
        config.username = lookup("SESAME_USERNAME");
        config.password = lookup("SESAME_PASSWORD");
        config
    }

    /// Credentials are only used when a username is configured; a missing
    /// password is sent as empty.
    pub fn credentials(&self) -> Option<Credentials> {
        self.username.as_ref().map(|user| {
            Credentials::new(user.clone(), self.password.clone().unwrap_or_default())
        })
    }
}
