//! Quick-access bookmark tiles.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::checklist::Record;

static SCHEME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^https?://").expect("Invalid scheme regex"));

/// Ensures a user-typed address carries an explicit scheme.
///
/// Inputs that already start with `http://` or `https://` (any case) are kept
/// as typed; everything else gets `https://` prepended.
pub fn normalize_url(input: &str) -> String {
    let trimmed = input.trim();
    if SCHEME_REGEX.is_match(trimmed) {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}

/// A bookmark tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickLink {
    pub id: String,
    pub name: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

impl QuickLink {
    /// Creates a link, or `None` when either field is blank or the
    /// normalized address has no host.
    pub fn new(name: &str, url: &str) -> Option<Self> {
        let name = name.trim();
        if name.is_empty() || url.trim().is_empty() {
            return None;
        }
        let link = Self {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            url: normalize_url(url),
            created_at: Utc::now(),
        };
        link.host().map(|_| link)
    }

    /// Host part of the URL, if it parses.
    pub fn host(&self) -> Option<String> {
        Url::parse(&self.url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
    }
}

impl Record for QuickLink {
    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_domain_gets_https() {
        assert_eq!(normalize_url("example.com"), "https://example.com");
        assert_eq!(normalize_url("  github.com/rust-lang "), "https://github.com/rust-lang");
    }

    #[test]
    fn explicit_scheme_is_kept() {
        assert_eq!(normalize_url("http://intranet.local"), "http://intranet.local");
        assert_eq!(normalize_url("HTTPS://Example.com"), "HTTPS://Example.com");
    }

    #[test]
    fn other_schemes_are_prefixed() {
        assert_eq!(normalize_url("ftp://files"), "https://ftp://files");
    }

    #[test]
    fn new_link_normalizes_and_rejects_blank() {
        let link = QuickLink::new("Example", "example.com").unwrap();
        assert_eq!(link.url, "https://example.com");
        assert_eq!(link.host().as_deref(), Some("example.com"));

        assert!(QuickLink::new("   ", "example.com").is_none());
        assert!(QuickLink::new("Example", "  ").is_none());
    }

    #[test]
    fn address_without_host_is_rejected() {
        assert!(QuickLink::new("Broken", "not a url").is_none());
        assert!(QuickLink::new("Broken", "https://").is_none());
        assert_eq!(
            QuickLink::new("Wiki", "HTTP://wiki.local/start").unwrap().host().as_deref(),
            Some("wiki.local")
        );
    }
}
