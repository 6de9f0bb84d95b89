//! Cookie records as observed by the collector
//!
//! Only the attributes the auditor reasons about are kept. The `domain` is
//! the verbatim `Domain=` attribute (lower-cased) or, for host-only cookies,
//! the host that set the cookie.

use serde::{Deserialize, Serialize};

/// A cookie set while loading the audited page
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CookieRecord {
    /// Cookie name
    pub name: String,
    /// Domain attribute, or the setting host when absent
    pub domain: String,
}

impl CookieRecord {
    pub fn new(name: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            domain: domain.into(),
        }
    }

    /// Parse a `Set-Cookie` header value received from `request_host`.
    ///
    /// Returns `None` for headers without a cookie name.
    pub fn from_set_cookie(header: &str, request_host: &str) -> Option<Self> {
        let mut parts = header.split(';');
        let pair = parts.next()?.trim();
        let name = match pair.split_once('=') {
            Some((name, _)) => name.trim(),
            None => pair,
        };
        if name.is_empty() {
            return None;
        }

        let domain = parts
            .filter_map(|attr| attr.split_once('='))
            .find(|(key, _)| key.trim().eq_ignore_ascii_case("domain"))
            .map(|(_, value)| value.trim().trim_matches('"').to_lowercase())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| request_host.to_lowercase());

        Some(Self::new(name, domain))
    }
}
