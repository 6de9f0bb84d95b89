use crate::cookie::CookieRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;

/// Everything the collector observed while loading one page.
///
/// When `success` is false the remaining fields hold best-effort partial
/// data that must not be scored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    pub url: String,
    pub final_url: Option<String>,
    pub success: bool,
    pub status_code: u16,
    pub cookies: Vec<CookieRecord>,
    pub third_party_destinations: BTreeSet<String>,
    pub rendered_markup: String,
    pub response_time: Duration,
    pub error: Option<String>,
}

impl Collection {
    pub fn new(url: String) -> Self {
        Self {
            url,
            final_url: None,
            success: true,
            status_code: 0,
            cookies: Vec::new(),
            third_party_destinations: BTreeSet::new(),
            rendered_markup: String::new(),
            response_time: Duration::from_secs(0),
            error: None,
        }
    }

    pub fn failed(url: String, error: String) -> Self {
        Self {
            success: false,
            error: Some(error),
            ..Self::new(url)
        }
    }
}
