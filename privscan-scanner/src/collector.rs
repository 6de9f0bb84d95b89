use crate::cookie::CookieRecord;
use crate::error::{Result, ScanError};
use crate::host::{is_same_site, normalize_host};
use crate::markup::extract_resource_urls;
use crate::result::Collection;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, HeaderMap, LOCATION, SET_COOKIE};
use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use url::Url;

pub const DEFAULT_COLLECT_TIMEOUT_SECS: u64 = 45;
const MAX_REDIRECTS: usize = 5;
const MAX_SUBRESOURCES: usize = 100;
const SUBRESOURCE_CONCURRENCY: usize = 8;

/// Loads a page and reports what a browser would have observed.
pub trait Collector: Send + Sync {
    fn collect(&self, url: &Url, timeout: Duration) -> impl Future<Output = Collection> + Send;
}

pub struct HttpCollector {
    client: Client,
    max_redirects: usize,
    max_subresources: usize,
    concurrency: usize,
    fetch_subresources: bool,
}

// Cookie jar keyed by (domain, name); later cookies replace earlier ones
type Jar = BTreeMap<(String, String), CookieRecord>;

impl HttpCollector {
    pub fn new() -> Result<Self> {
        Self::with_request_timeout(DEFAULT_COLLECT_TIMEOUT_SECS)
    }

    pub fn with_request_timeout(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .user_agent(crate::USER_AGENT)
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.div_ceil(2).max(1)))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .redirect(reqwest::redirect::Policy::none()) // hops are followed by hand to see their cookies
            .cookie_store(true)
            // Certificate problems are the transport check's finding, not a collection failure
            .danger_accept_invalid_certs(true)
            .build()?;

        Ok(Self {
            client,
            max_redirects: MAX_REDIRECTS,
            max_subresources: MAX_SUBRESOURCES,
            concurrency: SUBRESOURCE_CONCURRENCY,
            fetch_subresources: true,
        })
    }

    pub fn with_max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    pub fn with_max_subresources(mut self, max_subresources: usize) -> Self {
        self.max_subresources = max_subresources;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_subresources(mut self, fetch: bool) -> Self {
        self.fetch_subresources = fetch;
        self
    }

    async fn navigate(&self, url: &Url) -> Result<Collection> {
        let site = url
            .host_str()
            .map(normalize_host)
            .ok_or_else(|| ScanError::InvalidUrl(format!("{} has no host", url)))?;

        let mut jar = Jar::new();
        let mut destinations = BTreeSet::new();
        let mut current = url.clone();
        let mut hops = 0;

        let start = Instant::now();
        let response = loop {
            debug!("Fetching {}", current);
            let response = self.client.get(current.clone()).send().await?;
            let host = current.host_str().unwrap_or_default().to_string();
            store_cookies(&mut jar, response.headers(), &host);
            note_destination(&mut destinations, &host, &site);

            let location = if response.status().is_redirection() {
                response
                    .headers()
                    .get(LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .map(String::from)
            } else {
                None
            };

            match location.and_then(|l| current.join(&l).ok()) {
                Some(next) if hops < self.max_redirects => {
                    debug!("Redirect {} -> {}", current, next);
                    hops += 1;
                    current = next;
                }
                _ => break response,
            }
        };

        let status_code = response.status().as_u16();
        let is_html = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.contains("html"))
            .unwrap_or(true);
        let body = response.text().await?;
        let response_time = start.elapsed();

        let mut collection = Collection::new(url.to_string());
        collection.final_url = Some(current.to_string());
        collection.status_code = status_code;
        collection.response_time = response_time;

        if is_html {
            let resources: Vec<Url> = extract_resource_urls(&body, &current)
                .into_iter()
                .take(self.max_subresources)
                .collect();

            for resource in &resources {
                if let Some(host) = resource.host_str() {
                    note_destination(&mut destinations, host, &site);
                }
            }

            if self.fetch_subresources {
                let fetched: Vec<Vec<CookieRecord>> = stream::iter(resources)
                    .map(|resource| self.fetch_subresource(resource))
                    .buffer_unordered(self.concurrency)
                    .collect()
                    .await;
                for cookie in fetched.into_iter().flatten() {
                    jar.insert((cookie.domain.clone(), cookie.name.clone()), cookie);
                }
            }

            collection.rendered_markup = body;
        }

        collection.cookies = jar.into_values().collect();
        collection.third_party_destinations = destinations;

        info!(
            "Collected {} (HTTP {}): {} cookies, {} third-party destinations",
            collection.url,
            collection.status_code,
            collection.cookies.len(),
            collection.third_party_destinations.len()
        );
        Ok(collection)
    }

    async fn fetch_subresource(&self, resource: Url) -> Vec<CookieRecord> {
        let host = resource.host_str().unwrap_or_default().to_string();
        match self.client.get(resource.clone()).send().await {
            Ok(response) => {
                let mut jar = Jar::new();
                store_cookies(&mut jar, response.headers(), &host);
                jar.into_values().collect()
            }
            Err(e) => {
                debug!("Sub-resource {} failed: {}", resource, e);
                Vec::new()
            }
        }
    }
}

impl Collector for HttpCollector {
    async fn collect(&self, url: &Url, timeout: Duration) -> Collection {
        info!("Collecting {} (timeout {}s)", url, timeout.as_secs());

        match tokio::time::timeout(timeout, self.navigate(url)).await {
            Ok(Ok(collection)) => collection,
            Ok(Err(e)) => {
                warn!("Collection of {} failed: {}", url, e);
                Collection::failed(url.to_string(), e.to_string())
            }
            Err(_) => {
                let e = ScanError::Timeout(timeout.as_secs());
                warn!("Collection of {} failed: {}", url, e);
                Collection::failed(url.to_string(), e.to_string())
            }
        }
    }
}

fn store_cookies(jar: &mut Jar, headers: &HeaderMap, host: &str) {
    for value in headers.get_all(SET_COOKIE) {
        if let Ok(raw) = value.to_str()
            && let Some(cookie) = CookieRecord::from_set_cookie(raw, host)
        {
            debug!("Cookie {} set for {}", cookie.name, cookie.domain);
            jar.insert((cookie.domain.clone(), cookie.name.clone()), cookie);
        }
    }
}

fn note_destination(destinations: &mut BTreeSet<String>, host: &str, site: &str) {
    if !host.is_empty() && !is_same_site(host, site) {
        destinations.insert(normalize_host(host));
    }
}
