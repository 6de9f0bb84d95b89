//! Transport security probe
//!
//! One HTTPS request against the default-secure client: system trust
//! store, hostname verification, no redirects and no retries. Any HTTP
//! response means the handshake and certificate validation succeeded.

use crate::error::{Result, ScanError};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

pub const DEFAULT_TLS_TIMEOUT_SECS: u64 = 10;

pub struct TlsProbe {
    timeout: Duration,
    port: u16,
}

impl TlsProbe {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout, port: 443 }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Attempt a validated TLS handshake with `host`.
    pub async fn handshake(&self, host: &str) -> Result<()> {
        let mut url = Url::parse(&format!("https://{}/", host))
            .map_err(|e| ScanError::InvalidUrl(format!("{}: {}", host, e)))?;
        url.set_port(Some(self.port))
            .map_err(|_| ScanError::InvalidUrl(host.to_string()))?;

        let client = Client::builder()
            .user_agent(crate::USER_AGENT)
            .timeout(self.timeout)
            .connect_timeout(self.timeout)
            .redirect(reqwest::redirect::Policy::none())
            .https_only(true)
            .pool_max_idle_per_host(0)
            .build()?;

        debug!("Probing TLS on {}", url);
        match client.head(url).send().await {
            Ok(response) => {
                info!(
                    "TLS handshake with {} succeeded (HTTP {})",
                    host,
                    response.status().as_u16()
                );
                Ok(())
            }
            Err(e) if e.is_timeout() => {
                info!("TLS probe of {} timed out", host);
                Err(ScanError::Timeout(self.timeout.as_secs()))
            }
            Err(e) => {
                info!("TLS handshake with {} failed: {}", host, e);
                Err(ScanError::TlsError {
                    host: host.to_string(),
                    reason: error_chain(&e),
                })
            }
        }
    }
}

impl Default for TlsProbe {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_TLS_TIMEOUT_SECS))
    }
}

// reqwest hides the certificate reason in its source chain
fn error_chain(error: &(dyn std::error::Error + 'static)) -> String {
    let mut parts = vec![error.to_string()];
    let mut source = error.source();
    while let Some(inner) = source {
        parts.push(inner.to_string());
        source = inner.source();
    }
    parts.join(": ")
}
