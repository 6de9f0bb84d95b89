// Transport security: is the site reachable over a validated TLS channel?

use crate::model::{AuditTarget, Dimension, Evaluation, Risk, Scheme};
use privscan_scanner::TlsProbe;
use std::time::Duration;
use tracing::debug;

pub struct TransportValidator {
    probe: TlsProbe,
}

impl TransportValidator {
    pub fn new(timeout: Duration) -> Self {
        Self {
            probe: TlsProbe::new(timeout),
        }
    }

    pub fn with_probe(probe: TlsProbe) -> Self {
        Self { probe }
    }

    /// Plain `http` targets fail without touching the network. Otherwise a
    /// single handshake decides; its failure reason is kept as detail only.
    pub async fn validate(&self, target: &AuditTarget) -> Evaluation {
        if target.scheme == Scheme::Http {
            debug!("{} uses plain HTTP, skipping TLS probe", target.hostname);
            return Evaluation::new(
                Dimension::Transport,
                Risk::MAX,
                "Insecure connection (HTTP used)",
            );
        }

        match self.probe.handshake(target.connect_host()).await {
            Ok(()) => Evaluation::new(
                Dimension::Transport,
                Risk::NONE,
                "HTTPS transmission secure",
            ),
            Err(e) => Evaluation::new(
                Dimension::Transport,
                Risk::MAX,
                "Invalid or missing SSL certificate, or host unreachable",
            )
            .with_detail(e.to_string()),
        }
    }
}

impl Default for TransportValidator {
    fn default() -> Self {
        Self::with_probe(TlsProbe::default())
    }
}
