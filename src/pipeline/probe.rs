//! Reachability probes for candidate image URLs.
//!
//! A probe answers one question: does this URL currently serve something?
//! `Ok(false)` means the server answered with a non-success status;
//! `Err(DeckGenError::NetworkFailure)` means the probe itself could not
//! complete. The image stage treats both as "use the fallback".

use crate::error::DeckGenError;
use futures::future::BoxFuture;
use std::time::Duration;
use tracing::debug;

/// Lightweight existence check against a URL.
pub trait ReachabilityProbe: Send + Sync {
    fn is_reachable<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<bool, DeckGenError>>;
}

/// Probe issuing an HTTP `HEAD` request.
///
/// Redirects are followed (placeholder providers usually redirect a seeded
/// URL to a concrete file) and any 2xx final status counts as reachable.
pub struct HttpProbe {
    client: reqwest::Client,
}

impl HttpProbe {
    pub fn new(timeout_secs: u64) -> Result<Self, DeckGenError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| DeckGenError::Internal(format!("HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Use an existing client (shared connection pool, custom TLS).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl ReachabilityProbe for HttpProbe {
    fn is_reachable<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<bool, DeckGenError>> {
        Box::pin(async move {
            let response =
                self.client
                    .head(url)
                    .send()
                    .await
                    .map_err(|e| DeckGenError::NetworkFailure {
                        url: url.to_string(),
                        detail: if e.is_timeout() {
                            "timed out".to_string()
                        } else {
                            e.to_string()
                        },
                    })?;
            let status = response.status();
            debug!("Probe {} → {}", url, status);
            Ok(status.is_success())
        })
    }
}
