//! Source existence probes (filesystem stat and HTTP HEAD)

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;

use super::storage::SchemeRegistry;
use super::uri;

/// Checks whether a source exists before a transfer is attempted.
#[async_trait]
pub trait SourceProbe: Send + Sync {
    /// True when the source is reachable, false when it is definitively
    /// missing. Transient failures (5xx, unreadable filesystem) are errors,
    /// not a missing source.
    async fn exists(&self, source: &str) -> Result<bool>;
}

/// Probe backed by a local stat for storage URIs and HEAD for remote URLs.
pub struct DefaultSourceProbe {
    schemes: Arc<SchemeRegistry>,
    http: reqwest::Client,
}

impl DefaultSourceProbe {
    pub fn new(schemes: Arc<SchemeRegistry>) -> Self {
        Self {
            schemes,
            http: reqwest::Client::new(),
        }
    }

    /// Share an existing HTTP client instead of building a fresh one.
    pub fn with_client(schemes: Arc<SchemeRegistry>, http: reqwest::Client) -> Self {
        Self { schemes, http }
    }
}

#[async_trait]
impl SourceProbe for DefaultSourceProbe {
    async fn exists(&self, source: &str) -> Result<bool> {
        if self.schemes.is_local(source) {
            let path = match self.schemes.resolve(source) {
                Some(path) => path,
                None => return Ok(false),
            };
            return match tokio::fs::metadata(&path).await {
                Ok(_) => Ok(true),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
                Err(e) => {
                    Err(e).with_context(|| format!("Failed to stat {}", path.display()))
                }
            };
        }

        // A non-http scheme that no storage root claims cannot be probed;
        // fail with a clear message instead of a garbled HEAD request.
        let scheme = uri::scheme(source).unwrap_or("");
        if scheme != "http" && scheme != "https" {
            anyhow::bail!("Cannot probe {}: unknown scheme {}", source, scheme);
        }

        let response = self
            .http
            .head(source)
            .send()
            .await
            .with_context(|| format!("HEAD request to {} failed", source))?;

        let status = response.status();
        if status.is_success() {
            Ok(true)
        } else if status.is_client_error() {
            // 4xx means the resource is definitively absent
            Ok(false)
        } else {
            anyhow::bail!("HEAD {} returned {}", source, status)
        }
    }
}
