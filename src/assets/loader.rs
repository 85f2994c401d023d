use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::Context;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::assets::decode::{DecodedImage, decode_image};
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::retry::{RetryPolicy, retry_with_backoff};
use crate::scene::slide::ImageRef;

/// Query parameter that makes each retry look like a distinct request to HTTP caches.
pub const CACHE_BUST_PARAM: &str = "cachebust";

/// Produces the encoded bytes behind an [`ImageRef`].
///
/// `attempt` is 1-based; fetchers that talk to caches use it to defeat stale responses.
pub trait ImageFetcher: Send + Sync {
    fn fetch(&self, source: &ImageRef, attempt: u32) -> ReelResult<Vec<u8>>;
}

/// Blocking HTTP fetcher (`reqwest`).
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> ReelResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("slidereel/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { client })
    }

    pub fn get(&self, url: &str, attempt: u32) -> ReelResult<Vec<u8>> {
        let busted = cache_busted_url(url, &cache_bust_value(attempt))?;
        debug!(url = %busted, attempt, "fetching image");
        let resp = self
            .client
            .get(busted)
            .header(reqwest::header::CACHE_CONTROL, "no-store")
            .send()
            .with_context(|| format!("request to '{url}' failed"))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow::anyhow!("HTTP error status {status} from '{url}'").into());
        }
        let bytes = resp
            .bytes()
            .with_context(|| format!("failed to read response body from '{url}'"))?;
        Ok(bytes.to_vec())
    }
}

/// Fetcher used by default: HTTP for URLs, the filesystem for paths, inline bytes as-is.
pub struct DefaultFetcher {
    http: HttpFetcher,
}

impl DefaultFetcher {
    pub fn new(http_timeout: Duration) -> ReelResult<Self> {
        Ok(Self {
            http: HttpFetcher::new(http_timeout)?,
        })
    }
}

impl ImageFetcher for DefaultFetcher {
    fn fetch(&self, source: &ImageRef, attempt: u32) -> ReelResult<Vec<u8>> {
        match source {
            ImageRef::Url(url) => self.http.get(url, attempt),
            ImageRef::Path(path) => Ok(std::fs::read(path)
                .with_context(|| format!("failed to read '{}'", path.display()))?),
            ImageRef::Inline(bytes) => Ok(bytes.to_vec()),
        }
    }
}

/// Set (or replace) the cache-busting query parameter on `url`.
pub fn cache_busted_url(url: &str, value: &str) -> ReelResult<String> {
    let mut parsed = url::Url::parse(url)
        .map_err(|e| ReelError::validation(format!("invalid image URL '{url}': {e}")))?;
    let kept: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(k, _)| k != CACHE_BUST_PARAM)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    {
        let mut q = parsed.query_pairs_mut();
        q.clear();
        for (k, v) in &kept {
            q.append_pair(k, v);
        }
        q.append_pair(CACHE_BUST_PARAM, value);
    }
    Ok(parsed.into())
}

fn cache_bust_value(attempt: u32) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    format!("{millis}-{attempt}")
}

/// Fetch + decode with bounded retries.
#[derive(Clone)]
pub struct ImageLoader {
    fetcher: Arc<dyn ImageFetcher>,
    policy: RetryPolicy,
}

impl ImageLoader {
    pub fn new(fetcher: Arc<dyn ImageFetcher>, policy: RetryPolicy) -> Self {
        Self { fetcher, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Load one image. Fetch and decode failures are both retried; the error after the last
    /// attempt names the source and the attempt count.
    #[tracing::instrument(skip_all, fields(source = %source))]
    pub fn load(&self, source: &ImageRef) -> ReelResult<DecodedImage> {
        let label = source.to_string();
        retry_with_backoff(&self.policy, &label, |attempt| {
            // The fetched buffer lives only for this attempt.
            let bytes = self.fetcher.fetch(source, attempt)?;
            decode_image(&bytes)
        })
        .map_err(|ex| ReelError::image(label.clone(), ex.attempts, ex.last.to_string()))
    }

    /// Load all images concurrently. Results keep the input order; the first failure in
    /// that order is reported.
    pub fn load_all(&self, sources: &[ImageRef]) -> ReelResult<Vec<Arc<DecodedImage>>> {
        info!(count = sources.len(), "loading slide images");
        let results: Vec<ReelResult<Arc<DecodedImage>>> = sources
            .par_iter()
            .map(|s| self.load(s).map(Arc::new))
            .collect();
        results.into_iter().collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
