//! HTTP GET with bounded retry on transient failures.

use crate::Result;
use core::time::Duration;
use ohno::app_err;
use reqwest::{Response, StatusCode};

const LOG_TARGET: &str = "      http";

/// Delay applied to a 429 response that carries no usable `Retry-After` header.
const DEFAULT_RATE_LIMIT_DELAY: Duration = Duration::from_secs(5);

/// How a failed attempt should be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    Never,
    Retry,
    RetryAfter(Duration),
}

/// Retry behavior for [`resilient_get`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts made on top of the first request
    pub max_retries: u32,

    /// Delay before the first retry; doubled for every further retry
    pub base_delay: Duration,
}

impl RetryPolicy {
    #[must_use]
    pub const fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self { max_retries, base_delay }
    }

    /// Backoff before retry number `retry` (zero-based).
    #[must_use]
    pub fn backoff(&self, retry: u32) -> Duration {
        self.base_delay.saturating_mul(2_u32.saturating_pow(retry))
    }
}

fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|h| h.to_str().ok())?
        .trim()
        .parse::<u64>()
        .ok()
}

/// Classify the outcome of one attempt.
///
/// Transport errors and 5xx responses are transient. A 429 waits for the server's `Retry-After`.
/// Anything else is final.
#[must_use]
pub fn classify(result: &core::result::Result<Response, reqwest::Error>) -> Recovery {
    match result {
        Err(_) => Recovery::Retry,
        Ok(resp) if resp.status().is_server_error() => Recovery::Retry,
        Ok(resp) if resp.status() == StatusCode::TOO_MANY_REQUESTS => Recovery::RetryAfter(
            parse_retry_after(resp.headers()).map_or(DEFAULT_RATE_LIMIT_DELAY, Duration::from_secs),
        ),
        Ok(_) => Recovery::Never,
    }
}

/// Send a GET request, retrying transient failures with exponential backoff.
///
/// The final response is returned whatever its status; callers decide what a non-success status means.
///
/// # Errors
///
/// Returns an error if the last attempt failed at the transport level
pub async fn resilient_get(client: &reqwest::Client, url: &str, policy: RetryPolicy) -> Result<Response> {
    let mut retry = 0;
    loop {
        let result = client.get(url).send().await;

        let delay = match classify(&result) {
            Recovery::Never => None,
            _ if retry >= policy.max_retries => None,
            Recovery::Retry => Some(policy.backoff(retry)),
            Recovery::RetryAfter(delay) => Some(delay),
        };

        let Some(delay) = delay else {
            return result.map_err(|e| app_err!("GET {url} failed: {e}"));
        };

        match &result {
            Ok(resp) => log::debug!(
                target: LOG_TARGET,
                "GET {url} returned {}, retrying (attempt {}, delay {}ms)",
                resp.status(),
                retry + 2,
                delay.as_millis()
            ),
            Err(e) => log::debug!(
                target: LOG_TARGET,
                "GET {url} failed: {e}, retrying (attempt {}, delay {}ms)",
                retry + 2,
                delay.as_millis()
            ),
        }

        tokio::time::sleep(delay).await;
        retry += 1;
    }
}
