use super::resilient_http::{RetryPolicy, resilient_get};
use crate::Result;
use crate::config::{Country, CountryTable, Settings};
use core::time::Duration;
use ohno::{IntoAppError, app_err};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};

const LOG_TARGET: &str = "     fetch";

/// Base delay of the exponential backoff between retries.
const RETRY_BASE_DELAY: Duration = Duration::from_secs(1);

/// Outcome of retrieving one country's document.
#[derive(Debug)]
pub enum FetchResult {
    /// The document was retrieved and decoded.
    Found(Value),

    /// The code is not in the country table; no request was made.
    UnknownCountry,

    /// The request or decoding failed.
    Error(ohno::AppError),
}

impl FetchResult {
    #[must_use]
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// The document, or `None` for every kind of failure.
    #[must_use]
    pub fn into_record(self) -> Option<Value> {
        match self {
            Self::Found(record) => Some(record),
            Self::UnknownCountry | Self::Error(_) => None,
        }
    }
}

/// Retrieves country documents from the Factbook data repository.
///
/// Requests are made one at a time. Every request after the first waits for the configured delay.
#[derive(Debug)]
pub struct Provider {
    client: reqwest::Client,
    base_url: String,
    request_delay: Duration,
    policy: RetryPolicy,
    started: AtomicBool,
}

impl Provider {
    /// Create a provider from the retrieval settings.
    ///
    /// `base_url` overrides the repository location from the settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created
    pub fn new(settings: &Settings, base_url: Option<&str>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(settings.request_timeout())
            .build()
            .into_app_err("creating HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.unwrap_or(&settings.base_url).trim_end_matches('/').to_string(),
            request_delay: settings.request_delay(),
            policy: RetryPolicy::new(settings.max_retries, RETRY_BASE_DELAY),
            started: AtomicBool::new(false),
        })
    }

    /// Replace the base delay of the retry backoff.
    #[must_use]
    pub const fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.policy.base_delay = delay;
        self
    }

    #[must_use]
    pub fn url_for(&self, country: &Country) -> String {
        format!("{}/{}/{}.json", self.base_url, country.region, country.code)
    }

    /// Retrieve the document of the country with `code`.
    ///
    /// Failures are logged and reported as [`FetchResult::Error`]; they never abort a batch.
    pub async fn fetch(&self, countries: &CountryTable, code: &str) -> FetchResult {
        let Some(country) = countries.get(code) else {
            log::warn!(target: LOG_TARGET, "Unknown country code '{code}'");
            return FetchResult::UnknownCountry;
        };

        self.pace().await;

        let url = self.url_for(country);
        log::debug!(target: LOG_TARGET, "Fetching {} from {url}", country.name);

        match self.fetch_document(&url).await {
            Ok(record) => {
                log::info!(target: LOG_TARGET, "Fetched data for {} ({})", country.name, country.code);
                FetchResult::Found(record)
            }
            Err(e) => {
                log::warn!(target: LOG_TARGET, "Could not fetch data for {} ({}): {e}", country.name, country.code);
                FetchResult::Error(e)
            }
        }
    }

    async fn fetch_document(&self, url: &str) -> Result<Value> {
        let resp = resilient_get(&self.client, url, self.policy).await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(app_err!("GET {url} returned {status}"));
        }

        let document = resp.json::<Value>().await.into_app_err_with(|| format!("decoding JSON from {url}"))?;
        if !document.is_object() {
            return Err(app_err!("GET {url} returned a JSON document that is not an object"));
        }

        Ok(document)
    }

    async fn pace(&self) {
        if self.started.swap(true, Ordering::AcqRel) && !self.request_delay.is_zero() {
            tokio::time::sleep(self.request_delay).await;
        }
    }
}
