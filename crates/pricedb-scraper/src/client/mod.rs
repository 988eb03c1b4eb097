//! HTTP client for the upstream JSON price sources.

mod origin;
mod user_agent;

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::error::ScraperError;
use crate::retry::RetryPolicy;

pub use origin::referer_for;

/// Fetches JSON documents from upstream sources.
///
/// Every request carries a randomly chosen browser `User-Agent` and a
/// `Referer` set to the origin of the requested URL. Non-2xx responses are
/// typed errors; transient ones are retried according to the configured
/// [`RetryPolicy`].
#[derive(Clone)]
pub struct SourceClient {
    client: Client,
    retry: RetryPolicy,
}

impl SourceClient {
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64, retry: RetryPolicy) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.min(10)))
            .build()?;
        Ok(Self { client, retry })
    }

    /// GETs `url` with `query` appended and decodes the body as JSON,
    /// retrying transient failures.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::InvalidUrl`] when `url` is not absolute (not retried).
    /// - [`ScraperError::RateLimited`] on 429 after retries are exhausted.
    /// - [`ScraperError::NotFound`] on 404 (not retried).
    /// - [`ScraperError::UnexpectedStatus`] on other non-2xx (5xx retried).
    /// - [`ScraperError::Http`] on network failure after retries are exhausted.
    /// - [`ScraperError::Deserialize`] when the body is not JSON (not retried).
    pub async fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value, ScraperError> {
        let referer = referer_for(url).map_err(|reason| ScraperError::InvalidUrl {
            url: url.to_owned(),
            reason,
        })?;
        let referer = referer.as_str();

        self.retry
            .run(|| self.get_json_once(url, query, referer))
            .await
    }

    async fn get_json_once(
        &self,
        url: &str,
        query: &[(&str, String)],
        referer: &str,
    ) -> Result<Value, ScraperError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .header(reqwest::header::USER_AGENT, user_agent::random_user_agent())
            .header(reqwest::header::ACCEPT, "application/json, text/plain, */*")
            .header(reqwest::header::REFERER, referer)
            .header(reqwest::header::CACHE_CONTROL, "no-cache")
            .send()
            .await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(ScraperError::RateLimited {
                domain: origin::extract_domain(url),
                retry_after_secs,
            });
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ScraperError::NotFound {
                url: url.to_owned(),
            });
        }

        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str::<Value>(&body).map_err(|e| ScraperError::Deserialize {
            context: format!("response from {url}"),
            source: e,
        })
    }
}
