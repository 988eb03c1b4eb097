use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("rate limited by {domain} (retry after {retry_after_secs}s)")]
    RateLimited {
        domain: String,
        retry_after_secs: u64,
    },

    #[error("endpoint not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("missing data for {item}: {reason}")]
    MissingData { item: String, reason: String },

    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl ScraperError {
    /// `true` for failures worth another attempt: 5xx responses, 429 and
    /// any transport failure (timeout, refused or dropped connection, body
    /// cut short). Request-building and decode errors are permanent.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            ScraperError::Http(e) => {
                e.is_timeout() || e.is_connect() || e.is_request() || e.is_body()
            }
            ScraperError::RateLimited { .. } => true,
            ScraperError::UnexpectedStatus { status, .. } => (500..600).contains(status),
            ScraperError::Deserialize { .. }
            | ScraperError::NotFound { .. }
            | ScraperError::MissingData { .. }
            | ScraperError::InvalidUrl { .. } => false,
        }
    }

    pub(crate) fn missing(item: impl Into<String>, reason: impl Into<String>) -> Self {
        ScraperError::MissingData {
            item: item.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_and_rate_limits_are_transient() {
        let e = ScraperError::UnexpectedStatus {
            status: 503,
            url: "https://x.test".to_owned(),
        };
        assert!(e.is_transient());
        let e = ScraperError::RateLimited {
            domain: "x.test".to_owned(),
            retry_after_secs: 1,
        };
        assert!(e.is_transient());
    }

    #[test]
    fn client_errors_and_bad_payloads_are_permanent() {
        let e = ScraperError::UnexpectedStatus {
            status: 403,
            url: "https://x.test".to_owned(),
        };
        assert!(!e.is_transient());
        assert!(!ScraperError::NotFound {
            url: "https://x.test".to_owned()
        }
        .is_transient());
        assert!(!ScraperError::missing("42", "brand.id").is_transient());
    }
}
