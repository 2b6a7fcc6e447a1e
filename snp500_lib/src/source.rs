//! Environment-driven configuration and retrying fetch of the source page.

use std::time::Duration;

use rand::Rng;
use snp500_api::{Client, Error, DEFAULT_PAGE_URL};

/// Where and how to fetch the constituents page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    pub page_url: String,
    pub timeout: Duration,
    pub max_retries: usize,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            page_url: DEFAULT_PAGE_URL.to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 3,
            base_delay_ms: 2000,
            max_delay_ms: 30000,
        }
    }
}

impl SourceConfig {
    /// Reads `SNP500_SOURCE_URL`, `SNP500_TIMEOUT_SECS`, `SNP500_RETRY_MAX`,
    /// `SNP500_RETRY_BASE_MS` and `SNP500_RETRY_MAX_MS`, falling back to the
    /// defaults for unset or unparseable values.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            page_url: std::env::var("SNP500_SOURCE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty())
                .unwrap_or(defaults.page_url),
            timeout: Duration::from_secs(env_u64("SNP500_TIMEOUT_SECS", defaults.timeout.as_secs())),
            max_retries: env_usize("SNP500_RETRY_MAX", defaults.max_retries),
            base_delay_ms: env_u64("SNP500_RETRY_BASE_MS", defaults.base_delay_ms),
            max_delay_ms: env_u64("SNP500_RETRY_MAX_MS", defaults.max_delay_ms),
        }
    }

    pub fn with_page_url(mut self, page_url: &str) -> Self {
        self.page_url = page_url.to_string();
        self
    }

    fn delay_for_attempt(&self, attempt: usize) -> Duration {
        let shift = (attempt.saturating_sub(1)).min(30) as u32;
        let exp = 1u64 << shift;
        let base = self
            .base_delay_ms
            .saturating_mul(exp)
            .min(self.max_delay_ms);
        let jitter = rand::thread_rng().gen_range(0.8..1.2);
        Duration::from_millis((base as f64 * jitter) as u64)
    }
}

/// Fetches the page, retrying transport failures, 429 and 5xx responses
/// with exponential backoff.
pub async fn fetch_with_retry(config: &SourceConfig) -> Result<String, Error> {
    let client = Client::with_url(&config.page_url).with_timeout(config.timeout);
    let mut attempt = 0usize;
    loop {
        match client.fetch_page().await {
            Ok(html) => return Ok(html),
            Err(err) => {
                attempt += 1;
                if attempt > config.max_retries || !is_retryable(&err) {
                    return Err(err);
                }
                let delay = config.delay_for_attempt(attempt);
                tracing::warn!(
                    "Page request failed (attempt {}/{}), retrying in {:.1}s",
                    attempt,
                    config.max_retries,
                    delay.as_secs_f64()
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

fn is_retryable(err: &Error) -> bool {
    match err {
        Error::RequestFailed => true,
        Error::HttpStatus { status, .. } => *status == 429 || *status >= 500,
        Error::TableNotFound { .. } | Error::Parse(_) => false,
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|val| val.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|val| val.parse::<usize>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_errors() {
        assert!(is_retryable(&Error::RequestFailed));
        assert!(is_retryable(&Error::HttpStatus {
            status: 429,
            body: String::new()
        }));
        assert!(is_retryable(&Error::HttpStatus {
            status: 502,
            body: String::new()
        }));
        assert!(!is_retryable(&Error::HttpStatus {
            status: 404,
            body: String::new()
        }));
        assert!(!is_retryable(&Error::TableNotFound {
            table: "change history"
        }));
    }

    #[test]
    fn delay_grows_and_is_capped() {
        let config = SourceConfig {
            base_delay_ms: 1000,
            max_delay_ms: 5000,
            ..SourceConfig::default()
        };
        let first = config.delay_for_attempt(1);
        assert!(first >= Duration::from_millis(800) && first <= Duration::from_millis(1200));
        let third = config.delay_for_attempt(3);
        assert!(third >= Duration::from_millis(3200) && third <= Duration::from_millis(4800));
        let tenth = config.delay_for_attempt(10);
        assert!(tenth <= Duration::from_millis(6000));
    }

    #[test]
    fn with_page_url_overrides_default() {
        let config = SourceConfig::default().with_page_url("http://localhost:9/page");
        assert_eq!(config.page_url, "http://localhost:9/page");
        assert_eq!(config.max_retries, 3);
    }
}
