//! HTTP client for the Wikipedia S&P 500 constituents page.

use std::time::Duration;

use crate::{user_agent::get_user_agent, Error};

/// The page carrying both the current constituents and the change history.
pub const DEFAULT_PAGE_URL: &str = "https://en.wikipedia.org/wiki/List_of_S%26P_500_companies";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the constituents page.
///
/// Each fetch builds a fresh `reqwest::Client`; the page is requested once
/// per snapshot so there is nothing to pool.
pub struct Client {
    /// Page URL. Defaults to [`DEFAULT_PAGE_URL`].
    page_url: String,
    timeout: Duration,
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl Client {
    /// Creates a new client pointing at the production Wikipedia page.
    pub fn new() -> Self {
        Self {
            page_url: DEFAULT_PAGE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Creates a new client with a custom page URL. Used for testing with wiremock.
    pub fn with_url(page_url: &str) -> Self {
        Self {
            page_url: page_url.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Overrides the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn page_url(&self) -> &str {
        &self.page_url
    }

    /// Fetches the raw HTML of the page.
    pub async fn fetch_page(&self) -> Result<String, Error> {
        let client = reqwest::Client::builder()
            .user_agent(get_user_agent())
            .timeout(self.timeout)
            .build()
            .map_err(|e| {
                tracing::error!("Failed to build HTTP client: {}", e);
                Error::RequestFailed
            })?;
        let resp = client
            .get(&self.page_url)
            .header("accept", "text/html,application/xhtml+xml")
            .header("accept-language", "en-US,en;q=0.9")
            .header("cache-control", "no-cache")
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to get page {}: {}", self.page_url, e);
                Error::RequestFailed
            })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| {
            tracing::error!("Failed to read response body: {}", e);
            Error::RequestFailed
        })?;

        if !status.is_success() {
            let snippet = truncate_body(&body);
            tracing::error!("Request failed with status {}: {}", status, snippet);
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body: snippet,
            });
        }

        tracing::debug!("Fetched {} bytes from {}", body.len(), self.page_url);
        Ok(body)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 2000;
    if body.len() <= MAX {
        return body.to_string();
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...[truncated]", &body[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_short_body_untouched() {
        assert_eq!(truncate_body("not found"), "not found");
    }

    #[test]
    fn truncate_long_body() {
        let body = "x".repeat(2500);
        let out = truncate_body(&body);
        assert!(out.ends_with("...[truncated]"));
        assert_eq!(out.len(), 2000 + "...[truncated]".len());
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let body = format!("{}é{}", "a".repeat(1999), "b".repeat(100));
        let out = truncate_body(&body);
        assert!(out.starts_with(&"a".repeat(1999)));
        assert!(out.ends_with("...[truncated]"));
    }

    #[test]
    fn default_points_at_wikipedia() {
        assert_eq!(Client::default().page_url(), DEFAULT_PAGE_URL);
    }
}
