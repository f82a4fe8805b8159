//! Shared HTTP client with User-Agent rotation for video site requests.
//!
//! Provides a configured [`reqwest::Client`] with browser-like headers,
//! cookie support, and rotating User-Agent strings.

use crate::error::FetchError;
use rand::seq::SliceRandom;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use std::time::Duration;

/// Realistic browser User-Agent strings, rotated per client.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/142.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/142.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/142.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:133.0) Gecko/20100101 Firefox/133.0",
];

/// Build a [`reqwest::Client`] configured for scraping.
///
/// The client has:
/// - Cookie store enabled
/// - Request timeout (independent of the fetch unit's own timeout)
/// - Random User-Agent from the rotation list, or `user_agent` if given
/// - Browser-like `Accept` and `Accept-Language` headers
/// - At most 10 redirects
///
/// # Errors
///
/// Returns [`FetchError::Http`] if the client cannot be constructed.
pub fn build_client(
    timeout: Duration,
    user_agent: Option<&str>,
) -> Result<reqwest::Client, FetchError> {
    let ua = match user_agent {
        Some(ua) => ua,
        None => random_user_agent(),
    };

    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

    reqwest::Client::builder()
        .cookie_store(true)
        .timeout(timeout)
        .user_agent(ua)
        .default_headers(headers)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| FetchError::Http(format!("failed to build HTTP client: {e}")))
}

/// GET `url` and return the body, treating any non-2xx status as an error.
///
/// # Errors
///
/// [`FetchError::Http`] on transport failure, [`FetchError::Status`] on a
/// non-success response.
pub async fn get_html(client: &reqwest::Client, url: &str) -> Result<String, FetchError> {
    tracing::trace!(url, "HTTP GET");

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| FetchError::Http(format!("request failed: {e}")))?;

    let status = response.status();
    tracing::trace!(status = status.as_u16(), final_url = %response.url(), "response received");
    if !status.is_success() {
        return Err(FetchError::Status(status.as_u16()));
    }

    response
        .text()
        .await
        .map_err(|e| FetchError::Http(format!("response read failed: {e}")))
}

/// Select a random User-Agent string from the rotation list.
pub fn random_user_agent() -> &'static str {
    let mut rng = rand::thread_rng();
    USER_AGENTS
        .choose(&mut rng)
        .copied()
        // SAFETY: USER_AGENTS is a non-empty const array, choose only returns None on empty slices
        .unwrap_or(USER_AGENTS[0])
}
