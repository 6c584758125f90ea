//! HTTP fetcher implementation
//!
//! One authenticated GET per frontier URL, with response classification and
//! a capped retry policy for transient server errors. The retry targets the
//! final resolved URL, so a redirect is only followed once per page.

use crate::config::RetryConfig;
use crate::{HuntError, Result};
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// HTTP 200: the page body is ready to scan
    Success {
        /// Final URL after redirects
        final_url: String,
        /// Page body content
        body: String,
    },

    /// HTTP 403/404: terminal, the URL is simply dropped
    Skip {
        /// The HTTP status code
        status: u16,
    },

    /// Any other status code: reported and dropped, but distinguishable
    /// from Skip in logs
    Unknown {
        /// The HTTP status code
        status: u16,
    },
}

/// Builds the HTTP client all workers share
///
/// The cookie store carries the authenticated session, so a client built
/// before login and used for the login POST is ready for the crawl without
/// manual cookie plumbing. Clients are safe for concurrent use and cheap to
/// clone into worker tasks.
pub fn build_http_client(timeout_secs: u64) -> std::result::Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(timeout_secs))
        .cookie_store(true)
        .gzip(true)
        .brotli(true)
        .build()
}

fn is_transient(status: StatusCode) -> bool {
    status == StatusCode::INTERNAL_SERVER_ERROR || status == StatusCode::SERVICE_UNAVAILABLE
}

/// Fetches a URL and classifies the response
///
/// Classification:
/// - 200 → `Success`
/// - 403/404 → `Skip`, not retried, not an error
/// - 500/503 → retried against the final resolved URL with exponential
///   backoff, up to `retry.max_attempts` total attempts; exhausting the
///   budget yields [`HuntError::RetryExhausted`]
/// - anything else → `Unknown`
///
/// Transport failures (timeout, connection refused) propagate as
/// [`HuntError::Http`] out of this single fetch; the caller treats that as
/// one failed task, never as a reason to stop the crawl.
pub async fn fetch_page(client: &Client, url: &str, retry: &RetryConfig) -> Result<FetchResult> {
    let response = client.get(url).send().await?;
    let status = response.status();
    let final_url = response.url().to_string();

    if status == StatusCode::OK {
        let body = response.text().await?;
        return Ok(FetchResult::Success { final_url, body });
    }

    if status == StatusCode::FORBIDDEN || status == StatusCode::NOT_FOUND {
        return Ok(FetchResult::Skip {
            status: status.as_u16(),
        });
    }

    if is_transient(status) {
        return retry_transient(client, &final_url, retry).await;
    }

    Ok(FetchResult::Unknown {
        status: status.as_u16(),
    })
}

/// Re-fetches a URL that answered 500/503 until it yields something else
/// or the attempt budget runs out. The first attempt has already happened,
/// so this performs at most `max_attempts - 1` more requests.
async fn retry_transient(client: &Client, url: &str, retry: &RetryConfig) -> Result<FetchResult> {
    let mut backoff = Duration::from_millis(retry.backoff_ms);

    for attempt in 2..=retry.max_attempts {
        tokio::time::sleep(backoff).await;
        backoff *= 2;

        tracing::debug!("Retrying {} (attempt {}/{})", url, attempt, retry.max_attempts);
        let response = client.get(url).send().await?;
        let status = response.status();

        if is_transient(status) {
            continue;
        }

        if status == StatusCode::OK {
            let final_url = response.url().to_string();
            let body = response.text().await?;
            return Ok(FetchResult::Success { final_url, body });
        }

        if status == StatusCode::FORBIDDEN || status == StatusCode::NOT_FOUND {
            return Ok(FetchResult::Skip {
                status: status.as_u16(),
            });
        }

        return Ok(FetchResult::Unknown {
            status: status.as_u16(),
        });
    }

    Err(HuntError::RetryExhausted {
        url: url.to_string(),
        attempts: retry.max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_retry() -> RetryConfig {
        RetryConfig {
            max_attempts: 4,
            backoff_ms: 1,
        }
    }

    #[test]
    fn test_build_http_client() {
        assert!(build_http_client(5).is_ok());
    }

    #[tokio::test]
    async fn test_200_is_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
            .mount(&server)
            .await;

        let client = build_http_client(5).unwrap();
        let result = fetch_page(&client, &format!("{}/page", server.uri()), &fast_retry())
            .await
            .unwrap();

        match result {
            FetchResult::Success { body, .. } => assert_eq!(body, "hello"),
            other => panic!("expected Success, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_403_and_404_are_skip() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forbidden"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = build_http_client(5).unwrap();

        let result = fetch_page(&client, &format!("{}/forbidden", server.uri()), &fast_retry())
            .await
            .unwrap();
        assert!(matches!(result, FetchResult::Skip { status: 403 }));

        let result = fetch_page(&client, &format!("{}/missing", server.uri()), &fast_retry())
            .await
            .unwrap();
        assert!(matches!(result, FetchResult::Skip { status: 404 }));
    }

    #[tokio::test]
    async fn test_transient_error_retried_until_success() {
        let server = MockServer::start().await;

        // Fails twice, then recovers
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(200).set_body_string("recovered"))
            .mount(&server)
            .await;

        let client = build_http_client(5).unwrap();
        let result = fetch_page(&client, &format!("{}/flaky", server.uri()), &fast_retry())
            .await
            .unwrap();

        match result {
            FetchResult::Success { body, .. } => assert_eq!(body, "recovered"),
            other => panic!("expected Success after retry, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_persistent_transient_error_exhausts_budget() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/down"))
            .respond_with(ResponseTemplate::new(500))
            .expect(4) // initial attempt + 3 retries
            .mount(&server)
            .await;

        let client = build_http_client(5).unwrap();
        let err = fetch_page(&client, &format!("{}/down", server.uri()), &fast_retry())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            HuntError::RetryExhausted { attempts: 4, .. }
        ));
    }

    #[tokio::test]
    async fn test_unexpected_status_is_unknown() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/odd"))
            .respond_with(ResponseTemplate::new(418))
            .mount(&server)
            .await;

        let client = build_http_client(5).unwrap();
        let result = fetch_page(&client, &format!("{}/odd", server.uri()), &fast_retry())
            .await
            .unwrap();

        assert!(matches!(result, FetchResult::Unknown { status: 418 }));
    }

    #[tokio::test]
    async fn test_timeout_propagates_as_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let client = build_http_client(1).unwrap();
        let err = fetch_page(&client, &format!("{}/slow", server.uri()), &fast_retry()).await;

        assert!(matches!(err, Err(HuntError::Http(_))));
    }
}
