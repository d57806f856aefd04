// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTTP client with exponential backoff retry
//!
//! All outbound requests in the pipeline go through this client. Transient
//! failures (HTTP 5xx, 429, network errors) are retried with exponential
//! backoff and jitter; other 4xx responses are terminal.

use rand::Rng;
use reqwest::{Client, RequestBuilder, Response};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors surfaced by the retrying client once retries are exhausted
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network-level failure (DNS, connect, timeout)
    #[error("Request failed: {0}")]
    Network(String),

    /// Terminal HTTP status (4xx other than 429)
    #[error("HTTP {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body or status text
        message: String,
    },

    /// Retries exhausted on a transient failure
    #[error("All {attempts} attempts failed: {last_error}")]
    RetriesExhausted {
        /// Total attempts made
        attempts: u32,
        /// The last error observed
        last_error: String,
    },
}

/// Retry policy knobs
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt (3 retries = 4 attempts total)
    pub max_retries: u32,
    /// Base delay for attempt 0
    pub initial_delay_ms: u64,
    /// Ceiling on the computed base delay
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 1000,
            max_delay_ms: 10_000,
        }
    }
}

impl RetryPolicy {
    /// Base backoff delay for a 0-indexed attempt, before jitter.
    ///
    /// min(max_delay, initial * 2^attempt), non-decreasing in `attempt`.
    pub fn base_delay_ms(&self, attempt: u32) -> u64 {
        let exp = self
            .initial_delay_ms
            .saturating_mul(1u64.checked_shl(attempt).unwrap_or(u64::MAX));
        exp.min(self.max_delay_ms)
    }

    /// Backoff delay with uniform random jitter of up to 20% added.
    pub fn delay_with_jitter(&self, attempt: u32) -> Duration {
        let base = self.base_delay_ms(attempt);
        let jitter = rand::thread_rng().gen_range(0.0..=0.2) * base as f64;
        Duration::from_millis(base + jitter as u64)
    }
}

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// HTTP client wrapping `reqwest` with retry and backoff
pub struct RetryingClient {
    client: Client,
    policy: RetryPolicy,
}

impl RetryingClient {
    pub fn new(policy: RetryPolicy, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, policy }
    }

    /// GET a URL with retry, returning the successful response.
    pub async fn get(&self, url: &str) -> Result<Response, ClientError> {
        self.execute(|c| c.get(url)).await
    }

    /// GET a URL and read the body as text.
    pub async fn get_text(&self, url: &str) -> Result<String, ClientError> {
        let response = self.get(url).await?;
        response
            .text()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))
    }

    /// Execute a request built by `build`, retrying transient failures.
    ///
    /// The builder closure receives the inner client and is invoked once per
    /// attempt so the request can be reconstructed.
    pub async fn execute<F>(&self, build: F) -> Result<Response, ClientError>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        let attempts = self.policy.max_retries + 1;
        let mut last_error = String::new();

        for attempt in 0..attempts {
            match build(&self.client).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }

                    let code = status.as_u16();
                    if code >= 500 || code == 429 {
                        last_error = format!("HTTP {}: server error or rate limit", code);
                        warn!(
                            "Attempt {}/{} failed with {}, retrying",
                            attempt + 1,
                            attempts,
                            code
                        );
                    } else {
                        // Client errors are terminal, surface the body
                        let message = response.text().await.unwrap_or_default();
                        return Err(ClientError::Status {
                            status: code,
                            message,
                        });
                    }
                }
                Err(e) => {
                    last_error = e.to_string();
                    warn!(
                        "Attempt {}/{} failed: {}, retrying",
                        attempt + 1,
                        attempts,
                        last_error
                    );
                }
            }

            if attempt + 1 < attempts {
                let delay = self.policy.delay_with_jitter(attempt);
                debug!("Backing off {}ms before retry", delay.as_millis());
                tokio::time::sleep(delay).await;
            }
        }

        Err(ClientError::RetriesExhausted {
            attempts,
            last_error,
        })
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

impl Default for RetryingClient {
    fn default() -> Self {
        Self::new(RetryPolicy::default(), 15)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[test]
    fn test_base_delay_doubles() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.base_delay_ms(0), 1000);
        assert_eq!(policy.base_delay_ms(1), 2000);
        assert_eq!(policy.base_delay_ms(2), 4000);
        assert_eq!(policy.base_delay_ms(3), 8000);
    }

    #[test]
    fn test_base_delay_monotonic_and_capped() {
        let policy = RetryPolicy::default();
        let mut previous = 0;
        for attempt in 0..10 {
            let delay = policy.base_delay_ms(attempt);
            assert!(delay >= previous, "delay decreased at attempt {}", attempt);
            assert!(delay <= 10_000);
            previous = delay;
        }
        assert_eq!(policy.base_delay_ms(9), 10_000);
    }

    #[test]
    fn test_jitter_bounded() {
        let policy = RetryPolicy::default();
        for _ in 0..50 {
            let delay = policy.delay_with_jitter(1).as_millis() as u64;
            assert!((2000..=2400).contains(&delay), "delay {} out of range", delay);
        }
    }

    #[test]
    fn test_large_attempt_does_not_overflow() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.base_delay_ms(63), 10_000);
        assert_eq!(policy.base_delay_ms(64), 10_000);
    }

    /// Local fixture server answering every request with a fixed status,
    /// counting how many requests it saw.
    async fn fixture_server(status_line: &'static str) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let server_hits = hits.clone();

        tokio::spawn(async move {
            loop {
                let (mut socket, _) = match listener.accept().await {
                    Ok(conn) => conn,
                    Err(_) => return,
                };
                server_hits.fetch_add(1, Ordering::SeqCst);
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                let response = format!(
                    "HTTP/1.1 {}\r\ncontent-length: 4\r\nconnection: close\r\n\r\nbody",
                    status_line
                );
                let _ = socket.write_all(response.as_bytes()).await;
            }
        });

        (format!("http://{}/page", addr), hits)
    }

    fn fast_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            initial_delay_ms: 1,
            max_delay_ms: 1,
        }
    }

    #[tokio::test]
    async fn test_terminal_status_not_retried() {
        let (url, hits) = fixture_server("404 Not Found").await;
        let client = RetryingClient::new(fast_policy(3), 5);

        let err = client.get(&url).await.unwrap_err();
        assert!(matches!(err, ClientError::Status { status: 404, .. }));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_server_error_retried_until_exhausted() {
        let (url, hits) = fixture_server("500 Internal Server Error").await;
        let client = RetryingClient::new(fast_policy(2), 5);

        let err = client.get(&url).await.unwrap_err();
        assert!(matches!(err, ClientError::RetriesExhausted { attempts: 3, .. }));
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_rate_limit_status_retried() {
        let (url, hits) = fixture_server("429 Too Many Requests").await;
        let client = RetryingClient::new(fast_policy(1), 5);

        let err = client.get(&url).await.unwrap_err();
        assert!(matches!(err, ClientError::RetriesExhausted { attempts: 2, .. }));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }
}
