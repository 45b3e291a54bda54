//! Rate-limited HTTP fetcher for the legislation portals.
//!
//! All requests made through one [`Fetcher`] share a single [`RateLimiter`],
//! so the minimum spacing holds across hosts and across retries.

use std::io::Read;
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;

use crate::config::HarvestConfig;
use crate::error::{HarvesterError, Result};

/// User agent string identifying this harvester.
const USER_AGENT: &str = concat!("fagui-harvester/", env!("CARGO_PKG_VERSION"));

/// Enforces a minimum interval between consecutive requests.
///
/// The last-request timestamp is read and written under one lock, so two
/// callers can never both observe an expired interval and fire together.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: Mutex::new(None),
        }
    }

    /// Block until the interval since the previous request has elapsed, then
    /// record the current instant as the new last request.
    pub fn acquire(&self) {
        let mut last = match self.last_request.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                tracing::trace!(wait_ms = wait.as_millis() as u64, "Rate limiting");
                thread::sleep(wait);
            }
        }

        *last = Some(Instant::now());
    }
}

/// Blocking HTTP client with politeness delay, bounded retry and a size cap.
#[derive(Debug)]
pub struct Fetcher {
    client: Client,
    limiter: RateLimiter,
    max_attempts: u32,
    retry_base_delay: Duration,
    max_response_size: u64,
}

impl Fetcher {
    /// Create a fetcher from harvest settings.
    pub fn new(config: &HarvestConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            limiter: RateLimiter::new(config.min_interval),
            max_attempts: config.max_attempts.max(1),
            retry_base_delay: config.retry_base_delay,
            max_response_size: config.max_response_size,
        })
    }

    /// Download a page as text with retry logic.
    ///
    /// 5xx, 429 and transport failures are retried with exponential backoff
    /// (base, 2x base, 4x base, ...). Other 4xx statuses fail immediately.
    /// Timeouts count as transport failures. The body is read as UTF-8, with
    /// invalid sequences replaced.
    pub fn fetch_text(&self, url: &str) -> Result<String> {
        let mut last_error: Option<String> = None;

        for attempt in 0..self.max_attempts {
            if attempt > 0 {
                let factor = 1u32 << (attempt - 1).min(16);
                let delay = self.retry_base_delay.saturating_mul(factor);
                tracing::debug!(
                    url,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "Retrying after delay"
                );
                thread::sleep(delay);
            }

            self.limiter.acquire();

            match self.client.get(url).send() {
                Ok(response) => {
                    let status = response.status();

                    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
                        tracing::warn!(
                            url,
                            status = %status,
                            attempt = attempt + 1,
                            max_attempts = self.max_attempts,
                            "Server error, will retry"
                        );
                        last_error = Some(format!("Server error: {status}"));
                        continue;
                    }

                    if !status.is_success() {
                        return Err(HarvesterError::HttpStatus {
                            status: status.as_u16(),
                            url: url.to_string(),
                        });
                    }

                    match self.read_body(url, response) {
                        Ok(body) => return Ok(body),
                        Err(HarvesterError::Io(e)) => {
                            tracing::warn!(url, error = %e, attempt = attempt + 1, "Body read failed, will retry");
                            last_error = Some(e.to_string());
                        }
                        Err(e) => return Err(e),
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        url,
                        error = %e,
                        attempt = attempt + 1,
                        max_attempts = self.max_attempts,
                        "Transport error, will retry"
                    );
                    last_error = Some(e.to_string());
                }
            }
        }

        Err(HarvesterError::RetriesExhausted {
            url: url.to_string(),
            attempts: self.max_attempts,
            message: last_error.unwrap_or_else(|| "Unknown error".to_string()),
        })
    }

    /// Read at most `max_response_size` bytes; one byte more means the body
    /// is too large, whether or not the server announced its length.
    fn read_body(&self, url: &str, response: Response) -> Result<String> {
        if let Some(size) = response.content_length() {
            if size > self.max_response_size {
                return Err(self.too_large(url, size));
            }
        }

        let mut bytes = Vec::new();
        response
            .take(self.max_response_size.saturating_add(1))
            .read_to_end(&mut bytes)?;

        let size = bytes.len() as u64;
        if size > self.max_response_size {
            return Err(self.too_large(url, size));
        }

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn too_large(&self, url: &str, size: u64) -> HarvesterError {
        HarvesterError::ResponseTooLarge {
            url: url.to_string(),
            size,
            max: self.max_response_size,
        }
    }
}
