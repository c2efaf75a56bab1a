use crate::config::FetchConfig;
use crate::types::Result;
use backoff::{backoff::Backoff, exponential::ExponentialBackoff};
use interfaces::ImportError;
use reqwest::{Client, StatusCode};
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use url::Url;

/// Shared HTTP client for the source connectors, with bounded retries.
pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .build()?;

        Ok(Self { client, config })
    }

    /// GET `url` and return the body. Transport errors, 429 and 5xx are
    /// retried with exponential backoff; other non-success statuses fail at once.
    pub async fn get_text(&self, source_name: &str, url: &Url) -> std::result::Result<String, ImportError> {
        let start_time = Instant::now();
        let retry_delay = Duration::from_millis(self.config.retry_delay_millis);

        let mut backoff: ExponentialBackoff<backoff::SystemClock> = ExponentialBackoff {
            current_interval: retry_delay,
            initial_interval: retry_delay,
            max_interval: retry_delay * 32,
            multiplier: 2.0,
            max_elapsed_time: Some(Duration::from_secs(self.config.timeout_seconds * 4)),
            ..Default::default()
        };

        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            let error = match self.client.get(url.clone()).send().await {
                Ok(response) if response.status().is_success() => match response.text().await {
                    Ok(body) => {
                        debug!(
                            source = source_name,
                            bytes = body.len(),
                            elapsed_ms = start_time.elapsed().as_millis() as u64,
                            "Fetched source payload"
                        );
                        return Ok(body);
                    }
                    Err(e) => ImportError::network(source_name, e),
                },
                Ok(response) => {
                    let status = response.status();
                    let error = ImportError::Unavailable {
                        source_name: source_name.to_string(),
                        status: status.as_u16(),
                    };
                    if !is_retryable(status) {
                        return Err(error);
                    }
                    error
                }
                Err(e) => ImportError::network(source_name, e),
            };

            if attempt < self.config.max_retries {
                if let Some(delay) = backoff.next_backoff() {
                    warn!(source = source_name, attempt = attempt + 1, ?delay, error = %error, "Fetch failed, retrying");
                    last_error = Some(error);
                    tokio::time::sleep(delay).await;
                    continue;
                }
            }
            last_error = Some(error);
            break;
        }

        Err(last_error.unwrap_or_else(|| ImportError::network(source_name, "no attempt was made")))
    }
}

fn is_retryable(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}
