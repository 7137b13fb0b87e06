use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use super::classify::AccrualResponse;
use super::error::ClientError;
use crate::domain::{AccrualResult, OrderNumber};

/// Accrual service client configuration.
#[derive(Debug, Clone)]
pub struct AccrualClientConfig {
    /// Base address, e.g. `http://localhost:8080`. A missing scheme means http.
    pub base_address: String,

    /// Per-request timeout.
    pub timeout: Duration,

    /// Extra attempts after a network error or a 429.
    pub retry_count: usize,

    /// Fixed wait between attempts.
    pub retry_wait: Duration,
}

impl Default for AccrualClientConfig {
    fn default() -> Self {
        Self {
            base_address: "http://localhost:8080".to_string(),
            timeout: Duration::from_secs(10),
            retry_count: 3,
            retry_wait: Duration::from_secs(5),
        }
    }
}

impl AccrualClientConfig {
    pub fn with_base_address(mut self, base_address: impl Into<String>) -> Self {
        self.base_address = base_address.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry_count(mut self, retry_count: usize) -> Self {
        self.retry_count = retry_count;
        self
    }

    pub fn with_retry_wait(mut self, retry_wait: Duration) -> Self {
        self.retry_wait = retry_wait;
        self
    }
}

/// Looks up the accrual verdict for one order
#[async_trait]
pub trait AccrualClient: Send + Sync {
    async fn lookup(&self, order: &OrderNumber) -> Result<AccrualResponse, ClientError>;
}

/// reqwest-backed accrual client with fixed-interval retry.
///
/// Network errors and 429 responses are retried up to `retry_count` times.
/// The final response (or error) is returned as-is for classification.
pub struct HttpAccrualClient {
    client: Client,
    base_url: String,
    config: AccrualClientConfig,
}

impl HttpAccrualClient {
    pub fn new(config: AccrualClientConfig) -> Result<Self, ClientError> {
        let base_url = normalize_base(&config.base_address)?;
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            base_url,
            config,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn order_url(&self, order: &OrderNumber) -> String {
        format!("{}/api/orders/{}", self.base_url, order)
    }

    async fn send_once(&self, url: &str) -> Result<AccrualResponse, reqwest::Error> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        let body = if status == StatusCode::OK {
            match response.json::<AccrualResult>().await {
                Ok(result) => Some(result),
                Err(e) => {
                    warn!(url, error = %e, "Accrual response body could not be decoded");
                    None
                }
            }
        } else {
            None
        };

        Ok(AccrualResponse { status, body })
    }

    fn is_retryable(outcome: &Result<AccrualResponse, reqwest::Error>) -> bool {
        match outcome {
            Ok(response) => response.status == StatusCode::TOO_MANY_REQUESTS,
            Err(_) => true,
        }
    }
}

#[async_trait]
impl AccrualClient for HttpAccrualClient {
    async fn lookup(&self, order: &OrderNumber) -> Result<AccrualResponse, ClientError> {
        let url = self.order_url(order);
        let mut attempt = 0;

        loop {
            attempt += 1;
            let outcome = self.send_once(&url).await;

            if !Self::is_retryable(&outcome) || attempt > self.config.retry_count {
                return outcome.map_err(ClientError::from);
            }

            match &outcome {
                Ok(response) => debug!(
                    order = %order,
                    attempt,
                    status = %response.status,
                    wait_ms = self.config.retry_wait.as_millis() as u64,
                    "Accrual lookup rate limited, retrying"
                ),
                Err(e) => debug!(
                    order = %order,
                    attempt,
                    error = %e,
                    wait_ms = self.config.retry_wait.as_millis() as u64,
                    "Accrual lookup failed, retrying"
                ),
            }

            tokio::time::sleep(self.config.retry_wait).await;
        }
    }
}

fn normalize_base(address: &str) -> Result<String, ClientError> {
    let trimmed = address.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ClientError::InvalidAddress(address.to_string()));
    }
    if trimmed.contains("://") {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("http://{trimmed}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_base_address() {
        assert_eq!(
            normalize_base("localhost:8080").unwrap(),
            "http://localhost:8080"
        );
        assert_eq!(
            normalize_base("https://accrual.example/").unwrap(),
            "https://accrual.example"
        );
        assert!(matches!(
            normalize_base("  "),
            Err(ClientError::InvalidAddress(_))
        ));
    }

    #[test]
    fn builds_order_url() {
        let client = HttpAccrualClient::new(
            AccrualClientConfig::default().with_base_address("127.0.0.1:9000/"),
        )
        .unwrap();
        let order = OrderNumber::parse("49927398716").unwrap();

        assert_eq!(client.base_url(), "http://127.0.0.1:9000");
        assert_eq!(
            client.order_url(&order),
            "http://127.0.0.1:9000/api/orders/49927398716"
        );
    }

    #[test]
    fn config_builder_overrides_defaults() {
        let config = AccrualClientConfig::default()
            .with_retry_count(1)
            .with_retry_wait(Duration::from_millis(10))
            .with_timeout(Duration::from_secs(1));

        assert_eq!(config.retry_count, 1);
        assert_eq!(config.retry_wait, Duration::from_millis(10));
        assert_eq!(config.timeout, Duration::from_secs(1));
    }
}
