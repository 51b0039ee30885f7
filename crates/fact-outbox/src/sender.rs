//! Retry driver wrapping the delivery transport.

use crate::{Fact, FactDelivery, HttpFactDelivery, RetriesExhausted};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, warn};

/// Fixed endpoint of the fact intake API.
pub const DEFAULT_ENDPOINT: &str = "https://development.kpi-drive.ru/_api/facts/save_fact";

/// Bearer token for the fact intake API.
pub const DEFAULT_AUTH_TOKEN: &str = "48ab34464a5573519725deb5865cc74c";

/// Sender configuration.
#[derive(Debug, Clone)]
pub struct SenderConfig {
    /// Target URL for fact submission.
    pub endpoint: String,
    /// Bearer token sent with every request.
    pub auth_token: String,
    /// Maximum delivery attempts per fact.
    pub max_attempts: u32,
    /// Fixed pause between consecutive attempts.
    pub retry_delay: Duration,
    /// Per-attempt request timeout.
    pub attempt_timeout: Duration,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            auth_token: DEFAULT_AUTH_TOKEN.to_string(),
            max_attempts: 3,
            retry_delay: Duration::from_secs(1),
            attempt_timeout: Duration::from_secs(5),
        }
    }
}

/// Drives one fact's delivery through the attempt budget.
///
/// Attempts are strictly sequential with a constant inter-attempt delay;
/// there is no backoff and no jitter.
pub struct FactSender {
    config: SenderConfig,
    delivery: Arc<dyn FactDelivery>,
}

impl FactSender {
    /// Create a sender that delivers over HTTP.
    pub fn new(config: SenderConfig) -> Self {
        let delivery = Arc::new(HttpFactDelivery::new(&config));
        Self { config, delivery }
    }

    /// Create a sender with a custom delivery transport.
    pub fn with_delivery(config: SenderConfig, delivery: Arc<dyn FactDelivery>) -> Self {
        Self { config, delivery }
    }

    /// The sender's configuration.
    pub fn config(&self) -> &SenderConfig {
        &self.config
    }

    /// Deliver one fact, retrying failed attempts with a fixed delay.
    ///
    /// Returns on the first successful attempt. The delay is applied only
    /// between consecutive attempts, never before the first or after the
    /// last. After `max_attempts` failures the last error is folded into
    /// [`RetriesExhausted`].
    pub async fn send(&self, fact: &Fact) -> Result<(), RetriesExhausted> {
        let mut attempt = 0;

        loop {
            attempt += 1;

            match self.delivery.deliver(fact).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    if attempt >= self.config.max_attempts {
                        error!(
                            value = fact.value,
                            attempt = attempt,
                            error = %e,
                            "All delivery attempts failed"
                        );
                        return Err(RetriesExhausted {
                            attempts: attempt,
                            last_error: e,
                        });
                    }

                    warn!(
                        value = fact.value,
                        attempt = attempt,
                        error = %e,
                        "Delivery attempt failed, retrying"
                    );

                    tokio::time::sleep(self.config.retry_delay).await;
                }
            }
        }
    }
}
