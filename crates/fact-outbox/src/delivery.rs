//! Transport seam for single delivery attempts.

use crate::{DeliveryError, DeliveryResult, Fact, SenderConfig};
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

/// One delivery attempt for one fact.
///
/// Implementations perform exactly one transport call; retry policy lives
/// in [`FactSender`](crate::FactSender).
#[async_trait]
pub trait FactDelivery: Send + Sync {
    /// Attempt to deliver a single fact.
    async fn deliver(&self, fact: &Fact) -> DeliveryResult<()>;
}

/// HTTP implementation of [`FactDelivery`] for the fact intake API.
///
/// The client is built once with the per-attempt timeout and is safe for
/// concurrent reuse across delivery tasks.
pub struct HttpFactDelivery {
    client: Client,
    endpoint: String,
    auth_token: String,
}

impl HttpFactDelivery {
    /// Create a new HTTP delivery transport.
    pub fn new(config: &SenderConfig) -> Self {
        let client = Client::builder()
            .timeout(config.attempt_timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            endpoint: config.endpoint.clone(),
            auth_token: config.auth_token.clone(),
        }
    }
}

#[async_trait]
impl FactDelivery for HttpFactDelivery {
    async fn deliver(&self, fact: &Fact) -> DeliveryResult<()> {
        debug!(value = fact.value, url = %self.endpoint, "Sending fact");

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.auth_token))
            .form(&fact.form_fields())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}
