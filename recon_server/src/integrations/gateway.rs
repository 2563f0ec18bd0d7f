//! REST client for the upstream payment gateway.
//!
//! Speaks the Stripe-style payment-intents API: form-encoded creates, bearer-token auth, JSON
//! responses. Only the two calls the engine's [`PaymentGateway`] contract needs are implemented.

use std::{collections::HashMap, sync::Arc, time::Duration};

use log::*;
use recon_common::Money;
use recon_engine::{
    db_types::GatewayPaymentStatus,
    traits::{GatewayError, PaymentGateway, PaymentIntent},
};
use reqwest::Client;
use serde::Deserialize;

use crate::config::GatewayConfig;

const GATEWAY_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Clone)]
pub struct HttpPaymentGateway {
    config: GatewayConfig,
    client: Arc<Client>,
}

/// The slice of the gateway's intent object we care about.
#[derive(Debug, Deserialize)]
struct IntentResponse {
    id: String,
    status: String,
    client_secret: Option<String>,
}

impl HttpPaymentGateway {
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(GATEWAY_TIMEOUT)
            .build()
            .map_err(|e| GatewayError::Http(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/payment_intents{path}", self.config.base_url)
    }

    async fn decode(&self, response: reqwest::Response) -> Result<IntentResponse, GatewayError> {
        if response.status().is_success() {
            response.json::<IntentResponse>().await.map_err(|e| GatewayError::Decode(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| GatewayError::Http(e.to_string()))?;
            Err(GatewayError::Api(format!("Error {status}. {message}")))
        }
    }
}

impl PaymentGateway for HttpPaymentGateway {
    async fn create_intent(
        &self,
        amount: Money,
        currency: &str,
        metadata: HashMap<String, String>,
    ) -> Result<PaymentIntent, GatewayError> {
        let mut form = vec![("amount".to_string(), amount.value().to_string()), ("currency".to_string(), currency.to_string())];
        for (k, v) in metadata {
            form.push((format!("metadata[{k}]"), v));
        }
        trace!("🌐️ Creating payment intent for {amount} {currency}");
        let response = self
            .client
            .post(self.url(""))
            .bearer_auth(self.config.api_key.reveal())
            .form(&form)
            .send()
            .await
            .map_err(|e| GatewayError::Http(e.to_string()))?;
        let intent = self.decode(response).await?;
        let client_secret = intent.client_secret.ok_or_else(|| {
            GatewayError::Decode(format!("Intent {} was created without a client secret", intent.id))
        })?;
        debug!("🌐️ Created payment intent [{}]", intent.id);
        Ok(PaymentIntent { intent_id: intent.id, client_secret })
    }

    async fn retrieve_intent(&self, intent_id: &str) -> Result<GatewayPaymentStatus, GatewayError> {
        trace!("🌐️ Retrieving payment intent [{intent_id}]");
        let response = self
            .client
            .get(self.url(&format!("/{intent_id}")))
            .bearer_auth(self.config.api_key.reveal())
            .send()
            .await
            .map_err(|e| GatewayError::Http(e.to_string()))?;
        let intent = self.decode(response).await?;
        debug!("🌐️ Intent [{intent_id}] is '{}'", intent.status);
        Ok(GatewayPaymentStatus::from(intent.status.as_str()))
    }
}
