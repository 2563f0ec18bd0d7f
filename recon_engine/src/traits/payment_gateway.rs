use std::collections::HashMap;

use recon_common::Money;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db_types::GatewayPaymentStatus;

/// A freshly created payment intent. The client secret is handed to the storefront so the
/// customer can complete payment directly with the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub intent_id: String,
    pub client_secret: String,
}

#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("Could not reach the payment gateway: {0}")]
    Http(String),
    #[error("The payment gateway rejected the request: {0}")]
    Api(String),
    #[error("Could not decode the gateway response: {0}")]
    Decode(String),
}

/// The payment gateway boundary. The gateway owns payment truth; the engine only caches the
/// intent identifier on the order and mirrors gateway status through reconciliation.
///
/// Implementations are expected to be cheap to share (`Arc` or internal pooling); the engine
/// borrows them per call and never stores one.
#[allow(async_fn_in_trait)]
pub trait PaymentGateway: Send + Sync {
    /// Creates an intent to collect `amount` in `currency`. The metadata travels to the gateway
    /// and comes back on its webhooks, which helps manual dispute resolution.
    async fn create_intent(
        &self,
        amount: Money,
        currency: &str,
        metadata: HashMap<String, String>,
    ) -> Result<PaymentIntent, GatewayError>;

    /// Fetches the authoritative status of an intent. This is the call that makes client-initiated
    /// confirmation trustworthy: the reported status comes from the gateway, not the client.
    async fn retrieve_intent(&self, intent_id: &str) -> Result<GatewayPaymentStatus, GatewayError>;
}
