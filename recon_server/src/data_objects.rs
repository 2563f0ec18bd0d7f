use std::fmt::Display;

use recon_common::Money;
use recon_engine::db_types::{
    CustomerInfo,
    GatewayPaymentStatus,
    LineItem,
    NewOrder,
    OrderId,
    OrderValidationError,
    OrderNumber,
    OrderStatus,
    ReconciliationSignal,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub customer: CustomerInfo,
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub shipping: Money,
    pub currency: String,
}

impl TryFrom<CheckoutRequest> for NewOrder {
    type Error = OrderValidationError;

    fn try_from(req: CheckoutRequest) -> Result<Self, Self::Error> {
        NewOrder::new(req.customer, req.items, req.shipping, &req.currency)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutResponse {
    pub order_id: OrderId,
    pub order_number: OrderNumber,
    pub status: OrderStatus,
    pub total: Money,
    /// Handed to the storefront so the customer completes payment directly with the gateway.
    pub client_secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmPaymentRequest {
    pub payment_intent_id: String,
    pub order_id: OrderId,
}

/// The gateway's webhook payload, as delivered to `/webhook/payment`. The reported status is
/// kept as a raw string; mapping it onto the order state machine is the engine's business.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayWebhookEvent {
    pub event_type: String,
    pub intent_id: String,
    pub reported_status: String,
}

impl From<GatewayWebhookEvent> for ReconciliationSignal {
    fn from(event: GatewayWebhookEvent) -> Self {
        ReconciliationSignal::Webhook {
            event_type: event.event_type,
            intent_id: event.intent_id,
            reported_status: GatewayPaymentStatus::from(event.reported_status.as_str()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingNoteRequest {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub tracking_number: Option<String>,
}
