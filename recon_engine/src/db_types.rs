use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use log::error;
use recon_common::Money;
use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

//--------------------------------------       OrderId        --------------------------------------------------------
/// The database identifier for an order. Opaque and stable; never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct OrderId(pub i64);

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<i64> for OrderId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl OrderId {
    pub fn value(&self) -> i64 {
        self.0
    }
}

//--------------------------------------     OrderNumber      --------------------------------------------------------
/// The human-facing order number. 8 uppercase alphanumeric characters, globally unique.
#[derive(Debug, Clone, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct OrderNumber(pub String);

impl Display for OrderNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for OrderNumber {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for OrderNumber {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl OrderNumber {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------     OrderStatus      --------------------------------------------------------
/// The authoritative order status. Transitions are monotonic:
/// `Pending → Processing → Shipped → Delivered`, with `Cancelled` reachable from `Pending` or
/// `Processing`. `Delivered` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum OrderStatus {
    /// The order has been created but payment has not been confirmed by the gateway.
    Pending,
    /// Payment has been confirmed and the order is being prepared.
    Processing,
    /// The order has been handed to the carrier.
    Shipped,
    /// The order has reached the customer. Terminal.
    Delivered,
    /// The order was cancelled before shipment. Terminal.
    Cancelled,
}

impl OrderStatus {
    /// Position in the monotonic ordering `Pending < Processing < Shipped < Delivered`.
    /// `Cancelled` sits outside the linear chain and has no rank.
    pub fn rank(&self) -> Option<u8> {
        match self {
            OrderStatus::Pending => Some(0),
            OrderStatus::Processing => Some(1),
            OrderStatus::Shipped => Some(2),
            OrderStatus::Delivered => Some(3),
            OrderStatus::Cancelled => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// The transition table. Anything not listed here is rejected without mutating state or
    /// touching the ledger.
    pub fn can_transition_to(&self, target: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, target),
            (Pending, Processing) |
                (Processing, Shipped) |
                (Shipped, Delivered) |
                (Pending, Cancelled) |
                (Processing, Cancelled)
        )
    }

    /// True if this status is the target, or strictly later in the monotonic ordering. Used as the
    /// idempotency test: a duplicate signal for an already-reached status is a no-op success.
    pub fn at_or_past(&self, target: OrderStatus) -> bool {
        if *self == target {
            return true;
        }
        match (self.rank(), target.rank()) {
            (Some(current), Some(wanted)) => current >= wanted,
            _ => false,
        }
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "Pending"),
            OrderStatus::Processing => write!(f, "Processing"),
            OrderStatus::Shipped => write!(f, "Shipped"),
            OrderStatus::Delivered => write!(f, "Delivered"),
            OrderStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid order status: {0}")]
pub struct ConversionError(String);

impl FromStr for OrderStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Processing" => Ok(Self::Processing),
            "Shipped" => Ok(Self::Shipped),
            "Delivered" => Ok(Self::Delivered),
            "Cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError(s.to_string())),
        }
    }
}

impl From<String> for OrderStatus {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid order status in storage: {value}. Defaulting to Pending");
            OrderStatus::Pending
        })
    }
}

//--------------------------------------      EventKind       --------------------------------------------------------
/// The kind of a tracking ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum EventKind {
    /// Records an order status transition. Carries the resulting status.
    StatusChange,
    /// A free-form note (carrier hand-off, delivery attempt, etc). Does not change status.
    Informational,
}

impl Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventKind::StatusChange => write!(f, "StatusChange"),
            EventKind::Informational => write!(f, "Informational"),
        }
    }
}

impl FromStr for EventKind {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "StatusChange" => Ok(Self::StatusChange),
            "Informational" => Ok(Self::Informational),
            s => Err(ConversionError(s.to_string())),
        }
    }
}

//--------------------------------------      LineItem        --------------------------------------------------------
/// A snapshot of a purchased product at order time. Immutable: later catalog edits never touch it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: String,
    pub name: String,
    pub unit_price: Money,
    pub quantity: u32,
}

impl LineItem {
    /// `None` when the line total cannot be represented in minor units. Unit price and quantity
    /// come straight off the wire, so this multiplication must not wrap.
    pub fn line_total(&self) -> Option<Money> {
        self.unit_price.checked_mul(i64::from(self.quantity))
    }
}

//--------------------------------------    CustomerInfo      --------------------------------------------------------
/// Contact details captured on the order at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<String>,
}

//--------------------------------------      NewOrder        --------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    pub customer: CustomerInfo,
    pub items: Vec<LineItem>,
    pub subtotal: Money,
    pub shipping: Money,
    pub total: Money,
    pub currency: String,
}

#[derive(Debug, Clone, Error)]
pub enum OrderValidationError {
    #[error("Order total {total} does not equal subtotal {subtotal} plus shipping {shipping}")]
    TotalMismatch { subtotal: Money, shipping: Money, total: Money },
    #[error("Line items do not add up to the subtotal: items total {items_total}, subtotal {subtotal}")]
    SubtotalMismatch { items_total: Money, subtotal: Money },
    #[error("An order must contain at least one line item")]
    NoItems,
    #[error("Monetary amounts must not be negative")]
    NegativeAmount,
    #[error("A line item must have a positive quantity")]
    ZeroQuantity,
    #[error("Customer email '{0}' is not valid")]
    BadEmail(String),
    #[error("Customer name must not be empty")]
    EmptyName,
    #[error("Order amounts are too large to represent")]
    AmountOverflow,
}

fn sum_line_totals(items: &[LineItem]) -> Option<Money> {
    items.iter().try_fold(Money::default(), |acc, item| acc.checked_add(item.line_total()?))
}

impl NewOrder {
    pub fn new(
        customer: CustomerInfo,
        items: Vec<LineItem>,
        shipping: Money,
        currency: &str,
    ) -> Result<Self, OrderValidationError> {
        let subtotal = sum_line_totals(&items).ok_or(OrderValidationError::AmountOverflow)?;
        let total = subtotal.checked_add(shipping).ok_or(OrderValidationError::AmountOverflow)?;
        Ok(Self { customer, items, subtotal, shipping, total, currency: currency.to_string() })
    }

    /// Checks the creation invariants: `total == subtotal + shipping`, the line items account for
    /// the subtotal, no negative amounts, and a plausible customer snapshot.
    pub fn validate(&self) -> Result<(), OrderValidationError> {
        if self.items.is_empty() {
            return Err(OrderValidationError::NoItems);
        }
        if self.items.iter().any(|i| i.quantity == 0) {
            return Err(OrderValidationError::ZeroQuantity);
        }
        if self.subtotal.is_negative() ||
            self.shipping.is_negative() ||
            self.items.iter().any(|i| i.unit_price.is_negative())
        {
            return Err(OrderValidationError::NegativeAmount);
        }
        let expected_total =
            self.subtotal.checked_add(self.shipping).ok_or(OrderValidationError::AmountOverflow)?;
        if expected_total != self.total {
            return Err(OrderValidationError::TotalMismatch {
                subtotal: self.subtotal,
                shipping: self.shipping,
                total: self.total,
            });
        }
        let items_total = sum_line_totals(&self.items).ok_or(OrderValidationError::AmountOverflow)?;
        if items_total != self.subtotal {
            return Err(OrderValidationError::SubtotalMismatch { items_total, subtotal: self.subtotal });
        }
        if self.customer.name.trim().is_empty() {
            return Err(OrderValidationError::EmptyName);
        }
        let email = self.customer.email.trim();
        if email.len() < 3 || !email.contains('@') {
            return Err(OrderValidationError::BadEmail(self.customer.email.clone()));
        }
        Ok(())
    }
}

//--------------------------------------        Order         --------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub order_number: OrderNumber,
    pub status: OrderStatus,
    /// Set when the payment attempt starts; once set it is never reassigned to a different intent.
    pub payment_intent_id: Option<String>,
    pub currency: String,
    pub subtotal: Money,
    pub shipping: Money,
    pub total: Money,
    pub customer: CustomerInfo,
    pub items: Vec<LineItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------    TrackingEvent     --------------------------------------------------------
/// One entry in the append-only tracking ledger. Never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingEvent {
    pub id: i64,
    pub order_id: OrderId,
    pub kind: EventKind,
    /// The resulting status for `StatusChange` entries; `None` for informational notes.
    pub status: Option<OrderStatus>,
    pub title: String,
    pub description: String,
    pub location: Option<String>,
    pub tracking_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

//--------------------------------     GatewayPaymentStatus    -------------------------------------------------------
/// A status string as reported by the payment gateway. Unknown values are carried, not rejected;
/// the engine simply ignores them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GatewayPaymentStatus {
    Succeeded,
    Canceled,
    Other(String),
}

impl GatewayPaymentStatus {
    /// The order status this gateway report maps to. `None` means the report does not advance the
    /// order (e.g. `requires_payment_method`, `processing` on the gateway side).
    pub fn target_order_status(&self) -> Option<OrderStatus> {
        match self {
            GatewayPaymentStatus::Succeeded => Some(OrderStatus::Processing),
            GatewayPaymentStatus::Canceled => Some(OrderStatus::Cancelled),
            GatewayPaymentStatus::Other(_) => None,
        }
    }
}

impl From<&str> for GatewayPaymentStatus {
    fn from(value: &str) -> Self {
        match value {
            "succeeded" => Self::Succeeded,
            "canceled" | "cancelled" => Self::Canceled,
            other => Self::Other(other.to_string()),
        }
    }
}

impl Display for GatewayPaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayPaymentStatus::Succeeded => write!(f, "succeeded"),
            GatewayPaymentStatus::Canceled => write!(f, "canceled"),
            GatewayPaymentStatus::Other(s) => write!(f, "{s}"),
        }
    }
}

//--------------------------------    ReconciliationSignal     -------------------------------------------------------
/// The single input type of the reconciliation engine. Both delivery paths, the gateway webhook
/// and the client-initiated confirmation, reduce to one of these before any state is touched, so
/// the engine is testable without an HTTP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ReconciliationSignal {
    Webhook { event_type: String, intent_id: String, reported_status: GatewayPaymentStatus },
    ClientConfirm { intent_id: String, order_id: OrderId, verified_status: GatewayPaymentStatus },
}

impl ReconciliationSignal {
    pub fn intent_id(&self) -> &str {
        match self {
            ReconciliationSignal::Webhook { intent_id, .. } => intent_id,
            ReconciliationSignal::ClientConfirm { intent_id, .. } => intent_id,
        }
    }

    pub fn reported_status(&self) -> &GatewayPaymentStatus {
        match self {
            ReconciliationSignal::Webhook { reported_status, .. } => reported_status,
            ReconciliationSignal::ClientConfirm { verified_status, .. } => verified_status,
        }
    }

    pub fn source(&self) -> &'static str {
        match self {
            ReconciliationSignal::Webhook { .. } => "gateway webhook",
            ReconciliationSignal::ClientConfirm { .. } => "client confirmation",
        }
    }
}
