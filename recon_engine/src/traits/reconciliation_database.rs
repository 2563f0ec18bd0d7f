use thiserror::Error;

use crate::{
    db_types::{NewOrder, Order, OrderId, OrderNumber, OrderStatus, OrderValidationError, TrackingEvent},
    traits::{GatewayError, OrderManagement, OrderQueryError},
};

/// The write-side contract a backend must satisfy to host the reconciliation engine.
///
/// The pivotal method is [`transition_order`](ReconciliationDatabase::transition_order): a single
/// conditional write that is the serialization point for racing callers. Everything else the
/// engine does — idempotency, exactly-once ledger appends, duplicate webhook collapse — leans on
/// that primitive.
#[allow(async_fn_in_trait)]
pub trait ReconciliationDatabase: Clone + OrderManagement {
    /// The URL of the database.
    fn url(&self) -> &str;

    /// Stores a new order atomically with its gateway intent reference and the synthesized
    /// "Order placed" ledger entry. The intent reference is written exactly once here; no write
    /// path exists to reassign it afterwards.
    async fn insert_order(
        &self,
        order: NewOrder,
        number: OrderNumber,
        intent_id: &str,
    ) -> Result<Order, ReconciliationError>;

    /// Uniqueness probe for the order-number generator.
    async fn order_number_exists(&self, number: &OrderNumber) -> Result<bool, ReconciliationError>;

    /// The conditional-update primitive: in one atomic transaction, set the order's status to
    /// `new_status` only if it is still `expected`, and append exactly one `StatusChange` ledger
    /// entry recording the transition.
    ///
    /// Returns `None` (with no side effects) if the order's status was no longer `expected`; the
    /// losing half of a race observes this and exits without writing anything.
    async fn transition_order(
        &self,
        id: OrderId,
        expected: OrderStatus,
        new_status: OrderStatus,
        title: &str,
        description: &str,
    ) -> Result<Option<(Order, TrackingEvent)>, ReconciliationError>;

    /// Appends an informational ledger entry (carrier hand-off, delivery note). Never changes
    /// the order status.
    async fn append_info_event(
        &self,
        id: OrderId,
        title: &str,
        description: &str,
        location: Option<String>,
        tracking_number: Option<String>,
    ) -> Result<TrackingEvent, ReconciliationError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), ReconciliationError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
pub enum ReconciliationError {
    #[error("Internal database error: {0}")]
    DatabaseError(String),
    #[error("The requested order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("No order references payment intent '{0}'")]
    IntentNotFound(String),
    #[error("Payment intent '{intent_id}' does not belong to order {order_id}")]
    IntentMismatch { intent_id: String, order_id: OrderId },
    #[error("Illegal status transition from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
    #[error("Order validation failed: {0}")]
    Validation(#[from] OrderValidationError),
    #[error("Payment gateway error: {0}")]
    Gateway(#[from] GatewayError),
    #[error("{0}")]
    QueryError(#[from] OrderQueryError),
}

impl From<sqlx::Error> for ReconciliationError {
    fn from(e: sqlx::Error) -> Self {
        ReconciliationError::DatabaseError(e.to_string())
    }
}
