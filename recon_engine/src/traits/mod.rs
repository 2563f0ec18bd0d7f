//! Boundary contracts of the reconciliation engine.
//!
//! The engine owns order status, but everything around it is an external collaborator specified
//! only at its boundary:
//!
//! * [`ReconciliationDatabase`] is the write-side store contract: order insertion, the conditional
//!   status-transition primitive, and the append-only tracking ledger.
//! * [`OrderManagement`] is the read-side store contract: order and ledger queries.
//! * [`PaymentGateway`] creates and retrieves payment intents. The engine never trusts a
//!   client-supplied status; it always re-derives status through this trait (or from a
//!   signature-verified webhook payload).
//! * [`NotificationDispatcher`] delivers customer messages best-effort. Its failures are isolated:
//!   a notification problem never surfaces as a failed payment.
mod notifications;
mod order_management;
mod payment_gateway;
mod reconciliation_database;

pub use notifications::NotificationDispatcher;
pub use order_management::{OrderManagement, OrderQueryError};
pub use payment_gateway::{GatewayError, PaymentGateway, PaymentIntent};
pub use reconciliation_database::{ReconciliationDatabase, ReconciliationError};
