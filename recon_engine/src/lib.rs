//! # Order/payment reconciliation engine
//!
//! This library keeps an order's authoritative status consistent with a payment gateway's
//! asynchronous truth, producing an append-only audit trail and triggering customer notifications
//! exactly once per meaningful transition — in the presence of out-of-order delivery, duplicate
//! webhook retries, and a client-initiated confirmation racing the gateway's own webhook.
//!
//! The library is divided into three main sections:
//! 1. The data types and state machine ([`mod@db_types`]): orders, the tracking ledger, and the
//!    monotonic order-status transition table.
//! 2. The boundary traits ([`mod@traits`]): the store, gateway, and notification contracts.
//!    Backends implement these; the SQLite backend in this crate is the reference implementation.
//! 3. The engine API ([`mod@api`]): reconciliation, checkout, and read-side queries. All
//!    collaborators arrive through constructors — there is no ambient global state.
//!
//! A small event-hook system ([`mod@events`]) decouples notification dispatch from the critical
//! path: transitions publish events into channels, and subscribers run on their own tasks with
//! their own timeouts.
pub mod api;
pub mod db_types;
pub mod events;
pub mod helpers;
pub mod traits;

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use api::{
    order_objects,
    CheckoutApi,
    OrderQueryApi,
    ReconcileOutcome,
    ReconciliationApi,
};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use traits::{
    GatewayError,
    NotificationDispatcher,
    OrderManagement,
    PaymentGateway,
    ReconciliationDatabase,
    ReconciliationError,
};
