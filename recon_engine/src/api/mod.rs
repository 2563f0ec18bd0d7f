//! The public API of the reconciliation engine.
//!
//! * [`ReconciliationApi`] — the core: maps gateway and administrative signals to order-status
//!   transitions exactly once, no matter how often or in what order the signals arrive.
//! * [`CheckoutApi`] — order creation: validation, order-number generation, gateway intent
//!   creation, and the atomic insert of the order with its first ledger entry.
//! * [`OrderQueryApi`] — the read side: order detail with tracking history, and filtered search.
pub mod checkout_api;
pub mod order_objects;
pub mod query_api;
pub mod reconciliation_api;

pub use checkout_api::CheckoutApi;
pub use query_api::OrderQueryApi;
pub use reconciliation_api::{ReconcileOutcome, ReconciliationApi};
