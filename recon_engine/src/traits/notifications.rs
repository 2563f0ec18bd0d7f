use crate::db_types::{Order, TrackingEvent};

/// The customer-notification boundary. Strictly best-effort: the return value is a boolean, not
/// an error type, and callers only log it. A failed notification must never roll back, delay, or
/// surface through the state transition that triggered it.
#[allow(async_fn_in_trait)]
pub trait NotificationDispatcher: Send + Sync {
    /// Sends the customer a message about the given ledger entry. Returns `true` if the message
    /// was accepted for delivery.
    async fn notify(&self, email: &str, name: &str, order: &Order, event: &TrackingEvent) -> bool;
}
