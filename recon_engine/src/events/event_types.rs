use serde::{Deserialize, Serialize};

use crate::db_types::{Order, OrderStatus, TrackingEvent};

/// Emitted after a status transition has been durably applied and its ledger entry written.
/// Consumers (the notification dispatcher chiefly) run on their own tasks; nothing on the
/// reconciliation path waits for them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusChangedEvent {
    pub order: Order,
    pub previous: OrderStatus,
    pub ledger_entry: TrackingEvent,
}

impl OrderStatusChangedEvent {
    pub fn new(order: Order, previous: OrderStatus, ledger_entry: TrackingEvent) -> Self {
        Self { order, previous, ledger_entry }
    }
}

/// Emitted once per newly created order, after the order row and its synthesized "Order placed"
/// ledger entry have been committed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPlacedEvent {
    pub order: Order,
}

impl OrderPlacedEvent {
    pub fn new(order: Order) -> Self {
        Self { order }
    }
}
