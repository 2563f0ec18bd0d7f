use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Order, OrderId, OrderStatus, ReconciliationSignal, TrackingEvent},
    events::{EventProducers, OrderStatusChangedEvent},
    traits::{OrderManagement, PaymentGateway, ReconciliationDatabase, ReconciliationError},
};

/// The outcome of feeding one signal through the engine. `AlreadyApplied` and `Ignored` are
/// successes: a duplicate webhook delivery or an unknown gateway status must be acknowledged so
/// the sender stops retrying.
#[derive(Debug, Clone)]
pub enum ReconcileOutcome {
    /// The transition was applied and exactly one ledger entry written.
    Applied { order: Order, ledger_entry: TrackingEvent },
    /// The order was already at (or past) the target status. Nothing was written.
    AlreadyApplied { order: Order },
    /// The reported gateway status does not map to an order transition. Nothing was written.
    Ignored { reported: String },
}

impl ReconcileOutcome {
    pub fn was_applied(&self) -> bool {
        matches!(self, ReconcileOutcome::Applied { .. })
    }
}

/// `ReconciliationApi` keeps an order's authoritative status consistent with the payment
/// gateway's asynchronous truth.
///
/// Two unordered input streams feed it for the same order: the client's confirmation call right
/// after checkout, and the gateway's own webhook deliveries, which can be duplicated, out of
/// order, or ahead of the client call. Every signal is reduced to "(order, target status)" and
/// applied through a single conditional write, so one real-world payment event produces exactly
/// one status change and one ledger entry no matter how many times it is reported.
///
/// All collaborators are injected; the engine holds no global state.
pub struct ReconciliationApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for ReconciliationApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ReconciliationApi")
    }
}

impl<B> ReconciliationApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }
}

impl<B> ReconciliationApi<B>
where B: ReconciliationDatabase
{
    /// Feeds one signal through the engine.
    ///
    /// The signal must resolve to exactly one existing order via its payment-intent identifier
    /// (and, for client confirmations, the order id must agree with the intent). Resolution
    /// failure is reported as an error and not retried here; the sender owns retry policy.
    ///
    /// Gateway-driven signals can never produce an illegal-transition error: a "canceled" report
    /// for an order that has moved past the point of cancellation is collapsed into
    /// [`ReconcileOutcome::AlreadyApplied`] so webhook re-deliveries always see success.
    pub async fn reconcile(&self, signal: ReconciliationSignal) -> Result<ReconcileOutcome, ReconciliationError> {
        let intent_id = signal.intent_id().to_string();
        let order = self
            .db
            .fetch_order_by_intent_id(&intent_id)
            .await?
            .ok_or_else(|| ReconciliationError::IntentNotFound(intent_id.clone()))?;
        if let ReconciliationSignal::ClientConfirm { order_id, .. } = &signal {
            if order.id != *order_id {
                warn!("🔄️ Client confirmation for intent [{intent_id}] names order {order_id}, but the intent belongs to {}", order.id);
                return Err(ReconciliationError::IntentMismatch { intent_id, order_id: *order_id });
            }
        }
        let reported = signal.reported_status().clone();
        let target = match reported.target_order_status() {
            Some(target) => target,
            None => {
                info!(
                    "🔄️ Gateway status '{reported}' for intent [{intent_id}] does not move order {}; ignoring",
                    order.id
                );
                return Ok(ReconcileOutcome::Ignored { reported: reported.to_string() });
            },
        };
        let description = format!("Payment status '{reported}' reported via {}.", signal.source());
        match self.apply_transition(order, target, &description).await {
            Err(ReconciliationError::InvalidTransition { from, to }) => {
                // e.g. a late "canceled" webhook for an order that has already shipped. The
                // order's truth has moved on; acknowledge so the gateway stops retrying.
                info!("🔄️ Dropping stale gateway signal for intent [{intent_id}]: {from} cannot move to {to}");
                let order = self
                    .db
                    .fetch_order_by_intent_id(&intent_id)
                    .await?
                    .ok_or_else(|| ReconciliationError::IntentNotFound(intent_id.clone()))?;
                Ok(ReconcileOutcome::AlreadyApplied { order })
            },
            other => other,
        }
    }

    /// The client-initiated confirmation path. The client supplies identifiers only; the status
    /// fed into reconciliation is re-fetched from the gateway, never taken from the client.
    pub async fn confirm_payment<G: PaymentGateway>(
        &self,
        intent_id: &str,
        order_id: OrderId,
        gateway: &G,
    ) -> Result<ReconcileOutcome, ReconciliationError> {
        trace!("🔄️ Confirming payment for intent [{intent_id}] against the gateway");
        let verified_status = gateway.retrieve_intent(intent_id).await?;
        debug!("🔄️ Gateway reports intent [{intent_id}] as '{verified_status}'");
        let signal = ReconciliationSignal::ClientConfirm {
            intent_id: intent_id.to_string(),
            order_id,
            verified_status,
        };
        self.reconcile(signal).await
    }

    /// The administrative path: shipment, delivery, manual cancellation. The caller supplies the
    /// target status directly, still subject to the state-machine legality check; an illegal
    /// transition is an error here, not a no-op.
    pub async fn set_status(
        &self,
        order_id: OrderId,
        target: OrderStatus,
    ) -> Result<ReconcileOutcome, ReconciliationError> {
        let order = self
            .db
            .fetch_order_by_id(order_id)
            .await?
            .ok_or(ReconciliationError::OrderNotFound(order_id))?;
        let description = format!("Status set to {target} by an administrator.");
        self.apply_transition(order, target, &description).await
    }

    /// Appends an informational ledger entry (no status change): carrier hand-off, delivery
    /// attempt, and the like.
    pub async fn add_tracking_note(
        &self,
        order_id: OrderId,
        title: &str,
        description: &str,
        location: Option<String>,
        tracking_number: Option<String>,
    ) -> Result<TrackingEvent, ReconciliationError> {
        self.db.append_info_event(order_id, title, description, location, tracking_number).await
    }

    /// The shared transition contract: idempotency check, legality check, conditional write with
    /// a single ledger append, then best-effort notification.
    async fn apply_transition(
        &self,
        order: Order,
        target: OrderStatus,
        description: &str,
    ) -> Result<ReconcileOutcome, ReconciliationError> {
        let current = order.status;
        // (order id, target status) is the idempotency key: at-or-past means this transition has
        // already happened and the duplicate must still see success.
        if current.at_or_past(target) {
            debug!("🔄️ Order {} is already {current}; request for {target} is a no-op", order.id);
            return Ok(ReconcileOutcome::AlreadyApplied { order });
        }
        if !current.can_transition_to(target) {
            return Err(ReconciliationError::InvalidTransition { from: current, to: target });
        }
        let applied = self
            .db
            .transition_order(order.id, current, target, transition_title(target), description)
            .await?;
        match applied {
            Some((order, ledger_entry)) => {
                info!("🔄️ Order {} transitioned {current} → {target}", order.id);
                self.publish_status_changed(order.clone(), current, ledger_entry.clone()).await;
                Ok(ReconcileOutcome::Applied { order, ledger_entry })
            },
            None => {
                // A racing caller moved the order between our read and the conditional write.
                // The race winner wrote the status and the ledger entry; we report the no-op.
                debug!("🔄️ Lost the transition race for order {}; treating as already applied", order.id);
                let order = self
                    .db
                    .fetch_order_by_id(order.id)
                    .await?
                    .ok_or(ReconciliationError::OrderNotFound(order.id))?;
                Ok(ReconcileOutcome::AlreadyApplied { order })
            },
        }
    }

    async fn publish_status_changed(&self, order: Order, previous: OrderStatus, entry: TrackingEvent) {
        for producer in &self.producers.status_changed_producer {
            let event = OrderStatusChangedEvent::new(order.clone(), previous, entry.clone());
            producer.publish_event(event).await;
        }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

fn transition_title(target: OrderStatus) -> &'static str {
    match target {
        OrderStatus::Pending => "Order placed",
        OrderStatus::Processing => "Payment processing",
        OrderStatus::Shipped => "Order shipped",
        OrderStatus::Delivered => "Order delivered",
        OrderStatus::Cancelled => "Order cancelled",
    }
}
