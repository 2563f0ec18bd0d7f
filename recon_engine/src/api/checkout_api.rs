use std::{collections::HashMap, fmt::Debug};

use chrono::Utc;
use log::*;

use crate::{
    api::order_objects::PlacedOrder,
    db_types::{NewOrder, OrderNumber},
    events::{EventProducers, OrderPlacedEvent},
    helpers::{candidate_order_number, timestamp_fallback, ORDER_NUMBER_ATTEMPTS},
    traits::{PaymentGateway, ReconciliationDatabase, ReconciliationError},
};

/// `CheckoutApi` turns a validated cart into a stored order with a live payment intent.
pub struct CheckoutApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for CheckoutApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CheckoutApi")
    }
}

impl<B> CheckoutApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }
}

impl<B> CheckoutApi<B>
where B: ReconciliationDatabase
{
    /// Places a new order:
    /// 1. validates the creation invariants (`total == subtotal + shipping` among them),
    /// 2. generates a unique order number,
    /// 3. creates the gateway payment intent — a gateway failure here blocks checkout,
    /// 4. stores the order, its intent reference, and the "Order placed" ledger entry atomically.
    pub async fn place_order<G: PaymentGateway>(
        &self,
        order: NewOrder,
        gateway: &G,
    ) -> Result<PlacedOrder, ReconciliationError> {
        order.validate()?;
        let number = self.generate_order_number().await?;
        let metadata = HashMap::from([("order_number".to_string(), number.to_string())]);
        let intent = gateway.create_intent(order.total, &order.currency, metadata).await?;
        debug!("🛒️ Gateway intent [{}] created for order {number}", intent.intent_id);
        let order = self.db.insert_order(order, number, &intent.intent_id).await?;
        info!("🛒️ Order {} ({}) placed for {}", order.order_number, order.id, order.total);
        for producer in &self.producers.order_placed_producer {
            producer.publish_event(OrderPlacedEvent::new(order.clone())).await;
        }
        Ok(PlacedOrder { order, client_secret: intent.client_secret })
    }

    /// Produces an unused order number. Collisions trigger regeneration up to a bounded number of
    /// attempts; on exhaustion the timestamp fallback is used and the residual collision risk
    /// accepted, because order creation must not fail over numbering contention.
    async fn generate_order_number(&self) -> Result<OrderNumber, ReconciliationError> {
        let mut rng = rand::thread_rng();
        for attempt in 0..ORDER_NUMBER_ATTEMPTS {
            let candidate = candidate_order_number(&mut rng, Utc::now());
            if !self.db.order_number_exists(&candidate).await? {
                return Ok(candidate);
            }
            debug!("🛒️ Order number {candidate} already taken (attempt {})", attempt + 1);
        }
        let fallback = timestamp_fallback(Utc::now());
        warn!("🛒️ Exhausted {ORDER_NUMBER_ATTEMPTS} order number attempts; falling back to {fallback}");
        Ok(fallback)
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}
