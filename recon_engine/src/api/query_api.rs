use std::fmt::Debug;

use crate::{
    api::order_objects::{OrderQueryFilter, OrderWithHistory},
    db_types::{Order, OrderId, OrderNumber},
    traits::{OrderManagement, OrderQueryError},
};

/// Read-side API over orders and their ledgers.
pub struct OrderQueryApi<B> {
    db: B,
}

impl<B> Debug for OrderQueryApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderQueryApi")
    }
}

impl<B> OrderQueryApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> OrderQueryApi<B>
where B: OrderManagement
{
    pub async fn order_with_history(&self, id: OrderId) -> Result<Option<OrderWithHistory>, OrderQueryError> {
        let order = match self.db.fetch_order_by_id(id).await? {
            Some(order) => order,
            None => return Ok(None),
        };
        let events = self.db.events_for_order(id).await?;
        Ok(Some(OrderWithHistory { order, events }))
    }

    pub async fn order_by_number(&self, number: &OrderNumber) -> Result<Option<Order>, OrderQueryError> {
        self.db.fetch_order_by_order_number(number).await
    }

    pub async fn search(&self, query: OrderQueryFilter) -> Result<Vec<Order>, OrderQueryError> {
        self.db.search_orders(query).await
    }
}
