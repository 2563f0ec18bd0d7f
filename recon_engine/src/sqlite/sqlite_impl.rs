//! `SqliteDatabase` is a concrete backend for the reconciliation engine.
//!
//! It implements the [`OrderManagement`] and [`ReconciliationDatabase`] traits over a SQLite
//! connection pool. The atomicity contract of the engine lives here: order insertion commits the
//! order row and its "Order placed" ledger entry together, and `transition_order` commits the
//! conditional status write and its ledger entry together or not at all.
use std::fmt::Debug;

use log::*;
use sqlx::SqlitePool;

use super::db::{db_url, new_pool, orders, tracking};
use crate::{
    api::order_objects::OrderQueryFilter,
    db_types::{NewOrder, Order, OrderId, OrderNumber, OrderStatus, TrackingEvent},
    traits::{OrderManagement, OrderQueryError, ReconciliationDatabase, ReconciliationError},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database instance using the database URL from the environment.
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        Self::new_with_url(&url, max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }
}

impl OrderManagement for SqliteDatabase {
    async fn fetch_order_by_id(&self, id: OrderId) -> Result<Option<Order>, OrderQueryError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_id(id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_order_by_intent_id(&self, intent_id: &str) -> Result<Option<Order>, OrderQueryError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_intent_id(intent_id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_order_by_order_number(&self, number: &OrderNumber) -> Result<Option<Order>, OrderQueryError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_number(number, &mut conn).await?;
        Ok(order)
    }

    async fn events_for_order(&self, id: OrderId) -> Result<Vec<TrackingEvent>, OrderQueryError> {
        let mut conn = self.pool.acquire().await?;
        let events = tracking::events_for_order(id, &mut conn).await?;
        Ok(events)
    }

    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, OrderQueryError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::search_orders(query, &mut conn).await?;
        Ok(orders)
    }
}

impl ReconciliationDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn insert_order(
        &self,
        order: NewOrder,
        number: OrderNumber,
        intent_id: &str,
    ) -> Result<Order, ReconciliationError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::insert_order(order, &number, intent_id, &mut tx).await?;
        // The first ledger entry for every order is synthesized here, before any gateway event
        // has occurred.
        tracking::append_status_event(
            order.id,
            OrderStatus::Pending,
            "Order placed",
            &format!("Order {number} has been placed and is awaiting payment."),
            &mut tx,
        )
        .await?;
        tx.commit().await?;
        debug!("🗃️ Order {} saved with id {} and intent {intent_id}", order.order_number, order.id);
        Ok(order)
    }

    async fn order_number_exists(&self, number: &OrderNumber) -> Result<bool, ReconciliationError> {
        let mut conn = self.pool.acquire().await?;
        let exists = orders::order_number_exists(number, &mut conn).await?;
        Ok(exists)
    }

    async fn transition_order(
        &self,
        id: OrderId,
        expected: OrderStatus,
        new_status: OrderStatus,
        title: &str,
        description: &str,
    ) -> Result<Option<(Order, TrackingEvent)>, ReconciliationError> {
        let mut tx = self.pool.begin().await?;
        let updated = orders::conditional_status_update(id, expected, new_status, &mut tx).await?;
        let result = match updated {
            Some(order) => {
                let event = tracking::append_status_event(id, new_status, title, description, &mut tx).await?;
                tx.commit().await?;
                debug!("🗃️ Order {id} moved {expected} → {new_status}");
                Some((order, event))
            },
            None => {
                // Lost the race (or the caller's read was stale). The transaction is dropped
                // without committing so no ledger entry is written.
                trace!("🗃️ Order {id} was not in {expected} any more; transition to {new_status} skipped");
                None
            },
        };
        Ok(result)
    }

    async fn append_info_event(
        &self,
        id: OrderId,
        title: &str,
        description: &str,
        location: Option<String>,
        tracking_number: Option<String>,
    ) -> Result<TrackingEvent, ReconciliationError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_id(id, &mut conn).await?;
        if order.is_none() {
            return Err(ReconciliationError::OrderNotFound(id));
        }
        let event = tracking::append_info_event(id, title, description, location, tracking_number, &mut conn).await?;
        Ok(event)
    }

    async fn close(&mut self) -> Result<(), ReconciliationError> {
        self.pool.close().await;
        Ok(())
    }
}
