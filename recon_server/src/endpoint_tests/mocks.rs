use mockall::mock;
use recon_engine::{
    db_types::{NewOrder, Order, OrderId, OrderNumber, OrderStatus, TrackingEvent},
    order_objects::OrderQueryFilter,
    traits::{OrderManagement, OrderQueryError, ReconciliationDatabase, ReconciliationError},
};

mock! {
    pub OrderStore {}

    impl Clone for OrderStore {
        fn clone(&self) -> Self;
    }

    impl OrderManagement for OrderStore {
        async fn fetch_order_by_id(&self, id: OrderId) -> Result<Option<Order>, OrderQueryError>;
        async fn fetch_order_by_intent_id(&self, intent_id: &str) -> Result<Option<Order>, OrderQueryError>;
        async fn fetch_order_by_order_number(&self, number: &OrderNumber) -> Result<Option<Order>, OrderQueryError>;
        async fn events_for_order(&self, id: OrderId) -> Result<Vec<TrackingEvent>, OrderQueryError>;
        async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, OrderQueryError>;
    }

    impl ReconciliationDatabase for OrderStore {
        fn url(&self) -> &str;
        async fn insert_order(&self, order: NewOrder, number: OrderNumber, intent_id: &str) -> Result<Order, ReconciliationError>;
        async fn order_number_exists(&self, number: &OrderNumber) -> Result<bool, ReconciliationError>;
        async fn transition_order(&self, id: OrderId, expected: OrderStatus, new_status: OrderStatus, title: &str, description: &str) -> Result<Option<(Order, TrackingEvent)>, ReconciliationError>;
        async fn append_info_event(&self, id: OrderId, title: &str, description: &str, location: Option<String>, tracking_number: Option<String>) -> Result<TrackingEvent, ReconciliationError>;
        async fn close(&mut self) -> Result<(), ReconciliationError>;
    }
}
