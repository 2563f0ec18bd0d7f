use log::*;
use recon_common::Money;
use recon_engine::{
    db_types::{EventKind, NewOrder, OrderStatus},
    events::EventProducers,
    CheckoutApi,
    ReconcileOutcome,
    ReconciliationApi,
    OrderManagement,
    ReconciliationDatabase,
    ReconciliationError,
    SqliteDatabase,
};
use recon_engine::test_utils::{
    customer,
    line_item,
    prepare_env::{prepare_test_env, random_db_path},
    standard_order,
    MemoryGateway,
};
use sqlx::{migrate::MigrateDatabase, Sqlite};

async fn setup() -> (SqliteDatabase, MemoryGateway) {
    let url = random_db_path();
    prepare_test_env(&url).await;
    let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database");
    (db, MemoryGateway::new())
}

async fn tear_down(mut db: SqliteDatabase) {
    let url = db.url().to_string();
    if let Err(e) = db.close().await {
        error!("🚀️ Failed to close database: {e}");
    }
    Sqlite::drop_database(&url).await.unwrap();
}

#[tokio::test]
async fn totals_are_validated_at_creation() {
    let (db, gateway) = setup().await;
    let api = CheckoutApi::new(db.clone(), EventProducers::default());

    // subtotal 100.00 + shipping 5.00 => total 105.00
    let order = standard_order();
    assert_eq!(order.subtotal, Money::from(10_000));
    assert_eq!(order.total, Money::from(10_500));
    let placed = api.place_order(order, &gateway).await.expect("Error placing order");
    assert_eq!(placed.order.total, Money::from(10_500));
    assert_eq!(placed.order.status, OrderStatus::Pending);

    // The same order with total submitted as 100.00 is rejected.
    let mut bad = standard_order();
    bad.total = Money::from(10_000);
    let err = api.place_order(bad, &gateway).await.expect_err("Mismatched total must be rejected");
    assert!(matches!(err, ReconciliationError::Validation(_)), "unexpected error: {err}");
    tear_down(db).await;
}

#[tokio::test]
async fn gateway_failure_blocks_checkout() {
    let (db, gateway) = setup().await;
    let api = CheckoutApi::new(db.clone(), EventProducers::default());
    gateway.fail_creates(true);
    let err = api.place_order(standard_order(), &gateway).await.expect_err("Checkout should be blocked");
    assert!(matches!(err, ReconciliationError::Gateway(_)), "unexpected error: {err}");
    tear_down(db).await;
}

#[tokio::test]
async fn order_numbers_are_unique_and_well_formed() {
    let (db, gateway) = setup().await;
    let api = CheckoutApi::new(db.clone(), EventProducers::default());
    let mut numbers = std::collections::HashSet::new();
    for i in 0..50 {
        let order = NewOrder::new(
            customer(&format!("Customer {i}"), &format!("c{i}@example.com")),
            vec![line_item("sku-1", 1_000, 1)],
            Money::from(0),
            "usd",
        )
        .expect("Error building order");
        let placed = api.place_order(order, &gateway).await.expect("Error placing order");
        let number = placed.order.order_number.to_string();
        assert_eq!(number.len(), 8, "order number {number} is not 8 characters");
        assert!(
            number.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()),
            "order number {number} is not alphanumeric"
        );
        assert!(numbers.insert(number), "duplicate order number issued");
    }
    tear_down(db).await;
}

#[tokio::test]
async fn first_ledger_entry_is_synthesized_at_creation() {
    let (db, gateway) = setup().await;
    let api = CheckoutApi::new(db.clone(), EventProducers::default());
    let placed = api.place_order(standard_order(), &gateway).await.expect("Error placing order");
    let events = db.events_for_order(placed.order.id)
        .await
        .expect("Error fetching ledger");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, EventKind::StatusChange);
    assert_eq!(events[0].status, Some(OrderStatus::Pending));
    assert_eq!(events[0].title, "Order placed");
    tear_down(db).await;
}

#[tokio::test]
async fn administrative_lifecycle_keeps_the_ledger_monotonic() {
    let (db, gateway) = setup().await;
    let checkout = CheckoutApi::new(db.clone(), EventProducers::default());
    let api = ReconciliationApi::new(db.clone(), EventProducers::default());
    let placed = checkout.place_order(standard_order(), &gateway).await.expect("Error placing order");
    let id = placed.order.id;

    // Shipment before payment is illegal.
    let err = api.set_status(id, OrderStatus::Shipped).await.expect_err("Pending order cannot ship");
    assert!(matches!(err, ReconciliationError::InvalidTransition { .. }));

    for target in [OrderStatus::Processing, OrderStatus::Shipped, OrderStatus::Delivered] {
        let outcome = api.set_status(id, target).await.expect("Error setting status");
        assert!(outcome.was_applied(), "transition to {target} was not applied");
    }

    // Cancelling a delivered order is rejected with no mutation and no ledger entry.
    let before = db.events_for_order(id).await.unwrap();
    let err = api.set_status(id, OrderStatus::Cancelled).await.expect_err("Delivered order cannot cancel");
    assert!(matches!(
        err,
        ReconciliationError::InvalidTransition { from: OrderStatus::Delivered, to: OrderStatus::Cancelled }
    ));
    let order = db.fetch_order_by_id(id).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Delivered);
    let after = db.events_for_order(id).await.unwrap();
    assert_eq!(before.len(), after.len(), "rejected transition must not append to the ledger");

    // The recorded status sequence is non-decreasing in the monotonic ordering.
    let statuses: Vec<OrderStatus> = after.iter().filter_map(|e| e.status).collect();
    assert_eq!(
        statuses,
        vec![OrderStatus::Pending, OrderStatus::Processing, OrderStatus::Shipped, OrderStatus::Delivered]
    );
    let ranks: Vec<u8> = statuses.iter().map(|s| s.rank().unwrap()).collect();
    assert!(ranks.windows(2).all(|w| w[0] <= w[1]), "ledger statuses are not monotonic: {statuses:?}");
    tear_down(db).await;
}

#[tokio::test]
async fn informational_events_join_the_ledger_without_status_changes() {
    let (db, gateway) = setup().await;
    let checkout = CheckoutApi::new(db.clone(), EventProducers::default());
    let api = ReconciliationApi::new(db.clone(), EventProducers::default());
    let placed = checkout.place_order(standard_order(), &gateway).await.expect("Error placing order");
    let id = placed.order.id;

    api.set_status(id, OrderStatus::Processing).await.expect("Error setting status");
    let note = api
        .add_tracking_note(
            id,
            "Carrier picked up",
            "Handed to the carrier at the Montreal depot.",
            Some("Montreal, QC".to_string()),
            Some("1Z999AA10123456784".to_string()),
        )
        .await
        .expect("Error appending note");
    assert_eq!(note.kind, EventKind::Informational);
    assert_eq!(note.status, None);

    let order = db.fetch_order_by_id(id).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Processing, "informational events must not move status");

    // Unknown orders are reported, not silently accepted.
    let err = api
        .add_tracking_note(recon_engine::db_types::OrderId::from(9999), "x", "y", None, None)
        .await
        .expect_err("Unknown order must be rejected");
    assert!(matches!(err, ReconciliationError::OrderNotFound(_)));
    tear_down(db).await;
}

#[tokio::test]
async fn placed_orders_resolve_by_intent_and_number() {
    let (db, gateway) = setup().await;
    let checkout = CheckoutApi::new(db.clone(), EventProducers::default());
    let placed = checkout.place_order(standard_order(), &gateway).await.expect("Error placing order");
    let intent_id = placed.order.payment_intent_id.clone().expect("intent reference must be set");
    assert_eq!(placed.client_secret, format!("{intent_id}_secret"));

    let by_intent = db.fetch_order_by_intent_id(&intent_id)
        .await
        .unwrap()
        .expect("order should resolve by intent");
    assert_eq!(by_intent.id, placed.order.id);

    let by_number =
        db.fetch_order_by_order_number(&placed.order.order_number)
            .await
            .unwrap()
            .expect("order should resolve by number");
    assert_eq!(by_number.id, placed.order.id);
    // The line-item snapshot survives storage intact.
    assert_eq!(by_number.items, placed.order.items);
    tear_down(db).await;
}
