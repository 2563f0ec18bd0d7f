use actix_web::{http::StatusCode, test, web, App};
use recon_common::Secret;
use recon_engine::{
    db_types::OrderStatus,
    events::EventProducers,
    test_utils::MemoryGateway,
    traits::OrderManagement,
    ReconciliationApi,
    SqliteDatabase,
};

use crate::{
    data_objects::GatewayWebhookEvent,
    endpoint_tests::{
        helpers::{body_string, seed_order, signed_post, test_db, TEST_WEBHOOK_SECRET},
        mocks::MockOrderStore,
    },
    middleware::HmacMiddlewareFactory,
    routes::PaymentWebhookRoute,
    server::SIGNATURE_HEADER,
};

fn webhook_event(intent_id: &str, status: &str) -> GatewayWebhookEvent {
    GatewayWebhookEvent {
        event_type: "payment_intent.status_changed".to_string(),
        intent_id: intent_id.to_string(),
        reported_status: status.to_string(),
    }
}

/// An unsigned or garbage-signed request must be turned away by the middleware. The mock store
/// has no expectations configured, so the test fails loudly if the handler (and therefore the
/// store) is ever reached.
#[actix_web::test]
async fn unsigned_webhooks_never_reach_the_store() {
    let store = MockOrderStore::new();
    let api = ReconciliationApi::new(store, EventProducers::default());
    let app = App::new().app_data(web::Data::new(api)).service(
        web::scope("/webhook")
            .wrap(HmacMiddlewareFactory::new(SIGNATURE_HEADER, Secret::new(TEST_WEBHOOK_SECRET.into()), true))
            .service(PaymentWebhookRoute::<MockOrderStore>::new()),
    );
    let service = test::init_service(app).await;

    let body = serde_json::to_string(&webhook_event("pi_test_000000", "succeeded")).unwrap();
    // No signature header at all.
    let req = test::TestRequest::post()
        .uri("/webhook/payment")
        .insert_header(("Content-Type", "application/json"))
        .set_payload(body.clone())
        .to_request();
    let res = test::call_service(&service, req).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // A signature computed with the wrong secret.
    let bad_sig = crate::helpers::calculate_hmac("not_the_secret", body.as_bytes());
    let req = test::TestRequest::post()
        .uri("/webhook/payment")
        .insert_header(("Content-Type", "application/json"))
        .insert_header((SIGNATURE_HEADER, bad_sig))
        .set_payload(body)
        .to_request();
    let res = test::call_service(&service, req).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn signed_webhooks_are_processed_and_acknowledged() {
    let db = test_db().await;
    let gateway = MemoryGateway::default();
    let placed = seed_order(&db, &gateway).await;
    let intent_id = placed.order.payment_intent_id.clone().unwrap();

    let api = ReconciliationApi::new(db.clone(), EventProducers::default());
    let app = App::new().app_data(web::Data::new(api)).service(
        web::scope("/webhook")
            .wrap(HmacMiddlewareFactory::new(SIGNATURE_HEADER, Secret::new(TEST_WEBHOOK_SECRET.into()), true))
            .service(PaymentWebhookRoute::<SqliteDatabase>::new()),
    );
    let service = test::init_service(app).await;

    let event = webhook_event(&intent_id, "succeeded");
    let res = test::call_service(&service, signed_post("/webhook/payment", &event).to_request()).await;
    let (status, body) = body_string(res).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("\"success\":true"), "unexpected body: {body}");

    let order = db.fetch_order_by_id(placed.order.id).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Processing);

    // Redelivery of the same event: still a 200, no second ledger entry.
    let res = test::call_service(&service, signed_post("/webhook/payment", &event).to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
    let events = db.events_for_order(placed.order.id).await.unwrap();
    assert_eq!(events.len(), 2);
}

#[actix_web::test]
async fn webhooks_for_unknown_intents_get_a_404() {
    let db = test_db().await;
    let api = ReconciliationApi::new(db, EventProducers::default());
    let app = App::new().app_data(web::Data::new(api)).service(
        web::scope("/webhook")
            .wrap(HmacMiddlewareFactory::new(SIGNATURE_HEADER, Secret::new(TEST_WEBHOOK_SECRET.into()), true))
            .service(PaymentWebhookRoute::<SqliteDatabase>::new()),
    );
    let service = test::init_service(app).await;

    let event = webhook_event("pi_never_created", "succeeded");
    let res = test::call_service(&service, signed_post("/webhook/payment", &event).to_request()).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
