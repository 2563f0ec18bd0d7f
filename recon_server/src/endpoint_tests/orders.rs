use actix_web::{http::StatusCode, test, web, App};
use recon_engine::{
    db_types::OrderStatus,
    events::EventProducers,
    test_utils::MemoryGateway,
    OrderQueryApi,
    ReconciliationApi,
    SqliteDatabase,
};

use crate::{
    data_objects::{TrackingNoteRequest, UpdateStatusRequest},
    endpoint_tests::helpers::{body_string, seed_order, test_db},
    routes::{AddTrackingNoteRoute, OrderByIdRoute, UpdateOrderStatusRoute},
};

macro_rules! admin_service {
    ($db:expr) => {{
        let recon_api = ReconciliationApi::new($db.clone(), EventProducers::default());
        let query_api = OrderQueryApi::new($db.clone());
        let app = App::new()
            .app_data(web::Data::new(recon_api))
            .app_data(web::Data::new(query_api))
            .service(UpdateOrderStatusRoute::<SqliteDatabase>::new())
            .service(AddTrackingNoteRoute::<SqliteDatabase>::new())
            .service(OrderByIdRoute::<SqliteDatabase>::new());
        test::init_service(app).await
    }};
}

#[actix_web::test]
async fn illegal_admin_transitions_are_a_409_with_no_mutation() {
    let db = test_db().await;
    let gateway = MemoryGateway::default();
    let placed = seed_order(&db, &gateway).await;
    let service = admin_service!(db);

    // Shipping an order that has not been paid for.
    let req = test::TestRequest::post()
        .uri(&format!("/orders/{}/status", placed.order.id.value()))
        .set_json(UpdateStatusRequest { status: OrderStatus::Shipped })
        .to_request();
    let res = test::call_service(&service, req).await;
    let (status, body) = body_string(res).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body.contains("not allowed"), "unexpected body: {body}");

    let req = test::TestRequest::get().uri(&format!("/orders/{}", placed.order.id.value())).to_request();
    let res = test::call_service(&service, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let (_, body) = body_string(res).await;
    assert!(body.contains("\"Pending\""), "order should not have moved: {body}");
}

#[actix_web::test]
async fn tracking_notes_show_up_in_the_order_history() {
    let db = test_db().await;
    let gateway = MemoryGateway::default();
    let placed = seed_order(&db, &gateway).await;
    let service = admin_service!(db);

    let note = TrackingNoteRequest {
        title: "Handed to carrier".to_string(),
        description: "Package handed to AcmeShip.".to_string(),
        location: Some("Springfield depot".to_string()),
        tracking_number: Some("ACME-123456".to_string()),
    };
    let req = test::TestRequest::post()
        .uri(&format!("/orders/{}/tracking", placed.order.id.value()))
        .set_json(&note)
        .to_request();
    let res = test::call_service(&service, req).await;
    assert_eq!(res.status(), StatusCode::OK);

    let req = test::TestRequest::get().uri(&format!("/orders/{}", placed.order.id.value())).to_request();
    let res = test::call_service(&service, req).await;
    let (status, body) = body_string(res).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Handed to carrier"), "unexpected body: {body}");
    assert!(body.contains("ACME-123456"), "unexpected body: {body}");
}

#[actix_web::test]
async fn fetching_a_missing_order_is_a_404() {
    let db = test_db().await;
    let service = admin_service!(db);

    let req = test::TestRequest::get().uri("/orders/99999").to_request();
    let res = test::call_service(&service, req).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
