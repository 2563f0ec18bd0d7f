use actix_web::{http::StatusCode, test, web, App};
use recon_common::Money;
use recon_engine::{test_utils, test_utils::MemoryGateway, CheckoutApi, SqliteDatabase};

use crate::{
    data_objects::{CheckoutRequest, CheckoutResponse},
    endpoint_tests::helpers::{body_string, test_db},
    routes::CheckoutRoute,
};

macro_rules! checkout_service {
    ($db:expr, $gateway:expr) => {{
        let api = CheckoutApi::new($db, Default::default());
        let app = App::new()
            .app_data(web::Data::new(api))
            .app_data(web::Data::new($gateway))
            .service(CheckoutRoute::<SqliteDatabase, MemoryGateway>::new());
        test::init_service(app).await
    }};
}

fn cart(items: Vec<recon_engine::db_types::LineItem>) -> CheckoutRequest {
    CheckoutRequest {
        customer: test_utils::customer("Bob Buyer", "bob@example.com"),
        items,
        shipping: Money::from(500),
        currency: "usd".to_string(),
    }
}

#[actix_web::test]
async fn checkout_returns_the_client_secret() {
    let db = test_db().await;
    let service = checkout_service!(db.clone(), MemoryGateway::default());

    let request = cart(vec![test_utils::line_item("sku-7", 2_500, 2)]);
    let req = test::TestRequest::post().uri("/checkout").set_json(&request).to_request();
    let res = test::call_service(&service, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let response: CheckoutResponse = test::read_body_json(res).await;
    assert_eq!(response.total, Money::from(5_500));
    assert_eq!(response.order_number.0.len(), 8);
    assert_eq!(response.client_secret, "pi_test_000000_secret");
}

#[actix_web::test]
async fn carts_that_fail_validation_are_a_400() {
    let db = test_db().await;
    let service = checkout_service!(db, MemoryGateway::default());

    let request = cart(vec![]);
    let req = test::TestRequest::post().uri("/checkout").set_json(&request).to_request();
    let res = test::call_service(&service, req).await;
    let (status, body) = body_string(res).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("error"), "unexpected body: {body}");
}

#[actix_web::test]
async fn carts_with_overflowing_amounts_are_a_400() {
    let db = test_db().await;
    let gateway = MemoryGateway::default();
    let service = checkout_service!(db, gateway.clone());

    // unit_price * quantity does not fit in minor units; the request must be rejected before any
    // total is computed, and nothing may reach the gateway.
    let request = cart(vec![test_utils::line_item("sku-7", i64::MAX, 2)]);
    let req = test::TestRequest::post().uri("/checkout").set_json(&request).to_request();
    let res = test::call_service(&service, req).await;
    let (status, body) = body_string(res).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("too large"), "unexpected body: {body}");
    assert_eq!(gateway.intents_created(), 0, "an overflowing cart must never open a payment intent");
}

#[actix_web::test]
async fn gateway_failures_are_a_502() {
    let db = test_db().await;
    let gateway = MemoryGateway::default();
    gateway.fail_creates(true);
    let service = checkout_service!(db, gateway);

    let request = cart(vec![test_utils::line_item("sku-7", 2_500, 1)]);
    let req = test::TestRequest::post().uri("/checkout").set_json(&request).to_request();
    let res = test::call_service(&service, req).await;
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
}
