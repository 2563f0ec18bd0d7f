use actix_web::{body::MessageBody, dev::ServiceResponse, http::StatusCode, test::TestRequest};
use recon_engine::{
    order_objects::PlacedOrder,
    test_utils::{gateway::MemoryGateway, prepare_env::prepare_test_env},
    CheckoutApi,
    SqliteDatabase,
};
use serde::Serialize;

use crate::helpers::calculate_hmac;

pub const TEST_WEBHOOK_SECRET: &str = "whsec_endpoint_tests";

pub async fn test_db() -> SqliteDatabase {
    let url = format!("sqlite://../data/test_server_{}.db", rand::random::<u64>());
    prepare_test_env(&url).await;
    SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database connection")
}

/// Places a standard order through the engine so endpoint tests have something to hit.
pub async fn seed_order(db: &SqliteDatabase, gateway: &MemoryGateway) -> PlacedOrder {
    let api = CheckoutApi::new(db.clone(), Default::default());
    let order = recon_engine::test_utils::standard_order();
    api.place_order(order, gateway).await.expect("Error placing seed order")
}

/// A signed JSON POST, the way the gateway delivers webhooks.
pub fn signed_post<T: Serialize>(uri: &str, body: &T) -> TestRequest {
    let payload = serde_json::to_string(body).expect("Error serializing body");
    let signature = calculate_hmac(TEST_WEBHOOK_SECRET, payload.as_bytes());
    TestRequest::post()
        .uri(uri)
        .insert_header(("Content-Type", "application/json"))
        .insert_header((crate::server::SIGNATURE_HEADER, signature))
        .set_payload(payload)
}

pub async fn body_string<B: MessageBody>(res: ServiceResponse<B>) -> (StatusCode, String) {
    let status = res.status();
    let body = res.into_body().try_into_bytes().map_err(|_| ()).expect("Could not read response body");
    (status, String::from_utf8_lossy(&body).into_owned())
}
