use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::*;
use recon_engine::{
    events::{EventHandlers, EventHooks, EventProducers},
    traits::NotificationDispatcher,
    CheckoutApi,
    OrderQueryApi,
    ReconciliationApi,
    SqliteDatabase,
};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    integrations::{HttpNotifier, HttpPaymentGateway},
    middleware::HmacMiddlewareFactory,
    routes::{
        health,
        AddTrackingNoteRoute,
        CheckoutRoute,
        ConfirmPaymentRoute,
        OrderByIdRoute,
        OrdersSearchRoute,
        PaymentWebhookRoute,
        UpdateOrderStatusRoute,
    },
};

/// The header the payment gateway uses to carry the webhook body signature.
pub const SIGNATURE_HEADER: &str = "X-Gateway-Signature";

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.run_migrations().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let gateway = HttpPaymentGateway::new(config.gateway.clone())
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let notifier = HttpNotifier::new(config.notifier.clone());
    let producers = start_notification_hooks(notifier, config.event_buffer_size).await;
    let srv = create_server_instance(config, db, gateway, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

/// Subscribes the notifier to status-change events and starts the handler loops. Handlers run on
/// detached tasks; a slow or failing notification never blocks a request.
pub async fn start_notification_hooks(notifier: HttpNotifier, buffer_size: usize) -> EventProducers {
    let mut hooks = EventHooks::default();
    hooks.on_status_changed(move |event| {
        let notifier = notifier.clone();
        Box::pin(async move {
            let order = event.order;
            let customer = order.customer.clone();
            let sent = notifier.notify(&customer.email, &customer.name, &order, &event.ledger_entry).await;
            if !sent {
                info!("📬️ Status notification for order {} was not delivered", order.order_number);
            }
        })
    });
    let handlers = EventHandlers::new(buffer_size, hooks);
    let producers = handlers.producers();
    handlers.start_handlers().await;
    producers
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    gateway: HttpPaymentGateway,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let host = config.host.clone();
    let port = config.port;
    let srv = HttpServer::new(move || {
        let checkout_api = CheckoutApi::new(db.clone(), producers.clone());
        let recon_api = ReconciliationApi::new(db.clone(), producers.clone());
        let query_api = OrderQueryApi::new(db.clone());
        let app = App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("rec::access_log"))
            .app_data(web::Data::new(checkout_api))
            .app_data(web::Data::new(recon_api))
            .app_data(web::Data::new(query_api))
            .app_data(web::Data::new(gateway.clone()));
        let webhook_scope = web::scope("/webhook")
            .wrap(HmacMiddlewareFactory::new(
                SIGNATURE_HEADER,
                config.webhook.hmac_secret.clone(),
                config.webhook.hmac_checks,
            ))
            .service(PaymentWebhookRoute::<SqliteDatabase>::new());
        app.service(health)
            .service(CheckoutRoute::<SqliteDatabase, HttpPaymentGateway>::new())
            .service(ConfirmPaymentRoute::<SqliteDatabase, HttpPaymentGateway>::new())
            .service(UpdateOrderStatusRoute::<SqliteDatabase>::new())
            .service(AddTrackingNoteRoute::<SqliteDatabase>::new())
            .service(OrderByIdRoute::<SqliteDatabase>::new())
            .service(OrdersSearchRoute::<SqliteDatabase>::new())
            .service(webhook_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    Ok(srv)
}
