//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use recon_engine::{
    db_types::{NewOrder, OrderId},
    order_objects::OrderQueryFilter,
    traits::{OrderManagement, PaymentGateway, ReconciliationDatabase},
    CheckoutApi,
    OrderQueryApi,
    ReconcileOutcome,
    ReconciliationApi,
};

use crate::{
    data_objects::{
        CheckoutRequest,
        CheckoutResponse,
        ConfirmPaymentRequest,
        GatewayWebhookEvent,
        JsonResponse,
        TrackingNoteRequest,
        UpdateStatusRequest,
    },
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Checkout  ----------------------------------------------------
route!(checkout => Post "/checkout" impl ReconciliationDatabase, PaymentGateway);
/// Route handler for the checkout endpoint
///
/// Validates the cart, opens a payment intent with the gateway, and stores the new order in
/// `Pending` with its first ledger entry. The client secret in the response is what the
/// storefront needs to collect payment; the order then waits for reconciliation to move it.
pub async fn checkout<B, G>(
    body: web::Json<CheckoutRequest>,
    api: web::Data<CheckoutApi<B>>,
    gateway: web::Data<G>,
) -> Result<HttpResponse, ServerError>
where
    B: ReconciliationDatabase,
    G: PaymentGateway,
{
    let order = NewOrder::try_from(body.into_inner()).map_err(ServerError::from)?;
    let placed = api.place_order(order, gateway.as_ref()).await?;
    info!("💻️ Order {} placed at checkout", placed.order.order_number);
    let response = CheckoutResponse {
        order_id: placed.order.id,
        order_number: placed.order.order_number,
        status: placed.order.status,
        total: placed.order.total,
        client_secret: placed.client_secret,
    };
    Ok(HttpResponse::Ok().json(response))
}

//----------------------------------------------   Reconciliation  ---------------------------------------------
route!(confirm_payment => Post "/payment/confirm" impl ReconciliationDatabase, PaymentGateway);
/// Route handler for the client-side payment confirmation endpoint
///
/// The storefront calls this right after the customer completes payment. The body only carries
/// identifiers; the payment status is re-fetched from the gateway before anything changes, so a
/// client cannot talk an order into `Processing`. Racing the gateway's own webhook is expected
/// and harmless: whichever arrives second is collapsed into a no-op success.
pub async fn confirm_payment<B, G>(
    body: web::Json<ConfirmPaymentRequest>,
    api: web::Data<ReconciliationApi<B>>,
    gateway: web::Data<G>,
) -> Result<HttpResponse, ServerError>
where
    B: ReconciliationDatabase,
    G: PaymentGateway,
{
    let req = body.into_inner();
    debug!("💻️ POST confirm payment for intent [{}]", req.payment_intent_id);
    let outcome = api.confirm_payment(&req.payment_intent_id, req.order_id, gateway.as_ref()).await?;
    Ok(reconcile_response(outcome))
}

route!(payment_webhook => Post "payment" impl ReconciliationDatabase);
/// Route handler for the payment gateway's webhook deliveries
///
/// Sits behind the HMAC middleware; by the time this executes, the body is authenticated.
/// Responses must be 200 for every processed delivery, duplicates included, otherwise the
/// gateway keeps retrying. The exceptions are an intent that matches no order (404) and backend
/// failures (5xx), both of which we *want* redelivered.
pub async fn payment_webhook<B>(
    body: web::Json<GatewayWebhookEvent>,
    api: web::Data<ReconciliationApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: ReconciliationDatabase,
{
    let event = body.into_inner();
    debug!("💻️ Webhook delivery '{}' for intent [{}]", event.event_type, event.intent_id);
    let outcome = api.reconcile(event.into()).await?;
    Ok(reconcile_response(outcome))
}

fn reconcile_response(outcome: ReconcileOutcome) -> HttpResponse {
    let message = match outcome {
        ReconcileOutcome::Applied { order, .. } => {
            format!("Order {} is now {}.", order.order_number, order.status)
        },
        ReconcileOutcome::AlreadyApplied { order } => {
            format!("Order {} already processed. Status: {}.", order.order_number, order.status)
        },
        ReconcileOutcome::Ignored { reported } => format!("Status '{reported}' acknowledged. No action taken."),
    };
    HttpResponse::Ok().json(JsonResponse::success(message))
}

//----------------------------------------------   Admin  ------------------------------------------------------
route!(update_order_status => Post "/orders/{id}/status" impl ReconciliationDatabase);
/// Route handler for administrative status changes (shipment, delivery, manual cancellation)
///
/// Unlike the gateway-driven paths, an illegal transition here is the caller's mistake and comes
/// back as a 409 with no mutation.
pub async fn update_order_status<B>(
    path: web::Path<i64>,
    body: web::Json<UpdateStatusRequest>,
    api: web::Data<ReconciliationApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: ReconciliationDatabase,
{
    let id = OrderId(path.into_inner());
    let target = body.into_inner().status;
    debug!("💻️ POST set order {id} status to {target}");
    let outcome = api.set_status(id, target).await?;
    Ok(reconcile_response(outcome))
}

route!(add_tracking_note => Post "/orders/{id}/tracking" impl ReconciliationDatabase);
/// Appends an informational tracking entry (carrier hand-off, delivery attempt) to the order's
/// ledger. Never changes the order status.
pub async fn add_tracking_note<B>(
    path: web::Path<i64>,
    body: web::Json<TrackingNoteRequest>,
    api: web::Data<ReconciliationApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: ReconciliationDatabase,
{
    let id = OrderId(path.into_inner());
    let note = body.into_inner();
    debug!("💻️ POST tracking note '{}' for order {id}", note.title);
    let entry =
        api.add_tracking_note(id, &note.title, &note.description, note.location, note.tracking_number).await?;
    Ok(HttpResponse::Ok().json(entry))
}

//----------------------------------------------   Queries  ----------------------------------------------------
route!(order_by_id => Get "/orders/{id}" impl OrderManagement);
pub async fn order_by_id<B: OrderManagement>(
    path: web::Path<i64>,
    api: web::Data<OrderQueryApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = OrderId(path.into_inner());
    debug!("💻️ GET order {id}");
    let order = api
        .order_with_history(id)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("Order {id} does not exist.")))?;
    Ok(HttpResponse::Ok().json(order))
}

route!(orders_search => Get "/orders" impl OrderManagement);
pub async fn orders_search<B: OrderManagement>(
    query: web::Query<OrderQueryFilter>,
    api: web::Data<OrderQueryApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let query = query.into_inner();
    debug!("💻️ GET orders search for [{query:?}]");
    let orders = api.search(query).await?;
    Ok(HttpResponse::Ok().json(orders))
}
