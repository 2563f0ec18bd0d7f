//! # Reconciliation server
//! The HTTP face of the order/payment reconciliation engine. It is responsible for:
//! Accepting checkouts and opening payment intents with the gateway.
//! Listening for the gateway's signed webhook deliveries and feeding them to the engine.
//! Serving the client confirmation, administrative, and order-query endpoints.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/checkout`: Creates a payment intent and a pending order.
//! * `/payment/confirm`: Client-side payment confirmation, re-verified against the gateway.
//! * `/webhook/payment`: The gateway's webhook sink, HMAC-verified.
//! * `/orders/{id}/status`, `/orders/{id}/tracking`: Administrative mutations.
//! * `/orders`, `/orders/{id}`: Order queries.

pub mod config;
pub mod data_objects;
pub mod errors;
pub mod helpers;
pub mod integrations;
pub mod middleware;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
