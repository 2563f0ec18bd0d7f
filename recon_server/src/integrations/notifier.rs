//! Customer notification delivery.
//!
//! Posts a JSON message to the configured notification service (mail relay, in practice) when an
//! order changes status. Delivery is strictly best-effort: every failure path logs and returns
//! `false`, and nothing upstream waits on or retries it.

use std::{sync::Arc, time::Duration};

use log::*;
use recon_engine::{
    db_types::{Order, TrackingEvent},
    traits::NotificationDispatcher,
};
use reqwest::Client;
use serde::Serialize;

use crate::config::NotifierConfig;

#[derive(Clone)]
pub struct HttpNotifier {
    config: NotifierConfig,
    client: Arc<Client>,
}

#[derive(Debug, Serialize)]
struct NotificationMessage<'a> {
    email: &'a str,
    name: &'a str,
    order_number: String,
    status: String,
    title: &'a str,
    description: &'a str,
}

impl HttpNotifier {
    pub fn new(config: NotifierConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();
        Self { config, client: Arc::new(client) }
    }
}

impl NotificationDispatcher for HttpNotifier {
    async fn notify(&self, email: &str, name: &str, order: &Order, event: &TrackingEvent) -> bool {
        let Some(url) = &self.config.url else {
            info!("📬️ No notification service configured. Dropping '{}' message for {email}", event.title);
            return false;
        };
        let message = NotificationMessage {
            email,
            name,
            order_number: order.order_number.to_string(),
            status: order.status.to_string(),
            title: &event.title,
            description: &event.description,
        };
        match self.client.post(url).json(&message).send().await {
            Ok(response) if response.status().is_success() => {
                debug!("📬️ Sent '{}' notification for order {} to {email}", event.title, order.order_number);
                true
            },
            Ok(response) => {
                warn!(
                    "📬️ Notification service rejected '{}' message for order {}: {}",
                    event.title,
                    order.order_number,
                    response.status()
                );
                false
            },
            Err(e) => {
                warn!("📬️ Could not deliver '{}' message for order {}: {e}", event.title, order.order_number);
                false
            },
        }
    }
}
