use std::env;

use log::*;
use recon_common::{parse_boolean_flag, Secret};

const DEFAULT_REC_HOST: &str = "127.0.0.1";
const DEFAULT_REC_PORT: u16 = 8360;
const DEFAULT_EVENT_BUFFER_SIZE: usize = 25;
const DEFAULT_NOTIFY_TIMEOUT_SECS: u64 = 10;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// How many in-flight events each handler channel buffers before publishers start waiting.
    pub event_buffer_size: usize,
    pub gateway: GatewayConfig,
    pub webhook: WebhookConfig,
    pub notifier: NotifierConfig,
}

/// Connection details for the upstream payment gateway.
#[derive(Clone, Debug, Default)]
pub struct GatewayConfig {
    /// Base url of the gateway REST API, e.g. "https://api.stripe.com"
    pub base_url: String,
    pub api_key: Secret<String>,
}

/// Webhook signature verification settings.
#[derive(Clone, Debug, Default)]
pub struct WebhookConfig {
    pub hmac_secret: Secret<String>,
    /// If false, webhook signatures are NOT verified. Local development only.
    pub hmac_checks: bool,
}

/// Customer notification delivery settings. If no url is configured, notifications are logged
/// and dropped.
#[derive(Clone, Debug, Default)]
pub struct NotifierConfig {
    pub url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_REC_HOST.to_string(),
            port: DEFAULT_REC_PORT,
            database_url: String::default(),
            event_buffer_size: DEFAULT_EVENT_BUFFER_SIZE,
            gateway: GatewayConfig::default(),
            webhook: WebhookConfig::default(),
            notifier: NotifierConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("REC_HOST").ok().unwrap_or_else(|| DEFAULT_REC_HOST.into());
        let port = env::var("REC_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for REC_PORT. {e} Using the default, {DEFAULT_REC_PORT}, instead."
                    );
                    DEFAULT_REC_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_REC_PORT);
        let database_url = env::var("REC_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ REC_DATABASE_URL is not set. Please set it to the URL for the orders database.");
            String::default()
        });
        let event_buffer_size = env::var("REC_EVENT_BUFFER_SIZE")
            .ok()
            .and_then(|s| {
                s.parse::<usize>()
                    .map_err(|e| warn!("🪛️ Invalid configuration value for REC_EVENT_BUFFER_SIZE. {e}"))
                    .ok()
            })
            .unwrap_or(DEFAULT_EVENT_BUFFER_SIZE);
        let gateway = GatewayConfig::from_env_or_default();
        let webhook = WebhookConfig::from_env_or_default();
        let notifier = NotifierConfig::from_env_or_default();
        Self { host, port, database_url, event_buffer_size, gateway, webhook, notifier }
    }
}

impl GatewayConfig {
    pub fn from_env_or_default() -> Self {
        let base_url = env::var("REC_GATEWAY_URL").ok().unwrap_or_else(|| {
            error!("🪛️ REC_GATEWAY_URL is not set. Please set it to the payment gateway's base url.");
            String::default()
        });
        let api_key = Secret::new(env::var("REC_GATEWAY_API_KEY").ok().unwrap_or_else(|| {
            error!("🪛️ REC_GATEWAY_API_KEY is not set. Gateway calls will be rejected upstream.");
            String::default()
        }));
        Self { base_url, api_key }
    }
}

impl WebhookConfig {
    pub fn from_env_or_default() -> Self {
        let hmac_secret = env::var("REC_WEBHOOK_SECRET").ok().unwrap_or_else(|| {
            error!("🪛️ REC_WEBHOOK_SECRET is not set. Please set it to the gateway's webhook signing secret.");
            String::default()
        });
        let hmac_checks = parse_boolean_flag(env::var("REC_WEBHOOK_HMAC_CHECKS").ok(), true);
        if !hmac_checks {
            warn!(
                "🚨️ Webhook HMAC checks are DISABLED. Anyone can post fake payment events to this server. Never run \
                 like this in production."
            );
        }
        Self { hmac_secret: Secret::new(hmac_secret), hmac_checks }
    }
}

impl NotifierConfig {
    pub fn from_env_or_default() -> Self {
        let url = match env::var("REC_NOTIFY_URL") {
            Ok(url) if !url.is_empty() => Some(url),
            _ => {
                info!("🪛️ REC_NOTIFY_URL is not set. Customer notifications will be logged and dropped.");
                None
            },
        };
        let timeout_secs = env::var("REC_NOTIFY_TIMEOUT_SECS")
            .ok()
            .and_then(|s| {
                s.parse::<u64>()
                    .map_err(|e| warn!("🪛️ Invalid configuration value for REC_NOTIFY_TIMEOUT_SECS. {e}"))
                    .ok()
            })
            .unwrap_or(DEFAULT_NOTIFY_TIMEOUT_SECS);
        Self { url, timeout_secs }
    }
}
