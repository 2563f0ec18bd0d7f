//! An in-memory payment gateway for tests: intents are handed out sequentially and their
//! reported status can be scripted per intent.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
        Mutex,
    },
};

use recon_common::Money;

use crate::{
    db_types::GatewayPaymentStatus,
    traits::{GatewayError, PaymentGateway, PaymentIntent},
};

#[derive(Clone, Default)]
pub struct MemoryGateway {
    counter: Arc<AtomicU64>,
    statuses: Arc<Mutex<HashMap<String, GatewayPaymentStatus>>>,
    fail_create: Arc<Mutex<bool>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the status the gateway will report for the given intent.
    pub fn set_status(&self, intent_id: &str, status: GatewayPaymentStatus) {
        self.statuses.lock().unwrap().insert(intent_id.to_string(), status);
    }

    /// Makes subsequent `create_intent` calls fail, to exercise the blocked-checkout path.
    pub fn fail_creates(&self, fail: bool) {
        *self.fail_create.lock().unwrap() = fail;
    }

    /// The number of intents handed out so far.
    pub fn intents_created(&self) -> u64 {
        self.counter.load(Ordering::SeqCst)
    }
}

impl PaymentGateway for MemoryGateway {
    async fn create_intent(
        &self,
        _amount: Money,
        _currency: &str,
        _metadata: HashMap<String, String>,
    ) -> Result<PaymentIntent, GatewayError> {
        if *self.fail_create.lock().unwrap() {
            return Err(GatewayError::Api("scripted failure".to_string()));
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let intent_id = format!("pi_test_{n:06}");
        let client_secret = format!("{intent_id}_secret");
        self.statuses
            .lock()
            .unwrap()
            .insert(intent_id.clone(), GatewayPaymentStatus::Other("requires_payment_method".to_string()));
        Ok(PaymentIntent { intent_id, client_secret })
    }

    async fn retrieve_intent(&self, intent_id: &str) -> Result<GatewayPaymentStatus, GatewayError> {
        self.statuses
            .lock()
            .unwrap()
            .get(intent_id)
            .cloned()
            .ok_or_else(|| GatewayError::Api(format!("No such payment intent: {intent_id}")))
    }
}
