//! Payment gateway port and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::AggregateId;
use domain::{Money, PaymentMethod};

use crate::error::CheckoutError;

/// Result of a successful payment authorization.
///
/// The reference is consumed opaquely; capture and settlement happen
/// elsewhere.
#[derive(Debug, Clone)]
pub struct PaymentAuth {
    /// The authorization reference assigned by the gateway.
    pub auth_ref: String,
}

/// Trait for payment operations the checkout path needs.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Authorizes the grand total against the chosen payment rail.
    async fn authorize(
        &self,
        order_id: AggregateId,
        method: PaymentMethod,
        amount: Money,
    ) -> Result<PaymentAuth, CheckoutError>;

    /// Voids a never-captured authorization (rollback of a failed
    /// placement).
    async fn void(&self, auth_ref: &str) -> Result<(), CheckoutError>;
}

#[derive(Debug, Default)]
struct InMemoryPaymentState {
    authorizations: HashMap<String, (AggregateId, PaymentMethod, Money)>,
    next_id: u32,
    fail_on_authorize: bool,
}

/// In-memory payment gateway for the server binary and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentGateway {
    state: Arc<RwLock<InMemoryPaymentState>>,
}

impl InMemoryPaymentGateway {
    /// Creates a new in-memory gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the gateway to decline the next authorization.
    pub fn set_fail_on_authorize(&self, fail: bool) {
        self.state.write().unwrap().fail_on_authorize = fail;
    }

    /// Returns the number of live authorizations.
    pub fn authorization_count(&self) -> usize {
        self.state.read().unwrap().authorizations.len()
    }

    /// Returns true if an authorization exists with the given reference.
    pub fn has_authorization(&self, auth_ref: &str) -> bool {
        self.state
            .read()
            .unwrap()
            .authorizations
            .contains_key(auth_ref)
    }
}

#[async_trait]
impl PaymentGateway for InMemoryPaymentGateway {
    async fn authorize(
        &self,
        order_id: AggregateId,
        method: PaymentMethod,
        amount: Money,
    ) -> Result<PaymentAuth, CheckoutError> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_authorize {
            return Err(CheckoutError::PaymentDeclined(format!(
                "{method} authorization declined"
            )));
        }

        state.next_id += 1;
        let auth_ref = format!("AUTH-{:04}", state.next_id);
        state
            .authorizations
            .insert(auth_ref.clone(), (order_id, method, amount));

        Ok(PaymentAuth { auth_ref })
    }

    async fn void(&self, auth_ref: &str) -> Result<(), CheckoutError> {
        let mut state = self.state.write().unwrap();
        state.authorizations.remove(auth_ref);
        Ok(())
    }
}
