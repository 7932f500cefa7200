//! Delivery-cost port and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use domain::{DeliveryLocation, Money};

use crate::error::CheckoutError;

/// Trait for the external delivery-cost collaborator.
#[async_trait]
pub trait DeliveryRates: Send + Sync {
    /// Quotes the delivery charge from a fulfillment origin to a
    /// destination. Returns `EstimationUnavailable` when the upstream
    /// cannot answer (timeout, no reachable origin).
    async fn quote(
        &self,
        origin: &DeliveryLocation,
        destination: &DeliveryLocation,
    ) -> Result<Money, CheckoutError>;
}

#[derive(Debug, Default)]
struct InMemoryRatesState {
    by_area: HashMap<String, Money>,
    fail_on_quote: bool,
}

/// In-memory rate table keyed by delivery area.
#[derive(Debug, Clone)]
pub struct InMemoryDeliveryRates {
    state: Arc<RwLock<InMemoryRatesState>>,
    default_rate: Money,
}

impl InMemoryDeliveryRates {
    /// Creates a rate table with the given default for unknown areas.
    pub fn new(default_rate: Money) -> Self {
        Self {
            state: Arc::new(RwLock::new(InMemoryRatesState::default())),
            default_rate,
        }
    }

    /// Sets the rate for a delivery area.
    pub fn set_area_rate(&self, area: impl Into<String>, rate: Money) {
        self.state.write().unwrap().by_area.insert(area.into(), rate);
    }

    /// Configures the table to fail the next quote.
    pub fn set_fail_on_quote(&self, fail: bool) {
        self.state.write().unwrap().fail_on_quote = fail;
    }
}

impl Default for InMemoryDeliveryRates {
    fn default() -> Self {
        Self::new(Money::from_rupees(150))
    }
}

#[async_trait]
impl DeliveryRates for InMemoryDeliveryRates {
    async fn quote(
        &self,
        _origin: &DeliveryLocation,
        destination: &DeliveryLocation,
    ) -> Result<Money, CheckoutError> {
        let state = self.state.read().unwrap();

        if state.fail_on_quote {
            return Err(CheckoutError::EstimationUnavailable(
                "rate service unreachable".to_string(),
            ));
        }

        let rate = destination
            .area
            .as_ref()
            .and_then(|area| state.by_area.get(area).copied())
            .unwrap_or(self.default_rate);

        Ok(rate)
    }
}
