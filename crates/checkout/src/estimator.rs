//! Delivery-charge estimation.

use domain::{DeliveryLocation, Money};

use crate::services::DeliveryRates;

/// Configuration for the delivery-charge policy.
#[derive(Debug, Clone)]
pub struct DeliveryPolicy {
    /// Subtotals at or above this waive the delivery charge entirely.
    pub free_threshold: Money,

    /// Flat charge used when the rate collaborator cannot answer.
    pub fallback_charge: Money,
}

impl Default for DeliveryPolicy {
    fn default() -> Self {
        Self {
            free_threshold: Money::from_rupees(2000),
            fallback_charge: Money::from_rupees(100),
        }
    }
}

/// Computes the delivery charge for a checkout.
///
/// The estimator holds no per-session state and must be re-run whenever
/// the location changes or the subtotal crosses the free threshold —
/// callers get that for free because every call recomputes from scratch.
///
/// Estimation failure is a degraded-accuracy condition, not a checkout
/// blocker: an unreachable rate service yields the configured flat charge.
pub struct DeliveryEstimator<R: DeliveryRates> {
    rates: R,
    origin: DeliveryLocation,
    policy: DeliveryPolicy,
}

impl<R: DeliveryRates> DeliveryEstimator<R> {
    /// Creates an estimator quoting from the given fulfillment origin.
    pub fn new(rates: R, origin: DeliveryLocation, policy: DeliveryPolicy) -> Self {
        Self {
            rates,
            origin,
            policy,
        }
    }

    /// Returns the configured policy.
    pub fn policy(&self) -> &DeliveryPolicy {
        &self.policy
    }

    /// Estimates the delivery charge for a destination at a given
    /// subtotal.
    ///
    /// The free threshold is inclusive: a subtotal exactly at the
    /// threshold ships free.
    #[tracing::instrument(skip(self, destination))]
    pub async fn estimate(&self, destination: &DeliveryLocation, subtotal: Money) -> Money {
        if subtotal >= self.policy.free_threshold {
            return Money::zero();
        }

        match self.rates.quote(&self.origin, destination).await {
            Ok(charge) => charge,
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    fallback = %self.policy.fallback_charge,
                    "delivery estimate unavailable, using flat fallback"
                );
                metrics::counter!("delivery_estimate_fallbacks_total").increment(1);
                self.policy.fallback_charge
            }
        }
    }
}
