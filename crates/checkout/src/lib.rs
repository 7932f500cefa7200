//! Cart-to-order checkout.
//!
//! This crate owns everything between a shopper's mutable cart and the
//! immutable order the domain records:
//! - the session-scoped [`Cart`]
//! - the [`DeliveryEstimator`] with its free-threshold and flat fallback
//! - the external collaborator ports ([`Catalog`], [`PaymentGateway`],
//!   [`DeliveryRates`]) with in-memory implementations
//! - the [`CheckoutCoordinator`], which validates, captures prices,
//!   reserves stock, authorizes payment, places the order, and publishes
//!   the resulting lifecycle notifications — rolling external effects back
//!   if any money- or inventory-affecting step fails.

pub mod cart;
pub mod coordinator;
pub mod error;
pub mod estimator;
pub mod services;

pub use cart::{Cart, CartLine};
pub use coordinator::{CheckoutCoordinator, CheckoutRequest};
pub use error::CheckoutError;
pub use estimator::{DeliveryEstimator, DeliveryPolicy};
pub use services::{
    Catalog, DeliveryRates, InMemoryCatalog, InMemoryDeliveryRates, InMemoryPaymentGateway,
    PaymentAuth, PaymentGateway, Product,
};
