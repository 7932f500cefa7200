//! Session-scoped shopping cart.

use std::collections::HashMap;

use domain::{DeliveryLocation, Money, ProductId};

use crate::error::CheckoutError;
use crate::services::{Catalog, Product};

/// One cart line: a product reference and how many units of it.
///
/// The quantity is always at least 1; dropping to 0 removes the line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    /// The product identifier.
    pub product_id: ProductId,

    /// Units selected.
    pub quantity: u32,
}

/// A shopper's in-progress selection.
///
/// One cart per session, passed explicitly — never process-wide state.
/// The cart holds product references only; prices are read live from the
/// catalog for display, and captured into the order at checkout. The cart
/// is cleared on successful placement or explicit clear.
#[derive(Debug, Default)]
pub struct Cart {
    lines: HashMap<ProductId, CartLine>,
    location: Option<DeliveryLocation>,
    delivery_charge: Money,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one unit of a product.
    ///
    /// An existing line is incremented; otherwise a new line with
    /// quantity 1 is inserted. A product with an empty identifier is
    /// silently ignored.
    pub fn add_item(&mut self, product: &Product) {
        if product.id.is_empty() {
            return;
        }

        self.lines
            .entry(product.id.clone())
            .and_modify(|line| line.quantity += 1)
            .or_insert_with(|| CartLine {
                product_id: product.id.clone(),
                quantity: 1,
            });
    }

    /// Sets the quantity of an existing line directly.
    ///
    /// A quantity of 0 removes the line, keeping the quantity-≥-1
    /// invariant. No stock check happens here; availability is validated
    /// at checkout. A line that doesn't exist is left alone.
    pub fn update_quantity(&mut self, product_id: &ProductId, quantity: u32) {
        if quantity == 0 {
            self.remove_item(product_id);
            return;
        }

        if let Some(line) = self.lines.get_mut(product_id) {
            line.quantity = quantity;
        }
    }

    /// Removes a line entirely. No-op if absent.
    pub fn remove_item(&mut self, product_id: &ProductId) {
        self.lines.remove(product_id);
    }

    /// Empties the cart and releases the chosen location and charge.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.location = None;
        self.delivery_charge = Money::zero();
    }

    /// Returns the line for a product, if present.
    pub fn line(&self, product_id: &ProductId) -> Option<&CartLine> {
        self.lines.get(product_id)
    }

    /// Returns all lines.
    pub fn lines(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.values()
    }

    /// Returns true if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Returns the total number of units across all lines.
    ///
    /// This is the badge count: units, not lines.
    pub fn item_count(&self) -> u32 {
        self.lines.values().map(|line| line.quantity).sum()
    }

    /// Computes the subtotal from live catalog prices.
    ///
    /// The one place a live price is acceptable — no order exists yet.
    /// Lines whose product has vanished from the catalog contribute
    /// nothing.
    pub async fn subtotal<C: Catalog>(&self, catalog: &C) -> Result<Money, CheckoutError> {
        let mut subtotal = Money::zero();
        for line in self.lines.values() {
            if let Some(product) = catalog.get_product(&line.product_id).await? {
                subtotal += product.unit_price.multiply(line.quantity);
            }
        }
        Ok(subtotal)
    }

    /// Stages the delivery location for checkout.
    pub fn set_location(&mut self, location: DeliveryLocation) {
        self.location = Some(location);
    }

    /// Returns the staged delivery location.
    pub fn location(&self) -> Option<&DeliveryLocation> {
        self.location.as_ref()
    }

    /// Stages the estimated delivery charge for display.
    pub fn set_delivery_charge(&mut self, charge: Money) {
        self.delivery_charge = charge;
    }

    /// Returns the staged delivery charge.
    pub fn delivery_charge(&self) -> Money {
        self.delivery_charge
    }
}
