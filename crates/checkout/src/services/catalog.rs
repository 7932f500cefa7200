//! Catalog port and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use domain::{Money, ProductId};
use serde::{Deserialize, Serialize};

use crate::error::CheckoutError;

/// A product as the catalog knows it.
///
/// The checkout path reads products and moves stock; it never edits
/// price, name, or category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// The product identifier.
    pub id: ProductId,

    /// Human-readable product name.
    pub name: String,

    /// Current live price per unit.
    pub unit_price: Money,

    /// Category used for reporting breakdowns.
    pub category: String,

    /// Units currently available.
    pub stock: u32,
}

impl Product {
    /// Creates a new product.
    pub fn new(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        unit_price: Money,
        category: impl Into<String>,
        stock: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            unit_price,
            category: category.into(),
            stock,
        }
    }
}

/// Trait for catalog operations the checkout path needs.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Looks up a product by ID.
    async fn get_product(&self, id: &ProductId) -> Result<Option<Product>, CheckoutError>;

    /// Reserves `quantity` units of a product.
    ///
    /// The check and the decrement must be a single atomic step so that
    /// concurrent checkouts cannot oversell.
    async fn reserve_stock(&self, id: &ProductId, quantity: u32) -> Result<(), CheckoutError>;

    /// Releases previously reserved units back to the catalog.
    async fn release_stock(&self, id: &ProductId, quantity: u32) -> Result<(), CheckoutError>;
}

/// In-memory catalog.
///
/// Reserve performs its availability check and decrement under one write
/// lock, the in-process equivalent of a compare-and-set.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    products: Arc<RwLock<HashMap<ProductId, Product>>>,
}

impl InMemoryCatalog {
    /// Creates a new empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a product.
    pub fn upsert(&self, product: Product) {
        self.products
            .write()
            .unwrap()
            .insert(product.id.clone(), product);
    }

    /// Returns the current stock of a product, if it exists.
    pub fn stock(&self, id: &ProductId) -> Option<u32> {
        self.products.read().unwrap().get(id).map(|p| p.stock)
    }

    /// Returns all products.
    pub fn all(&self) -> Vec<Product> {
        self.products.read().unwrap().values().cloned().collect()
    }
}

#[async_trait]
impl Catalog for InMemoryCatalog {
    async fn get_product(&self, id: &ProductId) -> Result<Option<Product>, CheckoutError> {
        Ok(self.products.read().unwrap().get(id).cloned())
    }

    async fn reserve_stock(&self, id: &ProductId, quantity: u32) -> Result<(), CheckoutError> {
        let mut products = self.products.write().unwrap();
        let product = products
            .get_mut(id)
            .ok_or_else(|| CheckoutError::UnknownProduct(id.to_string()))?;

        if product.stock < quantity {
            return Err(CheckoutError::InsufficientStock {
                product_id: id.to_string(),
                requested: quantity,
                available: product.stock,
            });
        }

        product.stock -= quantity;
        Ok(())
    }

    async fn release_stock(&self, id: &ProductId, quantity: u32) -> Result<(), CheckoutError> {
        let mut products = self.products.write().unwrap();
        let product = products
            .get_mut(id)
            .ok_or_else(|| CheckoutError::UnknownProduct(id.to_string()))?;

        product.stock += quantity;
        Ok(())
    }
}
