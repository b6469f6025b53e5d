//! Shopping cart backed by the durable `cart` slot.
//!
//! The slot is the single source of truth. Every [`CartStore`] operation
//! re-reads it, applies its change, and writes the result back before
//! returning, so no in-memory copy outlives a call. Two views writing at
//! the same time race; the later write wins.
//!
//! A cart holds at most one line per product. Adding a product that is
//! already present bumps its quantity. Quantities never drop below one: a
//! line that would is removed instead.
//!
//! Line items copy the product's name, description, image, and price at the
//! moment of adding. Later catalog changes do not touch lines already in the
//! cart.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use zenbuy_core::{Price, ProductId};

use crate::catalog::Product;
use crate::storage::{KeyValueStore, StorageError, keys, read_json};

/// Errors from cart updates.
#[derive(Debug, Error)]
pub enum CartError {
    /// The requested quantity does not fit in a cart line.
    #[error("Quantity {0} is too large")]
    QuantityTooLarge(i64),

    /// The cart slot could not be written.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// One product and its quantity in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    /// Product this line refers to.
    #[serde(rename = "id")]
    pub product_id: ProductId,
    /// Product name at add time.
    #[serde(default)]
    pub name: String,
    /// Product description at add time.
    #[serde(default)]
    pub description: Option<String>,
    /// Product image at add time.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Unit price at add time.
    pub price: Price,
    /// Number of units, at least one.
    pub quantity: u32,
}

impl CartLineItem {
    /// Snapshot a product into a new line.
    #[must_use]
    pub fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            description: product.description.clone(),
            image_url: product.image_url.clone(),
            price: product.price,
            quantity,
        }
    }

    /// `price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price * self.quantity
    }
}

/// The cart contents at one point in time.
///
/// Persisted as a bare JSON array of line items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartLineItem>,
}

impl Cart {
    /// Build a cart from line items, enforcing the one-line-per-product and
    /// positive-quantity invariants.
    ///
    /// Lines with a zero quantity are dropped; repeated products are merged
    /// into the first occurrence.
    #[must_use]
    pub fn from_items(items: impl IntoIterator<Item = CartLineItem>) -> Self {
        let mut cart = Self::default();
        for item in items {
            if item.quantity == 0 {
                warn!(product_id = %item.product_id, "Dropping cart line with zero quantity");
                continue;
            }
            match cart.position(&item.product_id) {
                Some(index) => {
                    if let Some(existing) = cart.items.get_mut(index) {
                        existing.quantity = existing.quantity.saturating_add(item.quantity);
                    }
                }
                None => cart.items.push(item),
            }
        }
        cart
    }

    /// Line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Consume the cart, returning its line items.
    #[must_use]
    pub fn into_items(self) -> Vec<CartLineItem> {
        self.items
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// The line for a product, if present.
    #[must_use]
    pub fn find(&self, product_id: &ProductId) -> Option<&CartLineItem> {
        self.items.iter().find(|i| &i.product_id == product_id)
    }

    /// Sum of `price * quantity` over all lines. Unrounded.
    #[must_use]
    pub fn total(&self) -> Price {
        self.items.iter().map(CartLineItem::line_total).sum()
    }

    fn position(&self, product_id: &ProductId) -> Option<usize> {
        self.items.iter().position(|i| &i.product_id == product_id)
    }

    fn add(&mut self, product: &Product, quantity: u32) {
        match self.position(&product.id) {
            Some(index) => {
                if let Some(existing) = self.items.get_mut(index) {
                    existing.quantity = existing.quantity.saturating_add(quantity);
                }
            }
            None => self
                .items
                .push(CartLineItem::from_product(product, quantity)),
        }
    }

    fn set_quantity(&mut self, product_id: &ProductId, quantity: u32) {
        if let Some(item) = self.items.iter_mut().find(|i| &i.product_id == product_id) {
            item.quantity = quantity;
        }
    }

    fn remove(&mut self, product_id: &ProductId) {
        self.items.retain(|i| &i.product_id != product_id);
    }
}

/// Cart operations against a durable store.
#[derive(Debug, Clone)]
pub struct CartStore<S> {
    store: S,
}

impl<S: KeyValueStore> CartStore<S> {
    /// Create a cart store over `store`.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Read the cart from the slot.
    ///
    /// An absent, unreadable, or malformed slot reads as an empty cart.
    #[must_use]
    pub fn load(&self) -> Cart {
        read_json::<Vec<CartLineItem>, _>(&self.store, keys::CART)
            .map(Cart::from_items)
            .unwrap_or_default()
    }

    /// Add one unit of a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the updated cart cannot be written.
    pub fn add_one(&self, product: &Product) -> Result<Cart, StorageError> {
        self.add_item(product, 1)
    }

    /// Add `quantity` units of a product, merging into an existing line.
    ///
    /// A zero quantity leaves the cart unchanged (it is still re-written).
    ///
    /// # Errors
    ///
    /// Returns an error if the updated cart cannot be written.
    pub fn add_item(&self, product: &Product, quantity: u32) -> Result<Cart, StorageError> {
        let mut cart = self.load();
        if quantity > 0 {
            cart.add(product, quantity);
            debug!(product_id = %product.id, quantity, "Added to cart");
        }
        self.persist(&cart)?;
        Ok(cart)
    }

    /// Set a line's quantity in place.
    ///
    /// A quantity below one removes the line. An unknown product leaves the
    /// cart unchanged (it is still re-written).
    ///
    /// # Errors
    ///
    /// Returns [`CartError::QuantityTooLarge`] without touching the slot if
    /// `quantity` exceeds `u32::MAX`, or a storage error if the updated cart
    /// cannot be written.
    pub fn set_quantity(&self, product_id: &ProductId, quantity: i64) -> Result<Cart, CartError> {
        if quantity < 1 {
            return Ok(self.remove_item(product_id)?);
        }
        let quantity_u32 =
            u32::try_from(quantity).map_err(|_| CartError::QuantityTooLarge(quantity))?;

        let mut cart = self.load();
        cart.set_quantity(product_id, quantity_u32);
        debug!(product_id = %product_id, quantity, "Cart quantity set");
        self.persist(&cart)?;
        Ok(cart)
    }

    /// Remove a product's line. Removing an absent product is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the updated cart cannot be written.
    pub fn remove_item(&self, product_id: &ProductId) -> Result<Cart, StorageError> {
        let mut cart = self.load();
        cart.remove(product_id);
        debug!(product_id = %product_id, "Removed from cart");
        self.persist(&cart)?;
        Ok(cart)
    }

    /// Empty the cart by deleting the slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot cannot be removed.
    pub fn clear(&self) -> Result<(), StorageError> {
        debug!("Cart cleared");
        self.store.remove(keys::CART)
    }

    /// Current cart total.
    #[must_use]
    pub fn total(&self) -> Price {
        self.load().total()
    }

    fn persist(&self, cart: &Cart) -> Result<(), StorageError> {
        let raw = serde_json::to_string(cart)?;
        self.store.set(keys::CART, &raw)
    }
}
