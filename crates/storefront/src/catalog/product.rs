//! Product snapshot as served by the backend.

use serde::{Deserialize, Serialize};
use zenbuy_core::{Price, ProductId};

/// A product from the catalog listing.
///
/// The storefront holds an immutable snapshot for the duration of a catalog
/// view and never edits it in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Backend identifier.
    pub id: ProductId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Long description.
    #[serde(default)]
    pub description: Option<String>,
    /// Image URL.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Unit price.
    pub price: Price,
    /// Category label.
    #[serde(default)]
    pub category: Option<String>,
    /// Units in stock. `None` means the product does not track stock.
    #[serde(default)]
    pub stock_quantity: Option<i64>,
}

impl Product {
    /// Create a product with only the required fields set.
    #[must_use]
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: Price) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            image_url: None,
            price,
            category: None,
            stock_quantity: None,
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the image URL.
    #[must_use]
    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    /// Set the category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the stock quantity.
    #[must_use]
    pub const fn with_stock(mut self, quantity: i64) -> Self {
        self.stock_quantity = Some(quantity);
        self
    }

    /// Whether the product has positive tracked stock.
    ///
    /// Products that do not track stock are *not* in stock by this test; this
    /// is what the "in stock only" filter uses.
    #[must_use]
    pub fn has_stock(&self) -> bool {
        self.stock_quantity.is_some_and(|q| q > 0)
    }

    /// Whether the product tracks stock and has none left.
    ///
    /// Products that do not track stock are never out of stock, so they can
    /// always be added to the cart.
    #[must_use]
    pub fn is_out_of_stock(&self) -> bool {
        self.stock_quantity.is_some_and(|q| q <= 0)
    }

    /// Availability badge text, if the product tracks stock.
    #[must_use]
    pub fn stock_label(&self) -> Option<&'static str> {
        self.stock_quantity
            .map(|q| if q > 0 { "In Stock" } else { "Out of Stock" })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_backend_shape() {
        let json = r#"{
            "id": 1,
            "name": "Desk Lamp",
            "description": "Warm light",
            "imageUrl": "https://img/lamp.png",
            "price": 300,
            "category": "Home",
            "stockQuantity": 5
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, ProductId::from_number(1));
        assert_eq!(product.price, Price::from_major(300));
        assert_eq!(product.image_url.as_deref(), Some("https://img/lamp.png"));
        assert_eq!(product.stock_quantity, Some(5));
    }

    #[test]
    fn test_missing_optional_fields() {
        let product: Product = serde_json::from_str(r#"{"id":"a1","name":"Mug","price":99.5}"#).unwrap();
        assert_eq!(product.category, None);
        assert_eq!(product.stock_quantity, None);
    }

    #[test]
    fn test_stock_predicates() {
        let untracked = Product::new(1, "Ebook", Price::from_major(10));
        assert!(!untracked.has_stock());
        assert!(!untracked.is_out_of_stock());
        assert_eq!(untracked.stock_label(), None);

        let empty = Product::new(2, "Mug", Price::from_major(10)).with_stock(0);
        assert!(!empty.has_stock());
        assert!(empty.is_out_of_stock());
        assert_eq!(empty.stock_label(), Some("Out of Stock"));

        let stocked = Product::new(3, "Pen", Price::from_major(10)).with_stock(4);
        assert!(stocked.has_stock());
        assert_eq!(stocked.stock_label(), Some("In Stock"));
    }
}
