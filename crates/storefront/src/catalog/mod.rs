//! Product catalog browsing.
//!
//! The catalog is fetched once per view from the backend. Filtering happens
//! locally on that snapshot: [`filter_products`] is a pure function, and
//! [`Catalog`] keeps the snapshot together with the values derived from it
//! (category choices, price control bound) and the shopper's current
//! [`FilterCriteria`].

mod filter;
mod product;

use tracing::{info, instrument, warn};
use zenbuy_core::Price;

use crate::backend::BackendClient;

pub use filter::{
    DEFAULT_MAX_PRICE, FilterCriteria, PRICE_STEP, PricePreset, PriceRange, categories,
    filter_products, max_price_bound,
};
pub use product::Product;

/// Message shown when the product listing cannot be fetched.
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load products. Please try again.";

/// A product snapshot plus the shopper's filter state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    products: Vec<Product>,
    categories: Vec<String>,
    max_price: Price,
    criteria: FilterCriteria,
}

impl Catalog {
    /// Build a catalog view over a product snapshot.
    ///
    /// The price range starts at `[0, bound]` where `bound` is the rounded-up
    /// highest price.
    #[must_use]
    pub fn new(products: Vec<Product>) -> Self {
        let mut catalog = Self {
            products: Vec::new(),
            categories: Vec::new(),
            max_price: Price::from_major(DEFAULT_MAX_PRICE),
            criteria: FilterCriteria::default(),
        };
        catalog.set_products(products);
        catalog
    }

    /// Replace the snapshot and recompute derived values.
    ///
    /// Search text and category selections are kept; the price range resets
    /// to cover the new snapshot.
    pub fn set_products(&mut self, products: Vec<Product>) {
        self.categories = categories(&products);
        self.max_price = max_price_bound(&products);
        self.criteria.price_range = PriceRange::up_to(self.max_price);
        self.products = products;
    }

    /// Fetch the listing from the backend.
    ///
    /// This is the single best-effort request for the view; there is no retry.
    /// The caller retries by calling again.
    #[instrument(skip(client))]
    pub async fn fetch(client: &BackendClient) -> LoadState {
        match client.fetch_products().await {
            Ok(products) => {
                info!(count = products.len(), "Catalog loaded");
                LoadState::Loaded(Self::new(products))
            }
            Err(e) => {
                warn!(error = %e, "Failed to load catalog");
                LoadState::Failed(LOAD_FAILED_MESSAGE.to_string())
            }
        }
    }

    /// Every product in the snapshot.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Category choices for the filter sidebar.
    #[must_use]
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Upper bound for the price control.
    #[must_use]
    pub const fn max_price(&self) -> Price {
        self.max_price
    }

    /// Current filter criteria.
    #[must_use]
    pub const fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    /// Mutable access to the filter criteria.
    pub const fn criteria_mut(&mut self) -> &mut FilterCriteria {
        &mut self.criteria
    }

    /// The products that pass the current criteria.
    #[must_use]
    pub fn visible(&self) -> Vec<Product> {
        filter_products(&self.products, &self.criteria)
    }

    /// Set the search text.
    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.criteria.search_query = query.into();
    }

    /// Set the price range from two slider positions in either order.
    pub fn set_price_range(&mut self, a: Price, b: Price) {
        self.criteria.price_range = PriceRange::new(a, b);
    }

    /// Apply a price bucket.
    pub fn apply_preset(&mut self, preset: PricePreset) {
        self.criteria.apply_preset(preset, self.max_price);
    }

    /// Select or deselect a category.
    pub fn toggle_category(&mut self, category: &str) {
        self.criteria.toggle_category(category);
    }

    /// Set the stock-only flag.
    pub const fn set_in_stock_only(&mut self, in_stock_only: bool) {
        self.criteria.in_stock_only = in_stock_only;
    }

    /// Reset the sidebar filters.
    pub fn clear_filters(&mut self) {
        self.criteria.clear_filters(self.max_price);
    }

    /// Whether any sidebar filter is narrowing the listing.
    #[must_use]
    pub fn has_active_filters(&self) -> bool {
        self.criteria.has_active_filters(self.max_price)
    }
}

/// Progress of the catalog fetch for a view.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    /// Request in flight.
    #[default]
    Loading,
    /// Products are available.
    Loaded(Catalog),
    /// The request failed; carries the message to show.
    Failed(String),
}

impl LoadState {
    /// The loaded catalog, if any.
    #[must_use]
    pub const fn catalog(&self) -> Option<&Catalog> {
        match self {
            Self::Loaded(catalog) => Some(catalog),
            _ => None,
        }
    }

    /// Mutable access to the loaded catalog, if any.
    pub const fn catalog_mut(&mut self) -> Option<&mut Catalog> {
        match self {
            Self::Loaded(catalog) => Some(catalog),
            _ => None,
        }
    }
}
