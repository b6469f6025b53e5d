//! Client-side product filtering.
//!
//! Four independent predicates are applied in order: free-text search, price
//! range, category membership, and stock. Filtering never reorders.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use zenbuy_core::Price;

use super::Product;

/// Upper bound of the price control before any products have loaded.
pub const DEFAULT_MAX_PRICE: i64 = 10_000;

/// The price control bound is rounded up to a multiple of this many rupees.
pub const PRICE_STEP: u32 = 100;

/// An inclusive price range.
///
/// The filter takes the bounds as given. [`PriceRange::new`] is the boundary
/// where callers build ranges from user input, and it orders the bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceRange {
    /// Lowest accepted price.
    pub min: Price,
    /// Highest accepted price.
    pub max: Price,
}

impl PriceRange {
    /// Build a range from two bounds in either order.
    #[must_use]
    pub fn new(a: Price, b: Price) -> Self {
        if a <= b {
            Self { min: a, max: b }
        } else {
            Self { min: b, max: a }
        }
    }

    /// `[0, bound]`.
    #[must_use]
    pub const fn up_to(bound: Price) -> Self {
        Self {
            min: Price::ZERO,
            max: bound,
        }
    }

    /// A range accepting every non-negative price.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self::up_to(Price::new(Decimal::MAX))
    }

    /// Whether `price` lies within the range, both ends inclusive.
    #[must_use]
    pub fn contains(&self, price: Price) -> bool {
        self.min <= price && price <= self.max
    }
}

impl Default for PriceRange {
    fn default() -> Self {
        Self::up_to(Price::from_major(DEFAULT_MAX_PRICE))
    }
}

/// Quick price buckets offered next to the range control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PricePreset {
    Under350,
    From350To500,
    From500To600,
    Over600,
    All,
}

impl PricePreset {
    /// The range this preset selects, given the current price control bound.
    ///
    /// `Over600` runs to `bound`; with a bound below 600 it matches nothing.
    #[must_use]
    pub fn range(self, bound: Price) -> PriceRange {
        match self {
            Self::Under350 => PriceRange::up_to(Price::from_major(350)),
            Self::From350To500 => PriceRange {
                min: Price::from_major(350),
                max: Price::from_major(500),
            },
            Self::From500To600 => PriceRange {
                min: Price::from_major(500),
                max: Price::from_major(600),
            },
            Self::Over600 => PriceRange {
                min: Price::from_major(600),
                max: bound,
            },
            Self::All => PriceRange::up_to(bound),
        }
    }
}

/// What the shopper has asked to see.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Case-insensitive substring matched against name, description, and category.
    pub search_query: String,
    /// Inclusive price range.
    pub price_range: PriceRange,
    /// Categories to show. Empty means no category restriction.
    pub selected_categories: BTreeSet<String>,
    /// Only show products with positive tracked stock.
    pub in_stock_only: bool,
}

impl FilterCriteria {
    /// Criteria that accept every product.
    #[must_use]
    pub fn unrestricted() -> Self {
        Self {
            price_range: PriceRange::unbounded(),
            ..Self::default()
        }
    }

    /// Select the category if unselected, otherwise deselect it.
    pub fn toggle_category(&mut self, category: &str) {
        if !self.selected_categories.remove(category) {
            self.selected_categories.insert(category.to_owned());
        }
    }

    /// Replace the price range with a preset bucket.
    pub fn apply_preset(&mut self, preset: PricePreset, bound: Price) {
        self.price_range = preset.range(bound);
    }

    /// Reset categories, stock flag, and price range. The search text is kept.
    pub fn clear_filters(&mut self, bound: Price) {
        self.selected_categories.clear();
        self.in_stock_only = false;
        self.price_range = PriceRange::up_to(bound);
    }

    /// Whether any sidebar filter narrows the listing relative to `bound`.
    #[must_use]
    pub fn has_active_filters(&self, bound: Price) -> bool {
        !self.selected_categories.is_empty()
            || self.in_stock_only
            || self.price_range.min > Price::ZERO
            || self.price_range.max < bound
    }

    /// Whether a product passes every active predicate.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        self.matches_query(product)
            && self.price_range.contains(product.price)
            && self.matches_category(product)
            && (!self.in_stock_only || product.has_stock())
    }

    fn matches_query(&self, product: &Product) -> bool {
        if self.search_query.trim().is_empty() {
            return true;
        }

        let query = self.search_query.to_lowercase();
        let contains = |field: &str| field.to_lowercase().contains(&query);

        contains(&product.name)
            || product.description.as_deref().is_some_and(contains)
            || product.category.as_deref().is_some_and(contains)
    }

    fn matches_category(&self, product: &Product) -> bool {
        if self.selected_categories.is_empty() {
            return true;
        }

        product
            .category
            .as_ref()
            .is_some_and(|c| self.selected_categories.contains(c))
    }
}

/// Return the products that pass `criteria`, in their original order.
#[must_use]
pub fn filter_products(products: &[Product], criteria: &FilterCriteria) -> Vec<Product> {
    products
        .iter()
        .filter(|p| criteria.matches(p))
        .cloned()
        .collect()
}

/// Distinct non-empty categories in the catalog, sorted ascending.
#[must_use]
pub fn categories(products: &[Product]) -> Vec<String> {
    products
        .iter()
        .filter_map(|p| p.category.as_deref())
        .filter(|c| !c.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_owned)
        .collect()
}

/// Upper bound for the price control.
///
/// The highest product price rounded up to the next multiple of
/// [`PRICE_STEP`], or [`DEFAULT_MAX_PRICE`] for an empty catalog.
#[must_use]
pub fn max_price_bound(products: &[Product]) -> Price {
    products
        .iter()
        .map(|p| p.price)
        .max()
        .map_or_else(
            || Price::from_major(DEFAULT_MAX_PRICE),
            |max| max.ceil_to_multiple(PRICE_STEP),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<Product> {
        vec![
            Product::new(1, "Desk Lamp", Price::from_major(300))
                .with_description("Warm reading light")
                .with_category("Home")
                .with_stock(5),
            Product::new(2, "Running Shoes", Price::from_major(700))
                .with_category("Sports")
                .with_stock(0),
            Product::new(3, "Novel", Price::from_major(450))
                .with_description("A gripping HOME-grown thriller")
                .with_category("Books"),
            Product::new(4, "Gift Card", Price::from_major(500)),
            Product::new(5, "Yoga Mat", Price::from_major(350))
                .with_category("Sports")
                .with_stock(12),
        ]
    }

    fn ids(products: &[Product]) -> Vec<String> {
        products.iter().map(|p| p.id.to_string()).collect()
    }

    #[test]
    fn test_unrestricted_criteria_is_identity() {
        let products = catalog();
        assert_eq!(
            filter_products(&products, &FilterCriteria::unrestricted()),
            products
        );
        assert!(filter_products(&[], &FilterCriteria::unrestricted()).is_empty());
    }

    #[test]
    fn test_price_and_stock_scenario() {
        let products = vec![
            Product::new(1, "A item", Price::from_major(300))
                .with_category("A")
                .with_stock(5),
            Product::new(2, "B item", Price::from_major(700))
                .with_category("B")
                .with_stock(0),
        ];
        let criteria = FilterCriteria {
            price_range: PriceRange::up_to(Price::from_major(500)),
            in_stock_only: true,
            ..FilterCriteria::default()
        };
        assert_eq!(ids(&filter_products(&products, &criteria)), ["1"]);
    }

    #[test]
    fn test_search_is_case_insensitive_across_fields() {
        let products = catalog();
        let mut criteria = FilterCriteria::unrestricted();

        criteria.search_query = "home".to_string();
        // Name miss, category hit on 1; description hit on 3.
        assert_eq!(ids(&filter_products(&products, &criteria)), ["1", "3"]);

        criteria.search_query = "SHOES".to_string();
        assert_eq!(ids(&filter_products(&products, &criteria)), ["2"]);
    }

    #[test]
    fn test_blank_query_is_ignored() {
        let products = catalog();
        let criteria = FilterCriteria {
            search_query: "   ".to_string(),
            ..FilterCriteria::unrestricted()
        };
        assert_eq!(filter_products(&products, &criteria).len(), products.len());
    }

    #[test]
    fn test_query_is_not_trimmed_when_matching() {
        let products = catalog();
        let criteria = FilterCriteria {
            search_query: " lamp".to_string(),
            ..FilterCriteria::unrestricted()
        };
        assert_eq!(ids(&filter_products(&products, &criteria)), ["1"]);

        let criteria = FilterCriteria {
            search_query: "lamp ".to_string(),
            ..FilterCriteria::unrestricted()
        };
        assert!(filter_products(&products, &criteria).is_empty());
    }

    #[test]
    fn test_price_range_is_inclusive() {
        let products = catalog();
        let criteria = FilterCriteria {
            price_range: PriceRange::new(Price::from_major(350), Price::from_major(500)),
            ..FilterCriteria::default()
        };
        assert_eq!(ids(&filter_products(&products, &criteria)), ["3", "4", "5"]);
    }

    #[test]
    fn test_inverted_range_matches_nothing() {
        let products = catalog();
        let criteria = FilterCriteria {
            price_range: PriceRange {
                min: Price::from_major(600),
                max: Price::from_major(100),
            },
            ..FilterCriteria::default()
        };
        assert!(filter_products(&products, &criteria).is_empty());
    }

    #[test]
    fn test_price_range_new_orders_bounds() {
        let range = PriceRange::new(Price::from_major(600), Price::from_major(100));
        assert_eq!(range.min, Price::from_major(100));
        assert_eq!(range.max, Price::from_major(600));
    }

    #[test]
    fn test_category_filter_exact_and_complete() {
        let products = catalog();
        let mut criteria = FilterCriteria::unrestricted();
        criteria.toggle_category("Sports");
        criteria.toggle_category("Books");

        let result = filter_products(&products, &criteria);
        assert!(result.iter().all(|p| {
            p.category
                .as_ref()
                .is_some_and(|c| criteria.selected_categories.contains(c))
        }));
        assert_eq!(ids(&result), ["2", "3", "5"]);
    }

    #[test]
    fn test_uncategorised_products_excluded_by_category_filter() {
        let products = catalog();
        let mut criteria = FilterCriteria::unrestricted();
        criteria.toggle_category("Home");
        assert!(!ids(&filter_products(&products, &criteria)).contains(&"4".to_string()));
    }

    #[test]
    fn test_toggle_category_twice_clears() {
        let mut criteria = FilterCriteria::default();
        criteria.toggle_category("Books");
        assert!(criteria.selected_categories.contains("Books"));
        criteria.toggle_category("Books");
        assert!(criteria.selected_categories.is_empty());
    }

    #[test]
    fn test_in_stock_only_excludes_untracked_stock() {
        let products = catalog();
        let criteria = FilterCriteria {
            in_stock_only: true,
            ..FilterCriteria::unrestricted()
        };
        assert_eq!(ids(&filter_products(&products, &criteria)), ["1", "5"]);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let products = catalog();
        let mut criteria = FilterCriteria {
            search_query: "o".to_string(),
            price_range: PriceRange::up_to(Price::from_major(600)),
            in_stock_only: false,
            ..FilterCriteria::default()
        };
        criteria.toggle_category("Sports");
        criteria.toggle_category("Books");

        let once = filter_products(&products, &criteria);
        let twice = filter_products(&once, &criteria);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_categories_sorted_distinct_non_empty() {
        let mut products = catalog();
        products.push(Product::new(6, "Blank", Price::from_major(1)).with_category(""));
        products.push(Product::new(7, "Tent", Price::from_major(1)).with_category("Sports"));
        assert_eq!(categories(&products), ["Books", "Home", "Sports"]);
        assert!(categories(&[]).is_empty());
    }

    #[test]
    fn test_max_price_bound() {
        assert_eq!(max_price_bound(&catalog()), Price::from_major(700));
        assert_eq!(
            max_price_bound(&[Product::new(1, "x", Price::from_major(1250))]),
            Price::from_major(1300)
        );
        assert_eq!(max_price_bound(&[]), Price::from_major(DEFAULT_MAX_PRICE));
    }

    #[test]
    fn test_presets() {
        let bound = Price::from_major(900);
        assert_eq!(
            PricePreset::Under350.range(bound),
            PriceRange::up_to(Price::from_major(350))
        );
        assert_eq!(PricePreset::Over600.range(bound).max, bound);
        assert_eq!(PricePreset::All.range(bound), PriceRange::up_to(bound));
    }

    #[test]
    fn test_has_active_filters_and_clear() {
        let bound = Price::from_major(700);
        let mut criteria = FilterCriteria {
            price_range: PriceRange::up_to(bound),
            ..FilterCriteria::default()
        };
        assert!(!criteria.has_active_filters(bound));

        criteria.apply_preset(PricePreset::From500To600, bound);
        assert!(criteria.has_active_filters(bound));

        criteria.in_stock_only = true;
        criteria.toggle_category("Home");
        criteria.search_query = "lamp".to_string();
        criteria.clear_filters(bound);
        assert!(!criteria.has_active_filters(bound));
        assert_eq!(criteria.search_query, "lamp");
    }
}
