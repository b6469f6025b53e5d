//! Catalog browsing commands.

use clap::{Args, ValueEnum};
use zenbuy_core::Price;
use zenbuy_storefront::catalog::{Catalog, PricePreset, Product};
use zenbuy_storefront::error::Result;

use super::Context;

/// Price buckets offered as shortcuts.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PresetArg {
    /// Under ₹350
    Under350,
    /// ₹350 to ₹500
    From350To500,
    /// ₹500 to ₹600
    From500To600,
    /// Over ₹600
    Over600,
}

impl From<PresetArg> for PricePreset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::Under350 => Self::Under350,
            PresetArg::From350To500 => Self::From350To500,
            PresetArg::From500To600 => Self::From500To600,
            PresetArg::Over600 => Self::Over600,
        }
    }
}

#[derive(Debug, Args)]
pub struct ProductArgs {
    /// Case-insensitive text to find in names, descriptions and categories
    #[arg(short, long)]
    search: Option<String>,

    /// Lowest price
    #[arg(long)]
    min: Option<Price>,

    /// Highest price
    #[arg(long)]
    max: Option<Price>,

    /// Price bucket (overrides --min and --max)
    #[arg(long, value_enum)]
    preset: Option<PresetArg>,

    /// Category to include; repeat for several
    #[arg(short, long = "category")]
    categories: Vec<String>,

    /// Only products with stock on hand
    #[arg(long)]
    in_stock: bool,
}

impl ProductArgs {
    fn apply(&self, catalog: &mut Catalog) {
        if let Some(search) = &self.search {
            catalog.set_search_query(search.as_str());
        }
        if self.min.is_some() || self.max.is_some() {
            let bound = catalog.max_price();
            catalog.set_price_range(self.min.unwrap_or(Price::ZERO), self.max.unwrap_or(bound));
        }
        if let Some(preset) = self.preset {
            catalog.apply_preset(preset.into());
        }
        for category in &self.categories {
            catalog.toggle_category(category);
        }
        catalog.set_in_stock_only(self.in_stock);
    }
}

/// List the products that pass the given filters.
#[allow(clippy::print_stdout)]
pub async fn products(ctx: &Context, args: &ProductArgs) -> Result<()> {
    let mut catalog = ctx.catalog().await?;
    args.apply(&mut catalog);

    let visible = catalog.visible();
    if visible.is_empty() {
        println!("No products match your filters.");
        if catalog.has_active_filters() {
            println!("Try removing some filters.");
        }
        return Ok(());
    }

    for product in &visible {
        println!("{}", product_row(product));
    }
    println!("\n{} of {} products", visible.len(), catalog.products().len());
    Ok(())
}

/// List the categories present in the catalog.
#[allow(clippy::print_stdout)]
pub async fn categories(ctx: &Context) -> Result<()> {
    let catalog = ctx.catalog().await?;
    for category in catalog.categories() {
        println!("{category}");
    }
    Ok(())
}

fn product_row(product: &Product) -> String {
    format!(
        "{:>6}  {:<32} {:>12}  {:<14} {}",
        product.id.to_string(),
        product.name,
        product.price.to_string(),
        product.category.as_deref().unwrap_or("-"),
        product.stock_label().unwrap_or_default(),
    )
}
