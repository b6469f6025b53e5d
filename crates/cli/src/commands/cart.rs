//! Cart commands.

use clap::Subcommand;
use zenbuy_core::ProductId;
use zenbuy_storefront::cart::Cart;
use zenbuy_storefront::error::{AppError, Result, add_breadcrumb};

use super::Context;

#[derive(Debug, Subcommand)]
pub enum CartAction {
    /// Show the cart
    Show,
    /// Add a product
    Add {
        /// Product ID
        id: String,
        /// Units to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Set a line's quantity; below one removes it
    Set {
        /// Product ID
        id: String,
        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a product
    Remove {
        /// Product ID
        id: String,
    },
    /// Empty the cart
    Clear,
}

#[allow(clippy::print_stdout)]
pub async fn run(ctx: &Context, action: CartAction) -> Result<()> {
    let cart = ctx.session.cart();

    match action {
        CartAction::Show => print_cart(&cart.load()),
        CartAction::Add { id, quantity } => {
            let product_id = ProductId::parse(&id);
            let catalog = ctx.catalog().await?;
            let product = catalog
                .products()
                .iter()
                .find(|p| p.id == product_id)
                .ok_or_else(|| AppError::Invalid(format!("No product with ID {id}")))?;
            if product.is_out_of_stock() {
                return Err(AppError::Invalid(format!("{} is out of stock", product.name)));
            }

            let data = [("product_id", id.as_str())];
            add_breadcrumb("cart", "Added to cart", Some(data.as_slice()));
            let updated = cart.add_item(product, quantity)?;
            println!("Added {quantity} x {} to your cart.", product.name);
            print_cart(&updated);
        }
        CartAction::Set { id, quantity } => {
            let updated = cart.set_quantity(&ProductId::parse(&id), quantity)?;
            print_cart(&updated);
        }
        CartAction::Remove { id } => {
            let updated = cart.remove_item(&ProductId::parse(&id))?;
            print_cart(&updated);
        }
        CartAction::Clear => {
            cart.clear()?;
            println!("Your cart is empty.");
        }
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
pub fn print_cart(cart: &Cart) {
    if cart.is_empty() {
        println!("Your cart is empty.");
        return;
    }

    for item in cart.items() {
        println!(
            "{:>6}  {:<32} {:>4} x {:>12} = {:>12}",
            item.product_id.to_string(),
            item.name,
            item.quantity,
            item.price.to_string(),
            item.line_total().to_string(),
        );
    }
    println!("\n{} items, total {}", cart.item_count(), cart.total());
}
