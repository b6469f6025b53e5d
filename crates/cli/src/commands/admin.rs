//! Admin console commands.

use clap::{Args, Subcommand, ValueEnum};
use zenbuy_core::{CouponId, DiscountType, ProductId, UserId};
use zenbuy_storefront::admin::{AdminConsole, CouponForm, ProductForm};
use zenbuy_storefront::error::Result;

use super::Context;

#[derive(Debug, Subcommand)]
pub enum AdminAction {
    /// Dashboard counters
    Stats,
    /// List users
    Users,
    /// Delete a user account
    DeleteUser { id: String },
    /// Create a product, or update one with --id
    SaveProduct(ProductArgs),
    /// Delete a product
    DeleteProduct { id: String },
    /// List coupons
    Coupons,
    /// Create a coupon, or update one with --id
    SaveCoupon(CouponArgs),
    /// Delete a coupon
    DeleteCoupon { id: String },
}

#[derive(Debug, Args)]
pub struct ProductArgs {
    /// Existing product to update
    #[arg(long)]
    id: Option<String>,
    #[arg(long)]
    name: String,
    #[arg(long)]
    price: String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long, default_value = "")]
    image_url: String,
    #[arg(long, default_value = "")]
    category: String,
    /// Leave out to stop tracking stock
    #[arg(long, default_value = "")]
    stock: String,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DiscountArg {
    Percentage,
    Flat,
}

#[derive(Debug, Args)]
pub struct CouponArgs {
    /// Existing coupon to update
    #[arg(long)]
    id: Option<String>,
    #[arg(long)]
    code: String,
    #[arg(long, value_enum, default_value_t = DiscountArg::Percentage)]
    discount_type: DiscountArg,
    #[arg(long)]
    value: String,
    /// First valid day (YYYY-MM-DD)
    #[arg(long, default_value = "")]
    valid_from: String,
    /// Last valid day (YYYY-MM-DD)
    #[arg(long, default_value = "")]
    valid_until: String,
    /// Save the coupon switched off
    #[arg(long)]
    inactive: bool,
    #[arg(long, default_value = "")]
    max_uses: String,
    #[arg(long, default_value = "")]
    min_purchase: String,
    #[arg(long, default_value = "")]
    description: String,
}

impl From<ProductArgs> for ProductForm {
    fn from(args: ProductArgs) -> Self {
        Self {
            name: args.name,
            description: args.description,
            price: args.price,
            image_url: args.image_url,
            category: args.category,
            stock_quantity: args.stock,
        }
    }
}

impl From<CouponArgs> for CouponForm {
    fn from(args: CouponArgs) -> Self {
        Self {
            code: args.code,
            discount_type: match args.discount_type {
                DiscountArg::Percentage => DiscountType::Percentage,
                DiscountArg::Flat => DiscountType::Flat,
            },
            discount_value: args.value,
            valid_from: args.valid_from,
            valid_until: args.valid_until,
            is_active: !args.inactive,
            max_uses: args.max_uses,
            min_purchase_amount: args.min_purchase,
            description: args.description,
        }
    }
}

#[allow(clippy::print_stdout)]
pub async fn run(ctx: &Context, action: AdminAction) -> Result<()> {
    let console = AdminConsole::open(&ctx.session, &ctx.client)?;

    match action {
        AdminAction::Stats => {
            let stats = console.stats().await?;
            println!("Users:    {}", stats.total_users);
            println!("Products: {}", stats.total_products);
            println!("Orders:   {}", stats.total_orders);
            println!("Revenue:  {}", stats.revenue);
        }
        AdminAction::Users => {
            for user in console.users().await? {
                println!(
                    "{:>6}  {:<24} {:<32} {:?}",
                    user.id.to_string(),
                    user.name,
                    user.email,
                    user.role
                );
            }
        }
        AdminAction::DeleteUser { id } => {
            console.delete_user(&UserId::parse(&id)).await?;
            println!("User {id} deleted.");
        }
        AdminAction::SaveProduct(mut args) => {
            let id = args.id.take().map(|id| ProductId::parse(&id));
            let product = console.save_product(id.as_ref(), &args.into()).await?;
            println!("Saved product {} ({}).", product.id, product.name);
        }
        AdminAction::DeleteProduct { id } => {
            console.delete_product(&ProductId::parse(&id)).await?;
            println!("Product {id} deleted.");
        }
        AdminAction::Coupons => {
            for coupon in console.coupons().await? {
                println!(
                    "{:>6}  {:<16} {:<10} {:>8}  {}",
                    coupon.id.to_string(),
                    coupon.code,
                    coupon.discount_type.to_string(),
                    coupon.discount_value.to_string(),
                    if coupon.is_active { "active" } else { "inactive" }
                );
            }
        }
        AdminAction::SaveCoupon(mut args) => {
            let id = args.id.take().map(|id| CouponId::parse(&id));
            let coupon = console.save_coupon(id.as_ref(), &args.into()).await?;
            println!("Saved coupon {}.", coupon.code);
        }
        AdminAction::DeleteCoupon { id } => {
            console.delete_coupon(&CouponId::parse(&id)).await?;
            println!("Coupon {id} deleted.");
        }
    }
    Ok(())
}
