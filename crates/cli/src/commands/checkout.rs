//! Coupon and checkout commands.

use clap::{Args, ValueEnum};
use secrecy::SecretString;
use zenbuy_storefront::checkout::{
    AppliedCoupon, CardDetails, OrderDraft, OrderSummary, PaymentDetails, PaymentMethod,
    ShippingAddress, apply_coupon,
};
use zenbuy_storefront::error::{AppError, Result};
use zenbuy_storefront::orders::{PlacedOrder, place_order};

use super::Context;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum MethodArg {
    Card,
    Upi,
    Netbanking,
    Wallet,
    Payu,
    Cod,
}

#[derive(Debug, Args)]
pub struct CheckoutArgs {
    /// Payment method
    #[arg(value_enum)]
    method: MethodArg,

    /// Coupon code to apply
    #[arg(long)]
    coupon: Option<String>,

    // Address; blank fields fall back to the profile
    /// Flat or house number
    #[arg(long)]
    flat_no: Option<String>,
    /// Street or locality
    #[arg(long)]
    locality: Option<String>,
    /// City
    #[arg(long)]
    city: Option<String>,
    /// Postal code
    #[arg(long)]
    pincode: Option<String>,
    /// Contact number
    #[arg(long)]
    phone: Option<String>,

    /// Card number
    #[arg(long, required_if_eq("method", "card"))]
    card_number: Option<String>,
    /// Name on the card
    #[arg(long, required_if_eq("method", "card"))]
    card_name: Option<String>,
    /// Expiry month (MM)
    #[arg(long, required_if_eq("method", "card"))]
    expiry_month: Option<String>,
    /// Expiry year (YYYY)
    #[arg(long, required_if_eq("method", "card"))]
    expiry_year: Option<String>,
    /// Card security code
    #[arg(long, env = "ZENBUY_CARD_CVV", hide_env_values = true)]
    cvv: Option<String>,

    /// UPI ID, e.g. name@bank
    #[arg(long, required_if_eq("method", "upi"))]
    upi_id: Option<String>,
    /// Bank for net banking
    #[arg(long, required_if_eq("method", "netbanking"))]
    bank: Option<String>,
    /// Wallet provider
    #[arg(long, required_if_eq("method", "wallet"))]
    wallet: Option<String>,
    /// PayU transaction ID
    #[arg(long, required_if_eq("method", "payu"))]
    transaction_id: Option<String>,
}

impl CheckoutArgs {
    fn payment_details(&self) -> PaymentDetails {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        match self.method {
            MethodArg::Card => PaymentDetails::Card(CardDetails {
                number: text(&self.card_number),
                holder_name: text(&self.card_name),
                expiry_month: text(&self.expiry_month),
                expiry_year: text(&self.expiry_year),
                cvv: SecretString::from(text(&self.cvv)),
            }),
            MethodArg::Upi => PaymentDetails::Upi {
                upi_id: text(&self.upi_id),
            },
            MethodArg::Netbanking => PaymentDetails::NetBanking {
                bank: text(&self.bank),
            },
            MethodArg::Wallet => PaymentDetails::Wallet {
                wallet: text(&self.wallet),
            },
            MethodArg::Payu => PaymentDetails::PayU {
                transaction_id: text(&self.transaction_id),
            },
            MethodArg::Cod => PaymentDetails::Cod,
        }
    }

    fn address(&self, mut address: ShippingAddress) -> ShippingAddress {
        let overrides = [
            (&mut address.flat_no, &self.flat_no),
            (&mut address.locality, &self.locality),
            (&mut address.city, &self.city),
            (&mut address.pincode, &self.pincode),
        ];
        for (field, value) in overrides {
            if let Some(value) = value.as_deref().filter(|v| !v.trim().is_empty()) {
                *field = value.trim().to_string();
            }
        }
        address.phone = self.phone.clone();
        address
    }
}

/// Check a coupon against the current cart.
pub async fn coupon(ctx: &Context, code: &str) -> Result<()> {
    let cart = ctx.session.cart().load();
    if cart.is_empty() {
        return Err(AppError::Invalid("Your cart is empty".to_string()));
    }

    let applied = apply_coupon(&ctx.client, code, cart.total()).await?;
    print_summary(&OrderSummary::for_cart(&cart, Some(&applied)), Some(&applied));
    Ok(())
}

/// Place an order for the current cart.
#[allow(clippy::print_stdout)]
pub async fn checkout(ctx: &Context, args: CheckoutArgs) -> Result<()> {
    let user = ctx.session.require_user()?;
    let cart = ctx.session.cart().load();

    let coupon = match &args.coupon {
        Some(code) if !cart.is_empty() => {
            Some(apply_coupon(&ctx.client, code, cart.total()).await?)
        }
        _ => None,
    };

    let address = args.address(ShippingAddress::from_profile(user));
    let draft = OrderDraft::from_cart(&ctx.session, address, coupon.as_ref())?;
    let payment = args.payment_details();

    print_summary(&draft.summary, coupon.as_ref());
    let method = payment.method();
    if method == PaymentMethod::Cod {
        println!("Cash on delivery charge: {}", payment.surcharge());
    }
    println!("Paying with {}", method.display_name());

    let placed = place_order(&ctx.session, &ctx.client, &draft, &payment).await?;
    println!("\n{}", placed.message());
    if let PlacedOrder::Submitted {
        order_number: Some(number),
        ..
    } = &placed
    {
        println!("Order number: {number}");
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_summary(summary: &OrderSummary, coupon: Option<&AppliedCoupon>) {
    println!("Subtotal: {:>12}", summary.subtotal.to_string());
    println!("Shipping: {:>12}", "FREE");
    if let Some(coupon) = coupon {
        println!(
            "Discount: {:>12}  ({})",
            format!("-{}", summary.discount),
            coupon.code
        );
    }
    println!("Total:    {:>12}", summary.total.to_string());
}
