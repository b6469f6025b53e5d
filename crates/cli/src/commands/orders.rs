//! Order history.

use zenbuy_core::Price;
use zenbuy_storefront::error::Result;
use zenbuy_storefront::orders::{Order, order_history};

use super::Context;

#[allow(clippy::print_stdout)]
pub async fn list(ctx: &Context) -> Result<()> {
    let orders = order_history(&ctx.session, &ctx.client).await?;
    if orders.is_empty() {
        println!("You haven't placed any orders yet.");
        return Ok(());
    }

    for order in &orders {
        print_order(order);
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_order(order: &Order) {
    println!("Order #{}  [{}]", order.label(), order.status_label());
    println!("  Placed:   {}", order.formatted_date());
    println!(
        "  Payment:  {} ({})",
        order.payment_method_display(),
        order.payment_badge()
    );
    if let Some(txn) = &order.transaction_id {
        println!("  Txn ID:   {txn}");
    }
    if let Some(address) = order.shipping_line() {
        println!("  Ship to:  {address}");
    }
    for item in &order.items {
        println!(
            "    {} x {} @ {} = {}",
            item.quantity,
            item.display_name(),
            item.price,
            item.line_total()
        );
    }
    if order.discount != Price::ZERO {
        println!("  Discount: -{}", order.discount);
    }
    println!("  Total:    {}", order.total);
    if order.is_pending_payu() {
        println!("  Awaiting payment verification.");
    }
    println!();
}
