//! Order placement and order history.
//!
//! PayU payments are verified by hand, so a PayU order is only recorded in the
//! local `"orders"` slot with a pending payment status. Every other method is
//! submitted to the backend. History merges the two sources.

use std::cmp::Reverse;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use zenbuy_core::{OrderId, OrderStatus, PaymentStatus, Price, ProductId, UserId};

use crate::backend::BackendClient;
use crate::cart::CartLineItem;
use crate::checkout::{
    CheckoutError, OrderDraft, OrderRequest, PAYMENT_FAILED_MESSAGE, PaymentDetails,
    PaymentMethod, ShippingAddress,
};
use crate::session::{Session, SessionError};
use crate::storage::{KeyValueStore, keys, read_json, write_json};

/// Shown after a successful backend payment without its own message.
pub const ORDER_PLACED_MESSAGE: &str = "Payment successful! Order placed successfully!";

// =============================================================================
// Order
// =============================================================================

/// One line of a placed order.
///
/// Backend orders and locally recorded orders name their fields differently;
/// both shapes are accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ProductId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<ProductId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub price: Price,
    #[serde(default)]
    pub quantity: u32,
}

impl OrderItem {
    /// Name to show for the line.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.product_name
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price * self.quantity
    }
}

impl From<&CartLineItem> for OrderItem {
    fn from(item: &CartLineItem) -> Self {
        Self {
            id: Some(item.product_id.clone()),
            product_id: None,
            name: Some(item.name.clone()),
            product_name: None,
            image_url: item.image_url.clone(),
            price: item.price,
            quantity: item.quantity,
        }
    }
}

/// A placed order, from the backend or the local slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<OrderId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub subtotal: Price,
    #[serde(default)]
    pub shipping: Price,
    #[serde(default)]
    pub discount: Price,
    #[serde(default)]
    pub total: Price,
    /// Method code; kept as text so unknown codes still display.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<PaymentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    /// Timestamp as sent; parsed on demand.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_date: Option<String>,
    /// Address as recorded locally.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<ShippingAddress>,
    // Address as flattened by the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_flat_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_locality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_pincode: Option<String>,
}

impl Order {
    /// `Order #…` label: the order number, else the id.
    #[must_use]
    pub fn label(&self) -> String {
        self.order_number.clone().unwrap_or_else(|| {
            self.id
                .as_ref()
                .map_or_else(String::new, ToString::to_string)
        })
    }

    /// When the order was placed, if the date parses.
    ///
    /// Dates without an offset are taken as UTC.
    #[must_use]
    pub fn placed_at(&self) -> Option<DateTime<Utc>> {
        parse_order_date(self.order_date.as_deref()?)
    }

    /// Date for display: `N/A` when absent, the raw text when unparseable.
    #[must_use]
    pub fn formatted_date(&self) -> String {
        match (&self.order_date, self.placed_at()) {
            (None, _) => "N/A".to_string(),
            (Some(_), Some(at)) => at.format("%B %-d, %Y at %I:%M %p").to_string(),
            (Some(raw), None) => raw.clone(),
        }
    }

    /// Lower-case status label; an order without one reads as pending.
    #[must_use]
    pub fn status_label(&self) -> &'static str {
        self.status.unwrap_or_default().label()
    }

    /// Payment status badge; pending payments show as awaiting verification.
    #[must_use]
    pub fn payment_badge(&self) -> &'static str {
        self.payment_status.unwrap_or_default().badge()
    }

    #[must_use]
    pub fn payment_method_display(&self) -> String {
        PaymentMethod::describe(self.payment_method.as_deref())
    }

    /// Whether this is a PayU order waiting for manual verification.
    #[must_use]
    pub fn is_pending_payu(&self) -> bool {
        self.payment_method
            .as_deref()
            .is_some_and(|m| m.eq_ignore_ascii_case(PaymentMethod::PayU.code()))
            && self.payment_status == Some(PaymentStatus::Pending)
    }

    /// One-line delivery address, from whichever shape the order carries.
    #[must_use]
    pub fn shipping_line(&self) -> Option<String> {
        let address = self.shipping_address.clone().or_else(|| {
            (self.shipping_flat_no.is_some() || self.shipping_locality.is_some()).then(|| {
                ShippingAddress {
                    flat_no: self.shipping_flat_no.clone().unwrap_or_default(),
                    locality: self.shipping_locality.clone().unwrap_or_default(),
                    city: self.shipping_city.clone().unwrap_or_default(),
                    pincode: self.shipping_pincode.clone().unwrap_or_default(),
                    phone: None,
                }
            })
        })?;
        let line = address.one_line();
        (!line.is_empty()).then_some(line)
    }
}

fn parse_order_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Newest first. Orders without a readable date go last.
fn sort_newest_first(orders: &mut [Order]) {
    orders.sort_by_key(|order| Reverse(order.placed_at()));
}

// =============================================================================
// Placement
// =============================================================================

/// Outcome of placing an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacedOrder {
    /// Recorded locally; payment will be verified by hand.
    AwaitingVerification { order_number: String },
    /// Accepted by the backend.
    Submitted {
        order_number: Option<String>,
        message: String,
    },
}

impl PlacedOrder {
    /// Confirmation text for the shopper.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::AwaitingVerification { order_number } => format!(
                "Order {order_number} placed. Your payment is being verified."
            ),
            Self::Submitted { message, .. } => message.clone(),
        }
    }
}

/// Pay for a draft and empty the cart.
///
/// # Errors
///
/// - [`CheckoutError::Session`] if no one is signed in
/// - [`CheckoutError::Payment`] if the payment form is incomplete
/// - [`CheckoutError::PaymentFailed`] if the backend refuses the payment;
///   the cart is left intact
/// - [`CheckoutError::Storage`] if the local slots cannot be written
#[instrument(skip_all, fields(method = %payment.method(), total = %draft.summary.total))]
pub async fn place_order<S: KeyValueStore>(
    session: &Session<S>,
    client: &BackendClient,
    draft: &OrderDraft,
    payment: &PaymentDetails,
) -> Result<PlacedOrder, CheckoutError> {
    session.require_user()?;
    payment.validate()?;

    if let PaymentDetails::PayU { transaction_id } = payment {
        let order_number =
            record_payu_order(session.store(), draft, transaction_id.trim(), Utc::now())?;
        session.cart().clear()?;
        info!(order_number = %order_number, "PayU order recorded for verification");
        return Ok(PlacedOrder::AwaitingVerification { order_number });
    }

    let request = OrderRequest::new(draft, payment);
    let response = client
        .process_payment(&draft.user_id, &request)
        .await
        .map_err(|e| {
            warn!(error = %e, "Payment failed");
            CheckoutError::PaymentFailed(
                e.api_message()
                    .unwrap_or(PAYMENT_FAILED_MESSAGE)
                    .to_string(),
            )
        })?;

    session.cart().clear()?;
    info!(order_number = ?response.order_number, "Order placed");

    Ok(PlacedOrder::Submitted {
        order_number: response.order_number,
        message: response
            .message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| ORDER_PLACED_MESSAGE.to_string()),
    })
}

/// Append a pending PayU order to the local slot and return its number.
fn record_payu_order<S: KeyValueStore>(
    store: &S,
    draft: &OrderDraft,
    transaction_id: &str,
    now: DateTime<Utc>,
) -> Result<String, CheckoutError> {
    let millis = now.timestamp_millis();
    let order_number = format!("ORD-{millis}");

    let order = Order {
        id: Some(OrderId::from_number(millis)),
        order_number: Some(order_number.clone()),
        user_id: Some(draft.user_id.clone()),
        items: draft.items.iter().map(OrderItem::from).collect(),
        subtotal: draft.summary.subtotal,
        shipping: draft.summary.shipping,
        discount: draft.summary.discount,
        total: draft.summary.total,
        payment_method: Some(PaymentMethod::PayU.code().to_string()),
        payment_status: Some(PaymentStatus::Pending),
        transaction_id: Some(transaction_id.to_string()),
        status: Some(OrderStatus::Confirmed),
        order_date: Some(now.to_rfc3339_opts(SecondsFormat::Millis, true)),
        shipping_address: Some(draft.shipping_address.clone()),
        ..Order::default()
    };

    let mut orders = local_orders(store);
    orders.push(order);
    write_json(store, keys::ORDERS, &orders)?;
    Ok(order_number)
}

/// Orders recorded in the local slot, in insertion order.
pub fn local_orders<S: KeyValueStore>(store: &S) -> Vec<Order> {
    read_json(store, keys::ORDERS).unwrap_or_default()
}

// =============================================================================
// History
// =============================================================================

/// Order history for the signed-in user, newest first.
///
/// Backend orders come first in priority; local PayU orders still awaiting
/// verification are added unless the backend already knows their number. If
/// the backend cannot be reached, every local order is shown instead.
///
/// # Errors
///
/// Returns [`SessionError::NotSignedIn`] if no one is signed in.
#[instrument(skip_all)]
pub async fn order_history<S: KeyValueStore>(
    session: &Session<S>,
    client: &BackendClient,
) -> Result<Vec<Order>, SessionError> {
    let user = session.require_user()?;
    let local = local_orders(session.store());

    let mut orders = match client.user_orders(&user.id).await {
        Ok(backend) => merge_orders(backend, local),
        Err(e) => {
            warn!(error = %e, "Failed to load orders, showing local orders");
            local
        }
    };

    sort_newest_first(&mut orders);
    Ok(orders)
}

fn merge_orders(mut backend: Vec<Order>, local: Vec<Order>) -> Vec<Order> {
    let known: std::collections::HashSet<String> = backend
        .iter()
        .filter_map(|o| o.order_number.clone())
        .collect();

    backend.extend(local.into_iter().filter(|o| {
        o.is_pending_payu()
            && o.order_number
                .as_ref()
                .is_none_or(|number| !known.contains(number))
    }));
    backend
}
