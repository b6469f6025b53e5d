//! Checkout: coupon application, order totals, and the order draft handed to
//! payment.
//!
//! Shipping is free. The only adjustments to the cart subtotal are a coupon
//! discount here and the cash-on-delivery surcharge added in [`payment`].

mod payment;

pub use payment::{
    COD_CHARGE, CardDetails, OrderItemRequest, OrderRequest, PaymentDetails, PaymentError,
    PaymentMethod, format_card_number,
};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument, warn};
use zenbuy_core::{DiscountType, Price, UserId};

use crate::backend::{BackendClient, BackendError};
use crate::cart::{Cart, CartLineItem};
use crate::session::{Session, SessionError, UserProfile};
use crate::storage::{KeyValueStore, StorageError};

/// Shown when a coupon is rejected without a reason from the backend.
pub const INVALID_COUPON_MESSAGE: &str = "Invalid coupon code";

/// Shown when a payment fails without a reason from the backend.
pub const PAYMENT_FAILED_MESSAGE: &str = "Payment failed. Please try again.";

/// Errors from checkout and order placement.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Please enter a coupon code")]
    EmptyCouponCode,

    /// The coupon does not apply; carries the message to show.
    #[error("{0}")]
    CouponRejected(String),

    #[error("Your cart is empty")]
    EmptyCart,

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Payment(#[from] PaymentError),

    /// The backend refused or failed the payment; carries the message to show.
    #[error("{0}")]
    PaymentFailed(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

// =============================================================================
// Coupons
// =============================================================================

/// A coupon code as entered by the shopper, trimmed and upper-cased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CouponCode(String);

impl CouponCode {
    /// Normalize shopper input.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptyCouponCode`] if nothing is left after trimming.
    pub fn parse(input: &str) -> Result<Self, CheckoutError> {
        let code = input.trim().to_uppercase();
        if code.is_empty() {
            return Err(CheckoutError::EmptyCouponCode);
        }
        Ok(Self(code))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CouponCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Discount a coupon grants on a subtotal.
///
/// Negative values grant nothing.
#[must_use]
pub fn compute_discount(subtotal: Price, discount_type: DiscountType, value: Decimal) -> Price {
    let value = value.max(Decimal::ZERO);
    let amount = match discount_type {
        DiscountType::Percentage => {
            subtotal.amount().saturating_mul(value) / Decimal::ONE_HUNDRED
        }
        DiscountType::Flat => value,
    };
    Price::new(amount)
}

/// A coupon the backend accepted for the current subtotal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedCoupon {
    pub code: CouponCode,
    pub discount_type: Option<DiscountType>,
    pub discount_value: Decimal,
    /// Discount computed against the subtotal the coupon was checked with.
    pub discount: Price,
}

/// Validate a coupon with the backend and compute its discount.
///
/// A coupon the backend reports as valid but without a discount type grants
/// no discount.
///
/// # Errors
///
/// Returns [`CheckoutError::EmptyCouponCode`] for blank input, or
/// [`CheckoutError::CouponRejected`] with the message to show if the backend
/// rejects the code or cannot be reached.
#[instrument(skip(client), fields(subtotal = %subtotal))]
pub async fn apply_coupon(
    client: &BackendClient,
    input: &str,
    subtotal: Price,
) -> Result<AppliedCoupon, CheckoutError> {
    let code = CouponCode::parse(input)?;

    let validation = match client.validate_coupon(code.as_str(), subtotal).await {
        Ok(validation) => validation,
        Err(e) => {
            warn!(code = %code, error = %e, "Coupon validation failed");
            return Err(CheckoutError::CouponRejected(rejection_message(&e)));
        }
    };

    if !validation.valid {
        let message = validation
            .message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| INVALID_COUPON_MESSAGE.to_string());
        return Err(CheckoutError::CouponRejected(message));
    }

    let discount_value = validation.discount_value.unwrap_or_default();
    let discount = validation
        .discount_type
        .map_or(Price::ZERO, |t| compute_discount(subtotal, t, discount_value));

    info!(code = %code, discount = %discount, "Coupon applied");
    Ok(AppliedCoupon {
        code,
        discount_type: validation.discount_type,
        discount_value,
        discount,
    })
}

fn rejection_message(error: &BackendError) -> String {
    error
        .api_message()
        .map_or_else(|| INVALID_COUPON_MESSAGE.to_string(), ToString::to_string)
}

// =============================================================================
// Totals & address
// =============================================================================

/// Money breakdown of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrderSummary {
    pub subtotal: Price,
    pub shipping: Price,
    pub discount: Price,
    pub total: Price,
}

impl OrderSummary {
    /// Totals for a subtotal and discount. Shipping is free and the total
    /// never goes below zero.
    #[must_use]
    pub fn new(subtotal: Price, discount: Price) -> Self {
        let shipping = Price::ZERO;
        Self {
            subtotal,
            shipping,
            discount,
            total: (subtotal + shipping).saturating_sub(discount),
        }
    }

    /// Totals for a cart with an optional applied coupon.
    #[must_use]
    pub fn for_cart(cart: &Cart, coupon: Option<&AppliedCoupon>) -> Self {
        Self::new(cart.total(), coupon.map_or(Price::ZERO, |c| c.discount))
    }
}

/// Delivery address entered at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    #[serde(default)]
    pub flat_no: String,
    #[serde(default)]
    pub locality: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub pincode: String,
    /// Contact number. Kept with locally recorded orders, never sent with
    /// payment requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl ShippingAddress {
    /// Pre-fill from the fields saved on the profile.
    #[must_use]
    pub fn from_profile(profile: &UserProfile) -> Self {
        Self {
            flat_no: profile.flat_no.clone().unwrap_or_default(),
            locality: profile.locality.clone().unwrap_or_default(),
            city: profile.city.clone().unwrap_or_default(),
            pincode: profile.pincode.clone().unwrap_or_default(),
            phone: None,
        }
    }

    /// The address without the contact number.
    #[must_use]
    pub fn without_phone(&self) -> Self {
        Self {
            phone: None,
            ..self.clone()
        }
    }

    /// One-line rendering, skipping empty parts.
    #[must_use]
    pub fn one_line(&self) -> String {
        let mut line = String::new();
        for part in [&self.flat_no, &self.locality] {
            if !part.is_empty() {
                line.push_str(part);
                line.push_str(", ");
            }
        }
        if !self.city.is_empty() {
            line.push_str(&self.city);
            if !self.pincode.is_empty() {
                line.push_str(" - ");
            }
        }
        line.push_str(&self.pincode);
        line.trim_end_matches(", ").to_string()
    }
}

// =============================================================================
// OrderDraft
// =============================================================================

/// Everything payment needs: who is ordering, what, where to, and for how much.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    pub user_id: UserId,
    pub items: Vec<CartLineItem>,
    pub shipping_address: ShippingAddress,
    pub summary: OrderSummary,
    pub coupon_code: Option<CouponCode>,
}

impl OrderDraft {
    /// Build a draft from the session's cart.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Session`] if no one is signed in and
    /// [`CheckoutError::EmptyCart`] if the cart has no items.
    pub fn from_cart<S: KeyValueStore>(
        session: &Session<S>,
        shipping_address: ShippingAddress,
        coupon: Option<&AppliedCoupon>,
    ) -> Result<Self, CheckoutError> {
        let user = session.require_user()?;
        let cart = session.cart().load();
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let summary = OrderSummary::for_cart(&cart, coupon);
        Ok(Self {
            user_id: user.id.clone(),
            items: cart.into_items(),
            shipping_address,
            summary,
            coupon_code: coupon.map(|c| c.code.clone()),
        })
    }
}
