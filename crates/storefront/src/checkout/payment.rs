//! Payment method entry and the order request sent to the backend.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zenbuy_core::{Price, ProductId};

use super::{OrderDraft, ShippingAddress};

/// Surcharge for cash on delivery.
pub const COD_CHARGE: Price = Price::new(Decimal::from_parts(50, 0, 0, false, 0));

/// Longest formatted card number: 16 digits in four groups.
const MAX_FORMATTED_CARD_LEN: usize = 19;

static UPI_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._-]+@[a-zA-Z0-9]+$").expect("Invalid regex"));

/// Payment entry errors. Each message is shown to the shopper as is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentError {
    #[error("Please enter a valid card number")]
    InvalidCardNumber,
    #[error("Please enter cardholder name")]
    MissingCardholderName,
    #[error("Please select expiry date")]
    MissingExpiry,
    #[error("Please enter CVV")]
    InvalidCvv,
    #[error("Please enter a valid UPI ID (e.g., name@paytm)")]
    InvalidUpiId,
    #[error("Please select a bank")]
    MissingBank,
    #[error("Please select a wallet")]
    MissingWallet,
    #[error("Please enter a valid transaction ID")]
    InvalidTransactionId,
    #[error("Unknown payment method: {0}")]
    UnknownMethod(String),
}

// =============================================================================
// PaymentMethod
// =============================================================================

/// How the shopper pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentMethod {
    Card,
    Upi,
    NetBanking,
    Wallet,
    PayU,
    Cod,
}

impl PaymentMethod {
    pub const ALL: [Self; 6] = [
        Self::Card,
        Self::Upi,
        Self::NetBanking,
        Self::Wallet,
        Self::PayU,
        Self::Cod,
    ];

    /// Wire code, e.g. `NETBANKING`.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Card => "CARD",
            Self::Upi => "UPI",
            Self::NetBanking => "NETBANKING",
            Self::Wallet => "WALLET",
            Self::PayU => "PAYU",
            Self::Cod => "COD",
        }
    }

    /// Human-readable name.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Card => "Credit/Debit Card",
            Self::Upi => "UPI",
            Self::NetBanking => "Net Banking",
            Self::Wallet => "Digital Wallet",
            Self::PayU => "PayU",
            Self::Cod => "Cash on Delivery",
        }
    }

    /// Human-readable name for a code as stored on an order.
    ///
    /// Unknown codes are returned unchanged; a missing code is `N/A`.
    #[must_use]
    pub fn describe(code: Option<&str>) -> String {
        match code {
            None => "N/A".to_string(),
            Some(code) => code.parse::<Self>().map_or_else(
                |_| code.to_string(),
                |method| method.display_name().to_string(),
            ),
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for PaymentMethod {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.code().eq_ignore_ascii_case(s))
            .ok_or_else(|| PaymentError::UnknownMethod(s.to_string()))
    }
}

// =============================================================================
// PaymentDetails
// =============================================================================

/// Card form fields.
#[derive(Debug, Clone)]
pub struct CardDetails {
    /// Card number, with or without spaces.
    pub number: String,
    pub holder_name: String,
    pub expiry_month: String,
    pub expiry_year: String,
    pub cvv: SecretString,
}

impl CardDetails {
    fn validate(&self) -> Result<(), PaymentError> {
        let digits = self.number.chars().filter(|c| !c.is_whitespace()).count();
        if digits < 16 {
            return Err(PaymentError::InvalidCardNumber);
        }
        if self.holder_name.chars().count() < 3 {
            return Err(PaymentError::MissingCardholderName);
        }
        if self.expiry_month.is_empty() || self.expiry_year.is_empty() {
            return Err(PaymentError::MissingExpiry);
        }
        if self.cvv.expose_secret().chars().count() < 3 {
            return Err(PaymentError::InvalidCvv);
        }
        Ok(())
    }
}

/// The entry form for the selected payment method.
#[derive(Debug, Clone)]
pub enum PaymentDetails {
    Card(CardDetails),
    Upi { upi_id: String },
    NetBanking { bank: String },
    Wallet { wallet: String },
    PayU { transaction_id: String },
    Cod,
}

impl PaymentDetails {
    #[must_use]
    pub const fn method(&self) -> PaymentMethod {
        match self {
            Self::Card(_) => PaymentMethod::Card,
            Self::Upi { .. } => PaymentMethod::Upi,
            Self::NetBanking { .. } => PaymentMethod::NetBanking,
            Self::Wallet { .. } => PaymentMethod::Wallet,
            Self::PayU { .. } => PaymentMethod::PayU,
            Self::Cod => PaymentMethod::Cod,
        }
    }

    /// Check the form for the selected method.
    ///
    /// # Errors
    ///
    /// Returns the first problem found, worded for the shopper.
    pub fn validate(&self) -> Result<(), PaymentError> {
        match self {
            Self::Card(card) => card.validate(),
            Self::Upi { upi_id } if !UPI_ID_RE.is_match(upi_id) => Err(PaymentError::InvalidUpiId),
            Self::NetBanking { bank } if bank.is_empty() => Err(PaymentError::MissingBank),
            Self::Wallet { wallet } if wallet.is_empty() => Err(PaymentError::MissingWallet),
            Self::PayU { transaction_id } if transaction_id.trim().chars().count() < 5 => {
                Err(PaymentError::InvalidTransactionId)
            }
            _ => Ok(()),
        }
    }

    /// Surcharge the method adds to the order total.
    #[must_use]
    pub const fn surcharge(&self) -> Price {
        match self {
            Self::Cod => COD_CHARGE,
            _ => Price::ZERO,
        }
    }
}

/// Format card number input in groups of four.
///
/// Returns `None` when the result would be longer than a 16-digit number, in
/// which case the previous value should be kept.
#[must_use]
pub fn format_card_number(input: &str) -> Option<String> {
    let digits: Vec<char> = input.chars().filter(|c| !c.is_whitespace()).collect();
    let formatted = digits
        .chunks(4)
        .map(|group| group.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ");

    (formatted.chars().count() <= MAX_FORMATTED_CARD_LEN).then_some(formatted)
}

// =============================================================================
// OrderRequest
// =============================================================================

/// One line of an order as the payment endpoint expects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
    pub quantity: u32,
    pub image_url: String,
}

/// Body of the payment request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub items: Vec<OrderItemRequest>,
    pub subtotal: Price,
    pub shipping: Price,
    pub discount: Price,
    /// Includes any payment method surcharge.
    pub total: Price,
    pub payment_method: PaymentMethod,
    pub shipping_address: ShippingAddress,
}

impl OrderRequest {
    /// Build the request for a draft paid with the given details.
    #[must_use]
    pub fn new(draft: &OrderDraft, payment: &PaymentDetails) -> Self {
        let items = draft
            .items
            .iter()
            .map(|item| OrderItemRequest {
                product_id: item.product_id.clone(),
                name: item.name.clone(),
                price: item.price,
                quantity: item.quantity,
                image_url: item.image_url.clone().unwrap_or_default(),
            })
            .collect();

        Self {
            items,
            subtotal: draft.summary.subtotal,
            shipping: draft.summary.shipping,
            discount: draft.summary.discount,
            total: draft.summary.total + payment.surcharge(),
            payment_method: payment.method(),
            shipping_address: draft.shipping_address.without_phone(),
        }
    }
}
