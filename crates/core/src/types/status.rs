//! Status enums for various entities.
//!
//! Values mirror the upper-case strings the backend sends. Statuses the
//! backend may add later deserialize as `Unknown` instead of failing the
//! whole response.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    /// Lower-case label used for display and styling.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::Unknown => "unknown",
        }
    }
}

/// Payment status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Completed,
    Failed,
    Refunded,
    #[serde(other)]
    Unknown,
}

impl PaymentStatus {
    /// Badge text shown to customers.
    ///
    /// Pending payments are awaiting manual verification, so they read as
    /// `VERIFICATION`.
    #[must_use]
    pub const fn badge(&self) -> &'static str {
        match self {
            Self::Pending => "VERIFICATION",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
            Self::Refunded => "REFUNDED",
            Self::Unknown => "UNKNOWN",
        }
    }
}

/// How a coupon discount is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountType {
    /// Percentage of the order subtotal.
    #[default]
    Percentage,
    /// Fixed amount off.
    Flat,
}

impl fmt::Display for DiscountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Percentage => f.write_str("PERCENTAGE"),
            Self::Flat => f.write_str("FLAT"),
        }
    }
}

/// Account role carried on the user profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    #[default]
    User,
    Admin,
    #[serde(other)]
    Unknown,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_order_status() {
        let status: OrderStatus = serde_json::from_str("\"RETURNED\"").unwrap();
        assert_eq!(status, OrderStatus::Unknown);
    }

    #[test]
    fn test_payment_badge() {
        assert_eq!(PaymentStatus::Pending.badge(), "VERIFICATION");
        assert_eq!(PaymentStatus::Completed.badge(), "COMPLETED");
    }

    #[test]
    fn test_discount_type_wire_format() {
        let flat: DiscountType = serde_json::from_str("\"FLAT\"").unwrap();
        assert_eq!(flat, DiscountType::Flat);
        assert_eq!(
            serde_json::to_string(&DiscountType::Percentage).unwrap(),
            "\"PERCENTAGE\""
        );
    }

    #[test]
    fn test_role_default_is_user() {
        assert_eq!(UserRole::default(), UserRole::User);
        let admin: UserRole = serde_json::from_str("\"ADMIN\"").unwrap();
        assert_eq!(admin, UserRole::Admin);
        let other: UserRole = serde_json::from_str("\"CUSTOMER\"").unwrap();
        assert_eq!(other, UserRole::Unknown);
    }
}
