//! Request and response bodies for the backend API.
//!
//! Field names follow the backend's camelCase JSON.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zenbuy_core::{CouponId, DiscountType, Price};

use crate::session::UserProfile;

// =============================================================================
// Errors
// =============================================================================

/// Error body sent with non-success responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    pub(crate) fn into_message(self) -> Option<String> {
        self.error
            .or(self.message)
            .filter(|m| !m.trim().is_empty())
    }
}

// =============================================================================
// Auth
// =============================================================================

/// Response from the signup, login, and profile endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    /// The authenticated user's profile.
    pub user: UserProfile,
    /// Optional confirmation text.
    #[serde(default)]
    pub message: Option<String>,
}

/// Response from the profile update endpoint.
///
/// The user is kept as raw fields so an omitted field can be told apart from
/// one the backend explicitly cleared.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileResponse {
    /// The fields of the saved profile.
    pub user: serde_json::Map<String, serde_json::Value>,
}

/// Email and password credentials.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: SecretString,
}

impl Credentials {
    /// Create credentials.
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: SecretString::from(password.into()),
        }
    }

    pub(crate) fn body(&self) -> serde_json::Value {
        serde_json::json!({
            "email": self.email,
            "password": self.password.expose_secret(),
        })
    }
}

/// Errors in profile form input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    /// Age outside `1..=150`.
    #[error("Please enter a valid age (1-150)")]
    InvalidAge,
}

/// Profile fields sent on signup and profile edits.
///
/// Blank text fields are sent as `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub name: String,
    pub email: String,
    pub profile_pic: Option<String>,
    pub flat_no: Option<String>,
    pub locality: Option<String>,
    pub city: Option<String>,
    pub pincode: Option<String>,
    pub age: Option<u32>,
}

impl ProfileUpdate {
    /// Pre-fill from the current profile.
    #[must_use]
    pub fn from_profile(profile: &UserProfile) -> Self {
        Self {
            name: profile.name.clone(),
            email: profile.email.clone(),
            profile_pic: profile.profile_pic.clone(),
            flat_no: profile.flat_no.clone(),
            locality: profile.locality.clone(),
            city: profile.city.clone(),
            pincode: profile.pincode.clone(),
            age: profile.age,
        }
    }

    /// Check the fields and turn blank optional text into `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::InvalidAge`] if an age is given outside `1..=150`.
    pub fn validated(mut self) -> Result<Self, ProfileError> {
        if let Some(age) = self.age
            && !(1..=150).contains(&age)
        {
            return Err(ProfileError::InvalidAge);
        }

        for field in [
            &mut self.profile_pic,
            &mut self.flat_no,
            &mut self.locality,
            &mut self.city,
            &mut self.pincode,
        ] {
            if field.as_deref().is_some_and(|v| v.trim().is_empty()) {
                *field = None;
            }
        }
        Ok(self)
    }
}

/// A new account registration.
#[derive(Debug, Clone)]
pub struct SignupRequest {
    /// Profile fields.
    pub profile: ProfileUpdate,
    /// Chosen password.
    pub password: SecretString,
}

impl SignupRequest {
    pub(crate) fn body(&self) -> Result<serde_json::Value, serde_json::Error> {
        let mut body = serde_json::to_value(&self.profile)?;
        if let Some(map) = body.as_object_mut() {
            map.insert(
                "password".to_string(),
                serde_json::Value::String(self.password.expose_secret().to_owned()),
            );
        }
        Ok(body)
    }
}

// =============================================================================
// Coupons
// =============================================================================

/// Result of checking a coupon code against an order amount.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponValidation {
    /// Whether the coupon applies.
    pub valid: bool,
    /// How the discount is computed.
    #[serde(default)]
    pub discount_type: Option<DiscountType>,
    /// Percentage or flat amount, depending on `discount_type`.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub discount_value: Option<Decimal>,
    /// Optional explanation.
    #[serde(default)]
    pub message: Option<String>,
}

/// A coupon as managed in the admin console.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub id: CouponId,
    pub code: String,
    #[serde(default)]
    pub discount_type: DiscountType,
    #[serde(with = "rust_decimal::serde::float")]
    pub discount_value: Decimal,
    #[serde(default)]
    pub valid_from: Option<NaiveDateTime>,
    #[serde(default)]
    pub valid_until: Option<NaiveDateTime>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub max_uses: Option<u32>,
    #[serde(default)]
    pub min_purchase_amount: Option<Price>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Coupon fields sent on create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponInput {
    pub code: String,
    pub discount_type: DiscountType,
    #[serde(with = "rust_decimal::serde::float")]
    pub discount_value: Decimal,
    pub valid_from: Option<NaiveDateTime>,
    pub valid_until: Option<NaiveDateTime>,
    pub is_active: bool,
    pub max_uses: Option<u32>,
    pub min_purchase_amount: Option<Price>,
    pub description: String,
}

// =============================================================================
// Products (admin)
// =============================================================================

/// Product fields sent on create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub image_url: String,
    pub category: String,
    pub stock_quantity: Option<i64>,
}

// =============================================================================
// Orders & admin stats
// =============================================================================

/// Response from the payment endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    /// Confirmation text.
    #[serde(default)]
    pub message: Option<String>,
    /// Number of the order that was placed.
    #[serde(default)]
    pub order_number: Option<String>,
}

/// Dashboard counters for the admin console.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    #[serde(default)]
    pub total_users: u64,
    #[serde(default)]
    pub total_products: u64,
    #[serde(default)]
    pub total_orders: u64,
    #[serde(default)]
    pub revenue: Price,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_prefers_error_field() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"error": "Coupon expired", "message": "x"}"#).unwrap();
        assert_eq!(body.into_message().as_deref(), Some("Coupon expired"));

        let body: ErrorBody = serde_json::from_str(r#"{"error": "  "}"#).unwrap();
        assert_eq!(body.into_message(), None);
    }

    #[test]
    fn test_coupon_validation_shape() {
        let v: CouponValidation = serde_json::from_str(
            r#"{"valid": true, "discountType": "PERCENTAGE", "discountValue": 10}"#,
        )
        .unwrap();
        assert!(v.valid);
        assert_eq!(v.discount_type, Some(DiscountType::Percentage));
        assert_eq!(v.discount_value, Some(Decimal::from(10)));

        let v: CouponValidation = serde_json::from_str(r#"{"valid": false}"#).unwrap();
        assert_eq!(v.discount_value, None);
    }

    #[test]
    fn test_profile_update_validation() {
        let update = ProfileUpdate {
            name: "Asha".into(),
            email: "asha@example.com".into(),
            city: Some("  ".into()),
            age: Some(30),
            ..ProfileUpdate::default()
        };
        let cleaned = update.clone().validated().unwrap();
        assert_eq!(cleaned.city, None);

        let bad = ProfileUpdate {
            age: Some(151),
            ..update
        };
        assert_eq!(bad.validated(), Err(ProfileError::InvalidAge));
    }

    #[test]
    fn test_signup_body_includes_password() {
        let request = SignupRequest {
            profile: ProfileUpdate {
                name: "Asha".into(),
                email: "asha@example.com".into(),
                ..ProfileUpdate::default()
            },
            password: SecretString::from("hunter22"),
        };
        let body = request.body().unwrap();
        assert_eq!(body["password"], "hunter22");
        assert_eq!(body["flatNo"], serde_json::Value::Null);
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials::new("a@b.c", "hunter22");
        assert!(!format!("{creds:?}").contains("hunter22"));
        assert_eq!(creds.body()["password"], "hunter22");
    }

    #[test]
    fn test_coupon_dates_are_local() {
        let coupon: Coupon = serde_json::from_str(
            r#"{"id": 3, "code": "SAVE10", "discountType": "FLAT", "discountValue": 100,
                "validFrom": "2026-01-01T00:00:00", "validUntil": "2026-01-31T23:59:59",
                "isActive": true}"#,
        )
        .unwrap();
        assert_eq!(coupon.discount_type, DiscountType::Flat);
        assert!(coupon.valid_from.is_some());
        assert_eq!(coupon.max_uses, None);
    }
}
