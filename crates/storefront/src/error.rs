//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type for front-end surfaces. Operational
//! failures are captured to Sentry by [`AppError::report`]; everything the
//! shopper caused is only shown to them via [`AppError::user_message`].

use thiserror::Error;

use crate::admin::{AdminError, AdminFormError};
use crate::backend::{BackendError, ProfileError};
use crate::cart::CartError;
use crate::checkout::{CheckoutError, PaymentError};
use crate::config::ConfigError;
use crate::session::SessionError;
use crate::storage::StorageError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A durable slot could not be read or written.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Backend API call failed.
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// A cart update was refused or could not be saved.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Signed-in state does not allow the action.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Checkout or order placement failed.
    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    /// Admin console action failed.
    #[error(transparent)]
    Admin(#[from] AdminError),

    /// Input the shopper must correct.
    #[error("{0}")]
    Invalid(String),

    /// Data could not be loaded; carries the message to show. The cause has
    /// already been logged.
    #[error("{0}")]
    Unavailable(String),
}

impl From<PaymentError> for AppError {
    fn from(err: PaymentError) -> Self {
        Self::Checkout(err.into())
    }
}

impl From<AdminFormError> for AppError {
    fn from(err: AdminFormError) -> Self {
        Self::Admin(err.into())
    }
}

impl From<ProfileError> for AppError {
    fn from(err: ProfileError) -> Self {
        Self::Invalid(err.to_string())
    }
}

impl AppError {
    /// Whether this is an operational failure rather than a problem with
    /// what the shopper did.
    #[must_use]
    pub fn is_internal(&self) -> bool {
        match self {
            Self::Config(_) | Self::Storage(_) | Self::Cart(CartError::Storage(_)) => true,
            Self::Backend(e) | Self::Admin(AdminError::Backend(e)) => !e.is_client_error(),
            Self::Session(SessionError::Storage(_) | SessionError::InvalidProfile(_))
            | Self::Checkout(
                CheckoutError::Storage(_) | CheckoutError::Session(SessionError::Storage(_)),
            ) => true,
            _ => false,
        }
    }

    /// Text safe to show the shopper.
    ///
    /// Backend rejections carry the backend's own message. Internal details
    /// are not exposed.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Backend(e) | Self::Admin(AdminError::Backend(e)) => e
                .api_message()
                .filter(|_| e.is_client_error())
                .map_or_else(
                    || "Something went wrong. Please try again.".to_string(),
                    ToString::to_string,
                ),
            _ if self.is_internal() => "Something went wrong. Please try again.".to_string(),
            _ => self.to_string(),
        }
    }

    /// Capture internal errors to Sentry.
    pub fn report(&self) {
        if self.is_internal() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Storefront error"
            );
        } else {
            tracing::debug!(error = %self, "User-facing error");
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for a shopper action.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "12")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_rejection_shows_backend_message() {
        let err = AppError::from(BackendError::Api {
            status: 400,
            message: Some("Coupon expired".to_string()),
        });
        assert!(!err.is_internal());
        assert_eq!(err.user_message(), "Coupon expired");
    }

    #[test]
    fn test_server_failure_is_hidden() {
        let err = AppError::from(BackendError::Api {
            status: 500,
            message: Some("NullPointerException at OrderService".to_string()),
        });
        assert!(err.is_internal());
        assert_eq!(err.user_message(), "Something went wrong. Please try again.");

        let err = AppError::from(StorageError::Poisoned);
        assert!(err.is_internal());
    }

    #[test]
    fn test_input_errors_are_shown_as_is() {
        let err = AppError::from(PaymentError::InvalidUpiId);
        assert!(!err.is_internal());
        assert_eq!(
            err.user_message(),
            "Please enter a valid UPI ID (e.g., name@paytm)"
        );

        let err = AppError::from(CheckoutError::EmptyCouponCode);
        assert_eq!(err.user_message(), "Please enter a coupon code");

        let err = AppError::from(ProfileError::InvalidAge);
        assert_eq!(err.user_message(), "Please enter a valid age (1-150)");

        let err = AppError::from(SessionError::NotAdmin);
        assert_eq!(err.user_message(), "Administrator access required");

        let err = AppError::from(CartError::QuantityTooLarge(10_000_000_000));
        assert!(!err.is_internal());
        assert_eq!(err.user_message(), "Quantity 10000000000 is too large");
    }
}
