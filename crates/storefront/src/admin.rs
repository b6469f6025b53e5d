//! Admin console: form parsing and the calls behind it.
//!
//! Forms hold raw text as typed. They are parsed into the backend's input
//! types only when saved.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{info, instrument};
use zenbuy_core::{CouponId, DiscountType, Price, ProductId, UserId};

use crate::backend::{AdminStats, BackendClient, BackendError, Coupon, CouponInput, ProductInput};
use crate::catalog::Product;
use crate::session::{Session, SessionError, UserProfile};
use crate::storage::KeyValueStore;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Errors in admin form input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdminFormError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("Invalid {field}: {value}")]
    Invalid { field: &'static str, value: String },
    #[error("Percentage discount cannot exceed 100")]
    PercentageTooHigh,
}

impl AdminFormError {
    fn invalid(field: &'static str, value: &str) -> Self {
        Self::Invalid {
            field,
            value: value.to_string(),
        }
    }
}

/// Errors from admin console actions.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Form(#[from] AdminFormError),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

// =============================================================================
// Forms
// =============================================================================

/// Product editor fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductForm {
    pub name: String,
    pub description: String,
    pub price: String,
    pub image_url: String,
    pub category: String,
    /// Blank means the stock level is not tracked.
    pub stock_quantity: String,
}

impl ProductForm {
    /// Pre-fill for editing an existing product.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone().unwrap_or_default(),
            price: product.price.amount().to_string(),
            image_url: product.image_url.clone().unwrap_or_default(),
            category: product.category.clone().unwrap_or_default(),
            stock_quantity: product
                .stock_quantity
                .map(|q| q.to_string())
                .unwrap_or_default(),
        }
    }

    /// Parse into the backend input.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank or the price or stock is not a number.
    pub fn parse(&self) -> Result<ProductInput, AdminFormError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AdminFormError::Required("Name"));
        }
        let price =
            Price::parse(&self.price).map_err(|_| AdminFormError::invalid("price", &self.price))?;

        let stock = self.stock_quantity.trim();
        let stock_quantity = if stock.is_empty() {
            None
        } else {
            Some(
                stock
                    .parse::<i64>()
                    .map_err(|_| AdminFormError::invalid("stock quantity", stock))?,
            )
        };

        Ok(ProductInput {
            name: name.to_string(),
            description: self.description.trim().to_string(),
            price,
            image_url: self.image_url.trim().to_string(),
            category: self.category.trim().to_string(),
            stock_quantity,
        })
    }
}

/// Coupon editor fields. Dates are `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouponForm {
    pub code: String,
    pub discount_type: DiscountType,
    pub discount_value: String,
    pub valid_from: String,
    pub valid_until: String,
    pub is_active: bool,
    pub max_uses: String,
    pub min_purchase_amount: String,
    pub description: String,
}

impl Default for CouponForm {
    fn default() -> Self {
        Self {
            code: String::new(),
            discount_type: DiscountType::Percentage,
            discount_value: String::new(),
            valid_from: String::new(),
            valid_until: String::new(),
            is_active: true,
            max_uses: String::new(),
            min_purchase_amount: String::new(),
            description: String::new(),
        }
    }
}

impl CouponForm {
    /// Pre-fill for editing an existing coupon.
    #[must_use]
    pub fn from_coupon(coupon: &Coupon) -> Self {
        let date = |at: Option<NaiveDateTime>| {
            at.map(|at| at.date().format(DATE_FORMAT).to_string())
                .unwrap_or_default()
        };
        Self {
            code: coupon.code.clone(),
            discount_type: coupon.discount_type,
            discount_value: coupon.discount_value.to_string(),
            valid_from: date(coupon.valid_from),
            valid_until: date(coupon.valid_until),
            is_active: coupon.is_active,
            max_uses: coupon.max_uses.map(|m| m.to_string()).unwrap_or_default(),
            min_purchase_amount: coupon
                .min_purchase_amount
                .map(|p| p.amount().to_string())
                .unwrap_or_default(),
            description: coupon.description.clone().unwrap_or_default(),
        }
    }

    /// Parse into the backend input.
    ///
    /// The code is upper-cased. A coupon is valid from the start of its first
    /// day to the last second of its final day.
    ///
    /// # Errors
    ///
    /// Returns an error if a required field is blank, a number or date does
    /// not parse, or a percentage exceeds 100.
    pub fn parse(&self) -> Result<CouponInput, AdminFormError> {
        let code = self.code.trim().to_uppercase();
        if code.is_empty() {
            return Err(AdminFormError::Required("Code"));
        }

        let raw_value = self.discount_value.trim();
        let discount_value = raw_value
            .parse::<Decimal>()
            .ok()
            .filter(|v| !v.is_sign_negative())
            .ok_or_else(|| AdminFormError::invalid("discount value", raw_value))?;
        if self.discount_type == DiscountType::Percentage && discount_value > Decimal::ONE_HUNDRED
        {
            return Err(AdminFormError::PercentageTooHigh);
        }

        let start_of_day = NaiveTime::MIN;
        let end_of_day = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
        let valid_from =
            parse_date(&self.valid_from, "valid from")?.map(|d| d.and_time(start_of_day));
        let valid_until =
            parse_date(&self.valid_until, "valid until")?.map(|d| d.and_time(end_of_day));

        let max_uses = match self.max_uses.trim() {
            "" => None,
            raw => Some(
                raw.parse::<u32>()
                    .map_err(|_| AdminFormError::invalid("max uses", raw))?,
            ),
        };
        let min_purchase_amount = match self.min_purchase_amount.trim() {
            "" => None,
            raw => Some(
                Price::parse(raw).map_err(|_| AdminFormError::invalid("minimum purchase", raw))?,
            ),
        };

        Ok(CouponInput {
            code,
            discount_type: self.discount_type,
            discount_value,
            valid_from,
            valid_until,
            is_active: self.is_active,
            max_uses,
            min_purchase_amount,
            description: self.description.trim().to_string(),
        })
    }
}

fn parse_date(raw: &str, field: &'static str) -> Result<Option<NaiveDate>, AdminFormError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map(Some)
        .map_err(|_| AdminFormError::invalid(field, raw))
}

// =============================================================================
// AdminConsole
// =============================================================================

/// Backend calls available to a signed-in administrator.
#[derive(Debug, Clone)]
pub struct AdminConsole<'a> {
    client: &'a BackendClient,
    admin: &'a UserProfile,
}

impl<'a> AdminConsole<'a> {
    /// Open the console for the session's user.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotSignedIn`] or [`SessionError::NotAdmin`]
    /// unless an administrator is signed in.
    pub fn open<S: KeyValueStore>(
        session: &'a Session<S>,
        client: &'a BackendClient,
    ) -> Result<Self, SessionError> {
        let admin = session.require_admin()?;
        Ok(Self { client, admin })
    }

    /// The signed-in administrator.
    #[must_use]
    pub const fn admin(&self) -> &UserProfile {
        self.admin
    }

    /// Dashboard counters.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn stats(&self) -> Result<AdminStats, AdminError> {
        Ok(self.client.admin_stats().await?)
    }

    /// All registered users.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn users(&self) -> Result<Vec<UserProfile>, AdminError> {
        Ok(self.client.list_users().await?)
    }

    /// Delete a user account.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    #[instrument(skip(self), fields(admin_id = %self.admin.id))]
    pub async fn delete_user(&self, id: &UserId) -> Result<(), AdminError> {
        self.client.delete_user(id).await?;
        info!(user_id = %id, "User deleted");
        Ok(())
    }

    /// Create a product, or update it when `id` is given.
    ///
    /// # Errors
    ///
    /// Returns an error if the form is invalid or the backend call fails.
    #[instrument(skip(self, form), fields(admin_id = %self.admin.id))]
    pub async fn save_product(
        &self,
        id: Option<&ProductId>,
        form: &ProductForm,
    ) -> Result<Product, AdminError> {
        let input = form.parse()?;
        let product = match id {
            Some(id) => self.client.update_product(id, &input).await?,
            None => self.client.create_product(&input).await?,
        };
        info!(product_id = %product.id, "Product saved");
        Ok(product)
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    #[instrument(skip(self), fields(admin_id = %self.admin.id))]
    pub async fn delete_product(&self, id: &ProductId) -> Result<(), AdminError> {
        Ok(self.client.delete_product(id).await?)
    }

    /// All coupons.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn coupons(&self) -> Result<Vec<Coupon>, AdminError> {
        Ok(self.client.list_coupons().await?)
    }

    /// Create a coupon, or update it when `id` is given.
    ///
    /// # Errors
    ///
    /// Returns an error if the form is invalid or the backend call fails.
    #[instrument(skip(self, form), fields(admin_id = %self.admin.id))]
    pub async fn save_coupon(
        &self,
        id: Option<&CouponId>,
        form: &CouponForm,
    ) -> Result<Coupon, AdminError> {
        let input = form.parse()?;
        let coupon = match id {
            Some(id) => self.client.update_coupon(id, &input).await?,
            None => self.client.create_coupon(&input).await?,
        };
        info!(code = %coupon.code, "Coupon saved");
        Ok(coupon)
    }

    /// Delete a coupon.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    #[instrument(skip(self), fields(admin_id = %self.admin.id))]
    pub async fn delete_coupon(&self, id: &CouponId) -> Result<(), AdminError> {
        Ok(self.client.delete_coupon(id).await?)
    }
}
