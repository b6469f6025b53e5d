use std::sync::Arc;

use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;
use zenbuy_core::{CouponId, Price, ProductId, UserId};

use super::BackendError;
use super::types::{
    AdminStats, AuthResponse, Coupon, CouponInput, CouponValidation, Credentials, ErrorBody,
    PaymentResponse, ProductInput, ProfileResponse, ProfileUpdate, SignupRequest,
};
use crate::catalog::Product;
use crate::checkout::OrderRequest;
use crate::config::BackendConfig;
use crate::orders::Order;
use crate::session::UserProfile;

// =============================================================================
// BackendClient
// =============================================================================

/// Client for the ZENBUY backend REST API.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl std::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl BackendClient {
    /// Create a client for the configured backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build or the base URL
    /// cannot carry a path.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        if config.base_url.cannot_be_a_base() {
            return Err(BackendError::InvalidBaseUrl(config.base_url.to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(BackendClientInner {
                client,
                base_url: config.base_url.clone(),
            }),
        })
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Append path segments to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| BackendError::InvalidBaseUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, BackendError> {
        let url = self.endpoint(segments)?;
        debug!(%method, %url, "Backend request");
        Ok(self.inner.client.request(method, url))
    }

    /// Send a request and return the body of a success response.
    async fn send_raw(&self, request: RequestBuilder) -> Result<String, BackendError> {
        let response = request.send().await?;
        let status = response.status();

        // Read the body as text first so error bodies can be inspected
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(ErrorBody::into_message);
            debug!(status = status.as_u16(), ?message, "Backend returned error");
            return Err(BackendError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(body)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, BackendError> {
        let body = self.send_raw(request).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn send_json<B, T>(&self, request: RequestBuilder, body: &B) -> Result<T, BackendError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(request.json(body)).await
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Fetch the full product listing.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the listing is malformed.
    #[instrument(skip(self))]
    pub async fn fetch_products(&self) -> Result<Vec<Product>, BackendError> {
        let request = self.request(Method::GET, &["products"])?;
        self.send(request).await
    }

    // =========================================================================
    // Auth & profile
    // =========================================================================

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self, signup), fields(email = %signup.profile.email))]
    pub async fn signup(&self, signup: &SignupRequest) -> Result<AuthResponse, BackendError> {
        let request = self.request(Method::POST, &["auth", "signup"])?;
        self.send_json(request, &signup.body()?).await
    }

    /// Sign in a shopper.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the credentials are rejected.
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, BackendError> {
        let request = self.request(Method::POST, &["auth", "login"])?;
        self.send_json(request, &credentials.body()).await
    }

    /// Sign in an administrator.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the credentials are rejected.
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn admin_login(
        &self,
        credentials: &Credentials,
    ) -> Result<AuthResponse, BackendError> {
        let request = self.request(Method::POST, &["auth", "admin", "login"])?;
        self.send_json(request, &credentials.body()).await
    }

    /// Save profile changes.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self, update), fields(user_id = %user_id))]
    pub async fn update_profile(
        &self,
        user_id: &UserId,
        update: &ProfileUpdate,
    ) -> Result<ProfileResponse, BackendError> {
        let id = user_id.to_string();
        let request = self.request(Method::PUT, &["auth", "profile", &id])?;
        self.send_json(request, update).await
    }

    // =========================================================================
    // Coupons & orders
    // =========================================================================

    /// Check a coupon code against an order amount.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects the code.
    #[instrument(skip(self), fields(code = %code, order_amount = %order_amount))]
    pub async fn validate_coupon(
        &self,
        code: &str,
        order_amount: Price,
    ) -> Result<CouponValidation, BackendError> {
        let request = self
            .request(Method::GET, &["coupons", "validate", code])?
            .query(&[("orderAmount", order_amount.amount().to_string())]);
        self.send(request).await
    }

    /// Submit an order for payment processing.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects the order.
    #[instrument(skip(self, order), fields(user_id = %user_id, method = %order.payment_method))]
    pub async fn process_payment(
        &self,
        user_id: &UserId,
        order: &OrderRequest,
    ) -> Result<PaymentResponse, BackendError> {
        let request = self.request(Method::POST, &["orders", "payment"])?;
        let body = serde_json::json!({ "userId": user_id, "order": order });
        self.send_json(request, &body).await
    }

    /// Order history for a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn user_orders(&self, user_id: &UserId) -> Result<Vec<Order>, BackendError> {
        let id = user_id.to_string();
        let request = self.request(Method::GET, &["orders", "user", &id])?;
        self.send(request).await
    }

    // =========================================================================
    // Admin
    // =========================================================================

    /// Dashboard counters.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn admin_stats(&self) -> Result<AdminStats, BackendError> {
        let request = self.request(Method::GET, &["admin", "stats"])?;
        self.send(request).await
    }

    /// All registered users.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<UserProfile>, BackendError> {
        let request = self.request(Method::GET, &["admin", "users"])?;
        self.send(request).await
    }

    /// Delete a user account.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn delete_user(&self, user_id: &UserId) -> Result<(), BackendError> {
        let id = user_id.to_string();
        let request = self.request(Method::DELETE, &["admin", "users", &id])?;
        self.send_raw(request).await.map(drop)
    }

    /// Add a product to the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self, product), fields(name = %product.name))]
    pub async fn create_product(&self, product: &ProductInput) -> Result<Product, BackendError> {
        let request = self.request(Method::POST, &["products"])?;
        self.send_json(request, product).await
    }

    /// Replace a product's fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self, product), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        id: &ProductId,
        product: &ProductInput,
    ) -> Result<Product, BackendError> {
        let id = id.to_string();
        let request = self.request(Method::PUT, &["products", &id])?;
        self.send_json(request, product).await
    }

    /// Remove a product from the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: &ProductId) -> Result<(), BackendError> {
        let id = id.to_string();
        let request = self.request(Method::DELETE, &["products", &id])?;
        self.send_raw(request).await.map(drop)
    }

    /// All coupons.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn list_coupons(&self) -> Result<Vec<Coupon>, BackendError> {
        let request = self.request(Method::GET, &["admin", "coupons"])?;
        self.send(request).await
    }

    /// Create a coupon.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self, coupon), fields(code = %coupon.code))]
    pub async fn create_coupon(&self, coupon: &CouponInput) -> Result<Coupon, BackendError> {
        let request = self.request(Method::POST, &["admin", "coupons"])?;
        self.send_json(request, coupon).await
    }

    /// Replace a coupon's fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    #[instrument(skip(self, coupon), fields(coupon_id = %id))]
    pub async fn update_coupon(
        &self,
        id: &CouponId,
        coupon: &CouponInput,
    ) -> Result<Coupon, BackendError> {
        let id = id.to_string();
        let request = self.request(Method::PUT, &["admin", "coupons", &id])?;
        self.send_json(request, coupon).await
    }

    /// Delete a coupon.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(coupon_id = %id))]
    pub async fn delete_coupon(&self, id: &CouponId) -> Result<(), BackendError> {
        let id = id.to_string();
        let request = self.request(Method::DELETE, &["admin", "coupons", &id])?;
        self.send_raw(request).await.map(drop)
    }
}
