//! Integration tests for the ZENBUY storefront.
//!
//! Each test starts an in-process fake backend on a random local port and
//! drives the storefront flows against it through the real HTTP client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p zenbuy-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `catalog` - Product listing fetch and filtering
//! - `checkout` - Coupons and order placement
//! - `orders` - Order history merging
//! - `account` - Sign-in and profile flows
//! - `admin` - Admin console actions

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use serde_json::{Value, json};
use url::Url;
use zenbuy_storefront::backend::BackendClient;
use zenbuy_storefront::config::BackendConfig;
use zenbuy_storefront::session::{Session, UserProfile};
use zenbuy_storefront::storage::MemoryStore;

/// Session type used by the tests.
pub type TestSession = Session<Arc<MemoryStore>>;

/// JSON bodies received by the fake backend, in arrival order.
#[derive(Debug, Clone, Default)]
pub struct Captured(Arc<Mutex<Vec<Value>>>);

impl Captured {
    /// Record a request body.
    pub fn push(&self, body: Value) {
        self.0.lock().expect("capture lock poisoned").push(body);
    }

    /// Everything recorded so far.
    #[must_use]
    pub fn bodies(&self) -> Vec<Value> {
        self.0.lock().expect("capture lock poisoned").clone()
    }
}

/// Serve `router` on a random port and return a client whose base URL is
/// `http://127.0.0.1:<port>/api`.
pub async fn spawn_backend(router: Router) -> BackendClient {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind fake backend");
    let addr = listener.local_addr().expect("Fake backend has no address");
    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("Fake backend stopped");
    });

    client_for(&format!("http://{addr}/api"))
}

/// A client pointed at `base_url` with a short timeout.
#[must_use]
pub fn client_for(base_url: &str) -> BackendClient {
    let config = BackendConfig {
        base_url: Url::parse(base_url).expect("Invalid base URL"),
        timeout: Duration::from_secs(5),
    };
    BackendClient::new(&config).expect("Failed to build client")
}

/// The product listing served by the fake backend.
#[must_use]
pub fn products_json() -> Value {
    json!([
        {"id": 1, "name": "Desk Lamp", "description": "Warm reading light",
         "price": 320, "imageUrl": "/img/lamp.png", "category": "Home", "stockQuantity": 4},
        {"id": 2, "name": "Trail Shoes", "price": 780.5, "category": "Sports", "stockQuantity": 0},
        {"id": 3, "name": "Coffee Mug", "price": 99, "category": "Kitchen"},
        {"id": 4, "name": "Yoga Mat", "description": "Non-slip, for home workouts",
         "price": 450, "category": "Sports", "stockQuantity": 12}
    ])
}

/// A user profile as the auth endpoints return it.
#[must_use]
pub fn user_json(id: i64, role: &str) -> Value {
    json!({
        "id": id,
        "name": "Asha Kulkarni",
        "email": "asha@example.com",
        "role": role,
        "flatNo": "12B",
        "locality": "MG Road",
        "city": "Pune",
        "pincode": "411001",
        "phone": "9876543210"
    })
}

/// A fresh session over an empty in-memory store.
#[must_use]
pub fn guest_session() -> (Arc<MemoryStore>, TestSession) {
    let store = Arc::new(MemoryStore::new());
    let session = Session::load(Arc::clone(&store));
    (store, session)
}

/// A session with user 7 already signed in.
#[must_use]
pub fn signed_in_session() -> (Arc<MemoryStore>, TestSession) {
    let (store, mut session) = guest_session();
    let profile: UserProfile =
        serde_json::from_value(user_json(7, "USER")).expect("Invalid profile fixture");
    session.sign_in(profile).expect("Failed to sign in");
    (store, session)
}
