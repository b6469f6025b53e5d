//! Admin console actions against a fake backend.

#![allow(clippy::unwrap_used)]

use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use zenbuy_core::{CouponId, DiscountType, Price, UserId, UserRole};
use zenbuy_integration_tests::{Captured, TestSession, guest_session, spawn_backend, user_json};
use zenbuy_storefront::admin::{AdminConsole, AdminError, AdminFormError, CouponForm, ProductForm};
use zenbuy_storefront::session::{SessionError, UserProfile};

fn admin_session() -> TestSession {
    let (_store, mut session) = guest_session();
    let profile: UserProfile = serde_json::from_value(user_json(1, "ADMIN")).unwrap();
    session.sign_in(profile).unwrap();
    session
}

fn admin_router(captured: &Captured) -> Router {
    let coupon_sink = captured.clone();
    let product_sink = captured.clone();
    let delete_sink = captured.clone();

    Router::new()
        .route(
            "/api/admin/stats",
            get(|| async {
                Json(json!({"totalUsers": 12, "totalProducts": 40, "totalOrders": 7, "revenue": 10450.5}))
            }),
        )
        .route(
            "/api/admin/coupons",
            get(|| async {
                Json(json!([{"id": 3, "code": "SAVE10", "discountType": "PERCENTAGE",
                             "discountValue": 10, "isActive": true,
                             "validFrom": "2026-01-01T00:00:00", "validUntil": "2026-12-31T23:59:59"}]))
            })
            .post(move |Json(body): Json<Value>| {
                let sink = coupon_sink.clone();
                async move {
                    let mut coupon = body.clone();
                    coupon["id"] = json!(9);
                    sink.push(body);
                    (StatusCode::CREATED, Json(coupon))
                }
            }),
        )
        .route(
            "/api/products",
            post(move |Json(body): Json<Value>| {
                let sink = product_sink.clone();
                async move {
                    let mut product = body.clone();
                    product["id"] = json!(41);
                    sink.push(body);
                    Json(product)
                }
            }),
        )
        .route(
            "/api/admin/users",
            get(|| async {
                Json(json!([
                    user_json(1, "ADMIN"),
                    {"id": 5, "name": "Old Account", "email": "old@example.com", "role": null},
                    {"id": 6, "name": "Vendor", "email": "vendor@example.com", "role": "SELLER"}
                ]))
            }),
        )
        .route(
            "/api/admin/users/{id}",
            delete(move |Path(id): Path<String>| {
                let sink = delete_sink.clone();
                async move {
                    sink.push(json!({"deleted": id}));
                    StatusCode::NO_CONTENT
                }
            }),
        )
}

#[tokio::test]
async fn test_console_requires_admin() {
    let captured = Captured::default();
    let client = spawn_backend(admin_router(&captured)).await;

    let (_store, guest) = guest_session();
    assert!(matches!(
        AdminConsole::open(&guest, &client),
        Err(SessionError::NotSignedIn)
    ));

    let session = admin_session();
    let console = AdminConsole::open(&session, &client).unwrap();
    assert_eq!(console.admin().id, UserId::from_number(1));
}

#[tokio::test]
async fn test_stats_and_coupons() {
    let captured = Captured::default();
    let client = spawn_backend(admin_router(&captured)).await;
    let session = admin_session();
    let console = AdminConsole::open(&session, &client).unwrap();

    let stats = console.stats().await.unwrap();
    assert_eq!(stats.total_users, 12);
    assert_eq!(stats.revenue, Price::parse("10450.50").unwrap());

    let coupons = console.coupons().await.unwrap();
    assert_eq!(coupons.len(), 1);
    assert_eq!(coupons[0].id, CouponId::from_number(3));
    assert_eq!(coupons[0].discount_type, DiscountType::Percentage);

    // Editing a listed coupon pre-fills day-granular dates.
    let form = CouponForm::from_coupon(&coupons[0]);
    assert_eq!(form.valid_from, "2026-01-01");
    assert_eq!(form.valid_until, "2026-12-31");
}

#[tokio::test]
async fn test_save_coupon_sends_normalized_input() {
    let captured = Captured::default();
    let client = spawn_backend(admin_router(&captured)).await;
    let session = admin_session();
    let console = AdminConsole::open(&session, &client).unwrap();

    let form = CouponForm {
        code: " monsoon25 ".to_string(),
        discount_value: "25".to_string(),
        valid_from: "2026-06-01".to_string(),
        valid_until: "2026-09-30".to_string(),
        max_uses: "100".to_string(),
        min_purchase_amount: "499".to_string(),
        ..CouponForm::default()
    };
    let saved = console.save_coupon(None, &form).await.unwrap();
    assert_eq!(saved.code, "MONSOON25");
    assert_eq!(saved.id, CouponId::from_number(9));

    let bodies = captured.bodies();
    let sent = &bodies[0];
    assert_eq!(sent["code"], "MONSOON25");
    assert_eq!(sent["discountType"], "PERCENTAGE");
    assert_eq!(sent["validFrom"], "2026-06-01T00:00:00");
    assert_eq!(sent["validUntil"], "2026-09-30T23:59:59");
    assert_eq!(sent["maxUses"], 100);
    assert_eq!(sent["isActive"], true);
}

#[tokio::test]
async fn test_invalid_forms_send_nothing() {
    let captured = Captured::default();
    let client = spawn_backend(admin_router(&captured)).await;
    let session = admin_session();
    let console = AdminConsole::open(&session, &client).unwrap();

    let too_much = CouponForm {
        code: "HALFPLUS".to_string(),
        discount_value: "120".to_string(),
        ..CouponForm::default()
    };
    let result = console.save_coupon(None, &too_much).await;
    assert!(matches!(
        result,
        Err(AdminError::Form(AdminFormError::PercentageTooHigh))
    ));

    let unnamed = ProductForm {
        price: "100".to_string(),
        ..ProductForm::default()
    };
    let result = console.save_product(None, &unnamed).await;
    assert!(matches!(
        result,
        Err(AdminError::Form(AdminFormError::Required("Name")))
    ));
    assert!(captured.bodies().is_empty());
}

#[tokio::test]
async fn test_create_product_and_delete_user() {
    let captured = Captured::default();
    let client = spawn_backend(admin_router(&captured)).await;
    let session = admin_session();
    let console = AdminConsole::open(&session, &client).unwrap();

    let form = ProductForm {
        name: "Bamboo Bottle".to_string(),
        price: "349.00".to_string(),
        category: "Kitchen".to_string(),
        ..ProductForm::default()
    };
    let product = console.save_product(None, &form).await.unwrap();
    assert_eq!(product.name, "Bamboo Bottle");
    assert_eq!(product.price, Price::from_major(349));
    // A blank stock field means stock is not tracked.
    assert_eq!(product.stock_quantity, None);

    console
        .delete_user(&UserId::from_number(12))
        .await
        .unwrap();

    let bodies = captured.bodies();
    assert_eq!(bodies.len(), 2);
    assert_eq!(bodies[1], json!({"deleted": "12"}));
}

#[tokio::test]
async fn test_users_with_missing_or_unknown_roles_are_listed() {
    let captured = Captured::default();
    let client = spawn_backend(admin_router(&captured)).await;
    let session = admin_session();
    let console = AdminConsole::open(&session, &client).unwrap();

    let users = console.users().await.unwrap();
    let roles: Vec<UserRole> = users.iter().map(|u| u.role).collect();
    assert_eq!(roles, [UserRole::Admin, UserRole::User, UserRole::Unknown]);
    assert!(!users[2].is_admin());
}
