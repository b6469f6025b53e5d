//! Sign-in and profile flows against a fake backend.

#![allow(clippy::unwrap_used)]

use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::{post, put};
use axum::{Json, Router};
use serde_json::{Value, json};
use zenbuy_core::UserRole;
use zenbuy_integration_tests::{
    Captured, guest_session, signed_in_session, spawn_backend, user_json,
};
use zenbuy_storefront::account;
use zenbuy_storefront::admin::AdminConsole;
use zenbuy_storefront::backend::{BackendError, Credentials, ProfileUpdate, SignupRequest};
use zenbuy_storefront::error::AppError;
use zenbuy_storefront::session::{Session, SessionError};
use zenbuy_storefront::storage::{KeyValueStore, keys};

fn auth_router(captured: &Captured) -> Router {
    let login_sink = captured.clone();
    let admin_sink = captured.clone();
    let signup_sink = captured.clone();
    let profile_sink = captured.clone();

    Router::new()
        .route(
            "/api/auth/login",
            post(move |Json(body): Json<Value>| {
                let sink = login_sink.clone();
                async move {
                    let ok = body["password"] == "hunter22";
                    let mut user = user_json(7, "USER");
                    if body["email"] == "legacy@example.com" {
                        user["role"] = Value::Null;
                    }
                    sink.push(body);
                    if ok {
                        (StatusCode::OK, Json(json!({"user": user})))
                    } else {
                        (
                            StatusCode::UNAUTHORIZED,
                            Json(json!({"error": "Invalid email or password"})),
                        )
                    }
                }
            }),
        )
        .route(
            "/api/auth/admin/login",
            post(move |Json(body): Json<Value>| {
                let sink = admin_sink.clone();
                async move {
                    let role = if body["email"] == "root@example.com" { "ADMIN" } else { "USER" };
                    sink.push(body);
                    Json(json!({"user": user_json(1, role)}))
                }
            }),
        )
        .route(
            "/api/auth/signup",
            post(move |Json(body): Json<Value>| {
                let sink = signup_sink.clone();
                async move {
                    sink.push(body);
                    (
                        StatusCode::CREATED,
                        Json(json!({"user": user_json(11, "USER"), "message": "Welcome"})),
                    )
                }
            }),
        )
        .route(
            "/api/auth/profile/{id}",
            put(move |Path(id): Path<String>, Json(body): Json<Value>| {
                let sink = profile_sink.clone();
                async move {
                    let mut user = user_json(7, "USER");
                    user["city"] = body["city"].clone();
                    user["age"] = body["age"].clone();
                    if let Some(fields) = user.as_object_mut() {
                        fields.remove("flatNo");
                    }
                    sink.push(json!({"id": id, "body": body}));
                    Json(json!({"user": user}))
                }
            }),
        )
}

#[tokio::test]
async fn test_login_remembers_profile() {
    let captured = Captured::default();
    let client = spawn_backend(auth_router(&captured)).await;
    let (store, mut session) = guest_session();

    let credentials = Credentials::new("asha@example.com", "hunter22");
    let user = account::login(&mut session, &client, &credentials)
        .await
        .unwrap();

    assert_eq!(user.name, "Asha Kulkarni");
    assert_eq!(session.user(), Some(&user));
    assert_eq!(
        captured.bodies(),
        [json!({"email": "asha@example.com", "password": "hunter22"})]
    );

    // A fresh session over the same store sees the same user.
    let reloaded = Session::load(store);
    assert_eq!(reloaded.user().map(|u| u.email.as_str()), Some("asha@example.com"));
}

#[tokio::test]
async fn test_login_with_null_role_is_a_shopper() {
    let captured = Captured::default();
    let client = spawn_backend(auth_router(&captured)).await;
    let (store, mut session) = guest_session();

    let credentials = Credentials::new("legacy@example.com", "hunter22");
    let user = account::login(&mut session, &client, &credentials)
        .await
        .unwrap();

    assert_eq!(user.role, UserRole::User);
    assert!(!user.is_admin());
    assert_eq!(Session::load(store).user(), Some(&user));
}

#[tokio::test]
async fn test_rejected_login_keeps_guest() {
    let captured = Captured::default();
    let client = spawn_backend(auth_router(&captured)).await;
    let (store, mut session) = guest_session();

    let credentials = Credentials::new("asha@example.com", "wrong");
    let result = account::login(&mut session, &client, &credentials).await;

    let Err(AppError::Backend(err)) = result else {
        panic!("Expected a backend error");
    };
    assert!(matches!(err, BackendError::Api { status: 401, .. }));
    assert_eq!(err.api_message(), Some("Invalid email or password"));
    assert!(session.user().is_none());
    assert!(store.get(keys::USER).unwrap().is_none());
}

#[tokio::test]
async fn test_admin_login_requires_admin_role() {
    let captured = Captured::default();
    let client = spawn_backend(auth_router(&captured)).await;
    let (_store, mut session) = guest_session();

    let shopper = Credentials::new("asha@example.com", "hunter22");
    let result = account::admin_login(&mut session, &client, &shopper).await;
    assert!(matches!(result, Err(AppError::Session(SessionError::NotAdmin))));
    assert!(session.user().is_none());

    let admin = Credentials::new("root@example.com", "hunter22");
    account::admin_login(&mut session, &client, &admin)
        .await
        .unwrap();
    assert!(AdminConsole::open(&session, &client).is_ok());
}

#[tokio::test]
async fn test_signup_validates_before_sending() {
    let captured = Captured::default();
    let client = spawn_backend(auth_router(&captured)).await;
    let (_store, mut session) = guest_session();

    let profile = ProfileUpdate {
        name: "Ravi".to_string(),
        email: "ravi@example.com".to_string(),
        city: Some("  ".to_string()),
        age: Some(0),
        ..ProfileUpdate::default()
    };
    let bad = SignupRequest {
        profile: profile.clone(),
        password: "secret99".to_string().into(),
    };
    let result = account::signup(&mut session, &client, bad).await;
    assert_eq!(
        result.unwrap_err().to_string(),
        "Please enter a valid age (1-150)"
    );
    assert!(captured.bodies().is_empty());

    let good = SignupRequest {
        profile: ProfileUpdate {
            age: Some(31),
            ..profile
        },
        password: "secret99".to_string().into(),
    };
    let user = account::signup(&mut session, &client, good).await.unwrap();
    assert_eq!(user.id.to_string(), "11");

    let bodies = captured.bodies();
    let sent = &bodies[0];
    assert_eq!(sent["password"], "secret99");
    assert_eq!(sent["age"], 31);
    // Blank optional fields go out as null.
    assert_eq!(sent["city"], Value::Null);
}

#[tokio::test]
async fn test_save_profile_merges_backend_copy() {
    let captured = Captured::default();
    let client = spawn_backend(auth_router(&captured)).await;
    let (_store, mut session) = signed_in_session();

    let mut update = ProfileUpdate::from_profile(session.user().unwrap());
    update.city = Some("Mumbai".to_string());
    update.age = Some(29);
    let user = account::save_profile(&mut session, &client, update)
        .await
        .unwrap();

    assert_eq!(user.city.as_deref(), Some("Mumbai"));
    assert_eq!(user.age, Some(29));
    // The backend copy has no flat number, so the old one is kept.
    assert_eq!(user.flat_no.as_deref(), Some("12B"));
    assert_eq!(session.user(), Some(&user));
    assert_eq!(captured.bodies()[0]["id"], "7");

    // Clearing a field is echoed back as null and clears the stored value.
    let mut update = ProfileUpdate::from_profile(&user);
    update.city = None;
    let user = account::save_profile(&mut session, &client, update)
        .await
        .unwrap();
    assert_eq!(user.city, None);
    assert_eq!(user.flat_no.as_deref(), Some("12B"));
    assert_eq!(user.name, "Asha Kulkarni");

    account::logout(&mut session).unwrap();
    assert!(session.user().is_none());
    let result = account::save_profile(&mut session, &client, ProfileUpdate::default()).await;
    assert!(matches!(result, Err(AppError::Session(SessionError::NotSignedIn))));
}
