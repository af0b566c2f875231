// Handler tests for the Rental API
// Drives the full router with an in-memory store and a manual clock

use super::*;
use axum::http::{header::AUTHORIZATION, HeaderValue, StatusCode};
use axum_test::TestServer;
use chrono::{Duration, TimeZone, Utc};
use serde_json::{json, Value};

use crate::auth::clock::ManualClock;
use crate::users::{models::NewUser, store::InMemoryIdentityStore};

// ============================================================================
// Test Helpers
// ============================================================================

const SECRET: &[u8] = b"kkkkkkkkkkkkkkkkkkkkkkkkkkkkkkkk";
const ADMIN_PASSWORD: &str = "Admin@123";
const CUSTOMER_PASSWORD: &str = "Secret@123";

struct TestApp {
    server: TestServer,
    clock: ManualClock,
}

/// Builds a server with one seeded admin account ("root")
async fn create_test_app() -> TestApp {
    let signing = SigningContext::new("rental-clients", "rental-api", SECRET.to_vec(), 7, 0)
        .expect("valid signing context");
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap());
    let store: Arc<dyn IdentityStore> = Arc::new(InMemoryIdentityStore::new());

    let state = AppState::new(signing, store.clone(), Arc::new(clock.clone()));
    let admin_hash = state.hasher.hash(ADMIN_PASSWORD).expect("hash admin password");
    store
        .insert(NewUser {
            username: "root".to_string(),
            password_hash: admin_hash.into_string(),
            role: Role::Admin,
            given_name: "Root".to_string(),
            address: "1 Admin Way".to_string(),
            zip_code: "12345".to_string(),
        })
        .await
        .expect("seed admin");

    let server = TestServer::new(create_router(state)).unwrap();
    TestApp { server, clock }
}

fn user_payload(username: &str) -> Value {
    json!({
        "username": username,
        "password": CUSTOMER_PASSWORD,
        "given_name": "Alice",
        "address": "42 Rental Street",
        "zip_code": "98052"
    })
}

fn bearer(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {}", token)).unwrap()
}

async fn login(app: &TestApp, username: &str, password: &str) -> String {
    let response = app
        .server
        .post("/v1/authentication/token")
        .json(&json!({ "username": username, "password": password }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    body["access_token"].as_str().unwrap().to_string()
}

async fn register_customer(app: &TestApp, username: &str) {
    let response = app.server.post("/v1/user").json(&user_payload(username)).await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
}

// ============================================================================
// Token endpoint (POST /v1/authentication/token)
// ============================================================================

#[tokio::test]
async fn test_token_issued_for_valid_credentials() {
    let app = create_test_app().await;

    let response = app
        .server
        .post("/v1/authentication/token")
        .json(&json!({ "username": "root", "password": ADMIN_PASSWORD }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["token_type"], "Bearer");
    assert!(!body["access_token"].as_str().unwrap().is_empty());
    assert_eq!(body["expires_at"], "2024-01-08T12:00:00Z");
}

#[tokio::test]
async fn test_token_rejects_missing_fields() {
    let app = create_test_app().await;

    for payload in [
        json!({ "username": "", "password": ADMIN_PASSWORD }),
        json!({ "username": "root", "password": "" }),
        json!({ "username": null, "password": ADMIN_PASSWORD }),
        json!({ "password": ADMIN_PASSWORD }),
        json!({ "username": "   ", "password": "   " }),
        json!({ "username": "root", "password": " " }),
    ] {
        let response = app.server.post("/v1/authentication/token").json(&payload).await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST, "{}", payload);
        let body: Value = response.json();
        assert_eq!(body["error_code"], "VALIDATION_ERROR");
    }
}

#[tokio::test]
async fn test_token_mismatch_does_not_reveal_which_part_failed() {
    let app = create_test_app().await;

    let unknown_user = app
        .server
        .post("/v1/authentication/token")
        .json(&json!({ "username": "nobody", "password": ADMIN_PASSWORD }))
        .await;
    let wrong_password = app
        .server
        .post("/v1/authentication/token")
        .json(&json!({ "username": "root", "password": "Wrong@123" }))
        .await;

    assert_eq!(unknown_user.status_code(), StatusCode::FORBIDDEN);
    assert_eq!(wrong_password.status_code(), StatusCode::FORBIDDEN);

    let unknown_body: Value = unknown_user.json();
    let wrong_body: Value = wrong_password.json();
    assert_eq!(unknown_body["message"], "User or password mismatch");
    assert_eq!(unknown_body["message"], wrong_body["message"]);
    assert_eq!(unknown_body["error_code"], wrong_body["error_code"]);
}

// ============================================================================
// Registration and self-service (/v1/user, /v1/user/me)
// ============================================================================

#[tokio::test]
async fn test_register_then_login_and_fetch_profile() {
    let app = create_test_app().await;
    register_customer(&app, "alice").await;

    let token = login(&app, "alice", CUSTOMER_PASSWORD).await;
    let response = app
        .server
        .get("/v1/user/me")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["username"], "alice");
    assert_eq!(body["zip_code"], "98052");
    assert!(body.get("password_hash").is_none());
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn test_register_duplicate_username_conflicts() {
    let app = create_test_app().await;
    register_customer(&app, "alice").await;

    let response = app.server.post("/v1/user").json(&user_payload("alice")).await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);

    let body: Value = response.json();
    assert_eq!(body["error_code"], "CONFLICT_ERROR");
    assert_eq!(body["message"], "User has already been registered");
}

#[tokio::test]
async fn test_register_rejects_weak_password_and_bad_zip() {
    let app = create_test_app().await;
    let mut payload = user_payload("alice");
    payload["password"] = json!("password");
    payload["zip_code"] = json!("ABCDE");

    let response = app.server.post("/v1/user").json(&payload).await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert!(body["details"].get("password").is_some());
    assert!(body["details"].get("zip_code").is_some());
}

#[tokio::test]
async fn test_register_rejects_blank_profile_fields() {
    let app = create_test_app().await;
    let mut payload = user_payload("   ");
    payload["given_name"] = json!("  ");
    payload["address"] = json!("  ");

    let response = app.server.post("/v1/user").json(&payload).await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert_eq!(body["error_code"], "VALIDATION_ERROR");
    for field in ["username", "given_name", "address"] {
        assert!(body["details"].get(field).is_some(), "{} should be reported", field);
    }

    let response = app
        .server
        .post("/v1/authentication/token")
        .json(&json!({ "username": "   ", "password": CUSTOMER_PASSWORD }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_me_requires_token() {
    let app = create_test_app().await;

    let response = app.server.get("/v1/user/me").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    let response = app
        .server
        .get("/v1/user/me")
        .add_header(AUTHORIZATION, HeaderValue::from_static("Bearer not-a-jwt"))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_update_me_changes_password() {
    let app = create_test_app().await;
    register_customer(&app, "alice").await;
    let token = login(&app, "alice", CUSTOMER_PASSWORD).await;

    let response = app
        .server
        .put("/v1/user")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({
            "password": "Changed#456",
            "given_name": "Alicia",
            "address": "7 New Road",
            "zip_code": "98052-1234"
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

    let old = app
        .server
        .post("/v1/authentication/token")
        .json(&json!({ "username": "alice", "password": CUSTOMER_PASSWORD }))
        .await;
    assert_eq!(old.status_code(), StatusCode::FORBIDDEN);

    let token = login(&app, "alice", "Changed#456").await;
    let body: Value = app
        .server
        .get("/v1/user/me")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .json();
    assert_eq!(body["given_name"], "Alicia");
}

#[tokio::test]
async fn test_update_me_for_deleted_account_is_not_found_even_with_bad_body() {
    let app = create_test_app().await;
    register_customer(&app, "alice").await;
    let token = login(&app, "alice", CUSTOMER_PASSWORD).await;

    let response = app
        .server
        .delete("/v1/user/me")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let response = app
        .server
        .put("/v1/user")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({
            "password": "weak",
            "given_name": "",
            "address": "",
            "zip_code": "nope"
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["message"], "User not found");
}

#[tokio::test]
async fn test_delete_me_twice_reports_already_deleted() {
    let app = create_test_app().await;
    register_customer(&app, "alice").await;
    let token = login(&app, "alice", CUSTOMER_PASSWORD).await;

    let first = app
        .server
        .delete("/v1/user/me")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    assert_eq!(first.status_code(), StatusCode::OK);

    let second = app
        .server
        .delete("/v1/user/me")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    assert_eq!(second.status_code(), StatusCode::NOT_FOUND);
    let body: Value = second.json();
    assert_eq!(body["message"], "User has already been deleted");
}

// ============================================================================
// Admin-gated routes
// ============================================================================

#[tokio::test]
async fn test_admin_route_rejects_customer() {
    let app = create_test_app().await;
    register_customer(&app, "alice").await;
    let token = login(&app, "alice", CUSTOMER_PASSWORD).await;

    let response = app
        .server
        .get("/v1/user/root")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["message"], "Unauthorized");
}

#[tokio::test]
async fn test_admin_route_rejects_anonymous() {
    let app = create_test_app().await;

    let response = app.server.get("/v1/user/root").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_can_read_and_delete_users() {
    let app = create_test_app().await;
    register_customer(&app, "alice").await;
    let token = login(&app, "root", ADMIN_PASSWORD).await;

    let response = app
        .server
        .get("/v1/user/alice")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["username"], "alice");

    let response = app
        .server
        .delete("/v1/user/alice")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let response = app
        .server
        .get("/v1/user/alice")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_creates_admin_who_passes_gate() {
    let app = create_test_app().await;
    let token = login(&app, "root", ADMIN_PASSWORD).await;

    let response = app
        .server
        .post("/v1/user/admin")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&user_payload("deputy"))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);

    let deputy = login(&app, "deputy", CUSTOMER_PASSWORD).await;
    let response = app
        .server
        .get("/v1/user/root")
        .add_header(AUTHORIZATION, bearer(&deputy))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_customer_cannot_create_admin() {
    let app = create_test_app().await;
    register_customer(&app, "alice").await;
    let token = login(&app, "alice", CUSTOMER_PASSWORD).await;

    let response = app
        .server
        .post("/v1/user/admin")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&user_payload("sneaky"))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_deleted_admin_token_no_longer_passes_gate() {
    let app = create_test_app().await;
    let token = login(&app, "root", ADMIN_PASSWORD).await;

    let response = app
        .server
        .delete("/v1/user/me")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    // Token is still cryptographically valid but the role lookup now fails
    let response = app
        .server
        .get("/v1/user/root")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Expiry
// ============================================================================

#[tokio::test]
async fn test_token_rejected_once_expired() {
    let app = create_test_app().await;
    let token = login(&app, "root", ADMIN_PASSWORD).await;

    app.clock.advance(Duration::days(7) - Duration::seconds(1));
    let response = app
        .server
        .get("/v1/user/me")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    app.clock.advance(Duration::seconds(1));
    let response = app
        .server
        .get("/v1/user/me")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    let response = app
        .server
        .get("/v1/user/root")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}
