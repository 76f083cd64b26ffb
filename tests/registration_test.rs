//! Tests for account registration

mod common;

use common::{create_test_server, register_account, GOOD_PASSWORD};
use serde_json::{json, Value};

/// Test: registration succeeds and signs the caller in
#[tokio::test]
async fn test_register_success() {
    let (server, _) = create_test_server();

    let response = server
        .post("/account/register")
        .json(&json!({
            "first_name": "Marty",
            "last_name": "McFly",
            "email": "Marty@Example.com",
            "password": GOOD_PASSWORD,
        }))
        .await;

    assert_eq!(response.status_code(), 201);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    // email is stored case-normalized, role is always client
    assert_eq!(body["account"]["email"], "marty@example.com");
    assert_eq!(body["account"]["role"], "Client");
    // the password hash never leaves the store
    assert!(body["account"].get("password_hash").is_none());

    // an identity cookie comes back with the response
    let jwt = response.maybe_cookie("jwt").expect("No jwt cookie");
    assert!(!jwt.value().is_empty());
}

/// Test: a duplicate email is rejected regardless of case
#[tokio::test]
async fn test_register_duplicate_email() {
    let (server, _) = create_test_server();

    register_account(&server, "dup@example.com", GOOD_PASSWORD).await;

    let response = server
        .post("/account/register")
        .json(&json!({
            "first_name": "Other",
            "last_name": "Person",
            "email": "DUP@example.com",
            "password": GOOD_PASSWORD,
        }))
        .await;

    assert_eq!(response.status_code(), 409);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "DUPLICATE_EMAIL");
}

/// Test: a password missing required character classes is rejected
#[tokio::test]
async fn test_register_weak_password() {
    let (server, _) = create_test_server();

    // long enough but no digit or symbol
    let response = server
        .post("/account/register")
        .json(&json!({
            "first_name": "Weak",
            "last_name": "Password",
            "email": "weak@example.com",
            "password": "alllowercasepassword",
        }))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "VALIDATION_FAILED");
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .expect("No errors array")
        .iter()
        .filter_map(|e| e["field"].as_str())
        .collect();
    assert!(fields.contains(&"password"));
}

/// Test: a short password is rejected even with all classes present
#[tokio::test]
async fn test_register_short_password() {
    let (server, _) = create_test_server();

    let response = server
        .post("/account/register")
        .json(&json!({
            "first_name": "Short",
            "last_name": "Password",
            "email": "short@example.com",
            "password": "Ab1!x",
        }))
        .await;

    assert_eq!(response.status_code(), 400);
}

/// Test: missing name and bad email produce per-field errors
#[tokio::test]
async fn test_register_invalid_fields() {
    let (server, _) = create_test_server();

    let response = server
        .post("/account/register")
        .json(&json!({
            "first_name": "",
            "last_name": "User",
            "email": "not-an-email",
            "password": GOOD_PASSWORD,
        }))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .expect("No errors array")
        .iter()
        .filter_map(|e| e["field"].as_str())
        .collect();
    assert!(fields.contains(&"first_name"));
    assert!(fields.contains(&"email"));
}
