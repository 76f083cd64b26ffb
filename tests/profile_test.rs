//! Tests for profile and password updates

mod common;

use common::{create_test_server, jwt_cookie, register_account, GOOD_PASSWORD};
use serde_json::{json, Value};

/// Test: the update view is owner-only
#[tokio::test]
async fn test_update_view_owner_only() {
    let (server, _) = create_test_server();
    let (my_id, jwt) = register_account(&server, "me@example.com", GOOD_PASSWORD).await;
    let (other_id, _) = register_account(&server, "them@example.com", GOOD_PASSWORD).await;

    let response = server
        .get(&format!("/account/update/{my_id}"))
        .add_cookie(jwt_cookie(&jwt))
        .await;
    assert_eq!(response.status_code(), 200);

    let response = server
        .get(&format!("/account/update/{other_id}"))
        .add_cookie(jwt_cookie(&jwt))
        .await;
    assert_eq!(response.status_code(), 403);
}

/// Test: a profile update changes the record and reissues the cookie
#[tokio::test]
async fn test_update_profile() {
    let (server, _) = create_test_server();
    let (account_id, jwt) = register_account(&server, "old@example.com", GOOD_PASSWORD).await;

    let response = server
        .post("/account/update")
        .add_cookie(jwt_cookie(&jwt))
        .json(&json!({
            "account_id": account_id,
            "first_name": "New",
            "last_name": "Name",
            "email": "new@example.com",
        }))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["account"]["email"], "new@example.com");

    // a fresh token comes back so the cookie claims match the record
    let reissued = response.maybe_cookie("jwt").expect("No reissued jwt cookie");
    assert!(!reissued.value().is_empty());

    let response = server
        .post("/account/login")
        .json(&json!({ "email": "new@example.com", "password": GOOD_PASSWORD }))
        .await;
    assert_eq!(response.status_code(), 200);
}

/// Test: an update cannot take another account's email
#[tokio::test]
async fn test_update_profile_email_collision() {
    let (server, _) = create_test_server();
    let (account_id, jwt) = register_account(&server, "one@example.com", GOOD_PASSWORD).await;
    register_account(&server, "two@example.com", GOOD_PASSWORD).await;

    let response = server
        .post("/account/update")
        .add_cookie(jwt_cookie(&jwt))
        .json(&json!({
            "account_id": account_id,
            "first_name": "Test",
            "last_name": "User",
            "email": "two@example.com",
        }))
        .await;

    assert_eq!(response.status_code(), 409);

    // keeping your own email is fine
    let response = server
        .post("/account/update")
        .add_cookie(jwt_cookie(&jwt))
        .json(&json!({
            "account_id": account_id,
            "first_name": "Test",
            "last_name": "User",
            "email": "one@example.com",
        }))
        .await;
    assert_eq!(response.status_code(), 200);
}

/// Test: updating a different account's profile is forbidden
#[tokio::test]
async fn test_update_profile_owner_only() {
    let (server, _) = create_test_server();
    let (_, jwt) = register_account(&server, "owner@example.com", GOOD_PASSWORD).await;
    let (victim_id, _) = register_account(&server, "victim@example.com", GOOD_PASSWORD).await;

    let response = server
        .post("/account/update")
        .add_cookie(jwt_cookie(&jwt))
        .json(&json!({
            "account_id": victim_id,
            "first_name": "Hijacked",
            "last_name": "User",
            "email": "hijacked@example.com",
        }))
        .await;

    assert_eq!(response.status_code(), 403);
}

/// Test: a password change invalidates the old password
#[tokio::test]
async fn test_update_password() {
    let (server, _) = create_test_server();
    let (account_id, jwt) = register_account(&server, "pw@example.com", GOOD_PASSWORD).await;
    let new_password = "N3w&BetterPass!!";

    let response = server
        .post("/account/update-password")
        .add_cookie(jwt_cookie(&jwt))
        .json(&json!({
            "account_id": account_id,
            "new_password": new_password,
            "confirm_password": new_password,
        }))
        .await;
    assert_eq!(response.status_code(), 200);

    let old = server
        .post("/account/login")
        .json(&json!({ "email": "pw@example.com", "password": GOOD_PASSWORD }))
        .await;
    assert_eq!(old.status_code(), 401);

    let new = server
        .post("/account/login")
        .json(&json!({ "email": "pw@example.com", "password": new_password }))
        .await;
    assert_eq!(new.status_code(), 200);
}

/// Test: mismatched confirmation is rejected before hashing
#[tokio::test]
async fn test_update_password_mismatch() {
    let (server, _) = create_test_server();
    let (account_id, jwt) = register_account(&server, "pw2@example.com", GOOD_PASSWORD).await;

    let response = server
        .post("/account/update-password")
        .add_cookie(jwt_cookie(&jwt))
        .json(&json!({
            "account_id": account_id,
            "new_password": "N3w&BetterPass!!",
            "confirm_password": "D1ff&erentPass!!",
        }))
        .await;

    assert_eq!(response.status_code(), 400);
}
