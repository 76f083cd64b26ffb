//! Tests for identity resolution from the jwt cookie

mod common;

use axum::http::header::LOCATION;
use common::{create_test_server, jwt_cookie, register_account, GOOD_PASSWORD};
use serde_json::Value;

/// Test: a garbage token is treated as anonymous and the cookie is cleared
#[tokio::test]
async fn test_invalid_token_treated_as_anonymous() {
    let (server, _) = create_test_server();

    let response = server
        .get("/account/dashboard")
        .add_cookie(jwt_cookie("not-a-real-token"))
        .await;

    assert_eq!(response.status_code(), 303);
    assert_eq!(response.header(LOCATION), "/account/login");

    let cleared = response.maybe_cookie("jwt").expect("No jwt cookie in response");
    assert!(cleared.value().is_empty());
}

/// Test: a tampered token is rejected
#[tokio::test]
async fn test_tampered_token_rejected() {
    let (server, _) = create_test_server();
    let (_, jwt) = register_account(&server, "tamper@example.com", GOOD_PASSWORD).await;

    // flip the last signature character
    let mut tampered = jwt.clone();
    let last = tampered.pop().unwrap();
    tampered.push(if last == 'A' { 'B' } else { 'A' });

    let response = server
        .get("/account/dashboard")
        .add_cookie(jwt_cookie(&tampered))
        .await;

    assert_eq!(response.status_code(), 303);
    assert_eq!(response.header(LOCATION), "/account/login");
}

/// Test: identity lookups prefer the stored record over token claims
#[tokio::test]
async fn test_identity_reflects_stored_record() {
    let (server, _) = create_test_server();
    let (account_id, jwt) = register_account(&server, "fresh@example.com", GOOD_PASSWORD).await;

    // change the profile using the original token
    let response = server
        .post("/account/update")
        .add_cookie(jwt_cookie(&jwt))
        .json(&serde_json::json!({
            "account_id": account_id,
            "first_name": "Renamed",
            "last_name": "User",
            "email": "fresh@example.com",
        }))
        .await;
    assert_eq!(response.status_code(), 200);

    // the old token still works, and the identity carries the new name
    let body = server
        .get("/account/dashboard")
        .add_cookie(jwt_cookie(&jwt))
        .await
        .json::<Value>();
    assert_eq!(body["account"]["first_name"], "Renamed");
}

/// Test: a valid token survives the account record disappearing.
///
/// Store lookups during resolution fall back to the token claims rather
/// than logging the caller out.
#[tokio::test]
async fn test_claims_fallback_when_record_missing() {
    let (server, store) = create_test_server();
    let (account_id, jwt) = register_account(&server, "gone@example.com", GOOD_PASSWORD).await;

    store.remove_account(account_id);

    let body = server
        .get("/favorites/stats")
        .add_cookie(jwt_cookie(&jwt))
        .await
        .json::<Value>();
    assert_eq!(body["success"], true);
    assert_eq!(body["stats"]["total_favorites"], 0);
}
