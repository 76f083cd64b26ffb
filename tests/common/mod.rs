//! Common test utilities for integration tests

#![allow(dead_code)]

use std::sync::Arc;

use axum_test::TestServer;
use serde_json::json;

use carlot::store::{NewVehicle, Role, Vehicle};
use carlot::{routes, AppState, Config, MemoryStore};

/// Create a test server backed by a shared in-memory store.
///
/// The returned store handle sees the same data as the server, so tests
/// can seed inventory and flip roles out of band.
pub fn create_test_server() -> (TestServer, MemoryStore) {
    let store = MemoryStore::new();
    let state = Arc::new(AppState::new(Config::default(), store.clone()));

    let app = routes::create_router(state);
    let server = TestServer::new(app).expect("Failed to create test server");

    (server, store)
}

/// Register an account and return (account_id, jwt cookie value)
pub async fn register_account(server: &TestServer, email: &str, password: &str) -> (i64, String) {
    let response = server
        .post("/account/register")
        .json(&json!({
            "first_name": "Test",
            "last_name": "User",
            "email": email,
            "password": password,
        }))
        .await;
    assert_eq!(response.status_code(), 201);

    let account_id = response.json::<serde_json::Value>()["account"]["account_id"]
        .as_i64()
        .expect("No account id in response");
    let jwt = response
        .maybe_cookie("jwt")
        .expect("No jwt cookie")
        .value()
        .to_string();

    (account_id, jwt)
}

/// A password that satisfies the policy
pub const GOOD_PASSWORD: &str = "Sup3r$ecurePass!";

/// Register an account and promote it before returning the login token.
///
/// The promotion happens directly in the store, then a fresh login picks
/// up the new role claims.
pub async fn register_with_role(
    server: &TestServer,
    store: &MemoryStore,
    email: &str,
    role: Role,
) -> (i64, String) {
    let (account_id, _) = register_account(server, email, GOOD_PASSWORD).await;
    store.set_role(account_id, role).expect("set_role failed");

    let response = server
        .post("/account/login")
        .json(&json!({ "email": email, "password": GOOD_PASSWORD }))
        .await;
    assert_eq!(response.status_code(), 200);
    let jwt = response
        .maybe_cookie("jwt")
        .expect("No jwt cookie")
        .value()
        .to_string();

    (account_id, jwt)
}

pub fn jwt_cookie(token: &str) -> cookie::Cookie<'static> {
    cookie::Cookie::new("jwt", token.to_string())
}

/// Seed one classification and one vehicle, returning the vehicle
pub fn seed_vehicle(store: &MemoryStore) -> Vehicle {
    use carlot::store::InventoryStore;

    let classification = store
        .add_classification("Sport")
        .expect("add_classification failed");
    store
        .add_vehicle(NewVehicle {
            make: "DMC".to_string(),
            model: "DeLorean".to_string(),
            year: 1981,
            description: "Stainless steel body, gullwing doors".to_string(),
            image: None,
            thumbnail: None,
            price: 29000.0,
            miles: 88000,
            color: "Silver".to_string(),
            classification_id: classification.classification_id,
        })
        .expect("add_vehicle failed")
}
