//! Tests for contact submissions and their review surface

mod common;

use common::{create_test_server, jwt_cookie, register_with_role, seed_vehicle};
use carlot::store::Role;
use serde_json::{json, Value};

/// Test: anyone can submit the contact form
#[tokio::test]
async fn test_submit_contact() {
    let (server, _) = create_test_server();

    let response = server
        .post("/contact")
        .json(&json!({
            "name": "Doc Brown",
            "email": "Doc@Example.com",
            "message": "Do you buy back old DeLoreans?",
        }))
        .await;

    assert_eq!(response.status_code(), 201);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert!(body["contact_id"].is_i64());
}

/// Test: submissions are validated per field
#[tokio::test]
async fn test_submit_contact_validation() {
    let (server, _) = create_test_server();

    let response = server
        .post("/contact")
        .json(&json!({
            "name": "",
            "email": "bad-email",
            "message": "",
        }))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e["field"].as_str())
        .collect();
    assert!(fields.contains(&"name"));
    assert!(fields.contains(&"email"));
    assert!(fields.contains(&"message"));
}

/// Test: a vehicle reference must resolve
#[tokio::test]
async fn test_submit_contact_unknown_vehicle() {
    let (server, _) = create_test_server();

    let response = server
        .post("/contact")
        .json(&json!({
            "name": "Doc Brown",
            "email": "doc@example.com",
            "message": "About that car...",
            "vehicle_id": 9999,
        }))
        .await;

    assert_eq!(response.status_code(), 404);
}

/// Test: staff review submissions, mark them read, admin deletes them
#[tokio::test]
async fn test_review_lifecycle() {
    let (server, store) = create_test_server();
    let vehicle = seed_vehicle(&store);
    let (_, staff_jwt) =
        register_with_role(&server, &store, "reviewer@example.com", Role::Employee).await;
    let (_, admin_jwt) =
        register_with_role(&server, &store, "boss@example.com", Role::Admin).await;

    let contact_id = server
        .post("/contact")
        .json(&json!({
            "name": "Buyer",
            "email": "buyer@example.com",
            "message": "Is the DeLorean still available?",
            "vehicle_id": vehicle.inv_id,
            "phone": "555-0100",
        }))
        .await
        .json::<Value>()["contact_id"]
        .as_i64()
        .unwrap();

    // staff see the submission, unread
    let listing = server
        .get("/admin/contact/submissions")
        .add_cookie(jwt_cookie(&staff_jwt))
        .await
        .json::<Value>();
    assert_eq!(listing["count"], 1);
    assert_eq!(listing["submissions"][0]["is_read"], false);

    let detail = server
        .get(&format!("/admin/contact/submission/{contact_id}"))
        .add_cookie(jwt_cookie(&staff_jwt))
        .await
        .json::<Value>();
    assert_eq!(detail["submission"]["email"], "buyer@example.com");
    assert_eq!(detail["submission"]["vehicle_id"], vehicle.inv_id);

    let response = server
        .post("/admin/contact/mark-read")
        .add_cookie(jwt_cookie(&staff_jwt))
        .json(&json!({ "contact_id": contact_id }))
        .await;
    assert_eq!(response.status_code(), 200);

    let detail = server
        .get(&format!("/admin/contact/submission/{contact_id}"))
        .add_cookie(jwt_cookie(&staff_jwt))
        .await
        .json::<Value>();
    assert_eq!(detail["submission"]["is_read"], true);

    // deletion is admin-only
    let response = server
        .post("/admin/contact/delete")
        .add_cookie(jwt_cookie(&admin_jwt))
        .json(&json!({ "contact_id": contact_id }))
        .await;
    assert_eq!(response.status_code(), 200);

    let response = server
        .get(&format!("/admin/contact/submission/{contact_id}"))
        .add_cookie(jwt_cookie(&staff_jwt))
        .await;
    assert_eq!(response.status_code(), 404);
}

/// Test: unknown submission ids are a 404 for staff actions
#[tokio::test]
async fn test_review_unknown_submission() {
    let (server, store) = create_test_server();
    let (_, jwt) = register_with_role(&server, &store, "rev2@example.com", Role::Employee).await;

    let response = server
        .get("/admin/contact/submission/9999")
        .add_cookie(jwt_cookie(&jwt))
        .await;
    assert_eq!(response.status_code(), 404);

    let response = server
        .post("/admin/contact/mark-read")
        .add_cookie(jwt_cookie(&jwt))
        .json(&json!({ "contact_id": 9999 }))
        .await;
    assert_eq!(response.status_code(), 404);
}
