//! HTTP routes for the dealership service

pub mod account;
pub mod contact;
pub mod favorites;
pub mod inventory;
pub mod validate;

use std::sync::Arc;

use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use tower_cookies::CookieManagerLayer;
use tower_http::services::ServeDir;

use crate::flash;
use crate::guards;
use crate::identity;
use crate::state::AppState;
use crate::store::Store;

/// Create the router with all routes
pub fn create_router<S: Store + 'static>(state: Arc<AppState<S>>) -> Router {
    let static_dir = state.config.static_dir.clone();
    create_router_with_static_path(state, &static_dir)
}

/// Create the router with a custom static file path
pub fn create_router_with_static_path<S: Store + 'static>(
    state: Arc<AppState<S>>,
    static_path: &str,
) -> Router {
    // Page-style routes behind the redirecting auth gate
    let account_gated = Router::new()
        .route("/account/dashboard", get(account::dashboard))
        .route("/account/update/:account_id", get(account::update_view))
        .route("/account/update", post(account::update_profile))
        .route("/account/update-password", post(account::update_password))
        .route("/favorites", get(favorites::list))
        .route("/favorites/export", get(favorites::export_csv))
        .route_layer(from_fn_with_state(state.clone(), guards::require_auth::<S>));

    // Inventory management and contact review, employees and admins
    let staff_gated = Router::new()
        .route("/inv/add-classification", post(inventory::add_classification))
        .route("/inv/add", post(inventory::add_vehicle))
        .route("/inv/update", post(inventory::update_vehicle))
        .route("/inv/delete", post(inventory::delete_vehicle))
        .route("/admin/contact/submissions", get(contact::list))
        .route("/admin/contact/submission/:contact_id", get(contact::detail))
        .route("/admin/contact/mark-read", post(contact::mark_read))
        .route_layer(from_fn_with_state(state.clone(), guards::require_staff::<S>));

    let admin_gated = Router::new()
        .route("/admin/contact/delete", post(contact::delete))
        .route_layer(from_fn_with_state(state.clone(), guards::require_admin::<S>));

    Router::new()
        .route("/account/register", post(account::register))
        .route("/account/login", post(account::login))
        .route("/account/logout", get(account::logout))
        .route("/inv/classifications", get(inventory::classifications))
        .route("/inv/type/:classification_id", get(inventory::by_classification))
        .route("/inv/detail/:inv_id", get(inventory::detail))
        .route("/favorites/toggle", post(favorites::toggle))
        .route("/favorites/status/:vehicle_id", get(favorites::status))
        .route("/favorites/update-notes", post(favorites::update_notes))
        .route("/favorites/update-priority", post(favorites::update_priority))
        .route("/favorites/recent", get(favorites::recent))
        .route("/favorites/stats", get(favorites::stats))
        .route("/contact", post(contact::submit))
        .route("/messages", get(flash::drain_messages))
        .merge(account_gated)
        .merge(staff_gated)
        .merge(admin_gated)
        // Identity resolution runs before every handler and guard
        .layer(from_fn_with_state(state.clone(), identity::resolve::<S>))
        // Serve static assets (images, CSS, JS)
        .nest_service("/public", ServeDir::new(static_path))
        .layer(CookieManagerLayer::new())
        .with_state(state)
}
