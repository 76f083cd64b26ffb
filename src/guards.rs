//! Authorization gates
//!
//! Ordered page-route middleware: authentication is always checked
//! before role, so an anonymous request to an admin-only route lands on
//! the login page rather than a permission notice. A failed gate queues
//! a flash notice and redirects; the handler never runs.
//!
//! AJAX endpoints do not use these gates — they answer 401/403 JSON
//! through [`crate::error::AppError`] instead.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use tower_cookies::Cookies;

use crate::flash;
use crate::identity::Identity;
use crate::state::AppState;
use crate::store::{Role, Store};

const LOGIN_NOTICE: &str = "Please log in to access this page.";
const PERMISSION_NOTICE: &str = "You do not have permission to access this page.";
const ADMIN_NOTICE: &str = "Admin access required.";

fn current(req: &Request) -> Option<&crate::identity::CurrentUser> {
    req.extensions()
        .get::<Identity>()
        .and_then(|identity| identity.0.as_ref())
}

fn redirect_with_notice<S: Store>(
    state: &AppState<S>,
    cookies: &Cookies,
    notice: &str,
    to: &str,
) -> Response {
    flash::queue(&state.store, cookies, &state.session_key, "notice", notice);
    Redirect::to(to).into_response()
}

/// Identity must be present; otherwise bounce to the login page.
pub async fn require_auth<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    cookies: Cookies,
    req: Request,
    next: Next,
) -> Response {
    if current(&req).is_none() {
        return redirect_with_notice(&state, &cookies, LOGIN_NOTICE, "/account/login");
    }
    next.run(req).await
}

/// Employee or Admin only. Anonymous requests go to login, not to a
/// permission page.
pub async fn require_staff<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    cookies: Cookies,
    req: Request,
    next: Next,
) -> Response {
    match current(&req) {
        None => redirect_with_notice(&state, &cookies, LOGIN_NOTICE, "/account/login"),
        Some(user) if !user.role.is_staff() => {
            redirect_with_notice(&state, &cookies, PERMISSION_NOTICE, "/account/dashboard")
        }
        Some(_) => next.run(req).await,
    }
}

/// Admin only.
pub async fn require_admin<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    cookies: Cookies,
    req: Request,
    next: Next,
) -> Response {
    match current(&req) {
        None => redirect_with_notice(&state, &cookies, LOGIN_NOTICE, "/account/login"),
        Some(user) if user.role != Role::Admin => {
            redirect_with_notice(&state, &cookies, ADMIN_NOTICE, "/account/dashboard")
        }
        Some(_) => next.run(req).await,
    }
}
