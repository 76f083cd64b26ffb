//! Per-request identity resolution
//!
//! Runs before every route: pulls a token from the `jwt` cookie or the
//! Authorization header, verifies it, and builds the request's identity
//! context. Verification failure is never fatal — the request simply
//! proceeds anonymous, and the bad cookie is cleared.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use serde::Serialize;
use tower_cookies::cookie::time::Duration;
use tower_cookies::cookie::SameSite;
use tower_cookies::{Cookie, Cookies};

use crate::state::AppState;
use crate::store::{Account, Store};
use crate::token::{AccountClaims, TOKEN_TTL_HOURS};

/// Name of the identity cookie
pub const JWT_COOKIE: &str = "jwt";

/// The resolved "who is making this request" projection
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CurrentUser {
    pub account_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: crate::store::Role,
}

/// Request extension carrying the identity context; `None` is anonymous
#[derive(Debug, Clone)]
pub struct Identity(pub Option<CurrentUser>);

/// Merge freshly queried account fields over token claims.
///
/// The database is authoritative for mutable fields (name, email, role);
/// claims stand in only when no fresh record is available. Falling back
/// to stale claims when the lookup fails is a deliberate
/// availability-over-freshness tradeoff: a demoted account keeps its old
/// role until token expiry.
pub fn merge_identity(claims: AccountClaims, fresh: Option<Account>) -> CurrentUser {
    match fresh {
        Some(account) => CurrentUser {
            account_id: account.account_id,
            first_name: account.first_name,
            last_name: account.last_name,
            email: account.email,
            role: account.role,
        },
        None => CurrentUser {
            account_id: claims.sub,
            first_name: claims.first_name,
            last_name: claims.last_name,
            email: claims.email,
            role: claims.role,
        },
    }
}

/// Candidate token: `jwt` cookie preferred, bearer header as fallback
fn extract_token(cookies: &Cookies, headers: &HeaderMap) -> Option<String> {
    if let Some(cookie) = cookies.get(JWT_COOKIE) {
        return Some(cookie.value().to_string());
    }
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|v| v.to_string())
}

/// Set the identity cookie after login/registration
pub fn set_jwt_cookie(cookies: &Cookies, token: &str, production: bool) {
    let cookie = Cookie::build((JWT_COOKIE, token.to_string()))
        .path("/")
        .http_only(true)
        .secure(production)
        .same_site(if production {
            SameSite::None
        } else {
            SameSite::Strict
        })
        .max_age(Duration::hours(TOKEN_TTL_HOURS))
        .build();
    cookies.add(cookie);
}

/// Clear the identity cookie (idempotent)
pub fn clear_jwt_cookie(cookies: &Cookies) {
    let cookie = Cookie::build((JWT_COOKIE, ""))
        .path("/")
        .http_only(true)
        .max_age(Duration::ZERO)
        .build();
    cookies.add(cookie);
}

/// Identity middleware, layered over every route
pub async fn resolve<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    cookies: Cookies,
    mut req: Request,
    next: Next,
) -> Response {
    let identity = match extract_token(&cookies, req.headers()) {
        None => None,
        Some(token) => match state.tokens.verify(&token) {
            Err(_) => {
                // Invalid and expired are handled identically
                clear_jwt_cookie(&cookies);
                None
            }
            Ok(claims) => {
                let fresh = match state.store.find_by_id(claims.sub) {
                    Ok(found) => found,
                    Err(e) => {
                        tracing::warn!(
                            account_id = claims.sub,
                            error = %e,
                            "account refresh failed, trusting token claims"
                        );
                        None
                    }
                };
                Some(merge_identity(claims, fresh))
            }
        },
    };

    if let Some(user) = &identity {
        tracing::debug!(
            account_id = user.account_id,
            role = user.role.as_str(),
            "request authenticated"
        );
    }

    req.extensions_mut().insert(Identity(identity));
    next.run(req).await
}
