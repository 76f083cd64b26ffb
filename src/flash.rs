//! One-shot flash notices
//!
//! A signed session cookie keys a server-side queue of notices. The
//! session layer is independent of identity: it exists only to carry a
//! message across a redirect, and a notice is delivered exactly once.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};
use tower_cookies::cookie::time::Duration;
use tower_cookies::{Cookie, Cookies, Key};
use uuid::Uuid;

use crate::state::AppState;
use crate::store::{NoticeStore, Store};

const SESSION_COOKIE: &str = "carlot_session";

/// Get the flash-session id from the signed cookie, minting one if the
/// client has none yet.
pub fn session_id(cookies: &Cookies, key: &Key) -> String {
    let signed = cookies.signed(key);
    if let Some(cookie) = signed.get(SESSION_COOKIE) {
        return cookie.value().to_string();
    }
    let id = Uuid::new_v4().to_string();
    let cookie = Cookie::build((SESSION_COOKIE, id.clone()))
        .path("/")
        .http_only(true)
        .max_age(Duration::days(1))
        .build();
    signed.add(cookie);
    id
}

/// Queue a notice for the next response on this session. Best-effort:
/// a store failure is logged, never surfaced.
pub fn queue<N: NoticeStore>(store: &N, cookies: &Cookies, key: &Key, kind: &str, message: &str) {
    let sid = session_id(cookies, key);
    if let Err(e) = store.push_notice(&sid, kind, message) {
        tracing::warn!(error = %e, "failed to queue flash notice");
    }
}

/// GET /messages
///
/// Drain the queued notices for this session (read-and-delete).
pub async fn drain_messages<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    cookies: Cookies,
) -> Json<Value> {
    let sid = session_id(&cookies, &state.session_key);
    let notices = state.store.take_notices(&sid).unwrap_or_default();
    Json(json!({ "success": true, "messages": notices }))
}
