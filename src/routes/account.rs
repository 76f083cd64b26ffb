//! Account endpoints: registration, login, logout, dashboard, and
//! owner-only profile/password updates

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect};
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::json;
use tower_cookies::Cookies;

use super::validate;
use crate::crypto::{hash_password, verify_password};
use crate::error::AppError;
use crate::flash;
use crate::identity::{clear_jwt_cookie, set_jwt_cookie, CurrentUser, Identity};
use crate::state::AppState;
use crate::store::Store;

fn require_user(identity: &Identity) -> Result<&CurrentUser, AppError> {
    identity.0.as_ref().ok_or(AppError::NotAuthenticated)
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

/// POST /account/register
pub async fn register<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    cookies: Cookies,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate::registration(&req.first_name, &req.last_name, &req.email, &req.password)?;

    let email = req.email.trim().to_lowercase();
    if state.store.email_exists(&email, None)? {
        return Err(AppError::DuplicateEmail);
    }

    let password_hash = hash_password(&req.password)?;
    // Role is forced to Client inside the store; a registering party
    // can never choose its own role.
    let account = state.store.create_account(crate::store::NewAccount {
        first_name: req.first_name.trim().to_string(),
        last_name: req.last_name.trim().to_string(),
        email,
        password_hash,
    })?;

    let token = state
        .tokens
        .issue(&account)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    set_jwt_cookie(&cookies, &token, state.config.production);

    flash::queue(
        &state.store,
        &cookies,
        &state.session_key,
        "notice",
        &format!(
            "Congratulations, you're registered {}.",
            account.first_name
        ),
    );

    tracing::info!(account_id = account.account_id, "account registered");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "account": account })),
    ))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /account/login
///
/// Unknown email and wrong password produce the identical response so
/// the endpoint cannot be used for account enumeration.
pub async fn login<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    cookies: Cookies,
    Json(req): Json<LoginRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    validate::login(&req.email, &req.password)?;

    let credentials = state
        .store
        .find_by_email(req.email.trim())?
        .ok_or(AppError::InvalidCredentials)?;

    if !verify_password(&req.password, &credentials.password_hash)? {
        return Err(AppError::InvalidCredentials);
    }

    let account = credentials.account;
    let token = state
        .tokens
        .issue(&account)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    set_jwt_cookie(&cookies, &token, state.config.production);

    tracing::info!(account_id = account.account_id, "login succeeded");

    Ok(Json(json!({ "success": true, "account": account })))
}

/// GET /account/logout
///
/// Clears the identity cookie; works for anonymous callers too.
pub async fn logout<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    cookies: Cookies,
) -> Redirect {
    clear_jwt_cookie(&cookies);
    flash::queue(
        &state.store,
        &cookies,
        &state.session_key,
        "notice",
        "You have been logged out.",
    );
    Redirect::to("/")
}

/// GET /account/dashboard
pub async fn dashboard<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<serde_json::Value>, AppError> {
    let user = require_user(&identity)?;
    let recent = state.store.recent_favorites(user.account_id, 5)?;
    Ok(Json(json!({
        "success": true,
        "account": user,
        "recent_favorites": recent,
    })))
}

/// GET /account/update/:account_id
///
/// Owner-only: the path id must match the request identity.
pub async fn update_view<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Extension(identity): Extension<Identity>,
    Path(account_id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    let user = require_user(&identity)?;
    if user.account_id != account_id {
        return Err(AppError::Forbidden);
    }
    let account = state
        .store
        .find_by_id(account_id)?
        .ok_or(AppError::NotFound("account"))?;
    Ok(Json(json!({ "success": true, "account": account })))
}

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub account_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// POST /account/update
pub async fn update_profile<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    cookies: Cookies,
    Extension(identity): Extension<Identity>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let user = require_user(&identity)?;
    if user.account_id != req.account_id {
        return Err(AppError::Forbidden);
    }
    validate::profile_update(&req.first_name, &req.last_name, &req.email)?;

    let updated = state
        .store
        .update_profile(
            req.account_id,
            req.first_name.trim(),
            req.last_name.trim(),
            req.email.trim(),
        )?
        .ok_or(AppError::NotFound("account"))?;

    // Reissue the token so the cookie claims match the new record
    let token = state
        .tokens
        .issue(&updated)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    set_jwt_cookie(&cookies, &token, state.config.production);

    flash::queue(
        &state.store,
        &cookies,
        &state.session_key,
        "notice",
        "Account information updated.",
    );

    Ok(Json(json!({ "success": true, "account": updated })))
}

#[derive(Deserialize)]
pub struct UpdatePasswordRequest {
    pub account_id: i64,
    pub new_password: String,
    pub confirm_password: String,
}

/// POST /account/update-password
pub async fn update_password<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    cookies: Cookies,
    Extension(identity): Extension<Identity>,
    Json(req): Json<UpdatePasswordRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let user = require_user(&identity)?;
    if user.account_id != req.account_id {
        return Err(AppError::Forbidden);
    }
    validate::password_change(&req.new_password, &req.confirm_password)?;

    let password_hash = hash_password(&req.new_password)?;
    if !state.store.update_password(req.account_id, &password_hash)? {
        return Err(AppError::NotFound("account"));
    }

    flash::queue(
        &state.store,
        &cookies,
        &state.session_key,
        "notice",
        "Password updated.",
    );

    tracing::info!(account_id = req.account_id, "password changed");

    Ok(Json(json!({ "success": true })))
}
