//! Per-account favorite vehicles
//!
//! The AJAX endpoints answer JSON with structured error bodies instead
//! of redirecting; the list page and CSV export sit behind the
//! redirecting auth gate.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::json;

use super::validate;
use crate::error::AppError;
use crate::identity::{CurrentUser, Identity};
use crate::state::AppState;
use crate::store::{FavoriteVehicle, Store, MAX_FAVORITES};

/// Page size for the favorites list
const PAGE_SIZE: i64 = 12;

fn require_user(identity: &Identity) -> Result<&CurrentUser, AppError> {
    identity.0.as_ref().ok_or(AppError::NotAuthenticated)
}

#[derive(Deserialize)]
pub struct ToggleRequest {
    pub vehicle_id: i64,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub priority: Option<i32>,
}

/// POST /favorites/toggle
///
/// Adds the vehicle when it is not favorited (subject to the per-user
/// cap), removes it when it is.
pub async fn toggle<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<ToggleRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let user = require_user(&identity)?;
    let priority = req.priority.unwrap_or(1);
    validate::favorite_input(req.notes.as_deref(), priority)?;

    if state.store.get_vehicle(req.vehicle_id)?.is_none() {
        return Err(AppError::NotFound("vehicle"));
    }

    let action = if state.store.is_favorite(user.account_id, req.vehicle_id)? {
        state.store.remove_favorite(user.account_id, req.vehicle_id)?;
        "removed"
    } else {
        let count = state.store.account_favorite_count(user.account_id)?;
        if count as usize >= MAX_FAVORITES {
            return Err(AppError::LimitExceeded(MAX_FAVORITES));
        }
        state.store.upsert_favorite(
            user.account_id,
            req.vehicle_id,
            req.notes.as_deref(),
            priority,
        )?;
        "added"
    };

    let is_favorite = action == "added";
    let favorite_count = state.store.vehicle_favorite_count(req.vehicle_id)?;

    Ok(Json(json!({
        "success": true,
        "action": action,
        "is_favorite": is_favorite,
        "favorite_count": favorite_count,
    })))
}

/// GET /favorites/status/:vehicle_id
///
/// Public: the per-vehicle count is visible to everyone, the favorite
/// flag only with an identity.
pub async fn status<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Extension(identity): Extension<Identity>,
    Path(vehicle_id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    let favorite_count = state.store.vehicle_favorite_count(vehicle_id)?;
    let is_favorite = match &identity.0 {
        Some(user) => state.store.is_favorite(user.account_id, vehicle_id)?,
        None => false,
    };
    Ok(Json(json!({
        "is_favorite": is_favorite,
        "favorite_count": favorite_count,
        "authenticated": identity.0.is_some(),
    })))
}

#[derive(Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub page: Option<i64>,
}

/// GET /favorites
pub async fn list<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<ListQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let user = require_user(&identity)?;
    // Any well-formed page number is accepted; out-of-range pages just
    // come back empty.
    let page = query.page.unwrap_or(1).max(1);
    let offset = page.saturating_sub(1).saturating_mul(PAGE_SIZE);

    let (favorites, total) = state.store.list_favorites(user.account_id, PAGE_SIZE, offset)?;
    let total_pages = (total + PAGE_SIZE - 1) / PAGE_SIZE;
    let count = state.store.account_favorite_count(user.account_id)?;

    Ok(Json(json!({
        "success": true,
        "favorites": favorites,
        "total": total,
        "current_page": page,
        "total_pages": total_pages,
        "limit": {
            "current": count,
            "max": MAX_FAVORITES,
            "remaining": MAX_FAVORITES as i64 - count,
        },
    })))
}

#[derive(Deserialize)]
pub struct UpdateNotesRequest {
    pub vehicle_id: i64,
    #[serde(default)]
    pub notes: Option<String>,
}

/// POST /favorites/update-notes
pub async fn update_notes<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<UpdateNotesRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let user = require_user(&identity)?;
    validate::favorite_input(req.notes.as_deref(), 1)?;
    if !state
        .store
        .update_notes(user.account_id, req.vehicle_id, req.notes.as_deref())?
    {
        return Err(AppError::NotFound("favorite"));
    }
    Ok(Json(json!({ "success": true })))
}

#[derive(Deserialize)]
pub struct UpdatePriorityRequest {
    pub vehicle_id: i64,
    pub priority: i32,
}

/// POST /favorites/update-priority
pub async fn update_priority<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<UpdatePriorityRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let user = require_user(&identity)?;
    validate::favorite_input(None, req.priority)?;
    if !state
        .store
        .update_priority(user.account_id, req.vehicle_id, req.priority)?
    {
        return Err(AppError::NotFound("favorite"));
    }
    Ok(Json(json!({ "success": true })))
}

/// GET /favorites/recent
pub async fn recent<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<serde_json::Value>, AppError> {
    let user = require_user(&identity)?;
    let favorites = state.store.recent_favorites(user.account_id, 5)?;
    Ok(Json(json!({
        "success": true,
        "count": favorites.len(),
        "favorites": favorites,
    })))
}

/// GET /favorites/stats
pub async fn stats<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<serde_json::Value>, AppError> {
    let user = require_user(&identity)?;
    let stats = state.store.favorite_stats(user.account_id)?;
    Ok(Json(json!({ "success": true, "stats": stats })))
}

/// Quote a CSV field, doubling embedded quotes
fn csv_quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn csv_row(favorite: &FavoriteVehicle) -> String {
    [
        favorite.vehicle.inv_id.to_string(),
        favorite.vehicle.year.to_string(),
        csv_quote(&favorite.vehicle.make),
        csv_quote(&favorite.vehicle.model),
        csv_quote(&favorite.classification_name),
        favorite.vehicle.price.to_string(),
        favorite.vehicle.miles.to_string(),
        csv_quote(&favorite.vehicle.color),
        favorite.priority.to_string(),
        csv_quote(favorite.notes.as_deref().unwrap_or("")),
        favorite.created_at.format("%Y-%m-%d").to_string(),
    ]
    .join(",")
}

/// GET /favorites/export
///
/// Downloads the caller's favorites as CSV.
pub async fn export_csv<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, AppError> {
    let user = require_user(&identity)?;

    // No pagination for export
    let (favorites, _) = state.store.list_favorites(user.account_id, 1000, 0)?;

    let header = "Vehicle ID,Year,Make,Model,Classification,Price,Mileage,Color,Priority,Notes,Date Added";
    let mut lines = vec![header.to_string()];
    lines.extend(favorites.iter().map(csv_row));
    let body = lines.join("\n");

    let filename = format!(
        "carlot-favorites-{}.csv",
        chrono::Utc::now().format("%Y-%m-%d")
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    ))
}
