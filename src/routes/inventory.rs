//! Inventory browsing (public) and management CRUD (staff-gated)

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::json;
use tower_cookies::Cookies;

use super::validate;
use crate::error::AppError;
use crate::flash;
use crate::identity::Identity;
use crate::state::AppState;
use crate::store::{NewVehicle, Store, Vehicle};

/// GET /inv/classifications
pub async fn classifications<S: Store>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<serde_json::Value>, AppError> {
    let all = state.store.list_classifications()?;
    Ok(Json(json!({ "success": true, "classifications": all })))
}

/// GET /inv/type/:classification_id
pub async fn by_classification<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Path(classification_id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    let classification = state
        .store
        .list_classifications()?
        .into_iter()
        .find(|c| c.classification_id == classification_id)
        .ok_or(AppError::NotFound("classification"))?;

    let vehicles = state.store.list_by_classification(classification_id)?;
    Ok(Json(json!({
        "success": true,
        "classification": classification,
        "vehicles": vehicles,
    })))
}

/// GET /inv/detail/:inv_id
///
/// Public detail data, plus the caller's favorite flag when a request
/// identity is present.
pub async fn detail<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Extension(identity): Extension<Identity>,
    Path(inv_id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    let detail = state
        .store
        .vehicle_detail(inv_id)?
        .ok_or(AppError::NotFound("vehicle"))?;

    let favorite_count = state.store.vehicle_favorite_count(inv_id)?;
    let is_favorite = match &identity.0 {
        Some(user) => state.store.is_favorite(user.account_id, inv_id)?,
        None => false,
    };

    Ok(Json(json!({
        "success": true,
        "vehicle": detail,
        "favorite_count": favorite_count,
        "is_favorite": is_favorite,
        "authenticated": identity.0.is_some(),
    })))
}

#[derive(Deserialize)]
pub struct AddClassificationRequest {
    pub classification_name: String,
}

/// POST /inv/add-classification (staff)
pub async fn add_classification<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    cookies: Cookies,
    Json(req): Json<AddClassificationRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate::classification_name(&req.classification_name)?;

    let classification = state
        .store
        .add_classification(req.classification_name.trim())?;

    flash::queue(
        &state.store,
        &cookies,
        &state.session_key,
        "success",
        &format!(
            "Classification \"{}\" added.",
            classification.classification_name
        ),
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "classification": classification })),
    ))
}

/// POST /inv/add (staff)
pub async fn add_vehicle<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    cookies: Cookies,
    Json(req): Json<NewVehicle>,
) -> Result<impl IntoResponse, AppError> {
    validate::vehicle_fields(&req.make, &req.model, req.year, &req.color, req.price, req.miles)?;

    // The classification must exist before anything hangs off it
    let known = state
        .store
        .list_classifications()?
        .iter()
        .any(|c| c.classification_id == req.classification_id);
    if !known {
        return Err(AppError::NotFound("classification"));
    }

    let vehicle = state.store.add_vehicle(req)?;

    flash::queue(
        &state.store,
        &cookies,
        &state.session_key,
        "success",
        &format!("{} {} added to inventory.", vehicle.make, vehicle.model),
    );

    tracing::info!(inv_id = vehicle.inv_id, "vehicle added");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "vehicle": vehicle })),
    ))
}

/// POST /inv/update (staff)
pub async fn update_vehicle<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<Vehicle>,
) -> Result<Json<serde_json::Value>, AppError> {
    validate::vehicle_fields(&req.make, &req.model, req.year, &req.color, req.price, req.miles)?;

    let vehicle = state
        .store
        .update_vehicle(req)?
        .ok_or(AppError::NotFound("vehicle"))?;

    Ok(Json(json!({ "success": true, "vehicle": vehicle })))
}

#[derive(Deserialize)]
pub struct DeleteVehicleRequest {
    pub inv_id: i64,
}

/// POST /inv/delete (staff)
pub async fn delete_vehicle<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<DeleteVehicleRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !state.store.delete_vehicle(req.inv_id)? {
        return Err(AppError::NotFound("vehicle"));
    }
    tracing::info!(inv_id = req.inv_id, "vehicle deleted");
    Ok(Json(json!({ "success": true })))
}
