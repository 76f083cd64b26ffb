//! Contact-form submission and staff review

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tower_cookies::Cookies;

use super::validate;
use crate::error::AppError;
use crate::flash;
use crate::state::AppState;
use crate::store::{NewContactSubmission, Store};

fn default_preferred_contact() -> String {
    "email".to_string()
}

#[derive(Deserialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    pub message: String,
    #[serde(default)]
    pub vehicle_id: Option<i64>,
    #[serde(default = "default_preferred_contact")]
    pub preferred_contact: String,
    #[serde(default)]
    pub newsletter: bool,
}

/// POST /contact
///
/// Public. When the sender references a vehicle the reference must
/// resolve.
pub async fn submit<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    cookies: Cookies,
    Json(req): Json<ContactRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    validate::contact(&req.name, &req.email, &req.message)?;

    if let Some(vehicle_id) = req.vehicle_id {
        if state.store.get_vehicle(vehicle_id)?.is_none() {
            return Err(AppError::NotFound("vehicle"));
        }
    }

    let submission = state.store.create_submission(NewContactSubmission {
        name: req.name.trim().to_string(),
        email: req.email.trim().to_lowercase(),
        phone: req.phone.as_deref().map(|p| p.trim().to_string()),
        subject: req.subject.as_deref().map(|s| s.trim().to_string()),
        message: req.message.trim().to_string(),
        vehicle_id: req.vehicle_id,
        preferred_contact: req.preferred_contact,
        newsletter: req.newsletter,
    })?;

    flash::queue(
        &state.store,
        &cookies,
        &state.session_key,
        "notice",
        "Thanks for reaching out! We will get back to you shortly.",
    );

    tracing::info!(contact_id = submission.contact_id, "contact submission received");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "contact_id": submission.contact_id })),
    ))
}

/// GET /admin/contact/submissions (staff)
pub async fn list<S: Store>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<serde_json::Value>, AppError> {
    let submissions = state.store.list_submissions()?;
    Ok(Json(json!({
        "success": true,
        "count": submissions.len(),
        "submissions": submissions,
    })))
}

/// GET /admin/contact/submission/:contact_id (staff)
pub async fn detail<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Path(contact_id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    let submission = state
        .store
        .get_submission(contact_id)?
        .ok_or(AppError::NotFound("submission"))?;
    Ok(Json(json!({ "success": true, "submission": submission })))
}

#[derive(Deserialize)]
pub struct SubmissionRef {
    pub contact_id: i64,
}

/// POST /admin/contact/mark-read (staff)
pub async fn mark_read<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<SubmissionRef>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !state.store.mark_read(req.contact_id)? {
        return Err(AppError::NotFound("submission"));
    }
    Ok(Json(json!({ "success": true })))
}

/// POST /admin/contact/delete (admin only)
pub async fn delete<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<SubmissionRef>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !state.store.delete_submission(req.contact_id)? {
        return Err(AppError::NotFound("submission"));
    }
    tracing::info!(contact_id = req.contact_id, "contact submission deleted");
    Ok(Json(json!({ "success": true })))
}
