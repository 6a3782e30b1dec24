use std::sync::Arc;

use anyhow::anyhow;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde_json::Value;

use crate::db::queries;
use crate::errors::AppError;
use crate::handlers::{json_body, success, success_with_message};
use crate::models::profile::ProfileRequest;
use crate::state::AppState;

// GET /api/profile
pub async fn get_profile(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    let profile = {
        let db = state.db()?;
        queries::get_profile(&db)?
    };

    // Bootstrapped by db::init_db.
    let profile = profile.ok_or_else(|| AppError::Internal(anyhow!("clinic profile missing")))?;
    Ok(success(profile))
}

// PUT /api/profile
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ProfileRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let update = json_body(payload)?.validate()?;

    let profile = {
        let db = state.db()?;
        queries::save_profile(&db, &update)?;
        queries::get_profile(&db)?
    };

    let profile = profile.ok_or_else(|| AppError::Internal(anyhow!("clinic profile missing after save")))?;
    tracing::info!(clinic = %profile.clinic_name, "profile updated");
    Ok(success_with_message("profile updated", profile))
}
