use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::Value;

use crate::db::queries;
use crate::errors::AppError;
use crate::handlers::{json_body, path_id, success, success_with_message};
use crate::models::service::ServiceRequest;
use crate::services::{catalog, scheduling};
use crate::state::AppState;

// GET /api/services
pub async fn list_services(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    let services = {
        let db = state.db()?;
        queries::list_services(&db)?
    };
    Ok(success(services))
}

// GET /api/services/:id
pub async fn get_service(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = path_id(&id, "service")?;
    let service = {
        let db = state.db()?;
        scheduling::find_service(&db, id)?
    };
    Ok(success(service))
}

// POST /api/services
pub async fn create_service(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ServiceRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let new = json_body(payload)?.validate()?;

    let service = {
        let db = state.db()?;
        catalog::create_service(&db, &new)?
    };

    Ok((
        StatusCode::CREATED,
        success_with_message("service created", service),
    ))
}

// PUT /api/services/:id
pub async fn update_service(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<ServiceRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let id = path_id(&id, "service")?;
    let patch = json_body(payload)?.validate_patch()?;

    let service = {
        let mut db = state.db()?;
        catalog::update_service(&mut db, id, patch)?
    };

    Ok(success_with_message("service updated", service))
}

// DELETE /api/services/:id
pub async fn delete_service(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = path_id(&id, "service")?;

    {
        let db = state.db()?;
        catalog::delete_service(&db, id)?;
    }

    Ok(Json(serde_json::json!({ "success": true, "message": "service deleted" })))
}
