use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

use shared_models::error::AppError;

use crate::models::ScheduleError;
use crate::services::ScheduleService;

#[axum::debug_handler]
pub async fn get_available_slots(
    State(service): State<Arc<ScheduleService>>,
    Path(doctor_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let slots = service.available_slots(&doctor_id).await
        .map_err(|e| match e {
            ScheduleError::NotFound { .. } => {
                AppError::NotFound("No schedule found for this doctor".to_string())
            },
            ScheduleError::Store(err) => AppError::Database(err.to_string()),
            _ => AppError::Internal(e.to_string()),
        })?;

    Ok(Json(json!({
        "availableSlots": slots
    })))
}
