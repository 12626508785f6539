// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use tracing::error;
use uuid::Uuid;

use shared_models::error::AppError;

use crate::models::{AppointmentError, AppointmentResponse, RebookRequest};
use crate::services::RebookingService;

#[axum::debug_handler]
pub async fn rebook_appointment(
    State(service): State<Arc<RebookingService>>,
    payload: Result<Json<RebookRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(request) = payload.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

    let appointment_id = request
        .appointment_id
        .as_deref()
        .and_then(|id| Uuid::parse_str(id.trim()).ok())
        .ok_or_else(|| AppError::BadRequest("Invalid or non-missed appointment".to_string()))?;

    let new_slot = request
        .new_slot
        .as_deref()
        .and_then(|slot| DateTime::parse_from_rfc3339(slot.trim()).ok())
        .map(|slot| slot.with_timezone(&Utc))
        .ok_or_else(|| AppError::BadRequest("Invalid slot timestamp".to_string()))?;

    let appointment = service
        .rebook(appointment_id, new_slot)
        .await
        .map_err(|e| match e {
            AppointmentError::NotFound | AppointmentError::InvalidState(_) => {
                AppError::BadRequest("Invalid or non-missed appointment".to_string())
            }
            AppointmentError::ScheduleNotFound { .. } => {
                AppError::BadRequest("No schedule found for this doctor".to_string())
            }
            AppointmentError::SlotUnavailable(_) => {
                AppError::BadRequest("Slot not available".to_string())
            }
            AppointmentError::StoreFailure(msg) => AppError::Database(msg),
        })?;

    Ok(Json(json!({
        "message": "Appointment rescheduled successfully",
        "appointment": AppointmentResponse::from(appointment)
    })))
}

#[axum::debug_handler]
pub async fn get_missed_appointments(
    State(service): State<Arc<RebookingService>>,
    Path(patient_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let missed = service.missed_appointments(&patient_id).await.map_err(|e| {
        error!("Failed to load missed appointments for patient {}: {}", patient_id, e);
        AppError::Internal("Server error".to_string())
    })?;

    if missed.is_empty() {
        return Err(AppError::NotFound(
            "No missed appointments found for this patient".to_string(),
        ));
    }

    let missed: Vec<AppointmentResponse> = missed.into_iter().map(AppointmentResponse::from).collect();

    Ok(Json(json!({
        "missedAppointments": missed
    })))
}
