use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::{json, Value};

use shared_models::error::AppError;

use crate::models::{Recipient, TestNotificationRequest};
use crate::services::NotificationGateway;

/// Diagnostic endpoint: push one message through both channels and report
/// what each provider said.
#[axum::debug_handler]
pub async fn send_test_notification(
    State(gateway): State<Arc<NotificationGateway>>,
    payload: Result<Json<TestNotificationRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(request) = payload.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

    let recipient = Recipient::new(request.email, request.phone_number);
    let outcome = gateway.notify(&recipient, "Test Subject", &request.message).await;

    Ok(Json(json!({
        "emailResponse": outcome.email_response,
        "smsResponse": outcome.sms_response,
        "message": "Test notifications sent"
    })))
}
