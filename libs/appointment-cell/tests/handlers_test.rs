use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{DateTime, Utc};
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

use appointment_cell::{
    appointment_routes, Appointment, AppointmentStatus, AppointmentStore, InMemoryAppointmentStore,
    RebookingService,
};
use doctor_cell::{DoctorSchedule, InMemoryScheduleStore, ScheduleService};
use shared_database::StoreError;
use shared_utils::test_utils::TestClock;

struct UnavailableStore;

#[async_trait]
impl AppointmentStore for UnavailableStore {
    async fn find_by_id(&self, _id: Uuid) -> Result<Option<Appointment>, StoreError> {
        Err(StoreError::Request("HTTP 503".to_string()))
    }

    async fn find_scheduled_before(&self, _cutoff: DateTime<Utc>) -> Result<Vec<Appointment>, StoreError> {
        Err(StoreError::Request("HTTP 503".to_string()))
    }

    async fn find_by_patient(
        &self,
        _patient_id: &str,
        _status: AppointmentStatus,
    ) -> Result<Vec<Appointment>, StoreError> {
        Err(StoreError::Request("HTTP 503".to_string()))
    }

    async fn update_if_status(
        &self,
        _expected: AppointmentStatus,
        _next: &Appointment,
    ) -> Result<bool, StoreError> {
        Err(StoreError::Request("HTTP 503".to_string()))
    }
}

async fn setup_router() -> (axum::Router, Appointment) {
    let appointments = Arc::new(InMemoryAppointmentStore::new());
    let schedules = Arc::new(InMemoryScheduleStore::new());
    schedules
        .insert(DoctorSchedule::new(
            "doc1",
            vec![TestClock::slot(1, 9), TestClock::slot(1, 10)],
        ))
        .await;

    let missed = Appointment {
        status: AppointmentStatus::Missed,
        ..Appointment::new("p1", "doc1", TestClock::minutes_ago(20))
    };
    appointments.insert(missed.clone()).await;

    let service = RebookingService::new(appointments, Arc::new(ScheduleService::new(schedules)));
    (appointment_routes(Arc::new(service)), missed)
}

fn unavailable_router() -> axum::Router {
    let schedules = Arc::new(InMemoryScheduleStore::new());
    let service = RebookingService::new(
        Arc::new(UnavailableStore),
        Arc::new(ScheduleService::new(schedules)),
    );
    appointment_routes(Arc::new(service))
}

fn rebook_request(body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/rebook")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_rebook_success() {
    let (app, missed) = setup_router().await;

    let response = app
        .oneshot(rebook_request(json!({
            "appointmentId": missed.id.to_string(),
            "newSlot": "2025-03-11T09:00:00Z"
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["message"], "Appointment rescheduled successfully");
    assert_eq!(json["appointment"]["id"], missed.id.to_string());
    assert_eq!(json["appointment"]["status"], "scheduled");
    assert_eq!(json["appointment"]["scheduledTime"], "2025-03-11T09:00:00Z");
}

#[tokio::test]
async fn test_rebook_accepts_offset_timestamps() {
    let (app, missed) = setup_router().await;

    let response = app
        .oneshot(rebook_request(json!({
            "appointmentId": missed.id.to_string(),
            "newSlot": "2025-03-11T11:00:00+01:00"
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_rebook_slot_not_offered() {
    let (app, missed) = setup_router().await;

    let response = app
        .oneshot(rebook_request(json!({
            "appointmentId": missed.id.to_string(),
            "newSlot": "2025-03-12T09:00:00Z"
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "Slot not available");
}

#[tokio::test]
async fn test_rebook_unknown_appointment() {
    let (app, _) = setup_router().await;

    let response = app
        .oneshot(rebook_request(json!({
            "appointmentId": Uuid::new_v4().to_string(),
            "newSlot": "2025-03-11T09:00:00Z"
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "Invalid or non-missed appointment");
}

#[tokio::test]
async fn test_rebook_malformed_input() {
    let (app, missed) = setup_router().await;

    let bad_id = app
        .clone()
        .oneshot(rebook_request(json!({
            "appointmentId": "not-a-uuid",
            "newSlot": "2025-03-11T09:00:00Z"
        })))
        .await
        .unwrap();
    assert_eq!(bad_id.status(), StatusCode::BAD_REQUEST);

    let bad_slot = app
        .oneshot(rebook_request(json!({
            "appointmentId": missed.id.to_string(),
            "newSlot": "tomorrow at nine"
        })))
        .await
        .unwrap();
    assert_eq!(bad_slot.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(bad_slot).await["message"], "Invalid slot timestamp");
}

#[tokio::test]
async fn test_rebook_store_failure_is_server_error() {
    let response = unavailable_router()
        .oneshot(rebook_request(json!({
            "appointmentId": Uuid::new_v4().to_string(),
            "newSlot": "2025-03-11T09:00:00Z"
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_get_missed_appointments() {
    let (app, missed) = setup_router().await;

    let request = Request::builder()
        .method("GET")
        .uri("/missedAppointments/p1")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let list = json["missedAppointments"].as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["id"], missed.id.to_string());
    assert_eq!(list[0]["patientId"], "p1");
    assert_eq!(list[0]["status"], "missed");
}

#[tokio::test]
async fn test_get_missed_appointments_none_found() {
    let (app, _) = setup_router().await;

    let request = Request::builder()
        .method("GET")
        .uri("/missedAppointments/p2")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(response).await["message"],
        "No missed appointments found for this patient"
    );
}

#[tokio::test]
async fn test_get_missed_appointments_store_error() {
    let request = Request::builder()
        .method("GET")
        .uri("/missedAppointments/p1")
        .body(Body::empty())
        .unwrap();

    let response = unavailable_router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["message"], "Server error");
}

#[tokio::test]
async fn test_rebook_empty_body_is_bad_request() {
    let (app, _) = setup_router().await;

    let response = app.oneshot(rebook_request(json!({}))).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "Invalid or non-missed appointment");
}

#[tokio::test]
async fn test_rebook_missing_slot_is_bad_request() {
    let (app, missed) = setup_router().await;

    let response = app
        .oneshot(rebook_request(json!({ "appointmentId": missed.id.to_string() })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "Invalid slot timestamp");
}

#[tokio::test]
async fn test_rebook_wrongly_typed_body_is_bad_request() {
    let (app, _) = setup_router().await;

    let response = app
        .oneshot(rebook_request(json!({
            "appointmentId": 5,
            "newSlot": "2025-03-11T09:00:00Z"
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["message"].is_string());
}
