use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use tower::ServiceExt;

use doctor_cell::{schedule_routes, DoctorSchedule, InMemoryScheduleStore, ScheduleService};
use shared_utils::test_utils::TestClock;

async fn setup_router() -> axum::Router {
    let store = Arc::new(InMemoryScheduleStore::new());
    store
        .insert(DoctorSchedule::new(
            "doc1",
            vec![TestClock::slot(1, 9), TestClock::slot(1, 10)],
        ))
        .await;

    schedule_routes(Arc::new(ScheduleService::new(store)))
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_get_available_slots() {
    let app = setup_router().await;

    let request = Request::builder()
        .method("GET")
        .uri("/slots/doc1")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let slots = json["availableSlots"].as_array().unwrap();
    assert_eq!(slots.len(), 2);
    assert_eq!(slots[0], "2025-03-11T09:00:00Z");
}

#[tokio::test]
async fn test_get_available_slots_unknown_doctor() {
    let app = setup_router().await;

    let request = Request::builder()
        .method("GET")
        .uri("/slots/doc404")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert_eq!(json["message"], "No schedule found for this doctor");
}
