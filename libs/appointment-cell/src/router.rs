use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::handlers;
use crate::services::RebookingService;

pub fn appointment_routes(service: Arc<RebookingService>) -> Router {
    Router::new()
        .route("/rebook", post(handlers::rebook_appointment))
        .route("/missedAppointments/{patient_id}", get(handlers::get_missed_appointments))
        .with_state(service)
}
