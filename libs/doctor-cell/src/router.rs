use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use crate::handlers;
use crate::services::ScheduleService;

pub fn schedule_routes(service: Arc<ScheduleService>) -> Router {
    Router::new()
        .route("/slots/{doctor_id}", get(handlers::get_available_slots))
        .with_state(service)
}
