use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use appointment_cell::{appointment_routes, RebookingService};
use doctor_cell::{schedule_routes, ScheduleService};
use notification_cell::{notification_routes, NotificationGateway};

/// Services the HTTP surface is built from.
#[derive(Clone)]
pub struct AppState {
    pub schedules: Arc<ScheduleService>,
    pub rebooking: Arc<RebookingService>,
    pub notifications: Arc<NotificationGateway>,
}

pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .merge(schedule_routes(state.schedules))
        .merge(appointment_routes(state.rebooking))
        .merge(notification_routes(state.notifications));

    Router::new()
        .route("/", get(|| async { "Appointment rebooking API is running!" }))
        .nest("/api", api)
}
