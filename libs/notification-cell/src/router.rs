use std::sync::Arc;

use axum::{
    Router,
    routing::post,
};

use crate::handlers;
use crate::services::NotificationGateway;

pub fn notification_routes(gateway: Arc<NotificationGateway>) -> Router {
    Router::new()
        .route("/test-notification", post(handlers::send_test_notification))
        .with_state(gateway)
}
