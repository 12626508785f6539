use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use dotenv::dotenv;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::cors::{CorsLayer, Any};
use tower_http::trace::{self, TraceLayer};
use tracing::{Level, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod router;

use appointment_cell::{
    RebookingService, ReconciliationService, ReconciliationWorker, SupabaseAppointmentStore,
    SupabaseContactDirectory,
};
use doctor_cell::{ScheduleService, SupabaseScheduleStore};
use notification_cell::NotificationGateway;
use shared_config::AppConfig;

use router::AppState;

#[tokio::main]
async fn main() {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting appointment rebooking API server");

    // Load configuration
    let config = AppConfig::from_env();
    if !config.is_configured() {
        warn!("Document store is not configured; store calls will fail");
    }

    // Stores and services
    let appointments = Arc::new(SupabaseAppointmentStore::new(&config));
    let schedules = Arc::new(ScheduleService::new(Arc::new(SupabaseScheduleStore::new(&config))));
    let contacts = Arc::new(SupabaseContactDirectory::new(&config));
    let notifications = Arc::new(NotificationGateway::from_config(&config));

    let reconciliation = Arc::new(ReconciliationService::new(
        appointments.clone(),
        schedules.clone(),
        contacts,
        notifications.clone(),
    ));
    let rebooking = Arc::new(RebookingService::new(appointments, schedules.clone()));

    // Background reconciliation
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let worker = ReconciliationWorker::new(
        reconciliation,
        Duration::from_secs(config.reconciliation_interval_seconds),
    )
    .spawn(shutdown_rx);

    // Set up CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the application router
    let app = router::create_router(AppState {
        schedules,
        rebooking,
        notifications,
    })
    .layer(
        TraceLayer::new_for_http()
            .make_span_with(trace::DefaultMakeSpan::new()
                .level(Level::INFO))
            .on_response(trace::DefaultOnResponse::new()
                .level(Level::INFO)),
    )
    .layer(cors);

    // Run the server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Listening on {}", addr);

    match TcpListener::bind(addr).await {
        Ok(listener) => {
            if let Err(e) = axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await
            {
                error!("Server error: {}", e);
            }
        }
        Err(e) => error!("Failed to bind {}: {}", addr, e),
    }

    // Stop the worker; an in-flight tick is allowed to finish.
    let _ = shutdown_tx.send(true);
    if let Err(e) = worker.await {
        error!("Reconciliation worker exited abnormally: {}", e);
    }

    info!("Server stopped");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
