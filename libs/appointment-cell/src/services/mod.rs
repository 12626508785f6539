pub mod contacts;
pub mod lifecycle;
pub mod rebooking;
pub mod reconciliation;
pub mod store;

pub use contacts::{ContactDirectory, InMemoryContactDirectory, SupabaseContactDirectory};
pub use lifecycle::AppointmentLifecycleService;
pub use rebooking::RebookingService;
pub use reconciliation::{compose_missed_message, ReconciliationService, ReconciliationWorker};
pub use store::{AppointmentStore, InMemoryAppointmentStore, SupabaseAppointmentStore};
