// =====================================================================================
// APPOINTMENT CELL - NO-SHOW RECONCILIATION & REBOOKING
// =====================================================================================
//
// A background worker marks appointments missed once the grace period has passed
// and notifies the patient with the doctor's open slots. The rebook endpoint moves
// a missed appointment onto one of those slots.
//
// =====================================================================================

pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::*;
pub use services::*;

pub use router::appointment_routes;
