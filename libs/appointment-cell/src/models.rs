// libs/appointment-cell/src/models.rs
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use doctor_cell::ScheduleError;
use notification_cell::Recipient;
use shared_database::StoreError;

/// How long past its start a still-scheduled appointment is given before it
/// counts as missed.
pub const GRACE_PERIOD_MINUTES: i64 = 15;

pub fn grace_period() -> Duration {
    Duration::minutes(GRACE_PERIOD_MINUTES)
}

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

/// Stored appointment record (snake_case columns in the `appointments` table).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: String,
    pub doctor_id: String,
    pub scheduled_time: DateTime<Utc>,
    #[serde(default)]
    pub status: AppointmentStatus,
    #[serde(default)]
    pub notification_sent: bool,
}

impl Appointment {
    pub fn new(
        patient_id: impl Into<String>,
        doctor_id: impl Into<String>,
        scheduled_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            patient_id: patient_id.into(),
            doctor_id: doctor_id.into(),
            scheduled_time,
            status: AppointmentStatus::Scheduled,
            notification_sent: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    Missed,
    Completed,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::Missed => write!(f, "missed"),
            AppointmentStatus::Completed => write!(f, "completed"),
        }
    }
}

/// Contact details for a patient, read from the `patients` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientContact {
    #[serde(rename = "id")]
    pub patient_id: String,
    pub email: Option<String>,
    pub phone_number: Option<String>,
}

impl From<PatientContact> for Recipient {
    fn from(contact: PatientContact) -> Self {
        Recipient::new(contact.email, contact.phone_number)
    }
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RebookRequest {
    #[serde(default)]
    pub appointment_id: Option<String>,
    #[serde(default)]
    pub new_slot: Option<String>,
}

/// Appointment as returned over the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentResponse {
    pub id: Uuid,
    pub patient_id: String,
    pub doctor_id: String,
    pub scheduled_time: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub notification_sent: bool,
}

impl From<Appointment> for AppointmentResponse {
    fn from(appointment: Appointment) -> Self {
        Self {
            id: appointment.id,
            patient_id: appointment.patient_id,
            doctor_id: appointment.doctor_id,
            scheduled_time: appointment.scheduled_time,
            status: appointment.status,
            notification_sent: appointment.notification_sent,
        }
    }
}

/// Summary of one reconciliation tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReconciliationReport {
    pub scanned: usize,
    pub marked_missed: usize,
    pub notified: usize,
    pub notification_failures: usize,
    pub skipped: usize,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, Error, PartialEq)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Appointment is {0}, only missed appointments can be rebooked")]
    InvalidState(AppointmentStatus),

    #[error("No schedule found for doctor {doctor_id}")]
    ScheduleNotFound { doctor_id: String },

    #[error("Slot {0} is not available")]
    SlotUnavailable(DateTime<Utc>),

    #[error("Store failure: {0}")]
    StoreFailure(String),
}

impl From<StoreError> for AppointmentError {
    fn from(err: StoreError) -> Self {
        AppointmentError::StoreFailure(err.to_string())
    }
}

impl From<ScheduleError> for AppointmentError {
    fn from(err: ScheduleError) -> Self {
        match err {
            ScheduleError::NotFound { doctor_id } => AppointmentError::ScheduleNotFound { doctor_id },
            ScheduleError::SlotUnavailable { slot } => AppointmentError::SlotUnavailable(slot),
            contention @ ScheduleError::Contention { .. } => {
                AppointmentError::StoreFailure(contention.to_string())
            }
            ScheduleError::Store(store) => store.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_response_uses_camel_case() {
        let appointment = Appointment::new("p1", "doc1", now());
        let json = serde_json::to_value(AppointmentResponse::from(appointment)).unwrap();

        assert_eq!(json["patientId"], "p1");
        assert_eq!(json["doctorId"], "doc1");
        assert_eq!(json["status"], "scheduled");
        assert_eq!(json["notificationSent"], false);
        assert_eq!(json["scheduledTime"], "2025-03-10T12:00:00Z");
    }

    #[test]
    fn test_schedule_errors_map_to_rebooking_failures() {
        let slot = now();
        assert_eq!(
            AppointmentError::from(ScheduleError::SlotUnavailable { slot }),
            AppointmentError::SlotUnavailable(slot)
        );
        assert_eq!(
            AppointmentError::from(ScheduleError::NotFound { doctor_id: "doc1".to_string() }),
            AppointmentError::ScheduleNotFound { doctor_id: "doc1".to_string() }
        );
    }
}
