// libs/appointment-cell/src/services/rebooking.rs
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use doctor_cell::ScheduleService;

use crate::models::{Appointment, AppointmentError, AppointmentStatus};
use crate::services::lifecycle::AppointmentLifecycleService;
use crate::services::store::AppointmentStore;

/// Moves missed appointments onto one of the doctor's offered slots.
pub struct RebookingService {
    appointments: Arc<dyn AppointmentStore>,
    schedules: Arc<ScheduleService>,
    lifecycle: AppointmentLifecycleService,
}

impl RebookingService {
    pub fn new(appointments: Arc<dyn AppointmentStore>, schedules: Arc<ScheduleService>) -> Self {
        Self {
            appointments,
            schedules,
            lifecycle: AppointmentLifecycleService::new(),
        }
    }

    /// Rebook a missed appointment onto `new_slot`.
    ///
    /// The slot is reserved on the schedule first. If the appointment write
    /// then fails or finds the appointment no longer missed, the slot is put
    /// back before the error is returned.
    #[instrument(skip(self))]
    pub async fn rebook(
        &self,
        appointment_id: Uuid,
        new_slot: DateTime<Utc>,
    ) -> Result<Appointment, AppointmentError> {
        let appointment = self
            .appointments
            .find_by_id(appointment_id)
            .await?
            .ok_or(AppointmentError::NotFound)?;

        if !self
            .lifecycle
            .can_transition(&appointment.status, &AppointmentStatus::Scheduled)
        {
            warn!(
                "Refusing to rebook appointment {} in status {}",
                appointment_id, appointment.status
            );
            return Err(AppointmentError::InvalidState(appointment.status));
        }

        self.schedules
            .reserve_slot(&appointment.doctor_id, new_slot)
            .await?;

        let rebooked = Appointment {
            scheduled_time: new_slot,
            status: AppointmentStatus::Scheduled,
            notification_sent: false,
            ..appointment
        };

        match self
            .appointments
            .update_if_status(AppointmentStatus::Missed, &rebooked)
            .await
        {
            Ok(true) => {
                info!("Appointment {} rebooked to {}", rebooked.id, new_slot);
                Ok(rebooked)
            }
            Ok(false) => {
                self.release_reserved_slot(&rebooked.doctor_id, new_slot).await;

                let status = match self.appointments.find_by_id(appointment_id).await {
                    Ok(Some(current)) => current.status,
                    Ok(None) => return Err(AppointmentError::NotFound),
                    Err(e) => return Err(e.into()),
                };
                debug!(
                    "Appointment {} moved to {} while being rebooked",
                    appointment_id, status
                );
                Err(AppointmentError::InvalidState(status))
            }
            Err(e) => {
                error!("Failed to persist rebooking of appointment {}: {}", appointment_id, e);
                self.release_reserved_slot(&rebooked.doctor_id, new_slot).await;
                Err(e.into())
            }
        }
    }

    async fn release_reserved_slot(&self, doctor_id: &str, slot: DateTime<Utc>) {
        if let Err(e) = self.schedules.release_slot(doctor_id, slot).await {
            error!(
                "Slot {} for doctor {} stays reserved after a failed rebooking: {}",
                slot, doctor_id, e
            );
        }
    }

    pub async fn missed_appointments(&self, patient_id: &str) -> Result<Vec<Appointment>, AppointmentError> {
        debug!("Fetching missed appointments for patient: {}", patient_id);

        Ok(self
            .appointments
            .find_by_patient(patient_id, AppointmentStatus::Missed)
            .await?)
    }
}
