// libs/doctor-cell/src/services/schedule.rs
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use crate::models::{DoctorSchedule, ScheduleError};
use crate::services::store::ScheduleStore;

/// Attempts at a version-guarded write before giving up on a slot.
pub const MAX_SWAP_ATTEMPTS: usize = 3;

pub struct ScheduleService {
    store: Arc<dyn ScheduleStore>,
}

impl ScheduleService {
    pub fn new(store: Arc<dyn ScheduleStore>) -> Self {
        Self { store }
    }

    pub async fn find_schedule(&self, doctor_id: &str) -> Result<Option<DoctorSchedule>, ScheduleError> {
        Ok(self.store.find_by_doctor(doctor_id).await?)
    }

    pub async fn get_schedule(&self, doctor_id: &str) -> Result<DoctorSchedule, ScheduleError> {
        self.find_schedule(doctor_id)
            .await?
            .ok_or_else(|| ScheduleError::NotFound {
                doctor_id: doctor_id.to_string(),
            })
    }

    pub async fn available_slots(&self, doctor_id: &str) -> Result<Vec<DateTime<Utc>>, ScheduleError> {
        debug!("Looking up available slots for doctor: {}", doctor_id);
        Ok(self.get_schedule(doctor_id).await?.available_slots)
    }

    /// Remove `slot` from the doctor's offered set. Concurrent reservations of
    /// the same slot are serialized by the version check; the loser sees
    /// `SlotUnavailable`.
    #[instrument(skip(self))]
    pub async fn reserve_slot(
        &self,
        doctor_id: &str,
        slot: DateTime<Utc>,
    ) -> Result<DoctorSchedule, ScheduleError> {
        for attempt in 1..=MAX_SWAP_ATTEMPTS {
            let current = self.get_schedule(doctor_id).await?;

            if !current.offers(&slot) {
                return Err(ScheduleError::SlotUnavailable { slot });
            }

            let next = current.without_slot(&slot);
            if self.store.compare_and_swap(current.version, &next).await? {
                info!("Reserved slot {} for doctor {}", slot, doctor_id);
                return Ok(next);
            }

            debug!(
                "Schedule for doctor {} changed during reservation (attempt {}/{})",
                doctor_id, attempt, MAX_SWAP_ATTEMPTS
            );
        }

        warn!("Gave up reserving slot {} for doctor {} under contention", slot, doctor_id);
        Err(ScheduleError::SlotUnavailable { slot })
    }

    /// Put `slot` back on offer. Used to undo a reservation whose booking
    /// write did not go through.
    #[instrument(skip(self))]
    pub async fn release_slot(
        &self,
        doctor_id: &str,
        slot: DateTime<Utc>,
    ) -> Result<DoctorSchedule, ScheduleError> {
        for attempt in 1..=MAX_SWAP_ATTEMPTS {
            let current = self.get_schedule(doctor_id).await?;

            if current.offers(&slot) {
                return Ok(current);
            }

            let next = current.with_slot(slot);
            if self.store.compare_and_swap(current.version, &next).await? {
                info!("Released slot {} back to doctor {}", slot, doctor_id);
                return Ok(next);
            }

            debug!(
                "Schedule for doctor {} changed during release (attempt {}/{})",
                doctor_id, attempt, MAX_SWAP_ATTEMPTS
            );
        }

        warn!("Could not release slot {} for doctor {}", slot, doctor_id);
        Err(ScheduleError::Contention {
            doctor_id: doctor_id.to_string(),
        })
    }
}
