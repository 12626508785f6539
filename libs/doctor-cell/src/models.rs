use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use shared_database::StoreError;

/// Offered slots for one doctor. `version` increases on every write and is
/// the compare-and-swap token for slot reservation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DoctorSchedule {
    pub doctor_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub available_slots: Vec<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub version: u64,
}

/// Columns may come back as explicit `null` rather than being absent.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl DoctorSchedule {
    pub fn new(doctor_id: impl Into<String>, available_slots: Vec<DateTime<Utc>>) -> Self {
        Self {
            doctor_id: doctor_id.into(),
            available_slots,
            version: 0,
        }
    }

    pub fn offers(&self, slot: &DateTime<Utc>) -> bool {
        self.available_slots.contains(slot)
    }

    pub fn has_availability(&self) -> bool {
        !self.available_slots.is_empty()
    }

    /// Next revision with `slot` removed (every duplicate of it).
    pub fn without_slot(&self, slot: &DateTime<Utc>) -> Self {
        Self {
            doctor_id: self.doctor_id.clone(),
            available_slots: self
                .available_slots
                .iter()
                .filter(|offered| *offered != slot)
                .copied()
                .collect(),
            version: self.version + 1,
        }
    }

    /// Next revision with `slot` offered again.
    pub fn with_slot(&self, slot: DateTime<Utc>) -> Self {
        let mut available_slots = self.available_slots.clone();
        if !available_slots.contains(&slot) {
            available_slots.push(slot);
            available_slots.sort();
        }

        Self {
            doctor_id: self.doctor_id.clone(),
            available_slots,
            version: self.version + 1,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScheduleError {
    #[error("No schedule found for doctor {doctor_id}")]
    NotFound { doctor_id: String },

    #[error("Slot {slot} is not available")]
    SlotUnavailable { slot: DateTime<Utc> },

    #[error("Schedule for doctor {doctor_id} kept changing during update")]
    Contention { doctor_id: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}
