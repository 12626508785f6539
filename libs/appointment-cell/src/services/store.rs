// libs/appointment-cell/src/services/store.rs
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Method;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::{StoreError, SupabaseClient};

use crate::models::{Appointment, AppointmentStatus};

#[async_trait]
pub trait AppointmentStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Appointment>, StoreError>;

    /// Appointments still `scheduled` whose start is strictly before `cutoff`.
    async fn find_scheduled_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<Appointment>, StoreError>;

    async fn find_by_patient(
        &self,
        patient_id: &str,
        status: AppointmentStatus,
    ) -> Result<Vec<Appointment>, StoreError>;

    /// Overwrite the record with `next` only if it is still in `expected`
    /// status. Returns false when the record moved on (or vanished).
    async fn update_if_status(
        &self,
        expected: AppointmentStatus,
        next: &Appointment,
    ) -> Result<bool, StoreError>;
}

pub struct SupabaseAppointmentStore {
    supabase: SupabaseClient,
}

impl SupabaseAppointmentStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    fn decode(rows: Vec<Value>) -> Result<Vec<Appointment>, StoreError> {
        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(StoreError::from))
            .collect()
    }
}

#[async_trait]
impl AppointmentStore for SupabaseAppointmentStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Appointment>, StoreError> {
        debug!("Fetching appointment: {}", id);

        let path = format!("/rest/v1/appointments?id=eq.{}", id);
        let result: Vec<Value> = self.supabase.request(Method::GET, &path, None).await?;

        Ok(Self::decode(result)?.into_iter().next())
    }

    async fn find_scheduled_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<Appointment>, StoreError> {
        let cutoff = cutoff.to_rfc3339_opts(SecondsFormat::Millis, true);
        debug!("Fetching scheduled appointments before {}", cutoff);

        let path = format!(
            "/rest/v1/appointments?status=eq.{}&scheduled_time=lt.{}&order=scheduled_time.asc",
            AppointmentStatus::Scheduled,
            urlencoding::encode(&cutoff)
        );
        let result: Vec<Value> = self.supabase.request(Method::GET, &path, None).await?;

        Self::decode(result)
    }

    async fn find_by_patient(
        &self,
        patient_id: &str,
        status: AppointmentStatus,
    ) -> Result<Vec<Appointment>, StoreError> {
        debug!("Fetching {} appointments for patient {}", status, patient_id);

        let path = format!(
            "/rest/v1/appointments?patient_id=eq.{}&status=eq.{}&order=scheduled_time.asc",
            urlencoding::encode(patient_id),
            status
        );
        let result: Vec<Value> = self.supabase.request(Method::GET, &path, None).await?;

        Self::decode(result)
    }

    async fn update_if_status(
        &self,
        expected: AppointmentStatus,
        next: &Appointment,
    ) -> Result<bool, StoreError> {
        debug!(
            "Updating appointment {} ({} -> {})",
            next.id, expected, next.status
        );

        let path = format!("/rest/v1/appointments?id=eq.{}&status=eq.{}", next.id, expected);
        let body = json!({
            "scheduled_time": next.scheduled_time,
            "status": next.status,
            "notification_sent": next.notification_sent,
        });

        let updated: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(body),
                Some(SupabaseClient::representation_headers()),
            )
            .await?;

        Ok(!updated.is_empty())
    }
}

#[derive(Default)]
pub struct InMemoryAppointmentStore {
    appointments: RwLock<HashMap<Uuid, Appointment>>,
}

impl InMemoryAppointmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, appointment: Appointment) {
        self.appointments
            .write()
            .await
            .insert(appointment.id, appointment);
    }
}

#[async_trait]
impl AppointmentStore for InMemoryAppointmentStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Appointment>, StoreError> {
        Ok(self.appointments.read().await.get(&id).cloned())
    }

    async fn find_scheduled_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<Appointment>, StoreError> {
        let mut due: Vec<Appointment> = self
            .appointments
            .read()
            .await
            .values()
            .filter(|a| a.status == AppointmentStatus::Scheduled && a.scheduled_time < cutoff)
            .cloned()
            .collect();
        due.sort_by_key(|a| a.scheduled_time);
        Ok(due)
    }

    async fn find_by_patient(
        &self,
        patient_id: &str,
        status: AppointmentStatus,
    ) -> Result<Vec<Appointment>, StoreError> {
        let mut found: Vec<Appointment> = self
            .appointments
            .read()
            .await
            .values()
            .filter(|a| a.patient_id == patient_id && a.status == status)
            .cloned()
            .collect();
        found.sort_by_key(|a| a.scheduled_time);
        Ok(found)
    }

    async fn update_if_status(
        &self,
        expected: AppointmentStatus,
        next: &Appointment,
    ) -> Result<bool, StoreError> {
        let mut appointments = self.appointments.write().await;

        match appointments.get_mut(&next.id) {
            Some(current) if current.status == expected => {
                *current = next.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
