// libs/doctor-cell/src/services/store.rs
use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::debug;

use shared_config::AppConfig;
use shared_database::{StoreError, SupabaseClient};

use crate::models::DoctorSchedule;

/// Persistence for doctor schedules, keyed by doctor id.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    async fn find_by_doctor(&self, doctor_id: &str) -> Result<Option<DoctorSchedule>, StoreError>;

    /// Replace the stored schedule with `next` only if its version is still
    /// `expected_version`. Returns false when another writer got there first.
    async fn compare_and_swap(
        &self,
        expected_version: u64,
        next: &DoctorSchedule,
    ) -> Result<bool, StoreError>;
}

pub struct SupabaseScheduleStore {
    supabase: SupabaseClient,
}

impl SupabaseScheduleStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }
}

#[async_trait]
impl ScheduleStore for SupabaseScheduleStore {
    async fn find_by_doctor(&self, doctor_id: &str) -> Result<Option<DoctorSchedule>, StoreError> {
        debug!("Fetching schedule for doctor: {}", doctor_id);

        let path = format!(
            "/rest/v1/doctor_schedules?doctor_id=eq.{}&limit=1",
            urlencoding::encode(doctor_id)
        );
        let result: Vec<Value> = self.supabase.request(Method::GET, &path, None).await?;

        match result.into_iter().next() {
            Some(row) => Ok(Some(serde_json::from_value(row)?)),
            None => Ok(None),
        }
    }

    async fn compare_and_swap(
        &self,
        expected_version: u64,
        next: &DoctorSchedule,
    ) -> Result<bool, StoreError> {
        debug!(
            "Updating schedule for doctor {} (version {} -> {})",
            next.doctor_id, expected_version, next.version
        );

        let path = format!(
            "/rest/v1/doctor_schedules?doctor_id=eq.{}&version=eq.{}",
            urlencoding::encode(&next.doctor_id),
            expected_version
        );
        let body = json!({
            "available_slots": next.available_slots,
            "version": next.version,
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

/// Process-local schedule store. Backs the test suites and local runs without
/// a database.
#[derive(Default)]
pub struct InMemoryScheduleStore {
    schedules: RwLock<HashMap<String, DoctorSchedule>>,
}

impl InMemoryScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, schedule: DoctorSchedule) {
        self.schedules
            .write()
            .await
            .insert(schedule.doctor_id.clone(), schedule);
    }
}

#[async_trait]
impl ScheduleStore for InMemoryScheduleStore {
    async fn find_by_doctor(&self, doctor_id: &str) -> Result<Option<DoctorSchedule>, StoreError> {
        Ok(self.schedules.read().await.get(doctor_id).cloned())
    }

    async fn compare_and_swap(
        &self,
        expected_version: u64,
        next: &DoctorSchedule,
    ) -> Result<bool, StoreError> {
        let mut schedules = self.schedules.write().await;

        match schedules.get_mut(&next.doctor_id) {
            Some(current) if current.version == expected_version => {
                *current = next.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
