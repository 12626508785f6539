use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use shared_config::AppConfig;
use shared_database::{StoreError, SupabaseClient};

use crate::models::PatientContact;

/// Read-only lookup of where a patient can be reached.
#[async_trait]
pub trait ContactDirectory: Send + Sync {
    async fn find_contact(&self, patient_id: &str) -> Result<Option<PatientContact>, StoreError>;
}

pub struct SupabaseContactDirectory {
    supabase: SupabaseClient,
}

impl SupabaseContactDirectory {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }
}

#[async_trait]
impl ContactDirectory for SupabaseContactDirectory {
    async fn find_contact(&self, patient_id: &str) -> Result<Option<PatientContact>, StoreError> {
        debug!("Fetching contact details for patient: {}", patient_id);

        let path = format!(
            "/rest/v1/patients?id=eq.{}&select=id,email,phone_number",
            urlencoding::encode(patient_id)
        );
        let result: Vec<Value> = self.supabase.request(Method::GET, &path, None).await?;

        match result.into_iter().next() {
            Some(row) => Ok(Some(serde_json::from_value(row)?)),
            None => Ok(None),
        }
    }
}

#[derive(Default)]
pub struct InMemoryContactDirectory {
    contacts: RwLock<HashMap<String, PatientContact>>,
}

impl InMemoryContactDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, contact: PatientContact) {
        self.contacts
            .write()
            .await
            .insert(contact.patient_id.clone(), contact);
    }
}

#[async_trait]
impl ContactDirectory for InMemoryContactDirectory {
    async fn find_contact(&self, patient_id: &str) -> Result<Option<PatientContact>, StoreError> {
        Ok(self.contacts.read().await.get(patient_id).cloned())
    }
}
