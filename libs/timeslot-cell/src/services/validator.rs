use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use shared_database::memory::InMemoryDirectory;
use shared_database::supabase::SupabaseClient;

use crate::error::TimeSlotError;

/// Confirms that a doctor id resolves to an existing doctor.
#[async_trait]
pub trait DoctorValidator: Send + Sync {
    async fn exists(&self, doctor_id: &str) -> Result<bool, TimeSlotError>;
}

#[async_trait]
impl DoctorValidator for InMemoryDirectory {
    async fn exists(&self, doctor_id: &str) -> Result<bool, TimeSlotError> {
        Ok(self.get_doctor(doctor_id).await.is_some())
    }
}

/// Looks doctors up in the `doctors` table. Ids that are not UUIDs never
/// match and are rejected without a request.
pub struct SupabaseDoctorValidator {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseDoctorValidator {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }
}

#[async_trait]
impl DoctorValidator for SupabaseDoctorValidator {
    async fn exists(&self, doctor_id: &str) -> Result<bool, TimeSlotError> {
        if Uuid::parse_str(doctor_id).is_err() {
            debug!("Doctor id '{}' is not a UUID", doctor_id);
            return Ok(false);
        }

        let path = format!("/rest/v1/doctors?id=eq.{}&select=id", doctor_id);
        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| TimeSlotError::RepositoryUnavailable(e.to_string()))?;

        Ok(!rows.is_empty())
    }
}
