use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Method;
use serde_json::{json, Map, Value};
use tracing::debug;
use uuid::Uuid;

use shared_database::supabase::SupabaseClient;

use crate::error::TimeSlotError;
use crate::models::{NewTimeSlot, SlotFilter, TimeSlot};
use crate::services::repository::TimeSlotRepository;

const TABLE_PATH: &str = "/rest/v1/time_slots";

/// `time_slots` table accessed through PostgREST.
pub struct SupabaseTimeSlotRepository {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseTimeSlotRepository {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    fn filtered_path(doctor_id: &str, filter: &SlotFilter) -> String {
        format!("{}?doctor_id=eq.{}&{}", TABLE_PATH, doctor_id, filter.to_query())
    }
}

fn unavailable(err: anyhow::Error) -> TimeSlotError {
    TimeSlotError::RepositoryUnavailable(err.to_string())
}

fn decode_rows(rows: Vec<Value>) -> Result<Vec<TimeSlot>, TimeSlotError> {
    rows.into_iter()
        .map(serde_json::from_value)
        .collect::<Result<Vec<TimeSlot>, _>>()
        .map_err(|e| TimeSlotError::RepositoryUnavailable(format!("malformed time slot row: {}", e)))
}

fn timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[async_trait]
impl TimeSlotRepository for SupabaseTimeSlotRepository {
    async fn find(&self, doctor_id: &str, filter: SlotFilter) -> Result<Vec<TimeSlot>, TimeSlotError> {
        let path = format!("{}&order=from.asc", Self::filtered_path(doctor_id, &filter));
        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(unavailable)?;
        decode_rows(rows)
    }

    async fn insert(&self, slot: NewTimeSlot) -> Result<TimeSlot, TimeSlotError> {
        let slot = slot.into_time_slot();
        let body = json!({
            "id": slot.id,
            "doctor_id": slot.doctor_id,
            "from": timestamp(slot.from),
            "to": timestamp(slot.to),
        });

        let rows = self
            .supabase
            .request_returning(Method::POST, TABLE_PATH, Some(body))
            .await
            .map_err(unavailable)?;

        debug!("Inserted time slot {} for doctor {}", slot.id, slot.doctor_id);
        Ok(decode_rows(rows)?.into_iter().next().unwrap_or(slot))
    }

    async fn update_endpoints(
        &self,
        slot: &TimeSlot,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<TimeSlot, TimeSlotError> {
        let mut update_data = Map::new();
        if let Some(from) = from {
            update_data.insert("from".to_string(), json!(timestamp(from)));
        }
        if let Some(to) = to {
            update_data.insert("to".to_string(), json!(timestamp(to)));
        }

        let path = format!("{}?id=eq.{}", TABLE_PATH, slot.id);
        let rows = self
            .supabase
            .request_returning(Method::PATCH, &path, Some(Value::Object(update_data)))
            .await
            .map_err(unavailable)?;

        decode_rows(rows)?
            .into_iter()
            .next()
            .ok_or_else(|| TimeSlotError::RepositoryUnavailable(format!("time slot {} no longer exists", slot.id)))
    }

    async fn delete_where(&self, doctor_id: &str, filter: SlotFilter) -> Result<u64, TimeSlotError> {
        let path = Self::filtered_path(doctor_id, &filter);
        let rows = self
            .supabase
            .request_returning(Method::DELETE, &path, None)
            .await
            .map_err(unavailable)?;
        Ok(rows.len() as u64)
    }

    async fn delete(&self, id: Uuid) -> Result<(), TimeSlotError> {
        let path = format!("{}?id=eq.{}", TABLE_PATH, id);
        self.supabase
            .request_returning(Method::DELETE, &path, None)
            .await
            .map_err(unavailable)?;
        Ok(())
    }
}
