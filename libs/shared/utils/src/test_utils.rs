use chrono::{DateTime, NaiveTime, Utc};
use serde_json::json;
use uuid::Uuid;

use shared_config::{AppConfig, StorageBackend};
use shared_models::auth::CurrentUser;

use crate::time::parse_date;

/// Fixed calendar day used by the time-slot scenarios.
pub const TEST_DATE: &str = "2025-03-10";
pub const TEST_DOCTOR_ID: &str = "DOC-1";

pub struct TestConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
        }
    }
}

impl TestConfig {
    pub fn with_url(url: &str) -> Self {
        Self {
            supabase_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            storage_backend: StorageBackend::Supabase,
            port: 3000,
        }
    }
}

pub struct TestUsers;

impl TestUsers {
    pub fn admin() -> CurrentUser {
        CurrentUser::with_role("USER-ADMIN", "admin")
    }

    pub fn clinic_manager() -> CurrentUser {
        CurrentUser::with_role("USER-MANAGER", "clinicManager")
    }

    pub fn patient() -> CurrentUser {
        CurrentUser::patient("USER-1", "PAT-1")
    }

    pub fn other_patient() -> CurrentUser {
        CurrentUser::patient("USER-2", "PAT-OTHER")
    }
}

/// `HH:mm` on [`TEST_DATE`], UTC.
pub fn at(hh_mm: &str) -> DateTime<Utc> {
    on(TEST_DATE, hh_mm)
}

/// `HH:mm` on the given `YYYY-MM-DD` day, UTC. Panics on malformed input.
pub fn on(date: &str, hh_mm: &str) -> DateTime<Utc> {
    let day = parse_date(date).unwrap_or_else(|| panic!("bad test date {date}"));
    let time = NaiveTime::parse_from_str(hh_mm, "%H:%M").unwrap_or_else(|_| panic!("bad test time {hh_mm}"));
    day.date_naive().and_time(time).and_utc()
}

pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn doctor_row(doctor_id: &str) -> serde_json::Value {
        json!({ "id": doctor_id })
    }

    pub fn time_slot_row(
        id: Uuid,
        doctor_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> serde_json::Value {
        json!({
            "id": id,
            "doctor_id": doctor_id,
            "from": from.to_rfc3339(),
            "to": to.to_rfc3339(),
        })
    }

    pub fn error_response(message: &str, code: &str) -> serde_json::Value {
        json!({
            "message": message,
            "code": code
        })
    }
}
