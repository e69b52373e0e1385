use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_models::error::AppError;
use shared_models::notification::NotificationStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReservationStatus::Pending => write!(f, "pending"),
            ReservationStatus::Confirmed => write!(f, "confirmed"),
            ReservationStatus::Cancelled => write!(f, "cancelled"),
            ReservationStatus::Completed => write!(f, "completed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: String,
    pub code: String,
    pub doctor_id: String,
    pub patient_id: String,
    pub department_id: String,
    pub procedure_id: String,
    pub slot_start: DateTime<Utc>,
    pub slot_end: DateTime<Utc>,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Reservation {
    /// Same doctor and the half-open slots intersect.
    pub fn overlaps(&self, doctor_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.doctor_id == doctor_id && self.slot_start < end && self.slot_end > start
    }
}

/// Body of `POST /reservations`. Keys outside this set are tolerated and
/// reported back as unsupported.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationRequest {
    pub doctor_id: String,
    pub patient_id: Option<String>,
    pub procedure_id: String,
    pub department_id: String,
    pub slot_start: String,
    pub slot_end: String,
    pub contact_email: Option<String>,
    pub note: Option<String>,
    pub notification_channels: Option<Vec<String>>,
    pub gdpr_consent: Option<bool>,
    pub medical_data_consent: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationResponse {
    pub reservation: Reservation,
    pub notification_status: NotificationStatus,
    pub unsupported_key_list: Vec<String>,
    pub invalid_type_key_map: BTreeMap<String, String>,
    pub invalid_value_key_map: BTreeMap<String, String>,
    pub missing_key_map: BTreeMap<String, String>,
}

impl CreateReservationResponse {
    pub fn new(reservation: Reservation, unsupported_key_list: Vec<String>) -> Self {
        Self {
            reservation,
            notification_status: NotificationStatus::not_requested(),
            unsupported_key_list,
            invalid_type_key_map: BTreeMap::new(),
            invalid_value_key_map: BTreeMap::new(),
            missing_key_map: BTreeMap::new(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReservationError {
    #[error("Invalid reservation request: {0}")]
    InvalidInput(String),

    #[error("patientId is required")]
    PatientRequired,

    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("Patient not found")]
    PatientNotFound,

    #[error("Procedure not found")]
    ProcedureNotFound,

    #[error("Department not found")]
    DepartmentNotFound,

    #[error("Doctor is not active")]
    DoctorNotActive,

    #[error("Invalid slotStart or slotEnd")]
    InvalidSlot,

    #[error("Slot duration {actual}min does not match procedure duration {expected}min")]
    SlotDurationMismatch { actual: f64, expected: i64 },

    #[error("Selected slot is already booked")]
    SlotAlreadyBooked,
}

impl From<ReservationError> for AppError {
    fn from(err: ReservationError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}
