use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use department_cell::DepartmentStore;
use shared_database::memory::InMemoryDirectory;
use shared_models::auth::CurrentUser;
use shared_models::error::AppError;
use shared_utils::validation::{body_object, KeyValidation};

use crate::models::{
    CreateReservationRequest, CreateReservationResponse, Reservation, ReservationError, ReservationStatus,
};
use crate::services::store::ReservationStore;

const COMMAND: &str = "reservation/create";
const ALLOWED_KEYS: [&str; 11] = [
    "doctorId",
    "patientId",
    "procedureId",
    "slotStart",
    "slotEnd",
    "contactEmail",
    "note",
    "notificationChannels",
    "gdprConsent",
    "medicalDataConsent",
    "departmentId",
];

pub struct ReservationService {
    reservations: Arc<ReservationStore>,
    departments: Arc<DepartmentStore>,
    directory: Arc<InMemoryDirectory>,
}

impl ReservationService {
    pub fn new(
        reservations: Arc<ReservationStore>,
        departments: Arc<DepartmentStore>,
        directory: Arc<InMemoryDirectory>,
    ) -> Self {
        Self {
            reservations,
            departments,
            directory,
        }
    }

    /// Books a pending reservation for the slot `[slotStart, slotEnd)`.
    pub async fn create(&self, body: Value, user: &CurrentUser) -> Result<CreateReservationResponse, AppError> {
        let body = body_object(body)?;
        let unsupported_key_list = KeyValidation::new(COMMAND, &body, &ALLOWED_KEYS).unsupported_key_list;

        let request: CreateReservationRequest = serde_json::from_value(Value::Object(body))
            .map_err(|e| ReservationError::InvalidInput(e.to_string()))?;

        let reservation = self.book(request, user).await?;

        Ok(CreateReservationResponse::new(reservation, unsupported_key_list))
    }

    async fn book(&self, request: CreateReservationRequest, user: &CurrentUser) -> Result<Reservation, ReservationError> {
        let patient_id = request
            .patient_id
            .or_else(|| user.patient_id.clone())
            .ok_or(ReservationError::PatientRequired)?;

        let (doctor, patient, procedure, department) = tokio::join!(
            self.directory.get_doctor(&request.doctor_id),
            self.directory.get_patient(&patient_id),
            self.directory.get_procedure(&request.procedure_id),
            self.departments.get(&request.department_id),
        );

        let doctor = doctor.ok_or(ReservationError::DoctorNotFound)?;
        let patient = patient.ok_or(ReservationError::PatientNotFound)?;
        let procedure = procedure.ok_or(ReservationError::ProcedureNotFound)?;
        let department = department.ok_or(ReservationError::DepartmentNotFound)?;
        if !doctor.is_active {
            return Err(ReservationError::DoctorNotActive);
        }

        let (slot_start, slot_end) = match (parse_instant(&request.slot_start), parse_instant(&request.slot_end)) {
            (Some(start), Some(end)) => (start, end),
            _ => return Err(ReservationError::InvalidSlot),
        };

        let minutes = (slot_end - slot_start).num_milliseconds() as f64 / 60_000.0;
        if minutes != procedure.duration_minutes as f64 {
            return Err(ReservationError::SlotDurationMismatch {
                actual: minutes,
                expected: procedure.duration_minutes,
            });
        }

        let now = Utc::now();
        let suffix = format!("{}-{}", now.timestamp_millis(), &Uuid::new_v4().simple().to_string()[..8]);
        let reservation = Reservation {
            id: format!("RES-{}", suffix),
            code: format!("RES-CODE-{}", suffix),
            doctor_id: doctor.id,
            patient_id: patient.id,
            department_id: department.id,
            procedure_id: procedure.id,
            slot_start,
            slot_end,
            status: ReservationStatus::Pending,
            created_at: now,
            updated_at: now,
            note: request.note,
        };

        let saved = self.reservations.create_if_free(reservation).await?;

        if self.directory.add_reservation(&saved.patient_id, &saved.id).await.is_none() {
            warn!("Patient {} disappeared before reservation {} was linked", saved.patient_id, saved.id);
        }

        info!(
            "Reservation {} booked with doctor {} from {} to {}",
            saved.id, saved.doctor_id, saved.slot_start, saved.slot_end
        );
        Ok(saved)
    }
}

fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(value) => Some(value.with_timezone(&Utc)),
        Err(e) => {
            debug!("Rejected slot timestamp '{}': {}", raw, e);
            None
        }
    }
}
