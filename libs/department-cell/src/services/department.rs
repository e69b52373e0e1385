use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::{debug, info};
use uuid::Uuid;

use shared_database::memory::InMemoryDirectory;
use shared_models::auth::CurrentUser;
use shared_models::error::AppError;
use shared_utils::validation::{body_object, KeyValidation};

use crate::models::{CreateDepartmentRequest, CreateDepartmentResponse, Department, DepartmentError};
use crate::services::store::DepartmentStore;

const COMMAND: &str = "department/create";
const ALLOWED_KEYS: [&str; 5] = ["name", "doctorsList", "capacity", "contact", "note"];
const AUTHORIZED_ROLES: [&str; 2] = ["admin", "clinicManager"];

pub struct DepartmentService {
    store: Arc<DepartmentStore>,
    directory: Arc<InMemoryDirectory>,
}

impl DepartmentService {
    pub fn new(store: Arc<DepartmentStore>, directory: Arc<InMemoryDirectory>) -> Self {
        Self { store, directory }
    }

    pub async fn create(&self, body: Value, user: &CurrentUser) -> Result<CreateDepartmentResponse, AppError> {
        let body = body_object(body)?;
        let (request, unsupported_key_list) = validate(&body)?;

        if !AUTHORIZED_ROLES.contains(&user.role_or_guest()) {
            debug!("User {} with role {} may not create departments", user.id, user.role_or_guest());
            return Err(DepartmentError::Unauthorized.into());
        }

        if self.store.get_by_name(&request.name).await.is_some() {
            return Err(DepartmentError::AlreadyExists { name: request.name }.into());
        }

        self.check_doctors(&request.doctors_list).await?;

        let now = Utc::now();
        let department = Department {
            id: format!("DEP-{}-{}", now.timestamp_millis(), &Uuid::new_v4().simple().to_string()[..8]),
            name: request.name,
            doctors_list: request.doctors_list,
            capacity: request.capacity,
            contact: request.contact,
            note: request.note,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let saved = self.store.create(department).await;
        info!("Department {} created by {}", saved.id, user.id);

        Ok(CreateDepartmentResponse::new(saved, unsupported_key_list))
    }

    /// Every listed doctor must exist; unknown ids are reported together.
    /// Among existing doctors the last inactive one is reported.
    async fn check_doctors(&self, doctor_ids: &[String]) -> Result<(), DepartmentError> {
        let mut missing_doctors = Vec::new();
        let mut inactive = None;

        for doctor_id in doctor_ids {
            match self.directory.get_doctor(doctor_id).await {
                None => missing_doctors.push(doctor_id.clone()),
                Some(doctor) if !doctor.is_active => inactive = Some(doctor_id.clone()),
                Some(_) => {}
            }
        }

        if !missing_doctors.is_empty() {
            return Err(DepartmentError::DoctorNotFound { missing_doctors });
        }
        if let Some(doctor_id) = inactive {
            return Err(DepartmentError::DoctorNotActive { doctor_id });
        }
        Ok(())
    }
}

fn validate(body: &Map<String, Value>) -> Result<(CreateDepartmentRequest, Vec<String>), AppError> {
    let mut validation = KeyValidation::new(COMMAND, body, &ALLOWED_KEYS);

    let name = validation.required_string(body, "name", 2, "name must have at least 2 characters");
    let doctors_list = doctors_list(&mut validation, body);
    let capacity = validation.required_integer(
        body,
        "capacity",
        1,
        u32::MAX as i64,
        "capacity must be an integer greater than 0",
    );
    let contact = validation.required_string(body, "contact", 3, "contact must have at least 3 characters");
    let note = validation.optional_string(body, "note", None);

    validation.ensure_valid("departmentCreate/invalidInput", "Input validation failed.")?;

    match (name, doctors_list, capacity, contact) {
        (Some(name), Some(doctors_list), Some(capacity), Some(contact)) => Ok((
            CreateDepartmentRequest {
                name,
                doctors_list,
                capacity: capacity as u32,
                contact,
                note,
            },
            validation.unsupported_key_list,
        )),
        _ => Err(AppError::Internal("department input passed validation incomplete".to_string())),
    }
}

fn doctors_list(validation: &mut KeyValidation, body: &Map<String, Value>) -> Option<Vec<String>> {
    let key = "doctorsList";
    let items = match body.get(key) {
        None => {
            validation.missing(key, "doctorsList is required");
            return None;
        }
        Some(Value::Array(items)) => items,
        Some(_) => {
            validation.invalid_type(key, "doctorsList must be an array");
            return None;
        }
    };

    if items.is_empty() {
        validation.invalid_value(key, "doctorsList must contain at least one doctorId");
        return None;
    }

    let ids: Option<Vec<String>> = items
        .iter()
        .map(|item| match item {
            Value::String(id) if !id.trim().is_empty() => Some(id.clone()),
            _ => None,
        })
        .collect();

    if ids.is_none() {
        validation.invalid_value(key, "each doctorId must be a non-empty string");
    }
    ids
}
