use std::collections::BTreeMap;

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use shared_models::error::AppError;
use shared_models::notification::NotificationStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: String,
    pub name: String,
    pub doctors_list: Vec<String>,
    pub capacity: u32,
    pub contact: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated body of `POST /department/create`.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateDepartmentRequest {
    pub name: String,
    pub doctors_list: Vec<String>,
    pub capacity: u32,
    pub contact: String,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDepartmentResponse {
    pub department: Department,
    pub notification_status: NotificationStatus,
    pub unsupported_key_list: Vec<String>,
    pub invalid_type_key_map: BTreeMap<String, String>,
    pub invalid_value_key_map: BTreeMap<String, String>,
    pub missing_key_map: BTreeMap<String, String>,
}

impl CreateDepartmentResponse {
    pub fn new(department: Department, unsupported_key_list: Vec<String>) -> Self {
        Self {
            department,
            notification_status: NotificationStatus::not_requested(),
            unsupported_key_list,
            invalid_type_key_map: BTreeMap::new(),
            invalid_value_key_map: BTreeMap::new(),
            missing_key_map: BTreeMap::new(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DepartmentError {
    #[error("You are not allowed to create departments.")]
    Unauthorized,

    #[error("A department with the same name already exists.")]
    AlreadyExists { name: String },

    #[error("One or more doctors were not found.")]
    DoctorNotFound { missing_doctors: Vec<String> },

    #[error("Doctor is not active.")]
    DoctorNotActive { doctor_id: String },
}

impl DepartmentError {
    pub fn code(&self) -> &'static str {
        match self {
            DepartmentError::Unauthorized => "departmentCreate/unauthorized",
            DepartmentError::AlreadyExists { .. } => "departmentCreate/departmentAlreadyExists",
            DepartmentError::DoctorNotFound { .. } => "departmentCreate/doctorNotFound",
            DepartmentError::DoctorNotActive { .. } => "departmentCreate/doctorNotActive",
        }
    }
}

impl From<DepartmentError> for AppError {
    fn from(err: DepartmentError) -> Self {
        let mut body = json!({ "code": err.code(), "message": err.to_string() });
        let status = match &err {
            DepartmentError::Unauthorized => StatusCode::FORBIDDEN,
            DepartmentError::AlreadyExists { name } => {
                body["name"] = json!(name);
                StatusCode::CONFLICT
            }
            DepartmentError::DoctorNotFound { missing_doctors } => {
                body["missingDoctors"] = json!(missing_doctors);
                StatusCode::BAD_REQUEST
            }
            DepartmentError::DoctorNotActive { doctor_id } => {
                body["invalidValueKeyMap"] = json!({ "doctorNotActive": doctor_id });
                StatusCode::BAD_REQUEST
            }
        };
        AppError::structured(status, body)
    }
}
