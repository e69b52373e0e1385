use std::collections::BTreeMap;

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use shared_models::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackVisibility {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitFeedback {
    pub id: String,
    pub reservation_id: String,
    pub patient_id: String,
    pub doctor_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub procedure_id: Option<String>,
    pub rating: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub would_recommend: Option<bool>,
    pub is_anonymous: bool,
    pub visibility: FeedbackVisibility,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_from_doctor: Option<String>,
    pub helpful_count: u32,
    pub reported: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated body of `POST /visit/feedback/create`.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateVisitFeedbackRequest {
    pub reservation_id: String,
    pub rating: u8,
    pub comment: Option<String>,
    pub would_recommend: Option<bool>,
    pub is_anonymous: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVisitFeedbackResponse {
    pub feedback: VisitFeedback,
    pub unsupported_key_list: Vec<String>,
    pub invalid_type_key_map: BTreeMap<String, String>,
    pub invalid_value_key_map: BTreeMap<String, String>,
    pub missing_key_map: BTreeMap<String, String>,
}

impl CreateVisitFeedbackResponse {
    pub fn new(feedback: VisitFeedback, unsupported_key_list: Vec<String>) -> Self {
        Self {
            feedback,
            unsupported_key_list,
            invalid_type_key_map: BTreeMap::new(),
            invalid_value_key_map: BTreeMap::new(),
            missing_key_map: BTreeMap::new(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VisitFeedbackError {
    #[error("You are not allowed to rate this visit.")]
    Unauthorized,

    #[error("Reservation was not found.")]
    ReservationNotFound,

    #[error("Reservation is not completed, feedback cannot be saved.")]
    ReservationNotCompleted,

    #[error("Feedback for this reservation already exists.")]
    AlreadyExists,
}

impl VisitFeedbackError {
    pub fn code(&self) -> &'static str {
        match self {
            VisitFeedbackError::Unauthorized => "visitFeedbackCreate/unauthorizedFeedback",
            VisitFeedbackError::ReservationNotFound => "visitFeedbackCreate/reservationNotFound",
            VisitFeedbackError::ReservationNotCompleted => "visitFeedbackCreate/reservationNotCompleted",
            VisitFeedbackError::AlreadyExists => "visitFeedbackCreate/feedbackAlreadyExists",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            VisitFeedbackError::Unauthorized => StatusCode::FORBIDDEN,
            VisitFeedbackError::ReservationNotFound => StatusCode::NOT_FOUND,
            VisitFeedbackError::ReservationNotCompleted => StatusCode::BAD_REQUEST,
            VisitFeedbackError::AlreadyExists => StatusCode::CONFLICT,
        }
    }
}

impl From<VisitFeedbackError> for AppError {
    fn from(err: VisitFeedbackError) -> Self {
        AppError::structured(err.status(), json!({ "code": err.code(), "message": err.to_string() }))
    }
}
