use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::{debug, info};
use uuid::Uuid;

use reservation_cell::{ReservationStatus, ReservationStore};
use shared_models::auth::CurrentUser;
use shared_models::error::AppError;
use shared_utils::validation::{body_object, KeyValidation};

use crate::models::{
    CreateVisitFeedbackRequest, CreateVisitFeedbackResponse, FeedbackVisibility, VisitFeedback, VisitFeedbackError,
};
use crate::services::store::VisitFeedbackStore;

const COMMAND: &str = "visitFeedback/create";
const ALLOWED_KEYS: [&str; 5] = ["reservationId", "rating", "comment", "wouldRecommend", "isAnonymous"];
const MAX_COMMENT_CHARS: usize = 2000;

pub struct VisitFeedbackService {
    reservations: Arc<ReservationStore>,
    feedback: Arc<VisitFeedbackStore>,
}

impl VisitFeedbackService {
    pub fn new(reservations: Arc<ReservationStore>, feedback: Arc<VisitFeedbackStore>) -> Self {
        Self { reservations, feedback }
    }

    /// Records the patient's rating of a completed visit. One feedback per
    /// reservation; new feedback waits for moderation.
    pub async fn create(&self, body: Value, user: &CurrentUser) -> Result<CreateVisitFeedbackResponse, AppError> {
        let body = body_object(body)?;
        let (request, unsupported_key_list) = validate(&body)?;

        let patient_id = user.patient_id.as_deref().ok_or(VisitFeedbackError::Unauthorized)?;

        let reservation = self
            .reservations
            .get(&request.reservation_id)
            .await
            .ok_or(VisitFeedbackError::ReservationNotFound)?;

        if reservation.patient_id != patient_id {
            debug!(
                "Patient {} tried to rate reservation {} of patient {}",
                patient_id, reservation.id, reservation.patient_id
            );
            return Err(VisitFeedbackError::Unauthorized.into());
        }

        if reservation.status != ReservationStatus::Completed {
            debug!("Reservation {} is {}, not completed", reservation.id, reservation.status);
            return Err(VisitFeedbackError::ReservationNotCompleted.into());
        }

        let now = Utc::now();
        let feedback = VisitFeedback {
            id: format!("FDB-{}-{}", now.timestamp_millis(), &Uuid::new_v4().simple().to_string()[..8]),
            reservation_id: reservation.id,
            patient_id: reservation.patient_id,
            doctor_id: reservation.doctor_id,
            procedure_id: Some(reservation.procedure_id),
            rating: request.rating,
            comment: request.comment,
            would_recommend: request.would_recommend,
            is_anonymous: request.is_anonymous.unwrap_or(false),
            visibility: FeedbackVisibility::Pending,
            response_from_doctor: None,
            helpful_count: 0,
            reported: false,
            created_at: now,
            updated_at: now,
        };

        let saved = self.feedback.create_if_absent(feedback).await?;
        info!("Feedback {} saved for reservation {}", saved.id, saved.reservation_id);

        Ok(CreateVisitFeedbackResponse::new(saved, unsupported_key_list))
    }
}

fn validate(body: &Map<String, Value>) -> Result<(CreateVisitFeedbackRequest, Vec<String>), AppError> {
    let mut validation = KeyValidation::new(COMMAND, body, &ALLOWED_KEYS);

    let reservation_id = validation.required_string(body, "reservationId", 1, "reservationId must not be empty");
    let rating = validation.required_integer(body, "rating", 1, 5, "rating must be an integer between 1 and 5");
    let comment = validation.optional_string(
        body,
        "comment",
        Some((MAX_COMMENT_CHARS, "comment must not exceed 2000 characters")),
    );
    let would_recommend = validation.optional_bool(body, "wouldRecommend");
    let is_anonymous = validation.optional_bool(body, "isAnonymous");

    validation.ensure_valid("visitFeedbackCreate/invalidInput", "Input validation failed.")?;

    match (reservation_id, rating) {
        (Some(reservation_id), Some(rating)) => Ok((
            CreateVisitFeedbackRequest {
                reservation_id,
                rating: rating as u8,
                comment,
                would_recommend,
                is_anonymous,
            },
            validation.unsupported_key_list,
        )),
        _ => Err(AppError::Internal("feedback input passed validation incomplete".to_string())),
    }
}
