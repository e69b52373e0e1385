use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde_json::Value;

use shared_models::auth::{CurrentUser, DEFAULT_PATIENT_ID, DEFAULT_USER_ID};
use shared_models::error::AppError;
use shared_utils::extractor::resolve_user;

use crate::models::CreateReservationResponse;
use crate::services::ReservationService;

#[axum::debug_handler]
pub async fn create_reservation(
    State(service): State<Arc<ReservationService>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<CreateReservationResponse>), AppError> {
    let user = resolve_user(&headers, CurrentUser::patient(DEFAULT_USER_ID, DEFAULT_PATIENT_ID))?;

    let response = service.create(body, &user).await?;

    Ok((StatusCode::CREATED, Json(response)))
}
