use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;

use shared_models::error::AppError;

use crate::models::{TimeSlotQuery, TimeSlotRequest, TimeSlotView};
use crate::services::TimeSlotService;

#[axum::debug_handler]
pub async fn find_available_time_slots(
    State(service): State<Arc<TimeSlotService>>,
    Path(doctor_id): Path<String>,
    Query(query): Query<TimeSlotQuery>,
) -> Result<Json<Vec<TimeSlotView>>, AppError> {
    let (from, to) = query.resolve(Utc::now())?;

    let slots = service.find_available_time_slots(&doctor_id, from, to).await?;

    Ok(Json(slots))
}

#[axum::debug_handler]
pub async fn add_time_slot(
    State(service): State<Arc<TimeSlotService>>,
    Path(doctor_id): Path<String>,
    Json(request): Json<TimeSlotRequest>,
) -> Result<StatusCode, AppError> {
    let range = request.parse()?;

    service.add_time_slot(&doctor_id, range).await?;

    Ok(StatusCode::CREATED)
}

#[axum::debug_handler]
pub async fn remove_time_slot(
    State(service): State<Arc<TimeSlotService>>,
    Path(doctor_id): Path<String>,
    Json(request): Json<TimeSlotRequest>,
) -> Result<StatusCode, AppError> {
    let range = request.parse()?;

    service.remove_time_slot(&doctor_id, range).await?;

    Ok(StatusCode::NO_CONTENT)
}
