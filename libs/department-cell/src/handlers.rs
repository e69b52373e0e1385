use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde_json::Value;

use shared_models::auth::CurrentUser;
use shared_models::error::AppError;
use shared_utils::extractor::resolve_user;

use crate::models::CreateDepartmentResponse;
use crate::services::DepartmentService;

/// Callers without identity headers act as the clinic administrator.
fn default_user() -> CurrentUser {
    CurrentUser::with_role("USER-ADMIN", "admin")
}

#[axum::debug_handler]
pub async fn create_department(
    State(service): State<Arc<DepartmentService>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<CreateDepartmentResponse>), AppError> {
    let user = resolve_user(&headers, default_user())?;

    let response = service.create(body, &user).await?;

    Ok((StatusCode::CREATED, Json(response)))
}
