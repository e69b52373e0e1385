use std::sync::Arc;

use axum::{routing::post, Router};

use crate::handlers;
use crate::services::DepartmentService;

pub fn department_routes(service: Arc<DepartmentService>) -> Router {
    Router::new()
        .route("/create", post(handlers::create_department))
        .with_state(service)
}
