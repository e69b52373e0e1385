use std::sync::Arc;

use axum::{routing::post, Router};

use crate::handlers;
use crate::services::VisitFeedbackService;

pub fn visit_feedback_routes(service: Arc<VisitFeedbackService>) -> Router {
    Router::new()
        .route("/create", post(handlers::create_visit_feedback))
        .with_state(service)
}
