use std::sync::Arc;

use axum::{routing::post, Router};

use crate::handlers;
use crate::services::ReservationService;

pub fn reservation_routes(service: Arc<ReservationService>) -> Router {
    Router::new()
        .route("/", post(handlers::create_reservation))
        .with_state(service)
}
