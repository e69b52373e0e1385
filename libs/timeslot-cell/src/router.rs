use std::sync::Arc;

use axum::{routing::get, Router};

use crate::handlers;
use crate::services::TimeSlotService;

pub fn timeslot_routes(service: Arc<TimeSlotService>) -> Router {
    Router::new()
        .route(
            "/{doctor_id}",
            get(handlers::find_available_time_slots)
                .post(handlers::add_time_slot)
                .delete(handlers::remove_time_slot),
        )
        .with_state(service)
}
