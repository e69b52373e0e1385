use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use department_cell::{department_routes, DepartmentService, DepartmentStore};
use reservation_cell::{reservation_routes, ReservationService, ReservationStore};
use shared_config::AppConfig;
use shared_database::memory::InMemoryDirectory;
use timeslot_cell::{timeslot_routes, TimeSlotService};
use visit_feedback_cell::{visit_feedback_routes, VisitFeedbackService, VisitFeedbackStore};

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub fn create_router(config: &AppConfig) -> Router {
    let directory = Arc::new(InMemoryDirectory::seeded());
    let departments = Arc::new(DepartmentStore::seeded());
    let reservations = Arc::new(ReservationStore::new());

    let timeslots = TimeSlotService::from_config(config, directory.clone());
    let department_service = DepartmentService::new(departments.clone(), directory.clone());
    let reservation_service = ReservationService::new(reservations.clone(), departments, directory);
    let feedback_service = VisitFeedbackService::new(reservations, Arc::new(VisitFeedbackStore::new()));

    Router::new()
        .route("/", get(|| async { "Clinic reservation API is running!" }))
        .route("/health", get(health))
        .nest("/timeslots", timeslot_routes(Arc::new(timeslots)))
        .nest("/department", department_routes(Arc::new(department_service)))
        .nest("/reservations", reservation_routes(Arc::new(reservation_service)))
        .nest("/visit/feedback", visit_feedback_routes(Arc::new(feedback_service)))
}
