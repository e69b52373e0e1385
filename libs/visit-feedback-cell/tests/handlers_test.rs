use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use reservation_cell::{ReservationStatus, ReservationStore};
use shared_utils::extractor::PATIENT_ID_HEADER;
use visit_feedback_cell::*;

fn create_app(reservations: Arc<ReservationStore>) -> Router {
    let service = VisitFeedbackService::new(reservations, Arc::new(VisitFeedbackStore::new()));
    visit_feedback_routes(Arc::new(service))
}

fn create_request(body: Value, patient_id: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/create")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(patient_id) = patient_id {
        builder = builder.header(PATIENT_ID_HEADER, patient_id);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_unknown_reservation_returns_404() {
    let response = create_app(Arc::new(ReservationStore::new()))
        .oneshot(create_request(json!({ "reservationId": "RES-9", "rating": 5 }), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "visitFeedbackCreate/reservationNotFound");
}

#[tokio::test]
async fn test_invalid_rating_returns_400() {
    let response = create_app(Arc::new(ReservationStore::new()))
        .oneshot(create_request(json!({ "reservationId": "RES-9", "rating": "five" }), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["code"], "visitFeedbackCreate/invalidInput");
    assert_eq!(json["invalidTypeKeyMap"]["rating"], "rating must be a number");
}

#[tokio::test]
async fn test_patient_header_must_own_reservation() {
    let reservations = Arc::new(ReservationStore::new());
    let now = chrono::Utc::now();
    reservations
        .create_if_free(reservation_cell::Reservation {
            id: "RES-1".to_string(),
            code: "CODE-1".to_string(),
            doctor_id: "DOC-1".to_string(),
            patient_id: "PAT-1".to_string(),
            department_id: "DEP-1".to_string(),
            procedure_id: "PROC-1".to_string(),
            slot_start: now,
            slot_end: now + chrono::Duration::minutes(30),
            status: ReservationStatus::Completed,
            created_at: now,
            updated_at: now,
            note: None,
        })
        .await
        .unwrap();
    let app = create_app(reservations);

    let response = app
        .clone()
        .oneshot(create_request(json!({ "reservationId": "RES-1", "rating": 5 }), Some("PAT-2")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .oneshot(create_request(json!({ "reservationId": "RES-1", "rating": 5 }), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["feedback"]["visibility"], "pending");
    assert_eq!(json["feedback"]["isAnonymous"], false);
    assert_eq!(json["feedback"]["helpfulCount"], 0);
}
