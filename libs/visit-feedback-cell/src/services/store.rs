use tokio::sync::RwLock;
use tracing::debug;

use crate::models::{VisitFeedback, VisitFeedbackError};

#[derive(Debug, Default)]
pub struct VisitFeedbackStore {
    feedback: RwLock<Vec<VisitFeedback>>,
}

impl VisitFeedbackStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `feedback` unless its reservation already has feedback.
    pub async fn create_if_absent(&self, feedback: VisitFeedback) -> Result<VisitFeedback, VisitFeedbackError> {
        let mut stored = self.feedback.write().await;

        if stored.iter().any(|item| item.reservation_id == feedback.reservation_id) {
            return Err(VisitFeedbackError::AlreadyExists);
        }

        debug!("Storing feedback {} for reservation {}", feedback.id, feedback.reservation_id);
        stored.push(feedback.clone());
        Ok(feedback)
    }

    pub async fn get(&self, id: &str) -> Option<VisitFeedback> {
        self.feedback.read().await.iter().find(|item| item.id == id).cloned()
    }

    pub async fn get_by_reservation_id(&self, reservation_id: &str) -> Option<VisitFeedback> {
        self.feedback
            .read()
            .await
            .iter()
            .find(|item| item.reservation_id == reservation_id)
            .cloned()
    }

    pub async fn list(&self) -> Vec<VisitFeedback> {
        self.feedback.read().await.clone()
    }
}
