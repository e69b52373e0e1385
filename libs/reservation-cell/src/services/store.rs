use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::models::{Reservation, ReservationError, ReservationStatus};

/// In-memory reservation records. Each instance owns its own list.
#[derive(Debug, Default)]
pub struct ReservationStore {
    reservations: RwLock<Vec<Reservation>>,
}

impl ReservationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `reservation` unless another reservation of the same doctor
    /// overlaps it. Check and insert happen under one write lock.
    pub async fn create_if_free(&self, reservation: Reservation) -> Result<Reservation, ReservationError> {
        let mut reservations = self.reservations.write().await;

        let taken = reservations
            .iter()
            .any(|existing| existing.overlaps(&reservation.doctor_id, reservation.slot_start, reservation.slot_end));
        if taken {
            return Err(ReservationError::SlotAlreadyBooked);
        }

        debug!("Storing reservation {} for doctor {}", reservation.id, reservation.doctor_id);
        reservations.push(reservation.clone());
        Ok(reservation)
    }

    pub async fn get(&self, id: &str) -> Option<Reservation> {
        self.reservations
            .read()
            .await
            .iter()
            .find(|reservation| reservation.id == id)
            .cloned()
    }

    /// Returns the updated reservation, or `None` when `id` is unknown.
    pub async fn set_status(&self, id: &str, status: ReservationStatus) -> Option<Reservation> {
        let mut reservations = self.reservations.write().await;
        let reservation = reservations.iter_mut().find(|reservation| reservation.id == id)?;
        reservation.status = status;
        reservation.updated_at = Utc::now();
        Some(reservation.clone())
    }

    pub async fn list(&self) -> Vec<Reservation> {
        self.reservations.read().await.clone()
    }
}
