use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::TimeSlotError;
use crate::models::{NewTimeSlot, SlotFilter, TimeSlot};

/// Passive record keeper for time slots. Holds no interval logic; the
/// disjointness of a doctor's slots is maintained by `TimeSlotService`.
#[async_trait]
pub trait TimeSlotRepository: Send + Sync {
    /// Slots of `doctor_id` selected by `filter`, ordered by `from` ascending.
    async fn find(&self, doctor_id: &str, filter: SlotFilter) -> Result<Vec<TimeSlot>, TimeSlotError>;

    async fn insert(&self, slot: NewTimeSlot) -> Result<TimeSlot, TimeSlotError>;

    /// Moves the endpoints of an existing slot. `None` keeps the stored value.
    async fn update_endpoints(
        &self,
        slot: &TimeSlot,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<TimeSlot, TimeSlotError>;

    /// Deletes every slot of `doctor_id` selected by `filter`; returns the count.
    async fn delete_where(&self, doctor_id: &str, filter: SlotFilter) -> Result<u64, TimeSlotError>;

    async fn delete(&self, id: Uuid) -> Result<(), TimeSlotError>;
}

#[derive(Debug, Default)]
pub struct InMemoryTimeSlotRepository {
    slots: RwLock<HashMap<String, Vec<TimeSlot>>>,
}

impl InMemoryTimeSlotRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored slot of the doctor, ordered by start.
    pub async fn slots_for(&self, doctor_id: &str) -> Vec<TimeSlot> {
        let mut slots = self.slots.read().await.get(doctor_id).cloned().unwrap_or_default();
        slots.sort_by_key(|slot| slot.from);
        slots
    }
}

#[async_trait]
impl TimeSlotRepository for InMemoryTimeSlotRepository {
    async fn find(&self, doctor_id: &str, filter: SlotFilter) -> Result<Vec<TimeSlot>, TimeSlotError> {
        let slots = self.slots.read().await;
        let mut found: Vec<TimeSlot> = slots
            .get(doctor_id)
            .map(|owned| owned.iter().filter(|slot| filter.matches(slot)).cloned().collect())
            .unwrap_or_default();
        found.sort_by_key(|slot| slot.from);
        Ok(found)
    }

    async fn insert(&self, slot: NewTimeSlot) -> Result<TimeSlot, TimeSlotError> {
        let slot = slot.into_time_slot();
        self.slots
            .write()
            .await
            .entry(slot.doctor_id.clone())
            .or_default()
            .push(slot.clone());
        Ok(slot)
    }

    async fn update_endpoints(
        &self,
        slot: &TimeSlot,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<TimeSlot, TimeSlotError> {
        let mut slots = self.slots.write().await;
        let stored = slots
            .get_mut(&slot.doctor_id)
            .and_then(|owned| owned.iter_mut().find(|candidate| candidate.id == slot.id))
            .ok_or_else(|| TimeSlotError::RepositoryUnavailable(format!("time slot {} no longer exists", slot.id)))?;

        if let Some(from) = from {
            stored.from = from;
        }
        if let Some(to) = to {
            stored.to = to;
        }
        Ok(stored.clone())
    }

    async fn delete_where(&self, doctor_id: &str, filter: SlotFilter) -> Result<u64, TimeSlotError> {
        let mut slots = self.slots.write().await;
        let Some(owned) = slots.get_mut(doctor_id) else {
            return Ok(0);
        };
        let before = owned.len();
        owned.retain(|slot| !filter.matches(slot));
        Ok((before - owned.len()) as u64)
    }

    async fn delete(&self, id: Uuid) -> Result<(), TimeSlotError> {
        let mut slots = self.slots.write().await;
        for owned in slots.values_mut() {
            owned.retain(|slot| slot.id != id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_utils::test_utils::at;

    fn new_slot(doctor_id: &str, from: &str, to: &str) -> NewTimeSlot {
        NewTimeSlot { doctor_id: doctor_id.to_string(), from: at(from), to: at(to) }
    }

    #[tokio::test]
    async fn test_find_is_scoped_and_sorted() {
        let repository = InMemoryTimeSlotRepository::new();
        repository.insert(new_slot("DOC-1", "11:00", "12:00")).await.unwrap();
        repository.insert(new_slot("DOC-1", "08:00", "09:00")).await.unwrap();
        repository.insert(new_slot("DOC-2", "08:00", "12:00")).await.unwrap();

        let found = repository
            .find("DOC-1", SlotFilter::ContainedIn { from: at("00:00"), to: at("23:59") })
            .await
            .unwrap();

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].from, at("08:00"));
        assert_eq!(found[1].from, at("11:00"));
    }

    #[tokio::test]
    async fn test_delete_where_counts_removed_slots() {
        let repository = InMemoryTimeSlotRepository::new();
        repository.insert(new_slot("DOC-1", "08:00", "09:00")).await.unwrap();
        repository.insert(new_slot("DOC-1", "10:00", "12:00")).await.unwrap();

        let deleted = repository
            .delete_where("DOC-1", SlotFilter::ContainedIn { from: at("07:00"), to: at("11:00") })
            .await
            .unwrap();

        assert_eq!(deleted, 1);
        assert_eq!(repository.slots_for("DOC-1").await.len(), 1);
        assert_eq!(repository.delete_where("DOC-9", SlotFilter::ContainedIn { from: at("07:00"), to: at("11:00") }).await, Ok(0));
    }

    #[tokio::test]
    async fn test_update_of_deleted_slot_fails() {
        let repository = InMemoryTimeSlotRepository::new();
        let slot = repository.insert(new_slot("DOC-1", "08:00", "09:00")).await.unwrap();
        repository.delete(slot.id).await.unwrap();

        let result = repository.update_endpoints(&slot, None, Some(at("10:00"))).await;
        assert!(matches!(result, Err(TimeSlotError::RepositoryUnavailable(_))));
    }
}
