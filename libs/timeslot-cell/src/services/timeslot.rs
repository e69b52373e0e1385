use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{debug, info};

use shared_config::{AppConfig, StorageBackend};
use shared_database::memory::InMemoryDirectory;
use shared_database::supabase::SupabaseClient;

use crate::error::TimeSlotError;
use crate::models::{NewTimeSlot, SlotFilter, SlotRange, TimeSlotView};
use crate::services::repository::{InMemoryTimeSlotRepository, TimeSlotRepository};
use crate::services::supabase::SupabaseTimeSlotRepository;
use crate::services::validator::{DoctorValidator, SupabaseDoctorValidator};

type LockMap = Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>;

/// One async lock per doctor. Operations on different doctors only share the
/// short map lookup. An entry is dropped once its last guard is released and
/// no task waits on it.
#[derive(Default)]
struct DoctorLocks {
    locks: LockMap,
}

impl DoctorLocks {
    async fn acquire(&self, doctor_id: &str) -> DoctorLockGuard {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            locks.entry(doctor_id.to_string()).or_default().clone()
        };
        DoctorLockGuard {
            guard: Some(lock.lock_owned().await),
            doctor_id: doctor_id.to_string(),
            locks: self.locks.clone(),
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

struct DoctorLockGuard {
    guard: Option<OwnedMutexGuard<()>>,
    doctor_id: String,
    locks: LockMap,
}

impl Drop for DoctorLockGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // Only the map still holds the lock when nobody owns or awaits it.
        if locks.get(&self.doctor_id).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            locks.remove(&self.doctor_id);
        }
    }
}

/// Keeps each doctor's available time as a set of disjoint, non-touching
/// half-open intervals.
pub struct TimeSlotService {
    repository: Arc<dyn TimeSlotRepository>,
    doctors: Arc<dyn DoctorValidator>,
    locks: DoctorLocks,
}

impl TimeSlotService {
    pub fn new(repository: Arc<dyn TimeSlotRepository>, doctors: Arc<dyn DoctorValidator>) -> Self {
        Self {
            repository,
            doctors,
            locks: DoctorLocks::default(),
        }
    }

    /// Picks the storage backend named by the configuration.
    pub fn from_config(config: &AppConfig, directory: Arc<InMemoryDirectory>) -> Self {
        match config.storage_backend {
            StorageBackend::Memory => {
                info!("Time slots stored in memory");
                Self::new(Arc::new(InMemoryTimeSlotRepository::new()), directory)
            }
            StorageBackend::Supabase => {
                info!("Time slots stored in Supabase at {}", config.supabase_url);
                let supabase = Arc::new(SupabaseClient::new(config));
                Self::new(
                    Arc::new(SupabaseTimeSlotRepository::new(supabase.clone())),
                    Arc::new(SupabaseDoctorValidator::new(supabase)),
                )
            }
        }
    }

    /// Marks `range` as available, merging it with every stored slot it
    /// overlaps or touches. Slots fully inside `range` are absorbed.
    pub async fn add_time_slot(&self, doctor_id: &str, range: SlotRange) -> Result<(), TimeSlotError> {
        self.validate_doctor_id(doctor_id).await?;
        let _guard = self.locks.acquire(doctor_id).await;

        let (from, to) = (range.from(), range.to());
        debug!("Adding time slot {} - {} for doctor {}", from, to, doctor_id);

        let touching = self
            .repository
            .find(doctor_id, SlotFilter::Touching { from, to })
            .await?;

        let Some((kept, absorbed)) = touching.split_first() else {
            self.repository
                .insert(NewTimeSlot {
                    doctor_id: doctor_id.to_string(),
                    from,
                    to,
                })
                .await?;
            return Ok(());
        };

        let merged_from = touching.iter().map(|slot| slot.from).fold(from, std::cmp::min);
        let merged_to = touching.iter().map(|slot| slot.to).fold(to, std::cmp::max);

        // Widen first: a failed delete leaves overlap for the next merge, not a gap.
        let new_from = (kept.from != merged_from).then_some(merged_from);
        let new_to = (kept.to != merged_to).then_some(merged_to);
        if new_from.is_some() || new_to.is_some() {
            self.repository.update_endpoints(kept, new_from, new_to).await?;
        }

        for slot in absorbed {
            self.repository.delete(slot.id).await?;
        }

        debug!(
            "Merged {} stored slot(s) into {} - {} for doctor {}",
            touching.len(),
            merged_from,
            merged_to,
            doctor_id
        );
        Ok(())
    }

    /// Removes `range` from the doctor's availability, deleting, trimming or
    /// splitting the stored slots it intersects.
    pub async fn remove_time_slot(&self, doctor_id: &str, range: SlotRange) -> Result<(), TimeSlotError> {
        self.validate_doctor_id(doctor_id).await?;
        let _guard = self.locks.acquire(doctor_id).await;

        let (from, to) = (range.from(), range.to());
        debug!("Removing time slot {} - {} for doctor {}", from, to, doctor_id);

        let deleted = self
            .repository
            .delete_where(doctor_id, SlotFilter::ContainedIn { from, to })
            .await?;
        if deleted > 0 {
            debug!("Deleted {} covered slot(s) for doctor {}", deleted, doctor_id);
        }

        let enclosing = self
            .repository
            .find(doctor_id, SlotFilter::Encloses { from, to })
            .await?;

        if let Some(outer) = enclosing.first() {
            // Remainder before shrink, so a failed write never drops `[to, outer.to)`.
            self.repository
                .insert(NewTimeSlot {
                    doctor_id: doctor_id.to_string(),
                    from: to,
                    to: outer.to,
                })
                .await?;
            self.repository.update_endpoints(outer, None, Some(from)).await?;
            return Ok(());
        }

        for slot in self.repository.find(doctor_id, SlotFilter::LeftEdge { from, to }).await? {
            self.repository.update_endpoints(&slot, None, Some(from)).await?;
        }
        for slot in self.repository.find(doctor_id, SlotFilter::RightEdge { from, to }).await? {
            self.repository.update_endpoints(&slot, Some(to), None).await?;
        }

        Ok(())
    }

    /// Slots lying entirely inside `[from, to)`, ordered by start. Slots that
    /// only overlap the window are left out.
    pub async fn find_available_time_slots(
        &self,
        doctor_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<TimeSlotView>, TimeSlotError> {
        self.validate_doctor_id(doctor_id).await?;
        if from >= to {
            return Ok(Vec::new());
        }
        let _guard = self.locks.acquire(doctor_id).await;

        let mut slots = self
            .repository
            .find(doctor_id, SlotFilter::ContainedIn { from, to })
            .await?;
        slots.sort_by_key(|slot| slot.from);

        Ok(slots.iter().map(TimeSlotView::from).collect())
    }

    async fn validate_doctor_id(&self, doctor_id: &str) -> Result<(), TimeSlotError> {
        if !self.doctors.exists(doctor_id).await? {
            return Err(TimeSlotError::OwnerNotFound(doctor_id.to_string()));
        }
        Ok(())
    }
}
