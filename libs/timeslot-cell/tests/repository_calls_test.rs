use std::sync::Arc;

use assert_matches::assert_matches;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::mock;
use mockall::predicate::eq;
use uuid::Uuid;

use shared_database::memory::InMemoryDirectory;
use shared_utils::test_utils::{at, TEST_DOCTOR_ID};
use timeslot_cell::*;

mock! {
    pub Repository {}

    #[async_trait]
    impl TimeSlotRepository for Repository {
        async fn find(&self, doctor_id: &str, filter: SlotFilter) -> Result<Vec<TimeSlot>, TimeSlotError>;
        async fn insert(&self, slot: NewTimeSlot) -> Result<TimeSlot, TimeSlotError>;
        async fn update_endpoints(
            &self,
            slot: &TimeSlot,
            from: Option<DateTime<Utc>>,
            to: Option<DateTime<Utc>>,
        ) -> Result<TimeSlot, TimeSlotError>;
        async fn delete_where(&self, doctor_id: &str, filter: SlotFilter) -> Result<u64, TimeSlotError>;
        async fn delete(&self, id: Uuid) -> Result<(), TimeSlotError>;
    }
}

fn service_with(repository: MockRepository) -> TimeSlotService {
    TimeSlotService::new(Arc::new(repository), Arc::new(InMemoryDirectory::seeded()))
}

fn stored(from: &str, to: &str) -> TimeSlot {
    TimeSlot {
        id: Uuid::new_v4(),
        doctor_id: TEST_DOCTOR_ID.to_string(),
        from: at(from),
        to: at(to),
    }
}

fn range(from: &str, to: &str) -> SlotRange {
    SlotRange::new(at(from), at(to)).unwrap()
}

#[tokio::test]
async fn test_storage_failure_is_surfaced() {
    let mut repository = MockRepository::new();
    repository
        .expect_find()
        .returning(|_, _| Err(TimeSlotError::RepositoryUnavailable("connection refused".to_string())));

    let service = service_with(repository);
    let result = service.add_time_slot(TEST_DOCTOR_ID, range("09:00", "10:00")).await;

    assert_matches!(result, Err(TimeSlotError::RepositoryUnavailable(msg)) if msg == "connection refused");
}

#[tokio::test]
async fn test_duplicate_add_writes_nothing() {
    let existing = stored("09:00", "10:00");
    let mut repository = MockRepository::new();
    repository
        .expect_find()
        .times(1)
        .returning(move |_, _| Ok(vec![existing.clone()]));
    repository.expect_insert().never();
    repository.expect_update_endpoints().never();
    repository.expect_delete().never();

    let service = service_with(repository);
    service
        .add_time_slot(TEST_DOCTOR_ID, range("09:00", "10:00"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_merge_keeps_earliest_record_and_deletes_the_rest() {
    let left = stored("09:00", "10:00");
    let right = stored("11:00", "12:00");
    let (left_id, right_id) = (left.id, right.id);

    let mut repository = MockRepository::new();
    let found = vec![left.clone(), right.clone()];
    repository
        .expect_find()
        .withf(|doctor_id, filter| doctor_id == TEST_DOCTOR_ID && matches!(filter, SlotFilter::Touching { .. }))
        .times(1)
        .returning(move |_, _| Ok(found.clone()));
    repository
        .expect_delete()
        .with(eq(right_id))
        .times(1)
        .returning(|_| Ok(()));
    repository
        .expect_update_endpoints()
        .withf(move |slot, from, to| slot.id == left_id && from.is_none() && *to == Some(at("12:00")))
        .times(1)
        .returning(|slot, _, to| {
            Ok(TimeSlot {
                to: to.unwrap_or(slot.to),
                ..slot.clone()
            })
        });
    repository.expect_insert().never();

    let service = service_with(repository);
    service
        .add_time_slot(TEST_DOCTOR_ID, range("09:30", "11:30"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_split_shrinks_outer_slot_and_inserts_remainder() {
    let outer = stored("09:00", "12:00");
    let outer_id = outer.id;

    let mut repository = MockRepository::new();
    repository
        .expect_delete_where()
        .withf(|_, filter| matches!(filter, SlotFilter::ContainedIn { .. }))
        .times(1)
        .returning(|_, _| Ok(0));
    repository
        .expect_find()
        .withf(|_, filter| matches!(filter, SlotFilter::Encloses { .. }))
        .times(1)
        .returning(move |_, _| Ok(vec![outer.clone()]));
    repository
        .expect_update_endpoints()
        .withf(move |slot, from, to| slot.id == outer_id && from.is_none() && *to == Some(at("10:00")))
        .times(1)
        .returning(|slot, _, _| Ok(slot.clone()));
    repository
        .expect_insert()
        .with(eq(NewTimeSlot {
            doctor_id: TEST_DOCTOR_ID.to_string(),
            from: at("11:00"),
            to: at("12:00"),
        }))
        .times(1)
        .returning(|slot| Ok(slot.into_time_slot()));

    let service = service_with(repository);
    service
        .remove_time_slot(TEST_DOCTOR_ID, range("10:00", "11:00"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_failed_widen_deletes_nothing() {
    let left = stored("09:00", "10:00");
    let right = stored("11:00", "12:00");

    let mut repository = MockRepository::new();
    let found = vec![left, right];
    repository
        .expect_find()
        .times(1)
        .returning(move |_, _| Ok(found.clone()));
    repository
        .expect_update_endpoints()
        .times(1)
        .returning(|_, _, _| Err(TimeSlotError::RepositoryUnavailable("down".to_string())));
    repository.expect_delete().never();
    repository.expect_insert().never();

    let service = service_with(repository);
    let result = service.add_time_slot(TEST_DOCTOR_ID, range("09:30", "11:30")).await;

    assert_matches!(result, Err(TimeSlotError::RepositoryUnavailable(_)));
}

#[tokio::test]
async fn test_failed_remainder_insert_leaves_outer_slot_whole() {
    let outer = stored("09:00", "12:00");

    let mut repository = MockRepository::new();
    repository.expect_delete_where().returning(|_, _| Ok(0));
    repository
        .expect_find()
        .withf(|_, filter| matches!(filter, SlotFilter::Encloses { .. }))
        .returning(move |_, _| Ok(vec![outer.clone()]));
    repository
        .expect_insert()
        .times(1)
        .returning(|_| Err(TimeSlotError::RepositoryUnavailable("down".to_string())));
    repository.expect_update_endpoints().never();

    let service = service_with(repository);
    let result = service.remove_time_slot(TEST_DOCTOR_ID, range("10:00", "11:00")).await;

    assert_matches!(result, Err(TimeSlotError::RepositoryUnavailable(_)));
}

/// In-memory storage whose endpoint updates always fail.
struct FailingUpdates(InMemoryTimeSlotRepository);

#[async_trait]
impl TimeSlotRepository for FailingUpdates {
    async fn find(&self, doctor_id: &str, filter: SlotFilter) -> Result<Vec<TimeSlot>, TimeSlotError> {
        self.0.find(doctor_id, filter).await
    }

    async fn insert(&self, slot: NewTimeSlot) -> Result<TimeSlot, TimeSlotError> {
        self.0.insert(slot).await
    }

    async fn update_endpoints(
        &self,
        _slot: &TimeSlot,
        _from: Option<DateTime<Utc>>,
        _to: Option<DateTime<Utc>>,
    ) -> Result<TimeSlot, TimeSlotError> {
        Err(TimeSlotError::RepositoryUnavailable("down".to_string()))
    }

    async fn delete_where(&self, doctor_id: &str, filter: SlotFilter) -> Result<u64, TimeSlotError> {
        self.0.delete_where(doctor_id, filter).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), TimeSlotError> {
        self.0.delete(id).await
    }
}

#[tokio::test]
async fn test_failed_merge_keeps_existing_availability() {
    let repository = Arc::new(FailingUpdates(InMemoryTimeSlotRepository::new()));
    for (from, to) in [("09:00", "10:00"), ("11:00", "12:00")] {
        repository
            .0
            .insert(NewTimeSlot {
                doctor_id: TEST_DOCTOR_ID.to_string(),
                from: at(from),
                to: at(to),
            })
            .await
            .unwrap();
    }
    let service = TimeSlotService::new(repository.clone(), Arc::new(InMemoryDirectory::seeded()));

    let result = service.add_time_slot(TEST_DOCTOR_ID, range("09:30", "11:30")).await;

    assert_matches!(result, Err(TimeSlotError::RepositoryUnavailable(_)));
    let remaining: Vec<_> = repository
        .0
        .slots_for(TEST_DOCTOR_ID)
        .await
        .into_iter()
        .map(|slot| (slot.from, slot.to))
        .collect();
    assert_eq!(
        remaining,
        vec![(at("09:00"), at("10:00")), (at("11:00"), at("12:00"))]
    );
}

#[tokio::test]
async fn test_unknown_doctor_never_reaches_storage() {
    let mut repository = MockRepository::new();
    repository.expect_find().never();
    repository.expect_delete_where().never();

    let service = service_with(repository);
    let result = service.remove_time_slot("DOC-404", range("10:00", "11:00")).await;

    assert_matches!(result, Err(TimeSlotError::OwnerNotFound(_)));
}
