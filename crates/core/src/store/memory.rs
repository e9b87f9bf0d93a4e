//! In-memory planning store.

use std::collections::HashMap;

use async_trait::async_trait;
use planbook_shared::{PageRequest, RecordId};
use tokio::sync::RwLock;

use super::{PlanningStore, RecordFacets, RecordFilter, RecordGuard, RecordMutation, StoreError};
use crate::error::PlanningError;
use crate::policy::QueryScope;
use crate::record::{PlanningRecord, RecordKind};

/// Planning store held in process memory.
///
/// Every write takes the map's write lock for its whole read-modify-write.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<RecordId, PlanningRecord>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records of every kind.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// True when no record is stored.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

fn same_key(a: &PlanningRecord, b: &PlanningRecord) -> bool {
    a.kind() == b.kind()
        && a.owner == b.owner
        && a.customer == b.customer
        && a.item == b.item
        && a.current_year == b.current_year
}

fn key_taken(records: &HashMap<RecordId, PlanningRecord>, candidate: &PlanningRecord) -> bool {
    records
        .values()
        .any(|other| other.id != candidate.id && same_key(other, candidate))
}

#[async_trait]
impl PlanningStore for MemoryStore {
    async fn insert(&self, record: PlanningRecord) -> Result<PlanningRecord, StoreError> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.id) || key_taken(&records, &record) {
            return Err(StoreError::Duplicate);
        }
        records.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find(
        &self,
        kind: RecordKind,
        id: RecordId,
    ) -> Result<Option<PlanningRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records.get(&id).filter(|r| r.kind() == kind).cloned())
    }

    async fn list(
        &self,
        kind: RecordKind,
        scope: &QueryScope,
        filter: &RecordFilter,
        page: PageRequest,
    ) -> Result<(Vec<PlanningRecord>, u64), StoreError> {
        let records = self.records.read().await;
        let mut matching: Vec<&PlanningRecord> = records
            .values()
            .filter(|r| r.kind() == kind && scope.matches(r) && filter.matches(r))
            .collect();
        matching.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));

        let total = matching.len() as u64;
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(page.limit()).unwrap_or(usize::MAX);
        let data = matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();
        Ok((data, total))
    }

    async fn facets(
        &self,
        kind: RecordKind,
        scope: &QueryScope,
    ) -> Result<RecordFacets, StoreError> {
        let records = self.records.read().await;
        Ok(RecordFacets::collect(
            records
                .values()
                .filter(|r| r.kind() == kind && scope.matches(r)),
        ))
    }

    async fn update_with(
        &self,
        kind: RecordKind,
        id: RecordId,
        mutation: RecordMutation<'_>,
    ) -> Result<PlanningRecord, PlanningError> {
        let mut records = self.records.write().await;
        let mut working = records
            .get(&id)
            .filter(|r| r.kind() == kind)
            .cloned()
            .ok_or(PlanningError::NotFound(id))?;

        mutation(&mut working)?;
        if key_taken(&records, &working) {
            return Err(PlanningError::DuplicateRecord);
        }
        records.insert(id, working.clone());
        Ok(working)
    }

    async fn delete_with(
        &self,
        kind: RecordKind,
        id: RecordId,
        guard: RecordGuard<'_>,
    ) -> Result<PlanningRecord, PlanningError> {
        let mut records = self.records.write().await;
        let record = records
            .get(&id)
            .filter(|r| r.kind() == kind)
            .ok_or(PlanningError::NotFound(id))?;
        guard(record)?;
        records.remove(&id).ok_or(PlanningError::NotFound(id))
    }
}
