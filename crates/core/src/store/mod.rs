//! Storage seam for planning records.
//!
//! The core never talks to a database. It works through [`PlanningStore`],
//! implemented in memory here and on PostgreSQL by the db crate.

mod memory;

use async_trait::async_trait;
use planbook_shared::{PageRequest, RecordId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::PlanningError;
use crate::policy::QueryScope;
use crate::record::{PlanningRecord, RecordKind};
use crate::workflow::PlanningStatus;

pub use memory::MemoryStore;

/// Errors raised by a store implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The uniqueness key is already taken.
    #[error("duplicate record")]
    Duplicate,
    /// The backend failed.
    #[error("{0}")]
    Backend(String),
}

impl From<StoreError> for PlanningError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate => Self::DuplicateRecord,
            StoreError::Backend(message) => Self::Storage(message),
        }
    }
}

/// List filters. Text filters are case-insensitive substring matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFilter {
    /// Customer contains.
    pub customer: Option<String>,
    /// Category contains.
    pub category: Option<String>,
    /// Brand contains.
    pub brand: Option<String>,
    /// Planning year equals.
    pub year: Option<i32>,
    /// Status equals.
    pub status: Option<PlanningStatus>,
}

impl RecordFilter {
    /// Drops blank text filters and trims the rest.
    #[must_use]
    pub fn normalized(self) -> Self {
        fn clean(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }
        Self {
            customer: clean(self.customer),
            category: clean(self.category),
            brand: clean(self.brand),
            year: self.year,
            status: self.status,
        }
    }

    /// Evaluates the filter against a single record.
    #[must_use]
    pub fn matches(&self, record: &PlanningRecord) -> bool {
        fn contains(haystack: &str, needle: Option<&String>) -> bool {
            needle.is_none_or(|needle| haystack.to_lowercase().contains(&needle.to_lowercase()))
        }
        contains(&record.customer, self.customer.as_ref())
            && contains(&record.category, self.category.as_ref())
            && contains(&record.brand, self.brand.as_ref())
            && self.year.is_none_or(|year| record.current_year == year)
            && self.status.is_none_or(|status| record.status == status)
    }
}

/// Distinct values present in the visible records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFacets {
    /// Customers, sorted.
    pub customers: Vec<String>,
    /// Categories, sorted.
    pub categories: Vec<String>,
    /// Brands, sorted.
    pub brands: Vec<String>,
    /// Items, sorted.
    pub items: Vec<String>,
    /// Statuses in workflow order.
    pub statuses: Vec<PlanningStatus>,
}

impl RecordFacets {
    /// Collects facets from records already restricted to a scope.
    pub fn collect<'a>(records: impl IntoIterator<Item = &'a PlanningRecord>) -> Self {
        use std::collections::BTreeSet;

        let mut customers = BTreeSet::new();
        let mut categories = BTreeSet::new();
        let mut brands = BTreeSet::new();
        let mut items = BTreeSet::new();
        let mut statuses = Vec::new();
        for record in records {
            customers.insert(record.customer.clone());
            categories.insert(record.category.clone());
            brands.insert(record.brand.clone());
            items.insert(record.item.clone());
            if !statuses.contains(&record.status) {
                statuses.push(record.status);
            }
        }
        Self::from_parts(customers, categories, brands, items, statuses)
    }

    /// Builds facets from raw distinct values, dropping blanks and sorting.
    pub fn from_parts(
        customers: impl IntoIterator<Item = String>,
        categories: impl IntoIterator<Item = String>,
        brands: impl IntoIterator<Item = String>,
        items: impl IntoIterator<Item = String>,
        statuses: impl IntoIterator<Item = PlanningStatus>,
    ) -> Self {
        fn sorted(values: impl IntoIterator<Item = String>) -> Vec<String> {
            let mut values: Vec<String> = values
                .into_iter()
                .filter(|v| !v.trim().is_empty())
                .collect();
            values.sort();
            values.dedup();
            values
        }
        let present: Vec<PlanningStatus> = statuses.into_iter().collect();
        Self {
            customers: sorted(customers),
            categories: sorted(categories),
            brands: sorted(brands),
            items: sorted(items),
            statuses: PlanningStatus::ALL
                .into_iter()
                .filter(|s| present.contains(s))
                .collect(),
        }
    }
}

/// Closure applied to a record inside a store's write unit.
pub type RecordMutation<'a> =
    &'a mut (dyn FnMut(&mut PlanningRecord) -> Result<(), PlanningError> + Send);

/// Closure deciding whether a record may be removed.
pub type RecordGuard<'a> = &'a (dyn Fn(&PlanningRecord) -> Result<(), PlanningError> + Sync);

/// Persistence for planning records.
///
/// Every write runs as one atomic unit: a mutation either lands completely,
/// with the synchronized caches, or not at all.
#[async_trait]
pub trait PlanningStore: Send + Sync {
    /// Inserts a new record. Fails with `Duplicate` when the uniqueness key is taken.
    async fn insert(&self, record: PlanningRecord) -> Result<PlanningRecord, StoreError>;

    /// Loads a record of `kind` by id.
    async fn find(
        &self,
        kind: RecordKind,
        id: RecordId,
    ) -> Result<Option<PlanningRecord>, StoreError>;

    /// Lists records of `kind` visible under `scope`, newest update first.
    /// Returns one page and the total match count.
    async fn list(
        &self,
        kind: RecordKind,
        scope: &QueryScope,
        filter: &RecordFilter,
        page: PageRequest,
    ) -> Result<(Vec<PlanningRecord>, u64), StoreError>;

    /// Distinct field values of the records of `kind` visible under `scope`.
    async fn facets(&self, kind: RecordKind, scope: &QueryScope)
    -> Result<RecordFacets, StoreError>;

    /// Loads a record exclusively, applies `mutation` and persists the result.
    ///
    /// When `mutation` fails nothing is written and its error is returned.
    async fn update_with(
        &self,
        kind: RecordKind,
        id: RecordId,
        mutation: RecordMutation<'_>,
    ) -> Result<PlanningRecord, PlanningError>;

    /// Loads a record exclusively and removes it when `guard` passes.
    async fn delete_with(
        &self,
        kind: RecordKind,
        id: RecordId,
        guard: RecordGuard<'_>,
    ) -> Result<PlanningRecord, PlanningError>;
}
