//! Keeps the current/next year caches in step with the yearly figures.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::record::model::PlanningRecord;

/// Stateless cache synchronizer. Runs before every persistence.
pub struct Synchronizer;

impl Synchronizer {
    /// The caches implied by the record's yearly figures.
    #[must_use]
    pub fn expected_caches(record: &PlanningRecord) -> (Decimal, Decimal) {
        let field = record.kind().primary_field();
        (
            record.get_year_value(record.current_year, field),
            record.get_year_value(record.target_year, field),
        )
    }

    /// Re-derives both caches from the yearly figures.
    pub fn synchronize(record: &mut PlanningRecord) {
        let (current, next) = Self::expected_caches(record);
        record.current_year_cache = current;
        record.next_year_cache = next;
    }

    /// True when the caches agree with the yearly figures.
    #[must_use]
    pub fn is_consistent(record: &PlanningRecord) -> bool {
        Self::expected_caches(record) == (record.current_year_cache, record.next_year_cache)
    }

    /// Synchronizes and stamps `updated_at`. Call once per successful mutation.
    pub fn finalize(record: &mut PlanningRecord, now: DateTime<Utc>) {
        Self::synchronize(record);
        record.updated_at = now;
    }
}
