//! Planning operations.
//!
//! [`PlanningService`] is the single entry point for reading and changing
//! planning records. Every operation runs the access policy, then works on
//! the record inside one store write unit, then synchronizes the caches.

mod input;


use std::sync::Arc;

use planbook_shared::{PageRequest, PageResponse, PlanningConfig, RecordId};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::accuracy::AccuracyEvaluator;
use crate::error::PlanningError;
use crate::policy::{AccessPolicy, Actor, Operation};
use crate::record::{
    NewRecord, PlanningRecord, RecordDetails, RecordKind, Synchronizer, YearField, amount,
};
use crate::store::{PlanningStore, RecordFilter};
use crate::temporal::TemporalContext;
use crate::workflow::{PlanningStatus, WorkflowService};

pub use input::{
    CreateRecordInput, FilterOptions, MAX_LABEL_LEN, MAX_NAME_LEN, MonthlyInput,
    UpdateRecordInput, YearlyInput,
};
use input::{check_year, required_text};

/// Orchestrates planning operations over a [`PlanningStore`].
#[derive(Clone)]
pub struct PlanningService {
    store: Arc<dyn PlanningStore>,
    temporal: TemporalContext,
    config: PlanningConfig,
}

impl std::fmt::Debug for PlanningService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlanningService")
            .field("temporal", &self.temporal)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl PlanningService {
    /// Creates a service.
    pub fn new(
        store: Arc<dyn PlanningStore>,
        temporal: TemporalContext,
        config: PlanningConfig,
    ) -> Self {
        Self {
            store,
            temporal,
            config,
        }
    }

    /// The calendar the service plans against.
    pub fn temporal(&self) -> &TemporalContext {
        &self.temporal
    }

    /// Builds a page request from optional query values, applying the configured
    /// default and maximum page size.
    pub fn page_request(&self, page: Option<u32>, per_page: Option<u32>) -> PageRequest {
        PageRequest::new(
            page.unwrap_or(1),
            per_page.unwrap_or(self.config.default_per_page),
            self.config.max_per_page,
        )
    }

    /// Lists the records of `kind` visible to `actor`.
    pub async fn list(
        &self,
        actor: &Actor,
        kind: RecordKind,
        filter: RecordFilter,
        page: PageRequest,
    ) -> Result<PageResponse<PlanningRecord>, PlanningError> {
        let scope = AccessPolicy::scope(actor);
        let filter = filter.normalized();
        let page = PageRequest::new(page.page, page.per_page, self.config.max_per_page);

        let result = self.store.list(kind, &scope, &filter, page).await;
        let (records, total) = observe("list", actor, result.map_err(PlanningError::from))?;
        debug!(actor = %actor.id, %kind, total, "listed planning records");
        Ok(PageResponse::new(records, page, total))
    }

    /// Creates a draft record owned by `actor`.
    pub async fn create(
        &self,
        actor: &Actor,
        kind: RecordKind,
        input: CreateRecordInput,
    ) -> Result<PlanningRecord, PlanningError> {
        let result = self.build_record(actor, kind, &input);
        let record = observe("create", actor, result)?;

        let result = self.store.insert(record).await.map_err(PlanningError::from);
        let record = observe("create", actor, result)?;
        info!(
            record_id = %record.id,
            actor = %actor.id,
            %kind,
            year = record.current_year,
            "planning record created"
        );
        Ok(record)
    }

    fn build_record(
        &self,
        actor: &Actor,
        kind: RecordKind,
        input: &CreateRecordInput,
    ) -> Result<PlanningRecord, PlanningError> {
        if !actor.role.can_create() {
            return Err(PlanningError::denied(format!(
                "{} may not create {kind} records",
                actor.role
            )));
        }

        let window = self.temporal.year_window();
        let current_year = match input.year {
            Some(year) => {
                check_year(year, &window)?;
                year
            }
            None => self.temporal.current_year(),
        };

        let now = self.temporal.now();
        let mut record = PlanningRecord::new(
            NewRecord {
                owner: actor.id,
                department: actor.department.clone(),
                customer: required_text("customer", input.customer.as_ref(), MAX_NAME_LEN)?,
                item: required_text("item", input.item.as_ref(), MAX_NAME_LEN)?,
                category: required_text("category", input.category.as_ref(), MAX_LABEL_LEN)?,
                brand: required_text("brand", input.brand.as_ref(), MAX_LABEL_LEN)?,
                current_year,
                details: RecordDetails::for_kind(kind),
            },
            now,
        );
        let figures = input.figures();
        figures.apply(&mut record, &window)?;
        if figures.supplies_actual(record.current_year) {
            rescore(&mut record);
        }
        Synchronizer::finalize(&mut record, now);
        Ok(record)
    }

    /// Loads one record visible to `actor`.
    pub async fn get(
        &self,
        actor: &Actor,
        kind: RecordKind,
        id: RecordId,
    ) -> Result<PlanningRecord, PlanningError> {
        let result = match self.store.find(kind, id).await {
            Ok(Some(record)) if AccessPolicy::can_access(actor, &record) => Ok(record),
            Ok(_) => Err(PlanningError::NotFound(id)),
            Err(err) => Err(err.into()),
        };
        observe("get", actor, result)
    }

    /// Applies a partial update.
    pub async fn update(
        &self,
        actor: &Actor,
        kind: RecordKind,
        id: RecordId,
        input: UpdateRecordInput,
    ) -> Result<PlanningRecord, PlanningError> {
        let window = self.temporal.year_window();
        let now = self.temporal.now();
        let result = self
            .store
            .update_with(kind, id, &mut |record: &mut PlanningRecord| {
                gate(actor, record, Operation::Modify)?;
                input.apply_fields(record)?;
                let figures = input.figures();
                figures.apply(record, &window)?;
                if figures.supplies_actual(record.current_year) {
                    rescore(record);
                }
                Synchronizer::finalize(record, now);
                Ok(())
            })
            .await;
        let record = observe("update", actor, result)?;
        info!(record_id = %id, actor = %actor.id, %kind, "planning record updated");
        Ok(record)
    }

    /// Deletes a draft record.
    pub async fn delete(
        &self,
        actor: &Actor,
        kind: RecordKind,
        id: RecordId,
    ) -> Result<(), PlanningError> {
        let result = self
            .store
            .delete_with(kind, id, &|record: &PlanningRecord| {
                gate(actor, record, Operation::Delete)
            })
            .await;
        observe("delete", actor, result)?;
        info!(record_id = %id, actor = %actor.id, %kind, "planning record deleted");
        Ok(())
    }

    /// Sets one month of one year.
    pub async fn set_month(
        &self,
        actor: &Actor,
        kind: RecordKind,
        id: RecordId,
        year: i32,
        month: u32,
        value: &Value,
    ) -> Result<PlanningRecord, PlanningError> {
        let window = self.temporal.year_window();
        let now = self.temporal.now();
        let result = self
            .store
            .update_with(kind, id, &mut |record: &mut PlanningRecord| {
                gate(actor, record, Operation::Modify)?;
                check_year(year, &window)?;
                let amount = amount::coerce(value, "amount")?;
                record.update_month(year, month, amount)?;
                Synchronizer::finalize(record, now);
                Ok(())
            })
            .await;
        let record = observe("set_month", actor, result)?;
        info!(record_id = %id, actor = %actor.id, year, month, "planning month set");
        Ok(record)
    }

    /// Moves a record along the workflow.
    pub async fn transition_status(
        &self,
        actor: &Actor,
        kind: RecordKind,
        id: RecordId,
        target: PlanningStatus,
    ) -> Result<PlanningRecord, PlanningError> {
        let now = self.temporal.now();
        let mut change = None;
        let result = self
            .store
            .update_with(kind, id, &mut |record: &mut PlanningRecord| {
                if !AccessPolicy::can_access(actor, record) {
                    return Err(PlanningError::NotFound(record.id));
                }
                change = Some(WorkflowService::transition(record, actor, target, now)?);
                Synchronizer::finalize(record, now);
                Ok(())
            })
            .await;
        let record = observe("transition_status", actor, result)?;
        if let Some(change) = change {
            info!(
                record_id = %id,
                actor = %change.changed_by,
                from = %change.from,
                to = %change.to,
                "planning record status changed"
            );
        }
        Ok(record)
    }

    /// Stores the current-year actual and re-scores a forecast against it.
    pub async fn record_actual(
        &self,
        actor: &Actor,
        kind: RecordKind,
        id: RecordId,
        value: &Value,
    ) -> Result<PlanningRecord, PlanningError> {
        let now = self.temporal.now();
        let result = self
            .store
            .update_with(kind, id, &mut |record: &mut PlanningRecord| {
                gate(actor, record, Operation::RecordActual)?;
                let actual = amount::coerce(value, "actual")?;
                record.set_year_value(record.current_year, YearField::Actual, actual)?;
                AccuracyEvaluator::update_accuracy(record, actual);
                Synchronizer::finalize(record, now);
                Ok(())
            })
            .await;
        let record = observe("record_actual", actor, result)?;
        info!(record_id = %id, actor = %actor.id, %kind, "planning actual recorded");
        Ok(record)
    }

    /// Distinct filter values of the records visible to `actor`.
    pub async fn filter_options(
        &self,
        actor: &Actor,
        kind: RecordKind,
    ) -> Result<FilterOptions, PlanningError> {
        let scope = AccessPolicy::scope(actor);
        let result = self.store.facets(kind, &scope).await.map_err(PlanningError::from);
        let facets = observe("filter_options", actor, result)?;
        Ok(FilterOptions {
            facets,
            available_years: self.temporal.available_years(),
        })
    }
}

/// Passes when `actor` may perform `operation` on `record`.
///
/// Records outside the actor's visibility are reported as missing.
fn gate(actor: &Actor, record: &PlanningRecord, operation: Operation) -> Result<(), PlanningError> {
    if !AccessPolicy::can_access(actor, record) {
        return Err(PlanningError::NotFound(record.id));
    }
    if !AccessPolicy::authorize(actor, record, operation) {
        return Err(PlanningError::denied(format!(
            "{} may not {} this {} record",
            actor.role,
            operation.as_str(),
            record.status
        )));
    }
    Ok(())
}

/// Scores a forecast against the current-year actual it now holds.
fn rescore(record: &mut PlanningRecord) {
    Synchronizer::synchronize(record);
    let actual = record.get_year_value(record.current_year, YearField::Actual);
    AccuracyEvaluator::update_accuracy(record, actual);
}

/// Logs a failed operation at a level matching its cause.
fn observe<T>(
    operation: &'static str,
    actor: &Actor,
    result: Result<T, PlanningError>,
) -> Result<T, PlanningError> {
    if let Err(err) = &result {
        match err {
            PlanningError::PermissionDenied(_) => {
                warn!(operation, actor = %actor.id, role = %actor.role, error = %err, "planning operation denied");
            }
            PlanningError::Storage(_) => {
                error!(operation, actor = %actor.id, error = %err, "planning store failed");
            }
            _ => {
                debug!(operation, actor = %actor.id, code = err.error_code(), error = %err, "planning operation rejected");
            }
        }
    }
    result
}
