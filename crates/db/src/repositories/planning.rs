//! PostgreSQL planning store.
//!
//! Every write runs in its own database transaction. Updates and deletes
//! lock the row with `SELECT ... FOR UPDATE` before the core sees it, so two
//! concurrent mutations of one record serialize and the caches written are
//! always those computed from the yearly values written with them.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, SqlErr,
    TransactionTrait,
};
use tracing::warn;

use planbook_core::error::PlanningError;
use planbook_core::policy::QueryScope;
use planbook_core::record::{PlanningRecord, RecordDetails, RecordKind};
use planbook_core::store::{
    PlanningStore, RecordFacets, RecordFilter, RecordGuard, RecordMutation, StoreError,
};
use planbook_core::workflow::PlanningStatus;
use planbook_shared::{PageRequest, RecordId, UserId};

use crate::entities::planning_records::{self, Column, Entity};

/// Planning store backed by the `planning_records` table.
#[derive(Debug, Clone)]
pub struct PlanningRepository {
    db: DatabaseConnection,
}

impl PlanningRepository {
    /// Creates a new planning repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn scoped(kind: RecordKind, scope: &QueryScope) -> Select<Entity> {
        Entity::find()
            .filter(Column::Kind.eq(kind.as_str()))
            .filter(scope_condition(scope))
    }

    async fn distinct(
        &self,
        kind: RecordKind,
        scope: &QueryScope,
        column: Column,
    ) -> Result<Vec<String>, DbErr> {
        Self::scoped(kind, scope)
            .select_only()
            .column(column)
            .distinct()
            .into_tuple()
            .all(&self.db)
            .await
    }
}

/// Restricts a query to the rows visible under `scope`.
pub(crate) fn scope_condition(scope: &QueryScope) -> Condition {
    match scope {
        QueryScope::All => Condition::all(),
        QueryScope::DepartmentOrOwner { department, owner } => Condition::any()
            .add(Column::OwnerId.eq(owner.into_inner()))
            .add(Column::Department.eq(department.as_str())),
        QueryScope::Owner(owner) => Condition::all().add(Column::OwnerId.eq(owner.into_inner())),
    }
}

/// Translates list filters. Text filters match case-insensitive substrings.
pub(crate) fn filter_condition(filter: &RecordFilter) -> Condition {
    let mut condition = Condition::all();
    let text_filters = [
        (Column::Customer, filter.customer.as_ref()),
        (Column::Category, filter.category.as_ref()),
        (Column::Brand, filter.brand.as_ref()),
    ];
    for (column, needle) in text_filters {
        if let Some(needle) = needle {
            let pattern = format!("%{}%", escape_like(&needle.to_lowercase()));
            condition = condition.add(
                Expr::expr(Func::lower(Expr::col(column))).like(LikeExpr::new(pattern).escape('\\')),
            );
        }
    }
    if let Some(year) = filter.year {
        condition = condition.add(Column::CurrentYear.eq(year));
    }
    if let Some(status) = filter.status {
        condition = condition.add(Column::Status.eq(status.as_str()));
    }
    condition
}

/// Escapes LIKE wildcards so user text matches literally.
pub(crate) fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Maps a database error, recognizing uniqueness violations.
pub(crate) fn store_error(err: DbErr) -> StoreError {
    if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        StoreError::Duplicate
    } else {
        StoreError::Backend(err.to_string())
    }
}

fn planning_error(err: DbErr) -> PlanningError {
    store_error(err).into()
}

fn corrupt(id: uuid::Uuid, what: &str) -> StoreError {
    warn!(record_id = %id, what, "unreadable planning record row");
    StoreError::Backend(format!("record {id} has an invalid {what}"))
}

/// Converts a domain record into a row.
pub(crate) fn to_model(record: &PlanningRecord) -> Result<planning_records::Model, StoreError> {
    let json = |value: serde_json::Result<serde_json::Value>| {
        value.map_err(|e| StoreError::Backend(e.to_string()))
    };
    Ok(planning_records::Model {
        id: record.id.into_inner(),
        kind: record.kind().as_str().to_string(),
        owner_id: record.owner.into_inner(),
        department: record.department.clone(),
        customer: record.customer.clone(),
        item: record.item.clone(),
        category: record.category.clone(),
        brand: record.brand.clone(),
        current_year: record.current_year,
        target_year: record.target_year,
        yearly_values: json(serde_json::to_value(&record.yearly_values))?,
        monthly_values: json(serde_json::to_value(&record.monthly_values))?,
        current_year_cache: record.current_year_cache,
        next_year_cache: record.next_year_cache,
        status: record.status.as_str().to_string(),
        approved_by: record.approved_by.map(UserId::into_inner),
        approved_at: record.approved_at.map(Into::into),
        submitted_at: record.submitted_at.map(Into::into),
        details: json(serde_json::to_value(&record.details))?,
        created_at: record.created_at.into(),
        updated_at: record.updated_at.into(),
    })
}

/// Converts a row into a domain record.
pub(crate) fn to_domain(model: planning_records::Model) -> Result<PlanningRecord, StoreError> {
    let id = model.id;
    let kind = RecordKind::parse(&model.kind).ok_or_else(|| corrupt(id, "kind"))?;
    let status = PlanningStatus::parse(&model.status).ok_or_else(|| corrupt(id, "status"))?;
    let yearly_values =
        serde_json::from_value(model.yearly_values).map_err(|_| corrupt(id, "yearly_values"))?;
    let monthly_values =
        serde_json::from_value(model.monthly_values).map_err(|_| corrupt(id, "monthly_values"))?;
    let details: RecordDetails =
        serde_json::from_value(model.details).map_err(|_| corrupt(id, "details"))?;
    if details.kind() != kind {
        return Err(corrupt(id, "details"));
    }

    Ok(PlanningRecord {
        id: RecordId::from_uuid(id),
        owner: UserId::from_uuid(model.owner_id),
        department: model.department,
        customer: model.customer,
        item: model.item,
        category: model.category,
        brand: model.brand,
        current_year: model.current_year,
        target_year: model.target_year,
        yearly_values,
        monthly_values,
        current_year_cache: model.current_year_cache,
        next_year_cache: model.next_year_cache,
        status,
        approved_by: model.approved_by.map(UserId::from_uuid),
        approved_at: model.approved_at.map(|t| t.with_timezone(&Utc)),
        submitted_at: model.submitted_at.map(|t| t.with_timezone(&Utc)),
        details,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}

#[async_trait]
impl PlanningStore for PlanningRepository {
    async fn insert(&self, record: PlanningRecord) -> Result<PlanningRecord, StoreError> {
        let active = to_model(&record)?.into_active_model().reset_all();
        let model = active.insert(&self.db).await.map_err(store_error)?;
        to_domain(model)
    }

    async fn find(
        &self,
        kind: RecordKind,
        id: RecordId,
    ) -> Result<Option<PlanningRecord>, StoreError> {
        Entity::find_by_id(id.into_inner())
            .filter(Column::Kind.eq(kind.as_str()))
            .one(&self.db)
            .await
            .map_err(store_error)?
            .map(to_domain)
            .transpose()
    }

    async fn list(
        &self,
        kind: RecordKind,
        scope: &QueryScope,
        filter: &RecordFilter,
        page: PageRequest,
    ) -> Result<(Vec<PlanningRecord>, u64), StoreError> {
        let query = Self::scoped(kind, scope).filter(filter_condition(filter));

        let total = query.clone().count(&self.db).await.map_err(store_error)?;
        let models = query
            .order_by_desc(Column::UpdatedAt)
            .order_by_desc(Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(store_error)?;

        let records = models
            .into_iter()
            .map(to_domain)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((records, total))
    }

    async fn facets(
        &self,
        kind: RecordKind,
        scope: &QueryScope,
    ) -> Result<RecordFacets, StoreError> {
        let customers = self.distinct(kind, scope, Column::Customer).await;
        let categories = self.distinct(kind, scope, Column::Category).await;
        let brands = self.distinct(kind, scope, Column::Brand).await;
        let items = self.distinct(kind, scope, Column::Item).await;
        let statuses = self.distinct(kind, scope, Column::Status).await;

        Ok(RecordFacets::from_parts(
            customers.map_err(store_error)?,
            categories.map_err(store_error)?,
            brands.map_err(store_error)?,
            items.map_err(store_error)?,
            statuses
                .map_err(store_error)?
                .into_iter()
                .filter_map(|status| PlanningStatus::parse(&status)),
        ))
    }

    async fn update_with(
        &self,
        kind: RecordKind,
        id: RecordId,
        mutation: RecordMutation<'_>,
    ) -> Result<PlanningRecord, PlanningError> {
        let txn = self.db.begin().await.map_err(planning_error)?;

        let model = Entity::find_by_id(id.into_inner())
            .filter(Column::Kind.eq(kind.as_str()))
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(planning_error)?
            .ok_or(PlanningError::NotFound(id))?;
        let mut record = to_domain(model)?;

        // Dropping the transaction on error rolls it back.
        mutation(&mut record)?;

        let active = to_model(&record)?.into_active_model().reset_all();
        let updated = active.update(&txn).await.map_err(planning_error)?;
        txn.commit().await.map_err(planning_error)?;

        to_domain(updated).map_err(PlanningError::from)
    }

    async fn delete_with(
        &self,
        kind: RecordKind,
        id: RecordId,
        guard: RecordGuard<'_>,
    ) -> Result<PlanningRecord, PlanningError> {
        let txn = self.db.begin().await.map_err(planning_error)?;

        let model = Entity::find_by_id(id.into_inner())
            .filter(Column::Kind.eq(kind.as_str()))
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(planning_error)?
            .ok_or(PlanningError::NotFound(id))?;
        let record = to_domain(model)?;

        guard(&record)?;

        Entity::delete_by_id(id.into_inner())
            .exec(&txn)
            .await
            .map_err(planning_error)?;
        txn.commit().await.map_err(planning_error)?;

        Ok(record)
    }
}
