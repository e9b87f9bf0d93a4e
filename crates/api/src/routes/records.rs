//! Budget and forecast routes.
//!
//! Both kinds share one set of handlers. The kind is fixed per mount point and
//! reaches the handlers as a request extension.

use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    AppState,
    error::ApiResult,
    extractors::{JsonBody, QueryParams},
    middleware::AuthUser,
};
use planbook_core::record::{MonthlyValues, PlanningRecord, RecordDetails, RecordKind, YearlyValues};
use planbook_core::service::{CreateRecordInput, FilterOptions, UpdateRecordInput};
use planbook_core::store::RecordFilter;
use planbook_core::workflow::PlanningStatus;
use planbook_shared::{PageResponse, RecordId};

/// Creates the routes for one record kind (requires auth middleware to be applied externally).
pub fn routes(kind: RecordKind) -> Router<AppState> {
    Router::new()
        .route("/", get(list_records).post(create_record))
        .route("/filters", get(filter_options))
        .route(
            "/{id}",
            get(get_record).patch(update_record).delete(delete_record),
        )
        .route("/{id}/months/{year}/{month}", put(set_month))
        .route("/{id}/status", post(transition_status))
        .route("/{id}/actual", post(record_actual))
        .layer(Extension(kind))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query string for listing records.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Page number, 1-based.
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
    /// Customer contains.
    pub customer: Option<String>,
    /// Category contains.
    pub category: Option<String>,
    /// Brand contains.
    pub brand: Option<String>,
    /// Planning year.
    pub year: Option<i32>,
    /// Workflow status.
    pub status: Option<PlanningStatus>,
}

/// Request body carrying a single amount.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AmountRequest {
    /// Amount as a JSON number or numeric string.
    pub amount: Value,
}

/// Request body for a status change.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatusRequest {
    /// Target status.
    pub status: PlanningStatus,
}

/// Response for a planning record.
#[derive(Debug, Serialize)]
pub struct RecordResponse {
    /// Record ID.
    pub id: Uuid,
    /// Owner user ID.
    pub owner_id: Uuid,
    /// Owner department.
    pub department: Option<String>,
    /// Customer name.
    pub customer: String,
    /// Item name.
    pub item: String,
    /// Item category.
    pub category: String,
    /// Brand.
    pub brand: String,
    /// Planning year.
    pub current_year: i32,
    /// Year after the planning year.
    pub target_year: i32,
    /// Figures per year.
    pub yearly_values: YearlyValues,
    /// Month breakdown per year.
    pub monthly_values: MonthlyValues,
    /// Primary figure for the planning year.
    pub current_year_amount: Decimal,
    /// Primary figure for the target year.
    pub next_year_amount: Decimal,
    /// Actual as a percentage of budget (budgets only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utilization: Option<Decimal>,
    /// Workflow status.
    pub status: PlanningStatus,
    /// Approving user.
    pub approved_by: Option<Uuid>,
    /// Approval timestamp.
    pub approved_at: Option<String>,
    /// Submission timestamp.
    pub submitted_at: Option<String>,
    /// Kind and kind-specific attributes.
    #[serde(flatten)]
    pub details: RecordDetails,
    /// Created at timestamp.
    pub created_at: String,
    /// Updated at timestamp.
    pub updated_at: String,
}

impl From<PlanningRecord> for RecordResponse {
    fn from(record: PlanningRecord) -> Self {
        Self {
            id: record.id.into_inner(),
            owner_id: record.owner.into_inner(),
            utilization: record.utilization(),
            department: record.department,
            customer: record.customer,
            item: record.item,
            category: record.category,
            brand: record.brand,
            current_year: record.current_year,
            target_year: record.target_year,
            yearly_values: record.yearly_values,
            monthly_values: record.monthly_values,
            current_year_amount: record.current_year_cache,
            next_year_amount: record.next_year_cache,
            status: record.status,
            approved_by: record.approved_by.map(|id| id.into_inner()),
            approved_at: record.approved_at.map(|t| t.to_rfc3339()),
            submitted_at: record.submitted_at.map(|t| t.to_rfc3339()),
            details: record.details,
            created_at: record.created_at.to_rfc3339(),
            updated_at: record.updated_at.to_rfc3339(),
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/{kind}` - List visible records.
async fn list_records(
    State(state): State<AppState>,
    Extension(kind): Extension<RecordKind>,
    auth: AuthUser,
    QueryParams(query): QueryParams<ListQuery>,
) -> ApiResult<Json<PageResponse<RecordResponse>>> {
    let page = state.planning.page_request(query.page, query.per_page);
    let filter = RecordFilter {
        customer: query.customer,
        category: query.category,
        brand: query.brand,
        year: query.year,
        status: query.status,
    };
    let records = state
        .planning
        .list(&auth.actor(), kind, filter, page)
        .await?;
    Ok(Json(records.map(RecordResponse::from)))
}

/// POST `/{kind}` - Create a draft record.
async fn create_record(
    State(state): State<AppState>,
    Extension(kind): Extension<RecordKind>,
    auth: AuthUser,
    JsonBody(payload): JsonBody<CreateRecordInput>,
) -> ApiResult<(StatusCode, Json<RecordResponse>)> {
    let record = state.planning.create(&auth.actor(), kind, payload).await?;
    Ok((StatusCode::CREATED, Json(record.into())))
}

/// GET `/{kind}/filters` - Distinct filter values of visible records.
async fn filter_options(
    State(state): State<AppState>,
    Extension(kind): Extension<RecordKind>,
    auth: AuthUser,
) -> ApiResult<Json<FilterOptions>> {
    let options = state.planning.filter_options(&auth.actor(), kind).await?;
    Ok(Json(options))
}

/// GET `/{kind}/{id}` - Get one record.
async fn get_record(
    State(state): State<AppState>,
    Extension(kind): Extension<RecordKind>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<RecordResponse>> {
    let record = state
        .planning
        .get(&auth.actor(), kind, RecordId::from_uuid(id))
        .await?;
    Ok(Json(record.into()))
}

/// PATCH `/{kind}/{id}` - Partially update a record.
async fn update_record(
    State(state): State<AppState>,
    Extension(kind): Extension<RecordKind>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    JsonBody(payload): JsonBody<UpdateRecordInput>,
) -> ApiResult<Json<RecordResponse>> {
    let record = state
        .planning
        .update(&auth.actor(), kind, RecordId::from_uuid(id), payload)
        .await?;
    Ok(Json(record.into()))
}

/// DELETE `/{kind}/{id}` - Delete a draft record.
async fn delete_record(
    State(state): State<AppState>,
    Extension(kind): Extension<RecordKind>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state
        .planning
        .delete(&auth.actor(), kind, RecordId::from_uuid(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT `/{kind}/{id}/months/{year}/{month}` - Set one month.
async fn set_month(
    State(state): State<AppState>,
    Extension(kind): Extension<RecordKind>,
    auth: AuthUser,
    Path((id, year, month)): Path<(Uuid, i32, u32)>,
    JsonBody(payload): JsonBody<AmountRequest>,
) -> ApiResult<Json<RecordResponse>> {
    let record = state
        .planning
        .set_month(
            &auth.actor(),
            kind,
            RecordId::from_uuid(id),
            year,
            month,
            &payload.amount,
        )
        .await?;
    Ok(Json(record.into()))
}

/// POST `/{kind}/{id}/status` - Move a record along the workflow.
async fn transition_status(
    State(state): State<AppState>,
    Extension(kind): Extension<RecordKind>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    JsonBody(payload): JsonBody<StatusRequest>,
) -> ApiResult<Json<RecordResponse>> {
    let record = state
        .planning
        .transition_status(&auth.actor(), kind, RecordId::from_uuid(id), payload.status)
        .await?;
    Ok(Json(record.into()))
}

/// POST `/{kind}/{id}/actual` - Record the current-year actual.
async fn record_actual(
    State(state): State<AppState>,
    Extension(kind): Extension<RecordKind>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    JsonBody(payload): JsonBody<AmountRequest>,
) -> ApiResult<Json<RecordResponse>> {
    let record = state
        .planning
        .record_actual(&auth.actor(), kind, RecordId::from_uuid(id), &payload.amount)
        .await?;
    Ok(Json(record.into()))
}
