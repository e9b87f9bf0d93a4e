//! `SeaORM` Entity for planning_records table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "planning_records")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub kind: String,
    pub owner_id: Uuid,
    pub department: Option<String>,
    pub customer: String,
    pub item: String,
    pub category: String,
    pub brand: String,
    pub current_year: i32,
    pub target_year: i32,
    #[sea_orm(column_type = "JsonBinary")]
    pub yearly_values: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub monthly_values: Json,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub current_year_cache: Decimal,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub next_year_cache: Decimal,
    pub status: String,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTimeWithTimeZone>,
    pub submitted_at: Option<DateTimeWithTimeZone>,
    #[sea_orm(column_type = "JsonBinary")]
    pub details: Json,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
