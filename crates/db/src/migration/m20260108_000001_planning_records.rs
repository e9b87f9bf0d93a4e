//! Planning records migration.
//!
//! Creates the single table holding budgets and forecasts.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(PLANNING_RECORDS_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared("DROP TABLE IF EXISTS planning_records CASCADE;")
            .await?;
        Ok(())
    }
}

const PLANNING_RECORDS_SQL: &str = r"
-- Budgets and forecasts share one table, told apart by kind
CREATE TABLE planning_records (
    id UUID PRIMARY KEY,
    kind VARCHAR(16) NOT NULL,
    owner_id UUID NOT NULL,
    department VARCHAR(100),
    customer VARCHAR(255) NOT NULL,
    item VARCHAR(255) NOT NULL,
    category VARCHAR(100) NOT NULL,
    brand VARCHAR(100) NOT NULL,
    current_year INTEGER NOT NULL,
    target_year INTEGER NOT NULL,
    yearly_values JSONB NOT NULL DEFAULT '{}'::jsonb,
    monthly_values JSONB NOT NULL DEFAULT '{}'::jsonb,
    current_year_cache NUMERIC(15, 2) NOT NULL DEFAULT 0,
    next_year_cache NUMERIC(15, 2) NOT NULL DEFAULT 0,
    status VARCHAR(16) NOT NULL DEFAULT 'draft',
    approved_by UUID,
    approved_at TIMESTAMPTZ,
    submitted_at TIMESTAMPTZ,
    details JSONB NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_planning_kind CHECK (kind IN ('budget', 'forecast')),
    CONSTRAINT chk_planning_status CHECK (
        status IN ('draft', 'submitted', 'approved', 'rejected', 'revised')
    ),
    CONSTRAINT chk_planning_target_year CHECK (target_year = current_year + 1),
    CONSTRAINT chk_planning_caches CHECK (current_year_cache >= 0 AND next_year_cache >= 0),
    CONSTRAINT chk_planning_approval CHECK (
        (status = 'approved') = (approved_by IS NOT NULL AND approved_at IS NOT NULL)
    )
);

-- One record per kind, owner, customer, item and year
CREATE UNIQUE INDEX idx_planning_records_key
    ON planning_records(kind, owner_id, customer, item, current_year);

-- Visibility scopes
CREATE INDEX idx_planning_records_owner ON planning_records(kind, owner_id);
CREATE INDEX idx_planning_records_department ON planning_records(kind, department);

-- Default listing order
CREATE INDEX idx_planning_records_updated ON planning_records(kind, updated_at DESC, id DESC);
";
