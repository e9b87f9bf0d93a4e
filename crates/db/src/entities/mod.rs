//! `SeaORM` entity definitions.

pub mod planning_records;
