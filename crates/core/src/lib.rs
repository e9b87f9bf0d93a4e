//! Core planning logic for Planbook.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Records are persisted through the [`store::PlanningStore`] seam.
//!
//! # Modules
//!
//! - `temporal` - Current year, planning window and an injectable clock
//! - `record` - Planning records, amount coercion and cache synchronization
//! - `workflow` - Status machine and transition rules
//! - `policy` - Actors, visibility scopes and mutation gates
//! - `accuracy` - Forecast accuracy against actuals
//! - `store` - Storage seam and the in-memory store
//! - `service` - Planning operations over a store

pub mod accuracy;
pub mod error;
pub mod policy;
pub mod record;
pub mod service;
pub mod store;
pub mod temporal;
pub mod workflow;

pub use accuracy::{AccuracyEvaluator, AccuracyResult};
pub use error::PlanningError;
pub use policy::{AccessPolicy, Actor, QueryScope, Role};
pub use record::{PlanningRecord, RecordKind, Synchronizer, YearField};
pub use service::{CreateRecordInput, FilterOptions, PlanningService, UpdateRecordInput};
pub use store::{MemoryStore, PlanningStore, RecordFacets, RecordFilter, StoreError};
pub use temporal::{Clock, FixedClock, SystemClock, TemporalContext};
pub use workflow::{PlanningStatus, StatusChange, WorkflowService};
