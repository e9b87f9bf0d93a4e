//! Planning record workflow.
//!
//! # Modules
//!
//! - `types` - Workflow domain types (PlanningStatus, StatusChange)
//! - `service` - State transition table and actor rules

pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use service::WorkflowService;
pub use types::{PlanningStatus, StatusChange, TransitionRule};
