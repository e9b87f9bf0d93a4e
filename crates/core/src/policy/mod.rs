//! Who may see and change planning records.
//!
//! # Modules
//!
//! - `actor` - Roles and the acting user
//! - `access` - Visibility scopes and per-operation gates

pub mod access;
pub mod actor;

#[cfg(test)]
mod access_props;

pub use access::{AccessPolicy, Operation, QueryScope};
pub use actor::{Actor, Role};
