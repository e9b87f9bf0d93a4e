//! Visibility and mutation rules.
//!
//! One rule-set serves both paths: list queries use [`AccessPolicy::scope`]
//! as a filter, single-record operations use [`AccessPolicy::authorize`] as a
//! gate. [`AccessPolicy::can_access`] is defined through the scope so the two
//! can never disagree.

use planbook_shared::UserId;

use crate::policy::actor::{Actor, Role};
use crate::record::PlanningRecord;
use crate::workflow::PlanningStatus;

/// Which records an actor can see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryScope {
    /// Every record.
    All,
    /// Records of a department plus the actor's own.
    DepartmentOrOwner {
        /// Department to include.
        department: String,
        /// Owner whose records are included regardless of department.
        owner: UserId,
    },
    /// Only the actor's own records.
    Owner(UserId),
}

impl QueryScope {
    /// Evaluates the scope against a single record.
    #[must_use]
    pub fn matches(&self, record: &PlanningRecord) -> bool {
        match self {
            Self::All => true,
            Self::DepartmentOrOwner { department, owner } => {
                record.owner == *owner || record.department.as_deref() == Some(department.as_str())
            }
            Self::Owner(owner) => record.owner == *owner,
        }
    }
}

/// Operations gated by the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Read the record.
    Read,
    /// Change figures or classification fields.
    Modify,
    /// Request a status change.
    ChangeStatus,
    /// Delete the record.
    Delete,
    /// Supply an actual figure.
    RecordActual,
}

impl Operation {
    /// Verb used in denial messages.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Modify => "modify",
            Self::ChangeStatus => "change the status of",
            Self::Delete => "delete",
            Self::RecordActual => "record actuals for",
        }
    }
}

/// Stateless access policy.
pub struct AccessPolicy;

impl AccessPolicy {
    /// The visibility scope of `actor`.
    #[must_use]
    pub fn scope(actor: &Actor) -> QueryScope {
        match (actor.role, actor.department.as_deref()) {
            (Role::Admin, _) => QueryScope::All,
            (Role::Manager, Some(department)) => QueryScope::DepartmentOrOwner {
                department: department.to_string(),
                owner: actor.id,
            },
            _ => QueryScope::Owner(actor.id),
        }
    }

    /// Whether `actor` may perform `operation` on `record`.
    #[must_use]
    pub fn authorize(actor: &Actor, record: &PlanningRecord, operation: Operation) -> bool {
        match operation {
            Operation::Read => Self::can_access(actor, record),
            Operation::Modify => Self::can_modify(actor, record),
            Operation::ChangeStatus => Self::can_change_status(actor, record),
            Operation::Delete => Self::can_delete(actor, record),
            Operation::RecordActual => Self::can_record_actual(actor, record),
        }
    }

    /// Whether `actor` can see `record`.
    #[must_use]
    pub fn can_access(actor: &Actor, record: &PlanningRecord) -> bool {
        Self::scope(actor).matches(record)
    }

    /// Whether `actor` can change the figures or fields of `record`.
    #[must_use]
    pub fn can_modify(actor: &Actor, record: &PlanningRecord) -> bool {
        let manager_window = matches!(
            record.status,
            PlanningStatus::Draft | PlanningStatus::Submitted
        );
        match actor.role {
            Role::Admin => true,
            Role::Manager if actor.department.is_some() => {
                manager_window && actor.manages(record)
            }
            Role::Manager => manager_window && actor.owns(record),
            _ => record.status == PlanningStatus::Draft && actor.owns(record),
        }
    }

    /// Whether `actor` may attempt a status change on `record`.
    ///
    /// Which transition is then allowed is up to the workflow.
    #[must_use]
    pub fn can_change_status(actor: &Actor, record: &PlanningRecord) -> bool {
        match actor.role {
            Role::Admin | Role::Manager => true,
            _ => {
                actor.owns(record)
                    && matches!(
                        record.status,
                        PlanningStatus::Draft | PlanningStatus::Revised
                    )
            }
        }
    }

    /// Whether `actor` may delete `record`.
    #[must_use]
    pub fn can_delete(actor: &Actor, record: &PlanningRecord) -> bool {
        record.status == PlanningStatus::Draft && (actor.is_admin() || actor.owns(record))
    }

    /// Whether `actor` may supply an actual figure for `record`.
    #[must_use]
    pub fn can_record_actual(actor: &Actor, record: &PlanningRecord) -> bool {
        actor.is_admin() || (actor.is_manager() && Self::can_access(actor, record))
    }
}
