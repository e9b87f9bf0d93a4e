//! Workflow domain types for the planning record lifecycle.

use chrono::{DateTime, Utc};
use planbook_shared::UserId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Planning record status in the approval workflow.
///
/// The valid transitions are:
/// - Draft → Submitted (submit)
/// - Submitted → Approved / Rejected / Revised (review)
/// - Revised → Draft (rework)
/// - any status other than Draft → Draft (admin reset)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanningStatus {
    /// Being drafted by its owner.
    Draft,
    /// Waiting for review.
    #[serde(alias = "pending")]
    Submitted,
    /// Accepted by a reviewer.
    Approved,
    /// Turned down by a reviewer.
    Rejected,
    /// Sent back for rework.
    Revised,
}

impl PlanningStatus {
    /// Every status, in workflow order.
    pub const ALL: [Self; 5] = [
        Self::Draft,
        Self::Submitted,
        Self::Approved,
        Self::Rejected,
        Self::Revised,
    ];

    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Submitted => "submitted",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Revised => "revised",
        }
    }

    /// Parses a status from a string. `pending` is accepted for `submitted`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "submitted" | "pending" => Some(Self::Submitted),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            "revised" => Some(Self::Revised),
            _ => None,
        }
    }

    /// Returns true once a reviewer has decided.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

impl fmt::Display for PlanningStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Who may trigger a given edge of the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionRule {
    /// The owner, or a manager/admin acting for them.
    OwnerOrSupervisor,
    /// A manager of the record's department, or an admin.
    DepartmentReviewer,
    /// The owner only.
    Owner,
    /// Admins only.
    AdminOnly,
}

/// A completed status change with audit data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    /// Status before the change.
    pub from: PlanningStatus,
    /// Status after the change.
    pub to: PlanningStatus,
    /// Who made the change.
    pub changed_by: UserId,
    /// When the change happened.
    pub changed_at: DateTime<Utc>,
}
