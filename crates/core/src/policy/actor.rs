//! The acting user as seen by the planning core.

use std::fmt;

use planbook_shared::UserId;
use serde::{Deserialize, Serialize};

use crate::record::PlanningRecord;

/// Organizational role of an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full visibility and mutation.
    Admin,
    /// Oversees a department.
    Manager,
    /// Plans their own customers.
    Salesman,
    /// Reads planning data for supply.
    SupplyChain,
    /// Any other or unknown role.
    User,
}

impl Role {
    /// Returns the string representation of the role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Salesman => "salesman",
            Self::SupplyChain => "supply_chain",
            Self::User => "user",
        }
    }

    /// Maps a role name to a role. Unknown names get the least privileged role.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "admin" => Self::Admin,
            "manager" => Self::Manager,
            "salesman" => Self::Salesman,
            "supply_chain" => Self::SupplyChain,
            _ => Self::User,
        }
    }

    /// Roles allowed to create planning records.
    #[must_use]
    pub fn can_create(&self) -> bool {
        matches!(self, Self::Admin | Self::Manager | Self::Salesman)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identity of whoever performs an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// User id.
    pub id: UserId,
    /// Role.
    pub role: Role,
    /// Department, if assigned.
    pub department: Option<String>,
}

impl Actor {
    /// Creates an actor. A blank department counts as none.
    pub fn new(id: UserId, role: Role, department: Option<&str>) -> Self {
        let department = department
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);
        Self {
            id,
            role,
            department,
        }
    }

    /// True for admins.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// True for managers, with or without a department.
    #[must_use]
    pub fn is_manager(&self) -> bool {
        self.role == Role::Manager
    }

    /// True when the actor created the record.
    #[must_use]
    pub fn owns(&self, record: &PlanningRecord) -> bool {
        record.owner == self.id
    }

    /// True for a manager whose department is the record's department.
    #[must_use]
    pub fn manages(&self, record: &PlanningRecord) -> bool {
        self.is_manager()
            && self
                .department
                .as_deref()
                .is_some_and(|dept| record.department.as_deref() == Some(dept))
    }
}
