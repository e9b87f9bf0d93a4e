//! Workflow service for planning record status transitions.
//!
//! This module implements the state machine that moves a record from draft
//! through review, and decides which actor may take each edge.

use chrono::{DateTime, Utc};

use crate::error::PlanningError;
use crate::policy::{AccessPolicy, Actor};
use crate::record::PlanningRecord;
use crate::workflow::types::{PlanningStatus, StatusChange, TransitionRule};

/// Stateless service for planning record workflow transitions.
pub struct WorkflowService;

impl WorkflowService {
    /// The rule guarding the edge `from → to`, or `None` when there is no such edge.
    #[must_use]
    pub fn rule_for(from: PlanningStatus, to: PlanningStatus) -> Option<TransitionRule> {
        use PlanningStatus::{Approved, Draft, Rejected, Revised, Submitted};

        match (from, to) {
            (Draft, Submitted) => Some(TransitionRule::OwnerOrSupervisor),
            (Submitted, Approved | Rejected | Revised) => Some(TransitionRule::DepartmentReviewer),
            (Revised, Draft) => Some(TransitionRule::Owner),
            (Submitted | Approved | Rejected, Draft) => Some(TransitionRule::AdminOnly),
            _ => None,
        }
    }

    /// Checks if a transition is an edge of the workflow.
    #[must_use]
    pub fn is_valid_transition(from: PlanningStatus, to: PlanningStatus) -> bool {
        Self::rule_for(from, to).is_some()
    }

    /// Statuses reachable from `from` by some actor.
    #[must_use]
    pub fn targets_from(from: PlanningStatus) -> Vec<PlanningStatus> {
        PlanningStatus::ALL
            .into_iter()
            .filter(|to| Self::is_valid_transition(from, *to))
            .collect()
    }

    /// Whether `actor` satisfies `rule` for `record`.
    #[must_use]
    pub fn permits(rule: TransitionRule, actor: &Actor, record: &PlanningRecord) -> bool {
        match rule {
            TransitionRule::OwnerOrSupervisor => {
                actor.owns(record) || actor.is_admin() || actor.manages(record)
            }
            TransitionRule::DepartmentReviewer => actor.is_admin() || actor.manages(record),
            // An admin on an owner edge is also the admin reset edge.
            TransitionRule::Owner => actor.owns(record) || actor.is_admin(),
            TransitionRule::AdminOnly => actor.is_admin(),
        }
    }

    /// Moves `record` to `to` on behalf of `actor`.
    ///
    /// The edge is checked first, so a pair outside the workflow is always an
    /// invalid transition. The record is untouched on any error.
    ///
    /// # Returns
    /// * `Ok(StatusChange)` when the status moved
    /// * `Err(PlanningError::InvalidTransition)` if `from → to` is not an edge
    /// * `Err(PlanningError::PermissionDenied)` if the actor may not take the edge
    pub fn transition(
        record: &mut PlanningRecord,
        actor: &Actor,
        to: PlanningStatus,
        now: DateTime<Utc>,
    ) -> Result<StatusChange, PlanningError> {
        let from = record.status;
        let rule =
            Self::rule_for(from, to).ok_or(PlanningError::InvalidTransition { from, to })?;

        if !AccessPolicy::can_change_status(actor, record) || !Self::permits(rule, actor, record) {
            return Err(PlanningError::denied(format!(
                "{} may not move this record from {from} to {to}",
                actor.role
            )));
        }

        record.status = to;
        if to == PlanningStatus::Approved {
            record.approved_by = Some(actor.id);
            record.approved_at = Some(now);
        } else {
            record.approved_by = None;
            record.approved_at = None;
        }
        match to {
            PlanningStatus::Submitted => record.submitted_at = Some(now),
            PlanningStatus::Draft => record.submitted_at = None,
            _ => {}
        }

        Ok(StatusChange {
            from,
            to,
            changed_by: actor.id,
            changed_at: now,
        })
    }
}
