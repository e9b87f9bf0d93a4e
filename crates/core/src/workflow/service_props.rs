//! Property-based tests for WorkflowService.

use chrono::Utc;
use planbook_shared::UserId;
use proptest::prelude::*;

use crate::error::PlanningError;
use crate::policy::{Actor, Role};
use crate::record::{NewRecord, PlanningRecord, RecordDetails, RecordKind};
use crate::workflow::service::WorkflowService;
use crate::workflow::types::PlanningStatus;

/// Strategy for generating random PlanningStatus values.
fn arb_status() -> impl Strategy<Value = PlanningStatus> {
    prop_oneof![
        Just(PlanningStatus::Draft),
        Just(PlanningStatus::Submitted),
        Just(PlanningStatus::Approved),
        Just(PlanningStatus::Rejected),
        Just(PlanningStatus::Revised),
    ]
}

fn arb_role() -> impl Strategy<Value = Role> {
    prop_oneof![
        Just(Role::Admin),
        Just(Role::Manager),
        Just(Role::Salesman),
        Just(Role::SupplyChain),
        Just(Role::User),
    ]
}

fn arb_department() -> impl Strategy<Value = Option<&'static str>> {
    prop_oneof![Just(None), Just(Some("Sales")), Just(Some("Ops"))]
}

fn arb_actor_and_record() -> impl Strategy<Value = (Actor, PlanningRecord)> {
    (arb_role(), arb_department(), arb_status(), any::<bool>()).prop_map(
        |(role, department, status, owned)| {
            let actor = Actor::new(UserId::new(), role, department);
            let owner = if owned { actor.id } else { UserId::new() };
            let mut record = PlanningRecord::new(
                NewRecord {
                    owner,
                    department: Some("Sales".to_string()),
                    customer: "Acme".into(),
                    item: "Widget".into(),
                    category: "Hardware".into(),
                    brand: "Contoso".into(),
                    current_year: 2025,
                    details: RecordDetails::for_kind(RecordKind::Forecast),
                },
                Utc::now(),
            );
            record.status = status;
            (actor, record)
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Pairs outside the table fail as invalid transitions and leave the record alone.
    #[test]
    fn prop_non_edges_are_invalid(
        (actor, record) in arb_actor_and_record(),
        to in arb_status(),
    ) {
        let from = record.status;
        prop_assume!(!WorkflowService::is_valid_transition(from, to));

        let mut working = record.clone();
        let result = WorkflowService::transition(&mut working, &actor, to, Utc::now());
        prop_assert_eq!(result, Err(PlanningError::InvalidTransition { from, to }));
        prop_assert_eq!(working, record);
    }

    /// Every outcome is either the requested edge or an untouched record.
    #[test]
    fn prop_transition_is_all_or_nothing(
        (actor, record) in arb_actor_and_record(),
        to in arb_status(),
    ) {
        let mut working = record.clone();
        match WorkflowService::transition(&mut working, &actor, to, Utc::now()) {
            Ok(change) => {
                prop_assert!(WorkflowService::is_valid_transition(record.status, to));
                prop_assert_eq!(change.from, record.status);
                prop_assert_eq!(working.status, to);
            }
            Err(_) => {
                prop_assert_eq!(working, record);
            }
        }
    }

    /// Approval metadata is present exactly when the record is approved after a move.
    #[test]
    fn prop_approval_stamp_tracks_status(
        (actor, record) in arb_actor_and_record(),
        to in arb_status(),
    ) {
        let mut working = record;
        if WorkflowService::transition(&mut working, &actor, to, Utc::now()).is_ok() {
            let approved = working.status == PlanningStatus::Approved;
            prop_assert_eq!(working.approved_by.is_some(), approved);
            prop_assert_eq!(working.approved_at.is_some(), approved);
            if approved {
                prop_assert_eq!(working.approved_by, Some(actor.id));
            }
        }
    }

    /// Only admins and department managers ever reach a terminal status.
    #[test]
    fn prop_terminal_only_by_reviewers(
        (actor, record) in arb_actor_and_record(),
        to in arb_status(),
    ) {
        let mut working = record.clone();
        if WorkflowService::transition(&mut working, &actor, to, Utc::now()).is_ok()
            && to.is_terminal()
        {
            prop_assert!(actor.is_admin() || actor.manages(&record));
        }
    }
}
