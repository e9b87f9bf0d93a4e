//! Property-based tests for the access policy.

use chrono::Utc;
use planbook_shared::UserId;
use proptest::prelude::*;

use crate::policy::access::{AccessPolicy, Operation};
use crate::policy::actor::{Actor, Role};
use crate::record::{NewRecord, PlanningRecord, RecordDetails, RecordKind};
use crate::workflow::PlanningStatus;

fn arb_role() -> impl Strategy<Value = Role> {
    prop_oneof![
        Just(Role::Admin),
        Just(Role::Manager),
        Just(Role::Salesman),
        Just(Role::SupplyChain),
        Just(Role::User),
    ]
}

fn arb_status() -> impl Strategy<Value = PlanningStatus> {
    prop_oneof![
        Just(PlanningStatus::Draft),
        Just(PlanningStatus::Submitted),
        Just(PlanningStatus::Approved),
        Just(PlanningStatus::Rejected),
        Just(PlanningStatus::Revised),
    ]
}

fn arb_department() -> impl Strategy<Value = Option<&'static str>> {
    prop_oneof![Just(None), Just(Some("Sales")), Just(Some("Ops"))]
}

fn arb_operation() -> impl Strategy<Value = Operation> {
    prop_oneof![
        Just(Operation::Modify),
        Just(Operation::ChangeStatus),
        Just(Operation::Delete),
        Just(Operation::RecordActual),
    ]
}

/// An actor and a record that the actor may or may not own.
fn arb_case() -> impl Strategy<Value = (Actor, PlanningRecord)> {
    (
        arb_role(),
        arb_department(),
        arb_department(),
        arb_status(),
        any::<bool>(),
    )
        .prop_map(|(role, actor_dept, record_dept, status, owned)| {
            let actor = Actor::new(UserId::new(), role, actor_dept);
            let owner = if owned { actor.id } else { UserId::new() };
            let mut record = PlanningRecord::new(
                NewRecord {
                    owner,
                    department: record_dept.map(str::to_string),
                    customer: "Acme".into(),
                    item: "Widget".into(),
                    category: "Hardware".into(),
                    brand: "Contoso".into(),
                    current_year: 2025,
                    details: RecordDetails::for_kind(RecordKind::Budget),
                },
                Utc::now(),
            );
            record.status = status;
            (actor, record)
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Modifying a record implies being able to see it.
    #[test]
    fn prop_modify_implies_access((actor, record) in arb_case()) {
        if AccessPolicy::can_modify(&actor, &record) {
            prop_assert!(AccessPolicy::can_access(&actor, &record));
        }
    }

    /// Deleting or recording actuals also implies visibility.
    #[test]
    fn prop_every_write_gate_implies_access(
        (actor, record) in arb_case(),
        operation in arb_operation(),
    ) {
        if operation != Operation::ChangeStatus
            && AccessPolicy::authorize(&actor, &record, operation)
        {
            prop_assert!(AccessPolicy::can_access(&actor, &record));
        }
    }

    /// The list filter and the single-record gate agree.
    #[test]
    fn prop_scope_matches_gate((actor, record) in arb_case()) {
        prop_assert_eq!(
            AccessPolicy::scope(&actor).matches(&record),
            AccessPolicy::authorize(&actor, &record, Operation::Read)
        );
    }

    /// Nothing but a draft is ever deletable.
    #[test]
    fn prop_only_drafts_are_deletable((actor, record) in arb_case()) {
        if record.status != PlanningStatus::Draft {
            prop_assert!(!AccessPolicy::can_delete(&actor, &record));
        }
    }
}
