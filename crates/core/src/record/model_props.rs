//! Property-based tests for the record caches.

use chrono::Utc;
use planbook_shared::UserId;
use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::record::model::{NewRecord, PlanningRecord};
use crate::record::sync::Synchronizer;
use crate::record::types::{RecordDetails, RecordKind, YearField};

const CURRENT_YEAR: i32 = 2025;

fn arb_kind() -> impl Strategy<Value = RecordKind> {
    prop_oneof![Just(RecordKind::Budget), Just(RecordKind::Forecast)]
}

fn arb_field() -> impl Strategy<Value = YearField> {
    prop_oneof![
        Just(YearField::Budget),
        Just(YearField::Actual),
        Just(YearField::Forecast),
    ]
}

/// Amounts in cents, including negatives that must be rejected.
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (-1_000_000i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn arb_write() -> impl Strategy<Value = (i32, YearField, Decimal)> {
    (CURRENT_YEAR - 2..=CURRENT_YEAR + 3, arb_field(), arb_amount())
}

fn empty_record(kind: RecordKind) -> PlanningRecord {
    PlanningRecord::new(
        NewRecord {
            owner: UserId::new(),
            department: None,
            customer: "Acme".into(),
            item: "Widget".into(),
            category: "Hardware".into(),
            brand: "Contoso".into(),
            current_year: CURRENT_YEAR,
            details: RecordDetails::for_kind(kind),
        },
        Utc::now(),
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// After every write, accepted or not, the caches match the yearly figures.
    #[test]
    fn prop_caches_track_yearly_values(
        kind in arb_kind(),
        writes in prop::collection::vec(arb_write(), 1..30),
    ) {
        let mut record = empty_record(kind);
        for (year, field, amount) in writes {
            let before = record.clone();
            match record.set_year_value(year, field, amount) {
                Ok(()) => {
                    prop_assert_eq!(record.get_year_value(year, field), amount);
                }
                Err(_) => {
                    prop_assert_eq!(&record, &before);
                }
            }
            prop_assert!(Synchronizer::is_consistent(&record));
        }
    }

    /// Writes outside the current and target years never move the caches.
    #[test]
    fn prop_other_years_leave_caches_alone(
        kind in arb_kind(),
        year in prop_oneof![2000..CURRENT_YEAR, CURRENT_YEAR + 2..2100],
        amount in 0i64..1_000_000,
    ) {
        let mut record = empty_record(kind);
        let field = kind.primary_field();
        record.set_year_value(year, field, Decimal::new(amount, 2)).unwrap();
        prop_assert_eq!(record.current_year_cache, Decimal::ZERO);
        prop_assert_eq!(record.next_year_cache, Decimal::ZERO);
    }
}
