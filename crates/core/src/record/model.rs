//! The planning record and its year/month data.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use planbook_shared::{RecordId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::PlanningError;
use crate::record::amount;
use crate::record::types::{
    BudgetDetails, ForecastDetails, RecordDetails, RecordKind, YearEntry, YearField,
};
use crate::workflow::PlanningStatus;

/// Year → figures. Sparse.
pub type YearlyValues = BTreeMap<i32, YearEntry>;

/// Month index (0-11) → amount.
pub type MonthValues = BTreeMap<u32, Decimal>;

/// Year → month breakdown. Sparse.
pub type MonthlyValues = BTreeMap<i32, MonthValues>;

/// Highest month index.
pub const LAST_MONTH: u32 = 11;

/// Everything needed to create a record.
#[derive(Debug, Clone)]
pub struct NewRecord {
    /// Creating actor.
    pub owner: UserId,
    /// Department of the creating actor.
    pub department: Option<String>,
    /// Customer name.
    pub customer: String,
    /// Item name.
    pub item: String,
    /// Item category.
    pub category: String,
    /// Brand.
    pub brand: String,
    /// Year the record plans from.
    pub current_year: i32,
    /// Kind-specific attributes.
    pub details: RecordDetails,
}

/// One budget or forecast line for a customer and item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanningRecord {
    /// Record id.
    pub id: RecordId,
    /// Creating actor.
    pub owner: UserId,
    /// Owner's department at creation time.
    pub department: Option<String>,
    /// Customer name.
    pub customer: String,
    /// Item name.
    pub item: String,
    /// Item category.
    pub category: String,
    /// Brand.
    pub brand: String,
    /// Year the record plans from.
    pub current_year: i32,
    /// The year after `current_year`.
    pub target_year: i32,
    /// Figures per year.
    pub yearly_values: YearlyValues,
    /// Month breakdown per year.
    pub monthly_values: MonthlyValues,
    /// Primary figure for `current_year`.
    pub current_year_cache: Decimal,
    /// Primary figure for `target_year`.
    pub next_year_cache: Decimal,
    /// Workflow status.
    pub status: PlanningStatus,
    /// Who approved the record.
    pub approved_by: Option<UserId>,
    /// When the record was approved.
    pub approved_at: Option<DateTime<Utc>>,
    /// When the record was last submitted.
    pub submitted_at: Option<DateTime<Utc>>,
    /// Kind-specific attributes.
    pub details: RecordDetails,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last mutation time.
    pub updated_at: DateTime<Utc>,
}

impl PlanningRecord {
    /// Creates a draft record with no figures.
    #[must_use]
    pub fn new(new: NewRecord, now: DateTime<Utc>) -> Self {
        Self {
            id: RecordId::new(),
            owner: new.owner,
            department: new.department,
            customer: new.customer,
            item: new.item,
            category: new.category,
            brand: new.brand,
            current_year: new.current_year,
            target_year: new.current_year + 1,
            yearly_values: YearlyValues::new(),
            monthly_values: MonthlyValues::new(),
            current_year_cache: Decimal::ZERO,
            next_year_cache: Decimal::ZERO,
            status: PlanningStatus::Draft,
            approved_by: None,
            approved_at: None,
            submitted_at: None,
            details: new.details,
            created_at: now,
            updated_at: now,
        }
    }

    /// The record's kind.
    #[must_use]
    pub fn kind(&self) -> RecordKind {
        self.details.kind()
    }

    /// Stored value of `field` for `year`, zero when absent.
    #[must_use]
    pub fn get_year_value(&self, year: i32, field: YearField) -> Decimal {
        self.yearly_values
            .get(&year)
            .and_then(|entry| entry.get(field))
            .unwrap_or(Decimal::ZERO)
    }

    /// Stores `amount` as `field` for `year` and refreshes the matching cache.
    pub fn set_year_value(
        &mut self,
        year: i32,
        field: YearField,
        amount: Decimal,
    ) -> Result<(), PlanningError> {
        let kind = self.kind();
        if !kind.allows(field) {
            return Err(PlanningError::validation(format!(
                "a {kind} record cannot hold a {field} figure"
            )));
        }
        let amount = amount::validate(amount, field.as_str())?;

        self.yearly_values.entry(year).or_default().set(field, amount);

        if field == kind.primary_field() {
            if year == self.current_year {
                self.current_year_cache = amount;
            } else if year == self.target_year {
                self.next_year_cache = amount;
            }
        }
        Ok(())
    }

    /// Month breakdown for `year`, if any was recorded.
    #[must_use]
    pub fn monthly_breakdown(&self, year: i32) -> Option<&MonthValues> {
        self.monthly_values.get(&year)
    }

    /// Stored amount for one month, zero when absent.
    #[must_use]
    pub fn get_month_value(&self, year: i32, month: u32) -> Decimal {
        self.monthly_breakdown(year)
            .and_then(|months| months.get(&month))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Replaces the whole month breakdown for `year`.
    ///
    /// Nothing changes unless every month index and amount is valid.
    pub fn set_monthly_breakdown(
        &mut self,
        year: i32,
        mapping: MonthValues,
    ) -> Result<(), PlanningError> {
        let mut checked = MonthValues::new();
        for (month, value) in mapping {
            check_month(month)?;
            checked.insert(month, amount::validate(value, "monthly amount")?);
        }
        self.monthly_values.insert(year, checked);
        Ok(())
    }

    /// Sets a single month of `year`.
    pub fn update_month(
        &mut self,
        year: i32,
        month: u32,
        amount: Decimal,
    ) -> Result<(), PlanningError> {
        check_month(month)?;
        let amount = amount::validate(amount, "monthly amount")?;
        self.monthly_values
            .entry(year)
            .or_default()
            .insert(month, amount);
        Ok(())
    }

    /// Budget attributes, when this is a budget.
    #[must_use]
    pub fn budget_details(&self) -> Option<&BudgetDetails> {
        match &self.details {
            RecordDetails::Budget(details) => Some(details),
            RecordDetails::Forecast(_) => None,
        }
    }

    /// Forecast attributes, when this is a forecast.
    #[must_use]
    pub fn forecast_details(&self) -> Option<&ForecastDetails> {
        match &self.details {
            RecordDetails::Forecast(details) => Some(details),
            RecordDetails::Budget(_) => None,
        }
    }

    pub(crate) fn forecast_details_mut(&mut self) -> Option<&mut ForecastDetails> {
        match &mut self.details {
            RecordDetails::Forecast(details) => Some(details),
            RecordDetails::Budget(_) => None,
        }
    }

    pub(crate) fn budget_details_mut(&mut self) -> Option<&mut BudgetDetails> {
        match &mut self.details {
            RecordDetails::Budget(details) => Some(details),
            RecordDetails::Forecast(_) => None,
        }
    }

    /// Current-year actual as a percentage of the current-year budget.
    ///
    /// `None` for forecasts. Zero when no budget is set.
    #[must_use]
    pub fn utilization(&self) -> Option<Decimal> {
        if self.kind() != RecordKind::Budget {
            return None;
        }
        let budget = self.current_year_cache;
        if budget.is_zero() {
            return Some(Decimal::ZERO);
        }
        let actual = self.get_year_value(self.current_year, YearField::Actual);
        Some((actual / budget * Decimal::ONE_HUNDRED).round_dp(2))
    }

    /// True when a budget's current-year actual exceeds its budget.
    #[must_use]
    pub fn is_over_budget(&self) -> bool {
        self.kind() == RecordKind::Budget
            && self.get_year_value(self.current_year, YearField::Actual) > self.current_year_cache
    }
}

fn check_month(month: u32) -> Result<(), PlanningError> {
    if month > LAST_MONTH {
        return Err(PlanningError::validation(format!(
            "month must be between 0 and {LAST_MONTH}, got {month}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn budget(current_year: i32) -> PlanningRecord {
        PlanningRecord::new(
            NewRecord {
                owner: UserId::new(),
                department: Some("Sales".into()),
                customer: "Acme".into(),
                item: "Widget".into(),
                category: "Hardware".into(),
                brand: "Contoso".into(),
                current_year,
                details: RecordDetails::for_kind(RecordKind::Budget),
            },
            Utc::now(),
        )
    }

    fn forecast(current_year: i32) -> PlanningRecord {
        let mut record = budget(current_year);
        record.details = RecordDetails::for_kind(RecordKind::Forecast);
        record
    }

    #[test]
    fn test_new_record_is_empty_draft() {
        let record = budget(2025);
        assert_eq!(record.status, PlanningStatus::Draft);
        assert_eq!(record.target_year, 2026);
        assert!(record.yearly_values.is_empty());
        assert_eq!(record.current_year_cache, Decimal::ZERO);
        assert_eq!(record.next_year_cache, Decimal::ZERO);
    }

    #[test]
    fn test_absent_year_reads_zero() {
        let record = budget(2025);
        assert_eq!(record.get_year_value(2019, YearField::Budget), Decimal::ZERO);
        assert_eq!(record.get_month_value(2025, 3), Decimal::ZERO);
    }

    #[test]
    fn test_set_current_year_budget_updates_cache() {
        let mut record = budget(2025);
        record.set_year_value(2025, YearField::Budget, dec!(1000)).unwrap();
        assert_eq!(record.current_year_cache, dec!(1000));

        record.set_year_value(2025, YearField::Budget, dec!(1500)).unwrap();
        assert_eq!(record.current_year_cache, dec!(1500));
        assert_eq!(record.get_year_value(2025, YearField::Budget), dec!(1500));
    }

    #[test]
    fn test_set_target_year_updates_next_cache() {
        let mut record = budget(2025);
        record.set_year_value(2026, YearField::Budget, dec!(800)).unwrap();
        assert_eq!(record.next_year_cache, dec!(800));
        assert_eq!(record.current_year_cache, Decimal::ZERO);
    }

    #[test]
    fn test_actual_does_not_touch_caches() {
        let mut record = budget(2025);
        record.set_year_value(2025, YearField::Actual, dec!(700)).unwrap();
        assert_eq!(record.current_year_cache, Decimal::ZERO);
        assert_eq!(record.get_year_value(2025, YearField::Actual), dec!(700));
    }

    #[test]
    fn test_other_years_do_not_touch_caches() {
        let mut record = budget(2025);
        record.set_year_value(2023, YearField::Budget, dec!(99)).unwrap();
        assert_eq!(record.current_year_cache, Decimal::ZERO);
        assert_eq!(record.next_year_cache, Decimal::ZERO);
    }

    #[test]
    fn test_budget_cannot_hold_forecast() {
        let mut record = budget(2025);
        let err = record
            .set_year_value(2025, YearField::Forecast, dec!(10))
            .unwrap_err();
        assert!(matches!(err, PlanningError::Validation(_)));
        assert!(record.yearly_values.is_empty());
    }

    #[test]
    fn test_forecast_caches_forecast_field() {
        let mut record = forecast(2025);
        record.set_year_value(2025, YearField::Forecast, dec!(200)).unwrap();
        assert_eq!(record.current_year_cache, dec!(200));
        let err = record
            .set_year_value(2025, YearField::Budget, dec!(10))
            .unwrap_err();
        assert!(matches!(err, PlanningError::Validation(_)));
    }

    #[test]
    fn test_negative_amount_rejected() {
        let mut record = budget(2025);
        let err = record
            .set_year_value(2025, YearField::Budget, dec!(-1))
            .unwrap_err();
        assert!(matches!(err, PlanningError::InvalidAmount(_)));
        assert_eq!(record.current_year_cache, Decimal::ZERO);
    }

    #[test]
    fn test_update_month_bounds() {
        let mut record = budget(2025);
        record.update_month(2025, 0, dec!(10)).unwrap();
        record.update_month(2025, 11, dec!(20)).unwrap();
        assert_eq!(record.get_month_value(2025, 11), dec!(20));

        let err = record.update_month(2025, 12, dec!(30)).unwrap_err();
        assert!(matches!(err, PlanningError::Validation(_)));
        assert_eq!(record.monthly_breakdown(2025).map(BTreeMap::len), Some(2));
    }

    #[test]
    fn test_set_monthly_breakdown_replaces_whole_year() {
        let mut record = budget(2025);
        record.update_month(2025, 5, dec!(50)).unwrap();

        let mapping = MonthValues::from([(0, dec!(1)), (1, dec!(2))]);
        record.set_monthly_breakdown(2025, mapping).unwrap();
        let months = record.monthly_breakdown(2025).unwrap();
        assert_eq!(months.len(), 2);
        assert!(!months.contains_key(&5));
    }

    #[test]
    fn test_set_monthly_breakdown_is_all_or_nothing() {
        let mut record = budget(2025);
        record.update_month(2025, 5, dec!(50)).unwrap();

        let bad_month = MonthValues::from([(0, dec!(1)), (12, dec!(2))]);
        assert!(record.set_monthly_breakdown(2025, bad_month).is_err());

        let bad_amount = MonthValues::from([(0, dec!(1)), (1, dec!(-2))]);
        assert!(record.set_monthly_breakdown(2025, bad_amount).is_err());

        assert_eq!(record.get_month_value(2025, 5), dec!(50));
        assert_eq!(record.monthly_breakdown(2025).map(BTreeMap::len), Some(1));
    }

    #[test]
    fn test_utilization_and_over_budget() {
        let mut record = budget(2025);
        assert_eq!(record.utilization(), Some(Decimal::ZERO));

        record.set_year_value(2025, YearField::Budget, dec!(1000)).unwrap();
        record.set_year_value(2025, YearField::Actual, dec!(250)).unwrap();
        assert_eq!(record.utilization(), Some(dec!(25)));
        assert!(!record.is_over_budget());

        record.set_year_value(2025, YearField::Actual, dec!(1200)).unwrap();
        assert_eq!(record.utilization(), Some(dec!(120)));
        assert!(record.is_over_budget());

        assert_eq!(forecast(2025).utilization(), None);
    }
}
