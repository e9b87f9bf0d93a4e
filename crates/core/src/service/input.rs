//! Inbound payloads for planning operations.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PlanningError;
use crate::record::{ForecastMethod, MonthValues, PlanningRecord, RecordKind, YearField, amount};
use crate::store::RecordFacets;

/// Longest accepted customer or item name.
pub const MAX_NAME_LEN: usize = 255;

/// Longest accepted category or brand.
pub const MAX_LABEL_LEN: usize = 100;

/// Year → field name → amount, as sent by clients.
pub type YearlyInput = BTreeMap<i32, BTreeMap<String, Value>>;

/// Year → month index → amount, as sent by clients.
pub type MonthlyInput = BTreeMap<i32, BTreeMap<u32, Value>>;

/// Payload for creating a record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateRecordInput {
    /// Customer name.
    pub customer: Option<String>,
    /// Item name.
    pub item: Option<String>,
    /// Item category.
    pub category: Option<String>,
    /// Brand.
    pub brand: Option<String>,
    /// Planning year; defaults to the current year.
    pub year: Option<i32>,
    /// Yearly figures.
    #[serde(default)]
    pub yearly_values: YearlyInput,
    /// Month breakdowns, each replacing its year.
    #[serde(default)]
    pub monthly_values: MonthlyInput,
    /// Primary figure for the record's current year.
    pub current_year_amount: Option<Value>,
    /// Primary figure for the record's target year.
    pub next_year_amount: Option<Value>,
    /// Forecast method label (forecasts only).
    pub forecast_method: Option<ForecastMethod>,
    /// Stock quantity (budgets only).
    pub stock: Option<i64>,
    /// Goods in transit (budgets only).
    pub git: Option<Value>,
}

/// Partial payload for updating a record. Absent fields stay as they are.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateRecordInput {
    /// Customer name.
    pub customer: Option<String>,
    /// Item name.
    pub item: Option<String>,
    /// Item category.
    pub category: Option<String>,
    /// Brand.
    pub brand: Option<String>,
    /// Yearly figures to write.
    #[serde(default)]
    pub yearly_values: YearlyInput,
    /// Month breakdowns, each replacing its year.
    #[serde(default)]
    pub monthly_values: MonthlyInput,
    /// Primary figure for the record's current year.
    pub current_year_amount: Option<Value>,
    /// Primary figure for the record's target year.
    pub next_year_amount: Option<Value>,
    /// Forecast method label (forecasts only).
    pub forecast_method: Option<ForecastMethod>,
    /// Stock quantity (budgets only).
    pub stock: Option<i64>,
    /// Goods in transit (budgets only).
    pub git: Option<Value>,
}

/// Values offered to list filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    /// Distinct values of the visible records.
    #[serde(flatten)]
    pub facets: RecordFacets,
    /// Years offered for planning.
    pub available_years: Vec<i32>,
}

/// Figures and attributes shared by create and update payloads.
pub(crate) struct Figures<'a> {
    pub yearly_values: &'a YearlyInput,
    pub monthly_values: &'a MonthlyInput,
    pub current_year_amount: Option<&'a Value>,
    pub next_year_amount: Option<&'a Value>,
    pub forecast_method: Option<ForecastMethod>,
    pub stock: Option<i64>,
    pub git: Option<&'a Value>,
}

impl CreateRecordInput {
    pub(crate) fn figures(&self) -> Figures<'_> {
        Figures {
            yearly_values: &self.yearly_values,
            monthly_values: &self.monthly_values,
            current_year_amount: self.current_year_amount.as_ref(),
            next_year_amount: self.next_year_amount.as_ref(),
            forecast_method: self.forecast_method,
            stock: self.stock,
            git: self.git.as_ref(),
        }
    }
}

impl UpdateRecordInput {
    pub(crate) fn figures(&self) -> Figures<'_> {
        Figures {
            yearly_values: &self.yearly_values,
            monthly_values: &self.monthly_values,
            current_year_amount: self.current_year_amount.as_ref(),
            next_year_amount: self.next_year_amount.as_ref(),
            forecast_method: self.forecast_method,
            stock: self.stock,
            git: self.git.as_ref(),
        }
    }

    /// Applies the classification fields that are present.
    pub(crate) fn apply_fields(&self, record: &mut PlanningRecord) -> Result<(), PlanningError> {
        if let Some(customer) = &self.customer {
            record.customer = required_text("customer", Some(customer), MAX_NAME_LEN)?;
        }
        if let Some(item) = &self.item {
            record.item = required_text("item", Some(item), MAX_NAME_LEN)?;
        }
        if let Some(category) = &self.category {
            record.category = required_text("category", Some(category), MAX_LABEL_LEN)?;
        }
        if let Some(brand) = &self.brand {
            record.brand = required_text("brand", Some(brand), MAX_LABEL_LEN)?;
        }
        Ok(())
    }
}

impl Figures<'_> {
    /// True when the payload carries an actual for `year`.
    pub(crate) fn supplies_actual(&self, year: i32) -> bool {
        self.yearly_values.get(&year).is_some_and(|fields| {
            fields
                .keys()
                .any(|name| YearField::parse(name) == Some(YearField::Actual))
        })
    }

    /// Writes every figure and attribute onto `record`.
    ///
    /// Stops at the first invalid entry; callers discard the record on error.
    pub(crate) fn apply(
        &self,
        record: &mut PlanningRecord,
        years: &RangeInclusive<i32>,
    ) -> Result<(), PlanningError> {
        self.apply_details(record)?;

        for (year, fields) in self.yearly_values {
            check_year(*year, years)?;
            for (name, value) in fields {
                let field = YearField::parse(name).ok_or_else(|| {
                    PlanningError::validation(format!("unknown yearly field '{name}'"))
                })?;
                let amount = amount::coerce(value, field.as_str())?;
                record.set_year_value(*year, field, amount)?;
            }
        }

        let primary = record.kind().primary_field();
        if let Some(value) = self.current_year_amount {
            let amount = amount::coerce(value, "current_year_amount")?;
            record.set_year_value(record.current_year, primary, amount)?;
        }
        if let Some(value) = self.next_year_amount {
            let amount = amount::coerce(value, "next_year_amount")?;
            record.set_year_value(record.target_year, primary, amount)?;
        }

        for (year, months) in self.monthly_values {
            check_year(*year, years)?;
            let mut mapping = MonthValues::new();
            for (month, value) in months {
                mapping.insert(*month, amount::coerce(value, "monthly amount")?);
            }
            record.set_monthly_breakdown(*year, mapping)?;
        }
        Ok(())
    }

    fn apply_details(&self, record: &mut PlanningRecord) -> Result<(), PlanningError> {
        let kind = record.kind();
        if let Some(method) = self.forecast_method {
            let details = record.forecast_details_mut().ok_or_else(|| {
                PlanningError::validation(format!("a {kind} record has no forecast_method"))
            })?;
            details.forecast_method = method;
        }
        if self.stock.is_some() || self.git.is_some() {
            if kind != RecordKind::Budget {
                return Err(PlanningError::validation(format!(
                    "a {kind} record has no stock or git"
                )));
            }
            let git = self
                .git
                .map(|value| amount::coerce(value, "git"))
                .transpose()?;
            if self.stock.is_some_and(|stock| stock < 0) {
                return Err(PlanningError::validation("stock cannot be negative"));
            }
            if let Some(details) = record.budget_details_mut() {
                if let Some(stock) = self.stock {
                    details.stock = stock;
                }
                if let Some(git) = git {
                    details.git = git;
                }
            }
        }
        Ok(())
    }
}

/// Trims a required text field and checks its length.
pub(crate) fn required_text(
    field: &str,
    value: Option<&String>,
    max_len: usize,
) -> Result<String, PlanningError> {
    let value = value.map(|v| v.trim()).unwrap_or_default();
    if value.is_empty() {
        return Err(PlanningError::validation(format!("{field} is required")));
    }
    if value.chars().count() > max_len {
        return Err(PlanningError::validation(format!(
            "{field} must be at most {max_len} characters"
        )));
    }
    Ok(value.to_string())
}

/// Checks that `year` lies in the planning window.
pub(crate) fn check_year(year: i32, years: &RangeInclusive<i32>) -> Result<(), PlanningError> {
    if years.contains(&year) {
        Ok(())
    } else {
        Err(PlanningError::validation(format!(
            "year {year} is outside the planning window {}-{}",
            years.start(),
            years.end()
        )))
    }
}
