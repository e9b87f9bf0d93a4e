//! Planning records: yearly and monthly figures with cached quick-access values.

pub mod amount;
pub mod model;
pub mod sync;
pub mod types;

#[cfg(test)]
mod model_props;

pub use model::{LAST_MONTH, MonthValues, MonthlyValues, NewRecord, PlanningRecord, YearlyValues};
pub use sync::Synchronizer;
pub use types::{
    BudgetDetails, ConfidenceLevel, ForecastDetails, ForecastMethod, RecordDetails, RecordKind,
    YearEntry, YearField,
};
