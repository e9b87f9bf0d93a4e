//! Forecast accuracy against realized actuals.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::record::{ConfidenceLevel, PlanningRecord};

/// Forecast vs actual comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccuracyResult {
    /// Forecast amount.
    pub forecast_amount: Decimal,
    /// Actual amount.
    pub actual_amount: Decimal,
    /// `(actual - forecast) / forecast * 100`, rounded to 2 dp.
    pub variance_percentage: Decimal,
    /// `100 - |variance|` clamped to 0..=100, rounded to 2 dp.
    pub accuracy_score: Decimal,
    /// Classification of the score.
    pub confidence_level: ConfidenceLevel,
}

/// Stateless accuracy evaluator.
pub struct AccuracyEvaluator;

impl AccuracyEvaluator {
    /// Compares a forecast with an actual. `None` when the forecast is zero.
    #[must_use]
    pub fn evaluate(forecast: Decimal, actual: Decimal) -> Option<AccuracyResult> {
        if forecast.is_zero() {
            return None;
        }
        let variance = (actual - forecast) / forecast * Decimal::ONE_HUNDRED;
        let accuracy =
            (Decimal::ONE_HUNDRED - variance.abs()).clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);

        Some(AccuracyResult {
            forecast_amount: forecast,
            actual_amount: actual,
            variance_percentage: round(variance),
            accuracy_score: round(accuracy),
            // Bands apply to the exact score, before rounding.
            confidence_level: Self::classify(accuracy),
        })
    }

    /// Maps an accuracy score to a confidence level.
    #[must_use]
    pub fn classify(accuracy: Decimal) -> ConfidenceLevel {
        if accuracy >= Decimal::from(90) {
            ConfidenceLevel::High
        } else if accuracy >= Decimal::from(70) {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }

    /// Scores a forecast record's current-year forecast against `actual`.
    ///
    /// Budgets and forecasts without a current-year figure are left unchanged.
    /// Applying the same actual twice yields the same record.
    pub fn update_accuracy(record: &mut PlanningRecord, actual: Decimal) -> Option<AccuracyResult> {
        let forecast = record.current_year_cache;
        let details = record.forecast_details_mut()?;
        let result = Self::evaluate(forecast, actual)?;
        details.accuracy_score = result.accuracy_score;
        details.confidence_level = result.confidence_level;
        Some(result)
    }
}

fn round(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
