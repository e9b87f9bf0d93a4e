//! Planning record value types.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Which kind of planning line a record is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    /// A budget line.
    Budget,
    /// A forecast line.
    Forecast,
}

impl RecordKind {
    /// Returns the string representation of the kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Budget => "budget",
            Self::Forecast => "forecast",
        }
    }

    /// Parses a kind from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "budget" => Some(Self::Budget),
            "forecast" => Some(Self::Forecast),
            _ => None,
        }
    }

    /// The figure mirrored into the current/next year caches.
    #[must_use]
    pub fn primary_field(&self) -> YearField {
        match self {
            Self::Budget => YearField::Budget,
            Self::Forecast => YearField::Forecast,
        }
    }

    /// Whether this kind of record may hold `field`.
    #[must_use]
    pub fn allows(&self, field: YearField) -> bool {
        field == YearField::Actual || field == self.primary_field()
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A figure stored per year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum YearField {
    /// Planned budget.
    Budget,
    /// Realized actual.
    Actual,
    /// Projected forecast.
    Forecast,
}

impl YearField {
    /// Returns the string representation of the field.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Budget => "budget",
            Self::Actual => "actual",
            Self::Forecast => "forecast",
        }
    }

    /// Parses a field name.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "budget" => Some(Self::Budget),
            "actual" => Some(Self::Actual),
            "forecast" => Some(Self::Forecast),
            _ => None,
        }
    }
}

impl fmt::Display for YearField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Figures recorded for one year. Absent means no data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearEntry {
    /// Planned budget.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<Decimal>,
    /// Realized actual.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<Decimal>,
    /// Projected forecast.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forecast: Option<Decimal>,
}

impl YearEntry {
    /// Returns the stored value of `field`, if any.
    #[must_use]
    pub fn get(&self, field: YearField) -> Option<Decimal> {
        match field {
            YearField::Budget => self.budget,
            YearField::Actual => self.actual,
            YearField::Forecast => self.forecast,
        }
    }

    pub(crate) fn set(&mut self, field: YearField, amount: Decimal) {
        let slot = match field {
            YearField::Budget => &mut self.budget,
            YearField::Actual => &mut self.actual,
            YearField::Forecast => &mut self.forecast,
        };
        *slot = Some(amount);
    }
}

/// How a forecast figure was produced. A label only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForecastMethod {
    /// ARIMA model.
    Arima,
    /// Linear regression.
    Linear,
    /// Neural network.
    Neural,
    /// Exponential smoothing.
    Exponential,
    /// Entered by hand.
    #[default]
    Manual,
}

impl ForecastMethod {
    /// Returns the string representation of the method.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Arima => "arima",
            Self::Linear => "linear",
            Self::Neural => "neural",
            Self::Exponential => "exponential",
            Self::Manual => "manual",
        }
    }
}

/// Confidence classification derived from forecast accuracy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    /// Accuracy below 70.
    Low,
    /// Accuracy from 70 up to 90.
    #[default]
    Medium,
    /// Accuracy of 90 or more.
    High,
}

impl ConfidenceLevel {
    /// Returns the string representation of the level.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Budget-only attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetDetails {
    /// Stock quantity on hand.
    #[serde(default)]
    pub stock: i64,
    /// Goods in transit.
    #[serde(default)]
    pub git: Decimal,
}

/// Forecast-only attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastDetails {
    /// Method label.
    #[serde(default)]
    pub forecast_method: ForecastMethod,
    /// Accuracy of the current-year forecast against its actual, 0-100.
    #[serde(default)]
    pub accuracy_score: Decimal,
    /// Classification of `accuracy_score`.
    #[serde(default)]
    pub confidence_level: ConfidenceLevel,
}

/// Kind-specific attributes of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RecordDetails {
    /// Budget line attributes.
    Budget(BudgetDetails),
    /// Forecast line attributes.
    Forecast(ForecastDetails),
}

impl RecordDetails {
    /// Default attributes for a new record of `kind`.
    #[must_use]
    pub fn for_kind(kind: RecordKind) -> Self {
        match kind {
            RecordKind::Budget => Self::Budget(BudgetDetails::default()),
            RecordKind::Forecast => Self::Forecast(ForecastDetails::default()),
        }
    }

    /// The kind these attributes belong to.
    #[must_use]
    pub fn kind(&self) -> RecordKind {
        match self {
            Self::Budget(_) => RecordKind::Budget,
            Self::Forecast(_) => RecordKind::Forecast,
        }
    }
}
