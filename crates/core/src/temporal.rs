//! Calendar context for planning.
//!
//! Every "which year are we planning" question goes through [`TemporalContext`],
//! which reads the time from an injected [`Clock`] at call time.

use std::fmt;
use std::ops::RangeInclusive;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};
use planbook_shared::PlanningConfig;

/// Source of the current instant.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Year and period arithmetic relative to "now".
#[derive(Clone)]
pub struct TemporalContext {
    clock: Arc<dyn Clock>,
    first_year: i32,
    horizon_years: i32,
}

impl fmt::Debug for TemporalContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemporalContext")
            .field("now", &self.clock.now())
            .field("first_year", &self.first_year)
            .field("horizon_years", &self.horizon_years)
            .finish()
    }
}

impl TemporalContext {
    /// Creates a context with the default planning window.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::from_config(clock, &PlanningConfig::default())
    }

    /// Creates a context whose planning window comes from configuration.
    pub fn from_config(clock: Arc<dyn Clock>, config: &PlanningConfig) -> Self {
        Self {
            clock,
            first_year: config.first_year,
            horizon_years: config.horizon_years.max(0),
        }
    }

    /// Context backed by the system clock.
    pub fn system(config: &PlanningConfig) -> Self {
        Self::from_config(Arc::new(SystemClock), config)
    }

    /// The current instant.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Calendar year of "now".
    pub fn current_year(&self) -> i32 {
        self.now().year()
    }

    /// The year being planned.
    pub fn target_year(&self) -> i32 {
        self.current_year() + 1
    }

    /// Month of "now", 1-12.
    pub fn current_month(&self) -> u32 {
        self.now().month()
    }

    /// Quarter of "now", 1-4.
    pub fn current_quarter(&self) -> u32 {
        (self.current_month() - 1) / 3 + 1
    }

    /// Whole months left after the current one.
    pub fn remaining_months_in_year(&self) -> u32 {
        12 - self.current_month()
    }

    /// Years offered for planning, oldest first.
    pub fn available_years(&self) -> Vec<i32> {
        self.year_window().collect()
    }

    /// The planning window as a range.
    pub fn year_window(&self) -> RangeInclusive<i32> {
        self.first_year..=self.current_year() + self.horizon_years
    }

    /// True when `year` lies after the current year.
    pub fn is_future_year(&self, year: i32) -> bool {
        year > self.current_year()
    }
}
