// 🔎 Filter Engine - Search, category and period predicates
//
// A record is visible when ALL three predicates accept it:
// 1. text:     description contains the search text (case-insensitive)
// 2. category: raw category equals the selected key
// 3. period:   date falls in today / this week / this month
// An empty criterion always accepts.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::calendar;
use crate::entities::ExpenseRecord;

// ============================================================================
// PERIOD
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// No time restriction ("")
    #[default]
    #[serde(rename = "")]
    All,
    Today,
    Week,
    Month,
}

impl Period {
    /// Parse a period key. Unrecognized keys mean "no restriction".
    pub fn from_key(key: &str) -> Self {
        match key {
            "today" => Period::Today,
            "week" => Period::Week,
            "month" => Period::Month,
            _ => Period::All,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Period::All => "",
            Period::Today => "today",
            Period::Week => "week",
            Period::Month => "month",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Period::All => "All time",
            Period::Today => "Today",
            Period::Week => "This week",
            Period::Month => "This month",
        }
    }

    /// Cycle All → Today → Week → Month → All
    pub fn next(&self) -> Self {
        match self {
            Period::All => Period::Today,
            Period::Today => Period::Week,
            Period::Week => Period::Month,
            Period::Month => Period::All,
        }
    }

    /// Does `date` fall in this window around `today`?
    pub fn contains(&self, date: Option<NaiveDate>, today: NaiveDate) -> bool {
        match (self, date) {
            (Period::All, _) => true,
            (_, None) => false,
            (Period::Today, Some(d)) => calendar::same_day(d, today),
            (Period::Week, Some(d)) => calendar::same_week(d, today),
            (Period::Month, Some(d)) => calendar::same_month(d, today),
        }
    }
}

impl FromStr for Period {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Period::from_key(s))
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// FILTER CRITERIA
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Case-insensitive substring of the description; "" matches all
    #[serde(default)]
    pub search_text: String,

    /// Exact raw category key; "" matches all
    #[serde(default)]
    pub category: String,

    #[serde(default)]
    pub period: Period,
}

impl FilterCriteria {
    pub fn new(search_text: impl Into<String>, category: impl Into<String>, period: Period) -> Self {
        FilterCriteria {
            search_text: search_text.into(),
            category: category.into(),
            period,
        }
    }

    /// True when no predicate restricts anything
    pub fn is_empty(&self) -> bool {
        self.search_text.is_empty() && self.category.is_empty() && self.period == Period::All
    }

    /// Reset every criterion ("Clear filters")
    pub fn clear(&mut self) {
        *self = FilterCriteria::default();
    }

    /// Evaluate all three predicates against one record
    pub fn matches(&self, record: &ExpenseRecord, today: NaiveDate) -> bool {
        self.matches_text(record) && self.matches_category(record) && self.matches_period(record, today)
    }

    fn matches_text(&self, record: &ExpenseRecord) -> bool {
        if self.search_text.is_empty() {
            return true;
        }
        let needle = self.search_text.to_lowercase();
        record.description.to_lowercase().contains(&needle)
    }

    fn matches_category(&self, record: &ExpenseRecord) -> bool {
        self.category.is_empty() || record.category == self.category
    }

    fn matches_period(&self, record: &ExpenseRecord, today: NaiveDate) -> bool {
        // Skip date parsing entirely when there is no window
        self.period == Period::All || self.period.contains(record.calendar_date(), today)
    }
}

/// Visible subset of `records`, in their original order.
///
/// Returns references into the input; nothing is copied or mutated.
pub fn apply_filters<'a>(
    records: &'a [ExpenseRecord],
    criteria: &FilterCriteria,
    today: NaiveDate,
) -> Vec<&'a ExpenseRecord> {
    records
        .iter()
        .filter(|record| criteria.matches(record, today))
        .collect()
}
