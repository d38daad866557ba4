// 📝 Expense Input - Presence checks for the add/edit form
//
// The form hands over raw strings. Only two things can reject a submission:
// an empty description or an amount that is zero / not a number. Everything
// else gets a default (category "other", date today).

use chrono::NaiveDate;
use thiserror::Error;

use crate::calendar;
use crate::entities::{parse_amount, ExpenseRecord, FALLBACK_KEY};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("description is required")]
    MissingDescription,

    #[error("amount must be a non-zero number")]
    ZeroAmount,
}

/// Raw form values, exactly as typed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseInput {
    pub description: String,
    pub amount: String,
    pub category: String,
    pub date: String,
}

/// Validated values for a new or edited record (no identity yet)
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub description: String,
    pub amount: f64,
    pub category: String,
    pub date: String,
}

impl ExpenseInput {
    pub fn new(
        description: impl Into<String>,
        amount: impl Into<String>,
        category: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        ExpenseInput {
            description: description.into(),
            amount: amount.into(),
            category: category.into(),
            date: date.into(),
        }
    }

    /// Pre-fill an edit form from a stored record
    pub fn from_record(record: &ExpenseRecord) -> Self {
        ExpenseInput {
            description: record.description.clone(),
            amount: record.amount.to_string(),
            category: record.category.clone(),
            date: record.date.clone(),
        }
    }

    /// Replace the fields that were given, keep the rest
    pub fn with_overrides(
        self,
        description: Option<String>,
        amount: Option<String>,
        category: Option<String>,
        date: Option<String>,
    ) -> Self {
        ExpenseInput {
            description: description.unwrap_or(self.description),
            amount: amount.unwrap_or(self.amount),
            category: category.unwrap_or(self.category),
            date: date.unwrap_or(self.date),
        }
    }

    /// Apply presence checks and defaults. `today` fills an empty date.
    pub fn validate(&self, today: NaiveDate) -> Result<NewExpense, InputError> {
        let description = self.description.trim();
        if description.is_empty() {
            return Err(InputError::MissingDescription);
        }

        let amount = match parse_amount(&self.amount) {
            Some(a) if a != 0.0 => a,
            _ => return Err(InputError::ZeroAmount),
        };

        let category = if self.category.is_empty() {
            FALLBACK_KEY.to_string()
        } else {
            self.category.clone()
        };

        let date = if self.date.is_empty() {
            calendar::format_iso(today)
        } else {
            self.date.clone()
        };

        Ok(NewExpense {
            description: description.to_string(),
            amount,
            category,
            date,
        })
    }
}

impl NewExpense {
    /// Materialize as a record with a fresh identity
    pub fn into_record(self) -> ExpenseRecord {
        ExpenseRecord::new(self.description, self.amount, self.category, self.date)
    }
}
