// 💸 Expense Entity - One recorded expense
//
// "The id is IDENTITY (never changes), every other field is a VALUE"
//
// The stored shape is the flat JSON object the list has always been saved
// as: { id, description, amount, category, date }. Loading is lenient so a
// hand-edited or older blob still yields records:
// - amount may be a number or a numeric string; anything else counts as 0
// - description / category / date default to ""
// - unknown fields are ignored
// - a missing, blank or repeated id is replaced on load (see assign_missing_ids)

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

use crate::calendar;
use crate::entities::category::{self, Category};

// ============================================================================
// EXPENSE RECORD
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    /// Stable identity (UUID v4) - assigned once at creation
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub description: String,

    /// Coerced on load, see [`coerce_amount`]
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub amount: f64,

    /// Raw category key as entered ("food", "travel", ...)
    #[serde(default)]
    pub category: String,

    /// Calendar date as entered, normally `YYYY-MM-DD`
    #[serde(default)]
    pub date: String,
}

impl ExpenseRecord {
    /// Create a record with a fresh identity
    pub fn new(
        description: impl Into<String>,
        amount: f64,
        category: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        ExpenseRecord {
            id: new_id(),
            description: description.into(),
            amount: finite_or_zero(amount),
            category: category.into(),
            date: date.into(),
        }
    }

    /// Display bucket (unknown keys resolve to `Other`)
    pub fn category(&self) -> Category {
        Category::from_key(&self.category)
    }

    /// Key this record is totalled under
    pub fn grouping_key(&self) -> &str {
        category::grouping_key(&self.category)
    }

    /// Parsed calendar date, `None` when the stored date is unreadable
    pub fn calendar_date(&self) -> Option<NaiveDate> {
        calendar::parse_date(&self.date)
    }
}

/// Generate a record id
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Give every record without a usable id one of its own.
///
/// A blank id, or one already taken by an earlier record, is replaced with a
/// UUID v5 derived from the record's position and stored id. The same stored
/// list always yields the same ids, so an id read from one load still
/// addresses the record on the next load. Returns how many ids were assigned.
pub fn assign_missing_ids(records: &mut [ExpenseRecord]) -> usize {
    let mut seen: HashSet<String> = HashSet::with_capacity(records.len());
    let mut assigned = 0;

    for (index, record) in records.iter_mut().enumerate() {
        if record.id.trim().is_empty() || seen.contains(&record.id) {
            let mut salt = 0u32;
            let id = loop {
                let name = format!("expense/{}/{}/{}", index, record.id, salt);
                let candidate = Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes()).to_string();
                if !seen.contains(&candidate) {
                    break candidate;
                }
                salt += 1;
            };
            record.id = id;
            assigned += 1;
        }
        seen.insert(record.id.clone());
    }

    assigned
}

// ============================================================================
// AMOUNT COERCION
// ============================================================================

/// Coerce a stored JSON value to an amount.
///
/// Numbers pass through, numeric strings are parsed (blank is 0), every other
/// value is 0. Non-finite results are 0 so the list always re-serializes.
pub fn coerce_amount(value: &serde_json::Value) -> f64 {
    let amount = match value {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
        serde_json::Value::String(s) => parse_amount(s).unwrap_or(0.0),
        _ => 0.0,
    };
    finite_or_zero(amount)
}

/// Parse a user-typed amount. Blank input is 0, unparseable input is `None`.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn finite_or_zero(amount: f64) -> f64 {
    if amount.is_finite() {
        amount
    } else {
        0.0
    }
}

fn deserialize_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(coerce_amount(&value))
}

// ============================================================================
// COLLECTION HELPERS
// ============================================================================

/// Replace the values of the record with `id`, keeping its identity and its
/// position. Returns false when no record has that id.
pub fn replace_by_id(records: &mut [ExpenseRecord], id: &str, replacement: ExpenseRecord) -> bool {
    match records.iter_mut().find(|r| r.id == id) {
        Some(slot) => {
            *slot = ExpenseRecord {
                id: slot.id.clone(),
                ..replacement
            };
            true
        }
        None => false,
    }
}

/// Remove the record with `id`. Returns false (collection untouched) when no
/// record has that id.
pub fn remove_by_id(records: &mut Vec<ExpenseRecord>, id: &str) -> bool {
    let before = records.len();
    records.retain(|r| r.id != id);
    records.len() != before
}
