// 📊 Aggregation Engine - Totals and breakdowns over expense records
//
// Pure functions: records in, plain numbers out. The caller decides which
// records to pass (the whole list or a filtered view) and which date counts
// as "today".

use chrono::NaiveDate;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::calendar;
use crate::entities::ExpenseRecord;

// ============================================================================
// CATEGORY TOTALS
// ============================================================================

/// Summed amount per grouping key, in first-seen order.
///
/// Kept as a small vector: there are rarely more than nine keys and the
/// rendering order must not depend on hashing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryTotals {
    entries: Vec<(String, f64)>,
}

impl CategoryTotals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `amount` to `key`, creating the entry at the end if needed
    pub fn add(&mut self, key: &str, amount: f64) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, total)) => *total += amount,
            None => self.entries.push((key.to_string(), amount)),
        }
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fraction of the summed totals that `key` accounts for (0 when the
    /// overall sum is zero or the key is absent)
    pub fn share(&self, key: &str) -> f64 {
        let sum: f64 = self.entries.iter().map(|(_, v)| v).sum();
        match self.get(key) {
            Some(value) if sum != 0.0 => value / sum,
            _ => 0.0,
        }
    }

    /// Entries ordered by amount, largest first (ties keep first-seen order)
    pub fn sorted_desc(&self) -> Vec<(&str, f64)> {
        let mut sorted: Vec<_> = self.iter().collect();
        sorted.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        sorted
    }
}

/// Serialized as a JSON object in first-seen order
impl Serialize for CategoryTotals {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, total) in &self.entries {
            map.serialize_entry(key, total)?;
        }
        map.end()
    }
}

// ============================================================================
// STATS
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct Stats {
    pub total: f64,
    pub count: usize,
    pub week_total: f64,
    pub month_total: f64,
    pub by_category: CategoryTotals,
}

impl Stats {
    /// Mean amount per record, 0 for an empty set
    pub fn average(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total / self.count as f64
        }
    }
}

/// Compute totals over `records` relative to `today`.
///
/// `week_total` covers the Monday-start week containing `today`,
/// `month_total` its calendar month. Records with an unreadable date still
/// count toward `total` and `by_category`.
pub fn compute_stats<'a, I>(records: I, today: NaiveDate) -> Stats
where
    I: IntoIterator<Item = &'a ExpenseRecord>,
{
    let mut stats = Stats::default();

    for record in records {
        let amount = record.amount;
        stats.count += 1;
        stats.total += amount;

        if let Some(date) = record.calendar_date() {
            if calendar::same_week(date, today) {
                stats.week_total += amount;
            }
            if calendar::same_month(date, today) {
                stats.month_total += amount;
            }
        }

        stats.by_category.add(record.grouping_key(), amount);
    }

    stats
}
