// 🖥️ Dashboard - Plain-data view model for any front end
//
// One recompute cycle: records + criteria → visible rows → stats over the
// visible rows → display strings. The TUI and the CLI both render from a
// `Dashboard`; neither touches the engines directly.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::calendar;
use crate::entities::{label_for, ExpenseRecord};
use crate::filter::{apply_filters, FilterCriteria};
use crate::stats::{compute_stats, Stats};

/// Shown in place of an empty description
pub const NO_DESCRIPTION: &str = "(no description)";

// ============================================================================
// FORMATTING
// ============================================================================

/// Fixed two-decimal currency: `$4.50`, `$-3.00`
pub fn format_currency(amount: f64) -> String {
    let amount = if amount.is_finite() { amount } else { 0.0 };
    format!("${:.2}", amount)
}

/// `dd,mm,yyyy` for list rows. Unreadable dates are shown as stored.
pub fn format_display_date(raw: &str) -> String {
    match calendar::parse_date(raw) {
        Some(date) => format!("{:02},{:02},{}", date.day(), date.month(), date.year()),
        None => raw.to_string(),
    }
}

// ============================================================================
// ROWS
// ============================================================================

/// One list entry, ready to print
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpenseRow {
    pub id: String,
    pub description: String,
    pub category: String,
    pub date: String,
    pub amount: String,
}

impl From<&ExpenseRecord> for ExpenseRow {
    fn from(record: &ExpenseRecord) -> Self {
        let description = if record.description.is_empty() {
            NO_DESCRIPTION.to_string()
        } else {
            record.description.clone()
        };

        ExpenseRow {
            id: record.id.clone(),
            description,
            category: label_for(&record.category).to_string(),
            date: format_display_date(&record.date),
            amount: format_currency(record.amount),
        }
    }
}

/// One bar of the category breakdown
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySlice {
    pub key: String,
    pub label: String,
    pub amount: f64,
    /// Fraction of the visible total, 0.0 - 1.0 for all-positive amounts
    pub share: f64,
}

// ============================================================================
// DASHBOARD
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub rows: Vec<ExpenseRow>,
    pub stats: Stats,
    pub total_display: String,
    pub week_display: String,
    pub month_display: String,
    pub count_display: String,
}

impl Dashboard {
    /// Run filters, then aggregate over what is visible
    pub fn build(records: &[ExpenseRecord], criteria: &FilterCriteria, today: NaiveDate) -> Self {
        let visible = apply_filters(records, criteria, today);
        let stats = compute_stats(visible.iter().copied(), today);
        let rows = visible.into_iter().map(ExpenseRow::from).collect();

        Dashboard {
            rows,
            total_display: format_currency(stats.total),
            week_display: format_currency(stats.week_total),
            month_display: format_currency(stats.month_total),
            count_display: stats.count.to_string(),
            stats,
        }
    }

    /// Nothing matches: render the empty-state message instead of a list
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Category breakdown, largest first
    pub fn category_slices(&self) -> Vec<CategorySlice> {
        self.stats
            .by_category
            .sorted_desc()
            .into_iter()
            .map(|(key, amount)| CategorySlice {
                key: key.to_string(),
                label: label_for(key).to_string(),
                amount,
                share: self.stats.by_category.share(key),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Period;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> Vec<ExpenseRecord> {
        vec![
            ExpenseRecord::new("Coffee", 4.50, "food", "2024-03-01"),
            ExpenseRecord::new("Bus", 2.00, "transport", "2024-03-01"),
            ExpenseRecord::new("Dinner", 30.00, "food", "2024-03-05"),
            ExpenseRecord::new("", 7.25, "groceries", "2024-03-06"),
        ]
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(4.5), "$4.50");
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(1234.567), "$1234.57");
        assert_eq!(format_currency(-3.0), "$-3.00");
        assert_eq!(format_currency(f64::NAN), "$0.00");
    }

    #[test]
    fn test_format_display_date() {
        assert_eq!(format_display_date("2024-03-01"), "01,03,2024");
        assert_eq!(format_display_date("2024-12-25"), "25,12,2024");
        assert_eq!(format_display_date("soon"), "soon");
    }

    #[test]
    fn test_row_formatting() {
        let records = sample();
        let row = ExpenseRow::from(&records[3]);

        assert_eq!(row.description, NO_DESCRIPTION);
        assert_eq!(row.category, "Other");
        assert_eq!(row.date, "06,03,2024");
        assert_eq!(row.amount, "$7.25");
        assert_eq!(row.id, records[3].id);
    }

    #[test]
    fn test_build_unfiltered() {
        let records = sample();
        let dashboard = Dashboard::build(&records, &FilterCriteria::default(), date(2024, 3, 6));

        assert_eq!(dashboard.rows.len(), 4);
        assert_eq!(dashboard.total_display, "$43.75");
        assert_eq!(dashboard.week_display, "$37.25");
        assert_eq!(dashboard.month_display, "$43.75");
        assert_eq!(dashboard.count_display, "4");
        assert!(!dashboard.is_empty());
    }

    #[test]
    fn test_stats_follow_the_filter() {
        let records = sample();
        let criteria = FilterCriteria::new("", "food", Period::All);

        let dashboard = Dashboard::build(&records, &criteria, date(2024, 3, 6));

        assert_eq!(dashboard.rows.len(), 2);
        assert_eq!(dashboard.stats.count, 2);
        assert_eq!(dashboard.total_display, "$34.50");
        assert_eq!(dashboard.week_display, "$30.00");
    }

    #[test]
    fn test_empty_state() {
        let records = sample();
        let criteria = FilterCriteria::new("nothing like this", "", Period::All);

        let dashboard = Dashboard::build(&records, &criteria, date(2024, 3, 6));

        assert!(dashboard.is_empty());
        assert_eq!(dashboard.total_display, "$0.00");
        assert_eq!(dashboard.count_display, "0");
        assert!(dashboard.category_slices().is_empty());
    }

    #[test]
    fn test_category_slices() {
        let records = sample();
        let dashboard = Dashboard::build(&records, &FilterCriteria::default(), date(2024, 3, 6));

        let slices = dashboard.category_slices();

        assert_eq!(slices.len(), 3);
        assert_eq!(slices[0].key, "food");
        assert_eq!(slices[0].label, "Food & Dining");
        assert_eq!(slices[0].amount, 34.5);
        assert!((slices[0].share - 34.5 / 43.75).abs() < 1e-9);
        assert_eq!(slices[1].key, "groceries");
        assert_eq!(slices[1].label, "Other");
        assert_eq!(slices[2].key, "transport");
    }
}
