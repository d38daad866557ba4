// Expense Tracker - Core Library
// Exposes all modules for use in the CLI, the TUI, and tests

pub mod calendar;   // Day / week / month identity
pub mod entities;   // Expense record + category enumeration
pub mod input;      // Form validation for add / edit
pub mod db;         // Record store over a key-value backend
pub mod stats;      // Aggregation engine
pub mod filter;     // Filter engine
pub mod dashboard;  // View model + display formatting

// Re-export commonly used types
pub use db::{
    KeyValueStore, MemoryKeyValueStore, RecordStore, SqliteKeyValueStore,
    setup_database, STORAGE_KEY,
};
pub use entities::{Category, ExpenseRecord};
pub use input::{ExpenseInput, InputError, NewExpense};
pub use stats::{compute_stats, CategoryTotals, Stats};
pub use filter::{apply_filters, FilterCriteria, Period};
pub use dashboard::{
    format_currency, format_display_date, CategorySlice, Dashboard, ExpenseRow, NO_DESCRIPTION,
};
