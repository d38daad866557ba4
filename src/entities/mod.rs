// Entity Models
// "Identity persists, values change"
//
// - Expense: one recorded expense, identified by a UUID string
// - Category: closed set of buckets with display labels

pub mod category;
pub mod expense;

pub use category::{grouping_key, label_for, Category, FALLBACK_KEY};
pub use expense::{
    assign_missing_ids, coerce_amount, new_id, parse_amount, remove_by_id, replace_by_id,
    ExpenseRecord,
};
