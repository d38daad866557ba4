// 🏷️ Category Entity - Closed set of expense buckets
//
// Records store the category key they were created with ("food",
// "transport", ...). Display always resolves that key through this closed
// enumeration: anything unknown lands in `Other`.
//
// Grouping does NOT go through the enum. `grouping_key` keeps the raw key so
// a hand-edited "groceries" still gets its own total, while the label shown
// for it is "Other".

use serde::{Deserialize, Serialize};
use std::fmt;

/// Key used when a record carries no category at all
pub const FALLBACK_KEY: &str = "other";

// ============================================================================
// CATEGORY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Food,
    Transport,
    Shopping,
    Entertainment,
    Health,
    Bills,
    Education,
    Travel,
    /// Fallback for empty and unrecognized keys
    Other,
}

impl Category {
    /// All buckets in form order
    pub const ALL: [Category; 9] = [
        Category::Food,
        Category::Transport,
        Category::Shopping,
        Category::Entertainment,
        Category::Health,
        Category::Bills,
        Category::Education,
        Category::Travel,
        Category::Other,
    ];

    /// Resolve a stored key. Matching is exact, like the stored values.
    pub fn from_key(key: &str) -> Self {
        match key {
            "food" => Category::Food,
            "transport" => Category::Transport,
            "shopping" => Category::Shopping,
            "entertainment" => Category::Entertainment,
            "health" => Category::Health,
            "bills" => Category::Bills,
            "education" => Category::Education,
            "travel" => Category::Travel,
            _ => Category::Other,
        }
    }

    /// Key written to storage
    pub fn key(&self) -> &'static str {
        match self {
            Category::Food => "food",
            Category::Transport => "transport",
            Category::Shopping => "shopping",
            Category::Entertainment => "entertainment",
            Category::Health => "health",
            Category::Bills => "bills",
            Category::Education => "education",
            Category::Travel => "travel",
            Category::Other => FALLBACK_KEY,
        }
    }

    /// Human-friendly label for lists and charts
    pub fn label(&self) -> &'static str {
        match self {
            Category::Food => "Food & Dining",
            Category::Transport => "Transportation",
            Category::Shopping => "Shopping",
            Category::Entertainment => "Entertainment",
            Category::Health => "Health & Medical",
            Category::Bills => "Bills & Utilities",
            Category::Education => "Education",
            Category::Travel => "Travel",
            Category::Other => "Other",
        }
    }

    /// Next bucket in form order, wrapping around. Used by filter cycling.
    pub fn next(&self) -> Self {
        let idx = Category::ALL.iter().position(|c| c == self).unwrap_or(0);
        Category::ALL[(idx + 1) % Category::ALL.len()]
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::Other
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Key a raw category is totalled under: the raw key itself, or
/// [`FALLBACK_KEY`] when empty.
pub fn grouping_key(raw: &str) -> &str {
    if raw.is_empty() {
        FALLBACK_KEY
    } else {
        raw
    }
}

/// Label for a raw stored key
pub fn label_for(raw: &str) -> &'static str {
    Category::from_key(raw).label()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_key_known_buckets() {
        for category in Category::ALL {
            assert_eq!(Category::from_key(category.key()), category);
        }
    }

    #[test]
    fn test_from_key_falls_back_to_other() {
        assert_eq!(Category::from_key(""), Category::Other);
        assert_eq!(Category::from_key("groceries"), Category::Other);
        assert_eq!(Category::from_key("Food"), Category::Other);
    }

    #[test]
    fn test_labels() {
        assert_eq!(Category::Food.label(), "Food & Dining");
        assert_eq!(Category::Health.label(), "Health & Medical");
        assert_eq!(Category::Bills.label(), "Bills & Utilities");
        assert_eq!(label_for("transport"), "Transportation");
        assert_eq!(label_for("groceries"), "Other");
        assert_eq!(Category::Travel.to_string(), "Travel");
    }

    #[test]
    fn test_grouping_key_keeps_raw_value() {
        assert_eq!(grouping_key(""), "other");
        assert_eq!(grouping_key("food"), "food");
        assert_eq!(grouping_key("groceries"), "groceries");
    }

    #[test]
    fn test_next_wraps_around() {
        assert_eq!(Category::Food.next(), Category::Transport);
        assert_eq!(Category::Other.next(), Category::Food);
    }

    #[test]
    fn test_serde_uses_keys() {
        let json = serde_json::to_string(&Category::Entertainment).unwrap();
        assert_eq!(json, "\"entertainment\"");

        let parsed: Category = serde_json::from_str("\"bills\"").unwrap();
        assert_eq!(parsed, Category::Bills);
    }
}
