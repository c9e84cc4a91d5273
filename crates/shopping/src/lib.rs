pub mod aggregation;
pub mod categorization;
pub mod fraction_utils;
pub mod list;
pub mod pantry;
pub mod unit;

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use aggregation::{Aggregation, IngredientAggregationService, ScaledRecipe};
pub use categorization::{BuiltinCategory, CategorizationService, Category, MISC};
pub use fraction_utils::{display_item, format_amount, round_for_display};
pub use unit::{Classification, Family, classify, merge};

/// Per-entry result of an add, so a bulk add can partially succeed
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum AddOutcome {
    Added(String),
    /// An entry with the same case-insensitive name already exists
    DuplicateSkipped(String),
    Blank,
}

impl AddOutcome {
    pub fn is_added(&self) -> bool {
        matches!(self, AddOutcome::Added(_))
    }
}
