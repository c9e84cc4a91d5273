mod date;
mod error;
pub mod mealplan;
pub mod recipe;
pub mod shopping;
pub mod user;

pub use date::*;
pub use error::*;

/// Trim and lowercase a name so ingredient, pantry and override lookups
/// compare case-insensitively.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}
