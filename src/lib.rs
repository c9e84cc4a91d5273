pub mod config;
pub mod observability;
pub mod planner;
pub mod store;

pub use planner::{Planner, RecipeSelection};
pub use store::{MemoryStore, RecipeFilter, Snapshot, Store};
