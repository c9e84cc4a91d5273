use std::collections::{HashMap, HashSet};

use time::{Duration, OffsetDateTime};
use weekmenu_shared::recipe::RecipeHistoryEntry;

/// Recipes made within `days` of `now`, both ends inclusive
pub fn exclusion_set(history: &[RecipeHistoryEntry], days: u32, now: OffsetDateTime) -> HashSet<String> {
    let from = now - Duration::days(days as i64);

    history
        .iter()
        .filter(|entry| entry.date_made >= from && entry.date_made <= now)
        .map(|entry| entry.recipe_id.to_owned())
        .collect()
}

/// Most recent `date_made` per recipe
pub fn last_made(history: &[RecipeHistoryEntry]) -> HashMap<String, OffsetDateTime> {
    let mut last = HashMap::new();

    for entry in history {
        last.entry(entry.recipe_id.to_owned())
            .and_modify(|date: &mut OffsetDateTime| *date = (*date).max(entry.date_made))
            .or_insert(entry.date_made);
    }

    last
}

/// Index of the newest entry for `recipe_id`, whatever the log order
pub fn most_recent_index(history: &[RecipeHistoryEntry], recipe_id: &str) -> Option<usize> {
    history
        .iter()
        .enumerate()
        .filter(|(_, entry)| entry.recipe_id == recipe_id)
        .max_by_key(|(_, entry)| entry.date_made)
        .map(|(index, _)| index)
}
