use std::collections::HashSet;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use weekmenu_shared::mealplan::WeeklyPlan;
use weekmenu_shared::recipe::{Recipe, RecipeHistoryEntry};
use weekmenu_shared::{Error, Result, validate_day};

use crate::generate::order_candidates;
use crate::history::last_made;

pub struct SwapInput<'a> {
    pub old_id: &'a str,
    /// Category to draw from, defaults to the old recipe's category
    pub category: Option<&'a str>,
    /// Extra ids the caller does not want, e.g. recipes already rejected
    pub exclude_ids: &'a [String],
    pub catalog: &'a [Recipe],
    pub history: &'a [RecipeHistoryEntry],
    pub seed: Option<u64>,
}

/// History side effect of a made toggle, applied by the caller
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum HistoryChange {
    Unchanged,
    Append(RecipeHistoryEntry),
    RetractMostRecent { recipe_id: String },
}

/// Replaces one recipe with another of the same category
///
/// The newcomer takes the old recipe's slot in `recipe_ids`. The old recipe's
/// day assignment and made flag are dropped, the newcomer starts unassigned.
/// Candidates never include a recipe already in the plan.
pub fn swap(plan: &WeeklyPlan, input: &SwapInput<'_>) -> Result<WeeklyPlan> {
    let Some(position) = plan.recipe_ids.iter().position(|id| id == input.old_id) else {
        return Err(Error::NotInPlan(input.old_id.to_owned()));
    };

    let category = match input.category {
        Some(category) => category.to_owned(),
        None => input
            .catalog
            .iter()
            .find(|r| r.id == input.old_id)
            .map(|r| r.category.to_owned())
            .ok_or_else(|| Error::RecipeNotFound(input.old_id.to_owned()))?,
    };

    let taken = plan
        .recipe_ids
        .iter()
        .chain(input.exclude_ids.iter())
        .map(String::as_str)
        .collect::<HashSet<_>>();

    let mut pool = input
        .catalog
        .iter()
        .filter(|r| r.is_category(&category) && !taken.contains(r.id.as_str()))
        .collect::<Vec<_>>();

    let mut rng = input.seed.map(StdRng::seed_from_u64);
    order_candidates(&mut pool, &last_made(input.history), rng.as_mut());

    let Some(replacement) = pool.first() else {
        return Err(Error::NoSwapCandidate(category));
    };

    let mut swapped = plan.clone();
    swapped.recipe_ids[position] = replacement.id.to_owned();
    swapped.day_assignments.remove(input.old_id);
    swapped.made_recipe_ids.remove(input.old_id);

    tracing::debug!(old = input.old_id, new = replacement.id, "recipe swapped");

    Ok(swapped)
}

/// Sets or clears the made flag of a planned recipe
///
/// Marking appends a history entry dated `date_made` unless the recipe is
/// already flagged. Unmarking a flagged recipe retracts its most recent
/// history entry. Repeating the current state changes nothing.
pub fn mark_made(
    plan: &WeeklyPlan,
    recipe_id: &str,
    made: bool,
    date_made: OffsetDateTime,
) -> Result<(WeeklyPlan, HistoryChange)> {
    if !plan.contains(recipe_id) {
        return Err(Error::NotInPlan(recipe_id.to_owned()));
    }

    let mut updated = plan.clone();

    let change = match (made, plan.is_made(recipe_id)) {
        (true, false) => {
            updated.made_recipe_ids.insert(recipe_id.to_owned());
            HistoryChange::Append(RecipeHistoryEntry {
                recipe_id: recipe_id.to_owned(),
                date_made,
            })
        }
        (false, true) => {
            updated.made_recipe_ids.remove(recipe_id);
            HistoryChange::RetractMostRecent {
                recipe_id: recipe_id.to_owned(),
            }
        }
        _ => HistoryChange::Unchanged,
    };

    Ok((updated, change))
}

/// Places a planned recipe on `day`, excluded days included
pub fn move_to_day(plan: &WeeklyPlan, recipe_id: &str, day: u8) -> Result<WeeklyPlan> {
    let day = validate_day(day)?;

    if !plan.contains(recipe_id) {
        return Err(Error::NotInPlan(recipe_id.to_owned()));
    }

    let mut moved = plan.clone();
    moved.day_assignments.insert(recipe_id.to_owned(), day);

    Ok(moved)
}

pub fn remove_from_plan(plan: &WeeklyPlan, recipe_id: &str) -> Result<WeeklyPlan> {
    if !plan.contains(recipe_id) {
        return Err(Error::NotInPlan(recipe_id.to_owned()));
    }

    let mut updated = plan.clone();
    updated.recipe_ids.retain(|id| id != recipe_id);
    updated.retain_known();

    Ok(updated)
}
