use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use weekmenu_shared::user::UserConfig;
use weekmenu_shared::{Error, Result, week_order};

/// Outcome of the day placement step of a generation
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Placement {
    /// `auto_assign_days` is off
    Disabled,
    Assigned { placed: usize },
    /// Every day is excluded; recipes were selected but none was placed
    NoCandidateDays { unplaced: usize },
}

/// Days usable for placement, preferred days first
///
/// Preferred days keep their list order; the remaining non-excluded days follow
/// in week order starting at `week_start_day`.
pub fn candidate_days(config: &UserConfig) -> Result<Vec<u8>> {
    config.check()?;

    let mut days: Vec<u8> = vec![];

    for day in &config.preferred_days {
        if !config.excluded_days.contains(day) && !days.contains(day) {
            days.push(*day);
        }
    }

    for day in week_order(config.week_start_day)? {
        if !config.excluded_days.contains(&day) && !days.contains(&day) {
            days.push(day);
        }
    }

    Ok(days)
}

/// Round-robin placement of `recipe_ids` over `candidates`
///
/// Days in `occupied` are only reused once every free candidate day got a
/// recipe.
pub fn assign_days<S: AsRef<str>>(
    recipe_ids: &[S],
    candidates: &[u8],
    occupied: &[u8],
) -> Result<BTreeMap<String, u8>> {
    if candidates.is_empty() {
        return Err(Error::AllDaysExcluded);
    }

    let order = candidates
        .iter()
        .filter(|day| !occupied.contains(day))
        .chain(candidates.iter().filter(|day| occupied.contains(day)))
        .copied()
        .collect::<Vec<_>>();

    Ok(recipe_ids
        .iter()
        .zip(order.iter().cycle())
        .map(|(id, day)| (id.as_ref().to_owned(), *day))
        .collect())
}
