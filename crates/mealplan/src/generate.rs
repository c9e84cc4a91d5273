use std::collections::{BTreeMap, HashMap, HashSet};

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use weekmenu_shared::mealplan::WeeklyPlan;
use weekmenu_shared::normalize_name;
use weekmenu_shared::recipe::{Recipe, RecipeHistoryEntry};
use weekmenu_shared::user::UserConfig;
use weekmenu_shared::{Error, Result};

use crate::days::{Placement, assign_days, candidate_days};
use crate::history::{exclusion_set, last_made};

pub struct GenerateInput<'a> {
    pub week_date: Date,
    /// Meal category → desired recipe count
    pub quotas: &'a BTreeMap<String, u32>,
    /// Requested meal count, checked against the quota sum
    pub total_meals: Option<u32>,
    pub catalog: &'a [Recipe],
    pub history: &'a [RecipeHistoryEntry],
    pub config: &'a UserConfig,
    pub now: OffsetDateTime,
    /// Plan being regenerated; its made recipes are kept verbatim
    pub existing: Option<&'a WeeklyPlan>,
    /// Shuffle candidate pools reproducibly instead of ordering them
    pub seed: Option<u64>,
}

/// A category quota that could only be partially filled
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Shortfall {
    pub category: String,
    pub requested: u32,
    pub selected: u32,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Generation {
    pub plan: WeeklyPlan,
    pub shortfalls: Vec<Shortfall>,
    pub placement: Placement,
}

impl Generation {
    pub fn is_complete(&self) -> bool {
        self.shortfalls.is_empty()
    }
}

/// Orders a candidate pool
///
/// Without a seed: never-made recipes first, then least recently made, then
/// name, then id. With a seed the pool is shuffled by `rng`.
pub fn order_candidates(
    pool: &mut [&Recipe],
    last_made: &HashMap<String, OffsetDateTime>,
    rng: Option<&mut StdRng>,
) {
    match rng {
        Some(rng) => {
            pool.sort_by(|a, b| a.id.cmp(&b.id));
            pool.shuffle(rng);
        }
        None => pool.sort_by(|a, b| {
            (last_made.get(&a.id), &a.name, &a.id).cmp(&(last_made.get(&b.id), &b.name, &b.id))
        }),
    }
}

/// Quota categories in the user's category order, unknown ones after
fn quota_order<'a>(quotas: &'a BTreeMap<String, u32>, config: &UserConfig) -> Vec<(&'a str, u32)> {
    let mut ordered = vec![];

    for category in &config.categories {
        let key = normalize_name(category);
        for (quota, count) in quotas {
            if normalize_name(quota) == key && !ordered.iter().any(|(q, _)| q == quota) {
                ordered.push((quota.as_str(), *count));
            }
        }
    }

    for (quota, count) in quotas {
        if !ordered.iter().any(|(q, _)| q == quota) {
            ordered.push((quota.as_str(), *count));
        }
    }

    ordered
}

/// Builds a weekly plan against category quotas
///
/// Recipes made within the history window are skipped, no recipe is picked
/// twice, and a quota that cannot be filled yields a `Shortfall` rather than
/// an error. On regeneration the made recipes of `existing` are kept with
/// their day assignments and count towards their category quota.
pub fn generate(input: &GenerateInput<'_>) -> Result<Generation> {
    input.config.check()?;

    let quota_total = input.quotas.values().sum::<u32>();
    if let Some(total_meals) = input.total_meals.filter(|total| *total > 0) {
        if quota_total == 0 {
            return Err(Error::EmptyQuota { total_meals });
        }
    }

    let candidates = if input.config.auto_assign_days {
        Some(candidate_days(input.config)?)
    } else {
        None
    };

    let excluded = exclusion_set(input.history, input.config.history_exclusion_days, input.now);
    let last_made = last_made(input.history);
    let catalog = input
        .catalog
        .iter()
        .map(|r| (r.id.as_str(), r))
        .collect::<HashMap<_, _>>();

    let mut plan = WeeklyPlan::new(input.week_date);
    if let Some(existing) = input.existing {
        plan.scale = existing.scale;

        for id in existing.recipe_ids.iter().filter(|id| existing.is_made(id)) {
            if plan.contains(id) {
                continue;
            }

            plan.recipe_ids.push(id.to_owned());
            plan.made_recipe_ids.insert(id.to_owned());
            if let Some(day) = existing.day_of(id) {
                plan.day_assignments.insert(id.to_owned(), day);
            }
        }
    }

    let preserved = plan.recipe_ids.len();
    let mut selected = plan.recipe_ids.iter().cloned().collect::<HashSet<_>>();
    let mut rng = input.seed.map(StdRng::seed_from_u64);
    let mut shortfalls = vec![];

    for (category, requested) in quota_order(input.quotas, input.config) {
        let kept = plan.recipe_ids[..preserved]
            .iter()
            .filter_map(|id| catalog.get(id.as_str()))
            .filter(|r| r.is_category(category))
            .count() as u32;
        let need = requested.saturating_sub(kept) as usize;

        let mut pool = input
            .catalog
            .iter()
            .filter(|r| r.is_category(category))
            .filter(|r| !excluded.contains(&r.id) && !selected.contains(&r.id))
            .collect::<Vec<_>>();
        order_candidates(&mut pool, &last_made, rng.as_mut());

        let picked = pool.into_iter().take(need).collect::<Vec<_>>();

        if picked.len() < need {
            let shortfall = Shortfall {
                category: category.to_owned(),
                requested,
                selected: kept + picked.len() as u32,
            };

            tracing::warn!(
                category = shortfall.category,
                requested = shortfall.requested,
                selected = shortfall.selected,
                "not enough recipes to fill category quota"
            );

            shortfalls.push(shortfall);
        }

        for recipe in picked {
            selected.insert(recipe.id.to_owned());
            plan.recipe_ids.push(recipe.id.to_owned());
        }
    }

    let placement = match candidates {
        None => Placement::Disabled,
        Some(candidates) => {
            let occupied = plan.day_assignments.values().copied().collect::<Vec<_>>();
            let fresh = &plan.recipe_ids[preserved..];

            match assign_days(fresh, &candidates, &occupied) {
                Ok(assignments) => {
                    let placed = assignments.len();
                    plan.day_assignments.extend(assignments);
                    Placement::Assigned { placed }
                }
                Err(Error::AllDaysExcluded) => {
                    tracing::warn!(
                        unplaced = fresh.len(),
                        "every day is excluded, skipping day assignment"
                    );
                    Placement::NoCandidateDays {
                        unplaced: fresh.len(),
                    }
                }
                Err(err) => return Err(err),
            }
        }
    };

    tracing::debug!(
        week = %plan.week_date,
        recipes = plan.recipe_ids.len(),
        preserved,
        shortfalls = shortfalls.len(),
        "meal plan generated"
    );

    Ok(Generation {
        plan,
        shortfalls,
        placement,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    fn catalog() -> Vec<Recipe> {
        vec![
            Recipe::new("c1", "Chicken curry", "chicken"),
            Recipe::new("c2", "Butter chicken", "Chicken"),
            Recipe::new("c3", "Roast chicken", "chicken"),
            Recipe::new("b1", "Beef stew", "beef"),
        ]
    }

    fn input<'a>(
        quotas: &'a BTreeMap<String, u32>,
        catalog: &'a [Recipe],
        history: &'a [RecipeHistoryEntry],
        config: &'a UserConfig,
    ) -> GenerateInput<'a> {
        GenerateInput {
            week_date: date!(2025 - 01 - 20),
            quotas,
            total_meals: None,
            catalog,
            history,
            config,
            now: datetime!(2025-01-20 09:00 UTC),
            existing: None,
            seed: None,
        }
    }

    fn quotas(entries: &[(&str, u32)]) -> BTreeMap<String, u32> {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_deterministic_order() {
        let quotas = quotas(&[("chicken", 2)]);
        let catalog = catalog();
        let history = vec![RecipeHistoryEntry {
            recipe_id: "c2".to_owned(),
            date_made: datetime!(2024-11-01 18:00 UTC),
        }];
        let config = UserConfig::default();

        let generation = generate(&input(&quotas, &catalog, &history, &config)).unwrap();

        // never made first, by name
        assert_eq!(generation.plan.recipe_ids, vec!["c1", "c3"]);
        assert_eq!(generation.placement, Placement::Disabled);
    }

    #[test]
    fn test_seeded_shuffle_is_reproducible() {
        let quotas = quotas(&[("chicken", 2), ("beef", 1)]);
        let catalog = catalog();
        let config = UserConfig::default();

        let mut seeded = input(&quotas, &catalog, &[], &config);
        seeded.seed = Some(42);

        let first = generate(&seeded).unwrap();
        let second = generate(&seeded).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.plan.recipe_ids.len(), 3);
    }

    #[test]
    fn test_empty_quota_with_total_meals() {
        let quotas = quotas(&[("chicken", 0)]);
        let catalog = catalog();
        let config = UserConfig::default();

        let mut request = input(&quotas, &catalog, &[], &config);
        request.total_meals = Some(5);

        assert!(matches!(
            generate(&request),
            Err(Error::EmptyQuota { total_meals: 5 })
        ));

        request.total_meals = Some(0);
        assert!(generate(&request).unwrap().plan.is_empty());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let quotas = quotas(&[("chicken", 1)]);
        let catalog = catalog();
        let mut config = UserConfig::default();
        config.preferred_days = vec![9];

        assert!(matches!(
            generate(&input(&quotas, &catalog, &[], &config)),
            Err(Error::InvalidDay(9))
        ));
    }

    #[test]
    fn test_quota_follows_category_order() {
        let quotas = quotas(&[("beef", 1), ("Chicken", 1)]);
        let catalog = catalog();
        let config = UserConfig::default();

        let generation = generate(&input(&quotas, &catalog, &[], &config)).unwrap();

        assert_eq!(generation.plan.recipe_ids, vec!["c2", "b1"]);
    }
}
