use std::collections::{BTreeSet, HashMap, HashSet};

use strum::VariantArray;
use time::OffsetDateTime;
use weekmenu_shared::normalize_name;
use weekmenu_shared::recipe::{Ingredient, Recipe};
use weekmenu_shared::shopping::{
    Bucket, Contribution, PantryItem, Quantity, ShoppingItem, ShoppingList, Source,
};
use weekmenu_shared::user::UserConfig;

use crate::categorization::CategorizationService;
use crate::unit;

/// A recipe paired with the multiplier applied to its ingredients
#[derive(Debug, Clone, Copy)]
pub struct ScaledRecipe<'a> {
    pub recipe: &'a Recipe,
    pub scale: f64,
}

/// Everything besides the recipes that shapes a generated list
pub struct Aggregation<'a> {
    pub pantry: &'a [PantryItem],
    pub config: &'a UserConfig,
    /// List-wide multiplier applied on top of each recipe's own scale
    pub scale: f64,
    pub generated_at: OffsetDateTime,
}

/// Running merge of the quantities of one item
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tally {
    pub amount: Option<f64>,
    pub unit: String,
    pub additional_amounts: Vec<Quantity>,
}

impl Tally {
    /// Folds one quantity in; null and zero amounts add nothing
    pub fn add(&mut self, amount: Option<f64>, unit: &str) {
        let Some(amount) = amount.filter(|amount| *amount > 0.0) else {
            if self.amount.is_none() && self.unit.is_empty() {
                self.unit = unit.trim().to_owned();
            }
            return;
        };

        let Some(current) = self.amount else {
            self.amount = Some(amount);
            self.unit = unit.trim().to_owned();
            return;
        };

        if let Some(merged) = unit::merge(current, &self.unit, amount, unit) {
            self.amount = Some(merged.amount);
            self.unit = merged.unit;
            return;
        }

        for quantity in self.additional_amounts.iter_mut() {
            if let Some(merged) = unit::merge(quantity.amount, &quantity.unit, amount, unit) {
                *quantity = merged;
                return;
            }
        }

        self.additional_amounts.push(Quantity {
            amount,
            unit: unit.trim().to_owned(),
        });
    }

    pub fn from_sources(sources: &[Source]) -> Self {
        let mut tally = Tally::default();

        for contribution in sources.iter().flat_map(|s| s.contributions.iter()) {
            tally.add(contribution.amount, &contribution.unit);
        }

        tally
    }
}

struct Group {
    key: String,
    item: String,
    hint: Option<String>,
    sources: Vec<Source>,
}

impl Group {
    fn new(key: String, ingredient: &Ingredient) -> Self {
        Self {
            key,
            item: ingredient.item.trim().to_owned(),
            hint: None,
            sources: vec![],
        }
    }
}

/// Ingredient Aggregation Service
///
/// Stateless domain service that flattens the ingredients of scaled recipes,
/// merges duplicates by normalized name, and sorts the result into the active,
/// already-have and excluded buckets.
///
/// - "flour 2 cups" + "flour 1 cup" = "flour 3 cups"
/// - "milk 1 cup" + "milk 240 ml" = "milk 2 cups"
/// - "onion 1 whole" + "onion 1 cup" = "onion 1" with "1 cup" kept aside
pub struct IngredientAggregationService;

impl IngredientAggregationService {
    pub fn aggregate(recipes: &[ScaledRecipe<'_>], ctx: &Aggregation<'_>) -> ShoppingList {
        let mut groups: Vec<Group> = vec![];
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut source_recipes = BTreeSet::new();
        let mut total_servings = 0.0;

        for ScaledRecipe { recipe, scale } in recipes {
            let factor = scale * ctx.scale;
            source_recipes.insert(recipe.id.to_owned());
            total_servings += recipe.servings as f64 * factor;

            for ingredient in &recipe.ingredients {
                let key = normalize_name(&ingredient.item);
                if key.is_empty() {
                    tracing::debug!(recipe = recipe.id, "skipping ingredient without a name");
                    continue;
                }

                let position = match positions.get(&key) {
                    Some(position) => *position,
                    None => {
                        groups.push(Group::new(key.to_owned(), ingredient));
                        positions.insert(key, groups.len() - 1);
                        groups.len() - 1
                    }
                };

                let group = &mut groups[position];
                if group.hint.is_none() {
                    group.hint = ingredient.category.to_owned();
                }

                let contribution = Contribution {
                    amount: ingredient.amount.map(|amount| amount * factor),
                    unit: ingredient.unit.trim().to_owned(),
                };

                match group
                    .sources
                    .iter_mut()
                    .find(|s| s.recipe_id.as_deref() == Some(recipe.id.as_str()))
                {
                    Some(source) => source.contributions.push(contribution),
                    None => group.sources.push(Source {
                        recipe_id: Some(recipe.id.to_owned()),
                        recipe_name: recipe.name.to_owned(),
                        contributions: vec![contribution],
                    }),
                }
            }
        }

        let pantry = ctx
            .pantry
            .iter()
            .map(PantryItem::normalized)
            .collect::<HashSet<_>>();

        let mut list = ShoppingList::empty(ctx.generated_at);
        list.source_recipes = source_recipes;
        list.scale = ctx.scale;
        list.total_servings = total_servings;

        let categories = CategorizationService::for_config(ctx.config);

        for group in groups {
            let tally = Tally::from_sources(&group.sources);
            let category_key = CategorizationService::category_with_hint(
                &group.item,
                group.hint.as_deref(),
                &ctx.config.category_overrides,
                &ctx.config.custom_categories,
            );
            let category_order = CategorizationService::category_order(&category_key, &categories);

            let mut item = ShoppingItem {
                key: group.key,
                item: group.item,
                amount: tally.amount,
                unit: tally.unit,
                additional_amounts: tally.additional_amounts,
                category_key,
                category_order,
                category_hint: group.hint,
                position: None,
                sources: group.sources,
                checked: false,
                excluded_keyword: None,
            };

            if pantry.contains(&item.key) {
                list.already_have.push(item);
            } else if let Some(keyword) = Self::matched_keyword(&item.key, &ctx.config.excluded_keywords) {
                item.excluded_keyword = Some(keyword);
                list.excluded.push(item);
            } else {
                list.items.push(item);
            }
        }

        tracing::debug!(
            recipes = list.source_recipes.len(),
            items = list.items.len(),
            already_have = list.already_have.len(),
            excluded = list.excluded.len(),
            "shopping list aggregated"
        );

        list
    }

    /// Longest excluded keyword contained in `key`, ties resolved alphabetically
    pub fn matched_keyword(key: &str, keywords: &BTreeSet<String>) -> Option<String> {
        let mut best: Option<String> = None;

        for keyword in keywords.iter().map(|k| normalize_name(k)) {
            if keyword.is_empty() || !key.contains(&keyword) {
                continue;
            }

            if best.as_ref().is_none_or(|b| keyword.len() > b.len()) {
                best = Some(keyword);
            }
        }

        best
    }

    /// Carries user state from a previous list into a freshly generated one
    ///
    /// Check marks and explicit positions follow items by name, and manual
    /// entries survive the rebuild.
    pub fn carry_over(list: &mut ShoppingList, existing: &ShoppingList, config: &UserConfig) {
        for item in list.all_items_mut() {
            let Some(previous) = existing.get(&item.key) else {
                continue;
            };

            item.checked = previous.checked;
            item.position = previous.position;

            if previous.sources.iter().any(Source::is_manual)
                && !item.sources.iter().any(Source::is_manual)
            {
                item.sources.push(Source::manual());
            }
        }

        let categories = CategorizationService::for_config(config);

        for bucket in Bucket::VARIANTS {
            for previous in existing.bucket(*bucket) {
                let manual_only =
                    !previous.sources.is_empty() && previous.sources.iter().all(Source::is_manual);

                if !manual_only || list.find(&previous.key).is_some() {
                    continue;
                }

                let mut item = previous.clone();
                item.category_key = CategorizationService::category_for(
                    &item.item,
                    &config.category_overrides,
                    &config.custom_categories,
                );
                item.category_order =
                    CategorizationService::category_order(&item.category_key, &categories);
                list.bucket_mut(*bucket).push(item);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn recipe(id: &str, ingredients: Vec<Ingredient>) -> Recipe {
        let mut recipe = Recipe::new(id, format!("Recipe {id}"), "chicken");
        recipe.ingredients = ingredients;
        recipe
    }

    fn aggregate(recipes: &[Recipe], config: &UserConfig, pantry: &[PantryItem]) -> ShoppingList {
        let scaled = recipes
            .iter()
            .map(|recipe| ScaledRecipe { recipe, scale: 1.0 })
            .collect::<Vec<_>>();

        IngredientAggregationService::aggregate(
            &scaled,
            &Aggregation {
                pantry,
                config,
                scale: 1.0,
                generated_at: datetime!(2025-01-20 12:00 UTC),
            },
        )
    }

    #[test]
    fn test_tally_keeps_unmergeable_quantities() {
        let mut tally = Tally::default();
        tally.add(Some(1.0), "whole");
        tally.add(Some(1.0), "cup");
        tally.add(Some(2.0), "tbsp");
        tally.add(None, "");

        assert_eq!(tally.amount, Some(1.0));
        assert_eq!(tally.unit, "whole");
        assert_eq!(tally.additional_amounts.len(), 1);
        assert_eq!(tally.additional_amounts[0].unit, "cup");
        assert!((tally.additional_amounts[0].amount - 1.125).abs() < 1e-9);
    }

    #[test]
    fn test_case_insensitive_grouping() {
        let list = aggregate(
            &[
                recipe("1", vec![Ingredient::new("Chicken Breast", 2.0, "lbs")]),
                recipe("2", vec![Ingredient::new(" chicken breast", 1.0, "lb")]),
            ],
            &UserConfig::default(),
            &[],
        );

        assert_eq!(list.items.len(), 1);
        let item = &list.items[0];
        assert_eq!(item.item, "Chicken Breast");
        assert_eq!(item.unit, "lbs");
        assert!((item.amount.unwrap() - 3.0).abs() < 1e-9);
        assert_eq!(item.category_key, "meat");
        assert!(item.additional_amounts.is_empty());
    }

    #[test]
    fn test_scale_multiplies_amounts_and_servings() {
        let salt = Ingredient {
            item: "salt".to_owned(),
            ..Default::default()
        };
        let mut soup = recipe("1", vec![Ingredient::new("stock", 1.0, "l"), salt]);
        soup.servings = 4;

        let config = UserConfig::default();
        let list = IngredientAggregationService::aggregate(
            &[ScaledRecipe { recipe: &soup, scale: 1.5 }],
            &Aggregation {
                pantry: &[],
                config: &config,
                scale: 2.0,
                generated_at: datetime!(2025-01-20 12:00 UTC),
            },
        );

        assert_eq!(list.scale, 2.0);
        assert_eq!(list.total_servings, 12.0);
        assert_eq!(list.get("stock").unwrap().amount, Some(3.0));
        assert_eq!(list.get("salt").unwrap().amount, None);
    }

    #[test]
    fn test_same_recipe_twice_is_one_source() {
        let pasta = recipe("1", vec![Ingredient::new("pasta", 500.0, "g")]);
        let list = aggregate(&[pasta.clone(), pasta], &UserConfig::default(), &[]);

        let item = list.get("pasta").unwrap();
        assert_eq!(item.amount, Some(1000.0));
        assert_eq!(item.sources.len(), 1);
        assert_eq!(item.sources[0].contributions.len(), 2);
    }

    #[test]
    fn test_matched_keyword_prefers_longest() {
        let keywords = ["nut", "peanut", ""]
            .into_iter()
            .map(str::to_owned)
            .collect::<BTreeSet<_>>();

        assert_eq!(
            IngredientAggregationService::matched_keyword("peanut butter", &keywords),
            Some("peanut".to_owned())
        );
        assert_eq!(
            IngredientAggregationService::matched_keyword("walnuts", &keywords),
            Some("nut".to_owned())
        );
        assert_eq!(IngredientAggregationService::matched_keyword("flour", &keywords), None);
    }

    #[test]
    fn test_pantry_wins_over_keyword() {
        let mut config = UserConfig::default();
        config.excluded_keywords.insert("garlic".to_owned());

        let list = aggregate(
            &[recipe("1", vec![Ingredient::new("Garlic", 3.0, "cloves")])],
            &config,
            &[PantryItem::new("garlic")],
        );

        assert_eq!(list.already_have.len(), 1);
        assert!(list.excluded.is_empty());
    }

    #[test]
    fn test_category_hint_and_override() {
        let mut config = UserConfig::default();
        config
            .category_overrides
            .insert("tofu".to_owned(), "produce".to_owned());

        let mut paneer = Ingredient::new("paneer", 200.0, "g");
        paneer.category = Some("dairy".to_owned());

        let list = aggregate(
            &[recipe("1", vec![paneer, Ingredient::new("Tofu", 1.0, "")])],
            &config,
            &[],
        );

        assert_eq!(list.get("paneer").unwrap().category_key, "dairy");
        assert_eq!(list.get("tofu").unwrap().category_key, "produce");
    }

    #[test]
    fn test_carry_over_checked_and_manual() {
        let config = UserConfig::default();
        let recipes = [recipe("1", vec![Ingredient::new("flour", 1.0, "cup")])];

        let mut previous = aggregate(&recipes, &config, &[]);
        previous.items[0].checked = true;
        previous.items.push(ShoppingItem {
            key: "paper towels".to_owned(),
            item: "Paper towels".to_owned(),
            amount: None,
            unit: String::new(),
            additional_amounts: vec![],
            category_key: "misc".to_owned(),
            category_order: 0,
            category_hint: None,
            position: None,
            sources: vec![Source::manual()],
            checked: false,
            excluded_keyword: None,
        });

        let mut list = aggregate(&recipes, &config, &[]);
        IngredientAggregationService::carry_over(&mut list, &previous, &config);

        assert!(list.get("flour").unwrap().checked);
        let towels = list.get("paper towels").unwrap();
        assert_eq!(towels.category_key, "misc");
        assert_eq!(
            towels.category_order,
            CategorizationService::category_order("misc", &CategorizationService::for_config(&config))
        );
    }
}
