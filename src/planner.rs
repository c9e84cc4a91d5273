use std::collections::BTreeMap;

use time::{Date, OffsetDateTime};
use tokio::sync::Mutex;
use weekmenu_mealplan::{GenerateInput, Generation, HistoryChange, SwapInput};
use weekmenu_shared::mealplan::WeeklyPlan;
use weekmenu_shared::shopping::{Bucket, ShoppingItem, ShoppingList};
use weekmenu_shared::user::{UserConfig, UserConfigUpdate};
use weekmenu_shared::{Error, Result, bail, week_start};
use weekmenu_shopping::{
    AddOutcome, Aggregation, CategorizationService, IngredientAggregationService, ScaledRecipe,
    list, pantry,
};

use crate::store::{RecipeFilter, Store};

/// One recipe requested on a shopping list
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeSelection {
    pub recipe_id: String,
    pub scale: f64,
}

impl RecipeSelection {
    pub fn new(recipe_id: impl Into<String>, scale: f64) -> Self {
        Self {
            recipe_id: recipe_id.into(),
            scale,
        }
    }
}

fn check_scale(scale: f64) -> Result<f64> {
    if !scale.is_finite() || scale <= 0.0 {
        bail!("scale must be a positive number, got {scale}");
    }

    Ok(scale)
}

/// Planning engine bound to a store
///
/// Every operation reads a fresh snapshot, runs the pure engine functions and
/// writes the result back. Writes are serialized by an internal lock so one
/// mutation is in flight at a time.
pub struct Planner<S> {
    store: S,
    seed: Option<u64>,
    default_scale: f64,
    write: Mutex<()>,
}

impl<S: Store> Planner<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            seed: None,
            default_scale: 1.0,
            write: Mutex::new(()),
        }
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_default_scale(mut self, scale: f64) -> Self {
        self.default_scale = scale;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    async fn plan(&self, week_date: Date) -> Result<WeeklyPlan> {
        let config = self.store.get_user_config().await?;
        let week_date = week_start(week_date, config.week_start_day)?;

        match self.store.get_plan(week_date).await? {
            Some(plan) => Ok(plan),
            None => bail!("no plan for the week of {week_date}"),
        }
    }

    async fn shopping_list(&self) -> Result<ShoppingList> {
        match self.store.get_shopping_list().await? {
            Some(list) => Ok(list),
            None => bail!("no shopping list has been built yet"),
        }
    }

    /// Generates (or regenerates) the plan of the week containing `week_date`
    ///
    /// `quotas` defaults to the configured default selection. With
    /// `preserve_made`, made recipes of the stored plan survive.
    pub async fn generate_plan(
        &self,
        week_date: Date,
        quotas: Option<BTreeMap<String, u32>>,
        total_meals: Option<u32>,
        preserve_made: bool,
        now: OffsetDateTime,
    ) -> Result<Generation> {
        let _guard = self.write.lock().await;

        let config = self.store.get_user_config().await?;
        let week_date = week_start(week_date, config.week_start_day)?;
        let quotas = quotas.unwrap_or_else(|| config.default_selection.clone());
        let catalog = self.store.list_recipes(&RecipeFilter::default()).await?;
        let history = self.store.list_history().await?;
        let existing = if preserve_made {
            self.store.get_plan(week_date).await?
        } else {
            None
        };

        let generation = weekmenu_mealplan::generate(&GenerateInput {
            week_date,
            quotas: &quotas,
            total_meals,
            catalog: &catalog,
            history: &history,
            config: &config,
            now,
            existing: existing.as_ref(),
            seed: self.seed,
        })?;

        self.store.save_plan(generation.plan.clone()).await?;

        Ok(generation)
    }

    pub async fn swap_recipe(
        &self,
        week_date: Date,
        old_id: &str,
        category: Option<&str>,
        exclude_ids: &[String],
    ) -> Result<WeeklyPlan> {
        let _guard = self.write.lock().await;

        let plan = self.plan(week_date).await?;
        let catalog = self.store.list_recipes(&RecipeFilter::default()).await?;
        let history = self.store.list_history().await?;

        let swapped = weekmenu_mealplan::swap(
            &plan,
            &SwapInput {
                old_id,
                category,
                exclude_ids,
                catalog: &catalog,
                history: &history,
                seed: self.seed,
            },
        )?;

        self.store.save_plan(swapped.clone()).await?;

        Ok(swapped)
    }

    /// Toggles the made flag; `date_made` defaults to `now`.
    /// The history change is stored first, the plan afterwards.
    pub async fn mark_made(
        &self,
        week_date: Date,
        recipe_id: &str,
        made: bool,
        date_made: Option<OffsetDateTime>,
        now: OffsetDateTime,
    ) -> Result<WeeklyPlan> {
        let _guard = self.write.lock().await;

        let plan = self.plan(week_date).await?;
        let (plan, change) =
            weekmenu_mealplan::mark_made(&plan, recipe_id, made, date_made.unwrap_or(now))?;

        match change {
            HistoryChange::Unchanged => {}
            HistoryChange::Append(entry) => {
                self.store
                    .append_history(&entry.recipe_id, entry.date_made)
                    .await?
            }
            HistoryChange::RetractMostRecent { recipe_id } => {
                self.store.remove_most_recent_history(&recipe_id).await?
            }
        }

        self.store.save_plan(plan.clone()).await?;

        Ok(plan)
    }

    pub async fn move_to_day(&self, week_date: Date, recipe_id: &str, day: u8) -> Result<WeeklyPlan> {
        let _guard = self.write.lock().await;

        let plan = self.plan(week_date).await?;
        let plan = weekmenu_mealplan::move_to_day(&plan, recipe_id, day)?;
        self.store.save_plan(plan.clone()).await?;

        Ok(plan)
    }

    pub async fn remove_from_plan(&self, week_date: Date, recipe_id: &str) -> Result<WeeklyPlan> {
        let _guard = self.write.lock().await;

        let plan = self.plan(week_date).await?;
        let plan = weekmenu_mealplan::remove_from_plan(&plan, recipe_id)?;
        self.store.save_plan(plan.clone()).await?;

        Ok(plan)
    }

    /// Aggregates the selected recipes into a new shopping list
    ///
    /// With `carry_over`, checks, positions and manual items of the stored
    /// list survive the rebuild.
    pub async fn build_shopping_list(
        &self,
        selection: &[RecipeSelection],
        carry_over: bool,
        now: OffsetDateTime,
    ) -> Result<ShoppingList> {
        let _guard = self.write.lock().await;
        self.aggregate(selection, self.default_scale, carry_over, now).await
    }

    /// Shopping list for every recipe of a stored plan, at the plan's scale
    pub async fn build_from_plan(
        &self,
        week_date: Date,
        carry_over: bool,
        now: OffsetDateTime,
    ) -> Result<ShoppingList> {
        let _guard = self.write.lock().await;

        let config = self.store.get_user_config().await?;
        let week_date = week_start(week_date, config.week_start_day)?;
        let Some(plan) = self.store.get_plan(week_date).await? else {
            bail!("no plan for the week of {week_date}");
        };

        let selection = plan
            .recipe_ids
            .iter()
            .map(|id| RecipeSelection::new(id.to_owned(), 1.0))
            .collect::<Vec<_>>();

        self.aggregate(&selection, plan.scale, carry_over, now).await
    }

    async fn aggregate(
        &self,
        selection: &[RecipeSelection],
        scale: f64,
        carry_over: bool,
        now: OffsetDateTime,
    ) -> Result<ShoppingList> {
        let scale = check_scale(scale)?;

        let mut recipes = vec![];
        for RecipeSelection { recipe_id, scale } in selection {
            let Some(recipe) = self.store.get_recipe(recipe_id).await? else {
                return Err(Error::RecipeNotFound(recipe_id.to_owned()));
            };
            recipes.push((recipe, check_scale(*scale)?));
        }

        let config = self.store.get_user_config().await?;
        let pantry = self.store.list_pantry_items().await?;

        let scaled = recipes
            .iter()
            .map(|(recipe, scale)| ScaledRecipe {
                recipe,
                scale: *scale,
            })
            .collect::<Vec<_>>();

        let mut list = IngredientAggregationService::aggregate(
            &scaled,
            &Aggregation {
                pantry: &pantry,
                config: &config,
                scale,
                generated_at: now,
            },
        );

        if carry_over {
            if let Some(existing) = self.store.get_shopping_list().await? {
                IngredientAggregationService::carry_over(&mut list, &existing, &config);
            }
        }

        self.store.save_shopping_list(list.clone()).await?;

        Ok(list)
    }

    /// Adds manual entries, starting an empty list when none exists
    pub async fn add_manual_items<N: AsRef<str> + Sync>(
        &self,
        names: &[N],
        now: OffsetDateTime,
    ) -> Result<Vec<AddOutcome>> {
        let _guard = self.write.lock().await;

        let config = self.store.get_user_config().await?;
        let mut shopping = self
            .store
            .get_shopping_list()
            .await?
            .unwrap_or_else(|| ShoppingList::empty(now));

        let outcomes = list::add_manual_items(&mut shopping, names, &config);
        self.store.save_shopping_list(shopping).await?;

        Ok(outcomes)
    }

    pub async fn add_manual_item(&self, name: &str, now: OffsetDateTime) -> Result<AddOutcome> {
        let mut outcomes = self.add_manual_items(&[name], now).await?;

        Ok(outcomes.pop().unwrap_or(AddOutcome::Blank))
    }

    pub async fn remove_item(&self, key: &str) -> Result<ShoppingItem> {
        let _guard = self.write.lock().await;

        let mut shopping = self.shopping_list().await?;
        let item = list::remove_item(&mut shopping, key)?;
        self.store.save_shopping_list(shopping).await?;

        Ok(item)
    }

    pub async fn remove_recipe_items(&self, recipe_id: &str) -> Result<usize> {
        let _guard = self.write.lock().await;

        let mut shopping = self.shopping_list().await?;
        let removed = list::remove_recipe_items(&mut shopping, recipe_id);
        self.store.save_shopping_list(shopping).await?;

        Ok(removed)
    }

    pub async fn move_item(&self, key: &str, to: Bucket) -> Result<()> {
        let _guard = self.write.lock().await;

        let mut shopping = self.shopping_list().await?;
        list::move_item(&mut shopping, key, to)?;
        self.store.save_shopping_list(shopping).await?;

        Ok(())
    }

    pub async fn reorder<K: AsRef<str> + Sync>(
        &self,
        bucket: Bucket,
        category_key: &str,
        keys: &[K],
    ) -> Result<()> {
        let _guard = self.write.lock().await;

        let mut shopping = self.shopping_list().await?;
        list::reorder(&mut shopping, bucket, category_key, keys)?;
        self.store.save_shopping_list(shopping).await?;

        Ok(())
    }

    pub async fn set_checked<K: AsRef<str> + Sync>(&self, keys: &[K], checked: bool) -> Result<usize> {
        let _guard = self.write.lock().await;

        let mut shopping = self.shopping_list().await?;
        let updated = list::set_checked(&mut shopping, keys, checked);
        self.store.save_shopping_list(shopping).await?;

        Ok(updated)
    }

    /// Sets or clears (`None`) the category override of an item
    ///
    /// Returns the resolved category key. The stored list is retagged.
    pub async fn set_category_override(
        &self,
        item_name: &str,
        category: Option<&str>,
    ) -> Result<Option<String>> {
        let _guard = self.write.lock().await;

        let mut config = self.store.get_user_config().await?;
        let key = match category {
            Some(category) => Some(CategorizationService::set_override(
                &mut config,
                item_name,
                category,
            )?),
            None => {
                CategorizationService::clear_override(&mut config, item_name);
                None
            }
        };

        let config = self
            .store
            .update_user_config(UserConfigUpdate {
                category_overrides: Some(config.category_overrides),
                ..Default::default()
            })
            .await?;

        self.retag(&config).await?;

        Ok(key)
    }

    pub async fn add_custom_category(&self, name: &str) -> Result<AddOutcome> {
        let _guard = self.write.lock().await;

        let mut config = self.store.get_user_config().await?;
        let outcome = CategorizationService::add_custom_category(&mut config, name);

        if outcome.is_added() {
            self.store
                .update_user_config(UserConfigUpdate {
                    custom_categories: Some(config.custom_categories),
                    ..Default::default()
                })
                .await?;
        }

        Ok(outcome)
    }

    /// Deletes a custom category, moving its overrides and list items to misc
    pub async fn delete_custom_category(&self, id: &str) -> Result<usize> {
        let _guard = self.write.lock().await;

        let mut config = self.store.get_user_config().await?;
        let reassigned = CategorizationService::delete_custom_category(&mut config, id)?;

        let config = self
            .store
            .update_user_config(UserConfigUpdate {
                custom_categories: Some(config.custom_categories),
                category_order: Some(config.category_order),
                category_overrides: Some(config.category_overrides),
                ..Default::default()
            })
            .await?;

        self.retag(&config).await?;

        Ok(reassigned)
    }

    async fn retag(&self, config: &UserConfig) -> Result<()> {
        if let Some(mut shopping) = self.store.get_shopping_list().await? {
            list::retag(&mut shopping, config);
            self.store.save_shopping_list(shopping).await?;
        }

        Ok(())
    }

    /// Adds pantry items; matching active list entries move to already-have
    pub async fn add_pantry_items<N: AsRef<str> + Sync>(&self, names: &[N]) -> Result<Vec<AddOutcome>> {
        let _guard = self.write.lock().await;

        let mut items = self.store.list_pantry_items().await?;
        let outcomes = pantry::add_pantry_items(&mut items, names);
        self.store.save_pantry_items(items).await?;

        if let Some(mut shopping) = self.store.get_shopping_list().await? {
            let mut moved = 0;
            for outcome in &outcomes {
                let AddOutcome::Added(key) = outcome else {
                    continue;
                };

                if let Some((Bucket::Items, _)) = shopping.find(key) {
                    list::move_item(&mut shopping, key, Bucket::AlreadyHave)?;
                    moved += 1;
                }
            }

            if moved > 0 {
                self.store.save_shopping_list(shopping).await?;
            }
        }

        Ok(outcomes)
    }

    pub async fn add_excluded_keywords<N: AsRef<str> + Sync>(
        &self,
        keywords: &[N],
    ) -> Result<Vec<AddOutcome>> {
        let _guard = self.write.lock().await;

        let mut config = self.store.get_user_config().await?;
        let outcomes = pantry::add_excluded_keywords(&mut config, keywords);

        if outcomes.iter().any(AddOutcome::is_added) {
            self.store
                .update_user_config(UserConfigUpdate {
                    excluded_keywords: Some(config.excluded_keywords),
                    ..Default::default()
                })
                .await?;
        }

        Ok(outcomes)
    }
}
