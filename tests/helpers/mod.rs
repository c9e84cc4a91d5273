//! Fixture data shared by the planner integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use time::macros::datetime;
use time::{Date, OffsetDateTime};
use weekmenu::store::{
    ConfigStore, HistoryStore, PantryStore, PlanStore, RecipeStore, ShoppingListStore,
};
use weekmenu::{MemoryStore, Planner, RecipeFilter, Snapshot};
use weekmenu_shared::mealplan::WeeklyPlan;
use weekmenu_shared::recipe::{Ingredient, Recipe, RecipeHistoryEntry};
use weekmenu_shared::shopping::{PantryItem, ShoppingList};
use weekmenu_shared::user::{UserConfig, UserConfigUpdate};

pub const NOW: OffsetDateTime = datetime!(2025-01-20 08:00 UTC);

pub fn recipe(id: &str, name: &str, category: &str, ingredients: &[(&str, f64, &str)]) -> Recipe {
    ingredients
        .iter()
        .fold(Recipe::new(id, name, category), |recipe, (item, amount, unit)| {
            recipe.with_ingredient(Ingredient::new(*item, *amount, *unit))
        })
}

pub fn catalog() -> Vec<Recipe> {
    vec![
        recipe(
            "c1",
            "Chicken curry",
            "chicken",
            &[("chicken thighs", 500.0, "g"), ("onion", 1.0, "whole"), ("garlic", 3.0, "cloves")],
        ),
        recipe(
            "c2",
            "Roast chicken",
            "chicken",
            &[("whole chicken", 1.0, ""), ("onion", 2.0, "whole"), ("butter", 2.0, "tbsp")],
        ),
        recipe(
            "c3",
            "Chicken satay",
            "chicken",
            &[("chicken breast", 1.0, "lb"), ("peanut butter", 3.0, "tbsp")],
        ),
        recipe(
            "b1",
            "Beef stew",
            "beef",
            &[("beef chuck", 1.0, "kg"), ("onion", 0.5, "cup"), ("butter", 30.0, "g")],
        ),
        recipe(
            "v1",
            "Pancakes",
            "vegetarian",
            &[("flour", 2.0, "cups"), ("milk", 1.0, "cup"), ("eggs", 2.0, "")],
        ),
    ]
}

pub fn planner(snapshot: Snapshot) -> Planner<MemoryStore> {
    Planner::new(MemoryStore::new(snapshot))
}

pub fn planner_with_catalog() -> Planner<MemoryStore> {
    planner(Snapshot {
        recipes: catalog(),
        ..Default::default()
    })
}

/// `MemoryStore` whose history writes always fail
pub struct HistoryOutage(pub MemoryStore);

#[async_trait]
impl RecipeStore for HistoryOutage {
    async fn list_recipes(&self, filter: &RecipeFilter) -> anyhow::Result<Vec<Recipe>> {
        self.0.list_recipes(filter).await
    }

    async fn get_recipe(&self, id: &str) -> anyhow::Result<Option<Recipe>> {
        self.0.get_recipe(id).await
    }
}

#[async_trait]
impl ConfigStore for HistoryOutage {
    async fn get_user_config(&self) -> anyhow::Result<UserConfig> {
        self.0.get_user_config().await
    }

    async fn update_user_config(&self, update: UserConfigUpdate) -> anyhow::Result<UserConfig> {
        self.0.update_user_config(update).await
    }
}

#[async_trait]
impl HistoryStore for HistoryOutage {
    async fn list_history(&self) -> anyhow::Result<Vec<RecipeHistoryEntry>> {
        self.0.list_history().await
    }

    async fn append_history(&self, _recipe_id: &str, _date_made: OffsetDateTime) -> anyhow::Result<()> {
        anyhow::bail!("history store unavailable")
    }

    async fn remove_most_recent_history(&self, _recipe_id: &str) -> anyhow::Result<()> {
        anyhow::bail!("history store unavailable")
    }
}

#[async_trait]
impl PantryStore for HistoryOutage {
    async fn list_pantry_items(&self) -> anyhow::Result<Vec<PantryItem>> {
        self.0.list_pantry_items().await
    }

    async fn save_pantry_items(&self, items: Vec<PantryItem>) -> anyhow::Result<()> {
        self.0.save_pantry_items(items).await
    }
}

#[async_trait]
impl PlanStore for HistoryOutage {
    async fn get_plan(&self, week_date: Date) -> anyhow::Result<Option<WeeklyPlan>> {
        self.0.get_plan(week_date).await
    }

    async fn save_plan(&self, plan: WeeklyPlan) -> anyhow::Result<()> {
        self.0.save_plan(plan).await
    }
}

#[async_trait]
impl ShoppingListStore for HistoryOutage {
    async fn get_shopping_list(&self) -> anyhow::Result<Option<ShoppingList>> {
        self.0.get_shopping_list().await
    }

    async fn save_shopping_list(&self, list: ShoppingList) -> anyhow::Result<()> {
        self.0.save_shopping_list(list).await
    }
}
