use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use tokio::sync::RwLock;
use weekmenu_mealplan::most_recent_index;
use weekmenu_shared::mealplan::WeeklyPlan;
use weekmenu_shared::recipe::{Recipe, RecipeHistoryEntry};
use weekmenu_shared::shopping::{PantryItem, ShoppingList};
use weekmenu_shared::user::{UserConfig, UserConfigUpdate};

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct RecipeFilter {
    pub category: Option<String>,
    pub favorite: Option<bool>,
}

impl RecipeFilter {
    pub fn matches(&self, recipe: &Recipe) -> bool {
        self.category.as_deref().is_none_or(|c| recipe.is_category(c))
            && self.favorite.is_none_or(|f| recipe.favorite == f)
    }
}

#[async_trait]
pub trait RecipeStore: Send + Sync {
    async fn list_recipes(&self, filter: &RecipeFilter) -> Result<Vec<Recipe>>;
    async fn get_recipe(&self, id: &str) -> Result<Option<Recipe>>;
}

#[async_trait]
pub trait ConfigStore: Send + Sync {
    async fn get_user_config(&self) -> Result<UserConfig>;
    async fn update_user_config(&self, update: UserConfigUpdate) -> Result<UserConfig>;
}

#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Newest first
    async fn list_history(&self) -> Result<Vec<RecipeHistoryEntry>>;
    async fn append_history(&self, recipe_id: &str, date_made: OffsetDateTime) -> Result<()>;
    async fn remove_most_recent_history(&self, recipe_id: &str) -> Result<()>;
}

#[async_trait]
pub trait PantryStore: Send + Sync {
    async fn list_pantry_items(&self) -> Result<Vec<PantryItem>>;
    async fn save_pantry_items(&self, items: Vec<PantryItem>) -> Result<()>;
}

#[async_trait]
pub trait PlanStore: Send + Sync {
    async fn get_plan(&self, week_date: Date) -> Result<Option<WeeklyPlan>>;
    async fn save_plan(&self, plan: WeeklyPlan) -> Result<()>;
}

#[async_trait]
pub trait ShoppingListStore: Send + Sync {
    async fn get_shopping_list(&self) -> Result<Option<ShoppingList>>;
    async fn save_shopping_list(&self, list: ShoppingList) -> Result<()>;
}

/// Every collaborator the planner talks to
pub trait Store:
    RecipeStore + ConfigStore + HistoryStore + PantryStore + PlanStore + ShoppingListStore
{
}

impl<T> Store for T where
    T: RecipeStore + ConfigStore + HistoryStore + PantryStore + PlanStore + ShoppingListStore
{
}

/// Serializable content of a `MemoryStore`
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct Snapshot {
    pub recipes: Vec<Recipe>,
    pub config: UserConfig,
    pub history: Vec<RecipeHistoryEntry>,
    pub pantry: Vec<PantryItem>,
    pub plans: Vec<WeeklyPlan>,
    pub shopping_list: Option<ShoppingList>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<Snapshot>,
}

impl MemoryStore {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            state: RwLock::new(snapshot),
        }
    }

    pub async fn snapshot(&self) -> Snapshot {
        self.state.read().await.clone()
    }
}

#[async_trait]
impl RecipeStore for MemoryStore {
    async fn list_recipes(&self, filter: &RecipeFilter) -> Result<Vec<Recipe>> {
        let state = self.state.read().await;

        Ok(state
            .recipes
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect())
    }

    async fn get_recipe(&self, id: &str) -> Result<Option<Recipe>> {
        let state = self.state.read().await;

        Ok(state.recipes.iter().find(|r| r.id == id).cloned())
    }
}

#[async_trait]
impl ConfigStore for MemoryStore {
    async fn get_user_config(&self) -> Result<UserConfig> {
        Ok(self.state.read().await.config.clone())
    }

    async fn update_user_config(&self, update: UserConfigUpdate) -> Result<UserConfig> {
        let mut state = self.state.write().await;

        let mut config = state.config.clone();
        update.apply(&mut config);
        config.check()?;
        state.config = config.clone();

        Ok(config)
    }
}

#[async_trait]
impl HistoryStore for MemoryStore {
    async fn list_history(&self) -> Result<Vec<RecipeHistoryEntry>> {
        let mut history = self.state.read().await.history.clone();
        history.sort_by(|a, b| b.date_made.cmp(&a.date_made));

        Ok(history)
    }

    async fn append_history(&self, recipe_id: &str, date_made: OffsetDateTime) -> Result<()> {
        self.state.write().await.history.push(RecipeHistoryEntry {
            recipe_id: recipe_id.to_owned(),
            date_made,
        });

        Ok(())
    }

    async fn remove_most_recent_history(&self, recipe_id: &str) -> Result<()> {
        let mut state = self.state.write().await;

        if let Some(index) = most_recent_index(&state.history, recipe_id) {
            state.history.remove(index);
        }

        Ok(())
    }
}

#[async_trait]
impl PantryStore for MemoryStore {
    async fn list_pantry_items(&self) -> Result<Vec<PantryItem>> {
        Ok(self.state.read().await.pantry.clone())
    }

    async fn save_pantry_items(&self, items: Vec<PantryItem>) -> Result<()> {
        self.state.write().await.pantry = items;

        Ok(())
    }
}

#[async_trait]
impl PlanStore for MemoryStore {
    async fn get_plan(&self, week_date: Date) -> Result<Option<WeeklyPlan>> {
        let state = self.state.read().await;

        Ok(state
            .plans
            .iter()
            .find(|p| p.week_date == week_date)
            .cloned())
    }

    async fn save_plan(&self, plan: WeeklyPlan) -> Result<()> {
        let mut state = self.state.write().await;

        match state.plans.iter_mut().find(|p| p.week_date == plan.week_date) {
            Some(existing) => *existing = plan,
            None => state.plans.push(plan),
        }

        Ok(())
    }
}

#[async_trait]
impl ShoppingListStore for MemoryStore {
    async fn get_shopping_list(&self) -> Result<Option<ShoppingList>> {
        Ok(self.state.read().await.shopping_list.clone())
    }

    async fn save_shopping_list(&self, list: ShoppingList) -> Result<()> {
        self.state.write().await.shopping_list = Some(list);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    #[tokio::test]
    async fn test_history_order_and_retraction() -> anyhow::Result<()> {
        let store = MemoryStore::default();
        store.append_history("a", datetime!(2025-01-10 19:00 UTC)).await?;
        store.append_history("a", datetime!(2025-01-17 19:00 UTC)).await?;
        store.append_history("b", datetime!(2025-01-12 19:00 UTC)).await?;

        let history = store.list_history().await?;
        assert_eq!(history[0].date_made, datetime!(2025-01-17 19:00 UTC));

        store.remove_most_recent_history("a").await?;
        let history = store.list_history().await?;
        assert_eq!(history.len(), 2);
        assert!(
            history
                .iter()
                .any(|e| e.recipe_id == "a" && e.date_made == datetime!(2025-01-10 19:00 UTC))
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_plan_upsert() -> anyhow::Result<()> {
        let store = MemoryStore::default();
        let mut plan = WeeklyPlan::new(date!(2025 - 01 - 20));
        store.save_plan(plan.clone()).await?;

        plan.recipe_ids.push("a".to_owned());
        store.save_plan(plan.clone()).await?;

        assert_eq!(store.snapshot().await.plans.len(), 1);
        assert_eq!(store.get_plan(date!(2025 - 01 - 20)).await?, Some(plan));
        assert_eq!(store.get_plan(date!(2025 - 01 - 27)).await?, None);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_config_rejects_invalid() -> anyhow::Result<()> {
        let store = MemoryStore::default();

        let result = store
            .update_user_config(UserConfigUpdate {
                week_start_day: Some(8),
                ..Default::default()
            })
            .await;

        assert!(result.is_err());
        assert_eq!(store.get_user_config().await?.week_start_day, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_recipe_filter() -> anyhow::Result<()> {
        let mut favourite = Recipe::new("b1", "Beef stew", "beef");
        favourite.favorite = true;
        let store = MemoryStore::new(Snapshot {
            recipes: vec![Recipe::new("c1", "Chicken curry", "chicken"), favourite],
            ..Default::default()
        });

        let beef = store
            .list_recipes(&RecipeFilter {
                category: Some("Beef".to_owned()),
                ..Default::default()
            })
            .await?;
        assert_eq!(beef.len(), 1);

        let favourites = store
            .list_recipes(&RecipeFilter {
                favorite: Some(true),
                ..Default::default()
            })
            .await?;
        assert_eq!(favourites[0].id, "b1");
        assert!(store.get_recipe("zz").await?.is_none());

        Ok(())
    }
}
