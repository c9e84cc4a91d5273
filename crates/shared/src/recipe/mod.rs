use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use validator::Validate;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct Ingredient {
    pub item: String,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub unit: String,
    /// Free text such as "diced"
    #[serde(default)]
    pub modifier: Option<String>,
    /// Shopping category hint set by the recipe author
    #[serde(default)]
    pub category: Option<String>,
}

impl Ingredient {
    pub fn new(item: impl Into<String>, amount: impl Into<Option<f64>>, unit: impl Into<String>) -> Self {
        Self {
            item: item.into(),
            amount: amount.into(),
            unit: unit.into(),
            modifier: None,
            category: None,
        }
    }
}

#[derive(Serialize, Deserialize, Validate, Clone, Debug, PartialEq)]
pub struct Recipe {
    pub id: String,
    #[validate(length(min = 1))]
    pub name: String,
    /// Meal category label matched against quotas, e.g. "chicken"
    pub category: String,
    #[validate(range(min = 1))]
    pub servings: u32,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub favorite: bool,
}

impl Recipe {
    pub fn new(id: impl Into<String>, name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            servings: 4,
            tags: BTreeSet::new(),
            ingredients: vec![],
            instructions: vec![],
            favorite: false,
        }
    }

    pub fn with_ingredient(mut self, ingredient: Ingredient) -> Self {
        self.ingredients.push(ingredient);
        self
    }

    pub fn is_category(&self, category: &str) -> bool {
        crate::normalize_name(&self.category) == crate::normalize_name(category)
    }
}

/// One "marked as made" event
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RecipeHistoryEntry {
    pub recipe_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub date_made: OffsetDateTime,
}
