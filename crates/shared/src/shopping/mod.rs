use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, VariantArray};
use time::OffsetDateTime;

pub const MANUAL_SOURCE: &str = "Manual";

#[derive(
    Serialize,
    Deserialize,
    EnumString,
    VariantArray,
    Display,
    AsRefStr,
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    #[default]
    Items,
    AlreadyHave,
    Excluded,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Quantity {
    pub amount: f64,
    pub unit: String,
}

/// Scaled quantity one recipe line contributed to an item
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Contribution {
    pub amount: Option<f64>,
    pub unit: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Source {
    /// `None` for manually added items
    pub recipe_id: Option<String>,
    pub recipe_name: String,
    #[serde(default)]
    pub contributions: Vec<Contribution>,
}

impl Source {
    pub fn manual() -> Self {
        Self {
            recipe_id: None,
            recipe_name: MANUAL_SOURCE.to_owned(),
            contributions: vec![],
        }
    }

    pub fn is_manual(&self) -> bool {
        self.recipe_id.is_none() && self.recipe_name == MANUAL_SOURCE
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ShoppingItem {
    /// Normalized item name, unique across the three buckets
    pub key: String,
    pub item: String,
    pub amount: Option<f64>,
    #[serde(default)]
    pub unit: String,
    /// Quantities that could not be merged into `amount`/`unit`
    #[serde(default)]
    pub additional_amounts: Vec<Quantity>,
    pub category_key: String,
    pub category_order: usize,
    /// Category hint carried over from the recipe ingredient
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_hint: Option<String>,
    /// Explicit position within the category, set by reordering
    #[serde(default)]
    pub position: Option<u32>,
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(default)]
    pub checked: bool,
    /// Keyword that moved the item to the excluded bucket
    #[serde(default)]
    pub excluded_keyword: Option<String>,
}

impl ShoppingItem {
    pub fn has_quantity(&self) -> bool {
        self.amount.is_some_and(|amount| amount > 0.0)
    }

    pub fn is_from(&self, recipe_id: &str) -> bool {
        self.sources
            .iter()
            .any(|s| s.recipe_id.as_deref() == Some(recipe_id))
    }

    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.recipe_name.as_str()).collect()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ShoppingList {
    pub items: Vec<ShoppingItem>,
    #[serde(default)]
    pub already_have: Vec<ShoppingItem>,
    #[serde(default)]
    pub excluded: Vec<ShoppingItem>,
    #[serde(default)]
    pub source_recipes: BTreeSet<String>,
    pub scale: f64,
    pub total_servings: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub generated_at: OffsetDateTime,
}

impl ShoppingList {
    pub fn empty(generated_at: OffsetDateTime) -> Self {
        Self {
            items: vec![],
            already_have: vec![],
            excluded: vec![],
            source_recipes: BTreeSet::new(),
            scale: 1.0,
            total_servings: 0.0,
            generated_at,
        }
    }

    pub fn bucket(&self, bucket: Bucket) -> &Vec<ShoppingItem> {
        match bucket {
            Bucket::Items => &self.items,
            Bucket::AlreadyHave => &self.already_have,
            Bucket::Excluded => &self.excluded,
        }
    }

    pub fn bucket_mut(&mut self, bucket: Bucket) -> &mut Vec<ShoppingItem> {
        match bucket {
            Bucket::Items => &mut self.items,
            Bucket::AlreadyHave => &mut self.already_have,
            Bucket::Excluded => &mut self.excluded,
        }
    }

    /// Locates an item by normalized name across all buckets
    pub fn find(&self, key: &str) -> Option<(Bucket, usize)> {
        let key = crate::normalize_name(key);

        Bucket::VARIANTS.iter().find_map(|bucket| {
            self.bucket(*bucket)
                .iter()
                .position(|i| i.key == key)
                .map(|index| (*bucket, index))
        })
    }

    pub fn get(&self, key: &str) -> Option<&ShoppingItem> {
        self.find(key)
            .map(|(bucket, index)| &self.bucket(bucket)[index])
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut ShoppingItem> {
        let (bucket, index) = self.find(key)?;
        self.bucket_mut(bucket).get_mut(index)
    }

    pub fn all_items(&self) -> impl Iterator<Item = &ShoppingItem> {
        self.items
            .iter()
            .chain(self.already_have.iter())
            .chain(self.excluded.iter())
    }

    pub fn all_items_mut(&mut self) -> impl Iterator<Item = &mut ShoppingItem> {
        self.items
            .iter_mut()
            .chain(self.already_have.iter_mut())
            .chain(self.excluded.iter_mut())
    }

    /// Items of a bucket ordered by category, then explicit position, then insertion
    pub fn sorted_items(&self, bucket: Bucket) -> Vec<&ShoppingItem> {
        let mut items = self.bucket(bucket).iter().enumerate().collect::<Vec<_>>();
        items.sort_by_key(|(index, item)| {
            (
                item.category_order,
                item.position.unwrap_or(u32::MAX),
                *index,
            )
        });

        items.into_iter().map(|(_, item)| item).collect()
    }
}

/// Something the user already has at home
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PantryItem {
    pub item: String,
}

impl PantryItem {
    pub fn new(item: impl Into<String>) -> Self {
        Self { item: item.into() }
    }

    pub fn normalized(&self) -> String {
        crate::normalize_name(&self.item)
    }
}
