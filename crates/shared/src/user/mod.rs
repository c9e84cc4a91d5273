use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use validator::Validate;

/// A user-defined shopping category
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CustomCategory {
    /// Stable generated id, also used as the category key
    pub id: String,
    pub name: String,
    pub order: i32,
}

#[derive(Serialize, Deserialize, Validate, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct UserConfig {
    /// Meal categories in display order, e.g. chicken, beef, vegetarian
    pub categories: Vec<String>,
    /// Desired recipe count per meal category
    pub default_selection: BTreeMap<String, u32>,
    /// Case-insensitive substrings matched against ingredient names
    pub excluded_keywords: BTreeSet<String>,
    #[validate(range(max = 365))]
    pub history_exclusion_days: u32,
    #[validate(range(max = 6))]
    pub week_start_day: u8,
    pub excluded_days: BTreeSet<u8>,
    pub preferred_days: Vec<u8>,
    pub auto_assign_days: bool,
    pub custom_categories: Vec<CustomCategory>,
    pub category_order: Option<Vec<String>>,
    /// Normalized ingredient name → shopping category key
    pub category_overrides: BTreeMap<String, String>,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            categories: ["chicken", "beef", "lamb", "turkey", "vegetarian"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
            default_selection: BTreeMap::new(),
            excluded_keywords: BTreeSet::new(),
            history_exclusion_days: 14,
            week_start_day: 1,
            excluded_days: BTreeSet::new(),
            preferred_days: vec![],
            auto_assign_days: false,
            custom_categories: vec![],
            category_order: None,
            category_overrides: BTreeMap::new(),
        }
    }
}

impl UserConfig {
    /// Field validation plus day-index checks on the day sets
    pub fn check(&self) -> crate::Result<()> {
        self.validate()?;

        for day in self.excluded_days.iter().chain(self.preferred_days.iter()) {
            crate::validate_day(*day)?;
        }

        Ok(())
    }
}

/// Partial update applied by `ConfigStore::update_user_config`
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct UserConfigUpdate {
    pub categories: Option<Vec<String>>,
    pub default_selection: Option<BTreeMap<String, u32>>,
    pub excluded_keywords: Option<BTreeSet<String>>,
    pub history_exclusion_days: Option<u32>,
    pub week_start_day: Option<u8>,
    pub excluded_days: Option<BTreeSet<u8>>,
    pub preferred_days: Option<Vec<u8>>,
    pub auto_assign_days: Option<bool>,
    pub custom_categories: Option<Vec<CustomCategory>>,
    pub category_order: Option<Option<Vec<String>>>,
    pub category_overrides: Option<BTreeMap<String, String>>,
}

impl UserConfigUpdate {
    pub fn apply(self, config: &mut UserConfig) {
        if let Some(value) = self.categories {
            config.categories = value;
        }
        if let Some(value) = self.default_selection {
            config.default_selection = value;
        }
        if let Some(value) = self.excluded_keywords {
            config.excluded_keywords = value;
        }
        if let Some(value) = self.history_exclusion_days {
            config.history_exclusion_days = value;
        }
        if let Some(value) = self.week_start_day {
            config.week_start_day = value;
        }
        if let Some(value) = self.excluded_days {
            config.excluded_days = value;
        }
        if let Some(value) = self.preferred_days {
            config.preferred_days = value;
        }
        if let Some(value) = self.auto_assign_days {
            config.auto_assign_days = value;
        }
        if let Some(value) = self.custom_categories {
            config.custom_categories = value;
        }
        if let Some(value) = self.category_order {
            config.category_order = value;
        }
        if let Some(value) = self.category_overrides {
            config.category_overrides = value;
        }
    }
}
