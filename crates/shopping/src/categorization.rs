use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::VariantArray;
use ulid::Ulid;
use weekmenu_shared::normalize_name;
use weekmenu_shared::user::{CustomCategory, UserConfig};

use crate::AddOutcome;

pub const MISC: &str = "misc";

/// Built-in grocery store categories, in declaration order
#[derive(VariantArray, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinCategory {
    Produce,
    Meat,
    Seafood,
    Dairy,
    Bakery,
    Frozen,
    Pantry,
    Spices,
    Beverages,
    Misc,
}

impl BuiltinCategory {
    pub fn key(&self) -> &'static str {
        match self {
            BuiltinCategory::Produce => "produce",
            BuiltinCategory::Meat => "meat",
            BuiltinCategory::Seafood => "seafood",
            BuiltinCategory::Dairy => "dairy",
            BuiltinCategory::Bakery => "bakery",
            BuiltinCategory::Frozen => "frozen",
            BuiltinCategory::Pantry => "pantry",
            BuiltinCategory::Spices => "spices",
            BuiltinCategory::Beverages => "beverages",
            BuiltinCategory::Misc => MISC,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BuiltinCategory::Produce => "Produce",
            BuiltinCategory::Meat => "Meat",
            BuiltinCategory::Seafood => "Seafood",
            BuiltinCategory::Dairy => "Dairy & Eggs",
            BuiltinCategory::Bakery => "Bakery",
            BuiltinCategory::Frozen => "Frozen",
            BuiltinCategory::Pantry => "Pantry",
            BuiltinCategory::Spices => "Spices",
            BuiltinCategory::Beverages => "Beverages",
            BuiltinCategory::Misc => "Misc",
        }
    }

    /// Misc always sorts last unless an explicit order says otherwise
    pub fn default_order(&self) -> i32 {
        match self {
            BuiltinCategory::Misc => 1000,
            other => BuiltinCategory::VARIANTS
                .iter()
                .position(|c| c == other)
                .map(|index| index as i32 * 10)
                .unwrap_or_default(),
        }
    }

    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            BuiltinCategory::Produce => &[
                "tomato", "lettuce", "onion", "garlic", "carrot", "celery", "bell pepper",
                "jalapeno", "cucumber", "zucchini", "broccoli", "cauliflower", "spinach", "kale",
                "cabbage", "potato", "mushroom", "avocado", "eggplant", "squash", "ginger",
                "cilantro", "parsley", "basil", "mint", "thyme", "rosemary", "scallion",
                "shallot", "leek", "green bean", "peas", "corn", "apple", "banana", "orange",
                "lemon", "lime", "berry", "berries", "grape", "mango", "pineapple", "watermelon",
            ],
            BuiltinCategory::Meat => &[
                "chicken", "beef", "pork", "lamb", "turkey", "bacon", "sausage", "ham", "steak",
                "mince", "veal", "duck", "ground beef",
            ],
            BuiltinCategory::Seafood => &[
                "fish", "salmon", "tuna", "cod", "tilapia", "shrimp", "prawn", "crab", "lobster",
                "scallop", "mussel", "clam",
            ],
            BuiltinCategory::Dairy => &[
                "milk", "cheese", "butter", "cream", "yogurt", "egg", "cheddar", "mozzarella",
                "parmesan", "feta", "ricotta",
            ],
            BuiltinCategory::Bakery => &[
                "bread", "bun", "baguette", "tortilla", "pita", "bagel", "croissant", "naan",
            ],
            BuiltinCategory::Frozen => &["frozen", "ice cream"],
            BuiltinCategory::Pantry => &[
                "flour", "sugar", "rice", "pasta", "noodle", "oil", "vinegar", "salt",
                "soy sauce", "broth", "stock", "chicken broth", "beef broth", "chicken stock",
                "beef stock", "bean", "lentil", "chickpea", "oats", "honey", "baking powder",
                "baking soda", "yeast", "peanut", "peanut butter", "canned", "tomato paste",
                "tomato sauce", "coconut milk",
            ],
            BuiltinCategory::Spices => &[
                "pepper", "cumin", "paprika", "cinnamon", "oregano", "chili powder",
                "garlic powder", "onion powder", "nutmeg", "turmeric", "bay leaf",
                "curry powder", "vanilla",
            ],
            BuiltinCategory::Beverages => &["juice", "coffee", "tea", "wine", "beer", "water"],
            BuiltinCategory::Misc => &[],
        }
    }
}

/// A shopping category as shown to the user
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Category {
    pub key: String,
    pub name: String,
    pub order: i32,
    pub custom: bool,
}

/// Categorization Service
///
/// Stateless domain service that maps ingredients to shopping categories.
/// Lookup order: user override, built-in keyword table (longest keyword wins,
/// then declaration order), then "misc".
pub struct CategorizationService;

impl CategorizationService {
    pub fn category_for(
        item_name: &str,
        overrides: &BTreeMap<String, String>,
        custom_categories: &[CustomCategory],
    ) -> String {
        Self::category_with_hint(item_name, None, overrides, custom_categories)
    }

    /// Like `category_for`, honouring a recipe-provided hint right after overrides
    pub fn category_with_hint(
        item_name: &str,
        hint: Option<&str>,
        overrides: &BTreeMap<String, String>,
        custom_categories: &[CustomCategory],
    ) -> String {
        let normalized = normalize_name(item_name);

        if let Some(key) = overrides
            .get(&normalized)
            .filter(|key| Self::is_known(key, custom_categories))
        {
            return key.to_owned();
        }

        if let Some(key) = hint.and_then(|hint| Self::resolve(hint, custom_categories)) {
            return key;
        }

        Self::keyword_category(&normalized)
            .unwrap_or(BuiltinCategory::Misc)
            .key()
            .to_owned()
    }

    /// Built-in category whose longest keyword appears in `normalized`
    pub fn keyword_category(normalized: &str) -> Option<BuiltinCategory> {
        let mut best: Option<(usize, BuiltinCategory)> = None;

        for category in BuiltinCategory::VARIANTS {
            for keyword in category.keywords() {
                if !normalized.contains(keyword) {
                    continue;
                }

                // strictly longer only, so earlier categories win ties
                if best.is_none_or(|(len, _)| keyword.len() > len) {
                    best = Some((keyword.len(), *category));
                }
            }
        }

        best.map(|(_, category)| category)
    }

    pub fn is_known(key: &str, custom_categories: &[CustomCategory]) -> bool {
        BuiltinCategory::VARIANTS.iter().any(|c| c.key() == key)
            || custom_categories.iter().any(|c| c.id == key)
    }

    /// Resolves a key or display name to a category key
    pub fn resolve(value: &str, custom_categories: &[CustomCategory]) -> Option<String> {
        let normalized = normalize_name(value);

        if let Some(category) = BuiltinCategory::VARIANTS
            .iter()
            .find(|c| c.key() == normalized || normalize_name(c.name()) == normalized)
        {
            return Some(category.key().to_owned());
        }

        custom_categories
            .iter()
            .find(|c| c.id == value.trim() || normalize_name(&c.name) == normalized)
            .map(|c| c.id.to_owned())
    }

    /// Built-in and custom categories in display order
    ///
    /// With an explicit `order`, listed keys come first in that order and the
    /// rest follow in their default order. Otherwise categories are sorted by
    /// their `order` number.
    pub fn all_categories(
        custom_categories: &[CustomCategory],
        order: Option<&[String]>,
    ) -> Vec<Category> {
        let mut categories = BuiltinCategory::VARIANTS
            .iter()
            .map(|c| Category {
                key: c.key().to_owned(),
                name: c.name().to_owned(),
                order: c.default_order(),
                custom: false,
            })
            .chain(custom_categories.iter().map(|c| Category {
                key: c.id.to_owned(),
                name: c.name.to_owned(),
                order: c.order,
                custom: true,
            }))
            .collect::<Vec<_>>();

        categories.sort_by_key(|c| c.order);

        let Some(order) = order else {
            return categories;
        };

        let mut ordered = vec![];
        for key in order {
            if let Some(index) = categories.iter().position(|c| &c.key == key) {
                ordered.push(categories.remove(index));
            }
        }
        ordered.extend(categories);

        ordered
    }

    /// Position of `key` in `categories`, unknown keys sort with misc
    pub fn category_order(key: &str, categories: &[Category]) -> usize {
        categories
            .iter()
            .position(|c| c.key == key)
            .or_else(|| categories.iter().position(|c| c.key == MISC))
            .unwrap_or(categories.len())
    }

    /// Categories for a user's configuration
    pub fn for_config(config: &UserConfig) -> Vec<Category> {
        Self::all_categories(&config.custom_categories, config.category_order.as_deref())
    }

    pub fn add_custom_category(config: &mut UserConfig, name: &str) -> AddOutcome {
        let name = name.trim();
        if name.is_empty() {
            return AddOutcome::Blank;
        }

        if Self::resolve(name, &config.custom_categories).is_some() {
            return AddOutcome::DuplicateSkipped(name.to_owned());
        }

        let order = config
            .custom_categories
            .iter()
            .map(|c| c.order + 10)
            .max()
            .unwrap_or(100);

        let id = Ulid::new().to_string();
        config.custom_categories.push(CustomCategory {
            id: id.to_owned(),
            name: name.to_owned(),
            order,
        });

        AddOutcome::Added(id)
    }

    /// Deletes a custom category, first moving overrides that point at it to misc
    ///
    /// Returns the number of overrides that were reassigned.
    pub fn delete_custom_category(config: &mut UserConfig, id: &str) -> weekmenu_shared::Result<usize> {
        if !config.custom_categories.iter().any(|c| c.id == id) {
            return Err(weekmenu_shared::Error::UnknownCategory(id.to_owned()));
        }

        let mut reassigned = 0;
        for key in config.category_overrides.values_mut() {
            if key == id {
                *key = MISC.to_owned();
                reassigned += 1;
            }
        }

        if let Some(order) = config.category_order.as_mut() {
            order.retain(|key| key != id);
        }

        config.custom_categories.retain(|c| c.id != id);

        tracing::debug!(category = id, reassigned, "custom category deleted");

        Ok(reassigned)
    }

    pub fn set_override(
        config: &mut UserConfig,
        item_name: &str,
        category: &str,
    ) -> weekmenu_shared::Result<String> {
        let Some(key) = Self::resolve(category, &config.custom_categories) else {
            return Err(weekmenu_shared::Error::UnknownCategory(category.to_owned()));
        };

        config
            .category_overrides
            .insert(normalize_name(item_name), key.to_owned());

        Ok(key)
    }

    pub fn clear_override(config: &mut UserConfig, item_name: &str) -> bool {
        config
            .category_overrides
            .remove(&normalize_name(item_name))
            .is_some()
    }
}
