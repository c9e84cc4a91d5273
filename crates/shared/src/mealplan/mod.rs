use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use time::Date;

time::serde::format_description!(week_date_format, Date, "[year]-[month]-[day]");

fn default_scale() -> f64 {
    1.0
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct WeeklyPlan {
    #[serde(with = "week_date_format")]
    pub week_date: Date,
    /// Selection order, no recipe appears twice
    pub recipe_ids: Vec<String>,
    #[serde(default)]
    pub made_recipe_ids: BTreeSet<String>,
    /// recipe id → day index (0 = Sunday … 6 = Saturday)
    #[serde(default)]
    pub day_assignments: BTreeMap<String, u8>,
    #[serde(default = "default_scale")]
    pub scale: f64,
}

impl WeeklyPlan {
    pub fn new(week_date: Date) -> Self {
        Self {
            week_date,
            recipe_ids: vec![],
            made_recipe_ids: BTreeSet::new(),
            day_assignments: BTreeMap::new(),
            scale: default_scale(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.recipe_ids.is_empty()
    }

    pub fn contains(&self, recipe_id: &str) -> bool {
        self.recipe_ids.iter().any(|id| id == recipe_id)
    }

    pub fn is_made(&self, recipe_id: &str) -> bool {
        self.made_recipe_ids.contains(recipe_id)
    }

    pub fn day_of(&self, recipe_id: &str) -> Option<u8> {
        self.day_assignments.get(recipe_id).copied()
    }

    /// Recipe ids placed on `day`, in plan order
    pub fn recipes_on(&self, day: u8) -> Vec<&str> {
        self.recipe_ids
            .iter()
            .filter(|id| self.day_of(id) == Some(day))
            .map(|id| id.as_str())
            .collect()
    }

    /// Drops made flags and day assignments whose recipe left the plan
    pub fn retain_known(&mut self) {
        let ids = self.recipe_ids.iter().cloned().collect::<BTreeSet<_>>();
        self.made_recipe_ids.retain(|id| ids.contains(id));
        self.day_assignments.retain(|id, _| ids.contains(id));
    }
}
