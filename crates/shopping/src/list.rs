use std::collections::HashMap;

use weekmenu_shared::normalize_name;
use weekmenu_shared::shopping::{Bucket, ShoppingItem, ShoppingList, Source};
use weekmenu_shared::user::UserConfig;
use weekmenu_shared::{Error, Result};

use crate::AddOutcome;
use crate::aggregation::Tally;
use crate::categorization::CategorizationService;

/// Adds a manual entry to the active bucket
///
/// The name is compared case-insensitively against every bucket, so an item
/// already on the list (even as already-have or excluded) is skipped.
pub fn add_manual_item(list: &mut ShoppingList, name: &str, config: &UserConfig) -> AddOutcome {
    let name = name.trim();
    if name.is_empty() {
        return AddOutcome::Blank;
    }

    if list.find(name).is_some() {
        return AddOutcome::DuplicateSkipped(name.to_owned());
    }

    let category_key = CategorizationService::category_for(
        name,
        &config.category_overrides,
        &config.custom_categories,
    );
    let category_order = CategorizationService::category_order(
        &category_key,
        &CategorizationService::for_config(config),
    );

    let key = normalize_name(name);
    list.items.push(ShoppingItem {
        key: key.to_owned(),
        item: name.to_owned(),
        amount: None,
        unit: String::new(),
        additional_amounts: vec![],
        category_key,
        category_order,
        category_hint: None,
        position: None,
        sources: vec![Source::manual()],
        checked: false,
        excluded_keyword: None,
    });

    AddOutcome::Added(key)
}

pub fn add_manual_items<S: AsRef<str>>(
    list: &mut ShoppingList,
    names: &[S],
    config: &UserConfig,
) -> Vec<AddOutcome> {
    names
        .iter()
        .map(|name| add_manual_item(list, name.as_ref(), config))
        .collect()
}

pub fn remove_item(list: &mut ShoppingList, key: &str) -> Result<ShoppingItem> {
    let Some((bucket, index)) = list.find(key) else {
        return Err(Error::ItemNotFound(key.to_owned()));
    };

    Ok(list.bucket_mut(bucket).remove(index))
}

/// Drops one recipe's contributions from every bucket
///
/// Items fed only by that recipe disappear; items with other sources keep
/// their bucket and get their quantities folded again from what remains.
/// Returns the number of items removed outright.
pub fn remove_recipe_items(list: &mut ShoppingList, recipe_id: &str) -> usize {
    let mut removed = 0;

    for bucket in [Bucket::Items, Bucket::AlreadyHave, Bucket::Excluded] {
        let items = list.bucket_mut(bucket);
        let before = items.len();

        items.retain_mut(|item| {
            if !item.is_from(recipe_id) {
                return true;
            }

            item.sources
                .retain(|s| s.recipe_id.as_deref() != Some(recipe_id));

            if item.sources.is_empty() {
                return false;
            }

            let tally = Tally::from_sources(&item.sources);
            item.amount = tally.amount;
            item.unit = tally.unit;
            item.additional_amounts = tally.additional_amounts;

            true
        });

        removed += before - items.len();
    }

    list.source_recipes.remove(recipe_id);

    tracing::debug!(recipe = recipe_id, removed, "recipe items removed from shopping list");

    removed
}

/// Moves an item to another bucket as-is, without merging
pub fn move_item(list: &mut ShoppingList, key: &str, to: Bucket) -> Result<()> {
    let Some((from, index)) = list.find(key) else {
        return Err(Error::ItemNotFound(key.to_owned()));
    };

    if from == to {
        return Ok(());
    }

    let mut item = list.bucket_mut(from).remove(index);
    if to != Bucket::Excluded {
        item.excluded_keyword = None;
    }
    item.position = None;
    list.bucket_mut(to).push(item);

    Ok(())
}

/// Persists an explicit order for the items of one category in a bucket
///
/// `keys` lists the new order; items of the category left out of `keys`
/// follow, keeping their current relative order.
pub fn reorder<S: AsRef<str>>(
    list: &mut ShoppingList,
    bucket: Bucket,
    category_key: &str,
    keys: &[S],
) -> Result<()> {
    let wanted = keys
        .iter()
        .enumerate()
        .map(|(position, key)| (normalize_name(key.as_ref()), position))
        .collect::<HashMap<_, _>>();

    let items = list.bucket_mut(bucket);

    for key in keys {
        let key = normalize_name(key.as_ref());
        if !items
            .iter()
            .any(|i| i.key == key && i.category_key == category_key)
        {
            return Err(Error::ItemNotFound(key));
        }
    }

    let mut rest = items
        .iter()
        .enumerate()
        .filter(|(_, i)| i.category_key == category_key && !wanted.contains_key(&i.key))
        .map(|(index, i)| (i.position.unwrap_or(u32::MAX), index))
        .collect::<Vec<_>>();
    rest.sort();

    for (offset, (_, index)) in rest.into_iter().enumerate() {
        items[index].position = Some((wanted.len() + offset) as u32);
    }

    for item in items.iter_mut() {
        if item.category_key != category_key {
            continue;
        }

        if let Some(position) = wanted.get(&item.key) {
            item.position = Some(*position as u32);
        }
    }

    Ok(())
}

/// Bulk check-off; unknown keys are skipped
///
/// Returns how many items were updated.
pub fn set_checked<S: AsRef<str>>(list: &mut ShoppingList, keys: &[S], checked: bool) -> usize {
    let mut updated = 0;

    for key in keys {
        match list.get_mut(key.as_ref()) {
            Some(item) => {
                item.checked = checked;
                updated += 1;
            }
            None => tracing::debug!(key = key.as_ref(), "skipping unknown shopping item"),
        }
    }

    updated
}

pub fn check_all(list: &mut ShoppingList, bucket: Bucket, checked: bool) -> usize {
    let items = list.bucket_mut(bucket);
    items.iter_mut().for_each(|item| item.checked = checked);

    items.len()
}

/// Recomputes every category key and order from the current overrides and categories
pub fn retag(list: &mut ShoppingList, config: &UserConfig) {
    let categories = CategorizationService::for_config(config);

    for item in list.all_items_mut() {
        item.category_key = CategorizationService::category_with_hint(
            &item.item,
            item.category_hint.as_deref(),
            &config.category_overrides,
            &config.custom_categories,
        );
        item.category_order = CategorizationService::category_order(&item.category_key, &categories);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;
    use weekmenu_shared::shopping::Contribution;

    fn recipe_item(key: &str, sources: Vec<(&str, f64, &str)>) -> ShoppingItem {
        let sources = sources
            .into_iter()
            .map(|(id, amount, unit)| Source {
                recipe_id: Some(id.to_owned()),
                recipe_name: format!("Recipe {id}"),
                contributions: vec![Contribution {
                    amount: Some(amount),
                    unit: unit.to_owned(),
                }],
            })
            .collect::<Vec<_>>();
        let tally = Tally::from_sources(&sources);

        ShoppingItem {
            key: key.to_owned(),
            item: key.to_owned(),
            amount: tally.amount,
            unit: tally.unit,
            additional_amounts: tally.additional_amounts,
            category_key: CategorizationService::category_for(key, &Default::default(), &[]),
            category_order: 0,
            category_hint: None,
            position: None,
            sources,
            checked: false,
            excluded_keyword: None,
        }
    }

    fn list() -> ShoppingList {
        let mut list = ShoppingList::empty(datetime!(2025-01-20 12:00 UTC));
        list.items = vec![
            recipe_item("flour", vec![("1", 2.0, "cups"), ("2", 1.0, "cup")]),
            recipe_item("sugar", vec![("1", 100.0, "g")]),
            recipe_item("rice", vec![("2", 1.0, "kg")]),
        ];
        list.excluded = vec![ShoppingItem {
            excluded_keyword: Some("nut".to_owned()),
            ..recipe_item("peanut butter", vec![("1", 2.0, "tbsp")])
        }];
        list.source_recipes = ["1", "2"].into_iter().map(str::to_owned).collect();
        list
    }

    #[test]
    fn test_add_manual_item() {
        let config = UserConfig::default();
        let mut list = list();

        assert_eq!(
            add_manual_items(&mut list, &["Paper towels", "  ", "FLOUR", "paper TOWELS"], &config),
            vec![
                AddOutcome::Added("paper towels".to_owned()),
                AddOutcome::Blank,
                AddOutcome::DuplicateSkipped("FLOUR".to_owned()),
                AddOutcome::DuplicateSkipped("paper TOWELS".to_owned()),
            ]
        );

        let item = list.get("paper towels").unwrap();
        assert_eq!(item.source_names(), vec!["Manual"]);
        assert_eq!(item.category_key, "misc");
        assert_eq!(item.amount, None);
    }

    #[test]
    fn test_remove_item() {
        let mut list = list();

        let removed = remove_item(&mut list, "Sugar").unwrap();
        assert_eq!(removed.key, "sugar");
        assert!(list.get("sugar").is_none());
        assert!(matches!(
            remove_item(&mut list, "sugar"),
            Err(Error::ItemNotFound(_))
        ));
    }

    #[test]
    fn test_remove_recipe_items_refolds_shared_items() {
        let mut list = list();

        let removed = remove_recipe_items(&mut list, "1");

        assert_eq!(removed, 2);
        assert!(list.get("sugar").is_none());
        assert!(list.get("peanut butter").is_none());

        let flour = list.get("flour").unwrap();
        assert_eq!(flour.amount, Some(1.0));
        assert_eq!(flour.unit, "cup");
        assert_eq!(flour.sources.len(), 1);
        assert!(list.get("rice").is_some());
        assert!(!list.source_recipes.contains("1"));
    }

    #[test]
    fn test_move_item_keeps_quantities() {
        let mut list = list();

        move_item(&mut list, "peanut butter", Bucket::Items).unwrap();
        let item = list.get("peanut butter").unwrap();
        assert_eq!(item.excluded_keyword, None);
        assert_eq!(item.amount, Some(2.0));
        assert_eq!(list.find("peanut butter").map(|(b, _)| b), Some(Bucket::Items));

        move_item(&mut list, "rice", Bucket::AlreadyHave).unwrap();
        assert_eq!(list.already_have.len(), 1);
        assert!(matches!(
            move_item(&mut list, "bread", Bucket::Items),
            Err(Error::ItemNotFound(_))
        ));
    }

    #[test]
    fn test_reorder_overrides_insertion_order() {
        let mut list = list();

        reorder(&mut list, Bucket::Items, "pantry", &["rice", "sugar"]).unwrap();

        let keys = list
            .sorted_items(Bucket::Items)
            .into_iter()
            .map(|i| i.key.as_str())
            .collect::<Vec<_>>();
        assert_eq!(keys, vec!["rice", "sugar", "flour"]);

        assert!(matches!(
            reorder(&mut list, Bucket::Items, "produce", &["rice"]),
            Err(Error::ItemNotFound(_))
        ));
    }

    #[test]
    fn test_bulk_check() {
        let mut list = list();

        assert_eq!(set_checked(&mut list, &["flour", "Rice", "bread"], true), 2);
        assert!(list.get("flour").unwrap().checked);
        assert!(!list.get("sugar").unwrap().checked);

        assert_eq!(check_all(&mut list, Bucket::Items, false), 3);
        assert!(list.items.iter().all(|i| !i.checked));
    }

    #[test]
    fn test_retag_applies_override() {
        let mut list = list();
        let mut config = UserConfig::default();
        CategorizationService::set_override(&mut config, "rice", "Spices").unwrap();

        retag(&mut list, &config);

        let categories = CategorizationService::for_config(&config);
        let rice = list.get("rice").unwrap();
        assert_eq!(rice.category_key, "spices");
        assert_eq!(rice.category_order, CategorizationService::category_order("spices", &categories));
        assert_eq!(list.get("flour").unwrap().category_key, "pantry");
    }

    #[test]
    fn test_retag_after_override_cleared() {
        let mut list = list();
        list.get_mut("sugar").unwrap().category_hint = Some("Frozen".to_owned());
        let mut config = UserConfig::default();

        CategorizationService::set_override(&mut config, "rice", "Spices").unwrap();
        CategorizationService::set_override(&mut config, "sugar", "Spices").unwrap();
        retag(&mut list, &config);
        assert_eq!(list.get("rice").unwrap().category_key, "spices");
        assert_eq!(list.get("sugar").unwrap().category_key, "spices");

        CategorizationService::clear_override(&mut config, "rice");
        CategorizationService::clear_override(&mut config, "sugar");
        retag(&mut list, &config);

        assert_eq!(list.get("rice").unwrap().category_key, "pantry");
        assert_eq!(list.get("sugar").unwrap().category_key, "frozen");
    }
}
