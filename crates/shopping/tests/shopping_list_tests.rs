use time::macros::datetime;
use weekmenu_shared::recipe::{Ingredient, Recipe};
use weekmenu_shared::shopping::{Bucket, ShoppingList};
use weekmenu_shared::user::UserConfig;
use weekmenu_shopping::{
    AddOutcome, Aggregation, CategorizationService, IngredientAggregationService, ScaledRecipe, list,
};

fn recipes() -> Vec<Recipe> {
    vec![
        Recipe::new("r1", "Pancakes", "vegetarian")
            .with_ingredient(Ingredient::new("flour", 2.0, "cups"))
            .with_ingredient(Ingredient::new("milk", 1.0, "cup"))
            .with_ingredient(Ingredient::new("eggs", 2.0, "")),
        Recipe::new("r2", "Bread", "vegetarian")
            .with_ingredient(Ingredient::new("flour", 500.0, "g"))
            .with_ingredient(Ingredient::new("yeast", 7.0, "g")),
    ]
}

fn build(recipes: &[Recipe], config: &UserConfig) -> ShoppingList {
    let scaled = recipes
        .iter()
        .map(|recipe| ScaledRecipe { recipe, scale: 1.0 })
        .collect::<Vec<_>>();

    IngredientAggregationService::aggregate(
        &scaled,
        &Aggregation {
            pantry: &[],
            config,
            scale: 1.0,
            generated_at: datetime!(2025-01-20 18:30 UTC),
        },
    )
}

#[test]
fn test_rebuild_keeps_checks_and_manual_items() {
    let config = UserConfig::default();
    let recipes = recipes();

    let mut previous = build(&recipes, &config);
    assert!(list::add_manual_item(&mut previous, "Dish soap", &config).is_added());
    assert_eq!(list::set_checked(&mut previous, &["eggs"], true), 1);

    let mut rebuilt = build(&recipes[..1], &config);
    IngredientAggregationService::carry_over(&mut rebuilt, &previous, &config);

    assert!(rebuilt.get("eggs").unwrap().checked);
    assert!(rebuilt.get("dish soap").is_some());
    assert!(rebuilt.get("yeast").is_none());
    assert_eq!(rebuilt.get("flour").unwrap().amount, Some(2.0));
}

#[test]
fn test_remove_recipe_recomputes_mixed_units() {
    let config = UserConfig::default();
    let mut shopping = build(&recipes(), &config);

    let flour = shopping.get("flour").unwrap();
    assert_eq!(flour.amount, Some(2.0));
    assert_eq!(flour.additional_amounts.len(), 1);

    assert_eq!(list::remove_recipe_items(&mut shopping, "r1"), 2);

    let flour = shopping.get("flour").unwrap();
    assert_eq!(flour.amount, Some(500.0));
    assert_eq!(flour.unit, "g");
    assert!(flour.additional_amounts.is_empty());
    assert!(shopping.get("milk").is_none());
    assert!(shopping.get("yeast").is_some());
}

#[test]
fn test_custom_category_flow() {
    let mut config = UserConfig::default();
    let AddOutcome::Added(id) = CategorizationService::add_custom_category(&mut config, "Baking")
    else {
        panic!("category should be added");
    };
    CategorizationService::set_override(&mut config, "yeast", "baking").unwrap();

    let mut shopping = build(&recipes(), &config);
    assert_eq!(shopping.get("yeast").unwrap().category_key, id);

    CategorizationService::delete_custom_category(&mut config, &id).unwrap();
    list::retag(&mut shopping, &config);

    assert_eq!(shopping.get("yeast").unwrap().category_key, "misc");
    let last = shopping.sorted_items(Bucket::Items).last().map(|i| i.key.to_owned());
    assert_eq!(last.as_deref(), Some("yeast"));
}
