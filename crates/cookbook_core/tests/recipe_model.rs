use cookbook_core::{NewRecipe, Recipe};
use serde_json::json;

#[test]
fn recipe_serializes_with_column_names() {
    let recipe = Recipe {
        id: 3,
        name: "Soup".to_string(),
        ingredient: "Water, Salt".to_string(),
        image: Some(vec![1, 2]),
    };

    let value = serde_json::to_value(&recipe).unwrap();
    assert_eq!(
        value,
        json!({
            "id": 3,
            "name": "Soup",
            "ingredient": "Water, Salt",
            "image": [1, 2],
        })
    );
}

#[test]
fn missing_image_deserializes_from_null() {
    let recipe: Recipe = serde_json::from_value(json!({
        "id": 1,
        "name": "Tea",
        "ingredient": "Leaves",
        "image": null,
    }))
    .unwrap();

    assert_eq!(recipe.image, None);
    assert_eq!(recipe.image_len(), 0);
}

#[test]
fn new_recipe_trims_before_validation() {
    let recipe = NewRecipe::new("  Tea ", " Leaves", None);

    assert_eq!(recipe.name, "Tea");
    assert_eq!(recipe.ingredient, "Leaves");
    assert!(recipe.validate().is_ok());
}
