use cookbook_core::db::open_db_in_memory;
use cookbook_core::{NewRecipe, RecipeRepository, RepoError, SqliteRecipeRepository};

#[test]
fn insert_assigns_increasing_ids_and_lists_in_id_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecipeRepository::new(&conn);

    let first = repo
        .insert_recipe(&NewRecipe::new("Soup", "Water, Salt", None))
        .unwrap();
    let second = repo
        .insert_recipe(&NewRecipe::new("Bread", "Flour", Some(vec![0x89, 0x50])))
        .unwrap();
    assert!(second > first);

    let all = repo.list_recipes().unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].id, first);
    assert_eq!(all[0].image, None);
    assert_eq!(all[1].name, "Bread");
    assert_eq!(all[1].image.as_deref(), Some(&[0x89, 0x50][..]));
}

#[test]
fn find_missing_id_returns_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecipeRepository::new(&conn);

    assert!(repo.find_recipe(404).unwrap().is_none());
}

#[test]
fn ids_are_not_reused_after_deleting_the_newest_row() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecipeRepository::new(&conn);

    repo.insert_recipe(&NewRecipe::new("A", "a", None)).unwrap();
    let newest = repo.insert_recipe(&NewRecipe::new("B", "b", None)).unwrap();
    let row = repo.find_recipe(newest).unwrap().unwrap();
    assert_eq!(repo.delete_recipe(&row).unwrap(), 1);

    let replacement = repo.insert_recipe(&NewRecipe::new("C", "c", None)).unwrap();
    assert!(replacement > newest);
}

#[test]
fn delete_requires_every_column_to_match() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecipeRepository::new(&conn);

    let id = repo
        .insert_recipe(&NewRecipe::new("Tea", "Leaves", Some(vec![1, 2])))
        .unwrap();
    let stored = repo.find_recipe(id).unwrap().unwrap();

    let mut stale = stored.clone();
    stale.image = Some(vec![9]);
    assert_eq!(repo.delete_recipe(&stale).unwrap(), 0);

    let mut renamed = stored.clone();
    renamed.name = "Coffee".to_string();
    assert_eq!(repo.delete_recipe(&renamed).unwrap(), 0);

    assert_eq!(repo.delete_recipe(&stored).unwrap(), 1);
    assert!(repo.find_recipe(id).unwrap().is_none());
}

#[test]
fn delete_matches_null_image() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecipeRepository::new(&conn);

    let id = repo.insert_recipe(&NewRecipe::new("Rice", "Rice, Water", None)).unwrap();
    let stored = repo.find_recipe(id).unwrap().unwrap();

    assert_eq!(repo.delete_recipe(&stored).unwrap(), 1);
    assert!(repo.list_recipes().unwrap().is_empty());
}

#[test]
fn update_overwrites_image_including_clearing_it() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecipeRepository::new(&conn);

    let id = repo
        .insert_recipe(&NewRecipe::new("Pie", "Apple", Some(vec![7, 7, 7])))
        .unwrap();
    assert_eq!(repo.update_recipe_by_id(id, "Pie", "Pear", None).unwrap(), 1);

    let loaded = repo.find_recipe(id).unwrap().unwrap();
    assert_eq!(loaded.ingredient, "Pear");
    assert_eq!(loaded.image, None);
}

#[test]
fn update_missing_id_changes_nothing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRecipeRepository::new(&conn);

    assert_eq!(repo.update_recipe_by_id(99, "X", "Y", None).unwrap(), 0);
    assert!(repo.list_recipes().unwrap().is_empty());
}

#[test]
fn malformed_image_column_is_reported_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO Recipe (name, ingredient, image) VALUES ('Odd', 'Row', 42);",
        [],
    )
    .unwrap();
    let repo = SqliteRecipeRepository::new(&conn);

    let err = repo.list_recipes().unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(ref message) if message.contains("Recipe.image")));
}

#[test]
fn schema_rejects_null_name() {
    let conn = open_db_in_memory().unwrap();

    let err = conn
        .execute(
            "INSERT INTO Recipe (name, ingredient) VALUES (NULL, 'x');",
            [],
        )
        .unwrap_err();
    assert!(err.to_string().contains("NOT NULL"));
}
