use cookbook_core::{
    RecipeDatabase, RecipeService, RecipeValidationError, ServiceError, StoreConfig,
};

fn memory_service() -> RecipeService {
    let db = RecipeDatabase::open(&StoreConfig::in_memory()).unwrap();
    RecipeService::new(db.recipe_dao())
}

#[tokio::test]
async fn create_trims_and_persists() {
    let service = memory_service();
    service
        .create_recipe("  Soup  ", " Water, Salt\n", None)
        .await
        .unwrap();

    let rows = service.dao().load_all().await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "Soup");
    assert_eq!(rows[0].ingredient, "Water, Salt");
}

#[tokio::test]
async fn blank_fields_never_reach_the_store() {
    let service = memory_service();

    let err = service.create_recipe("   ", "Salt", None).await.unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Validation(RecipeValidationError::EmptyName)
    ));
    let err = service.create_recipe("Soup", "", None).await.unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Validation(RecipeValidationError::EmptyIngredient)
    ));

    assert!(service.dao().load_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn edit_without_new_image_keeps_previous_image() {
    let service = memory_service();
    service
        .create_recipe("Cake", "Eggs", Some(vec![4, 2]))
        .await
        .unwrap();
    let previous = service.dao().load_all().await.unwrap().remove(0);

    service
        .edit_recipe(&previous, "Cake", "Eggs, Sugar", None)
        .await
        .unwrap();

    let edited = service.dao().load_by_id(previous.id).await.unwrap().unwrap();
    assert_eq!(edited.ingredient, "Eggs, Sugar");
    assert_eq!(edited.image, Some(vec![4, 2]));
}

#[tokio::test]
async fn edit_with_new_image_replaces_it() {
    let service = memory_service();
    service
        .create_recipe("Cake", "Eggs", Some(vec![4, 2]))
        .await
        .unwrap();
    let previous = service.dao().load_all().await.unwrap().remove(0);

    service
        .edit_recipe(&previous, "Cake", "Eggs", Some(vec![9]))
        .await
        .unwrap();

    let edited = service.dao().load_by_id(previous.id).await.unwrap().unwrap();
    assert_eq!(edited.image, Some(vec![9]));
}

#[tokio::test]
async fn edit_rejects_blank_name_and_leaves_row_untouched() {
    let service = memory_service();
    service.create_recipe("Cake", "Eggs", None).await.unwrap();
    let previous = service.dao().load_all().await.unwrap().remove(0);

    let err = service
        .edit_recipe(&previous, " ", "Eggs", None)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    let stored = service.dao().load_by_id(previous.id).await.unwrap().unwrap();
    assert_eq!(stored, previous);
}

#[tokio::test]
async fn delete_removes_recipe() {
    let service = memory_service();
    service.create_recipe("Gone", "Soon", None).await.unwrap();
    let recipe = service.dao().load_all().await.unwrap().remove(0);

    service.delete_recipe(recipe).await.unwrap();
    assert!(service.dao().load_all().await.unwrap().is_empty());
}
