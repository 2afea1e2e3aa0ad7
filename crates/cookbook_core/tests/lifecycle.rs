use cookbook_core::db::DbError;
use cookbook_core::{DatabaseManager, NewRecipe, StoreConfig};

#[test]
fn concurrent_first_calls_share_one_engine() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig::new(dir.path());
    let manager = DatabaseManager::new();

    let handles = std::thread::scope(|scope| {
        let workers = (0..8)
            .map(|_| scope.spawn(|| manager.get_instance(&config).unwrap()))
            .collect::<Vec<_>>();
        workers
            .into_iter()
            .map(|worker| worker.join().unwrap())
            .collect::<Vec<_>>()
    });

    let first = &handles[0];
    assert!(handles.iter().all(|handle| handle.ptr_eq(first)));
    assert!(manager.current().unwrap().ptr_eq(first));
}

#[test]
fn failed_first_open_can_be_retried() {
    let blocker = tempfile::NamedTempFile::new().unwrap();
    let manager = DatabaseManager::new();

    let err = manager
        .get_instance(&StoreConfig::new(blocker.path()))
        .unwrap_err();
    assert!(matches!(err, DbError::Io { .. }));
    assert!(manager.current().is_none());

    manager.get_instance(&StoreConfig::in_memory()).unwrap();
    assert!(manager.current().is_some());
}

#[tokio::test]
async fn writes_through_one_handle_are_visible_through_another() {
    let manager = DatabaseManager::new();
    let writer = manager.get_instance(&StoreConfig::in_memory()).unwrap();
    let reader = manager.get_instance(&StoreConfig::in_memory()).unwrap();

    writer
        .recipe_dao()
        .insert(NewRecipe::new("Shared", "Handle", None))
        .await
        .unwrap();

    let rows = reader.recipe_dao().load_all().await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "Shared");
}
