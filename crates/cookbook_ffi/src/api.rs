//! FFI use-case API for the recipe list and detail screens.
//!
//! # Responsibility
//! - Expose recipe reads, writes and list subscriptions to Dart via FRB.
//! - Own the process's database manager, async runtime and subscription
//!   registry so the UI never holds engine handles.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Failures are reported in response envelopes, never as panics.
//! - Dart polls subscriptions; snapshots are handed over on the calling
//!   thread.

use cookbook_core::{
    core_version as core_version_inner, default_log_level, init_logging as init_logging_inner,
    ping as ping_inner, DatabaseManager, LiveQuery, Recipe, RecipeId, RecipeService, StoreConfig,
    StoreResult, SubscriptionScope,
};
use log::warn;
use once_cell::sync::{Lazy, OnceCell};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;
use tokio::runtime::{Builder, Runtime};
use tokio::sync::mpsc::error::TryRecvError;

const STORE_WORKER_THREADS: usize = 2;

static DATABASE: DatabaseManager = DatabaseManager::new();
static RUNTIME: OnceCell<Runtime> = OnceCell::new();
static WATCHES: Lazy<Mutex<WatchRegistry>> = Lazy::new(|| Mutex::new(WatchRegistry::default()));

#[derive(Default)]
struct WatchRegistry {
    next_id: u64,
    lists: HashMap<u64, LiveQuery<Vec<Recipe>>>,
    details: HashMap<u64, LiveQuery<Recipe>>,
    scope: SubscriptionScope,
}

impl WatchRegistry {
    fn register(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - `level`: `trace|debug|info|warn|error`, case-insensitive. Blank selects
///   the build default (`debug` in debug builds, `info` otherwise).
/// - `log_dir`: absolute directory for rolling log files.
/// - Returns empty string on success and an error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    let level = if level.trim().is_empty() {
        default_log_level().as_str()
    } else {
        level.as_str()
    };
    match init_logging_inner(level, log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One row of the recipe list screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeListItem {
    pub id: i64,
    pub name: String,
}

/// Full recipe for the detail screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeDetail {
    pub id: i64,
    pub name: String,
    pub ingredient: String,
    /// Compressed image bytes, absent when the recipe has none.
    pub image: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeListResponse {
    pub items: Vec<RecipeListItem>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeDetailResponse {
    /// `None` when the recipe does not exist or the read failed.
    pub recipe: Option<RecipeDetail>,
    pub message: String,
}

/// Generic action response envelope for write calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeActionResponse {
    pub ok: bool,
    pub message: String,
}

impl RecipeActionResponse {
    fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeWatchStart {
    /// Registry id for poll/cancel, `None` on failure.
    pub subscription_id: Option<u64>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeWatchPoll {
    /// Newest snapshot since the last poll, `None` when nothing changed.
    pub items: Option<Vec<RecipeListItem>>,
    /// `false` once the subscription is cancelled, failed or unknown.
    pub active: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeDetailPoll {
    /// Newest value of the watched recipe, `None` when nothing changed.
    pub recipe: Option<RecipeDetail>,
    /// `false` once the subscription is cancelled, failed or unknown.
    pub active: bool,
    pub message: String,
}

/// Lists every recipe for the list screen.
#[flutter_rust_bridge::frb(sync)]
pub fn recipe_list() -> RecipeListResponse {
    let result = with_service(|service| async move {
        service.dao().load_all().await.map_err(|err| err.to_string())
    });
    match result {
        Ok(recipes) => RecipeListResponse {
            message: format!("Loaded {} recipe(s).", recipes.len()),
            items: recipes.iter().map(to_list_item).collect(),
        },
        Err(err) => RecipeListResponse {
            items: Vec::new(),
            message: format!("recipe_list failed: {err}"),
        },
    }
}

/// Loads one recipe for the detail screen.
#[flutter_rust_bridge::frb(sync)]
pub fn recipe_get(id: i64) -> RecipeDetailResponse {
    let result = with_service(|service| async move {
        service
            .dao()
            .load_by_id(id)
            .await
            .map_err(|err| err.to_string())
    });
    match result {
        Ok(Some(recipe)) => RecipeDetailResponse {
            recipe: Some(to_detail(recipe)),
            message: "Recipe loaded.".to_string(),
        },
        Ok(None) => RecipeDetailResponse {
            recipe: None,
            message: format!("Recipe {id} not found."),
        },
        Err(err) => RecipeDetailResponse {
            recipe: None,
            message: format!("recipe_get failed: {err}"),
        },
    }
}

/// Saves a new recipe. Blank name or ingredient is rejected.
#[flutter_rust_bridge::frb(sync)]
pub fn recipe_create(
    name: String,
    ingredient: String,
    image: Option<Vec<u8>>,
) -> RecipeActionResponse {
    let result = with_service(|service| async move {
        service
            .create_recipe(&name, &ingredient, image)
            .await
            .map_err(|err| err.to_string())
    });
    match result {
        Ok(()) => RecipeActionResponse::success("Recipe saved."),
        Err(err) => RecipeActionResponse::failure(format!("recipe_create failed: {err}")),
    }
}

/// Edits a recipe. `image = None` keeps the stored image.
#[flutter_rust_bridge::frb(sync)]
pub fn recipe_update(
    id: i64,
    name: String,
    ingredient: String,
    image: Option<Vec<u8>>,
) -> RecipeActionResponse {
    let result = with_service(|service| async move {
        let previous = load_existing(&service, id).await?;
        service
            .edit_recipe(&previous, &name, &ingredient, image)
            .await
            .map_err(|err| err.to_string())
    });
    match result {
        Ok(()) => RecipeActionResponse::success("Recipe updated."),
        Err(err) => RecipeActionResponse::failure(format!("recipe_update failed: {err}")),
    }
}

/// Deletes a recipe by id.
#[flutter_rust_bridge::frb(sync)]
pub fn recipe_delete(id: i64) -> RecipeActionResponse {
    let result = with_service(|service| async move {
        let previous = load_existing(&service, id).await?;
        service
            .delete_recipe(previous)
            .await
            .map_err(|err| err.to_string())
    });
    match result {
        Ok(()) => RecipeActionResponse::success("Recipe deleted."),
        Err(err) => RecipeActionResponse::failure(format!("recipe_delete failed: {err}")),
    }
}

/// Starts a live list subscription; poll it with `recipe_watch_poll`.
#[flutter_rust_bridge::frb(sync)]
pub fn recipe_watch_all() -> RecipeWatchStart {
    let query = match start_watch(|service| service.dao().get_all()) {
        Ok(query) => query,
        Err(err) => {
            return RecipeWatchStart {
                subscription_id: None,
                message: format!("recipe_watch_all failed: {err}"),
            };
        }
    };

    let mut registry = lock_watches();
    let subscription_id = registry.register();
    registry.scope.track(&query);
    registry.lists.insert(subscription_id, query);

    RecipeWatchStart {
        subscription_id: Some(subscription_id),
        message: "Watching recipes.".to_string(),
    }
}

/// Starts a live detail subscription for one recipe; poll it with
/// `recipe_watch_one_poll`. A missing recipe stays silent until cancelled.
#[flutter_rust_bridge::frb(sync)]
pub fn recipe_watch_one(id: i64) -> RecipeWatchStart {
    let query = match start_watch(|service| service.dao().find_by_id(id)) {
        Ok(query) => query,
        Err(err) => {
            return RecipeWatchStart {
                subscription_id: None,
                message: format!("recipe_watch_one failed: {err}"),
            };
        }
    };

    let mut registry = lock_watches();
    let subscription_id = registry.register();
    registry.scope.track(&query);
    registry.details.insert(subscription_id, query);

    RecipeWatchStart {
        subscription_id: Some(subscription_id),
        message: format!("Watching recipe {id}."),
    }
}

/// Drains a list subscription and returns its newest snapshot, if any.
#[flutter_rust_bridge::frb(sync)]
pub fn recipe_watch_poll(subscription_id: u64) -> RecipeWatchPoll {
    let mut registry = lock_watches();
    let Some(query) = registry.lists.get_mut(&subscription_id) else {
        return RecipeWatchPoll {
            items: None,
            active: false,
            message: format!("Unknown subscription {subscription_id}."),
        };
    };

    let (newest, active) = drain_newest(query);
    if !active {
        registry.lists.remove(&subscription_id);
    }

    match newest {
        Some(Ok(recipes)) => RecipeWatchPoll {
            items: Some(recipes.iter().map(to_list_item).collect()),
            active,
            message: format!("{} recipe(s).", recipes.len()),
        },
        Some(Err(err)) => RecipeWatchPoll {
            items: None,
            active: false,
            message: format!("recipe_watch failed: {err}"),
        },
        None => RecipeWatchPoll {
            items: None,
            active,
            message: idle_message(active),
        },
    }
}

/// Drains a detail subscription and returns the recipe's newest value, if any.
#[flutter_rust_bridge::frb(sync)]
pub fn recipe_watch_one_poll(subscription_id: u64) -> RecipeDetailPoll {
    let mut registry = lock_watches();
    let Some(query) = registry.details.get_mut(&subscription_id) else {
        return RecipeDetailPoll {
            recipe: None,
            active: false,
            message: format!("Unknown subscription {subscription_id}."),
        };
    };

    let (newest, active) = drain_newest(query);
    if !active {
        registry.details.remove(&subscription_id);
    }

    match newest {
        Some(Ok(recipe)) => RecipeDetailPoll {
            message: format!("Recipe {} changed.", recipe.id),
            recipe: Some(to_detail(recipe)),
            active,
        },
        Some(Err(err)) => RecipeDetailPoll {
            recipe: None,
            active: false,
            message: format!("recipe_watch_one failed: {err}"),
        },
        None => RecipeDetailPoll {
            recipe: None,
            active,
            message: idle_message(active),
        },
    }
}

/// Cancels one list or detail subscription. Returns `false` when the id is
/// unknown.
#[flutter_rust_bridge::frb(sync)]
pub fn recipe_watch_cancel(subscription_id: u64) -> bool {
    let mut registry = lock_watches();
    if let Some(query) = registry.lists.remove(&subscription_id) {
        query.cancel();
        return true;
    }
    match registry.details.remove(&subscription_id) {
        Some(query) => {
            query.cancel();
            true
        }
        None => false,
    }
}

/// Cancels every subscription, e.g. when the screen goes away.
#[flutter_rust_bridge::frb(sync)]
pub fn recipe_watch_cancel_all() {
    let mut registry = lock_watches();
    registry.scope.cancel_all();
    registry.lists.clear();
    registry.details.clear();
}

fn runtime() -> Result<&'static Runtime, String> {
    RUNTIME.get_or_try_init(|| {
        Builder::new_multi_thread()
            .worker_threads(STORE_WORKER_THREADS)
            .thread_name("cookbook-store")
            .enable_all()
            .build()
            .map_err(|err| format!("async runtime start failed: {err}"))
    })
}

fn open_service() -> Result<RecipeService, String> {
    let db = DATABASE
        .get_instance(&StoreConfig::from_env())
        .map_err(|err| format!("recipe DB open failed: {err}"))?;
    Ok(RecipeService::new(db.recipe_dao()))
}

fn with_service<T, F, Fut>(f: F) -> Result<T, String>
where
    F: FnOnce(RecipeService) -> Fut,
    Fut: Future<Output = Result<T, String>>,
{
    let runtime = runtime()?;
    let service = open_service()?;
    runtime.block_on(f(service))
}

/// Subscribes inside the FFI runtime so the live query task has an executor.
fn start_watch<T, F>(subscribe: F) -> Result<LiveQuery<T>, String>
where
    F: FnOnce(&RecipeService) -> LiveQuery<T>,
{
    let runtime = runtime()?;
    let service = open_service()?;
    let _entered = runtime.enter();
    Ok(subscribe(&service))
}

/// Takes every buffered item and keeps the newest. Reports `false` once the
/// query failed or ended.
fn drain_newest<T>(query: &mut LiveQuery<T>) -> (Option<StoreResult<T>>, bool) {
    let mut newest = None;
    let active = loop {
        match query.try_recv() {
            Ok(item) => {
                let failed = item.is_err();
                newest = Some(item);
                if failed {
                    break false;
                }
            }
            Err(TryRecvError::Empty) => break true,
            Err(TryRecvError::Disconnected) => break false,
        }
    };
    (newest, active)
}

fn idle_message(active: bool) -> String {
    if active {
        "No changes.".to_string()
    } else {
        "Subscription ended.".to_string()
    }
}

async fn load_existing(service: &RecipeService, id: RecipeId) -> Result<Recipe, String> {
    service
        .dao()
        .load_by_id(id)
        .await
        .map_err(|err| err.to_string())?
        .ok_or_else(|| format!("recipe {id} not found"))
}

fn lock_watches() -> std::sync::MutexGuard<'static, WatchRegistry> {
    WATCHES.lock().unwrap_or_else(|poisoned| {
        warn!("event=watch_registry module=ffi status=recovered reason=poisoned");
        poisoned.into_inner()
    })
}

fn to_list_item(recipe: &Recipe) -> RecipeListItem {
    RecipeListItem {
        id: recipe.id,
        name: recipe.name.clone(),
    }
}

fn to_detail(recipe: Recipe) -> RecipeDetail {
    RecipeDetail {
        id: recipe.id,
        name: recipe.name,
        ingredient: recipe.ingredient,
        image: recipe.image,
    }
}
