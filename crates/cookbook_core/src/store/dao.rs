//! Data access contract for recipes.
//!
//! # Responsibility
//! - Expose get-all and find-by-id as live queries.
//! - Expose insert, delete and update-by-id as completion futures.
//!
//! # Invariants
//! - find-by-id never emits for a missing row; it is a silent miss.
//! - find-by-id re-emits only when the row value actually changed.
//! - update-by-id writes exactly the image it is given; `None` clears it.
//! - A failed live query yields its error once and then ends.
//! - Subscribing outside a tokio runtime yields a `Worker` error instead of panicking.

use super::live::{LiveQuery, SubscriptionHandle};
use super::{RecipeDatabase, StoreError, StoreResult};
use crate::model::recipe::{image_len, NewRecipe, Recipe, RecipeId};
use crate::repo::recipe_repo::{RecipeRepository, RepoResult, SqliteRecipeRepository};
use log::{debug, error, info};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc;

/// Async recipe queries and commands over one `RecipeDatabase`.
#[derive(Debug, Clone)]
pub struct RecipeDao {
    db: RecipeDatabase,
}

impl RecipeDao {
    pub(crate) fn new(db: RecipeDatabase) -> Self {
        Self { db }
    }

    /// Live snapshots of every recipe, ordered by id.
    ///
    /// Emits the current rows right away and again after every committed
    /// change to the table, until cancelled.
    pub fn get_all(&self) -> LiveQuery<Vec<Recipe>> {
        self.observe("get_all", false, |repo| repo.list_recipes().map(Some))
    }

    /// Live snapshots of the recipe with `id`.
    ///
    /// Emits nothing while no such row exists.
    pub fn find_by_id(&self, id: RecipeId) -> LiveQuery<Recipe> {
        self.observe("find_by_id", true, move |repo| repo.find_recipe(id))
    }

    /// Single read of every recipe.
    pub async fn load_all(&self) -> StoreResult<Vec<Recipe>> {
        self.db.run(|repo| repo.list_recipes()).await
    }

    /// Single read of one recipe, `None` when missing.
    pub async fn load_by_id(&self, id: RecipeId) -> StoreResult<Option<Recipe>> {
        self.db.run(move |repo| repo.find_recipe(id)).await
    }

    /// Inserts `recipe`; storage assigns its id.
    pub async fn insert(&self, recipe: NewRecipe) -> StoreResult<()> {
        let image_bytes = recipe.image_len();
        let result = self
            .db
            .write(move |repo| repo.insert_recipe(&recipe).map(|id| (id, 1)))
            .await;

        match result {
            Ok((id, _)) => {
                info!(
                    "event=recipe_insert module=store status=ok id={} image_bytes={}",
                    id, image_bytes
                );
                Ok(())
            }
            Err(err) => Err(log_failure("recipe_insert", None, err)),
        }
    }

    /// Deletes the row equal to `recipe` in every column. No-op without a match.
    pub async fn delete(&self, recipe: Recipe) -> StoreResult<()> {
        let id = recipe.id;
        let image_bytes = recipe.image_len();
        let result = self
            .db
            .write(move |repo| repo.delete_recipe(&recipe).map(|changed| ((), changed)))
            .await;

        match result {
            Ok(((), changed)) => {
                info!(
                    "event=recipe_delete module=store status=ok id={} changed={} image_bytes={}",
                    id, changed, image_bytes
                );
                Ok(())
            }
            Err(err) => Err(log_failure("recipe_delete", Some(id), err)),
        }
    }

    /// Overwrites name, ingredient and image of row `id`. No-op if missing.
    ///
    /// Callers that want to keep the stored image must pass it back in.
    pub async fn update_by_id(
        &self,
        id: RecipeId,
        name: String,
        ingredient: String,
        image: Option<Vec<u8>>,
    ) -> StoreResult<()> {
        let image_bytes = image_len(image.as_deref());
        let result = self
            .db
            .write(move |repo| {
                repo.update_recipe_by_id(id, &name, &ingredient, image.as_deref())
                    .map(|changed| ((), changed))
            })
            .await;

        match result {
            Ok(((), changed)) => {
                info!(
                    "event=recipe_update module=store status=ok id={} changed={} image_bytes={}",
                    id, changed, image_bytes
                );
                Ok(())
            }
            Err(err) => Err(log_failure("recipe_update", Some(id), err)),
        }
    }

    fn observe<T, Q>(&self, query_name: &'static str, distinct: bool, query: Q) -> LiveQuery<T>
    where
        T: Clone + PartialEq + Send + 'static,
        Q: Fn(&SqliteRecipeRepository<'_>) -> RepoResult<Option<T>> + Send + Sync + 'static,
    {
        let (tx, rx) = mpsc::channel(self.db.subscription_buffer());
        let handle = SubscriptionHandle::new();
        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(err) => {
                error!(
                    "event=live_query module=store status=error query={} error=no_runtime",
                    query_name
                );
                // Capacity is at least one, so the error always fits.
                let _ = tx.try_send(Err(StoreError::Worker(err.to_string())));
                return LiveQuery::new(rx, handle);
            }
        };
        let mut cancelled = handle.cancelled();
        let mut changes = self.db.changes();
        let db = self.db.clone();
        let query = Arc::new(query);

        debug!("event=live_query module=store status=start query={query_name}");
        runtime.spawn(async move {
            let mut last: Option<T> = None;
            let mut emitted = 0_u64;

            loop {
                if *cancelled.borrow() {
                    break;
                }
                changes.borrow_and_update();

                let job = Arc::clone(&query);
                match db.run(move |repo| (*job)(repo)).await {
                    Ok(Some(value)) => {
                        let unchanged = distinct && last.as_ref() == Some(&value);
                        if !unchanged {
                            if distinct {
                                last = Some(value.clone());
                            }
                            tokio::select! {
                                biased;
                                _ = cancelled.changed() => break,
                                sent = tx.send(Ok(value)) => {
                                    if sent.is_err() {
                                        break;
                                    }
                                    emitted += 1;
                                }
                            }
                        }
                    }
                    Ok(None) => {}
                    Err(err) => {
                        error!(
                            "event=live_query module=store status=error query={} error={}",
                            query_name, err
                        );
                        let _ = tx.send(Err(err)).await;
                        break;
                    }
                }

                tokio::select! {
                    biased;
                    _ = cancelled.changed() => break,
                    _ = tx.closed() => break,
                    changed = changes.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
            }

            debug!(
                "event=live_query module=store status=stop query={} emitted={}",
                query_name, emitted
            );
        });

        LiveQuery::new(rx, handle)
    }
}

fn log_failure(event: &str, id: Option<RecipeId>, err: StoreError) -> StoreError {
    match id {
        Some(id) => error!(
            "event={} module=store status=error id={} error={}",
            event, id, err
        ),
        None => error!("event={} module=store status=error error={}", event, err),
    }
    err
}
