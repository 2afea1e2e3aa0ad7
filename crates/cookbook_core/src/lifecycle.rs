//! Database lifecycle manager.
//!
//! # Responsibility
//! - Open the recipe database once and hand the same handle to every caller.
//!
//! # Invariants
//! - At most one successful open per manager, even under concurrent first
//!   calls.
//! - Later calls ignore their config and return the existing handle.
//! - A failed first open leaves the manager empty; the next call retries.
//! - There is no close; the handle lives as long as the manager's owner.

use crate::config::StoreConfig;
use crate::db::DbResult;
use crate::store::RecipeDatabase;
use log::info;
use once_cell::sync::OnceCell;

/// Owner of the process's single `RecipeDatabase`.
///
/// Construct one at the composition root and pass it by reference.
#[derive(Debug, Default)]
pub struct DatabaseManager {
    instance: OnceCell<RecipeDatabase>,
}

impl DatabaseManager {
    pub const fn new() -> Self {
        Self {
            instance: OnceCell::new(),
        }
    }

    /// Returns the shared database, opening it with `config` on first use.
    ///
    /// # Errors
    /// - Returns `DbError` when the first open fails.
    pub fn get_instance(&self, config: &StoreConfig) -> DbResult<RecipeDatabase> {
        self.instance
            .get_or_try_init(|| -> DbResult<RecipeDatabase> {
                let db = RecipeDatabase::open(config)?;
                info!(
                    "event=db_instance module=lifecycle status=ok in_memory={}",
                    config.in_memory
                );
                Ok(db)
            })
            .cloned()
    }

    /// Returns the shared database if it has been opened.
    pub fn current(&self) -> Option<RecipeDatabase> {
        self.instance.get().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::DatabaseManager;
    use crate::config::StoreConfig;

    #[test]
    fn current_is_empty_before_first_open() {
        let manager = DatabaseManager::new();
        assert!(manager.current().is_none());
    }

    #[test]
    fn second_call_reuses_first_handle() {
        let manager = DatabaseManager::new();
        let first = manager
            .get_instance(&StoreConfig::in_memory())
            .expect("first open");
        let second = manager
            .get_instance(&StoreConfig::new("/ignored/after/first/open"))
            .expect("second call");
        assert!(first.ptr_eq(&second));
    }
}
