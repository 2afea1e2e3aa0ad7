//! Recipe use-case service.
//!
//! # Responsibility
//! - Validate user input (trimmed, non-empty name and ingredient).
//! - Carry the previous image forward on edit when no new image is chosen.
//!
//! # Invariants
//! - Blank names or ingredients never reach the store.
//! - Edits are a plain read-modify-write on the caller side; a concurrent
//!   writer between the read and the update is overwritten.

use crate::model::recipe::{validate_fields, NewRecipe, Recipe, RecipeValidationError};
use crate::store::{RecipeDao, StoreError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug)]
pub enum ServiceError {
    Validation(RecipeValidationError),
    Store(StoreError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<RecipeValidationError> for ServiceError {
    fn from(value: RecipeValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Use-case wrapper over `RecipeDao`.
#[derive(Debug, Clone)]
pub struct RecipeService {
    dao: RecipeDao,
}

impl RecipeService {
    pub fn new(dao: RecipeDao) -> Self {
        Self { dao }
    }

    pub fn dao(&self) -> &RecipeDao {
        &self.dao
    }

    /// Saves a new recipe after trimming and validating its text fields.
    pub async fn create_recipe(
        &self,
        name: &str,
        ingredient: &str,
        image: Option<Vec<u8>>,
    ) -> ServiceResult<()> {
        let recipe = NewRecipe::new(name, ingredient, image);
        recipe.validate()?;
        self.dao.insert(recipe).await?;
        Ok(())
    }

    /// Rewrites `previous` with new text and, optionally, a new image.
    ///
    /// # Contract
    /// - `new_image = None` keeps `previous.image`.
    /// - `previous` is the caller's last snapshot of the row; it is not re-read.
    pub async fn edit_recipe(
        &self,
        previous: &Recipe,
        name: &str,
        ingredient: &str,
        new_image: Option<Vec<u8>>,
    ) -> ServiceResult<()> {
        let name = name.trim();
        let ingredient = ingredient.trim();
        validate_fields(name, ingredient)?;

        let image = new_image.or_else(|| previous.image.clone());
        self.dao
            .update_by_id(previous.id, name.to_string(), ingredient.to_string(), image)
            .await?;
        Ok(())
    }

    /// Deletes the row matching `recipe` exactly.
    pub async fn delete_recipe(&self, recipe: Recipe) -> ServiceResult<()> {
        self.dao.delete(recipe).await?;
        Ok(())
    }
}
