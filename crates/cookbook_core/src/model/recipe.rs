//! Recipe domain model.
//!
//! # Responsibility
//! - Define the `Recipe` row shape mirrored by the `Recipe` table.
//! - Define `NewRecipe`, the id-less input accepted by insert.
//!
//! # Invariants
//! - `id` is assigned by storage on insert and never changes afterwards.
//! - Ids are never reused, even after the row is deleted.
//! - `name` and `ingredient` must be non-blank before persistence; storage
//!   itself does not check this, callers do via `NewRecipe::validate()`.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Engine-assigned primary key of a stored recipe.
pub type RecipeId = i64;

/// Persisted recipe row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    /// Primary key assigned on insert.
    pub id: RecipeId,
    /// User-provided title.
    pub name: String,
    /// Free-form ingredient list.
    pub ingredient: String,
    /// Compressed raster image bytes, stored inline.
    pub image: Option<Vec<u8>>,
}

/// Recipe values before storage assigns an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRecipe {
    pub name: String,
    pub ingredient: String,
    pub image: Option<Vec<u8>>,
}

/// Caller-side validation failures for recipe fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeValidationError {
    EmptyName,
    EmptyIngredient,
}

impl Display for RecipeValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "recipe name must not be empty"),
            Self::EmptyIngredient => write!(f, "recipe ingredient must not be empty"),
        }
    }
}

impl Error for RecipeValidationError {}

impl NewRecipe {
    /// Creates insert input with trimmed text fields.
    pub fn new(
        name: impl Into<String>,
        ingredient: impl Into<String>,
        image: Option<Vec<u8>>,
    ) -> Self {
        Self {
            name: name.into().trim().to_string(),
            ingredient: ingredient.into().trim().to_string(),
            image,
        }
    }

    /// Checks required text fields.
    ///
    /// # Errors
    /// - `EmptyName` when `name` is blank.
    /// - `EmptyIngredient` when `ingredient` is blank.
    pub fn validate(&self) -> Result<(), RecipeValidationError> {
        validate_fields(&self.name, &self.ingredient)
    }

    /// Image length in bytes, `0` when absent.
    pub fn image_len(&self) -> usize {
        image_len(self.image.as_deref())
    }
}

impl Recipe {
    /// Image length in bytes, `0` when absent.
    pub fn image_len(&self) -> usize {
        image_len(self.image.as_deref())
    }
}

/// Byte length of an optional image.
///
/// Store log lines report this instead of image content.
pub fn image_len(image: Option<&[u8]>) -> usize {
    image.map_or(0, <[u8]>::len)
}

pub(crate) fn validate_fields(name: &str, ingredient: &str) -> Result<(), RecipeValidationError> {
    if name.trim().is_empty() {
        return Err(RecipeValidationError::EmptyName);
    }
    if ingredient.trim().is_empty() {
        return Err(RecipeValidationError::EmptyIngredient);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{image_len, NewRecipe, RecipeValidationError};

    #[test]
    fn new_trims_text_fields() {
        let recipe = NewRecipe::new("  Soup ", "\tWater, Salt\n", None);
        assert_eq!(recipe.name, "Soup");
        assert_eq!(recipe.ingredient, "Water, Salt");
    }

    #[test]
    fn validate_rejects_blank_fields_in_order() {
        let blank_name = NewRecipe::new("   ", "", None);
        assert_eq!(blank_name.validate(), Err(RecipeValidationError::EmptyName));

        let blank_ingredient = NewRecipe::new("Soup", " ", None);
        assert_eq!(
            blank_ingredient.validate(),
            Err(RecipeValidationError::EmptyIngredient)
        );
    }

    #[test]
    fn image_len_counts_bytes_and_treats_absent_as_zero() {
        let with_image = NewRecipe::new("Bread", "Flour", Some(vec![1, 2, 3]));
        assert_eq!(with_image.image_len(), 3);
        assert_eq!(image_len(None), 0);
        assert_eq!(image_len(Some(&[])), 0);
    }
}
