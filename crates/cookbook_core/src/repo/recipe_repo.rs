//! Recipe repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide get-all, find-by-id, insert, delete and update-by-id over the
//!   `Recipe` table.
//! - Map rows to `Recipe` values and reject rows that do not fit the shape.
//!
//! # Invariants
//! - Inserted ids come from SQLite `AUTOINCREMENT` and are never reused.
//! - Delete matches every column, with `IS` so a NULL image matches NULL.
//! - Update overwrites name, ingredient and image together.

use crate::db::DbError;
use crate::model::recipe::{NewRecipe, Recipe, RecipeId};
use rusqlite::types::FromSql;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const RECIPE_SELECT_SQL: &str = "SELECT
    id,
    name,
    ingredient,
    image
FROM Recipe";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for recipe persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted recipe data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Blocking repository interface for recipe rows.
pub trait RecipeRepository {
    /// Returns every stored recipe ordered by id.
    fn list_recipes(&self) -> RepoResult<Vec<Recipe>>;
    /// Returns one recipe, `None` when the id is unknown.
    fn find_recipe(&self, id: RecipeId) -> RepoResult<Option<Recipe>>;
    /// Inserts one row and returns the assigned id.
    fn insert_recipe(&self, recipe: &NewRecipe) -> RepoResult<RecipeId>;
    /// Deletes rows equal to `recipe` in every column. Returns affected rows.
    fn delete_recipe(&self, recipe: &Recipe) -> RepoResult<usize>;
    /// Overwrites the mutable columns of row `id`. Returns affected rows.
    fn update_recipe_by_id(
        &self,
        id: RecipeId,
        name: &str,
        ingredient: &str,
        image: Option<&[u8]>,
    ) -> RepoResult<usize>;
}

/// SQLite-backed recipe repository borrowing one connection.
pub struct SqliteRecipeRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRecipeRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl RecipeRepository for SqliteRecipeRepository<'_> {
    fn list_recipes(&self) -> RepoResult<Vec<Recipe>> {
        let mut stmt = self
            .conn
            .prepare_cached(&format!("{RECIPE_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut recipes = Vec::new();

        while let Some(row) = rows.next()? {
            recipes.push(parse_recipe_row(row)?);
        }

        Ok(recipes)
    }

    fn find_recipe(&self, id: RecipeId) -> RepoResult<Option<Recipe>> {
        let mut stmt = self
            .conn
            .prepare_cached(&format!("{RECIPE_SELECT_SQL} WHERE id = ?1;"))?;
        let row = stmt
            .query_row([id], |row| Ok(parse_recipe_row(row)))
            .optional()?;

        row.transpose()
    }

    fn insert_recipe(&self, recipe: &NewRecipe) -> RepoResult<RecipeId> {
        self.conn.execute(
            "INSERT INTO Recipe (name, ingredient, image) VALUES (?1, ?2, ?3);",
            params![
                recipe.name.as_str(),
                recipe.ingredient.as_str(),
                recipe.image.as_deref(),
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn delete_recipe(&self, recipe: &Recipe) -> RepoResult<usize> {
        let changed = self.conn.execute(
            "DELETE FROM Recipe
             WHERE id = ?1
               AND name = ?2
               AND ingredient = ?3
               AND image IS ?4;",
            params![
                recipe.id,
                recipe.name.as_str(),
                recipe.ingredient.as_str(),
                recipe.image.as_deref(),
            ],
        )?;

        Ok(changed)
    }

    fn update_recipe_by_id(
        &self,
        id: RecipeId,
        name: &str,
        ingredient: &str,
        image: Option<&[u8]>,
    ) -> RepoResult<usize> {
        let changed = self.conn.execute(
            "UPDATE Recipe
             SET
                name = ?1,
                ingredient = ?2,
                image = ?3
             WHERE id = ?4;",
            params![name, ingredient, image, id],
        )?;

        Ok(changed)
    }
}

fn parse_recipe_row(row: &Row<'_>) -> RepoResult<Recipe> {
    Ok(Recipe {
        id: column(row, "id")?,
        name: column(row, "name")?,
        ingredient: column(row, "ingredient")?,
        image: column(row, "image")?,
    })
}

fn column<T: FromSql>(row: &Row<'_>, name: &str) -> RepoResult<T> {
    row.get::<_, T>(name).map_err(|err| match err {
        rusqlite::Error::InvalidColumnType(_, _, found) => {
            RepoError::InvalidData(format!("unexpected {found} value in Recipe.{name}"))
        }
        rusqlite::Error::FromSqlConversionFailure(_, _, source) => {
            RepoError::InvalidData(format!("cannot convert Recipe.{name}: {source}"))
        }
        other => other.into(),
    })
}
