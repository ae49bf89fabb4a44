//! Database operations for categories.
//!
//! Every function takes the ID of the user acting on the category. A
//! category that belongs to someone else is treated exactly like one that
//! does not exist.

use rusqlite::{Connection, Row, types::Type};

use crate::{
    Error,
    auth::UserID,
    category::{Category, CategoryId, CategoryName, CategoryType},
};

const CATEGORY_COLUMNS: &str = "id, name, type, user_id";

/// Create a category owned by `user_id` and return it with its generated ID.
pub fn create_category(
    name: CategoryName,
    category_type: CategoryType,
    user_id: UserID,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .prepare(&format!(
            "INSERT INTO category (name, type, user_id) VALUES (?1, ?2, ?3)
             RETURNING {CATEGORY_COLUMNS}"
        ))?
        .query_row(
            (name.as_ref(), category_type.as_str(), user_id.as_i64()),
            map_category_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve one of the user's categories by ID.
///
/// # Errors
/// Returns [Error::NotFound] if the category does not exist or belongs to another user.
pub fn get_category(
    category_id: CategoryId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .prepare(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM category WHERE id = :id AND user_id = :user_id"
        ))?
        .query_row(
            &[(":id", &category_id), (":user_id", &user_id.as_i64())],
            map_category_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve all of the user's categories ordered alphabetically by name.
pub fn get_categories(user_id: UserID, connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM category WHERE user_id = :user_id
             ORDER BY name ASC, id ASC"
        ))?
        .query_map(&[(":user_id", &user_id.as_i64())], map_category_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Replace the name and type of one of the user's categories.
///
/// # Errors
/// Returns [Error::NotFound] if the category does not exist or belongs to another user.
pub fn update_category(
    category_id: CategoryId,
    name: CategoryName,
    category_type: CategoryType,
    user_id: UserID,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .prepare(&format!(
            "UPDATE category SET name = ?1, type = ?2 WHERE id = ?3 AND user_id = ?4
             RETURNING {CATEGORY_COLUMNS}"
        ))?
        .query_row(
            (
                name.as_ref(),
                category_type.as_str(),
                category_id,
                user_id.as_i64(),
            ),
            map_category_row,
        )
        .map_err(|error| error.into())
}

/// Delete one of the user's categories.
///
/// Transactions in the category are kept and become uncategorized.
///
/// # Errors
/// Returns [Error::NotFound] if the category does not exist or belongs to another user.
pub fn delete_category(
    category_id: CategoryId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM category WHERE id = ?1 AND user_id = ?2",
        (category_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Initialize the category table and indexes.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
            user_id INTEGER NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_category_user ON category(user_id, name);",
    )?;

    Ok(())
}

/// Map the columns `id, name, type, user_id` starting at `offset` to a [Category].
pub(crate) fn map_category_columns(row: &Row, offset: usize) -> Result<Category, rusqlite::Error> {
    let id = row.get(offset)?;
    let raw_name: String = row.get(offset + 1)?;
    let raw_type: String = row.get(offset + 2)?;
    let user_id = UserID::new(row.get(offset + 3)?);

    let category_type = raw_type.parse().map_err(|error: Error| {
        rusqlite::Error::FromSqlConversionFailure(offset + 2, Type::Text, Box::new(error))
    })?;

    Ok(Category {
        id,
        name: CategoryName::new_unchecked(&raw_name),
        category_type,
        user_id,
    })
}

fn map_category_row(row: &Row) -> Result<Category, rusqlite::Error> {
    map_category_columns(row, 0)
}
