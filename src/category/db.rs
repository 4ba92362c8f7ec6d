//! Database operations for categories.

use rusqlite::{Connection, Row};
use time::OffsetDateTime;

use crate::{
    Error, UserID,
    category::{Category, CategoryIcon, CategoryId, CategoryName, NewCategory},
    error::is_unique_violation,
    transaction_type::TransactionType,
};

const CATEGORY_COLUMNS: &str = "id, user_id, name, icon, type, created_at";

/// Create a category and return it with its generated ID.
///
/// # Errors
/// Returns an [Error::DuplicateCategory] if the user already has a category
/// with the same name and type.
pub fn create_category(category: NewCategory, connection: &Connection) -> Result<Category, Error> {
    let created_at = OffsetDateTime::now_utc();

    connection
        .execute(
            "INSERT INTO category (user_id, name, icon, type, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            (
                category.user_id.as_i64(),
                category.name.as_ref(),
                category.icon.as_ref(),
                category.transaction_type,
                created_at,
            ),
        )
        .map_err(|error| {
            if is_unique_violation(&error) {
                Error::DuplicateCategory(category.name.to_string())
            } else {
                error.into()
            }
        })?;

    Ok(Category {
        id: connection.last_insert_rowid(),
        user_id: category.user_id,
        name: category.name,
        icon: category.icon,
        transaction_type: category.transaction_type,
        created_at,
    })
}

/// Retrieve the user's categories of `transaction_type`, or all of their
/// categories if `transaction_type` is `None`, ordered by name.
pub fn get_categories(
    user_id: UserID,
    transaction_type: Option<TransactionType>,
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    connection
        .prepare(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM category
             WHERE user_id = ?1 AND (?2 IS NULL OR type = ?2)
             ORDER BY name COLLATE NOCASE ASC"
        ))?
        .query_map((user_id.as_i64(), transaction_type), map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Find the user's category with exactly `name` and `transaction_type`.
///
/// # Errors
/// Returns an [Error::CategoryNotFound] if there is no such category.
pub fn find_category(
    user_id: UserID,
    name: &str,
    transaction_type: TransactionType,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .prepare(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM category
             WHERE user_id = ?1 AND name = ?2 AND type = ?3"
        ))?
        .query_row((user_id.as_i64(), name, transaction_type), map_row)
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::CategoryNotFound(name.to_owned()),
            error => error.into(),
        })
}

/// Delete one of the user's categories by ID.
///
/// Transactions keep their copy of the category name and icon.
///
/// # Errors
/// Returns an [Error::DeleteMissingCategory] if the user has no category with `category_id`.
pub fn delete_category(
    user_id: UserID,
    category_id: CategoryId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM category WHERE id = ?1 AND user_id = ?2",
        (category_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingCategory);
    }

    Ok(())
}

/// Initialize the category table and indexes.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            icon TEXT NOT NULL,
            type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
            created_at TEXT NOT NULL,
            UNIQUE(user_id, name, type),
            FOREIGN KEY(user_id) REFERENCES user(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_category_user_type ON category(user_id, type);",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let raw_name: String = row.get(2)?;
    let raw_icon: String = row.get(3)?;

    Ok(Category {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        name: CategoryName::new_unchecked(&raw_name),
        icon: CategoryIcon::new_unchecked(&raw_icon),
        transaction_type: row.get(4)?,
        created_at: row.get(5)?,
    })
}
