//! Defines the core data model and database queries for transactions.

use rusqlite::{Connection, Row};
use serde::Serialize;
use time::{Date, OffsetDateTime};

use crate::{
    Error, UserID, category::find_category, date_range::DateRange,
    transaction::schema::NewTransaction, transaction_type::TransactionType,
};

/// Database identifier for a transaction.
pub type TransactionId = i64;

/// An expense or income, i.e. an event where money was either spent or earned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The user who recorded the transaction.
    #[serde(skip)]
    pub user_id: UserID,
    /// The amount of money spent or earned, always positive.
    pub amount: f64,
    /// A text description of what the transaction was for, may be empty.
    pub description: String,
    /// When the transaction happened.
    pub date: Date,
    /// The name of the category at the time the transaction was created.
    pub category: String,
    /// The icon of the category at the time the transaction was created.
    pub category_icon: String,
    /// Whether the money was earned or spent.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// When the transaction was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

const TRANSACTION_COLUMNS: &str =
    "id, user_id, amount, description, date, category, category_icon, type, created_at";

/// Save a validated transaction for the user.
///
/// The category's icon is copied onto the transaction so that the transaction
/// still displays correctly if the category is later deleted.
///
/// # Errors
/// This function will return a:
/// - [Error::CategoryNotFound] if the user has no category with the
///   transaction's category name and type,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    user_id: UserID,
    transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let category = find_category(
        user_id,
        &transaction.category,
        transaction.transaction_type,
        connection,
    )?;

    let created = connection
        .prepare(&format!(
            "INSERT INTO \"transaction\"
                (user_id, amount, description, date, category, category_icon, type, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            (
                user_id.as_i64(),
                transaction.amount,
                transaction.description,
                transaction.date,
                category.name.as_ref(),
                category.icon.as_ref(),
                transaction.transaction_type,
                OffsetDateTime::now_utc(),
            ),
            map_transaction_row,
        )?;

    Ok(created)
}

/// Retrieve the user's transactions dated within `range`, newest first.
pub fn get_transactions_in_range(
    user_id: UserID,
    range: DateRange,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\"
             WHERE user_id = ?1 AND date BETWEEN ?2 AND ?3
             ORDER BY date DESC, id DESC"
        ))?
        .query_map((user_id.as_i64(), range.from, range.to), map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// Delete one of the user's transactions.
///
/// # Errors
/// Returns an [Error::DeleteMissingTransaction] if the user has no transaction with `id`.
pub fn delete_transaction(
    user_id: UserID,
    id: TransactionId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    Ok(())
}

/// Create the transaction table in the database.
///
/// The category is stored by name rather than by reference so that deleting
/// a category does not remove or alter past transactions.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                amount REAL NOT NULL CHECK (amount > 0),
                description TEXT NOT NULL DEFAULT '',
                date TEXT NOT NULL,
                category TEXT NOT NULL,
                category_icon TEXT NOT NULL,
                type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
                created_at TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON DELETE CASCADE
                )",
        (),
    )?;

    // Used by the transactions table, the overview and the history.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        amount: row.get(2)?,
        description: row.get(3)?,
        date: row.get(4)?,
        category: row.get(5)?,
        category_icon: row.get(6)?,
        transaction_type: row.get(7)?,
        created_at: row.get(8)?,
    })
}
