//! Opening the SQLite database and creating the tables for the domain models.

use std::path::Path;

use rusqlite::{Connection, TransactionBehavior};

use crate::{
    Error, auth::create_user_table, category::create_category_table,
    settings::create_user_settings_table, transaction::create_transaction_table,
};

/// Open the database at `path` with foreign key enforcement turned on.
///
/// The database file is created if it does not exist.
///
/// # Errors
/// Returns an [Error::SqlError] if the file cannot be opened.
pub fn open(path: &Path) -> Result<Connection, Error> {
    let connection = Connection::open(path)?;
    connection.pragma_update(None, "foreign_keys", "ON")?;

    Ok(connection)
}

/// Create the tables for all the domain models if they do not already exist.
///
/// The tables are created in one exclusive transaction, so either all tables
/// are created or none are.
///
/// # Errors
/// Returns an [Error::SqlError] if any of the tables could not be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction =
        rusqlite::Transaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_user_settings_table(&transaction)?;
    create_category_table(&transaction)?;
    create_transaction_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
