//! Per-user settings, currently just the display currency.

use rusqlite::Connection;

use crate::{Error, UserID, currency::Currency};

/// Create the user settings table.
///
/// # Errors
/// Returns an error if the table cannot be created.
pub fn create_user_settings_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user_settings (
                user_id INTEGER PRIMARY KEY,
                currency TEXT NOT NULL DEFAULT 'USD',
                FOREIGN KEY(user_id) REFERENCES user(id) ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

/// Get the user's display currency, creating their settings with the default
/// currency if they have none yet.
///
/// # Errors
/// Returns an [Error::SqlError] if the settings cannot be read or created.
pub fn get_currency(user_id: UserID, connection: &Connection) -> Result<Currency, Error> {
    connection.execute(
        "INSERT OR IGNORE INTO user_settings (user_id, currency) VALUES (?1, ?2)",
        (user_id.as_i64(), Currency::default().code()),
    )?;

    let code: String = connection.query_row(
        "SELECT currency FROM user_settings WHERE user_id = ?1",
        [user_id.as_i64()],
        |row| row.get(0),
    )?;

    code.parse().or_else(|error| {
        tracing::warn!("user {user_id} has an unsupported currency stored: {error}");
        Ok(Currency::default())
    })
}

/// Set the user's display currency.
///
/// # Errors
/// Returns an [Error::SqlError] if the settings cannot be saved.
pub fn set_currency(user_id: UserID, currency: Currency, connection: &Connection) -> Result<(), Error> {
    connection.execute(
        "INSERT INTO user_settings (user_id, currency) VALUES (?1, ?2)
         ON CONFLICT(user_id) DO UPDATE SET currency = excluded.currency",
        (user_id.as_i64(), currency.code()),
    )?;

    Ok(())
}
