use std::{
    str::FromStr,
    sync::{Arc, Mutex},
};

use email_address::EmailAddress;
use rusqlite::Connection;

use crate::{
    PasswordHash, User, ValidatedPassword,
    auth::create_user,
    category::{Category, CategoryIcon, CategoryName, NewCategory, create_category},
    db::initialize,
    transaction_type::TransactionType,
};

pub(crate) const TEST_PASSWORD: &str = "averylongandsecurepassword";

/// An in-memory database with all tables created.
pub(crate) fn get_test_connection() -> Connection {
    let connection = Connection::open_in_memory().expect("Could not open in-memory database");
    initialize(&connection).expect("Could not initialize database");
    connection
}

pub(crate) fn shared_connection(connection: Connection) -> Arc<Mutex<Connection>> {
    Arc::new(Mutex::new(connection))
}

/// Insert a user with the email "test@example.com" and the password [TEST_PASSWORD].
///
/// Uses the minimum bcrypt cost so tests stay fast.
pub(crate) fn create_test_user(connection: &Connection) -> User {
    create_user(
        EmailAddress::from_str("test@example.com").unwrap(),
        PasswordHash::new(ValidatedPassword::new_unchecked(TEST_PASSWORD), 4).unwrap(),
        connection,
    )
    .expect("Could not create test user")
}

pub(crate) fn create_test_category(
    user: &User,
    name: &str,
    icon: &str,
    transaction_type: TransactionType,
    connection: &Connection,
) -> Category {
    create_category(
        NewCategory {
            user_id: user.id,
            name: CategoryName::new(name).unwrap(),
            icon: CategoryIcon::new(icon).unwrap(),
            transaction_type,
        },
        connection,
    )
    .expect("Could not create test category")
}
