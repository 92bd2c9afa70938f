//! Code for creating the user table and registering and fetching users.
//!
//! Password hashing and session handling are the auth collaborator's job;
//! the engine stores whatever opaque credential string it is handed and
//! treats user IDs as already-authenticated identities.

use std::fmt::Display;

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::Error;

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better
/// compile time errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A registered user of the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The unique login name.
    pub username: String,
    /// The display name.
    pub name: String,
    /// The unique email address.
    pub email: String,
}

/// Create the user table.
///
/// # Errors
/// This function will return an error if the SQL query failed.
pub(crate) fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Create and insert a new user into the database.
///
/// `password` is stored as-is; hashing is expected to have happened upstream.
///
/// # Errors
/// Returns [Error::AlreadyRegistered] if `username` or `email` is taken by an
/// existing user, so callers can show "already registered" rather than a
/// generic failure. Returns [Error::SqlError] for any other SQL error.
pub fn register_user(
    username: &str,
    name: &str,
    email: &str,
    password: &str,
    connection: &Connection,
) -> Result<User, Error> {
    connection.execute(
        "INSERT INTO user (username, name, email, password) VALUES (?1, ?2, ?3, ?4)",
        (username, name, email, password),
    )?;

    let id = UserID::new(connection.last_insert_rowid());

    Ok(User {
        id,
        username: username.to_owned(),
        name: name.to_owned(),
        email: email.to_owned(),
    })
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
/// This function will return an error if:
/// - `user_id` does not belong to a registered user,
/// - there was an error trying to access the store.
pub fn get_user_by_id(user_id: UserID, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, username, name, email FROM user WHERE id = :id")?
        .query_row(&[(":id", &user_id.as_i64())], |row| {
            Ok(User {
                id: UserID::new(row.get(0)?),
                username: row.get(1)?,
                name: row.get(2)?,
                email: row.get(3)?,
            })
        })
        .map_err(|error| error.into())
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use crate::{Error, db::initialize};

    use super::{UserID, get_user_by_id, register_user};

    fn init_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    #[test]
    fn register_and_get_user() {
        let conn = init_db();

        let registered = register_user("alice", "Alice", "alice@example.com", "hunter2", &conn)
            .expect("could not register user");

        let got = get_user_by_id(registered.id, &conn).unwrap();

        assert_eq!(registered, got);
    }

    #[test]
    fn register_duplicate_username_is_classified() {
        let conn = init_db();
        register_user("alice", "Alice", "alice@example.com", "hunter2", &conn).unwrap();

        let got = register_user("alice", "Alice Again", "other@example.com", "hunter2", &conn);

        assert_eq!(got, Err(Error::AlreadyRegistered));
    }

    #[test]
    fn register_duplicate_email_is_classified() {
        let conn = init_db();
        register_user("alice", "Alice", "alice@example.com", "hunter2", &conn).unwrap();

        let got = register_user("bob", "Bob", "alice@example.com", "hunter2", &conn);

        assert_eq!(got, Err(Error::AlreadyRegistered));
    }

    #[test]
    fn get_user_with_unknown_id_is_not_found() {
        let conn = init_db();

        let got = get_user_by_id(UserID::new(42), &conn);

        assert_eq!(got, Err(Error::NotFound));
    }
}
